//! HabitVerse Server Library
//!
//! This module exports the core types and functions for testing and reuse.

pub mod auth;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod progression;
pub mod routes;

pub use auth::TokenIssuer;
pub use config::Config;
pub use db::{open_database, Db};
pub use error::{AppError, Result};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Config,
    pub tokens: TokenIssuer,
}

impl AppState {
    /// Create a new AppState with the given database and configuration
    pub fn new(db: Db, config: Config) -> Self {
        let tokens = TokenIssuer::new(config.jwt_secret.clone(), config.token_ttl_days);
        Self { db, config, tokens }
    }
}

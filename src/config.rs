use std::env;

use crate::constants::DEFAULT_TOKEN_TTL_DAYS;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_path: String,
    pub allowed_origins: Vec<String>,
    pub jwt_secret: String,
    pub token_ttl_days: u64,
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/habitverse.db".to_string());

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| "JWT_SECRET must be set for token signing")?;
        if jwt_secret.len() < 32 {
            return Err("JWT_SECRET must be at least 32 characters".to_string());
        }

        let token_ttl_days = env::var("TOKEN_TTL_DAYS")
            .unwrap_or_else(|_| DEFAULT_TOKEN_TTL_DAYS.to_string())
            .parse()
            .map_err(|_| "Invalid TOKEN_TTL_DAYS")?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            server_host,
            server_port,
            database_path,
            allowed_origins,
            jwt_secret,
            token_ttl_days,
            environment,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

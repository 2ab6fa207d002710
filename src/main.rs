use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use habitverse_server::config::Config;
use habitverse_server::db::open_database;
use habitverse_server::routes::{
    add_friend, check_habit, create_habit, delete_habit, friend_habits, get_profile, habit_stats,
    health_check, leaderboard, list_friends, list_habits, login_user, overall_stats,
    register_user, remove_friend, search_users, update_habit, update_profile,
};
use habitverse_server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "habitverse_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting HabitVerse Server...");

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "Environment: {}, Server: {}",
        config.environment,
        config.server_address()
    );

    // Open the embedded database (creates tables on first run)
    let db = open_database(&config.database_path)?;

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(
            config
                .allowed_origins
                .iter()
                .map(|s| s.parse().unwrap())
                .collect::<Vec<_>>(),
        )
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
        ])
        .allow_headers(Any);

    // Create app state
    let state = AppState::new(db, config.clone());

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(register_user))
        .route("/api/auth/login", post(login_user))
        .route("/api/user/profile", get(get_profile).put(update_profile))
        .route("/api/habits", get(list_habits).post(create_habit))
        .route("/api/habits/stats", get(overall_stats))
        .route("/api/habits/:id", put(update_habit).delete(delete_habit))
        .route("/api/habits/check/:id", post(check_habit))
        .route("/api/habits/:id/stats", get(habit_stats))
        .route("/api/leaderboard", get(leaderboard))
        .route("/api/friends/add", post(add_friend))
        .route("/api/friends", get(list_friends))
        .route("/api/friends/:id", delete(remove_friend))
        .route("/api/friends/:id/habits", get(friend_habits))
        .route("/api/users/search", get(search_users))
        .layer(cors)
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server_address().parse()?;
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

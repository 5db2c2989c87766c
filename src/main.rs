//! Volunteer Event Management Backend
//!
//! A production-grade REST backend with SQLite persistence, Tantivy full-text
//! search over events, and skill-based volunteer-to-event matching.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod matching;
mod models;
mod search;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use search::SearchIndex;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub search: Arc<SearchIndex>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Volunteer Event Management Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Index path: {:?}", config.index_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (VOL_API_PSK). Authentication is disabled!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Initialize search index
    let search = Arc::new(SearchIndex::open(&config.index_path)?);

    // Build initial search index from database
    tracing::info!("Building search index...");
    let events = repo.list_events().await?;
    search.rebuild(&events).await?;
    tracing::info!("Search index built with {} events", events.len());

    // Create application state
    let state = AppState {
        repo,
        search,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        // Datastore
        .route("/datastore", get(api::get_datastore))
        .route("/datastore/revision", get(api::get_revision))
        // Volunteers
        .route("/volunteers", get(api::list_volunteers))
        .route("/volunteers", post(api::create_volunteer))
        .route("/volunteers/{id}", get(api::get_volunteer))
        .route("/volunteers/{id}", put(api::update_volunteer))
        .route("/volunteers/{id}", delete(api::delete_volunteer))
        // Events
        .route("/events", get(api::list_events))
        .route("/events", post(api::create_event))
        .route("/events/upcoming", get(api::list_upcoming_events))
        .route("/events/{id}", get(api::get_event))
        .route("/events/{id}", put(api::update_event))
        .route("/events/{id}", delete(api::delete_event))
        // Assignments
        .route("/events/{id}/assign-volunteer", post(api::assign_volunteer))
        .route("/events/{id}/assignments", get(api::list_event_assignments))
        // Matching
        .route("/matching/volunteers", get(api::list_matching_volunteers))
        .route("/matching/events", get(api::list_matching_events))
        .route("/matching/best", get(api::best_match))
        // Notifications
        .route("/notifications", get(api::list_notifications))
        .route(
            "/notifications/mark-all-read",
            post(api::mark_all_notifications_read),
        )
        // Reports
        .route("/reports/volunteers", get(api::volunteer_report))
        .route("/reports/events", get(api::event_report))
        // Search
        .route("/search", get(api::search_events))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;

pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use services::{ai::AiService, auth::AuthService};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub auth: AuthService,
    pub ai: Arc<AiService>,
}

fn api_v1() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/auth/login", get(routes::auth::login))
        .route("/auth/me", get(routes::auth::me))
        // Films
        .route("/films", get(routes::films::list_films).post(routes::films::create_film))
        .route("/films/categories", get(routes::films::list_categories))
        .route("/films/search/{title}", get(routes::films::search_film))
        .route(
            "/films/{id}",
            get(routes::films::get_film)
                .put(routes::films::update_film)
                .delete(routes::films::delete_film),
        )
        // Customers
        .route("/customers/{id}", get(routes::customers::get_customer))
        .route(
            "/customers/{id}/rentals",
            get(routes::customers::list_customer_rentals).post(routes::customers::create_rental),
        )
        // Rentals
        .route("/rentals/overdue", get(routes::rentals::list_overdue))
        .route("/rentals/{id}", get(routes::rentals::get_rental))
        .route("/rentals/{id}/return", post(routes::rentals::return_rental))
        // AI
        .route("/ai/ask", get(routes::ai::ask))
        .route("/ai/summary", post(routes::ai::summary))
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(Any);

    Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check))
        .nest("/api/v1", api_v1())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(state)
}

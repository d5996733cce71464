use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    db::UserStore,
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{providers::CatalogProvider, ranking::RankConfig},
};

pub mod auth;
pub mod catalog;
pub mod extract;
pub mod users;

/// Static copy shown in the site header
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SiteCopy {
    pub title: String,
    pub placeholder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

impl From<&Config> for SiteCopy {
    fn from(config: &Config) -> Self {
        Self {
            title: config.site_title.clone(),
            placeholder: config.search_placeholder.clone(),
            account: config.account_label.clone(),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub catalog: Arc<dyn CatalogProvider>,
    pub users: Arc<dyn UserStore>,
    pub ranking: RankConfig,
    pub site: SiteCopy,
    pub bcrypt_cost: u32,
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/site", get(catalog::site))
        // Catalog
        .route("/home", get(catalog::home))
        .route("/trending/movies", get(catalog::trending_movies))
        .route("/trending/tv", get(catalog::trending_tv))
        .route("/movies/now-playing", get(catalog::now_playing))
        .route("/movies/:id", get(catalog::movie_details))
        .route("/movies/:id/credits", get(catalog::movie_credits))
        .route("/movies/:id/similar", get(catalog::similar_movies))
        .route("/tv/:id", get(catalog::tv_details))
        .route("/tv/:id/credits", get(catalog::tv_credits))
        .route("/tv/:id/similar", get(catalog::similar_tv))
        .route("/people/:id", get(catalog::person))
        .route("/search/multi", get(catalog::search_multi))
        // Accounts
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        // User lists
        .route(
            "/users/:username/favorites",
            get(users::favorites).post(users::set_favorite),
        )
        .route(
            "/users/:username/movies",
            get(users::movie_list).post(users::add_movie),
        )
        .route(
            "/users/:username/series",
            get(users::series_list).post(users::add_series),
        )
        .route(
            "/users/:username/recents",
            get(users::recents).post(users::add_recent),
        )
        .route("/users/:username/recents/movies", get(users::recent_movies))
        .route("/users/:username/recents/series", get(users::recent_series))
        .route("/users/:username/counts", get(users::counts))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

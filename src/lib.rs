pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod tagging;

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::{routing::get, Router};
use sqlx::SqlitePool;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::{AuthConfig, Config, LookupConfig};
use crate::tagging::{NoLookup, TagSuggestionSource, WikipediaSource};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub auth: Arc<AuthConfig>,
    pub tagger: Arc<dyn TagSuggestionSource>,
}

async fn health() -> &'static str {
    "ok"
}

/// The encyclopedia source described by `config`, or [`NoLookup`] when
/// lookups are disabled or the HTTP client cannot be built.
pub fn lookup_source(config: &LookupConfig) -> Arc<dyn TagSuggestionSource> {
    if !config.enabled {
        return Arc::new(NoLookup);
    }
    match WikipediaSource::new(config) {
        Ok(source) => Arc::new(source),
        Err(e) => {
            tracing::warn!(error = %e, "encyclopedia lookup disabled");
            Arc::new(NoLookup)
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Build the full Axum application router.
///
/// Caller is responsible for running database migrations on `pool` beforehand.
/// `tagger` backs the encyclopedia stage of automatic tagging.
pub fn build_app(pool: SqlitePool, config: &Config, tagger: Arc<dyn TagSuggestionSource>) -> Router {
    let state = AppState {
        db: pool,
        auth: Arc::new(config.auth.clone()),
        tagger,
    };

    Router::new()
        .route("/health", get(health))
        .merge(routes::auth::router())
        .merge(routes::bookmarks::router())
        .merge(routes::tags::router())
        .merge(routes::admin::router())
        .merge(routes::export::router())
        .layer(cors_layer(&config.cors_origins))
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

pub mod auth;
pub mod cli;
pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod validation;

use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::state::AppState;

/// The complete router: public routes, session-protected /api routes, global layers
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(handlers::public::root))
        .route("/health", get(handlers::public::health))
        .merge(auth_public_routes())
        // Protected API
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes))
        .layer(cors_layer(config));

    let router = if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };
    router.with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/signin", post(auth::signin))
        .route("/auth/callback", get(auth::callback))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{auth, clients, dashboard, interactions, opportunities, tasks};

    Router::new()
        .route("/api/auth/session", get(auth::session))
        .route("/api/auth/signout", post(auth::signout))
        .route("/api/clients", get(clients::list).post(clients::create))
        .route(
            "/api/clients/:id",
            get(clients::show).put(clients::update).delete(clients::delete),
        )
        .route(
            "/api/clients/:id/interactions",
            get(interactions::list).post(interactions::create),
        )
        .route(
            "/api/clients/:id/interactions/:interaction_id",
            axum::routing::put(interactions::update).delete(interactions::delete),
        )
        .route("/api/opportunities", get(opportunities::list).post(opportunities::create))
        .route(
            "/api/opportunities/:id",
            get(opportunities::show)
                .put(opportunities::update)
                .delete(opportunities::delete),
        )
        .route("/api/tasks", get(tasks::list).post(tasks::create))
        .route(
            "/api/tasks/:id",
            get(tasks::show).put(tasks::update).delete(tasks::delete),
        )
        .route("/api/tasks/:id/toggle", post(tasks::toggle))
        .route("/api/dashboard", get(dashboard::show))
        .route_layer(from_fn_with_state(state, middleware::require_session))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let security = &config.security;
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

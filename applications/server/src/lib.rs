//! Identity Manager Server Library
//!
//! HTTP/JSON front end for the identity manager: configuration, bcrypt
//! password hashing and the axum router over an [`im_core::IdentityManager`].
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

// Re-export commonly used types for convenience
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use services::BcryptPasswordHasher;
pub use state::AppState;

/// Build the application router with every route nested under `/api`
pub fn create_router(app_state: AppState) -> Router {
    let group_routes = Router::new()
        .route("/groups", post(api::groups::create_group))
        .route("/groups/search", post(api::groups::search_groups))
        .route(
            "/groups/search/with-users",
            post(api::groups::search_groups_with_users),
        )
        .route("/groups/delete", post(api::groups::delete_groups))
        .route(
            "/groups/:id",
            get(api::groups::get_group).patch(api::groups::modify_group),
        )
        .route("/groups/:id/users", get(api::groups::get_group_with_users));

    let user_routes = Router::new()
        .route("/users", post(api::users::create_user))
        .route("/users/search", post(api::users::search_users))
        .route(
            "/users/search/with-groups",
            post(api::users::search_users_with_groups),
        )
        .route("/users/delete", post(api::users::delete_users))
        .route(
            "/users/:id",
            get(api::users::get_user).patch(api::users::modify_user),
        )
        .route("/users/:id/groups", get(api::users::get_user_with_groups))
        .route(
            "/users/:id/password",
            axum::routing::put(api::passwords::modify_password),
        )
        .route(
            "/users/:id/password/compare",
            post(api::passwords::compare_password),
        );

    let membership_routes = Router::new()
        .route("/membership/join", post(api::membership::join_group))
        .route("/membership/leave", post(api::membership::leave_group));

    let api_routes = Router::new()
        .route("/health", get(api::health::health))
        .route("/version", get(api::health::version))
        .merge(group_routes)
        .merge(user_routes)
        .merge(membership_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::auth::handlers as auth;
use crate::intake::handlers as intake;
use crate::state::AppState;
use crate::upload::UPLOAD_BODY_LIMIT;
use crate::waitlist::handlers as waitlist;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Waitlist gateway
        .route(
            "/api/v1/waitlist/check-email",
            post(waitlist::handle_check_email),
        )
        .route("/api/v1/waitlist", post(waitlist::handle_create_entry))
        .route("/api/v1/waitlist/:id", get(waitlist::handle_get_entry))
        .route("/api/v1/waitlist/:id/role", put(waitlist::handle_save_role))
        .route(
            "/api/v1/waitlist/:id/interests",
            put(waitlist::handle_save_interests),
        )
        .route(
            "/api/v1/waitlist/:id/profile",
            put(waitlist::handle_save_profile).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        // Resume intake
        .route(
            "/api/v1/join",
            post(intake::handle_join)
                .fallback(intake::method_not_allowed)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        // Accounts
        .route("/api/v1/auth/signup", post(auth::handle_sign_up))
        .route("/api/v1/auth/signin", post(auth::handle_sign_in))
        .route("/api/v1/auth/logout", post(auth::handle_log_out))
        .route("/api/v1/auth/me", get(auth::handle_me))
        .with_state(state)
}

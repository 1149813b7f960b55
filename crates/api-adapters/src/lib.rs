//! # api-adapters
//!
//! The web boundary: routes, session cookie handling, server-rendered pages
//! and the live dashboard socket.

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod session;
pub mod state;
pub mod views;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::{AppState, WebSettings};

use handlers::{auth, dashboard, home, ops, task};

/// Builds the application router.
///
/// Mounted at the root by the binary; tests drive it directly with `oneshot`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home::index))
        .route("/dashboard", get(dashboard::show))
        .route("/dashboard/tasks", post(dashboard::create))
        .route("/dashboard/tasks/{id}/delete", post(dashboard::delete))
        .route("/dashboard/live", get(dashboard::live))
        .route("/task/{id}", get(task::show))
        .route("/task/{id}/comments", post(task::comment))
        .route("/task/{id}/comments/{comment_id}/delete", post(task::delete_comment))
        .route("/auth/signin", post(auth::sign_in))
        .route("/auth/signout", post(auth::sign_out))
        .route("/metrics", get(ops::metrics))
        .route("/healthz", get(ops::healthz))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

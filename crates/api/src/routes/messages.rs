//! Route definitions for the `/messages` resource (contact intake).

use axum::routing::post;
use axum::Router;

use crate::handlers::messages;
use crate::state::AppState;

/// Routes mounted at `/messages`.
///
/// ```text
/// POST / -> submit
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(messages::submit))
}

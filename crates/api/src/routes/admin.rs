//! Route definitions for the `/admin` surface.
//!
//! Every handler behind this router takes the `RequireAdmin` extractor,
//! so authorization is enforced per handler rather than by a layer here.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, post, put};
use axum::Router;

use crate::handlers::{categories, projects};
use crate::state::AppState;

/// Upload request body ceiling: a full batch of media files (10 plus the
/// thumbnail, 100 MiB each) with multipart overhead.
const MAX_UPLOAD_BODY_BYTES: usize = 1_200 * 1024 * 1024;

/// Routes mounted at `/admin`.
///
/// ```text
/// POST   /projects                      -> create (multipart)
/// PUT    /projects/{id}                 -> update
/// DELETE /projects/{id}                 -> delete
/// POST   /projects/{id}/reorder         -> reorder
/// POST   /projects/{id}/media           -> add_media (multipart)
/// DELETE /projects/{id}/media/{index}   -> remove_media
///
/// POST   /categories                    -> create
/// PUT    /categories/{id}               -> update
/// DELETE /categories/{id}               -> delete (cascading)
/// ```
pub fn router() -> Router<AppState> {
    let project_routes = Router::new()
        .route("/", post(projects::create))
        .route("/{id}", put(projects::update).delete(projects::delete))
        .route("/{id}/reorder", post(projects::reorder))
        .route("/{id}/media", post(projects::add_media))
        .route("/{id}/media/{index}", delete(projects::remove_media));

    let category_routes = Router::new()
        .route("/", post(categories::create))
        .route(
            "/{id}",
            put(categories::update).delete(categories::delete),
        );

    Router::new()
        .nest("/projects", project_routes)
        .nest("/categories", category_routes)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES))
}

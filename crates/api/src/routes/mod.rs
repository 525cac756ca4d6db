pub mod admin;
pub mod auth;
pub mod categories;
pub mod health;
pub mod messages;
pub mod projects;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                          login (public)
/// /auth/refresh                        refresh (public)
/// /auth/logout                         logout (requires auth)
///
/// /projects                            gallery list (public)
/// /projects/{id}                       project detail (public)
/// /categories                          category list (public)
/// /messages                            contact intake (public, POST)
/// /catalog/ws                          live catalog feed (WebSocket)
///
/// /admin/projects                      create (admin, multipart)
/// /admin/projects/{id}                 update, delete
/// /admin/projects/{id}/reorder         swap with neighbour (POST)
/// /admin/projects/{id}/media           append uploads (POST, multipart)
/// /admin/projects/{id}/media/{index}   remove one item (DELETE)
/// /admin/categories                    create (admin)
/// /admin/categories/{id}               update, delete (cascading)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/projects", projects::router())
        .nest("/categories", categories::router())
        .nest("/messages", messages::router())
        .nest("/admin", admin::router())
        .route("/catalog/ws", get(ws::catalog_ws_handler))
}

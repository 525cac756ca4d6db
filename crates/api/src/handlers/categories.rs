//! Handlers for the `/categories` resource.
//!
//! The public listing reads from the catalog snapshot; the admin CRUD
//! writes through [`CategoryRepo`]. Deletion is the one transactionally
//! cascading operation in the system: referencing projects are rewired in
//! the same batch that removes the category.

use atelier_core::error::CoreError;
use atelier_core::slug::slugify;
use atelier_core::types::DbId;
use atelier_db::models::category::{CreateCategory, UpdateCategory};
use atelier_db::repositories::CategoryRepo;
use atelier_events::CatalogEvent;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/categories
///
/// List all categories, name-ordered, from the catalog snapshot.
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let snapshot = state.catalog.snapshot().await;
    Ok(Json(DataResponse {
        data: snapshot.categories.clone(),
    }))
}

/// POST /api/v1/admin/categories
///
/// Create a category; the slug is derived from the name. A duplicate slug
/// surfaces as 409 via the unique constraint.
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateCategory>,
) -> AppResult<impl IntoResponse> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Category name must not be empty".into(),
        )));
    }

    let category = CategoryRepo::create(&state.pool, name, &slugify(name)).await?;

    tracing::info!(
        category_id = category.id,
        slug = %category.slug,
        admin_id = admin.user_id,
        "Category created",
    );
    state.event_bus.publish(
        CatalogEvent::new("category.created")
            .with_entity("category", category.id)
            .with_actor(admin.user_id),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// PUT /api/v1/admin/categories/{id}
///
/// Rename a category. The slug is re-derived from the new name.
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<impl IntoResponse> {
    let current = CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))?;

    let name = match input.name.as_deref().map(str::trim) {
        Some("") => {
            return Err(AppError::Core(CoreError::Validation(
                "Category name must not be empty".into(),
            )))
        }
        Some(name) => name.to_string(),
        None => current.name,
    };

    let category = CategoryRepo::update(&state.pool, id, &name, &slugify(&name))
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))?;

    tracing::info!(category_id = id, admin_id = admin.user_id, "Category updated");
    state.event_bus.publish(
        CatalogEvent::new("category.updated")
            .with_entity("category", id)
            .with_actor(admin.user_id),
    );

    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/v1/admin/categories/{id}
///
/// Delete a category. In the same transaction, every referencing project
/// loses the id; projects for which it was the sole category are
/// reassigned to the uncategorized sentinel.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = CategoryRepo::delete_cascade(&state.pool, id).await?;

    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }));
    }

    tracing::info!(category_id = id, admin_id = admin.user_id, "Category deleted");
    state.event_bus.publish(
        CatalogEvent::new("category.deleted")
            .with_entity("category", id)
            .with_actor(admin.user_id),
    );

    Ok(StatusCode::NO_CONTENT)
}

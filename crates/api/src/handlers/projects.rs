//! Handlers for the `/projects` resource.
//!
//! The public surface reads from the catalog snapshot; the admin surface
//! drives the create/update/delete/reorder workflows, including media
//! uploads to the blob store.
//!
//! Consistency notes, faithful to the product's accepted weak spots:
//! - next sort position is read-then-write, not compare-and-swap;
//! - per-file validation happens inside the upload loop, so earlier files
//!   of a batch may already be uploaded when a later one is rejected;
//! - a create aborted by a failed upload leaves the already-uploaded
//!   objects orphaned (logged, not compensated);
//! - only the reorder swap is transactional.

use atelier_core::catalog::{gallery_view, validate_category_selection, validate_year, CategoryFilter};
use atelier_core::error::CoreError;
use atelier_core::media::{validate_media_count, validate_media_file, MediaItem, MediaKind};
use atelier_core::object_key::object_key;
use atelier_core::types::DbId;
use atelier_db::models::project::{CreateProject, Project, UpdateProject};
use atelier_db::repositories::ProjectRepo;
use atelier_events::CatalogEvent;
use axum::body::Bytes;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogProject;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Public gallery
// ---------------------------------------------------------------------------

/// Query parameters for the gallery listing.
#[derive(Debug, Deserialize)]
pub struct GalleryParams {
    /// `all` (or absent) for every project, otherwise a category id.
    pub category: Option<String>,
}

/// Gallery payload: the filtered projects plus the catalog's readable
/// error state, if the last reload failed.
#[derive(Debug, Serialize)]
pub struct GalleryData {
    pub projects: Vec<CatalogProject>,
    pub error: Option<String>,
}

/// GET /api/v1/projects
///
/// List projects in catalog order, optionally filtered by category.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<GalleryParams>,
) -> AppResult<impl IntoResponse> {
    let filter = parse_category_filter(params.category.as_deref())?;
    let snapshot = state.catalog.snapshot().await;

    let projects = gallery_view(&snapshot.projects, &filter)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(DataResponse {
        data: GalleryData {
            projects,
            error: snapshot.error.clone(),
        },
    }))
}

/// GET /api/v1/projects/{id}
///
/// Project detail, from the same snapshot the gallery renders from.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let snapshot = state.catalog.snapshot().await;
    let project = snapshot
        .projects
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    Ok(Json(DataResponse { data: project }))
}

/// Parse the `category` query parameter into a filter.
fn parse_category_filter(raw: Option<&str>) -> AppResult<CategoryFilter> {
    match raw {
        None | Some("all") => Ok(CategoryFilter::All),
        Some(value) => value
            .parse::<DbId>()
            .map(CategoryFilter::Id)
            .map_err(|_| {
                AppError::BadRequest(format!(
                    "Invalid category '{value}'. Expected 'all' or a category id"
                ))
            }),
    }
}

// ---------------------------------------------------------------------------
// Admin: create
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/projects (multipart)
///
/// Fields: `title`, `description`, `year`, `categories` (comma-separated
/// ids), optional `thumbnail` file, repeated `media` files, optional
/// `media_descriptions` (JSON array of captions, by position).
///
/// All uploads must succeed before the record is written; a failed upload
/// aborts the create and leaves earlier uploads orphaned in the store.
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = ProjectForm::parse(multipart).await?;

    let title = form
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("title is required".into()))?
        .to_string();
    let year = form
        .year
        .ok_or_else(|| AppError::BadRequest("year is required".into()))?;
    validate_year(year)?;
    validate_category_selection(&form.categories)?;
    validate_media_count(0, form.media.len())?;

    // Read-then-write; two racing creates may both observe the same max.
    let sort_order = ProjectRepo::next_sort_order(&state.pool).await?;

    let uploads = run_uploads(
        &state,
        form.thumbnail.as_ref(),
        &form.media,
        &form.media_descriptions,
    )
    .await?;

    // Cover: explicit thumbnail wins, else the first uploaded media item.
    let cover_image = uploads
        .thumbnail_url
        .clone()
        .or_else(|| uploads.media.first().map(|m| m.url.clone()));

    let input = CreateProject {
        title,
        description: form.description,
        year,
        categories: form.categories,
        cover_image,
        thumbnail: uploads.thumbnail_url,
        media: uploads.media,
        sort_order,
    };
    let project = ProjectRepo::create(&state.pool, &input).await?;

    tracing::info!(
        project_id = project.id,
        media_count = project.media.0.len(),
        admin_id = admin.user_id,
        "Project created",
    );
    publish(&state, "project.created", &project, admin.user_id);

    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

// ---------------------------------------------------------------------------
// Admin: update metadata
// ---------------------------------------------------------------------------

/// PUT /api/v1/admin/projects/{id}
///
/// Update title/description/year/categories. Media changes go through the
/// dedicated media endpoints.
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<impl IntoResponse> {
    if let Some(categories) = &input.categories {
        validate_category_selection(categories)?;
    }
    if let Some(year) = input.year {
        validate_year(year)?;
    }

    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    tracing::info!(project_id = id, admin_id = admin.user_id, "Project updated");
    publish(&state, "project.updated", &project, admin.user_id);

    Ok(Json(DataResponse { data: project }))
}

// ---------------------------------------------------------------------------
// Admin: delete
// ---------------------------------------------------------------------------

/// DELETE /api/v1/admin/projects/{id}
///
/// Attempts to delete every referenced blob first, tolerating individual
/// failures, then removes the record unconditionally.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    let urls = referenced_urls(&project);
    for url in &urls {
        state.store.delete_url_best_effort(url).await;
    }

    ProjectRepo::delete(&state.pool, id).await?;

    tracing::info!(
        project_id = id,
        files = urls.len(),
        admin_id = admin.user_id,
        "Project deleted",
    );
    publish(&state, "project.deleted", &project, admin.user_id);

    Ok(StatusCode::NO_CONTENT)
}

/// Every blob URL a project references, deduplicated (the cover usually
/// aliases the thumbnail or the first media item).
fn referenced_urls(project: &Project) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    let mut push = |url: Option<&String>| {
        if let Some(url) = url {
            if !urls.contains(url) {
                urls.push(url.clone());
            }
        }
    };
    push(project.cover_image.as_ref());
    push(project.thumbnail.as_ref());
    for item in &project.media.0 {
        push(Some(&item.url));
    }
    urls
}

// ---------------------------------------------------------------------------
// Admin: reorder
// ---------------------------------------------------------------------------

/// Direction of a manual reorder step.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReorderDirection {
    Earlier,
    Later,
}

/// Request body for `POST /admin/projects/{id}/reorder`.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub direction: ReorderDirection,
}

/// POST /api/v1/admin/projects/{id}/reorder
///
/// Swap the target's sort position with its neighbour in the requested
/// direction, atomically. A no-op at the first/last position.
pub async fn reorder(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReorderRequest>,
) -> AppResult<impl IntoResponse> {
    let ordered = ProjectRepo::list_ordered(&state.pool).await?;
    let position = ordered
        .iter()
        .position(|p| p.id == id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    let neighbour = match input.direction {
        ReorderDirection::Earlier => position.checked_sub(1),
        ReorderDirection::Later => (position + 1 < ordered.len()).then_some(position + 1),
    };

    if let Some(neighbour) = neighbour {
        let target = &ordered[position];
        let other = &ordered[neighbour];
        ProjectRepo::swap_sort_order(
            &state.pool,
            target.id,
            target.sort_order,
            other.id,
            other.sort_order,
        )
        .await?;

        tracing::info!(
            project_id = id,
            swapped_with = other.id,
            admin_id = admin.user_id,
            "Projects reordered",
        );
        publish(&state, "project.reordered", target, admin.user_id);
    }
    // Already at the boundary: nothing to swap.

    let projects = ProjectRepo::list_ordered(&state.pool).await?;
    Ok(Json(DataResponse { data: projects }))
}

// ---------------------------------------------------------------------------
// Admin: media
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/projects/{id}/media (multipart)
///
/// Append uploaded files to the project's media list, capped at the
/// per-project maximum. Repeated `media` file fields plus an optional
/// `media_descriptions` JSON array.
pub async fn add_media(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = ProjectForm::parse(multipart).await?;
    if form.media.is_empty() {
        return Err(AppError::BadRequest("No media files in request".into()));
    }

    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    // Cap check before anything touches the store.
    validate_media_count(project.media.0.len(), form.media.len())?;

    let uploads = run_uploads(&state, None, &form.media, &form.media_descriptions).await?;

    let mut media = project.media.0.clone();
    media.extend(uploads.media);

    // A project created without any media gets its cover from the first
    // upload that arrives later.
    let new_cover = project
        .cover_image
        .is_none()
        .then(|| media.first().map(|m| m.url.clone()))
        .flatten();

    let updated = ProjectRepo::update_media(&state.pool, id, &media, new_cover.as_deref())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    tracing::info!(
        project_id = id,
        total_media = updated.media.0.len(),
        admin_id = admin.user_id,
        "Media added to project",
    );
    publish(&state, "project.updated", &updated, admin.user_id);

    Ok((StatusCode::CREATED, Json(DataResponse { data: updated })))
}

/// DELETE /api/v1/admin/projects/{id}/media/{index}
///
/// Remove one media item by position. The blob is deleted best-effort;
/// the record update proceeds regardless.
pub async fn remove_media(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((id, index)): Path<(DbId, usize)>,
) -> AppResult<impl IntoResponse> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    let mut media = project.media.0.clone();
    if index >= media.len() {
        return Err(AppError::BadRequest(format!(
            "No media item at position {index}"
        )));
    }
    let removed = media.remove(index);

    state.store.delete_url_best_effort(&removed.url).await;

    // Re-point the cover if it was the removed item.
    let new_cover = (project.cover_image.as_deref() == Some(removed.url.as_str()))
        .then(|| {
            media
                .first()
                .map(|m| m.url.clone())
                .or_else(|| project.thumbnail.clone())
        })
        .flatten();

    let updated = ProjectRepo::update_media(&state.pool, id, &media, new_cover.as_deref())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    tracing::info!(
        project_id = id,
        removed_url = %removed.url,
        admin_id = admin.user_id,
        "Media removed from project",
    );
    publish(&state, "project.updated", &updated, admin.user_id);

    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// Multipart form
// ---------------------------------------------------------------------------

/// A buffered file part.
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Parsed project multipart form. Create uses every field; the media
/// endpoint only reads the files.
#[derive(Default)]
struct ProjectForm {
    title: Option<String>,
    description: String,
    year: Option<i32>,
    categories: Vec<DbId>,
    thumbnail: Option<UploadFile>,
    media: Vec<UploadFile>,
    media_descriptions: Vec<Option<String>>,
}

impl ProjectForm {
    async fn parse(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid multipart request: {e}")))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match name.as_str() {
                "title" => form.title = Some(read_text(field).await?),
                "description" => form.description = read_text(field).await?,
                "year" => {
                    let raw = read_text(field).await?;
                    let year = raw.trim().parse::<i32>().map_err(|_| {
                        AppError::Core(CoreError::Validation(format!(
                            "Year '{raw}' is not a valid integer"
                        )))
                    })?;
                    form.year = Some(year);
                }
                "categories" => {
                    let raw = read_text(field).await?;
                    form.categories = parse_category_ids(&raw)?;
                }
                "media_descriptions" => {
                    let raw = read_text(field).await?;
                    form.media_descriptions =
                        serde_json::from_str(&raw).map_err(|_| {
                            AppError::BadRequest(
                                "media_descriptions must be a JSON array of strings".into(),
                            )
                        })?;
                }
                "thumbnail" => form.thumbnail = Some(read_file(field).await?),
                "media" => form.media.push(read_file(field).await?),
                other => {
                    tracing::debug!(field = other, "Ignoring unknown multipart field");
                }
            }
        }

        Ok(form)
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart field: {e}")))
}

async fn read_file(field: axum::extract::multipart::Field<'_>) -> AppResult<UploadFile> {
    let filename = field
        .file_name()
        .map(str::to_string)
        .filter(|f| !f.is_empty())
        .ok_or_else(|| AppError::BadRequest("File field is missing a filename".into()))?;
    let content_type = field
        .content_type()
        .map(str::to_string)
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read file '{filename}': {e}")))?;

    Ok(UploadFile {
        filename,
        content_type,
        bytes,
    })
}

/// Parse a comma-separated list of category ids.
fn parse_category_ids(raw: &str) -> AppResult<Vec<DbId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<DbId>()
                .map_err(|_| AppError::BadRequest(format!("Invalid category id '{s}'")))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Upload helpers
// ---------------------------------------------------------------------------

/// Result of a successful upload batch.
struct Uploads {
    thumbnail_url: Option<String>,
    media: Vec<MediaItem>,
}

/// Upload the thumbnail (if any) and each media file, in order.
///
/// Validation runs per file inside the loop; a rejection or upload failure
/// aborts the batch, and whatever was already uploaded stays behind in the
/// store (logged as orphaned).
async fn run_uploads(
    state: &AppState,
    thumbnail: Option<&UploadFile>,
    media: &[UploadFile],
    descriptions: &[Option<String>],
) -> AppResult<Uploads> {
    let mut uploaded_keys: Vec<String> = Vec::new();
    let result = upload_batch(state, thumbnail, media, descriptions, &mut uploaded_keys).await;

    if result.is_err() && !uploaded_keys.is_empty() {
        tracing::warn!(
            orphaned = ?uploaded_keys,
            "Upload batch aborted; earlier uploads remain in the store",
        );
    }
    result
}

async fn upload_batch(
    state: &AppState,
    thumbnail: Option<&UploadFile>,
    media: &[UploadFile],
    descriptions: &[Option<String>],
    uploaded_keys: &mut Vec<String>,
) -> AppResult<Uploads> {
    let thumbnail_url = match thumbnail {
        Some(file) => {
            let kind = validate_media_file(
                &file.filename,
                &file.content_type,
                file.bytes.len() as u64,
            )?;
            if kind != MediaKind::Image {
                return Err(AppError::Core(CoreError::Validation(format!(
                    "Thumbnail '{}' must be an image",
                    file.filename
                ))));
            }
            Some(upload_one(state, file, uploaded_keys).await?)
        }
        None => None,
    };

    let mut items = Vec::with_capacity(media.len());
    for (index, file) in media.iter().enumerate() {
        // Per-file validation, inside the loop: earlier files are already
        // in the store if this one fails.
        let kind =
            validate_media_file(&file.filename, &file.content_type, file.bytes.len() as u64)?;
        let url = upload_one(state, file, uploaded_keys).await?;
        items.push(MediaItem {
            url,
            kind,
            description: descriptions.get(index).cloned().flatten(),
        });
    }

    Ok(Uploads {
        thumbnail_url,
        media: items,
    })
}

/// Upload a single file under a timestamped key and record the key for
/// orphan logging.
async fn upload_one(
    state: &AppState,
    file: &UploadFile,
    uploaded_keys: &mut Vec<String>,
) -> AppResult<String> {
    let key = object_key(
        state.store.key_prefix(),
        chrono::Utc::now().timestamp_millis(),
        &file.filename,
    );
    let url = state
        .store
        .upload(&key, &file.content_type, file.bytes.to_vec())
        .await?;
    uploaded_keys.push(key);
    Ok(url)
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Publish a catalog event for a project mutation.
fn publish(state: &AppState, event_type: &str, project: &Project, admin_id: DbId) {
    state.event_bus.publish(
        CatalogEvent::new(event_type)
            .with_entity("project", project.id)
            .with_actor(admin_id),
    );
}

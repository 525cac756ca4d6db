//! Repository for the `projects` table.
//!
//! Includes the manual-ordering operations: max-order lookup for creates
//! and the transactional order swap used by the admin reorder workflow.

use atelier_core::media::MediaItem;
use atelier_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::project::{CreateProject, Project, UpdateProject};

/// Column list for `projects` queries.
const PROJECT_COLUMNS: &str = "\
    id, title, description, year, categories, cover_image, thumbnail, \
    media, sort_order, created_at, updated_at";

/// Provides CRUD and ordering operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// List every project in catalog order.
    ///
    /// Rows without a `sort_order` come last; ties fall back to id order,
    /// which is what the stable in-memory sort then preserves.
    pub async fn list_ordered(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects \
             ORDER BY sort_order ASC NULLS LAST, id ASC"
        );
        sqlx::query_as::<_, Project>(&query).fetch_all(pool).await
    }

    /// Find a project by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Compute the next manual sort position: current max plus one.
    ///
    /// Read-then-write, not compare-and-swap: two concurrent creates can
    /// observe the same max and produce duplicate positions. The catalog
    /// sort tolerates duplicates, so this stays a plain read.
    pub async fn next_sort_order(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let max: Option<i64> = sqlx::query_scalar("SELECT MAX(sort_order) FROM projects")
            .fetch_one(pool)
            .await?;
        Ok(max.unwrap_or(0) + 1)
    }

    /// Insert a new project row.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects \
                 (title, description, year, categories, cover_image, thumbnail, media, sort_order) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {PROJECT_COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.year)
            .bind(&input.categories)
            .bind(input.cover_image.as_deref())
            .bind(input.thumbnail.as_deref())
            .bind(Json(&input.media))
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    /// Update project metadata. Returns `None` if no row matched.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET \
                 title = COALESCE($2, title), \
                 description = COALESCE($3, description), \
                 year = COALESCE($4, year), \
                 categories = COALESCE($5, categories), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {PROJECT_COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(input.title.as_deref())
            .bind(input.description.as_deref())
            .bind(input.year)
            .bind(input.categories.as_deref())
            .fetch_optional(pool)
            .await
    }

    /// Replace a project's media list and cover image in one statement.
    ///
    /// Used after upload batches succeed and after media removal.
    pub async fn update_media(
        pool: &PgPool,
        id: DbId,
        media: &[MediaItem],
        cover_image: Option<&str>,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET \
                 media = $2, \
                 cover_image = COALESCE($3, cover_image), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {PROJECT_COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(Json(media))
            .bind(cover_image)
            .fetch_optional(pool)
            .await
    }

    /// Delete a project row. Returns `true` if a row was deleted.
    ///
    /// Blob cleanup is the caller's responsibility and happens before this
    /// call; the row is removed regardless of how that cleanup went.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Swap the sort positions of two projects.
    ///
    /// Runs in a transaction: both updates commit together or neither does.
    pub async fn swap_sort_order(
        pool: &PgPool,
        first_id: DbId,
        first_order: Option<i64>,
        second_id: DbId,
        second_order: Option<i64>,
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE projects SET sort_order = $2, updated_at = now() WHERE id = $1")
            .bind(first_id)
            .bind(second_order)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE projects SET sort_order = $2, updated_at = now() WHERE id = $1")
            .bind(second_id)
            .bind(first_order)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

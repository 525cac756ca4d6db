//! Project entity model and DTOs.

use atelier_core::catalog::CatalogEntry;
use atelier_core::media::MediaItem;
use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A project row from the `projects` table.
///
/// `sort_order` is `None` for rows that never received a manual position;
/// normalization to the sort-last sentinel happens in the catalog reader,
/// not here.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub year: i32,
    /// Category ids; may contain the uncategorized sentinel (`0`).
    pub categories: Vec<DbId>,
    pub cover_image: Option<String>,
    pub thumbnail: Option<String>,
    /// Ordered media attachments.
    pub media: Json<Vec<MediaItem>>,
    pub sort_order: Option<i64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CatalogEntry for Project {
    fn sort_order(&self) -> Option<i64> {
        self.sort_order
    }

    fn category_ids(&self) -> &[DbId] {
        &self.categories
    }
}

/// DTO for inserting a new project. Built by the admin create workflow
/// after uploads have succeeded.
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub title: String,
    pub description: String,
    pub year: i32,
    pub categories: Vec<DbId>,
    pub cover_image: Option<String>,
    pub thumbnail: Option<String>,
    pub media: Vec<MediaItem>,
    pub sort_order: i64,
}

/// DTO for updating project metadata. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub year: Option<i32>,
    pub categories: Option<Vec<DbId>>,
}

//! Live catalog reader.
//!
//! Holds the current normalized snapshot of projects and categories and
//! hands out subscriptions: callers get the synchronous snapshot plus a
//! receiver for subsequent change notifications, and deregister by
//! dropping the receiver. Defaulting rules (the sort-last sentinel for a
//! missing order) are applied here, once, and nowhere else.

use std::sync::Arc;

use atelier_core::catalog::{normalized_order, CatalogEntry};
use atelier_core::media::MediaItem;
use atelier_core::types::{DbId, Timestamp};
use atelier_db::models::category::Category;
use atelier_db::models::project::Project;
use atelier_db::repositories::{CategoryRepo, ProjectRepo};
use atelier_db::DbPool;
use atelier_events::{CatalogEvent, EventBus};
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};

/// A project as the gallery sees it: order already normalized.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogProject {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub year: i32,
    pub categories: Vec<DbId>,
    pub cover_image: Option<String>,
    pub thumbnail: Option<String>,
    pub media: Vec<MediaItem>,
    /// Manual sort position; the sentinel when the row had none.
    pub order: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Project> for CatalogProject {
    fn from(row: Project) -> Self {
        Self {
            order: normalized_order(row.sort_order),
            id: row.id,
            title: row.title,
            description: row.description,
            year: row.year,
            categories: row.categories,
            cover_image: row.cover_image,
            thumbnail: row.thumbnail,
            media: row.media.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl CatalogEntry for CatalogProject {
    fn sort_order(&self) -> Option<i64> {
        Some(self.order)
    }

    fn category_ids(&self) -> &[DbId] {
        &self.categories
    }
}

/// One consistent view of the catalog.
///
/// `error` carries the readable error state when the last reload failed;
/// the previous data is retained so readers are never left empty-handed
/// by a transient fault.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSnapshot {
    pub projects: Vec<CatalogProject>,
    pub categories: Vec<Category>,
    pub error: Option<String>,
    pub loaded_at: Timestamp,
}

/// Reader over the live catalog.
pub struct CatalogReader {
    snapshot: RwLock<Arc<CatalogSnapshot>>,
    bus: Arc<EventBus>,
}

impl CatalogReader {
    /// Load the initial snapshot and wire the reader to the event bus.
    pub async fn load(pool: &DbPool, bus: Arc<EventBus>) -> Self {
        let snapshot = match load_catalog(pool).await {
            Ok((projects, categories)) => CatalogSnapshot {
                projects,
                categories,
                error: None,
                loaded_at: chrono::Utc::now(),
            },
            Err(e) => {
                tracing::error!(error = %e, "Initial catalog load failed");
                CatalogSnapshot {
                    projects: Vec::new(),
                    categories: Vec::new(),
                    error: Some("Catalog is temporarily unavailable".to_string()),
                    loaded_at: chrono::Utc::now(),
                }
            }
        };

        Self {
            snapshot: RwLock::new(Arc::new(snapshot)),
            bus,
        }
    }

    /// The current snapshot.
    pub async fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.snapshot.read().await.clone()
    }

    /// Subscribe to the catalog: the synchronous current state plus a
    /// stream of change notifications. Dropping the receiver deregisters.
    pub async fn subscribe(&self) -> (Arc<CatalogSnapshot>, broadcast::Receiver<CatalogEvent>) {
        // Subscribe before reading so no event between the two is missed.
        let rx = self.bus.subscribe();
        let snapshot = self.snapshot().await;
        (snapshot, rx)
    }

    /// Reload from the database.
    ///
    /// On failure the previous data is kept and the snapshot's error state
    /// is set; nothing is thrown at readers.
    pub async fn refresh(&self, pool: &DbPool) {
        match load_catalog(pool).await {
            Ok((projects, categories)) => {
                let snapshot = CatalogSnapshot {
                    projects,
                    categories,
                    error: None,
                    loaded_at: chrono::Utc::now(),
                };
                *self.snapshot.write().await = Arc::new(snapshot);
            }
            Err(e) => {
                tracing::error!(error = %e, "Catalog reload failed");
                let mut guard = self.snapshot.write().await;
                let mut stale = (**guard).clone();
                stale.error = Some("Catalog is temporarily unavailable".to_string());
                *guard = Arc::new(stale);
            }
        }
    }
}

/// Spawn the task that keeps the snapshot fresh: every published catalog
/// event triggers a reload, then a notification frame is fanned out to
/// WebSocket clients. Exits when the bus closes (process shutdown).
pub fn spawn_refresher(
    reader: Arc<CatalogReader>,
    pool: DbPool,
    ws_manager: Arc<crate::ws::WsManager>,
) -> tokio::task::JoinHandle<()> {
    let mut rx = reader.bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    reader.refresh(&pool).await;
                    ws_manager.broadcast(crate::ws::update_frame(&event)).await;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Missed events all collapse into one reload.
                    tracing::warn!(skipped, "Catalog refresher lagged; reloading");
                    reader.refresh(&pool).await;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!("Catalog refresher stopped");
    })
}

/// Fetch and normalize both collections.
async fn load_catalog(
    pool: &DbPool,
) -> Result<(Vec<CatalogProject>, Vec<Category>), sqlx::Error> {
    let projects = ProjectRepo::list_ordered(pool).await?;
    let categories = CategoryRepo::list_by_name(pool).await?;
    let projects = projects.into_iter().map(CatalogProject::from).collect();
    Ok((projects, categories))
}

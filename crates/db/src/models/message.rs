//! Contact message entity model.
//!
//! Messages are write-only from the API surface; there is deliberately no
//! list/read DTO here.

use atelier_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A contact form submission from the `messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: Timestamp,
}

/// DTO for recording a submission.
#[derive(Debug, Clone)]
pub struct CreateMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

//! Repository for the `messages` table.
//!
//! Insert-only: the contact form writes here and nothing reads back
//! through the API.

use sqlx::PgPool;

use crate::models::message::{CreateMessage, Message};

/// Provides the contact-intake write path.
pub struct MessageRepo;

impl MessageRepo {
    /// Record a contact form submission.
    pub async fn create(pool: &PgPool, input: &CreateMessage) -> Result<Message, sqlx::Error> {
        sqlx::query_as::<_, Message>(
            "INSERT INTO messages (name, email, message) VALUES ($1, $2, $3) \
             RETURNING id, name, email, message, created_at",
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.message)
        .fetch_one(pool)
        .await
    }
}

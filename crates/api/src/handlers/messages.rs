//! Handler for the contact form intake.
//!
//! Messages are write-only through the API: there is no list or read
//! endpoint, matching the product's "submit and forget" contact box.

use atelier_core::error::CoreError;
use atelier_db::models::message::CreateMessage;
use atelier_db::repositories::MessageRepo;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /messages`.
#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "message must not be empty"))]
    pub message: String,
}

/// POST /api/v1/messages
///
/// Record a contact form submission.
pub async fn submit(
    State(state): State<AppState>,
    Json(input): Json<ContactRequest>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let message = MessageRepo::create(
        &state.pool,
        &CreateMessage {
            name: input.name,
            email: input.email,
            message: input.message,
        },
    )
    .await?;

    tracing::info!(message_id = message.id, "Contact message received");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: serde_json::json!({ "id": message.id }),
        }),
    ))
}

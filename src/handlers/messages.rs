use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{NaiveDateTime, Utc};
use model::entities::message;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for appending a message
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateMessageRequest {
    /// Uid of the sender, when known
    pub sender_uid: Option<String>,
    /// Optional subject line
    pub subject: Option<String>,
    /// Message body
    #[validate(length(min = 1))]
    pub body: String,
}

/// Message response model
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub id: i32,
    pub sender_uid: Option<String>,
    pub subject: Option<String>,
    pub body: String,
    pub created_at: NaiveDateTime,
}

impl From<message::Model> for MessageResponse {
    fn from(model: message::Model) -> Self {
        Self {
            id: model.id,
            sender_uid: model.sender_uid,
            subject: model.subject,
            body: model.body,
            created_at: model.created_at,
        }
    }
}

/// Append a message to the log
///
/// The creation time is stamped server-side; any client-supplied timestamp is
/// ignored.
#[utoipa::path(
    post,
    path = "/api/v1/messages",
    tag = "messages",
    request_body = CreateMessageRequest,
    responses(
        (status = 201, description = "Message created successfully", body = ApiResponse<MessageResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_message(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateMessageRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<MessageResponse>>), StatusCode> {
    let new_message = message::ActiveModel {
        sender_uid: Set(request.sender_uid),
        subject: Set(request.subject),
        body: Set(request.body),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    match new_message.insert(&state.db).await {
        Ok(message_model) => {
            info!("Message {} appended to log", message_model.id);
            let response = ApiResponse {
                data: MessageResponse::from(message_model),
                message: "Message created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create message: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get all messages, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/messages",
    tag = "messages",
    responses(
        (status = 200, description = "Messages retrieved successfully", body = ApiResponse<Vec<MessageResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_messages(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<MessageResponse>>>, StatusCode> {
    match message::Entity::find()
        .order_by_asc(message::Column::CreatedAt)
        .all(&state.db)
        .await
    {
        Ok(messages) => {
            let message_responses: Vec<MessageResponse> =
                messages.into_iter().map(MessageResponse::from).collect();

            let response = ApiResponse {
                data: message_responses,
                message: "Messages retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve messages: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a specific message by ID
#[utoipa::path(
    get,
    path = "/api/v1/messages/{message_id}",
    tag = "messages",
    params(
        ("message_id" = i32, Path, description = "Message ID"),
    ),
    responses(
        (status = 200, description = "Message retrieved successfully", body = ApiResponse<MessageResponse>),
        (status = 404, description = "Message not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_message(
    Path(message_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<MessageResponse>>, StatusCode> {
    match message::Entity::find_by_id(message_id).one(&state.db).await {
        Ok(Some(message_model)) => {
            let response = ApiResponse {
                data: MessageResponse::from(message_model),
                message: "Message retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Ok(None) => {
            warn!("Message with ID {} not found", message_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!("Failed to retrieve message {}: {}", message_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{extract::State, http::StatusCode, response::Json};
use axum_valid::Valid;
use model::entities::upazila;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating an upazila directory entry
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateUpazilaRequest {
    /// Human readable upazila name
    #[validate(length(min = 1))]
    pub upazila_name: String,
    /// Institute code assigned by the directorate
    #[validate(length(min = 1))]
    pub institute_code: String,
    /// Field office code within the institute
    #[validate(length(min = 1))]
    pub field_office_code: String,
}

/// Upazila response model
#[derive(Debug, Serialize, ToSchema)]
pub struct UpazilaResponse {
    pub id: i32,
    pub upazila_name: String,
    pub institute_code: String,
    pub field_office_code: String,
    pub full_office_code: String,
}

impl From<upazila::Model> for UpazilaResponse {
    fn from(model: upazila::Model) -> Self {
        Self {
            id: model.id,
            upazila_name: model.upazila_name,
            institute_code: model.institute_code,
            field_office_code: model.field_office_code,
            full_office_code: model.full_office_code,
        }
    }
}

/// Create an upazila directory entry
///
/// The full office code is derived on insert as institute code followed by
/// field office code.
#[utoipa::path(
    post,
    path = "/api/v1/upazilas",
    tag = "upazilas",
    request_body = CreateUpazilaRequest,
    responses(
        (status = 201, description = "Upazila created successfully", body = ApiResponse<UpazilaResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_upazila(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateUpazilaRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<UpazilaResponse>>), StatusCode> {
    let full_office_code = format!("{}{}", request.institute_code, request.field_office_code);

    let new_upazila = upazila::ActiveModel {
        upazila_name: Set(request.upazila_name),
        institute_code: Set(request.institute_code),
        field_office_code: Set(request.field_office_code),
        full_office_code: Set(full_office_code),
        ..Default::default()
    };

    match new_upazila.insert(&state.db).await {
        Ok(upazila_model) => {
            info!(
                "Upazila created with ID: {}, full office code: {}",
                upazila_model.id, upazila_model.full_office_code
            );
            let response = ApiResponse {
                data: UpazilaResponse::from(upazila_model),
                message: "Upazila created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create upazila: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get all upazila directory entries
#[utoipa::path(
    get,
    path = "/api/v1/upazilas",
    tag = "upazilas",
    responses(
        (status = 200, description = "Upazilas retrieved successfully", body = ApiResponse<Vec<UpazilaResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_upazilas(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UpazilaResponse>>>, StatusCode> {
    match upazila::Entity::find().all(&state.db).await {
        Ok(upazilas) => {
            let upazila_responses: Vec<UpazilaResponse> =
                upazilas.into_iter().map(UpazilaResponse::from).collect();

            let response = ApiResponse {
                data: upazila_responses,
                message: "Upazilas retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve upazilas: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

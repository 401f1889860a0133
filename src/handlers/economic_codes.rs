use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::economic_code;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

/// Request body for creating an economic code
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateEconomicCodeRequest {
    /// Economic classification code (must be unique)
    pub economic_code: String,
    /// Human readable title of the code
    pub code_title: String,
    /// Budget ceiling for the code
    pub total_budget: Decimal,
}

/// Economic code response model
#[derive(Debug, Serialize, ToSchema)]
pub struct EconomicCodeResponse {
    pub id: i32,
    pub economic_code: String,
    pub code_title: String,
    pub total_budget: Decimal,
    pub distributed_budget: Decimal,
}

impl From<economic_code::Model> for EconomicCodeResponse {
    fn from(model: economic_code::Model) -> Self {
        Self {
            id: model.id,
            economic_code: model.economic_code,
            code_title: model.code_title,
            total_budget: model.total_budget,
            distributed_budget: model.distributed_budget,
        }
    }
}

/// Create a new economic code
///
/// The running distributed total always starts at zero; any client-supplied
/// value is ignored.
#[utoipa::path(
    post,
    path = "/api/v1/economic-codes",
    tag = "economic-codes",
    request_body = CreateEconomicCodeRequest,
    responses(
        (status = 201, description = "Economic code created successfully", body = ApiResponse<EconomicCodeResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Economic code already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_economic_code(
    State(state): State<AppState>,
    Json(request): Json<CreateEconomicCodeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EconomicCodeResponse>>), (StatusCode, Json<ErrorResponse>)>
{
    debug!(
        "Creating economic code {} with total budget {}",
        request.economic_code, request.total_budget
    );

    if request.total_budget < Decimal::ZERO {
        warn!(
            "Rejected economic code {} with negative total budget {}",
            request.economic_code, request.total_budget
        );
        let error_response = ErrorResponse {
            error: "Total budget must not be negative".to_string(),
            code: "INVALID_TOTAL_BUDGET".to_string(),
            success: false,
        };
        return Err((StatusCode::BAD_REQUEST, Json(error_response)));
    }

    // Check for a duplicate code
    match economic_code::Entity::find()
        .filter(economic_code::Column::EconomicCode.eq(&request.economic_code))
        .one(&state.db)
        .await
    {
        Ok(Some(_existing)) => {
            warn!(
                "Attempted to create duplicate economic code: {}",
                request.economic_code
            );
            let error_response = ErrorResponse {
                error: format!("Economic code {} already exists", request.economic_code),
                code: "ECONOMIC_CODE_ALREADY_EXISTS".to_string(),
                success: false,
            };
            return Err((StatusCode::CONFLICT, Json(error_response)));
        }
        Ok(None) => {}
        Err(db_error) => {
            error!(
                "Database error while checking economic code {}: {}",
                request.economic_code, db_error
            );
            let error_response = ErrorResponse {
                error: "Database error occurred while checking for duplicates".to_string(),
                code: "DATABASE_ERROR".to_string(),
                success: false,
            };
            return Err((StatusCode::INTERNAL_SERVER_ERROR, Json(error_response)));
        }
    }

    let new_code = economic_code::ActiveModel {
        economic_code: Set(request.economic_code.clone()),
        code_title: Set(request.code_title),
        total_budget: Set(request.total_budget),
        // Initialize distributed budget
        distributed_budget: Set(Decimal::ZERO),
        ..Default::default()
    };

    match new_code.insert(&state.db).await {
        Ok(code_model) => {
            info!(
                "Economic code {} created with ceiling {}",
                code_model.economic_code, code_model.total_budget
            );
            let response = ApiResponse {
                data: EconomicCodeResponse::from(code_model),
                message: "Economic code created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!(
                "Failed to create economic code {}: {}",
                request.economic_code, db_error
            );
            let error_response = ErrorResponse {
                error: "Internal server error while creating economic code".to_string(),
                code: "DATABASE_ERROR".to_string(),
                success: false,
            };
            Err((StatusCode::INTERNAL_SERVER_ERROR, Json(error_response)))
        }
    }
}

/// Get all economic codes
#[utoipa::path(
    get,
    path = "/api/v1/economic-codes",
    tag = "economic-codes",
    responses(
        (status = 200, description = "Economic codes retrieved successfully", body = ApiResponse<Vec<EconomicCodeResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_economic_codes(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<EconomicCodeResponse>>>, StatusCode> {
    match economic_code::Entity::find().all(&state.db).await {
        Ok(codes) => {
            let code_responses: Vec<EconomicCodeResponse> =
                codes.into_iter().map(EconomicCodeResponse::from).collect();

            let response = ApiResponse {
                data: code_responses,
                message: "Economic codes retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve economic codes: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a specific economic code by its code string
#[utoipa::path(
    get,
    path = "/api/v1/economic-codes/{code}",
    tag = "economic-codes",
    params(
        ("code" = String, Path, description = "Economic classification code"),
    ),
    responses(
        (status = 200, description = "Economic code retrieved successfully", body = ApiResponse<EconomicCodeResponse>),
        (status = 404, description = "Economic code not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_economic_code(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<EconomicCodeResponse>>, StatusCode> {
    match economic_code::Entity::find()
        .filter(economic_code::Column::EconomicCode.eq(&code))
        .one(&state.db)
        .await
    {
        Ok(Some(code_model)) => {
            let response = ApiResponse {
                data: EconomicCodeResponse::from(code_model),
                message: "Economic code retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Ok(None) => {
            warn!("Economic code {} not found", code);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!("Failed to retrieve economic code {}: {}", code, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

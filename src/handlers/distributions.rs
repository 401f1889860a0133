use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{extract::State, http::StatusCode, response::Json};
use model::entities::{budget_distribution, economic_code};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

/// Request body for creating a budget distribution
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateDistributionRequest {
    /// Receiving upazila id
    pub upazila_id: i32,
    /// Uid of the user holding the distributed funds
    pub user_uid: String,
    /// Economic code the funds are drawn from
    pub economic_code: String,
    /// Amount to distribute (must be positive)
    pub amount: Decimal,
    /// Optional import key; distributions sharing a serial code are rejected
    pub serial_code: Option<String>,
}

/// Budget distribution response model
#[derive(Debug, Serialize, ToSchema)]
pub struct DistributionResponse {
    pub id: i32,
    pub upazila_id: i32,
    pub user_uid: String,
    pub economic_code: String,
    pub distributed_budget: Decimal,
    pub expense_budget: Decimal,
    pub serial_code: Option<String>,
}

impl From<budget_distribution::Model> for DistributionResponse {
    fn from(model: budget_distribution::Model) -> Self {
        Self {
            id: model.id,
            upazila_id: model.upazila_id,
            user_uid: model.user_uid,
            economic_code: model.economic_code,
            distributed_budget: model.distributed_budget,
            expense_budget: model.expense_budget,
            serial_code: model.serial_code,
        }
    }
}

/// Create a budget distribution, drawing from an economic code's remaining
/// budget.
///
/// The balance check and the increment of the code's running total are a
/// single conditional UPDATE: the increment only applies where
/// `distributed_budget + amount <= total_budget`, so two concurrent
/// distributions can never jointly push a code over its ceiling.
#[utoipa::path(
    post,
    path = "/api/v1/budget-distributions",
    tag = "budget-distributions",
    request_body = CreateDistributionRequest,
    responses(
        (status = 201, description = "Distribution created successfully", body = ApiResponse<DistributionResponse>),
        (status = 400, description = "Invalid amount or budget exceeded", body = ErrorResponse),
        (status = 404, description = "Economic code not found", body = ErrorResponse),
        (status = 409, description = "Duplicate serial code", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_distribution(
    State(state): State<AppState>,
    Json(request): Json<CreateDistributionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DistributionResponse>>), (StatusCode, Json<ErrorResponse>)>
{
    debug!(
        "Creating distribution of {} from code {} to upazila {} (user {})",
        request.amount, request.economic_code, request.upazila_id, request.user_uid
    );

    if request.amount <= Decimal::ZERO {
        warn!("Rejected non-positive distribution amount: {}", request.amount);
        return Err(validation_error(
            "Distribution amount must be positive",
            "INVALID_AMOUNT",
        ));
    }

    // The economic code must exist before we attempt the increment, so the
    // caller can distinguish "unknown code" from "budget exceeded".
    let code_model = match economic_code::Entity::find()
        .filter(economic_code::Column::EconomicCode.eq(&request.economic_code))
        .one(&state.db)
        .await
    {
        Ok(Some(code_model)) => code_model,
        Ok(None) => {
            warn!("Economic code {} not found", request.economic_code);
            let error_response = ErrorResponse {
                error: format!("Economic code {} not found", request.economic_code),
                code: "ECONOMIC_CODE_NOT_FOUND".to_string(),
                success: false,
            };
            return Err((StatusCode::NOT_FOUND, Json(error_response)));
        }
        Err(db_error) => {
            error!(
                "Database error while looking up economic code {}: {}",
                request.economic_code, db_error
            );
            return Err(internal_error());
        }
    };

    // Reject reused serial codes before touching the aggregate
    if let Some(serial_code) = &request.serial_code {
        match budget_distribution::Entity::find()
            .filter(budget_distribution::Column::SerialCode.eq(serial_code))
            .one(&state.db)
            .await
        {
            Ok(Some(_existing)) => {
                warn!("Duplicate serial code on distribution: {}", serial_code);
                let error_response = ErrorResponse {
                    error: format!("Distribution with serial code {} already exists", serial_code),
                    code: "DUPLICATE_SERIAL_CODE".to_string(),
                    success: false,
                };
                return Err((StatusCode::CONFLICT, Json(error_response)));
            }
            Ok(None) => {}
            Err(db_error) => {
                error!(
                    "Database error while checking serial code {}: {}",
                    serial_code, db_error
                );
                return Err(internal_error());
            }
        }
    }

    // Atomic conditional increment: only applies while the new running total
    // stays within the ceiling.
    let update_result = economic_code::Entity::update_many()
        .col_expr(
            economic_code::Column::DistributedBudget,
            Expr::col(economic_code::Column::DistributedBudget).add(request.amount),
        )
        .filter(economic_code::Column::EconomicCode.eq(&request.economic_code))
        .filter(
            Expr::col(economic_code::Column::DistributedBudget)
                .add(request.amount)
                .lte(Expr::col(economic_code::Column::TotalBudget)),
        )
        .exec(&state.db)
        .await;

    match update_result {
        Ok(update) if update.rows_affected == 0 => {
            let remaining = code_model.total_budget - code_model.distributed_budget;
            warn!(
                "Distribution of {} from code {} rejected, remaining budget {}",
                request.amount, request.economic_code, remaining
            );
            return Err(validation_error(
                "Distributed amount exceeds available budget",
                "BUDGET_EXCEEDED",
            ));
        }
        Ok(_) => {
            debug!(
                "Incremented distributed budget of code {} by {}",
                request.economic_code, request.amount
            );
        }
        Err(db_error) => {
            error!(
                "Failed to increment distributed budget of code {}: {}",
                request.economic_code, db_error
            );
            return Err(internal_error());
        }
    }

    // Persist the distribution record itself
    let new_distribution = budget_distribution::ActiveModel {
        upazila_id: Set(request.upazila_id),
        user_uid: Set(request.user_uid.clone()),
        economic_code: Set(request.economic_code.clone()),
        distributed_budget: Set(request.amount),
        expense_budget: Set(Decimal::ZERO),
        serial_code: Set(request.serial_code.clone()),
        ..Default::default()
    };

    match new_distribution.insert(&state.db).await {
        Ok(distribution_model) => {
            info!(
                "Distribution {} created: {} from code {} to upazila {}",
                distribution_model.id,
                distribution_model.distributed_budget,
                distribution_model.economic_code,
                distribution_model.upazila_id
            );
            let response = ApiResponse {
                data: DistributionResponse::from(distribution_model),
                message: "Distribution created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to insert distribution record: {}", db_error);
            Err(internal_error())
        }
    }
}

/// Get all budget distributions
#[utoipa::path(
    get,
    path = "/api/v1/budget-distributions",
    tag = "budget-distributions",
    responses(
        (status = 200, description = "Distributions retrieved successfully", body = ApiResponse<Vec<DistributionResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_distributions(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<DistributionResponse>>>, StatusCode> {
    match budget_distribution::Entity::find().all(&state.db).await {
        Ok(distributions) => {
            let distribution_responses: Vec<DistributionResponse> = distributions
                .into_iter()
                .map(DistributionResponse::from)
                .collect();

            let response = ApiResponse {
                data: distribution_responses,
                message: "Distributions retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve distributions: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn validation_error(message: &str, code: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
            code: code.to_string(),
            success: false,
        }),
    )
}

fn internal_error() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal server error".to_string(),
            code: "DATABASE_ERROR".to_string(),
            success: false,
        }),
    )
}

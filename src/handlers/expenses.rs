use crate::handlers::distributions::DistributionResponse;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::budget_distribution;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

/// Request body for recording an expense against a distribution
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RecordExpenseRequest {
    /// Uid of the user holding the distribution
    pub uid: String,
    /// Economic code of the distribution to charge
    pub economic_code: String,
    /// Expense amount (must be positive)
    pub expense_amount: Decimal,
}

/// Get the distributions held by a user, with their expense totals
#[utoipa::path(
    get,
    path = "/api/v1/users/{uid}/expenses",
    tag = "expenses",
    params(
        ("uid" = String, Path, description = "External user uid"),
    ),
    responses(
        (status = 200, description = "Expenses retrieved successfully", body = ApiResponse<Vec<DistributionResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_user_expenses(
    Path(uid): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<DistributionResponse>>>, StatusCode> {
    match budget_distribution::Entity::find()
        .filter(budget_distribution::Column::UserUid.eq(&uid))
        .all(&state.db)
        .await
    {
        Ok(distributions) => {
            debug!(
                "Retrieved {} distribution(s) for uid {}",
                distributions.len(),
                uid
            );
            let responses: Vec<DistributionResponse> = distributions
                .into_iter()
                .map(DistributionResponse::from)
                .collect();

            Ok(Json(ApiResponse {
                data: responses,
                message: "Expenses retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to retrieve expenses for uid {}: {}", uid, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Record an expense against a user's distribution.
///
/// The remaining-balance check and the increment of `expense_budget` are a
/// single conditional UPDATE applied only where
/// `expense_budget + expense_amount <= distributed_budget`.
#[utoipa::path(
    post,
    path = "/api/v1/expenses",
    tag = "expenses",
    request_body = RecordExpenseRequest,
    responses(
        (status = 200, description = "Expense recorded successfully", body = ApiResponse<DistributionResponse>),
        (status = 400, description = "Invalid amount or expense exceeds remaining budget", body = ErrorResponse),
        (status = 404, description = "Budget distribution not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn record_expense(
    State(state): State<AppState>,
    Json(request): Json<RecordExpenseRequest>,
) -> Result<Json<ApiResponse<DistributionResponse>>, (StatusCode, Json<ErrorResponse>)> {
    debug!(
        "Recording expense of {} against code {} for uid {}",
        request.expense_amount, request.economic_code, request.uid
    );

    if request.expense_amount <= Decimal::ZERO {
        warn!("Rejected non-positive expense amount: {}", request.expense_amount);
        let error_response = ErrorResponse {
            error: "Expense amount must be positive".to_string(),
            code: "INVALID_AMOUNT".to_string(),
            success: false,
        };
        return Err((StatusCode::BAD_REQUEST, Json(error_response)));
    }

    // The distribution must exist so the caller can distinguish "no such
    // distribution" from "over the remaining budget".
    let distribution = match find_distribution(&state, &request.uid, &request.economic_code).await {
        Ok(Some(distribution)) => distribution,
        Ok(None) => {
            warn!(
                "No distribution for uid {} and code {}",
                request.uid, request.economic_code
            );
            let error_response = ErrorResponse {
                error: "Budget distribution not found".to_string(),
                code: "DISTRIBUTION_NOT_FOUND".to_string(),
                success: false,
            };
            return Err((StatusCode::NOT_FOUND, Json(error_response)));
        }
        Err(db_error) => {
            error!("Failed to look up distribution: {}", db_error);
            return Err(internal_error());
        }
    };

    let update_result = budget_distribution::Entity::update_many()
        .col_expr(
            budget_distribution::Column::ExpenseBudget,
            Expr::col(budget_distribution::Column::ExpenseBudget).add(request.expense_amount),
        )
        .filter(budget_distribution::Column::Id.eq(distribution.id))
        .filter(
            Expr::col(budget_distribution::Column::ExpenseBudget)
                .add(request.expense_amount)
                .lte(Expr::col(budget_distribution::Column::DistributedBudget)),
        )
        .exec(&state.db)
        .await;

    match update_result {
        Ok(update) if update.rows_affected == 0 => {
            let remaining = distribution.distributed_budget - distribution.expense_budget;
            warn!(
                "Expense of {} rejected for uid {}, remaining budget {}",
                request.expense_amount, request.uid, remaining
            );
            let error_response = ErrorResponse {
                error: "Expense amount exceeds remaining budget".to_string(),
                code: "EXPENSE_EXCEEDED".to_string(),
                success: false,
            };
            return Err((StatusCode::BAD_REQUEST, Json(error_response)));
        }
        Ok(_) => {}
        Err(db_error) => {
            error!("Failed to record expense: {}", db_error);
            return Err(internal_error());
        }
    }

    // Return the updated distribution
    match budget_distribution::Entity::find_by_id(distribution.id)
        .one(&state.db)
        .await
    {
        Ok(Some(updated)) => {
            info!(
                "Expense of {} recorded against distribution {} (uid {})",
                request.expense_amount, updated.id, request.uid
            );
            Ok(Json(ApiResponse {
                data: DistributionResponse::from(updated),
                message: "Expense added successfully".to_string(),
                success: true,
            }))
        }
        Ok(None) => {
            // Deleted between the update and the read-back; surface as a store failure
            error!("Distribution vanished after expense update");
            Err(internal_error())
        }
        Err(db_error) => {
            error!("Failed to reload distribution: {}", db_error);
            Err(internal_error())
        }
    }
}

async fn find_distribution(
    state: &AppState,
    uid: &str,
    economic_code: &str,
) -> Result<Option<budget_distribution::Model>, sea_orm::DbErr> {
    budget_distribution::Entity::find()
        .filter(budget_distribution::Column::UserUid.eq(uid))
        .filter(budget_distribution::Column::EconomicCode.eq(economic_code))
        .one(&state.db)
        .await
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

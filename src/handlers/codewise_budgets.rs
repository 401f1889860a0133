use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::{codewise_allocation, codewise_budget};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

/// One incoming allocation pair
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AllocationInput {
    /// Economic classification code
    pub economic_code: String,
    /// Amount to add for that code (must be positive)
    pub amount: Decimal,
}

/// Request body for the codewise ledger upsert
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpsertCodewiseBudgetRequest {
    /// Upazila the ledger belongs to
    pub upazila_id: i32,
    /// Upazila display name, stored on first allocation
    pub upazila_name: String,
    /// Allocation pairs to merge into the ledger
    pub allocations: Vec<AllocationInput>,
}

/// One stored allocation entry
#[derive(Debug, Serialize, ToSchema)]
pub struct AllocationEntry {
    pub economic_code: String,
    pub amount: Decimal,
}

/// Codewise ledger response model
#[derive(Debug, Serialize, ToSchema)]
pub struct CodewiseBudgetResponse {
    pub id: i32,
    pub upazila_id: i32,
    pub upazila_name: String,
    pub allocations: Vec<AllocationEntry>,
}

impl From<codewise_allocation::Model> for AllocationEntry {
    fn from(model: codewise_allocation::Model) -> Self {
        Self {
            economic_code: model.economic_code,
            amount: model.amount,
        }
    }
}

fn budget_response(
    budget: codewise_budget::Model,
    allocations: Vec<codewise_allocation::Model>,
) -> CodewiseBudgetResponse {
    CodewiseBudgetResponse {
        id: budget.id,
        upazila_id: budget.upazila_id,
        upazila_name: budget.upazila_name,
        allocations: allocations.into_iter().map(AllocationEntry::from).collect(),
    }
}

/// Merge allocation pairs into an upazila's codewise ledger.
///
/// The ledger is created lazily on the first allocation. For every incoming
/// pair, an existing entry with the same economic code is incremented in
/// place; an unseen code is appended. The ledger therefore always holds
/// exactly one entry per distinct code, carrying the running sum of all
/// allocations ever applied.
#[utoipa::path(
    post,
    path = "/api/v1/codewise-budgets",
    tag = "codewise-budgets",
    request_body = UpsertCodewiseBudgetRequest,
    responses(
        (status = 200, description = "Ledger updated", body = ApiResponse<CodewiseBudgetResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn upsert_codewise_budget(
    State(state): State<AppState>,
    Json(request): Json<UpsertCodewiseBudgetRequest>,
) -> Result<Json<ApiResponse<CodewiseBudgetResponse>>, (StatusCode, Json<ErrorResponse>)> {
    debug!(
        "Merging {} allocation pair(s) into ledger of upazila {}",
        request.allocations.len(),
        request.upazila_id
    );

    if request.upazila_name.trim().is_empty() {
        return Err(validation_error("Upazila name is required", "MISSING_UPAZILA_NAME"));
    }
    if request.allocations.is_empty() {
        return Err(validation_error(
            "At least one allocation pair is required",
            "MISSING_ALLOCATIONS",
        ));
    }
    if request
        .allocations
        .iter()
        .any(|allocation| allocation.amount <= Decimal::ZERO)
    {
        warn!("Rejected allocation batch containing a non-positive amount");
        return Err(validation_error(
            "Allocation amounts must be positive",
            "INVALID_AMOUNT",
        ));
    }

    // Collapse duplicate codes inside the request so a single batch never
    // produces two rows for the same code. First-seen order is kept.
    let mut merged: Vec<(String, Decimal)> = Vec::new();
    for allocation in &request.allocations {
        match merged
            .iter_mut()
            .find(|(code, _)| *code == allocation.economic_code)
        {
            Some((_, amount)) => *amount += allocation.amount,
            None => merged.push((allocation.economic_code.clone(), allocation.amount)),
        }
    }

    let existing = match codewise_budget::Entity::find()
        .filter(codewise_budget::Column::UpazilaId.eq(request.upazila_id))
        .one(&state.db)
        .await
    {
        Ok(existing) => existing,
        Err(db_error) => {
            error!(
                "Failed to look up ledger for upazila {}: {}",
                request.upazila_id, db_error
            );
            return Err(internal_error());
        }
    };

    let budget = match existing {
        Some(budget) => budget,
        None => {
            debug!("Creating ledger for upazila {}", request.upazila_id);
            let new_budget = codewise_budget::ActiveModel {
                upazila_id: Set(request.upazila_id),
                upazila_name: Set(request.upazila_name.clone()),
                ..Default::default()
            };
            match new_budget.insert(&state.db).await {
                Ok(budget) => budget,
                Err(db_error) => {
                    error!(
                        "Failed to create ledger for upazila {}: {}",
                        request.upazila_id, db_error
                    );
                    return Err(internal_error());
                }
            }
        }
    };

    for (economic_code, amount) in merged {
        // Increment in place when the code already has an entry
        let update_result = codewise_allocation::Entity::update_many()
            .col_expr(
                codewise_allocation::Column::Amount,
                Expr::col(codewise_allocation::Column::Amount).add(amount),
            )
            .filter(codewise_allocation::Column::BudgetId.eq(budget.id))
            .filter(codewise_allocation::Column::EconomicCode.eq(&economic_code))
            .exec(&state.db)
            .await;

        match update_result {
            Ok(update) if update.rows_affected > 0 => {
                debug!(
                    "Incremented allocation for code {} on ledger {} by {}",
                    economic_code, budget.id, amount
                );
                continue;
            }
            Ok(_) => {}
            Err(db_error) => {
                error!(
                    "Failed to increment allocation for code {}: {}",
                    economic_code, db_error
                );
                return Err(internal_error());
            }
        }

        // Unseen code: append a new entry
        let new_allocation = codewise_allocation::ActiveModel {
            budget_id: Set(budget.id),
            economic_code: Set(economic_code.clone()),
            amount: Set(amount),
            ..Default::default()
        };
        if let Err(db_error) = new_allocation.insert(&state.db).await {
            error!(
                "Failed to append allocation for code {}: {}",
                economic_code, db_error
            );
            return Err(internal_error());
        }
        debug!(
            "Appended allocation entry for code {} on ledger {}",
            economic_code, budget.id
        );
    }

    // Return the merged ledger state
    let allocations = match codewise_allocation::Entity::find()
        .filter(codewise_allocation::Column::BudgetId.eq(budget.id))
        .order_by_asc(codewise_allocation::Column::Id)
        .all(&state.db)
        .await
    {
        Ok(allocations) => allocations,
        Err(db_error) => {
            error!("Failed to reload ledger {}: {}", budget.id, db_error);
            return Err(internal_error());
        }
    };

    info!(
        "Ledger of upazila {} now holds {} allocation entries",
        budget.upazila_id,
        allocations.len()
    );
    Ok(Json(ApiResponse {
        data: budget_response(budget, allocations),
        message: "Codewise budget updated successfully".to_string(),
        success: true,
    }))
}

/// Get all codewise ledgers
#[utoipa::path(
    get,
    path = "/api/v1/codewise-budgets",
    tag = "codewise-budgets",
    responses(
        (status = 200, description = "Ledgers retrieved successfully", body = ApiResponse<Vec<CodewiseBudgetResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_codewise_budgets(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CodewiseBudgetResponse>>>, StatusCode> {
    match codewise_budget::Entity::find()
        .find_with_related(codewise_allocation::Entity)
        .all(&state.db)
        .await
    {
        Ok(budgets) => {
            let responses: Vec<CodewiseBudgetResponse> = budgets
                .into_iter()
                .map(|(budget, allocations)| budget_response(budget, allocations))
                .collect();

            Ok(Json(ApiResponse {
                data: responses,
                message: "Codewise budgets retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to retrieve codewise budgets: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get the codewise ledger of one upazila
#[utoipa::path(
    get,
    path = "/api/v1/codewise-budgets/{upazila_id}",
    tag = "codewise-budgets",
    params(
        ("upazila_id" = i32, Path, description = "Upazila ID"),
    ),
    responses(
        (status = 200, description = "Ledger retrieved successfully", body = ApiResponse<CodewiseBudgetResponse>),
        (status = 404, description = "No ledger for that upazila", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_codewise_budget(
    Path(upazila_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CodewiseBudgetResponse>>, StatusCode> {
    let budget = match codewise_budget::Entity::find()
        .filter(codewise_budget::Column::UpazilaId.eq(upazila_id))
        .one(&state.db)
        .await
    {
        Ok(Some(budget)) => budget,
        Ok(None) => {
            warn!("No codewise ledger for upazila {}", upazila_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve ledger for upazila {}: {}",
                upazila_id, db_error
            );
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    match codewise_allocation::Entity::find()
        .filter(codewise_allocation::Column::BudgetId.eq(budget.id))
        .order_by_asc(codewise_allocation::Column::Id)
        .all(&state.db)
        .await
    {
        Ok(allocations) => Ok(Json(ApiResponse {
            data: budget_response(budget, allocations),
            message: "Codewise budget retrieved successfully".to_string(),
            success: true,
        })),
        Err(db_error) => {
            error!("Failed to load allocations: {}", db_error);
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

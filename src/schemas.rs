use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::users::create_user,
        crate::handlers::users::get_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::upazilas::create_upazila,
        crate::handlers::upazilas::get_upazilas,
        crate::handlers::economic_codes::create_economic_code,
        crate::handlers::economic_codes::get_economic_codes,
        crate::handlers::economic_codes::get_economic_code,
        crate::handlers::distributions::create_distribution,
        crate::handlers::distributions::get_distributions,
        crate::handlers::codewise_budgets::upsert_codewise_budget,
        crate::handlers::codewise_budgets::get_codewise_budgets,
        crate::handlers::codewise_budgets::get_codewise_budget,
        crate::handlers::expenses::get_user_expenses,
        crate::handlers::expenses::record_expense,
        crate::handlers::messages::create_message,
        crate::handlers::messages::get_messages,
        crate::handlers::messages::get_message,
        crate::handlers::imports::import_distributions,
    ),
    components(
        schemas(
            ApiResponse<crate::handlers::users::UserResponse>,
            ApiResponse<Vec<crate::handlers::users::UserResponse>>,
            ApiResponse<crate::handlers::users::DeleteUserResponse>,
            ApiResponse<Vec<crate::handlers::upazilas::UpazilaResponse>>,
            ApiResponse<Vec<crate::handlers::economic_codes::EconomicCodeResponse>>,
            ApiResponse<Vec<crate::handlers::distributions::DistributionResponse>>,
            ApiResponse<crate::handlers::codewise_budgets::CodewiseBudgetResponse>,
            ApiResponse<Vec<crate::handlers::messages::MessageResponse>>,
            ApiResponse<crate::handlers::imports::ImportSummary>,
            ErrorResponse,
            HealthResponse,
            crate::handlers::users::CreateUserRequest,
            crate::handlers::users::UpdateUserRequest,
            crate::handlers::users::UserResponse,
            crate::handlers::users::DeleteUserResponse,
            crate::handlers::upazilas::CreateUpazilaRequest,
            crate::handlers::upazilas::UpazilaResponse,
            crate::handlers::economic_codes::CreateEconomicCodeRequest,
            crate::handlers::economic_codes::EconomicCodeResponse,
            crate::handlers::distributions::CreateDistributionRequest,
            crate::handlers::distributions::DistributionResponse,
            crate::handlers::codewise_budgets::UpsertCodewiseBudgetRequest,
            crate::handlers::codewise_budgets::AllocationInput,
            crate::handlers::codewise_budgets::AllocationEntry,
            crate::handlers::codewise_budgets::CodewiseBudgetResponse,
            crate::handlers::expenses::RecordExpenseRequest,
            crate::handlers::messages::CreateMessageRequest,
            crate::handlers::messages::MessageResponse,
            crate::handlers::imports::ImportSummary,
            crate::handlers::imports::ImportRowError,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User directory endpoints"),
        (name = "upazilas", description = "Upazila office directory endpoints"),
        (name = "economic-codes", description = "Economic code endpoints"),
        (name = "budget-distributions", description = "Balance-checked budget distribution endpoints"),
        (name = "codewise-budgets", description = "Per-upazila codewise allocation ledger endpoints"),
        (name = "expenses", description = "Expense tracking endpoints"),
        (name = "messages", description = "Message log endpoints"),
        (name = "imports", description = "Bulk import endpoints"),
    ),
    info(
        title = "Budget Manager API",
        description = "Budget ledger service tracking allocation of government funds across upazilas, economic codes and users",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;

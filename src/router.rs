use crate::handlers::{
    codewise_budgets::{get_codewise_budget, get_codewise_budgets, upsert_codewise_budget},
    distributions::{create_distribution, get_distributions},
    economic_codes::{create_economic_code, get_economic_code, get_economic_codes},
    expenses::{get_user_expenses, record_expense},
    health::health_check,
    imports::import_distributions,
    messages::{create_message, get_message, get_messages},
    upazilas::{create_upazila, get_upazilas},
    users::{create_user, delete_user, get_user, get_users, update_user},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // User CRUD routes
        .route("/api/v1/users", post(create_user))
        .route("/api/v1/users", get(get_users))
        .route("/api/v1/users/:uid", get(get_user))
        .route("/api/v1/users/:uid", put(update_user))
        .route("/api/v1/users/:uid", delete(delete_user))
        // Upazila directory routes
        .route("/api/v1/upazilas", post(create_upazila))
        .route("/api/v1/upazilas", get(get_upazilas))
        // Economic code routes
        .route("/api/v1/economic-codes", post(create_economic_code))
        .route("/api/v1/economic-codes", get(get_economic_codes))
        .route("/api/v1/economic-codes/:code", get(get_economic_code))
        // Balance-checked distribution routes
        .route("/api/v1/budget-distributions", post(create_distribution))
        .route("/api/v1/budget-distributions", get(get_distributions))
        // Codewise ledger routes
        .route("/api/v1/codewise-budgets", post(upsert_codewise_budget))
        .route("/api/v1/codewise-budgets", get(get_codewise_budgets))
        .route("/api/v1/codewise-budgets/:upazila_id", get(get_codewise_budget))
        // Expense routes
        .route("/api/v1/users/:uid/expenses", get(get_user_expenses))
        .route("/api/v1/expenses", post(record_expense))
        // Message log routes
        .route("/api/v1/messages", post(create_message))
        .route("/api/v1/messages", get(get_messages))
        .route("/api/v1/messages/:message_id", get(get_message))
        // Bulk import routes
        .route("/api/v1/imports/distributions", post(import_distributions))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(crate::config::cors_layer()),
        )
        .with_state(state)
}

use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::user;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for creating a new user
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateUserRequest {
    /// External auth provider uid (must be unique)
    pub uid: String,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Role, either "admin" or "user" (default: "user")
    pub role: Option<String>,
    /// Profile photo URL
    pub photo_url: Option<String>,
}

/// Request body for updating a user
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateUserRequest {
    /// Display name
    pub name: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Role, either "admin" or "user"
    pub role: Option<String>,
    /// Profile photo URL
    pub photo_url: Option<String>,
}

/// User response model
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub uid: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub photo_url: Option<String>,
}

/// Result of a user deletion
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteUserResponse {
    /// Number of records removed (0 when the uid was unknown)
    pub deleted_count: u64,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            uid: model.uid,
            name: model.name,
            email: model.email,
            role: model.role,
            photo_url: model.photo_url,
        }
    }
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<UserResponse>),
        (status = 409, description = "Uid already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_user function");
    debug!("Creating user with uid: {}", request.uid);

    // Check for an already registered uid
    trace!("Checking for duplicate uid: {}", request.uid);
    match user::Entity::find()
        .filter(user::Column::Uid.eq(&request.uid))
        .one(&state.db)
        .await
    {
        Ok(Some(_existing)) => {
            warn!("Attempted to create user with duplicate uid: {}", request.uid);
            let error_response = ErrorResponse {
                error: format!("User with uid {} already exists", request.uid),
                code: "USER_ALREADY_EXISTS".to_string(),
                success: false,
            };
            return Err((StatusCode::CONFLICT, Json(error_response)));
        }
        Ok(None) => {
            debug!("Uid {} is unique", request.uid);
        }
        Err(db_error) => {
            error!(
                "Database error while checking uid {}: {}",
                request.uid, db_error
            );
            let error_response = ErrorResponse {
                error: "Database error occurred while checking for duplicates".to_string(),
                code: "DATABASE_ERROR".to_string(),
                success: false,
            };
            return Err((StatusCode::INTERNAL_SERVER_ERROR, Json(error_response)));
        }
    }

    let new_user = user::ActiveModel {
        uid: Set(request.uid.clone()),
        name: Set(request.name),
        email: Set(request.email),
        role: Set(request.role.unwrap_or_else(|| "user".to_string())),
        photo_url: Set(request.photo_url),
        ..Default::default()
    };

    trace!("Attempting to insert new user into database");
    match new_user.insert(&state.db).await {
        Ok(user_model) => {
            info!(
                "User created successfully with ID: {}, uid: {}",
                user_model.id, user_model.uid
            );
            let response = ApiResponse {
                data: UserResponse::from(user_model),
                message: "User created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create user '{}': {}", request.uid, db_error);
            let error_response = ErrorResponse {
                error: "Internal server error while creating user".to_string(),
                code: "DATABASE_ERROR".to_string(),
                success: false,
            };
            Err((StatusCode::INTERNAL_SERVER_ERROR, Json(error_response)))
        }
    }
}

/// Get all users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Vec<UserResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, StatusCode> {
    trace!("Entering get_users function");
    debug!("Fetching all users from database");

    match user::Entity::find().all(&state.db).await {
        Ok(users) => {
            let user_count = users.len();
            debug!("Retrieved {} users from database", user_count);

            let user_responses: Vec<UserResponse> =
                users.into_iter().map(UserResponse::from).collect();

            info!("Successfully retrieved {} users", user_count);
            let response = ApiResponse {
                data: user_responses,
                message: "Users retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve users from database: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a specific user by uid
#[utoipa::path(
    get,
    path = "/api/v1/users/{uid}",
    tag = "users",
    params(
        ("uid" = String, Path, description = "External user uid"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_user(
    Path(uid): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserResponse>>, StatusCode> {
    trace!("Entering get_user function for uid: {}", uid);
    debug!("Fetching user with uid: {}", uid);

    match user::Entity::find()
        .filter(user::Column::Uid.eq(&uid))
        .one(&state.db)
        .await
    {
        Ok(Some(user_model)) => {
            info!(
                "Successfully retrieved user with ID: {}, uid: {}",
                user_model.id, user_model.uid
            );
            let response = ApiResponse {
                data: UserResponse::from(user_model),
                message: "User retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Ok(None) => {
            warn!("User with uid {} not found", uid);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!("Failed to retrieve user with uid {}: {}", uid, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Update a user
#[utoipa::path(
    put,
    path = "/api/v1/users/{uid}",
    tag = "users",
    params(
        ("uid" = String, Path, description = "External user uid"),
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_user(
    Path(uid): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, StatusCode> {
    trace!("Entering update_user function for uid: {}", uid);
    debug!("Updating user with uid: {}", uid);

    // First, find the existing user
    trace!("Looking up existing user with uid: {}", uid);
    let existing_user = match user::Entity::find()
        .filter(user::Column::Uid.eq(&uid))
        .one(&state.db)
        .await
    {
        Ok(Some(user)) => {
            debug!("Found existing user: {}", user.name);
            user
        }
        Ok(None) => {
            warn!("User with uid {} not found for update", uid);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!(
                "Failed to lookup user with uid {} for update: {}",
                uid, db_error
            );
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    // Create active model for update
    let mut user_active: user::ActiveModel = existing_user.into();

    // Update only provided fields
    if let Some(name) = request.name {
        debug!("Updating name to: {}", name);
        user_active.name = Set(name);
    }
    if let Some(email) = request.email {
        debug!("Updating email to: {}", email);
        user_active.email = Set(email);
    }
    if let Some(role) = request.role {
        debug!("Updating role to: {}", role);
        user_active.role = Set(role);
    }
    if let Some(photo_url) = request.photo_url {
        user_active.photo_url = Set(Some(photo_url));
    }

    trace!("Attempting to update user in database");
    match user_active.update(&state.db).await {
        Ok(updated_user) => {
            info!("User with uid {} updated successfully", uid);
            let response = ApiResponse {
                data: UserResponse::from(updated_user),
                message: "User updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to update user with uid {}: {}", uid, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Delete a user
///
/// Deleting an unknown uid is not an error; the response carries the number
/// of records actually removed.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{uid}",
    tag = "users",
    params(
        ("uid" = String, Path, description = "External user uid"),
    ),
    responses(
        (status = 200, description = "Deletion performed", body = ApiResponse<DeleteUserResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_user(
    Path(uid): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DeleteUserResponse>>, StatusCode> {
    trace!("Entering delete_user function for uid: {}", uid);
    debug!("Attempting to delete user with uid: {}", uid);

    match user::Entity::delete_many()
        .filter(user::Column::Uid.eq(&uid))
        .exec(&state.db)
        .await
    {
        Ok(delete_result) => {
            debug!(
                "Delete operation completed. Rows affected: {}",
                delete_result.rows_affected
            );
            if delete_result.rows_affected > 0 {
                info!("User with uid {} deleted successfully", uid);
            } else {
                warn!("User with uid {} not found for deletion (no rows affected)", uid);
            }
            let response = ApiResponse {
                data: DeleteUserResponse {
                    deleted_count: delete_result.rows_affected,
                },
                message: "User deletion performed".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to delete user with uid {}: {}", uid, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

use crate::user::{NewUser, User, UserService, UserServiceError, UserUpdate};
use crate::web::extract::{EntityId, JsonBody};
use crate::web::{ApiError, ApiResponse, AppState, StatusResponse};
use axum::{Json, Router, extract::State, routing::get};

impl From<UserServiceError> for ApiError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::UserNotFound(_) => ApiError::NotFound("User"),
            UserServiceError::InvalidDepartmentIds => ApiError::InvalidDepartmentIds,
            UserServiceError::PasswordHash(err) => ApiError::Store(err.to_string()),
            UserServiceError::Database(err) => ApiError::Store(err.to_string()),
        }
    }
}

/// Handler for GET /users - Returns all users with their departments.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Envelope with all users in `data`", body = [User]),
        (status = 500, description = "Store error", body = StatusResponse)
    ),
    tag = "Users"
)]
pub async fn get_users_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let users = UserService::new(&state.db, state.hasher.clone())
        .get_all_users()
        .await?;
    Ok(Json(ApiResponse::success("Users successfully retrieved", users)))
}

/// Handler for POST /users - Creates a user and assigns the requested departments.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/users",
    request_body = NewUser,
    responses(
        (status = 200, description = "Envelope with the created user in `data`", body = User),
        (status = 400, description = "Invalid input or department IDs", body = StatusResponse),
        (status = 500, description = "Store error, e.g. duplicate email", body = StatusResponse)
    ),
    tag = "Users"
)]
pub async fn create_user_handler(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewUser>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = UserService::new(&state.db, state.hasher.clone())
        .create_user(payload)
        .await?;
    Ok(Json(ApiResponse::success("User successfully created", user)))
}

/// Handler for GET /users/{id} - Returns a user with their departments.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Envelope with the user in `data`", body = User),
        (status = 400, description = "Invalid ID", body = StatusResponse),
        (status = 404, description = "User not found", body = StatusResponse)
    ),
    tag = "Users"
)]
pub async fn get_user_handler(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = UserService::new(&state.db, state.hasher.clone())
        .get_user_by_id(id)
        .await?;
    Ok(Json(ApiResponse::success("User successfully retrieved", user)))
}

/// Handler for PUT /users/{id} - Overwrites the fields present in the body.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "Envelope with the updated user in `data`", body = User),
        (status = 400, description = "Invalid ID, input or department IDs", body = StatusResponse),
        (status = 404, description = "User not found", body = StatusResponse),
        (status = 500, description = "Store error", body = StatusResponse)
    ),
    tag = "Users"
)]
pub async fn update_user_handler(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    payload: Result<JsonBody<UserUpdate>, ApiError>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user_service = UserService::new(&state.db, state.hasher.clone());
    // A missing record wins over a malformed body.
    let JsonBody(changes) = match payload {
        Ok(body) => body,
        Err(err) => {
            user_service.get_user_by_id(id).await?;
            return Err(err);
        }
    };
    let user = user_service.update_user_by_id(id, changes).await?;
    Ok(Json(ApiResponse::success("User successfully updated", user)))
}

/// Handler for DELETE /users/{id} - Soft-deletes a user and their shifts.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = StatusResponse),
        (status = 400, description = "Invalid ID", body = StatusResponse),
        (status = 500, description = "Store error", body = StatusResponse)
    ),
    tag = "Users"
)]
pub async fn delete_user_handler(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    UserService::new(&state.db, state.hasher.clone())
        .delete_user_by_id(id)
        .await?;
    Ok(Json(ApiResponse::message("User successfully deleted")))
}

/// Creates and returns the users router.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .route("/users", get(get_users_handler).post(create_user_handler))
        .route(
            "/users/{id}",
            get(get_user_handler)
                .put(update_user_handler)
                .delete(delete_user_handler),
        )
        .with_state(state)
}

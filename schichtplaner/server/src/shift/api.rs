use crate::shift::{NewShift, Shift, ShiftService, ShiftServiceError, ShiftUpdate};
use crate::web::extract::{EntityId, JsonBody};
use crate::web::{ApiError, ApiResponse, AppState, StatusResponse};
use axum::{Json, Router, extract::State, routing::get};

impl From<ShiftServiceError> for ApiError {
    fn from(err: ShiftServiceError) -> Self {
        match err {
            ShiftServiceError::ShiftNotFound(_) => ApiError::NotFound("Shift"),
            ShiftServiceError::UserNotFound(_) => ApiError::InvalidUserId,
            ShiftServiceError::InvalidTimeRange => ApiError::InvalidInput,
            ShiftServiceError::Database(err) => ApiError::Store(err.to_string()),
        }
    }
}

/// Handler for GET /shifts - Returns all shifts ordered by start time.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/shifts",
    responses(
        (status = 200, description = "Envelope with all shifts in `data`", body = [Shift]),
        (status = 500, description = "Store error", body = StatusResponse)
    ),
    tag = "Shifts"
)]
pub async fn get_shifts_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Shift>>>, ApiError> {
    let shifts = ShiftService::new(&state.db).get_all_shifts().await?;
    Ok(Json(ApiResponse::success(
        "Shifts successfully retrieved",
        shifts,
    )))
}

/// Handler for POST /shifts - Creates a shift.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/shifts",
    request_body = NewShift,
    responses(
        (status = 200, description = "Envelope with the created shift in `data`", body = Shift),
        (status = 400, description = "Invalid input or user ID", body = StatusResponse),
        (status = 500, description = "Store error", body = StatusResponse)
    ),
    tag = "Shifts"
)]
pub async fn create_shift_handler(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewShift>,
) -> Result<Json<ApiResponse<Shift>>, ApiError> {
    let shift = ShiftService::new(&state.db).create_shift(payload).await?;
    Ok(Json(ApiResponse::success("Shift successfully created", shift)))
}

/// Handler for GET /shifts/{id} - Returns a single shift.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/shifts/{id}",
    params(("id" = i32, Path, description = "Shift ID")),
    responses(
        (status = 200, description = "Envelope with the shift in `data`", body = Shift),
        (status = 400, description = "Invalid ID", body = StatusResponse),
        (status = 404, description = "Shift not found", body = StatusResponse)
    ),
    tag = "Shifts"
)]
pub async fn get_shift_handler(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<ApiResponse<Shift>>, ApiError> {
    let shift = ShiftService::new(&state.db).get_shift_by_id(id).await?;
    Ok(Json(ApiResponse::success(
        "Shift successfully retrieved",
        shift,
    )))
}

/// Handler for PUT /shifts/{id} - Overwrites the fields present in the body.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    put,
    path = "/shifts/{id}",
    params(("id" = i32, Path, description = "Shift ID")),
    request_body = ShiftUpdate,
    responses(
        (status = 200, description = "Envelope with the updated shift in `data`", body = Shift),
        (status = 400, description = "Invalid ID, input or user ID", body = StatusResponse),
        (status = 404, description = "Shift not found", body = StatusResponse),
        (status = 500, description = "Store error", body = StatusResponse)
    ),
    tag = "Shifts"
)]
pub async fn update_shift_handler(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    payload: Result<JsonBody<ShiftUpdate>, ApiError>,
) -> Result<Json<ApiResponse<Shift>>, ApiError> {
    let shift_service = ShiftService::new(&state.db);
    // A missing record wins over a malformed body.
    let JsonBody(changes) = match payload {
        Ok(body) => body,
        Err(err) => {
            shift_service.get_shift_by_id(id).await?;
            return Err(err);
        }
    };
    let shift = shift_service.update_shift_by_id(id, changes).await?;
    Ok(Json(ApiResponse::success("Shift successfully updated", shift)))
}

/// Handler for DELETE /shifts/{id} - Soft-deletes a shift.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/shifts/{id}",
    params(("id" = i32, Path, description = "Shift ID")),
    responses(
        (status = 200, description = "Shift deleted", body = StatusResponse),
        (status = 400, description = "Invalid ID", body = StatusResponse),
        (status = 500, description = "Store error", body = StatusResponse)
    ),
    tag = "Shifts"
)]
pub async fn delete_shift_handler(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    ShiftService::new(&state.db).delete_shift_by_id(id).await?;
    Ok(Json(ApiResponse::message("Shift successfully deleted")))
}

/// Creates and returns the shifts router.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .route("/shifts", get(get_shifts_handler).post(create_shift_handler))
        .route(
            "/shifts/{id}",
            get(get_shift_handler)
                .put(update_shift_handler)
                .delete(delete_shift_handler),
        )
        .with_state(state)
}

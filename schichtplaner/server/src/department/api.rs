use crate::department::{
    Department, DepartmentService, DepartmentServiceError, DepartmentUpdate, NewDepartment,
};
use crate::web::extract::{EntityId, JsonBody};
use crate::web::{ApiError, ApiResponse, AppState, StatusResponse};
use axum::{Json, Router, extract::State, routing::get};

impl From<DepartmentServiceError> for ApiError {
    fn from(err: DepartmentServiceError) -> Self {
        match err {
            DepartmentServiceError::DepartmentNotFound(_) => ApiError::NotFound("Department"),
            DepartmentServiceError::Database(err) => ApiError::Store(err.to_string()),
        }
    }
}

/// Handler for GET /departments - Returns all departments with their users.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/departments",
    responses(
        (status = 200, description = "Envelope with all departments in `data`", body = [Department]),
        (status = 500, description = "Store error", body = StatusResponse)
    ),
    tag = "Departments"
)]
pub async fn get_departments_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Department>>>, ApiError> {
    let departments = DepartmentService::new(&state.db)
        .get_all_departments()
        .await?;
    Ok(Json(ApiResponse::success(
        "Departments successfully retrieved",
        departments,
    )))
}

/// Handler for POST /departments - Creates a department.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/departments",
    request_body = NewDepartment,
    responses(
        (status = 200, description = "Envelope with the created department in `data`", body = Department),
        (status = 400, description = "Invalid input", body = StatusResponse),
        (status = 500, description = "Store error, e.g. duplicate name", body = StatusResponse)
    ),
    tag = "Departments"
)]
pub async fn create_department_handler(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewDepartment>,
) -> Result<Json<ApiResponse<Department>>, ApiError> {
    let department = DepartmentService::new(&state.db)
        .create_department(payload)
        .await?;
    Ok(Json(ApiResponse::success(
        "Department successfully created",
        department,
    )))
}

/// Handler for GET /departments/{id} - Returns a department with its users.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/departments/{id}",
    params(("id" = i32, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Envelope with the department in `data`", body = Department),
        (status = 400, description = "Invalid ID", body = StatusResponse),
        (status = 404, description = "Department not found", body = StatusResponse)
    ),
    tag = "Departments"
)]
pub async fn get_department_handler(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<ApiResponse<Department>>, ApiError> {
    let department = DepartmentService::new(&state.db)
        .get_department_by_id(id)
        .await?;
    Ok(Json(ApiResponse::success(
        "Department successfully retrieved",
        department,
    )))
}

/// Handler for PUT /departments/{id} - Overwrites the fields present in the body.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    put,
    path = "/departments/{id}",
    params(("id" = i32, Path, description = "Department ID")),
    request_body = DepartmentUpdate,
    responses(
        (status = 200, description = "Envelope with the updated department in `data`", body = Department),
        (status = 400, description = "Invalid ID or input", body = StatusResponse),
        (status = 404, description = "Department not found", body = StatusResponse),
        (status = 500, description = "Store error, e.g. duplicate name", body = StatusResponse)
    ),
    tag = "Departments"
)]
pub async fn update_department_handler(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    payload: Result<JsonBody<DepartmentUpdate>, ApiError>,
) -> Result<Json<ApiResponse<Department>>, ApiError> {
    let department_service = DepartmentService::new(&state.db);
    // A missing record wins over a malformed body.
    let JsonBody(changes) = match payload {
        Ok(body) => body,
        Err(err) => {
            department_service.get_department_by_id(id).await?;
            return Err(err);
        }
    };
    let department = department_service.update_department_by_id(id, changes).await?;
    Ok(Json(ApiResponse::success(
        "Department successfully updated",
        department,
    )))
}

/// Handler for DELETE /departments/{id} - Soft-deletes a department.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/departments/{id}",
    params(("id" = i32, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department deleted", body = StatusResponse),
        (status = 400, description = "Invalid ID", body = StatusResponse),
        (status = 500, description = "Store error", body = StatusResponse)
    ),
    tag = "Departments"
)]
pub async fn delete_department_handler(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    DepartmentService::new(&state.db)
        .delete_department_by_id(id)
        .await?;
    Ok(Json(ApiResponse::message("Department successfully deleted")))
}

/// Creates and returns the departments router.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/departments",
            get(get_departments_handler).post(create_department_handler),
        )
        .route(
            "/departments/{id}",
            get(get_department_handler)
                .put(update_department_handler)
                .delete(delete_department_handler),
        )
        .with_state(state)
}

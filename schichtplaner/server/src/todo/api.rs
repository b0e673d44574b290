use crate::todo::{NewTodo, Todo, TodoService, TodoServiceError, TodoUpdate};
use crate::web::extract::{EntityId, JsonBody};
use crate::web::{ApiError, ApiResponse, AppState, StatusResponse};
use axum::{Json, Router, extract::State, routing::get};

impl From<TodoServiceError> for ApiError {
    fn from(err: TodoServiceError) -> Self {
        match err {
            TodoServiceError::TodoNotFound(_) => ApiError::NotFound("Todo"),
            TodoServiceError::Database(err) => ApiError::Store(err.to_string()),
        }
    }
}

/// Handler for GET /todos - Returns every todo that has not been deleted.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/todos",
    responses(
        (status = 200, description = "Envelope with all todos in `data`", body = [Todo]),
        (status = 500, description = "Store error", body = StatusResponse)
    ),
    tag = "Todos"
)]
pub async fn get_todos_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Todo>>>, ApiError> {
    let todos = TodoService::new(&state.db).get_all_todos().await?;
    Ok(Json(ApiResponse::success("Todos successfully retrieved", todos)))
}

/// Handler for POST /todos - Creates a todo.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/todos",
    request_body = NewTodo,
    responses(
        (status = 200, description = "Envelope with the created todo in `data`", body = Todo),
        (status = 400, description = "Invalid input", body = StatusResponse),
        (status = 500, description = "Store error", body = StatusResponse)
    ),
    tag = "Todos"
)]
pub async fn create_todo_handler(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewTodo>,
) -> Result<Json<ApiResponse<Todo>>, ApiError> {
    let todo = TodoService::new(&state.db).create_todo(payload).await?;
    Ok(Json(ApiResponse::success("Todo successfully created", todo)))
}

/// Handler for GET /todos/{id} - Returns a single todo.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/todos/{id}",
    params(("id" = i32, Path, description = "Todo ID")),
    responses(
        (status = 200, description = "Envelope with the todo in `data`", body = Todo),
        (status = 400, description = "Invalid ID", body = StatusResponse),
        (status = 404, description = "Todo not found", body = StatusResponse)
    ),
    tag = "Todos"
)]
pub async fn get_todo_handler(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<ApiResponse<Todo>>, ApiError> {
    let todo = TodoService::new(&state.db).get_todo_by_id(id).await?;
    Ok(Json(ApiResponse::success("Todo successfully retrieved", todo)))
}

/// Handler for PUT /todos/{id} - Overwrites the fields present in the body.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    put,
    path = "/todos/{id}",
    params(("id" = i32, Path, description = "Todo ID")),
    request_body = TodoUpdate,
    responses(
        (status = 200, description = "Envelope with the updated todo in `data`", body = Todo),
        (status = 400, description = "Invalid ID, or invalid input for an existing todo", body = StatusResponse),
        (status = 404, description = "Todo not found", body = StatusResponse),
        (status = 500, description = "Store error", body = StatusResponse)
    ),
    tag = "Todos"
)]
pub async fn update_todo_handler(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    payload: Result<JsonBody<TodoUpdate>, ApiError>,
) -> Result<Json<ApiResponse<Todo>>, ApiError> {
    let todo_service = TodoService::new(&state.db);
    // A missing record wins over a malformed body.
    let JsonBody(changes) = match payload {
        Ok(body) => body,
        Err(err) => {
            todo_service.get_todo_by_id(id).await?;
            return Err(err);
        }
    };
    let todo = todo_service.update_todo_by_id(id, changes).await?;
    Ok(Json(ApiResponse::success("Todo successfully updated", todo)))
}

/// Handler for DELETE /todos/{id} - Soft-deletes a todo.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/todos/{id}",
    params(("id" = i32, Path, description = "Todo ID")),
    responses(
        (status = 200, description = "Todo deleted", body = StatusResponse),
        (status = 400, description = "Invalid ID", body = StatusResponse),
        (status = 500, description = "Store error", body = StatusResponse)
    ),
    tag = "Todos"
)]
pub async fn delete_todo_handler(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    TodoService::new(&state.db).delete_todo_by_id(id).await?;
    Ok(Json(ApiResponse::message("Todo successfully deleted")))
}

/// Creates and returns the todos router.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .route("/todos", get(get_todos_handler).post(create_todo_handler))
        .route(
            "/todos/{id}",
            get(get_todo_handler)
                .put(update_todo_handler)
                .delete(delete_todo_handler),
        )
        .with_state(state)
}

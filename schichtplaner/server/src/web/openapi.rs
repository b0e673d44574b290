use utoipa::OpenApi;

use crate::department::api as department_api;
use crate::shift::api as shift_api;
use crate::todo::api as todo_api;
use crate::user::api as user_api;

/// OpenAPI document for the whole service, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(title = "Schichtplaner API", description = "Shift planning backend"),
    paths(
        super::health_check_handler,
        todo_api::get_todos_handler,
        todo_api::create_todo_handler,
        todo_api::get_todo_handler,
        todo_api::update_todo_handler,
        todo_api::delete_todo_handler,
        user_api::get_users_handler,
        user_api::create_user_handler,
        user_api::get_user_handler,
        user_api::update_user_handler,
        user_api::delete_user_handler,
        department_api::get_departments_handler,
        department_api::create_department_handler,
        department_api::get_department_handler,
        department_api::update_department_handler,
        department_api::delete_department_handler,
        shift_api::get_shifts_handler,
        shift_api::create_shift_handler,
        shift_api::get_shift_handler,
        shift_api::update_shift_handler,
        shift_api::delete_shift_handler,
    ),
    components(schemas(
        super::StatusResponse,
        crate::todo::Todo,
        crate::todo::NewTodo,
        crate::todo::TodoUpdate,
        crate::user::User,
        crate::user::UserSummary,
        crate::user::NewUser,
        crate::user::UserUpdate,
        crate::department::Department,
        crate::department::DepartmentSummary,
        crate::department::NewDepartment,
        crate::department::DepartmentUpdate,
        crate::shift::Shift,
        crate::shift::NewShift,
        crate::shift::ShiftUpdate,
    )),
    tags(
        (name = "Health", description = "Liveness probe"),
        (name = "Todos", description = "Todo management"),
        (name = "Users", description = "User management and department membership"),
        (name = "Departments", description = "Department management"),
        (name = "Shifts", description = "Shift management"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_document_every_resource_path() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/health",
            "/todos",
            "/todos/{id}",
            "/users",
            "/users/{id}",
            "/departments",
            "/departments/{id}",
            "/shifts",
            "/shifts/{id}",
        ] {
            assert!(paths.contains(&expected), "missing path {expected}");
        }
    }
}

use crate::entities::todo;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod api;

/// A todo entry as exposed to clients.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize, ToSchema)]
pub struct Todo {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub title: String,
    pub completed: bool,
    pub description: String,
    /// Free-form date text
    pub date: String,
}

impl From<todo::Model> for Todo {
    fn from(model: todo::Model) -> Self {
        Self {
            id: model.id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
            title: model.title,
            completed: model.completed,
            description: model.description,
            date: model.date,
        }
    }
}

/// Fields a client may set when creating a todo.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewTodo {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
}

/// Fields a client may change on an existing todo. Omitted fields keep their value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TodoUpdate {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub description: Option<String>,
    pub date: Option<String>,
}

/// Error type for TodoService operations.
#[derive(Debug, thiserror::Error)]
pub enum TodoServiceError {
    #[error("Todo with ID {0} not found")]
    TodoNotFound(i32),
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

pub struct TodoService<'a> {
    db: &'a DatabaseConnection,
}

impl TodoService<'_> {
    pub fn new(db: &DatabaseConnection) -> TodoService<'_> {
        TodoService { db }
    }

    /// Retrieves all todos that have not been deleted, ordered by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_todos(&self) -> Result<Vec<Todo>, TodoServiceError> {
        let todos = todo::Entity::find()
            .filter(todo::Column::DeletedAt.is_null())
            .order_by_asc(todo::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(Todo::from)
            .collect();
        Ok(todos)
    }

    /// Retrieves a todo by its ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_todo_by_id(&self, id: i32) -> Result<Todo, TodoServiceError> {
        self.find_live(id).await.map(Todo::from)
    }

    /// Creates a new todo.
    #[tracing::instrument(skip(self))]
    pub async fn create_todo(&self, new_todo: NewTodo) -> Result<Todo, TodoServiceError> {
        let now = Utc::now();
        let active_model = todo::ActiveModel {
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            title: ActiveValue::Set(new_todo.title),
            completed: ActiveValue::Set(new_todo.completed),
            description: ActiveValue::Set(new_todo.description),
            date: ActiveValue::Set(new_todo.date),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        Ok(Todo::from(created_model))
    }

    /// Applies `changes` to the todo with the given ID.
    #[tracing::instrument(skip(self))]
    pub async fn update_todo_by_id(
        &self,
        id: i32,
        changes: TodoUpdate,
    ) -> Result<Todo, TodoServiceError> {
        let todo_to_update = self.find_live(id).await?;

        let mut active_model: todo::ActiveModel = todo_to_update.into();
        if let Some(title) = changes.title {
            active_model.title = ActiveValue::Set(title);
        }
        if let Some(completed) = changes.completed {
            active_model.completed = ActiveValue::Set(completed);
        }
        if let Some(description) = changes.description {
            active_model.description = ActiveValue::Set(description);
        }
        if let Some(date) = changes.date {
            active_model.date = ActiveValue::Set(date);
        }
        active_model.updated_at = ActiveValue::Set(Utc::now());
        let updated_model = active_model.update(self.db).await?;

        Ok(Todo::from(updated_model))
    }

    /// Soft-deletes the todo with the given ID. Deleting an unknown ID is a no-op.
    #[tracing::instrument(skip(self))]
    pub async fn delete_todo_by_id(&self, id: i32) -> Result<(), TodoServiceError> {
        let result = todo::Entity::update_many()
            .col_expr(todo::Column::DeletedAt, Expr::value(Utc::now()))
            .filter(todo::Column::Id.eq(id))
            .filter(todo::Column::DeletedAt.is_null())
            .exec(self.db)
            .await?;
        tracing::debug!("Soft-deleted {} todo rows", result.rows_affected);
        Ok(())
    }

    async fn find_live(&self, id: i32) -> Result<todo::Model, TodoServiceError> {
        todo::Entity::find_by_id(id)
            .filter(todo::Column::DeletedAt.is_null())
            .one(self.db)
            .await?
            .ok_or(TodoServiceError::TodoNotFound(id))
    }
}

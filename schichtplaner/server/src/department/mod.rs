use crate::entities::{department, user, user_department};
use crate::user::UserSummary;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod api;

/// A department together with the users assigned to it.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize, ToSchema)]
pub struct Department {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub name: String,
    pub description: String,
    pub color: String,
    pub users: Vec<UserSummary>,
}

impl Department {
    fn from_models(model: department::Model, mut users: Vec<user::Model>) -> Self {
        users.sort_by_key(|user| user.id);
        Self {
            id: model.id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
            name: model.name,
            description: model.description,
            color: model.color,
            users: users.into_iter().map(UserSummary::from).collect(),
        }
    }
}

/// A department without its users, as nested inside a user.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize, ToSchema)]
pub struct DepartmentSummary {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub name: String,
    pub description: String,
    pub color: String,
}

impl From<department::Model> for DepartmentSummary {
    fn from(model: department::Model) -> Self {
        Self {
            id: model.id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
            name: model.name,
            description: model.description,
            color: model.color,
        }
    }
}

/// Fields a client may set when creating a department.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewDepartment {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
}

/// Fields a client may change on an existing department. Omitted fields keep their value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DepartmentUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

/// Error type for DepartmentService operations.
#[derive(Debug, thiserror::Error)]
pub enum DepartmentServiceError {
    #[error("Department with ID {0} not found")]
    DepartmentNotFound(i32),
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

pub struct DepartmentService<'a> {
    db: &'a DatabaseConnection,
}

impl DepartmentService<'_> {
    pub fn new(db: &DatabaseConnection) -> DepartmentService<'_> {
        DepartmentService { db }
    }

    /// Retrieves all live departments with their live users, ordered by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_departments(&self) -> Result<Vec<Department>, DepartmentServiceError> {
        let departments = department::Entity::find()
            .filter(department::Column::DeletedAt.is_null())
            .order_by_asc(department::Column::Id)
            .all(self.db)
            .await?;
        let users = departments
            .load_many_to_many(
                user::Entity::find().filter(user::Column::DeletedAt.is_null()),
                user_department::Entity,
                self.db,
            )
            .await?;

        Ok(departments
            .into_iter()
            .zip(users)
            .map(|(department, users)| Department::from_models(department, users))
            .collect())
    }

    /// Retrieves a department by its ID, including its users.
    #[tracing::instrument(skip(self))]
    pub async fn get_department_by_id(&self, id: i32) -> Result<Department, DepartmentServiceError> {
        let department = self.find_live(id).await?;
        self.with_users(department).await
    }

    /// Creates a new department. Name uniqueness is enforced by the store.
    #[tracing::instrument(skip(self))]
    pub async fn create_department(
        &self,
        new_department: NewDepartment,
    ) -> Result<Department, DepartmentServiceError> {
        let now = Utc::now();
        let active_model = department::ActiveModel {
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            name: ActiveValue::Set(new_department.name),
            description: ActiveValue::Set(new_department.description),
            color: ActiveValue::Set(new_department.color),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        Ok(Department::from_models(created_model, Vec::new()))
    }

    /// Applies `changes` to the department with the given ID.
    #[tracing::instrument(skip(self))]
    pub async fn update_department_by_id(
        &self,
        id: i32,
        changes: DepartmentUpdate,
    ) -> Result<Department, DepartmentServiceError> {
        let department_to_update = self.find_live(id).await?;

        let mut active_model: department::ActiveModel = department_to_update.into();
        if let Some(name) = changes.name {
            active_model.name = ActiveValue::Set(name);
        }
        if let Some(description) = changes.description {
            active_model.description = ActiveValue::Set(description);
        }
        if let Some(color) = changes.color {
            active_model.color = ActiveValue::Set(color);
        }
        active_model.updated_at = ActiveValue::Set(Utc::now());
        let updated_model = active_model.update(self.db).await?;

        self.with_users(updated_model).await
    }

    /// Soft-deletes the department and unlinks it from all users.
    /// Deleting an unknown ID is a no-op.
    #[tracing::instrument(skip(self))]
    pub async fn delete_department_by_id(&self, id: i32) -> Result<(), DepartmentServiceError> {
        let txn = self.db.begin().await?;

        let result = department::Entity::update_many()
            .col_expr(department::Column::DeletedAt, Expr::value(Utc::now()))
            .filter(department::Column::Id.eq(id))
            .filter(department::Column::DeletedAt.is_null())
            .exec(&txn)
            .await?;

        if result.rows_affected > 0 {
            let unlinked = user_department::Entity::delete_many()
                .filter(user_department::Column::DepartmentId.eq(id))
                .exec(&txn)
                .await?;
            tracing::debug!(
                "Unlinked department {} from {} users",
                id,
                unlinked.rows_affected
            );
        }

        txn.commit().await?;
        Ok(())
    }

    async fn find_live(&self, id: i32) -> Result<department::Model, DepartmentServiceError> {
        department::Entity::find_by_id(id)
            .filter(department::Column::DeletedAt.is_null())
            .one(self.db)
            .await?
            .ok_or(DepartmentServiceError::DepartmentNotFound(id))
    }

    async fn with_users(
        &self,
        department: department::Model,
    ) -> Result<Department, DepartmentServiceError> {
        let users = department
            .find_related(user::Entity)
            .filter(user::Column::DeletedAt.is_null())
            .all(self.db)
            .await?;
        Ok(Department::from_models(department, users))
    }
}

use crate::department::DepartmentSummary;
use crate::entities::{department, shift, user, user_department};
use chrono::{DateTime, Utc};
use password::{CredentialHasher, PasswordHashError};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use utoipa::ToSchema;

pub mod api;
pub mod password;

/// A user together with the departments they belong to. Credentials are never exposed.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub color: String,
    pub is_admin: bool,
    pub departments: Vec<DepartmentSummary>,
}

impl User {
    fn from_models(model: user::Model, mut departments: Vec<department::Model>) -> Self {
        departments.sort_by_key(|department| department.id);
        Self {
            id: model.id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            color: model.color,
            is_admin: model.is_admin,
            departments: departments
                .into_iter()
                .map(DepartmentSummary::from)
                .collect(),
        }
    }
}

/// A user without departments, as nested inside a department.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub color: String,
    pub is_admin: bool,
}

impl From<user::Model> for UserSummary {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            color: model.color,
            is_admin: model.is_admin,
        }
    }
}

/// Fields a client may set when creating a user.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewUser {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    /// Plaintext password, hashed before it is stored
    pub password: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub is_admin: bool,
    /// Departments to assign the user to
    #[serde(default)]
    pub department_ids: Vec<i32>,
}

/// Fields a client may change on an existing user. Omitted fields keep their value.
///
/// An omitted or empty `department_ids` leaves the user's departments untouched;
/// a non-empty list replaces them.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub color: Option<String>,
    pub is_admin: Option<bool>,
    pub department_ids: Option<Vec<i32>>,
}

/// Error type for UserService operations.
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("User with ID {0} not found")]
    UserNotFound(i32),
    /// At least one requested department does not exist or has been deleted.
    #[error("Invalid department IDs")]
    InvalidDepartmentIds,
    #[error(transparent)]
    PasswordHash(#[from] PasswordHashError),
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

pub struct UserService<'a> {
    db: &'a DatabaseConnection,
    hasher: Arc<dyn CredentialHasher>,
}

impl<'a> UserService<'a> {
    pub fn new(db: &'a DatabaseConnection, hasher: Arc<dyn CredentialHasher>) -> UserService<'a> {
        UserService { db, hasher }
    }

    /// Retrieves all live users with their live departments, ordered by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_users(&self) -> Result<Vec<User>, UserServiceError> {
        let users = user::Entity::find()
            .filter(user::Column::DeletedAt.is_null())
            .order_by_asc(user::Column::Id)
            .all(self.db)
            .await?;
        let departments = users
            .load_many_to_many(
                department::Entity::find().filter(department::Column::DeletedAt.is_null()),
                user_department::Entity,
                self.db,
            )
            .await?;

        Ok(users
            .into_iter()
            .zip(departments)
            .map(|(user, departments)| User::from_models(user, departments))
            .collect())
    }

    /// Retrieves a user by their ID, including their departments.
    #[tracing::instrument(skip(self))]
    pub async fn get_user_by_id(&self, id: i32) -> Result<User, UserServiceError> {
        let user = self.find_live(id).await?;
        self.with_departments(user).await
    }

    /// Creates a user and assigns the requested departments.
    ///
    /// Every department ID must reference a live department, otherwise nothing is stored.
    /// Department lookup, the user row and its department links share one transaction.
    #[tracing::instrument(skip(self, new_user), fields(email = %new_user.email))]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, UserServiceError> {
        let txn = self.db.begin().await?;
        let departments = resolve_departments(&txn, &new_user.department_ids).await?;
        let password_hash = self.hash_password(new_user.password).await?;

        let now = Utc::now();
        let active_model = user::ActiveModel {
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            first_name: ActiveValue::Set(new_user.first_name),
            last_name: ActiveValue::Set(new_user.last_name),
            email: ActiveValue::Set(new_user.email),
            password_hash: ActiveValue::Set(password_hash),
            color: ActiveValue::Set(new_user.color),
            is_admin: ActiveValue::Set(new_user.is_admin),
            ..Default::default()
        };

        let created_model = active_model.insert(&txn).await?;
        link_departments(&txn, created_model.id, &departments).await?;
        txn.commit().await?;

        Ok(User::from_models(created_model, departments))
    }

    /// Applies `changes` to the user with the given ID.
    #[tracing::instrument(skip(self, changes))]
    pub async fn update_user_by_id(
        &self,
        id: i32,
        changes: UserUpdate,
    ) -> Result<User, UserServiceError> {
        let user_to_update = self.find_live(id).await?;

        let mut active_model: user::ActiveModel = user_to_update.into();
        if let Some(first_name) = changes.first_name {
            active_model.first_name = ActiveValue::Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            active_model.last_name = ActiveValue::Set(last_name);
        }
        if let Some(email) = changes.email {
            active_model.email = ActiveValue::Set(email);
        }
        if let Some(password) = changes.password {
            active_model.password_hash = ActiveValue::Set(self.hash_password(password).await?);
        }
        if let Some(color) = changes.color {
            active_model.color = ActiveValue::Set(color);
        }
        if let Some(is_admin) = changes.is_admin {
            active_model.is_admin = ActiveValue::Set(is_admin);
        }
        active_model.updated_at = ActiveValue::Set(Utc::now());

        let txn = self.db.begin().await?;
        let departments = match changes.department_ids.as_deref() {
            Some(ids) if !ids.is_empty() => Some(resolve_departments(&txn, ids).await?),
            _ => None,
        };
        let updated_model = active_model.update(&txn).await?;
        if let Some(departments) = &departments {
            user_department::Entity::delete_many()
                .filter(user_department::Column::UserId.eq(id))
                .exec(&txn)
                .await?;
            link_departments(&txn, id, departments).await?;
        }
        txn.commit().await?;

        self.with_departments(updated_model).await
    }

    /// Soft-deletes the user together with their shifts and unlinks them from all departments.
    /// Deleting an unknown ID is a no-op.
    #[tracing::instrument(skip(self))]
    pub async fn delete_user_by_id(&self, id: i32) -> Result<(), UserServiceError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let result = user::Entity::update_many()
            .col_expr(user::Column::DeletedAt, Expr::value(now))
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::DeletedAt.is_null())
            .exec(&txn)
            .await?;

        if result.rows_affected > 0 {
            let shifts = shift::Entity::update_many()
                .col_expr(shift::Column::DeletedAt, Expr::value(now))
                .filter(shift::Column::UserId.eq(id))
                .filter(shift::Column::DeletedAt.is_null())
                .exec(&txn)
                .await?;
            user_department::Entity::delete_many()
                .filter(user_department::Column::UserId.eq(id))
                .exec(&txn)
                .await?;
            tracing::debug!(
                "Deleted user {} along with {} shifts",
                id,
                shifts.rows_affected
            );
        }

        txn.commit().await?;
        Ok(())
    }

    /// Hashes `password` on the blocking thread pool.
    async fn hash_password(&self, password: String) -> Result<String, UserServiceError> {
        let hasher = Arc::clone(&self.hasher);
        let hash = tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|err| PasswordHashError(err.to_string()))??;
        Ok(hash)
    }

    async fn find_live(&self, id: i32) -> Result<user::Model, UserServiceError> {
        user::Entity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_null())
            .one(self.db)
            .await?
            .ok_or(UserServiceError::UserNotFound(id))
    }

    async fn with_departments(&self, user: user::Model) -> Result<User, UserServiceError> {
        let departments = user
            .find_related(department::Entity)
            .filter(department::Column::DeletedAt.is_null())
            .all(self.db)
            .await?;
        Ok(User::from_models(user, departments))
    }
}

/// Looks up the live departments for `ids`, failing if any of them is missing.
async fn resolve_departments<C>(
    conn: &C,
    ids: &[i32],
) -> Result<Vec<department::Model>, UserServiceError>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let unique_ids: BTreeSet<i32> = ids.iter().copied().collect();
    let departments = department::Entity::find()
        .filter(department::Column::Id.is_in(unique_ids.iter().copied()))
        .filter(department::Column::DeletedAt.is_null())
        .order_by_asc(department::Column::Id)
        .all(conn)
        .await?;

    if departments.len() != unique_ids.len() {
        tracing::warn!(
            "Requested {} departments but only {} exist",
            unique_ids.len(),
            departments.len()
        );
        return Err(UserServiceError::InvalidDepartmentIds);
    }
    Ok(departments)
}

async fn link_departments<C>(
    conn: &C,
    user_id: i32,
    departments: &[department::Model],
) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    if departments.is_empty() {
        return Ok(());
    }
    let links = departments
        .iter()
        .map(|department| user_department::ActiveModel {
            user_id: ActiveValue::Set(user_id),
            department_id: ActiveValue::Set(department.id),
        });
    user_department::Entity::insert_many(links)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::password::MockCredentialHasher;
    use migration::MigratorTrait;

    async fn setup_db() -> DatabaseConnection {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    fn new_user(email: &str, department_ids: Vec<i32>) -> NewUser {
        NewUser {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            password: "secret".to_string(),
            color: "#ff0000".to_string(),
            is_admin: false,
            department_ids,
        }
    }

    #[tokio::test]
    async fn can_store_hash_instead_of_plaintext_password() {
        let db = setup_db().await;
        let mut hasher = MockCredentialHasher::new();
        hasher
            .expect_hash_password()
            .times(1)
            .returning(|password| Ok(format!("hashed:{password}")));
        let service = UserService::new(&db, Arc::new(hasher));

        let created = service
            .create_user(new_user("ada@example.com", vec![]))
            .await
            .unwrap();

        let stored = user::Entity::find_by_id(created.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.password_hash, "hashed:secret");
    }

    #[tokio::test]
    async fn can_reject_unknown_departments_before_hashing() {
        let db = setup_db().await;
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_hash_password().never();
        let service = UserService::new(&db, Arc::new(hasher));

        let result = service
            .create_user(new_user("ada@example.com", vec![42]))
            .await;

        assert!(matches!(result, Err(UserServiceError::InvalidDepartmentIds)));
        let users = user::Entity::find().all(&db).await.unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn can_surface_hashing_failure_without_storing_user() {
        let db = setup_db().await;
        let mut hasher = MockCredentialHasher::new();
        hasher
            .expect_hash_password()
            .returning(|_| Err(PasswordHashError("out of memory".to_string())));
        let service = UserService::new(&db, Arc::new(hasher));

        let result = service
            .create_user(new_user("ada@example.com", vec![]))
            .await;

        assert!(matches!(result, Err(UserServiceError::PasswordHash(_))));
        let users = user::Entity::find().all(&db).await.unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn can_hash_off_the_request_thread() {
        let db = setup_db().await;
        let request_thread = std::thread::current().id();
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_hash_password().times(1).returning(move |password| {
            assert_ne!(std::thread::current().id(), request_thread);
            Ok(format!("hashed:{password}"))
        });
        let service = UserService::new(&db, Arc::new(hasher));

        service
            .create_user(new_user("ada@example.com", vec![]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn can_resolve_departments_within_open_transaction() {
        let db = setup_db().await;
        let txn = db.begin().await.unwrap();
        let now = Utc::now();
        let kitchen = department::ActiveModel {
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            name: ActiveValue::Set("Kitchen".to_string()),
            description: ActiveValue::Set(String::new()),
            color: ActiveValue::Set(String::new()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .unwrap();

        let resolved = resolve_departments(&txn, &[kitchen.id, kitchen.id])
            .await
            .unwrap();

        assert_eq!(resolved, vec![kitchen]);
        txn.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn can_keep_password_hash_when_update_omits_password() {
        let db = setup_db().await;
        let mut hasher = MockCredentialHasher::new();
        hasher
            .expect_hash_password()
            .times(1)
            .returning(|password| Ok(format!("hashed:{password}")));
        let service = UserService::new(&db, Arc::new(hasher));
        let created = service
            .create_user(new_user("ada@example.com", vec![]))
            .await
            .unwrap();

        service
            .update_user_by_id(
                created.id,
                UserUpdate {
                    color: Some("#00ff00".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let stored = user::Entity::find_by_id(created.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.password_hash, "hashed:secret");
        assert_eq!(stored.color, "#00ff00");
    }
}

use crate::entities::{shift, user};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod api;

/// A shift worked by a single user.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize, ToSchema)]
pub struct Shift {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub description: String,
    pub user_id: i32,
}

impl From<shift::Model> for Shift {
    fn from(model: shift::Model) -> Self {
        Self {
            id: model.id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
            start_time: model.start_time,
            end_time: model.end_time,
            description: model.description,
            user_id: model.user_id,
        }
    }
}

/// Fields a client may set when creating a shift. Times are RFC 3339.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewShift {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    pub user_id: i32,
}

/// Fields a client may change on an existing shift. Omitted fields keep their value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ShiftUpdate {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub user_id: Option<i32>,
}

/// Error type for ShiftService operations.
#[derive(Debug, thiserror::Error)]
pub enum ShiftServiceError {
    #[error("Shift with ID {0} not found")]
    ShiftNotFound(i32),
    /// The referenced owner does not exist or has been deleted.
    #[error("User with ID {0} not found")]
    UserNotFound(i32),
    #[error("Shift ends before it starts")]
    InvalidTimeRange,
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

pub struct ShiftService<'a> {
    db: &'a DatabaseConnection,
}

impl ShiftService<'_> {
    pub fn new(db: &DatabaseConnection) -> ShiftService<'_> {
        ShiftService { db }
    }

    /// Retrieves all live shifts ordered by start time.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_shifts(&self) -> Result<Vec<Shift>, ShiftServiceError> {
        let shifts = shift::Entity::find()
            .filter(shift::Column::DeletedAt.is_null())
            .order_by_asc(shift::Column::StartTime)
            .order_by_asc(shift::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(Shift::from)
            .collect();
        Ok(shifts)
    }

    /// Retrieves a shift by its ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_shift_by_id(&self, id: i32) -> Result<Shift, ShiftServiceError> {
        self.find_live(id).await.map(Shift::from)
    }

    /// Creates a shift for a live user.
    #[tracing::instrument(skip(self))]
    pub async fn create_shift(&self, new_shift: NewShift) -> Result<Shift, ShiftServiceError> {
        check_time_range(new_shift.start_time, new_shift.end_time)?;
        self.ensure_user_exists(new_shift.user_id).await?;

        let now = Utc::now();
        let active_model = shift::ActiveModel {
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            start_time: ActiveValue::Set(new_shift.start_time),
            end_time: ActiveValue::Set(new_shift.end_time),
            description: ActiveValue::Set(new_shift.description),
            user_id: ActiveValue::Set(new_shift.user_id),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        Ok(Shift::from(created_model))
    }

    /// Applies `changes` to the shift with the given ID.
    ///
    /// The time range is checked against the merged values, so moving only one end works.
    #[tracing::instrument(skip(self))]
    pub async fn update_shift_by_id(
        &self,
        id: i32,
        changes: ShiftUpdate,
    ) -> Result<Shift, ShiftServiceError> {
        let shift_to_update = self.find_live(id).await?;

        let start_time = changes.start_time.unwrap_or(shift_to_update.start_time);
        let end_time = changes.end_time.unwrap_or(shift_to_update.end_time);
        check_time_range(start_time, end_time)?;
        if let Some(user_id) = changes.user_id {
            self.ensure_user_exists(user_id).await?;
        }

        let mut active_model: shift::ActiveModel = shift_to_update.into();
        active_model.start_time = ActiveValue::Set(start_time);
        active_model.end_time = ActiveValue::Set(end_time);
        if let Some(description) = changes.description {
            active_model.description = ActiveValue::Set(description);
        }
        if let Some(user_id) = changes.user_id {
            active_model.user_id = ActiveValue::Set(user_id);
        }
        active_model.updated_at = ActiveValue::Set(Utc::now());
        let updated_model = active_model.update(self.db).await?;

        Ok(Shift::from(updated_model))
    }

    /// Soft-deletes the shift with the given ID. Deleting an unknown ID is a no-op.
    #[tracing::instrument(skip(self))]
    pub async fn delete_shift_by_id(&self, id: i32) -> Result<(), ShiftServiceError> {
        let result = shift::Entity::update_many()
            .col_expr(shift::Column::DeletedAt, Expr::value(Utc::now()))
            .filter(shift::Column::Id.eq(id))
            .filter(shift::Column::DeletedAt.is_null())
            .exec(self.db)
            .await?;
        tracing::debug!("Soft-deleted {} shift rows", result.rows_affected);
        Ok(())
    }

    async fn ensure_user_exists(&self, user_id: i32) -> Result<(), ShiftServiceError> {
        let live_users = user::Entity::find_by_id(user_id)
            .filter(user::Column::DeletedAt.is_null())
            .count(self.db)
            .await?;
        if live_users == 0 {
            return Err(ShiftServiceError::UserNotFound(user_id));
        }
        Ok(())
    }

    async fn find_live(&self, id: i32) -> Result<shift::Model, ShiftServiceError> {
        shift::Entity::find_by_id(id)
            .filter(shift::Column::DeletedAt.is_null())
            .one(self.db)
            .await?
            .ok_or(ShiftServiceError::ShiftNotFound(id))
    }
}

fn check_time_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), ShiftServiceError> {
    if end < start {
        return Err(ShiftServiceError::InvalidTimeRange);
    }
    Ok(())
}

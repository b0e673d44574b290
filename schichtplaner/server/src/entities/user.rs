use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Argon2 PHC string, never the plaintext password.
    pub password_hash: String,
    pub color: String,
    pub is_admin: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::shift::Entity")]
    Shift,
    #[sea_orm(has_many = "super::user_department::Entity")]
    UserDepartment,
}

impl Related<super::shift::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shift.def()
    }
}

impl Related<super::user_department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserDepartment.def()
    }
}

impl Related<super::department::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_department::Relation::Department.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_department::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

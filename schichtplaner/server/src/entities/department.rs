use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "departments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
    pub name: String,
    pub description: String,
    pub color: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_department::Entity")]
    UserDepartment,
}

impl Related<super::user_department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserDepartment.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_department::Relation::User.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_department::Relation::Department.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

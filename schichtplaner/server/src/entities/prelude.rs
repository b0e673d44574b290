pub use super::department::Entity as Department;
pub use super::shift::Entity as Shift;
pub use super::todo::Entity as Todo;
pub use super::user::Entity as User;
pub use super::user_department::Entity as UserDepartment;

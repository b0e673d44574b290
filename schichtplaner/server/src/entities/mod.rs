//! `SeaORM` entities for the scheduling tables.

pub mod prelude;

pub mod department;
pub mod shift;
pub mod todo;
pub mod user;
pub mod user_department;

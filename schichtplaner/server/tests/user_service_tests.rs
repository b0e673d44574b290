use schichtplaner_server::department::{DepartmentService, NewDepartment};
use schichtplaner_server::entities::{shift, user, user_department};
use schichtplaner_server::shift::{NewShift, ShiftService};
use schichtplaner_server::user::password::CredentialHasher;
use schichtplaner_server::user::{NewUser, UserService, UserServiceError, UserUpdate};
use chrono::{Duration, TimeZone, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

mod common;

async fn setup() -> anyhow::Result<DatabaseConnection> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    common::setup_db().await
}

fn new_user(email: &str, department_ids: Vec<i32>) -> NewUser {
    NewUser {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: email.to_string(),
        password: "correct horse".to_string(),
        color: "#ff8800".to_string(),
        is_admin: true,
        department_ids,
    }
}

async fn create_department(db: &DatabaseConnection, name: &str) -> i32 {
    DepartmentService::new(db)
        .create_department(NewDepartment {
            name: name.to_string(),
            description: String::new(),
            color: String::new(),
        })
        .await
        .unwrap()
        .id
}

async fn link_count(db: &DatabaseConnection, user_id: i32) -> u64 {
    user_department::Entity::find()
        .filter(user_department::Column::UserId.eq(user_id))
        .count(db)
        .await
        .unwrap()
}

#[tokio::test]
async fn can_create_user_with_departments() {
    let db = setup().await.expect("Failed to setup test context");
    let kitchen = create_department(&db, "Kitchen").await;
    let bar = create_department(&db, "Bar").await;
    let user_service = UserService::new(&db, common::plain_hasher());

    let created = user_service
        .create_user(new_user("ada@example.com", vec![bar, kitchen, bar]))
        .await
        .expect("Failed to create user");

    assert_eq!(created.email, "ada@example.com");
    assert!(created.is_admin);
    let department_ids: Vec<i32> = created.departments.iter().map(|d| d.id).collect();
    assert_eq!(department_ids, vec![kitchen, bar]);
    assert_eq!(link_count(&db, created.id).await, 2);

    let fetched = user_service.get_user_by_id(created.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn can_store_only_the_password_hash() {
    let db = setup().await.expect("Failed to setup test context");
    let user_service = UserService::new(&db, common::plain_hasher());

    let created = user_service
        .create_user(new_user("ada@example.com", vec![]))
        .await
        .unwrap();

    let stored = user::Entity::find_by_id(created.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_ne!(stored.password_hash, "correct horse");
    assert!(
        common::PlainHasher
            .verify_password("correct horse", &stored.password_hash)
            .unwrap()
    );
}

#[tokio::test]
async fn can_reject_unknown_department_without_persisting_user() {
    let db = setup().await.expect("Failed to setup test context");
    let kitchen = create_department(&db, "Kitchen").await;
    let user_service = UserService::new(&db, common::plain_hasher());

    let result = user_service
        .create_user(new_user("ada@example.com", vec![kitchen, 999]))
        .await;

    assert!(matches!(result, Err(UserServiceError::InvalidDepartmentIds)));
    assert!(user_service.get_all_users().await.unwrap().is_empty());
    assert_eq!(user_department::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn can_reject_deleted_department() {
    let db = setup().await.expect("Failed to setup test context");
    let kitchen = create_department(&db, "Kitchen").await;
    DepartmentService::new(&db)
        .delete_department_by_id(kitchen)
        .await
        .unwrap();
    let user_service = UserService::new(&db, common::plain_hasher());

    let result = user_service
        .create_user(new_user("ada@example.com", vec![kitchen]))
        .await;

    assert!(matches!(result, Err(UserServiceError::InvalidDepartmentIds)));
}

#[tokio::test]
async fn can_reject_duplicate_email() {
    let db = setup().await.expect("Failed to setup test context");
    let user_service = UserService::new(&db, common::plain_hasher());
    user_service
        .create_user(new_user("ada@example.com", vec![]))
        .await
        .unwrap();

    let result = user_service
        .create_user(new_user("ada@example.com", vec![]))
        .await;

    match result {
        Err(UserServiceError::Database(err)) => {
            assert!(err.to_string().contains("UNIQUE"), "unexpected error: {err}")
        }
        other => panic!("expected a unique violation, got {other:?}"),
    }
}

#[tokio::test]
async fn can_replace_departments_on_update() {
    let db = setup().await.expect("Failed to setup test context");
    let kitchen = create_department(&db, "Kitchen").await;
    let bar = create_department(&db, "Bar").await;
    let user_service = UserService::new(&db, common::plain_hasher());
    let created = user_service
        .create_user(new_user("ada@example.com", vec![kitchen]))
        .await
        .unwrap();

    let updated = user_service
        .update_user_by_id(
            created.id,
            UserUpdate {
                first_name: Some("Augusta".to_string()),
                department_ids: Some(vec![bar]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.first_name, "Augusta");
    assert_eq!(updated.last_name, "Lovelace");
    let department_ids: Vec<i32> = updated.departments.iter().map(|d| d.id).collect();
    assert_eq!(department_ids, vec![bar]);
    assert_eq!(link_count(&db, created.id).await, 1);
}

#[tokio::test]
async fn can_keep_departments_when_update_sends_empty_list() {
    let db = setup().await.expect("Failed to setup test context");
    let kitchen = create_department(&db, "Kitchen").await;
    let user_service = UserService::new(&db, common::plain_hasher());
    let created = user_service
        .create_user(new_user("ada@example.com", vec![kitchen]))
        .await
        .unwrap();

    let updated = user_service
        .update_user_by_id(
            created.id,
            UserUpdate {
                department_ids: Some(vec![]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.departments.len(), 1);
    assert_eq!(updated.departments[0].id, kitchen);
}

#[tokio::test]
async fn can_leave_user_untouched_when_update_has_invalid_departments() {
    let db = setup().await.expect("Failed to setup test context");
    let kitchen = create_department(&db, "Kitchen").await;
    let user_service = UserService::new(&db, common::plain_hasher());
    let created = user_service
        .create_user(new_user("ada@example.com", vec![kitchen]))
        .await
        .unwrap();

    let result = user_service
        .update_user_by_id(
            created.id,
            UserUpdate {
                first_name: Some("Changed".to_string()),
                department_ids: Some(vec![12345]),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(UserServiceError::InvalidDepartmentIds)));
    let unchanged = user_service.get_user_by_id(created.id).await.unwrap();
    assert_eq!(unchanged, created);
}

#[tokio::test]
async fn can_rehash_password_on_update() {
    let db = setup().await.expect("Failed to setup test context");
    let user_service = UserService::new(&db, common::plain_hasher());
    let created = user_service
        .create_user(new_user("ada@example.com", vec![]))
        .await
        .unwrap();

    user_service
        .update_user_by_id(
            created.id,
            UserUpdate {
                password: Some("battery staple".to_string()),
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
    assert!(
        common::PlainHasher
            .verify_password("battery staple", &stored.password_hash)
            .unwrap()
    );
}

#[tokio::test]
async fn can_cascade_soft_delete_to_shifts_and_links() {
    let db = setup().await.expect("Failed to setup test context");
    let kitchen = create_department(&db, "Kitchen").await;
    let user_service = UserService::new(&db, common::plain_hasher());
    let created = user_service
        .create_user(new_user("ada@example.com", vec![kitchen]))
        .await
        .unwrap();
    let start = Utc.with_ymd_and_hms(2024, 11, 4, 8, 0, 0).unwrap();
    ShiftService::new(&db)
        .create_shift(NewShift {
            start_time: start,
            end_time: start + Duration::hours(8),
            description: "Early".to_string(),
            user_id: created.id,
        })
        .await
        .unwrap();

    user_service.delete_user_by_id(created.id).await.unwrap();

    assert!(matches!(
        user_service.get_user_by_id(created.id).await,
        Err(UserServiceError::UserNotFound(_))
    ));
    assert_eq!(link_count(&db, created.id).await, 0);
    let live_shifts = shift::Entity::find()
        .filter(shift::Column::UserId.eq(created.id))
        .filter(shift::Column::DeletedAt.is_null())
        .count(&db)
        .await
        .unwrap();
    assert_eq!(live_shifts, 0);
    let department = DepartmentService::new(&db)
        .get_department_by_id(kitchen)
        .await
        .unwrap();
    assert!(department.users.is_empty());
}

#[tokio::test]
async fn can_reuse_email_of_deleted_user() {
    let db = setup().await.expect("Failed to setup test context");
    let user_service = UserService::new(&db, common::plain_hasher());
    let first = user_service
        .create_user(new_user("ada@example.com", vec![]))
        .await
        .unwrap();
    user_service.delete_user_by_id(first.id).await.unwrap();

    let second = user_service
        .create_user(new_user("ada@example.com", vec![]))
        .await
        .expect("Email of a deleted user should be free again");

    assert_ne!(first.id, second.id);
    let users = user_service.get_all_users().await.unwrap();
    assert_eq!(users, vec![second]);
}

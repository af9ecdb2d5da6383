//! Database-backed tests for the assignment service. They run against the
//! database pointed at by DATABASE_URL and are skipped when it is not set.

use std::env;

use quiz_admin_backend::dto::assignment_dto::{
    AssignmentListQuery, CreateUserQuizAssignmentPayload, UpdateUserQuizAssignmentPayload,
};
use quiz_admin_backend::error::Error;
use quiz_admin_backend::models::user::UserRole;
use quiz_admin_backend::services::assignment_service::AssignmentService;
use quiz_admin_backend::utils::token::generate_access_token;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

const ASSIGNED_BY: &str = "root@example.com";

async fn setup_test_db() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = env::var("DATABASE_URL") else {
        eprintln!("skipping: DATABASE_URL not set");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to create test pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

async fn seed_user(pool: &PgPool, role: &str) -> i32 {
    let marker = Uuid::new_v4();
    sqlx::query_scalar::<_, i32>(
        r#"INSERT INTO users ("name", email, "passwordHash", "role")
           VALUES ($1, $2, 'x', $3::user_role)
           RETURNING id"#,
    )
    .bind(format!("User {}", marker))
    .bind(format!("user_{}@example.com", marker))
    .bind(role)
    .fetch_one(pool)
    .await
    .expect("failed to seed user")
}

async fn seed_quiz(pool: &PgPool) -> i32 {
    let marker = Uuid::new_v4();
    sqlx::query_scalar::<_, i32>(
        r#"INSERT INTO quizzes (title, slug, token)
           VALUES ($1, $2, $3)
           RETURNING id"#,
    )
    .bind(format!("Quiz {}", marker))
    .bind(format!("quiz-{}", marker))
    .bind(generate_access_token(32))
    .fetch_one(pool)
    .await
    .expect("failed to seed quiz")
}

fn payload(user_id: i32, quiz_id: i32) -> CreateUserQuizAssignmentPayload {
    CreateUserQuizAssignmentPayload {
        user_id,
        quiz_id,
        is_active: None,
        notes: None,
    }
}

#[tokio::test]
async fn create_stamps_audit_and_rejects_duplicates() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let service = AssignmentService::new(pool.clone());
    let user_id = seed_user(&pool, "admin").await;
    let quiz_id = seed_quiz(&pool).await;

    let created = service
        .create(payload(user_id, quiz_id), ASSIGNED_BY)
        .await
        .expect("create assignment");
    assert!(created.is_active);
    assert_eq!(created.assigned_by.as_deref(), Some(ASSIGNED_BY));
    assert_eq!(created.user.id, user_id);
    assert_eq!(created.user.role, UserRole::Admin);
    assert_eq!(created.quiz.id, quiz_id);

    // Duplicate pair is rejected even after soft-revocation.
    service
        .update(
            created.id,
            UpdateUserQuizAssignmentPayload {
                is_active: Some(false),
                notes: None,
            },
        )
        .await
        .expect("deactivate assignment");
    let err = service
        .create(payload(user_id, quiz_id), ASSIGNED_BY)
        .await
        .unwrap_err();
    match err {
        Error::BadRequest(msg) => assert_eq!(msg, "User is already assigned to this quiz"),
        other => panic!("expected BadRequest, got {:?}", other),
    }
}

#[tokio::test]
async fn create_validates_user_role_and_references() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let service = AssignmentService::new(pool.clone());
    let quiz_id = seed_quiz(&pool).await;

    let err = service
        .create(payload(0, quiz_id), ASSIGNED_BY)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)), "missing user");

    for role in ["user", "superadmin"] {
        let user_id = seed_user(&pool, role).await;
        let err = service
            .create(payload(user_id, quiz_id), ASSIGNED_BY)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)), "role {}", role);
    }

    let admin_id = seed_user(&pool, "admin").await;
    let err = service
        .create(payload(admin_id, 0), ASSIGNED_BY)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)), "missing quiz");
}

#[tokio::test]
async fn find_active_grant_follows_is_active() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let service = AssignmentService::new(pool.clone());
    let user_id = seed_user(&pool, "admin").await;
    let quiz_id = seed_quiz(&pool).await;

    assert!(service
        .find_by_user_and_quiz(user_id, quiz_id)
        .await
        .expect("lookup")
        .is_none());

    let created = service
        .create(payload(user_id, quiz_id), ASSIGNED_BY)
        .await
        .expect("create");
    assert!(service
        .find_by_user_and_quiz(user_id, quiz_id)
        .await
        .expect("lookup")
        .is_some());

    service
        .update(
            created.id,
            UpdateUserQuizAssignmentPayload {
                is_active: Some(false),
                notes: Some("revoked".to_string()),
            },
        )
        .await
        .expect("deactivate");
    assert!(service
        .find_by_user_and_quiz(user_id, quiz_id)
        .await
        .expect("lookup")
        .is_none());

    let updated = service
        .update(
            created.id,
            UpdateUserQuizAssignmentPayload {
                is_active: Some(true),
                notes: None,
            },
        )
        .await
        .expect("reactivate");
    assert_eq!(updated.notes.as_deref(), Some("revoked"));
    assert!(service
        .find_by_user_and_quiz(user_id, quiz_id)
        .await
        .expect("lookup")
        .is_some());
}

#[tokio::test]
async fn list_orders_paginates_and_filters() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let service = AssignmentService::new(pool.clone());
    let user_id = seed_user(&pool, "admin").await;

    let mut quiz_ids = Vec::new();
    for _ in 0..15 {
        let quiz_id = seed_quiz(&pool).await;
        service
            .create(payload(user_id, quiz_id), ASSIGNED_BY)
            .await
            .expect("create");
        quiz_ids.push(quiz_id);
    }

    let for_user = |page, limit, is_active| AssignmentListQuery {
        page: Some(page),
        limit: Some(limit),
        user_id: Some(user_id),
        quiz_id: None,
        is_active,
    };

    let page1 = service.list(for_user(1, 10, None)).await.expect("page 1");
    assert_eq!(page1.total, 15);
    assert_eq!(page1.items.len(), 10);
    // Newest first.
    assert_eq!(page1.items[0].quiz_id, *quiz_ids.last().unwrap());

    let page2 = service.list(for_user(2, 10, None)).await.expect("page 2");
    assert_eq!(page2.items.len(), 5);
    assert_eq!(page2.total, 15);

    let page3 = service.list(for_user(3, 10, None)).await.expect("page 3");
    assert!(page3.items.is_empty());
    assert_eq!(page3.total, 15);

    // Deactivate three and filter.
    for assignment in page2.items.iter().take(3) {
        service
            .update(
                assignment.id,
                UpdateUserQuizAssignmentPayload {
                    is_active: Some(false),
                    notes: None,
                },
            )
            .await
            .expect("deactivate");
    }
    let active_only = service
        .list(for_user(1, 100, Some(true)))
        .await
        .expect("active filter");
    assert_eq!(active_only.total, 12);
    assert!(active_only.items.iter().all(|a| a.is_active));

    // Quiz side projection carries the quiz data.
    let quizzes = service
        .list_user_quizzes(user_id, Some(1), Some(100), None)
        .await
        .expect("user quizzes");
    assert_eq!(quizzes.total, 15);
    assert_eq!(quizzes.items.len(), 15);

    // User side projection for one quiz.
    let users = service
        .list_quiz_users(quiz_ids[0], Some(1), Some(10), None)
        .await
        .expect("quiz users");
    assert_eq!(users.total, 1);
    assert_eq!(users.items[0].user.id, user_id);
}

#[tokio::test]
async fn remove_hard_deletes_and_reports_missing_rows() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let service = AssignmentService::new(pool.clone());
    let user_id = seed_user(&pool, "admin").await;
    let quiz_id = seed_quiz(&pool).await;

    let created = service
        .create(payload(user_id, quiz_id), ASSIGNED_BY)
        .await
        .expect("create");

    service.remove(created.id).await.expect("remove");
    assert!(service
        .find_by_user_and_quiz(user_id, quiz_id)
        .await
        .expect("lookup")
        .is_none());

    let err = service.remove(created.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let err = service.remove(0).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

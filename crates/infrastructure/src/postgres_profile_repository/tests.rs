use chrono::Utc;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use notenest_application::ProfileRepository;
use notenest_core::PrincipalId;
use notenest_domain::{Profile, ProfileId, ProfilePatch, Role};

use super::PostgresProfileRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres profile tests: {error}");
    }

    Some(pool)
}

async fn ensure_principal(pool: &PgPool, principal_id: PrincipalId, email: &str) {
    let insert = sqlx::query(
        r#"
        INSERT INTO principals (id, email, email_verified, password_hash)
        VALUES ($1, $2, TRUE, 'test-hash')
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(principal_id.as_uuid())
    .bind(email)
    .execute(pool)
    .await;

    assert!(insert.is_ok());
}

fn faculty_profile(principal_id: PrincipalId, email: &str) -> Profile {
    faculty_profile_created_at(principal_id, email, Utc::now())
}

fn faculty_profile_created_at(
    principal_id: PrincipalId,
    email: &str,
    created_at: chrono::DateTime<Utc>,
) -> Profile {
    Profile::new(
        ProfileId::new(),
        principal_id,
        "Grace Hopper",
        email,
        Some("+1 555 0100".to_owned()),
        "Computer Science",
        Role::Faculty,
        vec!["Algorithms".to_owned(), "Compilers".to_owned()],
        created_at,
        created_at,
    )
    .unwrap_or_else(|_| panic!("test profile"))
}

#[tokio::test]
async fn subjects_survive_a_round_trip() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresProfileRepository::new(pool.clone());
    let principal_id = PrincipalId::new();
    let email = format!("roundtrip-{}@example.edu", Uuid::new_v4());
    ensure_principal(&pool, principal_id, &email).await;

    let created = repository
        .create(faculty_profile(principal_id, &email))
        .await
        .unwrap_or_else(|_| panic!("create"));

    let found = repository
        .find_by_principal(principal_id)
        .await
        .unwrap_or_else(|_| panic!("find"))
        .unwrap_or_else(|| panic!("profile should exist"));

    assert_eq!(found.subjects(), created.subjects());
    assert_eq!(found.phone(), created.phone());
    assert_eq!(found.role(), Role::Faculty);
}

#[tokio::test]
async fn listings_are_newest_first() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresProfileRepository::new(pool.clone());
    let now = Utc::now();

    let older_principal = PrincipalId::new();
    let older_email = format!("order-older-{}@example.edu", Uuid::new_v4());
    ensure_principal(&pool, older_principal, &older_email).await;
    let older = repository
        .create(faculty_profile_created_at(
            older_principal,
            &older_email,
            now - chrono::Duration::minutes(10),
        ))
        .await
        .unwrap_or_else(|_| panic!("create"));

    let newer_principal = PrincipalId::new();
    let newer_email = format!("order-newer-{}@example.edu", Uuid::new_v4());
    ensure_principal(&pool, newer_principal, &newer_email).await;
    let newer = repository
        .create(faculty_profile_created_at(newer_principal, &newer_email, now))
        .await
        .unwrap_or_else(|_| panic!("create"));

    let all = repository.list_all().await.unwrap_or_else(|_| panic!("list"));
    let newer_position = all
        .iter()
        .position(|profile| profile.id() == newer.id())
        .unwrap_or_else(|| panic!("newer profile missing from listing"));
    let older_position = all
        .iter()
        .position(|profile| profile.id() == older.id())
        .unwrap_or_else(|| panic!("older profile missing from listing"));
    assert!(newer_position < older_position);
}

#[tokio::test]
async fn update_persists_patched_fields() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresProfileRepository::new(pool.clone());
    let principal_id = PrincipalId::new();
    let email = format!("update-{}@example.edu", Uuid::new_v4());
    ensure_principal(&pool, principal_id, &email).await;

    let created = repository
        .create(faculty_profile(principal_id, &email))
        .await
        .unwrap_or_else(|_| panic!("create"));

    let patch = ProfilePatch {
        subjects: Some(vec!["Databases".to_owned()]),
        ..ProfilePatch::default()
    };
    let patched = created
        .apply_patch(patch, Utc::now())
        .unwrap_or_else(|_| panic!("patch"));

    repository
        .update(patched)
        .await
        .unwrap_or_else(|_| panic!("update"));

    let found = repository
        .find_by_id(created.id())
        .await
        .unwrap_or_else(|_| panic!("find"))
        .unwrap_or_else(|| panic!("profile should exist"));
    assert_eq!(found.subjects(), ["Databases"]);
}

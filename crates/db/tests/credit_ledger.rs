//! Integration tests for ledger primitives: conditional debits under
//! concurrency, the payment-flag CAS, and status transition guards.

use atelier_db::models::status::TrainingStatus;
use atelier_db::models::training_job::CreateTrainingJob;
use atelier_db::repositories::{TrainingJobRepo, UserRepo};
use sqlx::PgPool;
use uuid::Uuid;

async fn seed_user(pool: &PgPool, balance: i64) -> Uuid {
    let id = Uuid::new_v4();
    UserRepo::create(pool, id, balance).await.unwrap();
    id
}

async fn seed_job(pool: &PgPool, user_id: Uuid, is_paid: bool) -> Uuid {
    let id = Uuid::new_v4();
    TrainingJobRepo::create(
        pool,
        &CreateTrainingJob {
            id,
            user_id,
            is_paid,
            cover_image_url: None,
        },
    )
    .await
    .unwrap();
    id
}

// ---------------------------------------------------------------------------
// Conditional debit
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn debit_succeeds_when_affordable(pool: PgPool) {
    let user_id = seed_user(&pool, 150).await;

    assert!(UserRepo::debit(&pool, user_id, 100).await.unwrap());

    let user = UserRepo::find_by_id(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(user.credit_balance, 50);
}

#[sqlx::test]
async fn debit_fails_without_touching_balance(pool: PgPool) {
    let user_id = seed_user(&pool, 99).await;

    assert!(!UserRepo::debit(&pool, user_id, 100).await.unwrap());

    let user = UserRepo::find_by_id(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(user.credit_balance, 99);
}

#[sqlx::test]
async fn debit_unknown_user_is_a_clean_miss(pool: PgPool) {
    assert!(!UserRepo::debit(&pool, Uuid::new_v4(), 100).await.unwrap());
}

/// The over-subscription property: with balance 250 and cost 100, at most
/// two of five concurrent debits may land, and the balance never goes
/// negative.
#[sqlx::test]
async fn concurrent_debits_never_oversubscribe(pool: PgPool) {
    let user_id = seed_user(&pool, 250).await;

    let mut handles = Vec::new();
    for _ in 0..5 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            UserRepo::debit(&pool, user_id, 100).await.unwrap()
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        if handle.await.unwrap() {
            succeeded += 1;
        }
    }

    assert_eq!(succeeded, 2, "exactly floor(250/100) debits may land");

    let user = UserRepo::find_by_id(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(user.credit_balance, 50);
}

#[sqlx::test]
async fn credit_restores_balance(pool: PgPool) {
    let user_id = seed_user(&pool, 0).await;

    assert!(UserRepo::credit(&pool, user_id, 100).await.unwrap());

    let user = UserRepo::find_by_id(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(user.credit_balance, 100);
}

// ---------------------------------------------------------------------------
// Payment-flag CAS
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn claim_paid_lands_exactly_once(pool: PgPool) {
    let user_id = seed_user(&pool, 100).await;
    let job_id = seed_job(&pool, user_id, false).await;

    assert!(TrainingJobRepo::claim_paid(&pool, job_id).await.unwrap());
    assert!(!TrainingJobRepo::claim_paid(&pool, job_id).await.unwrap());

    let job = TrainingJobRepo::find_by_id(&pool, job_id).await.unwrap().unwrap();
    assert!(job.is_paid);
}

#[sqlx::test]
async fn release_paid_mirrors_claim(pool: PgPool) {
    let user_id = seed_user(&pool, 100).await;
    let job_id = seed_job(&pool, user_id, true).await;

    assert!(TrainingJobRepo::release_paid(&pool, job_id).await.unwrap());
    assert!(!TrainingJobRepo::release_paid(&pool, job_id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Status transition guards
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn pending_job_moves_to_processing(pool: PgPool) {
    let user_id = seed_user(&pool, 100).await;
    let job_id = seed_job(&pool, user_id, false).await;

    assert!(
        TrainingJobRepo::transition_status(&pool, job_id, TrainingStatus::Processing)
            .await
            .unwrap()
    );

    let job = TrainingJobRepo::find_by_id(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.status_id, TrainingStatus::Processing.id());
}

#[sqlx::test]
async fn terminal_job_never_regresses(pool: PgPool) {
    let user_id = seed_user(&pool, 100).await;
    let job_id = seed_job(&pool, user_id, false).await;

    assert!(TrainingJobRepo::mark_succeeded(&pool, job_id, "https://weights.example/a.tar")
        .await
        .unwrap());

    // A late failure report must not overwrite the success.
    assert!(!TrainingJobRepo::mark_failed(&pool, job_id, "late failure").await.unwrap());
    assert!(
        !TrainingJobRepo::transition_status(&pool, job_id, TrainingStatus::Processing)
            .await
            .unwrap()
    );

    let job = TrainingJobRepo::find_by_id(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.status_id, TrainingStatus::Succeeded.id());
    assert_eq!(job.progress_percent, 100);
}

#[sqlx::test]
async fn repeated_success_refreshes_artifact_idempotently(pool: PgPool) {
    let user_id = seed_user(&pool, 100).await;
    let job_id = seed_job(&pool, user_id, false).await;

    assert!(TrainingJobRepo::mark_succeeded(&pool, job_id, "https://weights.example/v1")
        .await
        .unwrap());
    assert!(TrainingJobRepo::mark_succeeded(&pool, job_id, "https://weights.example/v1")
        .await
        .unwrap());

    let job = TrainingJobRepo::find_by_id(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.artifact_url.as_deref(), Some("https://weights.example/v1"));
}

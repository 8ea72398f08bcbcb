//! Credit ledger operations.
//!
//! Money movement composes two conditional single-row updates: the
//! `is_paid` claim on the job and the guarded balance update on the
//! account. Settlement and refund run both inside one transaction, so a
//! losing debit rolls the claim back and a repeat call finds nothing left
//! to do. Each operation is idempotent per job.

use sqlx::PgPool;

use atelier_core::types::EntityId;
use atelier_db::repositories::{TrainingJobRepo, UserRepo};

use crate::error::PipelineError;

/// Ledger entry points shared by submission and reconciliation.
pub struct Ledger;

impl Ledger {
    /// Reserve `cost` credits by debiting the account now.
    ///
    /// Fails with [`PipelineError::InsufficientCredits`] when the balance
    /// does not cover the cost; two concurrent reservations can never
    /// both win the same credits.
    pub async fn reserve(
        pool: &PgPool,
        user_id: EntityId,
        cost: i64,
    ) -> Result<(), PipelineError> {
        if cost == 0 {
            return Ok(());
        }
        if UserRepo::debit(pool, user_id, cost).await? {
            Ok(())
        } else {
            Err(PipelineError::InsufficientCredits)
        }
    }

    /// Verify the account could afford `cost` without debiting.
    /// Used by the `Completion` charge point, which debits at success.
    pub async fn check_affordable(
        pool: &PgPool,
        user_id: EntityId,
        cost: i64,
    ) -> Result<(), PipelineError> {
        let user = UserRepo::find_by_id(pool, user_id)
            .await?
            .ok_or(PipelineError::NotFound {
                entity: "User",
                id: user_id,
            })?;
        if user.credit_balance < cost {
            return Err(PipelineError::InsufficientCredits);
        }
        Ok(())
    }

    /// Settle a succeeded job: claim `is_paid`, then debit.
    ///
    /// Returns `true` when this call performed the debit, `false` when
    /// the job was already paid (idempotent repeat). A debit that loses
    /// to an insufficient balance rolls the claim back and surfaces
    /// [`PipelineError::InsufficientCredits`], leaving the job unpaid.
    pub async fn settle_success(
        pool: &PgPool,
        job_id: EntityId,
        user_id: EntityId,
        cost: i64,
    ) -> Result<bool, PipelineError> {
        let mut tx = pool.begin().await?;

        if !TrainingJobRepo::claim_paid(&mut *tx, job_id).await? {
            tx.rollback().await?;
            return Ok(false);
        }

        if !UserRepo::debit(&mut *tx, user_id, cost).await? {
            tx.rollback().await?;
            return Err(PipelineError::InsufficientCredits);
        }

        tx.commit().await?;

        tracing::info!(%job_id, %user_id, cost, "Job cost settled");
        Ok(true)
    }

    /// Reverse a paid job's debit: release `is_paid`, then credit.
    ///
    /// The release claim makes the refund land at most once per job.
    /// Returns `true` when this call performed the refund.
    pub async fn refund_paid_job(
        pool: &PgPool,
        job_id: EntityId,
        user_id: EntityId,
        cost: i64,
    ) -> Result<bool, PipelineError> {
        let mut tx = pool.begin().await?;

        if !TrainingJobRepo::release_paid(&mut *tx, job_id).await? {
            tx.rollback().await?;
            return Ok(false);
        }

        UserRepo::credit(&mut *tx, user_id, cost).await?;
        tx.commit().await?;

        tracing::info!(%job_id, %user_id, cost, "Job cost refunded");
        Ok(true)
    }
}

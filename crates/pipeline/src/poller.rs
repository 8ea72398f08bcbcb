//! Status polling and reconciliation.
//!
//! One poll observes the remote training run and brings the local job
//! row and credit balance in line with it. Reconciliation is idempotent:
//! the `is_paid` claim and the status transition guards make repeat polls
//! of the same terminal state no-ops, and a stale poll can never regress
//! a terminal job.

use std::sync::Arc;

use sqlx::PgPool;

use atelier_core::progress::extract_progress_percent;
use atelier_core::types::EntityId;
use atelier_db::models::status::TrainingStatus;
use atelier_db::models::training_job::TrainingJob;
use atelier_db::repositories::TrainingJobRepo;
use atelier_services::{RemoteStatus, TrainingService};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::ledger::Ledger;

/// Result of one poll: the job row after reconciliation plus the
/// progress percentage extracted on this observation.
#[derive(Debug)]
pub struct PollOutcome {
    pub job: TrainingJob,
    pub progress_percent: i16,
}

/// Observes remote training state and reconciles local rows.
pub struct StatusPoller {
    pool: PgPool,
    trainer: Arc<dyn TrainingService>,
    config: Arc<PipelineConfig>,
}

impl StatusPoller {
    pub fn new(pool: PgPool, trainer: Arc<dyn TrainingService>, config: Arc<PipelineConfig>) -> Self {
        Self {
            pool,
            trainer,
            config,
        }
    }

    /// Poll one job.
    ///
    /// Never fails because the upstream service is unreachable: in that
    /// case the last-known local state is returned with zero progress so
    /// polling clients degrade gracefully instead of erroring out.
    pub async fn poll(&self, job_id: EntityId) -> Result<PollOutcome, PipelineError> {
        let job = TrainingJobRepo::find_by_id(&self.pool, job_id)
            .await?
            .ok_or(PipelineError::NotFound {
                entity: "TrainingJob",
                id: job_id,
            })?;

        let status = TrainingStatus::from_id(job.status_id)?;

        // Terminal jobs are served from the local row; the remote run is
        // done and the ledger already settled.
        if status.is_terminal() {
            let progress = if status == TrainingStatus::Succeeded {
                100
            } else {
                job.progress_percent
            };
            return Ok(PollOutcome {
                progress_percent: progress,
                job,
            });
        }

        // Not yet submitted to the external service: nothing to observe.
        let Some(external_id) = job.external_id.clone() else {
            let progress = job.progress_percent;
            return Ok(PollOutcome {
                progress_percent: progress,
                job,
            });
        };

        let remote = match self.trainer.get(&external_id).await {
            Ok(remote) => remote,
            Err(e) => {
                tracing::warn!(%job_id, %external_id, error = %e,
                    "Training service unreachable; serving last known state");
                return Ok(PollOutcome {
                    progress_percent: 0,
                    job,
                });
            }
        };

        let progress =
            extract_progress_percent(&remote.logs, remote.status == RemoteStatus::Succeeded);

        match remote.status {
            RemoteStatus::Succeeded => {
                if let Some(weights_url) = remote.weights_url.as_deref() {
                    self.reconcile_success(&job, weights_url).await?;
                } else {
                    // Succeeded without an artifact reference: keep the
                    // job observable and try again on the next poll.
                    tracing::warn!(%job_id, %external_id,
                        "Remote run succeeded but reported no artifact yet");
                    TrainingJobRepo::update_progress(&self.pool, job.id, progress).await?;
                }
            }
            RemoteStatus::Failed | RemoteStatus::Canceled => {
                self.reconcile_failure(&job, remote.status).await?;
            }
            RemoteStatus::Starting | RemoteStatus::Processing | RemoteStatus::Unknown => {
                TrainingJobRepo::transition_status(&self.pool, job.id, TrainingStatus::Processing)
                    .await?;
                TrainingJobRepo::update_progress(&self.pool, job.id, progress).await?;
            }
        }

        let job = TrainingJobRepo::find_by_id(&self.pool, job_id)
            .await?
            .ok_or(PipelineError::NotFound {
                entity: "TrainingJob",
                id: job_id,
            })?;

        Ok(PollOutcome {
            progress_percent: progress,
            job,
        })
    }

    /// Remote succeeded with an artifact: settle the cost (exactly once),
    /// then persist artifact + terminal status.
    ///
    /// Settlement comes first so a job is never marked succeeded while
    /// its debit failed; the losing caller surfaces `InsufficientCredits`
    /// and the job stays in its last consistent state.
    async fn reconcile_success(
        &self,
        job: &TrainingJob,
        weights_url: &str,
    ) -> Result<(), PipelineError> {
        let debited = Ledger::settle_success(
            &self.pool,
            job.id,
            job.user_id,
            self.config.credit.job_cost,
        )
        .await?;

        TrainingJobRepo::mark_succeeded(&self.pool, job.id, weights_url).await?;

        if debited {
            tracing::info!(job_id = %job.id, "Training succeeded; cost committed");
        } else {
            tracing::debug!(job_id = %job.id, "Training success re-observed; no ledger change");
        }
        Ok(())
    }

    /// Remote failed or was canceled: record the terminal status, and
    /// refund only when the policy opts in (the provider may already
    /// have done billable work, so the default keeps the debit).
    async fn reconcile_failure(
        &self,
        job: &TrainingJob,
        remote_status: RemoteStatus,
    ) -> Result<(), PipelineError> {
        let message = match remote_status {
            RemoteStatus::Canceled => "Training canceled on the execution service",
            _ => "Training failed on the execution service",
        };
        let moved = TrainingJobRepo::mark_failed(&self.pool, job.id, message).await?;

        if moved && self.config.credit.refund_terminal_failure {
            let refunded = Ledger::refund_paid_job(
                &self.pool,
                job.id,
                job.user_id,
                self.config.credit.job_cost,
            )
            .await?;
            if refunded {
                tracing::info!(job_id = %job.id, "Terminal failure refunded per policy");
            }
        }

        Ok(())
    }
}

//! Pipeline configuration loaded from environment variables.
//!
//! Every business constant that varied across deployments of the
//! original service is a named setting here with a default, so behavior
//! differences are configuration choices rather than code branches.

use std::time::Duration;

use atelier_core::prompt::TRIGGER_WORD;
use atelier_services::TrainingParams;

/// When a job's fixed cost is debited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargePoint {
    /// Debit when the job is submitted (default).
    Submission,
    /// Only verify affordability at submission; debit when the poller
    /// observes success.
    Completion,
}

/// Credit accounting policy for training jobs.
#[derive(Debug, Clone)]
pub struct CreditPolicy {
    /// Fixed cost of one training job.
    pub job_cost: i64,
    pub charge_point: ChargePoint,
    /// Whether a job that fails remotely after confirmed submission is
    /// re-credited. Off by default: the provider has already done
    /// billable work at that point.
    pub refund_terminal_failure: bool,
}

impl Default for CreditPolicy {
    fn default() -> Self {
        Self {
            job_cost: 100,
            charge_point: ChargePoint::Submission,
            refund_terminal_failure: false,
        }
    }
}

/// Retention windows for prediction rows.
#[derive(Debug, Clone)]
pub struct RetentionWindows {
    /// Rows older than this are purged by the read-path sweep.
    pub purge: chrono::Duration,
    /// Reads return rows no older than this.
    pub display: chrono::Duration,
}

impl Default for RetentionWindows {
    fn default() -> Self {
        Self {
            purge: chrono::Duration::hours(1),
            display: chrono::Duration::hours(24),
        }
    }
}

/// Limits and retry settings for on-demand generation.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    /// Maximum text-generation attempts before giving up on refusals.
    pub max_attempts: u32,
    /// Fixed delay between refusal retries (not exponential).
    pub retry_delay: Duration,
    /// Maximum images per request.
    pub max_images: u32,
    /// Free prediction slots per product before credits are charged.
    pub free_quota_per_product: i64,
    /// Credit cost per image beyond the free quota.
    pub per_image_cost: i64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay: Duration::from_secs(1),
            max_images: 10,
            free_quota_per_product: 30,
            per_image_cost: 5,
        }
    }
}

/// Input constraints and training hyperparameters for submissions.
#[derive(Debug, Clone)]
pub struct SubmissionSettings {
    /// Minimum batch size; some deployments require 4.
    pub min_images: usize,
    /// Maximum batch size.
    pub max_images: usize,
    pub steps: u32,
    /// Default adapter rank.
    pub lora_rank: u32,
    /// Adapter rank for jewelry batches (fine detail needs more capacity).
    pub jewelry_lora_rank: u32,
    pub optimizer: String,
    pub batch_size: u32,
    pub resolution: String,
    pub learning_rate: f64,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self {
            min_images: 1,
            max_images: 20,
            steps: 1000,
            lora_rank: 16,
            jewelry_lora_rank: 32,
            optimizer: "adamw8bit".to_string(),
            batch_size: 1,
            resolution: "512,768,1024".to_string(),
            learning_rate: 0.0004,
        }
    }
}

impl SubmissionSettings {
    /// Build the training request hyperparameters for one batch.
    pub fn training_params(&self, product_kind: Option<&str>) -> TrainingParams {
        let lora_rank = if product_kind == Some("jewelry") {
            self.jewelry_lora_rank
        } else {
            self.lora_rank
        };

        TrainingParams {
            steps: self.steps,
            lora_rank,
            optimizer: self.optimizer.clone(),
            batch_size: self.batch_size,
            resolution: self.resolution.clone(),
            autocaption: true,
            trigger_word: TRIGGER_WORD.to_string(),
            learning_rate: self.learning_rate,
            autocaption_prefix: Some(format!("a photo of {TRIGGER_WORD}")),
        }
    }
}

/// All pipeline settings.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub credit: CreditPolicy,
    pub retention: RetentionWindows,
    pub generation: GenerationSettings,
    pub submission: SubmissionSettings,
}

impl PipelineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default      |
    /// |-------------------------------|--------------|
    /// | `JOB_COST`                    | `100`        |
    /// | `CHARGE_POINT`                | `submission` |
    /// | `REFUND_TERMINAL_FAILURE`     | `false`      |
    /// | `PREDICTION_PURGE_HOURS`      | `1`          |
    /// | `PREDICTION_DISPLAY_HOURS`    | `24`         |
    /// | `PROMPT_MAX_ATTEMPTS`         | `5`          |
    /// | `PROMPT_RETRY_DELAY_MS`       | `1000`       |
    /// | `GENERATION_MAX_IMAGES`       | `10`         |
    /// | `FREE_QUOTA_PER_PRODUCT`      | `30`         |
    /// | `PER_IMAGE_COST`              | `5`          |
    /// | `SUBMISSION_MIN_IMAGES`       | `1`          |
    /// | `SUBMISSION_MAX_IMAGES`       | `20`         |
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.credit.job_cost = env_parse("JOB_COST", config.credit.job_cost);
        config.credit.charge_point = match std::env::var("CHARGE_POINT").as_deref() {
            Ok("completion") => ChargePoint::Completion,
            _ => ChargePoint::Submission,
        };
        config.credit.refund_terminal_failure =
            env_parse("REFUND_TERMINAL_FAILURE", config.credit.refund_terminal_failure);

        config.retention.purge =
            chrono::Duration::hours(env_parse("PREDICTION_PURGE_HOURS", 1));
        config.retention.display =
            chrono::Duration::hours(env_parse("PREDICTION_DISPLAY_HOURS", 24));

        config.generation.max_attempts =
            env_parse("PROMPT_MAX_ATTEMPTS", config.generation.max_attempts);
        config.generation.retry_delay =
            Duration::from_millis(env_parse("PROMPT_RETRY_DELAY_MS", 1000));
        config.generation.max_images =
            env_parse("GENERATION_MAX_IMAGES", config.generation.max_images);
        config.generation.free_quota_per_product =
            env_parse("FREE_QUOTA_PER_PRODUCT", config.generation.free_quota_per_product);
        config.generation.per_image_cost =
            env_parse("PER_IMAGE_COST", config.generation.per_image_cost);

        config.submission.min_images =
            env_parse("SUBMISSION_MIN_IMAGES", config.submission.min_images);
        config.submission.max_images =
            env_parse("SUBMISSION_MAX_IMAGES", config.submission.max_images);

        config
    }
}

/// Parse an env var, falling back to `default` when unset or malformed.
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.credit.job_cost, 100);
        assert_eq!(config.credit.charge_point, ChargePoint::Submission);
        assert!(!config.credit.refund_terminal_failure);
        assert_eq!(config.retention.purge, chrono::Duration::hours(1));
        assert_eq!(config.retention.display, chrono::Duration::hours(24));
        assert_eq!(config.generation.max_attempts, 5);
        assert_eq!(config.generation.retry_delay, Duration::from_secs(1));
    }

    #[test]
    fn jewelry_batches_get_the_larger_rank() {
        let settings = SubmissionSettings::default();
        assert_eq!(settings.training_params(Some("jewelry")).lora_rank, 32);
        assert_eq!(settings.training_params(Some("apparel")).lora_rank, 16);
        assert_eq!(settings.training_params(None).lora_rank, 16);
    }

    #[test]
    fn training_params_carry_trigger_word() {
        let params = SubmissionSettings::default().training_params(None);
        assert_eq!(params.trigger_word, "TOK");
        assert_eq!(params.autocaption_prefix.as_deref(), Some("a photo of TOK"));
        assert!(params.autocaption);
    }
}

//! Orchestration flows over the database and external services.
//!
//! Three request-scoped flows plus the credit ledger they share:
//!
//! - [`submission::SubmissionPipeline`] -- uploads, background removal,
//!   archiving, and training kickoff.
//! - [`poller::StatusPoller`] -- remote status observation and idempotent
//!   reconciliation of job + credit state.
//! - [`generation::GenerationFlow`] -- refusal-guarded prompt writing and
//!   image synthesis with per-image persistence.

pub mod archive;
pub mod config;
pub mod error;
pub mod generation;
pub mod ledger;
pub mod poller;
pub mod submission;

pub use config::PipelineConfig;
pub use error::PipelineError;

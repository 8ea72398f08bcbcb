//! External SaaS collaborators behind narrow trait contracts.
//!
//! Every external dependency (object storage, training service,
//! text generation, image synthesis, background removal) is a trait with
//! one HTTP implementation. Callers receive trait objects via
//! constructor injection so tests substitute scripted stubs.

pub mod error;
mod http;
pub mod imagegen;
pub mod rembg;
pub mod storage;
pub mod textgen;
pub mod training;

pub use error::ServiceError;
pub use imagegen::{HttpImageSynthesis, ImageSynthesis, SynthesisRequest};
pub use rembg::{BackgroundRemoval, HttpBackgroundRemoval};
pub use storage::{ObjectStorage, S3Storage};
pub use textgen::{HttpTextGeneration, TextGeneration};
pub use training::{HttpTrainingService, RemoteStatus, RemoteTraining, TrainingParams, TrainingService};

//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Query-parameter DTOs where the resource supports listing

pub mod prediction;
pub mod status;
pub mod training_job;
pub mod user;

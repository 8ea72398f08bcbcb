//! Training job status enum mapping to the `training_statuses` lookup table.
//!
//! The variant discriminants match the seed data order (1-based) in the
//! migration. Transitions follow a closed table; out-of-order updates are
//! rejected at the SQL layer rather than overwriting blindly.

use atelier_core::error::CoreError;

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

/// Training job lifecycle status.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingStatus {
    Pending = 1,
    Processing = 2,
    Succeeded = 3,
    Failed = 4,
}

impl TrainingStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Parse from the database status ID.
    pub fn from_id(id: StatusId) -> Result<Self, CoreError> {
        match id {
            1 => Ok(Self::Pending),
            2 => Ok(Self::Processing),
            3 => Ok(Self::Succeeded),
            4 => Ok(Self::Failed),
            other => Err(CoreError::Internal(format!("Unknown status id {other}"))),
        }
    }

    /// Database/API name value.
    pub fn name(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    /// Whether this status permits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Closed transition table. Repeating the current status is allowed
    /// (polling reconciles the same terminal state more than once); a
    /// terminal status never moves to a different one.
    pub fn can_transition_to(self, next: TrainingStatus) -> bool {
        if self == next {
            return true;
        }
        match self {
            Self::Pending => matches!(next, Self::Processing | Self::Succeeded | Self::Failed),
            Self::Processing => matches!(next, Self::Succeeded | Self::Failed),
            Self::Succeeded | Self::Failed => false,
        }
    }

    /// Status IDs allowed to move into `next` (including `next` itself).
    /// Used to build the SQL guard on status updates.
    pub fn allowed_sources(next: TrainingStatus) -> Vec<StatusId> {
        [Self::Pending, Self::Processing, Self::Succeeded, Self::Failed]
            .into_iter()
            .filter(|from| from.can_transition_to(next))
            .map(Self::id)
            .collect()
    }
}

impl From<TrainingStatus> for StatusId {
    fn from(value: TrainingStatus) -> Self {
        value as StatusId
    }
}

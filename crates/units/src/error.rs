use thiserror::Error;

pub type Result<T> = std::result::Result<T, UnitError>;

#[derive(Error, Debug)]
pub enum UnitError {
    #[error("invalid mode for {operation}: {mode}")]
    InvalidMode { operation: String, mode: String },

    #[error(
        "not waiting longer than MaxTimeOut({cap}), longer operation will run in the background and result can be gathered with separate function"
    )]
    TimeoutOverCap { requested: u64, cap: u64 },

    #[error("requested state {0} is not a valid state")]
    InvalidState(String),

    #[error("invalid unit name: {0}")]
    InvalidUnitName(String),

    #[error("{operation} of {unit} (job {job_id}) is still in progress")]
    JobInFlight {
        job_id: u32,
        unit: String,
        operation: String,
    },

    #[error("no lifecycle job is waiting for a result")]
    NoJob,

    #[error("found no units with name pattern: {0:?}")]
    NotFound(Vec<String>),

    #[error("{0}")]
    Transport(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl UnitError {
    /// Validation failures are raised before anything is sent to the service manager.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidMode { .. }
                | Self::TimeoutOverCap { .. }
                | Self::InvalidState(_)
                | Self::InvalidUnitName(_)
        )
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidMode { .. }
            | Self::TimeoutOverCap { .. }
            | Self::InvalidState(_)
            | Self::InvalidUnitName(_) => "invalid_request",
            Self::JobInFlight { .. } => "job_in_flight",
            Self::NoJob => "no_job",
            Self::NotFound(_) => "not_found",
            Self::Transport(_) | Self::IoError(_) | Self::SerializationError(_) => "transport",
        }
    }
}

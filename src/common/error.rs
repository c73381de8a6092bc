use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Robot not found: {id}")]
    RobotNotFound { id: String },

    #[error("Waypoint not found: {id}")]
    WaypointNotFound { id: String },

    #[error("Zone not found: {id}")]
    ZoneNotFound { id: String },

    #[error("Invalid command: {reason}")]
    InvalidCommand { reason: String },

    #[error("Unsupported map version: {version}")]
    UnsupportedVersion { version: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Infrastructure error: {0}")]
    InfrastructureError(String),
}

impl DomainError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        DomainError::InvalidCommand {
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Event store error: {0}")]
    EventStore(String),

    #[error("Editor runtime error: {0}")]
    Runtime(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;

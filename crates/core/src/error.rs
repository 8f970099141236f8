use crate::validation::FieldError;

#[derive(Debug, thiserror::Error)]
pub enum CardioError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("age {0} is outside every age category (18 to 150)")]
    InvalidAge(i64),
    #[error("invalid sex token '{0}' (expected \"M\" or \"F\")")]
    InvalidSex(String),
    #[error("invalid clock value '{0}' (expected HH:mm:ss)")]
    InvalidClock(String),
    #[error("clock seconds {0} out of range (0..86400)")]
    ClockOutOfRange(u32),
    #[error("end time {end} must be after start time {start}")]
    InvalidTimeRange { start: String, end: String },
    #[error("unknown role '{0}'")]
    UnknownRole(String),
    #[error("unknown patient status '{0}'")]
    UnknownPatientStatus(String),
    #[error("no active session; log in first")]
    NoActiveSession,
    #[error("role {0} cannot open this view")]
    Forbidden(crate::Role),
    #[error("form has {} invalid field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to read local storage: {0}")]
    StorageRead(std::io::Error),
    #[error("failed to write local storage: {0}")]
    StorageWrite(std::io::Error),
    #[error("failed to clear local storage: {0}")]
    StorageClear(std::io::Error),
    #[error("failed to serialize value: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize value: {0}")]
    Deserialization(serde_json::Error),
}

pub type CardioResult<T> = std::result::Result<T, CardioError>;

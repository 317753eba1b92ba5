use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid scheduler config: {reason}")]
    InvalidConfig { reason: String },

    #[error("Corrupt {table} record: {detail}")]
    CorruptRecord { table: &'static str, detail: String },

    #[error("Schedule '{schedule_id}' not found")]
    ScheduleNotFound { schedule_id: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SchedResult<T> = Result<T, SchedError>;

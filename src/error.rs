use thiserror::Error;

/// Fatal problems detected before any benchmark runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} function is not set")]
    MissingCapability(&'static str),
    #[error("'-n <num records>' invalid option value: {0} (must be > 1000 and <= 10^16)")]
    InvalidNum(i64),
    #[error("'-vz <value size>' invalid option value: {0} (must be > 0)")]
    InvalidValueSize(i64),
    #[error("'-vz <value size>' {size} exceeds the random data pool ({max} bytes)")]
    ValueSizeTooLarge { size: usize, max: usize },
}

/// Failure reported by a backend capability.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("database is not open")]
    NotOpen,
    #[error("{0}")]
    Message(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "sled")]
    #[error("sled: {0}")]
    Sled(#[from] sled::Error),
    #[cfg(feature = "redb")]
    #[error("redb: {0}")]
    Redb(#[from] redb::Error),
}

impl BackendError {
    pub fn msg(msg: impl Into<String>) -> Self {
        BackendError::Message(msg.into())
    }
}

/// Why a single benchmark run failed.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("'{name}' requires fresh_db={expected}, context has fresh_db={actual}")]
    Precondition {
        name: &'static str,
        expected: bool,
        actual: bool,
    },
    #[error("missing key '{0}' was found")]
    UnexpectedFound(String),
    #[error("backend: {0}")]
    Backend(#[from] BackendError),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

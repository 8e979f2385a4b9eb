//! Store error types.

use std::path::PathBuf;

use subway_core::{LineId, SectionId, StationId, TopologyError, ValidationError};

/// Errors from loading, mutating, or saving a network.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("corrupt line topology: {0}")]
    Topology(#[from] TopologyError),

    #[error("station {0} not found")]
    StationNotFound(StationId),

    #[error("line {0} not found")]
    LineNotFound(LineId),

    #[error("section {0} not found")]
    SectionNotFound(SectionId),

    #[error("section {section} references missing station {station}")]
    DanglingStation {
        section: SectionId,
        station: StationId,
    },

    #[error("stored section {id} is invalid: {reason}")]
    InvalidSectionRow {
        id: SectionId,
        reason: ValidationError,
    },

    #[error("station '{0}' already exists")]
    DuplicateStationName(String),

    #[error("line '{0}' already exists")]
    DuplicateLineName(String),

    #[error("{field} must not be blank")]
    BlankName { field: &'static str },

    #[error("station {0} is still used by a line")]
    StationInUse(StationId),

    #[error(
        "store {path} is locked by {}; delete {lock} if that process has exited",
        holder_name(.holder)
    )]
    Locked {
        path: PathBuf,
        lock: PathBuf,
        /// Process id recorded in the lock file, if it could be read.
        holder: Option<u32>,
    },

    #[error("store {path} already exists")]
    AlreadyExists { path: PathBuf },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("invalid network file magic bytes")]
    InvalidMagic,

    #[error("unsupported network file version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityFailed { expected: String, actual: String },

    #[error("network file too short: need at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// The caller can fix the request and retry.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StoreError::Validation(_)
                | StoreError::StationNotFound(_)
                | StoreError::LineNotFound(_)
                | StoreError::DuplicateStationName(_)
                | StoreError::DuplicateLineName(_)
                | StoreError::BlankName { .. }
                | StoreError::StationInUse(_)
                | StoreError::AlreadyExists { .. }
        )
    }

    /// Stored state is damaged. Retrying will not help.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            StoreError::Topology(_)
                | StoreError::SectionNotFound(_)
                | StoreError::DanglingStation { .. }
                | StoreError::InvalidSectionRow { .. }
                | StoreError::Deserialization(_)
                | StoreError::InvalidMagic
                | StoreError::UnsupportedVersion { .. }
                | StoreError::IntegrityFailed { .. }
                | StoreError::TooShort { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

fn holder_name(holder: &Option<u32>) -> String {
    match holder {
        Some(pid) => format!("process {pid}"),
        None => "another writer".to_string(),
    }
}

//! Error types for debrepo-core.

use debrepo_config::error::ConfigError;
use debrepo_db::error::DbError;
use debrepo_utils::error::UtilsError;
use miette::Diagnostic;
use thiserror::Error;

/// Coarse classification of a [`DebRepoError`], as surfaced to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed or disallowed input (400-class).
    Validation,
    /// A referenced resource does not exist.
    NotFound,
    /// A version would violate a structural invariant.
    Structural,
    Internal,
}

/// Core error type for debrepo operations.
#[derive(Error, Diagnostic, Debug)]
pub enum DebRepoError {
    #[error("{0}")]
    #[diagnostic(code(debrepo::validation))]
    Validation(String),

    #[error("Unexpected field(s): {}", .0.join(", "))]
    #[diagnostic(
        code(debrepo::unknown_fields),
        help("Remove the listed fields from the request")
    )]
    UnknownFields(Vec<String>),

    #[error("Provided copy criteria is invalid: {}", .0.join("; "))]
    #[diagnostic(
        code(debrepo::copy_criteria),
        help("Each config entry needs 'source_repo_version' and 'dest_repo' hrefs")
    )]
    InvalidCopyCriteria(Vec<String>),

    #[error("Duplicate distribution '{0}' in repository version")]
    #[diagnostic(
        code(debrepo::duplicate_distribution),
        help("A repository version may contain only one release per distribution")
    )]
    DuplicateDistribution(String),

    #[error("More than one content unit claims the path '{path}'")]
    #[diagnostic(code(debrepo::path_collision))]
    PathCollision { path: String },

    #[error("Path '{path}' overlaps with '{parent}'")]
    #[diagnostic(
        code(debrepo::path_overlap),
        help("A published file cannot also be a directory of another published file")
    )]
    PathOverlap { path: String, parent: String },

    #[error("{kind} '{reference}' not found")]
    #[diagnostic(code(debrepo::not_found))]
    ResourceNotFound { kind: &'static str, reference: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Utils(#[from] UtilsError),

    #[error(transparent)]
    #[diagnostic(code(debrepo::json), help("Check the JSON document syntax"))]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    #[diagnostic(code(debrepo::error))]
    Custom(String),

    #[error("Thread lock poison error")]
    #[diagnostic(
        code(debrepo::poison),
        help("This is an internal error, please report it")
    )]
    PoisonError,
}

impl DebRepoError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(_)
            | Self::UnknownFields(_)
            | Self::InvalidCopyCriteria(_)
            | Self::Json(_) => ErrorClass::Validation,
            Self::ResourceNotFound { .. } | Self::Database(DbError::NotFound(_)) => {
                ErrorClass::NotFound
            }
            Self::DuplicateDistribution(_)
            | Self::PathCollision { .. }
            | Self::PathOverlap { .. } => ErrorClass::Structural,
            _ => ErrorClass::Internal,
        }
    }

    pub(crate) fn not_found(kind: &'static str, reference: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            kind,
            reference: reference.into(),
        }
    }
}

impl From<diesel::result::Error> for DebRepoError {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(DbError::from(err))
    }
}

impl<T> From<std::sync::PoisonError<T>> for DebRepoError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::PoisonError
    }
}

pub type Result<T> = std::result::Result<T, DebRepoError>;

//! Error types for the schema module.

use thiserror::Error;

/// Result type alias for schema operations.
pub type ShapeResult<T> = Result<T, ShapeError>;

/// Errors that can occur while defining schemas or constructing descriptors.
///
/// Construction only ever fails with [`ShapeError::MissingRequired`] or
/// [`ShapeError::ArgumentMismatch`]; the remaining variants come from schema
/// definition, accessors and template assembly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("Missing required property '{property}' for {descriptor}")]
    MissingRequired { descriptor: String, property: String },

    #[error("Argument '{argument}' of {descriptor}: expected {expected}, got {actual}")]
    ArgumentMismatch {
        descriptor: String,
        argument: String,
        expected: String,
        actual: String,
    },

    #[error("{descriptor} has no field named '{field}'")]
    UnknownField { descriptor: String, field: String },

    #[error("Invalid schema {schema}: {message}")]
    InvalidSchema { schema: String, message: String },

    #[error("{0} is not a resource schema (no resource type)")]
    NotAResource(String),

    #[error("Duplicate logical id: {0}")]
    DuplicateResource(String),

    #[error("Invalid logical id '{id}' for {dialect}")]
    InvalidLogicalId { id: String, dialect: String },

    #[error("{0} is not a finite number")]
    InvalidNumber(String),
}

impl ShapeError {
    pub(crate) fn mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        ShapeError::ArgumentMismatch {
            descriptor: String::new(),
            argument: String::new(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// True for the two errors a descriptor constructor can raise.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            ShapeError::MissingRequired { .. } | ShapeError::ArgumentMismatch { .. }
        )
    }

    /// Prefix the argument path of a construction error with `segment`.
    ///
    /// Segments starting with `[` (list indices) attach without a dot.
    pub(crate) fn at(self, segment: &str) -> Self {
        match self {
            ShapeError::ArgumentMismatch {
                descriptor,
                argument,
                expected,
                actual,
            } => ShapeError::ArgumentMismatch {
                descriptor,
                argument: join_path(segment, &argument),
                expected,
                actual,
            },
            ShapeError::MissingRequired {
                descriptor,
                property,
            } => ShapeError::MissingRequired {
                descriptor,
                property: join_path(segment, &property),
            },
            other => other,
        }
    }

    /// Attribute a construction error to the descriptor type `name`.
    pub(crate) fn in_descriptor(self, name: &str) -> Self {
        match self {
            ShapeError::ArgumentMismatch {
                argument,
                expected,
                actual,
                ..
            } => ShapeError::ArgumentMismatch {
                descriptor: name.to_string(),
                argument,
                expected,
                actual,
            },
            ShapeError::MissingRequired { property, .. } => ShapeError::MissingRequired {
                descriptor: name.to_string(),
                property,
            },
            other => other,
        }
    }
}

fn join_path(segment: &str, rest: &str) -> String {
    if rest.is_empty() {
        segment.to_string()
    } else if rest.starts_with('[') {
        format!("{}{}", segment, rest)
    } else {
        format!("{}.{}", segment, rest)
    }
}

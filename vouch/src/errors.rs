use thiserror::Error;

use crate::constraints::ConstraintKind;
use crate::violation::ViolationSet;

/// Top-level error type returned by constrained constructors.
#[derive(Debug, Error)]
pub enum Error {
    /// The engine could not evaluate the constraints.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// One or more constraints were violated.
    #[error(transparent)]
    Violations(#[from] ConstraintViolationError),
}

/// Failure of the validation engine itself, as opposed to a failed constraint.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A constraint was applied to a value it cannot judge.
    #[error("constraint {constraint} cannot be applied to {found} at `{path}`")]
    UnexpectedType {
        constraint: ConstraintKind,
        path: String,
        found: &'static str,
    },

    /// `validate_property` was asked for a property the bean does not declare.
    #[error("bean `{bean}` has no property `{property}`")]
    UnknownProperty { bean: String, property: String },

    /// A `pattern` constraint carries a regular expression that does not compile.
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Configuration was readable but semantically wrong.
    #[error("invalid configuration: {message}")]
    Config { message: String },

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Raised by explicit parameter validation when at least one constraint failed.
///
/// The message joins every violation message with `;`, in violation order.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ConstraintViolationError {
    pub message: String,
    pub violations: ViolationSet,
}

impl ConstraintViolationError {
    pub fn new(violations: ViolationSet) -> Self {
        let message = violations.iter().map(|violation| violation.message.as_str()).collect::<Vec<_>>().join(";");
        Self { message, violations }
    }

    /// Returns `Ok(())` for an empty set and an error carrying the set otherwise.
    pub fn check(violations: ViolationSet) -> Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self::new(violations))
        }
    }
}

/// Convenience alias for engine results.
pub type ValidationResult<T> = Result<T, ValidationError>;

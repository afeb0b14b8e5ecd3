//! Declarative constraint validation for Rust records.
//!
//! Constraints are declared on struct fields with `#[derive(Validate)]` and on
//! constructor parameters with `#[constrained]`. The macros reject constraints
//! placed where they cannot apply at compile time; the [`Validator`] evaluates
//! the rest at runtime and reports a [`ViolationSet`].
//!
//! ```text
//! #[derive(Validate)]
//! struct PersonRecord {
//!     #[validate(not_blank(message = "Name cannot be null or empty"))]
//!     name: Option<String>,
//!     #[validate(positive(message = "Age has to be a strictly positive integer"))]
//!     age: i32,
//! }
//!
//! let violations = Validator::default().validate(&person)?;
//! ```

extern crate self as vouch;

pub mod clock;
pub mod config;
pub mod constraints;
pub mod context;
pub mod errors;
pub mod messages;
pub mod path;
pub mod registry;
pub mod testing;
pub mod types;
pub mod validator;
pub mod validators;
pub mod value;
pub mod violation;

pub use clock::{ClockProvider, FixedClock, SystemClock};
pub use config::ValidatorConfig;
pub use constraints::{Constraint, ConstraintKind};
pub use context::ValidationContext;
pub use errors::*;
pub use path::{PathNode, PropertyPath};
pub use registry::{BeanRegistration, find_bean, is_bean_registered, registered_beans};
pub use types::{BeanDescriptor, BeanMetadata, Validate};
pub use validator::{ExecutableValidator, Validator, ValidatorBuilder, default_validator};
pub use value::{ConstraintTarget, Container, Observed};
pub use violation::{ConstraintViolation, ViolationSet};
pub use vouch_macros::{Validate, constrained};

// Re-export inventory for auto-registration in the derive macro
pub use inventory;

use std::fmt;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use chrono::TimeDelta;

use crate::clock::{ClockProvider, SystemClock};
use crate::config::ValidatorConfig;
use crate::context::ValidationContext;
use crate::errors::{ValidationError, ValidationResult};
use crate::messages::{MessageCatalog, MessageInterpolator};
use crate::path::PathNode;
use crate::types::{ExecutableDescriptor, ExecutableKind, Validate};
use crate::violation::ViolationSet;

/// Evaluates declared constraints and collects violations.
///
/// A validator is immutable once built and can be shared across threads.
///
/// ```text
/// let validator = Validator::builder().fail_fast(true).build();
/// let violations = validator.validate(&person)?;
/// ```
pub struct Validator {
    fail_fast: bool,
    temporal_tolerance: TimeDelta,
    interpolator: MessageInterpolator,
    clock: Arc<dyn ClockProvider>,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("fail_fast", &self.fail_fast)
            .field("temporal_tolerance", &self.temporal_tolerance)
            .field("messages", &self.interpolator.catalog().len())
            .finish_non_exhaustive()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Validator {
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::default()
    }

    pub fn from_config(config: &ValidatorConfig) -> Self {
        Self::builder().config(config.clone()).build()
    }

    /// Validates every constraint declared on `bean`, including cascaded beans.
    pub fn validate<T>(&self, bean: &T) -> ValidationResult<ViolationSet>
    where
        T: Validate + ?Sized,
    {
        let descriptor = T::bean_descriptor();
        log::debug!("validating {}", descriptor.name);
        let mut ctx = ValidationContext::new(self, descriptor.name.as_str());
        bean.validate_into(&mut ctx)?;
        let violations = ctx.into_violations();
        log::debug!("validated {}: {} violation(s)", descriptor.name, violations.len());
        Ok(violations)
    }

    /// Validates the constraints of a single property of `bean`.
    pub fn validate_property<T>(&self, bean: &T, property: &str) -> ValidationResult<ViolationSet>
    where
        T: Validate + ?Sized,
    {
        let descriptor = T::bean_descriptor();
        if descriptor.property(property).is_none() {
            return Err(ValidationError::UnknownProperty {
                bean: descriptor.name.clone(),
                property: property.to_string(),
            });
        }
        let mut ctx = ValidationContext::new(self, descriptor.name.as_str());
        bean.validate_property_into(property, &mut ctx)?;
        Ok(ctx.into_violations())
    }

    pub fn for_executables(&self) -> ExecutableValidator<'_> {
        ExecutableValidator { validator: self }
    }

    pub fn is_fail_fast(&self) -> bool {
        self.fail_fast
    }

    pub fn temporal_tolerance(&self) -> TimeDelta {
        self.temporal_tolerance
    }

    pub fn clock(&self) -> &dyn ClockProvider {
        self.clock.as_ref()
    }

    pub fn interpolator(&self) -> &MessageInterpolator {
        &self.interpolator
    }
}

/// Validates constructor parameters before the value is built.
#[derive(Debug, Clone, Copy)]
pub struct ExecutableValidator<'v> {
    validator: &'v Validator,
}

impl ExecutableValidator<'_> {
    /// Runs `validate` with a context rooted at `bean`'s constructor `executable`.
    ///
    /// Generated constructors pass a closure calling
    /// [`ValidationContext::validate_parameter`] for each constrained argument.
    pub fn validate_parameters<F>(
        &self,
        bean: &str,
        executable: &ExecutableDescriptor,
        validate: F,
    ) -> ValidationResult<ViolationSet>
    where
        F: FnOnce(&mut ValidationContext<'_>) -> ValidationResult<()>,
    {
        log::debug!("validating parameters of {}::{}", bean, executable.name);
        let mut ctx = ValidationContext::new(self.validator, bean);
        let root = match executable.kind {
            ExecutableKind::Constructor => PathNode::Constructor(executable.name.clone()),
        };
        ctx.within(root, validate)?;
        Ok(ctx.into_violations())
    }
}

/// Builder for [`Validator`].
#[derive(Default)]
pub struct ValidatorBuilder {
    config: ValidatorConfig,
    clock: Option<Arc<dyn ClockProvider>>,
}

impl ValidatorBuilder {
    /// Replaces every setting with those of `config`.
    pub fn config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.config.fail_fast = fail_fast;
        self
    }

    pub fn temporal_tolerance(mut self, tolerance: Duration) -> Self {
        self.config.temporal_tolerance_ms = u64::try_from(tolerance.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Overrides or adds a message catalog entry.
    pub fn message(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.config.messages.insert(key.into(), template.into());
        self
    }

    pub fn clock(mut self, clock: impl ClockProvider + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn build(self) -> Validator {
        let tolerance_ms = i64::try_from(self.config.temporal_tolerance_ms).unwrap_or(i64::MAX);
        let catalog = MessageCatalog::builtin().with_overrides(self.config.messages);
        Validator {
            fail_fast: self.config.fail_fast,
            temporal_tolerance: TimeDelta::try_milliseconds(tolerance_ms).unwrap_or(TimeDelta::MAX),
            interpolator: MessageInterpolator::new(catalog),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        }
    }
}

static DEFAULT_VALIDATOR: LazyLock<Validator> = LazyLock::new(|| match ValidatorConfig::from_env() {
    Ok(config) => Validator::from_config(&config),
    Err(err) => {
        log::warn!("ignoring validator configuration from the environment: {err}");
        Validator::default()
    }
});

/// Process-wide validator configured from the environment on first use.
///
/// Constrained constructors validate their parameters with it.
pub fn default_validator() -> &'static Validator {
    &DEFAULT_VALIDATOR
}

use crate::constraints::{Outcome, TemporalReference};
use crate::errors::{ValidationError, ValidationResult};
use crate::path::{PathNode, PropertyPath};
use crate::types::{ConstraintDescriptor, ParameterDescriptor, PropertyDescriptor, Validate, ValidationScope};
use crate::validator::Validator;
use crate::value::{ConstraintTarget, Container, Observed};
use crate::violation::{ConstraintViolation, ViolationSet};

/// State of one validation call: the current path and the violations so far.
///
/// Generated `Validate` implementations drive it; it is rarely used directly.
pub struct ValidationContext<'v> {
    validator: &'v Validator,
    root_bean: String,
    path: PropertyPath,
    violations: ViolationSet,
}

impl<'v> ValidationContext<'v> {
    pub(crate) fn new(validator: &'v Validator, root_bean: impl Into<String>) -> Self {
        Self {
            validator,
            root_bean: root_bean.into(),
            path: PropertyPath::root(),
            violations: ViolationSet::new(),
        }
    }

    pub fn path(&self) -> &PropertyPath {
        &self.path
    }

    pub fn violations(&self) -> &ViolationSet {
        &self.violations
    }

    pub(crate) fn into_violations(self) -> ViolationSet {
        self.violations
    }

    /// True once fail-fast mode has recorded a violation.
    pub fn is_done(&self) -> bool {
        self.validator.is_fail_fast() && !self.violations.is_empty()
    }

    /// Checks the field-scoped constraints of `property` against `value`.
    pub fn validate_property<V>(&mut self, property: &PropertyDescriptor, value: &V) -> ValidationResult<()>
    where
        V: ConstraintTarget + ?Sized,
    {
        self.within(PathNode::Property(property.name.clone()), |ctx| {
            ctx.check_all(property.field_constraints(), value)
        })
    }

    /// Checks the element-scoped constraints of `property` against every element.
    pub fn validate_elements<C>(&mut self, property: &PropertyDescriptor, container: &C) -> ValidationResult<()>
    where
        C: Container + ?Sized,
        C::Item: ConstraintTarget,
    {
        self.within(PathNode::Property(property.name.clone()), |ctx| {
            ctx.check_elements(&property.constraints, container)
        })
    }

    /// Validates a nested bean under `property`.
    pub fn cascade<B>(&mut self, property: &str, bean: &B) -> ValidationResult<()>
    where
        B: Validate + ?Sized,
    {
        if self.is_done() {
            return Ok(());
        }
        self.within(PathNode::Property(property.to_string()), |ctx| bean.validate_into(ctx))
    }

    /// Validates every bean held by a container under `property`.
    pub fn cascade_elements<C>(&mut self, property: &str, container: &C) -> ValidationResult<()>
    where
        C: Container + ?Sized,
        C::Item: Validate,
    {
        self.within(PathNode::Property(property.to_string()), |ctx| ctx.cascade_container(container))
    }

    pub fn validate_parameter<V>(&mut self, parameter: &ParameterDescriptor, value: &V) -> ValidationResult<()>
    where
        V: ConstraintTarget + ?Sized,
    {
        self.within(parameter_node(parameter), |ctx| {
            let field_scoped = parameter
                .constraints
                .iter()
                .filter(|constraint| constraint.scope == ValidationScope::Field);
            ctx.check_all(field_scoped, value)
        })
    }

    pub fn validate_parameter_elements<C>(&mut self, parameter: &ParameterDescriptor, container: &C) -> ValidationResult<()>
    where
        C: Container + ?Sized,
        C::Item: ConstraintTarget,
    {
        self.within(parameter_node(parameter), |ctx| {
            ctx.check_elements(&parameter.constraints, container)
        })
    }

    pub fn cascade_parameter<B>(&mut self, parameter: &ParameterDescriptor, bean: &B) -> ValidationResult<()>
    where
        B: Validate + ?Sized,
    {
        if self.is_done() {
            return Ok(());
        }
        self.within(parameter_node(parameter), |ctx| bean.validate_into(ctx))
    }

    pub fn cascade_parameter_elements<C>(&mut self, parameter: &ParameterDescriptor, container: &C) -> ValidationResult<()>
    where
        C: Container + ?Sized,
        C::Item: Validate,
    {
        self.within(parameter_node(parameter), |ctx| ctx.cascade_container(container))
    }

    pub(crate) fn within<R>(&mut self, node: PathNode, body: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push(node);
        let result = body(self);
        self.path.pop();
        result
    }

    fn cascade_container<C>(&mut self, container: &C) -> ValidationResult<()>
    where
        C: Container + ?Sized,
        C::Item: Validate,
    {
        container.visit(&mut |node, item| {
            if self.is_done() {
                return Ok(());
            }
            self.within(node, |ctx| item.validate_into(ctx))
        })
    }

    fn check_elements<C>(&mut self, constraints: &[ConstraintDescriptor], container: &C) -> ValidationResult<()>
    where
        C: Container + ?Sized,
        C::Item: ConstraintTarget,
    {
        let element_scoped: Vec<&ConstraintDescriptor> = constraints
            .iter()
            .filter(|constraint| constraint.scope == ValidationScope::EachElement)
            .collect();
        if element_scoped.is_empty() {
            return Ok(());
        }
        container.visit(&mut |node, item| {
            self.within(node, |ctx| ctx.check_all(element_scoped.iter().copied(), item))
        })
    }

    fn check_all<'c, V>(
        &mut self,
        constraints: impl IntoIterator<Item = &'c ConstraintDescriptor>,
        value: &V,
    ) -> ValidationResult<()>
    where
        V: ConstraintTarget + ?Sized,
    {
        let observed = value.observe();
        for descriptor in constraints {
            if self.is_done() {
                break;
            }
            self.check(descriptor, &observed)?;
        }
        Ok(())
    }

    fn check(&mut self, descriptor: &ConstraintDescriptor, observed: &Observed<'_>) -> ValidationResult<()> {
        let reference = TemporalReference {
            clock: self.validator.clock(),
            tolerance: self.validator.temporal_tolerance(),
        };
        match descriptor.constraint.evaluate(observed, &reference)? {
            Outcome::Valid => Ok(()),
            Outcome::Invalid => {
                self.report(descriptor, observed);
                Ok(())
            }
            Outcome::Unsupported => Err(ValidationError::UnexpectedType {
                constraint: descriptor.kind(),
                path: self.path.to_string(),
                found: observed.shape(),
            }),
        }
    }

    fn report(&mut self, descriptor: &ConstraintDescriptor, observed: &Observed<'_>) {
        let invalid_value = observed.render();
        let message = self.validator.interpolator().interpolate(
            &descriptor.message_template,
            &descriptor.constraint.attributes(),
            invalid_value.as_deref(),
        );
        log::trace!(
            "{} failed at `{}` on {}: {}",
            descriptor.kind(),
            self.path,
            self.root_bean,
            message
        );
        self.violations.insert(ConstraintViolation {
            property_path: self.path.clone(),
            kind: descriptor.kind(),
            message,
            message_template: descriptor.message_template.clone(),
            root_bean: self.root_bean.clone(),
            invalid_value,
        });
    }
}

fn parameter_node(parameter: &ParameterDescriptor) -> PathNode {
    PathNode::Parameter {
        index: parameter.index,
        name: parameter.name.clone(),
    }
}

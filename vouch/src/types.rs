use crate::constraints::{Constraint, ConstraintKind};
use crate::context::ValidationContext;
use crate::errors::ValidationResult;

/// Whether a constraint applies to the value itself or to each of its elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationScope {
    Field,
    EachElement,
}

/// A declared constraint: what to check and which message template to report.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDescriptor {
    pub constraint: Constraint,
    pub message_template: String,
    pub scope: ValidationScope,
}

impl ConstraintDescriptor {
    /// Field-scoped descriptor using the constraint's default template.
    pub fn new(constraint: Constraint) -> Self {
        let message_template = constraint.kind().default_template();
        Self {
            constraint,
            message_template,
            scope: ValidationScope::Field,
        }
    }

    pub fn with_message(mut self, template: impl Into<String>) -> Self {
        self.message_template = template.into();
        self
    }

    pub fn each_element(mut self) -> Self {
        self.scope = ValidationScope::EachElement;
        self
    }

    pub fn kind(&self) -> ConstraintKind {
        self.constraint.kind()
    }
}

/// Constraints declared on one field of a bean.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    pub name: String,
    pub constraints: Vec<ConstraintDescriptor>,
    /// Nested beans reachable through this field are validated too.
    pub cascaded: bool,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraints: Vec::new(),
            cascaded: false,
        }
    }

    pub fn with_constraint(mut self, constraint: ConstraintDescriptor) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn cascaded(mut self) -> Self {
        self.cascaded = true;
        self
    }

    pub fn field_constraints(&self) -> impl Iterator<Item = &ConstraintDescriptor> {
        self.constraints
            .iter()
            .filter(|constraint| constraint.scope == ValidationScope::Field)
    }

    pub fn element_constraints(&self) -> impl Iterator<Item = &ConstraintDescriptor> {
        self.constraints
            .iter()
            .filter(|constraint| constraint.scope == ValidationScope::EachElement)
    }

    pub fn is_constrained(&self) -> bool {
        !self.constraints.is_empty() || self.cascaded
    }
}

/// Metadata of a bean type, emitted by `#[derive(Validate)]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeanDescriptor {
    pub name: String,
    pub properties: Vec<PropertyDescriptor>,
}

impl BeanDescriptor {
    pub fn new(name: impl Into<String>, properties: Vec<PropertyDescriptor>) -> Self {
        Self {
            name: name.into(),
            properties,
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|property| property.name == name)
    }

    pub fn is_constrained(&self) -> bool {
        self.properties.iter().any(PropertyDescriptor::is_constrained)
    }

    pub fn constrained_properties(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter().filter(|property| property.is_constrained())
    }
}

/// Constraints declared on one constructor parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub index: usize,
    pub name: String,
    pub constraints: Vec<ConstraintDescriptor>,
    pub cascaded: bool,
}

impl ParameterDescriptor {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            constraints: Vec::new(),
            cascaded: false,
        }
    }

    pub fn with_constraint(mut self, constraint: ConstraintDescriptor) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn cascaded(mut self) -> Self {
        self.cascaded = true;
        self
    }
}

/// What kind of executable an [`ExecutableDescriptor`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutableKind {
    /// An associated function without a receiver returning `Result<Self, E>`.
    Constructor,
}

/// Metadata of a constrained constructor, emitted by `#[constrained]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutableDescriptor {
    pub name: String,
    pub kind: ExecutableKind,
    pub parameters: Vec<ParameterDescriptor>,
}

impl ExecutableDescriptor {
    pub fn new(name: impl Into<String>, kind: ExecutableKind, parameters: Vec<ParameterDescriptor>) -> Self {
        Self {
            name: name.into(),
            kind,
            parameters,
        }
    }

    pub fn constructor(name: impl Into<String>, parameters: Vec<ParameterDescriptor>) -> Self {
        Self::new(name, ExecutableKind::Constructor, parameters)
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters.iter().find(|parameter| parameter.name == name)
    }
}

/// Static metadata for a bean type.
pub trait BeanMetadata {
    fn bean_descriptor() -> &'static BeanDescriptor;
}

/// Implemented by `#[derive(Validate)]`; drives constraint evaluation for a bean.
///
/// Callers normally go through [`crate::Validator`] rather than invoking these
/// methods directly.
pub trait Validate: BeanMetadata {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult<()>;

    fn validate_property_into(&self, property: &str, ctx: &mut ValidationContext<'_>) -> ValidationResult<()>;
}

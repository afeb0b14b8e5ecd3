use std::collections::BTreeSet;

use serde::Serialize;

use crate::constraints::ConstraintKind;
use crate::errors::ConstraintViolationError;
use crate::path::PropertyPath;

/// Detailed failure of a single constraint against a single value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ConstraintViolation {
    pub property_path: PropertyPath,
    pub kind: ConstraintKind,
    pub message: String,
    pub message_template: String,
    pub root_bean: String,
    pub invalid_value: Option<String>,
}

impl ConstraintViolation {
    /// Rendered property path, e.g. `address.city`.
    pub fn property(&self) -> String {
        self.property_path.to_string()
    }
}

/// Ordered collection of violations; ordered by path, then constraint kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ViolationSet {
    violations: BTreeSet<ConstraintViolation>,
}

impl ViolationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when an identical violation was already present.
    pub fn insert(&mut self, violation: ConstraintViolation) -> bool {
        self.violations.insert(violation)
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConstraintViolation> {
        self.violations.iter()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.violations.iter().map(|violation| violation.message.as_str()).collect()
    }

    /// Violations whose rendered path equals `property`.
    pub fn for_property<'a>(&'a self, property: &'a str) -> impl Iterator<Item = &'a ConstraintViolation> + 'a {
        self.violations
            .iter()
            .filter(move |violation| violation.property_path.to_string() == property)
    }

    pub fn into_result(self) -> Result<(), ConstraintViolationError> {
        ConstraintViolationError::check(self)
    }
}

impl IntoIterator for ViolationSet {
    type Item = ConstraintViolation;
    type IntoIter = std::collections::btree_set::IntoIter<ConstraintViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a ViolationSet {
    type Item = &'a ConstraintViolation;
    type IntoIter = std::collections::btree_set::Iter<'a, ConstraintViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

impl FromIterator<ConstraintViolation> for ViolationSet {
    fn from_iter<I: IntoIterator<Item = ConstraintViolation>>(iter: I) -> Self {
        Self {
            violations: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathNode;

    fn violation(property: &str, kind: ConstraintKind, message: &str) -> ConstraintViolation {
        ConstraintViolation {
            property_path: PropertyPath::from_nodes([PathNode::Property(property.into())]),
            kind,
            message: message.into(),
            message_template: message.into(),
            root_bean: "Person".into(),
            invalid_value: None,
        }
    }

    #[test]
    fn duplicates_collapse_and_order_is_by_path() {
        let set: ViolationSet = [
            violation("name", ConstraintKind::NotBlank, "blank"),
            violation("age", ConstraintKind::Positive, "positive"),
            violation("name", ConstraintKind::NotBlank, "blank"),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set.messages(), vec!["positive", "blank"]);
        assert_eq!(set.for_property("name").count(), 1);
    }

    #[test]
    fn serializes_paths_as_strings() {
        let set: ViolationSet = [violation("age", ConstraintKind::Positive, "must be greater than 0")]
            .into_iter()
            .collect();
        let json = serde_json::to_value(&set).expect("serializable");
        assert_eq!(json[0]["property_path"], "age");
        assert_eq!(json[0]["kind"], "Positive");
        assert_eq!(json[0]["message"], "must be greater than 0");
    }

    #[test]
    fn into_result_aggregates_messages() {
        let set: ViolationSet = [
            violation("age", ConstraintKind::Positive, "Age has to be positive"),
            violation("name", ConstraintKind::NotBlank, "Name is required"),
        ]
        .into_iter()
        .collect();
        let err = set.into_result().expect_err("non-empty set fails");
        assert_eq!(err.message, "Age has to be positive;Name is required");
        assert_eq!(err.violations.len(), 2);
        assert!(ViolationSet::new().into_result().is_ok());
    }
}

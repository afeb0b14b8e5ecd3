//! Assertion helpers for tests that check which violations a bean produces.
//!
//! ```text
//! assert_that(&violations).contains_only_violations([
//!     violation_of(ConstraintKind::NotBlank).with_property("name"),
//! ]);
//! ```
//!
//! An expectation only compares the attributes it was given, and expectations
//! are matched one-to-one against violations regardless of order.

use std::fmt;

use crate::constraints::ConstraintKind;
use crate::violation::{ConstraintViolation, ViolationSet};

/// Description of an expected violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationExpectation {
    kind: ConstraintKind,
    property: Option<String>,
    message: Option<String>,
    invalid_value: Option<Option<String>>,
}

/// Starts an expectation for a violation of `kind`.
pub fn violation_of(kind: ConstraintKind) -> ViolationExpectation {
    ViolationExpectation {
        kind,
        property: None,
        message: None,
        invalid_value: None,
    }
}

impl ViolationExpectation {
    /// Expects the rendered property path, e.g. `name` or `address.city`.
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Expects the rendered invalid value; `None` expects a null value.
    pub fn with_invalid_value(mut self, value: Option<&str>) -> Self {
        self.invalid_value = Some(value.map(str::to_string));
        self
    }

    pub fn matches(&self, violation: &ConstraintViolation) -> bool {
        self.kind == violation.kind
            && self
                .property
                .as_ref()
                .is_none_or(|property| *property == violation.property_path.to_string())
            && self.message.as_ref().is_none_or(|message| *message == violation.message)
            && self
                .invalid_value
                .as_ref()
                .is_none_or(|value| *value == violation.invalid_value)
    }
}

impl fmt::Display for ViolationExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(property) = &self.property {
            write!(f, " at `{property}`")?;
        }
        if let Some(message) = &self.message {
            write!(f, " with message {message:?}")?;
        }
        if let Some(value) = &self.invalid_value {
            write!(f, " with invalid value {value:?}")?;
        }
        Ok(())
    }
}

/// Panics unless `violations` is empty.
#[track_caller]
pub fn assert_no_violations(violations: &ViolationSet) {
    if !violations.is_empty() {
        panic!("expected no violations, got:\n{}", describe(violations));
    }
}

pub fn assert_that(violations: &ViolationSet) -> ViolationSetAssert<'_> {
    ViolationSetAssert { violations }
}

/// Fluent assertions over a [`ViolationSet`].
#[derive(Debug, Clone, Copy)]
pub struct ViolationSetAssert<'a> {
    violations: &'a ViolationSet,
}

impl<'a> ViolationSetAssert<'a> {
    /// Every violation matches exactly one expectation and vice versa.
    #[track_caller]
    pub fn contains_only_violations(self, expected: impl IntoIterator<Item = ViolationExpectation>) -> Self {
        let expected: Vec<ViolationExpectation> = expected.into_iter().collect();
        let actual: Vec<&ConstraintViolation> = self.violations.iter().collect();
        if expected.len() != actual.len() || matched_count(&expected, &actual) != expected.len() {
            panic!(
                "expected exactly:\n{}\nbut got:\n{}",
                list(&expected),
                describe(self.violations)
            );
        }
        self
    }

    /// Each expectation matches a distinct violation; extra violations are allowed.
    #[track_caller]
    pub fn contains_violations(self, expected: impl IntoIterator<Item = ViolationExpectation>) -> Self {
        let expected: Vec<ViolationExpectation> = expected.into_iter().collect();
        let actual: Vec<&ConstraintViolation> = self.violations.iter().collect();
        if matched_count(&expected, &actual) != expected.len() {
            panic!(
                "expected at least:\n{}\nbut got:\n{}",
                list(&expected),
                describe(self.violations)
            );
        }
        self
    }

    #[track_caller]
    pub fn has_count(self, count: usize) -> Self {
        if self.violations.len() != count {
            panic!(
                "expected {count} violation(s), got {}:\n{}",
                self.violations.len(),
                describe(self.violations)
            );
        }
        self
    }
}

// Maximum bipartite matching between expectations and violations (Kuhn's algorithm).
fn matched_count(expected: &[ViolationExpectation], actual: &[&ConstraintViolation]) -> usize {
    let mut owner: Vec<Option<usize>> = vec![None; actual.len()];
    let mut matched = 0;
    for expectation in 0..expected.len() {
        let mut visited = vec![false; actual.len()];
        if augment(expectation, expected, actual, &mut owner, &mut visited) {
            matched += 1;
        }
    }
    matched
}

fn augment(
    expectation: usize,
    expected: &[ViolationExpectation],
    actual: &[&ConstraintViolation],
    owner: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for (slot, violation) in actual.iter().enumerate() {
        if visited[slot] || !expected[expectation].matches(violation) {
            continue;
        }
        visited[slot] = true;
        let free = match owner[slot] {
            None => true,
            Some(previous) => augment(previous, expected, actual, owner, visited),
        };
        if free {
            owner[slot] = Some(expectation);
            return true;
        }
    }
    false
}

fn list(expected: &[ViolationExpectation]) -> String {
    if expected.is_empty() {
        return "  (none)".to_string();
    }
    expected.iter().map(|expectation| format!("  {expectation}")).collect::<Vec<_>>().join("\n")
}

fn describe(violations: &ViolationSet) -> String {
    if violations.is_empty() {
        return "  (none)".to_string();
    }
    violations
        .iter()
        .map(|violation| format!("  {} at `{}`: {:?}", violation.kind, violation.property_path, violation.message))
        .collect::<Vec<_>>()
        .join("\n")
}

//! Message catalog and template interpolation.
//!
//! A template is interpolated in two passes:
//!
//! 1. `{key}` references to catalog entries are replaced, recursively, so a
//!    catalog message may itself reference other entries.
//! 2. Constraint attributes (`{min}`, `{max}`, `{value}`, `{regexp}`) and
//!    `{validatedValue}` are substituted.
//!
//! Placeholders that resolve to nothing are left untouched. `\{`, `\}` and `\\`
//! produce the literal character.

use std::collections::HashMap;

use crate::constraints::ConstraintKind;

const MAX_RESOLUTION_DEPTH: usize = 8;

/// Mapping from message keys to templates.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    entries: HashMap<String, String>,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MessageCatalog {
    /// Catalog holding the default message of every built-in constraint.
    pub fn builtin() -> Self {
        let entries = ConstraintKind::ALL
            .iter()
            .map(|kind| (kind.message_key(), kind.default_message().to_string()))
            .collect();
        Self { entries }
    }

    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, template) in overrides {
            self.insert(key, template);
        }
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.entries.insert(key.into(), template.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Turns message templates into final messages.
#[derive(Debug, Clone, Default)]
pub struct MessageInterpolator {
    catalog: MessageCatalog,
}

impl MessageInterpolator {
    pub fn new(catalog: MessageCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &MessageCatalog {
        &self.catalog
    }

    pub fn interpolate(&self, template: &str, attributes: &[(&str, String)], validated_value: Option<&str>) -> String {
        let resolved = self.resolve_catalog(template, 0);
        substitute(
            &resolved,
            &mut |name| {
                if name == "validatedValue" {
                    return Some(validated_value.unwrap_or("null").to_string());
                }
                attributes
                    .iter()
                    .find(|(attribute, _)| *attribute == name)
                    .map(|(_, value)| value.clone())
            },
            true,
        )
    }

    fn resolve_catalog(&self, template: &str, depth: usize) -> String {
        substitute(
            template,
            &mut |key| {
                if depth >= MAX_RESOLUTION_DEPTH {
                    return None;
                }
                self.catalog.get(key).map(|entry| self.resolve_catalog(entry, depth + 1))
            },
            false,
        )
    }
}

/// Replaces `{name}` placeholders for which `resolve` yields a value.
///
/// With `unescape` unset, escape sequences are copied through verbatim so a
/// later pass still sees them.
fn substitute(template: &str, resolve: &mut dyn FnMut(&str) -> Option<String>, unescape: bool) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(position) = rest.find(['\\', '{']) {
        out.push_str(&rest[..position]);
        let tail = &rest[position..];
        if let Some(escaped) = tail.strip_prefix('\\') {
            match escaped.chars().next() {
                Some(literal @ ('{' | '}' | '\\')) => {
                    if !unescape {
                        out.push('\\');
                    }
                    out.push(literal);
                    rest = &escaped[1..];
                }
                _ => {
                    out.push('\\');
                    rest = escaped;
                }
            }
            continue;
        }

        let body = &tail[1..];
        match body.find(['{', '}']) {
            Some(end) if end > 0 && body[end..].starts_with('}') => {
                let name = &body[..end];
                match resolve(name) {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(&tail[..end + 2]),
                }
                rest = &body[end + 1..];
            }
            _ => {
                out.push('{');
                rest = body;
            }
        }
    }
    out.push_str(rest);
    out
}

//! Built-in constraint catalogue and its evaluation rules.

use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, TimeDelta, Utc};
use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::clock::ClockProvider;
use crate::errors::{ValidationError, ValidationResult};
use crate::validators::{char_len, is_not_blank, is_valid_email, is_valid_url, is_valid_uuid};
use crate::value::{Observed, Temporal};

/// Identity of a constraint, independent of its attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ConstraintKind {
    NotNull,
    Null,
    NotBlank,
    NotEmpty,
    Size,
    AssertTrue,
    AssertFalse,
    Positive,
    PositiveOrZero,
    Negative,
    NegativeOrZero,
    Min,
    Max,
    Range,
    Pattern,
    Email,
    Url,
    Uuid,
    Past,
    PastOrPresent,
    Future,
    FutureOrPresent,
}

impl ConstraintKind {
    pub const ALL: [ConstraintKind; 22] = [
        ConstraintKind::NotNull,
        ConstraintKind::Null,
        ConstraintKind::NotBlank,
        ConstraintKind::NotEmpty,
        ConstraintKind::Size,
        ConstraintKind::AssertTrue,
        ConstraintKind::AssertFalse,
        ConstraintKind::Positive,
        ConstraintKind::PositiveOrZero,
        ConstraintKind::Negative,
        ConstraintKind::NegativeOrZero,
        ConstraintKind::Min,
        ConstraintKind::Max,
        ConstraintKind::Range,
        ConstraintKind::Pattern,
        ConstraintKind::Email,
        ConstraintKind::Url,
        ConstraintKind::Uuid,
        ConstraintKind::Past,
        ConstraintKind::PastOrPresent,
        ConstraintKind::Future,
        ConstraintKind::FutureOrPresent,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ConstraintKind::NotNull => "NotNull",
            ConstraintKind::Null => "Null",
            ConstraintKind::NotBlank => "NotBlank",
            ConstraintKind::NotEmpty => "NotEmpty",
            ConstraintKind::Size => "Size",
            ConstraintKind::AssertTrue => "AssertTrue",
            ConstraintKind::AssertFalse => "AssertFalse",
            ConstraintKind::Positive => "Positive",
            ConstraintKind::PositiveOrZero => "PositiveOrZero",
            ConstraintKind::Negative => "Negative",
            ConstraintKind::NegativeOrZero => "NegativeOrZero",
            ConstraintKind::Min => "Min",
            ConstraintKind::Max => "Max",
            ConstraintKind::Range => "Range",
            ConstraintKind::Pattern => "Pattern",
            ConstraintKind::Email => "Email",
            ConstraintKind::Url => "Url",
            ConstraintKind::Uuid => "Uuid",
            ConstraintKind::Past => "Past",
            ConstraintKind::PastOrPresent => "PastOrPresent",
            ConstraintKind::Future => "Future",
            ConstraintKind::FutureOrPresent => "FutureOrPresent",
        }
    }

    /// Catalog key holding this constraint's default message.
    pub fn message_key(self) -> String {
        format!("vouch.constraints.{}.message", self.name())
    }

    /// Template used when a constraint declares no message of its own.
    pub fn default_template(self) -> String {
        format!("{{{}}}", self.message_key())
    }

    pub fn default_message(self) -> &'static str {
        match self {
            ConstraintKind::NotNull => "must not be null",
            ConstraintKind::Null => "must be null",
            ConstraintKind::NotBlank => "must not be blank",
            ConstraintKind::NotEmpty => "must not be empty",
            ConstraintKind::Size => "size must be between {min} and {max}",
            ConstraintKind::AssertTrue => "must be true",
            ConstraintKind::AssertFalse => "must be false",
            ConstraintKind::Positive => "must be greater than 0",
            ConstraintKind::PositiveOrZero => "must be greater than or equal to 0",
            ConstraintKind::Negative => "must be less than 0",
            ConstraintKind::NegativeOrZero => "must be less than or equal to 0",
            ConstraintKind::Min => "must be greater than or equal to {value}",
            ConstraintKind::Max => "must be less than or equal to {value}",
            ConstraintKind::Range => "must be between {min} and {max}",
            ConstraintKind::Pattern => "must match \"{regexp}\"",
            ConstraintKind::Email => "must be a well-formed email address",
            ConstraintKind::Url => "must be a valid URL",
            ConstraintKind::Uuid => "must be a valid UUID",
            ConstraintKind::Past => "must be a past date",
            ConstraintKind::PastOrPresent => "must be a date in the past or in the present",
            ConstraintKind::Future => "must be a future date",
            ConstraintKind::FutureOrPresent => "must be a date in the present or in the future",
        }
    }

    /// Whether an absent value satisfies the constraint.
    pub fn accepts_null(self) -> bool {
        !matches!(
            self,
            ConstraintKind::NotNull | ConstraintKind::NotBlank | ConstraintKind::NotEmpty
        )
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Regular expression attribute of a `pattern` constraint.
///
/// The whole value must match. Compilation happens on first use and is cached.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    case_insensitive: bool,
    compiled: OnceLock<Result<Regex, regex::Error>>,
}

impl Pattern {
    pub fn new(source: impl Into<String>, case_insensitive: bool) -> Self {
        Self {
            source: source.into(),
            case_insensitive,
            compiled: OnceLock::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn is_match(&self, text: &str) -> ValidationResult<bool> {
        let compiled = self.compiled.get_or_init(|| {
            RegexBuilder::new(&format!("^(?:{})$", self.source))
                .case_insensitive(self.case_insensitive)
                .build()
        });
        match compiled {
            Ok(regex) => Ok(regex.is_match(text)),
            Err(source) => Err(ValidationError::InvalidPattern {
                pattern: self.source.clone(),
                source: source.clone(),
            }),
        }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.case_insensitive == other.case_insensitive
    }
}

/// A constraint together with its attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    NotNull,
    Null,
    NotBlank,
    NotEmpty,
    Size { min: usize, max: usize },
    AssertTrue,
    AssertFalse,
    Positive,
    PositiveOrZero,
    Negative,
    NegativeOrZero,
    Min(i64),
    Max(i64),
    Range { min: i64, max: i64 },
    Pattern(Pattern),
    Email,
    Url,
    Uuid,
    Past,
    PastOrPresent,
    Future,
    FutureOrPresent,
}

/// Result of judging one value against one constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Valid,
    Invalid,
    /// The value's shape is outside what the constraint can judge.
    Unsupported,
}

impl From<bool> for Outcome {
    fn from(valid: bool) -> Self {
        if valid { Outcome::Valid } else { Outcome::Invalid }
    }
}

/// Clock and tolerance used by temporal constraints.
pub struct TemporalReference<'a> {
    pub clock: &'a dyn ClockProvider,
    pub tolerance: TimeDelta,
}

impl Constraint {
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Constraint::NotNull => ConstraintKind::NotNull,
            Constraint::Null => ConstraintKind::Null,
            Constraint::NotBlank => ConstraintKind::NotBlank,
            Constraint::NotEmpty => ConstraintKind::NotEmpty,
            Constraint::Size { .. } => ConstraintKind::Size,
            Constraint::AssertTrue => ConstraintKind::AssertTrue,
            Constraint::AssertFalse => ConstraintKind::AssertFalse,
            Constraint::Positive => ConstraintKind::Positive,
            Constraint::PositiveOrZero => ConstraintKind::PositiveOrZero,
            Constraint::Negative => ConstraintKind::Negative,
            Constraint::NegativeOrZero => ConstraintKind::NegativeOrZero,
            Constraint::Min(_) => ConstraintKind::Min,
            Constraint::Max(_) => ConstraintKind::Max,
            Constraint::Range { .. } => ConstraintKind::Range,
            Constraint::Pattern(_) => ConstraintKind::Pattern,
            Constraint::Email => ConstraintKind::Email,
            Constraint::Url => ConstraintKind::Url,
            Constraint::Uuid => ConstraintKind::Uuid,
            Constraint::Past => ConstraintKind::Past,
            Constraint::PastOrPresent => ConstraintKind::PastOrPresent,
            Constraint::Future => ConstraintKind::Future,
            Constraint::FutureOrPresent => ConstraintKind::FutureOrPresent,
        }
    }

    /// Attribute values available to message templates.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        match self {
            Constraint::Size { min, max } => vec![("min", min.to_string()), ("max", max.to_string())],
            Constraint::Min(value) | Constraint::Max(value) => vec![("value", value.to_string())],
            Constraint::Range { min, max } => vec![("min", min.to_string()), ("max", max.to_string())],
            Constraint::Pattern(pattern) => vec![("regexp", pattern.source().to_string())],
            _ => Vec::new(),
        }
    }

    pub fn evaluate(&self, value: &Observed<'_>, reference: &TemporalReference<'_>) -> ValidationResult<Outcome> {
        if value.is_null() {
            return Ok(match self {
                Constraint::Null => Outcome::Valid,
                other => Outcome::from(other.kind().accepts_null()),
            });
        }

        let outcome = match self {
            Constraint::NotNull => Outcome::Valid,
            Constraint::Null => Outcome::Invalid,
            Constraint::NotBlank => match value {
                Observed::Text(text) => is_not_blank(text).into(),
                _ => Outcome::Unsupported,
            },
            Constraint::NotEmpty => match value {
                Observed::Text(text) => (!text.is_empty()).into(),
                Observed::Collection(len) => (*len > 0).into(),
                _ => Outcome::Unsupported,
            },
            Constraint::Size { min, max } => match size_of(value) {
                Some(len) => (*min <= len && len <= *max).into(),
                None => Outcome::Unsupported,
            },
            Constraint::AssertTrue => match value {
                Observed::Bool(flag) => (*flag).into(),
                _ => Outcome::Unsupported,
            },
            Constraint::AssertFalse => match value {
                Observed::Bool(flag) => (!*flag).into(),
                _ => Outcome::Unsupported,
            },
            Constraint::Positive => numeric(value, 0, |ord| ord == Ordering::Greater),
            Constraint::PositiveOrZero => numeric(value, 0, |ord| ord != Ordering::Less),
            Constraint::Negative => numeric(value, 0, |ord| ord == Ordering::Less),
            Constraint::NegativeOrZero => numeric(value, 0, |ord| ord != Ordering::Greater),
            Constraint::Min(bound) => numeric(value, *bound, |ord| ord != Ordering::Less),
            Constraint::Max(bound) => numeric(value, *bound, |ord| ord != Ordering::Greater),
            Constraint::Range { min, max } => {
                match (numeric(value, *min, |ord| ord != Ordering::Less), numeric(value, *max, |ord| ord != Ordering::Greater)) {
                    (Outcome::Unsupported, _) | (_, Outcome::Unsupported) => Outcome::Unsupported,
                    (Outcome::Valid, Outcome::Valid) => Outcome::Valid,
                    _ => Outcome::Invalid,
                }
            }
            Constraint::Pattern(pattern) => match value {
                Observed::Text(text) => pattern.is_match(text)?.into(),
                _ => Outcome::Unsupported,
            },
            Constraint::Email => text_rule(value, is_valid_email),
            Constraint::Url => text_rule(value, is_valid_url),
            Constraint::Uuid => text_rule(value, is_valid_uuid),
            Constraint::Past => temporal(value, reference, TemporalRule::Past),
            Constraint::PastOrPresent => temporal(value, reference, TemporalRule::PastOrPresent),
            Constraint::Future => temporal(value, reference, TemporalRule::Future),
            Constraint::FutureOrPresent => temporal(value, reference, TemporalRule::FutureOrPresent),
        };
        Ok(outcome)
    }
}

fn size_of(value: &Observed<'_>) -> Option<usize> {
    match value {
        Observed::Text(text) => Some(char_len(text)),
        Observed::Collection(len) => Some(*len),
        _ => None,
    }
}

fn text_rule(value: &Observed<'_>, rule: fn(&str) -> bool) -> Outcome {
    match value {
        Observed::Text(text) => rule(text).into(),
        _ => Outcome::Unsupported,
    }
}

// NaN compares as unordered and is therefore never valid.
fn numeric(value: &Observed<'_>, bound: i64, accept: impl Fn(Ordering) -> bool) -> Outcome {
    let ordering = match value {
        Observed::Int(number) => Some(number.cmp(&i128::from(bound))),
        Observed::Float(number) => number.partial_cmp(&(bound as f64)),
        _ => return Outcome::Unsupported,
    };
    ordering.map(&accept).unwrap_or(false).into()
}

#[derive(Clone, Copy)]
enum TemporalRule {
    Past,
    PastOrPresent,
    Future,
    FutureOrPresent,
}

fn temporal(value: &Observed<'_>, reference: &TemporalReference<'_>, rule: TemporalRule) -> Outcome {
    let Observed::Temporal(moment) = value else {
        return Outcome::Unsupported;
    };
    let now: DateTime<Utc> = reference.clock.now();
    let tolerance = reference.tolerance;
    let valid = match moment {
        Temporal::Instant(instant) => judge(
            *instant,
            now.checked_add_signed(tolerance),
            now.checked_sub_signed(tolerance),
            rule,
        ),
        Temporal::DateTime(datetime) => {
            let now = now.naive_utc();
            judge(
                *datetime,
                now.checked_add_signed(tolerance),
                now.checked_sub_signed(tolerance),
                rule,
            )
        }
        Temporal::Date(date) => {
            let today = now.date_naive();
            match rule {
                TemporalRule::Past => *date < today,
                TemporalRule::PastOrPresent => *date <= today,
                TemporalRule::Future => *date > today,
                TemporalRule::FutureOrPresent => *date >= today,
            }
        }
    };
    valid.into()
}

// Tolerance widens the accepted side so values close to `now` are not rejected.
// `later` and `earlier` are `now` shifted by the tolerance; `None` means the shift left
// chrono's range, and every value then falls on the accepted side.
fn judge<T: PartialOrd>(value: T, later: Option<T>, earlier: Option<T>, rule: TemporalRule) -> bool {
    match rule {
        TemporalRule::Past => later.is_none_or(|bound| value < bound),
        TemporalRule::PastOrPresent => later.is_none_or(|bound| value <= bound),
        TemporalRule::Future => earlier.is_none_or(|bound| value > bound),
        TemporalRule::FutureOrPresent => earlier.is_none_or(|bound| value >= bound),
    }
}

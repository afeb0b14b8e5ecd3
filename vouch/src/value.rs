//! Type-independent views of validated values.
//!
//! Constraints never see concrete Rust types. Each value is observed as one of a
//! handful of shapes ([`Observed`]) and containers expose their elements through
//! [`Container`] so element constraints and cascades can walk them.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::errors::ValidationResult;
use crate::path::PathNode;

/// A point in time as seen by temporal constraints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Temporal {
    Instant(DateTime<Utc>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl fmt::Display for Temporal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Temporal::Instant(instant) => write!(f, "{}", instant.to_rfc3339()),
            Temporal::Date(date) => write!(f, "{date}"),
            Temporal::DateTime(datetime) => write!(f, "{datetime}"),
        }
    }
}

/// The shape of a value as far as constraints are concerned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observed<'a> {
    Null,
    Bool(bool),
    Int(i128),
    Float(f64),
    Text(&'a str),
    Collection(usize),
    Temporal(Temporal),
    /// A value with no natural shape; only presence constraints apply.
    Opaque(&'static str),
}

impl Observed<'_> {
    pub fn is_null(&self) -> bool {
        matches!(self, Observed::Null)
    }

    /// Short name of the shape, used in engine errors.
    pub fn shape(&self) -> &'static str {
        match self {
            Observed::Null => "null",
            Observed::Bool(_) => "bool",
            Observed::Int(_) => "integer",
            Observed::Float(_) => "float",
            Observed::Text(_) => "text",
            Observed::Collection(_) => "collection",
            Observed::Temporal(_) => "temporal",
            Observed::Opaque(name) => name,
        }
    }

    /// String form recorded as the violation's invalid value.
    pub fn render(&self) -> Option<String> {
        match self {
            Observed::Null => None,
            Observed::Bool(value) => Some(value.to_string()),
            Observed::Int(value) => Some(value.to_string()),
            Observed::Float(value) => Some(value.to_string()),
            Observed::Text(value) => Some((*value).to_string()),
            Observed::Collection(len) => Some(format!("<{len} elements>")),
            Observed::Temporal(value) => Some(value.to_string()),
            Observed::Opaque(name) => Some(format!("<{name}>")),
        }
    }
}

/// Implemented by every type a constraint can be placed on.
pub trait ConstraintTarget {
    fn observe(&self) -> Observed<'_>;
}

impl ConstraintTarget for str {
    fn observe(&self) -> Observed<'_> {
        Observed::Text(self)
    }
}

impl ConstraintTarget for String {
    fn observe(&self) -> Observed<'_> {
        Observed::Text(self.as_str())
    }
}

impl ConstraintTarget for Cow<'_, str> {
    fn observe(&self) -> Observed<'_> {
        Observed::Text(self.as_ref())
    }
}

impl ConstraintTarget for bool {
    fn observe(&self) -> Observed<'_> {
        Observed::Bool(*self)
    }
}

macro_rules! integer_targets {
    ($($ty:ty),*) => {
        $(impl ConstraintTarget for $ty {
            fn observe(&self) -> Observed<'_> {
                Observed::Int(i128::from(*self))
            }
        })*
    };
}

integer_targets!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl ConstraintTarget for isize {
    fn observe(&self) -> Observed<'_> {
        Observed::Int(*self as i128)
    }
}

impl ConstraintTarget for usize {
    fn observe(&self) -> Observed<'_> {
        Observed::Int(*self as i128)
    }
}

impl ConstraintTarget for u128 {
    // Values above i128::MAX saturate; they still compare above every i64 bound.
    fn observe(&self) -> Observed<'_> {
        Observed::Int(i128::try_from(*self).unwrap_or(i128::MAX))
    }
}

impl ConstraintTarget for f32 {
    fn observe(&self) -> Observed<'_> {
        Observed::Float(f64::from(*self))
    }
}

impl ConstraintTarget for f64 {
    fn observe(&self) -> Observed<'_> {
        Observed::Float(*self)
    }
}

impl<Tz: TimeZone> ConstraintTarget for DateTime<Tz> {
    fn observe(&self) -> Observed<'_> {
        Observed::Temporal(Temporal::Instant(self.with_timezone(&Utc)))
    }
}

impl ConstraintTarget for NaiveDate {
    fn observe(&self) -> Observed<'_> {
        Observed::Temporal(Temporal::Date(*self))
    }
}

impl ConstraintTarget for NaiveDateTime {
    fn observe(&self) -> Observed<'_> {
        Observed::Temporal(Temporal::DateTime(*self))
    }
}

impl ConstraintTarget for SystemTime {
    fn observe(&self) -> Observed<'_> {
        Observed::Temporal(Temporal::Instant(DateTime::<Utc>::from(*self)))
    }
}

impl<T: ConstraintTarget> ConstraintTarget for Option<T> {
    fn observe(&self) -> Observed<'_> {
        match self {
            Some(value) => value.observe(),
            None => Observed::Null,
        }
    }
}

impl<T: ConstraintTarget + ?Sized> ConstraintTarget for &T {
    fn observe(&self) -> Observed<'_> {
        (**self).observe()
    }
}

impl<T: ConstraintTarget + ?Sized> ConstraintTarget for Box<T> {
    fn observe(&self) -> Observed<'_> {
        (**self).observe()
    }
}

impl<T: ConstraintTarget + ?Sized> ConstraintTarget for Rc<T> {
    fn observe(&self) -> Observed<'_> {
        (**self).observe()
    }
}

impl<T: ConstraintTarget + ?Sized> ConstraintTarget for Arc<T> {
    fn observe(&self) -> Observed<'_> {
        (**self).observe()
    }
}

macro_rules! collection_targets {
    ($($ty:ident < $($param:ident),+ >),*) => {
        $(impl<$($param),+> ConstraintTarget for $ty<$($param),+> {
            fn observe(&self) -> Observed<'_> {
                Observed::Collection(self.len())
            }
        })*
    };
}

collection_targets!(Vec<T>, VecDeque<T>, HashSet<T, S>, BTreeSet<T>, HashMap<K, V, S>, BTreeMap<K, V>);

impl<T> ConstraintTarget for [T] {
    fn observe(&self) -> Observed<'_> {
        Observed::Collection(self.len())
    }
}

/// Element visitation for element constraints and cascades.
///
/// Sequences yield index nodes, maps yield key nodes and sets yield unnamed
/// iterable nodes.
pub trait Container {
    type Item: ?Sized;

    fn visit<'a>(
        &'a self,
        visitor: &mut dyn FnMut(PathNode, &'a Self::Item) -> ValidationResult<()>,
    ) -> ValidationResult<()>;
}

impl<T> Container for [T] {
    type Item = T;

    fn visit<'a>(&'a self, visitor: &mut dyn FnMut(PathNode, &'a T) -> ValidationResult<()>) -> ValidationResult<()> {
        for (index, item) in self.iter().enumerate() {
            visitor(PathNode::Index(index), item)?;
        }
        Ok(())
    }
}

impl<T> Container for Vec<T> {
    type Item = T;

    fn visit<'a>(&'a self, visitor: &mut dyn FnMut(PathNode, &'a T) -> ValidationResult<()>) -> ValidationResult<()> {
        self.as_slice().visit(visitor)
    }
}

impl<T> Container for VecDeque<T> {
    type Item = T;

    fn visit<'a>(&'a self, visitor: &mut dyn FnMut(PathNode, &'a T) -> ValidationResult<()>) -> ValidationResult<()> {
        for (index, item) in self.iter().enumerate() {
            visitor(PathNode::Index(index), item)?;
        }
        Ok(())
    }
}

impl<T, S> Container for HashSet<T, S> {
    type Item = T;

    fn visit<'a>(&'a self, visitor: &mut dyn FnMut(PathNode, &'a T) -> ValidationResult<()>) -> ValidationResult<()> {
        for item in self.iter() {
            visitor(PathNode::Iterable, item)?;
        }
        Ok(())
    }
}

impl<T> Container for BTreeSet<T> {
    type Item = T;

    fn visit<'a>(&'a self, visitor: &mut dyn FnMut(PathNode, &'a T) -> ValidationResult<()>) -> ValidationResult<()> {
        for item in self.iter() {
            visitor(PathNode::Iterable, item)?;
        }
        Ok(())
    }
}

impl<K: fmt::Display, V, S> Container for HashMap<K, V, S> {
    type Item = V;

    fn visit<'a>(&'a self, visitor: &mut dyn FnMut(PathNode, &'a V) -> ValidationResult<()>) -> ValidationResult<()> {
        // Sorted by rendered key so violation order does not depend on hashing.
        let mut entries: Vec<(String, &'a V)> = self.iter().map(|(key, value)| (key.to_string(), value)).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, value) in entries {
            visitor(PathNode::Key(key), value)?;
        }
        Ok(())
    }
}

impl<K: fmt::Display, V> Container for BTreeMap<K, V> {
    type Item = V;

    fn visit<'a>(&'a self, visitor: &mut dyn FnMut(PathNode, &'a V) -> ValidationResult<()>) -> ValidationResult<()> {
        for (key, value) in self.iter() {
            visitor(PathNode::Key(key.to_string()), value)?;
        }
        Ok(())
    }
}

impl<C: Container> Container for Option<C> {
    type Item = C::Item;

    fn visit<'a>(
        &'a self,
        visitor: &mut dyn FnMut(PathNode, &'a Self::Item) -> ValidationResult<()>,
    ) -> ValidationResult<()> {
        match self {
            Some(container) => container.visit(visitor),
            None => Ok(()),
        }
    }
}

impl<C: Container + ?Sized> Container for Box<C> {
    type Item = C::Item;

    fn visit<'a>(
        &'a self,
        visitor: &mut dyn FnMut(PathNode, &'a Self::Item) -> ValidationResult<()>,
    ) -> ValidationResult<()> {
        (**self).visit(visitor)
    }
}

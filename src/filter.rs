//! The filter abstract syntax tree.
//!
//! A [`Filter`] is an immutable, structurally comparable tree. Composite
//! nodes (`and`, `or`) own exactly two children; n-ary combinations are
//! built by left-folding with [`Filter::all`] and [`Filter::any`]. Leaves
//! own an attribute [`Path`] and, for the comparison operators, one
//! comparison [`Value`]. A `complex` node pairs a path with a nested
//! filter applied per array element.
//!
//! Filters are produced by the factory constructors below (an external
//! parser would produce the same trees) and consumed by the
//! [`Evaluator`](crate::Evaluator) and the
//! [`translator`](crate::translator) through exhaustive pattern matching.

use std::fmt;

use crate::path::Path;
use crate::value::Value;

/// Maximum filter nesting depth accepted by the evaluator and translator.
///
/// Recursion depth equals filter nesting depth, so pathological input is
/// cut off with [`FilterError::DepthExceeded`] instead of exhausting the
/// stack.
pub const MAX_DEPTH: usize = 64;

/// A boolean predicate over attribute paths of a document.
///
/// # Examples
///
/// ```
/// use scim_filter::{Filter, Path};
///
/// let filter = Filter::and(
///     Filter::eq(Path::attribute("userName"), "bjensen"),
///     Filter::pr(Path::attribute("emails")),
/// );
/// assert_eq!(filter.to_string(), "(userName eq \"bjensen\" and emails pr)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Both children must match.
    And(Box<Filter>, Box<Filter>),

    /// At least one child must match.
    Or(Box<Filter>, Box<Filter>),

    /// The child must not match.
    Not(Box<Filter>),

    /// At least one value at the path is non-empty.
    Present(Path),

    /// Some value at the path equals the comparison value.
    Equals(Path, Value),

    /// Some value at the path orders strictly above the comparison value.
    GreaterThan(Path, Value),

    /// Some value at the path orders at or above the comparison value.
    GreaterOrEqual(Path, Value),

    /// Some value at the path orders strictly below the comparison value.
    LessThan(Path, Value),

    /// Some value at the path orders at or below the comparison value.
    LessOrEqual(Path, Value),

    /// Some textual value at the path starts with the comparison value.
    StartsWith(Path, Value),

    /// Some textual value at the path ends with the comparison value.
    EndsWith(Path, Value),

    /// Some textual value at the path contains the comparison value.
    Contains(Path, Value),

    /// The nested filter matches some element of the multi-valued
    /// attribute at the path.
    Complex(Path, Box<Filter>),
}

/// Operator tag of a filter node, with the standard operator codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    And,
    Or,
    Not,
    Complex,
    Equals,
    Contains,
    StartsWith,
    EndsWith,
    Present,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
}

impl Kind {
    /// The operator code used in filter text.
    pub fn code(&self) -> &'static str {
        match self {
            Kind::And => "and",
            Kind::Or => "or",
            Kind::Not => "not",
            Kind::Complex => "complex",
            Kind::Equals => "eq",
            Kind::Contains => "co",
            Kind::StartsWith => "sw",
            Kind::EndsWith => "ew",
            Kind::Present => "pr",
            Kind::GreaterThan => "gt",
            Kind::GreaterOrEqual => "ge",
            Kind::LessThan => "lt",
            Kind::LessOrEqual => "le",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Filter {
    /// Conjunction of two filters.
    pub fn and(lhs: Filter, rhs: Filter) -> Filter {
        Filter::And(Box::new(lhs), Box::new(rhs))
    }

    /// Disjunction of two filters.
    pub fn or(lhs: Filter, rhs: Filter) -> Filter {
        Filter::Or(Box::new(lhs), Box::new(rhs))
    }

    /// Negation of a filter.
    pub fn not(filter: Filter) -> Filter {
        Filter::Not(Box::new(filter))
    }

    /// Left-fold a sequence of filters into nested binary conjunctions.
    ///
    /// `all([a, b, c])` builds `and(and(a, b), c)`. A single filter is
    /// returned unchanged; an empty sequence yields `None` (vacuously
    /// true, the caller decides what that means).
    pub fn all(filters: impl IntoIterator<Item = Filter>) -> Option<Filter> {
        filters.into_iter().reduce(Filter::and)
    }

    /// Left-fold a sequence of filters into nested binary disjunctions.
    ///
    /// `any([a, b, c])` builds `or(or(a, b), c)`. A single filter is
    /// returned unchanged; an empty sequence yields `None` (vacuously
    /// false).
    pub fn any(filters: impl IntoIterator<Item = Filter>) -> Option<Filter> {
        filters.into_iter().reduce(Filter::or)
    }

    /// Presence test for the attribute at `path`.
    pub fn pr(path: Path) -> Filter {
        Filter::Present(path)
    }

    /// Equality comparison against `value`.
    pub fn eq(path: Path, value: impl Into<Value>) -> Filter {
        Filter::Equals(path, value.into())
    }

    /// Inequality comparison, expressed as `not (path eq value)`.
    ///
    /// The reserved `ne` operator code has no node of its own; it
    /// desugars to a negated equality so that evaluation and translation
    /// need no extra case.
    pub fn ne(path: Path, value: impl Into<Value>) -> Filter {
        Filter::not(Filter::eq(path, value))
    }

    /// Strictly-greater ordering comparison against `value`.
    pub fn gt(path: Path, value: impl Into<Value>) -> Filter {
        Filter::GreaterThan(path, value.into())
    }

    /// Greater-or-equal ordering comparison against `value`.
    pub fn ge(path: Path, value: impl Into<Value>) -> Filter {
        Filter::GreaterOrEqual(path, value.into())
    }

    /// Strictly-less ordering comparison against `value`.
    pub fn lt(path: Path, value: impl Into<Value>) -> Filter {
        Filter::LessThan(path, value.into())
    }

    /// Less-or-equal ordering comparison against `value`.
    pub fn le(path: Path, value: impl Into<Value>) -> Filter {
        Filter::LessOrEqual(path, value.into())
    }

    /// Starts-with substring comparison against `value`.
    pub fn sw(path: Path, value: impl Into<Value>) -> Filter {
        Filter::StartsWith(path, value.into())
    }

    /// Ends-with substring comparison against `value`.
    pub fn ew(path: Path, value: impl Into<Value>) -> Filter {
        Filter::EndsWith(path, value.into())
    }

    /// Contains substring comparison against `value`.
    pub fn co(path: Path, value: impl Into<Value>) -> Filter {
        Filter::Contains(path, value.into())
    }

    /// Nested filter applied per element of the multi-valued attribute at
    /// `path`.
    pub fn complex(path: Path, filter: Filter) -> Filter {
        Filter::Complex(path, Box::new(filter))
    }

    /// The operator tag of this node.
    pub fn kind(&self) -> Kind {
        match self {
            Filter::And(..) => Kind::And,
            Filter::Or(..) => Kind::Or,
            Filter::Not(..) => Kind::Not,
            Filter::Complex(..) => Kind::Complex,
            Filter::Present(..) => Kind::Present,
            Filter::Equals(..) => Kind::Equals,
            Filter::GreaterThan(..) => Kind::GreaterThan,
            Filter::GreaterOrEqual(..) => Kind::GreaterOrEqual,
            Filter::LessThan(..) => Kind::LessThan,
            Filter::LessOrEqual(..) => Kind::LessOrEqual,
            Filter::StartsWith(..) => Kind::StartsWith,
            Filter::EndsWith(..) => Kind::EndsWith,
            Filter::Contains(..) => Kind::Contains,
        }
    }

    /// The attribute path of a leaf or complex node, `None` for boolean
    /// composites.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Filter::Present(path)
            | Filter::Equals(path, _)
            | Filter::GreaterThan(path, _)
            | Filter::GreaterOrEqual(path, _)
            | Filter::LessThan(path, _)
            | Filter::LessOrEqual(path, _)
            | Filter::StartsWith(path, _)
            | Filter::EndsWith(path, _)
            | Filter::Contains(path, _)
            | Filter::Complex(path, _) => Some(path),
            _ => None,
        }
    }

    /// The comparison value of a comparison leaf, `None` otherwise.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Filter::Equals(_, value)
            | Filter::GreaterThan(_, value)
            | Filter::GreaterOrEqual(_, value)
            | Filter::LessThan(_, value)
            | Filter::LessOrEqual(_, value)
            | Filter::StartsWith(_, value)
            | Filter::EndsWith(_, value)
            | Filter::Contains(_, value) => Some(value),
            _ => None,
        }
    }

    /// Whether this node is a complex (per-element) value filter.
    pub fn is_complex(&self) -> bool {
        matches!(self, Filter::Complex(..))
    }
}

impl fmt::Display for Filter {
    /// Renders standard filter text, e.g. `userName eq "bjensen"` or
    /// `emails[type eq "work"]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::And(lhs, rhs) => write!(f, "({} and {})", lhs, rhs),
            Filter::Or(lhs, rhs) => write!(f, "({} or {})", lhs, rhs),
            Filter::Not(inner) => write!(f, "not ({})", inner),
            Filter::Present(path) => write!(f, "{} pr", path),
            Filter::Complex(path, inner) => write!(f, "{}[{}]", path, inner),
            leaf => {
                // remaining variants are comparison leaves carrying both
                // a path and a value
                let path = leaf.path().ok_or(fmt::Error)?;
                let value = leaf.value().ok_or(fmt::Error)?;
                write!(f, "{} {} {}", path, leaf.kind(), value)
            }
        }
    }
}

/// Failure modes of filter evaluation and translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The filter itself is unusable: malformed path text, or an ordering
    /// operator applied to a boolean or binary value. User-facing.
    InvalidFilter(String),

    /// A capability strategy answered the same question differently
    /// across two invocations. A bug in the plugged-in strategy, not a
    /// user error.
    InconsistentStrategy(String),

    /// Filter nesting exceeded [`MAX_DEPTH`].
    DepthExceeded(usize),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::InvalidFilter(msg) => write!(f, "invalid filter: {}", msg),
            FilterError::InconsistentStrategy(msg) => {
                write!(f, "inconsistent translation strategy: {}", msg)
            }
            FilterError::DepthExceeded(limit) => {
                write!(f, "filter nesting exceeds the maximum depth of {}", limit)
            }
        }
    }
}

impl std::error::Error for FilterError {}

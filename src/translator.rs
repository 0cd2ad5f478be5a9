//! Capability-driven translation of filters into native backend queries.
//!
//! A backend that cannot evaluate every operator or boolean combinator
//! natively plugs a [`Strategy`] into [`translate`], which reduces a
//! filter to the smallest set of native expressions whose union of
//! results is guaranteed to be a superset of the exact answer. An empty
//! result set means "fetch everything"; the caller re-applies the filter
//! in memory with the [`Evaluator`](crate::Evaluator) for the exact
//! answer.
//!
//! Translation runs three ordered phases over the tree:
//!
//! 1. **normalize** — push `not` to the leaves via De Morgan's laws;
//! 2. **simplify** — prune unsupported leaves, degrade `and` over
//!    unsupported sides, and distribute `and` over `or` fan-outs the
//!    backend cannot combine;
//! 3. **translate** — build and combine the native expressions bottom-up,
//!    then drop structural duplicates.
//!
//! Every replacement only ever broadens the result, never narrows it.

use std::hash::Hash;

use indexmap::IndexSet;

use crate::filter::{Filter, FilterError, MAX_DEPTH};
use crate::path::Path;
use crate::value::Value;

/// The native-query capabilities of a backend.
///
/// One method per leaf operator plus `and`/`or`, each answering "can I
/// build this natively?" with `Some(expression)` or `None`. Every method
/// defaults to `None`, the worst case in which [`translate`] returns no
/// expressions and the caller fetches everything.
///
/// A strategy must be deterministic: the same logical input must always
/// yield the same supported/unsupported verdict. The translator treats a
/// violation as a fatal [`FilterError::InconsistentStrategy`], never as a
/// silent fallback.
///
/// `negated` carries a `not` sitting directly above the leaf, so a
/// backend with native negation can fold it into the expression.
pub trait Strategy<T> {
    /// Native conjunction of two built expressions.
    fn and(&self, _lhs: &T, _rhs: &T) -> Option<T> {
        None
    }

    /// Native disjunction of two built expressions.
    fn or(&self, _lhs: &T, _rhs: &T) -> Option<T> {
        None
    }

    /// Native presence test.
    fn present(&self, _path: &Path, _negated: bool) -> Option<T> {
        None
    }

    /// Native equality comparison.
    fn equals(&self, _path: &Path, _value: &Value, _negated: bool) -> Option<T> {
        None
    }

    /// Native strictly-greater comparison.
    fn greater_than(&self, _path: &Path, _value: &Value, _negated: bool) -> Option<T> {
        None
    }

    /// Native greater-or-equal comparison.
    fn greater_or_equal(&self, _path: &Path, _value: &Value, _negated: bool) -> Option<T> {
        None
    }

    /// Native strictly-less comparison.
    fn less_than(&self, _path: &Path, _value: &Value, _negated: bool) -> Option<T> {
        None
    }

    /// Native less-or-equal comparison.
    fn less_or_equal(&self, _path: &Path, _value: &Value, _negated: bool) -> Option<T> {
        None
    }

    /// Native starts-with comparison.
    fn starts_with(&self, _path: &Path, _value: &Value, _negated: bool) -> Option<T> {
        None
    }

    /// Native ends-with comparison.
    fn ends_with(&self, _path: &Path, _value: &Value, _negated: bool) -> Option<T> {
        None
    }

    /// Native contains comparison.
    fn contains(&self, _path: &Path, _value: &Value, _negated: bool) -> Option<T> {
        None
    }
}

/// Compile `filter` into the most efficient set of native expressions
/// `strategy` can build.
///
/// The returned list is deduplicated by structural equality, preserving
/// first-occurrence order. Its size means:
///
/// - `0` — fetch everything (no filter was given, or no native filtering
///   is possible);
/// - `1` — a single query covering the filter, possibly a superset of the
///   exact answer;
/// - more — the backend lacks native `or`; every query must be run and
///   the results unioned.
///
/// # Examples
///
/// ```
/// use scim_filter::{translate, Filter, Path, Strategy, Value};
///
/// struct Nothing;
/// impl Strategy<String> for Nothing {}
///
/// let filter = Filter::eq(Path::attribute("userName"), "bjensen");
/// let queries = translate(Some(&filter), &Nothing).unwrap();
/// assert!(queries.is_empty()); // fetch everything
/// ```
pub fn translate<T, S>(filter: Option<&Filter>, strategy: &S) -> Result<Vec<T>, FilterError>
where
    T: Eq + Hash,
    S: Strategy<T>,
{
    let Some(filter) = filter else {
        return Ok(Vec::new());
    };
    let normalized = normalize(filter, 0)?;
    // simplification may collapse the whole filter to "everything"
    let Some(simplified) = simplify(&normalized, strategy, 0)? else {
        return Ok(Vec::new());
    };
    let expressions = translate_tree(&simplified, strategy)?;
    let deduplicated: IndexSet<T> = expressions.into_iter().collect();
    Ok(deduplicated.into_iter().collect())
}

/// Push `not` down to the leaves so that after this pass it appears, if
/// at all, immediately above a leaf.
fn normalize(filter: &Filter, depth: usize) -> Result<Filter, FilterError> {
    if depth > MAX_DEPTH {
        return Err(FilterError::DepthExceeded(MAX_DEPTH));
    }
    Ok(match filter {
        Filter::And(lhs, rhs) => {
            Filter::and(normalize(lhs, depth + 1)?, normalize(rhs, depth + 1)?)
        }
        Filter::Or(lhs, rhs) => Filter::or(normalize(lhs, depth + 1)?, normalize(rhs, depth + 1)?),
        Filter::Not(inner) => negate(&normalize(inner, depth + 1)?, depth + 1)?,
        leaf => leaf.clone(),
    })
}

/// The negation of an already-normalized filter, via De Morgan's laws.
fn negate(filter: &Filter, depth: usize) -> Result<Filter, FilterError> {
    if depth > MAX_DEPTH {
        return Err(FilterError::DepthExceeded(MAX_DEPTH));
    }
    Ok(match filter {
        Filter::And(lhs, rhs) => Filter::or(negate(lhs, depth + 1)?, negate(rhs, depth + 1)?),
        Filter::Or(lhs, rhs) => Filter::and(negate(lhs, depth + 1)?, negate(rhs, depth + 1)?),
        Filter::Not(inner) => (**inner).clone(),
        leaf => Filter::not(leaf.clone()),
    })
}

/// Prune the portions of a normalized filter the strategy cannot build
/// and distribute `and` over `or` where the backend lacks native `or`.
///
/// Returns `None` for the "everything" filter. Every reduction broadens
/// the result set, never narrows it.
fn simplify<T, S: Strategy<T>>(
    filter: &Filter,
    strategy: &S,
    depth: usize,
) -> Result<Option<Filter>, FilterError> {
    if depth > MAX_DEPTH {
        return Err(FilterError::DepthExceeded(MAX_DEPTH));
    }
    match filter {
        Filter::And(lhs, rhs) => {
            let left = simplify(lhs, strategy, depth + 1)?;
            let right = simplify(rhs, strategy, depth + 1)?;
            let (left, right) = match (left, right) {
                // one side is "everything": the and degrades to the other
                // side alone, which can only broaden the result
                (None, right) => return Ok(right),
                (left, None) => return Ok(left),
                (Some(left), Some(right)) => (left, right),
            };

            // simulate translating both sides to see where we end up
            let lex = translate_tree(&left, strategy)?;
            let rex = translate_tree(&right, strategy)?;
            if lex.is_empty() {
                return Err(FilterError::InconsistentStrategy(format!(
                    "'{}' was supported during simplification but produced no expression",
                    left
                )));
            }
            if rex.is_empty() {
                return Err(FilterError::InconsistentStrategy(format!(
                    "'{}' was supported during simplification but produced no expression",
                    right
                )));
            }

            // probe whether at least one pairing of left and right
            // expressions can be combined natively
            let pairable = lex
                .iter()
                .any(|l| rex.iter().any(|r| strategy.and(l, r).is_some()));

            // no native and is possible: keep whichever side needs the
            // fewer queries and drop the other (a broadening)
            if !pairable {
                return Ok(Some(if lex.len() <= rex.len() { left } else { right }));
            }

            if lex.len() > 1 {
                // a side translates to more than one expression only when
                // it is an or the backend could not combine; distribute
                // the and over its branches and start over
                let distributed = match left {
                    Filter::Or(a, b) => {
                        Filter::or(Filter::and(*a, right.clone()), Filter::and(*b, right))
                    }
                    other => {
                        return Err(FilterError::InconsistentStrategy(format!(
                            "'{}' translated to {} expressions but is not an or",
                            other,
                            lex.len()
                        )));
                    }
                };
                simplify(&distributed, strategy, depth + 1)
            } else if rex.len() > 1 {
                let distributed = match right {
                    Filter::Or(a, b) => {
                        Filter::or(Filter::and(left.clone(), *a), Filter::and(left, *b))
                    }
                    other => {
                        return Err(FilterError::InconsistentStrategy(format!(
                            "'{}' translated to {} expressions but is not an or",
                            other,
                            rex.len()
                        )));
                    }
                };
                simplify(&distributed, strategy, depth + 1)
            } else {
                // both sides are single expressions and the backend can
                // combine them
                Ok(Some(Filter::and(left, right)))
            }
        }
        Filter::Or(lhs, rhs) => {
            let left = simplify(lhs, strategy, depth + 1)?;
            let right = simplify(rhs, strategy, depth + 1)?;
            // uniting with "everything" stays "everything"
            match (left, right) {
                (Some(left), Some(right)) => Ok(Some(Filter::or(left, right))),
                _ => Ok(None),
            }
        }
        leaf => Ok(build_leaf(leaf, strategy).map(|_| leaf.clone())),
    }
}

/// Translate a normalized, simplified filter into its expression list.
fn translate_tree<T, S: Strategy<T>>(filter: &Filter, strategy: &S) -> Result<Vec<T>, FilterError> {
    match filter {
        Filter::And(lhs, rhs) => {
            let lex = translate_tree(lhs, strategy)?;
            let rex = translate_tree(rhs, strategy)?;
            // simplification has already collapsed or distributed every
            // multi-expression side
            let [l] = lex.as_slice() else {
                return Err(FilterError::InconsistentStrategy(format!(
                    "'{}' translated to {} expressions inside an and",
                    lhs,
                    lex.len()
                )));
            };
            let [r] = rex.as_slice() else {
                return Err(FilterError::InconsistentStrategy(format!(
                    "'{}' translated to {} expressions inside an and",
                    rhs,
                    rex.len()
                )));
            };
            let combined = strategy.and(l, r).ok_or_else(|| {
                FilterError::InconsistentStrategy(format!(
                    "and over '{}' and '{}' was pairable during simplification but failed to build",
                    lhs, rhs
                ))
            })?;
            Ok(vec![combined])
        }
        Filter::Or(lhs, rhs) => {
            let mut lex = translate_tree(lhs, strategy)?;
            let rex = translate_tree(rhs, strategy)?;
            if lex.is_empty() || rex.is_empty() {
                return Err(FilterError::InconsistentStrategy(format!(
                    "a branch of '{}' produced no expression after simplification",
                    filter
                )));
            }
            if let ([l], [r]) = (lex.as_slice(), rex.as_slice())
                && let Some(combined) = strategy.or(l, r)
            {
                return Ok(vec![combined]);
            }
            // no native or: the caller runs every query and unions the
            // results
            lex.extend(rex);
            Ok(lex)
        }
        leaf => {
            let expression = build_leaf(leaf, strategy).ok_or_else(|| {
                FilterError::InconsistentStrategy(format!(
                    "'{}' was supported during simplification but failed to build",
                    leaf
                ))
            })?;
            Ok(vec![expression])
        }
    }
}

/// Build the native expression for a leaf or a `not` directly above a
/// leaf. Complex value filters have no native form and always answer
/// `None`.
fn build_leaf<T, S: Strategy<T>>(filter: &Filter, strategy: &S) -> Option<T> {
    let (leaf, negated) = match filter {
        Filter::Not(inner) => (&**inner, true),
        other => (other, false),
    };
    match leaf {
        Filter::Present(path) => strategy.present(path, negated),
        Filter::Equals(path, value) => strategy.equals(path, value, negated),
        Filter::GreaterThan(path, value) => strategy.greater_than(path, value, negated),
        Filter::GreaterOrEqual(path, value) => strategy.greater_or_equal(path, value, negated),
        Filter::LessThan(path, value) => strategy.less_than(path, value, negated),
        Filter::LessOrEqual(path, value) => strategy.less_or_equal(path, value, negated),
        Filter::StartsWith(path, value) => strategy.starts_with(path, value, negated),
        Filter::EndsWith(path, value) => strategy.ends_with(path, value, negated),
        Filter::Contains(path, value) => strategy.contains(path, value, negated),
        _ => None,
    }
}

//! In-memory filter evaluation with directory-search semantics.
//!
//! [`Evaluator::evaluate`] decides whether one concrete document matches a
//! filter. The semantics follow directory search conventions: an absent
//! attribute, an explicit null and an empty array are equivalent states,
//! multi-valued attributes compare element-wise, and string comparison is
//! case-insensitive unless the attribute is registered as case-exact.

use std::cmp::Ordering;

use crate::filter::{Filter, FilterError, MAX_DEPTH};
use crate::path::Path;
use crate::schema::AttributeRegistry;
use crate::value::Value;

/// The filter evaluator.
///
/// Stateless apart from an optional borrowed [`AttributeRegistry`]; it can
/// be freely copied and shared across threads.
///
/// # Examples
///
/// ```
/// use scim_filter::{Evaluator, Filter, Path, Value};
///
/// let document = Value::from_json(serde_json::json!({ "userName": "bjensen" }));
/// let filter = Filter::eq(Path::attribute("userName"), "BJENSEN");
///
/// let evaluator = Evaluator::new();
/// assert!(evaluator.evaluate(&filter, &document).unwrap());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator<'a> {
    registry: Option<&'a AttributeRegistry>,
}

impl<'a> Evaluator<'a> {
    /// Evaluator with no schema knowledge; every string comparison is
    /// case-insensitive.
    pub fn new() -> Self {
        Evaluator { registry: None }
    }

    /// Evaluator consulting `registry` for per-attribute case sensitivity.
    pub fn with_registry(registry: &'a AttributeRegistry) -> Self {
        Evaluator {
            registry: Some(registry),
        }
    }

    /// Whether `document` matches `filter`.
    ///
    /// Errors from any sub-filter propagate unchanged; a single invalid
    /// leaf invalidates the whole evaluation.
    pub fn evaluate(&self, filter: &Filter, document: &Value) -> Result<bool, FilterError> {
        self.eval(filter, document, 0)
    }

    fn eval(&self, filter: &Filter, document: &Value, depth: usize) -> Result<bool, FilterError> {
        if depth > MAX_DEPTH {
            return Err(FilterError::DepthExceeded(MAX_DEPTH));
        }
        match filter {
            Filter::And(lhs, rhs) => {
                if !self.eval(lhs, document, depth + 1)? {
                    return Ok(false);
                }
                self.eval(rhs, document, depth + 1)
            }
            Filter::Or(lhs, rhs) => {
                if self.eval(lhs, document, depth + 1)? {
                    return Ok(true);
                }
                self.eval(rhs, document, depth + 1)
            }
            Filter::Not(inner) => Ok(!self.eval(inner, document, depth + 1)?),
            Filter::Present(path) => Ok(self
                .candidates(path, document)
                .iter()
                .any(|candidate| !candidate.is_empty())),
            Filter::Equals(path, value) => {
                let candidates = self.candidates(path, document);
                // a null comparison value tests for absence/emptiness
                if *value == Value::Null && candidates.iter().all(|candidate| candidate.is_empty())
                {
                    return Ok(true);
                }
                Ok(candidates
                    .iter()
                    .any(|candidate| self.equal(path, candidate, value)))
            }
            Filter::GreaterThan(path, value) => {
                self.order(path, value, document, |o| o == Ordering::Greater)
            }
            Filter::GreaterOrEqual(path, value) => {
                self.order(path, value, document, |o| o != Ordering::Less)
            }
            Filter::LessThan(path, value) => {
                self.order(path, value, document, |o| o == Ordering::Less)
            }
            Filter::LessOrEqual(path, value) => {
                self.order(path, value, document, |o| o != Ordering::Greater)
            }
            Filter::StartsWith(path, value) => {
                Ok(self.substring(path, value, document, |s, p| s.starts_with(p)))
            }
            Filter::EndsWith(path, value) => {
                Ok(self.substring(path, value, document, |s, p| s.ends_with(p)))
            }
            Filter::Contains(path, value) => {
                Ok(self.substring(path, value, document, |s, p| s.contains(p)))
            }
            Filter::Complex(path, inner) => {
                for candidate in self.candidates(path, document) {
                    match candidate {
                        Value::Array(elements) => {
                            for element in elements {
                                if self.eval(inner, element, depth + 1)? {
                                    return Ok(true);
                                }
                            }
                        }
                        _ => {
                            // a single complex attribute is filtered as a
                            // whole
                            if self.eval(inner, candidate, depth + 1)? {
                                return Ok(true);
                            }
                        }
                    }
                }
                Ok(false)
            }
        }
    }

    /// The document values a leaf filter is tested against.
    ///
    /// An array document supplies its elements directly (recursive
    /// per-element application from complex filters); an object document
    /// resolves the path and unrolls matched arrays so multi-valued
    /// attributes compare element-wise; a bare scalar matches only the
    /// reserved `value` path.
    fn candidates<'v>(&self, path: &Path, document: &'v Value) -> Vec<&'v Value> {
        match document {
            Value::Array(elements) => elements.iter().collect(),
            Value::Object(_) => {
                let mut candidates = Vec::new();
                for node in path.resolve(document) {
                    match node {
                        Value::Array(elements) => candidates.extend(elements.iter()),
                        other => candidates.push(other),
                    }
                }
                candidates
            }
            scalar if path.is_value_path() => vec![scalar],
            _ => Vec::new(),
        }
    }

    fn case_exact(&self, path: &Path) -> bool {
        self.registry
            .and_then(|registry| registry.definition(path))
            .map(|definition| definition.case_exact)
            .unwrap_or(false)
    }

    /// Structural equality with the case-sensitivity policy applied to
    /// strings and exact cross-type comparison applied to numbers.
    fn equal(&self, path: &Path, candidate: &Value, value: &Value) -> bool {
        if let (Value::String(a), Value::String(b)) = (candidate, value) {
            return if self.case_exact(path) {
                a == b
            } else {
                a.to_lowercase() == b.to_lowercase()
            };
        }
        if let (Some(a), Some(b)) = (candidate.as_decimal(), value.as_decimal()) {
            return a == b;
        }
        candidate == value
    }

    /// Sign of `candidate` relative to `value`, when the two are
    /// comparable.
    fn compare(&self, path: &Path, candidate: &Value, value: &Value) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (candidate.as_decimal(), value.as_decimal()) {
            return Some(a.cmp(&b));
        }
        if let (Value::String(a), Value::String(b)) = (candidate, value) {
            return Some(if self.case_exact(path) {
                a.cmp(b)
            } else {
                a.to_lowercase().cmp(&b.to_lowercase())
            });
        }
        None
    }

    fn order(
        &self,
        path: &Path,
        value: &Value,
        document: &Value,
        test: fn(Ordering) -> bool,
    ) -> Result<bool, FilterError> {
        for candidate in self.candidates(path, document) {
            if matches!(candidate, Value::Boolean(_) | Value::Binary(_)) {
                return Err(FilterError::InvalidFilter(format!(
                    "ordering is undefined for {} values at '{}'",
                    candidate.kind(),
                    path
                )));
            }
            if let Some(ordering) = self.compare(path, candidate, value)
                && test(ordering)
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn substring(
        &self,
        path: &Path,
        value: &Value,
        document: &Value,
        test: fn(&str, &str) -> bool,
    ) -> bool {
        for candidate in self.candidates(path, document) {
            match (candidate, value) {
                (Value::String(text), Value::String(sub)) => {
                    let matched = if self.case_exact(path) {
                        test(text, sub)
                    } else {
                        test(&text.to_lowercase(), &sub.to_lowercase())
                    };
                    if matched {
                        return true;
                    }
                }
                // non-textual candidates fall back to exact equality
                _ => {
                    if candidate == value {
                        return true;
                    }
                }
            }
        }
        false
    }
}

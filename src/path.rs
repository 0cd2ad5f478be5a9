use std::fmt;
use std::str::FromStr;

use crate::filter::FilterError;
use crate::value::Value;

/// Reserved segment addressing a bare element of a primitive array.
const VALUE_SEGMENT: &str = "value";

/// An attribute path addressing one location inside a document.
///
/// A path is a non-empty sequence of attribute-name segments, written as
/// dot-separated text (`name.familyName`). Segment matching during
/// resolution is case-insensitive, as directory attribute names are.
///
/// # Examples
///
/// ```
/// use scim_filter::Path;
///
/// let path: Path = "name.familyName".parse().unwrap();
/// assert_eq!(path.to_string(), "name.familyName");
/// assert_eq!(path.segments().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Path consisting of a single attribute name.
    pub fn attribute(name: impl Into<String>) -> Path {
        Path {
            segments: vec![name.into()],
        }
    }

    /// Extend this path with a sub-attribute segment.
    pub fn sub(mut self, name: impl Into<String>) -> Path {
        self.segments.push(name.into());
        self
    }

    /// The attribute-name segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether this is the reserved self-reference path `value`, which
    /// addresses a bare scalar element rather than an object attribute.
    pub fn is_value_path(&self) -> bool {
        self.segments.len() == 1 && self.segments[0].eq_ignore_ascii_case(VALUE_SEGMENT)
    }

    /// Every node addressed by this path inside `document`.
    ///
    /// Only object documents carry addressable attributes; anything else
    /// resolves to no nodes. Arrays encountered along the way are unrolled
    /// per element, and absent branches yield no nodes rather than an
    /// error.
    pub fn resolve<'a>(&self, document: &'a Value) -> Vec<&'a Value> {
        if !matches!(document, Value::Object(_)) {
            return Vec::new();
        }
        let mut current = vec![document];
        for segment in &self.segments {
            let mut next = Vec::new();
            for node in current {
                collect(node, segment, &mut next);
            }
            current = next;
        }
        current
    }
}

fn collect<'a>(node: &'a Value, segment: &str, out: &mut Vec<&'a Value>) {
    match node {
        Value::Object(fields) => {
            for (key, value) in fields {
                if key.eq_ignore_ascii_case(segment) {
                    out.push(value);
                }
            }
        }
        Value::Array(elements) => {
            for element in elements {
                collect(element, segment, out);
            }
        }
        _ => {}
    }
}

impl FromStr for Path {
    type Err = FilterError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let segments: Vec<String> = text.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(FilterError::InvalidFilter(format!(
                "invalid attribute path '{}'",
                text
            )));
        }
        Ok(Path { segments })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

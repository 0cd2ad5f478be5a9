use std::collections::HashMap;

use crate::path::Path;

/// Schema knowledge about one attribute, supplied by the caller.
///
/// Only the pieces the filter core consults are carried here. The default
/// treats string comparison as case-insensitive, the directory norm.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeDefinition {
    /// Strings under this attribute compare exactly instead of
    /// case-insensitively.
    pub case_exact: bool,
}

/// Lookup table from attribute paths to their definitions.
///
/// Paths are matched case-insensitively. Attributes without a registered
/// definition fall back to the defaults of [`AttributeDefinition`].
#[derive(Debug, Clone, Default)]
pub struct AttributeRegistry {
    definitions: HashMap<String, AttributeDefinition>,
}

impl AttributeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition for the attribute at `path`.
    pub fn register(&mut self, path: &Path, definition: AttributeDefinition) {
        self.definitions
            .insert(path.to_string().to_lowercase(), definition);
    }

    /// The definition registered for `path`, if any.
    pub fn definition(&self, path: &Path) -> Option<&AttributeDefinition> {
        self.definitions.get(&path.to_string().to_lowercase())
    }
}

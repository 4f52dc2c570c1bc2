//! Decode configuration.
//!
//! [`DecodeOptions`] is threaded by reference through every decoder. It is
//! plain data, so one value can be shared by several threads decoding
//! independent bundles.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use crate::Result;
use crate::classes::{Resolution, TypeTable};
use crate::formats::objects::{ExternalRefLayout, UndefinedLayout};

/// Settings that control how ambiguous input is resolved.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Table consulted for type ids a file does not describe itself.
    pub types: TypeTable,
    /// What to do with type ids neither table knows.
    pub resolution: Resolution,
    /// Delimits external-reference records.
    pub external_refs: Arc<dyn ExternalRefLayout>,
}

impl Default for DecodeOptions {
    /// Builtin type table, strict resolution, no external-reference layout.
    fn default() -> Self {
        Self {
            types: TypeTable::builtin(),
            resolution: Resolution::Strict,
            external_refs: Arc::new(UndefinedLayout),
        }
    }
}

impl DecodeOptions {
    /// Same as [`DecodeOptions::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the default type table.
    pub fn with_types(mut self, types: TypeTable) -> Self {
        self.types = types;
        self
    }

    /// Extend the default type table with a class-list file.
    pub fn with_class_list(mut self, path: impl AsRef<Path>) -> Result<Self> {
        self.types.load_class_list(File::open(path)?)?;
        Ok(self)
    }

    /// Set the resolution mode.
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Use `layout` to delimit external-reference records.
    pub fn with_external_refs(mut self, layout: impl ExternalRefLayout + 'static) -> Self {
        self.external_refs = Arc::new(layout);
        self
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults() {
        let opts = DecodeOptions::new();
        assert_eq!(opts.types, TypeTable::builtin());
        assert_eq!(opts.resolution, Resolution::Strict);
        assert!(!opts.external_refs.delimits(22));
    }

    #[test]
    fn class_list_extends_builtin_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "114 = MonoBehaviour").unwrap();

        let opts = DecodeOptions::new()
            .with_resolution(Resolution::Lenient)
            .with_class_list(file.path())
            .unwrap();
        assert_eq!(opts.types.len(), 3);
        assert_eq!(opts.types.name(114), Some("MonoBehaviour"));
        assert_eq!(opts.resolution, Resolution::Lenient);
    }
}

//! Object class kinds and the default type table.
//!
//! Every object record carries a numeric type id. The id is resolved to a
//! [`ClassKind`] by looking it up first in the owning file's own type
//! metadata and then in a caller-supplied [`TypeTable`]. The table is plain
//! data passed by reference into the decoder; there is no process-wide
//! registry.
//!
//! ## Class list file format
//! Reference tables can be loaded from simple `id = Name` text files, one
//! entry per line, comments prefixed with `;`:
//!
//! ```text
//! ; core classes
//! 49  = TextAsset
//! 142 = AssetBundle
//! 114 = MonoBehaviour
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::io::{BufRead, BufReader, Read};

use log::warn;

use crate::Result;

/// Semantic type of an object.
///
/// Open-ended: ids without a named variant are kept as
/// [`ClassKind::Unrecognized`] instead of failing the decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClassKind {
    /// Class id 49.
    TextAsset,
    /// Class id 142.
    AssetBundle,
    /// Any other class id.
    Unrecognized(u32),
}

impl ClassKind {
    pub const TEXT_ASSET_ID: u32 = 49;
    pub const ASSET_BUNDLE_ID: u32 = 142;

    /// Map a raw class id to its kind.
    pub const fn from_id(id: u32) -> Self {
        match id {
            Self::TEXT_ASSET_ID => Self::TextAsset,
            Self::ASSET_BUNDLE_ID => Self::AssetBundle,
            other => Self::Unrecognized(other),
        }
    }

    /// Raw class id.
    pub const fn id(self) -> u32 {
        match self {
            Self::TextAsset => Self::TEXT_ASSET_ID,
            Self::AssetBundle => Self::ASSET_BUNDLE_ID,
            Self::Unrecognized(id) => id,
        }
    }

    /// Name of a recognized kind.
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::TextAsset => Some("TextAsset"),
            Self::AssetBundle => Some("AssetBundle"),
            Self::Unrecognized(_) => None,
        }
    }
}

impl From<u32> for ClassKind {
    fn from(id: u32) -> Self {
        Self::from_id(id)
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Unrecognized({})", self.id()),
        }
    }
}

/// How to treat a type id that neither the file nor the default table knows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Resolution {
    /// Fail with [`UnknownType`](crate::Error::UnknownType).
    #[default]
    Strict,
    /// Keep the object as [`ClassKind::Unrecognized`] and log a warning.
    Lenient,
}

/// Which table a class kind was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSource {
    /// The serialized file's own type metadata.
    File,
    /// The caller-supplied default table.
    Default,
    /// Neither; only possible under [`Resolution::Lenient`].
    Unresolved,
}

/// Default type table consulted when a file's own metadata lacks an id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeTable {
    /// Class names keyed by class id.
    pub names: BTreeMap<u32, String>,
}

impl TypeTable {
    /// Create an empty table. Only a file's own metadata can resolve ids.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table containing every kind with a named [`ClassKind`] variant.
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for kind in [ClassKind::TextAsset, ClassKind::AssetBundle] {
            if let Some(name) = kind.name() {
                table.insert(kind.id(), name);
            }
        }
        table
    }

    /// Register `id` under `name`, replacing any previous entry.
    pub fn insert(&mut self, id: u32, name: impl Into<String>) {
        self.names.insert(id, name.into());
    }

    /// Whether `id` is present.
    pub fn contains(&self, id: u32) -> bool {
        self.names.contains_key(&id)
    }

    /// Name registered for `id`.
    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Load entries from a class-list reader (see module docs).
    ///
    /// Lines beginning with `;` and blank lines are ignored. Lines that do
    /// not parse as `id = Name` are skipped with a warning so that lists
    /// written for newer engine versions still load.
    pub fn load_class_list<R: Read>(&mut self, reader: R) -> Result<()> {
        let buf = BufReader::new(reader);
        for (lineno, line) in buf.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            let Some((id, name)) = line.split_once('=') else {
                warn!("class list line {}: missing '='", lineno + 1);
                continue;
            };
            let name = name.trim();
            match id.trim().parse::<u32>() {
                Ok(id) if !name.is_empty() => self.insert(id, name),
                _ => warn!("class list line {}: expected `id = Name`", lineno + 1),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_ids() {
        assert_eq!(ClassKind::from_id(49), ClassKind::TextAsset);
        assert_eq!(ClassKind::from_id(142), ClassKind::AssetBundle);
        assert_eq!(ClassKind::from_id(114), ClassKind::Unrecognized(114));
        assert_eq!(ClassKind::Unrecognized(114).id(), 114);
        assert_eq!(ClassKind::TextAsset.to_string(), "TextAsset");
        assert_eq!(ClassKind::from(7).to_string(), "Unrecognized(7)");
    }

    #[test]
    fn builtin_table() {
        let table = TypeTable::builtin();
        assert_eq!(table.len(), 2);
        assert_eq!(table.name(49), Some("TextAsset"));
        assert_eq!(table.name(142), Some("AssetBundle"));
        assert!(!table.contains(1));
        assert!(TypeTable::empty().is_empty());
    }

    #[test]
    fn load_class_list_skips_comments_and_junk() {
        let text = "\
; reference classes
49 = TextAsset

114=MonoBehaviour
not a line
x = Nope
28 =
 83 = AudioClip
";
        let mut table = TypeTable::empty();
        table.load_class_list(text.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.name(49), Some("TextAsset"));
        assert_eq!(table.name(114), Some("MonoBehaviour"));
        assert_eq!(table.name(83), Some("AudioClip"));
        assert!(!table.contains(28));
    }

    #[test]
    fn load_class_list_propagates_read_errors() {
        let bytes = b"49 = TextAsset\n\xFF\xFE = Bad\n";
        let mut table = TypeTable::empty();
        let err = table.load_class_list(&bytes[..]).unwrap_err();
        assert!(matches!(err, crate::Error::Io(e) if e.kind() == std::io::ErrorKind::InvalidData));
        assert_eq!(table.name(49), Some("TextAsset"));
    }
}

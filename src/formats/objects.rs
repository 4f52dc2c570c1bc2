//! Object table - object directory, added objects and external references.
//!
//! Follows the type metadata and uses the file's byte order. Field widths
//! and presence depend on the serialized-file format; see [`ObjectLayout`].
//!
//! ## Layout
//! ```text
//! ObjectCount              (u32)
//! ObjectCount × {
//!     [align to 4]         (format >= 14)
//!     PathId               (i64 if format >= 14, else i32)
//!     DataOffset           (u32, relative to the file's data region)
//!     Size                 (u32)
//!     TypeId               (u32)
//!     ClassId              (i16)
//!     Trailer              (format <= 10: IsDestroyed i16
//!                           format 11-14: i16
//!                           format >= 15: i16 + u8)
//! }
//! [AddCount                (u32)                   format >= 11
//!  AddCount × { [align] Id (i64 | i32), Value (i32) }]
//! RefCount                 (u32)
//! RefCount × ExternalRef   (layout supplied by the caller)
//! Terminator               (nul-terminated string, must be empty)
//! ```

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::ops::Range;

use log::{debug, trace, warn};

use crate::classes::{ClassKind, Resolution, TypeSource};
use crate::cursor::SliceCursor;
use crate::formats::types::TypeMetadata;
use crate::options::DecodeOptions;
use crate::{Error, Result};

/// Trailer shape of an object record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailerLayout {
    /// `IsDestroyed` (i16).
    Destroyed,
    /// One opaque i16.
    Marker,
    /// One opaque i16 followed by one opaque byte.
    MarkerAndFlag,
}

/// Object-table fields gated on the serialized-file format.
///
/// | Field | Condition |
/// |-------|-----------|
/// | 4-byte alignment + i64 ids | format >= 14 |
/// | added-object section | format >= 11 |
/// | trailer `Destroyed` | format <= 10 |
/// | trailer `Marker` | 11 <= format <= 14 |
/// | trailer `MarkerAndFlag` | format >= 15 |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectLayout {
    /// Ids are aligned to 4 bytes and 64 bits wide.
    pub wide_ids: bool,
    /// The added-object section is present.
    pub has_adds: bool,
    /// Shape of the per-object trailer.
    pub trailer: TrailerLayout,
}

impl ObjectLayout {
    /// Layout used by serialized-file `format`.
    pub const fn for_format(format: u32) -> Self {
        Self {
            wide_ids: format >= 14,
            has_adds: format >= 11,
            trailer: match format {
                ..=10 => TrailerLayout::Destroyed,
                11..=14 => TrailerLayout::Marker,
                _ => TrailerLayout::MarkerAndFlag,
            },
        }
    }
}

/// Version-dependent trailer of an object record, kept verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectTrailer {
    /// Destroyed flag (format <= 10).
    Destroyed(i16),
    /// Opaque field (format 11-14).
    Marker(i16),
    /// Opaque field plus opaque byte (format >= 15).
    MarkerAndFlag(i16, u8),
}

impl ObjectTrailer {
    /// Whether the record is flagged as destroyed. Always `false` for
    /// formats without the flag.
    pub fn is_destroyed(&self) -> bool {
        matches!(self, Self::Destroyed(v) if *v != 0)
    }
}

/// A single object directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Offset relative to the owning file's data region.
    pub data_offset: u32,
    /// Size in bytes.
    pub size: u32,
    /// Raw type id.
    pub type_id: u32,
    /// Resolved class kind.
    pub kind: ClassKind,
    /// Class id field (i16).
    pub class_id: i16,
    /// Version-dependent trailer.
    pub trailer: ObjectTrailer,
}

impl ObjectEntry {
    /// Byte range within the owning file's data region.
    pub fn range(&self) -> Range<usize> {
        let start = self.data_offset as usize;
        start..start + self.size as usize
    }
}

/// One external reference record, kept as an opaque byte range of the
/// owning file's buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalReference {
    /// Range within the serialized-file buffer.
    pub range: Range<usize>,
}

/// The external-reference section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalRefs {
    /// Every record was delimited by the configured [`ExternalRefLayout`].
    Decoded(Vec<ExternalReference>),
    /// `count` records start at `offset` in the file buffer, but no layout
    /// was available to delimit them. Nothing after this point was decoded.
    Unparsed { count: u32, offset: u64 },
}

impl ExternalRefs {
    /// Number of records announced by the file.
    pub fn count(&self) -> usize {
        match self {
            Self::Decoded(refs) => refs.len(),
            Self::Unparsed { count, .. } => *count as usize,
        }
    }
}

/// Delimits external-reference records.
///
/// The record layout is not defined by this crate; callers that know it
/// supply an implementation through
/// [`DecodeOptions::with_external_refs`](crate::options::DecodeOptions::with_external_refs).
pub trait ExternalRefLayout: fmt::Debug + Send + Sync {
    /// Whether records of serialized-file `format` can be delimited.
    fn delimits(&self, format: u32) -> bool;

    /// Advance `r` past exactly one record.
    fn skip_record(&self, r: &mut SliceCursor<'_>, format: u32) -> Result<()>;
}

/// Layout used when none is configured: delimits nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct UndefinedLayout;

impl ExternalRefLayout for UndefinedLayout {
    fn delimits(&self, _format: u32) -> bool {
        false
    }

    fn skip_record(&self, _r: &mut SliceCursor<'_>, _format: u32) -> Result<()> {
        Err(Error::Parse("external reference layout is undefined"))
    }
}

/// Decoded object table of one serialized file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectTable {
    /// Objects keyed by path id.
    pub objects: BTreeMap<i64, ObjectEntry>,
    /// Added-object `(id, value)` pairs in file order.
    pub adds: Vec<(i64, i32)>,
    /// External-reference section.
    pub external_refs: ExternalRefs,
    /// Where each class kind present in the table was resolved from.
    pub resolved_types: BTreeMap<ClassKind, TypeSource>,
}

impl ObjectTable {
    /// Parse the object table.
    ///
    /// `region_len` is the length of the file's data region; every object
    /// range must fit inside it.
    pub fn parse(
        r: &mut SliceCursor<'_>,
        format: u32,
        metadata: &TypeMetadata,
        region_len: usize,
        options: &DecodeOptions,
    ) -> Result<Self> {
        let layout = ObjectLayout::for_format(format);

        let num_objects = r.read_u32()?;
        debug!("object table: {num_objects} objects, {layout:?}");

        let mut objects = BTreeMap::new();
        let mut resolved_types = BTreeMap::new();
        for _ in 0..num_objects {
            let path_id = read_id(r, layout)?;
            let data_offset = r.read_u32()?;
            let size = r.read_u32()?;
            let type_id = r.read_u32()?;
            let class_id = r.read_i16()?;
            let trailer = match layout.trailer {
                TrailerLayout::Destroyed => ObjectTrailer::Destroyed(r.read_i16()?),
                TrailerLayout::Marker => ObjectTrailer::Marker(r.read_i16()?),
                TrailerLayout::MarkerAndFlag => {
                    ObjectTrailer::MarkerAndFlag(r.read_i16()?, r.read_u8()?)
                }
            };

            let (kind, source) = resolve(path_id, type_id, metadata, options)?;
            let slot = resolved_types.entry(kind).or_insert(source);
            if source == TypeSource::File {
                *slot = source;
            }

            if u64::from(data_offset) + u64::from(size) > region_len as u64 {
                return Err(Error::ObjectOutOfBounds {
                    path_id,
                    offset: data_offset,
                    size,
                    region: region_len,
                });
            }

            trace!("object {path_id}: {kind} at {data_offset:#x}+{size:#x}");
            let entry = ObjectEntry {
                data_offset,
                size,
                type_id,
                kind,
                class_id,
                trailer,
            };
            match objects.entry(path_id) {
                Entry::Vacant(e) => {
                    e.insert(entry);
                }
                Entry::Occupied(_) => return Err(Error::DuplicateObject(path_id)),
            }
        }

        let mut adds = Vec::new();
        if layout.has_adds {
            let num_adds = r.read_u32()?;
            for _ in 0..num_adds {
                let id = read_id(r, layout)?;
                adds.push((id, r.read_i32()?));
            }
        }

        let num_refs = r.read_u32()?;
        let external_refs = if num_refs == 0 {
            ExternalRefs::Decoded(Vec::new())
        } else if options.external_refs.delimits(format) {
            let mut refs = Vec::new();
            for _ in 0..num_refs {
                let start = r.tell();
                options.external_refs.skip_record(r, format)?;
                refs.push(ExternalReference {
                    range: start as usize..r.tell() as usize,
                });
            }
            ExternalRefs::Decoded(refs)
        } else {
            // Without a layout the terminator's position is unknown.
            let offset = r.tell();
            debug!("{num_refs} external references at {offset:#x} left unparsed");
            return Ok(Self {
                objects,
                adds,
                external_refs: ExternalRefs::Unparsed {
                    count: num_refs,
                    offset,
                },
                resolved_types,
            });
        };

        let terminator = r.read_cstring()?;
        if !terminator.is_empty() {
            return Err(Error::TrailingData(terminator));
        }

        Ok(Self {
            objects,
            adds,
            external_refs,
            resolved_types,
        })
    }
}

fn read_id(r: &mut SliceCursor<'_>, layout: ObjectLayout) -> Result<i64> {
    if layout.wide_ids {
        r.align(4)?;
        r.read_i64()
    } else {
        Ok(i64::from(r.read_i32()?))
    }
}

fn resolve(
    path_id: i64,
    type_id: u32,
    metadata: &TypeMetadata,
    options: &DecodeOptions,
) -> Result<(ClassKind, TypeSource)> {
    let kind = ClassKind::from_id(type_id);
    if metadata.contains(type_id) {
        Ok((kind, TypeSource::File))
    } else if options.types.contains(type_id) {
        Ok((kind, TypeSource::Default))
    } else {
        match options.resolution {
            Resolution::Strict => Err(Error::UnknownType { path_id, type_id }),
            Resolution::Lenient => {
                warn!("object {path_id}: type id {type_id} not in any type table");
                Ok((kind, TypeSource::Unresolved))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_decision_table() {
        let cases = [
            (9, false, false, TrailerLayout::Destroyed),
            (10, false, false, TrailerLayout::Destroyed),
            (11, false, true, TrailerLayout::Marker),
            (13, false, true, TrailerLayout::Marker),
            (14, true, true, TrailerLayout::Marker),
            (15, true, true, TrailerLayout::MarkerAndFlag),
            (22, true, true, TrailerLayout::MarkerAndFlag),
        ];
        for (format, wide_ids, has_adds, trailer) in cases {
            assert_eq!(
                ObjectLayout::for_format(format),
                ObjectLayout {
                    wide_ids,
                    has_adds,
                    trailer
                },
                "format {format}"
            );
        }
    }

    #[test]
    fn destroyed_flag() {
        assert!(ObjectTrailer::Destroyed(1).is_destroyed());
        assert!(!ObjectTrailer::Destroyed(0).is_destroyed());
        assert!(!ObjectTrailer::Marker(1).is_destroyed());
        assert!(!ObjectTrailer::MarkerAndFlag(1, 1).is_destroyed());
    }

    #[test]
    fn undefined_layout_delimits_nothing() {
        let data = [0u8; 4];
        let mut r = SliceCursor::from_slice(&data, crate::cursor::Endian::Big);
        assert!(!UndefinedLayout.delimits(15));
        assert!(UndefinedLayout.skip_record(&mut r, 15).is_err());
        assert_eq!(r.tell(), 0);
    }
}

//! Serialized file ("asset") - one self-contained sub-document of a bundle.
//!
//! The decoder owns the file's bytes: they are sliced out of the container
//! once and never re-read from it, so a [`SerializedFile`] stays valid after
//! the bundle stream is closed.
//!
//! ## Layout
//! ```text
//! [0x00] FileSize          (u32 BE)
//! [0x04] Format            (u32 BE, >= 9)
//! [0x08] DataOffset        (u32 BE, start of the object data region)
//! [0x0C] Endianness        (u32 BE, 0 = little-endian for the rest)
//! [0x10] TypeMetadata      (see [`crate::formats::types`])
//!        ObjectTable       (see [`crate::formats::objects`])
//! [DataOffset]
//!        Object data
//! ```
//! The header is always big-endian; the endianness flag only applies to
//! what follows it.

use std::collections::BTreeMap;
use std::fmt;

use log::debug;

use crate::classes::{ClassKind, TypeSource};
use crate::cursor::{Endian, SliceCursor};
use crate::error::Unsupported;
use crate::formats::objects::{ExternalRefs, ObjectEntry, ObjectTable};
use crate::formats::types::TypeMetadata;
use crate::options::DecodeOptions;
use crate::{Error, Result};

/// Oldest serialized-file format this crate decodes.
pub const MIN_FORMAT: u32 = 9;

/// Parsed serialized file together with its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedFile {
    /// Name from the bundle's asset entry.
    pub name: String,
    /// Distance from the asset entry to the file's first byte.
    pub header_size: u32,
    /// Size of the file's buffer in bytes.
    pub size: u32,
    /// Absolute stream position of the file's first byte.
    pub stream_offset: u64,
    /// `FileSize` header field.
    pub file_size: u32,
    /// Serialized-file format version.
    pub format: u32,
    /// Byte order of everything after the header.
    pub endian: Endian,
    /// Type metadata.
    pub types: TypeMetadata,
    /// Added-object `(id, value)` pairs in file order.
    pub adds: Vec<(i64, i32)>,
    /// External-reference section.
    pub external_refs: ExternalRefs,
    /// Where each class kind used by an object was resolved from.
    pub resolved_types: BTreeMap<ClassKind, TypeSource>,
    objects: BTreeMap<i64, ObjectEntry>,
    data_offset: u32,
    data: Vec<u8>,
}

/// An object entry borrowed together with the file that owns its bytes.
#[derive(Clone, Copy)]
pub struct ObjectRef<'a> {
    /// Path id.
    pub path_id: i64,
    /// Directory record.
    pub entry: &'a ObjectEntry,
    file: &'a SerializedFile,
}

impl fmt::Debug for ObjectRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef")
            .field("path_id", &self.path_id)
            .field("entry", self.entry)
            .field("file", &self.file.name)
            .finish()
    }
}

impl<'a> ObjectRef<'a> {
    /// The object's bytes, borrowed from the file buffer.
    pub fn bytes(&self) -> &'a [u8] {
        // Ranges are checked against the data region during decode.
        &self.file.data_region()[self.entry.range()]
    }

    /// Resolved class kind.
    pub fn kind(&self) -> ClassKind {
        self.entry.kind
    }
}

impl SerializedFile {
    /// Decode a serialized file that was not read from a bundle.
    pub fn from_bytes(
        name: impl Into<String>,
        data: Vec<u8>,
        options: &DecodeOptions,
    ) -> Result<Self> {
        Self::parse(name.into(), 0, 0, data, options)
    }

    /// Decode a serialized file from its owned buffer.
    ///
    /// `header_size` and `stream_offset` describe where the buffer came
    /// from and are only recorded.
    pub fn parse(
        name: String,
        header_size: u32,
        stream_offset: u64,
        data: Vec<u8>,
        options: &DecodeOptions,
    ) -> Result<Self> {
        let size = u32::try_from(data.len()).map_err(|_| Error::InvalidRange)?;
        let mut r = SliceCursor::from_slice(&data, Endian::Big);

        let file_size = r.read_u32()?;
        let format = r.read_u32()?;
        let data_offset = r.read_u32()?;
        let endian = match r.read_u32()? {
            0 => Endian::Little,
            _ => Endian::Big,
        };
        r.set_endian(endian);

        if format < MIN_FORMAT {
            return Err(Error::UnsupportedFormat(Unsupported::SerializedFormat(
                format,
            )));
        }
        debug!(
            "serialized file {name}: format {format}, {endian:?}, \
             data at {data_offset:#x}, {size} bytes"
        );

        // Region bounds are only checked once the metadata has been read.
        let types = TypeMetadata::parse(&mut r)?;
        let region_len = data
            .len()
            .checked_sub(data_offset as usize)
            .ok_or(Error::InvalidRange)?;
        let table = ObjectTable::parse(&mut r, format, &types, region_len, options)?;

        Ok(Self {
            name,
            header_size,
            size,
            stream_offset,
            file_size,
            format,
            endian,
            types,
            adds: table.adds,
            external_refs: table.external_refs,
            resolved_types: table.resolved_types,
            objects: table.objects,
            data_offset,
            data,
        })
    }

    /// Offset of the object data region within the file buffer.
    pub fn data_offset(&self) -> u32 {
        self.data_offset
    }

    /// Whole file buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Object data region (everything from `data_offset` on).
    pub fn data_region(&self) -> &[u8] {
        &self.data[self.data_offset as usize..]
    }

    /// Number of objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Directory records keyed by path id.
    pub fn entries(&self) -> &BTreeMap<i64, ObjectEntry> {
        &self.objects
    }

    /// Look up an object by path id.
    pub fn object(&self, path_id: i64) -> Option<ObjectRef<'_>> {
        self.objects.get(&path_id).map(|entry| ObjectRef {
            path_id,
            entry,
            file: self,
        })
    }

    /// Iterate over all objects in path-id order.
    pub fn objects(&self) -> impl Iterator<Item = ObjectRef<'_>> {
        self.objects.iter().map(|(&path_id, entry)| ObjectRef {
            path_id,
            entry,
            file: self,
        })
    }

    /// Iterate over all objects of one class kind.
    pub fn objects_of_kind(&self, kind: ClassKind) -> impl Iterator<Item = ObjectRef<'_>> {
        self.objects().filter(move |o| o.kind() == kind)
    }

    /// Bytes of `entry`, if it lies within this file's data region.
    ///
    /// Returns [`Error::InvalidRange`] for entries that belong to a
    /// different file and do not fit this one.
    pub fn object_bytes(&self, entry: &ObjectEntry) -> Result<&[u8]> {
        self.data_region()
            .get(entry.range())
            .ok_or(Error::InvalidRange)
    }

    /// Absolute stream position of an object's first byte.
    pub fn absolute_offset(&self, entry: &ObjectEntry) -> u64 {
        self.stream_offset + u64::from(self.data_offset) + u64::from(entry.data_offset)
    }
}

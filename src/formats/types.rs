//! Type metadata - per-class hashes and optional type-tree blobs.
//!
//! Sits directly after the serialized-file header and uses the file's byte
//! order.
//!
//! ## Layout
//! ```text
//! GeneratorVersion         (nul-terminated string)
//! TargetPlatform           (u32)
//! HasTypeTrees             (u8, non-zero = true)
//! TypeCount                (i32)
//! TypeCount × {
//!     ClassId              (i32)
//!     Hash                 (0x20 bytes if ClassId < 0, else 0x10)
//!     [TypeTree]           (only if HasTypeTrees)
//! }
//! ```
//!
//! ## TypeTree blob
//! ```text
//! NodeCount                (u32)
//! BufferBytes              (u32)
//! Nodes                    (NodeCount × 0x18 bytes)
//! Buffer                   (BufferBytes bytes)
//! ```
//! Node records and the buffer are kept as raw bytes; their internal layout
//! is left to the caller.

use std::collections::BTreeMap;
use std::io::{Read, Seek};

use log::debug;

use crate::cursor::ByteCursor;
use crate::platform::TargetPlatform;
use crate::{Error, Result};

/// Hash identifying a class layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeHash {
    /// Engine class (non-negative class id).
    Class([u8; 16]),
    /// Script-defined type (negative class id).
    Script([u8; 32]),
}

impl TypeHash {
    /// Raw hash bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Class(h) => h,
            Self::Script(h) => h,
        }
    }
}

/// Undecoded type tree for one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTreeBlob {
    /// Number of node records.
    pub node_count: u32,
    /// `node_count` consecutive node records of [`Self::NODE_SIZE`] bytes.
    pub nodes: Vec<u8>,
    /// Auxiliary string/value buffer.
    pub buffer: Vec<u8>,
}

impl TypeTreeBlob {
    /// Size of one node record in bytes.
    pub const NODE_SIZE: usize = 0x18;

    fn parse<R: Read + Seek>(r: &mut ByteCursor<R>) -> Result<Self> {
        let node_count = r.read_u32()?;
        let buffer_bytes = r.read_u32()?;
        let nodes_len = (node_count as usize)
            .checked_mul(Self::NODE_SIZE)
            .ok_or(Error::InvalidRange)?;
        let nodes = r.read_bytes(nodes_len)?;
        let buffer = r.read_bytes(buffer_bytes as usize)?;
        Ok(Self {
            node_count,
            nodes,
            buffer,
        })
    }

    /// Raw bytes of node `index`.
    pub fn node(&self, index: usize) -> Option<&[u8]> {
        self.nodes.chunks_exact(Self::NODE_SIZE).nth(index)
    }
}

/// Parsed type metadata of one serialized file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMetadata {
    /// Engine version that wrote the file.
    pub generator_version: String,
    /// Platform the file was built for.
    pub target_platform: TargetPlatform,
    /// Whether each type entry carries a type tree.
    pub has_type_trees: bool,
    /// Hash per class id.
    pub hashes: BTreeMap<i32, TypeHash>,
    /// Type tree per class id (empty unless `has_type_trees`).
    pub type_trees: BTreeMap<i32, TypeTreeBlob>,
}

impl TypeMetadata {
    /// Parse type metadata from `r`, which must be positioned right after
    /// the serialized-file header with its byte order already selected.
    pub fn parse<R: Read + Seek>(r: &mut ByteCursor<R>) -> Result<Self> {
        let generator_version = r.read_cstring()?;
        let target_platform = TargetPlatform::try_from(r.read_u32()?)?;
        let has_type_trees = r.read_u8()? != 0;
        let num_types = r.read_i32()?;
        if num_types < 0 {
            return Err(Error::Parse("negative type count"));
        }

        debug!(
            "type metadata: generator {generator_version}, {target_platform}, \
             {num_types} types, type trees: {has_type_trees}"
        );

        let mut hashes = BTreeMap::new();
        let mut type_trees = BTreeMap::new();
        for _ in 0..num_types {
            let class_id = r.read_i32()?;
            let hash = if class_id < 0 {
                TypeHash::Script(r.read_array()?)
            } else {
                TypeHash::Class(r.read_array()?)
            };
            hashes.insert(class_id, hash);

            if has_type_trees {
                type_trees.insert(class_id, TypeTreeBlob::parse(r)?);
            }
        }

        Ok(Self {
            generator_version,
            target_platform,
            has_type_trees,
            hashes,
            type_trees,
        })
    }

    /// Whether the file itself describes `type_id`, either by hash or by
    /// type tree.
    ///
    /// Object records store the type id unsigned; script types are the
    /// negative class ids, so the bits are reinterpreted rather than
    /// range-checked.
    pub fn contains(&self, type_id: u32) -> bool {
        let id = type_id as i32;
        self.type_trees.contains_key(&id) || self.hashes.contains_key(&id)
    }
}

//! Library-wide error and result types.

use std::io;

use thiserror::Error;

/// Result alias used throughout unibundle.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the library can produce.
///
/// Any error aborts decoding of the current serialized file and, because
/// assets are decoded in stream order, of the whole bundle.
#[derive(Debug, Error)]
pub enum Error {
    /// A signature or format version is recognized but not supported, or
    /// not recognized at all.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(Unsupported),
    /// The type metadata names a target platform code we do not recognize.
    #[error("unsupported target platform: {0}")]
    UnsupportedPlatform(u32),
    /// The stream ended before all bytes of a field could be read.
    #[error("truncated read at offset {offset:#x} (need {need} bytes)")]
    TruncatedRead { offset: u64, need: usize },
    /// A nul-terminated string ran into the end of the stream.
    #[error("unterminated string at offset {offset:#x}")]
    UnterminatedString { offset: u64 },
    /// A nul-terminated string is not valid UTF-8.
    #[error("string at offset {offset:#x} is not valid UTF-8: {source}")]
    InvalidString {
        offset: u64,
        source: std::string::FromUtf8Error,
    },
    /// Two object records in the same serialized file share a path id.
    #[error("duplicate object path id {0}")]
    DuplicateObject(i64),
    /// An object's type id is neither in the file's own type table nor in
    /// the default table.
    #[error("unknown type id {type_id} for object {path_id}")]
    UnknownType { path_id: i64, type_id: u32 },
    /// An object's byte range extends past the file's data region.
    #[error("object {path_id} range {offset:#x}+{size:#x} exceeds data region of {region:#x} bytes")]
    ObjectOutOfBounds {
        path_id: i64,
        offset: u32,
        size: u32,
        region: usize,
    },
    /// An offset or size field points outside the valid region.
    #[error("invalid offset or size")]
    InvalidRange,
    /// The terminator string after the object table was not empty.
    #[error("unexpected trailing data: {0:?}")]
    TrailingData(String),
    /// A structural constraint was violated (message describes which one).
    #[error("parse error: {0}")]
    Parse(&'static str),
    /// An underlying I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// What made an input unsupported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unsupported {
    /// The container signature is not the raw marker. The web-compressed
    /// marker lands here too.
    #[error("bundle signature {0:?}")]
    Signature(String),
    /// A serialized file declares a format older than the oldest supported
    /// one.
    #[error("serialized file format {0}")]
    SerializedFormat(u32),
}

//! Raw asset bundle - top-level container of serialized files.
//!
//! Only the uncompressed `UnityRaw` layout is decoded. The web-compressed
//! `UnityWeb` signature is recognized and rejected with
//! [`Error::UnsupportedFormat`], like any other signature.
//!
//! ## Layout (all integers big-endian)
//! ```text
//! Signature                (nul-terminated, "UnityRaw")
//! FormatVersion            (i32)
//! UnityVersion             (nul-terminated string)
//! GeneratorVersion         (nul-terminated string)
//! FileSize                 (u32)
//! HeaderSize               (i32)
//! FileCount                (i32)
//! BundleCount              (i32)
//! [CompleteFileSize        (u32)]   FormatVersion >= 2
//! [DataHeaderSize          (u32)]   FormatVersion >= 3
//! [UncompressedFileSize    (u32)
//!  BundleHeaderSize        (u32)]   HeaderSize >= 60
//! [HeaderSize]
//!        AssetCount        (i32)
//!        AssetCount × {
//!            Name          (nul-terminated string)
//!            HeaderSize    (u32, from the start of this entry to the data)
//!            Size          (u32)
//!            [entry start + HeaderSize]
//!            Data          (Size bytes, one serialized file)
//!        }
//! ```

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom, Take};
use std::ops::Index;
use std::path::Path;

use log::debug;

use crate::cursor::{ByteCursor, Endian};
use crate::error::Unsupported;
use crate::formats::serialized::SerializedFile;
use crate::options::DecodeOptions;
use crate::{Error, Result};

/// Signature of the uncompressed layout.
pub const SIGNATURE_RAW: &str = "UnityRaw";
/// Signature of the legacy web-compressed layout (unsupported).
pub const SIGNATURE_WEB: &str = "UnityWeb";

/// Header size from which the two extended size fields are present.
pub const EXTENDED_HEADER_SIZE: i32 = 60;

/// Optional container header fields and the condition gating each one.
///
/// | Field | Condition |
/// |-------|-----------|
/// | `complete_file_size` | format_version >= 2 |
/// | `data_header_size` | format_version >= 3 |
/// | `uncompressed_file_size`, `bundle_header_size` | header_size >= 60 |
///
/// The last gate depends on the declared header size only, not on the
/// format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleLayout {
    pub complete_file_size: bool,
    pub data_header_size: bool,
    pub extended_sizes: bool,
}

impl BundleLayout {
    /// Layout for a container with the given version and header size.
    pub const fn new(format_version: i32, header_size: i32) -> Self {
        Self {
            complete_file_size: format_version >= 2,
            data_header_size: format_version >= 3,
            extended_sizes: header_size >= EXTENDED_HEADER_SIZE,
        }
    }
}

/// Container header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleHeader {
    pub signature: String,
    pub format_version: i32,
    /// Engine version string.
    pub unity_version: String,
    /// Generator (build tool) version string.
    pub generator_version: String,
    pub file_size: u32,
    /// Offset of the asset list from the start of the container.
    pub header_size: i32,
    pub file_count: i32,
    pub bundle_count: i32,
    pub complete_file_size: Option<u32>,
    pub data_header_size: Option<u32>,
    pub uncompressed_file_size: Option<u32>,
    pub bundle_header_size: Option<u32>,
}

impl BundleHeader {
    fn parse<R: Read + Seek>(r: &mut ByteCursor<R>) -> Result<Self> {
        let signature = r.read_cstring()?;
        if signature != SIGNATURE_RAW {
            return Err(Error::UnsupportedFormat(Unsupported::Signature(signature)));
        }

        let format_version = r.read_i32()?;
        let unity_version = r.read_cstring()?;
        let generator_version = r.read_cstring()?;
        let file_size = r.read_u32()?;
        let header_size = r.read_i32()?;
        let file_count = r.read_i32()?;
        let bundle_count = r.read_i32()?;

        let layout = BundleLayout::new(format_version, header_size);
        let complete_file_size = layout.complete_file_size.then(|| r.read_u32()).transpose()?;
        let data_header_size = layout.data_header_size.then(|| r.read_u32()).transpose()?;
        let (uncompressed_file_size, bundle_header_size) = if layout.extended_sizes {
            (Some(r.read_u32()?), Some(r.read_u32()?))
        } else {
            (None, None)
        };

        Ok(Self {
            signature,
            format_version,
            unity_version,
            generator_version,
            file_size,
            header_size,
            file_count,
            bundle_count,
            complete_file_size,
            data_header_size,
            uncompressed_file_size,
            bundle_header_size,
        })
    }
}

/// Parsed bundle: header plus every contained serialized file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub header: BundleHeader,
    /// Serialized files in stream order.
    pub assets: Vec<SerializedFile>,
}

impl Bundle {
    /// Parse a bundle from `r`.
    ///
    /// `r` must be positioned at the start of the signature; all offsets in
    /// the container are relative to that position. Every asset is copied
    /// into its own buffer, so `r` is not needed afterwards.
    pub fn parse<R: Read + Seek>(r: &mut R, options: &DecodeOptions) -> Result<Self> {
        let mut r = ByteCursor::new(r, Endian::Big)?;
        let header = BundleHeader::parse(&mut r)?;
        debug!(
            "bundle {} v{} ({}), header size {}, {} files",
            header.signature,
            header.format_version,
            header.unity_version,
            header.header_size,
            header.file_count
        );

        let header_size = u64::try_from(header.header_size)
            .map_err(|_| Error::Parse("negative bundle header size"))?;
        r.seek(header_size)?;

        let num_assets = r.read_i32()?;
        if num_assets < 0 {
            return Err(Error::Parse("negative asset count"));
        }

        let mut assets = Vec::new();
        for _ in 0..num_assets {
            let offset = r.tell();
            let name = r.read_cstring()?;
            let asset_header_size = r.read_u32()?;
            let size = r.read_u32()?;

            r.seek(offset + u64::from(asset_header_size))?;
            let stream_offset = r.absolute();
            debug!("asset {name}: {size} bytes at {stream_offset:#x}");
            let data = r.read_bytes(size as usize)?;
            assets.push(SerializedFile::parse(
                name,
                asset_header_size,
                stream_offset,
                data,
                options,
            )?);
        }

        Ok(Self { header, assets })
    }

    /// Open and parse the bundle at `path`.
    ///
    /// The file is closed before this returns, whether decoding succeeded
    /// or not.
    pub fn open(path: impl AsRef<Path>, options: &DecodeOptions) -> Result<Self> {
        BundleReader::open(path, options).map(|reader| reader.bundle)
    }

    /// Iterate over the serialized files.
    pub fn assets(&self) -> impl Iterator<Item = &SerializedFile> {
        self.assets.iter()
    }

    /// Find a serialized file by name. Returns [`None`] if not found.
    pub fn asset_by_name(&self, name: &str) -> Option<&SerializedFile> {
        self.assets.iter().find(|a| a.name == name)
    }
}

/// Parsed bundle that keeps the underlying reader open.
///
/// Decoded assets never need the reader; it is kept for callers that want
/// to stream raw asset bytes back out of the container.
pub struct BundleReader<R> {
    inner: R,
    /// Parsed metadata and assets.
    pub bundle: Bundle,
}

impl BundleReader<BufReader<File>> {
    /// Open the bundle at `path` and parse it.
    pub fn open(path: impl AsRef<Path>, options: &DecodeOptions) -> Result<Self> {
        Self::new(BufReader::new(File::open(path)?), options)
    }
}

impl<R: Read + Seek> BundleReader<R> {
    /// Parse a bundle and wrap the provided reader.
    pub fn new(mut reader: R, options: &DecodeOptions) -> Result<Self> {
        let bundle = Bundle::parse(&mut reader, options)?;
        Ok(Self {
            inner: reader,
            bundle,
        })
    }

    /// Stream one asset's raw bytes from the container.
    ///
    /// Seeks to the asset's start and returns a [`Take`] limited to its
    /// size. The borrow ends when the [`Take`] is dropped.
    pub fn read_asset(&mut self, asset: &SerializedFile) -> Result<Take<&mut R>> {
        self.inner.seek(SeekFrom::Start(asset.stream_offset))?;
        Ok(self.inner.by_ref().take(u64::from(asset.size)))
    }

    /// Iterate over the serialized files.
    pub fn assets(&self) -> impl Iterator<Item = &SerializedFile> {
        self.bundle.assets()
    }

    /// Find a serialized file by name. Returns [`None`] if not found.
    pub fn asset_by_name(&self, name: &str) -> Option<&SerializedFile> {
        self.bundle.asset_by_name(name)
    }

    /// Consume the reader, returning the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> Index<&str> for BundleReader<R> {
    type Output = SerializedFile;

    /// Index by asset name.
    ///
    /// # Panics
    /// Panics if no asset has that name.
    fn index(&self, index: &str) -> &Self::Output {
        self.asset_by_name(index)
            .unwrap_or_else(|| panic!("no asset '{index}' in bundle"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_decision_table() {
        let cases = [
            (1, 44, false, false, false),
            (1, 60, false, false, true),
            (2, 59, true, false, false),
            (2, 60, true, false, true),
            (3, 59, true, true, false),
            (3, 64, true, true, true),
        ];
        for (version, header_size, complete, data_header, extended) in cases {
            assert_eq!(
                BundleLayout::new(version, header_size),
                BundleLayout {
                    complete_file_size: complete,
                    data_header_size: data_header,
                    extended_sizes: extended,
                },
                "version {version}, header size {header_size}"
            );
        }
    }
}

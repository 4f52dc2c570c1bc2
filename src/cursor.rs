//! Endian-aware sequential reader shared by all decoders.
//!
//! [`ByteCursor`] wraps any [`Read`] + [`Seek`] source and treats the
//! source's position at construction time as the start of its range. All
//! positions it reports or accepts (`tell`, `seek`, `align`) are relative to
//! that start, which is what the serialized-file alignment rules are defined
//! against.
//!
//! Each read consumes exactly the bytes it promises or returns an error -
//! there is no partial-read ambiguity.

use std::io::{self, Read, Seek, SeekFrom};

use crate::{Error, Result};

/// Byte order used for multi-byte reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Endian {
    /// Most significant byte first. All container and serialized-file
    /// headers use this order.
    #[default]
    Big,
    /// Least significant byte first.
    Little,
}

/// Sequential reader over a byte range with a switchable byte order.
#[derive(Debug)]
pub struct ByteCursor<R> {
    inner: R,
    /// Absolute stream position of the start of the range.
    start: u64,
    /// Position relative to `start`.
    pos: u64,
    endian: Endian,
}

/// Cursor over an in-memory slice, used for serialized-file buffers.
pub type SliceCursor<'a> = ByteCursor<io::Cursor<&'a [u8]>>;

impl<'a> SliceCursor<'a> {
    /// Create a cursor over the whole of `data`.
    pub fn from_slice(data: &'a [u8], endian: Endian) -> Self {
        Self {
            inner: io::Cursor::new(data),
            start: 0,
            pos: 0,
            endian,
        }
    }
}

macro_rules! endian_read {
    ($(#[$doc:meta] $name:ident -> $ty:ty;)*) => {
        $(
            #[$doc]
            #[inline]
            pub fn $name(&mut self) -> Result<$ty> {
                let b = self.read_array()?;
                Ok(match self.endian {
                    Endian::Big => <$ty>::from_be_bytes(b),
                    Endian::Little => <$ty>::from_le_bytes(b),
                })
            }
        )*
    };
}

impl<R: Read + Seek> ByteCursor<R> {
    /// Wrap `inner`, treating its current position as the start of the range.
    pub fn new(mut inner: R, endian: Endian) -> Result<Self> {
        let start = inner.stream_position()?;
        Ok(Self {
            inner,
            start,
            pos: 0,
            endian,
        })
    }

    /// Current byte order.
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Change the byte order for all subsequent reads.
    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    /// Position relative to the start of the range.
    pub fn tell(&self) -> u64 {
        self.pos
    }

    /// Absolute position within the underlying stream.
    pub fn absolute(&self) -> u64 {
        self.start + self.pos
    }

    /// Seek to `pos`, relative to the start of the range.
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(self.start + pos))?;
        self.pos = pos;
        Ok(())
    }

    /// Advance to the next multiple of `alignment` (relative to the start of
    /// the range) without reading anything.
    pub fn align(&mut self, alignment: u64) -> Result<()> {
        let rem = self.pos % alignment;
        if rem != 0 {
            self.seek(self.pos + (alignment - rem))?;
        }
        Ok(())
    }

    /// Read exactly `N` bytes into a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut b = [0u8; N];
        let offset = self.pos;
        self.inner.read_exact(&mut b).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => Error::TruncatedRead { offset, need: N },
            _ => Error::Io(e),
        })?;
        self.pos += N as u64;
        Ok(b)
    }

    /// Read exactly `len` bytes into a `Vec`.
    ///
    /// Never allocates more than the source can actually provide, so a bogus
    /// length field fails with [`Error::TruncatedRead`] instead of exhausting
    /// memory.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let offset = self.pos;
        let mut b = Vec::new();
        let got = self.inner.by_ref().take(len as u64).read_to_end(&mut b)?;
        self.pos += got as u64;
        if got < len {
            return Err(Error::TruncatedRead { offset, need: len });
        }
        Ok(b)
    }

    /// Read one byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read one signed byte.
    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    endian_read! {
        /// Read a `u16` in the current byte order.
        read_u16 -> u16;
        /// Read an `i16` in the current byte order.
        read_i16 -> i16;
        /// Read a `u32` in the current byte order.
        read_u32 -> u32;
        /// Read an `i32` in the current byte order.
        read_i32 -> i32;
        /// Read a `u64` in the current byte order.
        read_u64 -> u64;
        /// Read an `i64` in the current byte order.
        read_i64 -> i64;
    }

    /// Read a nul-terminated UTF-8 string.
    ///
    /// Returns [`Error::UnterminatedString`] if the range ends before a nul
    /// byte is found.
    pub fn read_cstring(&mut self) -> Result<String> {
        let offset = self.pos;
        let mut bytes = Vec::new();
        loop {
            match self.read_u8() {
                Ok(0) => break,
                Ok(b) => bytes.push(b),
                Err(Error::TruncatedRead { .. }) => {
                    return Err(Error::UnterminatedString { offset });
                }
                Err(e) => return Err(e),
            }
        }
        String::from_utf8(bytes).map_err(|source| Error::InvalidString { offset, source })
    }

    /// Consume the cursor, returning the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

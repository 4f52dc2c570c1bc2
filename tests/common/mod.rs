#![allow(dead_code)]

//! Fixture builders for hand-assembled bundles and serialized files.

/// Byte buffer writer with a switchable byte order.
pub struct Writer {
    buf: Vec<u8>,
    little: bool,
}

impl Writer {
    pub fn big() -> Self {
        Self {
            buf: Vec::new(),
            little: false,
        }
    }

    pub fn set_little(&mut self, little: bool) {
        self.little = little;
    }

    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn bytes(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
    }

    pub fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn i16(&mut self, v: i16) {
        let b = if self.little { v.to_le_bytes() } else { v.to_be_bytes() };
        self.bytes(&b);
    }

    pub fn u32(&mut self, v: u32) {
        let b = if self.little { v.to_le_bytes() } else { v.to_be_bytes() };
        self.bytes(&b);
    }

    pub fn i32(&mut self, v: i32) {
        let b = if self.little { v.to_le_bytes() } else { v.to_be_bytes() };
        self.bytes(&b);
    }

    pub fn i64(&mut self, v: i64) {
        let b = if self.little { v.to_le_bytes() } else { v.to_be_bytes() };
        self.bytes(&b);
    }

    pub fn cstring(&mut self, s: &str) {
        self.bytes(s.as_bytes());
        self.u8(0);
    }

    /// Zero-pad to a multiple of 4 from the start of the buffer.
    pub fn align4(&mut self) {
        while self.buf.len() % 4 != 0 {
            self.buf.push(0);
        }
    }

    pub fn pad_to(&mut self, len: usize) {
        assert!(self.buf.len() <= len, "fixture overran {len} bytes");
        self.buf.resize(len, 0);
    }

    /// Overwrite a big-endian u32 at `pos`.
    pub fn patch_be_u32(&mut self, pos: usize, v: u32) {
        self.buf[pos..pos + 4].copy_from_slice(&v.to_be_bytes());
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[derive(Debug, Clone)]
pub struct ObjectFixture {
    pub path_id: i64,
    pub data_offset: u32,
    pub size: u32,
    pub type_id: u32,
    pub class_id: i16,
    pub marker: i16,
}

impl ObjectFixture {
    pub fn new(path_id: i64, type_id: u32, data_offset: u32, size: u32) -> Self {
        Self {
            path_id,
            data_offset,
            size,
            type_id,
            class_id: type_id as i16,
            marker: 0,
        }
    }
}

/// Description of a serialized file to assemble.
#[derive(Debug, Clone)]
pub struct SerializedFixture {
    pub format: u32,
    pub little_endian: bool,
    pub generator_version: String,
    pub platform: u32,
    pub type_ids: Vec<i32>,
    pub type_trees: bool,
    pub objects: Vec<ObjectFixture>,
    pub adds: Vec<(i64, i32)>,
    pub num_refs: u32,
    pub ref_bytes: Vec<u8>,
    pub terminator: String,
    pub data: Vec<u8>,
}

impl SerializedFixture {
    /// One big-endian file with a single TextAsset object over `data`.
    pub fn text_asset(format: u32, data: &[u8]) -> Self {
        Self {
            format,
            little_endian: false,
            generator_version: "5.6.7f1".into(),
            platform: 5,
            type_ids: vec![49],
            type_trees: false,
            objects: vec![ObjectFixture::new(1, 49, 0, data.len() as u32)],
            adds: Vec::new(),
            num_refs: 0,
            ref_bytes: Vec::new(),
            terminator: String::new(),
            data: data.to_vec(),
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let wide_ids = self.format >= 14;
        let mut w = Writer::big();
        w.u32(0); // file size, patched below
        w.u32(self.format);
        w.u32(0); // data offset, patched below
        w.u32(if self.little_endian { 0 } else { 1 });
        w.set_little(self.little_endian);

        w.cstring(&self.generator_version);
        w.u32(self.platform);
        w.u8(self.type_trees as u8);
        w.i32(self.type_ids.len() as i32);
        for &id in &self.type_ids {
            w.i32(id);
            let len = if id < 0 { 32 } else { 16 };
            w.bytes(&vec![id as u8; len]);
            if self.type_trees {
                w.u32(2);
                w.u32(4);
                w.bytes(&[0x11; 48]);
                w.bytes(b"ab\0\0");
            }
        }

        w.u32(self.objects.len() as u32);
        for o in &self.objects {
            if wide_ids {
                w.align4();
                w.i64(o.path_id);
            } else {
                w.i32(o.path_id as i32);
            }
            w.u32(o.data_offset);
            w.u32(o.size);
            w.u32(o.type_id);
            w.i16(o.class_id);
            w.i16(o.marker);
            if self.format >= 15 {
                w.u8(0x7F);
            }
        }

        if self.format >= 11 {
            w.u32(self.adds.len() as u32);
            for &(id, value) in &self.adds {
                if wide_ids {
                    w.align4();
                    w.i64(id);
                } else {
                    w.i32(id as i32);
                }
                w.i32(value);
            }
        }

        w.u32(self.num_refs);
        w.bytes(&self.ref_bytes);
        w.cstring(&self.terminator);

        let data_offset = w.position();
        w.bytes(&self.data);
        let file_size = w.position();
        w.patch_be_u32(0, file_size as u32);
        w.patch_be_u32(8, data_offset as u32);
        w.into_bytes()
    }
}

pub const UNITY_VERSION: &str = "3.x.x";
pub const GENERATOR_VERSION: &str = "2018.4.0";

/// Assemble a bundle. The asset list starts at `header_size`.
pub fn bundle_bytes(
    signature: &str,
    format_version: i32,
    header_size: i32,
    assets: &[(&str, Vec<u8>)],
) -> Vec<u8> {
    let mut w = Writer::big();
    w.cstring(signature);
    w.i32(format_version);
    w.cstring(UNITY_VERSION);
    w.cstring(GENERATOR_VERSION);
    let file_size_pos = w.position();
    w.u32(0);
    w.i32(header_size);
    w.i32(assets.len() as i32);
    w.i32(1);
    if format_version >= 2 {
        w.u32(0xC0);
    }
    if format_version >= 3 {
        w.u32(0xD0);
    }
    if header_size >= 60 {
        w.u32(0xE0);
        w.u32(0xF0);
    }
    w.pad_to(header_size as usize);

    w.i32(assets.len() as i32);
    for (name, data) in assets {
        let entry_start = w.position();
        w.cstring(name);
        let entry_len = name.len() + 1 + 8;
        let asset_header_size = entry_len.next_multiple_of(4);
        w.u32(asset_header_size as u32);
        w.u32(data.len() as u32);
        w.pad_to(entry_start + asset_header_size);
        w.bytes(data);
    }

    let total = w.position() as u32;
    w.patch_be_u32(file_size_pos, total);
    w.into_bytes()
}

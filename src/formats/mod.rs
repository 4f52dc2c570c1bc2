//! Decoders for the bundle container and its serialized files.
//!
//! All decoders follow the same conventions:
//!
//! * **Strict stream order** - each section's layout depends on version
//!   numbers and the byte order read before it, so sections are decoded
//!   one after another and never out of order.
//! * **Owned buffers** - the container decoder copies each serialized file
//!   into its own buffer; object bytes are then borrowed from that buffer
//!   via [`serialized::ObjectRef::bytes`].
//! * **No partial results** - any error aborts the current file and the
//!   bundle containing it.
//!
//! ## Format overview
//!
//! | Module         | Section | Description |
//! |----------------|---------|-------------|
//! | [`bundle`]     | Container | Signature, version-gated header, asset list |
//! | [`serialized`] | Asset header | Format, data offset, byte-order flag |
//! | [`types`]      | Type metadata | Target platform, class hashes, type-tree blobs |
//! | [`objects`]    | Object table | Object records, added objects, external references |

pub mod bundle;
pub mod objects;
pub mod serialized;
pub mod types;

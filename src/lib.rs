//! **unibundle** - a byte-exact decoder for raw game-engine asset bundles.
//!
//! A bundle is a container holding one or more serialized files. Each
//! serialized file carries a type-metadata table and an object directory
//! pointing into its raw data region. Field presence and width depend on
//! the container version, the serialized-file format, the declared header
//! size and a byte-order flag, all of which are modelled as explicit
//! layout tables.
//!
//! # Modules
//! | Module | Contents |
//! |--------|----------|
//! | [`formats::bundle`]     | Container header and asset list |
//! | [`formats::serialized`] | Serialized file header and object access |
//! | [`formats::types`]      | Type hashes and opaque type trees |
//! | [`formats::objects`]    | Object directory, added objects, external references |
//! | [`cursor`]              | Endian-aware sequential reader |
//! | [`classes`]             | Class kinds and the default type table |
//! | [`platform`]            | Build-target platform codes |
//! | [`options`]             | Decode configuration |
//!
//! # Example
//! ```no_run
//! use unibundle::{Bundle, ClassKind, DecodeOptions};
//!
//! let bundle = Bundle::open("level0.unity3d", &DecodeOptions::default())?;
//! for asset in bundle.assets() {
//!     for text in asset.objects_of_kind(ClassKind::TextAsset) {
//!         println!("{}: {} bytes", text.path_id, text.bytes().len());
//!     }
//! }
//! # Ok::<(), unibundle::Error>(())
//! ```

pub mod classes;
pub mod cursor;
pub mod error;
pub mod formats;
pub mod options;
pub mod platform;

pub use classes::{ClassKind, Resolution, TypeTable};
pub use error::{Error, Result};
pub use formats::bundle::{Bundle, BundleReader};
pub use formats::serialized::SerializedFile;
pub use options::DecodeOptions;

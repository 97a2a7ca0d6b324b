//! Sounddiver library files
//!
//! Sounddiver stores sound libraries for hardware synthesizers in an
//! IFF-like container. The byte order of the whole file follows from its
//! first four bytes.
//!
//! ```text
//! "FORM" | "MROF", length u32
//! └── "SSLB"
//!     ├── tag, length u32, payload
//!     ├── "LENT", length u32, entry      (one per library entry)
//!     └── ...
//! ```
//!
//! In little-endian (`MROF`) files every tag is stored with its bytes
//! reversed and every length field is little-endian.

mod builder;
mod datetime;
mod entry;
mod error;
mod loader;
mod varlen;

pub use builder::SounddiverLibraryBuilder;
pub use datetime::PackedDateTime;
pub use entry::{FieldType, LENT_HEADER_SIZE, ListEntry};
pub use error::{SounddiverError, SounddiverResult};
pub use loader::SounddiverLibrary;
pub use varlen::{read_var_len, var_len_size, write_var_len};

pub use binrw::Endian;

use tagchunk_stream::FourCC;

/// Big-endian container magic
pub const FORM_MAGIC: FourCC = FourCC(*b"FORM");
/// Little-endian container magic (`FORM` reversed)
pub const MROF_MAGIC: FourCC = FourCC(*b"MROF");
/// Library chunk tag
pub const SSLB_TAG: FourCC = FourCC(*b"SSLB");
/// Entry chunk tag
pub const LENT_TAG: FourCC = FourCC(*b"LENT");

//! Preset and sound library formats built on `tagchunk-stream`
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::uninlined_format_args)] // Backwards compatibility
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::needless_pass_by_value)] // Builder inputs
#![allow(clippy::return_self_not_must_use)] // Builder patterns
#![allow(clippy::struct_field_names)] // Field names follow the file layouts
//! This crate provides symmetric (parser and builder) implementations for
//! two container formats found in synthesizer preset tooling.
//!
//! # Supported Formats
//!
//! - **VST presets**: VST2 fxb banks and fxp programs, VST3 `.vstpreset`
//!   files including VST2 state embedded in them
//! - **Sounddiver libraries**: `FORM`/`MROF` sound library files with one
//!   `LENT` record per stored sound
//!
//! # Error Handling
//!
//! The `parse`/`load` entry points are best effort: anything unreadable
//! yields an empty result and a `tracing` event. The `read`/`try_load`
//! twins return the typed error instead.

#![warn(missing_docs)]

/// Parser limits shared by both formats
pub mod config;

/// Sounddiver sound library loading and building
pub mod sounddiver;

/// VST2/VST3 preset chunk lists
pub mod vstpreset;

pub use config::ParserConfig;

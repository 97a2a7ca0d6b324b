//! Command-line inspector for preset and Sounddiver library files
//!
//! The binary is a thin wrapper: argument parsing lives in [`Cli`], and
//! every subcommand renders its report into a `String` through
//! [`commands::run`], so reports can be tested without a terminal.

#![warn(missing_docs)]

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tagchunk_formats::ParserConfig;

pub use commands::run;

/// Inspector arguments
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tagchunk-inspect",
    about = "Show the chunks of VST presets and the entries of Sounddiver libraries",
    version
)]
pub struct Cli {
    /// Maximum nesting depth of fxb/fxp records
    #[arg(long, global = true, env = "TAGCHUNK_MAX_DEPTH")]
    pub max_depth: Option<u32>,

    /// Maximum number of chunks in a table or library
    #[arg(long, global = true, env = "TAGCHUNK_MAX_CHUNKS")]
    pub max_chunks: Option<usize>,

    /// Maximum number of payload bytes copied out of a VST3 preset
    #[arg(long, global = true, env = "TAGCHUNK_MAX_OUTPUT_BYTES")]
    pub max_output_bytes: Option<u64>,

    /// Output format
    #[arg(short = 'o', long, value_enum, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Parser limits from the command line, defaults where not given
    pub fn parser_config(&self) -> ParserConfig {
        let mut config = ParserConfig::default();
        if let Some(depth) = self.max_depth {
            config = config.with_max_nesting_depth(depth);
        }
        if let Some(chunks) = self.max_chunks {
            config = config.with_max_chunks(chunks);
        }
        if let Some(bytes) = self.max_output_bytes {
            config = config.with_max_output_bytes(bytes);
        }
        config
    }
}

/// Inspector subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// List the state chunks of a VST2 fxb/fxp or VST3 preset
    Preset {
        /// Preset file
        file: PathBuf,

        /// Hex-dump chunk data
        #[arg(long)]
        show_data: bool,
    },

    /// List the entries of a Sounddiver library
    Sounddiver {
        /// Library file
        file: PathBuf,

        /// Hex-dump entry data
        #[arg(long)]
        show_data: bool,
    },

    /// Report which format a file looks like
    Detect {
        /// File to check
        file: PathBuf,
    },
}

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

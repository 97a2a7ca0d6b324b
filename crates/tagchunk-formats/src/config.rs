//! Parser limits
//!
//! Both format parsers accept a [`ParserConfig`] that bounds how deep nested
//! records may go and how many chunks a single file may declare. The plain
//! entry points use [`ParserConfig::default`].

use serde::{Deserialize, Serialize};

/// Limits applied while parsing untrusted files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Maximum nesting of fxb/fxp records (a VST3 file wrapping a bank of
    /// programs is three levels deep)
    pub max_nesting_depth: u32,
    /// Maximum number of entries in a VST3 chunk table, and of chunks per
    /// Sounddiver container level
    pub max_chunks: usize,
    /// Maximum number of payload bytes copied out of one VST3 file; table
    /// entries may point at the same payload, so this is not bounded by the
    /// file size
    pub max_output_bytes: u64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: 8,
            max_chunks: 65_536,
            max_output_bytes: 256 * 1024 * 1024,
        }
    }
}

impl ParserConfig {
    /// Create a configuration with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum record nesting depth
    pub fn with_max_nesting_depth(mut self, depth: u32) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Set the maximum chunk count
    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    /// Set the maximum number of payload bytes copied out of a VST3 file
    pub fn with_max_output_bytes(mut self, max_output_bytes: u64) -> Self {
        self.max_output_bytes = max_output_bytes;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_nesting_depth == 0 {
            return Err("max_nesting_depth must be greater than 0".to_string());
        }

        if self.max_chunks == 0 {
            return Err("max_chunks must be greater than 0".to_string());
        }

        if self.max_output_bytes == 0 {
            return Err("max_output_bytes must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ParserConfig::new();
        assert_eq!(config.max_nesting_depth, 8);
        assert_eq!(config.max_chunks, 65_536);
        assert_eq!(config.max_output_bytes, 256 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_limits_rejected() {
        assert!(
            ParserConfig::new()
                .with_max_nesting_depth(0)
                .validate()
                .is_err()
        );
        assert!(ParserConfig::new().with_max_chunks(0).validate().is_err());
        assert!(
            ParserConfig::new()
                .with_max_output_bytes(0)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_serde_fills_missing_fields() {
        let config: ParserConfig = serde_json::from_str(r#"{"max_chunks": 16}"#).unwrap();
        assert_eq!(config, ParserConfig::new().with_max_chunks(16));

        let json = serde_json::to_string(&config).unwrap();
        let back: ParserConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}

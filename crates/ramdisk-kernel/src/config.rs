//! Ramdisk configuration.
//!
//! Loaded from a RON file. Every field is optional; the defaults are the
//! capacities the filesystem advertises (100 slots, 4 KiB files, 255-byte
//! names).
//!
//! ```ron
//! (
//!     max_entries: 100,
//!     max_file_size: 4096,
//!     max_name_len: 255,
//!     root_mode: 0o755,
//! )
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::vfs::table::{MAX_ENTRIES, MAX_FILE_SIZE, MAX_NAME_LEN};

/// Capacities and root permissions for a [`RamdiskBackend`](crate::RamdiskBackend).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RamdiskConfig {
    /// Slots in the namespace table, root included.
    pub max_entries: usize,
    /// Content capacity of each regular file, in bytes.
    pub max_file_size: usize,
    /// Longest accepted entry name, in bytes.
    pub max_name_len: usize,
    /// Permission bits of the root directory.
    pub root_mode: u32,
}

impl Default for RamdiskConfig {
    fn default() -> Self {
        Self {
            max_entries: MAX_ENTRIES,
            max_file_size: MAX_FILE_SIZE,
            max_name_len: MAX_NAME_LEN,
            root_mode: 0o755,
        }
    }
}

impl RamdiskConfig {
    /// Parse and validate a RON document.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: RamdiskConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_ron(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entries < 2 {
            return Err(ConfigError::Invalid(format!(
                "max_entries must be at least 2, got {}",
                self.max_entries
            )));
        }
        if self.max_file_size == 0 {
            return Err(ConfigError::Invalid("max_file_size must be positive".into()));
        }
        if self.max_name_len == 0 || self.max_name_len > MAX_NAME_LEN {
            return Err(ConfigError::Invalid(format!(
                "max_name_len must be in 1..={MAX_NAME_LEN}, got {}",
                self.max_name_len
            )));
        }
        if self.root_mode & !0o7777 != 0 {
            return Err(ConfigError::Invalid(format!(
                "root_mode has non-permission bits: {:o}",
                self.root_mode
            )));
        }
        Ok(())
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_contract() {
        let config = RamdiskConfig::default();
        assert_eq!(config.max_entries, 100);
        assert_eq!(config.max_file_size, 4096);
        assert_eq!(config.max_name_len, 255);
        assert_eq!(config.root_mode, 0o755);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = RamdiskConfig::from_ron("(max_entries: 8)").unwrap();
        assert_eq!(config.max_entries, 8);
        assert_eq!(config.max_file_size, 4096);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            RamdiskConfig::from_ron("(max_entries: 1)"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RamdiskConfig::from_ron("(max_name_len: 300)"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RamdiskConfig::from_ron("(root_mode: 0o40755)"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            RamdiskConfig::from_ron("(max_entries: \"lots\")"),
            Err(ConfigError::Ron(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "(max_file_size: 512, root_mode: 0o700)").unwrap();

        let config = RamdiskConfig::load(file.path()).unwrap();
        assert_eq!(config.max_file_size, 512);
        assert_eq!(config.root_mode, 0o700);
        assert_eq!(config.max_entries, 100);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RamdiskConfig::load(dir.path().join("absent.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

use std::path::Path;

use serde::{Deserialize, Serialize};
use xam_common::{Result, error::Error};
use xam_memory::heap::HEAP_ALIGNMENT;

/// Kernel configuration.
///
/// Every field has a default, so an empty JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KernelConfig {
    /// First guest address. Must be non-zero: guest address 0 means "not supplied".
    pub guest_base: u32,
    /// Size of the guest address space, in bytes.
    pub memory_size: u32,
    /// Bytes at the start of guest memory managed by the system heap.
    pub system_heap_size: u32,
}

impl Default for KernelConfig {
    fn default() -> Self {
        KernelConfig {
            guest_base: 0x4000_0000,
            memory_size: 16 * 1024 * 1024,
            system_heap_size: 4 * 1024 * 1024,
        }
    }
}

impl KernelConfig {
    pub fn from_json_str(json: &str) -> Result<KernelConfig> {
        let config: KernelConfig =
            serde_json::from_str(json).map_err(|e| Error::parse("kernel config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<KernelConfig> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::io(path.display().to_string(), e))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.guest_base == 0 {
            return Err(Error::config("guest_base must be non-zero"));
        }
        if self.guest_base % HEAP_ALIGNMENT != 0 {
            return Err(Error::config(format!(
                "guest_base {:#X} must be {HEAP_ALIGNMENT}-byte aligned",
                self.guest_base
            )));
        }
        if self.memory_size == 0 {
            return Err(Error::config("memory_size must be non-zero"));
        }
        if self.guest_base as u64 + self.memory_size as u64 > u32::MAX as u64 + 1 {
            return Err(Error::config(format!(
                "guest memory [{:#X}, +{:#X}) exceeds the 32-bit address space",
                self.guest_base, self.memory_size
            )));
        }
        if self.system_heap_size < HEAP_ALIGNMENT {
            return Err(Error::config(format!(
                "system_heap_size {:#X} is below the minimum of {HEAP_ALIGNMENT:#X}",
                self.system_heap_size
            )));
        }
        if self.system_heap_size > self.memory_size {
            return Err(Error::config(format!(
                "system_heap_size {:#X} exceeds memory_size {:#X}",
                self.system_heap_size, self.memory_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use xam_common::error::ErrorKind;

    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let config = KernelConfig::from_json_str("{}").unwrap();
        assert_eq!(config, KernelConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config =
            KernelConfig::from_json_str(r#"{ "memory_size": 65536, "system_heap_size": 4096 }"#)
                .unwrap();
        assert_eq!(config.memory_size, 65536);
        assert_eq!(config.system_heap_size, 4096);
        assert_eq!(config.guest_base, 0x4000_0000);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = KernelConfig::from_json_str(r#"{ "memory": 1 }"#).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Parse { .. }));
    }

    #[test]
    fn test_invalid_layouts() {
        for json in [
            r#"{ "guest_base": 0 }"#,
            r#"{ "memory_size": 0 }"#,
            r#"{ "guest_base": 4294901760, "memory_size": 131072 }"#,
            r#"{ "memory_size": 4096, "system_heap_size": 8192 }"#,
            r#"{ "system_heap_size": 0 }"#,
            r#"{ "system_heap_size": 4 }"#,
            r#"{ "guest_base": 1073741825 }"#,
        ] {
            let err = KernelConfig::from_json_str(json).unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::Config { .. }), "{json}");
        }
    }

    #[test]
    fn test_valid_config_builds_kernel_state() {
        let config = KernelConfig::from_json_str(
            r#"{ "guest_base": 1073741832, "memory_size": 65536, "system_heap_size": 8 }"#,
        )
        .unwrap();
        assert!(crate::KernelState::new(config).is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "system_heap_size": 8192 }}"#).unwrap();
        let config = KernelConfig::load(file.path()).unwrap();
        assert_eq!(config.system_heap_size, 8192);

        let err = KernelConfig::load(file.path().with_extension("missing")).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Io { .. }));
    }
}

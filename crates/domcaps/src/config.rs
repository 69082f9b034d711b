use domcaps_core::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_NVRAM: [&str; 2] = [
    "/usr/share/OVMF/OVMF_CODE.fd:/usr/share/OVMF/OVMF_VARS.fd",
    "/usr/share/AAVMF/AAVMF_CODE.fd:/usr/share/AAVMF/AAVMF_VARS.fd",
];

/// A UEFI firmware image and the template for its variable store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Firmware {
    pub code: String,
    pub vars: String,
}

/// Driver settings that influence probed capabilities.
///
/// Read from TOML:
///
/// ```toml
/// nvram = ["/usr/share/OVMF/OVMF_CODE.fd:/usr/share/OVMF/OVMF_VARS.fd"]
/// capabilities_dir = "/var/cache/domcaps"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    /// Firmware images as `CODE:VARS` pairs.
    pub nvram: Vec<String>,
    /// Where QEMU capability documents are looked up.
    pub capabilities_dir: Option<PathBuf>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            nvram: DEFAULT_NVRAM.iter().map(|s| s.to_string()).collect(),
            capabilities_dir: None,
        }
    }
}

impl DriverConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.firmware()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn firmware(&self) -> Result<Vec<Firmware>> {
        self.nvram
            .iter()
            .map(|entry| match entry.split_once(':') {
                Some((code, vars)) if !code.is_empty() && !vars.is_empty() => Ok(Firmware {
                    code: code.to_string(),
                    vars: vars.to_string(),
                }),
                _ => Err(Error::InvalidConfig(format!(
                    "nvram entry '{entry}' must be CODE:VARS"
                ))),
            })
            .collect()
    }

    /// Firmware code images, in configured order.
    pub fn loaders(&self) -> Result<Vec<String>> {
        Ok(self.firmware()?.into_iter().map(|fw| fw.code).collect())
    }
}

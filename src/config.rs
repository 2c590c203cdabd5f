use serde::Deserialize;
use std::path::Path;
use tracing::info;

const DEFAULT_CONFIG_PATH: &str = "/usr/local/etc/nomad-install.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    pub general: GeneralConfig,
    pub backend: BackendConfig,
    pub defaults: DefaultsConfig,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            backend: BackendConfig::default(),
            defaults: DefaultsConfig::default(),
        }
    }
}

impl InstallerConfig {
    pub fn load() -> Result<Self, crate::error::InstallError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, crate::error::InstallError> {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: InstallerConfig = toml::from_str(&content)?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub title: String,
    /// Dry run mode - the destructive backend is replaced by a harmless
    /// stub, device/account enumeration returns mock data, and Finish
    /// exits instead of rebooting
    pub dryrun: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            title: "NomadBSD Installation Wizard".to_string(),
            dryrun: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Path to the privileged installation backend
    pub program: String,
    /// Extra arguments placed before the per-field arguments
    pub args: Vec<String>,
    /// Seconds to wait after SIGTERM before the backend is killed
    pub grace_period_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            program: "/usr/libexec/nomadbsd-install".to_string(),
            args: Vec::new(),
            grace_period_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// "ufs" or "zfs"
    pub filesystem: String,
    pub swap_mib: u64,
    pub auto_login: bool,
    pub lenovo_fix: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            filesystem: "ufs".to_string(),
            swap_mib: 0,
            auto_login: false,
            lenovo_fix: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = InstallerConfig::load_from("/nonexistent/nomad-install.toml").unwrap();
        assert_eq!(config.general.title, "NomadBSD Installation Wizard");
        assert_eq!(config.defaults.filesystem, "ufs");
        assert_eq!(config.backend.grace_period_secs, 10);
    }

    #[test]
    fn partial_file_keeps_section_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[backend]\nprogram = \"/tmp/fake-backend\"\n\n[defaults]\nswap_mib = 2048\n"
        )
        .unwrap();

        let config = InstallerConfig::load_from(file.path()).unwrap();
        assert_eq!(config.backend.program, "/tmp/fake-backend");
        assert_eq!(config.defaults.swap_mib, 2048);
        assert!(!config.general.dryrun);
        assert_eq!(config.defaults.filesystem, "ufs");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[backend\nprogram =").unwrap();
        assert!(InstallerConfig::load_from(file.path()).is_err());
    }
}

use super::validation::{self, Field, FieldError, ValidationContext};
use crate::config::DefaultsConfig;

/// Target filesystem for the installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FsType {
    #[default]
    Ufs,
    Zfs,
}

impl FsType {
    /// Token passed to the backend process.
    pub fn token(&self) -> &'static str {
        match self {
            FsType::Ufs => "ufs",
            FsType::Zfs => "zfs",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FsType::Ufs => "UFS",
            FsType::Zfs => "ZFS",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "ufs" => Some(FsType::Ufs),
            "zfs" => Some(FsType::Zfs),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            FsType::Ufs => FsType::Zfs,
            FsType::Zfs => FsType::Ufs,
        }
    }
}

/// Immutable copy of the configuration, frozen at commit time. This is the
/// only thing the backend ever observes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationConfig {
    pub target_disk: String,
    pub filesystem: FsType,
    pub swap_mib: u64,
    pub username: String,
    pub auto_login: bool,
    pub lenovo_fix: bool,
}

/// The single writer of the installation configuration. Every setter is
/// total and synchronously refreshes the per-field validity cache.
#[derive(Debug, Clone)]
pub struct ConfigModel {
    target_disk: String,
    filesystem: FsType,
    swap_raw: String,
    swap_mib: u64,
    username: String,
    auto_login: bool,
    lenovo_fix: bool,

    ctx: ValidationContext,
    disk_validity: Result<(), FieldError>,
    swap_validity: Result<(), FieldError>,
    username_validity: Result<(), FieldError>,
}

impl ConfigModel {
    pub fn new(ctx: ValidationContext, defaults: &DefaultsConfig) -> Self {
        let filesystem = FsType::from_token(&defaults.filesystem).unwrap_or_default();
        let mut model = Self {
            target_disk: String::new(),
            filesystem,
            swap_raw: defaults.swap_mib.to_string(),
            swap_mib: defaults.swap_mib,
            username: String::new(),
            auto_login: defaults.auto_login,
            lenovo_fix: defaults.lenovo_fix,
            ctx,
            disk_validity: Ok(()),
            swap_validity: Ok(()),
            username_validity: Ok(()),
        };
        model.revalidate();
        model
    }

    pub fn target_disk(&self) -> &str {
        &self.target_disk
    }

    pub fn filesystem(&self) -> FsType {
        self.filesystem
    }

    pub fn swap_raw(&self) -> &str {
        &self.swap_raw
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn auto_login(&self) -> bool {
        self.auto_login
    }

    pub fn lenovo_fix(&self) -> bool {
        self.lenovo_fix
    }

    pub fn set_target_disk(&mut self, device: &str) {
        self.target_disk = device.to_string();
        self.disk_validity = validation::validate_target_disk(&self.target_disk, &self.ctx);
    }

    pub fn set_filesystem(&mut self, fs: FsType) {
        self.filesystem = fs;
    }

    pub fn set_swap_raw(&mut self, raw: &str) {
        self.swap_raw = raw.to_string();
        match validation::validate_swap(&self.swap_raw) {
            Ok(mib) => {
                self.swap_mib = mib;
                self.swap_validity = Ok(());
            }
            Err(e) => {
                self.swap_validity = Err(e);
            }
        }
    }

    pub fn set_username(&mut self, username: &str) {
        self.username = username.to_string();
        self.username_validity = validation::validate_username(&self.username, &self.ctx);
    }

    pub fn set_auto_login(&mut self, enabled: bool) {
        self.auto_login = enabled;
    }

    pub fn set_lenovo_fix(&mut self, enabled: bool) {
        self.lenovo_fix = enabled;
    }

    pub fn field_error(&self, field: Field) -> Option<&FieldError> {
        match field {
            Field::TargetDisk => self.disk_validity.as_ref().err(),
            Field::SwapSize => self.swap_validity.as_ref().err(),
            Field::Username => self.username_validity.as_ref().err(),
        }
    }

    /// The gate for Next on the settings page. Only the target disk and the
    /// username block forward navigation; swap is digit-filtered at input
    /// time and everything else is total.
    pub fn settings_valid(&self) -> Result<(), (Field, FieldError)> {
        if let Err(e) = &self.disk_validity {
            return Err((Field::TargetDisk, e.clone()));
        }
        if let Err(e) = &self.username_validity {
            return Err((Field::Username, e.clone()));
        }
        Ok(())
    }

    /// Immutable copy handed to the backend. `swap_mib` is the last
    /// successfully parsed value.
    pub fn snapshot(&self) -> InstallationConfig {
        InstallationConfig {
            target_disk: self.target_disk.clone(),
            filesystem: self.filesystem,
            swap_mib: self.swap_mib,
            username: self.username.clone(),
            auto_login: self.auto_login,
            lenovo_fix: self.lenovo_fix,
        }
    }

    fn revalidate(&mut self) {
        self.disk_validity = validation::validate_target_disk(&self.target_disk, &self.ctx);
        self.swap_validity = validation::validate_swap(&self.swap_raw).map(|_| ());
        self.username_validity = validation::validate_username(&self.username, &self.ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> ConfigModel {
        let ctx = ValidationContext {
            known_disks: ["/dev/da0".to_string()].into(),
            taken_usernames: ["nomad".to_string()].into(),
        };
        ConfigModel::new(ctx, &DefaultsConfig::default())
    }

    #[test]
    fn fresh_model_blocks_navigation() {
        let m = model();
        let (field, error) = m.settings_valid().unwrap_err();
        assert_eq!(field, Field::TargetDisk);
        assert_eq!(error, FieldError::DiskNotSelected);
    }

    #[test]
    fn setters_refresh_validity_synchronously() {
        let mut m = model();
        m.set_target_disk("/dev/da0");
        assert!(m.field_error(Field::TargetDisk).is_none());

        m.set_username("nomad");
        assert_eq!(m.field_error(Field::Username), Some(&FieldError::UsernameTaken));
        assert_eq!(
            m.settings_valid().unwrap_err(),
            (Field::Username, FieldError::UsernameTaken)
        );

        m.set_username("alice");
        assert!(m.settings_valid().is_ok());
    }

    #[test]
    fn swap_keeps_last_parsed_value() {
        let mut m = model();
        m.set_swap_raw("2048");
        assert!(m.field_error(Field::SwapSize).is_none());

        m.set_swap_raw("20x8");
        assert_eq!(m.field_error(Field::SwapSize), Some(&FieldError::SwapNotANumber));
        assert_eq!(m.snapshot().swap_mib, 2048);
    }

    #[test]
    fn snapshot_is_idempotent_without_mutation() {
        let mut m = model();
        m.set_target_disk("/dev/da0");
        m.set_username("alice");
        m.set_swap_raw("512");
        assert_eq!(m.snapshot(), m.snapshot());

        m.set_swap_raw("1024");
        assert_ne!(m.snapshot().swap_mib, 512);
    }

    #[test]
    fn scenario_a_snapshot_contents() {
        let mut m = model();
        m.set_target_disk("/dev/da0");
        m.set_swap_raw("2048");
        m.set_username("alice");
        assert!(m.settings_valid().is_ok());

        let snapshot = m.snapshot();
        assert_eq!(snapshot.target_disk, "/dev/da0");
        assert_eq!(snapshot.filesystem, FsType::Ufs);
        assert_eq!(snapshot.swap_mib, 2048);
        assert_eq!(snapshot.username, "alice");
        assert!(!snapshot.auto_login);
        assert!(!snapshot.lenovo_fix);
    }
}

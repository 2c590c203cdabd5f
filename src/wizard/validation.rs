use std::collections::BTreeSet;
use thiserror::Error;

/// Configuration fields that carry their own validity state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    TargetDisk,
    SwapSize,
    Username,
}

/// Field-scoped validity result. These are data consumed by the wizard,
/// never raised; navigation decisions belong to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("Please select the device you want to install NomadBSD on")]
    DiskNotSelected,

    #[error("Device '{0}' is not an available disk")]
    DiskUnknown(String),

    #[error("Username must not be empty")]
    UsernameEmpty,

    #[error("Username already in use")]
    UsernameTaken,

    #[error("Swap size must be a non-negative integer")]
    SwapNotANumber,
}

/// Snapshot of the external collaborators consulted during validation:
/// the discovered block devices and the account names already taken.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    pub known_disks: BTreeSet<String>,
    pub taken_usernames: BTreeSet<String>,
}

pub fn validate_target_disk(disk: &str, ctx: &ValidationContext) -> Result<(), FieldError> {
    if disk.is_empty() {
        return Err(FieldError::DiskNotSelected);
    }
    if !ctx.known_disks.contains(disk) {
        return Err(FieldError::DiskUnknown(disk.to_string()));
    }
    Ok(())
}

/// Emptiness and collision are distinct errors so the settings page can
/// show a specific message for each.
pub fn validate_username(username: &str, ctx: &ValidationContext) -> Result<(), FieldError> {
    if username.is_empty() {
        return Err(FieldError::UsernameEmpty);
    }
    if ctx.taken_usernames.contains(username) {
        return Err(FieldError::UsernameTaken);
    }
    Ok(())
}

/// No upper bound here; sizing the partition is the backend's problem.
pub fn validate_swap(raw: &str) -> Result<u64, FieldError> {
    raw.trim().parse::<u64>().map_err(|_| FieldError::SwapNotANumber)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ValidationContext {
        ValidationContext {
            known_disks: ["/dev/da0".to_string(), "/dev/ada0".to_string()].into(),
            taken_usernames: ["root".to_string(), "nomad".to_string()].into(),
        }
    }

    #[test]
    fn disk_must_be_selected_and_known() {
        assert_eq!(validate_target_disk("", &ctx()), Err(FieldError::DiskNotSelected));
        assert_eq!(
            validate_target_disk("/dev/da9", &ctx()),
            Err(FieldError::DiskUnknown("/dev/da9".to_string()))
        );
        assert_eq!(validate_target_disk("/dev/da0", &ctx()), Ok(()));
    }

    #[test]
    fn username_collision_is_distinct_from_emptiness() {
        assert_eq!(validate_username("", &ctx()), Err(FieldError::UsernameEmpty));
        assert_eq!(validate_username("nomad", &ctx()), Err(FieldError::UsernameTaken));
        assert_eq!(validate_username("alice", &ctx()), Ok(()));
    }

    #[test]
    fn swap_parses_as_non_negative_integer() {
        assert_eq!(validate_swap("0"), Ok(0));
        assert_eq!(validate_swap(" 2048 "), Ok(2048));
        assert_eq!(validate_swap("-1"), Err(FieldError::SwapNotANumber));
        assert_eq!(validate_swap("lots"), Err(FieldError::SwapNotANumber));
        assert_eq!(validate_swap(""), Err(FieldError::SwapNotANumber));
    }
}

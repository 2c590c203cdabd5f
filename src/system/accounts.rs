use std::collections::BTreeSet;
use std::fs;
use tracing::{debug, warn};

/// Account names the installer must never hand out even when absent from
/// the password database.
const RESERVED_USERS: &[&str] = &["root", "toor", "daemon", "operator", "nobody", "nomad"];

/// Collect every username the new account may not collide with: all entries
/// in the password database plus the reserved set.
pub fn taken_usernames(demo_mode: bool) -> BTreeSet<String> {
    let mut taken: BTreeSet<String> = RESERVED_USERS.iter().map(|s| s.to_string()).collect();

    if demo_mode {
        return taken;
    }

    match fs::read_to_string("/etc/passwd") {
        Ok(content) => {
            for line in content.lines() {
                if let Some(username) = parse_passwd_username(line) {
                    taken.insert(username);
                }
            }
        }
        Err(e) => {
            warn!("Could not read /etc/passwd: {e}");
        }
    }

    debug!("{} usernames are taken", taken.len());
    taken
}

fn parse_passwd_username(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let name = line.split(':').next()?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passwd_lines_yield_usernames() {
        assert_eq!(
            parse_passwd_username("alice:*:1001:1001:Alice:/home/alice:/bin/sh"),
            Some("alice".to_string())
        );
        assert_eq!(parse_passwd_username("# comment"), None);
        assert_eq!(parse_passwd_username(""), None);
        assert_eq!(parse_passwd_username(":broken:line"), None);
    }

    #[test]
    fn demo_mode_includes_reserved_names() {
        let taken = taken_usernames(true);
        assert!(taken.contains("root"));
        assert!(taken.contains("nomad"));
        assert!(!taken.contains("alice"));
    }
}

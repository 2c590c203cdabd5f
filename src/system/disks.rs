use std::process::Command;
use tracing::{debug, warn};

/// A selectable target block device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disk {
    /// Device path, e.g. "/dev/da0"
    pub device: String,
    /// Human-readable description from the disk itself
    pub label: String,
}

/// Enumerate the block devices the installer may write to.
pub fn discover_disks(demo_mode: bool) -> Vec<Disk> {
    if demo_mode {
        return vec![
            Disk {
                device: "/dev/da0".to_string(),
                label: "SanDisk Ultra USB 3.0".to_string(),
            },
            Disk {
                device: "/dev/da1".to_string(),
                label: "Kingston DataTraveler".to_string(),
            },
            Disk {
                device: "/dev/ada0".to_string(),
                label: "Samsung SSD 870".to_string(),
            },
        ];
    }

    let output = Command::new("sysctl").args(["-n", "kern.disks"]).output();

    let names: Vec<String> = match output {
        Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout)
            .split_whitespace()
            .map(|s| s.to_string())
            .collect(),
        _ => {
            warn!("Failed to query kern.disks, no devices available");
            Vec::new()
        }
    };

    let disks: Vec<Disk> = names
        .into_iter()
        .map(|name| {
            let device = format!("/dev/{name}");
            Disk {
                label: disk_description(&device).unwrap_or_else(|| name.clone()),
                device,
            }
        })
        .collect();

    debug!("Discovered {} disks", disks.len());
    disks
}

/// Pull the vendor description line out of `diskinfo -v`.
fn disk_description(device: &str) -> Option<String> {
    let output = Command::new("diskinfo").args(["-v", device]).output().ok()?;
    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .find(|line| line.contains("# Disk descr."))
        .map(|line| {
            line.split('#')
                .next()
                .unwrap_or("")
                .trim()
                .to_string()
        })
        .filter(|descr| !descr.is_empty())
}

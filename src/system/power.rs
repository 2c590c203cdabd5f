use std::process::Command;
use tracing::{error, info};

/// Signalled exactly once, from Finish, after a successful installation.
pub fn reboot(demo_mode: bool) -> std::io::Result<()> {
    if demo_mode {
        info!("Demo mode: skipping reboot");
        return Ok(());
    }
    info!("Executing reboot");

    let status = Command::new("shutdown").args(["-r", "now"]).status()?;

    if status.success() {
        Ok(())
    } else {
        error!("shutdown failed with status: {:?}", status);
        Err(std::io::Error::other("shutdown -r now failed"))
    }
}

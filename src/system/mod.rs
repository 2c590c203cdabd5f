mod accounts;
mod disks;
mod power;

pub use accounts::taken_usernames;
pub use disks::{discover_disks, Disk};
pub use power::reboot;

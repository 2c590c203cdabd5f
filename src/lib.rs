pub mod config;
pub mod error;
pub mod event;
pub mod input;
pub mod system;
pub mod ui;
pub mod wizard;

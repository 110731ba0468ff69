pub mod config;
pub mod init;
pub mod model;
pub mod shortcut;
pub mod watch;

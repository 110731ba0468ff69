pub mod advice;
pub mod config;
pub mod error;
pub mod io;
pub mod ollama;
pub mod paths;
pub mod session;
pub mod shortcut;
pub mod watch;
pub mod window;

pub use error::{CoachError, Result};

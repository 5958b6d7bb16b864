//! Core module - process-wide infrastructure
//!
//! # Architecture Overview
//!
//! - [`settings`] - [`AutopilotSettings`] and JSON persistence
//! - [`logging`] - tracing subscriber setup
//! - [`error`] - [`CoreError`] for the above
//!
//! Nothing here knows about the game; the binary wires these up before the
//! browser and engine are started.

pub mod error;
pub mod logging;
pub mod settings;

// Re-export commonly used items
pub use error::{CoreError, CoreResult};
pub use logging::init_logging;
pub use settings::{
    load_settings, AutopilotSettings, BrowserSettings, EngineSettings, DEFAULT_URL,
};

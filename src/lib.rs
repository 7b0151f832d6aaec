// Gesto - hand-gesture control for the desktop
//
// This is the library crate containing the binding model and the
// recognition pipeline. The binary crate (main.rs) runs the camera loop.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use config::{ConfigError, ConfigManager};
pub use models::{BindingError, BindingStore, CommandSlot, GestureSymbol};
pub use services::{CommandDispatcher, RecognitionConfig, RecognitionLoop};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

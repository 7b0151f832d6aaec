//! Gesto - hand-gesture control for the desktop
//!
//! Entry point for the recognition loop process.
//!
//! # Overview
//!
//! This binary is what the configuration surface launches (and terminates)
//! through the process-lifecycle service. On startup it:
//! - initializes logging (rotating file + console)
//! - loads the binding document (missing or corrupt documents fall back to
//!   the protected binding only, with a warning)
//! - spawns the external hand-tracker helper, which owns the camera and the
//!   preview window
//! - runs the frame-synchronous recognition loop until the stream ends, the
//!   operator presses the reserved exit key, or the tracker fails
//!
//! # Environment
//!
//! - `GESTO_CONFIG_DIR`: directory holding `configuracion_gestos.json`
//!   (default: current directory)
//! - `GESTO_TRACKER`: tracker helper command line
//!   (default: `python3 hand_tracker.py`)
//! - `GESTO_DEBUG`: set to `1` for debug-level logging
//!
//! A tracker failure exits non-zero; the tracker child (and with it the
//! camera) is released on every exit path.

use anyhow::{Context, Result};
use gesto::services::{DesktopAutomation, GeometricClassifier, TrackerProcess};
use gesto::{CommandDispatcher, ConfigManager, RecognitionConfig, RecognitionLoop};
use gesto::{APP_NAME, VERSION};

fn main() -> Result<()> {
    let debug_mode = std::env::var("GESTO_DEBUG").is_ok_and(|v| v == "1");
    let _guard = gesto::logging::setup_logging("logs", "gesto", debug_mode, true)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let config_dir =
        std::env::var("GESTO_CONFIG_DIR").unwrap_or_else(|_| ".".to_string());
    let config_manager = ConfigManager::new(&config_dir)?;

    // The binding document is read once here; there is no live reload.
    let bindings = config_manager.load_or_default()?;
    tracing::info!(
        "{} bindings active from {}",
        bindings.len(),
        config_manager.document_path()
    );

    let tracker_command = std::env::var("GESTO_TRACKER")
        .unwrap_or_else(|_| "python3 hand_tracker.py".to_string());
    let mut parts = tracker_command.split_whitespace();
    let program = parts
        .next()
        .context("GESTO_TRACKER must name a tracker program")?;
    let args: Vec<String> = parts.map(str::to_string).collect();

    let source = TrackerProcess::spawn(program, &args)?;

    let dispatcher = CommandDispatcher::new(bindings, Box::new(DesktopAutomation::new()));
    let recognition = RecognitionLoop::new(
        source,
        GeometricClassifier::new(),
        dispatcher,
        RecognitionConfig::default(),
    );

    let summary = recognition.run()?;
    tracing::info!(
        "Recognition loop finished: {} frames, {} commands dispatched",
        summary.frames,
        summary.dispatched
    );

    Ok(())
}

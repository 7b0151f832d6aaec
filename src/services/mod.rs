//! Services module - the recognition pipeline and its collaborators.
//!
//! Everything here is framework-agnostic business logic with no dependency
//! on any configuration surface, making it testable and reusable.
//!
//! # Components
//!
//! - [`GeometricClassifier`] / [`LearnedClassifier`]: turn one tracked hand
//!   into a gesture symbol (or the unknown sentinel)
//! - [`HoldTracker`] and [`CooldownGate`]: debounce a held gesture and rate
//!   limit dispatches
//! - [`RecognitionLoop`]: the frame-synchronous pipeline tying it together
//! - [`CommandDispatcher`]: binding lookup plus action invocation
//! - [`DesktopAutomation`]: the real key/pointer/shell backend
//! - [`TrackerProcess`]: adapter for the external landmark helper process
//! - [`RecognitionSupervisor`]: start/stop of the loop as a child process
//!
//! # Design Philosophy
//!
//! External collaborators (tracker, learned model, OS automation) sit behind
//! traits; the loop only ever sees their outputs. Per-frame errors are
//! logged and swallowed, resource failures terminate the loop.

pub mod actions;
pub mod classifier;
pub mod dispatch;
pub mod recognition;
pub mod supervisor;
pub mod tracker;

pub use actions::{ActionError, AutomationCapability, DesktopAutomation};
pub use classifier::{
    GeometricClassifier, HandModel, LearnedClassifier, ModelError, ModelPrediction,
    PoseClassifier,
};
pub use dispatch::{CommandDispatcher, DispatchError};
pub use recognition::{
    CooldownGate, GestureSource, HoldTracker, LoopError, LoopSummary, Observation,
    RecognitionConfig, RecognitionLoop, RecognitionState, SourceError, CLICK_COOLDOWN,
    COMMAND_COOLDOWN, HOLD_THRESHOLD,
};
pub use supervisor::{RecognitionSupervisor, SupervisorError};
pub use tracker::TrackerProcess;

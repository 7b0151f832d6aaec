//! Data models for the gesture control system.
//!
//! This module contains the core vocabulary the rest of the crate is built
//! around:
//! - [`GestureSymbol`]: the closed universe of recognizable hand poses
//! - [`CommandSlot`]: the closed catalog of automatable desktop actions
//! - [`BindingStore`]: the exclusive, protected gesture-to-command assignment
//! - [`TrackedHand`]/[`Landmark`]: one frame of tracker output
//!
//! # Architecture Note
//!
//! Symbols and slots are plain `Copy` enums with stable ordinals and labels;
//! documents reference them only through those, never through Rust names.
//! The [`BindingStore`] owns the live binding set exclusively; the
//! configuration codec produces and consumes snapshots of it but never
//! mutates it in place.

pub mod bindings;
pub mod command;
pub mod hand;
pub mod symbol;

pub use bindings::{BindingError, BindingStore};
pub use command::CommandSlot;
pub use hand::{Handedness, HandRegion, Landmark, TrackedHand, LANDMARK_COUNT};
pub use symbol::{GestureSymbol, UnknownSymbol};

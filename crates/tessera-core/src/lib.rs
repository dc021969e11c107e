//! Tessera Core - Core types and utilities for the Tessera scene engine
//!
//! This crate provides the foundational types used by the scene graph:
//! - Mathematical primitives (re-exported from glam)
//! - `Pose`, the local translation/rotation/scale of a transform
//! - `FrameClock`, the per-frame delta source for update callbacks

pub mod pose;
pub mod time;

pub use glam::{Mat4, Quat, Vec3};
pub use pose::Pose;
pub use time::{ClockConfig, ClockError, FrameClock};

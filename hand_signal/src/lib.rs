//! # hand_signal
//!
//! Turns raw 21-point hand landmarks into stable control signals for the
//! scene.
//!
//! ## Per-sample pipeline
//!
//! | Stage | Module | Output |
//! |---|---|---|
//! | Presence gate (palm size) | [`processor`] | hand present / lost, once per edge |
//! | Re-entry sync | [`processor`] | counters seeded from the shared morph value |
//! | Openness ratio | [`landmarks`] | mean fingertip reach / palm size |
//! | Motion gate | [`processor`] | fast wrists do not vote |
//! | Hysteresis | [`hysteresis`] | `stable_open`, flicker-free |
//! | Morph smoothing | [`filter`] | one-pole low-pass toward 0 or 1 |
//! | Relative pointing | [`processor`] | yaw / pitch nudged by wrist deltas |
//!
//! Results are written into a [`scene_store::SharedStore`] passed by the
//! caller; the processor never holds on to it.

pub mod config;
pub mod error;
pub mod filter;
pub mod hysteresis;
pub mod landmarks;
pub mod processor;

pub use config::GestureConfig;
pub use error::SignalError;
pub use filter::OnePoleFilter;
pub use hysteresis::Hysteresis;
pub use landmarks::{LandmarkSample, LANDMARK_COUNT};
pub use processor::{GestureProcessor, GestureState, GestureUpdate, HandReading, PresenceChange};

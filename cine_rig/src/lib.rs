//! # cine_rig
//!
//! Gesture-driven cinematic camera rig.  A hand (LeapMotion or simulated)
//! assembles a scattered scene, steers an orbit camera, and launches a
//! scripted flight along a spiral path, previewed in a software window.
//!
//! ## Journey
//!
//! | State | Camera | Leaves for |
//! |---|---|---|
//! | `Scattered` | orbit | `Assembled` once morph passes 0.5 |
//! | `Morphing` | orbit | `Assembled` after 3.5 s |
//! | `Assembled` | orbit, homed | `RibbonRise` on "start journey" |
//! | `RibbonRise` | orbit, frozen | `PrepareFlight` after the ribbon fills |
//! | `PrepareFlight` | eases to the path start | `Flight` after 1.5 s |
//! | `Flight` | spiral path | `Finale` at the end of the path |
//! | `Finale` | eases home | `Assembled` after 12.5 s |
//!
//! ## Feature flags
//!
//! * (default): **Simulation mode**: keyboard and mouse shape a synthetic hand.
//! * `leap`: **Hardware mode**: landmarks from a LeapMotion controller via LeapC.
//!
//! ### Keys
//!
//! | Key | Action |
//! |---|---|
//! | Arrows | Orbit left/right, pan up/down |
//! | Wheel | Scroll the morph |
//! | Shift + Wheel | Orbit distance |
//! | `J` / `X` | Start / exit the journey (exit only while it runs) |
//! | `M` | Assemble over 3.5 s |
//! | `G` | Toggle gesture tracking |
//! | `H` | Sim hand in / out of view |
//! | `O` / `C` | Sim hand open / closed |
//! | `[` / `]` | Sim hand farther / nearer |
//! | Mouse | Sim wrist position; look-around during the flight |
//! | `R` | Reset |
//! | `Q` | Quit |

pub mod error;
pub mod config;
pub mod clock;
pub mod orbit;
pub mod sequencer;
pub mod input;
pub mod source;
pub mod visualizer;
pub mod app;

pub use config::RigConfig;
pub use error::{Result, RigError};

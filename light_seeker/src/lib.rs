// THEORY:
// This file is the main entry point for the `light_seeker` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the public
// API that will be exposed to external consumers (like the `seeker_sim` runner).
//
// The primary goal is to export the `NavigationLoop`, the `Controller` that drives
// it from external control events, and the device traits the loop consumes
// (`hardware`). The decision components (`core_modules`) stay small and pure so
// that the sense -> decide -> act cycle can be tested without any hardware.

pub mod config;
pub mod controller;
pub mod core_modules;
pub mod error;
pub mod hardware;
pub mod navigation;
pub mod sim;

pub use config::SeekerConfig;
pub use controller::{ControlEvent, ControlHandle, Controller, LoopState, RunFlag};
pub use core_modules::heading::{DirectionalReading, Heading};
pub use core_modules::movement::Movement;
pub use core_modules::run_statistics::{RunReport, RunStatistics};
pub use error::{CaptureError, ConfigError, PersistenceError, Result, SeekerError};
pub use hardware::{Devices, Frame, Resolution, Rgb};
pub use navigation::{Iteration, NavigationLoop};

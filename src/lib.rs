//! # unipolar-stepper
//!
//! Half-step driver for 4-wire unipolar stepper motors (28BYJ-48 on a
//! ULN2003 board) with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **embedded-hal 1.0**: Drives IN1..IN4 through `OutputPin`
//! - **Background stepping**: A cancellable step loop per motor; new
//!   commands supersede old ones
//! - **Position tracking**: Absolute position derived from commanded steps
//! - **Configuration-driven**: Define motors and their pins in TOML files
//! - **Pluggable sequences**: Half-step by default, full-step available
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use unipolar_stepper::{Motor, Uln2003Motor};
//!
//! let motor = Uln2003Motor::builder()
//!     .name("blinds")
//!     .pins(in1, in2, in3, in4)
//!     .ticks_per_rotation(4096)
//!     .build()?;
//!
//! // One revolution at 10 rpm, blocking until done
//! motor.run_for(10.0, 1.0)?;
//! assert_eq!(motor.position(), 1.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables the threaded driver, file I/O and TOML parsing
//! - `alloc`: Enables heap allocation for no_std with allocator

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Core modules
pub mod config;
pub mod error;
pub mod motion;
#[cfg(feature = "std")]
pub mod motor;

// Re-exports for ergonomic API
pub use config::{validate_config, MotorConfig, PinConfig, SystemConfig};
pub use error::{Error, Result};
pub use motion::{Direction, FullStep, HalfStep, StepSequence, Target};
#[cfg(feature = "std")]
pub use motor::{CancelToken, Motor, MotorSystem, Uln2003Motor, Uln2003MotorBuilder, WaitOptions};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::load_config;

// Unit types
pub use config::units::{Revolutions, Rpm, Steps};


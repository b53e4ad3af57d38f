//! Configuration module for unipolar-stepper.
//!
//! Provides types for loading and validating motor configurations
//! from TOML files (with `std` feature) or pre-parsed data.

mod motor;
mod system;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use motor::{MotorConfig, PinConfig};
pub use system::SystemConfig;
pub use validation::{validate_config, validate_motor};

pub(crate) use motor::checked_ticks;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Revolutions, Rpm, Steps};

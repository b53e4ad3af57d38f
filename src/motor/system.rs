//! Motor system facade for multi-motor configuration.
//!
//! Builds motors by name from a single configuration.

use embedded_hal::digital::OutputPin;

use crate::config::{MotorConfig, SystemConfig};
use crate::error::{ConfigError, Error, Result};

use super::builder::{PinSource, Uln2003MotorBuilder};
use super::driver::Uln2003Motor;

/// A facade for creating stepper motors from configuration.
///
/// # Example
///
/// ```rust,ignore
/// use unipolar_stepper::{load_config, Motor, MotorSystem};
///
/// let system = MotorSystem::from_config(load_config("motors.toml")?);
/// let blinds = system.build_motor("blinds", &mut board)?;
/// blinds.run_for(10.0, 2.5)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct MotorSystem {
    config: SystemConfig,
}

impl MotorSystem {
    /// Create a new motor system from configuration.
    pub fn from_config(config: SystemConfig) -> Self {
        Self { config }
    }

    /// Get the system configuration.
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Get a motor configuration by name.
    pub fn motor_config(&self, name: &str) -> Option<&MotorConfig> {
        self.config.motor(name)
    }

    /// Check if a motor name exists in the configuration.
    pub fn has_motor(&self, name: &str) -> bool {
        self.config.motor(name).is_some()
    }

    /// List all configured motor names.
    pub fn motor_names(&self) -> impl Iterator<Item = &str> {
        self.config.motor_names()
    }

    /// Create the named motor with pins taken from `board`.
    ///
    /// # Errors
    ///
    /// Returns an error if the motor is not configured, its configuration is
    /// invalid, or the board lacks one of its pins.
    pub fn build_motor<B>(&self, name: &str, board: &mut B) -> Result<Uln2003Motor<B::Pin>>
    where
        B: PinSource,
        B::Pin: OutputPin + Send + 'static,
    {
        let motor_config = self.config.motor(name).ok_or_else(|| {
            Error::Config(ConfigError::MotorNotFound(
                heapless::String::try_from(name).unwrap_or_default(),
            ))
        })?;

        Uln2003MotorBuilder::new()
            .from_motor_config(motor_config, board)?
            .build()
    }
}

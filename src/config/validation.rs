//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{MotorConfig, SystemConfig};

/// Validate a system configuration.
///
/// Checks:
/// - Every motor names a board
/// - All four coil pins are assigned
/// - Ticks per rotation is positive
/// - Display names are unique
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    for (key, motor) in config.motors.iter() {
        validate_motor(motor)?;

        let clashes = config
            .motors
            .iter()
            .filter(|(other, m)| *other != key && m.name == motor.name)
            .count();
        if clashes > 0 {
            return Err(Error::Config(ConfigError::DuplicateMotorName(
                motor.name.clone(),
            )));
        }
    }

    Ok(())
}

/// Validate a single motor configuration.
pub fn validate_motor(config: &MotorConfig) -> Result<()> {
    if config.board.is_empty() {
        return Err(Error::Config(ConfigError::MissingField("board")));
    }

    for (field, pin) in config.pins.named() {
        if pin.is_empty() {
            return Err(Error::Config(ConfigError::MissingField(field)));
        }
    }

    config.ticks()?;

    Ok(())
}

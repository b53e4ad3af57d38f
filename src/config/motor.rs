//! Motor configuration from TOML.

use heapless::String;
use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Which board pins drive the four ULN2003 inputs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PinConfig {
    /// Pin wired to IN1.
    #[serde(default)]
    pub in1: String<32>,
    /// Pin wired to IN2.
    #[serde(default)]
    pub in2: String<32>,
    /// Pin wired to IN3.
    #[serde(default)]
    pub in3: String<32>,
    /// Pin wired to IN4.
    #[serde(default)]
    pub in4: String<32>,
}

impl PinConfig {
    /// Pin names in coil order, paired with their field name.
    pub fn named(&self) -> [(&'static str, &str); 4] {
        [
            ("in1", self.in1.as_str()),
            ("in2", self.in2.as_str()),
            ("in3", self.in3.as_str()),
            ("in4", self.in4.as_str()),
        ]
    }
}

/// Complete motor configuration from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct MotorConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Name of the board providing the pins.
    #[serde(default)]
    pub board: String<32>,

    /// Pin wiring.
    #[serde(default)]
    pub pins: PinConfig,

    /// Half-steps per output shaft revolution (4096 for a geared 28BYJ-48).
    #[serde(alias = "ticks_per_revolution")]
    pub ticks_per_rotation: i64,
}

impl MotorConfig {
    /// Ticks per rotation as the unsigned quantity the driver works with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidTicksPerRotation` unless the value is in `1..=u32::MAX`.
    pub fn ticks(&self) -> Result<u32> {
        checked_ticks(self.ticks_per_rotation)
    }
}

/// Validate a raw ticks-per-rotation value.
pub(crate) fn checked_ticks(ticks: i64) -> Result<u32> {
    if ticks <= 0 {
        return Err(ConfigError::InvalidTicksPerRotation(ticks).into());
    }
    u32::try_from(ticks).map_err(|_| ConfigError::InvalidTicksPerRotation(ticks).into())
}

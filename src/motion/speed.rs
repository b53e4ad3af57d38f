//! Speed and power range checks.

use crate::config::units::Rpm;

/// Maximum output shaft speed of a geared 28BYJ-48.
///
/// The bare rotor manages ~146 rpm, but running the gear train that fast
/// wears it out.
pub const MAX_RPM: f64 = 15.0;

/// Speeds closer than this to zero or to the maximum draw a warning.
const SPEED_MARGIN: f64 = 0.1;

/// Outcome of checking a requested speed against the motor's range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedCheck {
    /// Speed is usable as requested.
    Ok,
    /// Zero speed was requested; the motor should be stopped instead.
    Zero,
    /// Speed is within range but barely above zero.
    NearlyZero,
    /// Speed is within range but close to the maximum.
    NearlyMax,
    /// Speed exceeds the maximum; use the clamped value with the same sign.
    AboveMax(Rpm),
}

impl SpeedCheck {
    /// Whether the check should be reported to the operator.
    #[inline]
    pub fn is_warning(self) -> bool {
        !matches!(self, SpeedCheck::Ok)
    }
}

/// Check `rpm` against `max`.
///
/// A NaN speed has no usable magnitude and is treated as zero.
pub fn check_speed(rpm: Rpm, max: f64) -> SpeedCheck {
    let speed = rpm.abs().value();
    if speed == 0.0 || speed.is_nan() {
        SpeedCheck::Zero
    } else if speed < SPEED_MARGIN {
        SpeedCheck::NearlyZero
    } else if speed > max {
        SpeedCheck::AboveMax(Rpm(libm::copysign(max, rpm.value())))
    } else if speed > max - SPEED_MARGIN {
        SpeedCheck::NearlyMax
    } else {
        SpeedCheck::Ok
    }
}

/// Clamp a power fraction to `[-1.0, 1.0]`.
#[inline]
pub fn clamp_power(power: f64) -> f64 {
    power.clamp(-1.0, 1.0)
}

//! Motor capability set.

use std::time::Duration;

use crate::error::Result;

use super::task::CancelToken;

/// Optional features a motor supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Properties {
    /// The motor can report its shaft position.
    pub position_reporting: bool,
}

/// How long a bounded command waits for the motor to settle.
///
/// The default waits until the target is reached or the motion is
/// superseded by a newer command.
#[derive(Debug, Clone, Default)]
pub struct WaitOptions {
    /// Give up after this long and return a timeout error. The motor keeps
    /// running toward its target.
    pub timeout: Option<Duration>,
    /// Stop waiting once this token is cancelled. The motor keeps running.
    pub cancel: Option<CancelToken>,
}

impl WaitOptions {
    /// Wait at most `timeout`.
    pub fn timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            cancel: None,
        }
    }

    /// Wait until `token` is cancelled.
    pub fn cancelled_by(token: CancelToken) -> Self {
        Self {
            timeout: None,
            cancel: Some(token),
        }
    }
}

/// Commands and queries common to position-reporting motors.
///
/// Speeds are in revolutions per minute and positions in shaft revolutions.
pub trait Motor {
    /// Move `revolutions` at `rpm` and block until the move completes or is
    /// superseded. A negative value on either argument reverses; both
    /// negative moves forward. Zero `rpm` stops the motor.
    fn run_for(&self, rpm: f64, revolutions: f64) -> Result<()>;

    /// Move to `position` (revolutions from zero) at `|rpm|` and block until
    /// there.
    fn run_to(&self, rpm: f64, position: f64) -> Result<()>;

    /// Run indefinitely at `rpm`.
    fn set_speed(&self, rpm: f64) -> Result<()>;

    /// Run indefinitely at `power` (fraction of maximum speed in `[-1, 1]`).
    fn set_power(&self, power: f64) -> Result<()>;

    /// Stop, then redefine the current position as `-offset` revolutions.
    fn reset_zero(&self, offset: f64) -> Result<()>;

    /// Current position in revolutions from zero.
    fn position(&self) -> f64;

    /// Whether the motor has not yet reached its target.
    fn is_moving(&self) -> bool;

    /// Whether the motor is driven, and at what fraction of full power.
    fn is_powered(&self) -> (bool, f64);

    /// Stop any motion and drive the coils low.
    ///
    /// A pin that fails to go low is logged; it does not fail the stop.
    fn stop(&self) -> Result<()>;

    /// Optional features supported by this motor.
    fn properties(&self) -> Properties;

    /// Stop, then wait for every step loop this motor started to exit,
    /// including superseded ones still finishing a sleep.
    fn close(&self) -> Result<()>;
}

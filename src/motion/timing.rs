//! Speed to step-interval conversion.

use core::time::Duration;

use crate::config::units::Rpm;

/// Shortest interval the step loop will sleep between steps.
///
/// Sleeps below this are not reliably honoured by the OS scheduler and the
/// geared motor cannot follow them anyway.
pub const MIN_STEP_DELAY: Duration = Duration::from_micros(100);

/// Interval between steps for a requested speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDelay {
    /// Interval to sleep after each step.
    pub duration: Duration,
    /// The computed interval was shorter than [`MIN_STEP_DELAY`] and was raised to it.
    pub clamped: bool,
}

/// Compute the inter-step interval for `rpm` on a motor with
/// `ticks_per_rotation` steps per shaft revolution.
///
/// Only the magnitude of `rpm` is used. Callers must not pass zero speed;
/// zero is handled as a stop before reaching this point.
pub fn step_delay(rpm: Rpm, ticks_per_rotation: u32) -> StepDelay {
    debug_assert!(rpm.value() != 0.0, "zero speed must be handled as a stop");

    let steps_per_sec = rpm.steps_per_sec(ticks_per_rotation);
    // Whole microseconds; float to int casts saturate.
    let micros = (1_000_000.0 / steps_per_sec) as u64;
    let computed = Duration::from_micros(micros);

    if computed < MIN_STEP_DELAY {
        StepDelay {
            duration: MIN_STEP_DELAY,
            clamped: true,
        }
    } else {
        StepDelay {
            duration: computed,
            clamped: false,
        }
    }
}

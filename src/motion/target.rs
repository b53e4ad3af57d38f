//! Step targets and move planning.

use crate::config::units::{Revolutions, Rpm, Steps};

use super::timing::{step_delay, StepDelay};

/// Direction of motor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Increasing step count.
    Forward,
    /// Decreasing step count.
    Reverse,
}

impl Direction {
    /// Direction from the sign bit of a value; `-0.0` counts as reverse.
    #[inline]
    pub fn from_sign(value: f64) -> Self {
        if value.is_sign_negative() {
            Direction::Reverse
        } else {
            Direction::Forward
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }
}

/// Where the step loop is driving the motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Stop once the position equals this step count.
    At(Steps),
    /// Keep stepping in this direction until told otherwise.
    ///
    /// Never reached; only an explicit stop ends an unbounded run.
    Unbounded(Direction),
}

impl Default for Target {
    fn default() -> Self {
        Target::At(Steps::default())
    }
}

impl Target {
    /// Direction of the next step from `current`, or `None` if the target is reached.
    #[inline]
    pub fn heading_from(self, current: Steps) -> Option<Direction> {
        match self {
            Target::At(target) if target == current => None,
            Target::At(target) if current < target => Some(Direction::Forward),
            Target::At(_) => Some(Direction::Reverse),
            Target::Unbounded(direction) => Some(direction),
        }
    }

    /// Whether the motor still has somewhere to go from `current`.
    #[inline]
    pub fn is_pending(self, current: Steps) -> bool {
        self.heading_from(current).is_some()
    }

    /// Finite target step, if any.
    #[inline]
    pub fn steps(self) -> Option<Steps> {
        match self {
            Target::At(steps) => Some(steps),
            Target::Unbounded(_) => None,
        }
    }
}

/// Target and timing for a relative move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovePlan {
    /// Where the move ends.
    pub target: Target,
    /// Interval between steps.
    pub delay: StepDelay,
}

/// Plan a move of `revolutions` at `rpm` starting from `current`.
///
/// Either value may be negative to reverse; if both are negative the move
/// is forward. `rpm` must be non-zero.
pub fn plan_move(
    current: Steps,
    rpm: Rpm,
    revolutions: Revolutions,
    ticks_per_rotation: u32,
) -> MovePlan {
    let direction = if Direction::from_sign(revolutions.value()) == Direction::from_sign(rpm.value()) {
        Direction::Forward
    } else {
        Direction::Reverse
    };

    let distance = Steps::from_revolutions(revolutions.abs(), ticks_per_rotation);
    let offset = Steps(distance.value().saturating_mul(direction.sign()));

    MovePlan {
        target: Target::At(current + offset),
        delay: step_delay(rpm, ticks_per_rotation),
    }
}

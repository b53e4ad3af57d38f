//! Motion module for unipolar-stepper.
//!
//! Pure step-level logic shared by every driver: coil sequences, step
//! timing, speed checks and move planning.

mod sequence;
mod speed;
mod target;
mod timing;

pub use sequence::{CoilPattern, FullStep, HalfStep, StepSequence, COILS_OFF};
pub use speed::{check_speed, clamp_power, SpeedCheck, MAX_RPM};
pub use target::{plan_move, Direction, MovePlan, Target};
pub use timing::{step_delay, StepDelay, MIN_STEP_DELAY};

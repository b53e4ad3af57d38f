//! Position/target state shared between commands and the step loop.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use embedded_hal::digital::OutputPin;

use crate::config::units::Steps;
use crate::motion::Target;

use super::coils::Coils;
use super::task::RunHandle;

/// Where the motor is and where it is going.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionState {
    /// Absolute step count from the current zero.
    pub current: Steps,
    /// Where the step loop is heading.
    pub target: Target,
    /// Interval between steps; unset until the first motion command.
    pub delay: Option<Duration>,
}

impl MotionState {
    /// The motor is moving iff it has not reached its target.
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.target.is_pending(self.current)
    }

    /// Make the current position the target.
    #[inline]
    pub fn hold(&mut self) {
        self.target = Target::At(self.current);
    }
}

/// Record of a step loop that ended on a pin write failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fault {
    /// Last position whose pattern was written successfully.
    pub position: Steps,
    /// Target the loop was driving toward when it failed.
    pub abandoned: Target,
}

/// Everything behind the motor's single lock.
pub(crate) struct Shared<P: OutputPin> {
    pub(crate) state: MotionState,
    pub(crate) coils: Coils<P>,
    pub(crate) run: Option<RunHandle>,
    /// Superseded loops that may still be finishing a sleep.
    pub(crate) retired: Vec<RunHandle>,
    pub(crate) fault: Option<Fault>,
    /// Bumped by every command that replaces the motion in progress.
    pub(crate) epoch: u64,
}

impl<P: OutputPin> Shared<P> {
    pub(crate) fn new(coils: Coils<P>) -> Self {
        Self {
            state: MotionState::default(),
            coils,
            run: None,
            retired: Vec::new(),
            fault: None,
            epoch: 0,
        }
    }

    /// Start a new operation, superseding any wait on the previous one.
    pub(crate) fn begin_operation(&mut self) -> u64 {
        self.epoch = self.epoch.wrapping_add(1);
        self.fault = None;
        self.epoch
    }

    /// Signal the active step loop to exit. Does not wait for it.
    pub(crate) fn cancel_run(&mut self) {
        if let Some(run) = &self.run {
            run.cancel();
        }
    }

    /// Cancel the active step loop and keep its handle until it is joined.
    /// Handles of loops that have already exited are dropped.
    pub(crate) fn retire_run(&mut self) {
        self.retired.retain(|handle| !handle.is_finished());
        if let Some(run) = self.run.take() {
            run.cancel();
            self.retired.push(run);
        }
    }

    /// Give up on the current target when no step loop could be started.
    pub(crate) fn abandon_run(&mut self) {
        self.retire_run();
        self.state.hold();
    }
}

/// Lock the shared state, recovering it if a holder panicked.
///
/// Every field is plain data written in one assignment, so a poisoned
/// guard still holds a consistent state.
pub(crate) fn lock<P: OutputPin>(shared: &Mutex<Shared<P>>) -> MutexGuard<'_, Shared<P>> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

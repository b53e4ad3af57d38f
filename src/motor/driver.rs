//! ULN2003 + 28BYJ-48 stepper driver.
//!
//! Generic over the embedded-hal 1.0 pin type and the coil sequence.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use embedded_hal::digital::OutputPin;
use log::{debug, info, warn};

use crate::config::units::{Revolutions, Rpm, Steps};
use crate::error::{MotionError, MotorError, Result};
use crate::motion::{
    check_speed, clamp_power, plan_move, step_delay, Direction, HalfStep, SpeedCheck,
    StepDelay, StepSequence, Target, MAX_RPM, MIN_STEP_DELAY,
};

use super::api::{Motor, Properties, WaitOptions};
use super::builder::Uln2003MotorBuilder;
use super::coils::Coils;
use super::state::{lock, Fault, Shared};
use super::task;

/// A unipolar stepper on four output pins.
///
/// Generic over:
/// - `P`: pin type for IN1..IN4 (must implement `OutputPin`)
/// - `S`: coil sequence (defaults to [`HalfStep`])
///
/// Commands take `&self`; the motor can be shared between threads. Each
/// motion command supersedes the one before it.
pub struct Uln2003Motor<P, S = HalfStep>
where
    P: OutputPin + Send + 'static,
    S: StepSequence + 'static,
{
    /// Motor name for logging.
    name: heapless::String<32>,

    /// Steps per output shaft revolution.
    ticks_per_rotation: u32,

    /// State, coils and step loop handle behind one lock.
    shared: Arc<Mutex<Shared<P>>>,

    _sequence: PhantomData<fn() -> S>,
}

impl<P> Uln2003Motor<P>
where
    P: OutputPin + Send + 'static,
{
    /// Start building a half-step motor.
    pub fn builder() -> Uln2003MotorBuilder<P> {
        Uln2003MotorBuilder::new()
    }
}

impl<P, S> Uln2003Motor<P, S>
where
    P: OutputPin + Send + 'static,
    S: StepSequence + 'static,
{
    pub(crate) fn new(name: heapless::String<32>, ticks_per_rotation: u32, pins: [P; 4]) -> Self {
        Self {
            name,
            ticks_per_rotation,
            shared: Arc::new(Mutex::new(Shared::new(Coils::new(pins)))),
            _sequence: PhantomData,
        }
    }

    /// Get the motor name.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Steps per output shaft revolution.
    #[inline]
    pub fn ticks_per_rotation(&self) -> u32 {
        self.ticks_per_rotation
    }

    /// Current position in steps.
    pub fn position_steps(&self) -> Steps {
        self.lock().state.current
    }

    /// Where the motor is heading.
    pub fn target(&self) -> Target {
        self.lock().state.target
    }

    /// Interval between steps currently in effect.
    pub fn step_interval(&self) -> Option<Duration> {
        self.lock().state.delay
    }

    /// The fault that ended the last step loop, if no command has been
    /// issued since.
    pub fn fault(&self) -> Option<Fault> {
        self.lock().fault
    }

    /// Move `revolutions` at `rpm`, waiting as described by `wait`.
    ///
    /// # Errors
    ///
    /// - `MotionError::Timeout` if `wait` has a timeout that expires first
    /// - `MotorError::Faulted` if a pin write ends the move
    /// - `MotorError::TaskSpawn` if the step loop cannot be started
    pub fn run_for_with(&self, rpm: f64, revolutions: f64, wait: &WaitOptions) -> Result<()> {
        let Some(rpm) = self.checked_rpm(Rpm(rpm)) else {
            return self.stop();
        };

        let epoch = {
            let mut shared = self.lock();
            let epoch = shared.begin_operation();
            let plan = plan_move(
                shared.state.current,
                rpm,
                Revolutions(revolutions),
                self.ticks_per_rotation,
            );
            debug!(
                "{}: moving {} revolutions at {} rpm, target {:?}",
                self.name, revolutions, rpm.value(), plan.target
            );
            self.commit(&mut shared, plan.target, plan.delay)?;
            epoch
        };

        self.wait_for(epoch, wait)
    }

    /// Move to `position` revolutions from zero, waiting as described by `wait`.
    ///
    /// # Errors
    ///
    /// See [`Uln2003Motor::run_for_with`].
    pub fn run_to_with(&self, rpm: f64, position: f64, wait: &WaitOptions) -> Result<()> {
        let distance = Revolutions(position) - Revolutions(self.position());
        debug!(
            "{}: moving {} revolutions to reach {}",
            self.name,
            distance.value(),
            position
        );

        if distance.value() == 0.0 {
            return Ok(());
        }

        self.run_for_with(Rpm(rpm).abs().value(), distance.value(), wait)
    }

    /// Block until the motor reaches its target.
    ///
    /// Returns early, successfully, if a newer command supersedes the motion
    /// in progress or `wait.cancel` fires.
    ///
    /// # Errors
    ///
    /// - `MotionError::Timeout` if `wait.timeout` expires first
    /// - `MotorError::Faulted` if a pin write ended the step loop
    pub fn wait_until_settled(&self, wait: &WaitOptions) -> Result<()> {
        let epoch = self.lock().epoch;
        self.wait_for(epoch, wait)
    }

    fn wait_for(&self, epoch: u64, wait: &WaitOptions) -> Result<()> {
        let started = Instant::now();
        loop {
            let poll = {
                let shared = self.lock();
                if shared.epoch != epoch {
                    debug!("{}: superseded by a newer command", self.name);
                    return Ok(());
                }
                if shared.fault.is_some() {
                    return Err(MotorError::Faulted.into());
                }
                if !shared.state.is_moving() {
                    return Ok(());
                }
                shared.state.delay.unwrap_or(MIN_STEP_DELAY)
            };

            if wait.cancel.as_ref().is_some_and(|token| token.is_cancelled()) {
                debug!("{}: wait cancelled by caller", self.name);
                return Ok(());
            }

            let sleep = match wait.timeout {
                Some(timeout) => {
                    let waited = started.elapsed();
                    if waited >= timeout {
                        return Err(MotionError::Timeout {
                            waited_ms: waited.as_millis() as u64,
                        }
                        .into());
                    }
                    poll.min(timeout - waited)
                }
                None => poll,
            };
            thread::sleep(sleep);
        }
    }

    /// Check a requested speed. Returns `None` if the motor should stop instead.
    fn checked_rpm(&self, rpm: Rpm) -> Option<Rpm> {
        match check_speed(rpm, MAX_RPM) {
            SpeedCheck::Ok => Some(rpm),
            SpeedCheck::Zero => {
                warn!("{}: speed {} rpm gives no motion, stopping", self.name, rpm.value());
                None
            }
            SpeedCheck::NearlyZero => {
                warn!("{}: speed {} rpm is nearly 0", self.name, rpm.value());
                Some(rpm)
            }
            SpeedCheck::NearlyMax => {
                warn!("{}: speed {} rpm is nearly the max of {}", self.name, rpm.value(), MAX_RPM);
                Some(rpm)
            }
            SpeedCheck::AboveMax(clamped) => {
                warn!(
                    "{}: speed {} rpm exceeds the max, moving at {} rpm",
                    self.name,
                    rpm.value(),
                    clamped.value()
                );
                Some(clamped)
            }
        }
    }

    /// Install a new target and interval and restart the step loop.
    fn commit(
        &self,
        shared: &mut MutexGuard<'_, Shared<P>>,
        target: Target,
        delay: StepDelay,
    ) -> Result<()> {
        if delay.clamped {
            debug!(
                "{}: step interval too short, using {:?}",
                self.name, delay.duration
            );
        }
        shared.state.target = target;
        shared.state.delay = Some(delay.duration);
        task::restart::<P, S>(&self.shared, shared, &self.name)
    }

    fn lock(&self) -> MutexGuard<'_, Shared<P>> {
        lock(&self.shared)
    }
}

impl<P, S> Motor for Uln2003Motor<P, S>
where
    P: OutputPin + Send + 'static,
    S: StepSequence + 'static,
{
    fn run_for(&self, rpm: f64, revolutions: f64) -> Result<()> {
        self.run_for_with(rpm, revolutions, &WaitOptions::default())
    }

    fn run_to(&self, rpm: f64, position: f64) -> Result<()> {
        self.run_to_with(rpm, position, &WaitOptions::default())
    }

    fn set_speed(&self, rpm: f64) -> Result<()> {
        self.set_power(rpm / MAX_RPM)
    }

    fn set_power(&self, power: f64) -> Result<()> {
        if self.checked_rpm(Rpm(power * MAX_RPM)).is_none() {
            return self.stop();
        }

        let direction = Direction::from_sign(power);
        let delay = step_delay(Rpm(clamp_power(power) * MAX_RPM), self.ticks_per_rotation);
        debug!("{}: running {:?} at power {}", self.name, direction, power);

        let mut shared = self.lock();
        shared.begin_operation();
        self.commit(&mut shared, Target::Unbounded(direction), delay)
    }

    fn reset_zero(&self, offset: f64) -> Result<()> {
        self.stop()?;

        let zero = Steps::from_revolutions(-Revolutions(offset), self.ticks_per_rotation);
        let mut shared = self.lock();
        shared.begin_operation();
        shared.state.current = zero;
        shared.state.hold();
        info!("{}: position reset to {} steps", self.name, zero.value());
        Ok(())
    }

    fn position(&self) -> f64 {
        self.position_steps()
            .to_revolutions(self.ticks_per_rotation)
            .value()
    }

    fn is_moving(&self) -> bool {
        self.lock().state.is_moving()
    }

    fn is_powered(&self) -> (bool, f64) {
        // Coils are either driven or not; there is no partial power.
        let on = self.is_moving();
        (on, if on { 1.0 } else { 0.0 })
    }

    fn stop(&self) -> Result<()> {
        let mut shared = self.lock();
        shared.cancel_run();
        shared.begin_operation();
        shared.state.hold();

        // A failed release belongs to the pins, not to this command.
        if shared.coils.is_energized() {
            if let Err(kind) = shared.coils.release() {
                warn!("{}: failed to release coils on stop: {:?}", self.name, kind);
            }
        }
        Ok(())
    }

    fn properties(&self) -> Properties {
        Properties {
            position_reporting: true,
        }
    }

    fn close(&self) -> Result<()> {
        self.stop()?;
        let (run, retired) = {
            let mut shared = self.lock();
            (shared.run.take(), core::mem::take(&mut shared.retired))
        };
        for handle in retired.into_iter().chain(run) {
            handle.join();
        }
        debug!("{}: closed", self.name);
        Ok(())
    }
}

impl<P, S> Drop for Uln2003Motor<P, S>
where
    P: OutputPin + Send + 'static,
    S: StepSequence + 'static,
{
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("{}: {} while dropping motor", self.name, e);
        }
    }
}

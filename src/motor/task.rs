//! Background step loop.
//!
//! One loop runs per motor while it has somewhere to go. Each iteration
//! takes the motor lock, checks for cancellation, writes the next coil
//! pattern and releases the lock before sleeping. Cancellation is
//! cooperative: a loop that is asleep finishes its sleep before noticing.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use embedded_hal::digital::OutputPin;
use log::{debug, error};

use crate::error::{MotorError, Result};
use crate::motion::{StepSequence, MIN_STEP_DELAY};

use super::state::{lock, Fault, Shared};

/// Shared cancellation flag.
///
/// Clones observe the same flag. Also accepted by bounded waits so a caller
/// can give up waiting from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag.
    #[inline]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether the flag has been raised.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Ownership of the active step loop.
#[derive(Debug)]
pub(crate) struct RunHandle {
    token: CancelToken,
    thread: JoinHandle<()>,
}

impl RunHandle {
    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the loop thread to exit. Call only after [`RunHandle::cancel`]
    /// or once the target has been reached.
    pub(crate) fn join(self) {
        if self.thread.join().is_err() {
            error!("step loop thread panicked");
        }
    }
}

/// Cancel any running loop and start a new one driving toward the current
/// target. Must be called with the lock held; the new loop blocks on the
/// lock until the caller releases it.
pub(crate) fn restart<P, S>(
    shared_lock: &Arc<Mutex<Shared<P>>>,
    shared: &mut Shared<P>,
    name: &str,
) -> Result<()>
where
    P: OutputPin + Send + 'static,
    S: StepSequence + 'static,
{
    shared.retire_run();

    let token = CancelToken::new();
    let step_loop = StepLoop::<P, S> {
        shared: Arc::clone(shared_lock),
        token: token.clone(),
        name: heapless::String::try_from(name).unwrap_or_default(),
        _sequence: PhantomData,
    };

    let spawned = thread::Builder::new()
        .name(format!("{}-steps", name))
        .spawn(move || step_loop.run());

    match spawned {
        Ok(thread) => {
            shared.run = Some(RunHandle { token, thread });
            Ok(())
        }
        Err(e) => {
            error!("{}: could not start step loop: {}", name, e);
            shared.abandon_run();
            if let Err(kind) = shared.coils.release() {
                error!("{}: failed to release coils: {:?}", name, kind);
            }
            Err(MotorError::TaskSpawn.into())
        }
    }
}

struct StepLoop<P: OutputPin, S> {
    shared: Arc<Mutex<Shared<P>>>,
    token: CancelToken,
    name: heapless::String<32>,
    _sequence: PhantomData<fn() -> S>,
}

impl<P: OutputPin, S: StepSequence> StepLoop<P, S> {
    fn run(self) {
        debug!("{}: step loop started", self.name);
        while let Some(delay) = self.step() {
            thread::sleep(delay);
        }
    }

    /// One iteration. Returns how long to sleep, or `None` to exit.
    fn step(&self) -> Option<std::time::Duration> {
        let mut shared = lock(&self.shared);
        if self.token.is_cancelled() {
            debug!("{}: step loop cancelled", self.name);
            return None;
        }

        let current = shared.state.current;
        let Some(direction) = shared.state.target.heading_from(current) else {
            if let Err(kind) = shared.coils.release() {
                error!("{}: failed to release coils: {:?}", self.name, kind);
            }
            debug!("{}: reached step {}", self.name, current.value());
            return None;
        };

        let next = current.offset(direction.sign());
        if let Err(kind) = shared.coils.apply(S::pattern(next.value())) {
            error!(
                "{}: pin write failed stepping to {}: {:?}",
                self.name,
                next.value(),
                kind
            );
            shared.fault = Some(Fault {
                position: current,
                abandoned: shared.state.target,
            });
            shared.state.hold();
            return None;
        }

        shared.state.current = next;
        Some(shared.state.delay.unwrap_or(MIN_STEP_DELAY))
    }
}

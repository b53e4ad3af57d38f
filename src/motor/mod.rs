//! Motor module for unipolar-stepper.
//!
//! Provides the threaded stepper driver: shared position state, the
//! background step loop and the command surface.

mod api;
mod builder;
mod coils;
mod driver;
mod state;
mod system;
mod task;

pub use api::{Motor, Properties, WaitOptions};
pub use builder::{PinSource, Uln2003MotorBuilder};
pub use coils::Coils;
pub use driver::Uln2003Motor;
pub use state::{Fault, MotionState};
pub use system::MotorSystem;
pub use task::CancelToken;

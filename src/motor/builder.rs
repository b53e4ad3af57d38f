//! Builder pattern for Uln2003Motor.

use core::marker::PhantomData;

use embedded_hal::digital::OutputPin;

use crate::config::{checked_ticks, validate_motor, MotorConfig};
use crate::error::{ConfigError, Error, Result};
use crate::motion::{HalfStep, StepSequence};

use super::driver::Uln2003Motor;

/// Resolves pin names to output pins, typically a board.
pub trait PinSource {
    /// Pin type handed out by this source.
    type Pin: OutputPin;

    /// Look up an output pin by name.
    fn output_pin(&mut self, name: &str) -> Option<Self::Pin>;
}

/// Builder for creating Uln2003Motor instances.
pub struct Uln2003MotorBuilder<P, S = HalfStep>
where
    P: OutputPin + Send + 'static,
    S: StepSequence + 'static,
{
    pins: Option<[P; 4]>,
    name: Option<heapless::String<32>>,
    ticks_per_rotation: Option<i64>,
    _sequence: PhantomData<fn() -> S>,
}

impl<P> Default for Uln2003MotorBuilder<P>
where
    P: OutputPin + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Uln2003MotorBuilder<P>
where
    P: OutputPin + Send + 'static,
{
    /// Create a new builder using the half-step sequence.
    pub fn new() -> Self {
        Self {
            pins: None,
            name: None,
            ticks_per_rotation: None,
            _sequence: PhantomData,
        }
    }
}

impl<P, S> Uln2003MotorBuilder<P, S>
where
    P: OutputPin + Send + 'static,
    S: StepSequence + 'static,
{
    /// Set the pins wired to IN1..IN4.
    pub fn pins(mut self, in1: P, in2: P, in3: P, in4: P) -> Self {
        self.pins = Some([in1, in2, in3, in4]);
        self
    }

    /// Set the motor name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = heapless::String::try_from(name).ok();
        self
    }

    /// Set steps per output shaft revolution.
    pub fn ticks_per_rotation(mut self, ticks: i64) -> Self {
        self.ticks_per_rotation = Some(ticks);
        self
    }

    /// Drive the coils with a different sequence.
    ///
    /// Ticks per rotation must match the sequence: a full-step 28BYJ-48
    /// has 2048 steps per revolution.
    pub fn sequence<T: StepSequence + 'static>(self) -> Uln2003MotorBuilder<P, T> {
        Uln2003MotorBuilder {
            pins: self.pins,
            name: self.name,
            ticks_per_rotation: self.ticks_per_rotation,
            _sequence: PhantomData,
        }
    }

    /// Configure from a MotorConfig, resolving pins through `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or `source` does not
    /// have one of the named pins.
    pub fn from_motor_config<B>(mut self, config: &MotorConfig, source: &mut B) -> Result<Self>
    where
        B: PinSource<Pin = P>,
    {
        validate_motor(config)?;

        let [in1, in2, in3, in4] = config.pins.named().map(|(_, pin)| pin);
        let in1 = resolve(source, in1)?;
        let in2 = resolve(source, in2)?;
        let in3 = resolve(source, in3)?;
        let in4 = resolve(source, in4)?;

        self.pins = Some([in1, in2, in3, in4]);
        self.name = Some(config.name.clone());
        self.ticks_per_rotation = Some(config.ticks_per_rotation);
        Ok(self)
    }

    /// Build the Uln2003Motor.
    ///
    /// # Errors
    ///
    /// Returns an error if pins or ticks per rotation are missing, or ticks
    /// per rotation is not positive.
    pub fn build(self) -> Result<Uln2003Motor<P, S>> {
        let pins = self
            .pins
            .ok_or(Error::Config(ConfigError::MissingField("pins")))?;

        let ticks = self
            .ticks_per_rotation
            .ok_or(Error::Config(ConfigError::MissingField("ticks_per_rotation")))?;
        let ticks = checked_ticks(ticks)?;

        let name = self.name.unwrap_or_else(|| {
            let mut name = heapless::String::new();
            let _ = name.push_str("motor");
            name
        });

        Ok(Uln2003Motor::new(name, ticks, pins))
    }
}

fn resolve<B: PinSource>(source: &mut B, name: &str) -> Result<B::Pin> {
    source.output_pin(name).ok_or_else(|| {
        Error::Config(ConfigError::PinNotFound(
            heapless::String::try_from(name).unwrap_or_default(),
        ))
    })
}

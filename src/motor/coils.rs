//! The four ULN2003 inputs.

use embedded_hal::digital::{Error as _, ErrorKind, OutputPin, PinState};

use crate::motion::{CoilPattern, COILS_OFF};

/// Output pins wired to IN1..IN4, written together as one pattern.
#[derive(Debug)]
pub struct Coils<P: OutputPin> {
    pins: [P; 4],
    energized: bool,
}

impl<P: OutputPin> Coils<P> {
    /// Wrap four pins in coil order. Levels are left untouched.
    pub fn new(pins: [P; 4]) -> Self {
        Self {
            pins,
            energized: false,
        }
    }

    /// Drive all four pins to `pattern`.
    ///
    /// Every pin is written even if an earlier one fails; the first failure
    /// is returned.
    pub fn apply(&mut self, pattern: CoilPattern) -> Result<(), ErrorKind> {
        let mut first_error = None;
        for (pin, level) in self.pins.iter_mut().zip(pattern) {
            if let Err(e) = pin.set_state(PinState::from(level)) {
                first_error.get_or_insert(e.kind());
            }
        }

        self.energized = pattern != COILS_OFF;
        match first_error {
            Some(kind) => Err(kind),
            None => Ok(()),
        }
    }

    /// Drive all pins low.
    #[inline]
    pub fn release(&mut self) -> Result<(), ErrorKind> {
        self.apply(COILS_OFF)
    }

    /// Whether the last pattern written had any coil on.
    #[inline]
    pub fn is_energized(&self) -> bool {
        self.energized
    }
}

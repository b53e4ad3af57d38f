//! Shared test fixtures: recording pins and a pin board.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use embedded_hal::digital::{Error, ErrorKind, ErrorType, OutputPin};
use unipolar_stepper::motor::PinSource;
use unipolar_stepper::{Uln2003Motor, Uln2003MotorBuilder};

/// Error returned by a pin switched into failure mode.
#[derive(Debug)]
pub struct PinFault;

impl Error for PinFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Output pin that records every level written to it.
///
/// Clones share the same log and failure switch.
#[derive(Debug, Clone, Default)]
pub struct RecordingPin {
    log: Arc<Mutex<Vec<bool>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingPin {
    pub fn writes(&self) -> Vec<bool> {
        self.log.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    pub fn level(&self) -> Option<bool> {
        self.log.lock().unwrap().last().copied()
    }

    /// Live clones of this pin, including this one.
    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.log)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn record(&mut self, level: bool) -> Result<(), PinFault> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PinFault);
        }
        self.log.lock().unwrap().push(level);
        Ok(())
    }
}

impl ErrorType for RecordingPin {
    type Error = PinFault;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), PinFault> {
        self.record(false)
    }

    fn set_high(&mut self) -> Result<(), PinFault> {
        self.record(true)
    }
}

/// Four recording pins, observed from the test while the motor owns clones.
#[derive(Debug, Clone, Default)]
pub struct PinBank {
    pub pins: [RecordingPin; 4],
}

impl PinBank {
    /// Patterns written so far, one per write of all four pins.
    pub fn patterns(&self) -> Vec<[bool; 4]> {
        let logs: Vec<Vec<bool>> = self.pins.iter().map(RecordingPin::writes).collect();
        let len = logs.iter().map(Vec::len).min().unwrap_or(0);
        (0..len)
            .map(|i| [logs[0][i], logs[1][i], logs[2][i], logs[3][i]])
            .collect()
    }

    pub fn levels(&self) -> [Option<bool>; 4] {
        [
            self.pins[0].level(),
            self.pins[1].level(),
            self.pins[2].level(),
            self.pins[3].level(),
        ]
    }

    pub fn write_count(&self) -> usize {
        self.pins.iter().map(RecordingPin::write_count).sum()
    }

    pub fn set_failing(&self, failing: bool) {
        for pin in &self.pins {
            pin.set_failing(failing);
        }
    }

    pub fn builder(&self) -> Uln2003MotorBuilder<RecordingPin> {
        let [in1, in2, in3, in4] = self.pins.clone();
        Uln2003Motor::builder().name("test").pins(in1, in2, in3, in4)
    }
}

/// Half-step motor on recording pins.
pub fn rig(ticks: i64) -> (Uln2003Motor<RecordingPin>, PinBank) {
    let bank = PinBank::default();
    let motor = bank
        .builder()
        .ticks_per_rotation(ticks)
        .build()
        .expect("valid motor");
    (motor, bank)
}

/// Named pins handed out on request.
#[derive(Debug, Default)]
pub struct TestBoard {
    pins: HashMap<String, RecordingPin>,
}

impl TestBoard {
    pub fn with_pins(names: &[&str]) -> Self {
        Self {
            pins: names
                .iter()
                .map(|n| (n.to_string(), RecordingPin::default()))
                .collect(),
        }
    }

    pub fn pin(&self, name: &str) -> RecordingPin {
        self.pins[name].clone()
    }
}

impl PinSource for TestBoard {
    type Pin = RecordingPin;

    fn output_pin(&mut self, name: &str) -> Option<RecordingPin> {
        self.pins.get(name).cloned()
    }
}

//! Integration tests for the threaded driver.
//!
//! These drive real step loops against recording pins, so moves are kept
//! short: one revolution always takes 60 / rpm seconds.

mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};
use unipolar_stepper::error::{ConfigError, Error, MotionError, MotorError};
use unipolar_stepper::motion::MIN_STEP_DELAY;
use unipolar_stepper::{
    CancelToken, Direction, FullStep, HalfStep, Motor, StepSequence, Steps, Target,
    Uln2003Motor, WaitOptions,
};

use common::{rig, PinBank};

const OFF: [bool; 4] = [false; 4];

// =============================================================================
// Bounded moves
// =============================================================================

#[test]
fn one_revolution_forward() {
    let (motor, _bank) = rig(4096);

    motor.run_for(10.0, 1.0).unwrap();

    assert_eq!(motor.position_steps(), Steps(4096));
    assert!(!motor.is_moving());
    assert_eq!(motor.position(), 1.0);
    motor.close().unwrap();
}

#[test]
fn one_revolution_reverse() {
    let (motor, _bank) = rig(4096);

    motor.run_for(10.0, -1.0).unwrap();

    assert_eq!(motor.position_steps(), Steps(-4096));
    assert_eq!(motor.position(), -1.0);
    motor.close().unwrap();
}

#[test]
fn negative_rpm_and_revolutions_move_forward() {
    let (motor, _bank) = rig(4096);

    motor.run_for(-15.0, -0.01).unwrap();

    assert_eq!(motor.position_steps(), Steps(40));
    motor.close().unwrap();
}

#[test]
fn forward_steps_follow_half_step_table() {
    let (motor, bank) = rig(4096);

    motor.run_for(15.0, 8.0 / 4096.0).unwrap();
    motor.close().unwrap();

    let mut expected: Vec<[bool; 4]> = (1..=8).map(HalfStep::pattern).collect();
    expected.push(OFF);
    assert_eq!(bank.patterns(), expected);
}

#[test]
fn reverse_steps_walk_table_backwards() {
    let (motor, bank) = rig(4096);

    motor.run_for(15.0, -9.0 / 4096.0).unwrap();
    motor.close().unwrap();

    let mut expected: Vec<[bool; 4]> = (1..=9).map(|i| HalfStep::pattern(-i)).collect();
    expected.push(OFF);
    assert_eq!(bank.patterns(), expected);
    assert_eq!(bank.patterns()[0], [false, false, true, true]);
}

#[test]
fn exact_pin_writes_for_two_steps() {
    use State::{High, Low};

    // Steps 1 and 2 of the half-step table, then release.
    let transactions = |levels: [State; 3]| -> Vec<Transaction> {
        levels.iter().map(|s| Transaction::set(*s)).collect()
    };
    let mut pins = [
        PinMock::new(&transactions([High, High, Low])),
        PinMock::new(&transactions([Low, Low, Low])),
        PinMock::new(&transactions([Low, Low, Low])),
        PinMock::new(&transactions([High, Low, Low])),
    ];

    let [in1, in2, in3, in4] = pins.clone();
    let motor = Uln2003Motor::builder()
        .pins(in1, in2, in3, in4)
        .ticks_per_rotation(4096)
        .build()
        .unwrap();

    motor.run_for(15.0, 2.0 / 4096.0).unwrap();
    motor.close().unwrap();
    drop(motor);

    for pin in pins.iter_mut() {
        pin.done();
    }
}

#[test]
fn full_step_sequence_variant() {
    let bank = PinBank::default();
    let motor = bank
        .builder()
        .sequence::<FullStep>()
        .ticks_per_rotation(2048)
        .build()
        .unwrap();

    motor.run_for(15.0, 4.0 / 2048.0).unwrap();
    motor.close().unwrap();

    let mut expected: Vec<[bool; 4]> = (1..=4).map(FullStep::pattern).collect();
    expected.push(OFF);
    assert_eq!(bank.patterns(), expected);
}

#[test]
fn run_to_absolute_position() {
    let (motor, _bank) = rig(4096);

    motor.run_to(15.0, 0.01).unwrap();
    assert_eq!(motor.position_steps(), Steps(40));

    // Sign of rpm is ignored; direction comes from the position.
    motor.run_to(15.0, -0.005).unwrap();
    assert_eq!(motor.position_steps(), Steps(-20));
    motor.run_to(-15.0, 0.0).unwrap();
    assert_eq!(motor.position_steps(), Steps(0));
    motor.close().unwrap();
}

#[test]
fn above_max_speed_is_clamped() {
    let (motor, _bank) = rig(4096);

    motor.run_for(100.0, 0.005).unwrap();

    assert_eq!(motor.step_interval(), Some(Duration::from_micros(976)));
    assert_eq!(motor.position_steps(), Steps(20));
    motor.close().unwrap();
}

#[test]
fn fast_timing_is_floored() {
    // 15 rpm over 2^20 ticks asks for ~4us between steps.
    let (motor, _bank) = rig(1 << 20);

    motor.run_for(15.0, 32.0 / (1 << 20) as f64).unwrap();

    assert_eq!(motor.step_interval(), Some(MIN_STEP_DELAY));
    assert_eq!(motor.position_steps(), Steps(32));
    motor.close().unwrap();
}

// =============================================================================
// Stop, zero speed and reset
// =============================================================================

#[test]
fn zero_rpm_is_stop() {
    let (motor, bank) = rig(4096);

    motor.set_power(1.0).unwrap();
    thread::sleep(Duration::from_millis(30));

    motor.run_for(0.0, 5.0).unwrap();

    assert!(!motor.is_moving());
    assert_eq!(motor.target(), Target::At(motor.position_steps()));
    assert_eq!(bank.levels(), [Some(false); 4]);
    motor.close().unwrap();
}

#[test]
fn nan_speed_is_stop() {
    let (motor, bank) = rig(4096);

    motor.run_for(f64::NAN, 0.25).unwrap();
    assert!(!motor.is_moving());
    assert_eq!(motor.position_steps(), Steps(0));
    assert_eq!(motor.step_interval(), None);

    motor.set_power(f64::NAN).unwrap();
    motor.set_speed(f64::NAN).unwrap();
    assert!(!motor.is_moving());
    assert_eq!(motor.target(), Target::At(Steps(0)));
    assert_eq!(bank.write_count(), 0);
    motor.close().unwrap();
}

#[test]
fn stop_mid_motion_holds_and_releases() {
    let (motor, bank) = rig(4096);

    motor.set_power(1.0).unwrap();
    thread::sleep(Duration::from_millis(50));
    assert!(motor.is_moving());

    motor.stop().unwrap();
    let stopped_at = motor.position_steps();
    assert!(stopped_at.value() > 0);
    assert_eq!(motor.target(), Target::At(stopped_at));
    assert!(!motor.is_moving());

    thread::sleep(Duration::from_millis(20));
    assert_eq!(motor.position_steps(), stopped_at);
    assert_eq!(bank.levels(), [Some(false); 4]);
    motor.close().unwrap();
}

#[test]
fn reset_zero_does_not_touch_pins() {
    let (motor, bank) = rig(4096);

    motor.run_for(15.0, 0.01).unwrap();
    motor.close().unwrap();
    let writes = bank.write_count();

    motor.reset_zero(0.0).unwrap();
    assert_eq!(motor.position(), 0.0);
    assert_eq!(bank.write_count(), writes);

    motor.reset_zero(0.25).unwrap();
    assert_eq!(motor.position_steps(), Steps(-1024));
    assert_eq!(motor.position(), -0.25);
    assert!(!motor.is_moving());
    assert_eq!(bank.write_count(), writes);
}

// =============================================================================
// Indefinite runs
// =============================================================================

#[test]
fn set_speed_runs_until_stopped() {
    let (motor, _bank) = rig(4096);

    motor.set_speed(-15.0).unwrap();
    assert_eq!(motor.target(), Target::Unbounded(Direction::Reverse));
    assert_eq!(motor.is_powered(), (true, 1.0));

    thread::sleep(Duration::from_millis(50));
    assert!(motor.position_steps().value() < 0);

    motor.close().unwrap();
    assert!(!motor.is_moving());
    assert_eq!(motor.is_powered(), (false, 0.0));
}

#[test]
fn close_waits_for_superseded_loops() {
    let (motor, bank) = rig(4096);

    // About 73 ms between steps, so the first loop is asleep when replaced.
    motor.set_speed(0.2).unwrap();
    thread::sleep(Duration::from_millis(10));
    motor.set_speed(-0.2).unwrap();

    motor.close().unwrap();
    drop(motor);

    for pin in &bank.pins {
        assert_eq!(pin.holders(), 1);
    }
}

#[test]
fn close_is_idempotent() {
    let (motor, _bank) = rig(4096);

    motor.set_power(0.5).unwrap();
    motor.close().unwrap();
    motor.close().unwrap();
    assert!(!motor.is_moving());
}

// =============================================================================
// Supersession and waits
// =============================================================================

#[test]
fn newer_command_supersedes_older() {
    let (motor, _bank) = rig(4096);
    let motor = Arc::new(motor);

    let first = {
        let motor = Arc::clone(&motor);
        thread::spawn(move || motor.run_for(15.0, 10.0))
    };

    thread::sleep(Duration::from_millis(100));
    let before = motor.position_steps();
    assert!(before.value() > 0);

    motor.run_for(15.0, -0.01).unwrap();
    let settled = motor.position_steps();

    // The superseded caller returns normally.
    assert_eq!(first.join().unwrap(), Ok(()));

    assert_eq!(motor.target(), Target::At(settled));
    assert!(settled < before);

    // Nothing drifts back toward the first target.
    thread::sleep(Duration::from_millis(50));
    assert_eq!(motor.position_steps(), settled);
    assert!(!motor.is_moving());
    motor.close().unwrap();
}

#[test]
fn stop_releases_waiting_caller() {
    let (motor, _bank) = rig(4096);
    let motor = Arc::new(motor);

    let waiter = {
        let motor = Arc::clone(&motor);
        thread::spawn(move || motor.run_for(15.0, 10.0))
    };

    thread::sleep(Duration::from_millis(50));
    motor.stop().unwrap();

    assert_eq!(waiter.join().unwrap(), Ok(()));
    motor.close().unwrap();
}

#[test]
fn timeout_leaves_motor_running() {
    let (motor, _bank) = rig(4096);

    let result = motor.run_for_with(15.0, 1.0, &WaitOptions::timeout(Duration::from_millis(40)));

    assert!(matches!(
        result,
        Err(Error::Motion(MotionError::Timeout { .. }))
    ));
    assert!(motor.is_moving());

    motor.stop().unwrap();
    motor.close().unwrap();
}

#[test]
fn caller_cancellation_is_absorbed() {
    let (motor, _bank) = rig(4096);
    let token = CancelToken::new();

    let canceller = {
        let token = token.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(40));
            token.cancel();
        })
    };

    motor
        .run_for_with(15.0, 1.0, &WaitOptions::cancelled_by(token))
        .unwrap();
    canceller.join().unwrap();

    assert!(motor.is_moving());
    motor.close().unwrap();
}

#[test]
fn wait_until_settled_after_timeout() {
    let (motor, _bank) = rig(4096);

    let short = WaitOptions::timeout(Duration::from_millis(10));
    assert!(motor.run_for_with(15.0, 0.01, &short).is_err());

    motor.wait_until_settled(&WaitOptions::default()).unwrap();
    assert_eq!(motor.position_steps(), Steps(40));
    motor.close().unwrap();
}

// =============================================================================
// Pin faults
// =============================================================================

#[test]
fn pin_fault_ends_move_and_is_recorded() {
    let (motor, bank) = rig(4096);

    motor.run_for(15.0, 0.005).unwrap();
    assert_eq!(motor.position_steps(), Steps(20));

    bank.set_failing(true);
    let result = motor.run_for(15.0, 0.005);
    assert_eq!(result, Err(Error::Motor(MotorError::Faulted)));

    let fault = motor.fault().expect("fault recorded");
    assert_eq!(fault.position, Steps(20));
    assert_eq!(fault.abandoned, Target::At(Steps(40)));
    assert!(!motor.is_moving());
    assert_eq!(motor.position_steps(), Steps(20));

    // The next command starts fresh once the pins recover.
    bank.set_failing(false);
    motor.run_for(15.0, 0.005).unwrap();
    assert_eq!(motor.fault(), None);
    assert_eq!(motor.position_steps(), Steps(40));
    motor.close().unwrap();
}

#[test]
fn reset_zero_after_pin_fault() {
    let (motor, bank) = rig(4096);

    motor.set_power(1.0).unwrap();
    thread::sleep(Duration::from_millis(30));
    bank.set_failing(true);
    thread::sleep(Duration::from_millis(30));
    assert!(motor.fault().is_some());
    assert!(!motor.is_moving());

    // The pins are still failing; commands that only stop must not see it.
    assert_eq!(motor.reset_zero(0.0), Ok(()));
    assert_eq!(motor.position_steps(), Steps(0));
    assert_eq!(motor.fault(), None);

    assert_eq!(motor.run_for(0.0, 1.0), Ok(()));
    assert_eq!(motor.set_power(0.0), Ok(()));
    assert_eq!(motor.stop(), Ok(()));
    assert_eq!(motor.position_steps(), Steps(0));

    bank.set_failing(false);
    motor.close().unwrap();
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn builder_rejects_non_positive_ticks() {
    for ticks in [0, -4096] {
        let result = PinBank::default().builder().ticks_per_rotation(ticks).build();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidTicksPerRotation(t))) if t == ticks
        ));
    }
}

#[test]
fn builder_requires_pins_and_ticks() {
    let result = Uln2003Motor::<common::RecordingPin>::builder()
        .ticks_per_rotation(4096)
        .build();
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::MissingField("pins")))
    ));

    let result = PinBank::default().builder().build();
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::MissingField("ticks_per_rotation")))
    ));
}

#[test]
fn independent_motors_do_not_share_state() {
    let (a, _) = rig(4096);
    let (b, _) = rig(4096);

    a.run_for(15.0, 0.005).unwrap();

    assert_eq!(a.position_steps(), Steps(20));
    assert_eq!(b.position_steps(), Steps(0));
    a.close().unwrap();
    b.close().unwrap();
}

//! Coil switching sequences.
//!
//! A sequence maps a signed step index to the levels of the four ULN2003
//! inputs (IN1..IN4). Indices wrap with a true modulo so that stepping
//! backwards through zero walks the table in reverse.

/// Levels for IN1..IN4.
pub type CoilPattern = [bool; 4];

/// All coils released.
pub const COILS_OFF: CoilPattern = [false, false, false, false];

/// A cyclic coil switching table.
///
/// Implementors only provide the table; indexing and wrap-around are shared.
pub trait StepSequence {
    /// One full electrical cycle, in forward order.
    const TABLE: &'static [CoilPattern];

    /// Number of entries in one electrical cycle.
    #[inline]
    fn phases() -> usize {
        Self::TABLE.len()
    }

    /// Pattern for the given absolute step index.
    #[inline]
    fn pattern(index: i64) -> CoilPattern {
        let len = Self::TABLE.len() as i64;
        Self::TABLE[index.rem_euclid(len) as usize]
    }
}

/// Half-step drive: eight states per electrical cycle, alternating one and
/// two energized coils.
///
/// On a geared 28BYJ-48 this gives 4096 steps per output revolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HalfStep;

impl StepSequence for HalfStep {
    const TABLE: &'static [CoilPattern] = &[
        [false, false, false, true],
        [true, false, false, true],
        [true, false, false, false],
        [true, true, false, false],
        [false, true, false, false],
        [false, true, true, false],
        [false, false, true, false],
        [false, false, true, true],
    ];
}

/// Full-step two-phase-on drive: four states per cycle, two coils always
/// energized. Twice the step angle of [`HalfStep`] with more torque.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FullStep;

impl StepSequence for FullStep {
    const TABLE: &'static [CoilPattern] = &[
        [true, true, false, false],
        [false, true, true, false],
        [false, false, true, true],
        [true, false, false, true],
    ];
}

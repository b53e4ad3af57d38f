//! Unit types for physical quantities.
//!
//! Provides type-safe representations of shaft rotation, rotational speed,
//! and motor steps to prevent unit confusion at compile time.

use core::ops::{Add, Mul, Neg, Sub};

use serde::Deserialize;

/// Shaft position or distance in revolutions.
///
/// Used for the user-facing API. Internally converted to [`Steps`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct Revolutions(pub f64);

impl Revolutions {
    /// Create a new Revolutions value.
    #[inline]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Absolute distance, discarding direction.
    #[inline]
    pub fn abs(self) -> Self {
        Self(libm::fabs(self.0))
    }
}

impl Add for Revolutions {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Revolutions {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Revolutions {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

/// Rotational speed in revolutions per minute.
///
/// The sign carries direction.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct Rpm(pub f64);

impl Rpm {
    /// Create a new Rpm value.
    #[inline]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Speed magnitude, discarding direction.
    #[inline]
    pub fn abs(self) -> Self {
        Self(libm::fabs(self.0))
    }

    /// Steps per second at this speed for a motor with `ticks_per_rotation`
    /// steps per shaft revolution.
    #[inline]
    pub fn steps_per_sec(self, ticks_per_rotation: u32) -> f64 {
        libm::fabs(self.0) * ticks_per_rotation as f64 / 60.0
    }
}

impl Mul<f64> for Rpm {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

/// Motor position in steps (absolute from an arbitrary zero).
///
/// Uses i64 for unlimited range in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Steps(pub i64);

impl Steps {
    /// Create a new Steps value.
    #[inline]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Convert to revolutions.
    #[inline]
    pub fn to_revolutions(self, ticks_per_rotation: u32) -> Revolutions {
        Revolutions(self.0 as f64 / ticks_per_rotation as f64)
    }

    /// Create from revolutions, truncating any fractional step toward zero.
    #[inline]
    pub fn from_revolutions(revolutions: Revolutions, ticks_per_rotation: u32) -> Self {
        Self((revolutions.0 * ticks_per_rotation as f64) as i64)
    }

    /// One step further in `sign` direction (+1 or -1).
    #[inline]
    pub fn offset(self, sign: i64) -> Self {
        Self(self.0.saturating_add(sign))
    }
}

impl Add for Steps {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Steps {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

/// Extension trait for creating unit types from primitives.
pub trait UnitExt {
    /// Convert to Revolutions.
    fn revolutions(self) -> Revolutions;
    /// Convert to Rpm.
    fn rpm(self) -> Rpm;
}

impl UnitExt for f64 {
    #[inline]
    fn revolutions(self) -> Revolutions {
        Revolutions(self)
    }

    #[inline]
    fn rpm(self) -> Rpm {
        Rpm(self)
    }
}

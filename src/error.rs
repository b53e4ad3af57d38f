//! Error types for unipolar-stepper.
//!
//! Provides unified error handling across configuration, motor control, and motion waits.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all unipolar-stepper operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Motor operation error
    Motor(MotorError),
    /// Motion command error
    Motion(MotionError),
}

/// Configuration-related errors.
///
/// All of these are fatal at construction: a motor is never created from
/// a configuration that produced one.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// A required field was left empty
    MissingField(&'static str),
    /// Ticks per rotation must be > 0
    InvalidTicksPerRotation(i64),
    /// The board could not resolve a pin name
    PinNotFound(heapless::String<32>),
    /// Motor name not found in configuration
    MotorNotFound(heapless::String<32>),
    /// Duplicate motor name in configuration
    DuplicateMotorName(heapless::String<32>),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Motor operation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotorError {
    /// The background run loop could not be started
    TaskSpawn,
    /// A pin write ended the step loop before the awaited target
    Faulted,
}

/// Motion command errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionError {
    /// A bounded wait hit its deadline before the target was reached.
    ///
    /// The motor keeps running toward the target.
    Timeout {
        /// How long the caller waited, in milliseconds
        waited_ms: u64,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
            Error::Motion(e) => write!(f, "Motion error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::MissingField(field) => write!(f, "Missing required field '{}'", field),
            ConfigError::InvalidTicksPerRotation(v) => {
                write!(f, "Invalid ticks_per_rotation: {}. Must be > 0", v)
            }
            ConfigError::PinNotFound(name) => write!(f, "Pin '{}' not found on board", name),
            ConfigError::MotorNotFound(name) => write!(f, "Motor '{}' not found", name),
            ConfigError::DuplicateMotorName(name) => write!(f, "Duplicate motor name: '{}'", name),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::TaskSpawn => write!(f, "Failed to start the step loop"),
            MotorError::Faulted => write!(f, "Motor stopped after a pin fault"),
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::Timeout { waited_ms } => {
                write!(f, "Target not reached after {} ms", waited_ms)
            }
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}

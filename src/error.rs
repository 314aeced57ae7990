//! Errors raised at the simulation boundary
//!
//! Only caller bugs are errors: bad time steps and bad configuration.
//! Geometry glitches are repaired in place and terminal game states are
//! ordinary phases.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Frame delta was negative or not a finite number
    NegativeTimeStep(f32),
    /// A size or speed that must be positive and finite
    InvalidDimension { name: &'static str, value: f32 },
    /// A probability outside [0, 1]
    InvalidProbability { name: &'static str, value: f32 },
    /// Any other rejected setting
    InvalidSetting {
        name: &'static str,
        reason: &'static str,
    },
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub fn code(&self) -> &'static str {
        match self {
            SimError::NegativeTimeStep(_) => "negative_time_step",
            SimError::InvalidDimension { .. } => "invalid_dimension",
            SimError::InvalidProbability { .. } => "invalid_probability",
            SimError::InvalidSetting { .. } => "invalid_setting",
        }
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::NegativeTimeStep(dt) => {
                write!(f, "time step must be finite and non-negative, got {dt}")
            }
            SimError::InvalidDimension { name, value } => {
                write!(f, "{name} must be positive and finite, got {value}")
            }
            SimError::InvalidProbability { name, value } => {
                write!(f, "{name} must be between 0 and 1, got {value}")
            }
            SimError::InvalidSetting { name, reason } => write!(f, "{name}: {reason}"),
        }
    }
}

impl std::error::Error for SimError {}

/// Reject negative or non-finite frame deltas
pub(crate) fn check_dt(dt: f32) -> SimResult<()> {
    if dt.is_finite() && dt >= 0.0 {
        Ok(())
    } else {
        Err(SimError::NegativeTimeStep(dt))
    }
}

pub(crate) fn check_positive(name: &'static str, value: f32) -> SimResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidDimension { name, value })
    }
}

pub(crate) fn check_probability(name: &'static str, value: f32) -> SimResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::InvalidProbability { name, value })
    }
}

//! Blood volume quantities.
//!
//! Stock is tracked as a continuous volume. Internally it is an exact integer
//! number of millilitres so that crediting a 450 ml donation never drifts; on
//! the wire it is expressed in liters.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

const ML_PER_LITER: f64 = 1000.0;

/// A non-negative volume of blood.
///
/// Serialized as liters (`0.45` for a 450 ml bag).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Volume(u64);

impl Volume {
    pub const ZERO: Volume = Volume(0);

    pub const fn from_millilitres(ml: u64) -> Self {
        Self(ml)
    }

    pub const fn from_whole_liters(liters: u64) -> Self {
        Self(liters * 1000)
    }

    /// Convert a liter amount, rounding to the nearest millilitre.
    ///
    /// Negative, NaN and infinite inputs are rejected.
    pub fn from_liters(liters: f64) -> DomainResult<Self> {
        if !liters.is_finite() {
            return Err(DomainError::validation("volume must be a finite number"));
        }
        if liters < 0.0 {
            return Err(DomainError::validation("volume cannot be negative"));
        }
        let ml = (liters * ML_PER_LITER).round();
        if ml > u64::MAX as f64 {
            return Err(DomainError::validation("volume is too large"));
        }
        Ok(Self(ml as u64))
    }

    pub const fn millilitres(&self) -> u64 {
        self.0
    }

    pub fn liters(&self) -> f64 {
        self.0 as f64 / ML_PER_LITER
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn saturating_add(self, other: Volume) -> Volume {
        Volume(self.0.saturating_add(other.0))
    }

    /// Subtract, clamping at zero.
    pub const fn saturating_sub(self, other: Volume) -> Volume {
        Volume(self.0.saturating_sub(other.0))
    }

    /// Half of this volume, rounded down to the millilitre.
    pub const fn half(self) -> Volume {
        Volume(self.0 / 2)
    }
}

impl ValueObject for Volume {}

impl TryFrom<f64> for Volume {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Volume::from_liters(value)
    }
}

impl From<Volume> for f64 {
    fn from(value: Volume) -> Self {
        value.liters()
    }
}

impl core::fmt::Display for Volume {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.3} L", self.liters())
    }
}

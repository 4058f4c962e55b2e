//! Stock status classification strategies.

use hemolink_core::Volume;

use crate::level::StockStatus;

/// Classifies a stock quantity.
///
/// Implementations must be pure: the same inputs always produce the same status.
pub trait StatusPolicy: Send + Sync + core::fmt::Debug {
    fn classify(&self, quantity: Volume, min_quantity: Volume) -> StockStatus;
}

/// Per-type minimum policy.
///
/// - `critical` when `quantity <= min_quantity / 2`
/// - `low` when `min_quantity / 2 < quantity <= min_quantity`
/// - `stable` otherwise (this policy never reports `high`)
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct MinimumThresholdPolicy;

impl StatusPolicy for MinimumThresholdPolicy {
    fn classify(&self, quantity: Volume, min_quantity: Volume) -> StockStatus {
        // Compare 2q against min so the half-threshold stays exact in millilitres.
        let doubled = u128::from(quantity.millilitres()) * 2;
        if doubled <= u128::from(min_quantity.millilitres()) {
            StockStatus::Critical
        } else if quantity <= min_quantity {
            StockStatus::Low
        } else {
            StockStatus::Stable
        }
    }
}

/// Fixed global breakpoints, independent of the per-type minimum.
///
/// A quantity below `critical_below` is critical, below `low_below` low, below
/// `stable_below` stable, and anything else high.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FixedBreakpointPolicy {
    pub critical_below: Volume,
    pub low_below: Volume,
    pub stable_below: Volume,
}

impl Default for FixedBreakpointPolicy {
    fn default() -> Self {
        Self {
            critical_below: Volume::from_whole_liters(25),
            low_below: Volume::from_whole_liters(50),
            stable_below: Volume::from_whole_liters(80),
        }
    }
}

impl StatusPolicy for FixedBreakpointPolicy {
    fn classify(&self, quantity: Volume, _min_quantity: Volume) -> StockStatus {
        if quantity < self.critical_below {
            StockStatus::Critical
        } else if quantity < self.low_below {
            StockStatus::Low
        } else if quantity < self.stable_below {
            StockStatus::Stable
        } else {
            StockStatus::High
        }
    }
}

/// The policy selected at startup.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StockPolicy {
    MinimumThreshold(MinimumThresholdPolicy),
    FixedBreakpoints(FixedBreakpointPolicy),
}

impl Default for StockPolicy {
    fn default() -> Self {
        StockPolicy::MinimumThreshold(MinimumThresholdPolicy)
    }
}

impl StatusPolicy for StockPolicy {
    fn classify(&self, quantity: Volume, min_quantity: Volume) -> StockStatus {
        match self {
            StockPolicy::MinimumThreshold(p) => p.classify(quantity, min_quantity),
            StockPolicy::FixedBreakpoints(p) => p.classify(quantity, min_quantity),
        }
    }
}

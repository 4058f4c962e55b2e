use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hemolink_core::{BloodType, Volume};

use crate::policy::StatusPolicy;

/// Derived stock classification.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Critical,
    Low,
    Stable,
    High,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Critical => "critical",
            StockStatus::Low => "low",
            StockStatus::Stable => "stable",
            StockStatus::High => "high",
        }
    }

    /// Whether this status should raise a stock alert.
    pub fn is_alert(&self) -> bool {
        matches!(self, StockStatus::Critical | StockStatus::Low)
    }
}

impl core::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inventory record for one blood type.
///
/// `status` is never written directly; it is recomputed from `quantity` and
/// `min_quantity` every time either changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLevel {
    blood_type: BloodType,
    quantity: Volume,
    min_quantity: Volume,
    status: StockStatus,
    last_updated: DateTime<Utc>,
}

impl StockLevel {
    pub fn new(
        blood_type: BloodType,
        quantity: Volume,
        min_quantity: Volume,
        policy: &(impl StatusPolicy + ?Sized),
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            blood_type,
            quantity,
            min_quantity,
            status: policy.classify(quantity, min_quantity),
            last_updated: now,
        }
    }

    pub fn blood_type(&self) -> BloodType {
        self.blood_type
    }

    pub fn quantity(&self) -> Volume {
        self.quantity
    }

    pub fn min_quantity(&self) -> Volume {
        self.min_quantity
    }

    pub fn status(&self) -> StockStatus {
        self.status
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    pub(crate) fn set_quantity(
        &mut self,
        quantity: Volume,
        policy: &(impl StatusPolicy + ?Sized),
        now: DateTime<Utc>,
    ) {
        self.quantity = quantity;
        self.status = policy.classify(self.quantity, self.min_quantity);
        self.last_updated = now;
    }

    /// Recompute `status` without touching `last_updated`.
    pub(crate) fn reclassify(&mut self, policy: &(impl StatusPolicy + ?Sized)) {
        self.status = policy.classify(self.quantity, self.min_quantity);
    }
}

//! Blood stock module.
//!
//! Owns one `StockLevel` per blood type, classifies each level from its
//! quantity through a pluggable `StatusPolicy`, and applies quantity changes
//! triggered by donations or manual corrections. Pure domain logic: no IO, no
//! HTTP, no storage.

pub mod ledger;
pub mod level;
pub mod policy;

pub use ledger::{StockAlert, StockAlerts, StockLedger, StockOperation, StockStatistics};
pub use level::{StockLevel, StockStatus};
pub use policy::{FixedBreakpointPolicy, MinimumThresholdPolicy, StatusPolicy, StockPolicy};

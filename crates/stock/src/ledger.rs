use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hemolink_core::{BloodType, DomainError, DomainResult, Volume};

use crate::level::{StockLevel, StockStatus};
use crate::policy::StatusPolicy;

/// Direction of a quantity adjustment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockOperation {
    Add,
    Subtract,
}

/// One entry of the alert board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAlert {
    pub blood_type: BloodType,
    pub current_level: Volume,
    pub min_level: Volume,
    pub severity: StockStatus,
}

impl StockAlert {
    fn from_level(level: &StockLevel) -> Self {
        Self {
            blood_type: level.blood_type(),
            current_level: level.quantity(),
            min_level: level.min_quantity(),
            severity: level.status(),
        }
    }
}

/// Records partitioned by alert severity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockAlerts {
    pub critical: Vec<StockAlert>,
    pub low: Vec<StockAlert>,
}

/// Aggregate view for the stock dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockStatistics {
    pub total: Volume,
    pub critical: usize,
    pub low: usize,
    pub stable: usize,
    pub high: usize,
}

/// The blood stock ledger: exactly one `StockLevel` per known blood type.
///
/// Every mutation either succeeds completely or leaves the ledger untouched.
/// Quantities never go below zero; subtractions clamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<StockLevel>", into = "Vec<StockLevel>")]
pub struct StockLedger {
    levels: BTreeMap<BloodType, StockLevel>,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from records, rejecting duplicate blood types.
    pub fn from_levels(levels: impl IntoIterator<Item = StockLevel>) -> DomainResult<Self> {
        let mut map = BTreeMap::new();
        for level in levels {
            let blood_type = level.blood_type();
            if map.insert(blood_type, level).is_some() {
                return Err(DomainError::invariant(format!(
                    "duplicate stock record for blood type {blood_type}"
                )));
            }
        }
        Ok(Self { levels: map })
    }

    pub fn get(&self, blood_type: BloodType) -> Option<&StockLevel> {
        self.levels.get(&blood_type)
    }

    /// All records, ordered by blood type.
    pub fn levels(&self) -> impl Iterator<Item = &StockLevel> {
        self.levels.values()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Add or subtract `delta` from a blood type's quantity.
    ///
    /// The result is clamped at zero and the status recomputed.
    pub fn adjust_quantity(
        &mut self,
        policy: &(impl StatusPolicy + ?Sized),
        blood_type: BloodType,
        delta: Volume,
        operation: StockOperation,
        now: DateTime<Utc>,
    ) -> DomainResult<StockLevel> {
        let level = self.level_mut(blood_type)?;
        let quantity = match operation {
            StockOperation::Add => level.quantity().saturating_add(delta),
            StockOperation::Subtract => level.quantity().saturating_sub(delta),
        };
        level.set_quantity(quantity, policy, now);
        Ok(level.clone())
    }

    /// Overwrite a blood type's quantity (manual correction).
    ///
    /// Takes raw liters so a negative correction can be reported as invalid
    /// instead of being clamped.
    pub fn set_quantity(
        &mut self,
        policy: &(impl StatusPolicy + ?Sized),
        blood_type: BloodType,
        liters: f64,
        now: DateTime<Utc>,
    ) -> DomainResult<StockLevel> {
        let quantity = Volume::from_liters(liters)?;
        let level = self.level_mut(blood_type)?;
        level.set_quantity(quantity, policy, now);
        Ok(level.clone())
    }

    /// Partition the records with an alerting status.
    pub fn critical_and_low(&self) -> StockAlerts {
        let mut alerts = StockAlerts::default();
        for level in self.levels.values() {
            match level.status() {
                StockStatus::Critical => alerts.critical.push(StockAlert::from_level(level)),
                StockStatus::Low => alerts.low.push(StockAlert::from_level(level)),
                StockStatus::Stable | StockStatus::High => {}
            }
        }
        alerts
    }

    pub fn statistics(&self) -> StockStatistics {
        self.levels
            .values()
            .fold(StockStatistics::default(), |mut stats, level| {
                stats.total = stats.total.saturating_add(level.quantity());
                match level.status() {
                    StockStatus::Critical => stats.critical += 1,
                    StockStatus::Low => stats.low += 1,
                    StockStatus::Stable => stats.stable += 1,
                    StockStatus::High => stats.high += 1,
                }
                stats
            })
    }

    /// Recompute every status under `policy` (e.g. after loading persisted
    /// records or switching policies).
    pub fn reclassify(&mut self, policy: &(impl StatusPolicy + ?Sized)) {
        for level in self.levels.values_mut() {
            level.reclassify(policy);
        }
    }

    fn level_mut(&mut self, blood_type: BloodType) -> DomainResult<&mut StockLevel> {
        self.levels
            .get_mut(&blood_type)
            .ok_or_else(|| DomainError::not_found(format!("blood type {blood_type}")))
    }
}

impl TryFrom<Vec<StockLevel>> for StockLedger {
    type Error = DomainError;

    fn try_from(value: Vec<StockLevel>) -> Result<Self, Self::Error> {
        StockLedger::from_levels(value)
    }
}

impl From<StockLedger> for Vec<StockLevel> {
    fn from(value: StockLedger) -> Self {
        value.levels.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{FixedBreakpointPolicy, MinimumThresholdPolicy, StockPolicy};
    use proptest::prelude::*;

    fn liters(l: f64) -> Volume {
        Volume::from_liters(l).unwrap()
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn seeded_ledger() -> StockLedger {
        let now = test_time();
        let p = MinimumThresholdPolicy;
        StockLedger::from_levels([
            StockLevel::new(BloodType::APositive, liters(45.0), liters(30.0), &p, now),
            StockLevel::new(BloodType::ANegative, liters(12.0), liters(20.0), &p, now),
            StockLevel::new(BloodType::BPositive, liters(38.0), liters(25.0), &p, now),
            StockLevel::new(BloodType::BNegative, liters(18.0), liters(15.0), &p, now),
            StockLevel::new(BloodType::AbPositive, liters(22.0), liters(15.0), &p, now),
            StockLevel::new(BloodType::AbNegative, liters(8.0), liters(10.0), &p, now),
            StockLevel::new(BloodType::OPositive, liters(55.0), liters(40.0), &p, now),
            StockLevel::new(BloodType::ONegative, liters(14.0), liters(25.0), &p, now),
        ])
        .unwrap()
    }

    #[test]
    fn add_increases_quantity_and_reclassifies() {
        let mut ledger = seeded_ledger();
        assert_eq!(ledger.get(BloodType::ANegative).unwrap().status(), StockStatus::Low);

        let updated = ledger
            .adjust_quantity(&MinimumThresholdPolicy, BloodType::ANegative, liters(9.0), StockOperation::Add, test_time())
            .unwrap();

        assert_eq!(updated.quantity(), liters(21.0));
        assert_eq!(updated.status(), StockStatus::Stable);
        assert_eq!(ledger.get(BloodType::ANegative).unwrap(), &updated);
    }

    #[test]
    fn subtract_clamps_at_zero() {
        let mut ledger = seeded_ledger();
        let updated = ledger
            .adjust_quantity(&MinimumThresholdPolicy, BloodType::AbNegative, liters(100.0), StockOperation::Subtract, test_time())
            .unwrap();
        assert_eq!(updated.quantity(), Volume::ZERO);
        assert_eq!(updated.status(), StockStatus::Critical);
    }

    #[test]
    fn adjust_updates_last_updated() {
        let mut ledger = seeded_ledger();
        let later = test_time() + chrono::Duration::minutes(5);
        let updated = ledger
            .adjust_quantity(&MinimumThresholdPolicy, BloodType::OPositive, liters(0.45), StockOperation::Add, later)
            .unwrap();
        assert_eq!(updated.last_updated(), later);
    }

    #[test]
    fn unknown_blood_type_is_not_found_and_nothing_changes() {
        let now = test_time();
        let mut ledger = StockLedger::from_levels([StockLevel::new(
            BloodType::OPositive,
            liters(10.0),
            liters(5.0),
            &MinimumThresholdPolicy,
            now,
        )])
        .unwrap();
        let before = ledger.clone();

        let err = ledger
            .adjust_quantity(&MinimumThresholdPolicy, BloodType::ONegative, liters(1.0), StockOperation::Add, now)
            .unwrap_err();
        assert!(err.is_not_found());
        let err = ledger
            .set_quantity(&MinimumThresholdPolicy, BloodType::ONegative, 3.0, now)
            .unwrap_err();
        assert!(err.is_not_found());

        assert_eq!(ledger, before);
    }

    #[test]
    fn set_quantity_rejects_negative_input() {
        let mut ledger = seeded_ledger();
        let before = ledger.clone();
        let err = ledger
            .set_quantity(&MinimumThresholdPolicy, BloodType::APositive, -1.0, test_time())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(ledger, before);
    }

    #[test]
    fn set_quantity_overwrites_and_reclassifies() {
        let mut ledger = seeded_ledger();
        let updated = ledger
            .set_quantity(&MinimumThresholdPolicy, BloodType::APositive, 15.0, test_time())
            .unwrap();
        assert_eq!(updated.quantity(), liters(15.0));
        assert_eq!(updated.status(), StockStatus::Critical);
    }

    #[test]
    fn critical_and_low_partitions_seed_data() {
        let mut ledger = seeded_ledger();
        let alerts = ledger.critical_and_low();
        let critical: Vec<_> = alerts.critical.iter().map(|a| a.blood_type).collect();
        let low: Vec<_> = alerts.low.iter().map(|a| a.blood_type).collect();
        assert!(critical.is_empty());
        assert_eq!(low, vec![BloodType::ANegative, BloodType::AbNegative, BloodType::ONegative]);

        ledger
            .set_quantity(&MinimumThresholdPolicy, BloodType::ONegative, 12.5, test_time())
            .unwrap();
        let alerts = ledger.critical_and_low();

        let critical: Vec<_> = alerts.critical.iter().map(|a| a.blood_type).collect();
        let low: Vec<_> = alerts.low.iter().map(|a| a.blood_type).collect();
        assert_eq!(critical, vec![BloodType::ONegative]);
        assert_eq!(low, vec![BloodType::ANegative, BloodType::AbNegative]);
        assert!(alerts.critical.iter().all(|a| a.severity == StockStatus::Critical));
        assert!(alerts.low.iter().all(|a| a.severity == StockStatus::Low));
    }

    #[test]
    fn statistics_count_every_record_once() {
        let ledger = seeded_ledger();
        let stats = ledger.statistics();
        assert_eq!(stats.critical + stats.low + stats.stable + stats.high, 8);
        assert_eq!(stats.total, liters(212.0));
    }

    #[test]
    fn reclassify_switches_policy() {
        let mut ledger = seeded_ledger();
        ledger.reclassify(&FixedBreakpointPolicy::default());
        assert_eq!(ledger.get(BloodType::OPositive).unwrap().status(), StockStatus::Stable);
        assert_eq!(ledger.get(BloodType::AbNegative).unwrap().status(), StockStatus::Critical);
        assert_eq!(ledger.get(BloodType::APositive).unwrap().status(), StockStatus::Low);
    }

    #[test]
    fn duplicate_records_are_rejected() {
        let now = test_time();
        let level = StockLevel::new(BloodType::OPositive, liters(1.0), liters(1.0), &MinimumThresholdPolicy, now);
        let err = StockLedger::from_levels([level.clone(), level]).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn serializes_as_a_list_of_records() {
        let ledger = seeded_ledger();
        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 8);
        assert_eq!(json[0]["blood_type"], "A+");
        assert_eq!(json[0]["status"], "stable");
        let back: StockLedger = serde_json::from_value(json).unwrap();
        assert_eq!(back, ledger);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Adjust(usize, u64, bool),
        Set(usize, i64),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..8, 0u64..200_000u64, any::<bool>()).prop_map(|(i, d, add)| Op::Adjust(i, d, add)),
            (0usize..8, -50_000i64..200_000i64).prop_map(|(i, q)| Op::Set(i, q)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: quantities track a clamped integer model and never go negative,
        /// and statuses always match the policy.
        #[test]
        fn quantity_never_negative_and_status_is_derived(ops in prop::collection::vec(op_strategy(), 1..40)) {
            let policy = StockPolicy::default();
            let mut ledger = seeded_ledger();
            let mut model: Vec<i64> = BloodType::ALL
                .iter()
                .map(|t| ledger.get(*t).unwrap().quantity().millilitres() as i64)
                .collect();

            for op in ops {
                match op {
                    Op::Adjust(i, delta, add) => {
                        let op = if add { StockOperation::Add } else { StockOperation::Subtract };
                        ledger.adjust_quantity(&policy, BloodType::ALL[i], Volume::from_millilitres(delta), op, test_time()).unwrap();
                        let signed = if add { delta as i64 } else { -(delta as i64) };
                        model[i] = (model[i] + signed).max(0);
                    }
                    Op::Set(i, ml) => {
                        let result = ledger.set_quantity(&policy, BloodType::ALL[i], ml as f64 / 1000.0, test_time());
                        if ml < 0 {
                            prop_assert!(result.is_err());
                        } else {
                            prop_assert!(result.is_ok());
                            model[i] = ml;
                        }
                    }
                }
            }

            for (i, t) in BloodType::ALL.iter().enumerate() {
                let level = ledger.get(*t).unwrap();
                prop_assert_eq!(level.quantity().millilitres() as i64, model[i]);
                prop_assert_eq!(level.status(), policy.classify(level.quantity(), level.min_quantity()));
            }
        }

        /// Property: alert lists are disjoint and cover exactly the alerting records.
        #[test]
        fn alerts_cover_exactly_alerting_records(quantities in prop::collection::vec(0u64..60_000u64, 8)) {
            let policy = MinimumThresholdPolicy;
            let mut ledger = seeded_ledger();
            for (t, q) in BloodType::ALL.iter().zip(quantities) {
                ledger.set_quantity(&policy, *t, q as f64 / 1000.0, test_time()).unwrap();
            }

            let alerts = ledger.critical_and_low();
            for a in &alerts.critical {
                prop_assert!(!alerts.low.iter().any(|l| l.blood_type == a.blood_type));
            }
            let mut listed: Vec<BloodType> = alerts.critical.iter().chain(alerts.low.iter()).map(|a| a.blood_type).collect();
            listed.sort();
            let expected: Vec<BloodType> = ledger.levels().filter(|l| l.status().is_alert()).map(|l| l.blood_type()).collect();
            prop_assert_eq!(listed, expected);
        }
    }
}

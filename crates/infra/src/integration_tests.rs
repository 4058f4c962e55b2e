//! End-to-end tests across services, the transaction boundary and the
//! JSON file store.
//!
//! Verifies:
//! - A committed donation survives a restart with the file store
//! - A commit that fails to persist leaves the file store at the previous commit
//! - Unknown blood types never touch stock
//! - Stock quantities stay non-negative through arbitrary service calls

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use proptest::prelude::*;

    use hemolink_core::{BloodType, DomainError, Entity, Volume};
    use hemolink_donations::NewDonation;
    use hemolink_stock::{StockOperation, StockPolicy};

    use crate::dataset::Dataset;
    use crate::error::ServiceError;
    use crate::services::{DonationRecorder, StockService};
    use crate::store::{DOCUMENT_FILE, JsonFileStore, Store};
    use crate::Database;

    fn file_db(dir: &std::path::Path) -> Arc<Database> {
        let store: Arc<dyn Store> = Arc::new(JsonFileStore::open(dir).unwrap());
        Arc::new(Database::open(store, StockPolicy::default(), true).unwrap())
    }

    #[test]
    fn file_store_round_trips_a_committed_donation() {
        let dir = tempfile::tempdir().unwrap();

        let (donor_id, expected) = {
            let db = file_db(dir.path());
            let donor = db.read(|d| d.donors[0].clone()).unwrap();
            let recorder = DonationRecorder::new(db.clone(), 100);
            recorder
                .record(NewDonation {
                    donor_id: *donor.id(),
                    blood_type: None,
                    volume_ml: 400,
                    date: None,
                    time: None,
                    status: None,
                    vitals: None,
                    notes: Some("after restart".to_string()),
                })
                .unwrap();
            (*donor.id(), db.read(Dataset::clone).unwrap())
        };

        let raw = std::fs::read(dir.path().join(DOCUMENT_FILE)).unwrap();
        let document: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        for key in crate::store::DATASET_KEYS {
            assert!(document.get(key).is_some(), "missing {key}");
        }

        let reopened = file_db(dir.path());
        let loaded = reopened.read(Dataset::clone).unwrap();
        assert_eq!(loaded, expected);

        let donor = loaded.donor(donor_id).unwrap();
        assert_eq!(donor.total_donations(), 6);
        assert_eq!(
            loaded.stock.get(BloodType::OPositive).unwrap().quantity(),
            Volume::from_millilitres(55_400)
        );
    }

    fn donation_of(donor_id: hemolink_core::DonorId) -> NewDonation {
        NewDonation {
            donor_id,
            blood_type: Some(BloodType::OPositive),
            volume_ml: 450,
            date: None,
            time: None,
            status: None,
            vitals: None,
            notes: None,
        }
    }

    #[test]
    fn failed_commit_leaves_disk_at_last_committed_dataset() {
        let dir = tempfile::tempdir().unwrap();

        let committed = {
            let db = file_db(dir.path());
            let donor_id = *db.read(|d| d.donors[0].clone()).unwrap().id();
            let recorder = DonationRecorder::new(db.clone(), 100);
            recorder.record(donation_of(donor_id)).unwrap();
            let committed = db.read(Dataset::clone).unwrap();

            // Occupy the temp path so the next commit cannot be staged.
            let temp = dir.path().join("hemolink.json.tmp");
            std::fs::create_dir(&temp).unwrap();
            std::fs::write(temp.join("occupied"), b"x").unwrap();

            let err = recorder.record(donation_of(donor_id)).unwrap_err();
            assert!(matches!(err, ServiceError::Store(_)));
            assert_eq!(db.read(Dataset::clone).unwrap(), committed);

            std::fs::remove_dir_all(&temp).unwrap();
            committed
        };

        let reopened = file_db(dir.path());
        let loaded = reopened.read(Dataset::clone).unwrap();
        assert_eq!(loaded, committed);
        assert_eq!(loaded.donations.len(), 2);
        assert_eq!(
            loaded.stock.get(BloodType::OPositive).unwrap().quantity(),
            Volume::from_millilitres(55_450)
        );
    }

    #[test]
    fn unknown_blood_type_leaves_stock_unchanged() {
        let db = Arc::new(Database::in_memory(StockPolicy::default(), true).unwrap());
        let before = db.read(|d| d.stock.clone()).unwrap();

        let parsed = "Z+".parse::<BloodType>();
        assert!(matches!(parsed, Err(DomainError::Validation(_))));

        // A row missing from the ledger is reported as not found.
        let err = db
            .transaction(|data, policy| {
                data.stock = hemolink_stock::StockLedger::from_levels(
                    data.stock
                        .levels()
                        .filter(|l| l.blood_type() != BloodType::AbNegative)
                        .cloned()
                        .collect::<Vec<_>>(),
                )?;
                data.stock.adjust_quantity(
                    policy,
                    BloodType::AbNegative,
                    Volume::from_whole_liters(1),
                    StockOperation::Add,
                    Utc::now(),
                )?;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound(_))));
        assert_eq!(db.read(|d| d.stock.clone()).unwrap(), before);
    }

    #[derive(Debug, Clone)]
    enum Call {
        Adjust(usize, u32, bool),
        Set(usize, u32),
    }

    fn call_strategy() -> impl Strategy<Value = Call> {
        prop_oneof![
            (0usize..8, 0u32..100_000, any::<bool>()).prop_map(|(t, ml, add)| Call::Adjust(t, ml, add)),
            (0usize..8, 0u32..100_000).prop_map(|(t, ml)| Call::Set(t, ml)),
        ]
    }

    proptest! {
        #[test]
        fn service_calls_never_drive_stock_negative(calls in prop::collection::vec(call_strategy(), 1..40)) {
            let db = Arc::new(Database::in_memory(StockPolicy::default(), false).unwrap());
            let stock = StockService::new(db);
            for call in calls {
                match call {
                    Call::Adjust(t, ml, add) => {
                        let op = if add { StockOperation::Add } else { StockOperation::Subtract };
                        stock.adjust(BloodType::ALL[t], f64::from(ml) / 1000.0, op).unwrap();
                    }
                    Call::Set(t, ml) => {
                        stock.set(BloodType::ALL[t], f64::from(ml) / 1000.0).unwrap();
                    }
                }
            }
            for level in stock.list().unwrap() {
                prop_assert!(level.quantity() >= Volume::ZERO);
                prop_assert_eq!(
                    level.status(),
                    hemolink_stock::StatusPolicy::classify(&StockPolicy::default(), level.quantity(), level.min_quantity())
                );
            }
        }
    }
}

//! Transactional access to the dataset.
//!
//! ```text
//! transaction(f)
//!   1. take the writer lock
//!   2. copy the committed dataset
//!   3. run f against the copy (any error: drop the copy, nothing changes)
//!   4. persist the copy to the store (error: drop the copy, nothing changes)
//!   5. swap the copy in as the committed dataset
//! ```
//!
//! The writer lock is held across steps 2-5, so mutations are serialized and
//! concurrent donations can never lose each other's stock credit. Readers
//! only ever see committed state.

use std::sync::{Arc, RwLock};

use chrono::Utc;
use hemolink_stock::StockPolicy;

use crate::config::AppConfig;
use crate::dataset::Dataset;
use crate::error::ServiceResult;
use crate::seed;
use crate::store::{InMemoryStore, JsonFileStore, Store, StoreError};

pub struct Database {
    store: Arc<dyn Store>,
    policy: StockPolicy,
    state: RwLock<Dataset>,
}

impl core::fmt::Debug for Database {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Database")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Load the dataset from `store`, or initialise it when the store is empty.
    ///
    /// Stored statuses are recomputed under `policy` on load, and blood types
    /// missing from the stored ledger get a zeroed row. An empty store
    /// gets the sample dataset when `seed` is set, otherwise zeroed stock rows.
    pub fn open(store: Arc<dyn Store>, policy: StockPolicy, seed: bool) -> ServiceResult<Self> {
        let now = Utc::now();
        let dataset = match Dataset::load(store.as_ref())? {
            Some(mut dataset) => {
                let (stock, added) = seed::fill_missing_rows(&dataset.stock, &policy, now)?;
                if !added.is_empty() {
                    tracing::warn!(missing = ?added, "stored stock lacks blood types; adding them empty");
                    dataset.stock = stock;
                    dataset.save(store.as_ref())?;
                }
                dataset.stock.reclassify(&policy);
                tracing::info!(
                    donors = dataset.donors.len(),
                    donations = dataset.donations.len(),
                    "loaded dataset"
                );
                dataset
            }
            None => {
                let dataset = if seed {
                    tracing::info!("empty store; loading sample data");
                    seed::sample_dataset(&policy, now)?
                } else {
                    tracing::info!("empty store; creating empty stock rows");
                    Dataset {
                        stock: seed::stock_ledger(&policy, false, now)?,
                        ..Dataset::default()
                    }
                };
                dataset.save(store.as_ref())?;
                dataset
            }
        };

        Ok(Self {
            store,
            policy,
            state: RwLock::new(dataset),
        })
    }

    pub fn in_memory(policy: StockPolicy, seed: bool) -> ServiceResult<Self> {
        Self::open(Arc::new(InMemoryStore::new()), policy, seed)
    }

    /// Pick the backend from configuration.
    pub fn from_config(config: &AppConfig) -> ServiceResult<Self> {
        let store: Arc<dyn Store> = match &config.data_dir {
            Some(dir) => {
                tracing::info!(dir = %dir.display(), "using json file store");
                Arc::new(JsonFileStore::open(dir)?)
            }
            None => {
                tracing::warn!("HEMOLINK_DATA_DIR not set; data will not survive a restart");
                Arc::new(InMemoryStore::new())
            }
        };
        Self::open(store, config.status_policy, config.seed)
    }

    pub fn policy(&self) -> &StockPolicy {
        &self.policy
    }

    /// Run `f` against the committed dataset.
    pub fn read<R>(&self, f: impl FnOnce(&Dataset) -> R) -> ServiceResult<R> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(f(&state))
    }

    /// Run `f` as one atomic unit of work. See the module docs.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&mut Dataset, &StockPolicy) -> ServiceResult<T>,
    ) -> ServiceResult<T> {
        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;

        let mut draft = state.clone();
        let out = match f(&mut draft, &self.policy) {
            Ok(out) => out,
            Err(e) => {
                tracing::debug!(error = %e, "transaction rolled back");
                return Err(e);
            }
        };

        if let Err(e) = draft.save(self.store.as_ref()) {
            tracing::error!(error = %e, "failed to persist transaction; rolled back");
            return Err(e.into());
        }

        *state = draft;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use hemolink_core::{BloodType, DomainError, Volume};
    use hemolink_stock::{FixedBreakpointPolicy, StockOperation, StockStatus};
    use serde_json::Value as JsonValue;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Delegates to an in-memory store but can be told to fail writes.
    #[derive(Default)]
    struct FlakyStore {
        inner: InMemoryStore,
        fail_writes: AtomicBool,
    }

    impl Store for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
            self.inner.get(key)
        }

        fn set_all(&self, entries: Vec<(&'static str, JsonValue)>) -> Result<(), StoreError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::io(
                    "hemolink_stock",
                    std::io::Error::other("disk full"),
                ));
            }
            self.inner.set_all(entries)
        }
    }

    fn o_pos(db: &Database) -> Volume {
        db.read(|d| d.stock.get(BloodType::OPositive).unwrap().quantity())
            .unwrap()
    }

    fn add_o_pos(db: &Database, liters: u64) -> ServiceResult<()> {
        db.transaction(|data, policy| {
            data.stock.adjust_quantity(
                policy,
                BloodType::OPositive,
                Volume::from_whole_liters(liters),
                StockOperation::Add,
                Utc::now(),
            )?;
            Ok(())
        })
    }

    #[test]
    fn seeds_an_empty_store_once() {
        let store = Arc::new(InMemoryStore::new());
        let db = Database::open(store.clone(), StockPolicy::default(), true).unwrap();
        assert_eq!(db.read(|d| d.donors.len()).unwrap(), 1);
        assert_eq!(store.len(), 5);

        add_o_pos(&db, 1).unwrap();
        let reopened = Database::open(store, StockPolicy::default(), true).unwrap();
        assert_eq!(o_pos(&reopened), Volume::from_whole_liters(56));
        assert_eq!(reopened.read(|d| d.donors.len()).unwrap(), 1);
    }

    #[test]
    fn stored_ledger_missing_blood_types_is_completed() {
        let store = Arc::new(InMemoryStore::new());
        Database::open(store.clone(), StockPolicy::default(), true).unwrap();

        let stock = store.get(crate::store::STOCK_KEY).unwrap().unwrap();
        let partial: Vec<JsonValue> = stock
            .as_array()
            .unwrap()
            .iter()
            .filter(|row| row["blood_type"] != "AB-" && row["blood_type"] != "O-")
            .cloned()
            .collect();
        store
            .set(crate::store::STOCK_KEY, JsonValue::Array(partial))
            .unwrap();

        let db = Database::open(store.clone(), StockPolicy::default(), true).unwrap();
        let ab_neg = db
            .read(|d| {
                assert_eq!(d.stock.len(), 8);
                d.stock.get(BloodType::AbNegative).unwrap().clone()
            })
            .unwrap();
        assert_eq!(ab_neg.quantity(), Volume::ZERO);
        assert_eq!(ab_neg.min_quantity(), Volume::from_whole_liters(10));
        assert_eq!(ab_neg.status(), StockStatus::Critical);
        assert_eq!(o_pos(&db), Volume::from_whole_liters(55));

        let stored = store.get(crate::store::STOCK_KEY).unwrap().unwrap();
        assert_eq!(stored.as_array().unwrap().len(), 8);

        db.transaction(|data, policy| {
            data.stock.adjust_quantity(
                policy,
                BloodType::ONegative,
                Volume::from_whole_liters(2),
                StockOperation::Add,
                Utc::now(),
            )?;
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn unseeded_store_gets_zeroed_stock_rows_only() {
        let db = Database::in_memory(StockPolicy::default(), false).unwrap();
        db.read(|d| {
            assert_eq!(d.stock.len(), 8);
            assert!(d.donors.is_empty());
            assert!(d.campaigns.is_empty());
        })
        .unwrap();
        assert_eq!(o_pos(&db), Volume::ZERO);
    }

    #[test]
    fn closure_error_leaves_state_unchanged() {
        let db = Database::in_memory(StockPolicy::default(), true).unwrap();
        let before = db.read(Dataset::clone).unwrap();

        let err = db
            .transaction(|data, policy| {
                data.stock.adjust_quantity(
                    policy,
                    BloodType::OPositive,
                    Volume::from_whole_liters(5),
                    StockOperation::Add,
                    Utc::now(),
                )?;
                Err::<(), _>(DomainError::validation("abort after a partial write").into())
            })
            .unwrap_err();

        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));
        assert_eq!(db.read(Dataset::clone).unwrap(), before);
    }

    #[test]
    fn persist_failure_rolls_back() {
        let store = Arc::new(FlakyStore::default());
        let db = Database::open(store.clone(), StockPolicy::default(), true).unwrap();

        store.fail_writes.store(true, Ordering::SeqCst);
        let err = add_o_pos(&db, 3).unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::Io { .. })));
        assert_eq!(o_pos(&db), Volume::from_whole_liters(55));

        store.fail_writes.store(false, Ordering::SeqCst);
        add_o_pos(&db, 3).unwrap();
        assert_eq!(o_pos(&db), Volume::from_whole_liters(58));
    }

    #[test]
    fn reopening_under_another_policy_reclassifies() {
        let store = Arc::new(InMemoryStore::new());
        Database::open(store.clone(), StockPolicy::default(), true).unwrap();

        let db = Database::open(
            store,
            StockPolicy::FixedBreakpoints(FixedBreakpointPolicy::default()),
            true,
        )
        .unwrap();
        let status = db
            .read(|d| d.stock.get(BloodType::OPositive).unwrap().status())
            .unwrap();
        assert_eq!(status, StockStatus::Stable);
    }

    #[test]
    fn concurrent_transactions_do_not_lose_updates() {
        let db = Arc::new(Database::in_memory(StockPolicy::default(), true).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db = db.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        add_o_pos(&db, 1).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(o_pos(&db), Volume::from_whole_liters(55 + 200));
    }
}

//! The full persisted state of the service.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use hemolink_core::{
    AppointmentId, CampaignId, DomainError, DomainResult, DonationId, DonorId, Entity,
};
use hemolink_donations::Donation;
use hemolink_donors::Donor;
use hemolink_scheduling::{Appointment, Campaign};
use hemolink_stock::StockLedger;

use crate::store::{
    APPOINTMENTS_KEY, CAMPAIGNS_KEY, DATASET_KEYS, DONATIONS_KEY, DONORS_KEY, STOCK_KEY, Store,
    StoreError,
};

/// Every collection, as one value a transaction can copy and swap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub stock: StockLedger,
    pub donors: Vec<Donor>,
    pub donations: Vec<Donation>,
    pub appointments: Vec<Appointment>,
    pub campaigns: Vec<Campaign>,
}

impl Dataset {
    /// Read every collection. Returns `None` when the store holds none of the
    /// dataset keys (first start); a single missing key reads as empty.
    pub fn load<S: Store + ?Sized>(store: &S) -> Result<Option<Self>, StoreError> {
        let mut present = false;
        for key in DATASET_KEYS {
            if store.get(key)?.is_some() {
                present = true;
                break;
            }
        }
        if !present {
            return Ok(None);
        }

        Ok(Some(Self {
            stock: read_key(store, STOCK_KEY)?,
            donors: read_key(store, DONORS_KEY)?,
            donations: read_key(store, DONATIONS_KEY)?,
            appointments: read_key(store, APPOINTMENTS_KEY)?,
            campaigns: read_key(store, CAMPAIGNS_KEY)?,
        }))
    }

    /// Rewrite every collection as one batch.
    pub fn save<S: Store + ?Sized>(&self, store: &S) -> Result<(), StoreError> {
        store.set_all(vec![
            (STOCK_KEY, to_json(STOCK_KEY, &self.stock)?),
            (DONORS_KEY, to_json(DONORS_KEY, &self.donors)?),
            (DONATIONS_KEY, to_json(DONATIONS_KEY, &self.donations)?),
            (APPOINTMENTS_KEY, to_json(APPOINTMENTS_KEY, &self.appointments)?),
            (CAMPAIGNS_KEY, to_json(CAMPAIGNS_KEY, &self.campaigns)?),
        ])
    }

    pub fn donor(&self, id: DonorId) -> DomainResult<&Donor> {
        find(&self.donors, &id, "donor")
    }

    pub fn donor_mut(&mut self, id: DonorId) -> DomainResult<&mut Donor> {
        find_mut(&mut self.donors, &id, "donor")
    }

    pub fn donation(&self, id: DonationId) -> DomainResult<&Donation> {
        find(&self.donations, &id, "donation")
    }

    pub fn donation_mut(&mut self, id: DonationId) -> DomainResult<&mut Donation> {
        find_mut(&mut self.donations, &id, "donation")
    }

    pub fn appointment_mut(&mut self, id: AppointmentId) -> DomainResult<&mut Appointment> {
        find_mut(&mut self.appointments, &id, "appointment")
    }

    pub fn campaign(&self, id: CampaignId) -> DomainResult<&Campaign> {
        find(&self.campaigns, &id, "campaign")
    }

    pub fn campaign_mut(&mut self, id: CampaignId) -> DomainResult<&mut Campaign> {
        find_mut(&mut self.campaigns, &id, "campaign")
    }
}

fn find<'a, E>(items: &'a [E], id: &E::Id, what: &str) -> DomainResult<&'a E>
where
    E: Entity,
    E::Id: PartialEq + core::fmt::Display,
{
    items
        .iter()
        .find(|e| e.id() == id)
        .ok_or_else(|| DomainError::not_found(format!("{what} {id}")))
}

fn find_mut<'a, E>(items: &'a mut [E], id: &E::Id, what: &str) -> DomainResult<&'a mut E>
where
    E: Entity,
    E::Id: PartialEq + core::fmt::Display,
{
    items
        .iter_mut()
        .find(|e| e.id() == id)
        .ok_or_else(|| DomainError::not_found(format!("{what} {id}")))
}

fn read_key<S, T>(store: &S, key: &'static str) -> Result<T, StoreError>
where
    S: Store + ?Sized,
    T: DeserializeOwned + Default,
{
    match store.get(key)? {
        Some(value) => serde_json::from_value(value).map_err(|e| StoreError::serialization(key, e)),
        None => Ok(T::default()),
    }
}

fn to_json<T: Serialize>(key: &'static str, value: &T) -> Result<JsonValue, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::serialization(key, e))
}

use std::sync::Arc;

use chrono::Utc;

use hemolink_core::{DomainError, DomainResult, DonorId, Entity};
use hemolink_donors::{Donor, DonorPatch, NewDonor};

use crate::database::Database;
use crate::dataset::Dataset;
use crate::error::ServiceResult;

#[derive(Debug, Clone)]
pub struct DonorService {
    db: Arc<Database>,
}

impl DonorService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn list(&self) -> ServiceResult<Vec<Donor>> {
        self.db.read(|d| d.donors.clone())
    }

    pub fn get(&self, id: DonorId) -> ServiceResult<Donor> {
        Ok(self.db.read(|d| d.donor(id).cloned())??)
    }

    /// Register a new donor. Emails are unique (case-insensitive).
    pub fn register(&self, input: NewDonor) -> ServiceResult<Donor> {
        let donor = self.db.transaction(|data, _| {
            let donor = Donor::register(DonorId::new(), input, Utc::now())?;
            ensure_email_free(data, donor.email(), None)?;
            data.donors.push(donor.clone());
            Ok(donor)
        })?;
        tracing::info!(donor_id = %donor.id(), blood_type = %donor.blood_type(), "donor registered");
        Ok(donor)
    }

    pub fn update(&self, id: DonorId, patch: DonorPatch) -> ServiceResult<Donor> {
        let donor = self.db.transaction(|data, _| {
            let mut donor = data.donor(id)?.clone();
            donor.apply_patch(patch, Utc::now().date_naive())?;
            ensure_email_free(data, donor.email(), Some(id))?;
            let slot = data.donor_mut(id)?;
            *slot = donor.clone();
            Ok(donor)
        })?;
        tracing::info!(donor_id = %id, active = donor.is_active(), "donor updated");
        Ok(donor)
    }
}

fn ensure_email_free(data: &Dataset, email: &str, except: Option<DonorId>) -> DomainResult<()> {
    let taken = data
        .donors
        .iter()
        .filter(|d| Some(*d.id()) != except)
        .any(|d| d.email().eq_ignore_ascii_case(email));
    if taken {
        return Err(DomainError::conflict(format!("email {email} is already registered")));
    }
    Ok(())
}

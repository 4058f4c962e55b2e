//! Donation recording.
//!
//! A completed donation touches three collections in one transaction:
//! 1. the donation is appended to the history (or marked completed)
//! 2. the stock row of its blood type is credited with the collected volume
//! 3. the donor's counter, points and last donation date are updated
//!
//! If any step fails nothing is committed.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use hemolink_core::{DomainError, DomainResult, DonationId, DonorId, Entity};
use hemolink_donations::{Donation, NewDonation};
use hemolink_donors::Donor;
use hemolink_stock::{StockLevel, StockOperation, StockPolicy};

use crate::database::Database;
use crate::dataset::Dataset;
use crate::error::ServiceResult;

/// Committed outcome of a recorder call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDonation {
    pub donation: Donation,
    pub donor: Donor,
    /// Stock row after the credit; `None` when the donation is not completed.
    pub stock: Option<StockLevel>,
}

#[derive(Debug, Clone)]
pub struct DonationRecorder {
    db: Arc<Database>,
    reward: u32,
}

impl DonationRecorder {
    /// `reward` is the number of points credited per completed donation.
    pub fn new(db: Arc<Database>, reward: u32) -> Self {
        Self { db, reward }
    }

    pub fn list(&self) -> ServiceResult<Vec<Donation>> {
        self.db.read(|d| d.donations.clone())
    }

    pub fn list_by_donor(&self, donor_id: DonorId) -> ServiceResult<Vec<Donation>> {
        self.db.read(|d| {
            d.donations
                .iter()
                .filter(|donation| donation.donor_id() == donor_id)
                .cloned()
                .collect()
        })
    }

    pub fn get(&self, id: DonationId) -> ServiceResult<Donation> {
        Ok(self.db.read(|d| d.donation(id).cloned())??)
    }

    /// Record a donation. Completed donations (the default) credit stock and
    /// donor immediately; scheduled ones wait for [`complete`](Self::complete).
    pub fn record(&self, input: NewDonation) -> ServiceResult<RecordedDonation> {
        let reward = self.reward;
        let recorded = self.db.transaction(|data, policy| {
            let now = Utc::now();
            let donor = data.donor(input.donor_id)?;
            if !donor.is_active() {
                return Err(DomainError::validation("donor is inactive").into());
            }
            let donation = Donation::record(
                DonationId::new(),
                input,
                donor.name(),
                donor.blood_type(),
                now,
            )?;

            let stock = if donation.is_completed() {
                Some(credit(data, policy, &donation, reward, now)?)
            } else {
                None
            };
            data.donations.push(donation.clone());

            Ok(RecordedDonation {
                donor: data.donor(donation.donor_id())?.clone(),
                donation,
                stock,
            })
        })?;

        log_recorded("donation recorded", &recorded);
        Ok(recorded)
    }

    /// Complete a scheduled donation and apply its credits.
    pub fn complete(&self, id: DonationId) -> ServiceResult<RecordedDonation> {
        let reward = self.reward;
        let recorded = self.db.transaction(|data, policy| {
            let now = Utc::now();
            let donation = data.donation_mut(id)?;
            donation.complete(now.date_naive())?;
            let donation = donation.clone();

            let stock = credit(data, policy, &donation, reward, now)?;
            Ok(RecordedDonation {
                donor: data.donor(donation.donor_id())?.clone(),
                donation,
                stock: Some(stock),
            })
        })?;

        log_recorded("donation completed", &recorded);
        Ok(recorded)
    }

    /// Cancel a scheduled donation. No credits are involved.
    pub fn cancel(&self, id: DonationId) -> ServiceResult<Donation> {
        let donation = self.db.transaction(|data, _| {
            let donation = data.donation_mut(id)?;
            donation.cancel()?;
            Ok(donation.clone())
        })?;
        tracing::info!(donation_id = %id, "donation cancelled");
        Ok(donation)
    }
}

fn credit(
    data: &mut Dataset,
    policy: &StockPolicy,
    donation: &Donation,
    reward: u32,
    now: DateTime<Utc>,
) -> DomainResult<StockLevel> {
    data.donor_mut(donation.donor_id())?
        .credit_donation(donation.date(), reward)?;
    data.stock.adjust_quantity(
        policy,
        donation.blood_type(),
        donation.volume(),
        StockOperation::Add,
        now,
    )
}

fn log_recorded(message: &str, recorded: &RecordedDonation) {
    tracing::info!(
        donation_id = %recorded.donation.id(),
        donor_id = %recorded.donor.id(),
        blood_type = %recorded.donation.blood_type(),
        volume_ml = recorded.donation.volume_ml(),
        status = recorded.donation.status().as_str(),
        stock_status = recorded.stock.as_ref().map(|s| s.status().as_str()),
        "{}",
        message
    );
}

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use hemolink_core::{BloodType, DomainError, DomainResult, DonationId, DonorId, Entity, Volume};

/// Bag sizes offered by the collection form, in millilitres.
pub const STANDARD_VOLUMES_ML: [u16; 4] = [350, 400, 450, 500];

/// Donation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Scheduled => "scheduled",
            DonationStatus::Completed => "completed",
            DonationStatus::Cancelled => "cancelled",
        }
    }
}

/// Pre-donation screening measurements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    /// g/dL
    pub hemoglobin: Option<f32>,
    /// Free text as read by staff, e.g. `"120/80"`.
    pub blood_pressure: Option<String>,
    /// Beats per minute.
    pub pulse: Option<u16>,
    /// Degrees Celsius.
    pub temperature: Option<f32>,
}

impl Vitals {
    fn validate(&self) -> DomainResult<()> {
        if let Some(hb) = self.hemoglobin {
            if !hb.is_finite() || !(0.0..=30.0).contains(&hb) {
                return Err(DomainError::validation("hemoglobin must be between 0 and 30 g/dL"));
            }
        }
        if let Some(pulse) = self.pulse {
            if !(20..=250).contains(&pulse) {
                return Err(DomainError::validation("pulse must be between 20 and 250 bpm"));
            }
        }
        if let Some(t) = self.temperature {
            if !t.is_finite() || !(30.0..=45.0).contains(&t) {
                return Err(DomainError::validation("temperature must be between 30 and 45 C"));
            }
        }
        Ok(())
    }
}

/// Recording input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDonation {
    pub donor_id: DonorId,
    /// Defaults to the donor's registered blood type.
    pub blood_type: Option<BloodType>,
    pub volume_ml: u16,
    /// Defaults to the recording day.
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    /// `scheduled` or `completed` (the default).
    pub status: Option<DonationStatus>,
    pub vitals: Option<Vitals>,
    pub notes: Option<String>,
}

/// A recorded blood donation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    id: DonationId,
    donor_id: DonorId,
    donor_name: String,
    blood_type: BloodType,
    volume_ml: u16,
    date: NaiveDate,
    time: Option<NaiveTime>,
    status: DonationStatus,
    vitals: Option<Vitals>,
    notes: Option<String>,
    recorded_at: DateTime<Utc>,
}

impl Donation {
    /// Validate input against the donor it is recorded for.
    ///
    /// `donor_name` and `donor_blood_type` come from the donor record; a
    /// donation of a different blood type than the donor's is rejected.
    pub fn record(
        id: DonationId,
        input: NewDonation,
        donor_name: &str,
        donor_blood_type: BloodType,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let blood_type = input.blood_type.unwrap_or(donor_blood_type);
        if blood_type != donor_blood_type {
            return Err(DomainError::validation(format!(
                "donation blood type {blood_type} does not match donor blood type {donor_blood_type}"
            )));
        }

        if !STANDARD_VOLUMES_ML.contains(&input.volume_ml) {
            return Err(DomainError::validation(format!(
                "volume must be one of {STANDARD_VOLUMES_ML:?} ml"
            )));
        }

        let status = input.status.unwrap_or(DonationStatus::Completed);
        if status == DonationStatus::Cancelled {
            return Err(DomainError::validation("a donation cannot be recorded as cancelled"));
        }

        let date = input.date.unwrap_or_else(|| now.date_naive());
        if status == DonationStatus::Completed && date > now.date_naive() {
            return Err(DomainError::validation("a completed donation cannot be dated in the future"));
        }

        if let Some(v) = &input.vitals {
            v.validate()?;
        }

        Ok(Self {
            id,
            donor_id: input.donor_id,
            donor_name: donor_name.to_string(),
            blood_type,
            volume_ml: input.volume_ml,
            date,
            time: input.time,
            status,
            vitals: input.vitals,
            notes: input.notes.filter(|n| !n.trim().is_empty()),
            recorded_at: now,
        })
    }

    pub fn donor_id(&self) -> DonorId {
        self.donor_id
    }

    pub fn donor_name(&self) -> &str {
        &self.donor_name
    }

    pub fn blood_type(&self) -> BloodType {
        self.blood_type
    }

    pub fn volume_ml(&self) -> u16 {
        self.volume_ml
    }

    /// The collected volume in stock units.
    pub fn volume(&self) -> Volume {
        Volume::from_millilitres(u64::from(self.volume_ml))
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> Option<NaiveTime> {
        self.time
    }

    pub fn status(&self) -> DonationStatus {
        self.status
    }

    pub fn vitals(&self) -> Option<&Vitals> {
        self.vitals.as_ref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn is_completed(&self) -> bool {
        self.status == DonationStatus::Completed
    }

    /// Scheduled -> completed. The collection is dated `today`.
    pub fn complete(&mut self, today: NaiveDate) -> DomainResult<()> {
        self.ensure_scheduled("complete")?;
        self.status = DonationStatus::Completed;
        self.date = today;
        Ok(())
    }

    /// Scheduled -> cancelled.
    pub fn cancel(&mut self) -> DomainResult<()> {
        self.ensure_scheduled("cancel")?;
        self.status = DonationStatus::Cancelled;
        Ok(())
    }

    fn ensure_scheduled(&self, action: &str) -> DomainResult<()> {
        if self.status != DonationStatus::Scheduled {
            return Err(DomainError::conflict(format!(
                "cannot {action} a {} donation",
                self.status.as_str()
            )));
        }
        Ok(())
    }
}

impl Entity for Donation {
    type Id = DonationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn input(donor_id: DonorId) -> NewDonation {
        NewDonation {
            donor_id,
            blood_type: None,
            volume_ml: 450,
            date: None,
            time: None,
            status: None,
            vitals: Some(Vitals {
                hemoglobin: Some(14.2),
                blood_pressure: Some("120/80".to_string()),
                pulse: Some(72),
                temperature: Some(36.5),
            }),
            notes: Some("ok".to_string()),
        }
    }

    #[test]
    fn record_defaults_to_completed_today_with_donor_blood_type() {
        let now = test_time();
        let donation = Donation::record(DonationId::new(), input(DonorId::new()), "Joao", BloodType::OPositive, now).unwrap();
        assert_eq!(donation.status(), DonationStatus::Completed);
        assert_eq!(donation.date(), now.date_naive());
        assert_eq!(donation.blood_type(), BloodType::OPositive);
        assert_eq!(donation.volume(), Volume::from_millilitres(450));
    }

    #[test]
    fn record_rejects_blood_type_mismatch() {
        let mut i = input(DonorId::new());
        i.blood_type = Some(BloodType::ANegative);
        let err = Donation::record(DonationId::new(), i, "Joao", BloodType::OPositive, test_time()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn record_rejects_non_standard_volume() {
        let mut i = input(DonorId::new());
        i.volume_ml = 300;
        assert!(Donation::record(DonationId::new(), i, "Joao", BloodType::OPositive, test_time()).is_err());
    }

    #[test]
    fn record_rejects_cancelled_and_future_completed() {
        let now = test_time();
        let mut cancelled = input(DonorId::new());
        cancelled.status = Some(DonationStatus::Cancelled);
        assert!(Donation::record(DonationId::new(), cancelled, "Joao", BloodType::OPositive, now).is_err());

        let mut future = input(DonorId::new());
        future.date = Some(now.date_naive() + chrono::Duration::days(3));
        assert!(Donation::record(DonationId::new(), future.clone(), "Joao", BloodType::OPositive, now).is_err());

        future.status = Some(DonationStatus::Scheduled);
        assert!(Donation::record(DonationId::new(), future, "Joao", BloodType::OPositive, now).is_ok());
    }

    #[test]
    fn record_rejects_implausible_vitals() {
        let mut i = input(DonorId::new());
        i.vitals = Some(Vitals { pulse: Some(5), ..Vitals::default() });
        assert!(Donation::record(DonationId::new(), i, "Joao", BloodType::OPositive, test_time()).is_err());
    }

    #[test]
    fn scheduled_donation_completes_once() {
        let now = test_time();
        let mut i = input(DonorId::new());
        i.status = Some(DonationStatus::Scheduled);
        let mut donation = Donation::record(DonationId::new(), i, "Joao", BloodType::OPositive, now).unwrap();

        donation.complete(now.date_naive()).unwrap();
        assert!(donation.is_completed());

        assert!(matches!(donation.complete(now.date_naive()), Err(DomainError::Conflict(_))));
        assert!(matches!(donation.cancel(), Err(DomainError::Conflict(_))));
    }

    #[test]
    fn cancelled_donation_cannot_complete() {
        let now = test_time();
        let mut i = input(DonorId::new());
        i.status = Some(DonationStatus::Scheduled);
        let mut donation = Donation::record(DonationId::new(), i, "Joao", BloodType::OPositive, now).unwrap();
        donation.cancel().unwrap();
        assert_eq!(donation.status(), DonationStatus::Cancelled);
        assert!(donation.complete(now.date_naive()).is_err());
    }
}

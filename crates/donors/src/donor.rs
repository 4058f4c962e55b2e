use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use hemolink_core::{BloodType, DomainError, DomainResult, DonorId, Entity};

/// Minimum body weight accepted at registration.
pub const MIN_WEIGHT_KG: u16 = 50;

/// Minimum height accepted at registration.
pub const MIN_HEIGHT_CM: u16 = 150;

/// Loyalty tier, derived from the number of completed donations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonorLevel {
    Starter,
    Bronze,
    Silver,
    Gold,
}

impl DonorLevel {
    pub fn for_donations(total_donations: u32) -> Self {
        match total_donations {
            0 => DonorLevel::Starter,
            1..=4 => DonorLevel::Bronze,
            5..=9 => DonorLevel::Silver,
            _ => DonorLevel::Gold,
        }
    }
}

/// Registration input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDonor {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub blood_type: BloodType,
    pub birth_date: NaiveDate,
    pub weight_kg: u16,
    pub height_cm: u16,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub medical_history: Option<String>,
    pub medications: Option<String>,
    pub allergies: Option<String>,
    /// Last donation made before joining, if any.
    pub last_donation: Option<NaiveDate>,
}

/// Partial update. `None` keeps the existing value.
///
/// Donation counters and points are deliberately absent: they only move
/// through [`Donor::credit_donation`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DonorPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub blood_type: Option<BloodType>,
    pub birth_date: Option<NaiveDate>,
    pub weight_kg: Option<u16>,
    pub height_cm: Option<u16>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub medical_history: Option<String>,
    pub medications: Option<String>,
    pub allergies: Option<String>,
    pub is_active: Option<bool>,
}

/// A registered blood donor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donor {
    id: DonorId,
    name: String,
    email: String,
    phone: String,
    blood_type: BloodType,
    birth_date: NaiveDate,
    weight_kg: u16,
    height_cm: u16,
    address: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
    medical_history: Option<String>,
    medications: Option<String>,
    allergies: Option<String>,
    registered_at: DateTime<Utc>,
    last_donation: Option<NaiveDate>,
    total_donations: u32,
    points: u32,
    is_active: bool,
}

impl Donor {
    /// Validate registration input and create an active donor with no history.
    pub fn register(id: DonorId, input: NewDonor, now: DateTime<Utc>) -> DomainResult<Self> {
        let donor = Self {
            id,
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            phone: input.phone.trim().to_string(),
            blood_type: input.blood_type,
            birth_date: input.birth_date,
            weight_kg: input.weight_kg,
            height_cm: input.height_cm,
            address: input.address,
            city: input.city,
            postal_code: input.postal_code,
            medical_history: input.medical_history,
            medications: input.medications,
            allergies: input.allergies,
            registered_at: now,
            last_donation: input.last_donation,
            total_donations: 0,
            points: 0,
            is_active: true,
        };
        donor.validate(now.date_naive())?;
        Ok(donor)
    }

    /// Carry over donation history from a previous system (seed/import only).
    pub fn with_imported_history(
        mut self,
        total_donations: u32,
        points: u32,
        last_donation: Option<NaiveDate>,
    ) -> Self {
        self.total_donations = total_donations;
        self.points = points;
        self.last_donation = last_donation.or(self.last_donation);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn blood_type(&self) -> BloodType {
        self.blood_type
    }

    pub fn birth_date(&self) -> NaiveDate {
        self.birth_date
    }

    pub fn weight_kg(&self) -> u16 {
        self.weight_kg
    }

    pub fn height_cm(&self) -> u16 {
        self.height_cm
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn postal_code(&self) -> Option<&str> {
        self.postal_code.as_deref()
    }

    pub fn medical_history(&self) -> Option<&str> {
        self.medical_history.as_deref()
    }

    pub fn medications(&self) -> Option<&str> {
        self.medications.as_deref()
    }

    pub fn allergies(&self) -> Option<&str> {
        self.allergies.as_deref()
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    pub fn last_donation(&self) -> Option<NaiveDate> {
        self.last_donation
    }

    pub fn total_donations(&self) -> u32 {
        self.total_donations
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn level(&self) -> DonorLevel {
        DonorLevel::for_donations(self.total_donations)
    }

    /// Apply a patch. Validation runs on the patched copy, so a rejected patch
    /// leaves the donor untouched.
    pub fn apply_patch(&mut self, patch: DonorPatch, today: NaiveDate) -> DomainResult<()> {
        let mut next = self.clone();
        if let Some(v) = patch.name {
            next.name = v.trim().to_string();
        }
        if let Some(v) = patch.email {
            next.email = v.trim().to_string();
        }
        if let Some(v) = patch.phone {
            next.phone = v.trim().to_string();
        }
        if let Some(v) = patch.blood_type {
            // Credited donations and stock were booked under the current type.
            if v != self.blood_type && self.total_donations > 0 {
                return Err(DomainError::conflict(format!(
                    "blood type of a donor with {} donations cannot change",
                    self.total_donations
                )));
            }
            next.blood_type = v;
        }
        if let Some(v) = patch.birth_date {
            next.birth_date = v;
        }
        if let Some(v) = patch.weight_kg {
            next.weight_kg = v;
        }
        if let Some(v) = patch.height_cm {
            next.height_cm = v;
        }
        if patch.address.is_some() {
            next.address = patch.address;
        }
        if patch.city.is_some() {
            next.city = patch.city;
        }
        if patch.postal_code.is_some() {
            next.postal_code = patch.postal_code;
        }
        if patch.medical_history.is_some() {
            next.medical_history = patch.medical_history;
        }
        if patch.medications.is_some() {
            next.medications = patch.medications;
        }
        if patch.allergies.is_some() {
            next.allergies = patch.allergies;
        }
        if let Some(v) = patch.is_active {
            next.is_active = v;
        }

        next.validate(today)?;
        *self = next;
        Ok(())
    }

    /// Record a completed donation: bump the counter, award `reward` points,
    /// and move `last_donation` forward to `date` (never backwards).
    pub fn credit_donation(&mut self, date: NaiveDate, reward: u32) -> DomainResult<()> {
        if !self.is_active {
            return Err(DomainError::validation("donor is inactive"));
        }
        self.total_donations = self.total_donations.saturating_add(1);
        self.points = self.points.saturating_add(reward);
        self.last_donation = Some(match self.last_donation {
            Some(prev) if prev > date => prev,
            _ => date,
        });
        Ok(())
    }

    fn validate(&self, today: NaiveDate) -> DomainResult<()> {
        if self.name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.email.is_empty() || !self.email.contains('@') {
            return Err(DomainError::validation("email must be a valid address"));
        }
        if self.phone.is_empty() {
            return Err(DomainError::validation("phone cannot be empty"));
        }
        if self.birth_date > today {
            return Err(DomainError::validation("birth date cannot be in the future"));
        }
        if self.weight_kg < MIN_WEIGHT_KG {
            return Err(DomainError::validation(format!(
                "weight must be at least {MIN_WEIGHT_KG} kg"
            )));
        }
        if self.height_cm < MIN_HEIGHT_CM {
            return Err(DomainError::validation(format!(
                "height must be at least {MIN_HEIGHT_CM} cm"
            )));
        }
        Ok(())
    }
}

impl Entity for Donor {
    type Id = DonorId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use hemolink_core::{AppointmentId, BloodType, DomainError, DomainResult, DonorId, Entity};

/// Appointment lifecycle.
///
/// `scheduled -> confirmed -> completed`, with `cancelled` reachable from
/// either open state. `completed` and `cancelled` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}

/// Booking input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub donor_id: DonorId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub notes: Option<String>,
}

/// A donor's booked collection slot.
///
/// Donor name, phone and blood type are copied at booking time so the
/// schedule can be printed without joining donors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    id: AppointmentId,
    donor_id: DonorId,
    donor_name: String,
    donor_phone: String,
    blood_type: BloodType,
    date: NaiveDate,
    time: NaiveTime,
    status: AppointmentStatus,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn book(
        id: AppointmentId,
        input: NewAppointment,
        donor_name: &str,
        donor_phone: &str,
        blood_type: BloodType,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if input.date < now.date_naive() {
            return Err(DomainError::validation("appointment date cannot be in the past"));
        }
        Ok(Self {
            id,
            donor_id: input.donor_id,
            donor_name: donor_name.to_string(),
            donor_phone: donor_phone.to_string(),
            blood_type,
            date: input.date,
            time: input.time,
            status: AppointmentStatus::Scheduled,
            notes: input.notes.filter(|n| !n.trim().is_empty()),
            created_at: now,
        })
    }

    pub fn donor_id(&self) -> DonorId {
        self.donor_id
    }

    pub fn donor_name(&self) -> &str {
        &self.donor_name
    }

    pub fn donor_phone(&self) -> &str {
        &self.donor_phone
    }

    pub fn blood_type(&self) -> BloodType {
        self.blood_type
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn status(&self) -> AppointmentStatus {
        self.status
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Move to `status`. Final appointments cannot change; re-applying the
    /// current status is a no-op.
    pub fn transition(&mut self, status: AppointmentStatus) -> DomainResult<()> {
        if self.status == status {
            return Ok(());
        }
        if self.status.is_final() {
            return Err(DomainError::conflict(format!(
                "appointment is already {}",
                self.status.as_str()
            )));
        }
        if status == AppointmentStatus::Scheduled {
            return Err(DomainError::conflict("a confirmed appointment cannot return to scheduled"));
        }
        self.status = status;
        Ok(())
    }
}

impl Entity for Appointment {
    type Id = AppointmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

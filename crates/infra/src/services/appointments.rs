use std::sync::Arc;

use chrono::Utc;

use hemolink_core::{AppointmentId, DomainError, DonorId};
use hemolink_scheduling::{Appointment, AppointmentStatus, NewAppointment};

use crate::database::Database;
use crate::error::ServiceResult;

#[derive(Debug, Clone)]
pub struct AppointmentService {
    db: Arc<Database>,
}

impl AppointmentService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn list(&self) -> ServiceResult<Vec<Appointment>> {
        self.db.read(|d| d.appointments.clone())
    }

    pub fn list_by_donor(&self, donor_id: DonorId) -> ServiceResult<Vec<Appointment>> {
        self.db.read(|d| {
            d.appointments
                .iter()
                .filter(|a| a.donor_id() == donor_id)
                .cloned()
                .collect()
        })
    }

    /// Book a slot for an active donor.
    pub fn book(&self, input: NewAppointment) -> ServiceResult<Appointment> {
        let appointment = self.db.transaction(|data, _| {
            let donor = data.donor(input.donor_id)?;
            if !donor.is_active() {
                return Err(DomainError::validation("donor is inactive").into());
            }
            let appointment = Appointment::book(
                AppointmentId::new(),
                input,
                donor.name(),
                donor.phone(),
                donor.blood_type(),
                Utc::now(),
            )?;
            data.appointments.push(appointment.clone());
            Ok(appointment)
        })?;
        tracing::info!(
            donor_id = %appointment.donor_id(),
            date = %appointment.date(),
            "appointment booked"
        );
        Ok(appointment)
    }

    pub fn update_status(
        &self,
        id: AppointmentId,
        status: AppointmentStatus,
    ) -> ServiceResult<Appointment> {
        let appointment = self.db.transaction(|data, _| {
            let appointment = data.appointment_mut(id)?;
            appointment.transition(status)?;
            Ok(appointment.clone())
        })?;
        tracing::info!(appointment_id = %id, status = status.as_str(), "appointment status changed");
        Ok(appointment)
    }
}

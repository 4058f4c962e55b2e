//! Scheduling domain module: donor appointments and donation campaigns.

pub mod appointment;
pub mod campaign;

pub use appointment::{Appointment, AppointmentStatus, NewAppointment};
pub use campaign::{Campaign, CampaignPatch, CampaignPriority, NewCampaign};

//! `hemolink-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the stock, donor,
//! donation and scheduling modules (no infrastructure concerns).

pub mod blood_type;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;
pub mod volume;

pub use blood_type::BloodType;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AppointmentId, CampaignId, DonationId, DonorId};
pub use value_object::ValueObject;
pub use volume::Volume;

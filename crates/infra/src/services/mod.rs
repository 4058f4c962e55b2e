//! Application services.
//!
//! Each service is a thin, cloneable handle over the shared [`Database`]:
//! reads go through `Database::read`, every mutation through one
//! `Database::transaction`, so a service call either commits completely or
//! changes nothing.
//!
//! [`Database`]: crate::Database

pub mod appointments;
pub mod campaigns;
pub mod donations;
pub mod donors;
pub mod stock;

pub use appointments::AppointmentService;
pub use campaigns::CampaignService;
pub use donations::{DonationRecorder, RecordedDonation};
pub use donors::DonorService;
pub use stock::StockService;

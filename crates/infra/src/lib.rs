//! Infrastructure layer: configuration, persistence, seed data and the
//! application services that run domain operations as atomic units of work.

pub mod config;
pub mod database;
pub mod dataset;
pub mod error;
pub mod seed;
pub mod services;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use config::{AppConfig, ConfigError};
pub use database::Database;
pub use dataset::Dataset;
pub use error::{ServiceError, ServiceResult};
pub use services::{
    AppointmentService, CampaignService, DonationRecorder, DonorService, RecordedDonation,
    StockService,
};
pub use store::{InMemoryStore, JsonFileStore, Store, StoreError};

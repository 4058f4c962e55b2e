//! Key-value JSON blob store boundary.
//!
//! Each collection lives under one well-known key. A dataset commit replaces
//! all keys in one batch, and backends apply a batch entirely or not at all.
//! Backends make no assumptions about the shape of the values they hold.

pub mod in_memory;
pub mod json_file;
pub mod r#trait;

pub use in_memory::InMemoryStore;
pub use json_file::{DOCUMENT_FILE, JsonFileStore};
pub use r#trait::{Store, StoreError};

pub const STOCK_KEY: &str = "hemolink_stock";
pub const DONORS_KEY: &str = "hemolink_donors";
pub const DONATIONS_KEY: &str = "hemolink_donations";
pub const APPOINTMENTS_KEY: &str = "hemolink_appointments";
pub const CAMPAIGNS_KEY: &str = "hemolink_campaigns";

/// Every key written by a dataset commit, in write order.
pub const DATASET_KEYS: [&str; 5] = [
    STOCK_KEY,
    DONORS_KEY,
    DONATIONS_KEY,
    APPOINTMENTS_KEY,
    CAMPAIGNS_KEY,
];

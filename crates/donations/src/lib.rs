//! Donation domain module.
//!
//! A `Donation` is the record of one blood collection. Completed donations
//! are immutable; stock and donor side effects are coordinated by the
//! infrastructure layer in a single unit of work.

pub mod donation;

pub use donation::{Donation, DonationStatus, NewDonation, Vitals, STANDARD_VOLUMES_ML};

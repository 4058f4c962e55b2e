//! Donor domain module.
//!
//! Registration rules, explicit patch updates, and the donation credit that
//! every completed donation applies to a donor's history.

pub mod donor;

pub use donor::{Donor, DonorLevel, DonorPatch, NewDonor, MIN_HEIGHT_CM, MIN_WEIGHT_KG};

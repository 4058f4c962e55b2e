//! Initial data for an empty store.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use hemolink_core::{
    AppointmentId, BloodType, CampaignId, DomainError, DomainResult, DonationId, DonorId, Entity,
    Volume,
};
use hemolink_donations::{Donation, DonationStatus, NewDonation};
use hemolink_donors::{Donor, NewDonor};
use hemolink_scheduling::{Appointment, Campaign, CampaignPriority, NewAppointment, NewCampaign};
use hemolink_stock::{StatusPolicy, StockLedger, StockLevel};

/// `(blood type, quantity liters, minimum liters)` for every stock row.
pub const SEED_STOCK: [(BloodType, u64, u64); 8] = [
    (BloodType::APositive, 45, 30),
    (BloodType::ANegative, 12, 20),
    (BloodType::BPositive, 38, 25),
    (BloodType::BNegative, 18, 15),
    (BloodType::AbPositive, 22, 15),
    (BloodType::AbNegative, 8, 10),
    (BloodType::OPositive, 55, 40),
    (BloodType::ONegative, 14, 25),
];

/// One row per blood type with the seed minimums. Quantities are the seed
/// quantities when `with_quantities`, zero otherwise.
pub fn stock_ledger(
    policy: &(impl StatusPolicy + ?Sized),
    with_quantities: bool,
    now: DateTime<Utc>,
) -> DomainResult<StockLedger> {
    StockLedger::from_levels(SEED_STOCK.iter().map(|&(blood_type, liters, min)| {
        let quantity = if with_quantities {
            Volume::from_whole_liters(liters)
        } else {
            Volume::ZERO
        };
        StockLevel::new(blood_type, quantity, Volume::from_whole_liters(min), policy, now)
    }))
}

/// Add a zeroed row, at the seed minimum, for every blood type `ledger` lacks.
/// Returns the completed ledger and the blood types that were added.
pub fn fill_missing_rows(
    ledger: &StockLedger,
    policy: &(impl StatusPolicy + ?Sized),
    now: DateTime<Utc>,
) -> DomainResult<(StockLedger, Vec<BloodType>)> {
    let missing: Vec<_> = SEED_STOCK
        .iter()
        .filter(|(blood_type, _, _)| ledger.get(*blood_type).is_none())
        .collect();
    let added = missing.iter().map(|(blood_type, _, _)| *blood_type).collect();

    let completed = StockLedger::from_levels(ledger.levels().cloned().chain(missing.into_iter().map(
        |&(blood_type, _, min)| {
            StockLevel::new(blood_type, Volume::ZERO, Volume::from_whole_liters(min), policy, now)
        },
    )))?;
    Ok((completed, added))
}

/// Stock rows plus one sample donor with history, an upcoming appointment,
/// a completed donation and an active campaign.
pub fn sample_dataset(
    policy: &(impl StatusPolicy + ?Sized),
    now: DateTime<Utc>,
) -> DomainResult<crate::Dataset> {
    let stock = stock_ledger(policy, true, now)?;
    let last_donation = date(2024, 11, 15)?;

    let donor = Donor::register(
        DonorId::new(),
        NewDonor {
            name: "João Silva".to_string(),
            email: "doador@example.com".to_string(),
            phone: "(22) 99999-9999".to_string(),
            blood_type: BloodType::OPositive,
            birth_date: date(1990, 5, 15)?,
            weight_kg: 78,
            height_cm: 176,
            address: Some("Rua das Flores, 123".to_string()),
            city: Some("Campos dos Goytacazes".to_string()),
            postal_code: None,
            medical_history: None,
            medications: None,
            allergies: None,
            last_donation: None,
        },
        now,
    )?
    .with_imported_history(5, 500, Some(last_donation));
    let donor_id = *donor.id();

    let appointment = Appointment::book(
        AppointmentId::new(),
        NewAppointment {
            donor_id,
            date: now.date_naive() + Duration::days(7),
            time: time(9, 0)?,
            notes: Some("Primeira doação pelo sistema".to_string()),
        },
        donor.name(),
        donor.phone(),
        donor.blood_type(),
        now,
    )?;

    let donation = Donation::record(
        DonationId::new(),
        NewDonation {
            donor_id,
            blood_type: Some(BloodType::OPositive),
            volume_ml: 450,
            date: Some(last_donation),
            time: None,
            status: Some(DonationStatus::Completed),
            vitals: None,
            notes: Some("Doação realizada com sucesso".to_string()),
        },
        donor.name(),
        donor.blood_type(),
        now,
    )?;

    let campaign = Campaign::create(
        CampaignId::new(),
        NewCampaign {
            title: "Campanha de Natal - Doe Vida".to_string(),
            description: "Campanha especial de final de ano para aumentar o estoque de sangue para as festividades.".to_string(),
            target_blood_types: vec![BloodType::ONegative, BloodType::ANegative, BloodType::BNegative],
            start_date: date(2024, 12, 1)?,
            end_date: date(2024, 12, 31)?,
            priority: CampaignPriority::High,
        },
        now,
    )?;

    Ok(crate::Dataset {
        stock,
        donors: vec![donor],
        donations: vec![donation],
        appointments: vec![appointment],
        campaigns: vec![campaign],
    })
}

fn date(y: i32, m: u32, d: u32) -> DomainResult<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| DomainError::invariant(format!("invalid seed date {y}-{m}-{d}")))
}

fn time(h: u32, m: u32) -> DomainResult<NaiveTime> {
    NaiveTime::from_hms_opt(h, m, 0)
        .ok_or_else(|| DomainError::invariant(format!("invalid seed time {h}:{m}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hemolink_stock::{MinimumThresholdPolicy, StockStatus};

    #[test]
    fn seed_has_one_row_per_blood_type() {
        let ledger = stock_ledger(&MinimumThresholdPolicy, true, Utc::now()).unwrap();
        assert_eq!(ledger.len(), BloodType::ALL.len());
        for bt in BloodType::ALL {
            assert!(ledger.get(bt).is_some(), "missing {bt}");
        }
        let ab_neg = ledger.get(BloodType::AbNegative).unwrap();
        assert_eq!(ab_neg.quantity(), Volume::from_whole_liters(8));
        assert_eq!(ab_neg.status(), StockStatus::Low);
    }

    #[test]
    fn empty_ledger_is_all_critical_under_threshold_policy() {
        let ledger = stock_ledger(&MinimumThresholdPolicy, false, Utc::now()).unwrap();
        assert!(ledger.levels().all(|l| l.quantity().is_zero()));
        assert_eq!(ledger.critical_and_low().critical.len(), 8);
    }

    #[test]
    fn sample_dataset_is_consistent() {
        let data = sample_dataset(&MinimumThresholdPolicy, Utc::now()).unwrap();
        let donor = &data.donors[0];
        assert_eq!(donor.total_donations(), 5);
        assert_eq!(donor.points(), 500);
        assert_eq!(data.donations[0].donor_id(), *donor.id());
        assert_eq!(data.appointments[0].donor_id(), *donor.id());
        assert!(data.campaigns[0].is_active());
    }
}

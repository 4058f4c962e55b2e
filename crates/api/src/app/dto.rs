use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

use hemolink_core::{BloodType, DonorId, Entity};
use hemolink_donations::{Donation, DonationStatus, NewDonation, Vitals};
use hemolink_donors::{Donor, DonorPatch, NewDonor};
use hemolink_infra::RecordedDonation;
use hemolink_scheduling::{
    Appointment, AppointmentStatus, Campaign, CampaignPatch, CampaignPriority, NewAppointment,
    NewCampaign,
};
use hemolink_stock::{StockAlert, StockAlerts, StockLevel, StockOperation, StockStatistics};

use crate::app::errors;

/// Unwrap a JSON body, turning extractor rejections into the API's error shape.
pub fn body<T>(body: Result<axum::Json<T>, JsonRejection>) -> Result<T, axum::response::Response> {
    body.map(|axum::Json(b)| b)
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()))
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateStockRequest {
    /// Liters.
    pub quantity: f64,
    pub operation: StockOperation,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetStockRequest {
    /// Liters.
    pub quantity: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateDonorRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub blood_type: BloodType,
    pub birth_date: NaiveDate,
    pub weight_kg: u16,
    pub height_cm: u16,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub medical_history: Option<String>,
    pub medications: Option<String>,
    pub allergies: Option<String>,
    pub last_donation: Option<NaiveDate>,
}

impl From<CreateDonorRequest> for NewDonor {
    fn from(r: CreateDonorRequest) -> Self {
        NewDonor {
            name: r.name,
            email: r.email,
            phone: r.phone,
            blood_type: r.blood_type,
            birth_date: r.birth_date,
            weight_kg: r.weight_kg,
            height_cm: r.height_cm,
            address: r.address,
            city: r.city,
            postal_code: r.postal_code,
            medical_history: r.medical_history,
            medications: r.medications,
            allergies: r.allergies,
            last_donation: r.last_donation,
        }
    }
}

/// Only the listed fields may be patched; counters and points are not among them.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateDonorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub blood_type: Option<BloodType>,
    pub birth_date: Option<NaiveDate>,
    pub weight_kg: Option<u16>,
    pub height_cm: Option<u16>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub medical_history: Option<String>,
    pub medications: Option<String>,
    pub allergies: Option<String>,
    pub is_active: Option<bool>,
}

impl From<UpdateDonorRequest> for DonorPatch {
    fn from(r: UpdateDonorRequest) -> Self {
        DonorPatch {
            name: r.name,
            email: r.email,
            phone: r.phone,
            blood_type: r.blood_type,
            birth_date: r.birth_date,
            weight_kg: r.weight_kg,
            height_cm: r.height_cm,
            address: r.address,
            city: r.city,
            postal_code: r.postal_code,
            medical_history: r.medical_history,
            medications: r.medications,
            allergies: r.allergies,
            is_active: r.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateAppointmentRequest {
    pub donor_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub notes: Option<String>,
}

impl CreateAppointmentRequest {
    pub fn into_domain(self) -> Result<NewAppointment, axum::response::Response> {
        Ok(NewAppointment {
            donor_id: errors::parse_id::<DonorId>(&self.donor_id)?,
            date: self.date,
            time: self.time,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateAppointmentStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VitalsRequest {
    pub hemoglobin: Option<f32>,
    pub blood_pressure: Option<String>,
    pub pulse: Option<u16>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateDonationRequest {
    pub donor_id: String,
    pub blood_type: Option<BloodType>,
    /// Millilitres; `quantity` is accepted for older clients.
    #[serde(alias = "quantity")]
    pub volume_ml: u16,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub status: Option<DonationStatus>,
    pub vitals: Option<VitalsRequest>,
    pub notes: Option<String>,
}

impl CreateDonationRequest {
    pub fn into_domain(self) -> Result<NewDonation, axum::response::Response> {
        Ok(NewDonation {
            donor_id: errors::parse_id::<DonorId>(&self.donor_id)?,
            blood_type: self.blood_type,
            volume_ml: self.volume_ml,
            date: self.date,
            time: self.time,
            status: self.status,
            vitals: self.vitals.map(|v| Vitals {
                hemoglobin: v.hemoglobin,
                blood_pressure: v.blood_pressure,
                pulse: v.pulse,
                temperature: v.temperature,
            }),
            notes: self.notes,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCampaignRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub target_blood_types: Vec<BloodType>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub priority: Option<CampaignPriority>,
}

impl From<CreateCampaignRequest> for NewCampaign {
    fn from(r: CreateCampaignRequest) -> Self {
        NewCampaign {
            title: r.title,
            description: r.description,
            target_blood_types: r.target_blood_types,
            start_date: r.start_date,
            end_date: r.end_date,
            priority: r.priority.unwrap_or(CampaignPriority::Medium),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCampaignRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_blood_types: Option<Vec<BloodType>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub priority: Option<CampaignPriority>,
    pub is_active: Option<bool>,
}

impl From<UpdateCampaignRequest> for CampaignPatch {
    fn from(r: UpdateCampaignRequest) -> Self {
        CampaignPatch {
            title: r.title,
            description: r.description,
            target_blood_types: r.target_blood_types,
            start_date: r.start_date,
            end_date: r.end_date,
            priority: r.priority,
            is_active: r.is_active,
        }
    }
}

// -------------------------
// JSON mapping
// -------------------------

pub fn stock_level_to_json(level: &StockLevel) -> JsonValue {
    json!({
        "blood_type": level.blood_type(),
        "quantity": level.quantity().liters(),
        "min_quantity": level.min_quantity().liters(),
        "status": level.status(),
        "last_updated": level.last_updated(),
    })
}

fn alert_to_json(alert: &StockAlert) -> JsonValue {
    json!({
        "blood_type": alert.blood_type,
        "current_level": alert.current_level.liters(),
        "min_level": alert.min_level.liters(),
        "severity": alert.severity,
    })
}

pub fn alerts_to_json(alerts: &StockAlerts) -> JsonValue {
    json!({
        "critical": alerts.critical.iter().map(alert_to_json).collect::<Vec<_>>(),
        "low": alerts.low.iter().map(alert_to_json).collect::<Vec<_>>(),
    })
}

pub fn statistics_to_json(stats: &StockStatistics) -> JsonValue {
    json!({
        "total": stats.total.liters(),
        "critical": stats.critical,
        "low": stats.low,
        "stable": stats.stable,
        "high": stats.high,
    })
}

pub fn donor_to_json(donor: &Donor) -> JsonValue {
    json!({
        "id": donor.id().to_string(),
        "name": donor.name(),
        "email": donor.email(),
        "phone": donor.phone(),
        "blood_type": donor.blood_type(),
        "birth_date": donor.birth_date(),
        "weight_kg": donor.weight_kg(),
        "height_cm": donor.height_cm(),
        "address": donor.address(),
        "city": donor.city(),
        "postal_code": donor.postal_code(),
        "medical_history": donor.medical_history(),
        "medications": donor.medications(),
        "allergies": donor.allergies(),
        "registered_at": donor.registered_at(),
        "last_donation": donor.last_donation(),
        "total_donations": donor.total_donations(),
        "points": donor.points(),
        "level": donor.level(),
        "is_active": donor.is_active(),
    })
}

pub fn appointment_to_json(apt: &Appointment) -> JsonValue {
    json!({
        "id": apt.id().to_string(),
        "donor_id": apt.donor_id().to_string(),
        "donor_name": apt.donor_name(),
        "donor_phone": apt.donor_phone(),
        "blood_type": apt.blood_type(),
        "date": apt.date(),
        "time": apt.time().format("%H:%M").to_string(),
        "status": apt.status(),
        "notes": apt.notes(),
        "created_at": apt.created_at(),
    })
}

pub fn donation_to_json(donation: &Donation) -> JsonValue {
    json!({
        "id": donation.id().to_string(),
        "donor_id": donation.donor_id().to_string(),
        "donor_name": donation.donor_name(),
        "blood_type": donation.blood_type(),
        "volume_ml": donation.volume_ml(),
        "date": donation.date(),
        "time": donation.time().map(|t| t.format("%H:%M").to_string()),
        "status": donation.status(),
        "vitals": donation.vitals(),
        "notes": donation.notes(),
        "recorded_at": donation.recorded_at(),
    })
}

pub fn recorded_donation_to_json(recorded: &RecordedDonation) -> JsonValue {
    json!({
        "donation": donation_to_json(&recorded.donation),
        "donor": donor_to_json(&recorded.donor),
        "stock": recorded.stock.as_ref().map(stock_level_to_json),
    })
}

pub fn campaign_to_json(campaign: &Campaign) -> JsonValue {
    json!({
        "id": campaign.id().to_string(),
        "title": campaign.title(),
        "description": campaign.description(),
        "target_blood_types": campaign.target_blood_types(),
        "start_date": campaign.start_date(),
        "end_date": campaign.end_date(),
        "is_active": campaign.is_active(),
        "priority": campaign.priority(),
        "created_at": campaign.created_at(),
    })
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use hemolink_core::{BloodType, CampaignId, DomainError, DomainResult, Entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignPriority {
    Low,
    Medium,
    High,
    Critical,
}

/// Creation input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCampaign {
    pub title: String,
    pub description: String,
    pub target_blood_types: Vec<BloodType>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub priority: CampaignPriority,
}

/// Partial update. `None` keeps the existing value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_blood_types: Option<Vec<BloodType>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub priority: Option<CampaignPriority>,
    pub is_active: Option<bool>,
}

/// A donation drive targeting specific blood types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    id: CampaignId,
    title: String,
    description: String,
    target_blood_types: Vec<BloodType>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    is_active: bool,
    priority: CampaignPriority,
    created_at: DateTime<Utc>,
}

impl Campaign {
    pub fn create(id: CampaignId, input: NewCampaign, now: DateTime<Utc>) -> DomainResult<Self> {
        let campaign = Self {
            id,
            title: input.title.trim().to_string(),
            description: input.description.trim().to_string(),
            target_blood_types: dedup(input.target_blood_types),
            start_date: input.start_date,
            end_date: input.end_date,
            is_active: true,
            priority: input.priority,
            created_at: now,
        };
        campaign.validate()?;
        Ok(campaign)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn target_blood_types(&self) -> &[BloodType] {
        &self.target_blood_types
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn priority(&self) -> CampaignPriority {
        self.priority
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn targets(&self, blood_type: BloodType) -> bool {
        self.target_blood_types.contains(&blood_type)
    }

    pub fn apply_patch(&mut self, patch: CampaignPatch) -> DomainResult<()> {
        let mut next = self.clone();
        if let Some(v) = patch.title {
            next.title = v.trim().to_string();
        }
        if let Some(v) = patch.description {
            next.description = v.trim().to_string();
        }
        if let Some(v) = patch.target_blood_types {
            next.target_blood_types = dedup(v);
        }
        if let Some(v) = patch.start_date {
            next.start_date = v;
        }
        if let Some(v) = patch.end_date {
            next.end_date = v;
        }
        if let Some(v) = patch.priority {
            next.priority = v;
        }
        if let Some(v) = patch.is_active {
            next.is_active = v;
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    fn validate(&self) -> DomainResult<()> {
        if self.title.is_empty() {
            return Err(DomainError::validation("title cannot be empty"));
        }
        if self.target_blood_types.is_empty() {
            return Err(DomainError::validation("a campaign needs at least one target blood type"));
        }
        if self.start_date > self.end_date {
            return Err(DomainError::validation("start date must not be after end date"));
        }
        Ok(())
    }
}

fn dedup(mut types: Vec<BloodType>) -> Vec<BloodType> {
    types.sort();
    types.dedup();
    types
}

impl Entity for Campaign {
    type Id = CampaignId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

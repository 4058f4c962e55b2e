use std::sync::Arc;

use chrono::Utc;

use hemolink_core::{CampaignId, Entity};
use hemolink_scheduling::{Campaign, CampaignPatch, NewCampaign};

use crate::database::Database;
use crate::error::ServiceResult;

#[derive(Debug, Clone)]
pub struct CampaignService {
    db: Arc<Database>,
}

impl CampaignService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn list(&self) -> ServiceResult<Vec<Campaign>> {
        self.db.read(|d| d.campaigns.clone())
    }

    pub fn list_active(&self) -> ServiceResult<Vec<Campaign>> {
        self.db
            .read(|d| d.campaigns.iter().filter(|c| c.is_active()).cloned().collect())
    }

    pub fn get(&self, id: CampaignId) -> ServiceResult<Campaign> {
        Ok(self.db.read(|d| d.campaign(id).cloned())??)
    }

    pub fn create(&self, input: NewCampaign) -> ServiceResult<Campaign> {
        let campaign = self.db.transaction(|data, _| {
            let campaign = Campaign::create(CampaignId::new(), input, Utc::now())?;
            data.campaigns.push(campaign.clone());
            Ok(campaign)
        })?;
        tracing::info!(campaign_id = %campaign.id(), title = campaign.title(), "campaign created");
        Ok(campaign)
    }

    pub fn update(&self, id: CampaignId, patch: CampaignPatch) -> ServiceResult<Campaign> {
        let campaign = self.db.transaction(|data, _| {
            let campaign = data.campaign_mut(id)?;
            campaign.apply_patch(patch)?;
            Ok(campaign.clone())
        })?;
        tracing::info!(campaign_id = %id, active = campaign.is_active(), "campaign updated");
        Ok(campaign)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use chrono::NaiveDate;
    use hemolink_core::{BloodType, DomainError};
    use hemolink_scheduling::CampaignPriority;
    use hemolink_stock::StockPolicy;

    fn service() -> CampaignService {
        CampaignService::new(Arc::new(Database::in_memory(StockPolicy::default(), true).unwrap()))
    }

    fn new_campaign() -> NewCampaign {
        NewCampaign {
            title: "Carnaval solidário".to_string(),
            description: "Reforço antes do feriado".to_string(),
            target_blood_types: vec![BloodType::OPositive],
            start_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            priority: CampaignPriority::Critical,
        }
    }

    #[test]
    fn create_and_deactivate() {
        let campaigns = service();
        let created = campaigns.create(new_campaign()).unwrap();
        assert_eq!(campaigns.list_active().unwrap().len(), 2);

        campaigns
            .update(
                *created.id(),
                CampaignPatch {
                    is_active: Some(false),
                    ..CampaignPatch::default()
                },
            )
            .unwrap();
        let active = campaigns.list_active().unwrap();
        assert_eq!(active.len(), 1);
        assert_ne!(active[0].id(), created.id());
        assert_eq!(campaigns.list().unwrap().len(), 2);
    }

    #[test]
    fn invalid_campaign_is_not_stored() {
        let campaigns = service();
        let mut input = new_campaign();
        input.title = "   ".to_string();
        let err = campaigns.create(input).unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));
        assert_eq!(campaigns.list().unwrap().len(), 1);
    }

    #[test]
    fn unknown_campaign_is_not_found() {
        let campaigns = service();
        assert!(matches!(
            campaigns.get(CampaignId::new()),
            Err(ServiceError::Domain(DomainError::NotFound(_)))
        ));
        assert!(campaigns
            .update(CampaignId::new(), CampaignPatch::default())
            .is_err());
    }
}

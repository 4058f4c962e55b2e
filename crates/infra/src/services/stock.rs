use std::sync::Arc;

use chrono::Utc;

use hemolink_core::{BloodType, DomainError, Volume};
use hemolink_stock::{StockAlerts, StockLevel, StockOperation, StockStatistics};

use crate::database::Database;
use crate::error::ServiceResult;

#[derive(Debug, Clone)]
pub struct StockService {
    db: Arc<Database>,
}

impl StockService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn list(&self) -> ServiceResult<Vec<StockLevel>> {
        self.db.read(|d| d.stock.levels().cloned().collect())
    }

    pub fn get(&self, blood_type: BloodType) -> ServiceResult<StockLevel> {
        self.db
            .read(|d| d.stock.get(blood_type).cloned())?
            .ok_or_else(|| DomainError::not_found(format!("blood type {blood_type}")).into())
    }

    /// Add or subtract `liters`; subtraction clamps at zero.
    pub fn adjust(
        &self,
        blood_type: BloodType,
        liters: f64,
        operation: StockOperation,
    ) -> ServiceResult<StockLevel> {
        let delta = Volume::from_liters(liters)?;
        let level = self.db.transaction(|data, policy| {
            Ok(data
                .stock
                .adjust_quantity(policy, blood_type, delta, operation, Utc::now())?)
        })?;
        tracing::info!(
            blood_type = %blood_type,
            operation = ?operation,
            delta_ml = delta.millilitres(),
            quantity_ml = level.quantity().millilitres(),
            status = %level.status(),
            "stock adjusted"
        );
        Ok(level)
    }

    /// Overwrite the quantity (manual correction).
    pub fn set(&self, blood_type: BloodType, liters: f64) -> ServiceResult<StockLevel> {
        let level = self.db.transaction(|data, policy| {
            Ok(data.stock.set_quantity(policy, blood_type, liters, Utc::now())?)
        })?;
        tracing::info!(
            blood_type = %blood_type,
            quantity_ml = level.quantity().millilitres(),
            status = %level.status(),
            "stock corrected"
        );
        Ok(level)
    }

    pub fn alerts(&self) -> ServiceResult<StockAlerts> {
        self.db.read(|d| d.stock.critical_and_low())
    }

    pub fn statistics(&self) -> ServiceResult<StockStatistics> {
        self.db.read(|d| d.stock.statistics())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use hemolink_stock::{StockPolicy, StockStatus};

    fn service() -> StockService {
        StockService::new(Arc::new(Database::in_memory(StockPolicy::default(), true).unwrap()))
    }

    #[test]
    fn subtract_clamps_and_reclassifies() {
        let stock = service();
        let level = stock
            .adjust(BloodType::ANegative, 100.0, StockOperation::Subtract)
            .unwrap();
        assert_eq!(level.quantity(), Volume::ZERO);
        assert_eq!(level.status(), StockStatus::Critical);
        assert_eq!(stock.get(BloodType::ANegative).unwrap(), level);
    }

    #[test]
    fn negative_delta_is_rejected_without_change() {
        let stock = service();
        let before = stock.list().unwrap();
        let err = stock
            .adjust(BloodType::APositive, -1.0, StockOperation::Add)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));
        assert_eq!(stock.list().unwrap(), before);
    }

    #[test]
    fn manual_correction_moves_alerts() {
        let stock = service();
        stock.set(BloodType::ONegative, 12.5).unwrap();
        let alerts = stock.alerts().unwrap();
        assert!(alerts.critical.iter().any(|a| a.blood_type == BloodType::ONegative));
        assert!(!alerts.low.iter().any(|a| a.blood_type == BloodType::ONegative));

        let stats = stock.statistics().unwrap();
        assert_eq!(stats.critical + stats.low + stats.stable + stats.high, 8);
    }

    #[test]
    fn negative_correction_is_rejected() {
        let stock = service();
        assert!(stock.set(BloodType::BPositive, -3.0).is_err());
        assert_eq!(
            stock.get(BloodType::BPositive).unwrap().quantity(),
            Volume::from_whole_liters(38)
        );
    }
}

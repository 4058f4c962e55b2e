use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use tokio::sync::broadcast;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

use hemolink_infra::{
    AppConfig, AppointmentService, CampaignService, Database, DonationRecorder, DonorService,
    ServiceResult, StockService,
};
use hemolink_stock::StockLevel;

use crate::app::dto;

pub const STOCK_UPDATED: &str = "stock.updated";
pub const STOCK_ALERT: &str = "stock.alert";

/// Realtime message broadcasted via SSE.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RealtimeMessage {
    pub topic: &'static str,
    pub payload: serde_json::Value,
}

/// Everything handlers need, shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AppServices {
    pub stock: StockService,
    pub donors: DonorService,
    pub appointments: AppointmentService,
    pub donations: DonationRecorder,
    pub campaigns: CampaignService,
    realtime_tx: broadcast::Sender<RealtimeMessage>,
}

impl AppServices {
    pub fn new(db: Arc<Database>, donation_reward: u32) -> Self {
        // Lossy broadcast: slow SSE clients skip messages instead of blocking writers.
        let (realtime_tx, _realtime_rx) = broadcast::channel::<RealtimeMessage>(256);
        Self {
            stock: StockService::new(db.clone()),
            donors: DonorService::new(db.clone()),
            appointments: AppointmentService::new(db.clone()),
            donations: DonationRecorder::new(db.clone(), donation_reward),
            campaigns: CampaignService::new(db),
            realtime_tx,
        }
    }

    pub fn realtime_tx(&self) -> &broadcast::Sender<RealtimeMessage> {
        &self.realtime_tx
    }

    /// Announce a changed stock row, plus an alert when it is critical or low.
    pub fn publish_stock(&self, level: &StockLevel) {
        let payload = dto::stock_level_to_json(level);
        // No subscribers is not an error.
        let _ = self.realtime_tx.send(RealtimeMessage {
            topic: STOCK_UPDATED,
            payload: payload.clone(),
        });
        if level.status().is_alert() {
            tracing::warn!(
                blood_type = %level.blood_type(),
                status = %level.status(),
                quantity_ml = level.quantity().millilitres(),
                "stock alert"
            );
            let _ = self.realtime_tx.send(RealtimeMessage {
                topic: STOCK_ALERT,
                payload,
            });
        }
    }
}

pub fn build_services(config: &AppConfig) -> ServiceResult<AppServices> {
    let db = Arc::new(Database::from_config(config)?);
    Ok(AppServices::new(db, config.donation_reward))
}

pub fn sse_stream(
    services: Arc<AppServices>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.realtime_tx().subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(m) => {
            let data = serde_json::to_string(&m.payload).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event(m.topic).data(data)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

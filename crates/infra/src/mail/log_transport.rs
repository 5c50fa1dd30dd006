//! Dry-run transport: writes notifications to the log instead of sending.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use duebell_core::NotificationTransport;
use duebell_domain::{DeliveryReceipt, Notification, Result};
use tracing::info;

#[derive(Debug, Default)]
pub struct LogMailTransport {
    sequence: AtomicU64,
}

impl LogMailTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationTransport for LogMailTransport {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, notification: &Notification) -> Result<DeliveryReceipt> {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let accepted_at = Utc::now();

        info!(
            to = %notification.to,
            from = %notification.from,
            subject = %notification.subject,
            html_bytes = notification.html.len(),
            "Dry-run reminder email"
        );

        Ok(DeliveryReceipt {
            transport: self.name().to_string(),
            message_id: Some(format!("log-{}-{sequence}", accepted_at.timestamp_millis())),
            accepted_at,
        })
    }
}

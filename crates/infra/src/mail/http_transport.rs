//! JSON mail API transport.
//!
//! Posts `{from, to, subject, html, text}` to the provider endpoint with HTTP
//! basic auth. A 2xx answer is a delivery; the provider's `id` field, when
//! present, becomes the receipt's message id.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use duebell_core::NotificationTransport;
use duebell_domain::{DeliveryReceipt, DuebellError, Notification, Result};
use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::conversions::status_error;
use crate::http::HttpClient;

const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Serialize)]
struct SendMailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct SendMailResponse {
    #[serde(default, alias = "messageId", alias = "message_id")]
    id: Option<String>,
}

pub struct HttpMailTransport {
    client: HttpClient,
    endpoint: Url,
    user: String,
    password: Option<String>,
}

impl HttpMailTransport {
    /// # Errors
    ///
    /// `DuebellError::Config` if `endpoint` is not an absolute URL.
    pub fn new(
        endpoint: &str,
        user: impl Into<String>,
        password: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = HttpClient::builder().timeout(request_timeout).max_attempts(3).build()?;
        Self::with_client(client, endpoint, user, password)
    }

    pub fn with_client(
        client: HttpClient,
        endpoint: &str,
        user: impl Into<String>,
        password: Option<String>,
    ) -> Result<Self> {
        let endpoint = Url::parse(endpoint.trim())
            .map_err(|err| DuebellError::Config(format!("invalid mail endpoint {endpoint}: {err}")))?;
        Ok(Self { client, endpoint, user: user.into(), password })
    }
}

#[async_trait]
impl NotificationTransport for HttpMailTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(&self, notification: &Notification) -> Result<DeliveryReceipt> {
        let payload = SendMailRequest {
            from: &notification.from,
            to: &notification.to,
            subject: &notification.subject,
            html: &notification.html,
            text: &notification.text,
        };

        let request = self
            .client
            .request(Method::POST, self.endpoint.clone())
            .basic_auth(&self.user, self.password.as_deref())
            .json(&payload);

        let response = self.client.send(request).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail: String = body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(match status_error(status) {
                DuebellError::Auth(message) => DuebellError::Auth(message),
                other => DuebellError::Transport(format!(
                    "mail provider rejected message to {}: {other}{}{detail}",
                    notification.to,
                    if detail.is_empty() { "" } else { ": " },
                )),
            });
        }

        // a 2xx without a JSON body still counts as delivered
        let body = response.text().await.unwrap_or_default();
        let parsed: SendMailResponse = serde_json::from_str(&body).unwrap_or_default();
        debug!(to = %notification.to, message_id = ?parsed.id, "Mail accepted by provider");

        Ok(DeliveryReceipt {
            transport: self.name().to_string(),
            message_id: parsed.id,
            accepted_at: Utc::now(),
        })
    }
}

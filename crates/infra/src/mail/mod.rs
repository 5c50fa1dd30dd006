//! Mail transports implementing [`NotificationTransport`].

pub mod http_transport;
pub mod log_transport;

use std::sync::Arc;
use std::time::Duration;

use duebell_core::NotificationTransport;
use duebell_domain::{DuebellError, MailConfig, MailService, Result};

pub use http_transport::HttpMailTransport;
pub use log_transport::LogMailTransport;

/// Build the transport selected by `config.service`.
///
/// `request_timeout` bounds each HTTP attempt; the reminder service applies
/// its own overall dispatch timeout on top.
pub fn build_transport(
    config: &MailConfig,
    request_timeout: Duration,
) -> Result<Arc<dyn NotificationTransport>> {
    match config.service {
        MailService::Log => Ok(Arc::new(LogMailTransport::new())),
        MailService::Http => {
            let endpoint = config.endpoint.as_deref().ok_or_else(|| {
                DuebellError::Config("mail.endpoint is required for the http mail service".into())
            })?;
            let user = config.user.as_deref().ok_or_else(|| {
                DuebellError::Config("mail.user is required for the http mail service".into())
            })?;
            let transport = HttpMailTransport::new(
                endpoint,
                user,
                config.password.clone(),
                request_timeout,
            )?;
            Ok(Arc::new(transport))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_service_needs_no_credentials() {
        let transport = build_transport(&MailConfig::default(), Duration::from_secs(5)).unwrap();
        assert_eq!(transport.name(), "log");
    }

    #[test]
    fn http_service_requires_endpoint() {
        let config = MailConfig {
            service: MailService::Http,
            user: Some("mailer@todo.app".into()),
            ..MailConfig::default()
        };

        let err = build_transport(&config, Duration::from_secs(5)).err().unwrap();
        assert!(matches!(err, DuebellError::Config(msg) if msg.contains("endpoint")));
    }
}

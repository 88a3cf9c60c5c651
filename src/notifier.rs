use crate::contacts::Contact;
use crate::provider::{DeliveryStatus, MessagingClient, ProviderError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Terminal outcome of one notification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed(Option<String>),
    /// The poll budget ran out before the provider reported a terminal
    /// status; the message may still be delivered independently.
    StatusUnknown,
}

/// Fans one payload out to every valid contact, sequentially, confirming
/// delivery per message. One contact's failure never blocks the rest.
#[derive(Debug)]
pub struct Notifier {
    client: Arc<MessagingClient>,
    contacts: Vec<Contact>,
    status_poll_interval: Duration,
    status_poll_attempts: u32,
}

impl Notifier {
    pub fn new(
        client: Arc<MessagingClient>,
        contacts: Vec<Contact>,
        status_poll_interval: Duration,
        status_poll_attempts: u32,
    ) -> Self {
        Self {
            client,
            contacts,
            status_poll_interval,
            status_poll_attempts,
        }
    }

    /// Deliver `payload` to each valid contact in configured order, logging
    /// the per-contact outcome. Fire-and-forget from the caller's view.
    pub async fn process(&self, payload: &str) {
        for contact in &self.contacts {
            match self.notify_contact(payload, contact).await {
                Ok(DeliveryOutcome::Delivered) => {
                    info!(
                        name = %contact.name,
                        phone_number = %contact.phone_number,
                        "successfully delivered SMS message"
                    );
                }
                Ok(DeliveryOutcome::Failed(detail)) => {
                    error!(
                        name = %contact.name,
                        phone_number = %contact.phone_number,
                        detail = detail.as_deref().unwrap_or("no detail from provider"),
                        "failed to deliver SMS message"
                    );
                }
                Ok(DeliveryOutcome::StatusUnknown) => {
                    warn!(
                        name = %contact.name,
                        phone_number = %contact.phone_number,
                        attempts = self.status_poll_attempts,
                        "delivery status still unknown after polling"
                    );
                }
                Err(e) => {
                    error!(
                        name = %contact.name,
                        phone_number = %contact.phone_number,
                        "failed to send SMS message: {e}"
                    );
                }
            }
        }
    }

    async fn notify_contact(
        &self,
        payload: &str,
        contact: &Contact,
    ) -> Result<DeliveryOutcome, ProviderError> {
        debug!(
            name = %contact.name,
            phone_number = %contact.phone_number,
            "queueing SMS message"
        );

        let sid = self.client.send_message(payload, &contact.phone_number).await?;

        debug!(
            name = %contact.name,
            sid = %sid,
            "SMS message queued, polling delivery status"
        );

        self.poll_delivery(&sid).await
    }

    /// Poll the message status at a fixed interval until a terminal status
    /// is observed or the attempt budget is exhausted.
    async fn poll_delivery(&self, sid: &str) -> Result<DeliveryOutcome, ProviderError> {
        for attempt in 0..self.status_poll_attempts {
            if attempt > 0 {
                sleep(self.status_poll_interval).await;
            }

            let message = self.client.fetch_status(sid).await?;
            match message.status {
                DeliveryStatus::Delivered => return Ok(DeliveryOutcome::Delivered),
                DeliveryStatus::Failed | DeliveryStatus::Undelivered => {
                    return Ok(DeliveryOutcome::Failed(message.error_message));
                }
                status => {
                    debug!(sid = %sid, ?status, "SMS message not yet in a terminal status");
                }
            }
        }

        Ok(DeliveryOutcome::StatusUnknown)
    }
}

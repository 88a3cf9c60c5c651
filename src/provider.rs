use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors returned by the messaging provider API.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// HTTP transport failure (connect, timeout, decode)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider rejected the request with an error status
    #[error("provider returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// Phone-number lookup did not find the number
    #[error("phone number not found")]
    NotFound,

    /// Credentials were rejected by the provider
    #[error("authentication with the messaging provider failed")]
    Unauthorized,
}

/// Provider credentials, loaded once at startup and read-only thereafter.
#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub messaging_service_sid: String,
}

/// Message delivery status as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Queued,
    Accepted,
    Scheduled,
    Sending,
    Sent,
    Delivered,
    Undelivered,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl DeliveryStatus {
    /// Terminal statuses see no further provider-side transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DeliveryStatus::Delivered | DeliveryStatus::Undelivered | DeliveryStatus::Failed
        )
    }
}

/// Snapshot of a message's delivery state.
#[derive(Debug, Clone)]
pub struct MessageStatus {
    pub status: DeliveryStatus,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
    status: DeliveryStatus,
    #[serde(default)]
    error_message: Option<String>,
}

/// Client for the messaging provider: number lookup, message submission and
/// delivery-status fetch. Constructed once at startup; the session handle and
/// service id are never mutated afterwards.
#[derive(Debug)]
pub struct MessagingClient {
    http: Client,
    credentials: ProviderCredentials,
    api_url: String,
    lookup_url: String,
}

impl MessagingClient {
    pub fn new(
        credentials: ProviderCredentials,
        api_url: impl Into<String>,
        lookup_url: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            credentials,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            lookup_url: lookup_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Check whether a phone number is routable. A 404 from the lookup
    /// endpoint maps to `ProviderError::NotFound`; any other non-success
    /// status is a hard provider error.
    pub async fn lookup_number(&self, phone_number: &str) -> Result<(), ProviderError> {
        let url = format!("{}/v1/PhoneNumbers/{}", self.lookup_url, phone_number);
        debug!(phone_number, "looking up phone number");

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.credentials.account_sid, Some(&self.credentials.auth_token))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(ProviderError::NotFound),
            StatusCode::UNAUTHORIZED => Err(ProviderError::Unauthorized),
            status => Err(ProviderError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }

    /// Submit a message through the configured messaging service. Returns the
    /// provider-assigned message sid used for status polling.
    pub async fn send_message(&self, body: &str, to: &str) -> Result<String, ProviderError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_url, self.credentials.account_sid
        );
        debug!(to, "submitting message");

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.credentials.account_sid, Some(&self.credentials.auth_token))
            .form(&[
                ("To", to),
                ("MessagingServiceSid", self.credentials.messaging_service_sid.as_str()),
                ("Body", body),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::UNAUTHORIZED => ProviderError::Unauthorized,
                _ => ProviderError::Api {
                    status: status.as_u16(),
                    message: response.text().await.unwrap_or_default(),
                },
            });
        }

        let created: MessageResource = response.json().await?;
        debug!(sid = %created.sid, "message submitted");
        Ok(created.sid)
    }

    /// Fetch the current delivery status of a previously submitted message.
    pub async fn fetch_status(&self, sid: &str) -> Result<MessageStatus, ProviderError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages/{}.json",
            self.api_url, self.credentials.account_sid, sid
        );

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.credentials.account_sid, Some(&self.credentials.auth_token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::UNAUTHORIZED => ProviderError::Unauthorized,
                StatusCode::NOT_FOUND => ProviderError::NotFound,
                _ => ProviderError::Api {
                    status: status.as_u16(),
                    message: response.text().await.unwrap_or_default(),
                },
            });
        }

        let resource: MessageResource = response.json().await?;
        Ok(MessageStatus {
            status: resource.status,
            error_message: resource.error_message,
        })
    }
}

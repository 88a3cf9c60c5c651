use crate::provider::{MessagingClient, ProviderError};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// A notification recipient, loaded from the contacts file. Immutable once
/// loaded; phone numbers are not deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Contact {
    pub name: String,
    pub phone_number: String,
}

#[derive(Error, Debug)]
pub enum ContactError {
    /// Every configured contact failed the provider lookup
    #[error("all configured contact phone numbers are invalid")]
    NoUsableContacts,

    /// A lookup failed for a reason other than "number not found"
    #[error("contact validation failed: {0}")]
    Provider(#[from] ProviderError),
}

/// The configured contact set, validated once at startup against the
/// provider's phone-number lookup.
#[derive(Debug)]
pub struct ContactDirectory {
    contacts: Vec<Contact>,
}

impl ContactDirectory {
    pub fn new(contacts: Vec<Contact>) -> Self {
        Self { contacts }
    }

    /// Partition the configured contacts into valid and invalid sets via
    /// provider lookup, returning the valid contacts in configured order.
    ///
    /// A "not found" lookup marks the contact invalid and continues; any
    /// other provider error aborts validation, since silently treating an
    /// auth or rate-limit failure as "invalid contact" would drop
    /// recipients. Zero surviving contacts is itself a fatal error.
    pub async fn validate(&self, client: &MessagingClient) -> Result<Vec<Contact>, ContactError> {
        let mut valid = Vec::new();
        let mut invalid = Vec::new();

        for contact in &self.contacts {
            debug!(
                name = %contact.name,
                phone_number = %contact.phone_number,
                "validating contact phone number"
            );

            match client.lookup_number(&contact.phone_number).await {
                Ok(()) => {
                    debug!(
                        name = %contact.name,
                        phone_number = %contact.phone_number,
                        "contact phone number is valid"
                    );
                    valid.push(contact.clone());
                }
                Err(ProviderError::NotFound) => {
                    warn!(
                        name = %contact.name,
                        phone_number = %contact.phone_number,
                        "contact phone number is invalid"
                    );
                    invalid.push(contact.clone());
                }
                Err(e) => return Err(e.into()),
            }
        }

        if !invalid.is_empty() {
            warn!("{} contact(s) with an invalid phone number", invalid.len());
        }

        if valid.is_empty() {
            return Err(ContactError::NoUsableContacts);
        }

        if valid.len() == self.contacts.len() {
            debug!("all {} configured contact phone numbers are valid", valid.len());
        } else {
            debug!("{} of {} contacts have a valid phone number", valid.len(), self.contacts.len());
        }

        Ok(valid)
    }
}

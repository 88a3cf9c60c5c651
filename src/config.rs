use crate::cli::Args;
use crate::contacts::Contact;
use crate::provider::ProviderCredentials;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// One or more required settings were not supplied, listed by flag and
    /// environment-variable name
    #[error("missing required configuration: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("failed to read contacts file {path}: {source}")]
    ContactsIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("contacts file {path} is not valid JSON: {source}")]
    ContactsJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("contacts file {path} has no \"contacts\" array")]
    MissingContactsArray { path: PathBuf },
}

#[derive(Debug, Deserialize)]
struct ContactsFile {
    contacts: Vec<Contact>,
}

/// Runtime configuration, assembled once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_file: PathBuf,
    pub contacts: Vec<Contact>,
    /// Absent only in dry-run mode, which never talks to the provider.
    pub credentials: Option<ProviderCredentials>,
    pub api_url: String,
    pub lookup_url: String,
    pub poll_interval: u64,
    pub status_poll_interval: u64,
    pub status_poll_attempts: u32,
    pub detach_dispatch: bool,
    pub dry_run: bool,
}

impl Config {
    /// Build the configuration from CLI arguments (with their env-var
    /// fallbacks). Outside dry-run, all provider settings and the contacts
    /// file are required; every missing one is reported in a single error.
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let (contacts, credentials) = if args.dry_run {
            (Vec::new(), None)
        } else {
            let mut missing = Vec::new();
            if args.contacts_file.is_none() {
                missing.push("--contacts-file (CONTACTS_FILE)".to_string());
            }
            if args.account_sid.is_none() {
                missing.push("--account-sid (TWILIO_ACCOUNT_SID)".to_string());
            }
            if args.auth_token.is_none() {
                missing.push("--auth-token (TWILIO_AUTH_TOKEN)".to_string());
            }
            if args.messaging_service_sid.is_none() {
                missing.push("--messaging-service-sid (TWILIO_MSG_SERVICE_SID)".to_string());
            }
            if !missing.is_empty() {
                return Err(ConfigError::MissingFields(missing));
            }

            // The is_none checks above guarantee these are present.
            let contacts_file = args.contacts_file.clone().unwrap_or_default();
            let credentials = ProviderCredentials {
                account_sid: args.account_sid.clone().unwrap_or_default(),
                auth_token: args.auth_token.clone().unwrap_or_default(),
                messaging_service_sid: args.messaging_service_sid.clone().unwrap_or_default(),
            };

            (Self::load_contacts(&contacts_file)?, Some(credentials))
        };

        Ok(Config {
            log_file: args.log_file.clone(),
            contacts,
            credentials,
            api_url: args.api_url.clone(),
            lookup_url: args.lookup_url.clone(),
            poll_interval: args.poll_interval,
            status_poll_interval: args.status_poll_interval,
            status_poll_attempts: args.status_poll_attempts,
            detach_dispatch: args.detach_dispatch,
            dry_run: args.dry_run,
        })
    }

    /// Load the `{"contacts": [...]}` file, distinguishing unreadable file,
    /// malformed JSON and a missing "contacts" array.
    fn load_contacts(path: &Path) -> Result<Vec<Contact>, ConfigError> {
        debug!(path = %path.display(), "loading contacts file");

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::ContactsIo {
            path: path.to_path_buf(),
            source,
        })?;

        let value: serde_json::Value =
            serde_json::from_str(&raw).map_err(|source| ConfigError::ContactsJson {
                path: path.to_path_buf(),
                source,
            })?;

        if value.get("contacts").is_none() {
            return Err(ConfigError::MissingContactsArray {
                path: path.to_path_buf(),
            });
        }

        let file: ContactsFile =
            serde_json::from_value(value).map_err(|source| ConfigError::ContactsJson {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(count = file.contacts.len(), "loaded contacts");
        Ok(file.contacts)
    }
}

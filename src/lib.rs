pub mod cli;
pub mod config;
pub mod contacts;
pub mod matcher;
pub mod notifier;
pub mod provider;
pub mod watcher;

pub use cli::Args;
pub use config::{Config, ConfigError};
pub use contacts::{Contact, ContactDirectory, ContactError};
pub use matcher::{EventClass, Matcher};
pub use notifier::{DeliveryOutcome, Notifier};
pub use provider::{
    DeliveryStatus, MessageStatus, MessagingClient, ProviderCredentials, ProviderError,
};
pub use watcher::LogWatcher;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "authwatch",
    about = "SSH auth-log monitoring with SMS notifications for privileged activity",
    version,
    long_about = "Authwatch follows a system authentication log and sends an SMS to every \
configured contact whenever a privileged command is executed or an SSH session is opened. \
Contacts are validated against the messaging provider at startup and each message is polled \
until the provider reports a terminal delivery status."
)]
pub struct Args {
    /// Path to the authentication log to follow
    #[arg(short = 'f', long = "log-file", env = "SSH_AUTH_FILE")]
    pub log_file: PathBuf,

    /// Path to the contacts JSON file ({"contacts": [{"name", "phone_number"}]})
    #[arg(short = 'c', long = "contacts-file", env = "CONTACTS_FILE")]
    pub contacts_file: Option<PathBuf>,

    /// Messaging provider account SID
    #[arg(long = "account-sid", env = "TWILIO_ACCOUNT_SID", hide_env_values = true)]
    pub account_sid: Option<String>,

    /// Messaging provider auth token
    #[arg(long = "auth-token", env = "TWILIO_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Messaging service SID used as the sender profile
    #[arg(
        long = "messaging-service-sid",
        env = "TWILIO_MSG_SERVICE_SID",
        hide_env_values = true
    )]
    pub messaging_service_sid: Option<String>,

    /// Base URL of the messaging API
    #[arg(long = "api-url", default_value = "https://api.twilio.com")]
    pub api_url: String,

    /// Base URL of the phone-number lookup API
    #[arg(long = "lookup-url", default_value = "https://lookups.twilio.com")]
    pub lookup_url: String,

    /// Log polling interval in milliseconds
    #[arg(long = "poll-interval", default_value = "1000")]
    pub poll_interval: u64,

    /// Delivery-status polling interval in milliseconds
    #[arg(long = "status-poll-interval", default_value = "1000")]
    pub status_poll_interval: u64,

    /// Maximum delivery-status polls per message before giving up
    #[arg(long = "status-poll-attempts", default_value = "60")]
    pub status_poll_attempts: u32,

    /// Dispatch notifications on a separate task so tailing never stalls
    #[arg(long = "detach-dispatch")]
    pub detach_dispatch: bool,

    /// Scan existing log content for matches and exit (no SMS is sent)
    #[arg(short = 'd', long = "dry-run")]
    pub dry_run: bool,
}

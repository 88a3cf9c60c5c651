use authwatch::cli::Args;
use authwatch::config::Config;
use authwatch::contacts::ContactDirectory;
use authwatch::notifier::Notifier;
use authwatch::provider::MessagingClient;
use authwatch::watcher::LogWatcher;
use clap::Parser;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            process::exit(2);
        }
    };

    // Ctrl-C raises the shutdown signal watched by the tail loop.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    let notifier = if config.dry_run {
        None
    } else {
        let Some(credentials) = config.credentials.clone() else {
            eprintln!("Configuration error: provider credentials missing");
            process::exit(2);
        };

        let client = Arc::new(MessagingClient::new(
            credentials,
            &config.api_url,
            &config.lookup_url,
        ));

        let directory = ContactDirectory::new(config.contacts.clone());
        let valid_contacts = match directory.validate(&client).await {
            Ok(contacts) => contacts,
            Err(e) => {
                error!("Contact validation failed: {e}");
                process::exit(2);
            }
        };
        info!("validated {} contact(s) for notification", valid_contacts.len());

        Some(Arc::new(Notifier::new(
            client,
            valid_contacts,
            Duration::from_millis(config.status_poll_interval),
            config.status_poll_attempts,
        )))
    };

    let watcher = LogWatcher::new(config, notifier);

    match watcher.run(shutdown_rx).await {
        Ok(()) => {
            info!("authwatch stopped");
            process::exit(0);
        }
        Err(e) => {
            error!("authwatch failed: {e:#}");
            process::exit(1);
        }
    }
}

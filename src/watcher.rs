use crate::config::Config;
use crate::matcher::{EventClass, Matcher};
use crate::notifier::Notifier;
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tracing::{error, info};

/// Follows the authentication log from its current end, matching each
/// appended line and handing matches to the notifier. Lines written before
/// attachment are never processed.
#[derive(Debug)]
pub struct LogWatcher {
    config: Config,
    matcher: Matcher,
    notifier: Option<Arc<Notifier>>,
}

#[derive(Debug)]
enum FileEvent {
    NewLine(String),
    StreamError(anyhow::Error),
}

impl LogWatcher {
    /// `notifier` is only absent in dry-run mode, which never dispatches.
    pub fn new(config: Config, notifier: Option<Arc<Notifier>>) -> Self {
        Self {
            config,
            matcher: Matcher::new(),
            notifier,
        }
    }

    /// Run until the log stream fails or `shutdown` fires. Dry-run scans the
    /// existing content once and returns.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<()> {
        if self.config.dry_run {
            self.run_dry_mode()
        } else {
            self.run_tail_mode(shutdown).await
        }
    }

    /// One-shot scan of the existing file content, reporting per-class match
    /// counts without sending anything.
    fn run_dry_mode(&self) -> Result<()> {
        info!(path = %self.config.log_file.display(), "running in dry-run mode");

        let file = File::open(&self.config.log_file).with_context(|| {
            format!("failed to open log file: {}", self.config.log_file.display())
        })?;
        let reader = BufReader::new(file);

        let mut counts: HashMap<EventClass, usize> = HashMap::new();
        for line in reader.lines() {
            let line = line.with_context(|| {
                format!("failed to read log file: {}", self.config.log_file.display())
            })?;
            if let Some(class) = self.matcher.match_line(&line) {
                *counts.entry(class).or_insert(0) += 1;
                println!("[DRY-RUN] {line}");
            }
        }

        for class in EventClass::ALL {
            println!("{}: {} match(es)", class.label(), counts.get(&class).copied().unwrap_or(0));
        }

        Ok(())
    }

    async fn run_tail_mode(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let path = &self.config.log_file;

        // Opening must succeed before the loop starts; a missing or
        // unreadable log is a fatal startup error.
        let file = File::open(path)
            .with_context(|| format!("failed to open log file: {}", path.display()))?;
        let attach_position = file
            .metadata()
            .with_context(|| format!("failed to stat log file: {}", path.display()))?
            .len();
        drop(file);

        let notifier = self
            .notifier
            .clone()
            .context("log watcher started without a notifier")?;

        // Optionally move dispatch onto its own task so a slow provider
        // never stalls tailing.
        let dispatch_tx = if self.config.detach_dispatch {
            let (tx, mut rx) = mpsc::channel::<String>(100);
            let dispatch_notifier = notifier.clone();
            tokio::spawn(async move {
                while let Some(payload) = rx.recv().await {
                    dispatch_notifier.process(&payload).await;
                }
            });
            Some(tx)
        } else {
            None
        };

        let (tx, mut rx) = mpsc::channel::<FileEvent>(100);
        let _fs_watcher = self.start_file_watcher(path.clone(), tx.clone())?;
        self.start_tail_task(path.clone(), attach_position, tx, shutdown.clone());

        info!(path = %path.display(), "watching for new log activity");

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("shutdown signal received, stopping watch loop");
                    return Ok(());
                }
                event = rx.recv() => match event {
                    Some(FileEvent::NewLine(line)) => {
                        self.handle_line(&line, &notifier, dispatch_tx.as_ref()).await;
                    }
                    Some(FileEvent::StreamError(e)) => {
                        error!("log stream error: {e:#}");
                        return Err(e);
                    }
                    None => return Ok(()),
                },
            }
        }
    }

    async fn handle_line(
        &self,
        line: &str,
        notifier: &Arc<Notifier>,
        dispatch_tx: Option<&mpsc::Sender<String>>,
    ) {
        let Some(class) = self.matcher.match_line(line) else {
            return;
        };

        info!(event = class.label(), "auth activity detected");

        // The raw line, trailing newline included, is the message payload.
        match dispatch_tx {
            Some(tx) => {
                if tx.send(line.to_string()).await.is_err() {
                    error!("dispatch task stopped, dropping notification");
                }
            }
            None => notifier.process(line).await,
        }
    }

    /// Filesystem watcher held for the lifetime of the loop; its only job is
    /// surfacing backend errors, since the tail task polls for content.
    fn start_file_watcher(
        &self,
        path: PathBuf,
        tx: mpsc::Sender<FileEvent>,
    ) -> Result<RecommendedWatcher> {
        let mut fs_watcher =
            notify::recommended_watcher(move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if matches!(event.kind, EventKind::Modify(_)) {
                        // New content is picked up by the polling task.
                    }
                }
                Err(e) => {
                    let _ = tx.try_send(FileEvent::StreamError(anyhow::anyhow!(e)));
                }
            })?;

        fs_watcher
            .watch(&path, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch log file: {}", path.display()))?;

        Ok(fs_watcher)
    }

    fn start_tail_task(
        &self,
        path: PathBuf,
        attach_position: u64,
        tx: mpsc::Sender<FileEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let poll_interval = Duration::from_millis(self.config.poll_interval);

        tokio::spawn(async move {
            let mut position = attach_position;

            loop {
                tokio::select! {
                    _ = shutdown.changed() => return,
                    _ = sleep(poll_interval) => {}
                }

                match Self::read_appended_lines(&path, position) {
                    Ok((new_position, lines)) => {
                        position = new_position;
                        for line in lines {
                            if tx.send(FileEvent::NewLine(line)).await.is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(FileEvent::StreamError(e)).await;
                        return;
                    }
                }
            }
        });
    }

    /// Read complete lines appended since `position`, returning the new read
    /// position. A partial line without its newline is left in the file for
    /// the next poll. Shrinking is a stream error: follow mode does not
    /// re-handle rotation.
    fn read_appended_lines(path: &Path, position: u64) -> Result<(u64, Vec<String>)> {
        let current_size = std::fs::metadata(path)
            .with_context(|| format!("failed to stat log file: {}", path.display()))?
            .len();

        if current_size < position {
            anyhow::bail!("log file shrank from {position} to {current_size} bytes (rotated or truncated)");
        }
        if current_size == position {
            return Ok((position, Vec::new()));
        }

        let file = File::open(path)
            .with_context(|| format!("failed to open log file: {}", path.display()))?;
        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(position))?;

        let mut lines = Vec::new();
        let mut consumed = position;
        let mut line = String::new();

        loop {
            line.clear();
            let read = reader.read_line(&mut line)?;
            if read == 0 {
                break;
            }
            if !line.ends_with('\n') {
                // Incomplete tail write; retry once the line is finished.
                break;
            }
            consumed += read as u64;
            lines.push(line.clone());
        }

        Ok((consumed, lines))
    }
}

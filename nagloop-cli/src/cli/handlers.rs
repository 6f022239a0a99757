//! Command handlers

use anyhow::{Context, Result};
use clap::Args;
use nagloop_core::dispatch::{deliver, DispatchSettings, Dispatcher};
use nagloop_core::models::{Configuration, Notice, SinkKind};
use nagloop_core::producers::{GitHubClient, Greeter, PullRequestWatcher};
use nagloop_core::services::logging::init_logging;
use nagloop_core::sinks::{ChatSink, HipChatSink, LogSink, TelegramSink};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const GITHUB_TOKEN_ENV: &str = "NAGLOOP_GITHUB_TOKEN";
const HIPCHAT_TOKEN_ENV: &str = "NAGLOOP_HIPCHAT_TOKEN";
const TELEGRAM_TOKEN_ENV: &str = "NAGLOOP_TELEGRAM_BOT_TOKEN";

/// API tokens; flags win over environment variables.
#[derive(Args, Debug, Default, Clone)]
pub struct Credentials {
    /// GitHub access token [env: NAGLOOP_GITHUB_TOKEN]
    #[arg(long)]
    github_token: Option<String>,

    /// HipChat access token [env: NAGLOOP_HIPCHAT_TOKEN]
    #[arg(long)]
    hipchat_token: Option<String>,

    /// Telegram bot token [env: NAGLOOP_TELEGRAM_BOT_TOKEN]
    #[arg(long)]
    telegram_token: Option<String>,
}

impl Credentials {
    /// Fill unset tokens through `lookup` (the process environment in production).
    fn resolve_with(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let pick = |flag: Option<String>, var: &str| {
            flag.filter(|t| !t.is_empty())
                .or_else(|| lookup(var).filter(|t| !t.is_empty()))
        };
        Self {
            github_token: pick(self.github_token, GITHUB_TOKEN_ENV),
            hipchat_token: pick(self.hipchat_token, HIPCHAT_TOKEN_ENV),
            telegram_token: pick(self.telegram_token, TELEGRAM_TOKEN_ENV),
        }
    }

    fn resolve(self) -> Self {
        self.resolve_with(|var| std::env::var(var).ok())
    }
}

/// Expand `~/` and fall back to the XDG default for the stock path.
fn resolve_config_path(config_file: &str) -> Result<PathBuf> {
    if config_file == "~/.config/nagloop/config.toml" {
        if let Ok(path) = Configuration::default_config_path() {
            return Ok(path);
        }
    }
    if let Some(rest) = config_file.strip_prefix("~/") {
        let home = std::env::var("HOME")
            .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        return Ok(PathBuf::from(home).join(rest));
    }
    Ok(PathBuf::from(config_file))
}

fn load_config(config_file: &str) -> Result<Configuration> {
    let path = resolve_config_path(config_file)?;
    let config = Configuration::load_from_file(&path)
        .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path.display(), e))?;
    if let Err(errors) = config.validate() {
        anyhow::bail!(
            "Invalid configuration in {}:\n  {}",
            path.display(),
            errors.join("\n  ")
        );
    }
    Ok(config)
}

fn build_sink(
    config: &Configuration,
    credentials: &Credentials,
    dry_run: bool,
) -> Result<Arc<dyn ChatSink>> {
    if dry_run {
        return Ok(Arc::new(LogSink::new()));
    }
    let base_url = config.sink.base_url.clone();
    let sink: Arc<dyn ChatSink> = match config.sink.kind {
        SinkKind::Hipchat => {
            let token = credentials
                .hipchat_token
                .clone()
                .with_context(|| format!("HipChat token not set ({})", HIPCHAT_TOKEN_ENV))?;
            match base_url {
                Some(url) => Arc::new(HipChatSink::with_base_url(token, url)),
                None => Arc::new(HipChatSink::new(token)),
            }
        }
        SinkKind::Telegram => {
            let token = credentials
                .telegram_token
                .clone()
                .with_context(|| format!("Telegram token not set ({})", TELEGRAM_TOKEN_ENV))?;
            match base_url {
                Some(url) => Arc::new(TelegramSink::with_base_url(token, url)),
                None => Arc::new(TelegramSink::new(token)),
            }
        }
        SinkKind::Log => Arc::new(LogSink::new()),
    };
    Ok(sink)
}

fn build_dispatcher(
    config: &Configuration,
    credentials: &Credentials,
    sink: Arc<dyn ChatSink>,
) -> Result<Dispatcher> {
    let mut dispatcher = Dispatcher::with_settings(sink, DispatchSettings::from_config(config));

    if !config.pull_requests.is_empty() {
        let token = credentials
            .github_token
            .clone()
            .with_context(|| format!("GitHub token not set ({})", GITHUB_TOKEN_ENV))?;
        let client = GitHubClient::new(token);
        for watch in &config.pull_requests {
            dispatcher.register(PullRequestWatcher::from_config(client.clone(), watch));
        }
    }

    for greeter in &config.greeters {
        dispatcher.register(Greeter::from_config(greeter));
    }

    Ok(dispatcher)
}

/// Handle the 'run' command
pub async fn handle_run(
    config_file: String,
    credentials: Credentials,
    dry_run: bool,
) -> Result<()> {
    let config = load_config(&config_file)?;
    init_logging(config.log_level).map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))?;

    let credentials = credentials.resolve();
    let sink = build_sink(&config, &credentials, dry_run)?;
    let dispatcher = build_dispatcher(&config, &credentials, sink)?;
    if dispatcher.is_empty() {
        println!("No producers configured; add [[pull_requests]] or [[greeters]] to the config.");
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping producers");
            on_signal.cancel();
        }
    });

    println!(
        "nagloop running {} producer(s). Press Ctrl+C to stop",
        dispatcher.len()
    );
    let summary = dispatcher.run_until_cancelled(cancel).await;
    println!(
        "Stopped after {} cycle(s) across {} producer(s), {} fault(s)",
        summary.cycles, summary.units, summary.faults
    );
    Ok(())
}

/// Handle the 'say' command
pub async fn handle_say(
    message: String,
    rooms: Vec<String>,
    config_file: String,
    credentials: Credentials,
    dry_run: bool,
) -> Result<()> {
    let config = load_config(&config_file)?;
    init_logging(config.log_level).map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))?;

    let credentials = credentials.resolve();
    let sink = build_sink(&config, &credentials, dry_run)?;
    let notice = Notice::new(message, rooms);
    let delivered = deliver(sink.as_ref(), &DispatchSettings::from_config(&config), &notice)
        .await
        .context("Delivery failed")?;
    println!("Posted to {} room(s)", delivered);
    Ok(())
}

/// Handle the 'config --init' command
pub fn handle_config_init(config_file: String) -> Result<()> {
    let config_path = resolve_config_path(&config_file)?;
    if config_path.exists() {
        println!(
            "Configuration file already exists: {}",
            config_path.display()
        );
        return Ok(());
    }

    Configuration::default()
        .save_to_file(&config_path)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", config_path.display(), e))?;
    println!("Configuration written to {}", config_path.display());
    Ok(())
}

/// Handle the 'check' command
pub fn handle_check(config_file: String) -> Result<()> {
    let config = load_config(&config_file)?;
    println!(
        "Configuration OK: {} pull request watcher(s), {} greeter(s), sink {:?}",
        config.pull_requests.len(),
        config.greeters.len(),
        config.sink.kind
    );
    Ok(())
}

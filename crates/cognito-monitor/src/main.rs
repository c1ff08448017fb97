/*
[INPUT]:  CLI arguments, optional YAML configuration file, OS shutdown signals
[OUTPUT]: Submitted task followed until terminal state or cancellation
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cognito_adapter::TaskStatus;
use cognito_monitor::{MonitorConfig, PollExit, PollUpdate, TaskMonitor, TransitionEntry};

#[derive(Parser, Debug)]
#[command(
    name = "cognito-monitor",
    version,
    about = "Submit a media URL or transcript to Cognito and follow its task"
)]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
    #[arg(long = "url", value_name = "LOCATOR", conflicts_with = "transcript")]
    url: Option<String>,
    /// File whose text is submitted as the transcript of --episode-id
    #[arg(long = "transcript", value_name = "PATH", requires = "episode_id")]
    transcript: Option<PathBuf>,
    #[arg(long = "episode-id", value_name = "ID", requires = "transcript")]
    episode_id: Option<i64>,
    #[arg(long = "interval-ms", value_name = "MS")]
    interval_ms: Option<u64>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    #[arg(long = "dry-run")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    let mut config = load_config(args.config_path.as_ref())?;
    if let Some(interval_ms) = args.interval_ms {
        config.poll.interval_ms = interval_ms;
    }
    config.validate().context("validate config")?;

    info!(
        base_url = %config.server.base_url,
        interval_ms = config.poll.interval_ms,
        dry_run = args.dry_run,
        "starting cognito-monitor"
    );

    if args.dry_run {
        info!("dry-run requested; configuration validated");
        return Ok(());
    }

    let monitor = TaskMonitor::from_config(&config)?;
    let interval = config.poll_interval();

    let task = match (args.url, args.transcript, args.episode_id) {
        (Some(locator), _, _) => monitor
            .submit_and_monitor(&locator, interval, print_update)
            .await
            .context("submit task")?,
        (None, Some(path), Some(episode_id)) => {
            let transcript = std::fs::read_to_string(&path)
                .with_context(|| format!("read transcript {}", path.display()))?;
            monitor
                .submit_transcript_and_monitor(episode_id, &transcript, interval, print_update)
                .await
                .context("submit transcript")?
        }
        _ => bail!("--url or --transcript with --episode-id is required unless --dry-run is set"),
    };
    info!(task_id = %task.handle(), origin = %task.origin(), "monitoring task");

    setup_signal_handlers(task.cancellation_token());

    let handle = task.handle().clone();
    let record = task.record();
    let exit = task.wait().await?;

    let (snapshot, history) = {
        let record = record.lock().await;
        let history = record
            .log()
            .recent(config.history.display_limit)
            .to_vec();
        (record.snapshot().clone(), history)
    };
    print_history(&history);

    match exit {
        PollExit::Terminal(TaskStatus::Failed) => {
            bail!("task {handle} failed: {}", snapshot.message)
        }
        PollExit::Terminal(status) => {
            info!(task_id = %handle, status = %status, result_id = ?snapshot.result_id, "task finished");
        }
        PollExit::Cancelled => {
            warn!(task_id = %handle, status = %snapshot.status, "monitoring cancelled");
        }
    }

    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<MonitorConfig> {
    let Some(path) = path else {
        return Ok(MonitorConfig::default());
    };
    let path_str = path.to_str().context("config path must be valid utf-8")?;
    MonitorConfig::from_file(path_str).context("load config")
}

fn print_update(update: &PollUpdate) {
    let marker = if update.new_entry.is_some() { "*" } else { " " };
    println!(
        "{marker} [{:>3}%] {:<8} {} | {}",
        update.descriptor.progress,
        update.descriptor.severity,
        update.descriptor.label,
        update.snapshot.message
    );
}

fn print_history(history: &[TransitionEntry]) {
    println!("history:");
    for entry in history {
        println!(
            "  {} {:<13} {}",
            entry.timestamp.format("%H:%M:%S"),
            entry.status,
            entry.message
        );
    }
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}

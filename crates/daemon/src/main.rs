//! Duebell - due-date reminder daemon
//!
//! Main entry point for the `duebell` binary.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context as _;
use duebell_daemon::cli::USAGE;
use duebell_daemon::context::acquire_instance_lock;
use duebell_daemon::logging::{init_tracing, log_command_execution, log_tick_summary, LogFormat};
use duebell_daemon::{AppContext, Cli, Command};
use duebell_domain::Config;
use duebell_infra::config;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging FIRST so we can see .env loading
    if let Err(err) = init_tracing(LogFormat::from_env()) {
        eprintln!("{err}");
    }

    match dotenvy::dotenv() {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded .env"),
        Err(err) if err.not_found() => tracing::debug!("No .env file found"),
        Err(err) => tracing::warn!(error = %err, "Could not load .env file"),
    }

    let cli = match Cli::parse_from(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("{err}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    let command_name = match cli.command {
        Command::Run => "run",
        Command::Tick => "tick",
        Command::Check => "check",
        Command::Help => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
    };

    let started = Instant::now();
    let result = match cli.command {
        Command::Run => run(&cli).await,
        Command::Tick => tick(&cli).await,
        Command::Check => check(&cli).await,
        Command::Help => Ok(()),
    };
    log_command_execution(command_name, started.elapsed(), result.is_ok());

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(command = command_name, error = %format!("{err:#}"), "Command failed");
            eprintln!("duebell {command_name} failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    config::load(cli.config_path.clone()).context("failed to load configuration")
}

fn load_context(config: Config) -> anyhow::Result<AppContext> {
    AppContext::new(config).context("failed to initialise application context")
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    tracing::info!("Duebell starting...");

    let config = load_config(cli)?;
    // Keep instance lock alive until shutdown
    let _instance_lock = acquire_instance_lock(&config).context("cannot start daemon")?;
    let ctx = load_context(config)?;
    ctx.health_check().await.context("task store health check failed")?;

    if !ctx.config.reminder.enabled {
        tracing::warn!("Reminders are disabled (reminder.enabled = false); nothing to schedule");
        return Ok(());
    }

    let mut scheduler = ctx.create_reminder_scheduler().await?;
    scheduler.start().await.context("failed to start reminder scheduler")?;
    tracing::info!(cron = %ctx.config.reminder.tick_cron, "Duebell initialized successfully");

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, stopping scheduler");

    scheduler.stop().await.context("failed to stop reminder scheduler")?;

    let snapshot = scheduler.metrics().snapshot();
    tracing::info!(
        ticks_started = snapshot.ticks_started,
        ticks_completed = snapshot.ticks_completed,
        ticks_failed = snapshot.ticks_failed,
        reminders_dispatched = snapshot.reminders_dispatched,
        avg_tick_ms = scheduler.metrics().avg_tick_time_ms().ok(),
        "Duebell stopped"
    );
    Ok(())
}

/// Resolves on SIGINT (Ctrl-C) or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

async fn tick(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    let _instance_lock = acquire_instance_lock(&config)
        .context("refusing manual tick while a duebell daemon is already running")?;
    let ctx = load_context(config)?;
    ctx.health_check().await.context("task store health check failed")?;

    let report = ctx.service.run_tick().await?;
    log_tick_summary(&report);

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn check(cli: &Cli) -> anyhow::Result<()> {
    let ctx = load_context(load_config(cli)?)?;
    ctx.health_check().await.context("task store health check failed")?;

    // mail.password is skipped by serialization
    println!("{}", serde_json::to_string_pretty(&ctx.config)?);
    Ok(())
}

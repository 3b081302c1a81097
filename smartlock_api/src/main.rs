//! # SmartLock Service Binary
//!
//! Drives the lock servo, watches the reed switches and serves the HTTP
//! control surface.
//!
//! # Usage
//!
//! ```bash
//! # Simulated servo, config from ./smartlock.toml
//! smartlock --dry-run
//!
//! # Explicit config, overriding the listener
//! smartlock --config /etc/smartlock/smartlock.toml --port 8443
//!
//! # Verbose JSON logs
//! smartlock -v --json
//! ```

use clap::Parser;
use smartlock_api::{AppState, ServoEcho, serve};
use smartlock_common::prelude::*;
use smartlock_control::{AutoLockTask, CoordinatorConfig, LockCoordinator, MonotonicClock};
use smartlock_hal::{DriverRegistry, Hardware, build_hardware};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// SmartLock - servo door lock with reed switch confirmation
#[derive(Parser, Debug)]
#[command(name = "smartlock")]
#[command(version)]
#[command(about = "Servo door lock coordinator with HTTP control")]
#[command(long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "smartlock.toml")]
    config: PathBuf,

    /// Servo PWM pin
    #[arg(long)]
    pin: Option<u8>,

    /// Minimum servo pulse width [s]
    #[arg(long)]
    min_pulse_width: Option<f64>,

    /// Maximum servo pulse width [s]
    #[arg(long)]
    max_pulse_width: Option<f64>,

    /// Resting angle [deg]
    #[arg(long, allow_negative_numbers = true)]
    neutral_angle: Option<f64>,

    /// Lock sweep target [deg]
    #[arg(long, allow_negative_numbers = true)]
    lock_angle: Option<f64>,

    /// Unlock sweep target [deg]
    #[arg(long, allow_negative_numbers = true)]
    unlock_angle: Option<f64>,

    /// Travel time to the target angle [s]
    #[arg(long)]
    move_time: Option<f64>,

    /// Hold time at the target angle [s]
    #[arg(long)]
    hold_time: Option<f64>,

    /// HTTP bind address
    #[arg(long)]
    host: Option<String>,

    /// HTTP bind port
    #[arg(long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    /// Force the simulated servo
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

impl Args {
    /// Command-line values win over the file.
    fn apply_overrides(&self, config: &mut SmartLockConfig) {
        let servo = &mut config.servo;
        if let Some(pin) = self.pin {
            servo.pin = pin;
        }
        if let Some(v) = self.min_pulse_width {
            servo.min_pulse_width = v;
        }
        if let Some(v) = self.max_pulse_width {
            servo.max_pulse_width = v;
        }
        if let Some(v) = self.neutral_angle {
            servo.neutral_angle = v;
        }
        if let Some(v) = self.lock_angle {
            servo.lock_angle = v;
        }
        if let Some(v) = self.unlock_angle {
            servo.unlock_angle = v;
        }
        if let Some(v) = self.move_time {
            servo.move_time = v;
        }
        if let Some(v) = self.hold_time {
            servo.hold_time = v;
        }
        if let Some(host) = &self.host {
            config.web.host = host.clone();
        }
        if let Some(port) = self.port {
            config.web.port = port;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        config.dry_run |= self.dry_run;
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("SmartLock startup failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let loaded = load_config(&args);
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level)
        .unwrap_or_default();
    setup_tracing(&args, level);
    let config = loaded?;

    info!("SmartLock v{} starting...", env!("CARGO_PKG_VERSION"));
    info!(
        "Servo: pin={}, neutral={:.1}, lock={:.1}, unlock={:.1}, move={}s, hold={}s",
        config.servo.pin,
        config.servo.neutral_angle,
        config.servo.lock_angle,
        config.servo.unlock_angle,
        config.servo.move_time,
        config.servo.hold_time
    );

    let registry = DriverRegistry::with_builtin_drivers()?;
    let hardware = build_hardware(&registry, &config)?;
    run_service(&config, hardware, shutdown_signal()).await?;

    info!("SmartLock shutdown complete");
    Ok(())
}

/// Run the coordinator, auto-lock loop and HTTP server until `shutdown`
/// resolves. `hardware` is released on every exit path, including a failed
/// bind.
async fn run_service(
    config: &SmartLockConfig,
    hardware: Hardware,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error>> {
    let coordinator = Arc::new(LockCoordinator::new(
        Arc::clone(&hardware.actuator),
        Arc::clone(&hardware.sensors),
        Arc::new(MonotonicClock::new()),
        CoordinatorConfig::from(&config.features),
    ));
    let auto_lock = match AutoLockTask::spawn(
        Arc::clone(&coordinator),
        config.features.auto_lock_poll_interval(),
    ) {
        Ok(task) => task,
        Err(e) => {
            release(None, &hardware);
            return Err(e.into());
        }
    };

    let echo = ServoEcho::new(
        &config.servo,
        hardware.actuator.name(),
        hardware.actuator.is_dry_run(),
    );
    let state = AppState::new(coordinator, echo);

    let served = match TcpListener::bind((config.web.host.as_str(), config.web.port)).await {
        Ok(listener) => serve(listener, state, shutdown).await,
        Err(e) => {
            error!("Cannot bind {}:{}: {}", config.web.host, config.web.port, e);
            Err(e)
        }
    };

    // Joining the loop may wait out a sweep in progress.
    tokio::task::spawn_blocking(move || release(Some(auto_lock), &hardware)).await?;
    served?;
    Ok(())
}

/// Stop the auto-lock loop, then release the servo and switches.
fn release(auto_lock: Option<AutoLockTask>, hardware: &Hardware) {
    if let Some(mut task) = auto_lock {
        info!("Stopping auto-lock loop");
        task.stop();
    }
    if let Err(e) = hardware.shutdown() {
        error!("Hardware shutdown failed: {}", e);
    }
}

fn load_config(args: &Args) -> Result<SmartLockConfig, ConfigError> {
    let mut config = SmartLockConfig::load(&args.config).map_err(|e| match e {
        ConfigError::FileNotFound => ConfigError::ValidationError(format!(
            "configuration file not found: {}",
            args.config.display()
        )),
        other => other,
    })?;
    args.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Unable to listen for Ctrl+C: {}", err);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                error!("Unable to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received shutdown signal (Ctrl+C)"),
        _ = terminate => info!("Received shutdown signal (SIGTERM)"),
    }
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::from(level)
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

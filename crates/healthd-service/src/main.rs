//! healthd
//!
//! Battery and boot disk telemetry daemon. Polls sysfs on a fixed cadence and
//! keeps the latest snapshots available to the reporting layer.
//!
//! Signals:
//! - SIGTERM / SIGINT: stop after the current cycle
//! - SIGUSR1: poll immediately

use anyhow::{Context, Result, bail};
use clap::Parser;
use healthd_config::HealthdConfig;
use healthd_telemetry::{
    BatterySnapshot, DiskStatsSnapshot, HealthService, PollReport, SnapshotStore, SysfsReader,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Granularity of the wait between polls
const TICK: Duration = Duration::from_millis(250);

static RUNNING: AtomicBool = AtomicBool::new(true);
static POLL_NOW: AtomicBool = AtomicBool::new(false);

#[derive(Parser, Debug)]
#[command(name = "healthd")]
#[command(about = "Battery and boot disk telemetry daemon")]
#[command(version)]
struct Args {
    /// Configuration file (default: /etc/healthd/healthd.toml)
    #[arg(long, env = "HEALTHD_CONFIG")]
    config: Option<PathBuf>,

    /// Sample once, print JSON and exit
    #[arg(long)]
    once: bool,
}

/// JSON document printed by `--once`
#[derive(Debug, Serialize)]
struct OnceReport<'a> {
    battery: Option<&'a BatterySnapshot>,
    disk: Option<&'a DiskStatsSnapshot>,
}

fn main() -> Result<()> {
    setup_logging();

    let args = Args::parse();
    let config = load_config(&args)?;
    let store = Arc::new(SnapshotStore::new());
    let service = HealthService::new(config.telemetry(), SysfsReader::new(), store);

    if args.once {
        return run_once(&service);
    }

    info!(
        "healthd starting: battery {}, boot device {}, polling every {:?}",
        config.battery.battery_dir().display(),
        config.disk.device.name(),
        config.service.poll_interval()
    );

    setup_signal_handlers()?;
    main_loop(&service, &config)
}

/// Setup logging to stderr so `--once` output stays clean
fn setup_logging() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn load_config(args: &Args) -> Result<HealthdConfig> {
    match &args.config {
        Some(path) => HealthdConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => HealthdConfig::load_default().context("Failed to load configuration"),
    }
}

/// Setup signal handlers for shutdown and on-demand polls
fn setup_signal_handlers() -> Result<()> {
    use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};

    let action = SigAction::new(
        SigHandler::Handler(handle_signal),
        SaFlags::empty(),
        SigSet::empty(),
    );

    unsafe {
        sigaction(Signal::SIGTERM, &action)?;
        sigaction(Signal::SIGINT, &action)?;
        sigaction(Signal::SIGUSR1, &action)?;
    }

    Ok(())
}

/// Signal handler; only touches atomics
extern "C" fn handle_signal(sig: i32) {
    match sig {
        libc::SIGTERM | libc::SIGINT => RUNNING.store(false, Ordering::SeqCst),
        libc::SIGUSR1 => POLL_NOW.store(true, Ordering::SeqCst),
        _ => {}
    }
}

fn run_once(service: &HealthService<SysfsReader>) -> Result<()> {
    let report = service.poll();
    log_report(&report, false);

    let output = OnceReport {
        battery: report.battery.as_deref().ok(),
        disk: report.disk.as_deref().ok(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    if report.is_total_failure() {
        bail!("No telemetry could be sampled");
    }
    Ok(())
}

/// Main loop - poll, then wait for the next deadline or a signal
fn main_loop(service: &HealthService<SysfsReader>, config: &HealthdConfig) -> Result<()> {
    let interval = config.service.poll_interval();

    while RUNNING.load(Ordering::SeqCst) {
        let report = service.poll();
        log_report(&report, config.service.log_snapshots);
        wait_for_next_poll(interval);
    }

    info!("healthd stopped");
    Ok(())
}

fn wait_for_next_poll(interval: Duration) {
    let deadline = Instant::now() + interval;

    while RUNNING.load(Ordering::SeqCst) {
        if POLL_NOW.swap(false, Ordering::SeqCst) {
            debug!("Immediate poll requested");
            return;
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return;
        }
        thread::sleep(remaining.min(TICK));
    }
}

fn log_report(report: &PollReport, log_snapshots: bool) {
    match &report.battery {
        Ok(battery) if log_snapshots => log_battery(battery),
        Ok(_) => {}
        Err(e) => warn!("Battery telemetry unavailable: {}", e),
    }

    match &report.disk {
        Ok(disk) if log_snapshots => debug!(
            "Disk {}: counters={:?}",
            disk.device_name,
            disk.counters.to_array()
        ),
        Ok(_) => {}
        Err(e) => warn!("Disk telemetry unavailable: {}", e),
    }
}

fn log_battery(battery: &BatterySnapshot) {
    debug!(
        "Battery: level={}% status={:?} health={:?} voltage={}mV temp={:.1}C current={}uA",
        battery.level_percent,
        battery.status,
        battery.health,
        battery.voltage_millivolts,
        f64::from(battery.temperature_tenths_celsius) / 10.0,
        battery.current_microamps
    );
    debug!(
        "Chargers: ac={} usb={} wireless={} max_current={}uA max_voltage={}uV",
        battery.charger_ac_online,
        battery.charger_usb_online,
        battery.charger_wireless_online,
        battery.max_charging_current_microamps,
        battery.max_charging_voltage_microvolts
    );
    debug!(
        "Charge: counter={}uAh full={}uAh cycles={} technology={}",
        battery.charge_counter_uah,
        battery.full_charge_uah,
        battery.cycle_count,
        battery.technology
    );
}

use clap::Parser;
use log::{error, info};
use tokio::signal;
use tokio::signal::unix::{SignalKind, signal as unix_signal};
use tokio::time::{Duration, interval};

use flora_bridge::bridge::FloraBridge;
use flora_bridge::config::{self, Cli, Config};
use flora_bridge::hub::MemoryStore;
use flora_bridge::input::simulation::{SimulatedReader, SimulatedScanner};
use flora_bridge::instance_lock::InstanceLock;
use flora_bridge::poll::CycleReport;

fn init_logger(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

fn log_report(report: &CycleReport) {
    info!(
        "Poll cycle finished: {} sensor(s) read, {} failed, {} hub write(s)",
        report.polled, report.failed, report.written
    );
}

#[tokio::main]
async fn main() {
    config::load_dotenv();
    let cli = Cli::parse();
    let debug = cli.debug;
    init_logger(debug);
    info!("Starting Flora Bridge");

    let config = match Config::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };
    if debug {
        config.dump();
    }

    // One writer for the registry cache per machine.
    let _lock = match InstanceLock::acquire() {
        Ok(lock) => lock,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    // The simulated transport stands in for a real BLE backend; swap in any
    // SensorScanner/SensorReader/DeviceStore implementation here.
    let scanner = SimulatedScanner::with_defaults();
    let store = MemoryStore::new();

    let mut bridge = match FloraBridge::start(&config, &scanner, store).await {
        Ok(bridge) => bridge,
        Err(e) => {
            error!("Failed to start bridge: {}", e);
            std::process::exit(1);
        }
    };
    let reader = SimulatedReader::new(bridge.sensors());

    info!(
        "Watching {} sensor(s); next poll at {}",
        bridge.sensors().len(),
        bridge.next_due()
    );
    info!("Send SIGUSR1 to poll immediately");

    let mut poll_now = unix_signal(SignalKind::user_defined1())
        .expect("Failed to install SIGUSR1 handler");
    let mut heartbeat = interval(Duration::from_secs(config.heartbeat_secs));

    // Single driver task: each select arm runs a cycle to completion before
    // the next heartbeat is looked at, so cycles never overlap.
    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                if let Some(report) = bridge.on_tick(&reader).await {
                    log_report(&report);
                }
            }
            _ = poll_now.recv() => {
                info!("Manual poll requested");
                let report = bridge.poll_now(&reader).await;
                log_report(&report);
            }
            _ = signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
        }
    }

    info!("Flora Bridge stopped");
}

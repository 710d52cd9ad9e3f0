//! evohome-mitm - transparent CH setpoint limiter
//!
//! Usage:
//!   evohome-mitm                          Use /data/options.json
//!   evohome-mitm --config options.toml    Use another options file
//!   evohome-mitm --port /dev/ttyUSB0      Override the serial device
//!   evohome-mitm --no-mqtt                Static ceiling only

use clap::Parser;
use evohome_mitm::bridge::{Passthrough, Stats};
use evohome_mitm::ceiling::Ceiling;
use evohome_mitm::cli::Cli;
use evohome_mitm::config::{self, Settings};
use evohome_mitm::error::{BridgeError, Result};
use evohome_mitm::logging;
use evohome_mitm::mqtt;
use evohome_mitm::transport::SerialTransport;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_fatal(&e),
    }
}

/// Print a fatal startup error once, on stderr
fn report_fatal(err: &BridgeError) -> ExitCode {
    eprintln!("evohome-mitm: {}", err);
    ExitCode::from(err.exit_code())
}

fn run(cli: &Cli) -> Result<()> {
    info!(
        "=== evohome-mitm {} started (pass-through, ramping) ===",
        env!("CARGO_PKG_VERSION")
    );

    let mut options = config::load(&cli.config)?;
    options.apply_cli(cli);
    let settings = options.validate()?;

    info!(
        "Controller {} -> OTB {}, idle_ch_raw={}",
        settings.controller_id, settings.otb_id, settings.ramp.idle_threshold
    );
    if settings.ramp.enabled {
        info!(
            "Ramping +{} raw per {}s",
            settings.ramp.step,
            settings.ramp.interval.as_secs()
        );
    } else {
        info!("Ramping disabled, clamp only");
    }

    let link = SerialTransport::open(&settings.serial.device, settings.serial.baud_rate)?;
    info!("Serial open: {}", link.port_name());

    let rt = tokio::runtime::Runtime::new().map_err(|source| BridgeError::Runtime { source })?;
    rt.block_on(serve(settings, link));
    Ok(())
}

async fn serve(settings: Settings, link: SerialTransport) {
    let ceiling = Arc::new(Ceiling::new(settings.max_ch_raw, settings.override_timeout));
    let stats = Arc::new(Stats::new());
    info!(
        "Static ceiling max_ch_raw={} ({:.1} °C), override timeout {}s",
        ceiling.default_value(),
        f32::from(ceiling.default_value()) / 2.0,
        settings.override_timeout.as_secs()
    );

    // Setup shutdown handler
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown_clone.store(true, Ordering::SeqCst);
    });

    let listener = match settings.mqtt.clone() {
        Some(mqtt_settings) => Some(tokio::spawn(mqtt::run_listener(
            mqtt_settings,
            ceiling.clone(),
        ))),
        None => {
            info!("MQTT disabled, using static ceiling");
            None
        }
    };

    let session = Passthrough::new(
        link,
        settings.controller_id,
        settings.otb_id,
        ceiling,
        settings.ramp,
        stats,
    );
    match tokio::task::spawn_blocking(move || session.run(shutdown)).await {
        Ok(summary) => info!("Stopped: {}", summary),
        Err(e) => error!("Pass-through loop ended abnormally: {}", e),
    }

    if let Some(listener) = listener {
        listener.abort();
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        _ => {
            warn!("Cannot install signal handlers, running until killed");
            std::future::pending::<()>().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {},
        _ = sigint.recv() => {},
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!("Cannot install Ctrl-C handler, running until killed");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_fatal_exit_code() {
        let err = BridgeError::InvalidDeviceId {
            value: "bogus".into(),
        };
        assert_eq!(report_fatal(&err), ExitCode::from(2));

        let err = BridgeError::SerialOpen {
            port: "/dev/ttyUSB0".into(),
            source: std::io::Error::other("missing"),
        };
        assert_eq!(report_fatal(&err), ExitCode::from(3));
    }
}

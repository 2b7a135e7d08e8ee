//! fobgate: PN532 badge reader driving an indicator light and a relay.
//!
//! The allowlist, timing and pin map are compiled in. Set `RUST_LOG` to
//! change log verbosity (default `info`).

#[cfg(not(feature = "hardware-rpi"))]
mod simulation;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use fobgate_access::clock::SystemClock;
use fobgate_access::{AccessConfig, AccessController, AccessRunner, ReaderPoller};
use fobgate_core::AllowList;
use fobgate_hardware::{AnyCardReader, AnyOutputLine, CardReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("fobgate {}", fobgate_core::VERSION);

    let config = AccessConfig::default();
    config.validate()?;

    let allowlist = AllowList::builtin()?;
    for entry in allowlist.iter() {
        info!("Allowed: {} ({})", entry.display_name(), entry.uid);
    }

    let (reader, indicator, relay) = open_devices()?;
    info!(
        "Using reader {} over {}",
        reader.reader_info().name,
        reader.reader_info().transport
    );

    let stop = Arc::new(AtomicBool::new(false));
    let stop_on_signal = Arc::clone(&stop);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Received Ctrl-C, stopping after the current poll");
                stop_on_signal.store(true, Ordering::SeqCst);
            }
            Err(e) => warn!("Unable to listen for Ctrl-C: {}", e),
        }
    });

    let stats = tokio::task::spawn_blocking(move || -> fobgate_access::Result<_> {
        let mut poller = ReaderPoller::new(reader, config.poll_timeout);
        poller.initialize()?;

        let controller = AccessController::new(allowlist, &config, SystemClock);
        let mut runner = AccessRunner::new(poller, controller, indicator, relay, &config);
        runner.run(&stop)
    })
    .await
    .context("Access loop panicked")??;

    println!();
    info!(
        "Run started {} ended with {} polls",
        stats.started_at.to_rfc3339(),
        stats.polls
    );
    Ok(())
}

#[cfg(not(feature = "hardware-rpi"))]
fn open_devices() -> anyhow::Result<(AnyCardReader, AnyOutputLine, AnyOutputLine)> {
    simulation::devices()
}

#[cfg(feature = "hardware-rpi")]
fn open_devices() -> anyhow::Result<(AnyCardReader, AnyOutputLine, AnyOutputLine)> {
    use fobgate_hardware::PinMap;

    let pins = PinMap::default();
    let devices =
        fobgate_hardware::rpi::open(&pins).context("Failed to open Raspberry Pi peripherals")?;

    Ok((
        AnyCardReader::Pn532(Box::new(devices.reader)),
        AnyOutputLine::Gpio(devices.indicator),
        AnyOutputLine::Gpio(devices.relay),
    ))
}

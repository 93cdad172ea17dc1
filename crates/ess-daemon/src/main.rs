//! Binary entry point: wires a validated device configuration (§6) to the
//! library crates that make up the core (§2) and runs until interrupted.
//!
//! Three subcommands mirror the three data-client postures §4.F and §4.E
//! describe for the same underlying devices:
//!
//! - `run`: every configured device is reached directly (serial/FTDI/TCP,
//!   SNMP, the spectrum analyzer, the thermal scanner) through its own
//!   `ess-dataclients` variant (§4.F.1, §4.F.3-5).
//! - `serve`: this process is the remote aggregator of §4.E, accepting one
//!   controller-protocol client connection at a time.
//! - `relay`: this process is a controller-protocol client (§4.F.2),
//!   forwarding a remote aggregator's telemetry to the same processors
//!   `run` would use locally.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ess_controller::ControllerServer;
use ess_dataclients::snmp::{CsnmpWalker, SnmpDataClient};
use ess_dataclients::{
    build_processor, ControllerDataClient, DataClientHandle, DirectDeviceClient, ReadLoopConfig, ReadLoopDriver,
    SpectrumAnalyzerClient, ThermalScannerClient,
};
use ess_decoders::{Decoder, DecoderRegistry, TemperatureDecoder};
use ess_types::config::SensorType;
use ess_types::DeviceConfig;

use ess_daemon::config::load_config;
use ess_daemon::topics::TracingTopics;

const DEFAULT_CONTROLLER_PORT: u16 = 5000;
const TELEMETRY_LOOP_FINISH_TIMEOUT: Duration = Duration::from_secs(2);
const ERROR_SLEEP: Duration = Duration::from_secs(1);
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);
const STOP_GRACE_PERIOD: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "ess-daemon", about = "Environmental sensor-telemetry aggregator")]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Own every configured device directly and publish its telemetry.
    Run {
        #[arg(long)]
        config: PathBuf,
    },
    /// Act as a remote aggregator: accept controller-protocol connections.
    Serve {
        #[arg(long, default_value_t = DEFAULT_CONTROLLER_PORT)]
        port: u16,
    },
    /// Act as a controller-protocol client against a remote aggregator.
    Relay {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        host: String,
        #[arg(long, default_value_t = DEFAULT_CONTROLLER_PORT)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "ess_daemon=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.mode {
        Mode::Run { config } => run_direct(config).await,
        Mode::Serve { port } => serve(port).await,
        Mode::Relay { config, host, port } => relay(config, host, port).await,
    }
}

/// §4.F.1/3/4/5: one data client per configured device, all owned by this
/// process, all publishing through the same `TracingTopics` sink.
async fn run_direct(config_path: PathBuf) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let devices = load_config(&config_path)?;
    tracing::info!(count = devices.devices.len(), "loaded device configuration");

    let mut handles = Vec::with_capacity(devices.devices.len());
    for device in devices.devices {
        match spawn_device(device.clone()).await {
            Ok(handle) => handles.push(handle),
            Err(e) => tracing::error!(name = %device.name, error = %e, "failed to start data client for device"),
        }
    }

    tracing::info!("ess-daemon running; press Ctrl+C to exit");
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received; stopping data clients");

    for handle in handles {
        handle.stop(STOP_GRACE_PERIOD).await;
    }
    tracing::info!("ess-daemon stopped");
    Ok(())
}

fn decoder_factory_for(sensor_type: SensorType, channels: Option<u32>) -> Box<dyn ess_dataclients::DecoderFactory> {
    if sensor_type == SensorType::Temperature {
        let channels = channels.unwrap_or(1) as usize;
        return Box::new(move || Box::new(TemperatureDecoder::new(channels)) as Box<dyn Decoder>);
    }
    Box::new(move || {
        DecoderRegistry::with_builtins().make(sensor_type).expect("decoder registered for line-decodable sensor type")
    })
}

fn read_loop_config(config: &DeviceConfig) -> ReadLoopConfig {
    ReadLoopConfig {
        max_read_timeouts: config.max_read_timeouts,
        connect_timeout: Duration::from_secs_f64(config.connect_timeout),
        read_timeout: Duration::from_secs_f64(config.read_timeout.unwrap_or(DEFAULT_READ_TIMEOUT.as_secs_f64())),
        rate_limit: Duration::from_secs_f64(config.rate_limit),
    }
}

/// Dispatches one configured device to its `ess-dataclients` variant
/// (§4.F): SNMP equipment (§4.F.3), the spectrum analyzer (§4.F.4), the
/// thermal scanner (§4.F.5), or a line-decodable sensor reached directly
/// through a device supervisor (§4.F.1, §4.C).
async fn spawn_device(config: DeviceConfig) -> Result<DataClientHandle, Box<dyn std::error::Error + Send + Sync>> {
    let loop_config = read_loop_config(&config);

    if config.sensor_type.is_snmp() {
        let host = config.host.clone().ok_or("SNMP device missing host")?;
        let port = config.port.unwrap_or(161);
        let addr: SocketAddr = tokio::net::lookup_host((host.as_str(), port))
            .await?
            .next()
            .ok_or_else(|| format!("could not resolve SNMP host '{host}'"))?;
        let community = config.snmp_community.clone().unwrap_or_else(|| "public".to_string());
        let client = SnmpDataClient::new(
            config.name.clone(),
            config.sensor_type,
            addr,
            community,
            loop_config.read_timeout,
            TracingTopics,
            Box::new(|addr, community, timeout| Box::new(CsnmpWalker::new(addr, community, timeout)) as Box<dyn ess_dataclients::snmp::SnmpWalker>),
        );
        return Ok(ReadLoopDriver::new(client, loop_config).spawn());
    }

    match config.sensor_type {
        SensorType::SpectrumAnalyzer => {
            let host = config.host.clone().ok_or("spectrum analyzer missing host")?;
            let port = config.port.ok_or("spectrum analyzer missing port")?;
            let client = SpectrumAnalyzerClient::new(
                config.name.clone(),
                config.location.clone(),
                host,
                port,
                config.freq_start_value.ok_or("spectrum analyzer missing freq_start_value")?,
                config.freq_start_unit.ok_or("spectrum analyzer missing freq_start_unit")?,
                config.freq_stop_value.ok_or("spectrum analyzer missing freq_stop_value")?,
                config.freq_stop_unit.ok_or("spectrum analyzer missing freq_stop_unit")?,
                TracingTopics,
            );
            Ok(ReadLoopDriver::new(client, loop_config).spawn())
        }
        SensorType::ThermalScanner => {
            let host = config.host.clone().ok_or("thermal scanner missing host")?;
            let port = config.port.ok_or("thermal scanner missing port")?;
            let client = ThermalScannerClient::new(config.name.clone(), config.location.clone(), host, port, TracingTopics);
            Ok(ReadLoopDriver::new(client, loop_config).spawn())
        }
        _ => {
            let processor = build_processor(&config)?;
            let decoder_factory = decoder_factory_for(config.sensor_type, config.channels);
            let client = DirectDeviceClient::new(
                config,
                decoder_factory,
                processor,
                TracingTopics,
                TELEMETRY_LOOP_FINISH_TIMEOUT,
                ERROR_SLEEP,
            );
            Ok(ReadLoopDriver::new(client, loop_config).spawn())
        }
    }
}

/// §4.E: this process is the remote aggregator. Devices are supplied later,
/// over the wire, by a `configure` command.
async fn serve(port: u16) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let server = ControllerServer::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "controller-protocol server listening");
    let shutdown = server.shutdown_token();

    let serve_task = tokio::spawn(server.serve());
    tokio::select! {
        result = serve_task => {
            result??;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received; stopping controller server");
            shutdown.cancel();
        }
    }
    Ok(())
}

/// §4.F.2: this process is a controller-protocol client, forwarding a
/// remote aggregator's telemetry through the same processors `run` builds
/// for directly-reached devices.
async fn relay(config_path: PathBuf, host: String, port: u16) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let devices = load_config(&config_path)?;
    tracing::info!(count = devices.devices.len(), %host, port, "relaying telemetry from remote aggregator");

    let client = ControllerDataClient::new(host, port, devices.devices, TracingTopics, DEFAULT_READ_TIMEOUT);
    let loop_config = ReadLoopConfig {
        max_read_timeouts: 5,
        connect_timeout: Duration::from_secs(60),
        read_timeout: DEFAULT_READ_TIMEOUT,
        rate_limit: Duration::from_millis(50),
    };
    let handle = ReadLoopDriver::new(client, loop_config).spawn();

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received; stopping relay");
    handle.stop(STOP_GRACE_PERIOD).await;
    Ok(())
}

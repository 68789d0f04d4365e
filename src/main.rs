//! blinkctl main entry point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SimGpio / SysfsGpio / EspGpio   LogEventSink   Esp32Time      │
//! │  (GpioPort)                      (EventSink)    (TimePort)     │
//! │  UdpCommandIngest  UdpTelemetry  HkTimer                       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌──────────────────────┐        ┌────────────────────────┐    │
//! │  │ AppService (main)    │──Arc──▶│ BlinkController        │    │
//! │  │ Router · HK          │        │   ▲ BlinkWorker (App)  │    │
//! │  └──────────────────────┘        └────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage (host): `blinkctl [config.json]`.  Without a path every setting
//! takes its default.  SIGINT or SIGTERM shuts the process down cleanly.
//!
//! On the ESP32 the WiFi station is brought up before the UDP links are
//! opened, and the command loop runs for the life of the device.
#![deny(unused_must_use)]

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result, bail};
use log::{info, warn};

use blinkctl::adapters::gpio::pin_in_range;
#[cfg(not(target_os = "espidf"))]
use blinkctl::adapters::gpio::{SimGpio, SysfsGpio};
use blinkctl::adapters::hk_timer::HkTimer;
use blinkctl::adapters::log_sink::LogEventSink;
use blinkctl::adapters::time::Esp32TimeAdapter;
use blinkctl::adapters::udp_link::{UdpCommandIngest, UdpTelemetry};
use blinkctl::app::ports::GpioPort;
use blinkctl::app::service::AppService;
use blinkctl::cmd::pipe::CommandPipe;
use blinkctl::config::AppConfig;
use blinkctl::ctrl::BlinkController;
use blinkctl::ctrl::worker::{self, BlinkWorker};
use blinkctl::drivers::delay::SysDelay;

// ── Bootstrap ─────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn init_platform() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn init_platform() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    Ok(())
}

fn load_config() -> Result<AppConfig> {
    let Some(path) = std::env::args().nth(1) else {
        info!("No config file given, using defaults");
        return Ok(AppConfig::default());
    };
    let text =
        std::fs::read_to_string(&path).with_context(|| format!("reading config {path}"))?;
    let cfg = AppConfig::from_json(&text).with_context(|| format!("parsing config {path}"))?;
    info!("Config loaded from {}", path);
    Ok(cfg)
}

/// Post a shutdown request on SIGINT or SIGTERM.
#[cfg(not(target_os = "espidf"))]
fn install_shutdown_handler(pipe: Arc<CommandPipe>) -> Result<()> {
    ctrlc::set_handler(move || {
        info!("Termination signal received, shutting down");
        pipe.shutdown();
    })?;
    Ok(())
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_platform()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  blinkctl v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = load_config()?;
    if !pin_in_range(config.ctrl.out_pin) {
        bail!("out_pin {} is not a valid GPIO", config.ctrl.out_pin);
    }

    start(config)
}

#[cfg(target_os = "espidf")]
fn start(config: AppConfig) -> Result<()> {
    let peripherals = esp_idf_hal::peripherals::Peripherals::take()?;
    // Held for the whole run: dropping the station takes the netif down.
    let _station = blinkctl::adapters::wifi::connect_station(peripherals.modem, &config.wifi)
        .context("bringing up WiFi station")?;
    run(blinkctl::adapters::gpio::EspGpio::new(), config)
}

#[cfg(not(target_os = "espidf"))]
fn start(config: AppConfig) -> Result<()> {
    match config.gpio_sysfs_root.clone() {
        Some(root) => run(SysfsGpio::new(root), config),
        None => {
            warn!("No GPIO backend configured, driving the in-memory simulation");
            run(SimGpio::new(), config)
        }
    }
}

fn run<G>(mut gpio: G, config: AppConfig) -> Result<()>
where
    G: GpioPort + Send + 'static,
{
    // ── 1. Controller (maps the GPIO peripheral) ──────────────
    let ctrl = Arc::new(BlinkController::from_config(
        &mut gpio,
        &config.ctrl,
        &mut LogEventSink,
    ));

    // ── 2. Blink worker on the application core ───────────────
    let stop = Arc::new(AtomicBool::new(false));
    let blinker = BlinkWorker::new(Arc::clone(&ctrl), gpio, SysDelay::new(), LogEventSink)
        .spawn(Arc::clone(&stop), &config.child)
        .context("spawning blink worker")?;

    // ── 3. Links feeding the command pipe ─────────────────────
    let pipe = Arc::new(CommandPipe::new());
    let ingest = UdpCommandIngest::bind(config.cmd_udp_port)
        .with_context(|| format!("binding command port {}", config.cmd_udp_port))?
        .spawn(Arc::clone(&pipe), Arc::clone(&stop))
        .context("spawning command ingest")?;
    let hk_timer = HkTimer::new(config.send_hk_mid, config.hk_interval_ms)
        .spawn(Arc::clone(&pipe), Arc::clone(&stop))
        .context("spawning housekeeping timer")?;
    let mut tlm = UdpTelemetry::connect(config.tlm_udp_addr.as_str())
        .with_context(|| format!("opening telemetry link {}", config.tlm_udp_addr))?;
    #[cfg(not(target_os = "espidf"))]
    install_shutdown_handler(Arc::clone(&pipe)).context("installing signal handler")?;

    // ── 4. Command processing (blocks until shutdown) ─────────
    let clock = Esp32TimeAdapter::new();
    let mut service = AppService::new(config, ctrl, LogEventSink)?;
    service.run(&pipe, &mut tlm, &clock);

    // ── 5. Teardown ───────────────────────────────────────────
    // The worker stops only at a cycle boundary, up to a full phase away.
    worker::release(blinker, &stop, worker::STOP_GRACE);
    for (name, handle) in [("ingest", ingest), ("hk-timer", hk_timer)] {
        if handle.join().is_err() {
            warn!("{} thread panicked", name);
        }
    }
    info!("Shutdown complete");
    Ok(())
}

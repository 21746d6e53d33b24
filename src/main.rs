use color_eyre::{eyre::eyre, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use webpad::config::PadConfig;
use webpad::controls::SensingMode;
use webpad::geometry::Rect;
use webpad::haptics::LogActuator;
use webpad::joypad::{ForceCalibration, Joypad, PadHandle, UdpBridge};
use webpad::layout::GridLayout;
use webpad::replay::ReplayScript;

const DEFAULT_HOST: &str = "127.0.0.1:5005";
const DEFAULT_VIEWPORT: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 1280.0,
    height: 720.0,
};

struct Args {
    layout: PathBuf,
    script: Option<PathBuf>,
    host: SocketAddr,
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;
    let args = parse_args()?;

    let config = PadConfig::load(args.config.as_deref()).await?;
    let template = tokio::fs::read_to_string(&args.layout)
        .await
        .map_err(|e| eyre!("Failed to read layout {}: {}", args.layout.display(), e))?;
    let grid = GridLayout::parse(&template, DEFAULT_VIEWPORT);
    info!(
        "Layout {} has {} rows and {} columns",
        args.layout.display(),
        grid.row_count(),
        grid.column_count()
    );

    let script = match &args.script {
        Some(path) => Some(
            ReplayScript::load(path)
                .await
                .map_err(|e| eyre!("Failed to load replay script: {}", e))?,
        ),
        None => None,
    };
    let sensing = calibrate(script.as_ref());

    let local: SocketAddr = if args.host.is_ipv4() {
        ([0u8; 4], 0).into()
    } else {
        ([0u16; 8], 0).into()
    };
    let (bridge, link) = UdpBridge::connect(local, args.host)
        .await
        .map_err(|e| eyre!("Failed to connect to host {}: {}", args.host, e))?;

    let tick = config.scheduler.tick_interval();
    let joypad = Joypad::new(&grid, config, sensing, Box::new(bridge), Box::new(LogActuator));
    let handle = PadHandle::spawn(joypad, tick);

    match script {
        Some(script) => {
            script
                .play(&handle, &grid)
                .await
                .map_err(|e| eyre!("Replay failed: {}", e))?;
        }
        None => {
            info!("No replay script given, press Ctrl+C to stop");
            tokio::signal::ctrl_c()
                .await
                .map_err(|e| eyre!("Failed to wait for Ctrl+C: {}", e))?;
        }
    }

    let joypad = handle
        .shutdown()
        .await
        .map_err(|e| eyre!("Failed to stop pad: {}", e))?;
    info!("Final state {:?}", joypad.state_bytes());
    // dropping the pad queues the bye pattern
    drop(joypad);
    let sent = link
        .closed()
        .await
        .map_err(|e| eyre!("Failed to flush packets to {}: {}", args.host, e))?;
    info!("Sent {} packets to {}", sent, args.host);
    Ok(())
}

/// Touchscreens that report pressure get pressure sensing for analog buttons
fn calibrate(script: Option<&ReplayScript>) -> SensingMode {
    let mut calibration = ForceCalibration::start();
    match script {
        Some(script) => {
            script
                .touches()
                .for_each(|touch| calibration.record_touch(touch));
            calibration.confirm().sensing_mode()
        }
        None => calibration.decline().sensing_mode(),
    }
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let layout = args
        .next()
        .map(PathBuf::from)
        .ok_or_else(|| eyre!("Usage: webpad <layout-file> [replay-script]"))?;
    let script = args.next().map(PathBuf::from);
    if args.next().is_some() {
        warn!("Ignoring extra arguments");
    }

    let host = std::env::var("WEBPAD_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let host = host
        .parse::<SocketAddr>()
        .map_err(|e| eyre!("Invalid host address {}: {}", host, e))?;
    let config = std::env::var("WEBPAD_CONFIG").ok().map(PathBuf::from);

    Ok(Args {
        layout,
        script,
        host,
        config,
    })
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

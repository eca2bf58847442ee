//! virtual-touch - gesture-driven pointer control
//!
//! Reads hand-landmark frames as JSON lines from a file or stdin and drives
//! the OS pointer from them.

use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use virtual_touch::config::{Config, LogFormat};
use virtual_touch::{ControlLoop, GestureController, InputSink, JsonLinesSource, LogSink};

/// Command-line arguments for virtual-touch
#[derive(Parser, Debug)]
#[command(name = "virtual-touch")]
#[command(version, about = "Touch-free mouse driven by hand landmarks", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, env = "VIRTUAL_TOUCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Landmark stream (JSON lines), `-` for stdin
    #[arg(short, long, default_value = "-")]
    pub input: String,

    /// Log actions instead of injecting them
    #[arg(long)]
    pub dry_run: bool,

    /// Target display size, e.g. 2560x1440. Disables detection.
    #[arg(long, value_parser = parse_size)]
    pub screen: Option<(u32, u32)>,

    /// Mirror the horizontal axis
    #[arg(long)]
    pub mirror: bool,

    /// Write per-stage latency statistics to this file on exit
    #[arg(long)]
    pub timing_report: Option<PathBuf>,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (overrides the config file)
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Write logs to file (in addition to stderr)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

fn parse_size(s: &str) -> std::result::Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w = w.trim().parse().map_err(|e| format!("bad width '{w}': {e}"))?;
    let h = h.trim().parse().map_err(|e| format!("bad height '{h}': {e}"))?;
    Ok((w, h))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    apply_overrides(&mut config, &args);

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    init_logging(&args, &config)?;
    info!("virtual-touch v{}", env!("CARGO_PKG_VERSION"));

    let stop = Arc::new(AtomicBool::new(false));
    let stop_handler = stop.clone();
    ctrlc::set_handler(move || {
        stop_handler.store(true, Ordering::SeqCst);
    })
    .context("Failed to install Ctrl+C handler")?;

    let sink = open_sink(&args, &mut config)?;
    config.validate().context("Invalid configuration")?;
    debug!("Config: {:?}", config);

    let reader: Box<dyn BufRead> = if args.input == "-" {
        info!("Reading landmarks from stdin");
        Box::new(std::io::stdin().lock())
    } else {
        info!("Reading landmarks from {}", args.input);
        let file = std::fs::File::open(&args.input)
            .with_context(|| format!("Failed to open {}", args.input))?;
        Box::new(BufReader::new(file))
    };
    let source = JsonLinesSource::with_camera(reader, &config.camera);

    let controller = GestureController::new(&config, sink)?;
    let mut control = ControlLoop::new(source, controller);
    let result = control.run(&stop);

    if let Some(path) = &args.timing_report {
        match control.timings().write_report(path) {
            Ok(()) => info!("Timing report written to {}", path.display()),
            Err(e) => warn!("Failed to write timing report: {}", e),
        }
    }

    let summary = result?;
    info!(
        "Processed {} frames ({} with a hand), {} actions, {} dropped",
        summary.frames, summary.hands, summary.actions, summary.dropped
    );
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some((width, height)) = args.screen {
        config.screen.width = width;
        config.screen.height = height;
        config.screen.detect = false;
    }
    if args.mirror {
        config.camera.mirror_x = true;
    }
    if let Some(format) = args.log_format {
        config.logging.format = format;
    }
}

/// Pick the injection backend. With the OS backend and detection enabled,
/// the real display size replaces the configured one.
fn open_sink(args: &Args, config: &mut Config) -> Result<Box<dyn InputSink>> {
    if args.dry_run {
        info!("Dry run: actions are logged, not injected");
        return Ok(Box::new(LogSink::new()));
    }

    #[cfg(feature = "native-input")]
    {
        let sink = virtual_touch::sink::EnigoSink::new().context("Failed to open input backend")?;
        if config.screen.detect {
            match sink.display_size() {
                Ok((width, height)) if width > 0 && height > 0 => {
                    info!("Detected display {}x{}", width, height);
                    config.screen.width = width;
                    config.screen.height = height;
                }
                Ok(_) => warn!("Backend reported an empty display, keeping configured size"),
                Err(e) => warn!("Display detection failed: {}, keeping configured size", e),
            }
        }
        return Ok(Box::new(sink));
    }

    #[cfg(not(feature = "native-input"))]
    {
        let _ = config;
        anyhow::bail!("Built without the `native-input` feature; run with --dry-run")
    }
}

fn init_logging(args: &Args, config: &Config) -> Result<()> {
    let level = match args.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("virtual_touch={level},warn"))
    });

    // Log file gets the same format, without colors
    let log_file = match &args.log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            Some(Arc::new(file))
        }
        None => None,
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .with(log_file.map(|file| {
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(file)
                    .with_ansi(false)
            }))
            .init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .with(log_file.map(|file| {
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(file)
                    .with_ansi(false)
            }))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .with(log_file.map(|file| {
                tracing_subscriber::fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
            }))
            .init(),
    }

    if let Some(path) = &args.log_file {
        info!("Logging to file: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("2560x1440"), Ok((2560, 1440)));
        assert_eq!(parse_size("800X600"), Ok((800, 600)));
        assert!(parse_size("2560").is_err());
        assert!(parse_size("axb").is_err());
    }

    #[test]
    fn test_screen_override_disables_detection() {
        let args = Args::parse_from(["virtual-touch", "--screen", "1280x720", "--mirror"]);
        let mut config = Config::default();
        apply_overrides(&mut config, &args);
        assert_eq!((config.screen.width, config.screen.height), (1280, 720));
        assert!(!config.screen.detect);
        assert!(config.camera.mirror_x);
    }

    #[test]
    fn test_args_verify() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}

//! APA102 strip tool for Raspberry Pi
//!
//! Drives a chain of APA102 LEDs over two GPIO lines:
//! - Fills the whole strip with one color
//! - Paints a hue spectrum along the strip
//! - Turns every LED off

use anyhow::Context;
use apa102_gpio::config::{StripConfig, DEFAULT_CONFIG_PATH};
use apa102_gpio::strip::frame::MAX_BRIGHTNESS;
use apa102_gpio::{Apa102, LedOutput, LinePair};
use clap::{Parser, Subcommand};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "apa102-gpio")]
#[command(about = "Bit-banged APA102 LED strip driver for Raspberry Pi")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// GPIO chip (overrides config)
    #[arg(long)]
    chip: Option<String>,

    /// Clock line offset (overrides config)
    #[arg(long)]
    clock: Option<u8>,

    /// Data line offset (overrides config)
    #[arg(long)]
    data: Option<u8>,

    /// Number of LEDs (overrides config)
    #[arg(long)]
    leds: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Set every LED to one output, given as BRIGHTNESS,RED,GREEN,BLUE
    Fill {
        output: LedOutput,
    },

    /// Paint increasing hue along the strip
    Spectrum {
        /// LED brightness setting [0, 31]
        #[arg(short, long, default_value_t = MAX_BRIGHTNESS, value_parser = clap::value_parser!(u8).range(0..=31))]
        brightness: u8,
    },

    /// Turn every LED off
    Off,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);

    let config = resolve_config(&args)?;
    tracing::info!(
        "Opening {} LEDs on {} (CLK={}, DATA={})",
        config.led_count,
        config.chip,
        config.clock_line,
        config.data_line
    );

    let mut strip = Apa102::open(&config).context("Failed to open LED strip")?;

    // Close on every exit path so the lines are handed back
    let result = run(&mut strip, &args.command);
    let closed = strip.close();

    result?;
    closed.context("Failed to release GPIO lines")?;

    tracing::info!("Done");
    Ok(())
}

/// Load the config file, falling back to defaults, then apply flag overrides
fn resolve_config(args: &Args) -> anyhow::Result<StripConfig> {
    let mut config = if Path::new(&args.config).exists() {
        StripConfig::load(&args.config)
            .with_context(|| format!("Failed to load config from {}", args.config))?
    } else {
        tracing::debug!("No config at {}, using defaults", args.config);
        StripConfig::default()
    };

    if let Some(chip) = &args.chip {
        config.chip = chip.clone();
    }
    if let Some(clock) = args.clock {
        config.clock_line = clock;
    }
    if let Some(data) = args.data {
        config.data_line = data;
    }
    if let Some(leds) = args.leds {
        config.led_count = leds;
    }
    // One-shot commands overwrite every LED anyway
    config.reset_on_init = false;

    config.validate()?;
    Ok(config)
}

fn run<L: LinePair>(strip: &mut Apa102<L>, command: &Command) -> anyhow::Result<()> {
    match command {
        Command::Fill { output } => {
            tracing::info!("Filling strip with {:?}", output);
            for i in 0..strip.len() {
                strip.set(i, *output)?;
            }
        }
        Command::Spectrum { brightness } => {
            tracing::info!("Painting spectrum at brightness {}", brightness);
            let len = strip.len();
            for i in 0..len {
                let (red, green, blue) = hue_to_rgb(i as f32 / len as f32);
                strip.set(i, LedOutput::new(*brightness, red, green, blue))?;
            }
        }
        Command::Off => {
            tracing::info!("Turning strip off");
            for i in 0..strip.len() {
                strip.set(i, LedOutput::OFF)?;
            }
        }
    }

    strip.commit()?;
    Ok(())
}

/// Fully saturated, full value color for a hue in [0, 1)
fn hue_to_rgb(hue: f32) -> (u8, u8, u8) {
    let sector = (hue * 6.0).floor();
    let f = hue * 6.0 - sector;
    let rising = (f * 255.0).round() as u8;
    let falling = ((1.0 - f) * 255.0).round() as u8;

    match sector as i32 % 6 {
        0 => (255, rising, 0),
        1 => (falling, 255, 0),
        2 => (0, 255, rising),
        3 => (0, falling, 255),
        4 => (rising, 0, 255),
        _ => (255, 0, falling),
    }
}

/// Initialize tracing/logging
///
/// Default level is "warn"; --verbose switches to "debug".
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("apa102_gpio={}", level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

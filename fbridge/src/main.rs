//! fbridge - pose telemetry in, PNG frames out
//!
//! ```text
//! echo '{"topic":"pose","x":5.5,"y":5.5,"theta":0.0}' | fbridge --sprite lunar.png --output-dir frames
//! ```

mod ingress;

use anyhow::{Context, Result};
use clap::Parser;
use fbridge_core::Scheduler;
use fbridge_library::config::BridgeConfig;
use fbridge_library::messages::inbound::InboundRouter;
use fbridge_library::nodes::{FrameRecorderNode, PoseBridgeNode};
use fbridge_library::render::{Caption, CaptionFont, Sprite};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "fbridge")]
#[command(about = "Render pose telemetry into PNG frames and drive the spin maneuver")]
struct Args {
    /// Configuration file (TOML or YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Agent sprite image
    #[arg(long)]
    sprite: Option<PathBuf>,

    /// Font for the completion caption, replacing the bundled one
    #[arg(long)]
    font: Option<PathBuf>,

    /// Render every Nth pose update
    #[arg(long)]
    stride: Option<u64>,

    /// Start with the fading trail on
    #[arg(long)]
    trail: bool,

    /// Dispatcher tick rate in Hz
    #[arg(long)]
    rate: Option<f64>,

    /// Write frames to this directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Keep every frame instead of only latest.png
    #[arg(long, requires = "output_dir")]
    keep_all: bool,

    /// Stop after this many seconds
    #[arg(long)]
    duration: Option<f64>,
}

impl Args {
    /// Config file (or defaults) with command-line overrides applied
    fn load_config(&self) -> Result<BridgeConfig> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => BridgeConfig::default(),
        };

        if let Some(sprite) = &self.sprite {
            config.assets.sprite = sprite.clone();
        }
        if let Some(font) = &self.font {
            config.assets.font = Some(font.clone());
        }
        if let Some(stride) = self.stride {
            config.frame.stride = stride;
        }
        if self.trail {
            config.frame.trail = true;
        }
        if let Some(rate) = self.rate {
            config.rate_hz = rate;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.load_config()?;

    info!("Starting fbridge");
    info!("   pose in:   {}", config.topics.pose);
    info!("   frames out: {}", config.topics.image);
    info!("   spin out:  {}", config.topics.cmd_vel);

    // Assets are loaded before any node exists; a bad asset ends the run here
    let sprite = Sprite::load(&config.assets.sprite).context("loading sprite")?;
    let font = CaptionFont::from_config(&config.assets).context("loading caption font")?;
    let caption = Some(Caption::new(&config.caption, font));

    let bridge = PoseBridgeNode::new(&config, sprite, caption)?;

    let mut scheduler = Scheduler::new().name("fbridge").with_rate(config.rate_hz);
    scheduler.add(Box::new(bridge), 0, Some(false));

    if let Some(dir) = &args.output_dir {
        let recorder = FrameRecorderNode::new(&config.topics, dir, args.keep_all)?;
        scheduler.add(Box::new(recorder), 1, Some(false));
    } else {
        warn!("No --output-dir given; frames are published but not recorded");
    }

    let router = InboundRouter::new(&config.topics)?;
    ingress::spawn_stdin_ingress(router).context("spawning stdin reader")?;

    match args.duration {
        Some(secs) if secs.is_finite() && secs > 0.0 => {
            scheduler.run_for(Duration::from_secs_f64(secs))?
        }
        Some(secs) => anyhow::bail!("--duration must be a positive number of seconds, got {}", secs),
        None => scheduler.run()?,
    }

    info!("fbridge stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::try_parse_from([
            "fbridge", "--sprite", "turtle.png", "--stride", "3", "--trail", "--rate", "50",
        ])
        .unwrap();
        let config = args.load_config().unwrap();
        assert_eq!(config.assets.sprite, PathBuf::from("turtle.png"));
        assert_eq!(config.frame.stride, 3);
        assert!(config.frame.trail);
        assert_eq!(config.rate_hz, 50.0);
        assert_eq!(config.assets.font, None);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = Args::try_parse_from(["fbridge", "--stride", "0"]).unwrap();
        assert!(args.load_config().is_err());
    }

    #[test]
    fn test_keep_all_requires_output_dir() {
        assert!(Args::try_parse_from(["fbridge", "--keep-all"]).is_err());
        assert!(Args::try_parse_from(["fbridge", "--keep-all", "--output-dir", "frames"]).is_ok());
    }
}

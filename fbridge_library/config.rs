//! Configuration file support for fbridge
//!
//! Every field has a default matching the turtle telemetry setup (11.1 unit
//! world, 640x640 frames, 50 ms spin timer), so an empty file is valid.
//! The file format is picked from the extension: `.toml`, `.yaml`/`.yml`.

use crate::algorithms::spin::{CompletionPolicy, SpinParams};
use fbridge_core::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Side length of the turtle world in agent-space units
pub const DEFAULT_WORLD_EXTENT: f64 = 11.1;

/// Top-level bridge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Square world side length in agent-space units
    pub world_extent: f64,
    /// Dispatcher tick rate
    pub rate_hz: f64,
    pub frame: FrameConfig,
    pub caption: CaptionConfig,
    pub assets: AssetConfig,
    pub spin: SpinConfig,
    pub topics: TopicConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            world_extent: DEFAULT_WORLD_EXTENT,
            rate_hz: 100.0,
            frame: FrameConfig::default(),
            caption: CaptionConfig::default(),
            assets: AssetConfig::default(),
            spin: SpinConfig::default(),
            topics: TopicConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub width: u32,
    pub height: u32,
    /// Render every `stride`-th pose update
    pub stride: u64,
    /// RGB background fill
    pub background: [u8; 3],
    /// Background opacity while the trail is on
    pub trail_alpha: f32,
    /// Initial trail state
    pub trail: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 640,
            stride: 2,
            background: [0, 0, 0],
            trail_alpha: 0.12,
            trail: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    pub text: String,
    pub color: [u8; 3],
    /// Baseline-left of the text relative to the agent's pixel position
    pub offset: [i32; 2],
    /// Glyph height in pixels
    pub scale: f32,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            text: "\u{30C1}\u{30BD}\u{30B2}\u{30BD} \u{30C8}\u{30C3}\u{30D1}".to_string(),
            color: [255, 255, 255],
            offset: [-34, -30],
            scale: 16.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Agent sprite, any format the image decoder understands
    pub sprite: PathBuf,
    /// TrueType/OpenType font for the caption; the bundled face when unset
    pub font: Option<PathBuf>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            sprite: PathBuf::from("lunar.png"),
            font: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinConfig {
    pub period_ms: u64,
    pub linear_step: f64,
    pub angular_step: f64,
    pub max_ticks: u32,
    /// How long the completion caption stays up
    pub message_ms: u64,
    pub completion: CompletionPolicy,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            period_ms: 50,
            linear_step: 0.01,
            angular_step: 0.022,
            max_ticks: 4000,
            message_ms: 3000,
            completion: CompletionPolicy::Stop,
        }
    }
}

impl SpinConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    pub fn params(&self) -> SpinParams {
        SpinParams {
            linear_step: self.linear_step,
            angular_step: self.angular_step,
            max_ticks: self.max_ticks,
            message_duration: Duration::from_millis(self.message_ms),
            completion: self.completion,
        }
    }
}

/// Topic names for every inbound and outbound channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    pub pose: String,
    pub spin_on: String,
    pub spin_off: String,
    pub trail_on: String,
    pub trail_off: String,
    pub image: String,
    pub north_east: String,
    pub south_west: String,
    pub cmd_vel: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            pose: "/turtle1/pose".to_string(),
            spin_on: "/spin_on".to_string(),
            spin_off: "/spin_off".to_string(),
            trail_on: "/trail_on".to_string(),
            trail_off: "/trail_off".to_string(),
            image: "/image/compressed".to_string(),
            north_east: "/in_northeast_quadrant".to_string(),
            south_west: "/in_southwest_quadrant".to_string(),
            cmd_vel: "/turtle1/cmd_vel".to_string(),
        }
    }
}

impl TopicConfig {
    /// Default topic names under a namespace, e.g. `/robot2/turtle1/pose`
    pub fn with_prefix(prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        let scoped = |name: String| format!("{}{}", prefix, name);
        let defaults = Self::default();
        Self {
            pose: scoped(defaults.pose),
            spin_on: scoped(defaults.spin_on),
            spin_off: scoped(defaults.spin_off),
            trail_on: scoped(defaults.trail_on),
            trail_off: scoped(defaults.trail_off),
            image: scoped(defaults.image),
            north_east: scoped(defaults.north_east),
            south_west: scoped(defaults.south_west),
            cmd_vel: scoped(defaults.cmd_vel),
        }
    }
}

impl BridgeConfig {
    /// Load config from a file (format from extension) and validate it
    pub fn from_file<P: AsRef<Path>>(path: P) -> BridgeResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&contents)?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&contents)?,
            other => {
                return Err(BridgeError::config(format!(
                    "Unsupported config format {:?} for {} (expected .toml, .yaml or .yml)",
                    other,
                    path.display()
                )))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Check every bound the bridge relies on
    pub fn validate(&self) -> BridgeResult<()> {
        if !(self.world_extent.is_finite() && self.world_extent > 0.0) {
            return Err(BridgeError::config(format!(
                "world_extent must be a positive number, got {}",
                self.world_extent
            )));
        }
        if !(self.rate_hz.is_finite() && self.rate_hz > 0.0) {
            return Err(BridgeError::config(format!(
                "rate_hz must be positive, got {}",
                self.rate_hz
            )));
        }
        if self.frame.width == 0 || self.frame.height == 0 {
            return Err(BridgeError::config("frame width and height must be non-zero"));
        }
        if self.frame.stride == 0 {
            return Err(BridgeError::config("frame.stride must be at least 1"));
        }
        if !(self.frame.trail_alpha > 0.0 && self.frame.trail_alpha <= 1.0) {
            return Err(BridgeError::config(format!(
                "frame.trail_alpha must be in (0, 1], got {}",
                self.frame.trail_alpha
            )));
        }
        if !(self.caption.scale.is_finite() && self.caption.scale > 0.0) {
            return Err(BridgeError::config("caption.scale must be positive"));
        }
        if self.spin.period_ms == 0 {
            return Err(BridgeError::config("spin.period_ms must be non-zero"));
        }
        if self.spin.max_ticks == 0 {
            return Err(BridgeError::config("spin.max_ticks must be non-zero"));
        }
        if !(self.spin.linear_step.is_finite() && self.spin.angular_step.is_finite()) {
            return Err(BridgeError::config("spin steps must be finite"));
        }
        if self.spin.linear_step < 0.0 || self.spin.angular_step < 0.0 {
            return Err(BridgeError::config(
                "spin steps must be non-negative so the ramp never decreases",
            ));
        }
        Ok(())
    }
}

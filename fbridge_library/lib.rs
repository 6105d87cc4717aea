//! # fbridge Library
//!
//! Everything the pose-to-frame bridge runs on top of `fbridge_core`.
//!
//! ## Structure
//!
//! ```text
//! fbridge_library/
//! ── messages/       # Pose, velocity and image messages, JSON ingress
//! ── algorithms/     # Pixel mapping, quadrants, decimation, spin ramp
//! ── render/         # Sprite/font assets, compositor, PNG encoder
//! ── nodes/          # PoseBridgeNode, FrameRecorderNode
//! ── config.rs       # TOML/YAML configuration
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fbridge_library::prelude::*;
//!
//! let config = BridgeConfig::from_file("bridge.toml").unwrap();
//! let sprite = Sprite::load(&config.assets.sprite).unwrap();
//!
//! let mut scheduler = Scheduler::new().with_rate(config.rate_hz);
//! scheduler.add(Box::new(PoseBridgeNode::new(&config, sprite, None).unwrap()), 0, None);
//! scheduler.run().unwrap();
//! ```

pub mod algorithms;
pub mod config;
pub mod messages;
pub mod nodes;
pub mod render;

// Re-export core traits needed for message types
pub use fbridge_core::core::LogSummary;

// Re-export message types at the crate root for convenience
pub use messages::*;

pub use config::BridgeConfig;
pub use nodes::{FrameRecorderNode, PoseBridgeNode};

/// Common imports for building a bridge
pub mod prelude {
    pub use crate::algorithms::{CompletionPolicy, SpinController, SpinParams};
    pub use crate::config::{BridgeConfig, TopicConfig};
    pub use crate::messages::{CompressedImage, InboundMessage, Pose2D, Twist};
    pub use crate::messages::inbound::InboundRouter;
    pub use crate::nodes::{FrameRecorderNode, PoseBridgeNode};
    pub use crate::render::{Caption, CaptionFont, Sprite};
    pub use fbridge_core::{BridgeError, BridgeResult, Hub, Node, NodeInfo, Scheduler};
}

//! fbridge nodes
//!
//! - `PoseBridgeNode` - pose telemetry in; frames, quadrant flags and spin
//!   commands out
//! - `FrameRecorderNode` - optional sink writing frames to a directory
//!
//! # Usage
//!
//! ```rust,no_run
//! use fbridge_library::config::BridgeConfig;
//! use fbridge_library::nodes::{FrameRecorderNode, PoseBridgeNode};
//! use fbridge_library::render::Sprite;
//!
//! let config = BridgeConfig::default();
//! let sprite = Sprite::load(&config.assets.sprite).unwrap();
//! let bridge = PoseBridgeNode::new(&config, sprite, None).unwrap();
//! let recorder = FrameRecorderNode::new(&config.topics, "frames", false).unwrap();
//! ```

pub mod frame_recorder_node;
pub mod pose_bridge_node;

pub use frame_recorder_node::FrameRecorderNode;
pub use pose_bridge_node::PoseBridgeNode;

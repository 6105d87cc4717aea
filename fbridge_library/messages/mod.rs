//! Message types exchanged over fbridge topics
//!
//! - Geometry: pose telemetry and velocity commands (Pose2D, Twist)
//! - Vision: compressed frames (CompressedImage, Header)
//! - Inbound: the newline-delimited JSON ingress format
//!
//! Quadrant flags and toggles travel as plain `bool`.

pub mod geometry;
pub mod inbound;
pub mod vision;

pub use geometry::{Pose2D, Twist};
pub use inbound::{parse_line, InboundMessage};
pub use vision::{CompressedImage, Header};

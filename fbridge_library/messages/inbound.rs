//! Newline-delimited JSON ingress
//!
//! One message per line, tagged by `topic`:
//!
//! ```text
//! {"topic":"pose","x":5.5,"y":5.5,"theta":0.0}
//! {"topic":"spin_on"}
//! {"topic":"trail_off"}
//! ```

use super::geometry::Pose2D;
use crate::config::TopicConfig;
use fbridge_core::error::{BridgeError, BridgeResult};
use fbridge_core::Hub;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "topic", rename_all = "snake_case")]
pub enum InboundMessage {
    Pose { x: f64, y: f64, theta: f64 },
    SpinOn,
    SpinOff,
    TrailOn,
    TrailOff,
}

/// Parse one ingress line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> BridgeResult<Option<InboundMessage>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let msg: InboundMessage = serde_json::from_str(line)?;
    if let InboundMessage::Pose { x, y, theta } = msg {
        Pose2D::new(x, y, theta).validate()?;
    }
    Ok(Some(msg))
}

/// Publishes parsed ingress messages onto the bridge's inbound topics
pub struct InboundRouter {
    pose: Hub<Pose2D>,
    spin_on: Hub<bool>,
    spin_off: Hub<bool>,
    trail_on: Hub<bool>,
    trail_off: Hub<bool>,
}

impl InboundRouter {
    pub fn new(topics: &TopicConfig) -> BridgeResult<Self> {
        Ok(Self {
            pose: Hub::new(&topics.pose)?,
            spin_on: Hub::new(&topics.spin_on)?,
            spin_off: Hub::new(&topics.spin_off)?,
            trail_on: Hub::new(&topics.trail_on)?,
            trail_off: Hub::new(&topics.trail_off)?,
        })
    }

    /// Publish a message; a full topic is reported, not retried
    pub fn route(&self, msg: InboundMessage) -> BridgeResult<()> {
        let delivered = match msg {
            InboundMessage::Pose { x, y, theta } => {
                self.pose.send(Pose2D::new(x, y, theta), None).is_ok()
            }
            InboundMessage::SpinOn => self.spin_on.send(true, None).is_ok(),
            InboundMessage::SpinOff => self.spin_off.send(true, None).is_ok(),
            InboundMessage::TrailOn => self.trail_on.send(true, None).is_ok(),
            InboundMessage::TrailOff => self.trail_off.send(true, None).is_ok(),
        };

        if delivered {
            Ok(())
        } else {
            Err(BridgeError::Communication(format!(
                "inbound queue full, dropped {:?}",
                msg
            )))
        }
    }

    /// Parse and route one line, logging and discarding malformed input
    pub fn handle_line(&self, line: &str) -> bool {
        match parse_line(line) {
            Ok(Some(msg)) => match self.route(msg) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("{}", e);
                    false
                }
            },
            Ok(None) => false,
            Err(e) => {
                log::warn!("Rejected inbound line {:?}: {}", line.trim(), e);
                false
            }
        }
    }
}

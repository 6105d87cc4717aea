//! # fbridge Core
//!
//! The runtime underneath the pose-to-frame bridge:
//!
//! - **Nodes**: units of work ticked by the scheduler
//! - **Communication**: named in-process pub/sub topics
//! - **Scheduling**: a serialized, fixed-rate dispatch loop
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fbridge_core::{Hub, Node, NodeInfo, Scheduler};
//!
//! struct ExampleNode {
//!     output: Hub<bool>,
//! }
//!
//! impl Node for ExampleNode {
//!     fn name(&self) -> &'static str { "example" }
//!
//!     fn tick(&mut self, ctx: Option<&mut NodeInfo>) {
//!         let _ = self.output.send(true, ctx);
//!     }
//! }
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.add(Box::new(ExampleNode { output: Hub::new("flag").unwrap() }), 0, None);
//! scheduler.run().unwrap();
//! ```

pub mod communication;
pub mod core;
pub mod error;
pub mod scheduling;

// Re-export commonly used types for easy access
pub use communication::Hub;
pub use core::{LogSummary, Node, NodeInfo, NodeState};
pub use error::{BridgeError, BridgeResult};
pub use scheduling::Scheduler;

//! # Core types and traits for fbridge
//!
//! ## Node Lifecycle
//!
//! 1. **Construction** - Node is created with configuration and its hubs
//! 2. **Initialization** - `init()` is called once by the scheduler
//! 3. **Execution** - `tick()` is called on every dispatch cycle
//! 4. **Shutdown** - `shutdown()` is called to clean up resources

pub mod node;

pub use node::{LogSummary, Node, NodeInfo, NodeMetrics, NodeState};

//! # Communication layer for fbridge
//!
//! - **Hub**: MPMC publisher-subscriber queues keyed by topic name
//!
//! ```rust,no_run
//! use fbridge_core::communication::Hub;
//! let hub: Hub<bool> = Hub::new("/in_northeast_quadrant").unwrap();
//! let _ = hub.send(true, None);
//! ```

pub mod hub;

pub use hub::{Hub, HubMetrics, DEFAULT_CAPACITY};

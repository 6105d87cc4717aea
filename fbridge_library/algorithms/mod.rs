//! Pure computational pieces of the bridge
//!
//! No I/O here: every type is driven by explicit inputs (poses, instants) so
//! nodes and tests can step them deterministically.
//!
//! - **coordinate_mapper**: agent-space position to pixel coordinates
//! - **quadrant**: north-east / south-west classification
//! - **throttle**: pose-update decimation
//! - **spin**: the timed velocity-ramp state machine

pub mod coordinate_mapper;
pub mod quadrant;
pub mod spin;
pub mod throttle;

pub use coordinate_mapper::map_to_pixels;
pub use quadrant::{classify, Quadrants};
pub use spin::{CompletionPolicy, SpinController, SpinOutput, SpinParams, SpinPhase};
pub use throttle::FrameThrottle;

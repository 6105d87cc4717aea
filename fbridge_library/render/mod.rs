//! Frame rendering: assets, compositing and PNG encoding

pub mod assets;
pub mod compositor;
pub mod encoder;

pub use assets::{CaptionFont, Sprite};
pub use compositor::{Caption, FrameCompositor};
pub use encoder::{FrameEncoder, PNG_SIGNATURE};

//! Agent-space to pixel-space transform
//!
//! The world is a square of side `world_extent` with the origin bottom-left
//! and y pointing up; image row 0 is the top, so the vertical axis flips.

use crate::messages::Pose2D;

/// Map a world position onto a `width` x `height` surface
///
/// `px = floor(x * width / extent)`, `py = floor(height - height * y / extent)`.
/// Positions outside the world map outside the surface; drawing clips them.
pub fn map_to_pixels(pose: &Pose2D, world_extent: f64, width: u32, height: u32) -> (i32, i32) {
    let width = f64::from(width);
    let height = f64::from(height);
    let px = (pose.x * width / world_extent).floor();
    let py = (height - height * pose.y / world_extent).floor();
    (px as i32, py as i32)
}

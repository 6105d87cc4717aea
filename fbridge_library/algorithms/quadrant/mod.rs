//! Quadrant classification relative to the world midpoint
//!
//! Both predicates use strict inequalities, so a position on either midline
//! is in neither quadrant, and the two can never hold at once.

use crate::messages::Pose2D;

/// The two published quadrant flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Quadrants {
    pub north_east: bool,
    pub south_west: bool,
}

pub fn classify(pose: &Pose2D, world_extent: f64) -> Quadrants {
    let mid = world_extent / 2.0;
    Quadrants {
        north_east: pose.x > mid && pose.y > mid,
        south_west: pose.x < mid && pose.y < mid,
    }
}

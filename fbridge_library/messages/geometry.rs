use fbridge_core::core::LogSummary;
use fbridge_core::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};

/// 2D pose of the agent in world coordinates
///
/// `theta` is the heading in radians, 0 pointing along +x, counter-clockwise
/// positive.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }

    /// Reject poses carrying NaN or infinite components
    pub fn validate(&self) -> BridgeResult<()> {
        if self.x.is_finite() && self.y.is_finite() && self.theta.is_finite() {
            Ok(())
        } else {
            Err(BridgeError::InvalidInput(format!(
                "pose has non-finite component: x={}, y={}, theta={}",
                self.x, self.y, self.theta
            )))
        }
    }
}

impl LogSummary for Pose2D {
    fn log_summary(&self) -> String {
        format!(
            "Pose2D(x: {:.3}, y: {:.3}, theta: {:.3})",
            self.x, self.y, self.theta
        )
    }
}

/// Linear and angular velocity command
///
/// The spin maneuver only drives `linear[0]` (forward) and `angular[2]`
/// (yaw); the other axes stay zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Twist {
    pub linear: [f64; 3],
    pub angular: [f64; 3],
}

impl Twist {
    /// Forward velocity plus yaw rate, everything else zero
    pub fn planar(linear_x: f64, angular_z: f64) -> Self {
        Self {
            linear: [linear_x, 0.0, 0.0],
            angular: [0.0, 0.0, angular_z],
        }
    }

    pub fn linear_x(&self) -> f64 {
        self.linear[0]
    }

    pub fn angular_z(&self) -> f64 {
        self.angular[2]
    }
}

impl LogSummary for Twist {
    fn log_summary(&self) -> String {
        format!(
            "Twist(linear_x: {:.3}, angular_z: {:.3})",
            self.linear[0], self.angular[2]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_validation() {
        assert!(Pose2D::new(5.5, 5.5, 0.0).validate().is_ok());
        assert!(Pose2D::new(f64::NAN, 5.5, 0.0).validate().is_err());
        assert!(Pose2D::new(1.0, 1.0, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_planar_twist_zeroes_other_axes() {
        let twist = Twist::planar(0.5, 1.1);
        assert_eq!(twist.linear, [0.5, 0.0, 0.0]);
        assert_eq!(twist.angular, [0.0, 0.0, 1.1]);
    }
}

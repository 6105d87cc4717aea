//! Spin maneuver state machine
//!
//! While armed, every timer tick adds a fixed step to the forward velocity and
//! the yaw rate and emits the result, tracing an outward spiral whose radius is
//! fixed by `linear_step / angular_step`. After `max_ticks` ramp steps the
//! maneuver completes and a completion flag stays up for `message_duration`.
//!
//! # Example
//!
//! ```rust
//! use fbridge_library::algorithms::spin::{SpinController, SpinParams};
//! use std::time::Instant;
//!
//! let mut spin = SpinController::new(SpinParams::default());
//! spin.arm();
//! let out = spin.tick(Instant::now());
//! assert!(out.command.is_some());
//! ```

use crate::messages::Twist;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// What happens once the ramp reaches `max_ticks`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Disarm; the completing tick is the last command of the maneuver
    #[default]
    Stop,
    /// Stay armed and keep emitting the bound velocities until disarmed
    Clamp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinParams {
    pub linear_step: f64,
    pub angular_step: f64,
    pub max_ticks: u32,
    pub message_duration: Duration,
    pub completion: CompletionPolicy,
}

impl Default for SpinParams {
    fn default() -> Self {
        Self {
            linear_step: 0.01,
            angular_step: 0.022,
            max_ticks: 4000,
            message_duration: Duration::from_millis(3000),
            completion: CompletionPolicy::Stop,
        }
    }
}

impl SpinParams {
    /// Highest forward velocity the ramp can reach
    pub fn max_linear(&self) -> f64 {
        self.linear_step * f64::from(self.max_ticks)
    }

    /// Highest yaw rate the ramp can reach
    pub fn max_angular(&self) -> f64 {
        self.angular_step * f64::from(self.max_ticks)
    }
}

/// Observable state of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinPhase {
    /// Disarmed, no completion flag
    Idle,
    /// Armed and ramping
    Spinning,
    /// The last tick reached `max_ticks`
    Completing,
    /// Armed and holding the bound (clamp policy only)
    Clamped,
    /// Disarmed with the completion flag still up
    Cooldown,
}

/// Result of one timer tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpinOutput {
    /// Velocity command to publish, `None` while idle
    pub command: Option<Twist>,
    /// This tick reached `max_ticks`
    pub completed: bool,
}

#[derive(Debug, Clone)]
pub struct SpinController {
    params: SpinParams,
    armed: bool,
    elapsed_ticks: u32,
    linear_x: f64,
    angular_z: f64,
    message_until: Option<Instant>,
    completed_last_tick: bool,
}

impl SpinController {
    pub fn new(params: SpinParams) -> Self {
        Self {
            params,
            armed: false,
            elapsed_ticks: 0,
            linear_x: 0.0,
            angular_z: 0.0,
            message_until: None,
            completed_last_tick: false,
        }
    }

    /// Start a maneuver from rest. Returns false if one is already running.
    pub fn arm(&mut self) -> bool {
        if self.armed {
            return false;
        }
        self.armed = true;
        self.elapsed_ticks = 0;
        self.linear_x = 0.0;
        self.angular_z = 0.0;
        true
    }

    /// Abort the maneuver; velocities reset on the next idle tick
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Advance one timer period
    pub fn tick(&mut self, now: Instant) -> SpinOutput {
        self.completed_last_tick = false;
        if self.message_until.is_some_and(|until| now >= until) {
            self.message_until = None;
        }

        if !self.armed {
            self.linear_x = 0.0;
            self.angular_z = 0.0;
            self.elapsed_ticks = 0;
            return SpinOutput::default();
        }

        if self.elapsed_ticks >= self.params.max_ticks {
            // Only reachable under the clamp policy
            return SpinOutput {
                command: Some(Twist::planar(self.linear_x, self.angular_z)),
                completed: false,
            };
        }

        self.linear_x += self.params.linear_step;
        self.angular_z += self.params.angular_step;
        self.elapsed_ticks += 1;
        let command = Twist::planar(self.linear_x, self.angular_z);

        let completed = self.elapsed_ticks >= self.params.max_ticks;
        if completed {
            self.completed_last_tick = true;
            self.message_until = Some(now + self.params.message_duration);
            if self.params.completion == CompletionPolicy::Stop {
                self.armed = false;
            }
        }

        SpinOutput {
            command: Some(command),
            completed,
        }
    }

    /// Whether the completion flag is up at `now`
    pub fn message_active(&self, now: Instant) -> bool {
        self.message_until.is_some_and(|until| now < until)
    }

    pub fn phase(&self, now: Instant) -> SpinPhase {
        if self.completed_last_tick {
            return SpinPhase::Completing;
        }
        match (self.armed, self.elapsed_ticks >= self.params.max_ticks) {
            (true, false) => SpinPhase::Spinning,
            (true, true) => SpinPhase::Clamped,
            (false, _) if self.message_active(now) => SpinPhase::Cooldown,
            (false, _) => SpinPhase::Idle,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn elapsed_ticks(&self) -> u32 {
        self.elapsed_ticks
    }

    pub fn linear_x(&self) -> f64 {
        self.linear_x
    }

    pub fn angular_z(&self) -> f64 {
        self.angular_z
    }

    pub fn params(&self) -> &SpinParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const PERIOD: Duration = Duration::from_millis(50);

    fn small(completion: CompletionPolicy) -> SpinParams {
        SpinParams {
            max_ticks: 10,
            completion,
            ..SpinParams::default()
        }
    }

    #[test]
    fn test_idle_emits_nothing() {
        let mut spin = SpinController::new(SpinParams::default());
        let now = Instant::now();
        assert_eq!(spin.tick(now), SpinOutput::default());
        assert_eq!(spin.phase(now), SpinPhase::Idle);
    }

    #[test]
    fn test_ramp_after_n_ticks() {
        let mut spin = SpinController::new(SpinParams::default());
        let start = Instant::now();
        assert!(spin.arm());

        let mut last = Twist::default();
        for n in 1..=250u32 {
            let out = spin.tick(start + PERIOD * n);
            let cmd = out.command.expect("armed controller emits every tick");
            assert!(cmd.linear_x() >= last.linear_x());
            assert!(cmd.angular_z() >= last.angular_z());
            assert_eq!(cmd.linear[1], 0.0);
            assert_eq!(cmd.angular[0], 0.0);
            last = cmd;
        }

        assert_relative_eq!(spin.linear_x(), 250.0 * 0.01, epsilon = 1e-9);
        assert_relative_eq!(spin.angular_z(), 250.0 * 0.022, epsilon = 1e-9);
        assert_eq!(spin.elapsed_ticks(), 250);
        assert_eq!(spin.phase(start), SpinPhase::Spinning);
    }

    #[test]
    fn test_completes_after_exactly_max_ticks() {
        let mut spin = SpinController::new(SpinParams::default());
        let start = Instant::now();
        spin.arm();

        for n in 1..4000u32 {
            let out = spin.tick(start + PERIOD * n);
            assert!(!out.completed);
            assert!(spin.is_armed());
        }

        let done_at = start + PERIOD * 4000;
        let out = spin.tick(done_at);
        assert!(out.completed);
        let last = out.command.unwrap();
        assert_relative_eq!(last.linear_x(), 40.0, epsilon = 1e-6);
        assert_relative_eq!(last.angular_z(), 88.0, epsilon = 1e-6);
        assert!(!spin.is_armed());
        assert!(spin.message_active(done_at));
        assert_eq!(spin.phase(done_at), SpinPhase::Completing);

        // The next tick is idle: nothing emitted, ramp reset
        let out = spin.tick(done_at + PERIOD);
        assert_eq!(out.command, None);
        assert_eq!(spin.phase(done_at + PERIOD), SpinPhase::Cooldown);
        assert_eq!(spin.linear_x(), 0.0);
        assert_eq!(spin.angular_z(), 0.0);
    }

    #[test]
    fn test_message_clears_after_duration() {
        let mut spin = SpinController::new(small(CompletionPolicy::Stop));
        let start = Instant::now();
        spin.arm();
        for n in 1..=10u32 {
            spin.tick(start + PERIOD * n);
        }
        let done_at = start + PERIOD * 10;
        assert!(spin.message_active(done_at + Duration::from_millis(2999)));
        assert!(!spin.message_active(done_at + Duration::from_millis(3000)));

        spin.tick(done_at + Duration::from_millis(3050));
        assert_eq!(spin.phase(done_at + Duration::from_millis(3050)), SpinPhase::Idle);
    }

    #[test]
    fn test_disarm_resets_on_next_idle_tick() {
        let mut spin = SpinController::new(SpinParams::default());
        let start = Instant::now();
        spin.arm();
        for n in 1..=5u32 {
            spin.tick(start + PERIOD * n);
        }
        assert!(spin.linear_x() > 0.0);

        spin.disarm();
        assert!(!spin.is_armed());
        let out = spin.tick(start + PERIOD * 6);
        assert_eq!(out.command, None);
        assert_eq!(spin.linear_x(), 0.0);
        assert_eq!(spin.angular_z(), 0.0);
        assert_eq!(spin.elapsed_ticks(), 0);
        assert!(!spin.message_active(start + PERIOD * 6));
    }

    #[test]
    fn test_rearm_while_armed_is_ignored() {
        let mut spin = SpinController::new(SpinParams::default());
        let start = Instant::now();
        assert!(spin.arm());
        spin.tick(start + PERIOD);
        spin.tick(start + PERIOD * 2);
        assert!(!spin.arm());
        assert_eq!(spin.elapsed_ticks(), 2);
    }

    #[test]
    fn test_arm_restarts_from_rest() {
        let mut spin = SpinController::new(SpinParams::default());
        let start = Instant::now();
        spin.arm();
        spin.tick(start + PERIOD);
        spin.disarm();
        // Re-armed before any idle tick ran
        assert!(spin.arm());
        let out = spin.tick(start + PERIOD * 2);
        assert_relative_eq!(out.command.unwrap().linear_x(), 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_clamp_policy_holds_bound() {
        let params = small(CompletionPolicy::Clamp);
        let mut spin = SpinController::new(params);
        let start = Instant::now();
        spin.arm();

        let mut completions = 0;
        for n in 1..=30u32 {
            let out = spin.tick(start + PERIOD * n);
            if out.completed {
                completions += 1;
            }
            let cmd = out.command.unwrap();
            assert!(cmd.linear_x() <= params.max_linear() + 1e-9);
            assert!(cmd.angular_z() <= params.max_angular() + 1e-9);
        }

        assert_eq!(completions, 1);
        assert!(spin.is_armed());
        assert_eq!(spin.phase(start + PERIOD * 30), SpinPhase::Clamped);
        assert_relative_eq!(spin.linear_x(), params.max_linear(), epsilon = 1e-9);

        spin.disarm();
        assert_eq!(spin.tick(start + PERIOD * 31).command, None);
    }
}

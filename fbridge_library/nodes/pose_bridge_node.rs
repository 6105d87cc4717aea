use crate::algorithms::{classify, map_to_pixels, FrameThrottle, SpinController};
use crate::config::BridgeConfig;
use crate::messages::{CompressedImage, Pose2D, Twist};
use crate::render::{Caption, FrameCompositor, FrameEncoder, Sprite};
use fbridge_core::error::BridgeResult;
use fbridge_core::{Hub, Node, NodeInfo};
use std::time::{Duration, Instant};

/// Pose Bridge Node - telemetry to rendered frames
///
/// Subscribes to pose updates and the spin/trail toggles. Every accepted pose
/// update is drawn onto a persistent surface, PNG-encoded and published along
/// with the two quadrant flags. Independently of pose traffic, a fixed-period
/// spin timer publishes the velocity ramp while the maneuver is armed.
pub struct PoseBridgeNode {
    // Subscribers
    pose_subscriber: Hub<Pose2D>,
    spin_on_subscriber: Hub<bool>,
    spin_off_subscriber: Hub<bool>,
    trail_on_subscriber: Hub<bool>,
    trail_off_subscriber: Hub<bool>,

    // Publishers
    image_publisher: Hub<CompressedImage>,
    north_east_publisher: Hub<bool>,
    south_west_publisher: Hub<bool>,
    cmd_vel_publisher: Hub<Twist>,

    // Rendering
    sprite: Sprite,
    compositor: FrameCompositor,
    encoder: FrameEncoder,
    world_extent: f64,

    // State
    throttle: FrameThrottle,
    spin: SpinController,
    spin_period: Duration,
    next_spin_at: Option<Instant>,
    trail_on: bool,
    frames_published: u64,
    frames_dropped: u64,
}

impl PoseBridgeNode {
    /// Create a bridge on the configured topics. With `caption` set to `None`
    /// completion is never drawn.
    pub fn new(config: &BridgeConfig, sprite: Sprite, caption: Option<Caption>) -> BridgeResult<Self> {
        let topics = &config.topics;
        Ok(Self {
            pose_subscriber: Hub::new(&topics.pose)?,
            spin_on_subscriber: Hub::new(&topics.spin_on)?,
            spin_off_subscriber: Hub::new(&topics.spin_off)?,
            trail_on_subscriber: Hub::new(&topics.trail_on)?,
            trail_off_subscriber: Hub::new(&topics.trail_off)?,

            image_publisher: Hub::new(&topics.image)?,
            north_east_publisher: Hub::new(&topics.north_east)?,
            south_west_publisher: Hub::new(&topics.south_west)?,
            cmd_vel_publisher: Hub::new(&topics.cmd_vel)?,

            sprite,
            compositor: FrameCompositor::new(&config.frame, caption),
            encoder: FrameEncoder::new(""),
            world_extent: config.world_extent,

            throttle: FrameThrottle::new(config.frame.stride),
            spin: SpinController::new(config.spin.params()),
            spin_period: config.spin.period(),
            next_spin_at: None,
            trail_on: config.frame.trail,
            frames_published: 0,
            frames_dropped: 0,
        })
    }

    /// One dispatch cycle at an explicit instant
    ///
    /// Toggles are applied first, then a due spin tick runs, then queued pose
    /// updates are handled in arrival order.
    pub fn tick_at(&mut self, now: Instant, mut ctx: Option<&mut NodeInfo>) {
        self.drain_toggles(ctx.as_deref_mut());
        self.run_spin_timer(now, ctx.as_deref_mut());

        while let Some(pose) = self.pose_subscriber.recv(ctx.as_deref_mut()) {
            self.handle_pose(pose, now, ctx.as_deref_mut());
        }
    }

    pub fn trail_on(&self) -> bool {
        self.trail_on
    }

    pub fn spin(&self) -> &SpinController {
        &self.spin
    }

    pub fn frames_published(&self) -> u64 {
        self.frames_published
    }

    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped
    }

    /// Topics drain one after another, so within a cycle spin_off wins over
    /// spin_on and trail_off over trail_on regardless of arrival order.
    fn drain_toggles(&mut self, mut ctx: Option<&mut NodeInfo>) {
        // Payloads are ignored; arrival is the event
        while self.spin_on_subscriber.recv(ctx.as_deref_mut()).is_some() {
            if self.spin.arm() {
                log::info!("Spin maneuver armed");
            }
        }
        while self.spin_off_subscriber.recv(ctx.as_deref_mut()).is_some() {
            if self.spin.is_armed() {
                log::info!(
                    "Spin maneuver aborted after {} ticks",
                    self.spin.elapsed_ticks()
                );
            }
            self.spin.disarm();
        }
        while self.trail_on_subscriber.recv(ctx.as_deref_mut()).is_some() {
            self.trail_on = true;
        }
        while self.trail_off_subscriber.recv(ctx.as_deref_mut()).is_some() {
            self.trail_on = false;
        }
    }

    fn run_spin_timer(&mut self, now: Instant, ctx: Option<&mut NodeInfo>) {
        let due = *self.next_spin_at.get_or_insert(now + self.spin_period);
        if now < due {
            return;
        }

        // More than a full period late: re-anchor rather than burst
        self.next_spin_at = Some(if now.duration_since(due) >= self.spin_period {
            now + self.spin_period
        } else {
            due + self.spin_period
        });

        let output = self.spin.tick(now);
        if let Some(command) = output.command {
            let _ = self.cmd_vel_publisher.send(command, ctx);
        }
        if output.completed {
            log::info!(
                "Spin maneuver complete after {} ticks",
                self.spin.params().max_ticks
            );
        }
    }

    fn handle_pose(&mut self, pose: Pose2D, now: Instant, mut ctx: Option<&mut NodeInfo>) {
        if let Err(e) = pose.validate() {
            warn(ctx, &format!("Skipping pose update: {}", e));
            return;
        }
        if !self.throttle.accept() {
            return;
        }

        let (width, height) = self.compositor.dimensions();
        let (px, py) = map_to_pixels(&pose, self.world_extent, width, height);
        let caption_on = self.spin.message_active(now);
        self.compositor
            .render(&self.sprite, px, py, pose.theta, self.trail_on, caption_on);

        match self.encoder.encode(self.compositor.surface()) {
            Ok(frame) => {
                self.frames_published += 1;
                let _ = self.image_publisher.send(frame, ctx.as_deref_mut());
            }
            Err(e) => {
                self.frames_dropped += 1;
                warn(ctx.as_deref_mut(), &format!("Dropping frame: {}", e));
            }
        }

        let quadrants = classify(&pose, self.world_extent);
        let _ = self
            .north_east_publisher
            .send(quadrants.north_east, ctx.as_deref_mut());
        let _ = self.south_west_publisher.send(quadrants.south_west, ctx);
    }
}

fn warn(ctx: Option<&mut NodeInfo>, message: &str) {
    match ctx {
        Some(ctx) => ctx.log_warning(message),
        None => log::warn!("{}", message),
    }
}

impl Node for PoseBridgeNode {
    fn name(&self) -> &'static str {
        "PoseBridgeNode"
    }

    fn init(&mut self, ctx: &mut NodeInfo) -> BridgeResult<()> {
        let (width, height) = self.compositor.dimensions();
        ctx.log_info(&format!(
            "Rendering {}x{} frames of a {} unit world, stride {}, spin every {:?}",
            width,
            height,
            self.world_extent,
            self.throttle.stride(),
            self.spin_period
        ));
        ctx.log_info(&format!(
            "Subscribed to '{}'; publishing '{}', '{}', '{}', '{}'",
            self.pose_subscriber.get_topic_name(),
            self.image_publisher.get_topic_name(),
            self.north_east_publisher.get_topic_name(),
            self.south_west_publisher.get_topic_name(),
            self.cmd_vel_publisher.get_topic_name()
        ));
        if !self.compositor.captions_enabled() {
            ctx.log_warning("No caption configured; completion caption disabled");
        }
        Ok(())
    }

    fn tick(&mut self, ctx: Option<&mut NodeInfo>) {
        self.tick_at(Instant::now(), ctx);
    }

    fn shutdown(&mut self, ctx: &mut NodeInfo) -> BridgeResult<()> {
        ctx.log_info(&format!(
            "Published {} frames ({} dropped) from {} pose updates",
            self.frames_published,
            self.frames_dropped,
            self.throttle.seen()
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::CompletionPolicy;
    use crate::config::TopicConfig;
    use crate::render::{CaptionFont, PNG_SIGNATURE};
    use image::{Rgba, RgbaImage};

    fn config(prefix: &str) -> BridgeConfig {
        BridgeConfig {
            topics: TopicConfig::with_prefix(prefix),
            ..BridgeConfig::default()
        }
    }

    fn sprite() -> Sprite {
        Sprite::from_image(RgbaImage::from_pixel(8, 8, Rgba([0, 255, 0, 255])))
    }

    #[test]
    fn test_every_other_pose_is_rendered() {
        let config = config("/bridge_node_test/stride");
        let mut node = PoseBridgeNode::new(&config, sprite(), None).unwrap();
        let poses: Hub<Pose2D> = Hub::new(&config.topics.pose).unwrap();
        let images: Hub<CompressedImage> = Hub::new(&config.topics.image).unwrap();
        let north_east: Hub<bool> = Hub::new(&config.topics.north_east).unwrap();

        for i in 0..6 {
            poses.send(Pose2D::new(9.0, 9.0, 0.1 * i as f64), None).unwrap();
        }
        node.tick_at(Instant::now(), None);

        let mut seqs = Vec::new();
        while let Some(frame) = images.recv(None) {
            assert_eq!(&frame.data[..8], &PNG_SIGNATURE);
            seqs.push(frame.header.seq);
        }
        assert_eq!(seqs, vec![0, 1, 2]);
        assert_eq!(north_east.pending(), 3);
        assert_eq!(north_east.recv(None), Some(true));
        assert_eq!(node.frames_published(), 3);
    }

    #[test]
    fn test_non_finite_pose_is_skipped() {
        let mut config = config("/bridge_node_test/nan");
        config.frame.stride = 1;
        let mut node = PoseBridgeNode::new(&config, sprite(), None).unwrap();
        let poses: Hub<Pose2D> = Hub::new(&config.topics.pose).unwrap();
        let images: Hub<CompressedImage> = Hub::new(&config.topics.image).unwrap();

        poses.send(Pose2D::new(f64::NAN, 1.0, 0.0), None).unwrap();
        poses.send(Pose2D::new(2.0, 2.0, 0.0), None).unwrap();
        node.tick_at(Instant::now(), None);

        assert_eq!(images.pending(), 1);
        assert_eq!(images.recv(None).unwrap().header.seq, 0);
    }

    #[test]
    fn test_trail_toggles() {
        let config = config("/bridge_node_test/trail");
        let mut node = PoseBridgeNode::new(&config, sprite(), None).unwrap();
        let trail_on: Hub<bool> = Hub::new(&config.topics.trail_on).unwrap();
        let trail_off: Hub<bool> = Hub::new(&config.topics.trail_off).unwrap();
        assert!(!node.trail_on());

        // Payload is ignored
        trail_on.send(false, None).unwrap();
        node.tick_at(Instant::now(), None);
        assert!(node.trail_on());

        trail_off.send(true, None).unwrap();
        node.tick_at(Instant::now(), None);
        assert!(!node.trail_on());
    }

    #[test]
    fn test_off_wins_within_one_cycle() {
        let config = config("/bridge_node_test/same_cycle");
        let mut node = PoseBridgeNode::new(&config, sprite(), None).unwrap();
        let spin_on: Hub<bool> = Hub::new(&config.topics.spin_on).unwrap();
        let spin_off: Hub<bool> = Hub::new(&config.topics.spin_off).unwrap();
        let trail_on: Hub<bool> = Hub::new(&config.topics.trail_on).unwrap();
        let trail_off: Hub<bool> = Hub::new(&config.topics.trail_off).unwrap();

        // Off arrives first, on second; both land in the same cycle
        spin_off.send(true, None).unwrap();
        spin_on.send(true, None).unwrap();
        trail_off.send(true, None).unwrap();
        trail_on.send(true, None).unwrap();
        node.tick_at(Instant::now(), None);

        assert!(!node.spin().is_armed());
        assert!(!node.trail_on());
    }

    #[test]
    fn test_spin_timer_runs_without_poses() {
        let config = config("/bridge_node_test/timer");
        let mut node = PoseBridgeNode::new(&config, sprite(), None).unwrap();
        let spin_on: Hub<bool> = Hub::new(&config.topics.spin_on).unwrap();
        let cmd_vel: Hub<Twist> = Hub::new(&config.topics.cmd_vel).unwrap();

        let start = Instant::now();
        spin_on.send(true, None).unwrap();
        node.tick_at(start, None);
        assert_eq!(cmd_vel.pending(), 0, "first timer tick is one period out");

        // Dispatcher at 10 ms: one spin tick per 50 ms
        for step in 1..=20u32 {
            node.tick_at(start + Duration::from_millis(10) * step, None);
        }
        assert_eq!(cmd_vel.pending(), 4);
        assert_eq!(node.spin().elapsed_ticks(), 4);
    }

    #[test]
    fn test_late_dispatch_does_not_burst() {
        let config = config("/bridge_node_test/late");
        let mut node = PoseBridgeNode::new(&config, sprite(), None).unwrap();
        let spin_on: Hub<bool> = Hub::new(&config.topics.spin_on).unwrap();
        let cmd_vel: Hub<Twist> = Hub::new(&config.topics.cmd_vel).unwrap();

        let start = Instant::now();
        spin_on.send(true, None).unwrap();
        node.tick_at(start, None);
        node.tick_at(start + Duration::from_millis(500), None);
        assert_eq!(cmd_vel.pending(), 1);

        node.tick_at(start + Duration::from_millis(520), None);
        assert_eq!(cmd_vel.pending(), 1);
        node.tick_at(start + Duration::from_millis(550), None);
        assert_eq!(cmd_vel.pending(), 2);
    }

    #[test]
    fn test_completion_caption_window() {
        let mut config = config("/bridge_node_test/complete");
        config.spin.max_ticks = 3;
        config.spin.completion = CompletionPolicy::Stop;
        let mut node = PoseBridgeNode::new(&config, sprite(), None).unwrap();
        let spin_on: Hub<bool> = Hub::new(&config.topics.spin_on).unwrap();
        let cmd_vel: Hub<Twist> = Hub::new(&config.topics.cmd_vel).unwrap();

        let start = Instant::now();
        spin_on.send(true, None).unwrap();
        for step in 0..=10u32 {
            node.tick_at(start + Duration::from_millis(50) * step, None);
        }

        assert_eq!(cmd_vel.pending(), 3);
        assert!(!node.spin().is_armed());
        let done_at = start + Duration::from_millis(150);
        assert!(node.spin().message_active(done_at + Duration::from_millis(2999)));
        assert!(!node.spin().message_active(done_at + Duration::from_millis(3000)));
    }

    fn decoded(frame: &CompressedImage) -> RgbaImage {
        image::load_from_memory(&frame.data).unwrap().to_rgba8()
    }

    #[test]
    fn test_caption_only_inside_completion_window() {
        let mut config = config("/bridge_node_test/caption");
        config.frame.stride = 1;
        config.spin.max_ticks = 1;
        config.caption.text = "SPIN DONE".to_string();
        let caption = Caption::new(&config.caption, CaptionFont::bundled().unwrap());
        let mut node = PoseBridgeNode::new(&config, sprite(), Some(caption)).unwrap();
        let poses: Hub<Pose2D> = Hub::new(&config.topics.pose).unwrap();
        let spin_on: Hub<bool> = Hub::new(&config.topics.spin_on).unwrap();
        let images: Hub<CompressedImage> = Hub::new(&config.topics.image).unwrap();
        let pose = Pose2D::new(5.0, 5.0, 0.0);

        // Before the maneuver
        let start = Instant::now();
        poses.send(pose, None).unwrap();
        node.tick_at(start, None);
        let before = decoded(&images.recv(None).unwrap());

        // The spin tick completes the one-step maneuver before poses are drawn
        spin_on.send(true, None).unwrap();
        poses.send(pose, None).unwrap();
        node.tick_at(start + Duration::from_millis(50), None);
        let during = decoded(&images.recv(None).unwrap());
        assert!(node.spin().message_active(start + Duration::from_millis(50)));

        // After the 3 s window
        poses.send(pose, None).unwrap();
        node.tick_at(start + Duration::from_millis(3100), None);
        let after = decoded(&images.recv(None).unwrap());
        assert!(!node.spin().message_active(start + Duration::from_millis(3100)));

        assert_ne!(before, during);
        assert_eq!(before, after);
    }
}

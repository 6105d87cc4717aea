use crate::config::TopicConfig;
use crate::messages::{CompressedImage, Twist};
use fbridge_core::error::BridgeResult;
use fbridge_core::{Hub, Node, NodeInfo};
use std::path::{Path, PathBuf};

/// Frame Recorder Node - writes published frames to disk
///
/// Drains the bridge's outbound topics. Every frame overwrites `latest.png` in
/// the output directory; with `keep_all` each frame is also kept as
/// `frame_<seq>.png`. Quadrant flags and velocity commands are only logged.
pub struct FrameRecorderNode {
    // Subscribers
    image_subscriber: Hub<CompressedImage>,
    north_east_subscriber: Hub<bool>,
    south_west_subscriber: Hub<bool>,
    cmd_vel_subscriber: Hub<Twist>,

    // Configuration
    output_dir: PathBuf,
    keep_all: bool,

    // State
    frames_written: u64,
    last_north_east: Option<bool>,
    last_south_west: Option<bool>,
}

impl FrameRecorderNode {
    pub fn new(topics: &TopicConfig, output_dir: impl Into<PathBuf>, keep_all: bool) -> BridgeResult<Self> {
        Ok(Self {
            image_subscriber: Hub::new(&topics.image)?,
            north_east_subscriber: Hub::new(&topics.north_east)?,
            south_west_subscriber: Hub::new(&topics.south_west)?,
            cmd_vel_subscriber: Hub::new(&topics.cmd_vel)?,
            output_dir: output_dir.into(),
            keep_all,
            frames_written: 0,
            last_north_east: None,
            last_south_west: None,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn write_frame(&mut self, frame: &CompressedImage) -> BridgeResult<()> {
        // Write-then-rename so readers never see a half-written latest.png
        let staging = self.output_dir.join(".latest.png.tmp");
        std::fs::write(&staging, &frame.data)?;
        std::fs::rename(&staging, self.output_dir.join("latest.png"))?;

        if self.keep_all {
            let name = format!("frame_{:06}.{}", frame.header.seq, frame.format);
            std::fs::write(self.output_dir.join(name), &frame.data)?;
        }

        self.frames_written += 1;
        Ok(())
    }
}

impl Node for FrameRecorderNode {
    fn name(&self) -> &'static str {
        "FrameRecorderNode"
    }

    fn init(&mut self, ctx: &mut NodeInfo) -> BridgeResult<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        ctx.log_info(&format!(
            "Recording frames to {}{}",
            self.output_dir.display(),
            if self.keep_all { " (keeping all)" } else { "" }
        ));
        Ok(())
    }

    fn tick(&mut self, mut ctx: Option<&mut NodeInfo>) {
        while let Some(frame) = self.image_subscriber.recv(ctx.as_deref_mut()) {
            if let Err(e) = self.write_frame(&frame) {
                let message = format!("Failed to write frame {}: {}", frame.header.seq, e);
                match ctx.as_deref_mut() {
                    Some(ctx) => ctx.log_warning(&message),
                    None => log::warn!("{}", message),
                }
            }
        }

        // Flag topics drain independently; they need not stay paired
        while let Some(north_east) = self.north_east_subscriber.recv(ctx.as_deref_mut()) {
            if self.last_north_east != Some(north_east) {
                log::debug!("north_east quadrant: {}", north_east);
                self.last_north_east = Some(north_east);
            }
        }
        while let Some(south_west) = self.south_west_subscriber.recv(ctx.as_deref_mut()) {
            if self.last_south_west != Some(south_west) {
                log::debug!("south_west quadrant: {}", south_west);
                self.last_south_west = Some(south_west);
            }
        }

        while let Some(twist) = self.cmd_vel_subscriber.recv(ctx.as_deref_mut()) {
            log::debug!(
                "cmd_vel: linear_x={:.3} angular_z={:.3}",
                twist.linear_x(),
                twist.angular_z()
            );
        }
    }

    fn shutdown(&mut self, ctx: &mut NodeInfo) -> BridgeResult<()> {
        ctx.log_info(&format!(
            "Wrote {} frames to {}",
            self.frames_written,
            self.output_dir.display()
        ));
        Ok(())
    }
}

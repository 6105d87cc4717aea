//! Per-frame raster compositing
//!
//! The surface is allocated once, opaque, at the configured size and repainted
//! in place every frame:
//!
//! 1. background fill, blended at `trail_alpha` when the trail is on so earlier
//!    frames fade out instead of vanishing
//! 2. sprite, centred on the agent and rotated by `pi/2 - theta` so a sprite
//!    drawn nose-up points along the heading
//! 3. optional caption, anchored to the agent by a fixed pixel offset

use super::assets::{CaptionFont, Sprite};
use crate::config::{CaptionConfig, FrameConfig};
use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use rusttype::Scale;
use std::f64::consts::FRAC_PI_2;

/// Caption text plus the face to draw it with
#[derive(Debug, Clone)]
pub struct Caption {
    font: CaptionFont,
    text: String,
    color: Rgba<u8>,
    offset: (i32, i32),
    scale: f32,
}

impl Caption {
    pub fn new(config: &CaptionConfig, font: CaptionFont) -> Self {
        let [r, g, b] = config.color;
        Self {
            font,
            text: config.text.clone(),
            color: Rgba([r, g, b, 255]),
            offset: (config.offset[0], config.offset[1]),
            scale: config.scale,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Upper bound on the text's width and height in pixels
    fn extent(&self) -> i64 {
        let em = self.scale.ceil() as i64;
        em * (self.text.chars().count() as i64 + 1)
    }
}

pub struct FrameCompositor {
    surface: RgbaImage,
    background: [u8; 3],
    trail_alpha: f32,
    caption: Option<Caption>,
}

impl FrameCompositor {
    /// Opaque surface filled with the background colour
    pub fn new(config: &FrameConfig, caption: Option<Caption>) -> Self {
        let [r, g, b] = config.background;
        Self {
            surface: RgbaImage::from_pixel(config.width, config.height, Rgba([r, g, b, 255])),
            background: config.background,
            trail_alpha: config.trail_alpha,
            caption,
        }
    }

    /// Paint one frame with the agent at pixel `(px, py)` facing `theta`
    pub fn render(
        &mut self,
        sprite: &Sprite,
        px: i32,
        py: i32,
        theta: f64,
        trail_on: bool,
        caption_on: bool,
    ) {
        let alpha = if trail_on { self.trail_alpha } else { 1.0 };
        self.fill_background(alpha);
        self.draw_sprite(sprite, px, py, theta);
        if caption_on {
            self.draw_caption(px, py);
        }
    }

    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    pub fn captions_enabled(&self) -> bool {
        self.caption.is_some()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.surface.dimensions()
    }

    fn fill_background(&mut self, alpha: f32) {
        let [r, g, b] = self.background;
        if alpha >= 1.0 {
            for pixel in self.surface.pixels_mut() {
                *pixel = Rgba([r, g, b, 255]);
            }
            return;
        }

        let keep = 1.0 - alpha;
        for pixel in self.surface.pixels_mut() {
            for (channel, fill) in pixel.0.iter_mut().zip([r, g, b]) {
                let blended = f32::from(*channel) * keep + f32::from(fill) * alpha;
                *channel = blended.round().clamp(0.0, 255.0) as u8;
            }
            pixel[3] = 255;
        }
    }

    fn draw_sprite(&mut self, sprite: &Sprite, px: i32, py: i32, theta: f64) {
        let (w, h) = (sprite.width() as f32, sprite.height() as f32);

        // Large enough for any rotation of the sprite
        let side = w.hypot(h).ceil() as u32 + 2;
        let half = side / 2;

        let projection = Projection::translate(-w / 2.0, -h / 2.0)
            .and_then(Projection::rotate((FRAC_PI_2 - theta) as f32))
            .and_then(Projection::translate(half as f32, half as f32));

        let mut layer = RgbaImage::new(side, side);
        warp_into(
            sprite.image(),
            &projection,
            Interpolation::Bilinear,
            Rgba([0, 0, 0, 0]),
            &mut layer,
        );

        imageops::overlay(
            &mut self.surface,
            &layer,
            i64::from(px) - i64::from(half),
            i64::from(py) - i64::from(half),
        );
    }

    fn draw_caption(&mut self, px: i32, py: i32) {
        let Some(caption) = &self.caption else {
            return;
        };

        // draw_text_mut positions the top of the line; the offset targets the baseline
        let left = i64::from(px) + i64::from(caption.offset.0);
        let baseline = i64::from(py) + i64::from(caption.offset.1);
        let top = baseline - caption.font.ascent(caption.scale).round() as i64;

        // Skip anchors the text cannot reach the surface from
        let extent = caption.extent();
        let (width, height) = self.surface.dimensions();
        if left + extent < 0
            || top + extent < 0
            || left > i64::from(width)
            || top > i64::from(height)
        {
            return;
        }

        draw_text_mut(
            &mut self.surface,
            caption.color,
            left as i32,
            top as i32,
            Scale::uniform(caption.scale),
            caption.font.font(),
            &caption.text,
        );
    }
}

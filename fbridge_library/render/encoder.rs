//! PNG serialization of the composited surface

use crate::messages::{CompressedImage, Header};
use fbridge_core::error::{BridgeError, BridgeResult};
use image::{ImageOutputFormat, RgbaImage};
use std::io::Cursor;

/// First eight bytes of every PNG stream
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Wraps encoded frames in a header with a per-encoder sequence number
#[derive(Debug, Default)]
pub struct FrameEncoder {
    next_seq: u32,
    frame_id: String,
}

impl FrameEncoder {
    pub fn new(frame_id: impl Into<String>) -> Self {
        Self {
            next_seq: 0,
            frame_id: frame_id.into(),
        }
    }

    /// Encode the surface as PNG, stamped with the current wall-clock time
    pub fn encode(&mut self, surface: &RgbaImage) -> BridgeResult<CompressedImage> {
        let mut data = Vec::new();
        surface
            .write_to(&mut Cursor::new(&mut data), ImageOutputFormat::Png)
            .map_err(|e| BridgeError::Encode(e.to_string()))?;

        if !data.starts_with(&PNG_SIGNATURE) {
            return Err(BridgeError::Encode(
                "encoder output is missing the PNG signature".to_string(),
            ));
        }

        let header = Header {
            seq: self.next_seq,
            stamp_millis: u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0),
            frame_id: self.frame_id.clone(),
        };
        self.next_seq = self.next_seq.wrapping_add(1);

        Ok(CompressedImage::new(header, "png", data))
    }

    /// Sequence number the next frame will carry
    pub fn next_seq(&self) -> u32 {
        self.next_seq
    }
}

use fbridge_core::core::LogSummary;
use serde::{Deserialize, Serialize};

/// Message envelope
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Header {
    pub seq: u32,
    /// Milliseconds since the Unix epoch
    pub stamp_millis: u64,
    pub frame_id: String,
}

/// Compressed image frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedImage {
    pub header: Header,
    /// Encoding tag, e.g. "png"
    pub format: String,
    /// Raw encoded bytes
    pub data: Vec<u8>,
}

impl CompressedImage {
    pub fn new(header: Header, format: &str, data: Vec<u8>) -> Self {
        Self {
            header,
            format: format.to_string(),
            data,
        }
    }
}

impl LogSummary for CompressedImage {
    fn log_summary(&self) -> String {
        format!(
            "CompressedImage(seq: {}, format: {}, {} bytes)",
            self.header.seq,
            self.format,
            self.data.len()
        )
    }
}

//! Static render assets, loaded once at startup
//!
//! A missing or undecodable asset is an `AssetLoad` error; the binary treats
//! it as fatal before any node is registered.

use crate::config::AssetConfig;
use fbridge_core::error::{BridgeError, BridgeResult};
use image::RgbaImage;
use rusttype::{Font, Scale};
use std::path::Path;

/// Decoded agent sprite in RGBA
#[derive(Debug, Clone)]
pub struct Sprite {
    image: RgbaImage,
}

impl Sprite {
    pub fn load<P: AsRef<Path>>(path: P) -> BridgeResult<Self> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|e| BridgeError::asset(path, e.to_string()))?;
        let sprite = Self::from_image(decoded.to_rgba8());
        log::info!(
            "Loaded sprite {} ({}x{})",
            path.display(),
            sprite.width(),
            sprite.height()
        );
        Ok(sprite)
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Face compiled into the library, used when no caption font is configured.
/// DejaVu Sans Mono has no CJK glyphs; those render as its missing-glyph box.
static BUNDLED_FONT: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

/// TrueType/OpenType face used for the completion caption
#[derive(Clone)]
pub struct CaptionFont {
    font: Font<'static>,
}

impl CaptionFont {
    /// The built-in face
    pub fn bundled() -> BridgeResult<Self> {
        Font::try_from_bytes(BUNDLED_FONT)
            .map(|font| Self { font })
            .ok_or_else(|| BridgeError::Internal("bundled caption font is unreadable".to_string()))
    }

    /// The configured face if one is set, the bundled one otherwise
    pub fn from_config(assets: &AssetConfig) -> BridgeResult<Self> {
        match &assets.font {
            Some(path) => Self::load(path),
            None => Self::bundled(),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> BridgeResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| BridgeError::asset(path, e.to_string()))?;
        let font = Self::from_bytes(bytes)
            .map_err(|_| BridgeError::asset(path, "not a TrueType/OpenType font"))?;
        log::info!("Loaded caption font {}", path.display());
        Ok(font)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> BridgeResult<Self> {
        Font::try_from_vec(bytes)
            .map(|font| Self { font })
            .ok_or_else(|| BridgeError::InvalidInput("unparseable font data".to_string()))
    }

    pub fn font(&self) -> &Font<'static> {
        &self.font
    }

    /// Distance from the top of the text box to the baseline at `scale`
    pub fn ascent(&self, scale: f32) -> f32 {
        self.font.v_metrics(Scale::uniform(scale)).ascent
    }
}

impl std::fmt::Debug for CaptionFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionFont")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

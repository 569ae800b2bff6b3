//! Card rendering.
//!
//! A card is a solid rectangle with its dimensions written in the middle:
//!
//! ```text
//! ┌──────────────────────────┐
//! │                          │
//! │       200 X 320          │
//! │                          │
//! └──────────────────────────┘
//! ```
//!
//! The label is only drawn when it fits strictly inside the card. Tiny cards
//! come out as a plain rectangle, which is not an error.
//!
//! Output is deterministic: the same request and format always encode to the
//! same bytes. The PNG encoder writes no timestamps or other variable chunks.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};

use super::font;
use super::request::CardRequest;
use crate::error::CardError;

/// Card fill color (`#CCCCCC`).
pub const DEFAULT_BACKGROUND: Rgb<u8> = Rgb([0xCC, 0xCC, 0xCC]);

/// Label color (`#555555`).
pub const DEFAULT_FOREGROUND: Rgb<u8> = Rgb([0x55, 0x55, 0x55]);

/// JPEG quality used when rendering JPEG cards.
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

// =============================================================================
// Card Format
// =============================================================================

/// Encoded output format of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CardFormat {
    #[default]
    Png,
    Jpeg,
}

impl CardFormat {
    /// Lowercase token used in cache keys and on the command line.
    pub fn token(&self) -> &'static str {
        match self {
            CardFormat::Png => "png",
            CardFormat::Jpeg => "jpeg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            CardFormat::Png => "image/png",
            CardFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            CardFormat::Png => "png",
            CardFormat::Jpeg => "jpg",
        }
    }
}

impl fmt::Display for CardFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for CardFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(CardFormat::Png),
            "jpeg" | "jpg" => Ok(CardFormat::Jpeg),
            other => Err(format!("unsupported card format: {} (expected png or jpeg)", other)),
        }
    }
}

// =============================================================================
// Render Trait
// =============================================================================

/// Produces encoded card bytes for a validated request.
///
/// [`CardRenderer`] is the real implementation. The trait exists so the card
/// service can be driven by instrumented renderers in tests.
pub trait Render: Send + Sync + 'static {
    fn render(&self, request: &CardRequest, format: CardFormat) -> Result<Bytes, CardError>;
}

// =============================================================================
// Card Renderer
// =============================================================================

/// Draws and encodes cards.
#[derive(Debug, Clone)]
pub struct CardRenderer {
    background: Rgb<u8>,
    foreground: Rgb<u8>,
    jpeg_quality: u8,
}

impl CardRenderer {
    pub fn new() -> Self {
        Self {
            background: DEFAULT_BACKGROUND,
            foreground: DEFAULT_FOREGROUND,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Use custom fill and label colors.
    pub fn with_colors(mut self, background: Rgb<u8>, foreground: Rgb<u8>) -> Self {
        self.background = background;
        self.foreground = foreground;
        self
    }

    pub fn background(&self) -> Rgb<u8> {
        self.background
    }

    pub fn foreground(&self) -> Rgb<u8> {
        self.foreground
    }

    /// Draw the card without encoding it.
    pub fn rasterize(&self, request: &CardRequest) -> RgbImage {
        let (width, height) = (request.width(), request.height());
        let mut image = RgbImage::from_pixel(width, height, self.background);

        let label = request.label();
        let (text_width, text_height) = font::text_size(&label);

        if text_width < width && text_height < height {
            let top = (height - text_height) / 2;
            let left = (width - text_width) / 2;
            font::draw_text(&mut image, left, top, &label, self.foreground);
        }

        image
    }

    /// Encode a raster to `format`.
    pub fn encode(&self, image: &RgbImage, format: CardFormat) -> Result<Bytes, CardError> {
        let mut output = Cursor::new(Vec::new());

        let result = match format {
            CardFormat::Png => PngEncoder::new(&mut output).write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgb8,
            ),
            CardFormat::Jpeg => {
                JpegEncoder::new_with_quality(&mut output, self.jpeg_quality).encode_image(image)
            }
        };

        result.map_err(|e| CardError::Encode {
            message: e.to_string(),
        })?;

        Ok(Bytes::from(output.into_inner()))
    }
}

impl Default for CardRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Render for CardRenderer {
    fn render(&self, request: &CardRequest, format: CardFormat) -> Result<Bytes, CardError> {
        let image = self.rasterize(request);
        self.encode(&image, format)
    }
}

// =============================================================================
// Tests
// =============================================================================

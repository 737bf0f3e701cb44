//! QR rasterisation.
//!
//! Encoding is delegated to the `qrcode` crate; this module turns the module
//! matrix into an RGBA raster of an exact pixel size, with a quiet zone and
//! arbitrary dark/light colors. The light color may be transparent.

use std::io::Cursor;

use qrcode::{Color, EcLevel, QrCode};

use crate::color::{self, Rgba, TRANSPARENT, WHITE};
use crate::error::{DownloadError, RenderError};
use crate::request::{GenerationRequest, MAX_SIZE};

/// Quiet zone, in modules, drawn around the symbol.
pub const DEFAULT_MARGIN: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Output width and height in pixels.
    pub size: u32,
    pub dark: Rgba,
    pub light: Rgba,
    pub margin: u32,
}

impl RenderOptions {
    /// Options for a request with the given light color.
    pub fn for_request(
        request: &GenerationRequest,
        light: Rgba,
        margin: u32,
    ) -> Result<Self, RenderError> {
        let dark = color::parse_hex(&request.fg_color)
            .ok_or_else(|| RenderError::InvalidColor(request.fg_color.clone()))?;
        Ok(Self {
            size: request.size.pixels(),
            dark,
            light,
            margin,
        })
    }

    /// In-app rendering: transparent background.
    pub fn preview(request: &GenerationRequest, margin: u32) -> Result<Self, RenderError> {
        Self::for_request(request, TRANSPARENT, margin)
    }

    /// Rendering for saved files: opaque white background.
    pub fn download(request: &GenerationRequest, margin: u32) -> Result<Self, RenderError> {
        Self::for_request(request, WHITE, margin)
    }
}

/// A rendered raster in straight RGBA8, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct RenderedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl std::fmt::Debug for RenderedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl RenderedImage {
    /// Returns `None` when `pixels` does not hold exactly `width * height` RGBA pixels.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (pixels.len() == expected).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.pixels
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.pixels.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Composites the image over an opaque background color.
    pub fn flatten_onto(&self, background: Rgba) -> Self {
        let [br, bg, bb, _] = background;
        let mut pixels = Vec::with_capacity(self.pixels.len());
        for px in self.pixels.chunks_exact(4) {
            let alpha = u32::from(px[3]);
            let blend = |fg: u8, bg: u8| {
                ((u32::from(fg) * alpha + u32::from(bg) * (255 - alpha) + 127) / 255) as u8
            };
            pixels.extend_from_slice(&[blend(px[0], br), blend(px[1], bg), blend(px[2], bb), 255]);
        }
        Self {
            width: self.width,
            height: self.height,
            pixels,
        }
    }

    pub fn to_png(&self) -> Result<Vec<u8>, DownloadError> {
        let buffer = image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| {
                DownloadError::Encode(image::ImageError::Parameter(
                    image::error::ParameterError::from_kind(
                        image::error::ParameterErrorKind::DimensionMismatch,
                    ),
                ))
            })?;

        let mut bytes = Vec::new();
        buffer.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// The external QR encoding collaborator.
///
/// Failing on payloads that are too dense for the requested size is an
/// expected outcome, not a programming error.
pub trait QrRenderer {
    fn render(&self, text: &str, options: &RenderOptions) -> Result<RenderedImage, RenderError>;
}

impl<T: QrRenderer + ?Sized> QrRenderer for &T {
    fn render(&self, text: &str, options: &RenderOptions) -> Result<RenderedImage, RenderError> {
        (**self).render(text, options)
    }
}

/// Renderer backed by the `qrcode` crate.
#[derive(Debug, Clone, Copy)]
pub struct QrCodeRenderer {
    ec_level: EcLevel,
}

impl Default for QrCodeRenderer {
    fn default() -> Self {
        Self {
            ec_level: EcLevel::M,
        }
    }
}

impl QrCodeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ec_level(ec_level: EcLevel) -> Self {
        Self { ec_level }
    }
}

impl QrRenderer for QrCodeRenderer {
    fn render(&self, text: &str, options: &RenderOptions) -> Result<RenderedImage, RenderError> {
        let too_large = RenderError::TooLarge {
            size: options.size,
            max: MAX_SIZE,
        };
        if options.size > MAX_SIZE {
            return Err(too_large);
        }

        let code = QrCode::with_error_correction_level(text.as_bytes(), self.ec_level)?;
        let modules = code.width();
        let margin = options.margin as usize;
        let total = modules + margin * 2;
        let size = options.size as usize;

        // Every module needs at least one pixel.
        if size == 0 || total > size {
            return Err(RenderError::TooDense {
                required: total,
                size: options.size,
            });
        }

        let colors = code.to_colors();
        let is_dark = |mx: usize, my: usize| {
            if mx < margin || my < margin || mx >= margin + modules || my >= margin + modules {
                return false;
            }
            colors[(my - margin) * modules + (mx - margin)] == Color::Dark
        };

        let capacity = size
            .checked_mul(size)
            .and_then(|n| n.checked_mul(4))
            .ok_or(too_large)?;
        let mut pixels = Vec::with_capacity(capacity);
        for py in 0..size {
            let my = py * total / size;
            for px in 0..size {
                let mx = px * total / size;
                let rgba = if is_dark(mx, my) {
                    &options.dark
                } else {
                    &options.light
                };
                pixels.extend_from_slice(rgba);
            }
        }

        log::debug!(
            "rendered {}x{} QR code ({} modules, {} bytes of payload)",
            size,
            size,
            modules,
            text.len()
        );

        Ok(RenderedImage {
            width: options.size,
            height: options.size,
            pixels,
        })
    }
}

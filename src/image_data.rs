//! Image payload handling.
//!
//! Every image in the system, page backgrounds and image-field values alike,
//! travels as a data URI (or bare base64). This module turns those payloads
//! into something the PDF serializer can embed: JPEG bytes pass through
//! untouched (the PDF spec decodes DCT natively), everything else decodes
//! to RGB pixels with the alpha channel split off for SMask transparency.
//!
//! Errors are plain strings; callers decide whether a failure is a skipped
//! page, a placeholder, or a silent no-op.

use std::io::Cursor;

use base64::Engine as _;

/// A decoded payload ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub source: PixelSource,
    pub width_px: u32,
    pub height_px: u32,
}

#[derive(Debug, Clone)]
pub enum PixelSource {
    /// Raw JPEG bytes, embedded directly with DCTDecode.
    Jpeg { data: Vec<u8>, grayscale: bool },
    /// `width * height * 3` RGB bytes, plus `width * height` alpha bytes
    /// when the image carries any transparency.
    Rgb {
        rgb: Vec<u8>,
        alpha: Option<Vec<u8>>,
    },
}

/// Extract the raw bytes of a payload string.
///
/// Accepts `data:<mime>;base64,<payload>` and bare base64.
pub fn payload_bytes(src: &str) -> Result<Vec<u8>, String> {
    let encoded = if src.starts_with("data:") {
        let comma = src
            .find(',')
            .ok_or_else(|| "invalid data URI: missing comma".to_string())?;
        &src[comma + 1..]
    } else {
        src
    };
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| format!("base64 decode error: {e}"))
}

/// Read a payload's intrinsic pixel dimensions without decoding pixels.
///
/// This backs both the auto-resize probe and the export compositor's page
/// sizing.
pub fn probe_dimensions(src: &str) -> Result<(u32, u32), String> {
    let bytes = payload_bytes(src)?;
    image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| format!("unrecognized image data: {e}"))?
        .into_dimensions()
        .map_err(|e| format!("failed to read image dimensions: {e}"))
}

/// Fully decode a payload for embedding.
pub fn decode(src: &str) -> Result<DecodedImage, String> {
    let bytes = payload_bytes(src)?;
    let format = image::guess_format(&bytes).map_err(|e| format!("unrecognized image data: {e}"))?;
    let img =
        image::load_from_memory(&bytes).map_err(|e| format!("failed to decode image: {e}"))?;
    let (width_px, height_px) = (img.width(), img.height());

    if format == image::ImageFormat::Jpeg {
        let grayscale = matches!(
            img.color(),
            image::ColorType::L8 | image::ColorType::L16 | image::ColorType::La8 | image::ColorType::La16
        );
        return Ok(DecodedImage {
            source: PixelSource::Jpeg {
                data: bytes,
                grayscale,
            },
            width_px,
            height_px,
        });
    }

    let rgba = img.to_rgba8();
    let pixel_count = (width_px as usize) * (height_px as usize);
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    let mut transparent = false;
    for px in rgba.pixels() {
        rgb.extend_from_slice(&px.0[..3]);
        alpha.push(px.0[3]);
        if px.0[3] != 255 {
            transparent = true;
        }
    }

    Ok(DecodedImage {
        source: PixelSource::Rgb {
            rgb,
            alpha: transparent.then_some(alpha),
        },
        width_px,
        height_px,
    })
}

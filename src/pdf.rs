//! # PDF Serializer
//!
//! A from-scratch PDF 1.7 writer behind the [`DocumentSink`] interface.
//! Writing the raw bytes ourselves keeps the engine self-contained; the
//! subset a filled template needs (pages, two standard fonts, images,
//! stroked rectangles) is small enough to emit directly.
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- Catalog, Pages, fonts, XObjects, content streams
//! ...
//! xref                <- byte offsets of each object
//! trailer             <- points at the Catalog
//! %%EOF
//! ```
//!
//! Geometry arrives in top-left-origin raster pixels and is converted at
//! this boundary: flipped to PDF's bottom-left origin, and scaled to points
//! at 72/96 (the conventional CSS-pixel factor).
//!
//! Text uses the unembedded standard Helvetica faces with WinAnsi-ish byte
//! strings: Latin-1 code points emit as octal escapes, anything beyond
//! becomes `?`. Content streams are Flate-compressed. JPEG payloads embed
//! as DCTDecode without re-encoding; everything else embeds as raw RGB with
//! an SMask when the source had transparency.

use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::canvas::Rect;
use crate::compose::{DocumentSink, Orientation, Rgb, BLACK};
use crate::font::StandardFont;
use crate::image_data::{self, DecodedImage, PixelSource};
use crate::model::FontWeight;
use crate::text;

/// Raster pixels to PDF points.
const PX_TO_PT: f64 = 72.0 / 96.0;

/// Baseline-to-baseline distance as a multiple of the font size.
const LINE_HEIGHT_FACTOR: f64 = 1.15;

/// A PDF document under construction.
pub struct PdfDocument {
    pages: Vec<PageBuild>,
    images: Vec<DecodedImage>,
    font: StandardFont,
    font_size: f64,
    text_color: Rgb,
    draw_color: Rgb,
}

struct PageBuild {
    width_pt: f64,
    height_pt: f64,
    content: String,
    /// Indices into `PdfDocument::images` referenced by this page.
    images: Vec<usize>,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            images: Vec::new(),
            font: StandardFont::Helvetica,
            font_size: 16.0,
            text_color: BLACK,
            draw_color: BLACK,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serialize the finished document to PDF bytes.
    pub fn save(&self) -> Vec<u8> {
        // Object ids: 1 Catalog, 2 Pages root, 3-4 fonts, then images,
        // then per page a content stream and the page dict.
        let mut objects: Vec<Vec<u8>> = vec![Vec::new()]; // ids are 1-based
        objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
        objects.push(Vec::new()); // Pages root, patched once kids are known
        objects.push(font_object(StandardFont::Helvetica));
        objects.push(font_object(StandardFont::HelveticaBold));

        let image_ids: Vec<usize> = self
            .images
            .iter()
            .map(|img| push_image_object(&mut objects, img))
            .collect();

        let mut page_ids = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let compressed = compress_to_vec_zlib(page.content.as_bytes(), 6);
            let content_id = objects.len();
            let mut data = format!(
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            )
            .into_bytes();
            data.extend_from_slice(&compressed);
            data.extend_from_slice(b"\nendstream");
            objects.push(data);

            let mut resources = "/Font << /F1 3 0 R /F2 4 0 R >>".to_string();
            if !page.images.is_empty() {
                resources.push_str(" /XObject << ");
                for &idx in &page.images {
                    let _ = write!(resources, "/Im{} {} 0 R ", idx, image_ids[idx]);
                }
                resources.push_str(">>");
            }

            let page_id = objects.len();
            objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                     /Contents {} 0 R /Resources << {} >> >>",
                    page.width_pt, page.height_pt, content_id, resources
                )
                .into_bytes(),
            );
            page_ids.push(page_id);
        }

        let mut kids = String::new();
        for id in &page_ids {
            let _ = write!(kids, "{} 0 R ", id);
        }
        objects[2] = format!(
            "<< /Type /Pages /Kids [ {}] /Count {} >>",
            kids,
            page_ids.len()
        )
        .into_bytes();

        let mut out: Vec<u8> = Vec::new();
        out.extend_from_slice(b"%PDF-1.7\n");
        let mut offsets = vec![0usize; objects.len()];
        for (id, data) in objects.iter().enumerate().skip(1) {
            offsets[id] = out.len();
            let _ = write!(out, "{} 0 obj\n", id);
            out.extend_from_slice(data);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_offset = out.len();
        let _ = write!(out, "xref\n0 {}\n", objects.len());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(out, "{:010} 00000 n \n", offset);
        }
        let _ = write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len(),
            xref_offset
        );
        out
    }
}

impl DocumentSink for PdfDocument {
    fn add_page(&mut self, width: f64, height: f64, orientation: Orientation) {
        // Honor the requested orientation the way jsPDF does: swap the
        // dimensions when they disagree with it.
        let (w, h) = match orientation {
            Orientation::Landscape if width < height => (height, width),
            Orientation::Portrait if width > height => (height, width),
            _ => (width, height),
        };
        self.pages.push(PageBuild {
            width_pt: w * PX_TO_PT,
            height_pt: h * PX_TO_PT,
            content: String::new(),
            images: Vec::new(),
        });
    }

    fn draw_image(&mut self, src: &str, rect: Rect) -> Result<(), String> {
        let decoded = image_data::decode(src)?;
        let Some(page) = self.pages.last_mut() else {
            return Ok(());
        };
        let idx = self.images.len();
        let w = rect.width * PX_TO_PT;
        let h = rect.height * PX_TO_PT;
        let x = rect.x * PX_TO_PT;
        let y = page.height_pt - (rect.y + rect.height) * PX_TO_PT;
        let _ = write!(
            page.content,
            "q\n{:.4} 0 0 {:.4} {:.4} {:.4} cm\n/Im{} Do\nQ\n",
            w, h, x, y, idx
        );
        page.images.push(idx);
        self.images.push(decoded);
        Ok(())
    }

    fn set_font(&mut self, size: f64, weight: FontWeight) {
        self.font_size = size;
        self.font = StandardFont::for_weight(weight);
    }

    fn set_text_color(&mut self, color: Rgb) {
        self.text_color = color;
    }

    fn set_draw_color(&mut self, color: Rgb) {
        self.draw_color = color;
    }

    fn split_text_to_width(&self, text: &str, max_width: f64) -> Vec<String> {
        text::split_to_width(text, max_width, |ch| {
            self.font.char_width(ch, self.font_size)
        })
    }

    fn draw_text_lines(&mut self, lines: &[String], x: f64, y: f64) {
        let font = self.font.resource_name();
        let size_pt = self.font_size * PX_TO_PT;
        let (r, g, b) = color_components(self.text_color);
        let line_height = self.font_size * LINE_HEIGHT_FACTOR;
        let Some(page) = self.pages.last_mut() else {
            return;
        };
        for (i, line) in lines.iter().enumerate() {
            let baseline_px = y + line_height * i as f64;
            let _ = write!(
                page.content,
                "BT\n/{} {:.3} Tf\n{:.3} {:.3} {:.3} rg\n{:.4} {:.4} Td\n({}) Tj\nET\n",
                font,
                size_pt,
                r,
                g,
                b,
                x * PX_TO_PT,
                page.height_pt - baseline_px * PX_TO_PT,
                escape_text(line)
            );
        }
    }

    fn stroke_rect(&mut self, rect: Rect) {
        let (r, g, b) = color_components(self.draw_color);
        let Some(page) = self.pages.last_mut() else {
            return;
        };
        let _ = write!(
            page.content,
            "{:.3} {:.3} {:.3} RG\n{:.4} {:.4} {:.4} {:.4} re\nS\n",
            r,
            g,
            b,
            rect.x * PX_TO_PT,
            page.height_pt - (rect.y + rect.height) * PX_TO_PT,
            rect.width * PX_TO_PT,
            rect.height * PX_TO_PT
        );
    }
}

fn font_object(font: StandardFont) -> Vec<u8> {
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        font.pdf_name()
    )
    .into_bytes()
}

/// Append the XObject(s) for one image, returning the main object's id.
/// Transparent images get their alpha channel as a separate SMask object.
fn push_image_object(objects: &mut Vec<Vec<u8>>, img: &DecodedImage) -> usize {
    match &img.source {
        PixelSource::Jpeg { data, grayscale } => {
            let color_space = if *grayscale {
                "/DeviceGray"
            } else {
                "/DeviceRGB"
            };
            let id = objects.len();
            let mut obj = format!(
                "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                 /ColorSpace {} /BitsPerComponent 8 /Filter /DCTDecode /Length {} >>\nstream\n",
                img.width_px,
                img.height_px,
                color_space,
                data.len()
            )
            .into_bytes();
            obj.extend_from_slice(data);
            obj.extend_from_slice(b"\nendstream");
            objects.push(obj);
            id
        }
        PixelSource::Rgb { rgb, alpha } => {
            let smask_id = alpha.as_ref().map(|alpha| {
                let compressed = compress_to_vec_zlib(alpha, 6);
                let id = objects.len();
                let mut obj = format!(
                    "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace /DeviceGray /BitsPerComponent 8 /Filter /FlateDecode /Length {} >>\nstream\n",
                    img.width_px,
                    img.height_px,
                    compressed.len()
                )
                .into_bytes();
                obj.extend_from_slice(&compressed);
                obj.extend_from_slice(b"\nendstream");
                objects.push(obj);
                id
            });

            let compressed = compress_to_vec_zlib(rgb, 6);
            let smask = smask_id
                .map(|id| format!(" /SMask {} 0 R", id))
                .unwrap_or_default();
            let id = objects.len();
            let mut obj = format!(
                "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                 /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode{} /Length {} >>\nstream\n",
                img.width_px,
                img.height_px,
                smask,
                compressed.len()
            )
            .into_bytes();
            obj.extend_from_slice(&compressed);
            obj.extend_from_slice(b"\nendstream");
            objects.push(obj);
            id
        }
    }
}

fn color_components(c: Rgb) -> (f64, f64, f64) {
    (
        f64::from(c.r) / 255.0,
        f64::from(c.g) / 255.0,
        f64::from(c.b) / 255.0,
    )
}

/// Escape a line for a PDF literal string. Latin-1 code points outside
/// printable ASCII emit as octal escapes; anything beyond Latin-1 has no
/// WinAnsi slot and becomes `?`.
fn escape_text(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    for ch in line.chars() {
        match ch {
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\\' => out.push_str("\\\\"),
            ' '..='~' => out.push(ch),
            _ => {
                let code = ch as u32;
                if code <= 0xFF {
                    let _ = write!(out, "\\{:03o}", code);
                } else {
                    out.push('?');
                }
            }
        }
    }
    out
}

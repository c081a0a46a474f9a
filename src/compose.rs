//! # Export Compositor
//!
//! Walks the template page by page, re-projects every field's canvas
//! geometry into the output page's physical space through the same
//! [`ContainFit`] that positioned the background on screen, and emits draw
//! instructions to a [`DocumentSink`].
//!
//! Failure semantics are deliberately soft: a page without a background is
//! skipped, a field whose image payload won't decode becomes a stroked
//! placeholder, an empty value draws nothing. The only hard precondition is
//! that at least one background exists at all.

use crate::canvas::{ContainFit, Rect};
use crate::error::Error;
use crate::image_data;
use crate::model::{FontWeight, Template};

/// An RGB color with 0–255 components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

/// Outline color of the placeholder drawn for a failed image payload.
pub const PLACEHOLDER_RED: Rgb = Rgb { r: 255, g: 0, b: 0 };

/// Label drawn inside a failed image's placeholder box.
pub const IMAGE_ERROR_LABEL: &str = "Image Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// The output-assembly collaborator.
///
/// Coordinates are top-left-origin page units; `y` passed to
/// [`draw_text_lines`](DocumentSink::draw_text_lines) is the first line's
/// baseline. Text measurement happens against the sink's *current* font
/// state, which is why splitting lives here and not in the compositor.
pub trait DocumentSink {
    fn add_page(&mut self, width: f64, height: f64, orientation: Orientation);

    /// Place an image payload stretched to exactly `rect`. Errors are
    /// strings; the compositor degrades them to placeholders.
    fn draw_image(&mut self, src: &str, rect: Rect) -> Result<(), String>;

    fn set_font(&mut self, size: f64, weight: FontWeight);

    fn set_text_color(&mut self, color: Rgb);

    fn set_draw_color(&mut self, color: Rgb);

    /// Wrap `text` to `max_width` using the current font.
    fn split_text_to_width(&self, text: &str, max_width: f64) -> Vec<String>;

    /// Draw pre-split lines left-aligned, first baseline at `y`, successive
    /// baselines one line-height apart.
    fn draw_text_lines(&mut self, lines: &[String], x: f64, y: f64);

    fn stroke_rect(&mut self, rect: Rect);
}

/// What a composition pass actually emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComposeReport {
    /// Pages emitted (pages without a usable background don't count).
    pub pages: usize,
    /// Image fields degraded to an error placeholder.
    pub placeholders: usize,
}

/// Re-compose the template's fields onto output pages.
pub fn compose<S: DocumentSink>(template: &Template, sink: &mut S) -> Result<ComposeReport, Error> {
    if template.background_pdfs.is_empty() {
        return Err(Error::MissingBackgrounds);
    }

    let mut report = ComposeReport::default();
    for page in 1..=template.page_count() {
        let Some(background) = template.background(page) else {
            continue;
        };

        let (width_px, height_px) = match image_data::probe_dimensions(background) {
            Ok(dims) => dims,
            Err(err) => {
                tracing::warn!(page, error = %err, "skipping page with unreadable background");
                continue;
            }
        };
        let (width, height) = (f64::from(width_px), f64::from(height_px));
        let Some(fit) = ContainFit::new(width, height) else {
            tracing::warn!(page, "skipping page with degenerate background dimensions");
            continue;
        };

        let orientation = if width > height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        };
        sink.add_page(width, height, orientation);
        report.pages += 1;

        if let Err(err) = sink.draw_image(background, Rect::new(0.0, 0.0, width, height)) {
            tracing::warn!(page, error = %err, "background failed to place");
        }

        for field in template.fields_on_page(page) {
            if field.value.is_empty() {
                continue;
            }
            let rect = fit.to_page(field.bounds());

            if field.kind.is_textual() {
                let font_size = fit.scale_len(field.font_size);
                sink.set_font(font_size, field.font_weight);
                sink.set_text_color(BLACK);
                let lines = sink.split_text_to_width(&field.value, rect.width);
                // The stored y is a top coordinate; the sink wants the
                // first baseline.
                sink.draw_text_lines(&lines, rect.x, rect.y + font_size);
            } else if let Err(err) = sink.draw_image(&field.value, rect) {
                tracing::warn!(
                    field = %field.id,
                    error = %err,
                    "image payload failed; placing error marker"
                );
                sink.set_draw_color(PLACEHOLDER_RED);
                sink.stroke_rect(rect);
                sink.set_font(12.0, FontWeight::Normal);
                sink.set_text_color(BLACK);
                sink.draw_text_lines(
                    &[IMAGE_ERROR_LABEL.to_string()],
                    rect.x + 2.0,
                    rect.y + 12.0,
                );
                report.placeholders += 1;
            }
        }
    }

    Ok(report)
}

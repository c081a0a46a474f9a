//! Integration tests for the stencil export pipeline.
//!
//! These tests exercise the full path from an edited template to PDF
//! output. They verify:
//! - uploads record all pages or none
//! - export re-projects field geometry through the contain fit
//! - pages without backgrounds are skipped, not fatal
//! - failed image payloads degrade to placeholders
//! - the transport round trip (layout out, values out, both back in)
//! - PDF output is structurally valid

use base64::Engine as _;
use pretty_assertions::assert_eq;

use stencil::canvas::Rect;
use stencil::compose::{compose, ComposeReport, DocumentSink, Orientation, Rgb};
use stencil::editor::Editor;
use stencil::error::Error;
use stencil::model::{FieldKind, FontWeight, Template};
use stencil::pdf::PdfDocument;
use stencil::raster::{PageRasterizer, RenderedPage};

// ─── Helpers ────────────────────────────────────────────────────

/// Encode a solid-color PNG as a data URI, the shape backgrounds and image
/// payloads arrive in.
fn png_data_uri(width: u32, height: u32, rgba: [u8; 4]) -> String {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(
        encoder,
        img.as_raw(),
        width,
        height,
        image::ColorType::Rgba8,
    )
    .unwrap();
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&buf)
    )
}

struct FakeRasterizer {
    pages: Vec<(u32, u32)>,
}

impl PageRasterizer for FakeRasterizer {
    fn rasterize(&self, _pdf: &[u8], _scale: f64) -> Result<Vec<RenderedPage>, Error> {
        Ok(self
            .pages
            .iter()
            .map(|&(w, h)| RenderedPage {
                data_uri: png_data_uri(w, h, [240, 240, 240, 255]),
                width_px: w,
                height_px: h,
            })
            .collect())
    }
}

/// A template with one 1200x1600 background (2x the canvas, so the contain
/// fit is a clean 0.5 scale with no offsets).
fn template_with_background() -> Template {
    Template {
        background_pdfs: vec![png_data_uri(1200, 1600, [255, 255, 255, 255])],
        pdf_pages: Some(1),
        ..Template::default()
    }
}

fn text_field(id: &str, page: u32, value: &str, bounds: Rect) -> stencil::model::Field {
    let mut field = stencil::model::Field::new(bounds, FieldKind::Text, page, id.to_string());
    field.id = id.to_string();
    field.value = value.to_string();
    field
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 50, "PDF too small to be valid");
    assert!(bytes.starts_with(b"%PDF-1.7"), "missing PDF header");
    assert!(
        bytes.windows(5).any(|w| w == b"%%EOF"),
        "missing %%EOF marker"
    );
    assert!(bytes.windows(4).any(|w| w == b"xref"), "missing xref table");
    assert!(
        bytes.windows(7).any(|w| w == b"trailer"),
        "missing trailer"
    );
}

// ─── Recording sink ─────────────────────────────────────────────

/// Captures compositor output as a flat op list for behavioral assertions.
#[derive(Debug, Clone, PartialEq)]
enum Op {
    Page(f64, f64, Orientation),
    Image(Rect),
    Font(f64, FontWeight),
    TextLines(Vec<String>, f64, f64),
    StrokeRect(Rect),
}

#[derive(Default)]
struct RecordingSink {
    ops: Vec<Op>,
    /// Payload prefixes that fail to "decode".
    reject: Vec<String>,
}

impl DocumentSink for RecordingSink {
    fn add_page(&mut self, width: f64, height: f64, orientation: Orientation) {
        self.ops.push(Op::Page(width, height, orientation));
    }

    fn draw_image(&mut self, src: &str, rect: Rect) -> Result<(), String> {
        if self.reject.iter().any(|p| src.starts_with(p.as_str())) {
            return Err("decode failed".to_string());
        }
        self.ops.push(Op::Image(rect));
        Ok(())
    }

    fn set_font(&mut self, size: f64, weight: FontWeight) {
        self.ops.push(Op::Font(size, weight));
    }

    fn set_text_color(&mut self, _color: Rgb) {}

    fn set_draw_color(&mut self, _color: Rgb) {}

    fn split_text_to_width(&self, text: &str, _max_width: f64) -> Vec<String> {
        vec![text.to_string()]
    }

    fn draw_text_lines(&mut self, lines: &[String], x: f64, y: f64) {
        self.ops.push(Op::TextLines(lines.to_vec(), x, y));
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.ops.push(Op::StrokeRect(rect));
    }
}

// ─── Compositor behavior ────────────────────────────────────────

#[test]
fn test_export_requires_a_background() {
    let template = Template::default();
    let mut sink = RecordingSink::default();
    assert!(matches!(
        compose(&template, &mut sink),
        Err(Error::MissingBackgrounds)
    ));
}

#[test]
fn test_missing_page_background_is_skipped() {
    // Two pages declared, one background recorded: one output page, and the
    // page-2 field is dropped without error.
    let mut template = template_with_background();
    template.pdf_pages = Some(2);
    template
        .text_areas
        .push(text_field("a", 1, "on page one", Rect::new(0.0, 0.0, 100.0, 40.0)));
    template
        .text_areas
        .push(text_field("b", 2, "on page two", Rect::new(0.0, 0.0, 100.0, 40.0)));

    let mut sink = RecordingSink::default();
    let report = compose(&template, &mut sink).unwrap();
    assert_eq!(
        report,
        ComposeReport {
            pages: 1,
            placeholders: 0
        }
    );
    let texts: Vec<&Op> = sink
        .ops
        .iter()
        .filter(|op| matches!(op, Op::TextLines(..)))
        .collect();
    assert_eq!(texts.len(), 1);
    assert!(matches!(texts[0], Op::TextLines(lines, _, _) if lines[0] == "on page one"));
}

#[test]
fn test_dangling_page_reference_is_dropped() {
    let mut template = template_with_background();
    template
        .text_areas
        .push(text_field("ghost", 9, "never drawn", Rect::new(0.0, 0.0, 100.0, 40.0)));
    let mut sink = RecordingSink::default();
    compose(&template, &mut sink).unwrap();
    assert!(!sink.ops.iter().any(|op| matches!(op, Op::TextLines(..))));
}

#[test]
fn test_text_geometry_maps_through_contain_fit() {
    // Background 1200x1600 -> scale 0.5, zero offsets. A field at canvas
    // (30, 40) size 90x22 lands at page (60, 80) size 180x44; a 16px font
    // becomes 32, and the first baseline sits at top + font size.
    let mut template = template_with_background();
    template
        .text_areas
        .push(text_field("t", 1, "hello", Rect::new(30.0, 40.0, 90.0, 22.0)));

    let mut sink = RecordingSink::default();
    compose(&template, &mut sink).unwrap();

    assert_eq!(sink.ops[0], Op::Page(1200.0, 1600.0, Orientation::Portrait));
    assert_eq!(
        sink.ops[1],
        Op::Image(Rect::new(0.0, 0.0, 1200.0, 1600.0)),
        "background is full-bleed"
    );
    assert_eq!(sink.ops[2], Op::Font(32.0, FontWeight::Normal));
    assert_eq!(
        sink.ops[3],
        Op::TextLines(vec!["hello".to_string()], 60.0, 80.0 + 32.0)
    );
}

#[test]
fn test_offset_background_subtracts_centering() {
    // A 1600x1200 landscape background: scale = 600/1600 = 0.375, centered
    // vertically with offset_y = 175. A field at canvas y=175 maps to page
    // y=0.
    let mut template = Template {
        background_pdfs: vec![png_data_uri(1600, 1200, [255, 255, 255, 255])],
        pdf_pages: Some(1),
        ..Template::default()
    };
    template
        .text_areas
        .push(text_field("t", 1, "x", Rect::new(0.0, 175.0, 37.5, 37.5)));

    let mut sink = RecordingSink::default();
    compose(&template, &mut sink).unwrap();

    assert_eq!(sink.ops[0], Op::Page(1600.0, 1200.0, Orientation::Landscape));
    match &sink.ops[3] {
        Op::TextLines(_, x, y) => {
            assert!(x.abs() < 1e-9);
            let font_size = 16.0 / 0.375;
            assert!((y - font_size).abs() < 1e-9);
        }
        other => panic!("expected text, got {other:?}"),
    }
}

#[test]
fn test_empty_values_draw_nothing() {
    let mut template = template_with_background();
    template
        .text_areas
        .push(text_field("t", 1, "", Rect::new(0.0, 0.0, 100.0, 40.0)));
    let mut image = stencil::model::Field::new(
        Rect::new(10.0, 10.0, 50.0, 50.0),
        FieldKind::Image,
        1,
        "img".to_string(),
    );
    image.value = String::new();
    template.text_areas.push(image);

    let mut sink = RecordingSink::default();
    compose(&template, &mut sink).unwrap();
    // Only the page and its background.
    assert_eq!(sink.ops.len(), 2);
}

#[test]
fn test_image_stretches_to_mapped_rect() {
    let mut template = template_with_background();
    let mut image = stencil::model::Field::new(
        Rect::new(10.0, 20.0, 50.0, 40.0),
        FieldKind::Image,
        1,
        "img".to_string(),
    );
    image.value = png_data_uri(300, 10, [1, 2, 3, 255]); // aspect ignored
    template.text_areas.push(image);

    let mut sink = RecordingSink::default();
    compose(&template, &mut sink).unwrap();
    assert_eq!(sink.ops[2], Op::Image(Rect::new(20.0, 40.0, 100.0, 80.0)));
}

#[test]
fn test_failed_image_becomes_placeholder() {
    let mut template = template_with_background();
    let mut image = stencil::model::Field::new(
        Rect::new(10.0, 20.0, 50.0, 40.0),
        FieldKind::Image,
        1,
        "img".to_string(),
    );
    image.value = "data:image/png;base64,broken".to_string();
    template.text_areas.push(image);

    let mut sink = RecordingSink {
        reject: vec!["data:image/png;base64,broken".to_string()],
        ..Default::default()
    };
    let report = compose(&template, &mut sink).unwrap();
    assert_eq!(report.placeholders, 1);

    let rect = Rect::new(20.0, 40.0, 100.0, 80.0);
    assert!(sink.ops.contains(&Op::StrokeRect(rect)));
    assert!(sink.ops.iter().any(|op| matches!(
        op,
        Op::TextLines(lines, x, y)
            if lines[0] == "Image Error" && *x == rect.x + 2.0 && *y == rect.y + 12.0
    )));
}

// ─── Full pipeline ──────────────────────────────────────────────

#[test]
fn test_upload_then_export_produces_valid_pdf() {
    let mut editor = Editor::new();
    let rasterizer = FakeRasterizer {
        pages: vec![(1200, 1600), (1600, 1200)],
    };
    editor.upload_background(b"%PDF-1.4 fake", &rasterizer).unwrap();

    editor.arm_creation(FieldKind::Text);
    editor.pointer_down(stencil::canvas::Point::new(50.0, 50.0));
    let id = editor
        .pointer_up(stencil::canvas::Point::new(250.0, 120.0))
        .unwrap();
    assert!(editor.update_value(&id, "Quarterly summary for the substation project").is_none());

    let bytes = stencil::export_pdf(editor.template()).unwrap();
    assert_valid_pdf(&bytes);
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/Count 2"));
}

#[test]
fn test_fill_and_export_headless() {
    let mut template = template_with_background();
    template
        .text_areas
        .push(text_field("title", 1, "", Rect::new(30.0, 40.0, 200.0, 30.0)));
    let template_json = serde_json::to_string(&template).unwrap();
    let values_json = r#"{"title": "Commissioning Report"}"#;

    let bytes = stencil::fill_and_export(&template_json, Some(values_json)).unwrap();
    assert_valid_pdf(&bytes);
}

#[test]
fn test_fill_and_export_settles_auto_resize() {
    let mut template = template_with_background();
    let mut image = stencil::model::Field::new(
        Rect::new(0.0, 0.0, 100.0, 100.0),
        FieldKind::Image,
        1,
        "photo".to_string(),
    );
    image.image_fit = stencil::model::ImageFit::AutoResize;
    template.text_areas.push(image);
    let template_json = serde_json::to_string(&template).unwrap();

    let landscape = png_data_uri(200, 100, [9, 9, 9, 255]);
    let values = serde_json::json!({ "photo": landscape });

    let bytes = stencil::fill_and_export(&template_json, Some(&values.to_string())).unwrap();
    assert_valid_pdf(&bytes);
}

// ─── Transport round trips ──────────────────────────────────────

#[test]
fn test_template_export_excludes_values_and_round_trips() {
    let mut template = template_with_background();
    template
        .text_areas
        .push(text_field("a", 1, "filled in", Rect::new(0.0, 0.0, 100.0, 40.0)));

    let layout_json = template.export_layout_json();
    assert!(!layout_json.contains("\"value\""));

    // Reimport and re-resolve against the same record: values come back.
    let mut reimported = Template::from_json(&layout_json).unwrap();
    let record = match serde_json::json!({"a": "filled in"}) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    };
    reimported.apply_record(&record);
    assert_eq!(reimported.text_areas[0].value, "filled in");
}

#[test]
fn test_template_import_failure_preserves_state() {
    let mut editor = Editor::new();
    editor.add_field(Rect::new(0.0, 0.0, 100.0, 40.0), FieldKind::Text, 1);
    assert!(editor.import_template_json("{ not json").is_err());
    assert_eq!(editor.template().text_areas.len(), 1);
}

#[test]
fn test_values_round_trip_through_files() {
    let mut template = template_with_background();
    template
        .text_areas
        .push(text_field("city", 1, "Bandung", Rect::new(0.0, 0.0, 100.0, 40.0)));
    template
        .text_areas
        .push(text_field("leader", 1, "A. Wijaya", Rect::new(0.0, 50.0, 100.0, 40.0)));

    let values_json = template.export_values_json();

    let mut fresh = Template::from_json(&template.export_layout_json()).unwrap();
    fresh.apply_values_json(&values_json).unwrap();
    assert_eq!(fresh.text_areas[0].value, "Bandung");
    assert_eq!(fresh.text_areas[1].value, "A. Wijaya");
}

// ─── Real writer end-to-end ─────────────────────────────────────

#[test]
fn test_compose_into_real_writer_counts_pages() {
    let mut template = template_with_background();
    template.pdf_pages = Some(3); // two dangling pages
    template
        .text_areas
        .push(text_field("a", 1, "present", Rect::new(10.0, 10.0, 200.0, 40.0)));

    let mut doc = PdfDocument::new();
    let report = compose(&template, &mut doc).unwrap();
    assert_eq!(report.pages, 1);
    assert_eq!(doc.page_count(), 1);
    assert_valid_pdf(&doc.save());
}

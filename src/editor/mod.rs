//! # Editing Operations
//!
//! [`Editor`] owns the session's [`Template`] and applies every mutation to
//! it: creating, moving, resizing, renaming, restyling and deleting fields,
//! plus background uploads and value updates. The pointer-driven state
//! machine that turns raw pointer events into these mutations lives in
//! [`pointer`].
//!
//! Geometry invariants enforced here are *interactive* invariants: moves
//! clamp to the canvas, interactive resizes keep both dimensions at 20px or
//! more. Programmatic loads bypass them on purpose: an imported template
//! carries whatever geometry it carries.

pub mod pointer;

pub use pointer::{Interaction, ResizeHandle};

use crate::canvas::{Point, Rect, CANVAS_HEIGHT, CANVAS_WIDTH, RASTER_SCALE};
use crate::error::Error;
use crate::image_data;
use crate::model::{Field, FieldKind, FontWeight, ImageFit, Template};
use crate::project::VARIABLE_CATALOG;
use crate::raster::{PageRasterizer, PDF_MAGIC};
use crate::resolve::{resolve, ExternalRecord};

/// Minimum width/height a field may reach through interactive editing, in
/// canvas pixels.
pub const MIN_FIELD_EXTENT: f64 = 20.0;

/// The owned editing session: one template, one selection, one interaction.
#[derive(Debug, Default)]
pub struct Editor {
    template: Template,
    selection: Option<String>,
    interaction: Interaction,
    /// One-shot create mode; holds the kind the next drag will create.
    armed: Option<FieldKind>,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(template: Template) -> Self {
        Self {
            template,
            ..Self::default()
        }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn into_template(self) -> Template {
        self.template
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    pub fn selected_field(&self) -> Option<&Field> {
        self.selection
            .as_deref()
            .and_then(|id| self.template.field(id))
    }

    /// Replace the whole template from a transport file. Only a successful
    /// parse replaces state; selection and any in-flight interaction are
    /// reset with it.
    pub fn import_template_json(&mut self, json: &str) -> Result<(), Error> {
        let imported = Template::from_json(json)?;
        self.template = imported;
        self.selection = None;
        self.interaction = Interaction::Idle;
        self.armed = None;
        Ok(())
    }

    // ── Field mutations ─────────────────────────────────────────

    /// Add a field with default style on the given page. Non-variable kinds
    /// get a generated `variable_<n>` label; variable fields start bound to
    /// the catalog's default key.
    pub fn add_field(&mut self, bounds: Rect, kind: FieldKind, page: u32) -> &Field {
        let name = match kind {
            FieldKind::Variable => VARIABLE_CATALOG[0].to_string(),
            _ => format!("variable_{}", self.template.text_areas.len() + 1),
        };
        let field = Field::new(bounds, kind, page, name);
        self.template.text_areas.push(field);
        self.template
            .text_areas
            .last()
            .expect("field was just pushed")
    }

    /// Translate a field, clamped so it stays fully inside the canvas.
    pub fn move_field(&mut self, id: &str, dx: f64, dy: f64) {
        if let Some(field) = self.template.field_mut(id) {
            let x = field.x + dx;
            let y = field.y + dy;
            field.x = x.min(CANVAS_WIDTH - field.width).max(0.0);
            field.y = y.min(CANVAS_HEIGHT - field.height).max(0.0);
        }
    }

    /// Place a field's origin at an absolute canvas position, clamped to
    /// the canvas minus the field's own size.
    pub(crate) fn place_field(&mut self, id: &str, x: f64, y: f64) {
        if let Some(field) = self.template.field_mut(id) {
            field.x = x.min(CANVAS_WIDTH - field.width).max(0.0);
            field.y = y.min(CANVAS_HEIGHT - field.height).max(0.0);
        }
    }

    /// Resize a field by dragging one of its handles to `pointer`.
    ///
    /// Each edge named by the handle chases the pointer; compound handles
    /// affect both their edges. The east/south edges clamp the dimension at
    /// the minimum. The north/west edges move only while the resulting
    /// dimension stays above the minimum, so shrinking from the top or left
    /// stops the edge rather than dragging the origin past it.
    pub fn resize_field(&mut self, id: &str, handle: ResizeHandle, pointer: Point) {
        let Some(field) = self.template.field_mut(id) else {
            return;
        };
        if handle.stretches_east() {
            field.width = (pointer.x - field.x).max(MIN_FIELD_EXTENT);
        }
        if handle.stretches_south() {
            field.height = (pointer.y - field.y).max(MIN_FIELD_EXTENT);
        }
        if handle.stretches_west() {
            let width = field.x + field.width - pointer.x;
            if width > MIN_FIELD_EXTENT {
                field.width = width;
                field.x = pointer.x;
            }
        }
        if handle.stretches_north() {
            let height = field.y + field.height - pointer.y;
            if height > MIN_FIELD_EXTENT {
                field.height = height;
                field.y = pointer.y;
            }
        }
    }

    pub fn rename_field(&mut self, id: &str, name: &str) {
        if let Some(field) = self.template.field_mut(id) {
            field.variable_name = name.to_string();
        }
    }

    /// Rename a field's binding and re-resolve its value against the
    /// currently selected record, if any.
    pub fn rebind_field(&mut self, id: &str, name: &str, record: Option<&ExternalRecord>) {
        if let Some(field) = self.template.field_mut(id) {
            field.variable_name = name.to_string();
            if let Some(value) = resolve(field, record) {
                field.value = value;
            }
        }
    }

    /// Remove a field. Deleting the selected field clears the selection.
    pub fn delete_field(&mut self, id: &str) {
        self.template.text_areas.retain(|f| f.id != id);
        if self.selection.as_deref() == Some(id) {
            self.selection = None;
        }
    }

    pub fn set_font_size(&mut self, id: &str, size: f64) {
        if let Some(field) = self.template.field_mut(id) {
            field.font_size = size;
        }
    }

    pub fn set_font_weight(&mut self, id: &str, weight: FontWeight) {
        if let Some(field) = self.template.field_mut(id) {
            field.font_weight = weight;
        }
    }

    pub fn set_image_fit(&mut self, id: &str, fit: ImageFit) {
        if let Some(field) = self.template.field_mut(id) {
            field.image_fit = fit;
        }
    }

    // ── Values and auto-resize ──────────────────────────────────

    /// Set a field's raw value.
    ///
    /// For an auto-resize image field a [`SizeProbe`] comes back; running
    /// it later (the shell decides when) discovers the payload's natural
    /// dimensions, and [`Editor::apply_natural_size`] merges the result
    /// into whatever the model looks like at that point.
    #[must_use = "auto-resize image fields return a probe that still has to run"]
    pub fn update_value(&mut self, id: &str, value: &str) -> Option<SizeProbe> {
        let field = self.template.field_mut(id)?;
        field.value = value.to_string();
        if field.kind == FieldKind::Image
            && field.image_fit == ImageFit::AutoResize
            && !field.value.is_empty()
        {
            return Some(SizeProbe {
                field_id: field.id.clone(),
                src: field.value.clone(),
            });
        }
        None
    }

    /// Merge a completed natural-size probe into the current model.
    ///
    /// Looks the field up by id *now*; the field may have been edited or
    /// deleted since the probe started; a vanished id is a no-op, and the
    /// geometry write is last-write-wins.
    ///
    /// Landscape payloads keep the field's width and recompute height;
    /// portrait and square payloads keep height and recompute width.
    pub fn apply_natural_size(&mut self, id: &str, natural_width: f64, natural_height: f64) {
        if natural_width <= 0.0 || natural_height <= 0.0 {
            return;
        }
        if let Some(field) = self.template.field_mut(id) {
            let aspect = natural_width / natural_height;
            if aspect > 1.0 {
                field.height = field.width / aspect;
            } else {
                field.width = field.height * aspect;
            }
        }
    }

    /// Run a probe to completion synchronously and merge its result.
    /// Probe failures are silent; auto-resize is best-effort.
    pub fn complete_probe(&mut self, probe: &SizeProbe) {
        if let Some((w, h)) = probe.natural_size() {
            self.apply_natural_size(&probe.field_id, f64::from(w), f64::from(h));
        }
    }

    /// Sweep every auto-resize image field and apply its natural size.
    /// Used by headless fills, where there is no event loop to defer to.
    pub fn refresh_auto_resize(&mut self) {
        let probes: Vec<SizeProbe> = self
            .template
            .text_areas
            .iter()
            .filter(|f| {
                f.kind == FieldKind::Image
                    && f.image_fit == ImageFit::AutoResize
                    && !f.value.is_empty()
            })
            .map(|f| SizeProbe {
                field_id: f.id.clone(),
                src: f.value.clone(),
            })
            .collect();
        for probe in &probes {
            self.complete_probe(probe);
        }
    }

    // ── Backgrounds ─────────────────────────────────────────────

    /// Replace the page backgrounds from an uploaded PDF.
    ///
    /// Validates the upload is actually a PDF before anything else; a
    /// rasterizer failure leaves prior backgrounds untouched (all pages or
    /// none). On success the cursor resets to page 1. Returns the page
    /// count.
    pub fn upload_background(
        &mut self,
        pdf: &[u8],
        rasterizer: &dyn PageRasterizer,
    ) -> Result<u32, Error> {
        if !pdf.starts_with(PDF_MAGIC) {
            return Err(Error::NotAPdf);
        }
        let pages = rasterizer.rasterize(pdf, RASTER_SCALE)?;
        let count = pages.len() as u32;
        self.template.background_pdfs = pages.into_iter().map(|p| p.data_uri).collect();
        self.template.pdf_pages = Some(count);
        self.template.current_page = Some(1);
        Ok(count)
    }
}

/// A deferred natural-size lookup for one auto-resize image field.
///
/// Keyed by field id so completion can re-find (or fail to find) the field
/// in current state. There is no cancellation: a probe whose field is gone
/// simply merges into nothing.
#[derive(Debug, Clone)]
pub struct SizeProbe {
    pub field_id: String,
    pub src: String,
}

impl SizeProbe {
    /// The payload's intrinsic dimensions. `None` on any decode failure;
    /// the enrichment is best-effort and never raises.
    pub fn natural_size(&self) -> Option<(u32, u32)> {
        image_data::probe_dimensions(&self.src).ok()
    }
}

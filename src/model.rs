//! # Template Model
//!
//! The in-memory representation of an editable template: a named collection
//! of positioned fields plus the rendered page backgrounds they sit on.
//! This is the single owned value every editing operation mutates; there is
//! no ambient state anywhere in the engine.
//!
//! The serde shape doubles as the file transport format, so the same struct
//! that drives the editor round-trips through `.json` template files. Two
//! transport rules matter:
//!
//! - template export captures **layout only**: field values are stripped
//!   (an exported field object carries no `value` key at all);
//! - filled values travel separately as a flat `variableName -> value` map.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::canvas::Rect;
use crate::error::Error;

/// Font size assigned to freshly created fields, in canvas pixels.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// What a field holds and how its content is sourced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free-form text typed by the operator.
    Text,
    /// A date, typed by the operator. No formatting engine is applied.
    Date,
    /// An image payload (data URI).
    Image,
    /// A value bound to a named key of the external project record.
    Variable,
}

impl FieldKind {
    /// Text, date and variable fields all render as text at export time.
    pub fn is_textual(self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::Date | FieldKind::Variable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// How an image field presents its payload in the editor preview.
///
/// Preview-only: the export compositor always stretches the image to the
/// field rectangle regardless of this setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageFit {
    /// Scale uniformly to fit inside the field, centered.
    #[default]
    Contain,
    /// Scale uniformly to cover the field, cropping overflow.
    Cover,
    /// Centered contain over a blurred copy of the image.
    BlurBg,
    /// The field box itself adapts to the image's aspect ratio.
    AutoResize,
}

/// A positioned region on one page of the template.
///
/// Geometry is in canvas space. `page` is a weak 1-based reference: a field
/// whose page is out of range is simply not drawn, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Opaque unique id, stable for the field's lifetime. Fresh fields get
    /// a UUIDv4; imported ids of any shape are accepted as-is.
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// The bound record key for variable fields; a free-form label used as
    /// a fallback display/grouping name for every other kind.
    pub variable_name: String,
    /// Current resolved content: text for textual kinds, a data URI for
    /// images. Transient; stripped from template export.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub page: u32,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default)]
    pub image_fit: ImageFit,
}

fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}

impl Field {
    /// Create a field with a fresh id and default style.
    pub fn new(bounds: Rect, kind: FieldKind, page: u32, variable_name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            variable_name,
            value: String::new(),
            kind,
            page,
            font_size: DEFAULT_FONT_SIZE,
            font_weight: FontWeight::Normal,
            image_fit: ImageFit::Contain,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn set_bounds(&mut self, r: Rect) {
        self.x = r.x;
        self.y = r.y;
        self.width = r.width;
        self.height = r.height;
    }
}

/// The full editable unit: name, fields, page backgrounds, page cursor.
///
/// Created once per session (default: empty, one implicit page), mutated by
/// every editing operation, and replaced wholesale only by a successful
/// template import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub name: String,
    pub text_areas: Vec<Field>,
    /// Rendered page bitmaps as data URIs, in page order. All pages present
    /// or none; a partial set is never recorded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub background_pdfs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            name: "Untitled Template".to_string(),
            text_areas: Vec::new(),
            background_pdfs: Vec::new(),
            pdf_pages: None,
            current_page: Some(1),
        }
    }
}

impl Template {
    /// Number of pages, at least 1 (a fresh template has one implicit page).
    pub fn page_count(&self) -> u32 {
        self.pdf_pages.unwrap_or(1).max(1)
    }

    /// The 1-based page cursor, clamped to `[1, page_count]`.
    pub fn current_page(&self) -> u32 {
        self.current_page.unwrap_or(1).clamp(1, self.page_count())
    }

    pub fn go_to_page(&mut self, page: u32) {
        self.current_page = Some(page.clamp(1, self.page_count()));
    }

    /// The rendered background for a 1-based page, if one was recorded.
    pub fn background(&self, page: u32) -> Option<&str> {
        let index = (page as usize).checked_sub(1)?;
        self.background_pdfs.get(index).map(String::as_str)
    }

    pub fn fields_on_page(&self, page: u32) -> impl Iterator<Item = &Field> {
        self.text_areas.iter().filter(move |f| f.page == page)
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.text_areas.iter().find(|f| f.id == id)
    }

    pub fn field_mut(&mut self, id: &str) -> Option<&mut Field> {
        self.text_areas.iter_mut().find(|f| f.id == id)
    }

    // ── Transport ───────────────────────────────────────────────

    /// Serialize the template for file export, stripping every field value.
    /// The output carries layout only; exported field objects have no
    /// `value` key.
    pub fn export_layout_json(&self) -> String {
        let mut layout = self.clone();
        for field in &mut layout.text_areas {
            field.value.clear();
        }
        serde_json::to_string_pretty(&layout).expect("template model always serializes")
    }

    /// Parse a template transport file. Callers replace their template only
    /// on `Ok`; a parse failure must leave prior state untouched.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(Error::template_parse)
    }

    /// Serialize the filled values as a flat `variableName -> value` map.
    /// Duplicate names collapse; the last field with a name wins.
    pub fn export_values_json(&self) -> String {
        let mut values = serde_json::Map::new();
        for field in &self.text_areas {
            values.insert(
                field.variable_name.clone(),
                serde_json::Value::String(field.value.clone()),
            );
        }
        serde_json::to_string_pretty(&values).expect("string map always serializes")
    }

    /// Reconcile an imported values map against the current field list by
    /// name: a field's value is replaced only when the map carries its
    /// name, and kept otherwise.
    pub fn apply_values(&mut self, values: &serde_json::Map<String, serde_json::Value>) {
        for field in &mut self.text_areas {
            if let Some(v) = values.get(&field.variable_name) {
                field.value = match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
            }
        }
    }

    /// Parse and apply a filled-values file. On a parse failure the field
    /// values are left exactly as they were.
    pub fn apply_values_json(&mut self, json: &str) -> Result<(), Error> {
        let values: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(json).map_err(Error::values_parse)?;
        self.apply_values(&values);
        Ok(())
    }
}

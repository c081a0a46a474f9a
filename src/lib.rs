//! # Stencil
//!
//! An overlay-native PDF templating engine.
//!
//! Most PDF generators flow content into pages and let layout decide where
//! things land. Stencil does the opposite: an operator positions fields
//! **onto** a fixed editing canvas over a rendered PDF background, and the
//! engine's job is to carry those positions across reference frames without
//! drift: from the 600×800 canvas, through the background's native raster
//! resolution, into the output page's physical space.
//!
//! ## Architecture
//!
//! ```text
//! pointer events          template / values JSON
//!       ↓                          ↓
//!   [editor]  — hit-testing, drag/resize/create state machine
//!       ↓
//!   [model]   — the one owned Template: fields, backgrounds, cursor
//!       ↓                          ↓
//!   [canvas]  — ContainFit: one formula for preview and export mapping
//!       ↓
//!   [compose] — walk pages, re-project fields, emit draw instructions
//!       ↓
//!   [pdf]     — serialize to PDF bytes
//! ```
//!
//! Bound-variable fields resolve through [`resolve`] against a record from
//! the [`project`] collaborator; background rasterization enters through
//! the [`raster`] trait.

pub mod canvas;
pub mod compose;
pub mod editor;
pub mod error;
pub mod font;
pub mod image_data;
pub mod model;
pub mod pdf;
pub mod project;
pub mod raster;
pub mod resolve;
pub mod text;

pub use error::Error;

use editor::Editor;
use model::Template;
use pdf::PdfDocument;

/// Re-compose a filled template into PDF bytes.
///
/// This is the primary export entry point. Requires at least one recorded
/// page background; individual page or field failures degrade per the
/// compositor's rules instead of failing the document.
pub fn export_pdf(template: &Template) -> Result<Vec<u8>, Error> {
    let mut doc = PdfDocument::new();
    compose::compose(template, &mut doc)?;
    Ok(doc.save())
}

/// Headless fill: parse a template transport file, optionally reconcile a
/// filled-values file against it, settle auto-resize geometry, and export.
pub fn fill_and_export(template_json: &str, values_json: Option<&str>) -> Result<Vec<u8>, Error> {
    let mut template = Template::from_json(template_json)?;
    if let Some(values) = values_json {
        template.apply_values_json(values)?;
    }
    let mut editor = Editor::with_template(template);
    editor.refresh_auto_resize();
    export_pdf(editor.template())
}

//! Hit-testing and the pointer manipulation state machine.
//!
//! Pointer-down/move/up sequences in canvas-local coordinates drive one of
//! four interactions: creating a field by dragging out its rectangle,
//! dragging an existing field, resizing via an explicit handle, or
//! (de)selecting. The machine is synchronous and pure; the host shell owns
//! the actual event listeners (including the transient window-level
//! move/up listeners that keep a drag alive when the pointer leaves the
//! editing surface) and feeds events in, already converted through
//! [`DisplayScale`](crate::canvas::DisplayScale).
//!
//! There is no cancellation gesture; an interaction only ends on
//! pointer-up.

use crate::canvas::{Point, Rect};
use crate::model::Field;

use super::Editor;

/// Side length of a create-drag below which no field is committed, in
/// canvas pixels. Non-strict: a drag of exactly this size is discarded.
pub const CREATE_THRESHOLD: f64 = 10.0;

/// The active pointer interaction.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// A create-drag in progress, anchored at its start point.
    Creating { start: Point },
    /// An existing field follows the pointer. `grab` is the offset of the
    /// grab point from the field origin, so the field doesn't jump to the
    /// cursor.
    Dragging { id: String, grab: Point },
    /// A handle of the selected field chases the pointer.
    Resizing { id: String, handle: ResizeHandle },
}

/// The eight resize handles. Compound corners apply both their edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl ResizeHandle {
    pub fn stretches_north(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    pub fn stretches_south(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    pub fn stretches_east(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    pub fn stretches_west(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }
}

impl Editor {
    /// Arm one-shot create mode: the next pointer drag creates a field of
    /// `kind` instead of manipulating existing ones.
    pub fn arm_creation(&mut self, kind: crate::model::FieldKind) {
        self.armed = Some(kind);
    }

    pub fn armed_kind(&self) -> Option<crate::model::FieldKind> {
        self.armed
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// The field under a point, if any. First match in insertion order wins
    /// on overlap; there is no z-order beyond that.
    pub fn field_at(&self, p: Point) -> Option<&Field> {
        self.template.text_areas.iter().find(|f| f.bounds().contains(p))
    }

    /// Pointer pressed on the canvas.
    pub fn pointer_down(&mut self, p: Point) {
        if matches!(self.interaction, Interaction::Resizing { .. }) {
            return;
        }

        let hit = self.field_at(p).map(|f| (f.id.clone(), f.bounds()));
        if let (Some((id, bounds)), None) = (&hit, &self.armed) {
            self.interaction = Interaction::Dragging {
                id: id.clone(),
                grab: Point::new(p.x - bounds.x, p.y - bounds.y),
            };
            self.selection = Some(id.clone());
            return;
        }

        if self.armed.is_some() {
            self.interaction = Interaction::Creating { start: p };
        } else {
            self.selection = None;
        }
    }

    /// Pointer moved. Only drags and resizes react; a create-drag commits
    /// nothing until release.
    pub fn pointer_move(&mut self, p: Point) {
        match self.interaction.clone() {
            Interaction::Dragging { id, grab } => {
                self.place_field(&id, p.x - grab.x, p.y - grab.y);
            }
            Interaction::Resizing { id, handle } => {
                self.resize_field(&id, handle, p);
            }
            Interaction::Idle | Interaction::Creating { .. } => {}
        }
    }

    /// Pointer released. Returns the id of a newly created field, if the
    /// release committed one.
    pub fn pointer_up(&mut self, p: Point) -> Option<String> {
        match std::mem::take(&mut self.interaction) {
            Interaction::Creating { start } => {
                // Create mode is one-shot whether or not a field commits.
                let kind = self.armed.take()?;
                let bounds = Rect::from_corners(start, p);
                if bounds.width > CREATE_THRESHOLD && bounds.height > CREATE_THRESHOLD {
                    let page = self.template.current_page();
                    let id = self.add_field(bounds, kind, page).id.clone();
                    return Some(id);
                }
                None
            }
            Interaction::Dragging { .. } | Interaction::Resizing { .. } | Interaction::Idle => {
                // Drag and resize both end keeping the selection; ending a
                // resize also drops the active handle with the state.
                None
            }
        }
    }

    /// Begin resizing the selected field via `handle`. Entered only from an
    /// explicit handle press, never from plain canvas hits.
    pub fn begin_resize(&mut self, handle: ResizeHandle) {
        if let Some(id) = self.selection.clone() {
            self.interaction = Interaction::Resizing { id, handle };
        }
    }
}

//! # Coordinate Spaces
//!
//! The editor deals in three independent reference frames:
//!
//! 1. **Canvas space** — the fixed 600×800 logical surface every field's
//!    geometry lives in. This is the single source of truth for layout.
//! 2. **Page raster space** — the pixel grid of a rendered background page,
//!    whose resolution is whatever the rasterizer produced (typically the
//!    source page at 2×).
//! 3. **Output page space** — the physical page the export compositor
//!    writes to, which shares the raster's dimensions.
//!
//! Backgrounds are always painted into the canvas with a centered "contain"
//! fit. That rule is the bridge between frames 1 and 2/3, and it is hoisted
//! here into [`ContainFit`] so the same numbers drive both the on-screen
//! preview and the export mapping. Keeping one formula is what makes the
//! round trip drift-free.

/// Logical width of the edit canvas, in canvas pixels.
pub const CANVAS_WIDTH: f64 = 600.0;

/// Logical height of the edit canvas, in canvas pixels.
pub const CANVAS_HEIGHT: f64 = 800.0;

/// Upscaling factor applied when rasterizing background pages.
pub const RASTER_SCALE: f64 = 2.0;

/// A point in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle. Used for both canvas-space field geometry and
/// output-page placement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The rectangle spanned by two arbitrary corner points.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Bounds-inclusive containment, matching the editor's hit-testing.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// Forward mapping: canvas-space geometry to fractional offsets of the
/// canvas, for positioning overlay chrome with percentage coordinates.
///
/// No clamping. Values outside `[0, 1]` can only appear if an upstream
/// invariant was violated.
pub fn overlay_fraction(rect: Rect) -> (f64, f64, f64, f64) {
    (
        rect.x / CANVAS_WIDTH,
        rect.y / CANVAS_HEIGHT,
        rect.width / CANVAS_WIDTH,
        rect.height / CANVAS_HEIGHT,
    )
}

/// The centered "contain" fit of a page raster into the canvas.
///
/// `scale` is the uniform factor that shrinks (or grows) the page to fit
/// entirely inside 600×800; the offsets center the result. The inverse
/// direction divides back out, so `to_page` followed by `from_page` is the
/// identity up to floating-point noise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainFit {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ContainFit {
    /// Compute the fit for a page of `page_width` × `page_height` raster
    /// pixels. Returns `None` for degenerate dimensions; callers treat that
    /// as a page-level warning, never a hard failure.
    pub fn new(page_width: f64, page_height: f64) -> Option<Self> {
        if page_width <= 0.0 || page_height <= 0.0 {
            return None;
        }
        let scale = (CANVAS_WIDTH / page_width).min(CANVAS_HEIGHT / page_height);
        Some(Self {
            scale,
            offset_x: (CANVAS_WIDTH - page_width * scale) / 2.0,
            offset_y: (CANVAS_HEIGHT - page_height * scale) / 2.0,
        })
    }

    /// Map canvas-space geometry into page space.
    pub fn to_page(&self, r: Rect) -> Rect {
        Rect {
            x: (r.x - self.offset_x) / self.scale,
            y: (r.y - self.offset_y) / self.scale,
            width: r.width / self.scale,
            height: r.height / self.scale,
        }
    }

    /// Map page-space geometry back into canvas space.
    pub fn from_page(&self, r: Rect) -> Rect {
        Rect {
            x: r.x * self.scale + self.offset_x,
            y: r.y * self.scale + self.offset_y,
            width: r.width * self.scale,
            height: r.height * self.scale,
        }
    }

    /// Scale a canvas-space length (font sizes, mostly) into page space.
    pub fn scale_len(&self, v: f64) -> f64 {
        v / self.scale
    }
}

/// Conversion from viewport coordinates to canvas coordinates.
///
/// The canvas element may be displayed at a CSS size that differs from its
/// 600×800 logical size, so pointer events arrive pre-scaled and have to be
/// mapped back before hit-testing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayScale {
    pub scale_x: f64,
    pub scale_y: f64,
}

impl DisplayScale {
    /// Build from the canvas's current display size.
    pub fn new(display_width: f64, display_height: f64) -> Self {
        Self {
            scale_x: CANVAS_WIDTH / display_width,
            scale_y: CANVAS_HEIGHT / display_height,
        }
    }

    /// A canvas displayed at its logical size.
    pub fn identity() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Map a viewport-relative point into canvas space.
    pub fn to_canvas(&self, viewport: Point) -> Point {
        Point {
            x: viewport.x * self.scale_x,
            y: viewport.y * self.scale_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contain_fit_portrait_page() {
        // A 1200x1600 raster is exactly 2x the canvas: scale 0.5, no offsets.
        let fit = ContainFit::new(1200.0, 1600.0).unwrap();
        assert!((fit.scale - 0.5).abs() < 1e-12);
        assert!(fit.offset_x.abs() < 1e-12);
        assert!(fit.offset_y.abs() < 1e-12);
    }

    #[test]
    fn test_contain_fit_landscape_page_is_centered_vertically() {
        let fit = ContainFit::new(1600.0, 1200.0).unwrap();
        // Width-bound: scale = 600/1600.
        assert!((fit.scale - 0.375).abs() < 1e-12);
        assert!(fit.offset_x.abs() < 1e-12);
        // 800 - 1200*0.375 = 350, centered -> 175.
        assert!((fit.offset_y - 175.0).abs() < 1e-12);
    }

    #[test]
    fn test_round_trip_recovers_geometry() {
        let fit = ContainFit::new(1654.0, 2339.0).unwrap();
        let original = Rect::new(37.5, 412.25, 120.0, 48.5);
        let there = fit.to_page(original);
        let back = fit.from_page(there);
        assert!((back.x - original.x).abs() < 1e-9);
        assert!((back.y - original.y).abs() < 1e-9);
        assert!((back.width - original.width).abs() < 1e-9);
        assert!((back.height - original.height).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_page_dimensions() {
        assert!(ContainFit::new(0.0, 800.0).is_none());
        assert!(ContainFit::new(600.0, 0.0).is_none());
        assert!(ContainFit::new(-10.0, 800.0).is_none());
    }

    #[test]
    fn test_overlay_fraction() {
        let (fx, fy, fw, fh) = overlay_fraction(Rect::new(150.0, 200.0, 300.0, 400.0));
        assert!((fx - 0.25).abs() < 1e-12);
        assert!((fy - 0.25).abs() < 1e-12);
        assert!((fw - 0.5).abs() < 1e-12);
        assert!((fh - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_display_scale_maps_pointer_events() {
        // Canvas displayed at half size: viewport coords double on the way in.
        let scale = DisplayScale::new(300.0, 400.0);
        let p = scale.to_canvas(Point::new(100.0, 50.0));
        assert!((p.x - 200.0).abs() < 1e-12);
        assert!((p.y - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_rect_from_corners_normalizes() {
        let r = Rect::from_corners(Point::new(110.0, 220.0), Point::new(60.0, 180.0));
        assert_eq!(r, Rect::new(60.0, 180.0, 50.0, 40.0));
    }
}

//! Coordinate mapping between source image space and slide space.
//!
//! Layout extraction services report positions in their own pixel space
//! (arbitrary DPI, often a 2x raster of the PDF page). Slides use a fixed
//! target canvas. Mapping is a pure scale: independent horizontal and
//! vertical factors, each coordinate computed from the original value so
//! no rounding drift accumulates across regions.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A width/height pair in a single coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a new size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Check that both dimensions are finite and strictly positive.
    pub fn validate(&self, what: &str) -> Result<()> {
        if !self.width.is_finite() || !self.height.is_finite() {
            return Err(Error::InvalidGeometry(format!(
                "{} has non-finite dimensions {}x{}",
                what, self.width, self.height
            )));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "{} has non-positive dimensions {}x{}",
                what, self.width, self.height
            )));
        }
        Ok(())
    }
}

/// An axis-aligned bounding box: origin at top-left, positive y down.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle from origin and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from `[x0, y0, x1, y1]` corner coordinates,
    /// the form layout services usually emit.
    pub fn from_corners(coords: [f64; 4]) -> Self {
        Self {
            x: coords[0],
            y: coords[1],
            width: coords[2] - coords[0],
            height: coords[3] - coords[1],
        }
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether the rectangle encloses a positive area.
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Map a bounding box from `source` space into `target` space.
///
/// Horizontal and vertical scale factors are independent
/// (`sx = target.width / source.width`, `sy = target.height / source.height`);
/// every output coordinate is derived from the original input value.
/// When `source == target` the input is returned exactly.
///
/// # Errors
///
/// Returns [`Error::InvalidGeometry`] when either size has a zero,
/// negative, or non-finite dimension.
pub fn map_rect(rect: Rect, source: Size, target: Size) -> Result<Rect> {
    source.validate("source size")?;
    target.validate("target size")?;

    // Identity must be exact, not merely within float tolerance.
    if source == target {
        return Ok(rect);
    }

    let sx = target.width / source.width;
    let sy = target.height / source.height;

    Ok(Rect {
        x: rect.x * sx,
        y: rect.y * sy,
        width: rect.width * sx,
        height: rect.height * sy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_map_scales_all_coordinates() {
        let rect = Rect::new(100.0, 100.0, 200.0, 50.0);
        let source = Size::new(1000.0, 800.0);
        let target = Size::new(1280.0, 720.0);

        let mapped = map_rect(rect, source, target).unwrap();
        assert!((mapped.x - 128.0).abs() < EPS);
        assert!((mapped.y - 90.0).abs() < EPS);
        assert!((mapped.width - 256.0).abs() < EPS);
        assert!((mapped.height - 45.0).abs() < EPS);
    }

    #[test]
    fn test_map_scale_invariance() {
        // x'/target.width == x/source.width, for all four coordinates.
        let rect = Rect::new(37.5, 912.25, 411.0, 63.125);
        let source = Size::new(1654.0, 2339.0);
        let target = Size::new(1280.0, 720.0);

        let mapped = map_rect(rect, source, target).unwrap();
        assert!((mapped.x / target.width - rect.x / source.width).abs() < EPS);
        assert!((mapped.y / target.height - rect.y / source.height).abs() < EPS);
        assert!((mapped.width / target.width - rect.width / source.width).abs() < EPS);
        assert!((mapped.height / target.height - rect.height / source.height).abs() < EPS);
    }

    #[test]
    fn test_map_identity_is_exact() {
        let rect = Rect::new(0.1, 0.2, 0.3, 0.7);
        let size = Size::new(1234.0, 567.0);
        let mapped = map_rect(rect, size, size).unwrap();
        assert_eq!(mapped, rect);
    }

    #[test]
    fn test_map_rejects_degenerate_source() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let result = map_rect(rect, Size::new(0.0, 800.0), Size::new(1280.0, 720.0));
        assert!(matches!(result, Err(Error::InvalidGeometry(_))));

        let result = map_rect(rect, Size::new(1000.0, -1.0), Size::new(1280.0, 720.0));
        assert!(matches!(result, Err(Error::InvalidGeometry(_))));
    }

    #[test]
    fn test_map_rejects_degenerate_target() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let result = map_rect(rect, Size::new(1000.0, 800.0), Size::new(1280.0, 0.0));
        assert!(matches!(result, Err(Error::InvalidGeometry(_))));
    }

    #[test]
    fn test_rect_from_corners() {
        let rect = Rect::from_corners([10.0, 20.0, 110.0, 70.0]);
        assert_eq!(rect, Rect::new(10.0, 20.0, 100.0, 50.0));
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 70.0);
        assert!(rect.has_area());
    }
}

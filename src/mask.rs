//! Binary cleaning masks.
//!
//! A mask marks the pixels of a page image that the inpainting collaborator
//! should erase and refill: one byte per pixel, 0 = keep, 255 = clean.
//! Text-region rectangles are inflated by a padding margin so anti-aliased
//! glyph edges are fully covered, then OR-combined onto the canvas, so
//! overlapping regions are idempotent.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Padding applied around each text region, in pixels.
pub const DEFAULT_MASK_PADDING: u32 = 4;

/// A per-page binary mask, same dimensions as the page image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Mask {
    /// Allocate an all-off mask for a page image of the given pixel size.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; (width as usize) * (height as usize)],
        }
    }

    /// Build a mask covering the given region rectangles.
    ///
    /// Rectangles are expected in page-image pixel space. Each is inflated
    /// by `padding` pixels on every side and clamped to the image bounds.
    /// Regions without positive area are ignored. An empty region list
    /// yields a blank mask, which signals "no cleaning needed" downstream.
    pub fn build(width: u32, height: u32, regions: &[Rect], padding: u32) -> Self {
        let mut mask = Self::blank(width, height);
        for rect in regions {
            mask.mark_rect(*rect, padding);
        }
        mask
    }

    /// OR a padded rectangle onto the mask, clamped to image bounds.
    pub fn mark_rect(&mut self, rect: Rect, padding: u32) {
        if !rect.has_area() || self.width == 0 || self.height == 0 {
            return;
        }

        let pad = padding as f64;
        let x0 = (rect.x - pad).floor().clamp(0.0, self.width as f64) as usize;
        let y0 = (rect.y - pad).floor().clamp(0.0, self.height as f64) as usize;
        let x1 = (rect.right() + pad).ceil().clamp(0.0, self.width as f64) as usize;
        let y1 = (rect.bottom() + pad).ceil().clamp(0.0, self.height as f64) as usize;

        // A region lying entirely outside the canvas clamps to an empty
        // span; nothing to mark.
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let w = self.width as usize;
        for y in y0..y1 {
            let row = &mut self.data[y * w..y * w + w];
            for px in &mut row[x0..x1] {
                *px = 255;
            }
        }
    }

    /// Mask width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw mask bytes, row-major, one byte per pixel.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Whether no pixel is marked. A blank mask means the page has no
    /// text regions and the cleaning call can be skipped entirely.
    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&px| px == 0)
    }

    /// Number of marked pixels.
    pub fn coverage(&self) -> usize {
        self.data.iter().filter(|&&px| px != 0).count()
    }

    /// Encode as a binary PGM (netpbm P5) grayscale image, the simplest
    /// container inpainting endpoints accept for masks.
    pub fn to_pgm(&self) -> Vec<u8> {
        let header = format!("P5\n{} {}\n255\n", self.width, self.height);
        let mut out = Vec::with_capacity(header.len() + self.data.len());
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(&self.data);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_mask() {
        let mask = Mask::blank(10, 5);
        assert!(mask.is_blank());
        assert_eq!(mask.coverage(), 0);
        assert_eq!(mask.as_bytes().len(), 50);
    }

    #[test]
    fn test_build_marks_padded_rect() {
        let mask = Mask::build(20, 20, &[Rect::new(5.0, 5.0, 4.0, 4.0)], 1);
        // 4x4 rect padded by 1 on each side: 6x6 = 36 pixels.
        assert_eq!(mask.coverage(), 36);
        assert!(!mask.is_blank());
    }

    #[test]
    fn test_build_clamps_to_bounds() {
        let mask = Mask::build(10, 10, &[Rect::new(8.0, 8.0, 10.0, 10.0)], 2);
        // Clamped to the 10x10 canvas: columns/rows 6..10 = 4x4.
        assert_eq!(mask.coverage(), 16);
    }

    #[test]
    fn test_overlapping_regions_or_combined() {
        let a = Rect::new(2.0, 2.0, 6.0, 6.0);
        let b = Rect::new(4.0, 4.0, 6.0, 6.0);

        let overlapped = Mask::build(16, 16, &[a, b], 0);
        let duplicated = Mask::build(16, 16, &[a, b, a, b], 0);

        // Double-marking never changes the result.
        assert_eq!(overlapped, duplicated);
        // Union area: 36 + 36 - 16 overlap = 56.
        assert_eq!(overlapped.coverage(), 56);
    }

    #[test]
    fn test_build_is_deterministic() {
        let regions = vec![
            Rect::new(1.0, 1.0, 3.0, 3.0),
            Rect::new(10.0, 2.0, 5.0, 7.0),
        ];
        let first = Mask::build(32, 24, &regions, 2);
        let second = Mask::build(32, 24, &regions, 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_regions_yield_blank() {
        let mask = Mask::build(64, 64, &[], 4);
        assert!(mask.is_blank());
    }

    #[test]
    fn test_region_outside_canvas_ignored() {
        // Layout services occasionally emit boxes past the image edge;
        // they must clamp away, not panic.
        let right = Mask::build(10, 10, &[Rect::new(15.0, 0.0, 5.0, 5.0)], 4);
        assert!(right.is_blank());

        let below = Mask::build(10, 10, &[Rect::new(0.0, 20.0, 5.0, 5.0)], 0);
        assert!(below.is_blank());

        let left = Mask::build(10, 10, &[Rect::new(-30.0, 2.0, 8.0, 4.0)], 2);
        assert!(left.is_blank());
    }

    #[test]
    fn test_region_straddling_edge_clamps() {
        // Overhang past the right edge: columns 8..10, rows 2..8.
        let mask = Mask::build(10, 10, &[Rect::new(8.0, 2.0, 6.0, 6.0)], 0);
        assert_eq!(mask.coverage(), 12);
    }

    #[test]
    fn test_zero_area_region_ignored() {
        let mask = Mask::build(8, 8, &[Rect::new(3.0, 3.0, 0.0, 5.0)], 0);
        assert!(mask.is_blank());
    }

    #[test]
    fn test_pgm_header() {
        let mask = Mask::blank(3, 2);
        let pgm = mask.to_pgm();
        assert!(pgm.starts_with(b"P5\n3 2\n255\n"));
        assert_eq!(pgm.len(), b"P5\n3 2\n255\n".len() + 6);
    }
}

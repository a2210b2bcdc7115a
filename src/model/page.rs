//! Page-level input types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{SlideRole, StyleHints};
use crate::geometry::{Rect, Size};

/// A single source page: one rasterized PDF page plus its text regions.
///
/// Pages are read-only inputs for a conversion run; they are produced by
/// the layout loader and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page index (0-based, deck order).
    pub index: usize,

    /// Native image width in pixels.
    pub width: u32,

    /// Native image height in pixels.
    pub height: u32,

    /// Path to the rasterized page image.
    pub image: PathBuf,

    /// Explicit role signal from the extraction service, when present.
    /// Absent means the page-0-is-title heuristic applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<SlideRole>,

    /// Text regions on the page, reading order significant.
    pub regions: Vec<TextRegion>,
}

impl Page {
    /// Create a new page without regions.
    pub fn new(index: usize, width: u32, height: u32, image: impl Into<PathBuf>) -> Self {
        Self {
            index,
            width,
            height,
            image: image.into(),
            role: None,
            regions: Vec::new(),
        }
    }

    /// Native pixel dimensions as a [`Size`].
    pub fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    /// Whether the page carries no text regions (background-only slide).
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Bounding boxes of all regions, in page-image pixel space.
    pub fn region_boxes(&self) -> Vec<Rect> {
        self.regions.iter().map(|r| r.bbox).collect()
    }
}

/// A positioned run of text on a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRegion {
    /// Bounding box in source pixel space.
    pub bbox: Rect,

    /// Text content, possibly multi-line.
    pub text: String,

    /// Reading-order rank within the page. Composition sorts by this,
    /// never by list position.
    pub rank: u32,

    /// Style hints inherited from the extraction service.
    #[serde(default, skip_serializing_if = "StyleHints::is_empty")]
    pub hints: StyleHints,
}

impl TextRegion {
    /// Create a region with no style hints.
    pub fn new(bbox: Rect, text: impl Into<String>, rank: u32) -> Self {
        Self {
            bbox,
            text: text.into(),
            rank,
            hints: StyleHints::default(),
        }
    }
}

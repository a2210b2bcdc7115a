//! Output types: shapes, slides, and the composed deck.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::TextStyle;
use crate::error::Result;
use crate::geometry::{Rect, Size};

/// Where a background image lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageSource {
    /// A file on disk (the raw page raster, or a persisted cleaned image).
    File { path: PathBuf },

    /// Image bytes held in memory (a cleaned image not yet persisted).
    Inline { data: Vec<u8> },
}

impl ImageSource {
    /// The file path, when already on disk.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ImageSource::File { path } => Some(path),
            ImageSource::Inline { .. } => None,
        }
    }
}

/// A visual element in a slide's shape tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// The background image, always shape index 0, spanning the canvas.
    Background {
        /// Full-slide frame in target space.
        frame: Rect,
        /// The image actually used for this page.
        image: ImageSource,
        /// Whether the image went through the cleaning collaborator.
        cleaned: bool,
    },

    /// An editable text box layered above the background.
    TextBox {
        /// Mapped geometry in target space.
        frame: Rect,
        /// Text content.
        text: String,
        /// Resolved font/size/color.
        style: TextStyle,
    },
}

impl Shape {
    /// Check if this shape is the background.
    pub fn is_background(&self) -> bool {
        matches!(self, Shape::Background { .. })
    }

    /// Check if this shape is a text box.
    pub fn is_text_box(&self) -> bool {
        matches!(self, Shape::TextBox { .. })
    }
}

/// One composed slide: a background shape followed by text boxes in
/// reading order. Write-once; never mutated after composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    /// Page index this slide was composed from.
    pub index: usize,

    /// Shape tree, z-order bottom to top.
    pub shapes: Vec<Shape>,
}

impl Slide {
    /// The background shape (always first).
    pub fn background(&self) -> Option<&Shape> {
        self.shapes.first().filter(|s| s.is_background())
    }

    /// Text-box shapes in z-order.
    pub fn text_boxes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter().filter(|s| s.is_text_box())
    }

    /// Number of text boxes.
    pub fn text_box_count(&self) -> usize {
        self.text_boxes().count()
    }

    /// Whether the background was cleaned by the collaborator.
    pub fn background_cleaned(&self) -> bool {
        matches!(self.background(), Some(Shape::Background { cleaned: true, .. }))
    }
}

/// A page image that actually ended up in the deck, for traceability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsedImage {
    pub page_index: usize,
    pub image: ImageSource,
    pub cleaned: bool,
}

/// The composed multi-slide document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    /// Target slide width in target units.
    pub width: f64,

    /// Target slide height in target units.
    pub height: f64,

    /// Slides in page order.
    pub slides: Vec<Slide>,
}

impl Deck {
    /// Create an empty deck with the given global geometry.
    pub fn new(target: Size) -> Self {
        Self {
            width: target.width,
            height: target.height,
            slides: Vec::new(),
        }
    }

    /// Number of slides.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Target geometry as a [`Size`].
    pub fn target_size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// The page images actually used for backgrounds, raw or cleaned,
    /// in slide order.
    pub fn used_images(&self) -> Vec<UsedImage> {
        self.slides
            .iter()
            .filter_map(|slide| match slide.background() {
                Some(Shape::Background { image, cleaned, .. }) => Some(UsedImage {
                    page_index: slide.index,
                    image: image.clone(),
                    cleaned: *cleaned,
                }),
                _ => None,
            })
            .collect()
    }

    /// Persist in-memory (cleaned) backgrounds into `dir` so every
    /// background resolves to a file. Returns the paths written.
    pub fn write_backgrounds(&mut self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        for slide in &mut self.slides {
            let index = slide.index;
            if let Some(Shape::Background { image, .. }) = slide.shapes.first_mut() {
                if let ImageSource::Inline { data } = image {
                    let path = dir.join(format!("page_{:03}.png", index));
                    fs::write(&path, data)?;
                    *image = ImageSource::File { path: path.clone() };
                    written.push(path);
                }
            }
        }

        Ok(written)
    }
}

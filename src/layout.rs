//! Layout document input.
//!
//! The layout extraction service (external collaborator) emits a JSON
//! document describing, per page, the native raster dimensions and an
//! ordered list of text blocks, each with a bounding box, content, and
//! optional style hints. Blocks may carry nested lines; the
//! [`Granularity`] option picks which level becomes a text region.

use std::fs;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::model::{Color, Page, SlideRole, StyleHints, TextRegion};

/// Which layout level becomes one text box on the slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    /// One text box per block (paragraph-level, the default).
    #[default]
    Block,

    /// One text box per line. Finer editing, more shapes.
    Line,
}

/// A parsed layout document: the read-only input of a conversion run.
#[derive(Debug, Clone)]
pub struct LayoutDocument {
    /// Pages in document order.
    pub pages: Vec<Page>,
}

impl LayoutDocument {
    /// Load a layout document from a JSON file.
    ///
    /// Relative page-image paths are resolved against the layout file's
    /// parent directory.
    pub fn from_file(path: impl AsRef<Path>, granularity: Granularity) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let mut doc = Self::from_json_str(&text, granularity)?;

        if let Some(base) = path.parent() {
            for page in &mut doc.pages {
                if page.image.is_relative() {
                    page.image = base.join(&page.image);
                }
            }
        }

        Ok(doc)
    }

    /// Load a layout document from a reader.
    pub fn from_reader<R: Read>(mut reader: R, granularity: Granularity) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::from_json_str(&text, granularity)
    }

    /// Parse a layout document from a JSON string.
    pub fn from_json_str(text: &str, granularity: Granularity) -> Result<Self> {
        let raw: RawLayout = serde_json::from_str(text)?;

        let mut pages = Vec::with_capacity(raw.pages.len());
        for (position, raw_page) in raw.pages.into_iter().enumerate() {
            pages.push(raw_page.into_page(position, granularity)?);
        }

        Ok(Self { pages })
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Whether the document has no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Get a page by index.
    pub fn get_page(&self, index: usize) -> Result<&Page> {
        self.pages
            .get(index)
            .ok_or(Error::PageOutOfRange(index, self.pages.len()))
    }
}

#[derive(Debug, Deserialize)]
struct RawLayout {
    pages: Vec<RawPage>,
}

#[derive(Debug, Deserialize)]
struct RawPage {
    #[serde(default)]
    index: Option<usize>,
    width: u32,
    height: u32,
    image: String,
    #[serde(default)]
    role: Option<SlideRole>,
    #[serde(default)]
    blocks: Vec<RawBlock>,
}

#[derive(Debug, Deserialize)]
struct RawBlock {
    bbox: [f64; 4],
    #[serde(default)]
    text: Option<String>,
    /// Block type tag from the extraction service ("text", "image",
    /// "table", ...). Anything but text is excluded from regions.
    #[serde(default, rename = "type")]
    kind: Option<String>,
    /// Explicit reading-order signal, when the service supplies one.
    #[serde(default)]
    order: Option<u32>,
    #[serde(default)]
    lines: Vec<RawLine>,
    #[serde(flatten)]
    hints: RawHints,
}

#[derive(Debug, Deserialize)]
struct RawLine {
    bbox: [f64; 4],
    text: String,
    #[serde(flatten)]
    hints: RawHints,
}

#[derive(Debug, Default, Deserialize)]
struct RawHints {
    #[serde(default)]
    font_family: Option<String>,
    #[serde(default)]
    font_size: Option<f64>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    bold: Option<bool>,
    #[serde(default)]
    italic: Option<bool>,
}

impl RawHints {
    fn into_hints(self) -> StyleHints {
        StyleHints {
            font_family: self.font_family,
            font_size: self.font_size,
            color: self.color.as_deref().and_then(Color::from_hex),
            bold: self.bold,
            italic: self.italic,
        }
    }
}

impl RawPage {
    fn into_page(self, position: usize, granularity: Granularity) -> Result<Page> {
        let index = self.index.unwrap_or(position);
        let mut page = Page::new(index, self.width, self.height, self.image);
        page.role = self.role;

        // Keep upstream reading order: explicit order wins, document
        // position breaks ties. Never re-ordered past this point.
        let mut blocks: Vec<(usize, RawBlock)> = self.blocks.into_iter().enumerate().collect();
        blocks.sort_by_key(|(pos, block)| (block.order.unwrap_or(*pos as u32), *pos));

        let mut rank = 0u32;
        for (_, block) in blocks {
            if let Some(kind) = &block.kind {
                if kind != "text" {
                    continue;
                }
            }

            match granularity {
                Granularity::Line if !block.lines.is_empty() => {
                    for line in block.lines {
                        if line.text.trim().is_empty() {
                            continue;
                        }
                        page.regions.push(TextRegion {
                            bbox: Rect::from_corners(line.bbox),
                            text: line.text,
                            rank,
                            hints: line.hints.into_hints(),
                        });
                        rank += 1;
                    }
                }
                _ => {
                    let text = match block.text {
                        Some(t) if !t.trim().is_empty() => t,
                        _ => {
                            // Block granularity with line-only payload:
                            // join the line texts.
                            let joined = block
                                .lines
                                .iter()
                                .map(|l| l.text.as_str())
                                .collect::<Vec<_>>()
                                .join("\n");
                            if joined.trim().is_empty() {
                                continue;
                            }
                            joined
                        }
                    };
                    page.regions.push(TextRegion {
                        bbox: Rect::from_corners(block.bbox),
                        text,
                        rank,
                        hints: block.hints.into_hints(),
                    });
                    rank += 1;
                }
            }
        }

        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "pages": [
            {
                "width": 1000,
                "height": 800,
                "image": "page_000.png",
                "blocks": [
                    {
                        "bbox": [100, 100, 300, 150],
                        "text": "Title",
                        "type": "text",
                        "font_size": 40.0,
                        "color": "FF0000"
                    },
                    {
                        "bbox": [100, 200, 500, 400],
                        "type": "image"
                    },
                    {
                        "bbox": [100, 450, 600, 520],
                        "lines": [
                            { "bbox": [100, 450, 600, 480], "text": "first line" },
                            { "bbox": [100, 490, 580, 520], "text": "second line" }
                        ]
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_block_granularity() {
        let doc = LayoutDocument::from_json_str(SAMPLE, Granularity::Block).unwrap();
        assert_eq!(doc.page_count(), 1);

        let page = doc.get_page(0).unwrap();
        assert_eq!(page.width, 1000);
        // Image block excluded; line-only block joined.
        assert_eq!(page.regions.len(), 2);
        assert_eq!(page.regions[0].text, "Title");
        assert_eq!(page.regions[1].text, "first line\nsecond line");
        assert_eq!(page.regions[0].rank, 0);
        assert_eq!(page.regions[1].rank, 1);

        // Hints carried through, hex color parsed.
        assert_eq!(page.regions[0].hints.font_size, Some(40.0));
        assert_eq!(page.regions[0].hints.color, Some(Color::new(255, 0, 0)));
    }

    #[test]
    fn test_parse_line_granularity() {
        let doc = LayoutDocument::from_json_str(SAMPLE, Granularity::Line).unwrap();
        let page = doc.get_page(0).unwrap();

        // Title block has no lines, stays whole; the lined block splits.
        assert_eq!(page.regions.len(), 3);
        assert_eq!(page.regions[1].text, "first line");
        assert_eq!(page.regions[2].text, "second line");
        assert_eq!(
            page.regions[1].bbox,
            Rect::from_corners([100.0, 450.0, 600.0, 480.0])
        );
    }

    #[test]
    fn test_explicit_order_wins() {
        let json = r#"{
            "pages": [{
                "width": 100, "height": 100, "image": "p.png",
                "blocks": [
                    { "bbox": [0, 50, 10, 60], "text": "second", "order": 1 },
                    { "bbox": [0, 0, 10, 10], "text": "first", "order": 0 }
                ]
            }]
        }"#;
        let doc = LayoutDocument::from_json_str(json, Granularity::Block).unwrap();
        let page = doc.get_page(0).unwrap();
        assert_eq!(page.regions[0].text, "first");
        assert_eq!(page.regions[1].text, "second");
    }

    #[test]
    fn test_explicit_role_parsed() {
        let json = r#"{
            "pages": [{
                "width": 100, "height": 100, "image": "p.png",
                "role": "content", "blocks": []
            }]
        }"#;
        let doc = LayoutDocument::from_json_str(json, Granularity::Block).unwrap();
        assert_eq!(doc.pages[0].role, Some(SlideRole::Content));
    }

    #[test]
    fn test_garbage_color_hint_is_dropped() {
        let json = r#"{
            "pages": [{
                "width": 100, "height": 100, "image": "p.png",
                "blocks": [
                    { "bbox": [0, 0, 10, 10], "text": "t", "color": "a¡¡b" }
                ]
            }]
        }"#;
        let doc = LayoutDocument::from_json_str(json, Granularity::Block).unwrap();
        assert_eq!(doc.pages[0].regions[0].hints.color, None);
    }

    #[test]
    fn test_malformed_json_is_layout_parse_error() {
        let result = LayoutDocument::from_json_str("{not json", Granularity::Block);
        assert!(matches!(result, Err(Error::LayoutParse(_))));
    }

    #[test]
    fn test_from_file_resolves_relative_images() {
        let dir = tempfile::tempdir().unwrap();
        let layout_path = dir.path().join("layout.json");
        fs::write(
            &layout_path,
            r#"{ "pages": [{ "width": 10, "height": 10, "image": "images/p0.png", "blocks": [] }] }"#,
        )
        .unwrap();

        let doc = LayoutDocument::from_file(&layout_path, Granularity::Block).unwrap();
        assert_eq!(doc.pages[0].image, dir.path().join("images/p0.png"));
    }
}

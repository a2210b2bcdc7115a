//! # redeck
//!
//! Reconstructs an editable slide deck from a flattened, non-editable
//! PDF. Given a layout document from an external extraction service
//! (text positions per page) and the rasterized page images, redeck
//! maps every text region into slide space, derives cleaning masks,
//! asks an optional inpainting collaborator for text-free backgrounds,
//! and recomposes each page as a slide: one background shape plus live,
//! positioned text boxes with template-derived styling.
//!
//! ## Quick Start
//!
//! ```no_run
//! use redeck::Redeck;
//!
//! fn main() -> redeck::Result<()> {
//!     let conversion = Redeck::new()
//!         .with_target_size(1280.0, 720.0)
//!         .convert_file("layout.json")?;
//!
//!     println!(
//!         "{} slides, {} degraded",
//!         conversion.deck.slide_count(),
//!         conversion.report.pages_degraded
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Design notes
//!
//! - The layout extractor and image cleaner are external collaborators
//!   behind ports; the [`clean::ImageCleaner`] trait is the cleaning
//!   seam and tests substitute fakes.
//! - Cleaning degrades gracefully: a failing or absent cleaner never
//!   blocks output, it only marks pages as degraded in the
//!   [`RunReport`].
//! - Pages are processed in parallel on a bounded worker pool; deck
//!   assembly sorts by page index, so output is deterministic.

pub mod clean;
pub mod compose;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod mask;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod template;

// Re-export commonly used types
pub use clean::{Background, ImageCleaner, Resolution};
pub use error::{Error, Result};
pub use geometry::{map_rect, Rect, Size};
pub use layout::{Granularity, LayoutDocument};
pub use mask::Mask;
pub use model::{
    Color, Deck, ImageSource, Page, Shape, Slide, SlideRole, StyleHints, StyleProfile,
    StyleProfiles, TextRegion, TextStyle, UsedImage,
};
pub use pipeline::{compose_deck, CancelToken, ConvertOptions, RunReport, SkippedPage};
pub use render::JsonFormat;

use std::path::{Path, PathBuf};

/// Load a layout document from a JSON file with block granularity.
pub fn load_layout<P: AsRef<Path>>(path: P) -> Result<LayoutDocument> {
    LayoutDocument::from_file(path, Granularity::Block)
}

/// Convert a layout file into a deck with default options, no cleaner,
/// and built-in styles.
pub fn convert_file<P: AsRef<Path>>(path: P) -> Result<Conversion> {
    Redeck::new().convert_file(path)
}

/// Result of a conversion run: the composed deck plus its report.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// The composed multi-slide document.
    pub deck: Deck,

    /// Per-run accounting: pages total / composed / degraded / skipped.
    pub report: RunReport,
}

impl Conversion {
    /// Serialize the deck to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.deck, format)
    }

    /// Serialize the run report to JSON.
    pub fn report_to_json(&self, format: JsonFormat) -> Result<String> {
        render::report_to_json(&self.report, format)
    }
}

/// Builder wiring options, templates, and the cleaning collaborator.
///
/// # Example
///
/// ```no_run
/// use redeck::{Granularity, Redeck};
///
///
/// let conversion = Redeck::new()
///     .with_template_dir("./templates")
///     .with_granularity(Granularity::Line)
///     .sequential()
///     .convert_file("layout.json")?;
/// # Ok::<(), redeck::Error>(())
/// ```
pub struct Redeck {
    options: ConvertOptions,
    title_template: Option<PathBuf>,
    content_template: Option<PathBuf>,
    cleaner: Option<Box<dyn ImageCleaner>>,
}

impl Redeck {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            options: ConvertOptions::default(),
            title_template: None,
            content_template: None,
            cleaner: None,
        }
    }

    /// Set the target slide size.
    pub fn with_target_size(mut self, width: f64, height: f64) -> Self {
        self.options = self.options.with_target(Size::new(width, height));
        self
    }

    /// Set the cleaning-mask padding in pixels.
    pub fn with_mask_padding(mut self, padding: u32) -> Self {
        self.options = self.options.with_mask_padding(padding);
        self
    }

    /// Set the layout granularity.
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.options = self.options.with_granularity(granularity);
        self
    }

    /// Set the worker pool size.
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.options = self.options.with_max_workers(workers);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Attach a cancellation token.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.options = self.options.with_cancel(cancel);
        self
    }

    /// Set the title-slide template.
    pub fn with_title_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.title_template = Some(path.into());
        self
    }

    /// Set the content-slide template.
    pub fn with_content_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.content_template = Some(path.into());
        self
    }

    /// Point at a template directory using the conventional file names
    /// `title-slide.pptx` and `non-title-slide.pptx`. Either may be
    /// absent; missing ones fall back to built-in defaults.
    pub fn with_template_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let title = dir.join("title-slide.pptx");
        if title.exists() {
            self.title_template = Some(title);
        }
        let content = dir.join("non-title-slide.pptx");
        if content.exists() {
            self.content_template = Some(content);
        }
        self
    }

    /// Set the image cleaning collaborator.
    pub fn with_cleaner(mut self, cleaner: Box<dyn ImageCleaner>) -> Self {
        self.cleaner = Some(cleaner);
        self
    }

    /// Style profiles for this run: template-derived where templates
    /// were supplied, built-in defaults otherwise.
    pub fn style_profiles(&self) -> StyleProfiles {
        StyleProfiles {
            title: template::extract_profile(self.title_template.as_deref(), SlideRole::Title),
            content: template::extract_profile(
                self.content_template.as_deref(),
                SlideRole::Content,
            ),
        }
    }

    /// Load a layout file and convert it.
    pub fn convert_file<P: AsRef<Path>>(self, path: P) -> Result<Conversion> {
        let layout = LayoutDocument::from_file(path, self.options.granularity)?;
        self.convert(&layout)
    }

    /// Convert an already-loaded layout document.
    pub fn convert(self, layout: &LayoutDocument) -> Result<Conversion> {
        let profiles = self.style_profiles();
        let (deck, report) = compose_deck(
            layout,
            self.cleaner.as_deref(),
            &profiles,
            &self.options,
        )?;
        Ok(Conversion { deck, report })
    }
}

impl Default for Redeck {
    fn default() -> Self {
        Self::new()
    }
}

//! Error types for the redeck library.

use std::io;
use thiserror::Error;

/// Result type alias for redeck operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during deck reconstruction.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A dimension used for coordinate mapping is zero or negative.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The layout document could not be parsed.
    #[error("Layout parsing error: {0}")]
    LayoutParse(String),

    /// The layout document contains no pages.
    #[error("Layout document has no pages")]
    EmptyLayout,

    /// Page index is out of range.
    #[error("Page {0} is out of range (layout has {1} pages)")]
    PageOutOfRange(usize, usize),

    /// Template style extraction failed.
    ///
    /// Never propagated out of the library: the template module resolves
    /// this to a default [`StyleProfile`](crate::model::StyleProfile).
    #[error("Style extraction error: {0}")]
    StyleExtraction(String),

    /// The image cleaning collaborator failed.
    ///
    /// Never propagated out of the library: the background resolver
    /// falls back to the raw page image and counts the page as degraded.
    #[error("Cleaning error: {0}")]
    Cleaning(String),

    /// The image cleaning collaborator did not respond in time.
    ///
    /// Takes the same raw-image fallback path as [`Error::Cleaning`].
    #[error("Cleaning timed out after {0:?}")]
    CleaningTimeout(std::time::Duration),

    /// Error while assembling a slide's shape tree. Per-page fatal:
    /// the page is skipped and the run continues.
    #[error("Compose error on page {page}: {reason}")]
    Compose { page: usize, reason: String },

    /// Every page failed to compose.
    #[error("No pages composed successfully ({0} pages skipped)")]
    NoPagesComposed(usize),

    /// The run was cancelled before completion.
    #[error("Run cancelled")]
    Cancelled,
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::LayoutParse(err.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::StyleExtraction(format!("template archive: {}", err))
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::StyleExtraction(format!("template xml: {}", err))
    }
}

//! Background resolution via the image-cleaning collaborator.
//!
//! The inpainting service is modeled as an injectable [`ImageCleaner`]
//! port, not a concrete client: the library never sees transport or auth
//! concerns, and tests substitute fakes. Cleaning is a best-effort
//! enhancement — every failure path degrades to the raw page image, it
//! never blocks producing output.

use std::fs;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mask::Mask;
use crate::model::{ImageSource, Page};

/// Capability interface for the external inpainting service.
///
/// Implementations own their transport, retry, and timeout policy; a
/// timeout must surface as [`Error::CleaningTimeout`] so the resolver
/// can count the page as degraded.
pub trait ImageCleaner: Send + Sync {
    /// Remove the masked pixels from `image` and plausibly refill the
    /// background, returning the cleaned image bytes.
    fn clean(&self, image: &[u8], mask: &Mask) -> Result<Vec<u8>>;
}

/// How a page's background was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// The cleaning collaborator produced a cleaned image.
    Cleaned,

    /// Nothing to clean (blank mask) or no cleaner configured; the raw
    /// image is used without a remote call.
    Skipped,

    /// Cleaning was attempted and failed; the raw image is the fallback.
    Degraded,
}

/// A resolved background, 1:1 with a page.
#[derive(Debug, Clone)]
pub struct Background {
    pub page_index: usize,
    pub image: ImageSource,
    pub resolution: Resolution,
}

impl Background {
    /// Whether the background went through the cleaner.
    pub fn is_cleaned(&self) -> bool {
        self.resolution == Resolution::Cleaned
    }
}

/// Resolve the background for one page.
///
/// Builds the cleaning mask from the page's text regions; a blank mask
/// (no regions) skips the remote call entirely. Otherwise the cleaner is
/// invoked with the raw image bytes and the mask. Any failure — the
/// collaborator unreachable, a timeout, even an unreadable page image —
/// is logged and resolved to the raw image. This function never fails.
pub fn resolve_background(
    page: &Page,
    cleaner: Option<&dyn ImageCleaner>,
    mask_padding: u32,
) -> Background {
    let raw = ImageSource::File {
        path: page.image.clone(),
    };

    let mask = Mask::build(page.width, page.height, &page.region_boxes(), mask_padding);
    if mask.is_blank() {
        log::debug!("page {}: blank mask, skipping clean call", page.index);
        return Background {
            page_index: page.index,
            image: raw,
            resolution: Resolution::Skipped,
        };
    }

    let Some(cleaner) = cleaner else {
        log::debug!("page {}: no cleaner configured, using raw image", page.index);
        return Background {
            page_index: page.index,
            image: raw,
            resolution: Resolution::Skipped,
        };
    };

    let image_bytes = match fs::read(&page.image) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!(
                "page {}: cannot read image {} for cleaning ({}), using raw image",
                page.index,
                page.image.display(),
                e
            );
            return Background {
                page_index: page.index,
                image: raw,
                resolution: Resolution::Degraded,
            };
        }
    };

    match cleaner.clean(&image_bytes, &mask) {
        Ok(cleaned) => Background {
            page_index: page.index,
            image: ImageSource::Inline { data: cleaned },
            resolution: Resolution::Cleaned,
        },
        Err(e) => {
            match e {
                Error::CleaningTimeout(d) => {
                    log::warn!("page {}: cleaning timed out after {:?}", page.index, d)
                }
                other => log::warn!("page {}: cleaning failed: {}", page.index, other),
            }
            Background {
                page_index: page.index,
                image: raw,
                resolution: Resolution::Degraded,
            }
        }
    }
}

//! Conversion pipeline: parallel page processing and deck assembly.
//!
//! Pages are independent units of work. Background resolution and
//! composition run on a bounded worker pool; completion order is
//! irrelevant because assembly sorts by page index, so output is
//! deterministic. Failures local to one page never abort the run —
//! only systemic ones do (no pages at all, invalid target geometry).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clean::{resolve_background, ImageCleaner, Resolution};
use crate::compose::compose_slide;
use crate::error::{Error, Result};
use crate::geometry::Size;
use crate::layout::{Granularity, LayoutDocument};
use crate::mask::DEFAULT_MASK_PADDING;
use crate::model::{Deck, Page, Slide, StyleProfiles};

/// Default target slide canvas, 720p.
pub const DEFAULT_TARGET: Size = Size {
    width: 1280.0,
    height: 720.0,
};

/// Options for a conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Target slide geometry.
    pub target: Size,

    /// Padding around text regions in the cleaning mask, in pixels.
    pub mask_padding: u32,

    /// Layout level that becomes one text box.
    pub granularity: Granularity,

    /// Whether to process pages on a worker pool.
    pub parallel: bool,

    /// Worker pool size; size this to the cleaning collaborator's
    /// rate limits.
    pub max_workers: usize,

    /// Cooperative cancellation handle for the run.
    pub cancel: CancelToken,
}

impl ConvertOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target slide size.
    pub fn with_target(mut self, target: Size) -> Self {
        self.target = target;
        self
    }

    /// Set the mask padding in pixels.
    pub fn with_mask_padding(mut self, padding: u32) -> Self {
        self.mask_padding = padding;
        self
    }

    /// Set the layout granularity.
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Set the worker pool size.
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers.max(1);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Attach a cancellation token.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET,
            mask_padding: DEFAULT_MASK_PADDING,
            granularity: Granularity::default(),
            parallel: true,
            max_workers: 4,
            cancel: CancelToken::new(),
        }
    }
}

/// Cooperative cancellation for a whole run.
///
/// Cancelling stops new cleaning calls from being issued; in-flight
/// calls finish or are abandoned, and partial output is discarded.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// A page that was skipped, with the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedPage {
    pub index: usize,
    pub reason: String,
}

/// Per-run accounting, returned alongside the deck.
///
/// An explicit accumulator rather than ambient state, so runs stay
/// testable and parallel-safe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Total pages in the layout input.
    pub pages_total: usize,

    /// Pages that composed successfully.
    pub pages_composed: usize,

    /// Pages whose background fell back to the raw image after a
    /// cleaning failure.
    pub pages_degraded: usize,

    /// Pages skipped because of per-page errors.
    pub pages_skipped: usize,

    /// Skip reasons, by page index.
    pub skipped: Vec<SkippedPage>,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    fn started(pages_total: usize) -> Self {
        let now = Utc::now();
        Self {
            pages_total,
            pages_composed: 0,
            pages_degraded: 0,
            pages_skipped: 0,
            skipped: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    /// Whether every page made it into the deck.
    pub fn is_complete(&self) -> bool {
        self.pages_composed == self.pages_total
    }
}

/// Outcome of one page's resolve-and-compose task.
struct PageOutcome {
    index: usize,
    result: Result<(Slide, Resolution)>,
}

/// Convert a layout document into a composed deck.
///
/// Per page: build the mask, resolve the background (cleaned or raw
/// fallback), compose the shape tree. Pages run on a bounded worker
/// pool when `options.parallel` is set; the deck is assembled in page
/// order afterwards regardless of completion order.
///
/// # Errors
///
/// - [`Error::InvalidGeometry`] when the global target size is
///   degenerate (whole-run abort, by design).
/// - [`Error::EmptyLayout`] when the layout has no pages.
/// - [`Error::NoPagesComposed`] when every page failed.
/// - [`Error::Cancelled`] when the run's [`CancelToken`] fired.
pub fn compose_deck(
    layout: &LayoutDocument,
    cleaner: Option<&dyn ImageCleaner>,
    profiles: &StyleProfiles,
    options: &ConvertOptions,
) -> Result<(Deck, RunReport)> {
    // Invalid global geometry aborts the whole run, unlike the
    // per-page variant which only skips the page.
    options.target.validate("target size")?;

    if layout.is_empty() {
        return Err(Error::EmptyLayout);
    }

    let mut report = RunReport::started(layout.page_count());

    let mut outcomes = if options.parallel && layout.page_count() > 1 {
        process_pages_parallel(&layout.pages, cleaner, profiles, options)
    } else {
        layout
            .pages
            .iter()
            .map(|page| process_page(page, cleaner, profiles, options))
            .collect()
    };

    if options.cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }

    // Deterministic assembly: page order, never completion order.
    outcomes.sort_by_key(|outcome| outcome.index);

    let mut deck = Deck::new(options.target);
    for outcome in outcomes {
        match outcome.result {
            Ok((slide, resolution)) => {
                if resolution == Resolution::Degraded {
                    report.pages_degraded += 1;
                }
                report.pages_composed += 1;
                deck.slides.push(slide);
            }
            Err(err) => {
                log::warn!("page {} skipped: {}", outcome.index, err);
                report.pages_skipped += 1;
                report.skipped.push(SkippedPage {
                    index: outcome.index,
                    reason: err.to_string(),
                });
            }
        }
    }

    report.finished_at = Utc::now();

    if report.pages_composed == 0 {
        return Err(Error::NoPagesComposed(report.pages_skipped));
    }

    Ok((deck, report))
}

/// Resolve and compose a single page. The mask is fully built before
/// the cleaning call is issued (strict ordering inside a page).
fn process_page(
    page: &Page,
    cleaner: Option<&dyn ImageCleaner>,
    profiles: &StyleProfiles,
    options: &ConvertOptions,
) -> PageOutcome {
    if options.cancel.is_cancelled() {
        return PageOutcome {
            index: page.index,
            result: Err(Error::Cancelled),
        };
    }

    let background = resolve_background(page, cleaner, options.mask_padding);
    let result = compose_slide(page, &background, profiles, options.target)
        .map(|slide| (slide, background.resolution))
        .map_err(|e| Error::Compose {
            page: page.index,
            reason: e.to_string(),
        });

    PageOutcome {
        index: page.index,
        result,
    }
}

/// Run page tasks on a bounded worker pool.
///
/// No shared mutable state crosses page boundaries; workers only send
/// outcomes over a channel.
fn process_pages_parallel(
    pages: &[Page],
    cleaner: Option<&dyn ImageCleaner>,
    profiles: &StyleProfiles,
    options: &ConvertOptions,
) -> Vec<PageOutcome> {
    let workers = options.max_workers.max(1).min(pages.len());

    let (job_tx, job_rx) = crossbeam_channel::unbounded::<&Page>();
    let (out_tx, out_rx) = crossbeam_channel::unbounded::<PageOutcome>();

    for page in pages {
        // Unbounded channel with all senders alive: never fails.
        let _ = job_tx.send(page);
    }
    drop(job_tx);

    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let out_tx = out_tx.clone();
            scope.spawn(move || {
                for page in job_rx.iter() {
                    let _ = out_tx.send(process_page(page, cleaner, profiles, options));
                }
            });
        }
        drop(out_tx);

        out_rx.iter().collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Granularity;

    #[test]
    fn test_options_builder() {
        let options = ConvertOptions::new()
            .with_target(Size::new(1920.0, 1080.0))
            .with_mask_padding(8)
            .with_granularity(Granularity::Line)
            .with_max_workers(2)
            .sequential();

        assert_eq!(options.target, Size::new(1920.0, 1080.0));
        assert_eq!(options.mask_padding, 8);
        assert_eq!(options.granularity, Granularity::Line);
        assert_eq!(options.max_workers, 2);
        assert!(!options.parallel);
    }

    #[test]
    fn test_max_workers_floor_is_one() {
        let options = ConvertOptions::new().with_max_workers(0);
        assert_eq!(options.max_workers, 1);
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());

        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_empty_layout_aborts() {
        let layout = LayoutDocument { pages: Vec::new() };
        let result = compose_deck(
            &layout,
            None,
            &StyleProfiles::default(),
            &ConvertOptions::default(),
        );
        assert!(matches!(result, Err(Error::EmptyLayout)));
    }

    #[test]
    fn test_invalid_target_aborts_run() {
        let layout = LayoutDocument {
            pages: vec![Page::new(0, 100, 100, "p.png")],
        };
        let options = ConvertOptions::new().with_target(Size::new(0.0, 720.0));
        let result = compose_deck(&layout, None, &StyleProfiles::default(), &options);
        assert!(matches!(result, Err(Error::InvalidGeometry(_))));
    }

    #[test]
    fn test_cancelled_run_discards_output() {
        let layout = LayoutDocument {
            pages: vec![Page::new(0, 100, 100, "p.png")],
        };
        let options = ConvertOptions::default();
        options.cancel.cancel();

        let result = compose_deck(&layout, None, &StyleProfiles::default(), &options);
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn test_skip_reason_is_compose_error() {
        let mut good = Page::new(0, 100, 100, "a.png");
        good.regions.push(crate::model::TextRegion::new(
            crate::geometry::Rect::new(1.0, 1.0, 5.0, 5.0),
            "ok",
            0,
        ));
        let mut bad = Page::new(1, 0, 100, "b.png");
        bad.regions.push(crate::model::TextRegion::new(
            crate::geometry::Rect::new(1.0, 1.0, 5.0, 5.0),
            "broken",
            0,
        ));
        let layout = LayoutDocument {
            pages: vec![good, bad],
        };

        let (deck, report) = compose_deck(
            &layout,
            None,
            &StyleProfiles::default(),
            &ConvertOptions::default(),
        )
        .unwrap();

        assert_eq!(deck.slide_count(), 1);
        assert_eq!(report.skipped[0].index, 1);
        assert!(report.skipped[0].reason.contains("Compose error on page 1"));
    }

    #[test]
    fn test_single_bad_page_aborts_as_no_pages_composed() {
        // Zero-width page with a region: per-page InvalidGeometry, and
        // with only one page the whole run has nothing to output.
        let mut page = Page::new(0, 0, 100, "p.png");
        page.regions.push(crate::model::TextRegion::new(
            crate::geometry::Rect::new(1.0, 1.0, 5.0, 5.0),
            "x",
            0,
        ));
        let layout = LayoutDocument { pages: vec![page] };

        let result = compose_deck(
            &layout,
            None,
            &StyleProfiles::default(),
            &ConvertOptions::default(),
        );
        assert!(matches!(result, Err(Error::NoPagesComposed(1))));
    }
}

//! Slide composition: turning a page, its resolved background, and a
//! style profile into an ordered shape tree.
//!
//! Z-order is fixed: the background shape is always index 0, text boxes
//! follow in ascending reading-order rank. The composer never reorders
//! regions beyond that sort; a wrong upstream reading order is surfaced
//! unchanged.

use crate::clean::Background;
use crate::error::Result;
use crate::geometry::{map_rect, Rect, Size};
use crate::model::{Page, Shape, Slide, SlideRole, StyleProfiles};

/// Role for a page: an explicit signal from the layout wins, otherwise
/// page 0 is the title and the rest are content.
pub fn infer_role(page: &Page) -> SlideRole {
    page.role.unwrap_or(if page.index == 0 {
        SlideRole::Title
    } else {
        SlideRole::Content
    })
}

/// Compose one slide from a page and its resolved background.
///
/// Region bounding boxes are mapped from the page's native pixel space
/// into `target` space; each region becomes a text box carrying the
/// role profile with the region's style hints overriding field by field.
///
/// # Errors
///
/// Returns [`Error::InvalidGeometry`](crate::Error::InvalidGeometry)
/// when the page's native size is degenerate. Per-page fatal: callers
/// skip the page and continue the run.
pub fn compose_slide(
    page: &Page,
    background: &Background,
    profiles: &StyleProfiles,
    target: Size,
) -> Result<Slide> {
    let source = page.size();
    let role = infer_role(page);
    let profile = profiles.for_role(role);

    let mut shapes = Vec::with_capacity(page.regions.len() + 1);
    shapes.push(Shape::Background {
        frame: Rect::new(0.0, 0.0, target.width, target.height),
        image: background.image.clone(),
        cleaned: background.is_cleaned(),
    });

    // Sort by reading-order rank, not input list order. The sort is
    // stable so equal ranks keep their upstream order.
    let mut ordered: Vec<&crate::model::TextRegion> = page.regions.iter().collect();
    ordered.sort_by_key(|region| region.rank);

    for region in ordered {
        let frame = map_rect(region.bbox, source, target)?;
        shapes.push(Shape::TextBox {
            frame,
            text: region.text.clone(),
            style: profile.resolve(&region.hints),
        });
    }

    Ok(Slide {
        index: page.index,
        shapes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::Resolution;
    use crate::model::{ImageSource, TextRegion};
    use std::path::PathBuf;

    fn raw_background(index: usize) -> Background {
        Background {
            page_index: index,
            image: ImageSource::File {
                path: PathBuf::from(format!("page_{:03}.png", index)),
            },
            resolution: Resolution::Skipped,
        }
    }

    fn target() -> Size {
        Size::new(1280.0, 720.0)
    }

    #[test]
    fn test_background_is_shape_zero() {
        let mut page = Page::new(0, 1000, 800, "p.png");
        page.regions
            .push(TextRegion::new(Rect::new(10.0, 10.0, 100.0, 20.0), "t", 0));

        let slide =
            compose_slide(&page, &raw_background(0), &StyleProfiles::default(), target()).unwrap();

        assert!(slide.shapes[0].is_background());
        assert_eq!(slide.text_box_count(), 1);
        // Background spans the full canvas.
        match &slide.shapes[0] {
            Shape::Background { frame, .. } => {
                assert_eq!(*frame, Rect::new(0.0, 0.0, 1280.0, 720.0));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_regions_sorted_by_rank_not_input_order() {
        let mut page = Page::new(1, 100, 100, "p.png");
        // Input list order: ranks [2, 0, 1].
        page.regions
            .push(TextRegion::new(Rect::new(0.0, 0.0, 10.0, 5.0), "third", 2));
        page.regions
            .push(TextRegion::new(Rect::new(0.0, 10.0, 10.0, 5.0), "first", 0));
        page.regions
            .push(TextRegion::new(Rect::new(0.0, 20.0, 10.0, 5.0), "second", 1));

        let slide =
            compose_slide(&page, &raw_background(1), &StyleProfiles::default(), target()).unwrap();

        let texts: Vec<&str> = slide
            .text_boxes()
            .map(|s| match s {
                Shape::TextBox { text, .. } => text.as_str(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_empty_page_composes_background_only() {
        let page = Page::new(0, 640, 480, "p.png");
        let slide =
            compose_slide(&page, &raw_background(0), &StyleProfiles::default(), target()).unwrap();
        assert_eq!(slide.shapes.len(), 1);
        assert!(slide.shapes[0].is_background());
    }

    #[test]
    fn test_geometry_mapped_into_target_space() {
        let mut page = Page::new(0, 1000, 800, "p.png");
        page.regions.push(TextRegion::new(
            Rect::new(100.0, 100.0, 200.0, 50.0),
            "Title",
            0,
        ));

        let slide =
            compose_slide(&page, &raw_background(0), &StyleProfiles::default(), target()).unwrap();

        match &slide.shapes[1] {
            Shape::TextBox { frame, .. } => {
                assert!((frame.x - 128.0).abs() < 1e-9);
                assert!((frame.y - 90.0).abs() < 1e-9);
                assert!((frame.width - 256.0).abs() < 1e-9);
                assert!((frame.height - 45.0).abs() < 1e-9);
            }
            _ => panic!("expected text box"),
        }
    }

    #[test]
    fn test_degenerate_page_size_fails() {
        let mut page = Page::new(0, 0, 800, "p.png");
        page.regions
            .push(TextRegion::new(Rect::new(1.0, 1.0, 2.0, 2.0), "x", 0));

        let result = compose_slide(&page, &raw_background(0), &StyleProfiles::default(), target());
        assert!(result.is_err());
    }

    #[test]
    fn test_role_inference() {
        let page0 = Page::new(0, 10, 10, "a.png");
        assert_eq!(infer_role(&page0), SlideRole::Title);

        let page3 = Page::new(3, 10, 10, "b.png");
        assert_eq!(infer_role(&page3), SlideRole::Content);

        // Explicit signal wins over the heuristic.
        let mut page0_content = Page::new(0, 10, 10, "c.png");
        page0_content.role = Some(SlideRole::Content);
        assert_eq!(infer_role(&page0_content), SlideRole::Content);
    }

    #[test]
    fn test_title_page_uses_title_profile() {
        let mut page = Page::new(0, 100, 100, "p.png");
        page.regions
            .push(TextRegion::new(Rect::new(0.0, 0.0, 50.0, 10.0), "T", 0));

        let profiles = StyleProfiles::default();
        let slide = compose_slide(&page, &raw_background(0), &profiles, target()).unwrap();

        match &slide.shapes[1] {
            Shape::TextBox { style, .. } => {
                assert_eq!(style.font_size, profiles.title.font_size);
                assert!(style.bold);
            }
            _ => panic!("expected text box"),
        }
    }
}

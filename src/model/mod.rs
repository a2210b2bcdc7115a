//! Data model: input pages and regions, styles, and the composed deck.

mod page;
mod slide;
mod style;

pub use page::{Page, TextRegion};
pub use slide::{Deck, ImageSource, Shape, Slide, UsedImage};
pub use style::{Color, SlideRole, StyleHints, StyleProfile, StyleProfiles, TextStyle};

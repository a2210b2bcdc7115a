//! Style types: slide roles, colors, style profiles and hints.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// The role a slide plays in the deck, used to pick a style profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideRole {
    /// Title slide (by default, the first page).
    Title,

    /// Regular content slide.
    #[default]
    Content,
}

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Black, the fallback text color.
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    /// Create a color from components.
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a 6-digit hex string, with or without a leading `#`.
    ///
    /// Returns `None` for anything that is not exactly RRGGBB.
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.trim_start_matches('#');
        // Byte length alone is not enough: multibyte input would make the
        // pair slices below split a char boundary.
        if s.len() != 6 || !s.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&s[0..2], 16).ok()?;
        let g = u8::from_str_radix(&s[2..4], 16).ok()?;
        let b = u8::from_str_radix(&s[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }

    /// Format as an uppercase RRGGBB hex string.
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Optional per-region style hints supplied by the layout extraction
/// service. Any field present here overrides the role profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleHints {
    /// Font family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,

    /// Font size in points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,

    /// Text color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,

    /// Bold flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,

    /// Italic flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
}

impl StyleHints {
    /// Whether no hint is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Font and geometry defaults for one slide role, optionally sourced
/// from a template document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleProfile {
    /// Primary font family.
    pub font_family: String,

    /// Fallback family when the primary font is unavailable.
    pub fallback_family: String,

    /// Default font size in points.
    pub font_size: f64,

    /// Default text color.
    pub color: Color,

    /// Bold by default.
    pub bold: bool,

    /// Italic by default.
    pub italic: bool,

    /// Placeholder geometry in target slide space, when the template
    /// provides one.
    pub placeholder: Option<Rect>,
}

impl StyleProfile {
    /// Built-in default profile for a role, used when no template is
    /// supplied or extraction fails.
    pub fn default_for(role: SlideRole) -> Self {
        match role {
            SlideRole::Title => Self {
                font_family: "Arial".to_string(),
                fallback_family: "Arial".to_string(),
                font_size: 32.0,
                color: Color::BLACK,
                bold: true,
                italic: false,
                placeholder: None,
            },
            SlideRole::Content => Self {
                font_family: "Arial".to_string(),
                fallback_family: "Arial".to_string(),
                font_size: 16.0,
                color: Color::BLACK,
                bold: false,
                italic: false,
                placeholder: None,
            },
        }
    }

    /// Resolve the final text style for a region: profile defaults with
    /// hints overriding field by field.
    pub fn resolve(&self, hints: &StyleHints) -> TextStyle {
        TextStyle {
            font_family: hints
                .font_family
                .clone()
                .unwrap_or_else(|| self.font_family.clone()),
            fallback_family: self.fallback_family.clone(),
            font_size: hints.font_size.unwrap_or(self.font_size),
            color: hints.color.unwrap_or(self.color),
            bold: hints.bold.unwrap_or(self.bold),
            italic: hints.italic.unwrap_or(self.italic),
        }
    }
}

/// The pair of profiles a conversion run works with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleProfiles {
    pub title: StyleProfile,
    pub content: StyleProfile,
}

impl StyleProfiles {
    /// Get the profile for a role.
    pub fn for_role(&self, role: SlideRole) -> &StyleProfile {
        match role {
            SlideRole::Title => &self.title,
            SlideRole::Content => &self.content,
        }
    }
}

impl Default for StyleProfiles {
    fn default() -> Self {
        Self {
            title: StyleProfile::default_for(SlideRole::Title),
            content: StyleProfile::default_for(SlideRole::Content),
        }
    }
}

/// Fully resolved style carried by a composed text box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: String,
    pub fallback_family: String,
    pub font_size: f64,
    pub color: Color,
    pub bold: bool,
    pub italic: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("FF8000"), Some(Color::new(255, 128, 0)));
        assert_eq!(Color::from_hex("#1a2b3c"), Some(Color::new(26, 43, 60)));
        assert_eq!(Color::from_hex("FFF"), None);
        assert_eq!(Color::from_hex("GG0000"), None);
        // 6 bytes but not 6 hex digits.
        assert_eq!(Color::from_hex("1A2B¢"), None);
        assert_eq!(Color::from_hex("a¡¡b"), None);
        assert_eq!(Color::new(26, 43, 60).to_hex(), "1A2B3C");
    }

    #[test]
    fn test_default_profiles() {
        let title = StyleProfile::default_for(SlideRole::Title);
        assert!(title.bold);
        let content = StyleProfile::default_for(SlideRole::Content);
        assert!(!content.bold);
        assert!(title.font_size > content.font_size);
    }

    #[test]
    fn test_resolve_hints_override_field_by_field() {
        let profile = StyleProfile::default_for(SlideRole::Content);
        let hints = StyleHints {
            font_size: Some(24.0),
            bold: Some(true),
            ..Default::default()
        };

        let style = profile.resolve(&hints);
        assert_eq!(style.font_size, 24.0);
        assert!(style.bold);
        // Untouched fields keep the profile defaults.
        assert_eq!(style.font_family, profile.font_family);
        assert_eq!(style.color, profile.color);
        assert!(!style.italic);
    }

    #[test]
    fn test_resolve_without_hints_is_profile() {
        let profile = StyleProfile::default_for(SlideRole::Title);
        let style = profile.resolve(&StyleHints::default());
        assert_eq!(style.font_family, profile.font_family);
        assert_eq!(style.font_size, profile.font_size);
        assert_eq!(style.bold, profile.bold);
    }
}

//! Template style extraction.
//!
//! Reads an optional PPTX template and pulls font family, size, color,
//! and placeholder geometry from the first placeholder shape matching a
//! slide role. Extraction is advisory: any failure (missing file,
//! unreadable archive, no matching placeholder) resolves to the built-in
//! default profile and never blocks a conversion.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::model::{Color, SlideRole, StyleProfile};

/// English Metric Units per point; PPTX geometry is stored in EMU.
const EMU_PER_POINT: f64 = 12_700.0;

/// Extract a style profile for `role` from a template PPTX.
///
/// `None` or any extraction failure yields [`StyleProfile::default_for`].
/// When multiple placeholders match, the first in document shape order
/// wins.
pub fn extract_profile(template: Option<&Path>, role: SlideRole) -> StyleProfile {
    let Some(path) = template else {
        return StyleProfile::default_for(role);
    };

    match try_extract(path, role) {
        Ok(Some(profile)) => {
            log::info!(
                "template {}: {:?} placeholder font '{}' ({}pt)",
                path.display(),
                role,
                profile.font_family,
                profile.font_size
            );
            profile
        }
        Ok(None) => {
            log::warn!(
                "template {} has no {:?} placeholder, using defaults",
                path.display(),
                role
            );
            StyleProfile::default_for(role)
        }
        Err(e) => {
            log::warn!(
                "failed to extract styles from {}: {}, using defaults",
                path.display(),
                e
            );
            StyleProfile::default_for(role)
        }
    }
}

fn try_extract(path: &Path, role: SlideRole) -> Result<Option<StyleProfile>> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    for slide_path in slide_entries(&archive) {
        let xml = read_archive_file(&mut archive, &slide_path)?;
        if let Some(capture) = find_placeholder(&xml, role)? {
            return Ok(Some(capture.into_profile(role)));
        }
    }

    Ok(None)
}

/// Slide XML entries in numeric order (slide1.xml, slide2.xml, ...).
fn slide_entries<R: Read + Seek>(archive: &ZipArchive<R>) -> Vec<String> {
    let mut entries: Vec<(usize, String)> = archive
        .file_names()
        .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
        .map(|name| (slide_number(name).unwrap_or(usize::MAX), name.to_string()))
        .collect();
    entries.sort();
    entries.into_iter().map(|(_, name)| name).collect()
}

fn slide_number(name: &str) -> Option<usize> {
    let stem = name.trim_end_matches(".xml");
    let digits: String = stem
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.chars().rev().collect::<String>().parse().ok()
}

fn read_archive_file<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive.by_name(path)?;
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::StyleExtraction(format!("failed to read '{}': {}", path, e)))?;
    Ok(content)
}

/// Style fields collected from one placeholder shape.
#[derive(Debug, Default)]
struct PlaceholderCapture {
    font_family: Option<String>,
    font_size: Option<f64>,
    color: Option<Color>,
    bold: Option<bool>,
    italic: Option<bool>,
    offset: Option<(f64, f64)>,
    extent: Option<(f64, f64)>,
}

impl PlaceholderCapture {
    fn into_profile(self, role: SlideRole) -> StyleProfile {
        let mut profile = StyleProfile::default_for(role);
        if let Some(family) = self.font_family {
            profile.font_family = family;
        }
        if let Some(size) = self.font_size {
            profile.font_size = size;
        }
        if let Some(color) = self.color {
            profile.color = color;
        }
        if let Some(bold) = self.bold {
            profile.bold = bold;
        }
        if let Some(italic) = self.italic {
            profile.italic = italic;
        }
        if let (Some((x, y)), Some((w, h))) = (self.offset, self.extent) {
            profile.placeholder = Some(Rect::new(x, y, w, h));
        }
        profile
    }
}

fn role_matches(role: SlideRole, ph_type: &str) -> bool {
    match role {
        SlideRole::Title => matches!(ph_type, "title" | "ctrTitle"),
        SlideRole::Content => matches!(ph_type, "body" | "subTitle" | "ftr"),
    }
}

/// Scan slide XML for the first placeholder shape matching `role` and
/// collect its font and geometry fields.
fn find_placeholder(xml: &str, role: SlideRole) -> Result<Option<PlaceholderCapture>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut current: Option<PlaceholderCapture> = None;
    let mut matched = false;
    let mut in_run_props = false;
    let mut font_locked = false;

    loop {
        let event = reader.read_event()?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let name = e.name();
                let is_empty = matches!(event, Event::Empty(_));

                match local_name(name.as_ref()) {
                    b"sp" if !is_empty => {
                        current = Some(PlaceholderCapture::default());
                        matched = false;
                        font_locked = false;
                    }
                    b"ph" => {
                        // A <p:ph> without a type attribute is a body
                        // placeholder per the OOXML default.
                        let mut ph_type = "body".to_string();
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"type" {
                                ph_type = String::from_utf8_lossy(&attr.value).to_string();
                            }
                        }
                        if current.is_some() {
                            matched = role_matches(role, &ph_type);
                        }
                    }
                    b"off" if matched => {
                        if let Some(capture) = current.as_mut() {
                            let x = emu_attr(e, b"x");
                            let y = emu_attr(e, b"y");
                            if let (Some(x), Some(y)) = (x, y) {
                                capture.offset = Some((x, y));
                            }
                        }
                    }
                    b"ext" if matched => {
                        if let Some(capture) = current.as_mut() {
                            let cx = emu_attr(e, b"cx");
                            let cy = emu_attr(e, b"cy");
                            if let (Some(cx), Some(cy)) = (cx, cy) {
                                capture.extent = Some((cx, cy));
                            }
                        }
                    }
                    b"rPr" | b"defRPr" if matched && !font_locked => {
                        if let Some(capture) = current.as_mut() {
                            for attr in e.attributes().flatten() {
                                match attr.key.as_ref() {
                                    b"sz" => {
                                        // Stored in hundredths of a point.
                                        if let Ok(sz) =
                                            String::from_utf8_lossy(&attr.value).parse::<f64>()
                                        {
                                            capture.font_size.get_or_insert(sz / 100.0);
                                        }
                                    }
                                    b"b" => {
                                        capture.bold.get_or_insert(flag_value(&attr.value));
                                    }
                                    b"i" => {
                                        capture.italic.get_or_insert(flag_value(&attr.value));
                                    }
                                    _ => {}
                                }
                            }
                        }
                        in_run_props = !is_empty;
                    }
                    b"latin" if matched && in_run_props && !font_locked => {
                        if let Some(capture) = current.as_mut() {
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"typeface" {
                                    capture
                                        .font_family
                                        .get_or_insert_with(|| {
                                            String::from_utf8_lossy(&attr.value).to_string()
                                        });
                                }
                            }
                        }
                    }
                    b"srgbClr" if matched && in_run_props && !font_locked => {
                        if let Some(capture) = current.as_mut() {
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"val" {
                                    if let Some(color) =
                                        Color::from_hex(&String::from_utf8_lossy(&attr.value))
                                    {
                                        capture.color.get_or_insert(color);
                                    }
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::End(ref e) => match local_name(e.name().as_ref()) {
                b"sp" => {
                    if matched {
                        return Ok(current.take());
                    }
                    current = None;
                }
                b"rPr" | b"defRPr" => {
                    // First run's properties win; later runs are noise.
                    if in_run_props {
                        in_run_props = false;
                        if let Some(capture) = current.as_ref() {
                            if capture.font_family.is_some() || capture.font_size.is_some() {
                                font_locked = true;
                            }
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(None)
}

fn emu_attr(e: &quick_xml::events::BytesStart, key: &[u8]) -> Option<f64> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            return String::from_utf8_lossy(&attr.value)
                .parse::<f64>()
                .ok()
                .map(|emu| emu / EMU_PER_POINT);
        }
    }
    None
}

fn flag_value(value: &[u8]) -> bool {
    matches!(value, b"1" | b"true")
}

/// Strip the namespace prefix from an XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

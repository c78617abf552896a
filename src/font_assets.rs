use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use fontdue::layout::{CoordinateSystem, GlyphPosition, Layout, LayoutSettings, TextStyle};
use fontdue::{Font, FontSettings};
use serde_json::json;

use crate::error_codes::CodedError;
use crate::measure::Typeface;
use crate::typefaces::FontConfig;

pub const FONT_MISSING: &str = "FONT_MISSING";
pub const DEFAULT_DATE_FONT_FILE: &str = "date.ttf";

/// Parsed fonts for every typeface preset found on disk plus the date font.
/// Presets whose file is missing draw with the date font instead.
pub struct FontLibrary {
    time_fonts: HashMap<&'static str, Font>,
    date_font: Font,
}

impl FontLibrary {
    pub fn load(font_dir: &Path, date_font_file: &str) -> Result<Self> {
        let date_path = font_dir.join(date_font_file);
        if !date_path.is_file() {
            return Err(anyhow!(CodedError::resource(
                FONT_MISSING,
                format!("date font '{}' not found", date_path.display()),
            )
            .with_details(json!({ "path": date_path.display().to_string() }))));
        }
        let date_font = read_font(&date_path)?;
        let mut library = Self::new(date_font);

        for config in FontConfig::all() {
            let path = font_dir.join(config.asset_id);
            if !path.is_file() {
                tracing::debug!(
                    typeface = config.display_name,
                    path = %path.display(),
                    "typeface file not present"
                );
                continue;
            }
            library.insert_time_font(config.asset_id, read_font(&path)?);
        }

        if library.time_fonts.is_empty() {
            tracing::warn!(
                dir = %font_dir.display(),
                "no typeface preset files found, time digits use the date font"
            );
        }
        Ok(library)
    }

    pub fn new(date_font: Font) -> Self {
        Self {
            time_fonts: HashMap::new(),
            date_font,
        }
    }

    pub fn insert_time_font(&mut self, asset_id: &'static str, font: Font) {
        self.time_fonts.insert(asset_id, font);
    }

    pub fn font(&self, typeface: Typeface) -> &Font {
        match typeface {
            Typeface::Time(asset_id) => self.time_fonts.get(asset_id).unwrap_or(&self.date_font),
            Typeface::Date => &self.date_font,
        }
    }
}

pub fn parse_font(bytes: Vec<u8>, label: &str) -> Result<Font> {
    Font::from_bytes(bytes, FontSettings::default())
        .map_err(|error| anyhow!("failed to parse font {label}: {error}"))
}

fn read_font(path: &Path) -> Result<Font> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read font file '{}'", path.display()))?;
    parse_font(bytes, &path.display().to_string())
}

pub fn ensure_supported_codepoints(font: &Font, text: &str, font_name: &str) -> Result<()> {
    for ch in text.chars() {
        if ch == ' ' {
            continue;
        }
        if font.lookup_glyph_index(ch) == 0 {
            return Err(anyhow!(
                "unsupported codepoint U+{:04X} ({}) in {}",
                ch as u32,
                ch.escape_default(),
                font_name
            ));
        }
    }
    Ok(())
}

/// Distance from the top of a laid-out line to its baseline.
pub fn baseline_offset(font: &Font, size: f32) -> f32 {
    font.horizontal_line_metrics(size)
        .map_or(size, |metrics| metrics.ascent)
}

pub fn layout_line(font: &Font, text: &str, size: f32) -> Vec<GlyphPosition> {
    let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
    layout.reset(&LayoutSettings {
        x: 0.0,
        y: 0.0,
        max_width: None,
        max_height: None,
        horizontal_align: fontdue::layout::HorizontalAlign::Left,
        vertical_align: fontdue::layout::VerticalAlign::Top,
        line_height: 1.0,
        wrap_style: fontdue::layout::WrapStyle::Letter,
        wrap_hard_breaks: false,
    });
    layout.append(&[font], &TextStyle::new(text, size, 0));
    layout.glyphs().clone()
}

/// Union of the glyph bitmaps of one unscaled line, relative to the start of
/// its baseline (negative `top` is above the baseline).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InkBounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl InkBounds {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

pub fn ink_bounds(font: &Font, glyphs: &[GlyphPosition], size: f32) -> Option<InkBounds> {
    let baseline = baseline_offset(font, size);
    glyphs
        .iter()
        .filter(|glyph| glyph.width > 0 && glyph.height > 0)
        .map(|glyph| InkBounds {
            left: glyph.x,
            top: glyph.y - baseline,
            right: glyph.x + glyph.width as f32,
            bottom: glyph.y - baseline + glyph.height as f32,
        })
        .reduce(|a, b| InkBounds {
            left: a.left.min(b.left),
            top: a.top.min(b.top),
            right: a.right.max(b.right),
            bottom: a.bottom.max(b.bottom),
        })
}

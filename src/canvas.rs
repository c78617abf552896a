use std::path::Path;
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use tiny_skia::{
    BlendMode, FillRule, FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint,
    PremultipliedColorU8, Transform,
};

use crate::color::Color;
use crate::font_assets::{
    baseline_offset, ensure_supported_codepoints, ink_bounds, layout_line, FontLibrary,
};
use crate::geometry::{Point, RoundedOutline};
use crate::measure::TextStyle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPaint {
    pub color: Color,
    pub antialias: bool,
}

/// Drawing surface the face paints into. Transforms stack like a platform
/// canvas: `rotate` applies to everything drawn until the matching `restore`.
pub trait FaceCanvas {
    fn save(&mut self);
    fn restore(&mut self);
    fn rotate(&mut self, degrees: f32, center: Point);
    fn fill(&mut self, color: Color);
    /// `origin` is the left end of the text baseline.
    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle, paint: TextPaint);
    fn fill_outline(&mut self, outline: &RoundedOutline, color: Color);
}

/// Software canvas: tiny-skia pixmap, glyphs rasterized by fontdue.
pub struct PixmapCanvas {
    pixmap: Pixmap,
    fonts: Rc<FontLibrary>,
    transform: Transform,
    saved: Vec<Transform>,
}

impl PixmapCanvas {
    pub fn new(width: u32, height: u32, fonts: Rc<FontLibrary>) -> Result<Self> {
        let pixmap = Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("failed to allocate pixmap {width}x{height}"))?;
        Ok(Self {
            pixmap,
            fonts,
            transform: Transform::identity(),
            saved: Vec::new(),
        })
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|error| anyhow!("failed to encode png: {error}"))
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        let bytes = self.encode_png()?;
        std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
    }

    fn rasterize_line(
        &self,
        text: &str,
        style: &TextStyle,
        paint: TextPaint,
    ) -> Option<(Pixmap, Point)> {
        let font = self.fonts.font(style.typeface);
        if let Err(error) = ensure_supported_codepoints(font, text, "face canvas") {
            tracing::warn!(%error, "drawing text with missing glyphs");
        }

        let glyphs = layout_line(font, text, style.size);
        let ink = ink_bounds(font, &glyphs, style.size)?;
        let width = ink.width().ceil() as u32;
        let height = ink.height().ceil() as u32;
        let mut line = Pixmap::new(width, height)?;
        let baseline = baseline_offset(font, style.size);
        let [red, green, blue, alpha] = paint.color.to_rgba8();

        for glyph in glyphs.iter().filter(|glyph| glyph.width > 0 && glyph.height > 0) {
            let (_, bitmap) = font.rasterize_config(glyph.key);
            let origin_x = (glyph.x - ink.left).round() as i32;
            let origin_y = (glyph.y - baseline - ink.top).round() as i32;

            for row in 0..glyph.height {
                let py = origin_y + row as i32;
                if py < 0 || py >= height as i32 {
                    continue;
                }
                for col in 0..glyph.width {
                    let px = origin_x + col as i32;
                    if px < 0 || px >= width as i32 {
                        continue;
                    }
                    let mask = bitmap[row * glyph.width + col];
                    let coverage = match (paint.antialias, mask) {
                        (true, mask) => mask,
                        (false, mask) if mask >= 128 => 255,
                        (false, _) => 0,
                    };
                    if coverage == 0 {
                        continue;
                    }

                    let a = ((u16::from(coverage) * u16::from(alpha)) / 255) as u8;
                    let idx = (py as u32 * width + px as u32) as usize;
                    let pixels = line.pixels_mut();
                    if pixels[idx].alpha() >= a {
                        continue;
                    }
                    pixels[idx] = PremultipliedColorU8::from_rgba(
                        premultiply(red, a),
                        premultiply(green, a),
                        premultiply(blue, a),
                        a,
                    )
                    .unwrap_or(PremultipliedColorU8::TRANSPARENT);
                }
            }
        }

        Some((line, Point::new(ink.left, ink.top)))
    }
}

fn premultiply(channel: u8, alpha: u8) -> u8 {
    ((u16::from(channel) * u16::from(alpha) + 127) / 255) as u8
}

impl FaceCanvas for PixmapCanvas {
    fn save(&mut self) {
        self.saved.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(transform) = self.saved.pop() {
            self.transform = transform;
        }
    }

    fn rotate(&mut self, degrees: f32, center: Point) {
        self.transform = self.transform.pre_rotate_at(degrees, center.x, center.y);
    }

    fn fill(&mut self, color: Color) {
        self.pixmap.fill(color.to_skia());
    }

    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle, paint: TextPaint) {
        if text.is_empty() {
            return;
        }
        let Some((line, ink_origin)) = self.rasterize_line(text, style, paint) else {
            return;
        };

        let transform = self
            .transform
            .pre_translate(origin.x, origin.y)
            .pre_scale(style.scale_x, 1.0)
            .pre_translate(ink_origin.x, ink_origin.y);
        let quality = if paint.antialias {
            FilterQuality::Bilinear
        } else {
            FilterQuality::Nearest
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            line.as_ref(),
            &PixmapPaint {
                opacity: 1.0,
                blend_mode: BlendMode::SourceOver,
                quality,
            },
            transform,
            None,
        );
    }

    fn fill_outline(&mut self, outline: &RoundedOutline, color: Color) {
        if outline.rect.is_empty() {
            return;
        }
        let rect = outline.rect.to_rect();
        let radius = outline.effective_radius();
        let (left, top, right, bottom) = (rect.left, rect.top, rect.right, rect.bottom);

        // start mid-edge so every corner gets the same rounding
        let mut builder = PathBuilder::new();
        builder.move_to((left + right) / 2.0, top);
        builder.line_to(right - radius, top);
        builder.quad_to(right, top, right, top + radius);
        builder.line_to(right, bottom - radius);
        builder.quad_to(right, bottom, right - radius, bottom);
        builder.line_to(left + radius, bottom);
        builder.quad_to(left, bottom, left, bottom - radius);
        builder.line_to(left, top + radius);
        builder.quad_to(left, top, left + radius, top);
        builder.close();
        let Some(path) = builder.finish() else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color(color.to_skia());
        paint.anti_alias = true;
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, self.transform, None);
    }
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasOp {
    Save,
    Restore,
    Rotate { degrees: f32, center: Point },
    Fill(Color),
    Text {
        text: String,
        origin: Point,
        style: TextStyle,
        paint: TextPaint,
    },
    Outline {
        outline: RoundedOutline,
        color: Color,
    },
}

/// Canvas that only records calls; used to inspect what a frame draws.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub ops: Vec<CanvasOp>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                CanvasOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn text_op(&self, wanted: &str) -> Option<&CanvasOp> {
        self.ops
            .iter()
            .find(|op| matches!(op, CanvasOp::Text { text, .. } if text == wanted))
    }
}

impl FaceCanvas for RecordingCanvas {
    fn save(&mut self) {
        self.ops.push(CanvasOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(CanvasOp::Restore);
    }

    fn rotate(&mut self, degrees: f32, center: Point) {
        self.ops.push(CanvasOp::Rotate { degrees, center });
    }

    fn fill(&mut self, color: Color) {
        self.ops.push(CanvasOp::Fill(color));
    }

    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle, paint: TextPaint) {
        self.ops.push(CanvasOp::Text {
            text: text.to_owned(),
            origin,
            style: *style,
            paint,
        });
    }

    fn fill_outline(&mut self, outline: &RoundedOutline, color: Color) {
        self.ops.push(CanvasOp::Outline {
            outline: *outline,
            color,
        });
    }
}

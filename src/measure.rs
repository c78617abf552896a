use std::rc::Rc;

use serde::Serialize;

use crate::font_assets::{ink_bounds, layout_line, FontLibrary};

/// Which font a piece of text is set in. Time digits use the preset's
/// asset; the date, AM/PM and complication text use the date font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Typeface {
    Time(&'static str),
    Date,
}

/// Everything a measurer or canvas needs to set one string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextStyle {
    pub typeface: Typeface,
    pub size: f32,
    pub scale_x: f32,
}

impl TextStyle {
    pub fn new(typeface: Typeface, size: f32) -> Self {
        Self {
            typeface,
            size,
            scale_x: 1.0,
        }
    }

    pub fn with_scale_x(mut self, scale_x: f32) -> Self {
        self.scale_x = scale_x;
        self
    }
}

/// Pixel size of the ink of a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TextSize {
    pub width: i32,
    pub height: i32,
}

/// Text measurement supplied by the host platform. Implementations must be
/// pure: equal inputs always give equal sizes.
pub trait TextMeasurer {
    fn measure(&self, style: &TextStyle, text: &str) -> TextSize;
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for Rc<T> {
    fn measure(&self, style: &TextStyle, text: &str) -> TextSize {
        (**self).measure(style, text)
    }
}

/// Font-free measurer with fixed per-character advances. Good enough for
/// layout previews and hit-testing when no font files are at hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimateMeasurer;

impl EstimateMeasurer {
    const DIGIT_ADVANCE: f32 = 0.6;
    const SPACE_ADVANCE: f32 = 0.3;
    const LETTER_ADVANCE: f32 = 0.65;
    const CAP_HEIGHT: f32 = 0.72;

    fn advance(ch: char) -> f32 {
        match ch {
            '0'..='9' => Self::DIGIT_ADVANCE,
            ' ' => Self::SPACE_ADVANCE,
            _ => Self::LETTER_ADVANCE,
        }
    }
}

impl TextMeasurer for EstimateMeasurer {
    fn measure(&self, style: &TextStyle, text: &str) -> TextSize {
        if text.is_empty() {
            return TextSize::default();
        }
        let advance: f32 = text.chars().map(Self::advance).sum();
        TextSize {
            width: (advance * style.size * style.scale_x).round() as i32,
            height: (Self::CAP_HEIGHT * style.size).round() as i32,
        }
    }
}

/// Measures ink bounds with fontdue, scaled horizontally by `scale_x`.
pub struct FontdueMeasurer {
    fonts: Rc<FontLibrary>,
}

impl FontdueMeasurer {
    pub fn new(fonts: Rc<FontLibrary>) -> Self {
        Self { fonts }
    }
}

impl TextMeasurer for FontdueMeasurer {
    fn measure(&self, style: &TextStyle, text: &str) -> TextSize {
        let font = self.fonts.font(style.typeface);
        let glyphs = layout_line(font, text, style.size);
        match ink_bounds(font, &glyphs, style.size) {
            Some(bounds) => TextSize {
                width: (bounds.width() * style.scale_x).ceil() as i32,
                height: bounds.height().ceil() as i32,
            },
            None => TextSize::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EstimateMeasurer, TextMeasurer, TextStyle, Typeface};

    #[test]
    fn estimate_scales_width_but_not_height() {
        let style = TextStyle::new(Typeface::Time("limelight.ttf"), 100.0);
        let plain = EstimateMeasurer.measure(&style, "12");
        let squeezed = EstimateMeasurer.measure(&style.with_scale_x(0.5), "12");
        assert_eq!(plain.width, 120);
        assert_eq!(squeezed.width, 60);
        assert_eq!(plain.height, squeezed.height);
        assert_eq!(plain.height, 72);
    }

    #[test]
    fn estimate_of_empty_text_is_zero() {
        let style = TextStyle::new(Typeface::Date, 10.0);
        assert_eq!(EstimateMeasurer.measure(&style, "").width, 0);
    }
}

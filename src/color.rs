use std::fmt;

use anyhow::{anyhow, Result};
use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::json;

use crate::error_codes::CodedError;

/// Packed `0xAARRGGBB` color, the representation the settings store persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);
    pub const LTGRAY: Color = Color(0xFFCC_CCCC);
    pub const DKGRAY: Color = Color(0xFF44_4444);
    pub const GREEN: Color = Color(0xFF00_FF00);
    pub const YELLOW: Color = Color(0xFFFF_FF00);

    pub const fn from_argb(alpha: u8, red: u8, green: u8, blue: u8) -> Self {
        Self((alpha as u32) << 24 | (red as u32) << 16 | (green as u32) << 8 | blue as u32)
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        [self.red(), self.green(), self.blue(), self.alpha()]
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.red(), self.green(), self.blue(), self.alpha())
    }

    /// Accepts `#RRGGBB` (opaque) and `#AARRGGBB`.
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let parsed = match digits.len() {
            6 => u32::from_str_radix(digits, 16).ok().map(|rgb| 0xFF00_0000 | rgb),
            8 => u32::from_str_radix(digits, 16).ok(),
            _ => None,
        };
        parsed.map(Self).ok_or_else(|| {
            anyhow!(CodedError::usage(
                "INVALID_COLOR",
                format!("invalid color '{value}', expected #RRGGBB or #AARRGGBB"),
            )
            .with_details(json!({ "provided": value })))
        })
    }

    pub fn to_hsv(self) -> Hsv {
        let r = f32::from(self.red()) / 255.0;
        let g = f32::from(self.green()) / 255.0;
        let b = f32::from(self.blue()) / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let saturation = if max > 0.0 { delta / max } else { 0.0 };
        let mut hue = if delta == 0.0 {
            0.0
        } else if max == r {
            (g - b) / delta
        } else if max == g {
            2.0 + (b - r) / delta
        } else {
            4.0 + (r - g) / delta
        };
        hue *= 60.0;
        if hue < 0.0 {
            hue += 360.0;
        }

        Hsv {
            hue,
            saturation,
            value: max,
        }
    }

    pub fn from_hsv(alpha: u8, hsv: Hsv) -> Self {
        let value = channel(hsv.value);
        if hsv.saturation <= 0.0 {
            return Self::from_argb(alpha, value, value, value);
        }

        let sector = if hsv.hue < 0.0 || hsv.hue >= 360.0 {
            0.0
        } else {
            hsv.hue / 60.0
        };
        let whole = sector.floor();
        let fraction = sector - whole;
        let v = hsv.value;
        let s = hsv.saturation.min(1.0);
        let p = channel(v * (1.0 - s));
        let q = channel(v * (1.0 - s * fraction));
        let t = channel(v * (1.0 - s * (1.0 - fraction)));

        let (r, g, b) = match whole as u32 {
            0 => (value, t, p),
            1 => (q, value, p),
            2 => (p, value, t),
            3 => (p, q, value),
            4 => (t, p, value),
            _ => (value, p, q),
        };
        Self::from_argb(alpha, r, g, b)
    }
}

fn channel(unit: f32) -> u8 {
    (unit.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Hue in degrees `[0, 360)`, saturation and value in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
}

/// Same brightness as `base`, stripped of hue and saturation.
pub fn white_of(base: Color) -> Color {
    let hsv = base.to_hsv();
    Color::from_hsv(
        base.alpha(),
        Hsv {
            hue: 0.0,
            saturation: 0.0,
            value: hsv.value,
        },
    )
}

/// Keeps hue, saturation and alpha of `color`, takes the HSV value of `value_source`.
pub fn apply_color_value(color: Color, value_source: Color) -> Color {
    let own = color.to_hsv();
    let source = value_source.to_hsv();
    Color::from_hsv(
        color.alpha(),
        Hsv {
            hue: own.hue,
            saturation: own.saturation,
            value: source.value,
        },
    )
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alpha() == 0xFF {
            write!(f, "#{:06X}", self.0 & 0x00FF_FFFF)
        } else {
            write!(f, "#{:08X}", self.0)
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::parse(&raw).map_err(|error| D::Error::custom(format!("{error:#}")))
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_color_value, white_of, Color, Hsv};

    #[test]
    fn parse_accepts_opaque_and_alpha_forms() {
        assert_eq!(Color::parse("#00FF00").unwrap(), Color::GREEN);
        assert_eq!(Color::parse("80FFFFFF").unwrap(), Color(0x80FF_FFFF));
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("#GGGGGG").is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for color in [Color::YELLOW, Color(0x7F12_3456)] {
            assert_eq!(Color::parse(&color.to_string()).unwrap(), color);
        }
    }

    #[test]
    fn hsv_of_primary_colors() {
        let green = Color::GREEN.to_hsv();
        assert_eq!(green.hue, 120.0);
        assert_eq!(green.saturation, 1.0);
        assert_eq!(green.value, 1.0);

        let gray = Color::LTGRAY.to_hsv();
        assert_eq!(gray.saturation, 0.0);
        assert!((gray.value - 0.8).abs() < 1e-6);
    }

    #[test]
    fn hsv_conversion_recovers_rgb() {
        for color in [
            Color(0xFF12_3456),
            Color(0xFFFF_8000),
            Color(0xFF80_00FF),
            Color::DKGRAY,
        ] {
            let back = Color::from_hsv(color.alpha(), color.to_hsv());
            assert_eq!(back, color, "{color}");
        }
    }

    #[test]
    fn white_of_keeps_only_brightness() {
        assert_eq!(white_of(Color::GREEN), Color::WHITE);
        let dim = Color(0x8000_4000);
        assert_eq!(white_of(dim), Color(0x8040_4040));
    }

    #[test]
    fn apply_color_value_preserves_hue_and_saturation() {
        let date = Color::YELLOW;
        let dark_blue = Color(0xFF00_0080);
        let recolored = apply_color_value(date, dark_blue);
        let hsv = recolored.to_hsv();
        assert_eq!(hsv.hue, 60.0);
        assert_eq!(hsv.saturation, 1.0);
        assert!((hsv.value - dark_blue.to_hsv().value).abs() < 1.0 / 255.0);
        assert_eq!(recolored, Color(0xFF80_8000));
    }

    #[test]
    fn out_of_range_hue_wraps_to_red() {
        let color = Color::from_hsv(
            0xFF,
            Hsv {
                hue: 360.0,
                saturation: 1.0,
                value: 1.0,
            },
        );
        assert_eq!(color, Color(0xFFFF_0000));
    }
}

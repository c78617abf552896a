use crate::color::{apply_color_value, white_of, Color};
use crate::complications::SlotId;
use crate::settings::Settings;
use crate::typefaces::FontConfig;

/// Typeface, colors and mode flags for one display mode. Immutable once
/// built: a settings change produces new veneers rather than editing these.
#[derive(Debug, Clone, PartialEq)]
pub struct Veneer {
    pub left_handed: bool,
    pub typeface: &'static FontConfig,
    pub hours_color: Color,
    pub minutes_color: Color,
    pub seconds_color: Color,
    pub am_pm_color: Color,
    pub date_color: Color,
    pub complication_icon_color: Color,
    pub complication_text_color: Color,
    pub is24h: bool,
    pub larger_date: bool,
    pub ambient: bool,
}

impl Veneer {
    pub const AMBIENT_COLOR: Color = Color::WHITE;
    pub const AMBIENT_COLOR_SOFT: Color = Color::LTGRAY;
    /// Tilt of the whole face, in degrees.
    pub const ANGLE: f32 = 20.0;

    pub fn from_settings(settings: &Settings, ambient: bool) -> Self {
        let colorful = !ambient || settings.colorful_ambient;
        let pick = |configured: Color, ambient_tone: Color| {
            if colorful {
                configured
            } else {
                ambient_tone
            }
        };

        Self {
            left_handed: settings.left_handed,
            typeface: FontConfig::by_name(&settings.typeface),
            hours_color: pick(settings.hours_color, Self::AMBIENT_COLOR_SOFT),
            minutes_color: pick(settings.minutes_color, Self::AMBIENT_COLOR),
            seconds_color: pick(settings.seconds_color, Self::AMBIENT_COLOR_SOFT),
            am_pm_color: pick(settings.am_pm_color, Self::AMBIENT_COLOR_SOFT),
            date_color: pick(settings.date_color, Self::AMBIENT_COLOR),
            complication_icon_color: pick(settings.complication_icon_color, Self::AMBIENT_COLOR),
            complication_text_color: pick(settings.complication_text_color, Self::AMBIENT_COLOR),
            is24h: settings.is24h,
            larger_date: settings.larger_date,
            ambient,
        }
    }

    /// Handedness mirrors the tilt: same magnitude, opposite sign.
    pub fn angle(&self) -> f32 {
        if self.left_handed {
            Self::ANGLE
        } else {
            -Self::ANGLE
        }
    }

    pub fn visible_slots(&self) -> Vec<SlotId> {
        SlotId::all().collect()
    }

    /// Recolors the face around `base`. Minutes and the complication icon
    /// get a neutral tone of the same brightness; the date keeps its own
    /// hue and saturation and only follows the brightness of `base`.
    pub fn with_color_scheme(&self, base: Color) -> Self {
        Self {
            hours_color: base,
            minutes_color: white_of(base),
            seconds_color: base,
            am_pm_color: base,
            complication_icon_color: white_of(base),
            complication_text_color: base,
            date_color: apply_color_value(self.date_color, base),
            ..self.clone()
        }
    }

    /// Persists handedness and colors. Ambient veneers are derived data and
    /// never write back.
    pub fn write_to(&self, settings: &mut Settings) {
        if self.ambient {
            return;
        }
        settings.left_handed = self.left_handed;
        settings.hours_color = self.hours_color;
        settings.minutes_color = self.minutes_color;
        settings.seconds_color = self.seconds_color;
        settings.am_pm_color = self.am_pm_color;
        settings.date_color = self.date_color;
        settings.complication_icon_color = self.complication_icon_color;
        settings.complication_text_color = self.complication_text_color;
    }
}

use serde::Serialize;

/// A named typeface preset. The horizontal scale factors compress the
/// (mostly very wide) display fonts so that hours and minutes fit side by
/// side; single-digit hours get their own factor so they can be tuned
/// independently of two-digit hours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontConfig {
    pub display_name: &'static str,
    pub asset_id: &'static str,
    pub y_size_ratio: f32,
    pub hour_scale_x: f32,
    pub hour_scale_x_single_digit: f32,
    pub minutes_scale_x: f32,
    pub seconds_scale_x: f32,
}

pub const LIMELIGHT: FontConfig = FontConfig {
    display_name: "Limelight",
    asset_id: "limelight.ttf",
    y_size_ratio: 1.0,
    hour_scale_x: 0.4,
    hour_scale_x_single_digit: 0.4,
    minutes_scale_x: 0.33,
    seconds_scale_x: 0.4,
};

pub const SWEET_HIPSTER: FontConfig = FontConfig {
    display_name: "Sweet Hipster",
    asset_id: "sweethipster.ttf",
    y_size_ratio: 1.3,
    hour_scale_x: 0.9,
    hour_scale_x_single_digit: 0.9,
    minutes_scale_x: 0.7,
    seconds_scale_x: 0.6,
};

pub const GRAFIK_TEXT: FontConfig = FontConfig {
    display_name: "Grafik Text",
    asset_id: "GrafikText.ttf",
    y_size_ratio: 1.0,
    hour_scale_x: 0.5,
    hour_scale_x_single_digit: 0.5,
    minutes_scale_x: 0.5,
    seconds_scale_x: 0.5,
};

pub const FENWICK_WOODTYPE: FontConfig = FontConfig {
    display_name: "Fenwick Woodtype",
    asset_id: "FenwickWoodtype.ttf",
    y_size_ratio: 1.0,
    hour_scale_x: 0.7,
    hour_scale_x_single_digit: 0.7,
    minutes_scale_x: 0.6,
    seconds_scale_x: 0.5,
};

pub const ORDINARY: FontConfig = FontConfig {
    display_name: "Ordinary",
    asset_id: "Ordinary.ttf",
    y_size_ratio: 1.2,
    hour_scale_x: 0.6,
    hour_scale_x_single_digit: 0.6,
    minutes_scale_x: 0.5,
    seconds_scale_x: 0.5,
};

pub const BEBAS_KAI: FontConfig = FontConfig {
    display_name: "Bebas Kai",
    asset_id: "BebasKai.ttf",
    y_size_ratio: 1.0,
    hour_scale_x: 0.6,
    hour_scale_x_single_digit: 0.6,
    minutes_scale_x: 0.5,
    seconds_scale_x: 0.5,
};

pub const DEFAULT_TYPEFACE: &FontConfig = &LIMELIGHT;

static ALL: [FontConfig; 6] = [
    LIMELIGHT,
    SWEET_HIPSTER,
    GRAFIK_TEXT,
    FENWICK_WOODTYPE,
    ORDINARY,
    BEBAS_KAI,
];

impl FontConfig {
    pub fn all() -> &'static [FontConfig] {
        &ALL
    }

    /// Exact display-name lookup. Unknown names fall back to
    /// [`DEFAULT_TYPEFACE`] instead of failing: a stale settings value must
    /// never keep the face from drawing.
    pub fn by_name(display_name: &str) -> &'static FontConfig {
        match ALL.iter().find(|config| config.display_name == display_name) {
            Some(config) => config,
            None => {
                tracing::warn!(
                    typeface = display_name,
                    fallback = DEFAULT_TYPEFACE.display_name,
                    "unknown typeface preset, using default"
                );
                DEFAULT_TYPEFACE
            }
        }
    }
}

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::color::Color;
use crate::error_codes::CodedError;
use crate::typefaces::DEFAULT_TYPEFACE;

const DEFAULT_CONFIG_DIR_NAME: &str = "slanted";
const DEFAULT_SETTINGS_FILE_NAME: &str = "settings.yaml";

/// Point-in-time snapshot of the persisted watch face settings.
///
/// Every key is optional in the file; missing keys take the factory default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Settings {
    pub left_handed: bool,
    pub colorful_ambient: bool,
    pub hours_color: Color,
    pub minutes_color: Color,
    pub seconds_color: Color,
    pub am_pm_color: Color,
    pub date_color: Color,
    pub complication_icon_color: Color,
    pub complication_text_color: Color,
    pub larger_date: bool,
    pub typeface: String,
    pub is24h: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            left_handed: true,
            colorful_ambient: true,
            hours_color: Color::GREEN,
            minutes_color: Color::WHITE,
            seconds_color: Color::GREEN,
            am_pm_color: Color::GREEN,
            date_color: Color::YELLOW,
            complication_icon_color: Color::WHITE,
            complication_text_color: Color::GREEN,
            larger_date: false,
            typeface: DEFAULT_TYPEFACE.display_name.to_owned(),
            is24h: true,
        }
    }
}

impl Settings {
    /// Resets every key to its factory default.
    pub fn apply_default(&mut self) {
        *self = Self::default();
    }
}

pub fn load_settings(path: &Path) -> Result<Settings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings {}", path.display()))?;
    parse_settings(&contents).with_context(|| format!("invalid settings file {}", path.display()))
}

pub fn parse_settings(contents: &str) -> Result<Settings> {
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(contents).map_err(|error| {
        let location = error
            .location()
            .map(|location| format!("line {}, column {}", location.line(), location.column()))
            .unwrap_or_else(|| "unknown location".to_owned());
        anyhow!(CodedError::usage(
            "SETTINGS_PARSE",
            format!("failed to parse settings yaml at {location}: {error}"),
        )
        .with_details(json!({ "location": location })))
    })
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create settings directory {}", parent.display()))?;
    }
    let yaml = serde_yaml::to_string(settings).context("failed to serialize settings")?;
    fs::write(path, yaml).with_context(|| format!("failed to write settings {}", path.display()))
}

/// Settings from an explicit file, or from the user config directory. An
/// explicit path must exist; the default one may not.
pub fn resolve_settings(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        return load_settings(path);
    }

    let path = default_settings_path()?;
    if path.is_file() {
        tracing::debug!(path = %path.display(), "loading settings");
        load_settings(&path)
    } else {
        tracing::debug!(path = %path.display(), "no settings file, using defaults");
        Ok(Settings::default())
    }
}

pub fn default_settings_path() -> Result<PathBuf> {
    Ok(user_config_dir()?
        .join(DEFAULT_CONFIG_DIR_NAME)
        .join(DEFAULT_SETTINGS_FILE_NAME))
}

fn user_config_dir() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        if let Some(path) = env::var_os("APPDATA") {
            return Ok(PathBuf::from(path));
        }
        bail!("unable to resolve user config directory on Windows");
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = env::var_os("HOME") {
            return Ok(PathBuf::from(home)
                .join("Library")
                .join("Application Support"));
        }
        bail!("unable to resolve HOME for macOS config directory");
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    {
        if let Some(path) = env::var_os("XDG_CONFIG_HOME") {
            return Ok(PathBuf::from(path));
        }
        if let Some(home) = env::var_os("HOME") {
            return Ok(PathBuf::from(home).join(".config"));
        }
        bail!("unable to resolve user config directory on unix");
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_settings, Settings};
    use crate::color::Color;
    use crate::error_codes::find_coded_error;

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(parse_settings("").unwrap(), Settings::default());
        assert_eq!(parse_settings("\n  \n").unwrap(), Settings::default());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let settings = parse_settings(
            r##"
left-handed: false
hours-color: "#FF0000"
typeface: Bebas Kai
"##,
        )
        .expect("settings should parse");

        assert!(!settings.left_handed);
        assert_eq!(settings.hours_color, Color(0xFFFF_0000));
        assert_eq!(settings.typeface, "Bebas Kai");
        assert_eq!(settings.date_color, Color::YELLOW);
        assert!(settings.is24h);
    }

    #[test]
    fn unknown_key_is_a_coded_parse_error() {
        let error = parse_settings("hour-colour: \"#FF0000\"\n").unwrap_err();
        let coded = find_coded_error(&error).expect("coded error");
        assert_eq!(coded.code, "SETTINGS_PARSE");
        assert!(coded.message.contains("hour-colour"), "{}", coded.message);
    }

    #[test]
    fn malformed_color_is_rejected() {
        let error = parse_settings("date-color: yellow\n").unwrap_err();
        assert!(format!("{error:#}").contains("invalid color"), "{error:#}");
    }

    #[test]
    fn apply_default_resets_everything() {
        let mut settings = Settings {
            larger_date: true,
            is24h: false,
            ..Settings::default()
        };
        settings.apply_default();
        assert_eq!(settings, Settings::default());
    }
}

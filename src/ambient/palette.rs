//! Themes and particle colors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Palette used with the light theme.
pub const LIGHT_PALETTE: [&str; 4] = ["#6fadff", "#a2d2ff", "#ffafcc", "#ffc8dd"];

/// Palette used with the dark theme.
pub const DARK_PALETTE: [&str; 4] = ["#9c00d0", "#3a0ca3", "#7209b7", "#f72585"];

/// Page theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light background, pastel particles.
    #[default]
    Light,
    /// Dark background, saturated particles.
    Dark,
}

impl Theme {
    /// Colors for this theme.
    pub fn palette(self) -> &'static [&'static str] {
        match self {
            Theme::Light => &LIGHT_PALETTE,
            Theme::Dark => &DARK_PALETTE,
        }
    }

    /// Fill color for a particle of the given radius.
    ///
    /// Depends only on `floor(radius)`, so a particle keeps its color for
    /// life and particles of similar size share one.
    pub fn color_for_radius(self, radius: f64) -> &'static str {
        let palette = self.palette();
        let index = radius.max(0.0).floor() as usize % palette.len();
        palette[index]
    }

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown theme name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme: {0:?}")]
pub struct ThemeParseError(pub String);

impl FromStr for Theme {
    type Err = ThemeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ThemeParseError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_theme() {
        assert_eq!("light".parse::<Theme>(), Ok(Theme::Light));
        assert_eq!(" dark ".parse::<Theme>(), Ok(Theme::Dark));
        assert_eq!(
            "sepia".parse::<Theme>(),
            Err(ThemeParseError("sepia".to_string()))
        );
    }

    #[test]
    fn test_color_by_floor_of_radius() {
        assert_eq!(Theme::Light.color_for_radius(4.0), "#6fadff");
        assert_eq!(Theme::Light.color_for_radius(4.99), "#6fadff");
        assert_eq!(Theme::Light.color_for_radius(5.2), "#a2d2ff");
        assert_eq!(Theme::Light.color_for_radius(7.5), "#ffc8dd");
        assert_eq!(Theme::Dark.color_for_radius(13.9), "#3a0ca3");
    }

    #[test]
    fn test_same_radius_same_slot_across_themes() {
        for r in [4.0, 6.3, 9.9, 12.1] {
            let light = LIGHT_PALETTE.iter().position(|c| *c == Theme::Light.color_for_radius(r));
            let dark = DARK_PALETTE.iter().position(|c| *c == Theme::Dark.color_for_radius(r));
            assert_eq!(light, dark);
        }
    }

    #[test]
    fn test_default_is_light() {
        assert_eq!(Theme::default(), Theme::Light);
        assert_eq!(Theme::Dark.to_string(), "dark");
    }
}

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeName {
    Dark,
    Light,
}

impl Default for ThemeName {
    fn default() -> Self {
        ThemeName::Dark
    }
}

impl ThemeName {
    pub fn toggled(self) -> Self {
        match self {
            ThemeName::Dark => ThemeName::Light,
            ThemeName::Light => ThemeName::Dark,
        }
    }

    pub fn palette(self) -> ThemePalette {
        match self {
            ThemeName::Dark => ThemePalette {
                accent: Color::Cyan,
                highlight: Color::Yellow,
                dim: Color::Gray,
                danger: Color::Red,
                text: Color::White,
                surface: Color::Black,
            },
            ThemeName::Light => ThemePalette {
                accent: Color::Blue,
                highlight: Color::Magenta,
                dim: Color::DarkGray,
                danger: Color::Red,
                text: Color::Black,
                surface: Color::White,
            },
        }
    }
}

/// Colors the UI draws with; one palette per theme.
#[derive(Debug, Clone, Copy)]
pub struct ThemePalette {
    pub accent: Color,
    pub highlight: Color,
    pub dim: Color,
    pub danger: Color,
    pub text: Color,
    pub surface: Color,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_between_the_two_themes() {
        assert_eq!(ThemeName::Dark.toggled(), ThemeName::Light);
        assert_eq!(ThemeName::Light.toggled().toggled(), ThemeName::Light);
    }
}

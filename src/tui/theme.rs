use std::collections::HashMap;

use ratatui::style::Color;

use crate::model::UiConfig;

/// Parsed color palette for one half of the day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub done: Color,
    pub red: Color,
    pub selection_bg: Color,
    pub border: Color,
}

impl Theme {
    /// Light palette used between 06:00 and 18:00
    pub fn day() -> Self {
        Theme {
            background: Color::Rgb(0xF7, 0xF4, 0xEC),
            text: Color::Rgb(0x3A, 0x36, 0x2F),
            text_bright: Color::Rgb(0x10, 0x0E, 0x0A),
            highlight: Color::Rgb(0xE0, 0x7A, 0x1F),
            dim: Color::Rgb(0x9A, 0x93, 0x85),
            done: Color::Rgb(0x6B, 0x9E, 0x4A),
            red: Color::Rgb(0xC6, 0x28, 0x28),
            selection_bg: Color::Rgb(0xFF, 0xE8, 0xC2),
            border: Color::Rgb(0xD8, 0xCF, 0xBC),
        }
    }

    /// Dark palette used the rest of the time
    pub fn night() -> Self {
        Theme {
            background: Color::Rgb(0x0C, 0x00, 0x1B),
            text: Color::Rgb(0xB0, 0xAA, 0xFF),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            dim: Color::Rgb(0x7D, 0x78, 0xBF),
            done: Color::Rgb(0x44, 0xFF, 0x88),
            red: Color::Rgb(0xFF, 0x44, 0x44),
            selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
            border: Color::Rgb(0x4A, 0x3F, 0x7A),
        }
    }

    /// Apply `[ui.day_colors]` or `[ui.night_colors]` overrides to a base
    /// palette. Unknown names and malformed colors are ignored.
    pub fn with_overrides(mut self, colors: &HashMap<String, String>) -> Self {
        for (key, value) in colors {
            let Some(color) = parse_hex_color(value) else {
                log::warn!("ignoring color {}={:?}: expected #RRGGBB", key, value);
                continue;
            };
            match key.as_str() {
                "background" => self.background = color,
                "text" => self.text = color,
                "text_bright" => self.text_bright = color,
                "highlight" => self.highlight = color,
                "dim" => self.dim = color,
                "done" => self.done = color,
                "red" => self.red = color,
                "selection_bg" => self.selection_bg = color,
                "border" => self.border = color,
                _ => log::warn!("ignoring unknown color name {:?}", key),
            }
        }
        self
    }
}

/// The day and night palettes, resolved from config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palettes {
    pub day: Theme,
    pub night: Theme,
}

impl Palettes {
    pub fn from_config(ui: &UiConfig) -> Self {
        Palettes {
            day: Theme::day().with_overrides(&ui.day_colors),
            night: Theme::night().with_overrides(&ui.night_colors),
        }
    }

    pub fn for_night(&self, is_night: bool) -> &Theme {
        if is_night { &self.night } else { &self.day }
    }
}

impl Default for Palettes {
    fn default() -> Self {
        Palettes {
            day: Theme::day(),
            night: Theme::night(),
        }
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

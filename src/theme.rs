//! Theme palettes. Colors are stored as hex strings in the config and
//! resolved to [`tiny_skia::Color`] for whatever renders the launcher.

use serde::Deserialize;
use tiny_skia::Color;

pub const DEFAULT_THEME: &str = "default";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ThemeColors {
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_border_color")]
    pub border_color: String,
    #[serde(default = "default_text")]
    pub text: String,
    #[serde(default = "default_selection_background")]
    pub selection_background: String,
    #[serde(default = "default_selection_text")]
    pub selection_text: String,
    #[serde(default = "default_highlight")]
    pub highlight: String,
}

fn default_background() -> String { "1e1e1eff".to_string() }
fn default_border_color() -> String { "3c3c50ff".to_string() }
fn default_text() -> String { "c8c8c8ff".to_string() }
fn default_selection_background() -> String { "3c3c50ff".to_string() }
fn default_selection_text() -> String { "ffffffff".to_string() }
fn default_highlight() -> String { "e0af68ff".to_string() }

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            background: default_background(),
            border_color: default_border_color(),
            text: default_text(),
            selection_background: default_selection_background(),
            selection_text: default_selection_text(),
            highlight: default_highlight(),
        }
    }
}

/// Resolved colors of one theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub border: Color,
    pub text: Color,
    pub selection_background: Color,
    pub selection_text: Color,
    pub highlight: Color,
}

impl ThemeColors {
    /// On failure returns the offending field and value.
    pub fn resolve(&self) -> Result<Palette, (&'static str, String)> {
        let color = |field: &'static str, value: &String| {
            parse_color(value).ok_or_else(|| (field, value.clone()))
        };
        Ok(Palette {
            background: color("background", &self.background)?,
            border: color("border_color", &self.border_color)?,
            text: color("text", &self.text)?,
            selection_background: color("selection_background", &self.selection_background)?,
            selection_text: color("selection_text", &self.selection_text)?,
            highlight: color("highlight", &self.highlight)?,
        })
    }
}

/// Parses `RRGGBB` or `RRGGBBAA`, with or without a leading '#'.
pub fn parse_color(hex: &str) -> Option<Color> {
    let hex = hex.trim().trim_start_matches('#');
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let a = if hex.len() == 8 { channel(6)? } else { 255 };
    Some(Color::from_rgba8(channel(0)?, channel(2)?, channel(4)?, a))
}

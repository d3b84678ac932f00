//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::shapes::ColorId;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Piece palette and UI colours, One Dark unless a theme file says otherwise.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Piece colours by [`ColorId`] slot: red, green, blue, yellow, orange, purple, cyan.
    pub pieces: [Color; ColorId::COUNT],
    /// Playfield background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, counters).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text (key help).
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// One Dark piece colours.
const ONEDARK_PIECES: [Color; ColorId::COUNT] = [
    rgb(0xE0_6C_75),
    rgb(0x98_C3_79),
    rgb(0x61_AF_EF),
    rgb(0xE5_C0_7B),
    rgb(0xD1_9A_66),
    rgb(0xC6_78_DD),
    rgb(0x56_B6_C2),
];

const HIGH_CONTRAST_PIECES: [Color; ColorId::COUNT] = [
    rgb(0xFF_00_00),
    rgb(0x00_FF_00),
    rgb(0x00_88_FF),
    rgb(0xFF_FF_00),
    rgb(0xFF_A5_00),
    rgb(0xFF_00_FF),
    rgb(0x00_FF_FF),
];

/// Okabe-Ito style set that stays distinguishable without red/green.
const COLORBLIND_PIECES: [Color; ColorId::COUNT] = [
    rgb(0xD5_5E_00),
    rgb(0x00_9E_73),
    rgb(0x00_72_B2),
    rgb(0xF0_E4_42),
    rgb(0xE6_9F_00),
    rgb(0xCC_79_A7),
    rgb(0x56_B4_E9),
];

/// Theme keys tried for each piece slot, in order.
const PIECE_KEYS: [&[&str]; ColorId::COUNT] = [
    &["cpu_end", "temp_end"],
    &["mem_box", "cpu_start"],
    &["cpu_box"],
    &["title", "cpu_mid"],
    &["temp_mid", "used_mid"],
    &["net_box"],
    &["hi_fg", "proc_misc"],
];

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    pub fn onedark_default() -> Self {
        Self {
            pieces: ONEDARK_PIECES,
            bg: rgb(0x28_2C_34),
            div_line: rgb(0x3F_44_4F),
            main_fg: rgb(0xAB_B2_BF),
            title: rgb(0xE5_C0_7B),
            inactive_fg: rgb(0x5C_63_70),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file is missing.
    /// `palette` then overrides the piece colours for high-contrast or colorblind play.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) if p.exists() => Self::from_map(&parse_theme_file(&std::fs::read_to_string(p)?)),
            _ => Self::onedark_default(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => self.pieces = HIGH_CONTRAST_PIECES,
            crate::Palette::Colorblind => self.pieces = COLORBLIND_PIECES,
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let defaults = Self::onedark_default();
        let mut pieces = defaults.pieces;
        for (slot, keys) in pieces.iter_mut().zip(PIECE_KEYS) {
            if let Some(c) = keys.iter().find_map(|&k| get(k)) {
                *slot = c;
            }
        }
        Self {
            pieces,
            bg: get("main_bg").or_else(|| get("meter_bg")).unwrap_or(defaults.bg),
            div_line: get("div_line").unwrap_or(defaults.div_line),
            main_fg: get("main_fg").unwrap_or(defaults.main_fg),
            title: get("title").unwrap_or(defaults.title),
            inactive_fg: get("inactive_fg").unwrap_or(defaults.inactive_fg),
        }
    }

    /// Display colour for a piece / locked cell.
    #[inline]
    pub fn piece_color(&self, id: ColorId) -> Color {
        self.pieces[id.index()]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'').trim();
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let digits = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let value = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
    match digits.len() {
        6 => Ok(rgb(value)),
        3 => {
            let r = ((value >> 8) & 0xF) * 17;
            let g = ((value >> 4) & 0xF) * 17;
            let b = (value & 0xF) * 17;
            Ok(rgb((r << 16) | (g << 8) | b))
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(matches!(parse_hex("#12345"), Err(ThemeError::InvalidHex(_))));
        assert!(matches!(parse_hex("#GGGGGG"), Err(ThemeError::InvalidHex(_))));
        assert!(matches!(parse_hex("+12"), Err(ThemeError::InvalidHex(_))));
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_theme_file_overrides_piece_slot() {
        let map = parse_theme_file(
            "# comment\ntheme[cpu_box]='#000080'\ntheme[main_fg]=\"#FFFFFF\"\n",
        );
        let theme = Theme::from_map(&map);
        assert_eq!(theme.piece_color(ColorId::ALL[2]), Color::Rgb(0, 0, 0x80));
        assert_eq!(theme.main_fg, Color::Rgb(255, 255, 255));
        assert_eq!(theme.piece_color(ColorId::ALL[0]), ONEDARK_PIECES[0]);
    }

    #[test]
    fn test_palette_override_and_missing_file() {
        let theme = Theme::load(
            Some(Path::new("/nonexistent/blocktui.theme")),
            crate::Palette::HighContrast,
        )
        .unwrap();
        assert_eq!(theme.pieces, HIGH_CONTRAST_PIECES);
    }

    #[test]
    fn test_piece_colors_distinct() {
        for palette in [ONEDARK_PIECES, HIGH_CONTRAST_PIECES, COLORBLIND_PIECES] {
            for (i, a) in palette.iter().enumerate() {
                for b in &palette[i + 1..] {
                    assert_ne!(a, b);
                }
            }
        }
    }
}

//! Color parsing and shade derivation.
//!
//! A table's whole palette (header, border, row fills, highlights) is derived
//! from one base color, so these helpers always produce `#rrggbb`.

use regex::Regex;
use std::sync::LazyLock;

static RGBA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"rgba?\((\d+),\s*(\d+),\s*(\d+)(?:,\s*([\d.]+))?\)").expect("valid rgba pattern")
});

/// Normalize `rgb(...)` / `rgba(...)` to `#rrggbb`.
///
/// Hex input is returned untouched and so is anything unrecognized. The alpha
/// component is dropped.
pub fn normalize_color(input: &str) -> String {
    if input.starts_with('#') {
        return input.to_string();
    }

    let Some(caps) = RGBA.captures(input) else {
        return input.to_string();
    };

    let channel = |i: usize| -> u8 {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .map_or(0, |v| v.min(255) as u8)
    };

    format!("#{:02x}{:02x}{:02x}", channel(1), channel(2), channel(3))
}

/// Shift every channel toward black by `round(2.55 * percent)`.
pub fn darken(hex: &str, percent: f64) -> String {
    shift(hex, -percent)
}

/// Shift every channel toward white by `round(2.55 * percent)`.
pub fn lighten(hex: &str, percent: f64) -> String {
    shift(hex, percent)
}

fn shift(hex: &str, percent: f64) -> String {
    let Some((r, g, b)) = parse_hex(hex) else {
        return hex.to_string();
    };
    let amt = (2.55 * percent).round() as i32;
    let adjust = |c: u8| (i32::from(c) + amt).clamp(0, 255) as u8;
    format!("#{:02x}{:02x}{:02x}", adjust(r), adjust(g), adjust(b))
}

/// Parse `#rrggbb` or `#rgb` (leading `#` optional).
pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.trim_start_matches('#');
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return None,
    };
    let num = u32::from_str_radix(&expanded, 16).ok()?;
    Some(((num >> 16) as u8, ((num >> 8) & 0xff) as u8, (num & 0xff) as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_rgba_drops_alpha() {
        assert_eq!(normalize_color("rgba(107,99,123,0.4)"), "#6b637b");
        assert_eq!(normalize_color("rgba(107, 99, 123, 0.4)"), "#6b637b");
    }

    #[test]
    fn test_normalize_rgb() {
        assert_eq!(normalize_color("rgb(0,128,255)"), "#0080ff");
    }

    #[test]
    fn test_normalize_passthrough() {
        assert_eq!(normalize_color("#3b82f6"), "#3b82f6");
        assert_eq!(normalize_color("teal"), "teal");
    }

    #[test]
    fn test_darken() {
        assert_eq!(darken("#3b82f6", 20.0), "#084fc3");
        assert_eq!(darken("#101010", 20.0), "#000000");
    }

    #[test]
    fn test_lighten() {
        assert_eq!(lighten("#3b82f6", 40.0), "#a1e8ff");
        assert_eq!(lighten("#ffffff", 20.0), "#ffffff");
    }

    #[test]
    fn test_short_hex() {
        assert_eq!(darken("#fff", 20.0), "#cccccc");
    }

    #[test]
    fn test_invalid_hex_passthrough() {
        assert_eq!(darken("teal", 20.0), "teal");
    }
}

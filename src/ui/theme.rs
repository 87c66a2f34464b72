//! Color theme and style mapping for the terminal host.
//!
//! Definitions style components with a small CSS-like vocabulary
//! (`color`, `backgroundColor`, `fontWeight`, `fontStyle`). Those are mapped
//! onto ratatui styles here; everything else is ignored.

use ratatui::style::{Color, Modifier, Style};
use serde_json::{Map, Value};

/// Frame border color
pub const COLOR_BORDER: Color = Color::DarkGray;

/// Screen title color
pub const COLOR_HEADER: Color = Color::White;

/// Focused button
pub const COLOR_FOCUS: Color = Color::LightCyan;

/// Dim text (hints, disabled buttons)
pub const COLOR_DIM: Color = Color::DarkGray;

/// Error view text
pub const COLOR_ERROR: Color = Color::Red;

/// Loader spinner
pub const COLOR_ACTIVE: Color = Color::LightGreen;

/// Parse `#rgb` or `#rrggbb`; a few named colors are accepted too.
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return None,
        };
        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
        return Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?));
    }
    match value.to_ascii_lowercase().as_str() {
        "white" => Some(Color::White),
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "blue" => Some(Color::Blue),
        "yellow" => Some(Color::Yellow),
        "gray" | "grey" => Some(Color::Gray),
        _ => None,
    }
}

/// Map a component's style object to a ratatui style.
pub fn component_style(style: &Map<String, Value>) -> Style {
    let mut out = Style::default();
    if let Some(color) = style.get("color").and_then(Value::as_str).and_then(parse_color) {
        out = out.fg(color);
    }
    if let Some(color) = style
        .get("backgroundColor")
        .and_then(Value::as_str)
        .and_then(parse_color)
    {
        out = out.bg(color);
    }
    if is_bold(style.get("fontWeight")) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.get("fontStyle").and_then(Value::as_str) == Some("italic") {
        out = out.add_modifier(Modifier::ITALIC);
    }
    out
}

fn is_bold(weight: Option<&Value>) -> bool {
    match weight {
        Some(Value::String(s)) => s == "bold" || s.parse::<u32>().is_ok_and(|w| w >= 600),
        Some(Value::Number(n)) => n.as_u64().is_some_and(|w| w >= 600),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ff0000"), Some(Color::Rgb(255, 0, 0)));
        assert_eq!(parse_color("#0f0"), Some(Color::Rgb(0, 255, 0)));
        assert_eq!(parse_color("White"), Some(Color::White));
        assert_eq!(parse_color("#12"), None);
        assert_eq!(parse_color("#zzzzzz"), None);
    }

    #[test]
    fn test_component_style() {
        let style = json!({"color": "#333333", "fontWeight": "700", "fontSize": 24});
        let mapped = component_style(style.as_object().unwrap());
        assert_eq!(mapped.fg, Some(Color::Rgb(0x33, 0x33, 0x33)));
        assert!(mapped.add_modifier.contains(Modifier::BOLD));

        let plain = component_style(json!({"fontWeight": "normal"}).as_object().unwrap());
        assert_eq!(plain, Style::default());
    }
}

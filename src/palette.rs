// Color specifications attached to chart descriptions

use plotters::style::RGBColor;
use serde::Serialize;

pub const SALES_LINE: &str = "#ff7f0e";
pub const PRODUCT_BAR: &str = "#1f77b4";
pub const PLOT_BACKGROUND: &str = "#FAFAFA";

/// Diverging red-blue scale, dark red through white to dark blue.
pub const RD_BU: [&str; 11] = [
    "#67001f", "#b2182b", "#d6604d", "#f4a582", "#fddbc7", "#f7f7f7", "#d1e5f0", "#92c5de",
    "#4393c3", "#2166ac", "#053061",
];

/// Discrete colors applied to traces (line, bars) or slices (pie) in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorScheme {
    pub name: Option<String>,
    pub colors: Vec<String>,
}

impl ColorScheme {
    pub fn single(color: &str) -> Self {
        Self {
            name: None,
            colors: vec![color.to_string()],
        }
    }

    pub fn rd_bu() -> Self {
        Self {
            name: Some("RdBu".to_string()),
            colors: RD_BU.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Color for the i-th item, cycling through the sequence.
    pub fn color_at(&self, i: usize) -> &str {
        if self.colors.is_empty() {
            return PRODUCT_BAR;
        }
        &self.colors[i % self.colors.len()]
    }
}

/// Parse `#rrggbb` or a basic color name. Unknown input falls back to blue.
pub fn parse_color(color: &str) -> RGBColor {
    if let Some(rgb) = parse_hex(color) {
        return rgb;
    }
    match color.to_ascii_lowercase().as_str() {
        "red" => RGBColor(255, 0, 0),
        "green" => RGBColor(0, 255, 0),
        "black" => RGBColor(0, 0, 0),
        "white" => RGBColor(255, 255, 255),
        "orange" => RGBColor(255, 127, 14),
        _ => RGBColor(31, 119, 180),
    }
}

fn parse_hex(color: &str) -> Option<RGBColor> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

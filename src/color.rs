use palette::Srgb;
use plotters::style::RGBColor;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Figure palette
// ---------------------------------------------------------------------------

/// Named colours used across the figures. These win over CSS names, so
/// `"blue"` is the tableau blue, not `#0000FF`.
pub const COLORS: [(&str, &str); 6] = [
    ("blue", "#1F77B4"),
    ("gray", "#7F7F7F"),
    ("orange", "orange"),
    ("gold", "orange"),
    ("red", "#FA0303"),
    ("black", "k"),
];

/// `COLORS["blue"]`, used by the fixed-colour fills.
pub const FIGURE_BLUE: RGBColor = RGBColor(0x1F, 0x77, 0xB4);
pub const FIGURE_BLACK: RGBColor = RGBColor(0, 0, 0);

/// Matplotlib's default line colour cycle (tab10).
pub const COLOR_CYCLE: [&str; 10] = [
    "#1F77B4", "#FF7F0E", "#2CA02C", "#D62728", "#9467BD", "#8C564B", "#E377C2", "#7F7F7F",
    "#BCBD22", "#17BECF",
];

const SINGLE_LETTER: [(&str, &str); 8] = [
    ("b", "#0000FF"),
    ("g", "#008000"),
    ("r", "#FF0000"),
    ("c", "#00BFBF"),
    ("m", "#BF00BF"),
    ("y", "#BFBF00"),
    ("k", "#000000"),
    ("w", "#FFFFFF"),
];

const TABLEAU: [(&str, &str); 10] = [
    ("tab:blue", "#1F77B4"),
    ("tab:orange", "#FF7F0E"),
    ("tab:green", "#2CA02C"),
    ("tab:red", "#D62728"),
    ("tab:purple", "#9467BD"),
    ("tab:brown", "#8C564B"),
    ("tab:pink", "#E377C2"),
    ("tab:gray", "#7F7F7F"),
    ("tab:olive", "#BCBD22"),
    ("tab:cyan", "#17BECF"),
];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognised colour '{0}'")]
pub struct ColorError(pub String);

// ---------------------------------------------------------------------------
// Colour resolution: string → RGBColor
// ---------------------------------------------------------------------------

/// Resolve a colour string.
///
/// Lookup order: figure palette, single-letter codes (`k`, `r`, ...),
/// `tab:` names, `Cn` cycle references, `#rrggbb`/`#rgb` hex, CSS names.
pub fn parse_color(spec: &str) -> Result<RGBColor, ColorError> {
    let lower = spec.trim().to_ascii_lowercase();
    let target = lookup(&COLORS, &lower).unwrap_or(spec);
    resolve(target).ok_or_else(|| ColorError(spec.to_string()))
}

fn resolve(spec: &str) -> Option<RGBColor> {
    let key = spec.trim();
    let lower = key.to_ascii_lowercase();

    if let Some(hex) = lookup(&SINGLE_LETTER, key).or_else(|| lookup(&TABLEAU, &lower)) {
        return parse_hex(hex);
    }
    if let Some(idx) = lower.strip_prefix('c').and_then(|n| n.parse::<usize>().ok()) {
        return Some(cycle_color(idx));
    }
    if key.starts_with('#') {
        return parse_hex(key);
    }
    palette::named::from_str(&lower).map(to_rgb)
}

/// Colour `idx` of the default line cycle (wraps around).
pub fn cycle_color(idx: usize) -> RGBColor {
    let hex = COLOR_CYCLE[idx % COLOR_CYCLE.len()];
    parse_hex(hex).unwrap_or(RGBColor(0, 0, 0))
}

fn lookup<'a>(table: &[(&str, &'a str)], key: &str) -> Option<&'a str> {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, hex)| *hex)
}

fn parse_hex(hex: &str) -> Option<RGBColor> {
    hex.parse::<Srgb<u8>>().ok().map(to_rgb)
}

fn to_rgb(c: Srgb<u8>) -> RGBColor {
    RGBColor(c.red, c.green, c.blue)
}

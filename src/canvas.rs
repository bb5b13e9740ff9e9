use std::str::FromStr;

use plotters::style::RGBColor;
use thiserror::Error;

use crate::color::cycle_color;

/// Default stacking of each artist kind; higher is drawn later.
pub const ZORDER_FILL: f64 = 1.0;
pub const ZORDER_LINE: f64 = 2.0;
pub const ZORDER_TEXT: f64 = 3.0;

/// Edge width of fills and patches when none is given.
pub const PATCH_LINEWIDTH: f64 = 1.0;
/// Line width of plain lines when the style leaves it unset.
pub const LINE_LINEWIDTH: f64 = 1.5;

// ---------------------------------------------------------------------------
// Paint / LineStyle
// ---------------------------------------------------------------------------

/// An RGB colour with opacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: RGBColor,
    pub alpha: f64,
}

impl Paint {
    pub fn new(color: RGBColor, alpha: f64) -> Self {
        Paint {
            color,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    pub fn opaque(color: RGBColor) -> Self {
        Paint::new(color, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    DashDot,
    /// Draw no stroke at all.
    Hidden,
}

impl LineStyle {
    /// On/off lengths in pixels at unit line width. Empty means continuous.
    pub fn dash_pattern(self) -> &'static [f64] {
        match self {
            LineStyle::Solid | LineStyle::Hidden => &[],
            LineStyle::Dashed => &[3.7, 1.6],
            LineStyle::Dotted => &[1.0, 1.65],
            LineStyle::DashDot => &[6.4, 1.6, 1.0, 1.6],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown line style '{0}'")]
pub struct UnknownLineStyle(pub String);

impl FromStr for LineStyle {
    type Err = UnknownLineStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "-" | "solid" => Ok(LineStyle::Solid),
            "--" | "dashed" => Ok(LineStyle::Dashed),
            ":" | "dotted" => Ok(LineStyle::Dotted),
            "-." | "dashdot" => Ok(LineStyle::DashDot),
            "" | "None" | "none" => Ok(LineStyle::Hidden),
            other => Err(UnknownLineStyle(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Artists
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub paint: Paint,
    pub width: f64,
    pub style: LineStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineArtist {
    pub points: Vec<(f64, f64)>,
    pub stroke: Stroke,
    pub label: Option<String>,
}

/// Region between `y1` and `y2` over `x`, outlined by `edge` if set.
#[derive(Debug, Clone, PartialEq)]
pub struct FillArtist {
    pub x: Vec<f64>,
    pub y1: Vec<f64>,
    pub y2: Vec<f64>,
    pub face: Paint,
    pub edge: Option<Stroke>,
}

impl FillArtist {
    /// Closed polygon: forward along `y1`, back along `y2`.
    pub fn outline(&self) -> Vec<(f64, f64)> {
        let n = self.x.len().min(self.y1.len()).min(self.y2.len());
        let forward = (0..n).map(|i| (self.x[i], self.y1[i]));
        let back = (0..n).rev().map(|i| (self.x[i], self.y2[i]));
        forward.chain(back).collect()
    }
}

/// Closed polygon through `vertices`.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchArtist {
    pub vertices: Vec<(f64, f64)>,
    pub face: Paint,
    pub edge: Stroke,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextArtist {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub size: f64,
    /// Degrees counter-clockwise.
    pub rotation: f64,
    pub color: RGBColor,
    pub h_align: HAlign,
    pub v_align: VAlign,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Artist {
    Line(LineArtist),
    Fill(FillArtist),
    Patch(PatchArtist),
    Text(TextArtist),
}

impl Artist {
    fn default_zorder(&self) -> f64 {
        match self {
            Artist::Fill(_) | Artist::Patch(_) => ZORDER_FILL,
            Artist::Line(_) => ZORDER_LINE,
            Artist::Text(_) => ZORDER_TEXT,
        }
    }

    /// Every data-space point the artist touches.
    fn data_points(&self) -> Vec<(f64, f64)> {
        match self {
            Artist::Line(l) => l.points.clone(),
            Artist::Fill(f) => f.outline(),
            Artist::Patch(p) => p.vertices.clone(),
            Artist::Text(t) => vec![(t.x, t.y)],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub zorder: f64,
    pub artist: Artist,
}

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// Retained drawing surface shared by every render call of one figure.
#[derive(Debug, Default)]
pub struct Canvas {
    layers: Vec<Layer>,
    cycle_index: usize,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an artist at its kind's default z-order.
    pub fn add(&mut self, artist: Artist) {
        let zorder = artist.default_zorder();
        self.add_at(artist, zorder);
    }

    pub fn add_at(&mut self, artist: Artist, zorder: f64) {
        self.layers.push(Layer { zorder, artist });
    }

    /// Next colour of the line cycle, for lines drawn without one.
    pub fn next_cycle_color(&mut self) -> RGBColor {
        let color = cycle_color(self.cycle_index);
        self.cycle_index += 1;
        color
    }

    /// Layers in call order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers in draw order: ascending z-order, call order within a level.
    pub fn draw_order(&self) -> Vec<&Layer> {
        let mut ordered: Vec<&Layer> = self.layers.iter().collect();
        ordered.sort_by(|a, b| a.zorder.total_cmp(&b.zorder));
        ordered
    }

    /// Bounding box `((x_min, x_max), (y_min, y_max))` of finite points that
    /// pass `keep`, which lets log axes drop non-positive values.
    pub fn data_bounds(&self, keep: impl Fn(f64, f64) -> bool) -> Option<((f64, f64), (f64, f64))> {
        let mut bounds: Option<((f64, f64), (f64, f64))> = None;
        for layer in &self.layers {
            for (x, y) in layer.artist.data_points() {
                if !x.is_finite() || !y.is_finite() || !keep(x, y) {
                    continue;
                }
                bounds = Some(match bounds {
                    None => ((x, x), (y, y)),
                    Some(((x0, x1), (y0, y1))) => ((x0.min(x), x1.max(x)), (y0.min(y), y1.max(y))),
                });
            }
        }
        bounds
    }
}

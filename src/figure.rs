use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::canvas::Canvas;
use crate::data::loader::load_file;
use crate::data::model::Curve;
use crate::data::paths::locate_data_file_in;
use crate::render;

pub const DEFAULT_SIZE: (u32, u32) = (1000, 750);

// ---------------------------------------------------------------------------
// Axes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AxisSpec {
    /// `[min, max]`; autoscaled from the data when absent.
    pub lim: Option<(f64, f64)>,
    pub log: bool,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Axes {
    pub x: AxisSpec,
    pub y: AxisSpec,
    pub title: Option<String>,
    /// Draw a legend for labelled lines.
    pub legend: bool,
}

impl Default for Axes {
    fn default() -> Self {
        Axes {
            x: AxisSpec {
                log: true,
                label: Some("Mass".into()),
                ..AxisSpec::default()
            },
            y: AxisSpec {
                lim: Some((0.0, 1.0)),
                label: Some("Limit".into()),
                ..AxisSpec::default()
            },
            title: None,
            legend: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Layers – one render call each
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layer {
    Limit {
        curve: String,
    },
    Fill {
        curve: String,
        #[serde(default)]
        low: bool,
    },
    Final {
        curve: String,
        #[serde(default)]
        low: bool,
    },
    Patch {
        curve: String,
        zorder: f64,
    },
    One {
        curve: String,
    },
    Two {
        loose: String,
        tight: String,
    },
}

impl Layer {
    fn curve_names(&self) -> Vec<&str> {
        match self {
            Layer::Limit { curve }
            | Layer::Fill { curve, .. }
            | Layer::Final { curve, .. }
            | Layer::Patch { curve, .. }
            | Layer::One { curve } => vec![curve.as_str()],
            Layer::Two { loose, tight } => vec![loose.as_str(), tight.as_str()],
        }
    }
}

// ---------------------------------------------------------------------------
// FigureSpec
// ---------------------------------------------------------------------------

/// A complete figure description:
///
/// ```json
/// {
///   "size": [1000, 750],
///   "axes": { "x": { "log": true, "lim": [1, 1e4] }, "y": { "lim": [0, 1] } },
///   "curves": { "dwarfs": { "xystring": "1 0.5\n10 0.1", "style": { "label": "Dwarfs" } } },
///   "layers": [ { "kind": "final", "curve": "dwarfs" } ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FigureSpec {
    #[serde(default = "default_size")]
    pub size: (u32, u32),
    #[serde(default)]
    pub axes: Axes,
    pub curves: BTreeMap<String, Curve>,
    pub layers: Vec<Layer>,
}

fn default_size() -> (u32, u32) {
    DEFAULT_SIZE
}

impl FigureSpec {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading figure description {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Parse and validate a figure description.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut spec: FigureSpec = serde_json::from_str(text).context("parsing figure JSON")?;
        for (name, curve) in &mut spec.curves {
            curve.name = name.clone();
        }
        spec.validate()?;
        Ok(spec)
    }

    fn validate(&self) -> Result<()> {
        for (idx, layer) in self.layers.iter().enumerate() {
            for name in layer.curve_names() {
                if !self.curves.contains_key(name) {
                    return Err(anyhow!("layer {idx} references unknown curve '{name}'"));
                }
            }
        }
        for (name, curve) in &self.curves {
            if curve.xystring.is_none() && curve.file.is_none() {
                return Err(anyhow!("curve '{name}' needs either 'xystring' or 'file'"));
            }
        }
        Ok(())
    }

    /// Load every file-backed curve from `data_dir`.
    pub fn resolve_sources(&mut self, data_dir: &Path) -> Result<()> {
        for (name, curve) in &mut self.curves {
            let Some(file) = curve.file.as_deref() else {
                continue;
            };
            let path = locate_data_file_in(data_dir, file)?;
            let points = load_file(&path).with_context(|| format!("curve '{name}'"))?;
            debug!("curve '{name}': {} points from {}", points.len(), path.display());
            curve.points = Some(points);
        }
        Ok(())
    }

    /// Whether any curve still needs [`FigureSpec::resolve_sources`].
    pub fn needs_data_dir(&self) -> bool {
        self.curves
            .values()
            .any(|c| c.file.is_some() && c.points.is_none())
    }

    fn curve(&self, name: &str) -> Result<&Curve> {
        self.curves
            .get(name)
            .ok_or_else(|| anyhow!("unknown curve '{name}'"))
    }

    /// Run every layer, in order, onto a fresh canvas.
    pub fn build_canvas(&self) -> Result<Canvas> {
        let mut canvas = Canvas::new();
        for (idx, layer) in self.layers.iter().enumerate() {
            debug!("layer {idx}: {layer:?}");
            match layer {
                Layer::Limit { curve } => render::plot_limit(&mut canvas, self.curve(curve)?),
                Layer::Fill { curve, low } => {
                    render::plot_limit_fill(&mut canvas, self.curve(curve)?, *low)
                }
                Layer::Final { curve, low } => {
                    render::plot_limit_final(&mut canvas, self.curve(curve)?, *low)
                }
                Layer::Patch { curve, zorder } => {
                    render::plot_limit_patch(&mut canvas, self.curve(curve)?, *zorder)
                }
                Layer::One { curve } => render::plot_one(&mut canvas, self.curve(curve)?),
                Layer::Two { loose, tight } => {
                    render::plot_two(&mut canvas, self.curve(loose)?, self.curve(tight)?)
                }
            }
            .with_context(|| format!("rendering layer {idx}"))?;
        }
        info!(
            "built canvas: {} layers → {} artists",
            self.layers.len(),
            canvas.len()
        );
        Ok(canvas)
    }
}

//! Curve render variants. Each call parses the curve, resolves its style and
//! appends artists to the caller's [`Canvas`].

use log::{debug, warn};
use thiserror::Error;

use crate::canvas::{
    Artist, Canvas, FillArtist, HAlign, LINE_LINEWIDTH, LineArtist, LineStyle, PATCH_LINEWIDTH,
    Paint, PatchArtist, Stroke, TextArtist, UnknownLineStyle, VAlign,
};
use crate::color::{FIGURE_BLACK, FIGURE_BLUE};
use crate::data::model::{Curve, MassLimit};
use crate::data::parse::{ParseError, parse_mass_limit};
use crate::grid::{GRID_POINTS, GridError, interp, log_grid};
use crate::style::{StyleError, StyleOptions};

pub const LABEL_FONTSIZE: f64 = 20.0;
/// Fill opacity of the "final" style.
pub const FINAL_ALPHA: f64 = 0.15;
/// Opacity of the band between the loose and tight curves.
pub const BAND_ALPHA: f64 = 0.07;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("curve '{curve}': {source}")]
    Parse {
        curve: String,
        #[source]
        source: ParseError,
    },
    #[error(transparent)]
    Style(#[from] StyleError),
    #[error("curve '{curve}': {source}")]
    LineStyle {
        curve: String,
        #[source]
        source: UnknownLineStyle,
    },
    #[error("curve '{curve}': label needs '{field}'")]
    MissingLabelField { curve: String, field: &'static str },
    #[error("curves '{loose}'/'{tight}': {source}")]
    Grid {
        loose: String,
        tight: String,
        #[source]
        source: GridError,
    },
}

fn mass_limit(curve: &Curve) -> Result<MassLimit, RenderError> {
    parse_mass_limit(curve).map_err(|source| RenderError::Parse {
        curve: curve.name.clone(),
        source,
    })
}

fn line_style(spec: Option<&str>, curve: &Curve) -> Result<LineStyle, RenderError> {
    match spec {
        None => Ok(LineStyle::Solid),
        Some(s) => s.parse().map_err(|source| RenderError::LineStyle {
            curve: curve.name.clone(),
            source,
        }),
    }
}

/// Filled region between the limit and a constant ceiling (or floor).
fn fill_to(data: &MassLimit, bound: f64, face: Paint, edge: Option<Stroke>) -> Artist {
    Artist::Fill(FillArtist {
        x: data.mass.clone(),
        y1: data.limit.clone(),
        y2: vec![bound; data.len()],
        face,
        edge,
    })
}

fn edge(color: plotters::style::RGBColor, alpha: f64) -> Stroke {
    Stroke {
        paint: Paint::new(color, alpha),
        width: PATCH_LINEWIDTH,
        style: LineStyle::Solid,
    }
}

fn bound(low: bool) -> f64 {
    if low {
        0.0
    } else {
        1.0
    }
}

// ---------------------------------------------------------------------------
// Label
// ---------------------------------------------------------------------------

/// Draw the curve's label text centred horizontally and hanging from
/// (`label_x`, `label_y`).
pub fn render_label(canvas: &mut Canvas, curve: &Curve) -> Result<(), RenderError> {
    let missing = |field| RenderError::MissingLabelField {
        curve: curve.name.clone(),
        field,
    };
    let x = curve.label_x.ok_or_else(|| missing("label_x"))?;
    let y = curve.label_y.ok_or_else(|| missing("label_y"))?;
    let text = curve.style.label.clone().ok_or_else(|| missing("style.label"))?;

    canvas.add(Artist::Text(TextArtist {
        x: x.0,
        y: y.0,
        text,
        size: curve.fontsize.unwrap_or(LABEL_FONTSIZE),
        rotation: curve.rotation.unwrap_or(0.0),
        color: FIGURE_BLACK,
        h_align: HAlign::Center,
        v_align: VAlign::Top,
    }));
    Ok(())
}

// ---------------------------------------------------------------------------
// Render variants
// ---------------------------------------------------------------------------

/// Plain line with the curve's own style; no figure defaults are merged in.
pub fn plot_limit(canvas: &mut Canvas, curve: &Curve) -> Result<(), RenderError> {
    let data = mass_limit(curve)?;
    let style = &curve.style;

    let color = match style.color(&curve.name)? {
        Some(c) => c,
        None => canvas.next_cycle_color(),
    };
    canvas.add(Artist::Line(LineArtist {
        points: data.points(),
        stroke: Stroke {
            paint: Paint::new(color, style.alpha.unwrap_or(1.0)),
            width: style.linewidth.unwrap_or(LINE_LINEWIDTH),
            style: line_style(style.linestyle.as_deref(), curve)?,
        },
        label: style.label.clone(),
    }));
    render_label(canvas, curve)
}

/// Region above the limit (up to 1), or below it (down to 0) when `low`.
///
/// Requires `edgecolor` in the curve style.
pub fn plot_limit_fill(canvas: &mut Canvas, curve: &Curve, low: bool) -> Result<(), RenderError> {
    let data = mass_limit(curve)?;
    let style = curve.style.merged();

    let edge_color = style.require_edgecolor(&curve.name)?;
    let face_color = style.require_color(&curve.name)?;
    let alpha = style.require_alpha(&curve.name)?;

    canvas.add(fill_to(
        &data,
        bound(low),
        Paint::new(face_color, alpha),
        Some(edge(edge_color, alpha)),
    ));
    Ok(())
}

/// Translucent fill in the curve colour, the label, then an opaque outline.
pub fn plot_limit_final(canvas: &mut Canvas, curve: &Curve, low: bool) -> Result<(), RenderError> {
    let style = curve.style.merged();
    let data = mass_limit(curve)?;
    let color = style.require_color(&curve.name)?;

    canvas.add(fill_to(
        &data,
        bound(low),
        Paint::new(color, FINAL_ALPHA),
        Some(edge(color, FINAL_ALPHA)),
    ));
    render_label(canvas, curve)?;

    canvas.add(Artist::Line(LineArtist {
        points: data.points(),
        stroke: Stroke {
            paint: Paint::opaque(color),
            width: style.linewidth.unwrap_or(LINE_LINEWIDTH),
            style: line_style(style.linestyle.as_deref(), curve)?,
        },
        label: style.label.clone(),
    }));
    Ok(())
}

/// Closed polygon through the curve points at an explicit stacking order.
///
/// Requires `edgecolor` and `linestyle` in the curve style.
pub fn plot_limit_patch(canvas: &mut Canvas, curve: &Curve, zorder: f64) -> Result<(), RenderError> {
    let style = curve.style.merged();
    let data = mass_limit(curve)?;

    let edge_color = style.require_edgecolor(&curve.name)?;
    let face_color = style.require_color(&curve.name)?;
    let linestyle = line_style(Some(style.require_linestyle(&curve.name)?), curve)?;
    let alpha = style.require_alpha(&curve.name)?;

    canvas.add_at(
        Artist::Patch(PatchArtist {
            vertices: data.points(),
            face: Paint::new(face_color, alpha),
            edge: Stroke {
                paint: Paint::new(edge_color, alpha),
                width: PATCH_LINEWIDTH,
                style: linestyle,
            },
        }),
        zorder,
    );
    Ok(())
}

/// Region above the limit in the figure blue, plus the label.
pub fn plot_one(canvas: &mut Canvas, curve: &Curve) -> Result<(), RenderError> {
    let style = curve.style.merged();
    let data = mass_limit(curve)?;
    let alpha = style.require_alpha(&curve.name)?;

    canvas.add(fill_to(
        &data,
        1.0,
        Paint::new(FIGURE_BLUE, alpha),
        Some(edge(FIGURE_BLUE, alpha)),
    ));
    render_label(canvas, curve)
}

/// Loose curve filled in blue, with a faint black band from the tight curve
/// up to the loose one. Both are interpolated onto a shared log grid.
pub fn plot_two(canvas: &mut Canvas, loose: &Curve, tight: &Curve) -> Result<(), RenderError> {
    let style: StyleOptions = loose.style.merged();
    let alpha = style.require_alpha(&loose.name)?;

    let loose_data = mass_limit(loose)?;
    let tight_data = mass_limit(tight)?;
    for (curve, data) in [(loose, &loose_data), (tight, &tight_data)] {
        if !data.is_sorted_by_mass() {
            warn!(
                "curve '{}' is not sorted by mass; interpolated band may be wrong",
                curve.name
            );
        }
    }

    let grid_err = |source| RenderError::Grid {
        loose: loose.name.clone(),
        tight: tight.name.clone(),
        source,
    };
    let (lo_a, hi_a) = loose_data
        .mass_range()
        .ok_or_else(|| grid_err(GridError::NonPositive { lo: f64::NAN, hi: f64::NAN }))?;
    let (lo_b, hi_b) = tight_data
        .mass_range()
        .ok_or_else(|| grid_err(GridError::NonPositive { lo: f64::NAN, hi: f64::NAN }))?;
    let grid = log_grid(lo_a.min(lo_b), hi_a.max(hi_b), GRID_POINTS).map_err(grid_err)?;
    debug!(
        "shared grid for '{}'/'{}': {} points over [{}, {}]",
        loose.name,
        tight.name,
        grid.len(),
        grid[0],
        grid[grid.len() - 1]
    );

    let loose_interp = interp(&grid, &loose_data.mass, &loose_data.limit);
    let tight_interp = interp(&grid, &tight_data.mass, &tight_data.limit);

    canvas.add(fill_to(
        &loose_data,
        1.0,
        Paint::new(FIGURE_BLUE, alpha),
        Some(edge(FIGURE_BLUE, alpha)),
    ));
    canvas.add(Artist::Fill(FillArtist {
        x: grid,
        y1: tight_interp,
        y2: loose_interp,
        face: Paint::new(FIGURE_BLACK, BAND_ALPHA),
        edge: None,
    }));
    render_label(canvas, loose)
}

use std::ops::Range;
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::{info, warn};
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle, FontTransform};

use crate::canvas::{Artist, Canvas, HAlign, LineStyle, Paint, Stroke, TextArtist, VAlign};
use crate::figure::{AxisSpec, FigureSpec};
use crate::geometry::{Point, Rect, clip_polygon, clip_polyline, dash_polyline};

/// Pixels per typographic point; figures are laid out at 100 dpi.
const PX_PER_PT: f64 = 100.0 / 72.0;
const MARGIN: u32 = 20;
const X_LABEL_AREA: u32 = 60;
const Y_LABEL_AREA: u32 = 80;
/// Fraction of the data span added on each side when autoscaling.
const AUTOSCALE_PAD: f64 = 0.05;

/// Tick mantissas tried in turn on log axes until at least two ticks fit.
const LOG_MANTISSAS: [&[f64]; 3] = [
    &[1.0],
    &[1.0, 2.0, 5.0],
    &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
];
const LOG_MAX_TICKS: usize = 10;
const LINEAR_MAX_TICKS: usize = 6;

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<AxisFrame, AxisFrame>>;

// ---------------------------------------------------------------------------
// Output format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "svg" => Ok(OutputFormat::Svg),
            "png" => Ok(OutputFormat::Png),
            other => bail!("Unsupported output extension: .{other} (use .svg or .png)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Axis projection
// ---------------------------------------------------------------------------

/// Maps data values into plotted space (log10 for log axes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisFrame {
    pub log: bool,
    /// Plotted-space range.
    pub lo: f64,
    pub hi: f64,
}

impl AxisFrame {
    fn new(spec: &AxisSpec, data: Option<(f64, f64)>, name: &str) -> Result<Self> {
        let project = |v: f64| if spec.log { v.log10() } else { v };

        let (lo, hi) = match (spec.lim, data) {
            (Some((a, b)), _) => {
                if spec.log && (a <= 0.0 || b <= 0.0) {
                    bail!("{name} axis is logarithmic but its limits [{a}, {b}] are not positive");
                }
                (project(a), project(b))
            }
            (None, Some((a, b))) => {
                let (a, b) = (project(a), project(b));
                let pad = if b > a { (b - a) * AUTOSCALE_PAD } else { 0.5 };
                (a - pad, b + pad)
            }
            (None, None) => (0.0, 1.0),
        };
        if !(lo.is_finite() && hi.is_finite()) || lo == hi {
            bail!("{name} axis range [{lo}, {hi}] is empty or not finite");
        }
        Ok(AxisFrame {
            log: spec.log,
            lo: lo.min(hi),
            hi: lo.max(hi),
        })
    }

    /// Plotted-space value. Non-positive values on a log axis land well
    /// below the visible range so clipping removes them.
    pub fn project(&self, v: f64) -> f64 {
        if !self.log {
            return v;
        }
        if v > 0.0 {
            v.log10()
        } else {
            self.lo - 10.0 * (self.hi - self.lo)
        }
    }

    fn linear(&self) -> RangedCoordf64 {
        (self.lo..self.hi).into()
    }

    /// Log-axis ticks in plotted space: decades when two or more fit, then
    /// 1-2-5 and 1..9 mantissas, then plain linear ticks of the data range.
    fn log_ticks(&self, max: usize) -> Vec<f64> {
        let max = max.max(2);
        for mantissas in LOG_MANTISSAS {
            let ticks = self.mantissa_ticks(mantissas);
            if ticks.len() >= 2 {
                let step = ticks.len().div_ceil(max);
                return ticks.into_iter().step_by(step).collect();
            }
        }
        let data: RangedCoordf64 = (10f64.powf(self.lo)..10f64.powf(self.hi)).into();
        data.key_points(max)
            .into_iter()
            .filter(|v| *v > 0.0)
            .map(f64::log10)
            .collect()
    }

    fn mantissa_ticks(&self, mantissas: &[f64]) -> Vec<f64> {
        let (first, last) = (self.lo.floor() as i32, self.hi.ceil() as i32);
        (first..=last)
            .flat_map(|exp| mantissas.iter().map(move |m| m.log10() + f64::from(exp)))
            .filter(|v| *v >= self.lo - 1e-9 && *v <= self.hi + 1e-9)
            .collect()
    }

    fn tick_label(&self, v: f64) -> String {
        if !self.log {
            return trim_number(v);
        }
        let exp = (v + 1e-9).floor();
        if (-2.0..=3.0).contains(&exp) {
            return trim_number(10f64.powf(v));
        }
        let mantissa = (10f64.powf(v - exp) * 1e3).round() / 1e3;
        if mantissa == 1.0 {
            format!("1e{exp}")
        } else {
            format!("{mantissa}e{exp}")
        }
    }

    fn n_labels(&self) -> usize {
        if self.log {
            LOG_MAX_TICKS
        } else {
            LINEAR_MAX_TICKS
        }
    }
}

/// Plotted space is linear; only the tick choice depends on the axis kind.
impl Ranged for AxisFrame {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.linear().map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        if self.log {
            self.log_ticks(hint.max_num_points())
        } else {
            self.linear().key_points(hint)
        }
    }

    fn range(&self) -> Range<f64> {
        self.lo..self.hi
    }
}

fn trim_number(v: f64) -> String {
    let rounded = (v * 1e6).round() / 1e6;
    if rounded == 0.0 {
        return "0".into();
    }
    format!("{rounded}")
}

/// Plotted-space frame of a whole figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: AxisFrame,
    pub y: AxisFrame,
    /// Pixels per plotted unit, per axis; used for dash lengths.
    pub scale: (f64, f64),
}

impl Frame {
    pub fn new(figure: &FigureSpec, canvas: &Canvas) -> Result<Self> {
        let (x_log, y_log) = (figure.axes.x.log, figure.axes.y.log);
        let bounds = canvas.data_bounds(|x, y| (!x_log || x > 0.0) && (!y_log || y > 0.0));
        let x = AxisFrame::new(&figure.axes.x, bounds.map(|b| b.0), "x")?;
        let y = AxisFrame::new(&figure.axes.y, bounds.map(|b| b.1), "y")?;

        let (w, h) = figure.size;
        let plot_w = w.saturating_sub(2 * MARGIN + Y_LABEL_AREA).max(1) as f64;
        let plot_h = h.saturating_sub(2 * MARGIN + X_LABEL_AREA).max(1) as f64;
        Ok(Frame {
            x,
            y,
            scale: (plot_w / (x.hi - x.lo), plot_h / (y.hi - y.lo)),
        })
    }

    pub fn project(&self, (x, y): Point) -> Point {
        (self.x.project(x), self.y.project(y))
    }

    pub fn rect(&self) -> Rect {
        Rect {
            x0: self.x.lo,
            x1: self.x.hi,
            y0: self.y.lo,
            y1: self.y.hi,
        }
    }

    /// Visible stroke pieces of an open or closed path after clipping and dashing.
    pub fn stroke_pieces(&self, points: &[Point], stroke: &Stroke, closed: bool) -> Vec<Vec<Point>> {
        if stroke.style == LineStyle::Hidden || stroke.width <= 0.0 {
            return Vec::new();
        }
        let mut projected: Vec<Point> = points.iter().map(|&p| self.project(p)).collect();
        if closed {
            if let Some(&first) = projected.first() {
                projected.push(first);
            }
        }
        let pattern: Vec<f64> = stroke
            .style
            .dash_pattern()
            .iter()
            .map(|len| len * stroke.width * PX_PER_PT)
            .collect();

        clip_polyline(&projected, self.rect())
            .iter()
            .flat_map(|run| dash_polyline(run, &pattern, self.scale))
            .collect()
    }

    /// Visible area of a closed polygon.
    pub fn fill_area(&self, points: &[Point]) -> Vec<Point> {
        let projected: Vec<Point> = points.iter().map(|&p| self.project(p)).collect();
        clip_polygon(&projected, self.rect())
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Write `canvas` to `path` as SVG or PNG, chosen by extension.
pub fn save(canvas: &Canvas, figure: &FigureSpec, path: &Path) -> Result<()> {
    let format = OutputFormat::from_path(path)?;
    let frame = Frame::new(figure, canvas)?;

    match format {
        OutputFormat::Svg => {
            let root = SVGBackend::new(path, figure.size).into_drawing_area();
            draw_figure(root, canvas, figure, &frame)
        }
        OutputFormat::Png => {
            let root = BitMapBackend::new(path, figure.size).into_drawing_area();
            draw_figure(root, canvas, figure, &frame)
        }
    }
    .with_context(|| format!("rendering {}", path.display()))?;

    info!("wrote {}", path.display());
    Ok(())
}

fn draw_figure<DB>(
    root: DrawingArea<DB, plotters::coord::Shift>,
    canvas: &Canvas,
    figure: &FigureSpec,
    frame: &Frame,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let axis_font = FontDesc::new(FontFamily::SansSerif, 14.0 * PX_PER_PT, FontStyle::Normal);
    let tick_font = FontDesc::new(FontFamily::SansSerif, 12.0 * PX_PER_PT, FontStyle::Normal);

    let mut builder = ChartBuilder::on(&root);
    builder
        .margin(MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA);
    if let Some(title) = &figure.axes.title {
        builder.caption(title, axis_font.clone());
    }
    let mut chart = builder.build_cartesian_2d(frame.x, frame.y)?;

    let fmt_x = |v: &f64| frame.x.tick_label(*v);
    let fmt_y = |v: &f64| frame.y.tick_label(*v);
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(frame.x.n_labels())
        .y_labels(frame.y.n_labels())
        .x_label_formatter(&fmt_x)
        .y_label_formatter(&fmt_y)
        .x_desc(figure.axes.x.label.clone().unwrap_or_default())
        .y_desc(figure.axes.y.label.clone().unwrap_or_default())
        .axis_desc_style(axis_font.color(&BLACK))
        .label_style(tick_font.color(&BLACK))
        .draw()?;

    let mut labelled = 0usize;
    for layer in canvas.draw_order() {
        match &layer.artist {
            Artist::Fill(fill) => {
                let outline = fill.outline();
                draw_area(&mut chart, frame, &outline, fill.face)?;
                if let Some(edge) = &fill.edge {
                    draw_stroke(&mut chart, frame, &outline, edge, true, None)?;
                }
            }
            Artist::Patch(patch) => {
                draw_area(&mut chart, frame, &patch.vertices, patch.face)?;
                draw_stroke(&mut chart, frame, &patch.vertices, &patch.edge, true, None)?;
            }
            Artist::Line(line) => {
                let label = line.label.as_deref().filter(|_| figure.axes.legend);
                if draw_stroke(&mut chart, frame, &line.points, &line.stroke, false, label)? {
                    labelled += 1;
                }
            }
            Artist::Text(text) => draw_text(&mut chart, frame, text)?,
        }
    }

    if labelled > 0 {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK.mix(0.3))
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn shape(paint: Paint, filled: bool, width: f64) -> ShapeStyle {
    ShapeStyle {
        color: paint.color.mix(paint.alpha),
        filled,
        stroke_width: (width * PX_PER_PT).round().max(1.0) as u32,
    }
}

fn draw_area<DB>(chart: &mut Chart<'_, DB>, frame: &Frame, points: &[Point], paint: Paint) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let area = frame.fill_area(points);
    if area.len() < 3 || paint.alpha <= 0.0 {
        return Ok(());
    }
    chart.draw_series(std::iter::once(Polygon::new(area, shape(paint, true, 0.0))))?;
    Ok(())
}

/// Returns whether a legend entry was attached.
fn draw_stroke<DB>(
    chart: &mut Chart<'_, DB>,
    frame: &Frame,
    points: &[Point],
    stroke: &Stroke,
    closed: bool,
    label: Option<&str>,
) -> Result<bool>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let style = shape(stroke.paint, false, stroke.width);
    let mut labelled = false;
    for piece in frame.stroke_pieces(points, stroke, closed) {
        let anno = chart.draw_series(std::iter::once(PathElement::new(piece, style)))?;
        if let (Some(text), false) = (label, labelled) {
            anno.label(text)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], style));
            labelled = true;
        }
    }
    Ok(labelled)
}

fn draw_text<DB>(chart: &mut Chart<'_, DB>, frame: &Frame, text: &TextArtist) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (x, y) = frame.project((text.x, text.y));
    if !frame.rect().contains((x, y)) {
        warn!("label '{}' at ({}, {}) is outside the axes", text.text, text.x, text.y);
    }

    let h = match text.h_align {
        HAlign::Left => HPos::Left,
        HAlign::Center => HPos::Center,
        HAlign::Right => HPos::Right,
    };
    let v = match text.v_align {
        VAlign::Top => VPos::Top,
        VAlign::Center => VPos::Center,
        VAlign::Bottom => VPos::Bottom,
    };
    let style = FontDesc::new(FontFamily::SansSerif, text.size * PX_PER_PT, FontStyle::Normal)
        .transform(quarter_turn(text.rotation, &text.text))
        .color(&text.color)
        .pos(Pos::new(h, v));

    chart.draw_series(std::iter::once(Text::new(text.text.clone(), (x, y), style)))?;
    Ok(())
}

/// Nearest supported rotation for a counter-clockwise angle in degrees.
pub fn quarter_turn(degrees: f64, what: &str) -> FontTransform {
    let quarters = (degrees / 90.0).round();
    if (degrees - quarters * 90.0).abs() > 1e-6 {
        warn!("rotation {degrees}° of '{what}' snapped to {}°", quarters * 90.0);
    }
    match (quarters as i64).rem_euclid(4) {
        1 => FontTransform::Rotate270,
        2 => FontTransform::Rotate180,
        3 => FontTransform::Rotate90,
        _ => FontTransform::None,
    }
}

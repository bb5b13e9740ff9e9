use approx::assert_abs_diff_eq;
use limit_plot::canvas::{Artist, Canvas, HAlign, LineStyle, VAlign, ZORDER_FILL};
use limit_plot::color::{FIGURE_BLACK, FIGURE_BLUE, parse_color};
use limit_plot::data::model::{Curve, MassUnit};
use limit_plot::grid::GRID_POINTS;
use limit_plot::render::{self, RenderError};
use limit_plot::style::{ALPHA, StyleError, StyleOptions};

fn styled(xy: &str, name: &str, style: StyleOptions) -> Curve {
    Curve::from_xystring(xy)
        .with_name(name)
        .with_style(style)
        .with_label_at(10.0, 0.8)
}

fn labelled(label: &str) -> StyleOptions {
    StyleOptions {
        label: Some(label.into()),
        ..StyleOptions::default()
    }
}

fn kinds(canvas: &Canvas) -> Vec<&'static str> {
    canvas
        .layers()
        .iter()
        .map(|l| match l.artist {
            Artist::Line(_) => "line",
            Artist::Fill(_) => "fill",
            Artist::Patch(_) => "patch",
            Artist::Text(_) => "text",
        })
        .collect()
}

#[test]
fn plain_line_uses_curve_style_verbatim() {
    let style = StyleOptions {
        color: Some("red".into()),
        linestyle: Some("--".into()),
        ..labelled("CMB")
    };
    let curve = styled("1 0.5\n10 0.1", "cmb", style);
    let mut canvas = Canvas::new();
    render::plot_limit(&mut canvas, &curve).unwrap();

    assert_eq!(kinds(&canvas), ["line", "text"]);
    let Artist::Line(line) = &canvas.layers()[0].artist else {
        panic!("expected a line");
    };
    assert_eq!(line.points, vec![(1.0, 0.5), (10.0, 0.1)]);
    assert_eq!(line.stroke.paint.color, parse_color("red").unwrap());
    assert_abs_diff_eq!(line.stroke.paint.alpha, 1.0);
    assert_eq!(line.stroke.style, LineStyle::Dashed);
    assert_eq!(line.label.as_deref(), Some("CMB"));
}

#[test]
fn plain_line_without_colour_takes_cycle() {
    let a = styled("1 0.5\n10 0.1", "a", labelled("A"));
    let b = styled("1 0.4\n10 0.2", "b", labelled("B"));
    let mut canvas = Canvas::new();
    render::plot_limit(&mut canvas, &a).unwrap();
    render::plot_limit(&mut canvas, &b).unwrap();

    let colors: Vec<_> = canvas
        .layers()
        .iter()
        .filter_map(|l| match &l.artist {
            Artist::Line(line) => Some(line.stroke.paint.color),
            _ => None,
        })
        .collect();
    assert_eq!(colors.len(), 2);
    assert_ne!(colors[0], colors[1]);
}

#[test]
fn label_is_centred_and_hangs_from_its_anchor() {
    let mut curve = styled("1 0.5", "c", labelled("Dwarfs"));
    curve.rotation = Some(90.0);
    let mut canvas = Canvas::new();
    render::render_label(&mut canvas, &curve).unwrap();

    let Artist::Text(text) = &canvas.layers()[0].artist else {
        panic!("expected text");
    };
    assert_eq!(text.text, "Dwarfs");
    assert_eq!((text.x, text.y), (10.0, 0.8));
    assert_abs_diff_eq!(text.size, render::LABEL_FONTSIZE);
    assert_abs_diff_eq!(text.rotation, 90.0);
    assert_eq!(text.h_align, HAlign::Center);
    assert_eq!(text.v_align, VAlign::Top);
}

#[test]
fn label_without_position_is_an_error() {
    let curve = Curve::from_xystring("1 0.5")
        .with_name("bare")
        .with_style(labelled("Bare"));
    let mut canvas = Canvas::new();
    let err = render::render_label(&mut canvas, &curve).unwrap_err();
    assert!(matches!(
        err,
        RenderError::MissingLabelField {
            field: "label_x",
            ..
        }
    ));
    assert!(canvas.is_empty());
}

#[test]
fn fill_requires_edgecolor() {
    let curve = styled("1 0.5\n10 0.1", "noedge", StyleOptions::default());
    let mut canvas = Canvas::new();
    let err = render::plot_limit_fill(&mut canvas, &curve, false).unwrap_err();
    assert!(matches!(
        err,
        RenderError::Style(StyleError::Missing {
            key: "edgecolor",
            ..
        })
    ));
}

#[test]
fn fill_goes_up_to_one_or_down_to_zero() {
    let style = StyleOptions {
        edgecolor: Some("k".into()),
        ..StyleOptions::default()
    };
    let curve = styled("1 0.5\n10 0.1", "f", style);
    for (low, bound) in [(false, 1.0), (true, 0.0)] {
        let mut canvas = Canvas::new();
        render::plot_limit_fill(&mut canvas, &curve, low).unwrap();
        assert_eq!(kinds(&canvas), ["fill"]);
        let Artist::Fill(fill) = &canvas.layers()[0].artist else {
            unreachable!()
        };
        assert_eq!(fill.y1, vec![0.5, 0.1]);
        assert_eq!(fill.y2, vec![bound, bound]);
        assert_eq!(fill.face.color, FIGURE_BLUE);
        assert_abs_diff_eq!(fill.face.alpha, ALPHA);
        let edge = fill.edge.as_ref().unwrap();
        assert_eq!(edge.paint.color, FIGURE_BLACK);
    }
}

#[test]
fn final_is_fill_label_then_opaque_line() {
    let style = StyleOptions {
        color: Some("orange".into()),
        ..labelled("Final")
    };
    let curve = styled("1 0.5\n10 0.1", "final", style);
    let mut canvas = Canvas::new();
    render::plot_limit_final(&mut canvas, &curve, true).unwrap();

    assert_eq!(kinds(&canvas), ["fill", "text", "line"]);
    let orange = parse_color("orange").unwrap();
    let Artist::Fill(fill) = &canvas.layers()[0].artist else {
        unreachable!()
    };
    assert_eq!(fill.face.color, orange);
    assert_abs_diff_eq!(fill.face.alpha, render::FINAL_ALPHA);
    assert_eq!(fill.y2, vec![0.0, 0.0]);
    let Artist::Line(line) = &canvas.layers()[2].artist else {
        unreachable!()
    };
    assert_eq!(line.stroke.paint.color, orange);
    assert_abs_diff_eq!(line.stroke.paint.alpha, 1.0);
}

#[test]
fn patch_keeps_its_zorder_and_needs_linestyle() {
    let mut style = StyleOptions {
        edgecolor: Some("gray".into()),
        ..StyleOptions::default()
    };
    let curve = styled("1 0.5\n10 0.1\n10 1", "p", style.clone());
    let mut canvas = Canvas::new();
    let err = render::plot_limit_patch(&mut canvas, &curve, 5.0).unwrap_err();
    assert!(matches!(
        err,
        RenderError::Style(StyleError::Missing {
            key: "linestyle",
            ..
        })
    ));

    style.linestyle = Some(":".into());
    let curve = curve.with_style(style);
    render::plot_limit_patch(&mut canvas, &curve, 5.0).unwrap();
    assert_eq!(kinds(&canvas), ["patch"]);
    assert_abs_diff_eq!(canvas.layers()[0].zorder, 5.0);
    let Artist::Patch(patch) = &canvas.layers()[0].artist else {
        unreachable!()
    };
    assert_eq!(patch.vertices.len(), 3);
    assert_eq!(patch.edge.style, LineStyle::Dotted);
}

#[test]
fn single_fill_is_always_blue() {
    let style = StyleOptions {
        color: Some("red".into()),
        alpha: Some(0.5),
        ..labelled("One")
    };
    let curve = styled("1 0.5\n10 0.1", "one", style);
    let mut canvas = Canvas::new();
    render::plot_one(&mut canvas, &curve).unwrap();

    assert_eq!(kinds(&canvas), ["fill", "text"]);
    let Artist::Fill(fill) = &canvas.layers()[0].artist else {
        unreachable!()
    };
    assert_eq!(fill.face.color, FIGURE_BLUE);
    assert_abs_diff_eq!(fill.face.alpha, 0.5);
    assert_eq!(fill.y2, vec![1.0, 1.0]);
}

#[test]
fn double_fill_interpolates_band_on_shared_grid() {
    let loose = styled("1 0.5\n100 0.1", "loose", labelled("Loose"));
    let tight = Curve::from_xystring("10 0.05\n1000 0.01").with_name("tight");
    let mut canvas = Canvas::new();
    render::plot_two(&mut canvas, &loose, &tight).unwrap();

    assert_eq!(kinds(&canvas), ["fill", "fill", "text"]);
    let Artist::Fill(band) = &canvas.layers()[1].artist else {
        unreachable!()
    };
    assert_eq!(band.x.len(), GRID_POINTS);
    assert_abs_diff_eq!(band.x[0], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(band.x[GRID_POINTS - 1], 1000.0, epsilon = 1e-9);
    // both curves clamp to their end values outside their own range
    assert_abs_diff_eq!(band.y1[0], 0.05);
    assert_abs_diff_eq!(band.y2[GRID_POINTS - 1], 0.1);
    assert_eq!(band.face.color, FIGURE_BLACK);
    assert_abs_diff_eq!(band.face.alpha, render::BAND_ALPHA);
    assert!(band.edge.is_none());

    let Artist::Text(text) = &canvas.layers()[2].artist else {
        unreachable!()
    };
    assert_eq!(text.text, "Loose");
}

#[test]
fn draw_order_puts_fills_under_lines_under_text() {
    let style = StyleOptions {
        color: Some("blue".into()),
        ..labelled("Final")
    };
    let curve = styled("1 0.5\n10 0.1", "final", style);
    let mut canvas = Canvas::new();
    render::plot_limit_final(&mut canvas, &curve, false).unwrap();

    let order: Vec<f64> = canvas.draw_order().iter().map(|l| l.zorder).collect();
    assert_eq!(order[0], ZORDER_FILL);
    assert!(order.windows(2).all(|w| w[0] <= w[1]));
    assert!(matches!(canvas.draw_order()[2].artist, Artist::Text(_)));
}

#[test]
fn units_are_applied_before_drawing() {
    let curve = styled("2 0.5\n4 0.1", "tev", labelled("TeV")).with_unit(MassUnit::Tev);
    let mut canvas = Canvas::new();
    render::plot_limit(&mut canvas, &curve).unwrap();
    let Artist::Line(line) = &canvas.layers()[0].artist else {
        unreachable!()
    };
    assert_eq!(line.points, vec![(2000.0, 0.5), (4000.0, 0.1)]);
}

#[test]
fn malformed_blob_names_the_curve() {
    let curve = styled("1 0.5\n10 abc", "broken", labelled("Broken"));
    let mut canvas = Canvas::new();
    let err = render::plot_limit(&mut canvas, &curve).unwrap_err();
    assert!(err.to_string().contains("'broken'"), "{err}");
}

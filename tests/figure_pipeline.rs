use std::fs;
use std::path::Path;
use std::sync::Arc;

use approx::assert_abs_diff_eq;
use arrow::array::Float64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use limit_plot::canvas::Artist;
use limit_plot::data::paths::locate_data_dir_in;
use limit_plot::figure::FigureSpec;
use limit_plot::plot::{Frame, OutputFormat};

const FIGURE: &str = r##"{
    "size": [800, 600],
    "axes": {
        "x": { "log": true, "lim": [1, 10000], "label": "Mass (GeV)" },
        "y": { "lim": [0, 1] },
        "legend": true
    },
    "curves": {
        "loose": { "file": "loose.csv", "label_x": 20, "label_y": 0.9, "style": { "label": "Loose" } },
        "tight": { "file": "tight.json" },
        "collider": {
            "file": "collider.parquet",
            "mass_unit": "tev",
            "style": { "edgecolor": "k", "linestyle": "-." }
        },
        "dwarfs": {
            "xystring": "# inline\n2 0.6\n20 0.3\n200 0.2\n",
            "label_x": "200", "label_y": "0.25",
            "style": { "color": "C2", "label": "Dwarfs" }
        }
    },
    "layers": [
        { "kind": "two", "loose": "loose", "tight": "tight" },
        { "kind": "patch", "curve": "collider", "zorder": 0.5 },
        { "kind": "final", "curve": "dwarfs", "low": true }
    ]
}"##;

fn write_collider(path: &Path) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("mass", DataType::Float64, false),
        Field::new("limit", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(vec![0.1, 1.0, 1.0])),
            Arc::new(Float64Array::from(vec![0.4, 0.2, 1.0])),
        ],
    )
    .unwrap();
    let file = fs::File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

/// `root/work` is the working directory; the data lives in `root/data`.
fn sample_tree(root: &Path) -> std::path::PathBuf {
    let data = root.join("data");
    fs::create_dir_all(&data).unwrap();
    fs::create_dir_all(root.join("work")).unwrap();

    fs::write(data.join("loose.csv"), "mass,limit\n1,0.5\n10,0.3\n100,0.1\n").unwrap();
    fs::write(data.join("tight.json"), "[[5, 0.2], [50, 0.05], [500, 0.02]]").unwrap();
    write_collider(&data.join("collider.parquet"));
    fs::write(data.join("figure.json"), FIGURE).unwrap();
    data
}

#[test]
fn figure_builds_from_sibling_data_directory() {
    let root = tempfile::tempdir().unwrap();
    sample_tree(root.path());

    let data_dir = locate_data_dir_in(&root.path().join("work")).unwrap();
    assert!(data_dir.ends_with("../data"), "{}", data_dir.display());

    let mut figure = FigureSpec::from_path(&data_dir.join("figure.json")).unwrap();
    assert!(figure.needs_data_dir());
    figure.resolve_sources(&data_dir).unwrap();

    let canvas = figure.build_canvas().unwrap();
    // two: fill + band + label; patch; final: fill + label + line
    assert_eq!(canvas.len(), 7);

    let patch = canvas
        .layers()
        .iter()
        .find_map(|l| match &l.artist {
            Artist::Patch(p) => Some((l.zorder, p)),
            _ => None,
        })
        .unwrap();
    assert_abs_diff_eq!(patch.0, 0.5);
    let masses: Vec<f64> = patch.1.vertices.iter().map(|v| v.0).collect();
    assert_eq!(masses, vec![100.0, 1000.0, 1000.0]);

    // the patch was added second but sits below every default layer
    assert!(matches!(canvas.draw_order()[0].artist, Artist::Patch(_)));
}

#[test]
fn frame_follows_axis_limits() {
    let root = tempfile::tempdir().unwrap();
    let data_dir = sample_tree(root.path());

    let mut figure = FigureSpec::from_path(&data_dir.join("figure.json")).unwrap();
    figure.resolve_sources(&data_dir).unwrap();
    let canvas = figure.build_canvas().unwrap();

    let frame = Frame::new(&figure, &canvas).unwrap();
    assert!(frame.x.log);
    assert_abs_diff_eq!(frame.x.lo, 0.0);
    assert_abs_diff_eq!(frame.x.hi, 4.0);
    assert_abs_diff_eq!(frame.y.lo, 0.0);
    assert_abs_diff_eq!(frame.y.hi, 1.0);

    let (x, y) = frame.project((100.0, 0.5));
    assert_abs_diff_eq!(x, 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(y, 0.5);
}

#[test]
fn missing_data_directory_lists_candidates() {
    let root = tempfile::tempdir().unwrap();
    let err = locate_data_dir_in(root.path()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("Data directory not found"), "{msg}");
    assert!(msg.contains("data"), "{msg}");
}

#[test]
fn output_format_comes_from_extension() {
    assert_eq!(
        OutputFormat::from_path(Path::new("limits.SVG")).unwrap(),
        OutputFormat::Svg
    );
    assert_eq!(
        OutputFormat::from_path(Path::new("limits.png")).unwrap(),
        OutputFormat::Png
    );
    assert!(OutputFormat::from_path(Path::new("limits.pdf")).is_err());
}

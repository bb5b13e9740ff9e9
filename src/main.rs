use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueHint};
use log::{debug, info};

use limit_plot::data::paths::{locate_data_dir, locate_data_file};
use limit_plot::figure::FigureSpec;
use limit_plot::plot;

#[derive(Parser, Debug)]
#[command(author, version, about = "Render exclusion-limit curves to SVG/PNG", long_about = None)]
struct Cli {
    /// Figure description (JSON). Looked up in the data directory when the
    /// path does not exist as given.
    #[arg(value_hint = ValueHint::FilePath)]
    figure: PathBuf,

    /// Output figure path (.svg or .png); defaults to the figure name with .svg
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Data directory; defaults to ./data or ../data
    #[arg(long, value_hint = ValueHint::DirPath)]
    data_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let figure_path = resolve_figure(&cli.figure)?;
    info!("loading figure {}", figure_path.display());
    let mut figure = FigureSpec::from_path(&figure_path)?;

    if figure.needs_data_dir() {
        let data_dir = match cli.data_dir {
            Some(dir) => dir,
            None => locate_data_dir()?,
        };
        debug!("data directory: {}", data_dir.display());
        figure.resolve_sources(&data_dir)?;
    }

    let canvas = figure.build_canvas()?;
    let output = cli
        .output
        .unwrap_or_else(|| figure_path.with_extension("svg"));
    plot::save(&canvas, &figure, &output)
        .with_context(|| format!("saving {}", output.display()))
}

fn resolve_figure(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    let name = path
        .to_str()
        .with_context(|| format!("figure path {} is not valid UTF-8", path.display()))?;
    Ok(locate_data_file(name)?)
}

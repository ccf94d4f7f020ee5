use std::path::{Path, PathBuf};

use canvas::collab::RawImage;
use canvas::doc::Color;
use canvas::geometry::Size;
use clap::{Args, Parser, Subcommand, ValueEnum};
use session::storage::{self, StorageError};
use session::{CodecError, FitPolicy, RestoreTarget, SessionFile, SessionSummary};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("density factor must be positive, got {0}")]
    InvalidDensity(f64),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "overlay", about = "Inspect, create and restore screen-annotation sessions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a session's header, sizes and annotation counts.
    Inspect(InspectArgs),
    /// Fit a session onto a different screen and write the result.
    Restore(RestoreArgs),
    /// Write an empty session over a blank canvas.
    New(NewArgs),
}

#[derive(Args, Debug)]
struct InspectArgs {
    file: PathBuf,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct RestoreArgs {
    file: PathBuf,
    #[arg(long, value_parser = parse_size)]
    screen: Size,
    #[arg(long, env = "OVERLAY_DENSITY_FACTOR", default_value_t = 1.0)]
    density: f64,
    #[arg(long, value_enum)]
    fit: Option<Fit>,
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct NewArgs {
    #[arg(long, value_parser = parse_size)]
    screen: Size,
    #[arg(long, env = "OVERLAY_DENSITY_FACTOR", default_value_t = 1.0)]
    density: f64,
    #[arg(long)]
    out: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Fit {
    Width,
    Height,
}

impl From<Fit> for FitPolicy {
    fn from(fit: Fit) -> Self {
        match fit {
            Fit::Width => Self::Width,
            Fit::Height => Self::Height,
        }
    }
}

/// Parse `WIDTHxHEIGHT`, both positive.
fn parse_size(raw: &str) -> Result<Size, String> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {raw:?}"))?;
    let width: i32 = w.trim().parse().map_err(|_| format!("invalid width {w:?}"))?;
    let height: i32 = h.trim().parse().map_err(|_| format!("invalid height {h:?}"))?;
    if width <= 0 || height <= 0 {
        return Err(format!("size must be positive, got {width}x{height}"));
    }
    Ok(Size::new(width, height))
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Inspect(args) => {
            let text = run_inspect(&args.file, args.json)?;
            println!("{text}");
            Ok(())
        }
        Command::Restore(args) => run_restore(&args),
        Command::New(args) => run_new(&args),
    }
}

fn run_inspect(path: &Path, json: bool) -> Result<String, CliError> {
    let summary = storage::load_from_path(path)?.summary();
    if json {
        return Ok(serde_json::to_string_pretty(&summary)?);
    }
    Ok(format_summary(&summary))
}

fn format_summary(s: &SessionSummary) -> String {
    let mut lines = vec![
        format!("version          {}", s.version),
        format!("screen           {}x{}", s.screen.width, s.screen.height),
        format!("canvas           {}x{}", s.canvas.width, s.canvas.height),
        format!("canvas original  {}x{}", s.canvas_original.width, s.canvas_original.height),
        format!("density factor   {}", s.density_factor),
        format!("image / video    {} / {}", s.image_extension, s.video_extension),
        format!("live mode        {}", s.live_mode),
        format!("draw mode        {:?}", s.draw_mode),
    ];
    for (name, n) in [
        ("rectangles", s.rectangles),
        ("lines", s.lines),
        ("arrows", s.arrows),
        ("ellipses", s.ellipses),
        ("texts", s.texts),
        ("freeforms", s.freeforms),
        ("highlights", s.highlights),
    ] {
        lines.push(format!("{name:<17}{n}"));
    }
    lines.join("\n")
}

fn run_restore(args: &RestoreArgs) -> Result<(), CliError> {
    check_density(args.density)?;
    let file = storage::load_from_path(&args.file)?;
    let mut target = RestoreTarget::new(args.screen, args.density);
    if let Some(fit) = args.fit {
        target = target.with_fit(fit.into());
    }
    let restored = session::restore(file, target)?;
    storage::save_to_path(&args.out, &restored.file)?;
    info!(
        from = %args.file.display(),
        to = %args.out.display(),
        fit = ?restored.fit,
        "session restored"
    );
    Ok(())
}

fn run_new(args: &NewArgs) -> Result<(), CliError> {
    check_density(args.density)?;
    let inv = 1.0 / args.density;
    let raw = args.screen.scale(inv, inv);
    let canvas = RawImage::filled(raw.width.max(1) as u32, raw.height.max(1) as u32, Color::rgb(255, 255, 255));
    let file = SessionFile::new(canvas, args.screen, args.density);
    storage::save_to_path(&args.out, &file)?;
    Ok(())
}

fn check_density(density: f64) -> Result<(), CliError> {
    if density > 0.0 { Ok(()) } else { Err(CliError::InvalidDensity(density)) }
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use mathreel::{
    Alignment, FfmpegSink, Formula, FrameIndex, FrameRange, FunctionGraph, Label,
    LatexTypesetter, ParleyShaper, Player, PngSequenceSink, Point, Timeline, VideoConfig, palette,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mathreel", version)]
struct Cli {
    /// Video config JSON. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame of the demo as a PNG.
    Frame(FrameArgs),
    /// Render the demo as an MP4 video (requires `ffmpeg`).
    Render(RenderArgs),
    /// Render the demo as a numbered PNG sequence.
    Frames(FramesArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Keep an existing output file instead of replacing it.
    #[arg(long)]
    no_overwrite: bool,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    /// Output directory.
    #[arg(long)]
    out_dir: PathBuf,

    /// Stop after this many frames.
    #[arg(long)]
    limit: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Frame(args) => cmd_frame(&cfg, args),
        Command::Render(args) => cmd_render(&cfg, args),
        Command::Frames(args) => cmd_frames(&cfg, args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<VideoConfig> {
    let cfg = match path {
        Some(p) => VideoConfig::from_path(p)?,
        None => VideoConfig::default(),
    };
    Ok(cfg.with_env_overrides())
}

fn cmd_frame(cfg: &VideoConfig, args: FrameArgs) -> anyhow::Result<()> {
    let mut player = demo_player(cfg)?;
    let frame = player.render_frame(FrameIndex(args.frame))?;

    mathreel::write_png(&args.out, &frame)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(cfg: &VideoConfig, args: RenderArgs) -> anyhow::Result<()> {
    if !cfg.encoder.is_available() {
        anyhow::bail!(
            "'{}' was not found; install ffmpeg or set MATHREEL_FFMPEG",
            cfg.encoder.program
        );
    }
    let mut player = demo_player(cfg)?;
    let mut sink = FfmpegSink::from_config(&args.out, cfg).overwrite(!args.no_overwrite);

    let range = FrameRange::new(FrameIndex(0), player.end_frame())?;
    let stats = player.render_range(range, &mut sink)?;

    eprintln!(
        "wrote {} ({} frames, {:.2}s)",
        args.out.display(),
        stats.frames_rendered,
        player.fps().frames_to_secs(stats.frames_rendered)
    );
    Ok(())
}

fn cmd_frames(cfg: &VideoConfig, args: FramesArgs) -> anyhow::Result<()> {
    let mut player = demo_player(cfg)?;
    let end = match args.limit {
        Some(n) => player.end_frame().0.min(n),
        None => player.end_frame().0,
    };
    let mut sink = PngSequenceSink::new(&args.out_dir);
    let range = FrameRange::new(FrameIndex(0), FrameIndex(end))?;
    player.render_range(range, &mut sink)?;

    eprintln!(
        "wrote {} frames to {}",
        sink.written().len(),
        args.out_dir.display()
    );
    Ok(())
}

/// The built-in demo: a height-coded sine wave that morphs into a parabola, with a formula and a
/// caption when TeX tools and a label font are available.
fn demo_player(cfg: &VideoConfig) -> anyhow::Result<Player> {
    let canvas = cfg.canvas()?;
    let mut scene = cfg.scene()?;

    let keys = [(-1, palette::BLUE), (0, palette::GREEN), (1, palette::YELLOW)];
    let sine = FunctionGraph::height_coded(f64::sin, keys, 4.0)?
        .spanning(canvas)
        .with_scale(100);
    let parabola = FunctionGraph::height_coded(|x| x * x / 4.0 - 1.0, keys, 4.0)?
        .spanning(canvas)
        .with_scale(100);
    let graph = scene.insert(sine);

    let label = match &cfg.font_path {
        Some(path) => match ParleyShaper::from_path(path) {
            Ok(shaper) => {
                scene = scene.with_shaper(shaper);
                let top = f64::from(canvas.height) / 2.0 - 120.0;
                Some(scene.insert(
                    Label::new("Waves and parabolas", palette::WHITE, Point::new(0.0, top))
                        .with_font_size(72.0),
                ))
            }
            Err(e) => {
                tracing::warn!(error = %e, "label font unavailable; skipping caption");
                None
            }
        },
        None => None,
    };

    let formula = if cfg.latex.is_available() {
        scene = scene.with_typesetter(LatexTypesetter::new(cfg.latex.clone()));
        let corner = Point::new(
            f64::from(canvas.width) / 2.0 - 40.0,
            -f64::from(canvas.height) / 2.0 + 40.0,
        );
        Some(scene.insert(
            Formula::new(r"y = \sin x", palette::WHITE, corner)
                .with_size(60.0)
                .with_alignment(Alignment::Right),
        ))
    } else {
        tracing::warn!("latex/dvisvgm unavailable; skipping formula");
        None
    };

    let second = Duration::from_secs(1);
    let mut timeline = Timeline::new();
    if let Some(label) = label {
        timeline = timeline.animate_wait(label, second);
    }
    timeline = timeline.animate(graph, 2 * second);
    if let Some(formula) = formula {
        timeline = timeline.animate(formula, second);
    }
    timeline = timeline
        .wait(3 * second)
        .morph_graph(graph, 2 * second, parabola);
    if let Some(formula) = formula {
        timeline = timeline.morph_formula(formula, second, r"y = \frac{x^2}{4} - 1");
    }
    timeline = timeline.wait(3 * second).animate_delete(graph, second);
    if let Some(formula) = formula {
        timeline = timeline.animate_delete(formula, second);
    }
    if let Some(label) = label {
        timeline = timeline.animate_delete(label, second);
    }
    timeline = timeline.wait(second + Duration::from_millis(500));

    Ok(Player::new(
        scene,
        timeline,
        canvas,
        cfg.background,
        cfg.fps,
    )?)
}

#[cfg(test)]
#[path = "../../tests/unit/bin/mathreel.rs"]
mod tests;

use clap::Parser;
use deepzoom_cli::{CliError, FrameFormat, FrameSink, SlowZoom};
use deepzoom_compute::RenderSession;
use deepzoom_core::{Navigator, Quality, Viewport, PALETTE_PRESETS, VIEWPORT_PRESETS};
use std::path::PathBuf;
use std::process::ExitCode;

/// Perturbation deep zoom Mandelbrot renderer.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory the numbered frames are written to.
    #[arg(short, long, default_value = "frames")]
    output: PathBuf,

    /// Output width in pixels.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Output height in pixels.
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Named starting view (see --list-presets).
    #[arg(short, long)]
    preset: Option<String>,

    /// Starting view as `s=<width>,r=<real>,i=<imag>,l=<limit>`.
    #[arg(long, conflicts_with = "preset")]
    view: Option<String>,

    /// Override the iteration limit of the starting view.
    #[arg(short, long)]
    limit: Option<u32>,

    /// Zoom in 5x at a pixel `X,Y` before rendering. May be repeated.
    #[arg(long = "click", value_parser = parse_pixel)]
    clicks: Vec<(f64, f64)>,

    /// Supersampling: 1x, 2x, 4x, 4x9 or 9x.
    #[arg(short, long, default_value = "1x", value_parser = parse_quality)]
    quality: Quality,

    /// Channel palette name.
    #[arg(long, default_value = "Natural")]
    palette: String,

    /// Number of frames to render.
    #[arg(short, long, default_value_t = 1)]
    frames: u64,

    /// Width multiplier applied after every frame.
    #[arg(short, long, default_value_t = 0.95)]
    zoom: f64,

    #[arg(long, value_enum, default_value_t = FrameFormat::Jpg)]
    format: FrameFormat,

    /// Viewport state file, rewritten after every frame.
    #[arg(long)]
    state: Option<PathBuf>,

    /// Continue from the state file.
    #[arg(long, requires = "state")]
    resume: bool,

    /// Keep the iteration limit fixed instead of adapting it per frame.
    #[arg(long)]
    fixed_limit: bool,

    /// Write frame statistics as JSON next to every frame.
    #[arg(long)]
    stats: bool,

    /// Print the named views and palettes and exit.
    #[arg(long)]
    list_presets: bool,
}

fn parse_quality(label: &str) -> Result<Quality, String> {
    Quality::from_label(label).ok_or_else(|| {
        let labels: Vec<&str> = Quality::ALL.iter().map(|q| q.label()).collect();
        format!("expected one of {}", labels.join(", "))
    })
}

fn parse_pixel(value: &str) -> Result<(f64, f64), String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| "expected X,Y".to_string())?;
    let x = x.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok((x, y))
}

fn list_presets() {
    println!("Views:");
    for preset in VIEWPORT_PRESETS {
        println!("  {:<16} {}", preset.name, preset.value);
    }
    println!("Palettes:");
    for preset in PALETTE_PRESETS {
        println!("  {:<16} {}", preset.name, preset.masks);
    }
}

/// Starting view: explicit view string, else named preset, else default.
fn navigator_for(args: &Args) -> Result<Navigator, CliError> {
    let mut navigator = Navigator::new((args.width, args.height));
    if let Some(view) = &args.view {
        navigator.set_viewport(Viewport::from_preset_str(view)?);
    } else if let Some(name) = &args.preset {
        navigator.apply_preset(name)?;
    }
    if let Some(limit) = args.limit {
        navigator.set_iteration_limit(limit);
    }
    for &(px, py) in &args.clicks {
        navigator.zoom_in_at(px, py);
    }
    navigator.set_quality(args.quality);
    navigator.select_palette(&args.palette)?;
    Ok(navigator)
}

fn run(args: Args) -> Result<(), CliError> {
    let navigator = navigator_for(&args)?;
    let sink = FrameSink::new(&args.output, args.format)?.with_stats(args.stats);

    let mut zoom = SlowZoom::new(navigator, args.zoom)?.with_limit_adaptation(!args.fixed_limit);
    if let Some(state) = &args.state {
        zoom = zoom.with_state_file(state);
    }
    if args.resume && !zoom.resume() {
        log::warn!("No usable state file, starting from the requested view");
    }

    log::info!(
        "Rendering {} frame(s) at {}x{} ({}) into {}",
        args.frames,
        args.width,
        args.height,
        args.quality.label(),
        sink.dir().display()
    );
    let mut session = RenderSession::new();
    let stats = zoom.run(args.frames, &mut session, &sink)?;

    let total_ms: f64 = stats.iter().map(|s| s.total_ms).sum();
    log::info!(
        "Done: {} frame(s) in {:.1} s, final width {}",
        stats.len(),
        total_ms / 1000.0,
        zoom.navigator().viewport().width
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.list_presets {
        list_presets();
        return ExitCode::SUCCESS;
    }
    if args.width == 0 || args.height == 0 {
        log::error!("Screen size must be non-zero");
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

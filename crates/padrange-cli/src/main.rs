//! padrange CLI: landing-pad distance estimation on synthetic or captured frames.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use padrange::{
    Accuracy, Controls, DistanceReport, Estimator, EstimatorConfig, Frame, FrameContext, FrameLoop,
    FrameProvider, SceneConfig, SnapshotWriter, StillFrames, SyntheticScene,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "padrange")]
#[command(about = "Estimate camera-to-pad distance from the apparent size of a landing pad")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fly the synthetic camera for a number of frames and report each one.
    Fly(CliFlyArgs),

    /// Run the estimator once on a PNG frame.
    Analyze(CliAnalyzeArgs),

    /// Render one synthetic frame to PNG.
    Render(CliRenderArgs),
}

/// Combined JSON config accepted by `--config`.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
struct RunConfig {
    estimator: EstimatorConfig,
    scene: SceneConfig,
}

#[derive(Debug, Clone, Args)]
struct CommonArgs {
    /// JSON file with `estimator` and/or `scene` sections.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Per-channel color tolerance (overrides config).
    #[arg(long)]
    tolerance: Option<u16>,

    /// Border-trace step budget (overrides config).
    #[arg(long)]
    step_budget: Option<usize>,

    /// Absolute border-trace step ceiling (overrides config).
    #[arg(long)]
    step_ceiling: Option<usize>,

    /// Print one JSON object per frame instead of the report line.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Args)]
struct PoseArgs {
    /// Camera start position `x,y,z` (overrides config).
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    start: Option<Vec<f64>>,

    /// Pointer position `x,y`, scaled by the scene sensitivity into yaw and pitch.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pointer: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Args)]
struct CliFlyArgs {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    pose: PoseArgs,

    /// Number of frames to run.
    #[arg(long, default_value = "100")]
    frames: usize,

    /// Controls held on every frame, e.g. `forwards,up`.
    #[arg(long, default_value = "")]
    controls: Controls,

    /// Frame indices on which to write a debug snapshot.
    #[arg(long, value_delimiter = ',')]
    snapshot_frame: Vec<usize>,

    /// Directory for snapshot artifacts.
    #[arg(long, default_value = "snapshots")]
    snapshot_dir: PathBuf,
}

#[derive(Debug, Clone, Args)]
struct CliAnalyzeArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Path to the input PNG.
    #[arg(long)]
    image: PathBuf,

    /// Ground-truth distance printed next to the estimate.
    #[arg(long, default_value = "0.0")]
    actual: f64,

    /// Write the cropped and annotated images into this directory.
    #[arg(long)]
    debug_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CliRenderArgs {
    /// JSON file with a `scene` section.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    pose: PoseArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fly(args) => run_fly(&args),
        Commands::Analyze(args) => run_analyze(&args),
        Commands::Render(args) => run_render(&args),
    }
}

// ── config ─────────────────────────────────────────────────────────────

fn load_run_config(path: Option<&Path>) -> CliResult<RunConfig> {
    let Some(path) = path else {
        return Ok(RunConfig::default());
    };
    let data = std::fs::read_to_string(path)
        .map_err(|e| -> CliError { format!("Failed to read {}: {}", path.display(), e).into() })?;
    let config: RunConfig = serde_json::from_str(&data)?;
    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}

impl CommonArgs {
    fn apply(&self, config: &mut EstimatorConfig) -> CliResult<()> {
        if let Some(t) = self.tolerance {
            config.tolerance = t;
        }
        if let Some(b) = self.step_budget {
            config.trace.step_budget = b;
        }
        if self.step_ceiling.is_some() {
            config.trace.step_ceiling = self.step_ceiling;
        }
        config.validate()?;
        Ok(())
    }
}

impl PoseArgs {
    fn apply(&self, scene: &mut SceneConfig) -> CliResult<()> {
        if let Some(start) = &self.start {
            scene.start_position = coords(start, "--start")?;
        }
        Ok(())
    }

    fn context(&self, controls: Controls, sensitivity: f64) -> CliResult<FrameContext> {
        let pointer = match &self.pointer {
            Some(p) => coords(p, "--pointer")?,
            None => [0.0, 0.0],
        };
        Ok(FrameContext::from_pointer(controls, pointer, sensitivity))
    }
}

/// Exactly `N` comma-separated values.
fn coords<const N: usize>(values: &[f64], flag: &str) -> CliResult<[f64; N]> {
    <[f64; N]>::try_from(values).map_err(|_| -> CliError {
        format!("{flag} expects {N} comma-separated values, got {}", values.len()).into()
    })
}

/// The estimator observes the scene through the same camera.
fn match_camera(estimator: &mut EstimatorConfig, scene: &SceneConfig) {
    estimator.viewport_px = scene.viewport_px;
    estimator.fov_rad = scene.fov_rad;
    estimator.pad_radius = scene.pad_radius;
}

fn print_report(report: &DistanceReport, json: bool) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

// ── fly ────────────────────────────────────────────────────────────────

fn run_fly(args: &CliFlyArgs) -> CliResult<()> {
    let mut config = load_run_config(args.common.config.as_deref())?;
    args.pose.apply(&mut config.scene)?;
    match_camera(&mut config.estimator, &config.scene);
    args.common.apply(&mut config.estimator)?;

    let scene = SyntheticScene::new(config.scene.clone())?;
    let estimator = Estimator::with_config(config.estimator)?;
    let mut frame_loop = FrameLoop::new(scene, estimator)
        .with_snapshots(SnapshotWriter::new(&args.snapshot_dir, "frame"));

    let base = args.pose.context(args.controls, config.scene.sensitivity)?;
    tracing::info!(
        "Flying {} frames with controls [{}]",
        args.frames,
        args.controls
    );

    let mut refined = 0usize;
    for i in 0..args.frames {
        let mut ctx = base;
        if args.snapshot_frame.contains(&i) {
            ctx.controls = ctx.controls.with(Controls::SNAPSHOT);
        }
        let Some(outcome) = frame_loop.tick(&ctx) else {
            break;
        };
        if outcome.report.estimate.accuracy == Accuracy::Refined {
            refined += 1;
        }
        print_report(&outcome.report, args.common.json)?;
    }
    tracing::info!("{}/{} frames refined", refined, args.frames);
    Ok(())
}

// ── analyze ────────────────────────────────────────────────────────────

fn run_analyze(args: &CliAnalyzeArgs) -> CliResult<()> {
    let mut config = load_run_config(args.common.config.as_deref())?;
    args.common.apply(&mut config.estimator)?;

    tracing::info!("Loading image: {}", args.image.display());
    let img = image::open(&args.image)
        .map_err(|e| -> CliError {
            format!("Failed to open image {}: {}", args.image.display(), e).into()
        })?
        .to_rgba8();
    let (w, h) = img.dimensions();
    tracing::info!("Image size: {}x{}", w, h);
    if w != config.estimator.viewport_px || h != config.estimator.viewport_px {
        tracing::warn!(
            "image is {}x{} but viewport_px is {}; distances assume the configured viewport",
            w,
            h,
            config.estimator.viewport_px
        );
    }

    let frames = StillFrames::new([Frame {
        pixels: img,
        actual_distance: args.actual,
    }]);
    let mut frame_loop = FrameLoop::new(frames, Estimator::with_config(config.estimator)?);
    let mut ctx = FrameContext::default();
    if let Some(dir) = &args.debug_dir {
        frame_loop = frame_loop.with_snapshots(SnapshotWriter::new(dir, "analyze"));
        ctx.controls = Controls::SNAPSHOT;
    }

    let outcome = frame_loop
        .tick(&ctx)
        .ok_or_else(|| -> CliError { "no frame to analyze".into() })?;
    print_report(&outcome.report, args.common.json)?;
    if let Some([plain, annotated]) = &outcome.snapshot {
        tracing::info!(
            "Debug images written to {} and {}",
            plain.display(),
            annotated.display()
        );
    }
    Ok(())
}

// ── render ─────────────────────────────────────────────────────────────

fn run_render(args: &CliRenderArgs) -> CliResult<()> {
    let mut config = load_run_config(args.config.as_deref())?;
    args.pose.apply(&mut config.scene)?;
    let ctx = args.pose.context(Controls::NONE, config.scene.sensitivity)?;

    let mut scene = SyntheticScene::new(config.scene)?;
    let frame = scene
        .next_frame(&ctx)
        .ok_or_else(|| -> CliError { "scene produced no frame".into() })?;
    frame.pixels.save(&args.out)?;
    tracing::info!(
        "Frame written to {} (actual distance {:.4})",
        args.out.display(),
        frame.actual_distance
    );
    Ok(())
}

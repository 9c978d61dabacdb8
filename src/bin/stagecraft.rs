use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "stagecraft", version)]
struct Cli {
    /// Log verbosity (written to stderr).
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    log: LogLevel,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate a scene for a number of frames and write the last one as PNG.
    Render(RenderArgs),
    /// Validate a scene description.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 1)]
    frames: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing(self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log.to_tracing())
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn read_scene_json(path: &Path) -> anyhow::Result<stagecraft::SceneDescription> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("open scene '{}'", path.display()))?;
    let desc = stagecraft::SceneDescription::from_json_str(&text)
        .with_context(|| format!("parse scene '{}'", path.display()))?;
    Ok(desc)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    if args.frames == 0 {
        anyhow::bail!("--frames must be >= 1");
    }
    let desc = read_scene_json(&args.in_path)?;

    let assets_root = args.in_path.parent().unwrap_or_else(|| Path::new("."));
    let surface = stagecraft::CpuSurface::new(desc.config.default_size)?.with_asset_root(assets_root);
    let mut stage = stagecraft::Stage::new(surface, desc.config.clone())?;
    desc.build(&mut stage).context("build scene")?;

    // Simulated time: sleeping is free, so never busy-wait below a threshold.
    let pacing = stagecraft::PacingConfig {
        sleep_threshold_secs: 0.0,
        ..desc.config.pacing.to_pacing()
    };
    let mut driver = stagecraft::FrameDriver::new(stagecraft::ManualClock::new(0.0), pacing);
    let rendered = driver
        .run(&mut stage, &mut stagecraft::NoInput, Some(args.frames))
        .context("run frame loop")?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    stage
        .surface()
        .save_png(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("rendered {rendered} frame(s), wrote {}", args.out.display());
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let desc = read_scene_json(&args.in_path)?;
    println!(
        "ok: {} node(s), {} animation(s), {}x{} design size",
        desc.node_count(),
        desc.animations.len(),
        desc.config.default_size.w,
        desc.config.default_size.h
    );
    Ok(())
}

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "framefx", version)]
struct Cli {
    /// Log per-frame progress (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply one effect and encode an MP4 (requires `ffmpeg`/`ffprobe` on PATH).
    Apply(ApplyArgs),
    /// List the available effects.
    Effects,
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// Job JSON; flags below override its values.
    #[arg(long)]
    job: Option<PathBuf>,

    /// Effect name (reverse, fade_in_out, motion_blur, earthquake, cross_fade).
    #[arg(long)]
    effect: Option<framefx::EffectName>,

    /// First input video.
    #[arg(long)]
    in1: Option<PathBuf>,

    /// Second input video (cross_fade only).
    #[arg(long)]
    in2: Option<PathBuf>,

    /// Output MP4 path.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Fade-in length in seconds.
    #[arg(long)]
    fade_in: Option<f64>,

    /// Fade-out length in seconds.
    #[arg(long)]
    fade_out: Option<f64>,

    /// Motion blur window in frames.
    #[arg(long)]
    blur_frames: Option<u32>,

    /// Earthquake strength in pixels.
    #[arg(long)]
    strength: Option<u32>,

    /// Earthquake jitter seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Cross-fade overlap in seconds.
    #[arg(long)]
    overlap: Option<f64>,

    /// Frame rate override, e.g. `30` or `30000/1001`.
    #[arg(long, value_parser = parse_fps)]
    fps: Option<framefx::Fps>,

    /// Refuse to replace an existing output file.
    #[arg(long)]
    no_overwrite: bool,
}

fn parse_fps(s: &str) -> Result<framefx::Fps, String> {
    framefx::Fps::parse_ratio(s).ok_or_else(|| format!("invalid frame rate '{s}'"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Apply(args) => cmd_apply(args).await,
        Command::Effects => {
            cmd_effects();
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "framefx=debug" } else { "framefx=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn cmd_effects() {
    for name in framefx::EffectName::ALL {
        let inputs = if name.needs_second_input() { 2 } else { 1 };
        println!("{name}\t{inputs} input(s)");
    }
}

fn build_job(args: &ApplyArgs) -> anyhow::Result<framefx::JobSpec> {
    let base = args
        .job
        .as_deref()
        .map(framefx::JobSpec::from_path)
        .transpose()?;

    let params = framefx::EffectParams {
        fade_in_sec: args.fade_in,
        fade_out_sec: args.fade_out,
        window_frames: args.blur_frames,
        strength_px: args.strength,
        seed: args.seed,
        overlap_sec: args.overlap,
    };
    let name = args
        .effect
        .or_else(|| base.as_ref().map(|j| j.effect.name()))
        .context("no effect given (use --effect or a job file)")?;
    let effect = params.resolve(name, base.as_ref().map(|j| &j.effect))?;

    let input1 = args
        .in1
        .clone()
        .or_else(|| base.as_ref().map(|j| j.input1.clone()))
        .context("no input given (use --in1 or a job file)")?;
    let output = args
        .out
        .clone()
        .or_else(|| base.as_ref().map(|j| j.output.clone()))
        .context("no output given (use --out or a job file)")?;

    let mut job = match base {
        Some(mut job) => {
            job.input1 = input1;
            job.output = output;
            job.effect = effect;
            job
        }
        None => framefx::JobSpec::new(input1, output, effect),
    };
    if let Some(in2) = &args.in2 {
        job.input2 = Some(in2.clone());
    }
    if args.fps.is_some() {
        job.fps = args.fps;
    }
    if args.no_overwrite {
        job.overwrite = false;
    }
    job.validate()?;
    Ok(job)
}

async fn load_input(
    path: PathBuf,
) -> anyhow::Result<(framefx::VideoSourceInfo, framefx::FrameSequence)> {
    let label = path.display().to_string();
    let loaded = tokio::task::spawn_blocking(move || framefx::load_video(&path))
        .await
        .context("input decode task failed")?
        .with_context(|| format!("load input '{label}'"))?;
    Ok(loaded)
}

async fn cmd_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let job = build_job(&args)?;

    let (info1, seq1) = load_input(job.input1.clone()).await?;
    let fps = job.fps.unwrap_or(info1.fps);
    let mut inputs = framefx::FrameStore::new(fps).with_input1(seq1);
    if job.effect.name().needs_second_input()
        && let Some(in2) = job.input2.clone()
    {
        let (_, seq2) = load_input(in2).await?;
        inputs = inputs.with_input2(seq2);
    }

    let mut sequencer = framefx::Sequencer::new(framefx::ImageCodec::new(job.frame_storage));
    let cancel = sequencer.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping after the current frame");
            cancel.cancel();
        }
    });

    let mut assembler = framefx::FfmpegAssembler {
        out_path: job.output.clone(),
        fps,
        overwrite: job.overwrite,
        bg_rgba: job.background,
    };

    let mut last_decile = 0u32;
    let outcome = framefx::apply_effect(
        &mut sequencer,
        &job.effect,
        inputs,
        &mut assembler,
        |p| {
            let decile = (p * 10.0).floor() as u32;
            if decile > last_decile {
                last_decile = decile;
                tracing::info!("progress {:>3}%", decile * 10);
            }
        },
    )
    .await?;

    match outcome {
        framefx::ApplyOutcome::Encoded(path) => {
            eprintln!("wrote {}", path.display());
            Ok(())
        }
        framefx::ApplyOutcome::Cancelled(progress) => anyhow::bail!(
            "cancelled after {}/{} frames",
            progress.completed_frames,
            progress.output_duration
        ),
        framefx::ApplyOutcome::EncodeFailed { error, .. } => {
            Err(error).with_context(|| format!("encode '{}'", job.output.display()))
        }
    }
}

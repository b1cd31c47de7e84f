use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use trailstudio::assets::decode::unpremultiply_rgba8_in_place;
use trailstudio::settings::model::InputMode;

#[derive(Parser, Debug)]
#[command(name = "trailstudio", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the animation after N frames (or the static preview) as a PNG.
    Preview(PreviewArgs),
    /// Record a seamless loop or a timed clip (MP4/WebM need `ffmpeg` on PATH).
    Record(RecordArgs),
    /// Print a sanitized settings file.
    Settings(SettingsArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Sprite image (PNG, JPEG or SVG).
    #[arg(long = "in", conflicts_with = "text")]
    in_path: Option<PathBuf>,

    /// Render this text as the sprite instead of loading an image.
    #[arg(long)]
    text: Option<String>,

    /// Settings JSON (exported payload or bare settings object).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Extra font directory for SVG and text rendering.
    #[arg(long)]
    font_dir: Option<PathBuf>,

    /// Seed for the random initial heading.
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Frames to animate before capturing; 0 renders the static preview.
    #[arg(long, default_value_t = 0)]
    frames: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RecordArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Record exactly one seamless motion cycle (overrides `loopMode`).
    #[arg(long = "loop")]
    loop_mode: bool,

    /// Timed recording length in seconds (overrides `recordDuration`).
    #[arg(long)]
    seconds: Option<u32>,

    /// Write numbered PNGs into the `--out` directory instead of a video.
    #[arg(long)]
    png_sequence: bool,

    /// Output `.mp4`/`.webm` file, or a directory with `--png-sequence`.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct SettingsArgs {
    /// Settings JSON to sanitize; defaults are printed when omitted.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Preview(args) => cmd_preview(args),
        Command::Record(args) => cmd_record(args),
        Command::Settings(args) => cmd_settings(args),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("TRAILSTUDIO_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_settings(path: Option<&Path>) -> anyhow::Result<trailstudio::Settings> {
    let Some(path) = path else {
        return Ok(trailstudio::Settings::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read settings '{}'", path.display()))?;
    let payload = trailstudio::parse_payload(&text)
        .with_context(|| format!("parse settings '{}'", path.display()))?;
    Ok(payload.settings)
}

fn build_session(
    source: &SourceArgs,
    mut settings: trailstudio::Settings,
) -> anyhow::Result<trailstudio::AnimationSession> {
    let mut loader = trailstudio::SpriteLoader::new();
    if let Some(dir) = &source.font_dir {
        loader = loader.with_font_dir(dir);
    }

    if let Some(text) = &source.text {
        settings.input_mode = InputMode::Text;
        settings.text_content = text.clone();
    }

    let sprite = match (&source.in_path, settings.input_mode) {
        (Some(path), _) => {
            let loaded = loader.load_path(path, &settings.sprite_options())?;
            eprintln!(
                "loaded {} ({}x{} -> {}x{})",
                path.display(),
                loaded.source_size.0,
                loaded.source_size.1,
                loaded.sprite.width,
                loaded.sprite.height
            );
            loaded.sprite
        }
        (None, InputMode::Text) => loader.render_text(&settings.text_spec())?,
        (None, InputMode::Image) => {
            anyhow::bail!("no sprite source: pass --in <image> or --text <string>")
        }
    };

    let mut session = trailstudio::AnimationSession::new(settings, source.seed)?;
    session.set_sprite(sprite)?;
    Ok(session)
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let settings = read_settings(args.source.settings.as_deref())?;
    let mut session = build_session(&args.source, settings)?;

    if args.frames > 0 {
        session.start()?;
        let dt = trailstudio::NOMINAL_FPS.frame_duration();
        for _ in 0..args.frames {
            session.tick(dt)?;
        }
    }

    let mut frame = session.visible().to_frame();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut frame.data);
    }

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_record(args: RecordArgs) -> anyhow::Result<()> {
    let mut settings = read_settings(args.source.settings.as_deref())?;
    if args.loop_mode {
        settings.loop_mode = true;
    }
    if let Some(secs) = args.seconds {
        settings.record_duration = secs.clamp(1, 120);
    }
    let mut session = build_session(&args.source, settings)?;

    let sink: Box<dyn trailstudio::FrameSink> = if args.png_sequence {
        Box::new(trailstudio::PngSequenceSink::new(&args.out))
    } else {
        Box::new(trailstudio::FfmpegSink::new(trailstudio::FfmpegSinkOpts::new(
            &args.out,
        )?))
    };
    session.start_recording(sink)?;

    // Offline recording: each tick stands for exactly one nominal frame of host time.
    let dt = trailstudio::NOMINAL_FPS.frame_duration();
    let mut captured = 0;
    while session.is_recording() {
        let Some(report) = session.tick(dt)? else {
            anyhow::bail!("playback stopped during recording");
        };
        if let Some(status) = report.recording {
            captured = status.captured_frames;
            tracing::debug!(frame = report.frame, status = %status.line);
        }
    }

    eprintln!("wrote {} ({captured} frames)", args.out.display());
    Ok(())
}

fn cmd_settings(args: SettingsArgs) -> anyhow::Result<()> {
    let settings = read_settings(args.in_path.as_deref())?;
    let payload = trailstudio::SettingsPayload::new(settings);
    println!("{}", payload.to_json_pretty()?);
    Ok(())
}

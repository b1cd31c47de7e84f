use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::assets::decode::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};
use crate::encode::sink::{FrameOrder, FrameSink, SinkConfig, flatten_premul_over_bg};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{TrailError, TrailResult};
use crate::render::surface::FrameRGBA;

/// Output container and codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Container {
    /// H.264 in MP4; alpha is flattened over the sink background.
    Mp4,
    /// VP9 in WebM with an alpha plane.
    WebM,
}

impl Container {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "mp4" | "m4v" | "mov" => Some(Self::Mp4),
            "webm" => Some(Self::WebM),
            _ => None,
        }
    }
}

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    pub container: Container,
}

impl FfmpegSinkOpts {
    /// Options for `out_path`, picking the container from its extension.
    pub fn new(out_path: impl Into<PathBuf>) -> TrailResult<Self> {
        let out_path = out_path.into();
        let container = Container::from_path(&out_path).ok_or_else(|| {
            TrailError::validation(format!(
                "unsupported video extension for '{}' (use .mp4 or .webm)",
                out_path.display()
            ))
        })?;
        Ok(Self {
            out_path,
            overwrite: true,
            container,
        })
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw RGBA frames to its stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    order: FrameOrder,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            order: FrameOrder::default(),
        }
    }

    fn command(&self, cfg: &SinkConfig) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if self.opts.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0", "-an"]);

        match self.opts.container {
            Container::Mp4 => {
                // yuv420p needs even dimensions.
                cmd.args([
                    "-vf",
                    "pad=ceil(iw/2)*2:ceil(ih/2)*2",
                    "-c:v",
                    "libx264",
                    "-pix_fmt",
                    "yuv420p",
                    "-movflags",
                    "+faststart",
                ]);
            }
            Container::WebM => {
                cmd.args([
                    "-c:v",
                    "libvpx-vp9",
                    "-pix_fmt",
                    "yuva420p",
                    "-auto-alt-ref",
                    "0",
                    "-b:v",
                    "0",
                    "-crf",
                    "30",
                ]);
            }
        }
        cmd.arg(&self.opts.out_path);
        cmd
    }
}

impl std::fmt::Debug for FfmpegSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegSink")
            .field("opts", &self.opts)
            .field("running", &self.child.is_some())
            .finish_non_exhaustive()
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> TrailResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(TrailError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(TrailError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(TrailError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(TrailError::encode(
                "ffmpeg is required for video recording, but was not found on PATH",
            ));
        }

        let mut child = self.command(&cfg).spawn().map_err(|e| {
            TrailError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TrailError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| TrailError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            path = %self.opts.out_path.display(),
            container = ?self.opts.container,
            width = cfg.width,
            height = cfg.height,
            "ffmpeg sink started"
        );

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.order.reset();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> TrailResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| TrailError::encode("ffmpeg sink not started"))?;
        self.order.check(cfg, idx, frame)?;

        self.scratch.copy_from_slice(&frame.data);
        match self.opts.container {
            Container::Mp4 => {
                if !frame.premultiplied {
                    premultiply_rgba8_in_place(&mut self.scratch);
                }
                flatten_premul_over_bg(&mut self.scratch, cfg.background);
            }
            Container::WebM => {
                if frame.premultiplied {
                    unpremultiply_rgba8_in_place(&mut self.scratch);
                }
            }
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(TrailError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            TrailError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> TrailResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| TrailError::encode("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| TrailError::encode(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| TrailError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| TrailError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(TrailError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        tracing::debug!(path = %self.opts.out_path.display(), "ffmpeg sink finished");
        self.cfg = None;
        Ok(())
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // Rawvideo input takes its rate from `-r` before `-i`.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> TrailResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

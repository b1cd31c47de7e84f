use std::time::Duration;

use crate::assets::sprite::Sprite;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, FrameIndex, NOMINAL_FPS, Point};
use crate::foundation::error::{TrailError, TrailResult};
use crate::foundation::math::Rng64;
use crate::motion::params::MotionParams;
use crate::motion::state::AnimationState;
use crate::palette::color::Rgb8;
use crate::record::scheduler::{FrameDisposition, RecordPhase, RecordingPlan, RecordingScheduler};
use crate::render::compositor::{Background, TrailCompositor};
use crate::render::surface::Surface;
use crate::settings::model::Settings;

/// Progress of the active recording, as of the last tick.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordingStatus {
    pub phase: RecordPhase,
    /// Fraction of the current phase, `[0, 1]`.
    pub progress: f64,
    pub captured_frames: u64,
    /// Status bar text, e.g. `Warming up... 42%`.
    pub line: String,
}

/// Outcome of one [`AnimationSession::tick`].
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    /// `time` of the frame just composited.
    pub frame: u64,
    /// Whether this frame went to the sink.
    pub captured: bool,
    /// `None` when no recording is active after this tick.
    pub recording: Option<RecordingStatus>,
}

struct ActiveRecording {
    scheduler: RecordingScheduler,
    sink: Box<dyn FrameSink>,
    next_index: u64,
    elapsed: Duration,
    started: bool,
}

impl ActiveRecording {
    fn status(&self) -> RecordingStatus {
        RecordingStatus {
            phase: self.scheduler.phase(),
            progress: self.scheduler.progress(),
            captured_frames: self.scheduler.captured_frames(),
            line: self.scheduler.status_line(),
        }
    }
}

/// One animation: settings, sprite, trail buffers, motion state, and an optional recording.
///
/// The host drives it by calling [`tick`](Self::tick) once per display frame. Nothing here
/// schedules itself.
pub struct AnimationSession {
    settings: Settings,
    state: AnimationState,
    compositor: TrailCompositor,
    sprite: Option<Sprite>,
    rng: Rng64,
    playing: bool,
    recording: Option<ActiveRecording>,
}

impl std::fmt::Debug for AnimationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationSession")
            .field("canvas", &self.compositor.canvas())
            .field("state", &self.state)
            .field("has_sprite", &self.sprite.is_some())
            .field("playing", &self.playing)
            .field("recording", &self.recording.is_some())
            .finish_non_exhaustive()
    }
}

impl AnimationSession {
    /// New stopped session. `seed` drives the random headings of the integrated modes.
    pub fn new(settings: Settings, seed: u64) -> TrailResult<Self> {
        let compositor = TrailCompositor::new(settings.canvas())?;
        Ok(Self {
            settings,
            state: AnimationState::default(),
            compositor,
            sprite: None,
            rng: Rng64::new(seed),
            playing: false,
            recording: None,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn canvas(&self) -> Canvas {
        self.compositor.canvas()
    }

    pub fn sprite(&self) -> Option<&Sprite> {
        self.sprite.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// The surface shown to the user.
    pub fn visible(&self) -> &Surface {
        self.compositor.visible()
    }

    pub fn recording_status(&self) -> Option<RecordingStatus> {
        self.recording.as_ref().map(ActiveRecording::status)
    }

    /// Replace the settings. Buffers are rebuilt and a running animation restarts from frame 0.
    ///
    /// An active recording is finalized first; a sink failure while finalizing is returned after
    /// the new settings are applied.
    pub fn set_settings(&mut self, settings: Settings) -> TrailResult<()> {
        let ended = self.stop_recording();
        let canvas = settings.canvas();
        if canvas != self.compositor.canvas() {
            let mut compositor = TrailCompositor::new(canvas)?;
            if let Some(sprite) = &self.sprite {
                compositor.set_sprite(sprite)?;
            }
            self.compositor = compositor;
        }
        self.settings = settings;
        self.reinit();
        ended
    }

    /// Replace the sprite. Buffers are cleared and a running animation restarts from frame 0.
    ///
    /// Like [`set_settings`](Self::set_settings), this finalizes an active recording.
    pub fn set_sprite(&mut self, sprite: Sprite) -> TrailResult<()> {
        let ended = self.stop_recording();
        self.compositor.set_sprite(&sprite)?;
        self.sprite = Some(sprite);
        self.reinit();
        ended
    }

    fn reinit(&mut self) {
        if self.playing {
            self.restart();
        } else {
            self.static_preview();
        }
    }

    fn sprite_size(&self) -> (f64, f64) {
        self.sprite
            .as_ref()
            .map_or((0.0, 0.0), |s| s.draw_size(self.settings.content_scale))
    }

    fn motion_params(&self) -> MotionParams {
        self.settings.motion_params(self.sprite_size())
    }

    fn restart(&mut self) {
        self.compositor.reset();
        let (sw, sh) = self.sprite_size();
        let start = self.compositor.canvas().centered(sw, sh);
        self.state.restart(start, &mut self.rng);
    }

    /// Start (or restart) playback from frame 0. Requires a sprite.
    pub fn start(&mut self) -> TrailResult<()> {
        if self.sprite.is_none() {
            return Err(TrailError::validation("cannot start playback without a sprite"));
        }
        self.restart();
        self.playing = true;
        tracing::info!(
            mode = %self.settings.motion_mode,
            canvas_w = self.compositor.canvas().width,
            canvas_h = self.compositor.canvas().height,
            "playback started"
        );
        Ok(())
    }

    /// Stop playback (and any recording) and show the static preview.
    pub fn stop(&mut self) -> TrailResult<()> {
        let result = self.stop_recording();
        if self.playing {
            self.playing = false;
            tracing::info!(frames = self.state.time, "playback stopped");
        }
        self.static_preview();
        result
    }

    /// Draw the sprite centered on the background, without trail.
    pub fn static_preview(&mut self) {
        let size = self.sprite_size();
        let pos: Point = self.compositor.canvas().centered(size.0, size.1);
        self.compositor
            .render_static(pos, size, self.settings.background());
    }

    /// Begin recording into `sink`.
    ///
    /// With `loop_mode` set, playback restarts at frame 0, trail warm-up frames are discarded,
    /// and exactly one motion cycle is captured. Otherwise `record_duration` seconds of host
    /// time are captured, starting playback if needed.
    #[tracing::instrument(level = "debug", skip(self, sink))]
    pub fn start_recording(&mut self, sink: Box<dyn FrameSink>) -> TrailResult<()> {
        if self.sprite.is_none() {
            return Err(TrailError::validation("cannot record without a sprite"));
        }
        if self.recording.is_some() {
            return Err(TrailError::validation("a recording is already active"));
        }

        let plan = if self.settings.loop_mode {
            self.start()?;
            RecordingPlan::seamless_loop(self.settings.alpha_decay, self.settings.mode_duration)
        } else {
            if !self.playing {
                self.start()?;
            }
            RecordingPlan::timed(f64::from(self.settings.record_duration))
        };
        tracing::info!(?plan, "recording started");

        let scheduler = RecordingScheduler::new(plan);
        let mut recording = ActiveRecording {
            scheduler,
            sink,
            next_index: 0,
            elapsed: Duration::ZERO,
            started: false,
        };
        if recording.scheduler.phase() == RecordPhase::Capturing {
            self.begin_sink(&mut recording)?;
        }
        self.recording = Some(recording);
        Ok(())
    }

    fn begin_sink(&self, recording: &mut ActiveRecording) -> TrailResult<()> {
        let canvas = self.compositor.canvas();
        let background = match self.settings.background() {
            Background::Solid(c) => c,
            Background::Transparent => Rgb8::BLACK,
        };
        recording.sink.begin(SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: NOMINAL_FPS,
            background,
        })?;
        recording.started = true;
        Ok(())
    }

    /// Finish the active recording early, finalizing whatever the sink has received.
    pub fn stop_recording(&mut self) -> TrailResult<()> {
        let Some(mut recording) = self.recording.take() else {
            return Ok(());
        };
        tracing::info!(
            frames = recording.scheduler.captured_frames(),
            "recording stopped"
        );
        if recording.started {
            recording.sink.end()?;
        }
        Ok(())
    }

    /// Composite one frame. `dt` is host time since the previous tick.
    ///
    /// Returns `Ok(None)` when not playing. Sink failures abort the recording and are returned;
    /// playback continues.
    pub fn tick(&mut self, dt: Duration) -> TrailResult<Option<TickReport>> {
        if !self.playing {
            return Ok(None);
        }

        let motion = self.motion_params();
        let params = self.settings.composite_params();
        self.compositor
            .render_frame(&mut self.state, &motion, &params);
        let frame = self.state.time - 1;

        let Some(mut recording) = self.recording.take() else {
            return Ok(Some(TickReport {
                frame,
                captured: false,
                recording: None,
            }));
        };

        let captured = match self.record_frame(&mut recording, dt) {
            Ok(captured) => captured,
            Err(e) => {
                tracing::warn!(error = %e, "recording aborted");
                if recording.started
                    && let Err(end_err) = recording.sink.end()
                {
                    tracing::warn!(error = %end_err, "failed to finalize aborted recording");
                }
                return Err(e);
            }
        };

        let status = recording.status();
        if recording.scheduler.is_finished() {
            if recording.started {
                recording.sink.end()?;
            }
            tracing::info!(frames = status.captured_frames, "recording finished");
        } else {
            self.recording = Some(recording);
        }

        Ok(Some(TickReport {
            frame,
            captured,
            recording: Some(status),
        }))
    }

    fn record_frame(&self, recording: &mut ActiveRecording, dt: Duration) -> TrailResult<bool> {
        if recording.scheduler.phase() == RecordPhase::Capturing {
            recording.elapsed += dt;
        }
        match recording.scheduler.on_frame(recording.elapsed) {
            FrameDisposition::Discard => {
                if recording.scheduler.phase() == RecordPhase::Capturing && !recording.started {
                    self.begin_sink(recording)?;
                }
                Ok(false)
            }
            FrameDisposition::Capture => {
                if !recording.started {
                    self.begin_sink(recording)?;
                }
                let idx = FrameIndex(recording.next_index);
                recording
                    .sink
                    .push_frame(idx, &self.compositor.visible().to_frame())?;
                recording.next_index += 1;
                Ok(true)
            }
        }
    }
}

use std::time::Duration;

use crate::foundation::core::NOMINAL_FPS;

/// Trail visibility considered fully faded during warm-up.
pub const DECAY_VISIBILITY_FLOOR: f64 = 0.001;
/// Warm-up never exceeds this many loop periods.
pub const MAX_WARMUP_LOOPS: u64 = 5;

/// Frames in one loop-corrected motion cycle: `round(mode_duration * 60)`.
pub fn loop_frames(mode_duration_secs: f64) -> u64 {
    NOMINAL_FPS.secs_to_frames_round(mode_duration_secs)
}

/// Frames for a cold trail to decay below [`DECAY_VISIBILITY_FLOOR`]:
/// `ceil(ln(0.001) / ln(max(0.5, alpha_decay)))`.
///
/// Returns `u64::MAX` when the decay never falls off (`alpha_decay >= 1`).
pub fn decay_frames(alpha_decay: f64) -> u64 {
    let a = alpha_decay.max(0.5);
    if a >= 1.0 {
        return u64::MAX;
    }
    (DECAY_VISIBILITY_FLOOR.ln() / a.ln()).ceil() as u64
}

/// `min(decay_frames, loop_frames * 5)`.
pub fn warmup_budget(alpha_decay: f64, mode_duration_secs: f64) -> u64 {
    decay_frames(alpha_decay).min(loop_frames(mode_duration_secs).saturating_mul(MAX_WARMUP_LOOPS))
}

/// What a recording captures and for how long.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordingPlan {
    /// Discard `warmup_frames`, then capture exactly `loop_frames`.
    Loop { warmup_frames: u64, loop_frames: u64 },
    /// Capture until `duration` of host time has elapsed.
    Timed { duration: Duration },
}

impl RecordingPlan {
    pub fn seamless_loop(alpha_decay: f64, mode_duration_secs: f64) -> Self {
        Self::Loop {
            warmup_frames: warmup_budget(alpha_decay, mode_duration_secs),
            loop_frames: loop_frames(mode_duration_secs),
        }
    }

    pub fn timed(secs: f64) -> Self {
        Self::Timed {
            duration: Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::ZERO),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordPhase {
    WarmingUp,
    Capturing,
    Finished,
}

/// What to do with the frame just rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameDisposition {
    Discard,
    Capture,
}

/// Per-frame recording state machine. It never renders; the host calls
/// [`on_frame`](Self::on_frame) once after each composited frame.
#[derive(Clone, Debug)]
pub struct RecordingScheduler {
    plan: RecordingPlan,
    phase: RecordPhase,
    /// Frames counted in the current phase.
    count: u64,
    captured: u64,
    elapsed: Duration,
}

impl RecordingScheduler {
    pub fn new(plan: RecordingPlan) -> Self {
        let phase = match plan {
            RecordingPlan::Loop {
                warmup_frames,
                loop_frames,
            } => {
                if loop_frames == 0 {
                    RecordPhase::Finished
                } else if warmup_frames == 0 {
                    RecordPhase::Capturing
                } else {
                    RecordPhase::WarmingUp
                }
            }
            RecordingPlan::Timed { .. } => RecordPhase::Capturing,
        };
        Self {
            plan,
            phase,
            count: 0,
            captured: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn plan(&self) -> RecordingPlan {
        self.plan
    }

    pub fn phase(&self) -> RecordPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == RecordPhase::Finished
    }

    /// Frames handed to the sink so far.
    pub fn captured_frames(&self) -> u64 {
        self.captured
    }

    /// Account for one rendered frame. `elapsed` is host time since the recording started and
    /// only matters for timed plans.
    pub fn on_frame(&mut self, elapsed: Duration) -> FrameDisposition {
        match (self.plan, self.phase) {
            (_, RecordPhase::Finished) => FrameDisposition::Discard,
            (RecordingPlan::Loop { warmup_frames, .. }, RecordPhase::WarmingUp) => {
                self.count += 1;
                if self.count >= warmup_frames {
                    tracing::info!(warmup_frames, "warm-up complete; capturing loop");
                    self.phase = RecordPhase::Capturing;
                    self.count = 0;
                }
                FrameDisposition::Discard
            }
            (RecordingPlan::Loop { loop_frames, .. }, _) => {
                self.count += 1;
                self.captured += 1;
                if self.count >= loop_frames {
                    tracing::info!(frames = self.captured, "loop capture complete");
                    self.phase = RecordPhase::Finished;
                }
                FrameDisposition::Capture
            }
            (RecordingPlan::Timed { duration }, _) => {
                self.count += 1;
                self.captured += 1;
                self.elapsed = elapsed;
                if elapsed >= duration {
                    tracing::info!(frames = self.captured, "timed capture complete");
                    self.phase = RecordPhase::Finished;
                }
                FrameDisposition::Capture
            }
        }
    }

    /// Fraction of the current phase completed, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        let frac = match (self.plan, self.phase) {
            (_, RecordPhase::Finished) => 1.0,
            (RecordingPlan::Loop { warmup_frames, .. }, RecordPhase::WarmingUp) => {
                self.count as f64 / warmup_frames.max(1) as f64
            }
            (RecordingPlan::Loop { loop_frames, .. }, _) => {
                self.count as f64 / loop_frames.max(1) as f64
            }
            (RecordingPlan::Timed { duration }, _) => {
                if duration.is_zero() {
                    1.0
                } else {
                    self.elapsed.as_secs_f64() / duration.as_secs_f64()
                }
            }
        };
        frac.clamp(0.0, 1.0)
    }

    /// Human-readable progress for status bars.
    pub fn status_line(&self) -> String {
        match (self.plan, self.phase) {
            (_, RecordPhase::Finished) => "Recording complete".to_string(),
            (RecordingPlan::Loop { .. }, RecordPhase::WarmingUp) => {
                format!("Warming up... {}%", (self.progress() * 100.0).round())
            }
            (RecordingPlan::Loop { loop_frames, .. }, _) => format!(
                "Recording loop... {:.1}s / {:.1}s",
                NOMINAL_FPS.frames_to_secs(self.count),
                NOMINAL_FPS.frames_to_secs(loop_frames)
            ),
            (RecordingPlan::Timed { duration }, _) => format!(
                "Recording... {:.1}s / {:.1}s",
                self.elapsed.min(duration).as_secs_f64(),
                duration.as_secs_f64()
            ),
        }
    }
}

//! Trailstudio renders looping sprite trail animations.
//!
//! A trimmed sprite (image, SVG, or rendered text) moves along a procedural path while every
//! previous frame is redrawn shifted and faded, optionally tinted by a cycling palette. The
//! public API is session-oriented:
//!
//! - Sanitize [`Settings`] from JSON
//! - Load a [`Sprite`] with a [`SpriteLoader`]
//! - Drive an [`AnimationSession`] one `tick` per display frame, optionally recording into a
//!   [`FrameSink`]
#![forbid(unsafe_code)]

mod foundation;

/// Sprite sources and preparation.
pub mod assets;
/// Frame sinks for recordings.
pub mod encode;
/// Motion paths.
pub mod motion;
/// Palette sampling.
pub mod palette;
/// Recording schedules.
pub mod record;
/// Trail compositing.
pub mod render;
/// Host-facing animation session.
pub mod session;
/// Settings model and file format.
pub mod settings;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, NOMINAL_FPS, Point, Vec2};
pub use crate::foundation::error::{TrailError, TrailResult};
pub use crate::foundation::math::Rng64;

pub use crate::assets::sprite::{LoadedSprite, Sprite, SpriteLoader, SpriteOptions};
pub use crate::assets::text::TextSpec;
pub use crate::encode::ffmpeg::{Container, FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::png::PngSequenceSink;
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::motion::mode::MotionMode;
pub use crate::motion::params::MotionParams;
pub use crate::motion::state::AnimationState;
pub use crate::palette::color::Rgb8;
pub use crate::record::scheduler::{RecordPhase, RecordingPlan, RecordingScheduler};
pub use crate::render::compositor::{Background, CompositeParams, TintParams, TrailCompositor};
pub use crate::render::surface::{FrameRGBA, Surface};
pub use crate::session::{AnimationSession, RecordingStatus, TickReport};
pub use crate::settings::model::Settings;
pub use crate::settings::payload::{SettingsPayload, parse_payload};
pub use crate::settings::sanitize::sanitize;

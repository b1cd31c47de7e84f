use serde::{Deserialize, Serialize};

/// Closed set of motion paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionMode {
    /// Centered, motionless.
    #[default]
    Static,
    /// Reflective bounce inside the travel band.
    Bounce,
    /// Slow toroidal drift that wraps at band edges.
    Drift,
    /// Ellipse around the center.
    Orbit,
    /// Figure eight (Y at twice the X frequency).
    Figure8,
    /// Lissajous curve.
    Lissajous,
    /// Orbit with a breathing radius.
    Spiral,
    /// Triangle wave sweep across X with a sine on Y.
    Zigzag,
}

impl MotionMode {
    /// All modes, in menu order.
    pub const ALL: [MotionMode; 8] = [
        MotionMode::Bounce,
        MotionMode::Orbit,
        MotionMode::Drift,
        MotionMode::Figure8,
        MotionMode::Lissajous,
        MotionMode::Spiral,
        MotionMode::Zigzag,
        MotionMode::Static,
    ];

    /// Resolve a mode by name. Unknown names degrade to [`MotionMode::Static`].
    pub fn from_name(name: &str) -> Self {
        match Self::lookup(name) {
            Some(mode) => mode,
            None => {
                tracing::debug!(name, "unknown motion mode, falling back to static");
                MotionMode::Static
            }
        }
    }

    /// Strict lookup by name.
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            MotionMode::Static => "static",
            MotionMode::Bounce => "bounce",
            MotionMode::Drift => "drift",
            MotionMode::Orbit => "orbit",
            MotionMode::Figure8 => "figure8",
            MotionMode::Lissajous => "lissajous",
            MotionMode::Spiral => "spiral",
            MotionMode::Zigzag => "zigzag",
        }
    }

    /// Cyclic modes follow a closed path whose period is the configured cycle duration.
    pub fn is_cyclic(self) -> bool {
        matches!(
            self,
            MotionMode::Orbit
                | MotionMode::Figure8
                | MotionMode::Lissajous
                | MotionMode::Spiral
                | MotionMode::Zigzag
        )
    }
}

impl std::fmt::Display for MotionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

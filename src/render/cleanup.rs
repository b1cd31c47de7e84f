//! Periodic removal of near-invisible trail residue.
//!
//! Repeated fractional decay never quite reaches zero in 8-bit storage, so faint pixels would
//! otherwise linger and break loop continuity.

/// Alpha at or below which a trail pixel is cleared.
pub const DEFAULT_ALPHA_FLOOR: u8 = 2;
/// Frames between cleanup passes.
pub const DEFAULT_CLEANUP_INTERVAL: u32 = 4;

/// Cleanup policy applied to the freshly decayed trail buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrailCleanup {
    pub alpha_floor: u8,
    pub interval: u32,
}

impl Default for TrailCleanup {
    fn default() -> Self {
        Self {
            alpha_floor: DEFAULT_ALPHA_FLOOR,
            interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

impl TrailCleanup {
    /// Whether a pass runs on animation frame `time`.
    pub fn is_due(&self, time: u64) -> bool {
        self.alpha_floor > 0 && self.interval > 0 && time.is_multiple_of(u64::from(self.interval))
    }

    /// Run the pass when due. Returns `true` if any pixel changed.
    #[tracing::instrument(level = "trace", skip(self, data))]
    pub fn apply(&self, data: &mut [u8], width: u32, height: u32, time: u64) -> bool {
        if !self.is_due(time) {
            return false;
        }
        let cleared = cleanup_faint_trail(data, width, height, self.alpha_floor);
        if cleared > 0 {
            tracing::trace!(cleared, time, "cleared faint trail pixels");
        }
        cleared > 0
    }
}

/// Zero every pixel whose alpha is at or below `alpha_floor`; returns the number cleared.
///
/// Pixels that are already fully zero are not written, so a buffer needing no change is left
/// byte-for-byte untouched. Zero-sized geometry or a zero floor is a no-op.
pub fn cleanup_faint_trail(data: &mut [u8], width: u32, height: u32, alpha_floor: u8) -> usize {
    if width == 0 || height == 0 || alpha_floor == 0 {
        return 0;
    }
    let len = (width as usize) * (height as usize) * 4;
    let Some(pixels) = data.get_mut(..len) else {
        return 0;
    };

    let mut cleared = 0;
    for px in pixels.chunks_exact_mut(4) {
        if px[3] <= alpha_floor && px.iter().any(|&b| b != 0) {
            px.fill(0);
            cleared += 1;
        }
    }
    cleared
}

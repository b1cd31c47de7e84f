//! CPU trail compositing.
//!
//! Two ping-pong trail buffers carry the decayed, shifted history of the sprite; each frame the
//! trail is drawn over the background into a third, visible surface.

/// Pixel-level blend, tint and decay kernels.
pub mod composite;
/// The per-frame trail compositor.
pub mod compositor;
/// Periodic sweep of faint trail residue.
pub mod cleanup;
/// Scaled sprite drawing through `vello_cpu`.
pub mod draw;
/// Premultiplied RGBA8 surfaces and frames.
pub mod surface;

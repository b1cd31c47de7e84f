use crate::foundation::core::Canvas;

/// A rendered frame as RGBA8 pixels, handed to capture sinks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

/// Premultiplied RGBA8 raster owned by the compositor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    canvas: Canvas,
    data: Vec<u8>,
}

impl Surface {
    /// Fully transparent surface of `canvas` size.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            data: vec![0u8; canvas.rgba_len()],
        }
    }

    /// Wrap existing premultiplied bytes. Returns `None` on a length mismatch.
    pub fn from_premul_bytes(canvas: Canvas, data: Vec<u8>) -> Option<Self> {
        (data.len() == canvas.rgba_len()).then_some(Self { canvas, data })
    }

    /// Surface dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.canvas.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.canvas.height
    }

    /// Raw premultiplied bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw premultiplied bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Set every pixel to `px` (premultiplied).
    pub fn fill(&mut self, px: [u8; 4]) {
        for d in self.data.chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
    }

    /// Pixel at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.canvas.width || y >= self.canvas.height {
            return None;
        }
        let i = ((y as usize) * (self.canvas.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// `true` when every byte is zero.
    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }

    /// Copy out as a sink frame.
    pub fn to_frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.data.clone(),
            premultiplied: true,
        }
    }
}

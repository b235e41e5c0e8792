use crate::memory::Memory;

/// Rows of the frame, one per scanline-rotated column of the monitor.
pub const FRAME_ROWS: usize = 224;
pub const FRAME_COLS: usize = 256;

/// A 1-bit snapshot of video RAM.
///
/// The monitor is mounted on its side, so row `r` of the frame is screen column
/// `r` and frame column `c` counts up from the bottom of the screen.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    pixels: Vec<bool>,
}

impl Frame {
    #[cfg(test)]
    pub fn blank() -> Self {
        Self {
            pixels: vec![false; FRAME_ROWS * FRAME_COLS],
        }
    }

    #[cfg(test)]
    pub fn pixel(&self, row: usize, col: usize) -> bool {
        self.pixels[row * FRAME_COLS + col]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.pixels.chunks_exact(FRAME_COLS)
    }

    pub fn lit(&self) -> usize {
        self.pixels.iter().filter(|&&p| p).count()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame").field("lit", &self.lit()).finish()
    }
}

/// Expands video RAM into a fresh frame, least significant bit first.
pub fn extract(mem: &Memory) -> Frame {
    let pixels = mem
        .video_ram()
        .iter()
        .flat_map(|&byte| (0..8).map(move |bit| byte & (1 << bit) != 0))
        .collect();
    Frame { pixels }
}

use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};

use crate::{
    error::Result,
    input::RawEvent,
    video::{Frame, FRAME_COLS, FRAME_ROWS},
};

// The monitor is rotated, so the window is as wide as the frame has rows.
pub const WIDTH: usize = FRAME_ROWS;
pub const HEIGHT: usize = FRAME_COLS;

const BLACK: u32 = 0x00_00_00;
const WHITE: u32 = 0xff_ff_ff;
const GREEN: u32 = 0x00_ff_00;
const RED: u32 = 0xff_00_00;

const fn from_u8_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Colour of the cellophane strip over frame row `x`, column `y`.
///
/// `y` counts up from the bottom of the upright screen, so the green band
/// covers the player and shields and the red band the UFO lane.
pub fn overlay(x: usize, y: usize) -> u32 {
    match (x, y) {
        (16..=133, 0..=15) => GREEN,
        (_, 0..=71) => GREEN,
        (_, 192..=223) => RED,
        _ => WHITE,
    }
}

/// Rasterises `frame` into a `WIDTH * HEIGHT` pixel buffer.
pub fn render(frame: &Frame, monochrome: bool, cocktail: bool, buffer: &mut [u32]) {
    for (x, row) in frame.rows().enumerate() {
        for (col, &lit) in row.iter().enumerate() {
            let y = if cocktail { col } else { HEIGHT - 1 - col };
            buffer[y * WIDTH + x] = match (lit, monochrome) {
                (false, _) => BLACK,
                (true, true) => WHITE,
                (true, false) => overlay(x, col),
            };
        }
    }
}

pub struct Display {
    pixel_buffer: Vec<u32>,
    window: Window,
    // set when the last call already pumped window events
    pumped: bool,
}

impl Display {
    pub fn new(scale: Scale) -> Result<Self> {
        let mut window = Window::new(
            "emuvaders - ESC to exit",
            WIDTH,
            HEIGHT,
            WindowOptions {
                scale,
                ..WindowOptions::default()
            },
        )?;
        // paced by the emulation's frame tick instead
        window.limit_update_rate(None);
        Ok(Self {
            pixel_buffer: vec![from_u8_rgb(0, 0, 0); WIDTH * HEIGHT],
            window,
            pumped: false,
        })
    }

    pub fn draw(&mut self, frame: &Frame, monochrome: bool, cocktail: bool) -> Result<()> {
        render(frame, monochrome, cocktail, &mut self.pixel_buffer);
        self.window
            .update_with_buffer(&self.pixel_buffer, WIDTH, HEIGHT)?;
        self.pumped = true;
        Ok(())
    }

    pub fn poll_events(&mut self) -> Vec<RawEvent> {
        if !std::mem::take(&mut self.pumped) {
            self.window.update();
        }
        if !self.window.is_open() {
            return vec![RawEvent::Quit];
        }

        let fresh = self.window.get_keys_pressed(KeyRepeat::No);
        let mut events: Vec<RawEvent> = self
            .window
            .get_keys_pressed(KeyRepeat::Yes)
            .into_iter()
            .map(|key| key_down(key, !fresh.contains(&key)))
            .collect();
        events.extend(
            self.window
                .get_keys_released()
                .into_iter()
                .map(|key| RawEvent::Key {
                    key,
                    pressed: false,
                    repeat: false,
                }),
        );
        events
    }
}

fn key_down(key: Key, repeat: bool) -> RawEvent {
    RawEvent::Key {
        key,
        pressed: true,
        repeat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Memory, VIDEO_RAM_START};
    use crate::video;

    fn frame_with(addr: u16, value: u8) -> Frame {
        let mut mem = Memory::new();
        mem.set(addr, value);
        video::extract(&mem)
    }

    #[test]
    fn test_overlay_bands() {
        assert_eq!(overlay(20, 5), GREEN);
        assert_eq!(overlay(200, 5), GREEN);
        assert_eq!(overlay(0, 71), GREEN);
        assert_eq!(overlay(0, 72), WHITE);
        assert_eq!(overlay(100, 191), WHITE);
        assert_eq!(overlay(100, 192), RED);
        assert_eq!(overlay(100, 223), RED);
        assert_eq!(overlay(100, 224), WHITE);
    }

    #[test]
    fn test_upright_flips_vertically() {
        // first bit of video RAM is frame (0, 0): bottom-left when upright
        let frame = frame_with(VIDEO_RAM_START, 0x01);
        let mut buffer = vec![0xdead; WIDTH * HEIGHT];
        render(&frame, true, false, &mut buffer);
        assert_eq!(buffer[(HEIGHT - 1) * WIDTH], WHITE);
        assert_eq!(buffer.iter().filter(|&&p| p == WHITE).count(), 1);
        assert!(buffer.iter().all(|&p| p == WHITE || p == BLACK));
    }

    #[test]
    fn test_cocktail_keeps_orientation() {
        let frame = frame_with(VIDEO_RAM_START, 0x01);
        let mut buffer = vec![0; WIDTH * HEIGHT];
        render(&frame, true, true, &mut buffer);
        assert_eq!(buffer[0], WHITE);
    }

    #[test]
    fn test_colour_follows_frame_column() {
        // frame (0, 0) sits bottom-left upright: inside the green band
        let frame = frame_with(VIDEO_RAM_START, 0x01);
        let mut buffer = vec![0; WIDTH * HEIGHT];
        render(&frame, false, false, &mut buffer);
        assert_eq!(buffer[(HEIGHT - 1) * WIDTH], GREEN);

        // frame column 200 is the UFO lane near the top of the screen
        let frame = frame_with(VIDEO_RAM_START + 200 / 8, 0x01);
        render(&frame, false, false, &mut buffer);
        assert_eq!(buffer[(HEIGHT - 1 - 200) * WIDTH], RED);

        // cocktail moves the pixel but keeps its colour
        render(&frame, false, true, &mut buffer);
        assert_eq!(buffer[200 * WIDTH], RED);
        assert_eq!(buffer.iter().filter(|&&p| p != BLACK).count(), 1);
    }

    #[test]
    fn test_rgb_packing() {
        assert_eq!(from_u8_rgb(0xff, 0, 0), RED);
        assert_eq!(from_u8_rgb(0, 0xff, 0), GREEN);
    }
}

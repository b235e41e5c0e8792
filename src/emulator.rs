use std::{
    sync::mpsc::SyncSender,
    thread,
    time::Instant,
};

use crate::{
    cpu::{Bus, Processor},
    error::{Error, Result},
    memory::Memory,
    ports::PortController,
    timer::{Ticker, FRAMES_PER_SECOND},
    video::{self, Frame},
};

pub const CYCLES_PER_SECOND: u64 = 2_000_000;
pub const LINES_PER_FRAME: u64 = 224;
/// The mid-screen interrupt fires when the beam reaches this line.
pub const MID_SCREEN_LINE: u64 = 96;

pub const RST_1: u8 = 0xcf;
pub const RST_2: u8 = 0xd7;

// ceil(lines * CYCLES_PER_SECOND / FRAMES_PER_SECOND / LINES_PER_FRAME)
const fn steps_for_lines(lines: u64) -> u64 {
    let per_line_divisor = FRAMES_PER_SECOND as u64 * LINES_PER_FRAME;
    (lines * CYCLES_PER_SECOND + per_line_divisor - 1) / per_line_divisor
}

pub const FIRST_HALF_STEPS: u64 = steps_for_lines(MID_SCREEN_LINE);
pub const SECOND_HALF_STEPS: u64 = steps_for_lines(LINES_PER_FRAME - MID_SCREEN_LINE);

/// Everything on the board the interpreter can reach.
pub struct Board {
    pub memory: Memory,
    pub ports: PortController,
}

impl Bus for Board {
    fn read(&mut self, addr: u16) -> u8 {
        self.memory.get(addr)
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.memory.set(addr, value);
    }

    fn input(&mut self, port: u8) -> u8 {
        self.ports.read(port)
    }

    fn output(&mut self, port: u8, value: u8) {
        self.ports.write(port, value);
    }
}

/// Drives the interpreter one video frame at a time.
pub struct Emulator<P: Processor> {
    cpu: P,
    board: Board,
    frames: SyncSender<Frame>,
    frame_count: u64,
}

impl<P: Processor> Emulator<P> {
    pub fn new(cpu: P, board: Board, frames: SyncSender<Frame>) -> Self {
        Self {
            cpu,
            board,
            frames,
            frame_count: 0,
        }
    }

    fn run_lines(&mut self, steps: u64) {
        for _ in 0..steps {
            self.cpu.step(&mut self.board);
        }
    }

    /// One frame: run to line 96, RST 1, run to the bottom, RST 2, snapshot.
    pub fn run_frame(&mut self) -> Frame {
        self.run_lines(FIRST_HALF_STEPS);
        self.cpu.interrupt(&mut self.board, RST_1);
        self.run_lines(SECOND_HALF_STEPS);
        self.cpu.interrupt(&mut self.board, RST_2);
        self.frame_count += 1;
        video::extract(&self.board.memory)
    }

    /// Runs at 60 frames per second until the presentation side hangs up.
    ///
    /// Frames are handed over on a rendezvous channel, so a slow consumer
    /// holds the emulation back instead of frames piling up.
    pub fn run(mut self) -> Result<()> {
        let start = Instant::now();
        let mut frame_tick = Ticker::per_second(FRAMES_PER_SECOND, start);
        let mut debug_tick = Ticker::per_second(1, start);
        let mut last_count = 0;

        log::info!(
            "emulating {FIRST_HALF_STEPS} + {SECOND_HALF_STEPS} steps per frame at {FRAMES_PER_SECOND} Hz"
        );

        loop {
            let now = Instant::now();
            if debug_tick.sync(now) {
                log::debug!(
                    "{} fps, {}",
                    self.frame_count - last_count,
                    self.cpu.debug_speed(now - start)
                );
                last_count = self.frame_count;
            }
            if frame_tick.sync(now) {
                let frame = self.run_frame();
                self.frames
                    .send(frame)
                    .map_err(|_| Error::PresentationStopped)?;
                continue;
            }
            let wake = frame_tick.deadline().min(debug_tick.deadline());
            thread::sleep(wake.saturating_duration_since(Instant::now()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cpu::Intel8080,
        input::InputAggregator,
        memory::{VIDEO_RAM_END, VIDEO_RAM_START},
        modes::ModeFlags,
        sound::SoundDispatcher,
        video::FRAME_COLS,
    };
    use std::{sync::mpsc::sync_channel, time::Duration};

    #[derive(Debug, PartialEq)]
    enum Event {
        Steps(u64),
        Interrupt(u8),
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<Event>,
    }

    impl Processor for Recorder {
        fn step<B: Bus>(&mut self, _bus: &mut B) -> u32 {
            match self.events.last_mut() {
                Some(Event::Steps(n)) => *n += 1,
                _ => self.events.push(Event::Steps(1)),
            }
            4
        }

        fn interrupt<B: Bus>(&mut self, _bus: &mut B, opcode: u8) -> bool {
            self.events.push(Event::Interrupt(opcode));
            true
        }

        fn debug_speed(&self, _elapsed: Duration) -> String {
            String::new()
        }
    }

    fn board(memory: Memory) -> Board {
        let modes = ModeFlags::default();
        let (link, _input) = InputAggregator::new(modes.clone());
        let (tx, _rx) = sync_channel(16);
        Board {
            memory,
            ports: PortController::new(link, SoundDispatcher::new(tx), modes),
        }
    }

    #[test]
    fn test_step_budget() {
        assert_eq!(FIRST_HALF_STEPS, 14_286);
        assert_eq!(SECOND_HALF_STEPS, 19_048);
        // 96:128 within a step of rounding
        let scaled = FIRST_HALF_STEPS * 128;
        let expected = SECOND_HALF_STEPS * 96;
        assert!(scaled.abs_diff(expected) <= 128);
    }

    #[test]
    fn test_two_interrupts_per_frame_in_order() {
        let (tx, _rx) = sync_channel(1);
        let mut emu = Emulator::new(Recorder::default(), board(Memory::new()), tx);
        emu.run_frame();
        assert_eq!(
            emu.cpu.events,
            vec![
                Event::Steps(FIRST_HALF_STEPS),
                Event::Interrupt(RST_1),
                Event::Steps(SECOND_HALF_STEPS),
                Event::Interrupt(RST_2),
            ]
        );
    }

    #[test]
    fn test_interrupt_handlers_draw_into_frame() {
        let mut memory = Memory::new();
        // 0x00: LXI SP,0x2400; EI; JMP 0x0004
        memory
            .load_rom("invaders.h", 0x0000, &[0x31, 0x00, 0x24, 0xfb, 0xc3, 0x04, 0x00])
            .unwrap();
        // 0x08: MVI A,0xff; STA 0x2400; EI; RET
        memory
            .load_rom("rst1", 0x0008, &[0x3e, 0xff, 0x32, 0x00, 0x24, 0xfb, 0xc9])
            .unwrap();
        // 0x10: MVI A,0x80; STA 0x3fff; EI; RET
        memory
            .load_rom("rst2", 0x0010, &[0x3e, 0x80, 0x32, 0xff, 0x3f, 0xfb, 0xc9])
            .unwrap();

        let (tx, _rx) = sync_channel(1);
        let mut emu = Emulator::new(Intel8080::new(), board(memory), tx);

        // RST 2 is accepted right before the snapshot; its handler runs next frame
        let frame = emu.run_frame();
        assert!((0..8).all(|col| frame.pixel(0, col)));
        assert_eq!(frame.lit(), 8);
        assert_eq!(emu.cpu.regs.pc, 0x0010);
        assert_eq!(emu.board.memory.get(VIDEO_RAM_START), 0xff);

        let frame = emu.run_frame();
        assert!(frame.pixel(223, FRAME_COLS - 1));
        assert_eq!(frame.lit(), 9);
        assert_eq!(emu.board.memory.get(VIDEO_RAM_END - 1), 0x80);
    }
}

use std::{
    sync::mpsc::{Receiver, SyncSender, TryRecvError},
    thread,
    time::Duration,
};

use crate::{
    audio::Audio,
    display::Display,
    error::{Error, Result},
    input::{InputMessage, RawEvent},
    modes::ModeFlags,
    sound::SoundEffect,
    video::Frame,
};

const IDLE_SLEEP: Duration = Duration::from_millis(1);

/// The screen, speakers and controls of the cabinet.
pub trait Presenter {
    fn present(&mut self, frame: &Frame, modes: &ModeFlags) -> Result<()>;
    fn play(&mut self, effect: SoundEffect) -> Result<()>;
    fn poll_events(&mut self) -> Vec<RawEvent>;
}

pub struct Cabinet {
    display: Display,
    // None when muted
    audio: Option<Audio>,
}

impl Cabinet {
    pub fn new(display: Display, audio: Option<Audio>) -> Self {
        Self { display, audio }
    }
}

impl Presenter for Cabinet {
    fn present(&mut self, frame: &Frame, modes: &ModeFlags) -> Result<()> {
        self.display
            .draw(frame, modes.monochrome(), modes.cocktail())
    }

    fn play(&mut self, effect: SoundEffect) -> Result<()> {
        match &self.audio {
            Some(audio) => audio.play(effect),
            None => Ok(()),
        }
    }

    fn poll_events(&mut self) -> Vec<RawEvent> {
        self.display.poll_events()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pump {
    Busy,
    Idle,
    /// The input actor is gone; nothing left to drive.
    Closed,
}

/// The presentation actor: drains frames and sounds, feeds raw input back.
///
/// Runs on the main thread since the window and the audio stream must stay there.
pub struct Pipeline {
    frames: Receiver<Frame>,
    sounds: Receiver<SoundEffect>,
    events: SyncSender<InputMessage>,
    modes: ModeFlags,
}

impl Pipeline {
    pub fn new(
        frames: Receiver<Frame>,
        sounds: Receiver<SoundEffect>,
        events: SyncSender<InputMessage>,
        modes: ModeFlags,
    ) -> Self {
        Self {
            frames,
            sounds,
            events,
            modes,
        }
    }

    pub fn pump<P: Presenter>(&mut self, presenter: &mut P) -> Result<Pump> {
        let mut status = Pump::Idle;

        match self.frames.try_recv() {
            Ok(frame) => {
                presenter.present(&frame, &self.modes)?;
                status = Pump::Busy;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => return Err(Error::EmulationStopped),
        }

        match self.sounds.try_recv() {
            Ok(effect) => {
                log::trace!("play {effect:?}");
                presenter.play(effect)?;
                status = Pump::Busy;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => return Err(Error::EmulationStopped),
        }

        for event in presenter.poll_events() {
            if self.events.send(InputMessage::Event(event)).is_err() {
                return Ok(Pump::Closed);
            }
            status = Pump::Busy;
        }

        Ok(status)
    }

    pub fn run<P: Presenter>(mut self, presenter: &mut P) -> Result<()> {
        loop {
            match self.pump(presenter)? {
                Pump::Busy => {}
                Pump::Idle => thread::sleep(IDLE_SLEEP),
                Pump::Closed => {
                    log::info!("input closed, shutting down");
                    return Ok(());
                }
            }
        }
    }
}

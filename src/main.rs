// Intel 8080 at 2 MHz, 8K ROM at 0x0000, 8K RAM at 0x2000 (mirrored at 0x4000)
// Video RAM: 0x2400-0x3fff, 1 bit per pixel, 224 x 256 on a monitor turned 90°
//
// Two interrupts per frame:
//      RST 1 when the beam reaches line 96
//      RST 2 at vblank
//
// I/O ports
//      in 0-2: cabinet switches and controls
//      in 3:   shift register result
//      out 2:  shift amount
//      out 3:  sound bank 1
//      out 4:  shift data
//      out 5:  sound bank 2
//      out 6:  watchdog

// Separately:
// Emulation: 60 frames per second on its own thread
// Input: serves port reads and key events on its own thread
// Window + audio: main thread

use std::{
    path::Path,
    process,
    sync::mpsc::sync_channel,
    thread::{self, JoinHandle},
};

use anyhow::Context;
use clap::Parser;

use audio::Audio;
use config::Settings;
use cpu::Intel8080;
use display::Display;
use emulator::{Board, Emulator};
use error::Error;
use input::{Flow, InputAggregator};
use memory::Memory;
use modes::ModeFlags;
use ports::PortController;
use presenter::{Cabinet, Pipeline};
use sound::SoundDispatcher;

mod audio;
mod config;
mod cpu;
mod decode;
mod display;
mod emulator;
mod error;
mod input;
mod keyboard;
mod memory;
mod modes;
mod ports;
mod presenter;
mod registers;
mod sound;
mod timer;
mod video;

fn open_audio(data_dir: &Path, mute: bool) -> anyhow::Result<Option<Audio>> {
    if mute {
        log::info!("audio muted");
        return Ok(None);
    }
    let clips = audio::load_clips(data_dir).context("loading sound effects")?;
    let audio = Audio::new(clips).context("opening audio output")?;
    Ok(Some(audio))
}

/// Turns a presentation failure into the error `main` reports.
///
/// When the frame channel hung up, the emulation thread holds the real cause.
fn stop_reason(presentation: Error, emulation: JoinHandle<error::Result<()>>) -> anyhow::Error {
    if !matches!(presentation, Error::EmulationStopped) {
        return anyhow::Error::new(presentation).context("presentation stopped");
    }
    match emulation.join() {
        Ok(Err(cause)) => anyhow::Error::new(cause).context("emulation stopped"),
        Ok(Ok(())) => anyhow::Error::new(presentation),
        Err(_) => anyhow::anyhow!("emulation thread panicked"),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let settings = Settings::parse();
    let modes = ModeFlags::new(!settings.color, settings.cocktail);

    let mut memory = Memory::new();
    memory
        .load_roms_from_dir(&settings.data_dir)
        .context("loading program images")?;

    let audio = open_audio(&settings.data_dir, settings.mute)?;
    let display = Display::new(settings.scale.into()).context("opening window")?;

    let (link, input) = InputAggregator::new(modes.clone());
    let events = link.events();
    let (sound_tx, sound_rx) = sync_channel(0);
    let (frame_tx, frame_rx) = sync_channel(0);

    let board = Board {
        memory,
        ports: PortController::new(link, SoundDispatcher::new(sound_tx), modes.clone()),
    };
    let emulator = Emulator::new(Intel8080::new(), board, frame_tx);

    thread::Builder::new()
        .name("input".into())
        .spawn(move || {
            if input.run() == Flow::Quit {
                process::exit(0);
            }
        })?;
    let emulation = thread::Builder::new()
        .name("emulation".into())
        .spawn(move || emulator.run())?;

    let mut cabinet = Cabinet::new(display, audio);
    Pipeline::new(frame_rx, sound_rx, events, modes)
        .run(&mut cabinet)
        .map_err(|err| stop_reason(err, emulation))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_emulation_cause() {
        let emulation = thread::spawn(|| Err(Error::NoAudioDevice));
        let err = stop_reason(Error::EmulationStopped, emulation);
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NoAudioDevice)));
        assert!(format!("{err:#}").starts_with("emulation stopped"));
    }

    #[test]
    fn test_presentation_failure_is_reported_as_is() {
        let emulation = thread::spawn(|| Ok(()));
        let err = stop_reason(Error::AudioStopped, emulation);
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::AudioStopped)));
        assert!(format!("{err:#}").starts_with("presentation stopped"));
    }

    #[test]
    fn test_emulation_panic_is_reported() {
        let emulation = thread::spawn(|| -> error::Result<()> { panic!("boom") });
        let err = stop_reason(Error::EmulationStopped, emulation);
        assert_eq!(err.to_string(), "emulation thread panicked");
    }
}

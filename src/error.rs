use std::{io, path::PathBuf};

use thiserror::Error;

use crate::memory::ROM_CHUNK_SIZE;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("program image {name} is {len} bytes, at most {ROM_CHUNK_SIZE} allowed")]
    RomTooLarge { name: String, len: usize },
    #[error("failed to decode sound sample {}: {source}", path.display())]
    Sample {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
    #[error("window error: {0}")]
    Window(#[from] minifb::Error),
    #[error("no audio output device available")]
    NoAudioDevice,
    #[error("unsupported sample format '{0}'")]
    UnsupportedSampleFormat(cpal::SampleFormat),
    #[error("audio config error: {0}")]
    AudioConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("audio stream error: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("audio playback error: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
    #[error("audio stream is no longer accepting sounds")]
    AudioStopped,
    #[error("emulation thread stopped")]
    EmulationStopped,
    #[error("presentation stopped accepting frames")]
    PresentationStopped,
}

pub type Result<T> = std::result::Result<T, Error>;

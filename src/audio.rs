use std::{
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, Sender},
        Arc,
    },
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};

use crate::{
    error::{Error, Result},
    sound::SoundEffect,
};

// Headroom so a few overlapping effects don't clip straight away.
const VOICE_GAIN: f32 = 0.6;

/// A decoded mono sample.
#[derive(Debug, Clone)]
pub struct Clip {
    samples: Arc<[f32]>,
    rate: u32,
}

impl Clip {
    pub fn new(samples: Vec<f32>, rate: u32) -> Self {
        Self {
            samples: samples.into(),
            rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Decodes a WAV file, folding all channels down to mono in `[-1, 1]`.
    pub fn load(path: &Path) -> Result<Self> {
        let sample_err = |source: hound::Error| Error::Sample {
            path: path.to_owned(),
            source,
        };
        let mut reader = hound::WavReader::open(path).map_err(sample_err)?;
        let spec = reader.spec();
        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<_, _>>()
                .map_err(sample_err)?,
            hound::SampleFormat::Int => {
                let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|s| s as f32 / full_scale))
                    .collect::<std::result::Result<_, _>>()
                    .map_err(sample_err)?
            }
        };
        let channels = usize::from(spec.channels.max(1));
        let mono = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();
        Ok(Self::new(mono, spec.sample_rate))
    }
}

/// Loads one clip per effect, in `SoundEffect::ALL` order.
pub fn load_clips(dir: &Path) -> Result<Vec<Clip>> {
    SoundEffect::ALL
        .iter()
        .map(|effect| {
            let clip = Clip::load(&dir.join(effect.file_name()))?;
            log::debug!("loaded {} ({} samples)", effect.file_name(), clip.len());
            Ok(clip)
        })
        .collect()
}

struct Voice {
    clip: usize,
    position: f64,
}

/// Sums every playing effect into the output stream.
///
/// Lives inside the audio callback; new effects arrive over a channel.
pub struct Mixer {
    clips: Vec<Clip>,
    voices: Vec<Voice>,
    output_rate: u32,
    triggers: Receiver<SoundEffect>,
}

impl Mixer {
    pub fn new(clips: Vec<Clip>, output_rate: u32, triggers: Receiver<SoundEffect>) -> Self {
        Self {
            clips,
            voices: Vec::new(),
            output_rate,
            triggers,
        }
    }

    fn start_pending(&mut self) {
        while let Ok(effect) = self.triggers.try_recv() {
            if effect.index() < self.clips.len() {
                self.voices.push(Voice {
                    clip: effect.index(),
                    position: 0.0,
                });
            }
        }
    }

    fn next_sample(&mut self) -> f32 {
        let mut mixed = 0.0;
        for voice in &mut self.voices {
            let clip = &self.clips[voice.clip];
            if let Some(sample) = clip.samples.get(voice.position as usize) {
                mixed += sample * VOICE_GAIN;
            }
            voice.position += f64::from(clip.rate) / f64::from(self.output_rate);
        }
        let clips = &self.clips;
        self.voices
            .retain(|voice| (voice.position as usize) < clips[voice.clip].len());
        mixed.clamp(-1.0, 1.0)
    }

    #[cfg(test)]
    pub fn playing(&self) -> usize {
        self.voices.len()
    }

    pub fn fill<T>(&mut self, output: &mut [T], channels: usize)
    where
        T: Sample + FromSample<f32>,
    {
        self.start_pending();
        for frame in output.chunks_mut(channels) {
            let value: T = T::from_sample(self.next_sample());
            for sample in frame.iter_mut() {
                *sample = value;
            }
        }
    }
}

/// The sending half of the mixer, poisoned once the output stream fails.
pub struct Playback {
    triggers: Sender<SoundEffect>,
    failed: Arc<AtomicBool>,
}

impl Playback {
    pub fn new(triggers: Sender<SoundEffect>) -> Self {
        Self {
            triggers,
            failed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stream error hook; every later `play` fails.
    pub fn on_stream_error(failed: &AtomicBool, err: cpal::StreamError) {
        log::error!("an error occurred on stream: {err}");
        failed.store(true, Ordering::Relaxed);
    }

    pub fn play(&self, effect: SoundEffect) -> Result<()> {
        if self.failed.load(Ordering::Relaxed) {
            return Err(Error::AudioStopped);
        }
        self.triggers.send(effect).map_err(|_| Error::AudioStopped)
    }
}

/// The default output device, playing triggered effects as one-shots.
pub struct Audio {
    _stream: cpal::Stream,
    playback: Playback,
}

impl Audio {
    pub fn new(clips: Vec<Clip>) -> Result<Self> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(Error::NoAudioDevice)?;
        let supported = device.default_output_config()?;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        let (triggers, rx) = mpsc::channel();
        let mixer = Mixer::new(clips, config.sample_rate.0, rx);
        let playback = Playback::new(triggers);
        let failed = Arc::clone(&playback.failed);

        let stream = match sample_format {
            cpal::SampleFormat::I8 => Self::build::<i8>(&device, &config, mixer, failed),
            cpal::SampleFormat::I16 => Self::build::<i16>(&device, &config, mixer, failed),
            cpal::SampleFormat::I32 => Self::build::<i32>(&device, &config, mixer, failed),
            cpal::SampleFormat::I64 => Self::build::<i64>(&device, &config, mixer, failed),
            cpal::SampleFormat::U8 => Self::build::<u8>(&device, &config, mixer, failed),
            cpal::SampleFormat::U16 => Self::build::<u16>(&device, &config, mixer, failed),
            cpal::SampleFormat::U32 => Self::build::<u32>(&device, &config, mixer, failed),
            cpal::SampleFormat::U64 => Self::build::<u64>(&device, &config, mixer, failed),
            cpal::SampleFormat::F32 => Self::build::<f32>(&device, &config, mixer, failed),
            cpal::SampleFormat::F64 => Self::build::<f64>(&device, &config, mixer, failed),
            sample_format => Err(Error::UnsupportedSampleFormat(sample_format)),
        }?;
        stream.play()?;

        log::info!(
            "audio: {} Hz, {} channel(s), {sample_format}",
            config.sample_rate.0,
            config.channels
        );
        Ok(Self {
            _stream: stream,
            playback,
        })
    }

    fn build<T>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        mut mixer: Mixer,
        failed: Arc<AtomicBool>,
    ) -> Result<cpal::Stream>
    where
        T: SizedSample + FromSample<f32>,
    {
        let channels = usize::from(config.channels);
        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| mixer.fill(data, channels),
            move |err| Playback::on_stream_error(&failed, err),
            None,
        )?;
        Ok(stream)
    }

    pub fn play(&self, effect: SoundEffect) -> Result<()> {
        self.playback.play(effect)
    }
}

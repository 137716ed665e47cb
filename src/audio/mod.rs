use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};
use tracing::{error, info};

use crate::audio_api::AudioCommand;
use crate::config::AudioConfig;

mod effect;
mod engine;
mod frame;
mod sample_buffer;
mod voice;

pub use frame::StereoFrame;
pub use sample_buffer::SampleBuffer;

use engine::Engine;

const SCRATCH_FRAMES: usize = 4096; // mix block; larger callbacks are rendered in pieces

pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    sample_rate: u32,
    _output_stream: cpal::Stream,
}

impl AudioHandle {
    pub fn sender(&self) -> Sender<AudioCommand> {
        self.tx.clone()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

pub fn start_audio(settings: &AudioConfig) -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(1024);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate: u32 = config.sample_rate();
    let channels = config.channels() as usize;
    info!(sample_rate, channels, "Opening audio output");

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let engine = Engine::new(sample_rate, settings);
            let output_stream =
                build_output_stream_f32(&device, &config.into(), rx, engine, channels)?;
            output_stream.play().context("failed to play output stream")?;

            Ok(AudioHandle {
                tx,
                sample_rate,
                _output_stream: output_stream,
            })
        }
        other => anyhow::bail!("unsupported sample format {other:?} (only f32 supported)"),
    }
}

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    mut engine: Engine,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let err_fn = |err: cpal::StreamError| error!(%err, "Audio output stream error");
    let mut scratch = vec![StereoFrame::zero(); SCRATCH_FRAMES];

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }
            for chunk in data.chunks_mut(SCRATCH_FRAMES * channels) {
                let block = &mut scratch[..chunk.len() / channels];
                engine.render_block(block);
                write_interleaved(chunk, block, channels);
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

// stereo mix into the device layout: mono gets the average, extra channels
// stay silent
fn write_interleaved(out: &mut [f32], frames: &[StereoFrame], channels: usize) {
    for (slot, frame) in out.chunks_exact_mut(channels).zip(frames) {
        match slot {
            [mono] => *mono = frame.mono(),
            [left, right, rest @ ..] => {
                *left = frame.left;
                *right = frame.right;
                rest.fill(0.0);
            }
            [] => {}
        }
    }
}

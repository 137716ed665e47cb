use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use crate::shared::KeyId;

const SILENCE: f32 = 0.0005; // release envelope level at which a voice frees up

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

// One sounding note: an anchor sample played back at `rate` (pitch-shifted
// by resampling), with a release envelope once the key lets go.
#[derive(Clone, Debug)]
pub struct Voice {
    pub key: KeyId,
    pub anchor: usize, // index into the engine's anchor list
    pub started: u64,  // note-on order, for stealing the oldest voice
    pub active: bool,
    pos: f32,
    rate: f32,
    gain: f32,
    envelope: f32,
    releasing: bool,
}

impl Voice {
    pub fn idle() -> Self {
        Self {
            key: KeyId(0),
            anchor: 0,
            started: 0,
            active: false,
            pos: 0.0,
            rate: 1.0,
            gain: 0.0,
            envelope: 0.0,
            releasing: false,
        }
    }

    pub fn start(key: KeyId, anchor: usize, rate: f32, gain: f32, started: u64) -> Self {
        Self {
            key,
            anchor,
            started,
            active: true,
            pos: 0.0,
            rate,
            gain,
            envelope: 1.0,
            releasing: false,
        }
    }

    pub fn release(&mut self) {
        self.releasing = true;
    }

    pub fn is_releasing(&self) -> bool {
        self.releasing
    }

    /// Mix this voice into `out`. `release_coef` is the per-frame envelope
    /// multiplier applied while releasing.
    pub fn render_into(&mut self, buffer: &SampleBuffer, out: &mut [StereoFrame], release_coef: f32) {
        if !self.active {
            return;
        }
        let data = &buffer.data;
        let len = data.len();

        for frame in out.iter_mut() {
            let i = self.pos as usize;
            if i >= len {
                self.active = false; // ran off the end of the sample
                break;
            }
            let frac = self.pos - i as f32;
            let s0 = data[i];
            let s1 = data.get(i + 1).copied().unwrap_or(s0);
            let amp = self.gain * self.envelope;
            frame.left += lerp(s0.left, s1.left, frac) * amp;
            frame.right += lerp(s0.right, s1.right, frac) * amp;

            self.pos += self.rate;
            if self.releasing {
                self.envelope *= release_coef;
                if self.envelope < SILENCE {
                    self.active = false;
                    break;
                }
            }
        }
    }
}

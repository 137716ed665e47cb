use super::frame::StereoFrame;

// Master effects, applied to the whole mix after the voices
#[derive(Clone, Debug, PartialEq)]
pub enum EffectSpec {
    Reverb { decay_secs: f32, wet: f32 },
    Gain { db: f32 },
}

impl EffectSpec {
    pub fn to_effect(&self, sample_rate: f32) -> Box<dyn Effect> {
        match self {
            EffectSpec::Reverb { decay_secs, wet } => {
                Box::new(Reverb::new(sample_rate, *decay_secs, *wet))
            }
            EffectSpec::Gain { db } => Box::new(Gain::from_db(*db)),
        }
    }
}

pub trait Effect: Send {
    fn process(&mut self, buf: &mut [StereoFrame]);
}

// gain
pub struct Gain {
    factor: f32,
}

impl Gain {
    pub fn from_db(db: f32) -> Self {
        Self {
            factor: 10f32.powf(db / 20.0),
        }
    }
}

impl Effect for Gain {
    fn process(&mut self, buf: &mut [StereoFrame]) {
        for f in buf.iter_mut() {
            *f = f.scaled(self.factor);
        }
    }
}

// reverb: four parallel feedback combs into two series allpasses
// (Schroeder), tuned at 44.1 kHz and scaled to the output rate
const COMB_TUNING: [usize; 4] = [1116, 1188, 1277, 1356];
const ALLPASS_TUNING: [usize; 2] = [556, 441];
const ALLPASS_FEEDBACK: f32 = 0.5;
const INPUT_GAIN: f32 = 0.15;

struct DelayLine {
    buf: Vec<f32>,
    idx: usize,
}

impl DelayLine {
    fn new(len: usize) -> Self {
        Self {
            buf: vec![0.0; len.max(1)],
            idx: 0,
        }
    }

    fn read(&self) -> f32 {
        self.buf[self.idx]
    }

    fn write_and_advance(&mut self, x: f32) {
        self.buf[self.idx] = x;
        self.idx = (self.idx + 1) % self.buf.len();
    }
}

pub struct Reverb {
    combs: Vec<(DelayLine, f32)>, // line, feedback
    allpasses: Vec<DelayLine>,
    wet: f32,
}

impl Reverb {
    pub fn new(sample_rate: f32, decay_secs: f32, wet: f32) -> Self {
        let scale = sample_rate / 44100.0;
        let decay_frames = (decay_secs.max(0.01) * sample_rate).max(1.0);
        let combs = COMB_TUNING
            .iter()
            .map(|t| {
                let len = ((*t as f32 * scale) as usize).max(1);
                // -60 dB after decay_secs
                let feedback = 10f32.powf(-3.0 * len as f32 / decay_frames);
                (DelayLine::new(len), feedback)
            })
            .collect();
        let allpasses = ALLPASS_TUNING
            .iter()
            .map(|t| DelayLine::new((*t as f32 * scale) as usize))
            .collect();
        Self {
            combs,
            allpasses,
            wet: wet.clamp(0.0, 1.0),
        }
    }
}

impl Effect for Reverb {
    fn process(&mut self, buf: &mut [StereoFrame]) {
        for f in buf.iter_mut() {
            let input = f.mono() * INPUT_GAIN;

            let mut acc = 0.0;
            for (line, feedback) in self.combs.iter_mut() {
                let y = line.read();
                line.write_and_advance(input + y * *feedback);
                acc += y;
            }
            for line in self.allpasses.iter_mut() {
                let b = line.read();
                line.write_and_advance(acc + b * ALLPASS_FEEDBACK);
                acc = b - acc;
            }

            let dry = 1.0 - self.wet;
            f.left = f.left * dry + acc * self.wet;
            f.right = f.right * dry + acc * self.wet;
        }
    }
}

use std::path::Path;

use super::frame::StereoFrame;
use crate::loader::error::LoadError;

#[derive(Clone, Debug)]
pub struct SampleBuffer {
    pub data: Vec<StereoFrame>, // decoded at the output rate
}

impl SampleBuffer {
    // Load a WAV file from disk, resampled to the output rate
    pub fn load_wav(path: &Path, target_rate: u32) -> Result<Self, LoadError> {
        let wav_err = |source| LoadError::Wav {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = hound::WavReader::open(path).map_err(wav_err)?;
        let spec = reader.spec();
        let channels = spec.channels as usize;
        if channels == 0 || spec.sample_rate == 0 {
            return Err(LoadError::Unsupported {
                path: path.to_path_buf(),
                detail: format!("{} channels at {} Hz", spec.channels, spec.sample_rate),
            });
        }

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader // float, pass it through
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>()
                .map_err(wav_err)?,
            hound::SampleFormat::Int => {
                let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(wav_err)?
            }
        };

        // mono is duplicated, anything past two channels is dropped
        let mut frames: Vec<StereoFrame> = samples
            .chunks_exact(channels)
            .map(|c| StereoFrame {
                left: c[0],
                right: if channels > 1 { c[1] } else { c[0] },
            })
            .collect();
        if frames.is_empty() {
            return Err(LoadError::Empty {
                path: path.to_path_buf(),
            });
        }

        if spec.sample_rate != target_rate {
            frames = resample_linear(&frames, spec.sample_rate, target_rate);
        }

        Ok(Self { data: frames })
    }
}

fn resample_linear(frames: &[StereoFrame], source_rate: u32, target_rate: u32) -> Vec<StereoFrame> {
    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = (frames.len() as u64 * target_rate as u64).div_ceil(source_rate as u64) as usize;
    let last = frames.last().copied().unwrap_or_default();

    (0..out_len)
        .map(|i| {
            let src_pos = i as f64 / ratio;
            let idx = src_pos.floor() as usize;
            let frac = (src_pos - idx as f64) as f32;
            if idx + 1 >= frames.len() {
                return last;
            }
            let (a, b) = (frames[idx], frames[idx + 1]);
            StereoFrame {
                left: a.left * (1.0 - frac) + b.left * frac,
                right: a.right * (1.0 - frac) + b.right * frac,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::write_test_wav;

    #[test]
    fn test_mono_is_duplicated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("A0.wav");
        write_test_wav(&path, 1, 100);
        let buffer = SampleBuffer::load_wav(&path, 44100).unwrap();
        assert_eq!(100, buffer.data.len());
        assert!(buffer.data.iter().all(|f| f.left == f.right));
        assert!(buffer.data.iter().any(|f| f.left.abs() > 0.1));
    }

    #[test]
    fn test_resampled_to_output_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("C4.wav");
        write_test_wav(&path, 2, 441);
        let buffer = SampleBuffer::load_wav(&path, 48000).unwrap();
        assert_eq!(480, buffer.data.len());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SampleBuffer::load_wav(&dir.path().join("nope.wav"), 44100).unwrap_err();
        assert!(matches!(err, LoadError::Wav { .. }));
    }

    #[test]
    fn test_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silent.wav");
        write_test_wav(&path, 1, 0);
        let err = SampleBuffer::load_wav(&path, 44100).unwrap_err();
        assert!(matches!(err, LoadError::Empty { .. }));
    }
}

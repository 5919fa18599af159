use std::path::Path;

use crate::AudioError;

/// Interleaved f32 samples in [-1, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct WaveBuffer {
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl WaveBuffer {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate.max(1) as f64
    }

    /// Remap channels and linearly resample to the target format.
    pub fn convert(&self, channels: u16, sample_rate: u32) -> WaveBuffer {
        let remapped = remap_channels(&self.samples, self.channels, channels);
        let samples = if sample_rate == self.sample_rate {
            remapped
        } else {
            resample_linear(&remapped, channels, self.sample_rate, sample_rate)
        };
        WaveBuffer {
            samples,
            channels,
            sample_rate,
        }
    }
}

pub fn load_wav(path: &Path) -> Result<WaveBuffer, AudioError> {
    let decode_err = |reason: String| AudioError::Decode {
        path: path.display().to_string(),
        reason,
    };
    let mut reader = hound::WavReader::open(path).map_err(|e| decode_err(e.to_string()))?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(AudioError::UnsupportedFormat("zero channels".to_string()));
    }

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => match spec.bits_per_sample {
            8 => reader
                .samples::<i8>()
                .map(|s| s.map(|v| v as f32 / 128.0))
                .collect::<Result<Vec<f32>, hound::Error>>(),
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32_768.0))
                .collect::<Result<Vec<f32>, hound::Error>>(),
            bits @ (24 | 32) => {
                let scale = (1u64 << (bits - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<Vec<f32>, hound::Error>>()
            }
            bits => {
                return Err(AudioError::UnsupportedFormat(format!(
                    "{bits}-bit integer samples"
                )))
            }
        },
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<f32>, hound::Error>>(),
    }
    .map_err(|e| decode_err(e.to_string()))?;

    log::info!(
        "Loaded '{}': {} ch, {} Hz, {:.2}s",
        path.display(),
        spec.channels,
        spec.sample_rate,
        samples.len() as f64 / spec.channels as f64 / spec.sample_rate.max(1) as f64
    );

    Ok(WaveBuffer {
        samples,
        channels: spec.channels,
        sample_rate: spec.sample_rate,
    })
}

fn remap_channels(samples: &[f32], from: u16, to: u16) -> Vec<f32> {
    let from = from.max(1) as usize;
    let to = to.max(1) as usize;
    if from == to {
        return samples.to_vec();
    }
    let mut out = Vec::with_capacity(samples.len() / from * to);
    for frame in samples.chunks_exact(from) {
        if to == 1 {
            out.push(frame.iter().sum::<f32>() / from as f32);
        } else {
            for ch in 0..to {
                out.push(frame[ch.min(from - 1)]);
            }
        }
    }
    out
}

fn resample_linear(samples: &[f32], channels: u16, from_rate: u32, to_rate: u32) -> Vec<f32> {
    let channels = channels.max(1) as usize;
    let frames_in = samples.len() / channels;
    if frames_in == 0 || from_rate == 0 || to_rate == 0 {
        return Vec::new();
    }
    let frames_out = (frames_in as u64 * to_rate as u64).div_ceil(from_rate as u64) as usize;
    let step = from_rate as f64 / to_rate as f64;

    let mut out = Vec::with_capacity(frames_out * channels);
    for i in 0..frames_out {
        let pos = i as f64 * step;
        let i0 = (pos.floor() as usize).min(frames_in - 1);
        let i1 = (i0 + 1).min(frames_in - 1);
        let frac = (pos - i0 as f64) as f32;
        for ch in 0..channels {
            let a = samples[i0 * channels + ch];
            let b = samples[i1 * channels + ch];
            out.push(a + (b - a) * frac);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "cv_wav_test_{}_{}_{}.wav",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn write_i16_wav(path: &Path, channels: u16, sample_rate: u32, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
        for &s in samples {
            writer.write_sample(s).expect("write sample");
        }
        writer.finalize().expect("finalize wav");
    }

    #[test]
    fn load_wav_normalizes_16_bit() {
        let path = temp_file_path("i16");
        write_i16_wav(&path, 1, 22_050, &[0, 16_384, -32_768]);

        let wave = load_wav(&path).expect("wav should load");
        assert_eq!(wave.channels, 1);
        assert_eq!(wave.sample_rate, 22_050);
        assert_eq!(wave.samples, vec![0.0, 0.5, -1.0]);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn load_wav_reports_missing_file() {
        let path = temp_file_path("missing");
        let err = load_wav(&path).expect_err("missing file should fail");
        assert!(matches!(err, AudioError::Decode { .. }));
    }

    #[test]
    fn mono_to_stereo_duplicates_samples() {
        let wave = WaveBuffer {
            samples: vec![0.1, 0.2],
            channels: 1,
            sample_rate: 48_000,
        };
        let stereo = wave.convert(2, 48_000);
        assert_eq!(stereo.samples, vec![0.1, 0.1, 0.2, 0.2]);
        assert_eq!(stereo.frames(), 2);
    }

    #[test]
    fn stereo_to_mono_averages() {
        let wave = WaveBuffer {
            samples: vec![0.2, 0.4, -1.0, 1.0],
            channels: 2,
            sample_rate: 48_000,
        };
        let mono = wave.convert(1, 48_000);
        assert_eq!(mono.channels, 1);
        assert!((mono.samples[0] - 0.3).abs() < 1e-6);
        assert!(mono.samples[1].abs() < 1e-6);
    }

    #[test]
    fn upsampling_interpolates_and_keeps_duration() {
        let wave = WaveBuffer {
            samples: vec![0.0, 1.0, 0.0, -1.0],
            channels: 1,
            sample_rate: 22_050,
        };
        let up = wave.convert(1, 44_100);
        assert_eq!(up.frames(), 8);
        assert!((up.samples[1] - 0.5).abs() < 1e-6);
        assert!((up.samples[2] - 1.0).abs() < 1e-6);
        assert!((up.duration_secs() - wave.duration_secs()).abs() < 1e-9);
    }

    #[test]
    fn same_format_is_a_copy() {
        let wave = WaveBuffer {
            samples: vec![0.25, -0.25],
            channels: 2,
            sample_rate: 44_100,
        };
        assert_eq!(wave.convert(2, 44_100), wave);
    }
}

//! Writing rendered takes to WAV files.

use std::path::Path;

use hound::{SampleFormat, WavWriter};

use crate::{Error, Result};

/// Sample encoding of a written file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SampleDepth {
    /// 32-bit IEEE float, written unchanged.
    #[default]
    Float32,
    /// 16-bit integer PCM.
    Pcm16,
    /// 24-bit integer PCM.
    Pcm24,
}

impl SampleDepth {
    /// Depth for a bit count: 16, 24 or 32 (float).
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            16 => Some(Self::Pcm16),
            24 => Some(Self::Pcm24),
            32 => Some(Self::Float32),
            _ => None,
        }
    }

    /// Bits per sample on disk.
    pub fn bits(self) -> u16 {
        match self {
            Self::Pcm16 => 16,
            Self::Pcm24 => 24,
            Self::Float32 => 32,
        }
    }

    /// Largest positive integer sample, or `None` for float.
    fn full_scale(self) -> Option<f32> {
        match self {
            Self::Float32 => None,
            Self::Pcm16 | Self::Pcm24 => Some((1i32 << (self.bits() - 1)) as f32),
        }
    }
}

/// Layout of a written file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Interleaved channel count.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Sample encoding.
    pub depth: SampleDepth,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self::float(1, 48000)
    }
}

impl WavSpec {
    /// Float file with the given layout.
    pub fn float(channels: u16, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
            depth: SampleDepth::Float32,
        }
    }

    fn to_hound(self) -> hound::WavSpec {
        hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.depth.bits(),
            sample_format: match self.depth {
                SampleDepth::Float32 => SampleFormat::Float,
                SampleDepth::Pcm16 | SampleDepth::Pcm24 => SampleFormat::Int,
            },
        }
    }
}

/// Write interleaved samples to a WAV file.
///
/// `samples` must hold whole frames. Integer depths clip to full scale.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], spec: WavSpec) -> Result<()> {
    let channels = usize::from(spec.channels);
    if channels == 0 || samples.len() % channels != 0 {
        return Err(Error::PartialFrame {
            samples: samples.len(),
            channels: spec.channels,
        });
    }

    let path = path.as_ref();
    let mut writer = WavWriter::create(path, spec.to_hound())?;
    match spec.depth.full_scale() {
        None => {
            for &sample in samples {
                writer.write_sample(sample)?;
            }
        }
        Some(scale) => {
            for &sample in samples {
                writer.write_sample((sample * scale).clamp(-scale, scale - 1.0) as i32)?;
            }
        }
    }
    writer.finalize()?;

    tracing::debug!(
        path = %path.display(),
        frames = samples.len() / channels,
        bits = spec.depth.bits(),
        "wav written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_from_bits() {
        assert_eq!(SampleDepth::from_bits(16), Some(SampleDepth::Pcm16));
        assert_eq!(SampleDepth::from_bits(32), Some(SampleDepth::Float32));
        assert_eq!(SampleDepth::from_bits(8), None);
        assert_eq!(SampleDepth::Pcm24.full_scale(), Some(8_388_608.0));
    }

    #[test]
    fn test_partial_frame_rejected() {
        let dir = std::env::temp_dir().join("harpnote-partial-frame.wav");
        let result = write_wav(&dir, &[0.0; 3], WavSpec::float(2, 48000));
        assert!(matches!(
            result,
            Err(Error::PartialFrame {
                samples: 3,
                channels: 2
            })
        ));
        assert!(!dir.exists());
    }
}

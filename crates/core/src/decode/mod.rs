use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Facts about a decoded waveform that records are built from.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AudioInfo {
    pub sample_rate: u32,
    /// Samples along the time axis, independent of channel count.
    pub frame_count: u64,
    pub source_channels: u16,
}

impl AudioInfo {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count as f64 / f64::from(self.sample_rate)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported audio container: {0}")]
    Unsupported(String),

    #[error("no audio track found")]
    NoAudioTrack,

    #[error("sample rate unknown")]
    UnknownSampleRate,

    #[error("corrupt audio data: {0}")]
    Corrupt(String),

    #[error("decoded waveform is empty")]
    Empty,
}

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Reads an audio file far enough to report its rate and length.
pub trait AudioLoader: Send + Sync {
    fn probe(&self, path: &Path) -> Result<AudioInfo>;
}

impl<L: AudioLoader + ?Sized> AudioLoader for &L {
    fn probe(&self, path: &Path) -> Result<AudioInfo> {
        (**self).probe(path)
    }
}

#[derive(Clone, Debug, Default)]
pub struct SymphoniaAudioLoader;

impl SymphoniaAudioLoader {
    pub fn new() -> Self {
        Self
    }
}

impl AudioLoader for SymphoniaAudioLoader {
    fn probe(&self, path: &Path) -> Result<AudioInfo> {
        let file = std::fs::File::open(path).map_err(|source| DecodeError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| DecodeError::Unsupported(e.to_string()))?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(DecodeError::NoAudioTrack)?;
        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .filter(|sr| *sr > 0)
            .ok_or(DecodeError::UnknownSampleRate)?;
        let source_channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(1);

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| DecodeError::Unsupported(e.to_string()))?;

        let mut frame_count: u64 = 0;
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => return Err(DecodeError::Corrupt(e.to_string())),
            };
            if packet.track_id() != track_id {
                continue;
            }
            let decoded = decoder
                .decode(&packet)
                .map_err(|e| DecodeError::Corrupt(e.to_string()))?;
            frame_count += decoded.frames() as u64;
        }

        if frame_count == 0 {
            return Err(DecodeError::Empty);
        }

        tracing::debug!(
            path = %path.display(),
            sample_rate,
            frame_count,
            source_channels,
            "probed audio"
        );

        Ok(AudioInfo {
            sample_rate,
            frame_count,
            source_channels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, sample_rate: u32, channels: u16, frames: usize) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            let sample = ((i % 64) as i16 - 32) * 256;
            for _ in 0..channels {
                writer.write_sample(sample).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn probes_mono_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DC_a01.wav");
        write_wav(&path, 44_100, 1, 88_200);

        let info = SymphoniaAudioLoader::new().probe(&path).unwrap();
        assert_eq!(info.sample_rate, 44_100);
        assert_eq!(info.frame_count, 88_200);
        assert_eq!(info.source_channels, 1);
        assert!((info.duration_secs() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn stereo_frames_count_time_axis_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, 16_000, 2, 8_000);

        let info = SymphoniaAudioLoader::new().probe(&path).unwrap();
        assert_eq!(info.frame_count, 8_000);
        assert_eq!(info.source_channels, 2);
    }

    #[test]
    fn garbage_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.wav");
        std::fs::write(&path, b"definitely not a riff header").unwrap();

        assert!(SymphoniaAudioLoader::new().probe(&path).is_err());
    }

    #[test]
    fn missing_file_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SymphoniaAudioLoader::new()
            .probe(&dir.path().join("absent.wav"))
            .unwrap_err();
        assert!(matches!(err, DecodeError::Open { .. }));
    }

    #[test]
    fn duration_of_zero_rate_is_zero() {
        let info = AudioInfo {
            sample_rate: 0,
            frame_count: 10,
            source_channels: 1,
        };
        assert_eq!(info.duration_secs(), 0.0);
    }
}

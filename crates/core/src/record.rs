use crate::dataset::UtteranceIdentity;
use crate::decode::AudioInfo;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Canonical per-utterance metadata, serialised with the keys the training
/// recipes read.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UtteranceRecord {
    #[serde(rename = "audio")]
    pub audio_path: String,
    pub emotion: String,
    #[serde(rename = "channel")]
    pub channel_count: u16,
    #[serde(rename = "sid")]
    pub segment_id: String,
    pub sample_rate: u32,
    #[serde(rename = "num_frame")]
    pub frame_count: u64,
    #[serde(rename = "spk")]
    pub speaker_id: String,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    #[serde(rename = "lang")]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
}

/// Records keyed by segment id. Ordered so every writer sees the same
/// sequence on every run.
pub type RecordMap = BTreeMap<String, UtteranceRecord>;

pub fn segment_id(dataset: &str, id: &str) -> String {
    format!("{dataset}-{}", id.replace('_', "-"))
}

impl UtteranceRecord {
    /// Whole-file utterance: starts at zero, ends at `frame_count / sample_rate`.
    pub fn build(
        dataset: &str,
        identity: UtteranceIdentity,
        audio_path: &Path,
        info: AudioInfo,
    ) -> Self {
        let duration = info.duration_secs();
        Self {
            audio_path: audio_path.to_string_lossy().into_owned(),
            emotion: identity.emotion,
            channel_count: 1,
            segment_id: segment_id(dataset, &identity.id),
            sample_rate: info.sample_rate,
            frame_count: info.frame_count,
            speaker_id: identity.speaker,
            start_time: 0.0,
            end_time: duration,
            duration,
            language: identity.lang,
            age: identity.age,
            gender: identity.gender,
            word: identity.word,
        }
    }
}

/// Occurrence count per emotion label.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmotionFrequency(BTreeMap<String, usize>);

impl EmotionFrequency {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, emotion: &str) {
        *self.0.entry(emotion.to_owned()).or_insert(0) += 1;
    }

    pub fn get(&self, emotion: &str) -> usize {
        self.0.get(emotion).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl fmt::Display for EmotionFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (label, count)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{label}: {count}")?;
        }
        f.write_str("}")
    }
}

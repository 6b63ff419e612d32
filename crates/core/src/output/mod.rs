mod folds;
mod json;
mod jsonl;
mod mini;

use crate::record::RecordMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::{fmt, fs, io, str::FromStr};

pub use folds::{plan_folds, write_folds, Fold, SplitConfig};
pub use json::write_json;
pub use jsonl::{write_jsonl, write_jsonl_records};
pub use mini::write_mini_format;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    MiniFormat,
    Jsonl,
    Json,
    Split,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::MiniFormat,
        OutputFormat::Jsonl,
        OutputFormat::Json,
        OutputFormat::Split,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::MiniFormat => "mini_format",
            OutputFormat::Jsonl => "jsonl",
            OutputFormat::Json => "json",
            OutputFormat::Split => "split",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown output format '{0}' (expected mini_format, jsonl, json, split or all)")]
pub struct UnknownFormat(pub String);

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        OutputFormat::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownFormat(s.to_owned()))
    }
}

/// The set of writers a run should invoke. Each is invoked at most once.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputFormats(BTreeSet<OutputFormat>);

impl OutputFormats {
    pub fn all() -> Self {
        Self(OutputFormat::ALL.into_iter().collect())
    }

    /// Accepts format names or `all`.
    pub fn parse<I, S>(names: I) -> std::result::Result<Self, UnknownFormat>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for name in names {
            let name = name.as_ref();
            if name.trim().eq_ignore_ascii_case("all") {
                set.extend(OutputFormat::ALL);
            } else {
                set.insert(name.parse()?);
            }
        }
        Ok(Self(set))
    }

    pub fn contains(&self, format: OutputFormat) -> bool {
        self.0.contains(&format)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = OutputFormat> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<OutputFormat> for OutputFormats {
    fn from_iter<T: IntoIterator<Item = OutputFormat>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialise records for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, OutputError>;

pub(crate) fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| OutputError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn write_error(path: &Path) -> impl FnOnce(io::Error) -> OutputError + '_ {
    move |source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// Runs every requested writer over the same complete record map.
///
/// Returns the files that were written, in writer order.
pub fn dispatch(
    formats: &OutputFormats,
    records: &RecordMap,
    output_dir: &Path,
    dataset_name: &str,
    split: &SplitConfig,
) -> Result<Vec<PathBuf>> {
    ensure_dir(output_dir)?;

    let mut written = Vec::new();
    for format in formats.iter() {
        let files = match format {
            OutputFormat::MiniFormat => write_mini_format(records, output_dir)?,
            OutputFormat::Jsonl => {
                let path = output_dir.join(format!("{dataset_name}.jsonl"));
                write_jsonl(records, &path)?;
                vec![path]
            }
            OutputFormat::Json => {
                let path = output_dir.join(format!("{dataset_name}.json"));
                write_json(records, &path)?;
                vec![path]
            }
            OutputFormat::Split => write_folds(records, output_dir, dataset_name, split)?,
        };
        tracing::info!(
            format = %format,
            files = files.len(),
            records = records.len(),
            "wrote output"
        );
        written.extend(files);
    }
    Ok(written)
}

#[cfg(test)]
pub(crate) mod tests_support {
    use crate::record::{RecordMap, UtteranceRecord};

    pub(crate) fn record(segment_id: &str, speaker: &str, emotion: &str) -> UtteranceRecord {
        UtteranceRecord {
            audio_path: format!("/corpus/{segment_id}.wav"),
            emotion: emotion.to_owned(),
            channel_count: 1,
            segment_id: segment_id.to_owned(),
            sample_rate: 44_100,
            frame_count: 22_050,
            speaker_id: speaker.to_owned(),
            start_time: 0.0,
            end_time: 0.5,
            duration: 0.5,
            language: "en".to_owned(),
            age: None,
            gender: Some("Male".to_owned()),
            word: None,
        }
    }

    pub(crate) fn sample_records() -> RecordMap {
        let mut map = RecordMap::new();
        for speaker in ["DC", "JE", "JK", "KL"] {
            for (emotion, n) in [("a", 1), ("h", 2), ("n", 3), ("sa", 4)] {
                let sid = format!("savee-{speaker}-{emotion}{n:02}");
                map.insert(sid.clone(), record(&sid, speaker, emotion));
            }
        }
        map
    }
}

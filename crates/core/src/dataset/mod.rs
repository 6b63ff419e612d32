mod savee;
mod tess;

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub use savee::{Savee, SAVEE_SAMPLE_RATE};
pub use tess::{Tess, TESS_SAMPLE_RATE};

/// How a dataset lays its audio files out under the root directory.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum WalkMode {
    /// Only the immediate children of the root.
    Flat,
    /// The whole tree below the root.
    Recursive,
}

/// Speaker and label facts decoded from a single file name.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UtteranceIdentity {
    pub id: String,
    pub lang: String,
    pub speaker: String,
    pub emotion: String,
    pub gender: Option<String>,
    pub age: Option<u32>,
    pub word: Option<String>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("file name is not valid utf-8")]
    NonUtf8,

    #[error("{file_name}: expected at least {expected} '_'-separated parts, got {found}")]
    TooFewParts {
        file_name: String,
        expected: usize,
        found: usize,
    },

    #[error("{file_name}: empty {field}")]
    EmptyField {
        file_name: String,
        field: &'static str,
    },
}

/// Everything that differs between two dataset handlers.
///
/// The pipeline is written once against this trait; each corpus only says how
/// its files are laid out, what rate it was recorded at and how to read its
/// naming convention.
pub trait CorpusDataset: Send + Sync {
    fn name(&self) -> &'static str;

    fn nominal_sample_rate(&self) -> u32;

    fn walk_mode(&self) -> WalkMode;

    /// Decodes a bare file name (no directory component). Must be pure.
    fn parse_filename(&self, file_name: &str) -> Result<UtteranceIdentity, ParseError>;
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DatasetKind {
    Savee,
    Tess,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 2] = [DatasetKind::Savee, DatasetKind::Tess];

    pub fn name(&self) -> &'static str {
        match self {
            DatasetKind::Savee => savee::DATASET_NAME,
            DatasetKind::Tess => tess::DATASET_NAME,
        }
    }

    pub fn handler(&self) -> Box<dyn CorpusDataset> {
        match self {
            DatasetKind::Savee => Box::new(Savee),
            DatasetKind::Tess => Box::new(Tess),
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown dataset '{0}' (expected one of: savee, tess)")]
pub struct UnknownDataset(pub String);

impl FromStr for DatasetKind {
    type Err = UnknownDataset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DatasetKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownDataset(s.to_owned()))
    }
}

/// Splits a stem on `_`, failing when fewer than `expected` parts come back.
pub(crate) fn split_parts<'a>(
    file_name: &str,
    stem: &'a str,
    expected: usize,
) -> Result<Vec<&'a str>, ParseError> {
    let parts: Vec<&str> = stem.split('_').collect();
    if parts.len() < expected {
        return Err(ParseError::TooFewParts {
            file_name: file_name.to_owned(),
            expected,
            found: parts.len(),
        });
    }
    Ok(parts)
}

pub(crate) fn non_empty<'a>(
    file_name: &str,
    field: &'static str,
    value: &'a str,
) -> Result<&'a str, ParseError> {
    if value.is_empty() {
        return Err(ParseError::EmptyField {
            file_name: file_name.to_owned(),
            field,
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_kind_parses_case_insensitively() {
        assert_eq!("savee".parse::<DatasetKind>().unwrap(), DatasetKind::Savee);
        assert_eq!(" TESS ".parse::<DatasetKind>().unwrap(), DatasetKind::Tess);
        let err = "ravdess".parse::<DatasetKind>().unwrap_err();
        assert!(err.to_string().contains("ravdess"));
    }

    #[test]
    fn handler_matches_kind() {
        for kind in DatasetKind::ALL {
            assert_eq!(kind.handler().name(), kind.name());
            assert_eq!(kind.to_string(), kind.name());
        }
    }

    #[test]
    fn split_parts_reports_counts() {
        let err = split_parts("a.wav", "a", 2).unwrap_err();
        assert_eq!(
            err,
            ParseError::TooFewParts {
                file_name: "a.wav".to_owned(),
                expected: 2,
                found: 1,
            }
        );
    }
}

use crate::dataset::DatasetKind;
use crate::output::{OutputFormats, SplitConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_DOWNLOAD_ROOT: &str = "downloads";
pub const DEFAULT_OUTPUT_ROOT: &str = "data";
pub const DEFAULT_FORMAT: &str = "jsonl";
pub const DEFAULT_VALID_RATIO: f64 = 0.1;
pub const DEFAULT_TEST_RATIO: f64 = 0.2;
pub const DEFAULT_SPLIT_SEED: u64 = 42;
pub const ENV_DOWNLOAD_ROOT: &str = "EMOPREP_DOWNLOAD_ROOT";
pub const ENV_OUTPUT_ROOT: &str = "EMOPREP_OUTPUT_ROOT";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PrepConfig {
    pub dataset: DatasetKind,
    pub dataset_root: PathBuf,
    pub output_dir: PathBuf,
    pub formats: OutputFormats,
    pub split: SplitConfig,
    pub show_progress: bool,
}

impl PrepConfig {
    /// Defaults for a dataset: `downloads/<name>` in, `data/<name>` out, jsonl only.
    pub fn for_dataset(dataset: DatasetKind) -> Self {
        Self {
            dataset,
            dataset_root: PathBuf::from(DEFAULT_DOWNLOAD_ROOT).join(dataset.name()),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_ROOT).join(dataset.name()),
            formats: [crate::output::OutputFormat::Jsonl].into_iter().collect(),
            split: SplitConfig::default(),
            show_progress: true,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.formats.is_empty() {
            return Err(ConfigError::NoFormats);
        }
        SplitConfig::new(self.split.valid_ratio, self.split.test_ratio, self.split.seed)?;
        Ok(())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("at least one output format must be requested")]
    NoFormats,
    #[error("{name} must be in [0, 1), got {value}")]
    RatioOutOfRange { name: &'static str, value: f64 },
    #[error("valid_ratio + test_ratio must be < 1 (got {valid_ratio} + {test_ratio})")]
    RatiosTooLarge { valid_ratio: f64, test_ratio: f64 },
    #[error(transparent)]
    UnknownDataset(#[from] crate::dataset::UnknownDataset),
    #[error(transparent)]
    UnknownFormat(#[from] crate::output::UnknownFormat),
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn resolve_string_with_default(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
    default: &str,
) -> String {
    match cli_value {
        Some(v) => v,
        None => env
            .var(env_key)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_owned()),
    }
}

/// Explicit path, else `<root from env or default>/<dataset>`.
pub fn resolve_dataset_dir(
    cli_value: Option<PathBuf>,
    env_key: &str,
    env: &impl Env,
    default_root: &str,
    dataset: DatasetKind,
) -> PathBuf {
    match cli_value {
        Some(p) => p,
        None => PathBuf::from(resolve_string_with_default(None, env_key, env, default_root))
            .join(dataset.name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_root_cli_takes_precedence_over_env() {
        let env = MapEnv::default().with_var(ENV_DOWNLOAD_ROOT, "/mnt/corpora");
        let p = resolve_dataset_dir(
            Some(PathBuf::from("/tmp/savee")),
            ENV_DOWNLOAD_ROOT,
            &env,
            DEFAULT_DOWNLOAD_ROOT,
            DatasetKind::Savee,
        );
        assert_eq!(p, PathBuf::from("/tmp/savee"));
    }

    #[test]
    fn dataset_root_env_used_when_cli_missing() {
        let env = MapEnv::default().with_var(ENV_DOWNLOAD_ROOT, "/mnt/corpora");
        let p = resolve_dataset_dir(
            None,
            ENV_DOWNLOAD_ROOT,
            &env,
            DEFAULT_DOWNLOAD_ROOT,
            DatasetKind::Tess,
        );
        assert_eq!(p, PathBuf::from("/mnt/corpora/tess"));
    }

    #[test]
    fn output_dir_default_used_when_both_missing() {
        let env = MapEnv::default();
        let p = resolve_dataset_dir(
            None,
            ENV_OUTPUT_ROOT,
            &env,
            DEFAULT_OUTPUT_ROOT,
            DatasetKind::Savee,
        );
        assert_eq!(p, PathBuf::from("data/savee"));
    }

    #[test]
    fn blank_env_falls_back_to_default() {
        let env = MapEnv::default().with_var(ENV_OUTPUT_ROOT, "  ");
        let v = resolve_string_with_default(None, ENV_OUTPUT_ROOT, &env, "def");
        assert_eq!(v, "def");
    }

    #[test]
    fn for_dataset_defaults_validate() {
        let cfg = PrepConfig::for_dataset(DatasetKind::Tess);
        assert_eq!(cfg.dataset_root, PathBuf::from("downloads/tess"));
        assert_eq!(cfg.output_dir, PathBuf::from("data/tess"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_formats_rejected() {
        let mut cfg = PrepConfig::for_dataset(DatasetKind::Savee);
        cfg.formats = OutputFormats::default();
        assert_eq!(cfg.validate(), Err(ConfigError::NoFormats));
    }
}

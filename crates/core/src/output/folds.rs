use crate::config::{ConfigError, DEFAULT_SPLIT_SEED, DEFAULT_TEST_RATIO, DEFAULT_VALID_RATIO};
use crate::output::{ensure_dir, jsonl::write_jsonl_records, Result};
use crate::record::{RecordMap, UtteranceRecord};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SplitConfig {
    /// Share of the non-test records held out for validation.
    pub valid_ratio: f64,
    /// Only used when there are too few speakers to hold one out.
    pub test_ratio: f64,
    pub seed: u64,
}

impl SplitConfig {
    pub fn new(
        valid_ratio: f64,
        test_ratio: f64,
        seed: u64,
    ) -> std::result::Result<Self, ConfigError> {
        for (name, value) in [("valid_ratio", valid_ratio), ("test_ratio", test_ratio)] {
            if !(0.0..1.0).contains(&value) {
                return Err(ConfigError::RatioOutOfRange { name, value });
            }
        }
        if valid_ratio + test_ratio >= 1.0 {
            return Err(ConfigError::RatiosTooLarge {
                valid_ratio,
                test_ratio,
            });
        }
        Ok(Self {
            valid_ratio,
            test_ratio,
            seed,
        })
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            valid_ratio: DEFAULT_VALID_RATIO,
            test_ratio: DEFAULT_TEST_RATIO,
            seed: DEFAULT_SPLIT_SEED,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fold<'a> {
    pub train: Vec<&'a UtteranceRecord>,
    pub valid: Vec<&'a UtteranceRecord>,
    pub test: Vec<&'a UtteranceRecord>,
}

fn share(len: usize, ratio: f64) -> usize {
    ((len as f64 * ratio).round() as usize).min(len)
}

fn by_segment_id(records: &mut [&UtteranceRecord]) {
    records.sort_by(|a, b| a.segment_id.cmp(&b.segment_id));
}

/// Leave-one-speaker-out folds, or a single random fold when the corpus has
/// fewer than two speakers. Deterministic for a given map and seed.
pub fn plan_folds<'a>(records: &'a RecordMap, cfg: &SplitConfig) -> Vec<Fold<'a>> {
    if records.is_empty() {
        return Vec::new();
    }

    let speakers: BTreeSet<&str> = records.values().map(|r| r.speaker_id.as_str()).collect();
    let mut rng = StdRng::seed_from_u64(cfg.seed);

    if speakers.len() < 2 {
        let mut all: Vec<&UtteranceRecord> = records.values().collect();
        all.shuffle(&mut rng);
        let n_test = share(all.len(), cfg.test_ratio);
        let n_valid = share(all.len(), cfg.valid_ratio).min(all.len() - n_test);

        let mut train = all.split_off(n_test + n_valid);
        let mut valid = all.split_off(n_test);
        let mut test = all;
        by_segment_id(&mut train);
        by_segment_id(&mut valid);
        by_segment_id(&mut test);
        return vec![Fold { train, valid, test }];
    }

    speakers
        .iter()
        .map(|held_out| {
            let (test, mut rest): (Vec<&UtteranceRecord>, Vec<&UtteranceRecord>) = records
                .values()
                .partition(|r| r.speaker_id == *held_out);
            rest.shuffle(&mut rng);
            let n_valid = share(rest.len(), cfg.valid_ratio);
            let mut train = rest.split_off(n_valid);
            let mut valid = rest;
            by_segment_id(&mut train);
            by_segment_id(&mut valid);
            Fold { train, valid, test }
        })
        .collect()
}

/// Writes `fold_<k>/<dataset>_{train,valid,test}.jsonl`, `k` from 1.
pub fn write_folds(
    records: &RecordMap,
    output_dir: &Path,
    dataset_name: &str,
    cfg: &SplitConfig,
) -> Result<Vec<PathBuf>> {
    let folds = plan_folds(records, cfg);
    let mut written = Vec::with_capacity(folds.len() * 3);

    for (i, fold) in folds.iter().enumerate() {
        let dir = output_dir.join(format!("fold_{}", i + 1));
        ensure_dir(&dir)?;
        for (part, members) in [
            ("train", &fold.train),
            ("valid", &fold.valid),
            ("test", &fold.test),
        ] {
            let path = dir.join(format!("{dataset_name}_{part}.jsonl"));
            write_jsonl_records(members.iter().copied(), &path)?;
            written.push(path);
        }
        tracing::debug!(
            fold = i + 1,
            train = fold.train.len(),
            valid = fold.valid.len(),
            test = fold.test.len(),
            "wrote fold"
        );
    }
    Ok(written)
}

use crate::config::PrepConfig;
use crate::dataset::{CorpusDataset, ParseError};
use crate::decode::{AudioLoader, DecodeError};
use crate::output::{self, OutputError, OutputFormats, SplitConfig};
use crate::record::{EmotionFrequency, RecordMap, UtteranceRecord};
use crate::walk::{walk_audio_files, WalkError};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Walk(#[from] WalkError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Why a single file was left out of the run.
#[derive(thiserror::Error, Debug)]
pub enum SkipReason {
    #[error("malformed file name: {0}")]
    Parse(#[from] ParseError),
    #[error("unreadable audio: {0}")]
    Decode(#[from] DecodeError),
}

#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub output_dir: PathBuf,
    pub formats: OutputFormats,
    pub split: SplitConfig,
    pub show_progress: bool,
}

impl PipelineConfig {
    pub fn from_prep(prep: &PrepConfig) -> Self {
        Self {
            output_dir: prep.output_dir.clone(),
            formats: prep.formats.clone(),
            split: prep.split,
            show_progress: prep.show_progress,
        }
    }
}

/// Accumulated state of one run over one dataset.
#[derive(Debug, Default)]
pub struct RunContext {
    pub records: RecordMap,
    pub emotion_frequency: EmotionFrequency,
    pub skipped: Vec<SkippedFile>,
    /// Records that replaced an earlier one with the same segment id.
    pub collisions: usize,
    pub rate_mismatches: usize,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts under the record's segment id; a later record wins.
    pub fn accept(&mut self, record: UtteranceRecord) {
        self.emotion_frequency.record(&record.emotion);
        let sid = record.segment_id.clone();
        if let Some(previous) = self.records.insert(sid, record) {
            self.collisions += 1;
            tracing::warn!(
                segment_id = %previous.segment_id,
                replaced = %previous.audio_path,
                "segment id collision, keeping the later file"
            );
        }
    }

    pub fn skip(&mut self, path: PathBuf, reason: SkipReason) {
        tracing::warn!(path = %path.display(), reason = %reason, "skipping file");
        self.skipped.push(SkippedFile { path, reason });
    }
}

#[derive(Debug)]
pub struct RunSummary {
    pub dataset: String,
    pub records: usize,
    pub emotion_frequency: EmotionFrequency,
    pub skipped: Vec<SkippedFile>,
    pub collisions: usize,
    pub rate_mismatches: usize,
    pub written: Vec<PathBuf>,
}

pub struct Pipeline<L> {
    pub loader: L,
    pub config: PipelineConfig,
}

impl<L> Pipeline<L>
where
    L: AudioLoader,
{
    pub fn new(loader: L, config: PipelineConfig) -> Self {
        Self { loader, config }
    }

    /// Parses the name first so malformed files are never decoded.
    pub fn build_record(
        &self,
        dataset: &dyn CorpusDataset,
        path: &Path,
    ) -> Result<UtteranceRecord, SkipReason> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or(ParseError::NonUtf8)?;
        let identity = dataset.parse_filename(file_name)?;
        let info = self.loader.probe(path)?;
        Ok(UtteranceRecord::build(dataset.name(), identity, path, info))
    }

    /// Walks the corpus and builds every record without writing anything.
    pub fn collect(
        &self,
        dataset: &dyn CorpusDataset,
        root: &Path,
    ) -> Result<RunContext, PipelineError> {
        let files = walk_audio_files(root, dataset.walk_mode())?;
        let nominal = dataset.nominal_sample_rate();
        let progress = self.progress_bar(dataset.name());
        let mut ctx = RunContext::new();

        for path in files {
            match self.build_record(dataset, &path) {
                Ok(record) => {
                    if record.sample_rate != nominal {
                        ctx.rate_mismatches += 1;
                        tracing::warn!(
                            path = %path.display(),
                            observed = record.sample_rate,
                            nominal,
                            "sample rate differs from nominal"
                        );
                    }
                    tracing::debug!(segment_id = %record.segment_id, "built record");
                    ctx.accept(record);
                }
                Err(reason) => ctx.skip(path, reason),
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        Ok(ctx)
    }

    pub fn run(
        &self,
        dataset: &dyn CorpusDataset,
        root: &Path,
    ) -> Result<RunSummary, PipelineError> {
        tracing::info!(
            dataset = dataset.name(),
            root = %root.display(),
            output_dir = %self.config.output_dir.display(),
            "processing dataset"
        );

        // The output directory is only created once the root has been walked.
        let ctx = self.collect(dataset, root)?;
        let written = output::dispatch(
            &self.config.formats,
            &ctx.records,
            &self.config.output_dir,
            dataset.name(),
            &self.config.split,
        )?;

        tracing::info!(
            dataset = dataset.name(),
            records = ctx.records.len(),
            skipped = ctx.skipped.len(),
            collisions = ctx.collisions,
            "dataset processed"
        );

        Ok(RunSummary {
            dataset: dataset.name().to_owned(),
            records: ctx.records.len(),
            emotion_frequency: ctx.emotion_frequency,
            skipped: ctx.skipped,
            collisions: ctx.collisions,
            rate_mismatches: ctx.rate_mismatches,
            written,
        })
    }

    fn progress_bar(&self, dataset_name: &str) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        match ProgressStyle::with_template("{spinner} {prefix} [{elapsed_precise}] {pos} files") {
            Ok(style) => pb.set_style(style),
            Err(e) => tracing::debug!(error = %e, "falling back to default progress style"),
        }
        pb.set_prefix(format!("Processing {dataset_name} files"));
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }
}

use crate::dataset::{
    non_empty, split_parts, CorpusDataset, ParseError, UtteranceIdentity, WalkMode,
};

pub(crate) const DATASET_NAME: &str = "savee";
pub const SAVEE_SAMPLE_RATE: u32 = 44_100;

/// Surrey Audio-Visual Expressed Emotion: `<speaker>_<code><nn>.wav` in one
/// flat directory, four male speakers.
#[derive(Clone, Copy, Debug, Default)]
pub struct Savee;

impl CorpusDataset for Savee {
    fn name(&self) -> &'static str {
        DATASET_NAME
    }

    fn nominal_sample_rate(&self) -> u32 {
        SAVEE_SAMPLE_RATE
    }

    fn walk_mode(&self) -> WalkMode {
        WalkMode::Flat
    }

    fn parse_filename(&self, file_name: &str) -> Result<UtteranceIdentity, ParseError> {
        let stem = file_name.split('.').next().unwrap_or(file_name);
        let parts = split_parts(file_name, stem, 2)?;

        let speaker = non_empty(file_name, "speaker", parts[0])?;
        let code = parts[1];
        // The trailing two characters are the take index ("a01" -> "a").
        let keep = code.chars().count().saturating_sub(2);
        let emotion: String = code.chars().take(keep).collect();
        let emotion = non_empty(file_name, "emotion", &emotion)?;

        Ok(UtteranceIdentity {
            id: stem.to_owned(),
            lang: "en".to_owned(),
            speaker: speaker.to_owned(),
            emotion: emotion.to_owned(),
            gender: Some("Male".to_owned()),
            age: None,
            word: None,
        })
    }
}

use crate::dataset::{
    non_empty, split_parts, CorpusDataset, ParseError, UtteranceIdentity, WalkMode,
};

pub(crate) const DATASET_NAME: &str = "tess";
pub const TESS_SAMPLE_RATE: u32 = 24_414;

const OLDER_SPEAKER: &str = "OAF";
const OLDER_SPEAKER_AGE: u32 = 64;
const YOUNGER_SPEAKER_AGE: u32 = 26;

/// Toronto Emotional Speech Set: `<AGEGROUP>_<word>_<emotion>.wav` spread over
/// per-emotion subdirectories. Two actresses, aged 26 and 64.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tess;

impl CorpusDataset for Tess {
    fn name(&self) -> &'static str {
        DATASET_NAME
    }

    fn nominal_sample_rate(&self) -> u32 {
        TESS_SAMPLE_RATE
    }

    fn walk_mode(&self) -> WalkMode {
        WalkMode::Recursive
    }

    fn parse_filename(&self, file_name: &str) -> Result<UtteranceIdentity, ParseError> {
        let stem = strip_wav_extension(file_name);
        let parts = split_parts(file_name, stem, 3)?;

        let speaker = non_empty(file_name, "speaker", parts[0])?;
        let word = non_empty(file_name, "word", parts[1])?;
        let emotion = non_empty(file_name, "emotion", parts[2])?;
        let age = if speaker == OLDER_SPEAKER {
            OLDER_SPEAKER_AGE
        } else {
            YOUNGER_SPEAKER_AGE
        };

        Ok(UtteranceIdentity {
            id: stem.to_owned(),
            lang: "en".to_owned(),
            speaker: speaker.to_owned(),
            emotion: emotion.to_owned(),
            gender: Some("female".to_owned()),
            age: Some(age),
            word: Some(word.to_owned()),
        })
    }
}

fn strip_wav_extension(file_name: &str) -> &str {
    let cut = file_name.len().saturating_sub(4);
    match file_name.get(cut..) {
        Some(ext) if ext.eq_ignore_ascii_case(".wav") => &file_name[..cut],
        _ => file_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_older_speaker() {
        let id = Tess.parse_filename("OAF_back_angry.wav").unwrap();
        assert_eq!(id.id, "OAF_back_angry");
        assert_eq!(id.speaker, "OAF");
        assert_eq!(id.word.as_deref(), Some("back"));
        assert_eq!(id.emotion, "angry");
        assert_eq!(id.age, Some(64));
        assert_eq!(id.gender.as_deref(), Some("female"));
        assert_eq!(id.lang, "en");
    }

    #[test]
    fn any_other_group_is_younger() {
        assert_eq!(Tess.parse_filename("YAF_dog_ps.wav").unwrap().age, Some(26));
        assert_eq!(Tess.parse_filename("XYZ_dog_sad.wav").unwrap().age, Some(26));
    }

    #[test]
    fn uppercase_extension_is_stripped() {
        let id = Tess.parse_filename("YAF_date_happy.WAV").unwrap();
        assert_eq!(id.id, "YAF_date_happy");
        assert_eq!(id.emotion, "happy");
    }

    #[test]
    fn extra_parts_are_ignored() {
        let id = Tess.parse_filename("OAF_bite_neutral_take2.wav").unwrap();
        assert_eq!(id.emotion, "neutral");
        assert_eq!(id.id, "OAF_bite_neutral_take2");
    }

    #[test]
    fn rejects_two_parts() {
        let err = Tess.parse_filename("OAF_neutral.wav").unwrap_err();
        assert!(matches!(
            err,
            ParseError::TooFewParts {
                expected: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn strip_handles_short_and_multibyte_names() {
        assert_eq!(strip_wav_extension("a"), "a");
        assert_eq!(strip_wav_extension("é.wav"), "é");
        assert_eq!(strip_wav_extension("ééé"), "ééé");
    }
}

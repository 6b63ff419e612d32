use crate::output::{ensure_dir, write_error, Result};
use crate::record::{RecordMap, UtteranceRecord};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const MINI_FORMAT_DIR: &str = "mini_format";

type Column = (&'static str, fn(&UtteranceRecord) -> String);

const COLUMNS: [Column; 4] = [
    ("wav.scp", audio_path),
    ("utt2emo", emotion),
    ("utt2spk", speaker),
    ("utt2dur", duration),
];

fn audio_path(r: &UtteranceRecord) -> String {
    r.audio_path.clone()
}

fn emotion(r: &UtteranceRecord) -> String {
    r.emotion.clone()
}

fn speaker(r: &UtteranceRecord) -> String {
    r.speaker_id.clone()
}

fn duration(r: &UtteranceRecord) -> String {
    r.duration.to_string()
}

/// A row only parses back if neither the key nor any value holds whitespace.
fn fits_table(sid: &str, record: &UtteranceRecord) -> bool {
    let clean = |s: &str| !s.is_empty() && !s.chars().any(char::is_whitespace);
    clean(sid) && COLUMNS.iter().all(|(_, value)| clean(value(record).as_str()))
}

/// Kaldi-style `<segment_id> <value>` tables, one file per field.
///
/// Utterances whose segment id or values contain whitespace are left out of
/// every table, so the four files always list the same segment ids.
pub fn write_mini_format(records: &RecordMap, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let dir = output_dir.join(MINI_FORMAT_DIR);
    ensure_dir(&dir)?;

    let mut rows = Vec::with_capacity(records.len());
    for (sid, record) in records {
        if fits_table(sid, record) {
            rows.push((sid, record));
        } else {
            tracing::warn!(
                segment_id = %sid,
                audio = %record.audio_path,
                "whitespace in mini_format row, utterance left out of the tables"
            );
        }
    }

    let mut written = Vec::with_capacity(COLUMNS.len());
    for (name, value) in COLUMNS {
        let path = dir.join(name);
        let file = File::create(&path).map_err(write_error(&path))?;
        let mut writer = BufWriter::new(file);
        for &(sid, record) in &rows {
            writeln!(writer, "{sid} {}", value(record)).map_err(write_error(&path))?;
        }
        writer.flush().map_err(write_error(&path))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests_support::{record, sample_records};

    #[test]
    fn writes_four_tables() {
        let dir = tempfile::tempdir().unwrap();
        let records = sample_records();
        let written = write_mini_format(&records, dir.path()).unwrap();
        assert_eq!(written.len(), 4);

        let emo = std::fs::read_to_string(dir.path().join("mini_format/utt2emo")).unwrap();
        let lines: Vec<&str> = emo.lines().collect();
        assert_eq!(lines.len(), records.len());
        for (line, (sid, rec)) in lines.iter().zip(records.iter()) {
            assert_eq!(*line, format!("{sid} {}", rec.emotion));
        }

        let dur = std::fs::read_to_string(dir.path().join("mini_format/utt2dur")).unwrap();
        assert!(dur.lines().all(|l| l.split(' ').nth(1).unwrap().parse::<f64>().is_ok()));
    }

    #[test]
    fn paths_with_spaces_are_left_out_of_every_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut records = sample_records();
        let mut spaced = record("savee-DC-d05", "DC", "d");
        spaced.audio_path = "/corpus/My Recordings/DC_d05.wav".to_owned();
        records.insert(spaced.segment_id.clone(), spaced);

        write_mini_format(&records, dir.path()).unwrap();

        for (name, _) in COLUMNS {
            let path = dir.path().join(MINI_FORMAT_DIR).join(name);
            let table = std::fs::read_to_string(path).unwrap();
            assert_eq!(table.lines().count(), records.len() - 1, "{name}");
            assert!(table.lines().all(|l| l.split(' ').count() == 2), "{name}");
            assert!(!table.contains("savee-DC-d05"), "{name}");
        }
    }
}

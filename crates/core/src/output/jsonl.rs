use crate::output::{write_error, OutputError, Result};
use crate::record::{RecordMap, UtteranceRecord};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One compact JSON object per line, in the order given.
pub fn write_jsonl_records<'a, I>(records: I, path: &Path) -> Result<usize>
where
    I: IntoIterator<Item = &'a UtteranceRecord>,
{
    let file = File::create(path).map_err(write_error(path))?;
    let mut writer = BufWriter::new(file);

    let mut count = 0usize;
    for record in records {
        serde_json::to_writer(&mut writer, record).map_err(|source| OutputError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
        writer.write_all(b"\n").map_err(write_error(path))?;
        count += 1;
    }
    writer.flush().map_err(write_error(path))?;
    Ok(count)
}

pub fn write_jsonl(records: &RecordMap, path: &Path) -> Result<()> {
    let count = write_jsonl_records(records.values(), path)?;
    tracing::debug!(path = %path.display(), count, "wrote jsonl");
    Ok(())
}

use crate::output::{write_error, OutputError, Result};
use crate::record::RecordMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// A single pretty-printed object keyed by segment id.
pub fn write_json(records: &RecordMap, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(write_error(path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records).map_err(|source| {
        OutputError::Serialize {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.write_all(b"\n").map_err(write_error(path))?;
    writer.flush().map_err(write_error(path))?;
    tracing::debug!(path = %path.display(), count = records.len(), "wrote json");
    Ok(())
}

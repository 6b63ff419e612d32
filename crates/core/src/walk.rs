//! Enumerates candidate `.wav` files under a dataset root.
//!
//! Iteration order is whatever the filesystem hands back; callers must not
//! depend on it.

use crate::dataset::WalkMode;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(thiserror::Error, Debug)]
pub enum WalkError {
    #[error("dataset root not found: {0}")]
    NotFound(PathBuf),

    #[error("dataset root is not a directory: {0}")]
    NotADirectory(PathBuf),
}

pub fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("wav"))
        .unwrap_or(false)
}

/// Lazy sequence of `.wav` paths below a root.
pub struct AudioFiles {
    inner: walkdir::IntoIter,
}

impl Iterator for AudioFiles {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };

            let is_file = if entry.file_type().is_symlink() {
                entry.path().is_file()
            } else {
                entry.file_type().is_file()
            };
            if is_file && is_wav(entry.path()) {
                return Some(entry.into_path());
            }
        }
    }
}

pub fn walk_audio_files(root: &Path, mode: WalkMode) -> Result<AudioFiles, WalkError> {
    if !root.exists() {
        return Err(WalkError::NotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(WalkError::NotADirectory(root.to_path_buf()));
    }

    let max_depth = match mode {
        WalkMode::Flat => 1,
        WalkMode::Recursive => usize::MAX,
    };

    let inner = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter();

    Ok(AudioFiles { inner })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn names(files: AudioFiles) -> BTreeSet<String> {
        files
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn flat_ignores_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("DC_a01.wav"));
        touch(&dir.path().join("DC_a02.WAV"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("nested/DC_a03.wav"));

        let got = names(walk_audio_files(dir.path(), WalkMode::Flat).unwrap());
        let want: BTreeSet<String> = ["DC_a01.wav", "DC_a02.WAV"]
            .into_iter()
            .map(str::to_owned)
            .collect();
        assert_eq!(got, want);
    }

    #[test]
    fn recursive_descends() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("OAF_angry/OAF_back_angry.wav"));
        touch(&dir.path().join("YAF_sad/deeper/YAF_dog_sad.Wav"));
        touch(&dir.path().join("YAF_sad/readme.md"));

        let got = names(walk_audio_files(dir.path(), WalkMode::Recursive).unwrap());
        assert_eq!(got.len(), 2);
        assert!(got.contains("OAF_back_angry.wav"));
        assert!(got.contains("YAF_dog_sad.Wav"));
    }

    #[test]
    fn directory_named_like_wav_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("trap.wav")).unwrap();

        assert_eq!(walk_audio_files(dir.path(), WalkMode::Recursive).unwrap().count(), 0);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = walk_audio_files(&dir.path().join("nope"), WalkMode::Flat).err().unwrap();
        assert!(matches!(err, WalkError::NotFound(_)));

        let file = dir.path().join("file.wav");
        touch(&file);
        let err = walk_audio_files(&file, WalkMode::Flat).err().unwrap();
        assert!(matches!(err, WalkError::NotADirectory(_)));
    }
}

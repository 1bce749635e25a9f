// facade_core/src/capture.rs

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::vehicle::VehicleError;

/// Why a single frame could not be captured and stored.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("camera returned no frame: {0}")]
    Frame(#[from] VehicleError),

    #[error("camera returned an empty frame")]
    EmptyFrame,

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// File stem for the image carrying `index`: `photo_<index>`.
pub fn snapshot_stem(index: u64) -> String {
    format!("photo_{index}")
}

// --- IMAGE SINK TRAIT ---
/// Where captured frames end up. Indices arrive strictly increasing and
/// gap-free within one flight.
pub trait ImageSink {
    fn store(&mut self, index: u64, frame: &[u8]) -> Result<PathBuf, CaptureError>;
}

/// Writes every frame as `photo_<index>.<extension>` inside one directory.
/// No manifest is written; the index in the name is the capture order.
#[derive(Debug, Clone)]
pub struct FileImageSink {
    directory: PathBuf,
    extension: String,
}

impl FileImageSink {
    /// Creates the output directory if it does not exist yet.
    pub fn new(directory: impl Into<PathBuf>, extension: &str) -> io::Result<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory)?;
        Ok(Self {
            directory,
            extension: extension.trim_start_matches('.').to_string(),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn path_for(&self, index: u64) -> PathBuf {
        self.directory
            .join(snapshot_stem(index))
            .with_extension(&self.extension)
    }
}

impl ImageSink for FileImageSink {
    fn store(&mut self, index: u64, frame: &[u8]) -> Result<PathBuf, CaptureError> {
        if frame.is_empty() {
            return Err(CaptureError::EmptyFrame);
        }
        let path = self.path_for(index);
        fs::write(&path, frame).map_err(|source| CaptureError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::process;

    fn scratch_dir(tag: &str) -> PathBuf {
        env::temp_dir().join(format!("facade_core_{}_{}", tag, process::id()))
    }

    #[test]
    fn names_follow_the_index() {
        let sink = FileImageSink {
            directory: PathBuf::from("out"),
            extension: "png".into(),
        };
        assert_eq!(sink.path_for(0), PathBuf::from("out/photo_0.png"));
        assert_eq!(sink.path_for(41), PathBuf::from("out/photo_41.png"));
    }

    #[test]
    fn leading_dot_in_extension_is_ignored() {
        let dir = scratch_dir("dot");
        let sink = FileImageSink::new(&dir, ".ppm").unwrap();
        assert_eq!(sink.directory(), dir.as_path());
        assert!(dir.is_dir());
        assert_eq!(sink.path_for(3), dir.join("photo_3.ppm"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn store_writes_bytes_verbatim() {
        let dir = scratch_dir("store");
        let mut sink = FileImageSink::new(&dir, "png").unwrap();

        let path = sink.store(7, b"\x89PNG fake").unwrap();
        assert_eq!(path, dir.join("photo_7.png"));
        assert_eq!(fs::read(&path).unwrap(), b"\x89PNG fake");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_frames_are_refused() {
        let dir = scratch_dir("empty");
        let mut sink = FileImageSink::new(&dir, "png").unwrap();
        assert!(matches!(sink.store(0, &[]), Err(CaptureError::EmptyFrame)));
        assert!(!sink.path_for(0).exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = scratch_dir("gone");
        let mut sink = FileImageSink::new(&dir, "png").unwrap();
        fs::remove_dir_all(&dir).unwrap();
        assert!(matches!(
            sink.store(0, b"frame"),
            Err(CaptureError::Write { .. })
        ));
    }
}

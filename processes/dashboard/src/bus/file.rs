//! File-based bus source.
//!
//! Polls a JSON file holding one [`BusSnapshot`].

use std::fs;
use std::path::{Path, PathBuf};

use super::{BusSnapshot, BusSource, Router, SourceError};

/// A bus source that reads snapshots from a JSON file.
///
/// Files carry no message stream, so subscriptions through this source
/// never receive arrivals.
pub struct FileSource {
    path: PathBuf,
    description: String,
    router: Router,
    last_error: Option<String>,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            router: Router::new(),
            last_error: None,
        }
    }

    pub fn load(path: &Path) -> Result<BusSnapshot, SourceError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl BusSource for FileSource {
    fn poll(&mut self) -> Option<BusSnapshot> {
        match Self::load(&self.path) {
            Ok(snapshot) => {
                self.last_error = None;
                Some(snapshot)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                None
            }
        }
    }

    fn router(&self) -> &Router {
        &self.router
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.clone()
    }
}

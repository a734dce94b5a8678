//! `WAVE=FILE` command-line arguments

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// File-name suffixes produced by the pipeline stages
const STAGE_SUFFIXES: &[&str] = &["_analyzed", "_enriched", "_atomic", "_labels"];

#[derive(Debug, Error, PartialEq)]
pub enum WaveSpecError {
    #[error("Empty wave argument")]
    Empty,

    #[error("Wave argument '{0}' has an empty name or path")]
    Incomplete(String),
}

/// One wave input: a display name and its JSON file
#[derive(Debug, Clone, PartialEq)]
pub struct WaveInput {
    pub name: String,
    pub path: PathBuf,
}

impl WaveInput {
    /// `data/W5_analyzed.json` → `W5`
    pub fn name_from_path(path: &Path) -> String {
        let mut stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        // Stages stack suffixes: W5_atomic_analyzed
        while let Some(trimmed) = STAGE_SUFFIXES
            .iter()
            .find_map(|suffix| stem.strip_suffix(*suffix))
            .map(str::to_string)
        {
            stem = trimmed;
        }
        stem
    }

    /// Default guide path next to the input: `W5_reversal_guide.csv`
    pub fn guide_path(&self) -> PathBuf {
        self.path
            .with_file_name(format!("{}_reversal_guide.csv", self.name))
    }
}

impl FromStr for WaveInput {
    type Err = WaveSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(WaveSpecError::Empty);
        }

        match s.split_once('=') {
            Some((name, path)) => {
                let (name, path) = (name.trim(), path.trim());
                if name.is_empty() || path.is_empty() {
                    return Err(WaveSpecError::Incomplete(s.to_string()));
                }
                Ok(Self {
                    name: name.to_string(),
                    path: PathBuf::from(path),
                })
            }
            None => {
                let path = PathBuf::from(s);
                Ok(Self {
                    name: Self::name_from_path(&path),
                    path,
                })
            }
        }
    }
}

impl fmt::Display for WaveInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.path.display())
    }
}

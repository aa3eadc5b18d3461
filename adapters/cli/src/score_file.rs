//! Plain-text score persistence under the player's home directory.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use flappy_system_scoring::{ScoreStore, ScoreStoreError};

const DEFAULT_DIRECTORY: &str = ".flappy";
const DEFAULT_FILE_NAME: &str = "scores.txt";

/// Score store that keeps one `key=value` line per entry in a text file.
///
/// A missing file reads as an empty store; the file and its parent
/// directory are created on the first write.
#[derive(Clone, Debug)]
pub(crate) struct FileScoreStore {
    path: PathBuf,
}

impl FileScoreStore {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store located at `~/.flappy/scores.txt`.
    pub(crate) fn in_home_directory() -> io::Result<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine home directory",
            )
        })?;
        Ok(Self::new(
            home_dir.join(DEFAULT_DIRECTORY).join(DEFAULT_FILE_NAME),
        ))
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn read_lines(&self, key: &str) -> Result<Vec<Line>, ScoreStoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(ScoreStoreError::Io {
                    key: key.to_owned(),
                    source,
                })
            }
        };

        Ok(contents.lines().map(Line::parse).collect())
    }
}

/// One line of the score file; lines that are not entries survive rewrites.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Line {
    Entry { key: String, value: String },
    Other(String),
}

impl Line {
    fn parse(line: &str) -> Self {
        match line.split_once('=') {
            Some((key, value)) => Self::Entry {
                key: key.trim().to_owned(),
                value: value.trim().to_owned(),
            },
            None => Self::Other(line.to_owned()),
        }
    }

    fn is_entry_for(&self, key: &str) -> bool {
        matches!(self, Self::Entry { key: entry_key, .. } if entry_key == key)
    }
}

impl ScoreStore for FileScoreStore {
    fn get(&self, key: &str) -> Result<Option<u32>, ScoreStoreError> {
        let Some(Line::Entry { value: raw, .. }) = self
            .read_lines(key)?
            .into_iter()
            .find(|line| line.is_entry_for(key))
        else {
            return Ok(None);
        };

        raw.parse::<u32>()
            .map(Some)
            .map_err(|_| ScoreStoreError::Malformed {
                key: key.to_owned(),
                raw,
            })
    }

    fn set(&mut self, key: &str, value: u32) -> Result<(), ScoreStoreError> {
        let io_error = |source| ScoreStoreError::Io {
            key: key.to_owned(),
            source,
        };

        let mut lines = self.read_lines(key)?;
        lines.retain(|line| !line.is_entry_for(key));
        lines.push(Line::Entry {
            key: key.to_owned(),
            value: value.to_string(),
        });

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let contents: String = lines
            .iter()
            .map(|line| match line {
                Line::Entry { key, value } => format!("{key}={value}\n"),
                Line::Other(raw) => format!("{raw}\n"),
            })
            .collect();
        fs::write(&self.path, contents).map_err(io_error)?;
        tracing::debug!(path = %self.path.display(), key, value, "score stored");
        Ok(())
    }
}

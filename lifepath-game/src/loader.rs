//! One-shot loading of the question table from a pluggable source.
use std::convert::Infallible;
use std::path::{Path, PathBuf};

use crate::LoadError;
use crate::data::{QuestionPool, parse_csv};

/// Trait for abstracting where the question table comes from.
/// Platform-specific implementations should provide this.
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the raw table text.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    fn load_table(&self) -> Result<String, Self::Error>;
}

/// Reads the table from a file on disk.
#[derive(Debug, Clone)]
pub struct FileLoader {
    path: PathBuf,
}

impl FileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataLoader for FileLoader {
    type Error = std::io::Error;

    fn load_table(&self) -> Result<String, Self::Error> {
        std::fs::read_to_string(&self.path)
    }
}

/// Serves table text already held in memory.
#[derive(Debug, Clone)]
pub struct StaticLoader {
    text: String,
}

impl StaticLoader {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Loader over the table compiled into the crate.
    #[must_use]
    pub fn bundled() -> Self {
        Self::new(crate::data::BUNDLED_TABLE)
    }
}

impl DataLoader for StaticLoader {
    type Error = Infallible;

    fn load_table(&self) -> Result<String, Self::Error> {
        Ok(self.text.clone())
    }
}

fn validate(text: &str) -> Result<QuestionPool, LoadError<Infallible>> {
    let questions = parse_csv(text)?;
    Ok(QuestionPool::new(questions)?)
}

fn widen<E>(err: LoadError<Infallible>) -> LoadError<E> {
    match err {
        LoadError::DataSourceUnavailable(never) => match never {},
        LoadError::Data(err) => LoadError::Data(err),
        LoadError::Setup(err) => LoadError::Setup(err),
    }
}

/// Load, parse and validate a pool. No retry: a failed fetch is final.
///
/// # Errors
///
/// Returns an error if the source fails, a row is malformed, or the setup
/// questions are missing or ambiguous.
pub fn load_pool<L: DataLoader>(loader: &L) -> Result<QuestionPool, LoadError<L::Error>> {
    let text = loader
        .load_table()
        .map_err(LoadError::DataSourceUnavailable)?;
    validate(&text).map_err(widen)
}

/// Async variant of [`load_pool`] over a file path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation.
#[cfg(feature = "async")]
pub async fn load_pool_from_path_async(
    path: impl AsRef<Path>,
) -> Result<QuestionPool, LoadError<std::io::Error>> {
    let text = tokio::fs::read_to_string(path.as_ref())
        .await
        .map_err(LoadError::DataSourceUnavailable)?;
    validate(&text).map_err(widen)
}

//! Upload attempts and the state they drive.
//!
//! Every file selection starts a new attempt. An attempt loads the
//! spreadsheet library if needed, reads the file, and shapes its first sheet;
//! the outcome replaces the [`UiState`] wholesale. Attempts carry a sequence
//! number and only the most recently started one may write its outcome, so a
//! slow attempt finishing after a newer selection is discarded.
//!
//! # Example
//!
//! ```no_run
//! use sheetview::session::{SelectedFile, UploadSession};
//!
//! # async fn demo() {
//! let session = UploadSession::with_defaults();
//! let _ = session.select(Some(SelectedFile::from_path("data.xlsx"))).await;
//!
//! let state = session.snapshot();
//! println!("{} rows", state.table.len());
//! # }
//! ```

use crate::error::{Error, Result};
use crate::loader::{
    BundledSource, LibraryLoader, LibraryRegistry, LibrarySource, DEFAULT_LIBRARY_KEY,
    DEFAULT_LIBRARY_LOCATION,
};
use crate::model::ParsedTable;
use crate::render::View;
use crate::shape::{parse_workbook_bytes, ShapedSheet};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// What the user is currently looking at.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UiState {
    /// Name of the selected file, if any
    pub file_name: Option<String>,
    /// An attempt is in flight
    pub loading: bool,
    /// User-visible message of the last failure
    pub error: Option<String>,
    /// Column names in sheet order
    pub headers: Vec<String>,
    /// Data rows in sheet order
    pub table: ParsedTable,
}

/// Which library a session loads.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Registry key of the library
    pub library_key: String,
    /// Location handed to the library source
    pub library_location: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            library_key: DEFAULT_LIBRARY_KEY.to_string(),
            library_location: DEFAULT_LIBRARY_LOCATION.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the registry key.
    pub fn with_library_key(mut self, key: impl Into<String>) -> Self {
        self.library_key = key.into();
        self
    }

    /// Set the library location.
    pub fn with_library_location(mut self, location: impl Into<String>) -> Self {
        self.library_location = location.into();
        self
    }
}

#[derive(Debug, Clone)]
enum FileSource {
    Path(PathBuf),
    Memory(Vec<u8>),
}

/// A file chosen by the user.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    name: String,
    source: FileSource,
}

impl SelectedFile {
    /// A file on disk; its contents are read when the attempt runs.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            source: FileSource::Path(path.to_path_buf()),
        }
    }

    /// A file whose contents are already in memory.
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            source: FileSource::Memory(data),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the full contents of the file.
    pub async fn read_all(self) -> Result<Vec<u8>> {
        match self.source {
            FileSource::Path(path) => tokio::fs::read(&path)
                .await
                .map_err(|e| Error::FileRead(format!("{}: {}", path.display(), e))),
            FileSource::Memory(data) => Ok(data),
        }
    }
}

/// Token for one upload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    seq: u64,
}

impl Attempt {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

struct Shared {
    state: UiState,
    latest: u64,
}

/// Drives upload attempts and owns the resulting [`UiState`].
pub struct UploadSession<S> {
    loader: LibraryLoader<S>,
    config: SessionConfig,
    shared: Mutex<Shared>,
}

impl UploadSession<BundledSource> {
    /// Session using the bundled library and the process-wide registry.
    pub fn with_defaults() -> Self {
        Self::new(
            LibraryLoader::new(LibraryRegistry::global(), BundledSource),
            SessionConfig::default(),
        )
    }
}

impl<S: LibrarySource> UploadSession<S> {
    pub fn new(loader: LibraryLoader<S>, config: SessionConfig) -> Self {
        Self {
            loader,
            config,
            shared: Mutex::new(Shared {
                state: UiState::default(),
                latest: 0,
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn loader(&self) -> &LibraryLoader<S> {
        &self.loader
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a full attempt for a selection.
    ///
    /// Returns the attempt's own outcome. The state is only updated if no
    /// newer attempt was started in the meantime.
    pub async fn select(&self, selection: Option<SelectedFile>) -> Result<()> {
        let attempt = self.begin(selection.as_ref().map(SelectedFile::name));

        let outcome = match selection {
            Some(file) => self.run(file).await,
            None => Err(Error::NoFileSelected),
        };

        self.finish(attempt, outcome)
    }

    /// Start an attempt: issue the next sequence number and reset the state.
    ///
    /// With a file name the state enters loading; without one it is cleared
    /// entirely.
    pub fn begin(&self, file_name: Option<&str>) -> Attempt {
        let mut shared = self.lock();
        shared.latest += 1;
        shared.state = UiState {
            file_name: file_name.map(str::to_string),
            loading: file_name.is_some(),
            ..UiState::default()
        };
        debug!(seq = shared.latest, file = ?file_name, "attempt started");
        Attempt { seq: shared.latest }
    }

    /// Load the library, read the file, and shape its first sheet.
    pub async fn run(&self, file: SelectedFile) -> Result<ShapedSheet> {
        let key = self.config.library_key.as_str();
        self.loader
            .ensure_loaded(key, &self.config.library_location)
            .await?;

        let name = file.name().to_string();
        let data = file.read_all().await?;
        debug!(file = %name, bytes = data.len(), "file read");

        let library = self.loader.registry().get(key);
        parse_workbook_bytes(library.as_deref(), &data)
    }

    /// Apply an attempt's outcome if it is still the latest attempt.
    ///
    /// Loading is switched off on every applied outcome; failures clear the
    /// headers and table and record the error message.
    pub fn finish(&self, attempt: Attempt, outcome: Result<ShapedSheet>) -> Result<()> {
        let mut shared = self.lock();
        if attempt.seq != shared.latest {
            debug!(
                seq = attempt.seq,
                latest = shared.latest,
                "attempt superseded, outcome discarded"
            );
            return outcome.map(|_| ());
        }

        let state = &mut shared.state;
        state.loading = false;
        match outcome {
            Ok(shaped) => {
                debug!(
                    seq = attempt.seq,
                    columns = shaped.headers.len(),
                    rows = shaped.records.len(),
                    "attempt succeeded"
                );
                state.error = None;
                state.headers = shaped.headers;
                state.table = shaped.records;
                Ok(())
            }
            Err(err) => {
                warn!(seq = attempt.seq, error = %err, "attempt failed");
                state.error = Some(err.to_string());
                state.headers.clear();
                state.table.clear();
                Err(err)
            }
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> UiState {
        self.lock().state.clone()
    }

    /// Project the current state into what should be displayed.
    pub fn view(&self) -> View {
        View::from_state(&self.lock().state)
    }
}

impl<S> std::fmt::Debug for UploadSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadSession")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

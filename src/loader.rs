//! One-time loading of spreadsheet libraries.
//!
//! A [`LibraryRegistry`] remembers which libraries have been loaded, keyed by
//! an identifier. [`LibraryLoader::ensure_loaded`] fetches a library from its
//! [`LibrarySource`] the first time a key is requested and resolves
//! immediately on every later call.
//!
//! # Example
//!
//! ```no_run
//! use sheetview::loader::{BundledSource, LibraryLoader, LibraryRegistry};
//! use sheetview::loader::{DEFAULT_LIBRARY_KEY, DEFAULT_LIBRARY_LOCATION};
//!
//! # async fn demo() -> sheetview::Result<()> {
//! let loader = LibraryLoader::new(LibraryRegistry::global(), BundledSource);
//! loader.ensure_loaded(DEFAULT_LIBRARY_KEY, DEFAULT_LIBRARY_LOCATION).await?;
//! assert!(loader.registry().contains(DEFAULT_LIBRARY_KEY));
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use crate::library::SpreadsheetLibrary;
use crate::xlsx::OoxmlLibrary;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::{debug, warn};

/// Registry key of the default spreadsheet library.
pub const DEFAULT_LIBRARY_KEY: &str = "xlsx";

/// Location of the default spreadsheet library.
pub const DEFAULT_LIBRARY_LOCATION: &str = "bundled:ooxml";

const BUNDLED_SCHEME: &str = "bundled:";

/// Libraries loaded so far, keyed by identifier.
#[derive(Default)]
pub struct LibraryRegistry {
    entries: RwLock<HashMap<String, Arc<dyn SpreadsheetLibrary>>>,
    // Serializes fetches so concurrent callers for one key fetch once
    fetch_gate: tokio::sync::Mutex<()>,
}

impl LibraryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<LibraryRegistry>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(LibraryRegistry::new())))
    }

    /// Look up a loaded library.
    pub fn get(&self, key: &str) -> Option<Arc<dyn SpreadsheetLibrary>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    /// Check whether a library is loaded under `key`.
    pub fn contains(&self, key: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(key)
    }

    /// Register a library. Returns `false` and keeps the existing entry when
    /// `key` is already taken.
    pub fn register(&self, key: impl Into<String>, library: Arc<dyn SpreadsheetLibrary>) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.entry(key.into()) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(library);
                true
            }
        }
    }

    /// Number of loaded libraries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if no library has been loaded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for LibraryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<&String> = entries.keys().collect();
        keys.sort();
        f.debug_struct("LibraryRegistry").field("keys", &keys).finish()
    }
}

/// Where spreadsheet libraries come from.
pub trait LibrarySource: Send + Sync {
    /// Fetch and initialise the library found at `location`.
    fn fetch(
        &self,
        location: &str,
    ) -> impl Future<Output = Result<Arc<dyn SpreadsheetLibrary>>> + Send;
}

/// Source for the libraries compiled into this crate.
///
/// Understands `bundled:ooxml`; any other location fails to load.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledSource;

impl LibrarySource for BundledSource {
    async fn fetch(&self, location: &str) -> Result<Arc<dyn SpreadsheetLibrary>> {
        match location.strip_prefix(BUNDLED_SCHEME) {
            Some("ooxml") => Ok(Arc::new(OoxmlLibrary::new())),
            Some(name) => Err(Error::LibraryLoad(format!("no bundled library named {:?}", name))),
            None => Err(Error::LibraryLoad(format!(
                "cannot fetch {:?}: only bundled libraries are available",
                location
            ))),
        }
    }
}

/// Loads libraries from a source into a registry, at most once per key.
#[derive(Debug)]
pub struct LibraryLoader<S> {
    registry: Arc<LibraryRegistry>,
    source: S,
}

impl<S: LibrarySource> LibraryLoader<S> {
    pub fn new(registry: Arc<LibraryRegistry>, source: S) -> Self {
        Self { registry, source }
    }

    pub fn registry(&self) -> &Arc<LibraryRegistry> {
        &self.registry
    }

    /// Make sure the library for `key` is registered.
    ///
    /// Resolves without fetching when `key` is already present. A failed
    /// fetch is reported as [`Error::LibraryLoad`] and leaves the registry
    /// untouched, so a later call fetches again.
    pub async fn ensure_loaded(&self, key: &str, location: &str) -> Result<()> {
        if self.registry.contains(key) {
            debug!(key, "library already loaded");
            return Ok(());
        }

        let _gate = self.registry.fetch_gate.lock().await;
        if self.registry.contains(key) {
            debug!(key, "library loaded while waiting");
            return Ok(());
        }

        debug!(key, location, "fetching library");
        let library = self.source.fetch(location).await.map_err(|err| {
            warn!(key, location, error = %err, "library load failed");
            match err {
                Error::LibraryLoad(_) => err,
                other => Error::LibraryLoad(other.to_string()),
            }
        })?;

        debug!(key, library = library.name(), "library registered");
        self.registry.register(key, library);
        Ok(())
    }
}

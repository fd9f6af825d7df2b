//! Builder for creating and configuring store instances.

use std::path::{Path, PathBuf};

use super::WardrobeStore;
use crate::error::{Result, StoreError};

/// Builder for creating and configuring [`WardrobeStore`] instances.
#[derive(Debug, Clone)]
pub struct StoreBuilder {
    database_path: Option<PathBuf>,
}

impl StoreBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            database_path: None,
        }
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/wardrobe/wardrobe.db` or
    /// `~/.local/share/wardrobe/wardrobe.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Builds the configured store instance.
    ///
    /// The database file itself is opened lazily: on the first operation or
    /// an explicit [`WardrobeStore::initialize`] call, whichever comes
    /// first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::FileSystem` if the parent directory cannot be
    /// created
    /// Returns `StoreError::XdgDirectory` if no path was given and the
    /// default location cannot be resolved
    pub fn build(self) -> Result<WardrobeStore> {
        let db_path = if let Some(path) = self.database_path {
            path
        } else {
            Self::default_database_path()?
        };

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        Ok(WardrobeStore::new(db_path))
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("wardrobe")
            .place_data_file("wardrobe.db")
            .map_err(|e| StoreError::XdgDirectory(e.to_string()))
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

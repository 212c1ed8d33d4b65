//! Durable client-side session flags.
//!
//! Holds the login flag with its display name and the set of paths that
//! have already been force-refreshed once. The file carries no schema
//! version and is rewritten wholesale on every write.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to access session file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("session file {path} is not valid JSON: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Paths that already received their one forced reload.
    #[serde(default)]
    pub refreshed_paths: BTreeSet<String>,
}

/// File-backed store for [`SessionState`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the current state. A missing file yields the default state.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] on read failures other than not-found and
    /// [`SessionError::Corrupt`] when the file does not parse.
    pub fn state(&self) -> Result<SessionState, SessionError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SessionState::default())
            }
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_str(&content).map_err(|e| SessionError::Corrupt {
            path: self.path.display().to_string(),
            source: e,
        })
    }

    /// Sets the login flag and display name.
    ///
    /// # Errors
    ///
    /// Propagates read/write failures.
    pub fn login(&self, display_name: &str) -> Result<SessionState, SessionError> {
        let mut state = self.state()?;
        state.logged_in = true;
        state.display_name = Some(display_name.trim().to_string()).filter(|n| !n.is_empty());
        self.write(&state)?;
        Ok(state)
    }

    /// Clears the login flag and display name, keeping refresh markers.
    ///
    /// # Errors
    ///
    /// Propagates read/write failures.
    pub fn logout(&self) -> Result<SessionState, SessionError> {
        let mut state = self.state()?;
        state.logged_in = false;
        state.display_name = None;
        self.write(&state)?;
        Ok(state)
    }

    /// Records that `path` has been refreshed.
    ///
    /// Returns `true` the first time a path is seen, meaning the caller should
    /// perform its single forced reload now; `false` afterwards.
    ///
    /// # Errors
    ///
    /// Propagates read/write failures.
    pub fn mark_refreshed(&self, path: &str) -> Result<bool, SessionError> {
        let mut state = self.state()?;
        if !state.refreshed_paths.insert(path.to_string()) {
            return Ok(false);
        }
        self.write(&state)?;
        Ok(true)
    }

    /// Forgets every refresh marker.
    ///
    /// # Errors
    ///
    /// Propagates read/write failures.
    pub fn clear_refreshed(&self) -> Result<(), SessionError> {
        let mut state = self.state()?;
        state.refreshed_paths.clear();
        self.write(&state)
    }

    fn write(&self, state: &SessionState) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let body = serde_json::to_string_pretty(state).map_err(|e| SessionError::Corrupt {
            path: self.path.display().to_string(),
            source: e,
        })?;
        std::fs::write(&self.path, body).map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

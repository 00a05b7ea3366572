//! Durable storage for acquired credentials.
//!
//! [`FileTokenStore`] keeps one JSON document in a per-user data directory
//! and replaces it atomically through a temporary file and rename.
//! [`MemoryTokenStore`] backs tests and short-lived sessions.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use directories::ProjectDirs;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CREDENTIALS_FILE: &str = "credentials.json";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Errors raised while reading or writing stored credentials.
#[derive(Debug, Error)]
pub enum TokenStoreError {
    /// The credential file or its directory could not be accessed.
    #[error("failed to access credential store at '{path}': {source}")]
    Io {
        /// Credential file location.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The credential file is not valid JSON.
    #[error("credential store at '{path}' is corrupt: {source}")]
    Parse {
        /// Credential file location.
        path: PathBuf,
        /// Parser failure.
        #[source]
        source: serde_json::Error,
    },
}

/// A credential persisted between runs.
#[derive(Clone)]
pub struct StoredCredential {
    /// Bearer token attached to API calls.
    pub access_token: SecretString,
    /// Token used for silent renewal, when the provider issued one.
    pub refresh_token: Option<SecretString>,
    /// Email of the user the credential belongs to, once known.
    pub email: Option<String>,
}

impl std::fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredCredential")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize, Deserialize)]
struct CredentialDocument {
    access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

impl From<&StoredCredential> for CredentialDocument {
    fn from(value: &StoredCredential) -> Self {
        Self {
            access_token: value.access_token.expose_secret().to_owned(),
            refresh_token: value
                .refresh_token
                .as_ref()
                .map(|token| token.expose_secret().to_owned()),
            email: value.email.clone(),
        }
    }
}

impl From<CredentialDocument> for StoredCredential {
    fn from(value: CredentialDocument) -> Self {
        Self {
            access_token: SecretString::from(value.access_token),
            refresh_token: value.refresh_token.map(SecretString::from),
            email: value.email,
        }
    }
}

/// Where acquired credentials are kept.
pub trait TokenStore: Send + Sync {
    /// Load the stored credential, if any.
    ///
    /// # Errors
    /// I/O or parse failures.
    fn load(&self) -> Result<Option<StoredCredential>, TokenStoreError>;

    /// Replace the stored credential.
    ///
    /// # Errors
    /// I/O failures.
    fn save(&self, credential: &StoredCredential) -> Result<(), TokenStoreError>;

    /// Forget the stored credential.
    ///
    /// # Errors
    /// I/O failures other than the credential already being absent.
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// In-process credential store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    credential: Mutex<Option<StoredCredential>>,
}

impl MemoryTokenStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<StoredCredential>, TokenStoreError> {
        Ok(self
            .credential
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, credential: &StoredCredential) -> Result<(), TokenStoreError> {
        *self
            .credential
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self
            .credential
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Credential store backed by a JSON file in `dir`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    /// Store the credential file under `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Per-user data directory, falling back to `~/.rental` when the
    /// platform directories cannot be resolved.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "rental", "rental")
            .map(|dirs| dirs.data_local_dir().to_path_buf())
            .or_else(|| {
                std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".rental"))
            })
    }

    fn file_path(&self) -> PathBuf {
        self.dir.join(CREDENTIALS_FILE)
    }

    fn io_error(&self, source: io::Error) -> TokenStoreError {
        TokenStoreError::Io {
            path: self.file_path(),
            source,
        }
    }

    fn open_dir(&self) -> io::Result<Dir> {
        Dir::open_ambient_dir(&self.dir, ambient_authority())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<StoredCredential>, TokenStoreError> {
        let dir = match self.open_dir() {
            Ok(dir) => dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };
        let raw = match dir.read_to_string(CREDENTIALS_FILE) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };
        let document: CredentialDocument =
            serde_json::from_str(&raw).map_err(|source| TokenStoreError::Parse {
                path: self.file_path(),
                source,
            })?;
        Ok(Some(document.into()))
    }

    fn save(&self, credential: &StoredCredential) -> Result<(), TokenStoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|err| self.io_error(err))?;
        let dir = self.open_dir().map_err(|err| self.io_error(err))?;
        let contents = serde_json::to_string_pretty(&CredentialDocument::from(credential))
            .map_err(|source| TokenStoreError::Parse {
                path: self.file_path(),
                source,
            })?;
        write_atomic(&dir, Utf8Path::new(CREDENTIALS_FILE), &contents)
            .map_err(|err| self.io_error(err))
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        let dir = match self.open_dir() {
            Ok(dir) => dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(self.io_error(err)),
        };
        match dir.remove_file(CREDENTIALS_FILE) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(err)),
        }
    }
}

/// Write `contents` to a hidden temporary file, then rename it over `path`.
fn write_atomic(dir: &Dir, path: &Utf8Path, contents: &str) -> io::Result<()> {
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let tmp_name = format!(".{path}.tmp.{}.{suffix}.{counter}", std::process::id());

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let written = dir.open_with(&tmp_name, &options).and_then(|mut file| {
        file.write_all(contents.as_bytes())?;
        file.sync_all()
    });
    if let Err(err) = written.and_then(|()| dir.rename(&tmp_name, dir, path.as_std_path())) {
        if dir.remove_file(&tmp_name).is_err() {
            // Ignore cleanup failures.
        }
        return Err(err);
    }
    Ok(())
}

/// Path of the credential file inside `dir`; exposed for diagnostics.
#[must_use]
pub fn credential_file_in(dir: &Path) -> PathBuf {
    dir.join(CREDENTIALS_FILE)
}

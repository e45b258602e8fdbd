//! Credential value type and its durable client-side copy.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use derive_more::{Display, Error};
use tracing::{debug, info, instrument};

/// Opaque bearer credential issued by the authority.
///
/// The raw value never appears in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw token as issued. Returns `None` for empty or
    /// whitespace-only input; anything else is kept byte for byte.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw.to_string()))
        }
    }

    /// Returns the raw token for the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Credential storage error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Credential store error: {} at {}:{}", message, file, line)]
pub struct StoreError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates a new store error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Durable cache of the credential.
///
/// The authority stays the source of truth for validity; this copy only lets
/// a restarted client skip the login redirect.
pub trait CredentialStore: std::fmt::Debug + Send {
    /// Reads the persisted credential, if any.
    fn load(&self) -> Result<Option<Credential>, StoreError>;

    /// Persists `credential`, replacing any previous copy.
    fn save(&self, credential: &Credential) -> Result<(), StoreError>;

    /// Deletes the persisted copy. Succeeds if nothing was stored.
    fn clear(&self) -> Result<(), StoreError>;
}

/// Stores the credential in a single file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Creates a store backed by `path`. Nothing is touched until first use.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn new(path: impl AsRef<Path>) -> Self {
        debug!("Creating file credential store");
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the credential file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Option<Credential>, StoreError> {
        if !self.path.exists() {
            debug!("No stored credential");
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::new(format!("Failed to read credential file: {}", e)))?;

        // Line endings come from the file, not the token.
        let credential = Credential::parse(content.trim_end_matches(['\r', '\n']));
        debug!(found = credential.is_some(), "Read credential file");
        Ok(credential)
    }

    #[instrument(skip(self, credential), fields(path = %self.path.display()))]
    fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::new(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options
            .open(&self.path)
            .map_err(|e| StoreError::new(format!("Failed to open credential file: {}", e)))?;

        // The creation mode does not apply to a file that already existed.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|e| {
                    StoreError::new(format!("Failed to restrict credential file: {}", e))
                })?;
        }

        file.write_all(credential.expose().as_bytes())
            .map_err(|e| StoreError::new(format!("Failed to write credential file: {}", e)))?;

        info!("Credential persisted");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Stored credential evicted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::new(format!(
                "Failed to remove credential file: {}",
                e
            ))),
        }
    }
}

/// In-memory store. Clones share the same slot, so a test can keep one
/// handle while the session owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    slot: Arc<Mutex<Option<Credential>>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `credential`.
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(credential))),
        }
    }

    /// Returns a copy of whatever is currently stored.
    pub fn snapshot(&self) -> Option<Credential> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        *self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}

//! Key-value persistence mirror for the credential.
//!
//! Mirrors the token, its expiry and the access key it was issued under,
//! so a fresh process can resume a session without a new login. Entries
//! whose stored access key differs from the current one are ignored and
//! cleared by the manager, never reused.

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use panel_core::PersistedCredential;

/// Best-effort credential mirror. Implementations must be cheap; the
/// manager calls them at synchronous points only.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<PersistedCredential>;
    fn save(&self, credential: &PersistedCredential) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

/// JSON-file-backed store.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<PersistedCredential> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&raw).ok()
    }

    fn save(&self, credential: &PersistedCredential) -> io::Result<()> {
        let json = serde_json::to_string_pretty(credential)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        // Write-then-rename so a crashed save never leaves a torn mirror.
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)
    }

    fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// In-memory store for tests and for callers that opt out of persistence.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<PersistedCredential>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<PersistedCredential> {
        self.slot.lock().expect("token store poisoned").clone()
    }

    fn save(&self, credential: &PersistedCredential) -> io::Result<()> {
        *self.slot.lock().expect("token store poisoned") = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.slot.lock().expect("token store poisoned") = None;
        Ok(())
    }
}

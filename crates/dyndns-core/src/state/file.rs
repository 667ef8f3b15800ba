// # File IP Store
//
// File-backed implementation of IpStore.
//
// ## Purpose
//
// Persists the last fully-applied IP across daemon restarts so that a
// restart does not trigger a redundant provider update for an unchanged
// address.
//
// ## Durability
//
// - Atomic writes: new state goes to a temporary file, then rename
// - Corruption handling: an unparsable state file degrades to "absent"
//   (first-run semantics) rather than failing the cycle
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "last_ip": "203.0.113.7",
//   "updated_at": "2026-01-09T12:00:00Z"
// }
// ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::addr::IpAddress;
use crate::traits::ip_store::IpStore;

/// State file format version, for future migration if the format changes
const STATE_FILE_VERSION: &str = "1.0";

/// Serializable state file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct StateFileFormat {
    version: String,
    last_ip: IpAddress,
    updated_at: chrono::DateTime<chrono::Utc>,
}

/// File-backed persisted-IP store with atomic replacement
///
/// # Example
///
/// ```rust,no_run
/// use dyndns_core::state::FileIpStore;
/// use dyndns_core::traits::IpStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileIpStore::new("/var/lib/dyndns/last-ip.json").await?;
///
///     store.store(&"1.2.3.4".parse()?).await?;
///     assert_eq!(store.load().await?, Some("1.2.3.4".parse()?));
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileIpStore {
    path: PathBuf,
}

impl FileIpStore {
    /// Create a file store at `path`, creating parent directories if needed.
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::store(format!(
                        "failed to create state directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        Ok(Self { path })
    }

    /// Path to the temporary file used for atomic writes
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }
}

#[async_trait]
impl IpStore for FileIpStore {
    async fn load(&self) -> Result<Option<IpAddress>, Error> {
        if !self.path.exists() {
            tracing::debug!("state file does not exist: {}", self.path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            Error::store(format!(
                "failed to read state file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        match serde_json::from_str::<StateFileFormat>(&content) {
            Ok(state) => {
                if state.version != STATE_FILE_VERSION {
                    tracing::warn!(
                        "state file version mismatch: expected {}, got {}; loading anyway",
                        STATE_FILE_VERSION,
                        state.version
                    );
                }
                Ok(Some(state.last_ip))
            }
            Err(e) => {
                // Corrupt state is indistinguishable from a first run as far
                // as the engine is concerned; it will re-apply and rewrite.
                tracing::warn!(
                    "state file {} is unparsable ({}); treating as absent",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    async fn store(&self, ip: &IpAddress) -> Result<(), Error> {
        let state = StateFileFormat {
            version: STATE_FILE_VERSION.to_string(),
            last_ip: ip.clone(),
            updated_at: chrono::Utc::now(),
        };

        let json = serde_json::to_string_pretty(&state)
            .map_err(|e| Error::store(format!("failed to serialize state: {}", e)))?;

        // Write to a temporary file first
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::store(format!(
                    "failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::store(format!(
                    "failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::store(format!(
                    "failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        // Atomic rename (temp -> actual)
        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::store(format!(
                "failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("state written to {}", self.path.display());
        Ok(())
    }
}

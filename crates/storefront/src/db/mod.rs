//! Durable storage for the storefront.
//!
//! # Data directory: `STOREFRONT_DATA_DIR`
//!
//! Each store is a single JSON document rewritten wholesale on every mutation:
//!
//! ## Documents
//!
//! - `users.json` - Accounts and their order history (`{"users": [...]}`)
//! - `orders.json` - Global order log, one entry per committed payment
//! - `responses.json` - Contact form submissions
//!
//! Every document sits behind its own lock. Mutations clone the current
//! value, apply the change, write the result to a sibling temp file and
//! rename it over the original. Only then is the in-memory copy replaced, so
//! a failed write leaves both disk and memory as they were.

pub mod orders;
pub mod responses;
pub mod users;

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

pub use orders::OrderLogRepository;
pub use responses::ResponseRepository;
pub use users::UserRepository;

use crate::models::{ContactResponse, OrderRecord, UsersDocument};

/// Errors that can occur during repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Reading or writing a document file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A document could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Data on disk is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Outcome of a document mutation.
///
/// `Unchanged` skips the write entirely.
#[derive(Debug)]
pub enum Mutation<R> {
    Changed(R),
    Unchanged(R),
}

/// A JSON document guarded by a single lock.
///
/// File-backed documents persist every committed mutation; in-memory
/// documents (tests, ephemeral runs) only update the guarded value.
#[derive(Debug)]
pub struct Document<D> {
    state: Mutex<D>,
    path: Option<PathBuf>,
}

impl<D> Document<D>
where
    D: Serialize + DeserializeOwned + Clone + Default + Send,
{
    /// Open a file-backed document, creating the parent directory if needed.
    ///
    /// A missing or blank file starts from `D::default()`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Io` if the file cannot be read.
    /// Returns `RepositoryError::DataCorruption` if it does not parse.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let value = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => D::default(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                RepositoryError::DataCorruption(format!("{}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => D::default(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            state: Mutex::new(value),
            path: Some(path),
        })
    }

    /// Create a document that lives only in memory.
    #[must_use]
    pub fn in_memory(initial: D) -> Self {
        Self {
            state: Mutex::new(initial),
            path: None,
        }
    }

    /// Backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run a read-only closure against the current value.
    pub async fn read<R>(&self, f: impl FnOnce(&D) -> R) -> R {
        let guard = self.state.lock().await;
        f(&guard)
    }

    /// Clone the current value.
    pub async fn snapshot(&self) -> D {
        self.state.lock().await.clone()
    }

    /// Apply a mutation and persist it.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or the error from persisting the draft.
    /// In both cases the stored value is unchanged.
    pub async fn update<R>(
        &self,
        f: impl FnOnce(&mut D) -> Result<R, RepositoryError>,
    ) -> Result<R, RepositoryError> {
        self.update_with(|draft| f(draft).map(Mutation::Changed))
            .await
    }

    /// Apply a mutation that may decide no write is needed.
    ///
    /// # Errors
    ///
    /// Same as [`Document::update`].
    pub async fn update_with<R>(
        &self,
        f: impl FnOnce(&mut D) -> Result<Mutation<R>, RepositoryError>,
    ) -> Result<R, RepositoryError> {
        let mut guard = self.state.lock().await;
        let mut draft = guard.clone();

        match f(&mut draft)? {
            Mutation::Unchanged(result) => Ok(result),
            Mutation::Changed(result) => {
                if let Some(path) = &self.path {
                    write_atomic(path, &draft).await?;
                }
                *guard = draft;
                Ok(result)
            }
        }
    }
}

/// Write `value` to a temp file next to `path`, then rename it into place.
async fn write_atomic<D: Serialize>(path: &Path, value: &D) -> Result<(), RepositoryError> {
    let bytes = serde_json::to_vec_pretty(value)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, &bytes).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }

    Ok(())
}

/// The three storefront documents.
#[derive(Debug)]
pub struct Stores {
    pub users: Document<UsersDocument>,
    pub order_log: Document<Vec<OrderRecord>>,
    pub responses: Document<Vec<ContactResponse>>,
}

impl Stores {
    /// File names inside the data directory.
    pub const USERS_FILE: &'static str = "users.json";
    pub const ORDERS_FILE: &'static str = "orders.json";
    pub const RESPONSES_FILE: &'static str = "responses.json";

    /// Open all documents under `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`Document::open`].
    pub async fn open(data_dir: &Path) -> Result<Self, RepositoryError> {
        Ok(Self {
            users: Document::open(data_dir.join(Self::USERS_FILE)).await?,
            order_log: Document::open(data_dir.join(Self::ORDERS_FILE)).await?,
            responses: Document::open(data_dir.join(Self::RESPONSES_FILE)).await?,
        })
    }

    /// Empty in-memory stores.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            users: Document::in_memory(UsersDocument::default()),
            order_log: Document::in_memory(Vec::new()),
            responses: Document::in_memory(Vec::new()),
        }
    }

    /// Whether every file-backed document's directory is still reachable.
    ///
    /// In-memory stores are always ready.
    pub async fn is_ready(&self) -> bool {
        let paths = [
            self.users.path(),
            self.order_log.path(),
            self.responses.path(),
        ];
        for dir in paths.into_iter().flatten().filter_map(Path::parent) {
            let dir = if dir.as_os_str().is_empty() {
                Path::new(".")
            } else {
                dir
            };
            let reachable = tokio::fs::metadata(dir).await.is_ok_and(|m| m.is_dir());
            if !reachable {
                return false;
            }
        }
        true
    }

    /// Typed access to user records.
    #[must_use]
    pub const fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.users)
    }

    /// Typed access to the global order log.
    #[must_use]
    pub const fn order_log(&self) -> OrderLogRepository<'_> {
        OrderLogRepository::new(&self.order_log)
    }

    /// Typed access to contact responses.
    #[must_use]
    pub const fn responses(&self) -> ResponseRepository<'_> {
        ResponseRepository::new(&self.responses)
    }
}

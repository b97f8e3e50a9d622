//! Order log reconciliation.
//!
//! # Usage
//!
//! ```bash
//! bazaar-cli reconcile --data-dir data
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATA_DIR` - Default for `--data-dir`

use std::path::{Path, PathBuf};

use bazaar_storefront::db::{Document, RepositoryError, Stores};
use bazaar_storefront::models::{OrderRecord, UsersDocument};
use bazaar_storefront::services::reconcile::{ReconcileReport, reconcile};
use thiserror::Error;

/// Errors that can occur during reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Data directory does not exist.
    #[error("Data directory not found: {0}")]
    MissingDataDir(PathBuf),

    /// A document could not be read.
    #[error("Failed to read documents: {0}")]
    Repository(#[from] RepositoryError),

    /// The report could not be rendered.
    #[error("Failed to render report: {0}")]
    Render(#[from] serde_json::Error),

    /// The stores disagree.
    #[error("{log_only} order(s) only in the log, {history_only} only in user histories")]
    Inconsistent {
        log_only: usize,
        history_only: usize,
    },
}

/// Load both documents under `data_dir` and compare them.
///
/// # Errors
///
/// Returns `ReconcileError::MissingDataDir` if the directory is absent, or a
/// repository error if a document does not parse.
pub async fn report(data_dir: &Path) -> Result<ReconcileReport, ReconcileError> {
    if !data_dir.is_dir() {
        return Err(ReconcileError::MissingDataDir(data_dir.to_owned()));
    }

    let users: Document<UsersDocument> =
        Document::open(data_dir.join(Stores::USERS_FILE)).await?;
    let log: Document<Vec<OrderRecord>> =
        Document::open(data_dir.join(Stores::ORDERS_FILE)).await?;

    Ok(reconcile(&log.snapshot().await, &users.snapshot().await))
}

/// Print the report as JSON and fail if anything is out of sync.
///
/// # Errors
///
/// Returns `ReconcileError::Inconsistent` when the report is not clean.
#[allow(clippy::print_stdout)]
pub async fn run(data_dir: &Path) -> Result<(), ReconcileError> {
    tracing::info!(data_dir = %data_dir.display(), "Reconciling order log");
    let report = report(data_dir).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.is_clean() {
        tracing::info!("Order log and user histories agree");
        return Ok(());
    }

    Err(ReconcileError::Inconsistent {
        log_only: report.log_only.len(),
        history_only: report.history_only.len(),
    })
}

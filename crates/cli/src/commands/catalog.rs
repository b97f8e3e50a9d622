//! Catalog file validation.
//!
//! # Usage
//!
//! ```bash
//! bazaar-cli catalog check --path products.json
//! ```

use std::path::Path;

use bazaar_storefront::catalog::{CatalogError, CatalogIssue, check as check_products, read_products};
use thiserror::Error;

/// Errors that can occur while checking a catalog.
#[derive(Debug, Error)]
pub enum CatalogCheckError {
    /// The file could not be read or parsed.
    #[error("{0}")]
    Load(#[from] CatalogError),

    /// The catalog has problems.
    #[error("{0} catalog issue(s) found")]
    Issues(usize),
}

/// Issues found in the catalog at `path`.
///
/// # Errors
///
/// Returns `CatalogCheckError::Load` if the file cannot be read or parsed.
pub fn issues(path: &Path) -> Result<Vec<CatalogIssue>, CatalogCheckError> {
    let products = read_products(path)?;
    tracing::info!(path = %path.display(), products = products.len(), "Checking catalog");
    Ok(check_products(&products))
}

/// Log every issue and fail if there was any.
///
/// # Errors
///
/// Returns `CatalogCheckError::Issues` when the catalog is not clean.
pub fn check(path: &Path) -> Result<(), CatalogCheckError> {
    let found = issues(path)?;
    for issue in &found {
        tracing::warn!("{issue}");
    }

    if found.is_empty() {
        tracing::info!("Catalog OK");
        Ok(())
    } else {
        Err(CatalogCheckError::Issues(found.len()))
    }
}

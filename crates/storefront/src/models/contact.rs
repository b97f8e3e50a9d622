//! Contact form submissions.

use serde::{Deserialize, Serialize};

/// One entry in `responses.json`.
///
/// Fields are stored as submitted; missing ones are kept as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactResponse {
    pub full_name: Option<String>,
    pub email_address: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

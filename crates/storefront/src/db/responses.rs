//! Contact form submissions over `responses.json`.

use super::{Document, RepositoryError};
use crate::models::ContactResponse;

pub struct ResponseRepository<'a> {
    doc: &'a Document<Vec<ContactResponse>>,
}

impl<'a> ResponseRepository<'a> {
    #[must_use]
    pub const fn new(doc: &'a Document<Vec<ContactResponse>>) -> Self {
        Self { doc }
    }

    /// Append a submission.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Io` if the document cannot be written.
    pub async fn append(&self, response: ContactResponse) -> Result<(), RepositoryError> {
        self.doc
            .update(|responses| {
                responses.push(response);
                Ok(())
            })
            .await
    }

    /// All submissions, oldest first.
    pub async fn list(&self) -> Vec<ContactResponse> {
        self.doc.snapshot().await
    }
}

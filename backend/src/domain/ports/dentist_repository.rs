//! Port for dentist persistence.

use async_trait::async_trait;
use pagination::Page;

use crate::domain::{Dentist, DentistDetails, DentistId, DentistListQuery};

use super::define_port_error;

define_port_error! {
    /// Errors raised by dentist repository adapters.
    pub enum DentistRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "dentist repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "dentist repository query failed: {message}",
    }
}

/// Storage for dentist records.
///
/// Listing applies the query's filters before counting, so the page total
/// reflects matching dentists only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DentistRepository: Send + Sync {
    /// Persist a new dentist.
    async fn insert(&self, dentist: &Dentist) -> Result<(), DentistRepositoryError>;

    /// Fetch a dentist by identifier.
    async fn find_by_id(&self, id: &DentistId) -> Result<Option<Dentist>, DentistRepositoryError>;

    /// Fetch a dentist with the number of bookings referencing it.
    async fn find_details(
        &self,
        id: &DentistId,
    ) -> Result<Option<DentistDetails>, DentistRepositoryError>;

    /// Overwrite a stored dentist. Returns `false` when it no longer exists.
    async fn update(&self, dentist: &Dentist) -> Result<bool, DentistRepositoryError>;

    /// Remove a dentist. Returns `false` when it did not exist.
    async fn delete(&self, id: &DentistId) -> Result<bool, DentistRepositoryError>;

    /// Filter, sort, and page dentists.
    async fn list(&self, query: &DentistListQuery) -> Result<Page<Dentist>, DentistRepositoryError>;
}

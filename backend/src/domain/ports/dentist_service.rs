//! Driving port for the dentist directory.

use async_trait::async_trait;
use pagination::Page;

use crate::domain::{
    Dentist, DentistDetails, DentistDraft, DentistId, DentistListQuery, DentistPatch, Error,
};

/// Domain use-case port for dentists. Role checks happen before these calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DentistService: Send + Sync {
    /// Filter, sort, and page the directory.
    async fn list_dentists(&self, query: &DentistListQuery) -> Result<Page<Dentist>, Error>;

    /// Fetch one dentist with its booking count.
    async fn get_dentist(&self, id: &DentistId) -> Result<DentistDetails, Error>;

    /// Add a dentist.
    async fn create_dentist(&self, draft: DentistDraft) -> Result<Dentist, Error>;

    /// Change some fields of a dentist.
    async fn update_dentist(&self, id: &DentistId, patch: DentistPatch) -> Result<Dentist, Error>;

    /// Remove a dentist and all of its bookings.
    async fn delete_dentist(&self, id: &DentistId) -> Result<(), Error>;
}

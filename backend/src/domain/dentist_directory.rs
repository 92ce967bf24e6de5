//! Dentist directory service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::Page;
use tracing::info;

use crate::domain::booking_ledger::{dentist_not_found, map_dentist_error};
use crate::domain::ports::{BookingService, DentistRepository, DentistService};
use crate::domain::{
    Dentist, DentistDetails, DentistDraft, DentistId, DentistListQuery, DentistPatch, Error,
};

/// Dentist directory implementing [`DentistService`].
///
/// Deleting a dentist first asks the booking ledger to remove its bookings.
#[derive(Clone)]
pub struct DentistDirectory<D, L> {
    dentists: Arc<D>,
    ledger: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<D, L> DentistDirectory<D, L> {
    /// Create a new directory.
    pub fn new(dentists: Arc<D>, ledger: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self {
            dentists,
            ledger,
            clock,
        }
    }
}

#[async_trait]
impl<D, L> DentistService for DentistDirectory<D, L>
where
    D: DentistRepository,
    L: BookingService,
{
    async fn list_dentists(&self, query: &DentistListQuery) -> Result<Page<Dentist>, Error> {
        self.dentists.list(query).await.map_err(map_dentist_error)
    }

    async fn get_dentist(&self, id: &DentistId) -> Result<DentistDetails, Error> {
        self.dentists
            .find_details(id)
            .await
            .map_err(map_dentist_error)?
            .ok_or_else(|| dentist_not_found(id))
    }

    async fn create_dentist(&self, draft: DentistDraft) -> Result<Dentist, Error> {
        let dentist = Dentist::from_draft(DentistId::random(), draft, self.clock.utc());
        self.dentists
            .insert(&dentist)
            .await
            .map_err(map_dentist_error)?;
        info!(dentist_id = %dentist.id, "dentist created");
        Ok(dentist)
    }

    async fn update_dentist(&self, id: &DentistId, patch: DentistPatch) -> Result<Dentist, Error> {
        let mut dentist = self
            .dentists
            .find_by_id(id)
            .await
            .map_err(map_dentist_error)?
            .ok_or_else(|| dentist_not_found(id))?;
        dentist.apply(patch, self.clock.utc());
        if self
            .dentists
            .update(&dentist)
            .await
            .map_err(map_dentist_error)?
        {
            Ok(dentist)
        } else {
            Err(dentist_not_found(id))
        }
    }

    async fn delete_dentist(&self, id: &DentistId) -> Result<(), Error> {
        if self
            .dentists
            .find_by_id(id)
            .await
            .map_err(map_dentist_error)?
            .is_none()
        {
            return Err(dentist_not_found(id));
        }
        self.ledger.cascade_delete_for_dentist(id).await?;
        if self.dentists.delete(id).await.map_err(map_dentist_error)? {
            info!(dentist_id = %id, "dentist deleted");
            Ok(())
        } else {
            Err(dentist_not_found(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockBookingService, MockDentistRepository};
    use chrono::Utc;
    use mockable::DefaultClock;
    use mockall::Sequence;
    use rstest::rstest;

    fn make_directory(
        dentists: MockDentistRepository,
        ledger: MockBookingService,
    ) -> DentistDirectory<MockDentistRepository, MockBookingService> {
        DentistDirectory::new(Arc::new(dentists), Arc::new(ledger), Arc::new(DefaultClock))
    }

    fn stored_dentist() -> Dentist {
        let draft = DentistDraft::try_from_parts("Dr. Anan", 8, "Orthodontics").expect("draft");
        Dentist::from_draft(DentistId::random(), draft, Utc::now())
    }

    #[rstest]
    #[tokio::test]
    async fn delete_cascades_bookings_before_dentist() {
        let dentist = stored_dentist();
        let id = dentist.id;
        let mut seq = Sequence::new();
        let mut dentists = MockDentistRepository::new();
        let mut ledger = MockBookingService::new();
        dentists
            .expect_find_by_id()
            .returning(move |_| Ok(Some(dentist.clone())));
        ledger
            .expect_cascade_delete_for_dentist()
            .withf(move |target| *target == id)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(2));
        dentists
            .expect_delete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));

        let directory = make_directory(dentists, ledger);

        directory.delete_dentist(&id).await.expect("deleted");
    }

    #[rstest]
    #[tokio::test]
    async fn delete_of_unknown_dentist_is_not_found() {
        let mut dentists = MockDentistRepository::new();
        dentists.expect_find_by_id().returning(|_| Ok(None));
        let mut ledger = MockBookingService::new();
        ledger.expect_cascade_delete_for_dentist().never();

        let directory = make_directory(dentists, ledger);

        let error = directory
            .delete_dentist(&DentistId::random())
            .await
            .expect_err("missing");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn update_bumps_updated_at_and_keeps_other_fields() {
        let dentist = stored_dentist();
        let id = dentist.id;
        let created_at = dentist.created_at;
        let mut dentists = MockDentistRepository::new();
        dentists
            .expect_find_by_id()
            .returning(move |_| Ok(Some(dentist.clone())));
        dentists
            .expect_update()
            .withf(|d| d.expertise == "Orthodontics" && d.experience_years == 9)
            .returning(|_| Ok(true));

        let directory = make_directory(dentists, MockBookingService::new());
        let patch = DentistPatch::try_from_parts(None, Some(9), None).expect("patch");

        let updated = directory.update_dentist(&id, patch).await.expect("updated");
        assert_eq!(updated.name, "Dr. Anan");
        assert_eq!(updated.created_at, created_at);
        assert!(updated.updated_at >= created_at);
    }

    #[rstest]
    #[tokio::test]
    async fn get_returns_booking_count() {
        let dentist = stored_dentist();
        let id = dentist.id;
        let mut dentists = MockDentistRepository::new();
        dentists.expect_find_details().returning(move |_| {
            Ok(Some(DentistDetails {
                dentist: dentist.clone(),
                booking_count: 4,
            }))
        });

        let directory = make_directory(dentists, MockBookingService::new());

        let details = directory.get_dentist(&id).await.expect("found");
        assert_eq!(details.booking_count, 4);
    }
}

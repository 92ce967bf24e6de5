//! In-memory implementation of the user, dentist, and booking repositories.
//!
//! Used when no database URL is configured and by integration tests. All
//! three ports share one [`InMemoryStore`] so joins and the booking cap see a
//! consistent snapshot: every operation runs under a single mutex, which makes
//! the cap check and the insert one atomic step.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use pagination::Page;

use crate::domain::ports::{
    BookingRepository, BookingRepositoryError, DentistRepository, DentistRepositoryError,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Booking, BookingId, BookingScope, BookingView, Dentist, DentistDetails, DentistId,
    DentistListQuery, DentistSummary, ProfileUpdate, User, UserBookingEntry, UserCredentials,
    UserId,
};

#[derive(Debug, Default)]
struct State {
    users: Vec<UserCredentials>,
    dentists: Vec<Dentist>,
    bookings: Vec<Booking>,
}

impl State {
    fn dentist(&self, id: &DentistId) -> Option<&Dentist> {
        self.dentists.iter().find(|dentist| dentist.id == *id)
    }

    fn view(&self, booking: &Booking) -> Option<BookingView> {
        self.dentist(&booking.dentist).map(|dentist| BookingView {
            booking: booking.clone(),
            dentist: dentist.summary(),
        })
    }

    fn user_mut(&mut self, id: &UserId) -> Option<&mut UserCredentials> {
        self.users.iter_mut().find(|stored| stored.user.id == *id)
    }
}

/// Shared in-memory store. Cloning yields another handle to the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<E>(&self, poisoned: impl FnOnce(&'static str) -> E) -> Result<MutexGuard<'_, State>, E> {
        self.state
            .lock()
            .map_err(|_| poisoned("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: &User, password_hash: &str) -> Result<(), UserPersistenceError> {
        let mut state = self.lock(UserPersistenceError::query)?;
        if state.users.iter().any(|stored| stored.user.email == user.email) {
            return Err(UserPersistenceError::duplicate_email(user.email.to_string()));
        }
        if state
            .users
            .iter()
            .any(|stored| stored.user.telephone_number == user.telephone_number)
        {
            return Err(UserPersistenceError::duplicate_telephone(
                user.telephone_number.to_string(),
            ));
        }
        state.users.push(UserCredentials {
            user: user.clone(),
            password_hash: password_hash.to_owned(),
        });
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock(UserPersistenceError::query)?;
        Ok(state
            .users
            .iter()
            .find(|stored| stored.user.id == *id)
            .map(|stored| stored.user.clone()))
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let state = self.lock(UserPersistenceError::query)?;
        Ok(state
            .users
            .iter()
            .find(|stored| AsRef::<str>::as_ref(&stored.user.email) == email)
            .cloned())
    }

    async fn find_credentials_by_id(
        &self,
        id: &UserId,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let state = self.lock(UserPersistenceError::query)?;
        Ok(state
            .users
            .iter()
            .find(|stored| stored.user.id == *id)
            .cloned())
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut state = self.lock(UserPersistenceError::query)?;
        if let Some(phone) = update.telephone_number.as_ref()
            && state
                .users
                .iter()
                .any(|stored| stored.user.id != *id && stored.user.telephone_number == *phone)
        {
            return Err(UserPersistenceError::duplicate_telephone(phone.to_string()));
        }
        let Some(stored) = state.user_mut(id) else {
            return Ok(None);
        };
        if let Some(name) = update.name.as_ref() {
            stored.user.name = name.clone();
        }
        if let Some(phone) = update.telephone_number.as_ref() {
            stored.user.telephone_number = phone.clone();
        }
        Ok(Some(stored.user.clone()))
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), UserPersistenceError> {
        let mut state = self.lock(UserPersistenceError::query)?;
        let stored = state
            .user_mut(id)
            .ok_or_else(|| UserPersistenceError::query("user not found"))?;
        password_hash.clone_into(&mut stored.password_hash);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.lock(UserPersistenceError::query)?;
        Ok(state.users.iter().map(|stored| stored.user.clone()).collect())
    }
}

#[async_trait]
impl DentistRepository for InMemoryStore {
    async fn insert(&self, dentist: &Dentist) -> Result<(), DentistRepositoryError> {
        let mut state = self.lock(DentistRepositoryError::query)?;
        state.dentists.push(dentist.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &DentistId) -> Result<Option<Dentist>, DentistRepositoryError> {
        let state = self.lock(DentistRepositoryError::query)?;
        Ok(state.dentist(id).cloned())
    }

    async fn find_details(
        &self,
        id: &DentistId,
    ) -> Result<Option<DentistDetails>, DentistRepositoryError> {
        let state = self.lock(DentistRepositoryError::query)?;
        Ok(state.dentist(id).map(|dentist| DentistDetails {
            dentist: dentist.clone(),
            booking_count: state
                .bookings
                .iter()
                .filter(|booking| booking.dentist == *id)
                .count() as u64,
        }))
    }

    async fn update(&self, dentist: &Dentist) -> Result<bool, DentistRepositoryError> {
        let mut state = self.lock(DentistRepositoryError::query)?;
        match state.dentists.iter_mut().find(|stored| stored.id == dentist.id) {
            Some(stored) => {
                *stored = dentist.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &DentistId) -> Result<bool, DentistRepositoryError> {
        let mut state = self.lock(DentistRepositoryError::query)?;
        let before = state.dentists.len();
        state.dentists.retain(|dentist| dentist.id != *id);
        // Mirrors the ON DELETE CASCADE foreign key of the SQL schema.
        state.bookings.retain(|booking| booking.dentist != *id);
        Ok(state.dentists.len() != before)
    }

    async fn list(&self, query: &DentistListQuery) -> Result<Page<Dentist>, DentistRepositoryError> {
        let state = self.lock(DentistRepositoryError::query)?;
        let mut matching: Vec<&Dentist> = state
            .dentists
            .iter()
            .filter(|dentist| query.matches(dentist))
            .collect();
        matching.sort_by(|a, b| query.compare(a, b));
        let total = matching.len() as u64;
        let offset = usize::try_from(query.page.offset()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(query.page.limit() as usize)
            .cloned()
            .collect();
        Ok(Page::new(items, total, query.page))
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn insert(&self, booking: &Booking) -> Result<BookingView, BookingRepositoryError> {
        let mut state = self.lock(BookingRepositoryError::query)?;
        let Some(dentist) = state.dentist(&booking.dentist).map(Dentist::summary) else {
            return Err(BookingRepositoryError::dentist_missing(
                booking.dentist.to_string(),
            ));
        };
        if !booking.cap_exempt
            && state
                .bookings
                .iter()
                .any(|existing| existing.user == booking.user && !existing.cap_exempt)
        {
            return Err(BookingRepositoryError::duplicate_booking(
                booking.user.to_string(),
            ));
        }
        state.bookings.push(booking.clone());
        Ok(BookingView {
            booking: booking.clone(),
            dentist,
        })
    }

    async fn find_by_id(
        &self,
        id: &BookingId,
    ) -> Result<Option<BookingView>, BookingRepositoryError> {
        let state = self.lock(BookingRepositoryError::query)?;
        Ok(state
            .bookings
            .iter()
            .find(|booking| booking.id == *id)
            .and_then(|booking| state.view(booking)))
    }

    async fn list(&self, scope: BookingScope) -> Result<Vec<BookingView>, BookingRepositoryError> {
        let state = self.lock(BookingRepositoryError::query)?;
        Ok(state
            .bookings
            .iter()
            .filter(|booking| match scope {
                BookingScope::Owner(user) => booking.user == user,
                BookingScope::All { dentist: Some(dentist) } => booking.dentist == dentist,
                BookingScope::All { dentist: None } => true,
            })
            .filter_map(|booking| state.view(booking))
            .collect())
    }

    async fn update(
        &self,
        booking: &Booking,
    ) -> Result<Option<BookingView>, BookingRepositoryError> {
        let mut state = self.lock(BookingRepositoryError::query)?;
        let Some(dentist) = state.dentist(&booking.dentist).map(Dentist::summary) else {
            return Err(BookingRepositoryError::dentist_missing(
                booking.dentist.to_string(),
            ));
        };
        let Some(stored) = state.bookings.iter_mut().find(|stored| stored.id == booking.id)
        else {
            return Ok(None);
        };
        stored.booking_date = booking.booking_date;
        stored.dentist = booking.dentist;
        Ok(Some(BookingView {
            booking: stored.clone(),
            dentist,
        }))
    }

    async fn delete(&self, id: &BookingId) -> Result<bool, BookingRepositoryError> {
        let mut state = self.lock(BookingRepositoryError::query)?;
        let before = state.bookings.len();
        state.bookings.retain(|booking| booking.id != *id);
        Ok(state.bookings.len() != before)
    }

    async fn delete_for_dentist(&self, dentist: &DentistId) -> Result<u64, BookingRepositoryError> {
        let mut state = self.lock(BookingRepositoryError::query)?;
        let before = state.bookings.len();
        state.bookings.retain(|booking| booking.dentist != *dentist);
        Ok((before - state.bookings.len()) as u64)
    }

    async fn list_for_users(
        &self,
        users: &[UserId],
    ) -> Result<Vec<(UserId, UserBookingEntry)>, BookingRepositoryError> {
        let state = self.lock(BookingRepositoryError::query)?;
        Ok(state
            .bookings
            .iter()
            .filter(|booking| users.contains(&booking.user))
            .filter_map(|booking| {
                let dentist: DentistSummary = state.dentist(&booking.dentist)?.summary();
                Some((
                    booking.user,
                    UserBookingEntry {
                        id: booking.id,
                        booking_date: booking.booking_date,
                        dentist_id: dentist.id,
                        dentist_name: dentist.name,
                    },
                ))
            })
            .collect())
    }
}

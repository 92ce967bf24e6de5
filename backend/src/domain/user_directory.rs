//! Admin view of accounts with their bookings joined in.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    BookingRepository, BookingRepositoryError, UserDirectoryQuery, UserPersistenceError,
    UserRepository,
};
use crate::domain::{Error, User, UserBookingEntry, UserId, UserWithBookings};

/// User directory implementing [`UserDirectoryQuery`].
#[derive(Clone)]
pub struct UserDirectory<U, B> {
    users: Arc<U>,
    bookings: Arc<B>,
}

impl<U, B> UserDirectory<U, B> {
    /// Create a new directory.
    pub fn new(users: Arc<U>, bookings: Arc<B>) -> Self {
        Self { users, bookings }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        other => Error::internal(format!("user repository error: {other}")),
    }
}

fn map_booking_error(error: BookingRepositoryError) -> Error {
    match error {
        BookingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("booking repository unavailable: {message}"))
        }
        other => Error::internal(format!("booking repository error: {other}")),
    }
}

impl<U, B> UserDirectory<U, B>
where
    U: UserRepository,
    B: BookingRepository,
{
    async fn attach_bookings(&self, users: Vec<User>) -> Result<Vec<UserWithBookings>, Error> {
        let ids: Vec<UserId> = users.iter().map(|user| user.id).collect();
        let mut grouped: HashMap<UserId, Vec<UserBookingEntry>> = HashMap::new();
        for (owner, entry) in self
            .bookings
            .list_for_users(&ids)
            .await
            .map_err(map_booking_error)?
        {
            grouped.entry(owner).or_default().push(entry);
        }
        Ok(users
            .into_iter()
            .map(|user| {
                let bookings = grouped.remove(&user.id).unwrap_or_default();
                UserWithBookings { user, bookings }
            })
            .collect())
    }
}

#[async_trait]
impl<U, B> UserDirectoryQuery for UserDirectory<U, B>
where
    U: UserRepository,
    B: BookingRepository,
{
    async fn list_users(&self) -> Result<Vec<UserWithBookings>, Error> {
        let users = self.users.list().await.map_err(map_user_error)?;
        self.attach_bookings(users).await
    }

    async fn get_user(&self, id: &UserId) -> Result<UserWithBookings, Error> {
        let user = self
            .users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("No user with the id of {id}")))?;
        self.attach_bookings(vec![user])
            .await?
            .pop()
            .ok_or_else(|| Error::internal("user vanished while joining bookings"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockBookingRepository, MockUserRepository};
    use crate::domain::{BookingId, DentistId, Email, ErrorCode, Role, TelephoneNumber, UserName};
    use chrono::Utc;
    use rstest::rstest;

    fn user(name: &str, email: &str) -> User {
        User {
            id: UserId::random(),
            name: UserName::new(name).expect("name"),
            telephone_number: TelephoneNumber::new(format!("08{}", name.len())).expect("phone"),
            email: Email::new(email).expect("email"),
            role: Role::User,
            created_at: Utc::now(),
        }
    }

    fn entry(dentist_name: &str) -> UserBookingEntry {
        UserBookingEntry {
            id: BookingId::random(),
            booking_date: Utc::now(),
            dentist_id: DentistId::random(),
            dentist_name: dentist_name.to_owned(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn bookings_are_grouped_under_their_owner() {
        let ada = user("Ada", "ada@example.com");
        let grace = user("Grace", "grace@example.com");
        let ada_id = ada.id;
        let users_list = vec![ada, grace];
        let mut users = MockUserRepository::new();
        users
            .expect_list()
            .returning(move || Ok(users_list.clone()));
        let mut bookings = MockBookingRepository::new();
        bookings
            .expect_list_for_users()
            .withf(|ids| ids.len() == 2)
            .returning(move |_| Ok(vec![(ada_id, entry("Dr. Anan"))]));

        let directory = UserDirectory::new(Arc::new(users), Arc::new(bookings));

        let listed = directory.list_users().await.expect("listed");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].bookings.len(), 1);
        assert_eq!(listed[0].bookings[0].dentist_name, "Dr. Anan");
        assert!(listed[1].bookings.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));
        let mut bookings = MockBookingRepository::new();
        bookings.expect_list_for_users().never();

        let directory = UserDirectory::new(Arc::new(users), Arc::new(bookings));

        let error = directory
            .get_user(&UserId::random())
            .await
            .expect_err("missing");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }
}

//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    Email, ProfileUpdate, Role, TelephoneNumber, User, UserCredentials, UserId, UserName,
};

use super::diesel_basic_error_mapping::{
    ConstraintKind, map_basic_diesel_error, map_basic_pool_error, violated_constraint,
};
use super::models::{NewUserRow, UserProfileChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const EMAIL_CONSTRAINT: &str = "users_email_unique";
const TELEPHONE_CONSTRAINT: &str = "users_telephone_number_unique";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

/// Map Diesel errors, translating unique violations into duplicate errors
/// carrying the conflicting value.
fn map_diesel_error(
    error: diesel::result::Error,
    email: &str,
    telephone_number: &str,
) -> UserPersistenceError {
    match violated_constraint(&error) {
        Some((ConstraintKind::Unique, EMAIL_CONSTRAINT)) => {
            UserPersistenceError::duplicate_email(email)
        }
        Some((ConstraintKind::Unique, TELEPHONE_CONSTRAINT)) => {
            UserPersistenceError::duplicate_telephone(telephone_number)
        }
        _ => map_basic_diesel_error(
            error,
            UserPersistenceError::query,
            UserPersistenceError::connection,
        ),
    }
}

fn map_read_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn row_to_credentials(row: UserRow) -> Result<UserCredentials, UserPersistenceError> {
    let invalid = |err: crate::domain::UserValidationError| {
        UserPersistenceError::query(format!("stored user {} is invalid: {err}", row.id))
    };
    let user = User {
        id: UserId::from_uuid(row.id),
        name: UserName::new(&row.name).map_err(invalid)?,
        telephone_number: TelephoneNumber::new(&row.telephone_number).map_err(invalid)?,
        email: Email::new(&row.email).map_err(invalid)?,
        role: row.role.parse::<Role>().map_err(invalid)?,
        created_at: row.created_at,
    };
    Ok(UserCredentials {
        user,
        password_hash: row.password_hash,
    })
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    row_to_credentials(row).map(|credentials| credentials.user)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User, password_hash: &str) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let email: &str = user.email.as_ref();
        let telephone_number: &str = user.telephone_number.as_ref();
        let row = NewUserRow {
            id: *user.id.as_uuid(),
            name: user.name.as_ref(),
            telephone_number,
            email,
            role: user.role.as_str(),
            password_hash,
            created_at: user.created_at,
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, email, telephone_number))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_read_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_read_error)?;
        row.map(row_to_credentials).transpose()
    }

    async fn find_credentials_by_id(
        &self,
        id: &UserId,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_read_error)?;
        row.map(row_to_credentials).transpose()
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, UserPersistenceError> {
        if update.is_empty() {
            return self.find_by_id(id).await;
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let telephone_number: Option<&str> = update.telephone_number.as_ref().map(AsRef::as_ref);
        let changes = UserProfileChangeset {
            name: update.name.as_ref().map(AsRef::as_ref),
            telephone_number,
        };

        let row = diesel::update(users::table.find(id.as_uuid()))
            .set(&changes)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "", telephone_number.unwrap_or_default()))?;
        row.map(row_to_user).transpose()
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.find(id.as_uuid()))
            .set(users::password_hash.eq(password_hash))
            .execute(&mut conn)
            .await
            .map_err(map_read_error)?;
        if updated == 0 {
            return Err(UserPersistenceError::query("user not found"));
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .order((users::created_at.asc(), users::id.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_read_error)?;
        rows.into_iter().map(row_to_user).collect()
    }
}

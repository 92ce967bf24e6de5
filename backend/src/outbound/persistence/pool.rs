//! `bb8` pool of `diesel-async` PostgreSQL connections shared by the clinic
//! repositories, plus the liveness query behind `/health/ready`.

use std::time::Duration;

use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::define_port_error;

const DEFAULT_MAX_SIZE: u32 = 10;
const DEFAULT_MIN_IDLE: u32 = 2;
const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(30);

define_port_error! {
    /// Failures raised while opening, migrating, or borrowing from the pool.
    pub enum PoolError {
        /// No connection became free before the checkout timeout.
        Checkout { message: String } => "failed to get connection from pool: {message}",
        /// The pool could not be created from the configured URL.
        Build { message: String } => "failed to build connection pool: {message}",
        /// Embedded schema migrations did not apply.
        Migrate { message: String } => "failed to migrate clinic schema: {message}",
    }
}

impl PoolError {
    /// Message carried by any variant.
    pub fn message(&self) -> &str {
        match self {
            Self::Checkout { message } | Self::Build { message } | Self::Migrate { message } => {
                message
            }
        }
    }
}

/// Pool sizing and checkout limits.
///
/// The idle floor never exceeds the pool size, so a one-connection pool
/// (`CLINIC_POOL_SIZE=1`) still builds.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use clinic_backend::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://clinic@localhost/clinic")
///     .with_max_size(1)
///     .with_connection_timeout(Duration::from_secs(5));
/// assert_eq!(config.database_url(), "postgres://clinic@localhost/clinic");
/// assert_eq!(config.min_idle(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    connection_timeout: Duration,
}

impl PoolConfig {
    /// Defaults to 10 connections and a 30 second checkout timeout.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: DEFAULT_MAX_SIZE,
            connection_timeout: DEFAULT_CHECKOUT_TIMEOUT,
        }
    }

    /// Cap the pool at `max_size` connections; zero is raised to one.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size.max(1);
        self
    }

    /// Set how long a handler may wait for a free connection.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    /// Connections kept open while the clinic is idle.
    pub fn min_idle(&self) -> u32 {
        DEFAULT_MIN_IDLE.min(self.max_size)
    }
}

/// Cloneable handle to the connection pool.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Open the pool described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Build` when the URL is invalid or the initial
    /// idle connections cannot be opened.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(Some(config.min_idle()))
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;

        Ok(Self { inner: pool })
    }

    /// Borrow a connection for one repository call.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Checkout` if a connection cannot be obtained within
    /// the configured timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }

    /// Round-trip `SELECT 1` on a pooled connection.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Checkout` when no connection is available or the
    /// query fails.
    pub async fn ping(&self) -> Result<(), PoolError> {
        let mut conn = self.get().await?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map(drop)
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_match_the_server_pool_size() {
        let config = PoolConfig::new("postgres://localhost/clinic");

        assert_eq!(config.database_url(), "postgres://localhost/clinic");
        assert_eq!(config.max_size(), DEFAULT_MAX_SIZE);
        assert_eq!(config.min_idle(), DEFAULT_MIN_IDLE);
        assert_eq!(config.connection_timeout, DEFAULT_CHECKOUT_TIMEOUT);
    }

    #[rstest]
    #[case(0, 1, 1)]
    #[case(1, 1, 1)]
    #[case(20, 20, 2)]
    fn idle_floor_never_exceeds_pool_size(
        #[case] requested: u32,
        #[case] max_size: u32,
        #[case] min_idle: u32,
    ) {
        let config = PoolConfig::new("postgres://localhost/clinic").with_max_size(requested);

        assert_eq!(config.max_size(), max_size);
        assert_eq!(config.min_idle(), min_idle);
    }

    #[rstest]
    #[case(PoolError::checkout("connection refused"), "failed to get connection from pool: connection refused")]
    #[case(PoolError::migrate("relation exists"), "failed to migrate clinic schema: relation exists")]
    fn errors_render_their_stage(#[case] error: PoolError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    fn message_is_shared_across_variants() {
        assert_eq!(PoolError::build("bad url").message(), "bad url");
    }
}

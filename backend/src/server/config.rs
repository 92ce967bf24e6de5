//! Server settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `CLINIC_*` environment variables, and an
//! optional configuration file, in that order of precedence.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_POOL_SIZE: u32 = 10;

/// Process-level configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CLINIC")]
pub struct ServerSettings {
    /// Interface to bind; defaults to all interfaces.
    pub host: Option<IpAddr>,
    /// TCP port to bind.
    pub port: Option<u16>,
    /// PostgreSQL connection URL. Without one the process keeps its data in
    /// memory.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub pool_size: Option<u32>,
    /// Production mode marks the `token` cookie `Secure`.
    #[ortho_config(default = false)]
    pub production: bool,
}

impl ServerSettings {
    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    /// Connection pool size, falling back to the default.
    pub fn pool_size(&self) -> u32 {
        self.pool_size.unwrap_or(DEFAULT_POOL_SIZE)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "CLINIC_HOST",
        "CLINIC_PORT",
        "CLINIC_DATABASE_URL",
        "CLINIC_POOL_SIZE",
        "CLINIC_PRODUCTION",
    ];

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("clinic-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_bind_all_interfaces_in_memory() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "0.0.0.0:5000".parse().expect("addr"));
        assert!(settings.database_url.is_none());
        assert_eq!(settings.pool_size(), DEFAULT_POOL_SIZE);
        assert!(!settings.production);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("CLINIC_HOST", Some("127.0.0.1".to_owned())),
            ("CLINIC_PORT", Some("8080".to_owned())),
            (
                "CLINIC_DATABASE_URL",
                Some("postgres://clinic@localhost/clinic".to_owned()),
            ),
            ("CLINIC_POOL_SIZE", Some("4".to_owned())),
            ("CLINIC_PRODUCTION", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "127.0.0.1:8080".parse().expect("addr"));
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://clinic@localhost/clinic")
        );
        assert_eq!(settings.pool_size(), 4);
        assert!(settings.production);
    }
}

//! Application settings loaded via OrthoConfig.
//!
//! Values come from `RENTAL_*` environment variables, an optional
//! configuration file, or command-line flags.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_CLIENT_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Identity provider details clients sign in against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySettings {
    /// Tenant domain.
    pub domain: String,
    /// Client identifier.
    pub client_id: String,
    /// Audience for API access tokens, if one is registered.
    pub audience: Option<String>,
}

/// Incomplete identity provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("identity provider setting {missing} is required when {present} is set")]
pub struct IdentitySettingsError {
    /// Variable that is absent or blank.
    pub missing: &'static str,
    /// Variable whose presence requires it.
    pub present: &'static str,
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

/// Runtime configuration for the backend binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RENTAL")]
pub struct AppSettings {
    /// PostgreSQL connection string. Required at start-up.
    pub database_url: Option<String>,
    /// Listening port.
    pub port: Option<u16>,
    /// Listening address.
    pub bind_host: Option<IpAddr>,
    /// Browser origin allowed by CORS.
    pub client_origin: Option<String>,
    /// Identity provider tenant domain. Bearer tokens are not verified here.
    pub identity_domain: Option<String>,
    /// Identity provider client identifier.
    pub identity_client_id: Option<String>,
    /// Audience requested for API access tokens.
    pub identity_audience: Option<String>,
    /// JSON file of residency payloads loaded into an empty store.
    pub seed_path: Option<PathBuf>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
}

impl AppSettings {
    /// Configured database URL, if any.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Address the HTTP server binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.bind_host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    /// Origin allowed to call the API with credentials.
    pub fn client_origin(&self) -> &str {
        self.client_origin
            .as_deref()
            .unwrap_or(DEFAULT_CLIENT_ORIGIN)
    }

    /// Connection pool ceiling.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Identity provider settings; `None` when none are configured.
    ///
    /// The domain and client id go together, and an audience needs both.
    ///
    /// # Errors
    /// [`IdentitySettingsError`] names the first missing variable of a
    /// partial configuration.
    pub fn identity(&self) -> Result<Option<IdentitySettings>, IdentitySettingsError> {
        const DOMAIN: &str = "RENTAL_IDENTITY_DOMAIN";
        const CLIENT_ID: &str = "RENTAL_IDENTITY_CLIENT_ID";
        const AUDIENCE: &str = "RENTAL_IDENTITY_AUDIENCE";

        let domain = non_blank(self.identity_domain.as_ref());
        let client_id = non_blank(self.identity_client_id.as_ref());
        let audience = non_blank(self.identity_audience.as_ref());
        match (domain, client_id) {
            (Some(domain), Some(client_id)) => Ok(Some(IdentitySettings {
                domain,
                client_id,
                audience,
            })),
            (Some(_), None) => Err(IdentitySettingsError {
                missing: CLIENT_ID,
                present: DOMAIN,
            }),
            (None, Some(_)) => Err(IdentitySettingsError {
                missing: DOMAIN,
                present: CLIENT_ID,
            }),
            (None, None) if audience.is_some() => Err(IdentitySettingsError {
                missing: DOMAIN,
                present: AUDIENCE,
            }),
            (None, None) => Ok(None),
        }
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "test code uses expect for clear failure messages")]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 9] = [
        "RENTAL_DATABASE_URL",
        "RENTAL_PORT",
        "RENTAL_BIND_HOST",
        "RENTAL_CLIENT_ORIGIN",
        "RENTAL_IDENTITY_DOMAIN",
        "RENTAL_IDENTITY_CLIENT_ID",
        "RENTAL_IDENTITY_AUDIENCE",
        "RENTAL_SEED_PATH",
        "RENTAL_POOL_MAX_SIZE",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("rental-backend")])
            .expect("config should load")
    }

    fn cleared_with(overrides: &[(&'static str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(cleared_with(&[]));

        let settings = load_from_empty_args();
        assert!(settings.database_url().is_none());
        assert_eq!(settings.bind_addr().port(), DEFAULT_PORT);
        assert!(settings.bind_addr().ip().is_unspecified());
        assert_eq!(settings.client_origin(), DEFAULT_CLIENT_ORIGIN);
        assert_eq!(settings.pool_max_size(), DEFAULT_POOL_MAX_SIZE);
        assert!(settings.seed_path.is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(cleared_with(&[
            ("RENTAL_DATABASE_URL", "postgres://localhost/rental"),
            ("RENTAL_PORT", "9000"),
            ("RENTAL_BIND_HOST", "127.0.0.1"),
            ("RENTAL_CLIENT_ORIGIN", "https://homyz.example"),
            ("RENTAL_SEED_PATH", "/tmp/residencies.json"),
            ("RENTAL_POOL_MAX_SIZE", "4"),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(settings.database_url(), Some("postgres://localhost/rental"));
        assert_eq!(
            settings.bind_addr(),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(settings.client_origin(), "https://homyz.example");
        assert_eq!(
            settings.seed_path,
            Some(PathBuf::from("/tmp/residencies.json"))
        );
        assert_eq!(settings.pool_max_size(), 4);
    }

    #[rstest]
    fn blank_database_url_reads_as_missing() {
        let _guard = lock_env(cleared_with(&[("RENTAL_DATABASE_URL", "   ")]));
        assert!(load_from_empty_args().database_url().is_none());
    }

    #[rstest]
    fn identity_is_absent_by_default() {
        let _guard = lock_env(cleared_with(&[]));
        assert_eq!(load_from_empty_args().identity(), Ok(None));
    }

    #[rstest]
    fn complete_identity_settings_are_trimmed() {
        let _guard = lock_env(cleared_with(&[
            ("RENTAL_IDENTITY_DOMAIN", " tenant.example "),
            ("RENTAL_IDENTITY_CLIENT_ID", "client-123"),
        ]));

        assert_eq!(
            load_from_empty_args().identity(),
            Ok(Some(IdentitySettings {
                domain: "tenant.example".to_owned(),
                client_id: "client-123".to_owned(),
                audience: None,
            }))
        );
    }

    #[rstest]
    #[case(&[("RENTAL_IDENTITY_DOMAIN", "tenant.example")], "RENTAL_IDENTITY_CLIENT_ID")]
    #[case(&[("RENTAL_IDENTITY_CLIENT_ID", "client-123")], "RENTAL_IDENTITY_DOMAIN")]
    #[case(&[("RENTAL_IDENTITY_AUDIENCE", "rental-api")], "RENTAL_IDENTITY_DOMAIN")]
    fn partial_identity_settings_are_rejected(
        #[case] overrides: &[(&'static str, &str)],
        #[case] missing: &str,
    ) {
        let _guard = lock_env(cleared_with(overrides));
        let err = load_from_empty_args()
            .identity()
            .expect_err("partial configuration");
        assert_eq!(err.missing, missing);
    }
}

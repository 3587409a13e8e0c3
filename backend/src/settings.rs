//! Application settings loaded via OrthoConfig.
//!
//! Every field can come from the command line, a config file or a
//! `FOCUS_*` environment variable. Absent values fall back to the defaults
//! exposed by the accessor methods.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_UPLOAD_PATH: &str = "./upload";

/// Runtime configuration for the forum server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FOCUS")]
pub struct AppSettings {
    /// Socket address the HTTP listener binds to.
    pub bind_addr: Option<SocketAddr>,
    /// Postgres connection string. Without it the in-memory store is used.
    pub database_url: Option<String>,
    /// Directory holding user uploads; avatars live under `avatar/`.
    pub upload_path: Option<PathBuf>,
    /// Upper bound on pooled database connections.
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
}

impl AppSettings {
    /// Return the listener address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)))
    }

    /// Return the database URL, treating a blank value as unset.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Return the upload directory, defaulting to `./upload`.
    pub fn upload_path(&self) -> &Path {
        self.upload_path
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_UPLOAD_PATH))
    }

    /// Return the pool size, never less than one connection.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.max(1)
    }
}

#[cfg(test)]
mod tests {
    //! Environment-driven settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("focus")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env([
            ("FOCUS_BIND_ADDR", None::<String>),
            ("FOCUS_DATABASE_URL", None::<String>),
            ("FOCUS_UPLOAD_PATH", None::<String>),
            ("FOCUS_DB_MAX_CONNECTIONS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080".parse().expect("addr"));
        assert_eq!(settings.database_url(), None);
        assert_eq!(settings.upload_path(), Path::new("./upload"));
        assert_eq!(settings.db_max_connections(), 10);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("FOCUS_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "FOCUS_DATABASE_URL",
                Some("postgres://focus@localhost/focus".to_owned()),
            ),
            ("FOCUS_UPLOAD_PATH", Some("/srv/focus/upload".to_owned())),
            ("FOCUS_DB_MAX_CONNECTIONS", Some("4".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "127.0.0.1:9000".parse().expect("addr"));
        assert_eq!(
            settings.database_url(),
            Some("postgres://focus@localhost/focus")
        );
        assert_eq!(settings.upload_path(), Path::new("/srv/focus/upload"));
        assert_eq!(settings.db_max_connections(), 4);
    }

    #[rstest]
    fn blank_database_url_means_in_memory() {
        let settings = AppSettings {
            bind_addr: None,
            database_url: Some("   ".to_owned()),
            upload_path: None,
            db_max_connections: 0,
        };
        assert_eq!(settings.database_url(), None);
        assert_eq!(settings.db_max_connections(), 1);
    }
}

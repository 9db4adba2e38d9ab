use std::fmt;
use std::time::Duration;

use crate::manifest::{DEFAULT_MANIFEST_URL, DbInfo};

/// Default MySQL port.
pub const DEFAULT_PORT: u16 = 3306;

/// Strings that stand in for a missing value in CHILDES exports.
pub const DEFAULT_MISSING_MARKERS: &[&str] = &["NA"];

/// Credentials and location of a CHILDES MySQL server.
///
/// `db_name` only applies to servers other than the hosted one; on the hosted
/// server the database is picked by resolving the requested version against
/// the manifest.
#[derive(Clone, PartialEq, Eq)]
pub struct DbArgs {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub db_name: Option<String>,
}

impl DbArgs {
    #[must_use]
    pub fn new(host: impl Into<String>, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            user: user.into(),
            password: password.into(),
            db_name: None,
        }
    }

    #[must_use]
    pub fn builder(host: impl Into<String>) -> DbArgsBuilder {
        DbArgsBuilder::new(host)
    }
}

// Keeps the password out of logs.
impl fmt::Debug for DbArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbArgs")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("db_name", &self.db_name)
            .finish()
    }
}

impl From<&DbInfo> for DbArgs {
    fn from(info: &DbInfo) -> Self {
        DbArgs::new(&info.host, &info.user, &info.password)
    }
}

/// Fluent builder for `DbArgs`.
#[derive(Debug, Clone)]
pub struct DbArgsBuilder {
    args: DbArgs,
}

impl DbArgsBuilder {
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            args: DbArgs::new(host, "", ""),
        }
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.args.port = port;
        self
    }

    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.args.user = user.into();
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.args.password = password.into();
        self
    }

    #[must_use]
    pub fn db_name(mut self, db_name: impl Into<String>) -> Self {
        self.args.db_name = Some(db_name.into());
        self
    }

    #[must_use]
    pub fn finish(self) -> DbArgs {
        self.args
    }
}

/// Everything needed to open a connection to CHILDES.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// `"current"`, or a named version listed in the manifest
    pub db_version: String,
    /// Explicit server credentials; `None` uses the hosted server from the manifest
    pub db_args: Option<DbArgs>,
    pub manifest_url: String,
    pub connect_timeout: Duration,
    pub max_connections: u32,
    pub missing_markers: Vec<String>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            db_version: "current".to_string(),
            db_args: None,
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            max_connections: 2,
            missing_markers: default_missing_markers(),
        }
    }
}

impl ConnectOptions {
    #[must_use]
    pub fn builder() -> ConnectOptionsBuilder {
        ConnectOptionsBuilder::default()
    }
}

/// Fluent builder for `ConnectOptions`.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptionsBuilder {
    opts: ConnectOptions,
}

impl ConnectOptionsBuilder {
    #[must_use]
    pub fn db_version(mut self, db_version: impl Into<String>) -> Self {
        self.opts.db_version = db_version.into();
        self
    }

    #[must_use]
    pub fn db_args(mut self, db_args: DbArgs) -> Self {
        self.opts.db_args = Some(db_args);
        self
    }

    #[must_use]
    pub fn manifest_url(mut self, url: impl Into<String>) -> Self {
        self.opts.manifest_url = url.into();
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.opts.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn max_connections(mut self, max_connections: u32) -> Self {
        self.opts.max_connections = max_connections.max(1);
        self
    }

    #[must_use]
    pub fn missing_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opts.missing_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn finish(self) -> ConnectOptions {
        self.opts
    }
}

/// Options for opening a local `SQLite` mirror.
#[derive(Debug, Clone)]
pub struct SqliteOptions {
    pub db_path: String,
    pub missing_markers: Vec<String>,
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            missing_markers: default_missing_markers(),
        }
    }

    #[must_use]
    pub fn builder(db_path: impl Into<String>) -> SqliteOptionsBuilder {
        SqliteOptionsBuilder {
            opts: SqliteOptions::new(db_path),
        }
    }
}

/// Fluent builder for `SqliteOptions`.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn missing_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opts.missing_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }
}

fn default_missing_markers() -> Vec<String> {
    DEFAULT_MISSING_MARKERS
        .iter()
        .map(|m| (*m).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = ConnectOptions::default();
        assert_eq!(opts.db_version, "current");
        assert_eq!(opts.manifest_url, DEFAULT_MANIFEST_URL);
        assert_eq!(opts.missing_markers, vec!["NA".to_string()]);
        assert!(opts.db_args.is_none());
    }

    #[test]
    fn builder_keeps_explicit_args() {
        let args = DbArgs::builder("localhost")
            .user("me")
            .password("secret")
            .db_name("childes-2020.1")
            .finish();
        let opts = ConnectOptions::builder().db_args(args).finish();
        let args = opts.db_args.unwrap();
        assert_eq!(args.host, "localhost");
        assert_eq!(args.db_name.as_deref(), Some("childes-2020.1"));
    }

    #[test]
    fn debug_redacts_password() {
        let args = DbArgs::new("localhost", "me", "hunter2");
        let printed = format!("{args:?}");
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("<redacted>"));
    }
}

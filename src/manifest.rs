//! The hosted `childes-db.json` manifest and database-version resolution.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::DbArgs;
use crate::error::ChildesDbError;

pub const DEFAULT_MANIFEST_URL: &str = "https://childes-db.stanford.edu/childes-db.json";

/// Contents of the manifest: where the hosted server lives and which
/// database versions it serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbInfo {
    pub host: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    pub current: String,
    #[serde(default)]
    pub supported: Vec<String>,
    #[serde(default)]
    pub historical: Vec<String>,
}

/// Somewhere a `DbInfo` can be obtained from.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// Fetch the manifest.
    ///
    /// # Errors
    /// Returns an error if the manifest cannot be retrieved or decoded.
    async fn fetch(&self) -> Result<DbInfo, ChildesDbError>;
}

/// Manifest fetched over HTTP.
#[derive(Debug, Clone)]
pub struct HttpManifest {
    url: String,
    client: reqwest::Client,
}

impl HttpManifest {
    /// # Errors
    /// Returns `ChildesDbError::HttpError` if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ChildesDbError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ManifestSource for HttpManifest {
    async fn fetch(&self) -> Result<DbInfo, ChildesDbError> {
        debug!(url = %self.url, "fetching childes-db manifest");
        let info = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<DbInfo>()
            .await?;
        debug!(current = %info.current, "manifest fetched");
        Ok(info)
    }
}

/// A fixed manifest, for offline use and tests.
#[derive(Debug, Clone)]
pub struct StaticManifest(pub DbInfo);

#[async_trait]
impl ManifestSource for StaticManifest {
    async fn fetch(&self) -> Result<DbInfo, ChildesDbError> {
        Ok(self.0.clone())
    }
}

/// Fetch the manifest from the default URL.
///
/// # Errors
/// Returns `ChildesDbError::HttpError` or `ChildesDbError::JsonError` on failure.
pub async fn get_db_info() -> Result<DbInfo, ChildesDbError> {
    HttpManifest::new(DEFAULT_MANIFEST_URL, Duration::from_secs(10))?
        .fetch()
        .await
}

/// Pick the database name to connect to.
///
/// Against a server other than the hosted one, the caller's `db_name` is used
/// as is. Against the hosted server `"current"` maps to the manifest's current
/// version and supported versions map to themselves. Historical and unknown
/// versions are reported and yield `None`.
#[must_use]
pub fn translate_version(
    db_version: &str,
    db_args: Option<&DbArgs>,
    db_info: &DbInfo,
) -> Option<String> {
    if let Some(args) = db_args
        && args.host != db_info.host
    {
        if args.db_name.is_none() {
            info!(
                host = %args.host,
                "No database name given for a server that is not {}; specify db_name in db_args.",
                db_info.host
            );
        }
        return args.db_name.clone();
    }

    if db_version == "current" {
        let db_to_use = db_info.current.clone();
        info!("Using current database version: '{db_to_use}'.");
        Some(db_to_use)
    } else if db_info.supported.iter().any(|v| v == db_version) {
        info!("Using supported database version: '{db_version}'.");
        Some(db_version.to_string())
    } else if db_info.historical.iter().any(|v| v == db_version) {
        info!(
            "Version '{db_version}' is no longer hosted by {}; either specify a more recent \
             version or install MySQL Server locally and update db_args.",
            db_info.host
        );
        None
    } else {
        info!("Version '{db_version}' is not a recognised childes-db version.");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> DbInfo {
        serde_json::from_str(
            r#"{
                "host": "childes-db.stanford.edu",
                "user": "childesdb",
                "password": "tiger",
                "current": "2021.1",
                "supported": ["2021.1", "2020.1"],
                "historical": ["2018.1"]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn current_resolves_to_manifest_current() {
        assert_eq!(translate_version("current", None, &info()).as_deref(), Some("2021.1"));
    }

    #[test]
    fn supported_and_historical() {
        assert_eq!(translate_version("2020.1", None, &info()).as_deref(), Some("2020.1"));
        assert_eq!(translate_version("2018.1", None, &info()), None);
        assert_eq!(translate_version("1999.9", None, &info()), None);
    }

    #[test]
    fn hosted_args_still_use_manifest_versions() {
        let hosted = DbArgs::from(&info());
        assert_eq!(
            translate_version("current", Some(&hosted), &info()).as_deref(),
            Some("2021.1")
        );
    }

    #[test]
    fn other_hosts_use_their_own_db_name() {
        let local = DbArgs::builder("localhost").db_name("childes_local").finish();
        assert_eq!(
            translate_version("current", Some(&local), &info()).as_deref(),
            Some("childes_local")
        );
        let unnamed = DbArgs::new("localhost", "me", "pw");
        assert_eq!(translate_version("current", Some(&unnamed), &info()), None);
    }

    #[test]
    fn manifest_lists_are_optional() {
        let parsed: DbInfo =
            serde_json::from_str(r#"{"host": "h", "current": "2022.1"}"#).unwrap();
        assert!(parsed.supported.is_empty());
        assert!(parsed.historical.is_empty());
    }

    #[tokio::test]
    async fn static_manifest_returns_its_value() {
        let source = StaticManifest(info());
        assert_eq!(source.fetch().await.unwrap(), info());
    }
}

//! Remote descriptor repository client
//!
//! Plain HTTP GET against the canonical repository layout:
//! `<base>/<group-path>/<artifact>/<version>/<artifact>-<version>.<ext>`,
//! with `<base>/<group-path>/<artifact>/<metadata>` for latest-version
//! discovery. Every request is bounded by connect and overall timeouts so a
//! scan never hangs on a single repository.

use crate::config::schema::RemoteConfig;
use crate::descriptor::{synthetic_descriptor, Coordinate};
use crate::error::{DescantError, DescantResult};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client for one configured remote descriptor repository
#[derive(Clone)]
pub struct RemoteRepository {
    base_url: String,
    descriptor_ext: String,
    metadata_filename: String,
    agent: ureq::Agent,
}

impl RemoteRepository {
    /// Build a client from remote settings
    pub fn new(config: &RemoteConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_connect(Some(Duration::from_secs(config.connect_timeout_secs)))
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            descriptor_ext: config.descriptor_ext.clone(),
            metadata_filename: config.metadata_filename.clone(),
            agent: ureq::Agent::new_with_config(agent_config),
        }
    }

    /// Canonical URL of a descriptor document
    pub fn descriptor_url(&self, coordinate: &Coordinate) -> String {
        format!(
            "{}/{}/{}/{}/{}-{}.{}",
            self.base_url,
            coordinate.group_path(),
            coordinate.artifact,
            coordinate.version,
            coordinate.artifact,
            coordinate.version,
            self.descriptor_ext
        )
    }

    /// URL of the per-artifact version-metadata document
    pub fn metadata_url(&self, coordinate: &Coordinate) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            coordinate.group_path(),
            coordinate.artifact,
            self.metadata_filename
        )
    }

    /// Fetch a descriptor, retrying against the published latest version
    /// when the exact version is not served.
    pub fn fetch(&self, coordinate: &Coordinate) -> DescantResult<String> {
        let url = self.descriptor_url(coordinate);
        match self.get(&url) {
            Ok(body) => Ok(body),
            Err(err) => {
                debug!("Exact-version fetch failed ({}), trying latest", err);
                let latest = self.latest_version(coordinate)?;
                let retry = Coordinate::new(&coordinate.group, &coordinate.artifact, latest);
                self.get(&self.descriptor_url(&retry))
            }
        }
    }

    /// Fetch a descriptor, degrading to the synthetic placeholder when both
    /// the exact version and the latest-version retry fail. Never fails, so
    /// the model builder always receives a parseable document.
    pub fn fetch_or_placeholder(&self, coordinate: &Coordinate) -> String {
        match self.fetch(coordinate) {
            Ok(body) => body,
            Err(err) => {
                warn!("Substituting placeholder for {}: {}", coordinate, err);
                synthetic_descriptor(coordinate)
            }
        }
    }

    /// Query the version-metadata document for the latest published version
    pub fn latest_version(&self, coordinate: &Coordinate) -> DescantResult<String> {
        let url = self.metadata_url(coordinate);
        let body = self.get(&url)?;
        parse_latest(&body).ok_or_else(|| DescantError::NoLatestVersion {
            coordinate: coordinate.to_string(),
        })
    }

    fn get(&self, url: &str) -> DescantResult<String> {
        debug!("GET {}", url);
        let mut response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| DescantError::remote(url, e.to_string()))?;
        response
            .body_mut()
            .read_to_string()
            .map_err(|e| DescantError::remote(url, e.to_string()))
    }
}

impl fmt::Debug for RemoteRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteRepository")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Extract the `<latest>` tag from a line-oriented metadata document
pub fn parse_latest(metadata: &str) -> Option<String> {
    for line in metadata.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("<latest>") {
            if let Some(version) = rest.strip_suffix("</latest>") {
                let version = version.trim();
                if !version.is_empty() {
                    return Some(version.to_string());
                }
            }
        }
    }
    None
}

//! Configuration for forge API connections.
use secrecy::SecretString;

use crate::forge::types::PullRequestSource;

/// Default REST API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";
/// Page size used for every list endpoint.
pub const DEFAULT_PAGE_SIZE: u8 = 100;
/// Prefix placed in front of the version to form the release tag.
pub const TAG_PREFIX: &str = "v";

/// Remote repository connection configuration.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// REST API root (e.g. "https://api.github.com").
    pub api_url: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Access token for authentication.
    pub token: SecretString,
    /// Where pull requests for a milestone are looked up.
    pub pull_request_source: PullRequestSource,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            owner: "".to_string(),
            repo: "".to_string(),
            token: SecretString::from("".to_string()),
            pull_request_source: PullRequestSource::default(),
        }
    }
}

//! Access token resolution from injected credentials.
use log::*;
use secrecy::SecretString;
use serde::Deserialize;
use std::{fs, path::Path};

use crate::{ReleaseError, Result};

/// Default location of the credentials file mounted by the CI server.
pub const DEFAULT_CREDENTIALS_PATH: &str = "/credentials/github_api_token.json";

const MISSING_CREDENTIALS: &str = "configure this extension as trusted and inject credentials of type github-api-token";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTokenCredentials {
    #[allow(unused)]
    name: String,
    #[serde(rename = "type", default)]
    #[allow(unused)]
    kind: String,
    additional_properties: ApiTokenProperties,
}

#[derive(Debug, Deserialize)]
struct ApiTokenProperties {
    token: String,
}

/// Read the first token from a credentials file.
pub fn load_token_file(path: &Path) -> Result<SecretString> {
    if !path.exists() {
        return Err(ReleaseError::MissingCredentials(format!(
            "no credentials file at {}; {MISSING_CREDENTIALS}",
            path.display()
        )));
    }

    info!("reading credentials from file at path {}", path.display());

    let content = fs::read_to_string(path).map_err(|e| {
        ReleaseError::MissingCredentials(format!(
            "failed reading credential file at path {}: {e}",
            path.display()
        ))
    })?;

    let credentials: Vec<ApiTokenCredentials> = serde_json::from_str(&content)?;

    credentials
        .into_iter()
        .next()
        .map(|c| SecretString::from(c.additional_properties.token))
        .ok_or_else(|| ReleaseError::MissingCredentials(MISSING_CREDENTIALS.into()))
}

/// An explicit token wins over the credentials file.
pub fn resolve_token(
    explicit: Option<&str>,
    credentials_path: &Path,
) -> Result<SecretString> {
    if let Some(token) = explicit.filter(|t| !t.is_empty()) {
        debug!("using access token from arguments");
        return Ok(SecretString::from(token.to_string()));
    }

    load_token_file(credentials_path)
}

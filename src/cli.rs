//! CLI argument parsing and repository configuration.
use clap::Parser;
use std::path::PathBuf;

use crate::{
    Result,
    config::{
        Params,
        credentials::{DEFAULT_CREDENTIALS_PATH, resolve_token},
    },
    forge::config::{DEFAULT_API_URL, RemoteConfig},
};

/// Arguments for one release stage. Every value can also be supplied by the
/// environment the CI server sets up for the extension.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, env = "ESTAFETTE_GIT_OWNER")]
    /// Owner of the repository to release.
    pub git_repo_owner: String,

    #[arg(long, env = "ESTAFETTE_GIT_NAME")]
    /// Name of the repository to release.
    pub git_repo_name: String,

    #[arg(long, env = "ESTAFETTE_GIT_REVISION")]
    /// Commit the release tag points at.
    pub git_revision: String,

    #[arg(long, env = "ESTAFETTE_BUILD_VERSION", default_value = "")]
    /// Build version, used when no version parameter is set.
    pub build_version: String,

    #[arg(
        long,
        env = "ESTAFETTE_EXTENSION_CUSTOM_PROPERTIES_YAML",
        default_value = ""
    )]
    /// Stage parameters as YAML or JSON.
    pub params_yaml: String,

    #[arg(long, default_value = DEFAULT_CREDENTIALS_PATH)]
    /// Path to the injected github-api-token credentials.
    pub credentials_path: PathBuf,

    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    /// Access token. Takes precedence over the credentials file.
    pub github_token: Option<String>,

    #[arg(long, default_value = DEFAULT_API_URL)]
    /// REST API root, for Enterprise installations.
    pub api_url: String,

    #[arg(long, default_value_t = false)]
    /// Enable debug logging.
    pub debug: bool,
}

impl Args {
    /// Parse the stage parameters.
    pub fn params(&self) -> Result<Params> {
        Params::from_yaml(&self.params_yaml)
    }

    /// Configure the remote repository connection, resolving the token.
    pub fn remote_config(&self, params: &Params) -> Result<RemoteConfig> {
        let token =
            resolve_token(self.github_token.as_deref(), &self.credentials_path)?;

        Ok(RemoteConfig {
            api_url: self.api_url.clone(),
            owner: self.git_repo_owner.clone(),
            repo: self.git_repo_name.clone(),
            token,
            pull_request_source: params.pull_request_source,
        })
    }
}

use derive_builder::Builder;
use std::path::PathBuf;

use crate::{
    ReleaseError, Result,
    config::{Params, capitalize},
};

#[derive(Debug, Builder)]
#[builder(setter(into), build_fn(private, name = "_build"))]
pub struct RunConfigParams {
    pub params: Params,
    pub repo_name: String,
    pub git_revision: String,
    #[builder(default)]
    pub build_version: String,
}

impl RunConfigParamsBuilder {
    pub fn build(&self) -> Result<RunConfig> {
        let params = self._build().map_err(|e| {
            ReleaseError::invalid_config(format!(
                "Failed to build run config: {}",
                e
            ))
        })?;
        RunConfig::new(params)
    }
}

/// Immutable settings for a single release run, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub version: String,
    pub title: String,
    pub git_revision: String,
    pub close_milestone: bool,
    pub ignore_missing_milestone: bool,
    pub draft: bool,
    pub prerelease: bool,
    pub assets: Vec<PathBuf>,
}

impl RunConfig {
    pub fn builder() -> RunConfigParamsBuilder {
        RunConfigParamsBuilder::default()
    }

    pub fn new(input: RunConfigParams) -> Result<Self> {
        let params = input.params;

        let version = Self::resolve_version(params.version, input.build_version)?;
        let title = params
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| capitalize(&input.repo_name));

        Ok(Self {
            version,
            title,
            git_revision: input.git_revision,
            close_milestone: params.close_milestone,
            ignore_missing_milestone: params.ignore_missing_milestone,
            draft: params.draft,
            prerelease: params.prerelease,
            assets: params.assets,
        })
    }

    /// The explicit parameter wins over the build version.
    fn resolve_version(
        explicit: Option<String>,
        build_version: String,
    ) -> Result<String> {
        let version = explicit
            .filter(|v| !v.is_empty())
            .unwrap_or(build_version);

        if version.is_empty() {
            return Err(ReleaseError::invalid_config(
                "no release version: set the version parameter or the build version",
            ));
        }

        Ok(version)
    }
}

//! Parameter loading for the release stage.
//!
//! Parameters arrive as a YAML blob (JSON is valid YAML, so either works)
//! built by the CI server from the stage's custom properties.
use serde::Deserialize;
use std::path::PathBuf;

use crate::{Result, forge::types::PullRequestSource};

pub mod credentials;

/// Stage parameters. Every field is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")] // Use default for missing fields
pub struct Params {
    /// Version to release; falls back to the build version.
    pub version: Option<String>,
    /// Release title; falls back to the capitalized repository name.
    pub title: Option<String>,
    /// Close the milestone once the release exists (default: false)
    pub close_milestone: bool,
    /// Release without notes when no milestone matches (default: false)
    pub ignore_missing_milestone: bool,
    /// Local files to zip and attach to the release.
    pub assets: Vec<PathBuf>,
    /// Create the release as a draft (default: false)
    pub draft: bool,
    /// Mark the release as a prerelease (default: false)
    pub prerelease: bool,
    /// Where pull requests are discovered (default: issues)
    pub pull_request_source: PullRequestSource,
}

impl Params {
    /// Parse a parameter blob. Blank input yields the defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let params: Option<Params> = serde_yaml::from_str(content)?;

        Ok(params.unwrap_or_default())
    }
}

/// Upper-case the first character, leaving the rest untouched.
pub fn capitalize(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_yaml_params() {
        let params = Params::from_yaml(
            r#"
version: 1.2.0
title: My extension
closeMilestone: true
ignoreMissingMilestone: true
assets:
  - dist/app-linux
  - dist/app-darwin
prerelease: true
pullRequestSource: pulls
"#,
        )
        .unwrap();

        assert_eq!(params.version.as_deref(), Some("1.2.0"));
        assert_eq!(params.title.as_deref(), Some("My extension"));
        assert!(params.close_milestone);
        assert!(params.ignore_missing_milestone);
        assert_eq!(
            params.assets,
            vec![PathBuf::from("dist/app-linux"), PathBuf::from("dist/app-darwin")]
        );
        assert!(!params.draft);
        assert!(params.prerelease);
        assert_eq!(params.pull_request_source, PullRequestSource::Pulls);
    }

    #[test]
    fn parses_json_params() {
        let params =
            Params::from_yaml(r#"{"version":"2.0.0","closeMilestone":true}"#)
                .unwrap();

        assert_eq!(params.version.as_deref(), Some("2.0.0"));
        assert!(params.close_milestone);
        assert!(params.assets.is_empty());
    }

    #[test]
    fn blank_params_are_defaults() {
        assert_eq!(Params::from_yaml("").unwrap(), Params::default());
        assert_eq!(Params::from_yaml("  \n").unwrap(), Params::default());
        assert_eq!(Params::from_yaml("{}").unwrap(), Params::default());
    }

    #[test]
    fn invalid_params_are_rejected() {
        assert!(Params::from_yaml("closeMilestone: [not, a, bool]").is_err());
    }

    #[test]
    fn capitalize_first_character_only() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("lowercase"), "Lowercase");
        assert_eq!(
            capitalize("lowercase of more than one word"),
            "Lowercase of more than one word"
        );
        assert_eq!(
            capitalize("estafette-cloudflare-dns"),
            "Estafette-cloudflare-dns"
        );
        assert_eq!(capitalize("ßtraße"), "SStraße");
    }
}

use log::*;

use crate::{
    ReleaseError, Result,
    forge::{
        traits::{CreateReleaseRequest, RepositoryClient},
        types::{Milestone, MilestoneItems, Release},
    },
};

pub mod config;

pub use config::RunConfig;

/// What a completed run did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Milestone the release was built from, if one was found.
    pub milestone: Option<Milestone>,
    /// Release created by this run; `None` when the tag already existed.
    pub release: Option<Release>,
    pub assets_uploaded: usize,
    pub milestone_closed: bool,
}

/// Sequences the release stages for one version of a repository.
pub struct Orchestrator {
    config: RunConfig,
    client: Box<dyn RepositoryClient>,
}

impl Orchestrator {
    pub fn new(config: RunConfig, client: Box<dyn RepositoryClient>) -> Self {
        Self { config, client }
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        let mut outcome = RunOutcome::default();

        let milestone = self.locate_milestone().await?;

        let items = match &milestone {
            Some(milestone) => self
                .client
                .fetch_issues_and_pull_requests(milestone)
                .await
                .map_err(|e| {
                    error!(
                        "retrieving issues and pull requests for milestone #{} failed",
                        milestone.number
                    );
                    e
                })?,
            None => MilestoneItems::default(),
        };

        let release = self
            .client
            .create_release(CreateReleaseRequest {
                target_revision: self.config.git_revision.clone(),
                version: self.config.version.clone(),
                title: self.config.title.clone(),
                milestone: milestone.clone(),
                issues: items.issues,
                pull_requests: items.pull_requests,
                draft: self.config.draft,
                prerelease: self.config.prerelease,
            })
            .await
            .map_err(|e| {
                error!("creating release {} failed", self.config.version);
                e
            })?;

        if let Some(release) = &release
            && !self.config.assets.is_empty()
        {
            self.client
                .upload_release_assets(release, &self.config.assets)
                .await
                .map_err(|e| {
                    error!("uploading assets for {} failed", self.config.version);
                    e
                })?;
            outcome.assets_uploaded = self.config.assets.len();
        }

        if self.config.close_milestone
            && let Some(milestone) = &milestone
        {
            self.client.close_milestone(milestone).await.map_err(|e| {
                error!("closing milestone #{} failed", milestone.number);
                e
            })?;
            outcome.milestone_closed = true;
        }

        outcome.milestone = milestone;
        outcome.release = release;

        info!("finished release {}", self.config.version);

        Ok(outcome)
    }

    async fn locate_milestone(&self) -> Result<Option<Milestone>> {
        match self
            .client
            .find_milestone_by_version(&self.config.version)
            .await
        {
            Ok(milestone) => Ok(Some(milestone)),
            Err(ReleaseError::MilestoneNotFound(title))
                if self.config.ignore_missing_milestone =>
            {
                warn!(
                    "no milestone with title {title}, creating release without notes"
                );
                Ok(None)
            }
            Err(err) => {
                error!(
                    "retrieving milestone failed; please create a milestone with title {} if it does not exist",
                    self.config.version
                );
                Err(err)
            }
        }
    }
}

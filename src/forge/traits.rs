//! Traits related to remote git forges
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::path::PathBuf;

use crate::{
    Result,
    forge::types::{Issue, Milestone, MilestoneItems, PullRequest, Release},
};

/// Everything needed to create a release for a version.
#[derive(Debug, Clone, Default)]
pub struct CreateReleaseRequest {
    pub target_revision: String,
    pub version: String,
    pub title: String,
    pub milestone: Option<Milestone>,
    pub issues: Vec<Issue>,
    pub pull_requests: Vec<PullRequest>,
    pub draft: bool,
    pub prerelease: bool,
}

/// Milestone and release operations scoped to a single repository.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    /// First open milestone whose title equals `version` exactly.
    async fn find_milestone_by_version(&self, version: &str) -> Result<Milestone>;

    async fn fetch_issues_and_pull_requests(
        &self,
        milestone: &Milestone,
    ) -> Result<MilestoneItems>;

    /// Returns `None` when a release with the same tag already exists.
    async fn create_release(
        &self,
        req: CreateReleaseRequest,
    ) -> Result<Option<Release>>;

    async fn upload_release_assets(
        &self,
        release: &Release,
        assets: &[PathBuf],
    ) -> Result<()>;

    async fn close_milestone(&self, milestone: &Milestone) -> Result<()>;
}

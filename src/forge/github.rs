//! Implements the RepositoryClient trait for the GitHub REST API
use async_trait::async_trait;
use log::*;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use url::Url;

use crate::{
    Result,
    asset,
    forge::{
        config::{DEFAULT_PAGE_SIZE, RemoteConfig, TAG_PREFIX},
        request::{ApiClient, Payload, ReqwestTransport, Transport},
        retry::Retry,
        traits::{CreateReleaseRequest, RepositoryClient},
        types::{
            CreateRelease, IssueListItem, Milestone, MilestoneItems,
            MilestoneUpdate, PullRequest, PullRequestSource, Release,
        },
    },
    notes::format_release_description,
};

/// Placeholder the API puts at the end of a release upload URL.
const UPLOAD_URL_TEMPLATE: &str = "{?name,label}";

/// Release tag for a version.
pub fn release_tag(version: &str) -> String {
    format!("{TAG_PREFIX}{version}")
}

/// GitHub client for milestone and release operations on one repository.
pub struct Github {
    config: RemoteConfig,
    base_url: Url,
    api: ApiClient,
}

impl Github {
    /// Create a client that talks to the API over reqwest with retries.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let transport = Retry::new(ReqwestTransport::new()?);
        Self::with_transport(config, Box::new(transport))
    }

    /// Create a client on top of an arbitrary transport.
    pub fn with_transport(
        config: RemoteConfig,
        transport: Box<dyn Transport>,
    ) -> Result<Self> {
        let base_url = Url::parse(&format!(
            "{}/repos/{}/{}/",
            config.api_url.trim_end_matches('/'),
            config.owner,
            config.repo
        ))?;

        let api = ApiClient::new(transport, config.token.clone());

        Ok(Self {
            config,
            base_url,
            api,
        })
    }

    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base_url.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Walk a list endpoint page by page, handing each page to `visit`
    /// until it returns false or a short page signals the end.
    async fn for_each_page<T, F>(
        &self,
        path: &str,
        query: &[(&str, String)],
        mut visit: F,
    ) -> Result<()>
    where
        T: DeserializeOwned,
        F: FnMut(Vec<T>) -> bool + Send,
    {
        let mut page: u32 = 1;

        loop {
            let mut params = query.to_vec();
            params.push(("per_page", DEFAULT_PAGE_SIZE.to_string()));
            params.push(("page", page.to_string()));

            let url = self.endpoint(path, &params)?;
            let items: Vec<T> = self
                .api
                .call_json(Method::GET, url, &[StatusCode::OK], None)
                .await?;

            let last_page = items.len() < DEFAULT_PAGE_SIZE as usize;

            if !visit(items) || last_page {
                return Ok(());
            }

            page += 1;
        }
    }

    async fn list_closed_issues(
        &self,
        milestone: &Milestone,
    ) -> Result<Vec<IssueListItem>> {
        let mut listing = vec![];

        self.for_each_page(
            "issues",
            &[
                ("state", "closed".to_string()),
                ("milestone", milestone.number.to_string()),
            ],
            |page: Vec<IssueListItem>| {
                listing.extend(page);
                true
            },
        )
        .await?;

        Ok(listing)
    }

    async fn list_closed_pull_requests_for(
        &self,
        milestone: &Milestone,
    ) -> Result<Vec<PullRequest>> {
        let mut pull_requests = vec![];

        self.for_each_page(
            "pulls",
            &[("state", "closed".to_string())],
            |page: Vec<PullRequest>| {
                // match on id: numbers are only unique within a repository
                pull_requests.extend(page.into_iter().filter(|pr| {
                    pr.milestone.as_ref().map(|m| m.id) == Some(milestone.id)
                }));
                true
            },
        )
        .await?;

        Ok(pull_requests)
    }

    fn upload_url(release: &Release, name: &str) -> Result<Url> {
        let mut url =
            Url::parse(&release.upload_url.replacen(UPLOAD_URL_TEMPLATE, "", 1))?;
        url.query_pairs_mut().append_pair("name", name);
        Ok(url)
    }
}

#[async_trait]
impl RepositoryClient for Github {
    async fn find_milestone_by_version(&self, version: &str) -> Result<Milestone> {
        info!(
            "retrieving milestone with title {version} for {}/{}",
            self.config.owner, self.config.repo
        );

        let mut found: Option<Milestone> = None;

        self.for_each_page(
            "milestones",
            &[("state", "open".to_string())],
            |page: Vec<Milestone>| {
                found = page.into_iter().find(|m| m.title == version);
                found.is_none()
            },
        )
        .await?;

        match found {
            Some(milestone) => {
                info!("retrieved milestone #{}", milestone.number);
                Ok(milestone)
            }
            None => Err(crate::ReleaseError::MilestoneNotFound(version.into())),
        }
    }

    async fn fetch_issues_and_pull_requests(
        &self,
        milestone: &Milestone,
    ) -> Result<MilestoneItems> {
        info!("retrieving issues for milestone #{}", milestone.number);

        let listing = self.list_closed_issues(milestone).await?;

        let items = match self.config.pull_request_source {
            PullRequestSource::Issues => {
                MilestoneItems::from_listing(listing, milestone)
            }
            PullRequestSource::Pulls => {
                let mut items = MilestoneItems::from_listing(listing, milestone);
                debug!(
                    "dropping {} pull requests found in the issues listing in favor of the pulls endpoint",
                    items.pull_requests.len()
                );
                items.pull_requests =
                    self.list_closed_pull_requests_for(milestone).await?;
                items
            }
        };

        info!(
            "retrieved {} issues and {} pull requests",
            items.issues.len(),
            items.pull_requests.len()
        );

        Ok(items)
    }

    async fn create_release(
        &self,
        req: CreateReleaseRequest,
    ) -> Result<Option<Release>> {
        info!("creating release {}", req.version);

        let body = match &req.milestone {
            Some(milestone) => format_release_description(
                Some(milestone),
                &req.issues,
                &req.pull_requests,
            ),
            None => String::new(),
        };

        let release = CreateRelease {
            tag_name: release_tag(&req.version),
            target_commitish: req.target_revision,
            name: format!("{} {}", req.title, release_tag(&req.version)),
            body,
            draft: req.draft,
            prerelease: req.prerelease,
        };

        let url = self.endpoint("releases", &[])?;

        match self
            .api
            .call_json::<Release>(
                Method::POST,
                url,
                &[StatusCode::CREATED],
                Some(Payload::json(&release)?),
            )
            .await
        {
            Ok(created) => {
                info!("created release {}", created.tag_name);
                Ok(Some(created))
            }
            Err(err) if err.is_already_exists() => {
                warn!("release {} already exists, skipping", release.tag_name);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn upload_release_assets(
        &self,
        release: &Release,
        assets: &[PathBuf],
    ) -> Result<()> {
        for path in assets {
            let name = asset::asset_name(path)?;
            let archive = asset::zip_file(path)?;

            let content = tokio::fs::read(&archive)
                .await
                .map_err(|e| crate::ReleaseError::local_io(&archive, e))?;

            let url = Self::upload_url(release, &name)?;

            info!("uploading asset {name} ({} bytes)", content.len());

            match self
                .api
                .call(
                    Method::POST,
                    url,
                    &[StatusCode::CREATED],
                    Some(Payload::zip(content)),
                )
                .await
            {
                Ok(_) => {}
                Err(crate::ReleaseError::Decode { .. }) => {
                    warn!("asset {name} uploaded but the response could not be read");
                }
                Err(err) => return Err(err),
            }

            info!("uploaded asset {name}");
        }

        Ok(())
    }

    async fn close_milestone(&self, milestone: &Milestone) -> Result<()> {
        info!("closing milestone #{}", milestone.number);

        let url = self.endpoint(&format!("milestones/{}", milestone.number), &[])?;

        let update = MilestoneUpdate::close(milestone);

        match self
            .api
            .call(
                Method::PATCH,
                url,
                &[StatusCode::OK],
                Some(Payload::json(&update)?),
            )
            .await
        {
            Ok(_) => {}
            Err(crate::ReleaseError::Decode { .. }) => {
                warn!("milestone closed but the response could not be read");
            }
            Err(err) => return Err(err),
        }

        info!("closed milestone #{}", milestone.number);

        Ok(())
    }
}

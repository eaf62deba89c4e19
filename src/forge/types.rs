//! Milestone, issue, pull request and release shapes exchanged with the
//! forge REST API.
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub login: String,
    pub id: u64,
    pub html_url: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct Milestone {
    pub id: u64,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub html_url: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub open_issues: u64,
    #[serde(default)]
    pub closed_issues: u64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_on: Option<String>,
}

/// Partial milestone update used to close a milestone.
#[derive(Debug, Serialize)]
pub struct MilestoneUpdate {
    pub title: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_on: Option<String>,
}

impl MilestoneUpdate {
    pub fn close(milestone: &Milestone) -> Self {
        Self {
            title: milestone.title.clone(),
            state: "closed".into(),
            description: milestone
                .description
                .clone()
                .filter(|d| !d.is_empty()),
            due_on: milestone.due_on.clone().filter(|d| !d.is_empty()),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Issue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub url: String,
    pub html_url: String,
    pub state: String,
    pub assignee: Option<User>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    /// Only set when fetched from the pulls endpoint. Items found through
    /// the issues listing carry an issue id, which is a different space.
    #[serde(default)]
    pub id: Option<u64>,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub html_url: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub assignee: Option<User>,
    #[serde(default)]
    pub milestone: Option<Milestone>,
}

/// Links embedded in an issues-listing item that is really a pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestMarker {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub html_url: String,
}

/// Neutral shape of one element of the issues listing.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueListItem {
    pub id: u64,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub html_url: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub assignee: Option<User>,
    #[serde(default)]
    pub pull_request: Option<PullRequestMarker>,
}

/// An issues-listing item after deciding what it actually is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListedItem {
    Issue(Issue),
    PullRequest(PullRequest),
}

impl IssueListItem {
    /// Branch once on the pull request marker.
    pub fn classify(self, milestone: &Milestone) -> ListedItem {
        match self.pull_request {
            Some(marker) => ListedItem::PullRequest(PullRequest {
                id: None,
                number: self.number,
                title: self.title,
                url: marker.url,
                html_url: marker.html_url,
                state: self.state,
                assignee: self.assignee,
                milestone: Some(milestone.clone()),
            }),
            None => ListedItem::Issue(Issue {
                id: self.id,
                number: self.number,
                title: self.title,
                url: self.url,
                html_url: self.html_url,
                state: self.state,
                assignee: self.assignee,
            }),
        }
    }
}

/// Issues and pull requests closed against a milestone, in API order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MilestoneItems {
    pub issues: Vec<Issue>,
    pub pull_requests: Vec<PullRequest>,
}

impl MilestoneItems {
    /// Split an issues listing into true issues and pull requests.
    pub fn from_listing(
        listing: Vec<IssueListItem>,
        milestone: &Milestone,
    ) -> Self {
        let mut items = Self::default();

        for item in listing {
            match item.classify(milestone) {
                ListedItem::Issue(issue) => items.issues.push(issue),
                ListedItem::PullRequest(pr) => items.pull_requests.push(pr),
            }
        }

        items
    }
}

#[derive(Debug, Serialize)]
pub struct CreateRelease {
    pub tag_name: String,
    pub target_commitish: String,
    pub name: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
}

/// Release as returned by the API after creation.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub id: u64,
    pub tag_name: String,
    #[serde(default)]
    pub target_commitish: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub upload_url: String,
}

/// Where pull requests for a milestone are discovered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestSource {
    /// Reclassify pull requests found in the issues listing.
    #[default]
    Issues,
    /// Query the pulls endpoint and match on milestone id.
    Pulls,
}

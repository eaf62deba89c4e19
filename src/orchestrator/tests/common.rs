//! Common test utilities for orchestrator tests.

use crate::{
    config::Params,
    forge::{
        traits::MockRepositoryClient,
        types::{Issue, Milestone, MilestoneItems, PullRequest, Release},
    },
    orchestrator::{Orchestrator, RunConfig},
};

pub const TEST_VERSION: &str = "1.2.0";

/// Run config for `TEST_VERSION` with the given parameters applied.
pub fn run_config(params: Params) -> RunConfig {
    RunConfig::builder()
        .params(params)
        .repo_name("test-repo")
        .git_revision("abc123")
        .build_version(TEST_VERSION)
        .build()
        .unwrap()
}

/// Creates a test Orchestrator around the provided mock client.
///
/// # Example
/// ```ignore
/// let mut mock = MockRepositoryClient::new();
/// mock.expect_find_milestone_by_version().returning(|_| Ok(milestone()));
/// let orchestrator = create_test_orchestrator(mock, Params::default());
/// ```
pub fn create_test_orchestrator(
    mock: MockRepositoryClient,
    params: Params,
) -> Orchestrator {
    Orchestrator::new(run_config(params), Box::new(mock))
}

pub fn milestone() -> Milestone {
    Milestone {
        id: 42,
        number: 7,
        title: TEST_VERSION.into(),
        html_url: "https://example.com/milestone/1".into(),
        ..Default::default()
    }
}

pub fn items() -> MilestoneItems {
    MilestoneItems {
        issues: vec![Issue {
            number: 12,
            title: "Add official helm chart".into(),
            html_url: "https://example.com/issues/12".into(),
            ..Default::default()
        }],
        pull_requests: vec![PullRequest {
            number: 13,
            title: "Create release".into(),
            html_url: "https://example.com/pull/13".into(),
            ..Default::default()
        }],
    }
}

pub fn release() -> Release {
    Release {
        id: 1,
        tag_name: format!("v{TEST_VERSION}"),
        upload_url: "https://uploads.example.com/releases/1/assets{?name,label}"
            .into(),
        ..Default::default()
    }
}

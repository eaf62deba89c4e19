//! Markdown release notes built from a milestone and the issues and pull
//! requests resolved in it.
use crate::forge::types::{Issue, Milestone, PullRequest, User};

/// Fields shared by every bullet in the release notes.
trait NoteItem {
    fn title(&self) -> &str;
    fn number(&self) -> u64;
    fn html_url(&self) -> &str;
    fn assignee(&self) -> Option<&User>;
}

impl NoteItem for Issue {
    fn title(&self) -> &str {
        &self.title
    }

    fn number(&self) -> u64 {
        self.number
    }

    fn html_url(&self) -> &str {
        &self.html_url
    }

    fn assignee(&self) -> Option<&User> {
        self.assignee.as_ref()
    }
}

impl NoteItem for PullRequest {
    fn title(&self) -> &str {
        &self.title
    }

    fn number(&self) -> u64 {
        self.number
    }

    fn html_url(&self) -> &str {
        &self.html_url
    }

    fn assignee(&self) -> Option<&User> {
        self.assignee.as_ref()
    }
}

fn push_section<T: NoteItem>(notes: &mut String, heading: &str, items: &[T]) {
    if items.is_empty() {
        return;
    }

    notes.push_str(&format!("**{heading} ({})**\n", items.len()));

    for item in items {
        notes.push_str(&format!(
            "* {}. [#{}]({})",
            item.title(),
            item.number(),
            item.html_url()
        ));
        if let Some(assignee) = item.assignee() {
            notes.push_str(&format!(
                ", [@{}]({})",
                assignee.login, assignee.html_url
            ));
        }
        notes.push('\n');
    }
}

/// Render the release description. Items are listed in the order given;
/// the result is empty when there is nothing to say.
pub fn format_release_description(
    milestone: Option<&Milestone>,
    issues: &[Issue],
    pull_requests: &[PullRequest],
) -> String {
    let mut notes = String::new();

    push_section(&mut notes, "Resolved issues", issues);

    if !issues.is_empty() && !pull_requests.is_empty() {
        notes.push('\n');
    }

    push_section(&mut notes, "Resolved pull requests", pull_requests);

    if let Some(milestone) = milestone {
        if !issues.is_empty() || !pull_requests.is_empty() {
            notes.push('\n');
        }
        notes.push_str(&format!(
            "See [milestone {}]({}?closed=1) for more details.",
            milestone.title, milestone.html_url
        ));
    }

    notes
}

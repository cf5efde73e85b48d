use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Comment, Issue, Label, Notification};

/// Remote issue-tracker operations the command layer depends on.
///
/// Implementations report a missing target as `TriageError::NotFound` and a
/// duplicate creation as `TriageError::AlreadyExists` so callers can absorb them.
#[async_trait]
pub trait Api: Send + Sync + std::fmt::Debug {
    /// First page of the user's notifications.
    async fn list_notifications(&self) -> Result<Vec<Notification>>;

    /// Fetch the issue or pull request a notification subject points to.
    async fn get_issue(&self, url: &str) -> Result<Issue>;
    async fn list_issue_labels(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<Label>>;
    async fn list_comments(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<Comment>>;
    async fn list_repo_labels(&self, owner: &str, repo: &str) -> Result<Vec<Label>>;

    async fn replace_labels(&self, owner: &str, repo: &str, number: u64, labels: &[String])
        -> Result<()>;
    async fn remove_all_labels(&self, owner: &str, repo: &str, number: u64) -> Result<()>;
    async fn create_label(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        color: &str,
        description: &str,
    ) -> Result<()>;
    async fn add_labels(&self, owner: &str, repo: &str, number: u64, labels: &[String])
        -> Result<()>;
    async fn remove_label(&self, owner: &str, repo: &str, number: u64, name: &str) -> Result<()>;
    async fn create_comment(&self, owner: &str, repo: &str, number: u64, body: &str)
        -> Result<()>;

    async fn mark_thread_read(&self, thread_id: &str) -> Result<()>;
    async fn delete_thread_subscription(&self, thread_id: &str) -> Result<()>;
    async fn delete_repo_subscription(&self, owner: &str, repo: &str) -> Result<()>;
}

use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::Method;

use crate::api::Api;
use crate::error::{Result, TriageError};
use crate::types::{Comment, Issue, Label, Notification};

const API_BASE: &str = "https://api.github.com";

pub struct GitHub {
    client: Octocrab,
    http: reqwest::Client,
    token: String,
}

impl std::fmt::Debug for GitHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHub").finish_non_exhaustive()
    }
}

impl GitHub {
    pub fn new(token: String) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.clone())
            .build()
            .map_err(|e| TriageError::Auth(e.to_string()))?;

        let http = reqwest::Client::builder()
            .user_agent("triage")
            .build()
            .map_err(|e| TriageError::Api(e.to_string()))?;

        Ok(Self {
            client,
            http,
            token,
        })
    }

    /// Issue a request whose response body we don't need, mapping the status
    /// onto the error taxonomy.
    async fn send(&self, method: Method, path: &str) -> Result<()> {
        let url = format!("{}{}", API_BASE, path);
        tracing::debug!(%method, %url, "github request");

        let response = self
            .http
            .request(method, &url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| TriageError::Api(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        Err(TriageError::from_status(status.as_u16(), &text))
    }
}

/// Reduce an absolute API url to the route octocrab resolves against its base.
fn api_route(url: &str) -> Option<&str> {
    url.find("/repos/").map(|i| &url[i..])
}

#[async_trait]
impl Api for GitHub {
    async fn list_notifications(&self) -> Result<Vec<Notification>> {
        let notifications: Vec<Notification> = self
            .client
            .get("/notifications?per_page=100", None::<&()>)
            .await?;
        Ok(notifications)
    }

    async fn get_issue(&self, url: &str) -> Result<Issue> {
        let route = api_route(url)
            .ok_or_else(|| TriageError::Api(format!("unsupported subject url: {}", url)))?;
        let issue: Issue = self.client.get(route, None::<&()>).await?;
        Ok(issue)
    }

    async fn list_issue_labels(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<Label>> {
        let route = format!(
            "/repos/{}/{}/issues/{}/labels?per_page=100",
            owner, repo, number
        );
        let labels: Vec<Label> = self.client.get(&route, None::<&()>).await?;
        Ok(labels)
    }

    async fn list_comments(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<Comment>> {
        let route = format!(
            "/repos/{}/{}/issues/{}/comments?per_page=100",
            owner, repo, number
        );
        let comments: Vec<Comment> = self.client.get(&route, None::<&()>).await?;
        Ok(comments)
    }

    async fn list_repo_labels(&self, owner: &str, repo: &str) -> Result<Vec<Label>> {
        let route = format!("/repos/{}/{}/labels?per_page=100", owner, repo);
        let labels: Vec<Label> = self.client.get(&route, None::<&()>).await?;
        Ok(labels)
    }

    async fn replace_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: &[String],
    ) -> Result<()> {
        self.client
            .issues(owner, repo)
            .replace_all_labels(number, labels)
            .await?;
        Ok(())
    }

    async fn remove_all_labels(&self, owner: &str, repo: &str, number: u64) -> Result<()> {
        let path = format!("/repos/{}/{}/issues/{}/labels", owner, repo, number);
        self.send(Method::DELETE, &path).await
    }

    async fn create_label(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        color: &str,
        description: &str,
    ) -> Result<()> {
        self.client
            .issues(owner, repo)
            .create_label(name, color, description)
            .await?;
        Ok(())
    }

    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: &[String],
    ) -> Result<()> {
        self.client
            .issues(owner, repo)
            .add_labels(number, labels)
            .await?;
        Ok(())
    }

    async fn remove_label(&self, owner: &str, repo: &str, number: u64, name: &str) -> Result<()> {
        // label names routinely contain spaces and colons ("Priority: High")
        let path = format!(
            "/repos/{}/{}/issues/{}/labels/{}",
            owner,
            repo,
            number,
            urlencoding::encode(name)
        );
        self.send(Method::DELETE, &path).await
    }

    async fn create_comment(&self, owner: &str, repo: &str, number: u64, body: &str) -> Result<()> {
        self.client
            .issues(owner, repo)
            .create_comment(number, body)
            .await?;
        Ok(())
    }

    async fn mark_thread_read(&self, thread_id: &str) -> Result<()> {
        let path = format!("/notifications/threads/{}", thread_id);
        self.send(Method::PATCH, &path).await
    }

    async fn delete_thread_subscription(&self, thread_id: &str) -> Result<()> {
        let path = format!("/notifications/threads/{}/subscription", thread_id);
        self.send(Method::DELETE, &path).await
    }

    async fn delete_repo_subscription(&self, owner: &str, repo: &str) -> Result<()> {
        let path = format!("/repos/{}/{}/subscription", owner, repo);
        self.send(Method::DELETE, &path).await
    }
}

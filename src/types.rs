use chrono::{DateTime, Utc};
use serde::Deserialize;

/// GitHub notification thread
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Notification {
    /// Thread id. Stable across refreshes; used for removal.
    pub id: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub unread: bool,
    pub updated_at: DateTime<Utc>,
    pub subject: Subject,
    pub repository: Repository,
}

impl Notification {
    pub fn owner_repo(&self) -> (&str, &str) {
        (&self.repository.owner.login, &self.repository.name)
    }

    pub fn full_name(&self) -> &str {
        &self.repository.full_name
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Subject {
    pub title: String,
    /// API url of the issue or pull request
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub owner: User,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub login: String,
}

/// Issue or pull request behind a notification
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub user: User,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub html_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Label {
    pub id: u64,
    pub name: String,
    /// Hex color without the leading `#`
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub user: User,
    #[serde(default)]
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
}

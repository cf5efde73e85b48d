//! Asynchronous units of work requested by the reducer.
//!
//! A `Command` is plain data. The event loop spawns each one as its own task;
//! running it yields at most one `Message` for the reducer. Commands never see
//! the model.

use std::sync::Arc;
use std::time::Duration;

use crate::api::Api;
use crate::config::{Config, Priority};
use crate::error::{Absorb, Result, TriageError};
use crate::message::{Message, Operation};
use crate::types::Notification;

/// Deadline for fetches
pub const READ_TIMEOUT: Duration = Duration::from_secs(5);
/// Deadline for writes and deletes
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Process-wide collaborators shared by the reducer and every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub api: Arc<dyn Api>,
    pub config: Arc<Config>,
}

impl Context {
    pub fn new(api: Arc<dyn Api>, config: Config) -> Self {
        Self {
            api,
            config: Arc::new(config),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    GetDimensions,
    LoadNotifications,
    LoadIssue(Notification),
    LoadIssueLabels {
        notification: Notification,
        number: u64,
    },
    LoadComments {
        notification: Notification,
        number: u64,
    },
    LoadRepoLabels(Notification),
    UpdateLabels {
        notification: Notification,
        number: u64,
        labels: Vec<String>,
    },
    UpdatePriority {
        notification: Notification,
        number: u64,
        priority: Priority,
    },
    AddComment {
        notification: Notification,
        number: u64,
        body: String,
    },
    MarkAsRead(Notification),
    Unsubscribe(Notification),
    Unwatch {
        owner: String,
        repo: String,
    },
    OpenInBrowser(Notification),
    YankUrl(Notification),
    /// Stop the program. Handled by the event loop, never run.
    Quit,
}

impl Command {
    pub fn operation(&self) -> Option<Operation> {
        let op = match self {
            Command::GetDimensions => Operation::Dimensions,
            Command::LoadNotifications => Operation::LoadNotifications,
            Command::LoadIssue(_) => Operation::LoadIssue,
            Command::LoadIssueLabels { .. } => Operation::LoadIssueLabels,
            Command::LoadComments { .. } => Operation::LoadComments,
            Command::LoadRepoLabels(_) => Operation::LoadRepoLabels,
            Command::UpdateLabels { .. } => Operation::UpdateLabels,
            Command::UpdatePriority { .. } => Operation::UpdatePriority,
            Command::AddComment { .. } => Operation::AddComment,
            Command::MarkAsRead(_) => Operation::MarkAsRead,
            Command::Unsubscribe(_) => Operation::Unsubscribe,
            Command::Unwatch { .. } => Operation::Unwatch,
            Command::OpenInBrowser(_) => Operation::Open,
            Command::YankUrl(_) => Operation::Yank,
            Command::Quit => return None,
        };
        Some(op)
    }

    /// The open notification a detail-bound result is for.
    pub fn notification_id(&self) -> Option<String> {
        match self {
            Command::LoadIssue(notification)
            | Command::LoadRepoLabels(notification)
            | Command::LoadIssueLabels { notification, .. }
            | Command::LoadComments { notification, .. }
            | Command::UpdateLabels { notification, .. }
            | Command::UpdatePriority { notification, .. }
            | Command::AddComment { notification, .. } => Some(notification.id.clone()),
            _ => None,
        }
    }

    /// Time budget measured from when the task starts. `None` waits indefinitely.
    pub fn deadline(&self) -> Option<Duration> {
        match self {
            Command::GetDimensions | Command::Quit => None,
            Command::LoadNotifications
            | Command::LoadIssue(_)
            | Command::LoadIssueLabels { .. }
            | Command::LoadComments { .. }
            | Command::LoadRepoLabels(_)
            | Command::OpenInBrowser(_)
            | Command::YankUrl(_) => Some(READ_TIMEOUT),
            Command::UpdateLabels { .. }
            | Command::UpdatePriority { .. }
            | Command::AddComment { .. }
            | Command::MarkAsRead(_)
            | Command::Unsubscribe(_)
            | Command::Unwatch { .. } => Some(WRITE_TIMEOUT),
        }
    }

    /// Run to completion, converting any failure into `Message::Failed`.
    pub async fn run(self, ctx: &Context) -> Option<Message> {
        let operation = self.operation()?;
        let notification_id = self.notification_id();

        let result = match self.deadline() {
            Some(limit) => tokio::time::timeout(limit, self.execute(ctx))
                .await
                .unwrap_or(Err(TriageError::Timeout(limit))),
            None => self.execute(ctx).await,
        };

        match result {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(%operation, error = %err, "command failed");
                Some(Message::failed(operation, notification_id, err))
            }
        }
    }

    async fn execute(self, ctx: &Context) -> Result<Option<Message>> {
        let api = ctx.api.as_ref();

        let message = match self {
            Command::GetDimensions => {
                let (width, height) = dimensions().await?;
                Message::GotDimensions { width, height }
            }
            Command::LoadNotifications => {
                let notifications = api
                    .list_notifications()
                    .await?
                    .into_iter()
                    .filter(|n| n.subject.kind != "Release")
                    .collect();
                Message::NotificationsLoaded(notifications)
            }
            Command::LoadIssue(notification) => {
                let url = subject_url(&notification)?;
                let issue = api.get_issue(url).await?;
                Message::IssueLoaded {
                    notification_id: notification.id,
                    issue: Box::new(issue),
                }
            }
            Command::LoadIssueLabels {
                notification,
                number,
            } => {
                let (owner, repo) = notification.owner_repo();
                let labels = api.list_issue_labels(owner, repo, number).await?;
                Message::IssueLabelsLoaded {
                    notification_id: notification.id,
                    labels,
                }
            }
            Command::LoadComments {
                notification,
                number,
            } => {
                let (owner, repo) = notification.owner_repo();
                let comments = api.list_comments(owner, repo, number).await?;
                Message::CommentsLoaded {
                    notification_id: notification.id,
                    comments,
                }
            }
            Command::LoadRepoLabels(notification) => {
                let (owner, repo) = notification.owner_repo();
                let labels = api.list_repo_labels(owner, repo).await?;
                Message::RepoLabelsLoaded {
                    notification_id: notification.id,
                    labels,
                }
            }
            Command::UpdateLabels {
                notification,
                number,
                labels,
            } => {
                let (owner, repo) = notification.owner_repo();
                // replacing with an empty set is rejected, clearing is its own endpoint
                if labels.is_empty() {
                    api.remove_all_labels(owner, repo, number).await?;
                } else {
                    api.replace_labels(owner, repo, number, &labels).await?;
                }
                Message::LabelsUpdated {
                    notification_id: notification.id,
                }
            }
            Command::UpdatePriority {
                notification,
                number,
                priority,
            } => {
                let (owner, repo) = notification.owner_repo();
                assign_priority(api, owner, repo, number, &priority, &ctx.config.priorities)
                    .await?;
                Message::PriorityUpdated {
                    notification_id: notification.id,
                }
            }
            Command::AddComment {
                notification,
                number,
                body,
            } => {
                let (owner, repo) = notification.owner_repo();
                api.create_comment(owner, repo, number, &body).await?;
                Message::CommentAdded {
                    notification_id: notification.id,
                }
            }
            Command::MarkAsRead(notification) => {
                api.mark_thread_read(&notification.id).await?;
                Message::MarkedAsRead {
                    id: notification.id,
                }
            }
            Command::Unsubscribe(notification) => {
                api.delete_thread_subscription(&notification.id)
                    .await
                    .ignore_not_found()?;
                api.mark_thread_read(&notification.id).await?;
                Message::Unsubscribed {
                    id: notification.id,
                }
            }
            Command::Unwatch { owner, repo } => {
                api.delete_repo_subscription(&owner, &repo)
                    .await
                    .ignore_not_found()?;
                Message::Unwatched { owner, repo }
            }
            Command::OpenInBrowser(notification) => {
                let issue = api.get_issue(subject_url(&notification)?).await?;
                tracing::info!(url = %issue.html_url, "opening in browser");
                open::that_detached(&issue.html_url)?;
                return Ok(None);
            }
            Command::YankUrl(notification) => {
                let issue = api.get_issue(subject_url(&notification)?).await?;
                copy_to_clipboard(&issue.html_url)?;
                Message::Yanked(issue.html_url)
            }
            Command::Quit => return Ok(None),
        };

        Ok(Some(message))
    }
}

/// Point an issue at `priority`, clearing every other configured priority.
///
/// Steps run in order and are not transactional: a failure part-way leaves a
/// mix of labels, and running it again converges.
pub async fn assign_priority(
    api: &dyn Api,
    owner: &str,
    repo: &str,
    number: u64,
    priority: &Priority,
    priorities: &[Priority],
) -> Result<()> {
    let description = format!("{} priority issue.", priority.name);
    api.create_label(owner, repo, &priority.label, priority.api_color(), &description)
        .await
        .ignore_already_exists()?;

    for other in priorities.iter().filter(|p| p.label != priority.label) {
        api.remove_label(owner, repo, number, &other.label)
            .await
            .ignore_not_found()?;
    }

    api.add_labels(owner, repo, number, &[priority.label.clone()])
        .await
}

fn subject_url(notification: &Notification) -> Result<&str> {
    notification.subject.url.as_deref().ok_or_else(|| {
        TriageError::Api(format!(
            "{} notification has no issue url",
            notification.subject.kind
        ))
    })
}

fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| TriageError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text.to_string())
        .map_err(|e| TriageError::Clipboard(e.to_string()))
}

/// Current terminal size, waiting out a 0x0 pty (containers allocate one
/// before the first resize).
async fn dimensions() -> Result<(u16, u16)> {
    loop {
        let (width, height) = crossterm::terminal::size()?;
        if width != 0 || height != 0 {
            return Ok((width, height));
        }
        tracing::debug!("terminal reports 0x0, waiting for resize");
        wait_for_resize().await?;
    }
}

#[cfg(unix)]
async fn wait_for_resize() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut winch = signal(SignalKind::window_change())?;
    winch.recv().await;
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_resize() -> Result<()> {
    tokio::time::sleep(Duration::from_millis(250)).await;
    Ok(())
}

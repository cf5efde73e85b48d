use crossterm::event::KeyEvent;

use crate::error::TriageError;
use crate::types::{Comment, Issue, Label, Notification};

/// Which asynchronous operation a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Dimensions,
    LoadNotifications,
    LoadIssue,
    LoadIssueLabels,
    LoadComments,
    LoadRepoLabels,
    UpdateLabels,
    UpdatePriority,
    AddComment,
    MarkAsRead,
    Unsubscribe,
    Unwatch,
    Open,
    Yank,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Operation::Dimensions => "reading terminal size",
            Operation::LoadNotifications => "fetching notifications",
            Operation::LoadIssue => "fetching issue",
            Operation::LoadIssueLabels => "fetching issue labels",
            Operation::LoadComments => "fetching comments",
            Operation::LoadRepoLabels => "fetching repo labels",
            Operation::UpdateLabels => "updating labels",
            Operation::UpdatePriority => "updating priority",
            Operation::AddComment => "creating comment",
            Operation::MarkAsRead => "marking thread as read",
            Operation::Unsubscribe => "removing thread subscription",
            Operation::Unwatch => "unwatching repository",
            Operation::Open => "opening in browser",
            Operation::Yank => "copying url",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    // Terminal
    Key(KeyEvent),
    Resized { width: u16, height: u16 },
    GotDimensions { width: u16, height: u16 },

    // Notifications page
    NotificationsLoaded(Vec<Notification>),

    // Detail loads, tagged with the notification they were requested for
    IssueLoaded {
        notification_id: String,
        issue: Box<Issue>,
    },
    IssueLabelsLoaded {
        notification_id: String,
        labels: Vec<Label>,
    },
    CommentsLoaded {
        notification_id: String,
        comments: Vec<Comment>,
    },

    // Labels page
    RepoLabelsLoaded {
        notification_id: String,
        labels: Vec<Label>,
    },
    LabelsUpdated {
        notification_id: String,
    },

    // Priorities page
    PriorityUpdated {
        notification_id: String,
    },

    // Comment page
    CommentAdded {
        notification_id: String,
    },

    // Terminal actions on a thread or repository
    MarkedAsRead {
        id: String,
    },
    Unsubscribed {
        id: String,
    },
    Unwatched {
        owner: String,
        repo: String,
    },

    Yanked(String),

    Failed {
        operation: Operation,
        /// Set when the operation was on behalf of an open notification
        notification_id: Option<String>,
        error: String,
    },
}

impl Message {
    pub fn failed(
        operation: Operation,
        notification_id: Option<String>,
        err: TriageError,
    ) -> Self {
        Message::Failed {
            operation,
            notification_id,
            error: err.to_string(),
        }
    }
}

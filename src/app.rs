use std::collections::BTreeSet;

use crate::config::Priority;
use crate::list;
use crate::types::{Comment, Issue, Label, Notification};

/// Lines taken by the status line and the shortcut bar.
pub const CHROME_HEIGHT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Notifications,
    NotificationDetail,
    Labels,
    Priorities,
    Comment,
}

impl Page {
    /// Pages drawn over an open notification.
    pub fn over_detail(self) -> bool {
        !matches!(self, Page::Notifications)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListState {
    /// Kept sorted by recency
    pub notifications: Vec<Notification>,
    pub scroll: usize,
    pub selected: usize,
    pub search: String,
    pub searching: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailState {
    pub notification: Option<Notification>,
    pub issue: Option<Issue>,
    pub labels: Vec<Label>,
    pub comments: Vec<Comment>,
    pub scroll: usize,
    pub loading_issue: bool,
    pub loading_labels: bool,
    pub loading_comments: bool,
}

impl DetailState {
    /// True when a result tagged with `id` still belongs here.
    pub fn is_for(&self, id: &str) -> bool {
        self.notification.as_ref().is_some_and(|n| n.id == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelsState {
    /// Repository labels with the priority labels taken out
    pub repo_labels: Vec<Label>,
    /// Indices into `repo_labels`
    pub selected: BTreeSet<usize>,
    pub cursor: usize,
    /// Repository labels requested and not yet arrived
    pub loading: bool,
}

impl LabelsState {
    pub fn selected_names(&self) -> Vec<String> {
        self.selected
            .iter()
            .filter_map(|&i| self.repo_labels.get(i))
            .map(|l| l.name.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrioritiesState {
    pub options: Vec<Priority>,
    pub cursor: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentState {
    pub input: String,
}

/// Everything the renderer needs, and nothing else.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub page: Page,

    pub list: ListState,
    pub detail: DetailState,
    pub labels: LabelsState,
    pub priorities: PrioritiesState,
    pub comment: CommentState,

    // Destructive operations in flight; at most one is set
    pub marking_as_read: bool,
    pub unsubscribing: bool,
    pub unwatching: bool,

    /// Notification list requested and not yet arrived
    pub loading: bool,
    pub width: u16,
    pub height: u16,

    /// Last failure, shown until the next key press
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Model {
    pub fn new(search: Option<String>) -> Self {
        Self {
            page: Page::Notifications,
            list: ListState {
                search: search.unwrap_or_default(),
                ..ListState::default()
            },
            detail: DetailState::default(),
            labels: LabelsState::default(),
            priorities: PrioritiesState::default(),
            comment: CommentState::default(),
            marking_as_read: false,
            unsubscribing: false,
            unwatching: false,
            loading: true,
            width: 0,
            height: 0,
            error: None,
            notice: None,
        }
    }

    pub fn busy(&self) -> bool {
        self.marking_as_read || self.unsubscribing || self.unwatching
    }

    /// Lines available to page content.
    pub fn view_height(&self) -> usize {
        (self.height as usize).saturating_sub(CHROME_HEIGHT)
    }

    pub fn search_visible(&self) -> bool {
        self.list.searching || !self.list.search.is_empty()
    }

    /// Header lines above the notification list: a blank line, plus the
    /// search prompt framed by blanks when it is showing.
    pub fn list_sticky(&self) -> usize {
        if self.search_visible() {
            3
        } else {
            1
        }
    }

    pub fn visible(&self) -> Vec<Notification> {
        list::visible(&self.list.notifications, &self.list.search)
    }

    pub fn selected_notification(&self) -> Option<Notification> {
        self.visible().into_iter().nth(self.list.selected)
    }
}

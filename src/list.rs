//! Filtering, ordering and scroll arithmetic for the notification list.

use std::collections::BTreeSet;

use crate::config::Priority;
use crate::types::{Label, Notification};

/// Rows one notification occupies in the list: name, subject, timestamp, gap.
pub const ITEM_HEIGHT: usize = 4;

/// Direction of the selection change that triggered a scroll recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Keep notifications whose repository full name contains `text`.
///
/// Matching is case-sensitive and relative order is preserved.
pub fn filter<'a>(notifications: &'a [Notification], text: &str) -> Vec<&'a Notification> {
    notifications
        .iter()
        .filter(|n| n.full_name().contains(text))
        .collect()
}

/// Most recently updated first. Stable, so equal timestamps keep their order.
pub fn sort_by_recency(notifications: &mut [Notification]) {
    notifications.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

/// The list as the user sees it: ordered by recency, then filtered.
pub fn visible(notifications: &[Notification], search: &str) -> Vec<Notification> {
    let mut sorted = notifications.to_vec();
    sort_by_recency(&mut sorted);
    filter(&sorted, search).into_iter().cloned().collect()
}

/// Scroll offset that keeps the selected item in a comfortable band.
///
/// `height` is the viewport height and `sticky` the number of header lines
/// above the list. Near the top the list stays at 0, near the bottom it pins to
/// the maximum, in between the selection sits at mid-viewport. The direction
/// decides which rule wins at the boundary so the list doesn't jump at its edges.
pub fn scroll_for(
    selected: usize,
    len: usize,
    direction: ScrollDirection,
    height: usize,
    sticky: usize,
) -> usize {
    let row = selected * ITEM_HEIGHT;
    let list_height = len * ITEM_HEIGHT + 1;
    let visible = height.saturating_sub(sticky);
    let max = list_height.saturating_sub(visible);
    let padding = visible / 2;

    let offset = if row < padding {
        0
    } else {
        match direction {
            ScrollDirection::Down if row > max => max,
            ScrollDirection::Up if row > list_height.saturating_sub(padding) => max,
            _ => row - padding,
        }
    };

    offset.min(max)
}

/// Drop the notification with `id`. Absent ids leave the list untouched.
pub fn remove_by_id(notifications: &mut Vec<Notification>, id: &str) {
    notifications.retain(|n| n.id != id);
}

/// Notifications belonging to `owner/repo`.
pub fn by_repository<'a>(
    notifications: &'a [Notification],
    owner: &str,
    repo: &str,
) -> Vec<&'a Notification> {
    notifications
        .iter()
        .filter(|n| n.owner_repo() == (owner, repo))
        .collect()
}

/// Repository labels minus the ones managed as priorities.
pub fn without_priorities(labels: Vec<Label>, priorities: &[Priority]) -> Vec<Label> {
    labels
        .into_iter()
        .filter(|l| !priorities.iter().any(|p| p.label == l.name))
        .collect()
}

/// Indices into `options` of the labels currently on the issue.
pub fn selected_indices(options: &[Label], assigned: &[Label]) -> BTreeSet<usize> {
    options
        .iter()
        .enumerate()
        .filter(|(_, o)| assigned.iter().any(|a| a.id == o.id || a.name == o.name))
        .map(|(i, _)| i)
        .collect()
}

/// Clamp a selection to a list of `len` items.
pub fn clamp_selected(selected: usize, len: usize) -> usize {
    selected.min(len.saturating_sub(1))
}

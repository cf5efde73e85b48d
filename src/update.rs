//! The reducer: `(Model, Message) -> (Model, Vec<Command>)`.
//!
//! Messages go to the active page's handler first. On the pages drawn over an
//! open notification, results for that notification come next. Whatever is
//! left falls through to the page-independent tier, which also drops results
//! that arrive for a page the user has already left.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{DetailState, LabelsState, Model, Page, PrioritiesState};
use crate::command::{Command, Context};
use crate::list::{self, ScrollDirection};
use crate::message::{Message, Operation};
use crate::ui;
use crate::viewport;

enum Step {
    Done(Model, Vec<Command>),
    Next(Model, Message),
}

use Step::{Done, Next};

fn done(model: Model) -> Step {
    Done(model, Vec::new())
}

pub fn update(ctx: &Context, mut model: Model, msg: Message) -> (Model, Vec<Command>) {
    if matches!(msg, Message::Key(_)) {
        model.error = None;
        model.notice = None;
    }

    let step = match model.page {
        Page::Notifications => notifications(model, msg),
        Page::NotificationDetail => detail(ctx, model, msg),
        Page::Labels => labels(ctx, model, msg),
        Page::Priorities => priorities(ctx, model, msg),
        Page::Comment => comment(model, msg),
    };
    let step = match step {
        Next(model, msg) if model.page.over_detail() => detail_result(ctx, model, msg),
        step => step,
    };

    match step {
        Done(model, commands) => (model, commands),
        Next(model, msg) => global(ctx, model, msg),
    }
}

/// Text input: a character typed without Control.
fn typed(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => Some(c),
        _ => None,
    }
}

fn rescroll(model: &mut Model, direction: ScrollDirection) {
    let len = model.visible().len();
    model.list.selected = list::clamp_selected(model.list.selected, len);
    model.list.scroll = list::scroll_for(
        model.list.selected,
        len,
        direction,
        model.view_height(),
        model.list_sticky(),
    );
}

fn reset_selection(model: &mut Model) {
    model.list.selected = 0;
    model.list.scroll = 0;
}

fn detail_max_scroll(ctx: &Context, model: &Model) -> usize {
    let doc = ui::detail::document(model, &ctx.config.theme);
    viewport::max_scroll(doc.lines.len(), model.view_height(), doc.sticky)
}

fn clamp_detail_scroll(ctx: &Context, model: &mut Model) {
    model.detail.scroll = model.detail.scroll.min(detail_max_scroll(ctx, model));
}

/// Issue number of the notification open in the detail page, once loaded.
fn open_issue(model: &Model) -> Option<(crate::types::Notification, u64)> {
    let notification = model.detail.notification.clone()?;
    let number = model.detail.issue.as_ref()?.number;
    Some((notification, number))
}

fn reload_labels(model: &mut Model) -> Vec<Command> {
    match open_issue(model) {
        Some((notification, number)) => {
            model.detail.loading_labels = true;
            vec![Command::LoadIssueLabels {
                notification,
                number,
            }]
        }
        None => Vec::new(),
    }
}

// Notifications page

fn notifications(model: Model, msg: Message) -> Step {
    match msg {
        Message::NotificationsLoaded(mut loaded) => {
            let mut model = model;
            list::sort_by_recency(&mut loaded);
            tracing::debug!(count = loaded.len(), "notifications loaded");
            model.list.notifications = loaded;
            model.loading = false;
            rescroll(&mut model, ScrollDirection::Down);
            done(model)
        }
        Message::Key(key) => notifications_key(model, key),
        other => Next(model, other),
    }
}

fn refresh(mut model: Model) -> Step {
    model.loading = true;
    Done(model, vec![Command::LoadNotifications])
}

fn notifications_key(mut model: Model, key: KeyEvent) -> Step {
    if model.loading {
        return Next(model, Message::Key(key));
    }
    if model.list.searching {
        return search_key(model, key);
    }
    if key.code == KeyCode::Esc && !model.list.search.is_empty() {
        model.list.search.clear();
        reset_selection(&mut model);
        return done(model);
    }

    let len = model.visible().len();
    let Some(selected) = model.selected_notification() else {
        return match key.code {
            KeyCode::Char('R') => refresh(model),
            KeyCode::Char('/') => {
                model.list.searching = true;
                done(model)
            }
            _ => Done(model, vec![Command::Quit]),
        };
    };

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            if model.list.selected == 0 {
                if !model.list.search.is_empty() {
                    model.list.searching = true;
                }
            } else {
                model.list.selected -= 1;
                rescroll(&mut model, ScrollDirection::Up);
            }
            done(model)
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if model.list.selected + 1 < len {
                model.list.selected += 1;
                rescroll(&mut model, ScrollDirection::Down);
            }
            done(model)
        }
        KeyCode::Enter | KeyCode::Right => {
            model.page = Page::NotificationDetail;
            model.detail = DetailState {
                notification: Some(selected.clone()),
                loading_issue: true,
                ..DetailState::default()
            };
            Done(model, vec![Command::LoadIssue(selected)])
        }
        KeyCode::Backspace | KeyCode::Char('r') if !model.busy() => {
            model.marking_as_read = true;
            Done(model, vec![Command::MarkAsRead(selected)])
        }
        KeyCode::Char('u') if !model.busy() => {
            model.unsubscribing = true;
            Done(model, vec![Command::Unsubscribe(selected)])
        }
        KeyCode::Char('U') if !model.busy() => {
            let (owner, repo) = selected.owner_repo();
            let mut commands = vec![Command::Unwatch {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }];
            commands.extend(
                list::by_repository(&model.list.notifications, owner, repo)
                    .into_iter()
                    .cloned()
                    .map(Command::MarkAsRead),
            );
            model.unwatching = true;
            Done(model, commands)
        }
        KeyCode::Backspace | KeyCode::Char('r' | 'u' | 'U') => done(model),
        KeyCode::Char('o') => Done(model, vec![Command::OpenInBrowser(selected)]),
        KeyCode::Char('y') => Done(model, vec![Command::YankUrl(selected)]),
        KeyCode::Char('R') => refresh(model),
        KeyCode::Char('/') => {
            model.list.searching = true;
            done(model)
        }
        _ => Next(model, Message::Key(key)),
    }
}

fn search_key(mut model: Model, key: KeyEvent) -> Step {
    if let Some(c) = typed(&key) {
        model.list.search.push(c);
        reset_selection(&mut model);
        return done(model);
    }

    match key.code {
        KeyCode::Backspace => {
            model.list.search.pop();
            reset_selection(&mut model);
        }
        KeyCode::Esc => {
            model.list.searching = false;
            model.list.search.clear();
            reset_selection(&mut model);
        }
        KeyCode::Enter | KeyCode::Down => {
            model.list.searching = false;
            rescroll(&mut model, ScrollDirection::Down);
        }
        _ => {}
    }
    done(model)
}

// Detail page

fn detail(ctx: &Context, model: Model, msg: Message) -> Step {
    match msg {
        Message::Key(key) => detail_key(ctx, model, key),
        other => Next(model, other),
    }
}

/// Results for the open notification, whichever page is drawn over it.
fn detail_result(ctx: &Context, mut model: Model, msg: Message) -> Step {
    match msg {
        Message::IssueLoaded {
            notification_id,
            issue,
        } if model.detail.is_for(&notification_id) => {
            let number = issue.number;
            model.detail.issue = Some(*issue);
            model.detail.loading_issue = false;
            model.detail.loading_labels = true;
            model.detail.loading_comments = true;
            let commands = match model.detail.notification.clone() {
                Some(notification) => vec![
                    Command::LoadIssueLabels {
                        notification: notification.clone(),
                        number,
                    },
                    Command::LoadComments {
                        notification,
                        number,
                    },
                ],
                None => Vec::new(),
            };
            Done(model, commands)
        }
        Message::IssueLabelsLoaded {
            notification_id,
            labels,
        } if model.detail.is_for(&notification_id) => {
            model.detail.labels = labels;
            model.detail.loading_labels = false;
            clamp_detail_scroll(ctx, &mut model);
            done(model)
        }
        Message::CommentsLoaded {
            notification_id,
            comments,
        } if model.detail.is_for(&notification_id) => {
            model.detail.comments = comments;
            model.detail.loading_comments = false;
            clamp_detail_scroll(ctx, &mut model);
            done(model)
        }
        Message::CommentAdded { notification_id } if model.detail.is_for(&notification_id) => {
            model.notice = Some("Comment added.".to_string());
            let commands = match open_issue(&model) {
                Some((notification, number)) => {
                    model.detail.loading_comments = true;
                    vec![Command::LoadComments {
                        notification,
                        number,
                    }]
                }
                None => Vec::new(),
            };
            Done(model, commands)
        }
        Message::PriorityUpdated { notification_id } if model.detail.is_for(&notification_id) => {
            model.notice = Some("Priority updated.".to_string());
            let commands = reload_labels(&mut model);
            Done(model, commands)
        }
        Message::LabelsUpdated { notification_id } if model.detail.is_for(&notification_id) => {
            model.notice = Some("Labels updated.".to_string());
            let commands = reload_labels(&mut model);
            Done(model, commands)
        }
        other => Next(model, other),
    }
}

fn detail_key(ctx: &Context, mut model: Model, key: KeyEvent) -> Step {
    let Some(notification) = model.detail.notification.clone() else {
        return Next(model, Message::Key(key));
    };
    let step = (model.height as usize / 4).max(1);

    match key.code {
        KeyCode::Left => {
            model.page = Page::Notifications;
            model.detail.scroll = 0;
            done(model)
        }
        KeyCode::Up | KeyCode::Char('k') => {
            model.detail.scroll = model.detail.scroll.saturating_sub(step);
            done(model)
        }
        KeyCode::Down | KeyCode::Char('j') => {
            let max = detail_max_scroll(ctx, &model);
            model.detail.scroll = (model.detail.scroll + step).min(max);
            done(model)
        }
        KeyCode::Backspace if !model.busy() => {
            model.marking_as_read = true;
            model.page = Page::Notifications;
            model.detail.scroll = 0;
            Done(model, vec![Command::MarkAsRead(notification)])
        }
        KeyCode::Char('r') if !model.busy() => {
            model.marking_as_read = true;
            Done(model, vec![Command::MarkAsRead(notification)])
        }
        KeyCode::Char('u') if !model.busy() => {
            model.unsubscribing = true;
            Done(model, vec![Command::Unsubscribe(notification)])
        }
        KeyCode::Backspace | KeyCode::Char('r' | 'u') => done(model),
        KeyCode::Char('o') => Done(model, vec![Command::OpenInBrowser(notification)]),
        KeyCode::Char('y') => Done(model, vec![Command::YankUrl(notification)]),
        KeyCode::Char('l') if model.detail.issue.is_some() => {
            model.page = Page::Labels;
            model.detail.loading_labels = true;
            model.labels = LabelsState {
                loading: true,
                ..LabelsState::default()
            };
            Done(model, vec![Command::LoadRepoLabels(notification)])
        }
        KeyCode::Char('p') if model.detail.issue.is_some() => {
            model.page = Page::Priorities;
            model.priorities = PrioritiesState {
                options: ctx.config.priorities.clone(),
                cursor: 0,
            };
            done(model)
        }
        KeyCode::Char('c') if model.detail.issue.is_some() => {
            model.page = Page::Comment;
            model.comment.input.clear();
            done(model)
        }
        KeyCode::Char('l' | 'p' | 'c') => done(model),
        KeyCode::Char('R') => {
            model.detail = DetailState {
                notification: Some(notification.clone()),
                loading_issue: true,
                ..DetailState::default()
            };
            Done(model, vec![Command::LoadIssue(notification)])
        }
        _ => Next(model, Message::Key(key)),
    }
}

// Labels page

fn labels(ctx: &Context, mut model: Model, msg: Message) -> Step {
    match msg {
        Message::RepoLabelsLoaded {
            notification_id,
            labels,
        } if model.detail.is_for(&notification_id) => {
            model.labels.repo_labels = list::without_priorities(labels, &ctx.config.priorities);
            model.labels.cursor =
                list::clamp_selected(model.labels.cursor, model.labels.repo_labels.len());
            model.labels.loading = false;
            let commands = reload_labels(&mut model);
            Done(model, commands)
        }
        Message::IssueLabelsLoaded {
            notification_id,
            labels,
        } if model.detail.is_for(&notification_id) => {
            model.labels.selected = list::selected_indices(&model.labels.repo_labels, &labels);
            model.detail.labels = labels;
            model.detail.loading_labels = false;
            done(model)
        }
        Message::Key(key) => labels_key(model, key),
        other => Next(model, other),
    }
}

fn back_to_detail(mut model: Model) -> Step {
    model.page = Page::NotificationDetail;
    done(model)
}

fn labels_key(mut model: Model, key: KeyEvent) -> Step {
    if key.code == KeyCode::Esc {
        model.labels.loading = false;
        model.detail.loading_labels = false;
        return back_to_detail(model);
    }
    if model.labels.loading {
        return Next(model, Message::Key(key));
    }

    let len = model.labels.repo_labels.len();
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            model.labels.cursor = model.labels.cursor.saturating_sub(1);
            done(model)
        }
        KeyCode::Down | KeyCode::Char('j') => {
            model.labels.cursor = list::clamp_selected(model.labels.cursor + 1, len);
            done(model)
        }
        KeyCode::Char(' ') => {
            let cursor = model.labels.cursor;
            if cursor < len && !model.labels.selected.remove(&cursor) {
                model.labels.selected.insert(cursor);
            }
            done(model)
        }
        KeyCode::Enter => {
            let Some((notification, number)) = open_issue(&model) else {
                return back_to_detail(model);
            };
            let labels = model.labels.selected_names();
            tracing::debug!(?labels, number, "updating labels");
            model.page = Page::NotificationDetail;
            model.detail.loading_labels = true;
            Done(
                model,
                vec![Command::UpdateLabels {
                    notification,
                    number,
                    labels,
                }],
            )
        }
        _ => Next(model, Message::Key(key)),
    }
}

// Priorities page

fn priorities(ctx: &Context, mut model: Model, msg: Message) -> Step {
    let key = match msg {
        Message::Key(key) => key,
        other => return Next(model, other),
    };

    let len = model.priorities.options.len();
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            model.priorities.cursor = model.priorities.cursor.saturating_sub(1);
            done(model)
        }
        KeyCode::Down | KeyCode::Char('j') => {
            model.priorities.cursor = list::clamp_selected(model.priorities.cursor + 1, len);
            done(model)
        }
        KeyCode::Enter => {
            let chosen = model
                .priorities
                .options
                .get(model.priorities.cursor)
                .and_then(|p| ctx.config.priority(&p.name))
                .cloned();
            let (Some(priority), Some((notification, number))) = (chosen, open_issue(&model))
            else {
                return back_to_detail(model);
            };
            model.page = Page::NotificationDetail;
            model.detail.loading_labels = true;
            Done(
                model,
                vec![Command::UpdatePriority {
                    notification,
                    number,
                    priority,
                }],
            )
        }
        KeyCode::Esc => back_to_detail(model),
        _ => Next(model, Message::Key(key)),
    }
}

// Comment page

fn comment(mut model: Model, msg: Message) -> Step {
    let key = match msg {
        Message::Key(key) => key,
        other => return Next(model, other),
    };

    if let Some(c) = typed(&key) {
        model.comment.input.push(c);
        return done(model);
    }

    match key.code {
        KeyCode::Backspace => {
            model.comment.input.pop();
            done(model)
        }
        KeyCode::Enter => {
            let body = std::mem::take(&mut model.comment.input);
            model.page = Page::NotificationDetail;
            match open_issue(&model) {
                Some((notification, number)) if !body.trim().is_empty() => Done(
                    model,
                    vec![Command::AddComment {
                        notification,
                        number,
                        body,
                    }],
                ),
                _ => done(model),
            }
        }
        KeyCode::Esc => {
            model.comment.input.clear();
            back_to_detail(model)
        }
        _ => done(model),
    }
}

// Page-independent tier

fn remove_thread(mut model: Model, id: &str) -> Model {
    model.page = Page::Notifications;
    list::remove_by_id(&mut model.list.notifications, id);
    if model.detail.is_for(id) {
        model.detail = DetailState::default();
        model.labels = LabelsState::default();
    }
    model.detail.scroll = 0;
    rescroll(&mut model, ScrollDirection::Up);
    model
}

fn clear_flags(model: &mut Model, operation: Operation) {
    match operation {
        Operation::Dimensions | Operation::LoadNotifications => model.loading = false,
        Operation::LoadIssue => model.detail.loading_issue = false,
        Operation::LoadIssueLabels | Operation::UpdateLabels | Operation::UpdatePriority => {
            model.detail.loading_labels = false
        }
        Operation::LoadComments | Operation::AddComment => model.detail.loading_comments = false,
        Operation::LoadRepoLabels => {
            model.labels.loading = false;
            model.detail.loading_labels = false;
        }
        Operation::MarkAsRead => model.marking_as_read = false,
        Operation::Unsubscribe => model.unsubscribing = false,
        Operation::Unwatch => model.unwatching = false,
        Operation::Open | Operation::Yank => {}
    }
}

fn global(ctx: &Context, mut model: Model, msg: Message) -> (Model, Vec<Command>) {
    match msg {
        Message::MarkedAsRead { id } => {
            model.marking_as_read = false;
            (remove_thread(model, &id), Vec::new())
        }
        Message::Unsubscribed { id } => {
            model.unsubscribing = false;
            (remove_thread(model, &id), Vec::new())
        }
        Message::Unwatched { owner, repo } => {
            model.unwatching = false;
            model.page = Page::Notifications;
            model.notice = Some(format!("Unwatched {}/{}.", owner, repo));
            rescroll(&mut model, ScrollDirection::Up);
            (model, Vec::new())
        }
        Message::GotDimensions { width, height } => {
            model.width = width;
            model.height = height;
            model.loading = true;
            (model, vec![Command::LoadNotifications])
        }
        Message::Resized { width, height } => {
            model.width = width;
            model.height = height;
            let content = model.list_sticky() + model.visible().len() * list::ITEM_HEIGHT + 1;
            let max = viewport::max_scroll(content, model.view_height(), model.list_sticky());
            model.list.scroll = model.list.scroll.min(max);
            clamp_detail_scroll(ctx, &mut model);
            (model, Vec::new())
        }
        Message::Yanked(url) => {
            model.notice = Some(format!("Copied {}", url));
            (model, Vec::new())
        }
        Message::Failed {
            operation,
            notification_id: Some(id),
            ..
        } if !model.detail.is_for(&id) => {
            tracing::debug!(%operation, %id, "dropping failure for a closed notification");
            (model, Vec::new())
        }
        Message::Failed {
            operation, error, ..
        } => {
            tracing::warn!(%operation, %error, "operation failed");
            clear_flags(&mut model, operation);
            model.error = Some(format!("{}: {}", operation, error));
            (model, Vec::new())
        }
        Message::Key(key) if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) => {
            (model, vec![Command::Quit])
        }
        Message::Key(_) => (model, Vec::new()),
        stale => {
            tracing::debug!(?stale, page = ?model.page, "dropping stale result");
            (model, Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::fake::FakeApi;
    use crate::config::Config;
    use crate::types::fixtures::{comment, issue, label, notification};

    fn ctx() -> Context {
        Context::new(Arc::new(FakeApi::default()), Config::default())
    }

    fn key(code: KeyCode) -> Message {
        Message::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ch(c: char) -> Message {
        key(KeyCode::Char(c))
    }

    fn run(model: Model, messages: Vec<Message>) -> (Model, Vec<Command>) {
        let ctx = ctx();
        let mut commands = Vec::new();
        let model = messages.into_iter().fold(model, |model, msg| {
            let (model, mut cmds) = update(&ctx, model, msg);
            commands.append(&mut cmds);
            model
        });
        (model, commands)
    }

    /// Loaded list, newest first: "3" (tj/triage), "2" (tj/other), "1" (tj/triage).
    fn loaded() -> Model {
        let mut model = Model::default();
        model.width = 80;
        model.height = 30;
        model.loading = false;
        model.list.notifications = vec![
            notification("3", "tj/triage", 3),
            notification("2", "tj/other", 2),
            notification("1", "tj/triage", 1),
        ];
        model
    }

    fn in_detail() -> Model {
        let (mut model, _) = run(loaded(), vec![key(KeyCode::Enter)]);
        model.detail.issue = Some(issue(7));
        model.detail.loading_issue = false;
        model
    }

    #[test]
    fn startup_probes_dimensions_then_loads() {
        let (model, commands) = run(
            Model::default(),
            vec![Message::GotDimensions {
                width: 100,
                height: 40,
            }],
        );
        assert_eq!((model.width, model.height), (100, 40));
        assert!(model.loading);
        assert_eq!(commands, [Command::LoadNotifications]);
    }

    #[test]
    fn loaded_notifications_are_sorted_by_recency() {
        let (model, _) = run(
            Model::default(),
            vec![Message::NotificationsLoaded(vec![
                notification("A", "o/r", 3),
                notification("B", "o/r", 1),
                notification("C", "o/r", 2),
            ])],
        );
        assert!(!model.loading);
        let ids: Vec<_> = model.list.notifications.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["A", "C", "B"]);
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let (model, _) = run(loaded(), vec![ch('j'), ch('j'), ch('j'), ch('j')]);
        assert_eq!(model.list.selected, 2);
        let (model, _) = run(model, vec![ch('k'), key(KeyCode::Up), ch('k')]);
        assert_eq!(model.list.selected, 0);
        assert!(!model.list.searching);
    }

    #[test]
    fn up_at_top_refocuses_search() {
        let mut model = loaded();
        model.list.search = "tj".into();
        let (model, _) = run(model, vec![key(KeyCode::Up)]);
        assert!(model.list.searching);
    }

    #[test]
    fn search_filters_and_resets_selection() {
        let (model, _) = run(
            loaded(),
            vec![ch('j'), ch('/'), ch('o'), ch('t'), ch('h')],
        );
        assert!(model.list.searching);
        assert_eq!(model.list.search, "oth");
        assert_eq!(model.list.selected, 0);
        assert_eq!(model.visible().len(), 1);

        let (kept, _) = run(model.clone(), vec![key(KeyCode::Enter)]);
        assert!(!kept.list.searching);
        assert_eq!(kept.list.search, "oth");

        let (cleared, _) = run(model, vec![key(KeyCode::Esc)]);
        assert!(!cleared.list.searching);
        assert!(cleared.list.search.is_empty());
    }

    #[test]
    fn esc_clears_an_unfocused_filter_before_quitting() {
        let mut model = loaded();
        model.list.search = "nothing matches".into();
        let (model, commands) = run(model, vec![key(KeyCode::Esc)]);
        assert!(model.list.search.is_empty());
        assert!(commands.is_empty());
        assert_eq!(run(model, vec![key(KeyCode::Esc)]).1, [Command::Quit]);
    }

    #[test]
    fn q_while_searching_is_text() {
        let (model, commands) = run(loaded(), vec![ch('/'), ch('q')]);
        assert_eq!(model.list.search, "q");
        assert!(commands.is_empty());
    }

    #[test]
    fn q_and_esc_quit_from_the_list() {
        assert_eq!(run(loaded(), vec![ch('q')]).1, [Command::Quit]);
        assert_eq!(run(loaded(), vec![key(KeyCode::Esc)]).1, [Command::Quit]);
    }

    #[test]
    fn only_quit_keys_act_while_loading() {
        let mut model = loaded();
        model.loading = true;
        let (after, commands) = run(model.clone(), vec![ch('j'), key(KeyCode::Enter), ch('r')]);
        assert_eq!(after, model);
        assert!(commands.is_empty());
        assert_eq!(run(model, vec![ch('q')]).1, [Command::Quit]);
    }

    #[test]
    fn empty_list_quits_on_any_key_but_refresh_and_search() {
        let mut model = loaded();
        model.list.notifications.clear();
        assert_eq!(run(model.clone(), vec![ch('j')]).1, [Command::Quit]);
        assert_eq!(run(model.clone(), vec![ch('R')]).1, [Command::LoadNotifications]);
        let (model, commands) = run(model, vec![ch('/')]);
        assert!(model.list.searching);
        assert!(commands.is_empty());
    }

    #[test]
    fn enter_opens_detail_and_loads_issue() {
        let (model, commands) = run(loaded(), vec![ch('j'), key(KeyCode::Enter)]);
        assert_eq!(model.page, Page::NotificationDetail);
        assert!(model.detail.loading_issue);
        assert!(model.detail.is_for("2"));
        assert_eq!(commands, [Command::LoadIssue(notification("2", "tj/other", 2))]);
    }

    #[test]
    fn issue_load_fans_out_to_labels_and_comments() {
        let (model, _) = run(loaded(), vec![key(KeyCode::Enter)]);
        let (model, commands) = run(
            model,
            vec![Message::IssueLoaded {
                notification_id: "3".into(),
                issue: Box::new(issue(7)),
            }],
        );
        assert!(!model.detail.loading_issue);
        assert!(model.detail.loading_labels && model.detail.loading_comments);
        let n = notification("3", "tj/triage", 3);
        assert_eq!(
            commands,
            [
                Command::LoadIssueLabels {
                    notification: n.clone(),
                    number: 7
                },
                Command::LoadComments {
                    notification: n,
                    number: 7
                },
            ]
        );
    }

    #[test]
    fn results_for_another_notification_are_dropped() {
        let model = in_detail();
        let (after, commands) = run(
            model.clone(),
            vec![
                Message::IssueLoaded {
                    notification_id: "1".into(),
                    issue: Box::new(issue(99)),
                },
                Message::CommentsLoaded {
                    notification_id: "1".into(),
                    comments: vec![comment(1, "wrong")],
                },
            ],
        );
        assert_eq!(after, model);
        assert!(commands.is_empty());
    }

    #[test]
    fn labels_arriving_after_leaving_for_the_list_are_ignored() {
        let (model, commands) = run(
            in_detail(),
            vec![ch('l'), key(KeyCode::Esc), key(KeyCode::Left)],
        );
        assert_eq!(model.page, Page::Notifications);
        assert_eq!(commands.len(), 1);

        let (after, commands) = run(
            model.clone(),
            vec![
                Message::RepoLabelsLoaded {
                    notification_id: "3".into(),
                    labels: vec![label(1, "bug"), label(2, "docs")],
                },
                Message::IssueLabelsLoaded {
                    notification_id: "3".into(),
                    labels: vec![label(1, "bug")],
                },
            ],
        );
        assert_eq!(after, model);
        assert!(commands.is_empty());
        assert!(!after.loading && !after.labels.loading && !after.detail.loading_labels);
    }

    #[test]
    fn list_stays_usable_when_the_open_thread_is_read_during_a_labels_load() {
        let (model, _) = run(
            in_detail(),
            vec![
                ch('r'),
                ch('l'),
                Message::MarkedAsRead { id: "3".into() },
                Message::RepoLabelsLoaded {
                    notification_id: "3".into(),
                    labels: vec![label(1, "bug")],
                },
            ],
        );
        assert_eq!(model.page, Page::Notifications);
        assert!(!model.loading && !model.labels.loading);
        assert_eq!(model.labels, LabelsState::default());

        let (model, commands) = run(model, vec![ch('j')]);
        assert_eq!(model.list.selected, 1);
        assert!(commands.is_empty());
        assert_eq!(run(model, vec![ch('R')]).1, [Command::LoadNotifications]);
    }

    #[test]
    fn failure_for_a_closed_notification_is_dropped() {
        let (model, _) = run(
            loaded(),
            vec![key(KeyCode::Enter), key(KeyCode::Left), ch('j'), key(KeyCode::Enter)],
        );
        assert!(model.detail.is_for("2") && model.detail.loading_issue);

        let late = |id: &str| Message::Failed {
            operation: Operation::LoadIssue,
            notification_id: Some(id.into()),
            error: "timed out after 5s".into(),
        };
        let (after, commands) = run(model.clone(), vec![late("3")]);
        assert_eq!(after, model);
        assert!(commands.is_empty());

        let (after, _) = run(model, vec![late("2")]);
        assert!(!after.detail.loading_issue);
        assert_eq!(
            after.error.as_deref(),
            Some("fetching issue: timed out after 5s")
        );
    }

    #[test]
    fn priority_result_lands_while_commenting() {
        let (model, _) = run(in_detail(), vec![ch('p'), key(KeyCode::Enter), ch('c')]);
        assert_eq!(model.page, Page::Comment);
        assert!(model.detail.loading_labels);

        let (model, commands) = run(
            model,
            vec![Message::PriorityUpdated {
                notification_id: "3".into(),
            }],
        );
        assert_eq!(model.page, Page::Comment);
        assert_eq!(model.notice.as_deref(), Some("Priority updated."));
        assert_eq!(
            commands,
            [Command::LoadIssueLabels {
                notification: notification("3", "tj/triage", 3),
                number: 7
            }]
        );

        let (model, _) = run(
            model,
            vec![Message::IssueLabelsLoaded {
                notification_id: "3".into(),
                labels: vec![label(2, "Priority: High")],
            }],
        );
        assert!(!model.detail.loading_labels);
        assert_eq!(model.detail.labels.len(), 1);
    }

    #[test]
    fn labels_result_lands_while_choosing_a_priority() {
        let (mut model, _) = run(in_detail(), vec![ch('l'), key(KeyCode::Esc), ch('p')]);
        model.detail.loading_labels = true;

        let (model, commands) = run(
            model,
            vec![Message::LabelsUpdated {
                notification_id: "3".into(),
            }],
        );
        assert_eq!(model.page, Page::Priorities);
        assert_eq!(model.notice.as_deref(), Some("Labels updated."));
        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn comment_result_lands_while_editing_labels() {
        let (model, _) = run(
            in_detail(),
            vec![ch('c'), ch('x'), key(KeyCode::Enter), ch('l')],
        );
        assert_eq!(model.page, Page::Labels);

        let (model, commands) = run(
            model,
            vec![Message::CommentAdded {
                notification_id: "3".into(),
            }],
        );
        assert_eq!(model.page, Page::Labels);
        assert!(model.labels.loading);
        assert!(model.detail.loading_comments);
        assert_eq!(
            commands,
            [Command::LoadComments {
                notification: notification("3", "tj/triage", 3),
                number: 7
            }]
        );
    }

    #[test]
    fn mark_as_read_removes_by_id_once() {
        let (model, commands) = run(loaded(), vec![ch('j'), ch('r')]);
        assert!(model.marking_as_read);
        assert_eq!(commands, [Command::MarkAsRead(notification("2", "tj/other", 2))]);

        // a second destructive key is ignored while the first is in flight
        let (model, commands) = run(model, vec![ch('u'), ch('U')]);
        assert!(commands.is_empty());
        assert!(!model.unsubscribing && !model.unwatching);

        let done = Message::MarkedAsRead { id: "2".into() };
        let (model, _) = run(model, vec![done.clone()]);
        assert!(!model.marking_as_read);
        assert_eq!(model.list.notifications.len(), 2);
        assert_eq!(model.list.selected, 1);

        let (again, _) = run(model.clone(), vec![done]);
        assert_eq!(again.list, model.list);
    }

    #[test]
    fn removing_the_last_row_clamps_selection() {
        let (model, _) = run(
            loaded(),
            vec![ch('j'), ch('j'), Message::Unsubscribed { id: "1".into() }],
        );
        assert_eq!(model.list.selected, 1);
        let (model, _) = run(
            model,
            vec![
                Message::MarkedAsRead { id: "2".into() },
                Message::MarkedAsRead { id: "3".into() },
            ],
        );
        assert!(model.list.notifications.is_empty());
        assert_eq!(model.list.selected, 0);
    }

    #[test]
    fn unwatch_marks_every_repo_notification_read() {
        let (model, commands) = run(loaded(), vec![ch('U')]);
        assert!(model.unwatching);
        assert_eq!(
            commands,
            [
                Command::Unwatch {
                    owner: "tj".into(),
                    repo: "triage".into()
                },
                Command::MarkAsRead(notification("3", "tj/triage", 3)),
                Command::MarkAsRead(notification("1", "tj/triage", 1)),
            ]
        );

        let (model, _) = run(
            model,
            vec![
                Message::MarkedAsRead { id: "1".into() },
                Message::Unwatched {
                    owner: "tj".into(),
                    repo: "triage".into(),
                },
                Message::MarkedAsRead { id: "3".into() },
            ],
        );
        assert!(!model.unwatching);
        assert_eq!(model.visible().len(), 1);
    }

    #[test]
    fn backspace_in_detail_marks_read_and_returns() {
        let (model, commands) = run(in_detail(), vec![key(KeyCode::Backspace)]);
        assert_eq!(model.page, Page::Notifications);
        assert!(model.marking_as_read);
        assert_eq!(commands, [Command::MarkAsRead(notification("3", "tj/triage", 3))]);

        let (model, _) = run(model, vec![Message::MarkedAsRead { id: "3".into() }]);
        assert_eq!(model.page, Page::Notifications);
        assert_eq!(model.detail, DetailState::default());
    }

    #[test]
    fn detail_scroll_is_clamped_to_content() {
        let mut model = in_detail();
        model.height = 10;
        model.detail.comments = (0..20).map(|i| comment(i, "text")).collect();
        let (model, _) = run(model, (0..100).map(|_| ch('j')).collect());
        let max = detail_max_scroll(&ctx(), &model);
        assert!(max > 0);
        assert_eq!(model.detail.scroll, max);

        let (model, _) = run(model, (0..100).map(|_| ch('k')).collect());
        assert_eq!(model.detail.scroll, 0);
    }

    #[test]
    fn left_returns_to_the_list() {
        let (model, commands) = run(in_detail(), vec![key(KeyCode::Left)]);
        assert_eq!(model.page, Page::Notifications);
        assert!(commands.is_empty());
    }

    #[test]
    fn reload_clears_and_refetches_issue() {
        let mut model = in_detail();
        model.detail.labels = vec![label(1, "bug")];
        let (model, commands) = run(model, vec![ch('R')]);
        assert!(model.detail.issue.is_none());
        assert!(model.detail.labels.is_empty());
        assert!(model.detail.loading_issue);
        assert_eq!(commands, [Command::LoadIssue(notification("3", "tj/triage", 3))]);
    }

    #[test]
    fn labels_flow_selects_and_commits() {
        let n = notification("3", "tj/triage", 3);
        let (model, commands) = run(in_detail(), vec![ch('l')]);
        assert_eq!(model.page, Page::Labels);
        assert!(model.labels.loading && model.detail.loading_labels);
        assert!(!model.loading);
        assert_eq!(commands, [Command::LoadRepoLabels(n.clone())]);

        let (model, commands) = run(
            model,
            vec![Message::RepoLabelsLoaded {
                notification_id: "3".into(),
                labels: vec![
                    label(1, "bug"),
                    label(2, "Priority: High"),
                    label(3, "docs"),
                    label(4, "help"),
                ],
            }],
        );
        assert!(!model.labels.loading);
        let names: Vec<_> = model.labels.repo_labels.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["bug", "docs", "help"]);
        assert_eq!(
            commands,
            [Command::LoadIssueLabels {
                notification: n.clone(),
                number: 7
            }]
        );

        let (model, _) = run(
            model,
            vec![Message::IssueLabelsLoaded {
                notification_id: "3".into(),
                labels: vec![label(3, "docs"), label(2, "Priority: High")],
            }],
        );
        assert_eq!(model.labels.selected.iter().copied().collect::<Vec<_>>(), [1]);
        assert_eq!(model.detail.labels.len(), 2);

        // select bug, unselect docs, commit
        let (model, commands) = run(
            model,
            vec![ch(' '), ch('j'), ch(' '), ch('j'), ch('j'), key(KeyCode::Enter)],
        );
        assert_eq!(model.page, Page::NotificationDetail);
        assert_eq!(
            commands,
            [Command::UpdateLabels {
                notification: n.clone(),
                number: 7,
                labels: vec!["bug".into()],
            }]
        );

        let (_, commands) = run(
            model,
            vec![Message::LabelsUpdated {
                notification_id: "3".into(),
            }],
        );
        assert_eq!(
            commands,
            [Command::LoadIssueLabels {
                notification: n,
                number: 7
            }]
        );
    }

    #[test]
    fn labels_esc_aborts_while_loading() {
        let (model, commands) = run(in_detail(), vec![ch('l'), key(KeyCode::Esc)]);
        assert_eq!(model.page, Page::NotificationDetail);
        assert!(!model.labels.loading && !model.detail.loading_labels);
        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn priority_selection_resolves_from_config() {
        let (model, commands) = run(in_detail(), vec![ch('p'), ch('j'), key(KeyCode::Enter)]);
        assert_eq!(model.page, Page::NotificationDetail);
        let medium = Config::default().priority("Medium").cloned().unwrap();
        assert_eq!(
            commands,
            [Command::UpdatePriority {
                notification: notification("3", "tj/triage", 3),
                number: 7,
                priority: medium,
            }]
        );

        let (model, commands) = run(
            model,
            vec![Message::PriorityUpdated {
                notification_id: "3".into(),
            }],
        );
        assert!(model.detail.loading_labels);
        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn priority_esc_aborts() {
        let (model, commands) = run(in_detail(), vec![ch('p'), key(KeyCode::Esc)]);
        assert_eq!(model.page, Page::NotificationDetail);
        assert!(commands.is_empty());
    }

    #[test]
    fn comment_is_posted_and_reloaded() {
        let (model, commands) = run(
            in_detail(),
            vec![ch('c'), ch('h'), ch('i'), ch('!'), key(KeyCode::Backspace), key(KeyCode::Enter)],
        );
        assert_eq!(model.page, Page::NotificationDetail);
        assert!(model.comment.input.is_empty());
        assert_eq!(
            commands,
            [Command::AddComment {
                notification: notification("3", "tj/triage", 3),
                number: 7,
                body: "hi".into(),
            }]
        );

        let (model, commands) = run(
            model,
            vec![Message::CommentAdded {
                notification_id: "3".into(),
            }],
        );
        assert!(model.detail.loading_comments);
        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn blank_comment_is_not_posted() {
        let (model, commands) =
            run(in_detail(), vec![ch('c'), ch(' '), key(KeyCode::Enter)]);
        assert_eq!(model.page, Page::NotificationDetail);
        assert!(commands.is_empty());
    }

    #[test]
    fn failure_clears_its_flag_and_shows_until_next_key() {
        let (model, _) = run(loaded(), vec![ch('r')]);
        let (model, _) = run(
            model,
            vec![Message::Failed {
                operation: Operation::MarkAsRead,
                notification_id: None,
                error: "API error: 500: boom".into(),
            }],
        );
        assert!(!model.marking_as_read);
        assert_eq!(model.list.notifications.len(), 3);
        assert_eq!(
            model.error.as_deref(),
            Some("marking thread as read: API error: 500: boom")
        );

        let (model, _) = run(model, vec![ch('j')]);
        assert!(model.error.is_none());
        assert_eq!(model.list.selected, 1);
    }

    #[test]
    fn failed_load_stops_loading() {
        let mut model = loaded();
        model.loading = true;
        let (model, _) = run(
            model,
            vec![Message::Failed {
                operation: Operation::LoadNotifications,
                notification_id: None,
                error: "timed out after 5s".into(),
            }],
        );
        assert!(!model.loading);
    }

    #[test]
    fn resize_clamps_scroll() {
        let mut model = loaded();
        model.list.notifications = (0..30)
            .map(|i| notification(&i.to_string(), "o/r", i))
            .collect();
        model.height = 12;
        let (model, _) = run(model, (0..29).map(|_| ch('j')).collect());
        assert!(model.list.scroll > 0);

        let (model, commands) = run(
            model,
            vec![Message::Resized {
                width: 80,
                height: 200,
            }],
        );
        assert_eq!(model.list.scroll, 0);
        assert!(commands.is_empty());
    }

    #[test]
    fn selection_stays_within_visible_list() {
        let mut model = loaded();
        let script = [
            ch('j'),
            ch('j'),
            Message::MarkedAsRead { id: "1".into() },
            ch('j'),
            ch('/'),
            ch('t'),
            key(KeyCode::Enter),
            ch('j'),
            Message::Unsubscribed { id: "3".into() },
            ch('k'),
            ch('j'),
        ];
        let ctx = ctx();
        for msg in script {
            model = update(&ctx, model, msg).0;
            let len = model.visible().len();
            assert!(len == 0 || model.list.selected < len);
        }
    }
}

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::models::notification::{Notification, NotificationKind};
use crate::models::parse_variant;
use crate::store::{new_id, Store, MAX_NOTIFICATIONS};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    pub user_id: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub unread_only: Option<bool>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PagePagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub pagination: PagePagination,
    pub unread_count: usize,
}

pub fn list(store: &Store, query: &NotificationQuery) -> NotificationPage {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).max(1);
    let user = query.user_id.as_deref();
    let unread_only = query.unread_only.unwrap_or(false);

    let all = store.notifications.read();
    let unread_count = all.iter().filter(|n| !n.read && n.belongs_to(user)).count();

    let mut matching: Vec<&Notification> = all
        .iter()
        .filter(|n| n.belongs_to(user))
        .filter(|n| !unread_only || !n.read)
        .collect();
    matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let total = matching.len();
    let start = (page - 1).saturating_mul(limit);
    let notifications = matching
        .into_iter()
        .skip(start)
        .take(limit)
        .cloned()
        .collect();

    NotificationPage {
        notifications,
        pagination: PagePagination {
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit),
            has_next: start.saturating_add(limit) < total,
            has_prev: page > 1,
        },
        unread_count,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub user_id: Option<String>,
    pub metadata: Option<Value>,
}

/// Prepends the notification, keeping only the newest `MAX_NOTIFICATIONS`.
pub fn create(store: &Store, input: NewNotification) -> Result<Notification, AppError> {
    let (Some(kind), Some(title)) = (
        input.kind.filter(|s| !s.is_empty()),
        input.title.filter(|s| !s.trim().is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Type and title are required".to_string(),
        ));
    };
    let kind: NotificationKind = parse_variant(&kind)
        .ok_or_else(|| AppError::Validation("Invalid notification type".to_string()))?;

    let notification = Notification {
        id: new_id(),
        kind,
        title,
        message: input.message,
        timestamp: Utc::now(),
        read: false,
        user_id: input.user_id,
        metadata: input.metadata,
    };

    let mut all = store.notifications.write();
    all.insert(0, notification.clone());
    all.truncate(MAX_NOTIFICATIONS);
    Ok(notification)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAction {
    pub action: Option<String>,
    pub notification_ids: Option<Vec<String>>,
    pub user_id: Option<String>,
}

enum Action {
    MarkAsRead(HashSet<String>),
    MarkAllAsRead,
    Delete(HashSet<String>),
    Clear,
}

impl Action {
    fn parse(input: BulkAction) -> Result<Self, AppError> {
        let ids = |ids: Option<Vec<String>>| {
            ids.map(|v| v.into_iter().collect::<HashSet<_>>())
                .ok_or_else(|| {
                    AppError::Validation("notificationIds are required for this action".to_string())
                })
        };
        match input.action.as_deref() {
            None | Some("") => Err(AppError::Validation("Action is required".to_string())),
            Some("markAsRead") => Ok(Action::MarkAsRead(ids(input.notification_ids)?)),
            Some("markAllAsRead") => Ok(Action::MarkAllAsRead),
            Some("delete") => Ok(Action::Delete(ids(input.notification_ids)?)),
            Some("clear") => Ok(Action::Clear),
            Some(other) => Err(AppError::Validation(format!("Unknown action: {other}"))),
        }
    }
}

/// Applies a bulk action and returns how many notifications it touched.
pub fn bulk(store: &Store, input: BulkAction) -> Result<usize, AppError> {
    let user = input.user_id.clone();
    let user = user.as_deref();
    let action = Action::parse(input)?;

    let mut all = store.notifications.write();
    let updated = match action {
        Action::MarkAsRead(ids) => {
            mark_read(&mut all, |n| ids.contains(&n.id) && n.belongs_to(user))
        }
        Action::MarkAllAsRead => mark_read(&mut all, |n| !n.read && n.belongs_to(user)),
        Action::Delete(ids) => {
            let before = all.len();
            all.retain(|n| !(ids.contains(&n.id) && n.belongs_to(user)));
            before - all.len()
        }
        Action::Clear => {
            let before = all.len();
            all.retain(|n| !n.belongs_to(user));
            before - all.len()
        }
    };
    Ok(updated)
}

fn mark_read(all: &mut [Notification], selected: impl Fn(&Notification) -> bool) -> usize {
    let mut touched = 0;
    for n in all.iter_mut().filter(|n| selected(n)) {
        n.read = true;
        touched += 1;
    }
    touched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(store: &Store, title: &str, user: Option<&str>) -> Notification {
        create(
            store,
            NewNotification {
                kind: Some("info".to_string()),
                title: Some(title.to_string()),
                user_id: user.map(str::to_string),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_create_validates_type() {
        let store = Store::default();
        let err = create(
            &store,
            NewNotification {
                kind: Some("urgent".to_string()),
                title: Some("x".to_string()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "Invalid notification type"));
    }

    #[test]
    fn test_store_is_capped_newest_first() {
        let store = Store::default();
        for i in 0..MAX_NOTIFICATIONS + 5 {
            push(&store, &format!("n{i}"), None);
        }
        let all = store.notifications.read();
        assert_eq!(all.len(), MAX_NOTIFICATIONS);
        assert_eq!(all[0].title, format!("n{}", MAX_NOTIFICATIONS + 4));
    }

    #[test]
    fn test_list_pagination_and_unread_count() {
        let store = Store::default();
        for i in 0..5 {
            push(&store, &format!("n{i}"), Some("u1"));
        }
        push(&store, "other", Some("u2"));

        let page = list(
            &store,
            &NotificationQuery {
                user_id: Some("u1".to_string()),
                page: Some(2),
                limit: Some(2),
                ..Default::default()
            },
        );
        assert_eq!(page.notifications.len(), 2);
        assert_eq!(
            page.pagination,
            PagePagination {
                page: 2,
                limit: 2,
                total: 5,
                total_pages: 3,
                has_next: true,
                has_prev: true,
            }
        );
        assert_eq!(page.unread_count, 5);
    }

    #[test]
    fn test_mark_as_read_then_unread_only() {
        let store = Store::default();
        let a = push(&store, "a", None);
        push(&store, "b", None);

        let updated = bulk(
            &store,
            BulkAction {
                action: Some("markAsRead".to_string()),
                notification_ids: Some(vec![a.id.clone()]),
                user_id: None,
            },
        )
        .unwrap();
        assert_eq!(updated, 1);

        let page = list(
            &store,
            &NotificationQuery {
                unread_only: Some(true),
                ..Default::default()
            },
        );
        assert_eq!(page.notifications.len(), 1);
        assert_eq!(page.notifications[0].title, "b");
        assert_eq!(page.unread_count, 1);
    }

    #[test]
    fn test_clear_scoped_and_unscoped() {
        let store = Store::default();
        push(&store, "mine", Some("u1"));
        push(&store, "theirs", Some("u2"));
        push(&store, "global", None);

        let cleared = bulk(
            &store,
            BulkAction {
                action: Some("clear".to_string()),
                user_id: Some("u1".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(cleared, 1);
        assert_eq!(store.notifications.read().len(), 2);

        let cleared = bulk(
            &store,
            BulkAction {
                action: Some("clear".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(cleared, 2);
        assert!(store.notifications.read().is_empty());
    }

    #[test]
    fn test_delete_respects_user_scope() {
        let store = Store::default();
        let n = push(&store, "mine", Some("u1"));
        let deleted = bulk(
            &store,
            BulkAction {
                action: Some("delete".to_string()),
                notification_ids: Some(vec![n.id]),
                user_id: Some("u2".to_string()),
            },
        )
        .unwrap();
        assert_eq!(deleted, 0);
        assert_eq!(store.notifications.read().len(), 1);
    }

    #[test]
    fn test_unknown_or_missing_action_rejected() {
        let store = Store::default();
        assert!(bulk(&store, BulkAction::default()).is_err());
        let err = bulk(
            &store,
            BulkAction {
                action: Some("archive".to_string()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}

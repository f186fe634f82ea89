use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::calendar::{CalendarEvent, EventKind};
use crate::models::{parse_variant, Level};
use crate::store::{new_id, Store};

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn required_date(raw: &str, field: &str) -> Result<DateTime<Utc>, AppError> {
    parse_date(raw).ok_or_else(|| AppError::Validation(format!("Invalid {field}: {raw}")))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventQuery {
    pub user_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub priority: Option<String>,
    pub deal_id: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct EventList {
    pub events: Vec<CalendarEvent>,
    pub total: usize,
    pub upcoming: usize,
    pub overdue: usize,
}

pub fn list(store: &Store, query: &EventQuery) -> Result<EventList, AppError> {
    // the range only applies when both ends are given
    let range = match (query.start_date.as_deref(), query.end_date.as_deref()) {
        (Some(start), Some(end)) => Some((
            required_date(start, "startDate")?,
            required_date(end, "endDate")?,
        )),
        _ => None,
    };

    let mut events: Vec<CalendarEvent> = store
        .events
        .read()
        .iter()
        .filter(|e| query.user_id.as_deref().map_or(true, |u| e.user_id == u))
        .filter(|e| range.map_or(true, |(start, end)| e.date >= start && e.date <= end))
        .filter(|e| query.kind.as_deref().map_or(true, |k| e.kind.as_str() == k))
        .filter(|e| {
            query
                .priority
                .as_deref()
                .map_or(true, |p| e.priority.as_str() == p)
        })
        .filter(|e| {
            query
                .deal_id
                .as_deref()
                .map_or(true, |d| e.deal_id.as_deref() == Some(d))
        })
        .filter(|e| query.completed.map_or(true, |c| e.completed == c))
        .cloned()
        .collect();

    events.sort_by(|a, b| a.date.cmp(&b.date));

    let now = Utc::now();
    let upcoming = events.iter().filter(|e| e.date > now).count();
    let overdue = events
        .iter()
        .filter(|e| e.date < now && !e.completed)
        .count();

    Ok(EventList {
        total: events.len(),
        events,
        upcoming,
        overdue,
    })
}

fn parse_kind(raw: &str) -> Result<EventKind, AppError> {
    parse_variant(raw).ok_or_else(|| AppError::Validation("Invalid event type".to_string()))
}

fn parse_priority(raw: &str) -> Result<Level, AppError> {
    parse_variant(raw).ok_or_else(|| AppError::Validation("Invalid priority".to_string()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub priority: Option<String>,
    pub deal_id: Option<String>,
    pub deal_name: Option<String>,
    pub user_id: Option<String>,
}

pub fn create(store: &Store, input: NewEvent) -> Result<CalendarEvent, AppError> {
    let (Some(title), Some(date), Some(kind), Some(priority)) = (
        input.title.filter(|s| !s.trim().is_empty()),
        input.date.filter(|s| !s.is_empty()),
        input.kind.filter(|s| !s.is_empty()),
        input.priority.filter(|s| !s.is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Title, date, type, and priority are required".to_string(),
        ));
    };

    let kind = parse_kind(&kind)?;
    let priority = parse_priority(&priority)?;
    let date = required_date(&date, "date")?;
    let now = Utc::now();

    let event = CalendarEvent {
        id: new_id(),
        title,
        description: input.description,
        date,
        kind,
        priority,
        deal_id: input.deal_id,
        deal_name: input.deal_name,
        completed: false,
        user_id: input.user_id.unwrap_or_else(|| "system".to_string()),
        created_at: now,
        updated_at: now,
    };
    store.events.write().push(event.clone());
    Ok(event)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub priority: Option<String>,
    pub deal_id: Option<String>,
    pub deal_name: Option<String>,
    pub completed: Option<bool>,
}

pub fn update(store: &Store, patch: EventPatch) -> Result<CalendarEvent, AppError> {
    let id = patch
        .id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("Event id is required".to_string()))?;

    // validate before taking the lock
    let kind = patch.kind.as_deref().map(parse_kind).transpose()?;
    let priority = patch.priority.as_deref().map(parse_priority).transpose()?;
    let date = patch
        .date
        .as_deref()
        .map(|d| required_date(d, "date"))
        .transpose()?;

    let mut events = store.events.write();
    let event = events
        .iter_mut()
        .find(|e| e.id == id)
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    if let Some(title) = patch.title {
        event.title = title;
    }
    if patch.description.is_some() {
        event.description = patch.description;
    }
    if let Some(date) = date {
        event.date = date;
    }
    if let Some(kind) = kind {
        event.kind = kind;
    }
    if let Some(priority) = priority {
        event.priority = priority;
    }
    if patch.deal_id.is_some() {
        event.deal_id = patch.deal_id;
    }
    if patch.deal_name.is_some() {
        event.deal_name = patch.deal_name;
    }
    if let Some(completed) = patch.completed {
        event.completed = completed;
    }
    event.updated_at = Utc::now();
    Ok(event.clone())
}

pub fn delete(store: &Store, id: Option<&str>) -> Result<CalendarEvent, AppError> {
    let id = id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("Event id is required".to_string()))?;
    let mut events = store.events.write();
    let index = events
        .iter()
        .position(|e| e.id == id)
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
    Ok(events.remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date("2024-03-15").is_some());
        assert!(parse_date("2024-03-15T10:30:00Z").is_some());
        assert!(parse_date("2024-03-15T10:30:00+03:00").is_some());
        assert!(parse_date("next tuesday").is_none());
    }

    #[test]
    fn test_list_sorted_ascending_with_counts() {
        let store = Store::seeded();
        let list = list(&store, &EventQuery::default()).unwrap();
        assert_eq!(list.total, 4);
        assert!(list.events.windows(2).all(|w| w[0].date <= w[1].date));
        assert_eq!(list.upcoming, 4);
        assert_eq!(list.overdue, 0);
        assert_eq!(list.events[0].kind, EventKind::Milestone);
    }

    #[test]
    fn test_range_needs_both_ends() {
        let store = Store::seeded();
        let tomorrow_plus = (Utc::now() + Duration::days(4)).to_rfc3339();
        let query = EventQuery {
            start_date: Some(Utc::now().to_rfc3339()),
            end_date: Some(tomorrow_plus.clone()),
            ..Default::default()
        };
        assert_eq!(list(&store, &query).unwrap().total, 3);

        let query = EventQuery {
            end_date: Some(tomorrow_plus),
            ..Default::default()
        };
        assert_eq!(list(&store, &query).unwrap().total, 4);
    }

    #[test]
    fn test_overdue_counts_past_incomplete() {
        let store = Store::default();
        let past = (Utc::now() - Duration::days(2)).to_rfc3339();
        let event = create(
            &store,
            NewEvent {
                title: Some("Board sign-off".to_string()),
                date: Some(past),
                kind: Some("deadline".to_string()),
                priority: Some("high".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(event.user_id, "system");
        assert_eq!(list(&store, &EventQuery::default()).unwrap().overdue, 1);

        update(
            &store,
            EventPatch {
                id: Some(event.id),
                completed: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(list(&store, &EventQuery::default()).unwrap().overdue, 0);
    }

    #[test]
    fn test_create_validation() {
        let store = Store::default();
        let base = || NewEvent {
            title: Some("Call".to_string()),
            date: Some("2030-01-01".to_string()),
            kind: Some("meeting".to_string()),
            priority: Some("low".to_string()),
            ..Default::default()
        };
        assert!(create(&store, base()).is_ok());

        let mut bad = base();
        bad.kind = Some("party".to_string());
        assert!(matches!(create(&store, bad), Err(AppError::Validation(m)) if m == "Invalid event type"));

        let mut bad = base();
        bad.priority = Some("urgent".to_string());
        assert!(create(&store, bad).is_err());

        let mut bad = base();
        bad.title = None;
        assert!(create(&store, bad).is_err());
    }

    #[test]
    fn test_update_and_delete_missing() {
        let store = Store::seeded();
        let err = update(
            &store,
            EventPatch {
                id: Some("nope".to_string()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(matches!(delete(&store, None), Err(AppError::Validation(_))));
        assert!(matches!(delete(&store, Some("nope")), Err(AppError::NotFound(_))));
        assert_eq!(delete(&store, Some("1")).unwrap().id, "1");
    }
}

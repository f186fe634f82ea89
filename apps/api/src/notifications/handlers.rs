use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{KeepAlive, Sse},
    Json,
};
use futures::Stream;
use serde::Serialize;

use crate::errors::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::models::notification::Notification;
use crate::notifications::feed;
use crate::notifications::repo::{self, BulkAction, NewNotification, NotificationPage, NotificationQuery};
use crate::response::Envelope;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkResult {
    pub updated_count: usize,
}

/// GET /api/notifications
pub async fn handle_list_notifications(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NotificationQuery>,
) -> Json<Envelope<NotificationPage>> {
    Json(Envelope::ok(repo::list(&state.store, &query)))
}

/// POST /api/notifications
pub async fn handle_create_notification(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewNotification>,
) -> Result<(StatusCode, Json<Envelope<Notification>>), AppError> {
    let notification = repo::create(&state.store, input)?;
    let delivered = state.hub.publish(notification.clone());
    tracing::debug!(
        "Notification {} pushed to {delivered} live streams",
        notification.id
    );
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            notification,
            "Notification created successfully",
        )),
    ))
}

/// PATCH /api/notifications
pub async fn handle_bulk_notifications(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<BulkAction>,
) -> Result<Json<Envelope<BulkResult>>, AppError> {
    let updated_count = repo::bulk(&state.store, input)?;
    Ok(Json(Envelope::with_message(
        BulkResult { updated_count },
        format!("Updated {updated_count} notifications"),
    )))
}

/// GET /api/notifications/stream
pub async fn handle_notification_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, axum::Error>>> {
    let period = Duration::from_secs(state.config.notification_interval_secs.max(1));
    tracing::info!("SSE client connected to notification stream");
    Sse::new(feed::event_stream(state.hub.clone(), period)).keep_alive(KeepAlive::default())
}

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::calendar::repo::{self, EventList, EventPatch, EventQuery, NewEvent};
use crate::errors::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::models::calendar::CalendarEvent;
use crate::response::Envelope;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DeleteEventQuery {
    pub id: Option<String>,
}

/// GET /api/calendar/events
pub async fn handle_list_events(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EventQuery>,
) -> Result<Json<Envelope<EventList>>, AppError> {
    Ok(Json(Envelope::ok(repo::list(&state.store, &query)?)))
}

/// POST /api/calendar/events
pub async fn handle_create_event(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewEvent>,
) -> Result<(StatusCode, Json<Envelope<CalendarEvent>>), AppError> {
    let event = repo::create(&state.store, input)?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(event, "Event created successfully")),
    ))
}

/// PATCH /api/calendar/events
pub async fn handle_update_event(
    State(state): State<AppState>,
    ApiJson(patch): ApiJson<EventPatch>,
) -> Result<Json<Envelope<CalendarEvent>>, AppError> {
    let event = repo::update(&state.store, patch)?;
    Ok(Json(Envelope::with_message(event, "Event updated successfully")))
}

/// DELETE /api/calendar/events?id=
pub async fn handle_delete_event(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DeleteEventQuery>,
) -> Result<Json<Envelope<CalendarEvent>>, AppError> {
    let event = repo::delete(&state.store, query.id.as_deref())?;
    Ok(Json(Envelope::with_message(event, "Event deleted successfully")))
}

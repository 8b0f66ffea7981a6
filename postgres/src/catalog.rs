//! Event catalog queries.

use chrono::Utc;
use seatbook_core::catalog::{EventCatalog, EventFilter, EventPage, EventUpdate, NewEvent};
use seatbook_core::error::{LedgerError, Result};
use seatbook_core::inventory::Inventory;
use seatbook_core::retry::retry_on_conflict;
use seatbook_core::types::{Event, EventDetails, EventId, UserId};
use seatbook_core::BoxFuture;
use uuid::Uuid;

use crate::PostgresStore;
use crate::error::db_error;
use crate::ledger::{apply_locked_delta, observe_conflicts};
use crate::rows::{EVENT_COLUMNS, EventDetailsRow, EventRow, seats_to_i32};

/// Upcoming-event predicate shared by the page and count queries.
///
/// `$1` is the category, `$2` the `ILIKE` pattern; either may be `NULL`.
const LISTING_FILTER: &str = "event_date >= now()
      AND ($1::text IS NULL OR category = $1)
      AND ($2::text IS NULL OR title ILIKE $2 OR description ILIKE $2)";

/// Turns a search term into an `ILIKE` pattern matching it literally.
fn search_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

impl PostgresStore {
    async fn fetch_event(&self, event_id: EventId) -> Result<Event> {
        let row: Option<EventRow> =
            sqlx::query_as(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
                .bind(event_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to get event"))?;
        row.ok_or_else(|| LedgerError::not_found("Event", event_id))?
            .try_into()
    }

    async fn try_apply_delta(&self, event_id: EventId, delta: i64) -> Result<Inventory> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to start transaction"))?;
        let (after, _) = apply_locked_delta(&mut tx, event_id, delta)
            .await?
            .ok_or_else(|| LedgerError::not_found("Event", event_id))?;
        tx.commit()
            .await
            .map_err(db_error("Failed to commit seat delta"))?;
        Ok(after)
    }

    async fn try_update_event(
        &self,
        event_id: EventId,
        organizer_id: UserId,
        update: &EventUpdate,
    ) -> Result<Event> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to start transaction"))?;

        let row: Option<EventRow> = sqlx::query_as(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 FOR UPDATE"
        ))
        .bind(event_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock event"))?;
        let mut event: Event = row
            .ok_or_else(|| LedgerError::not_found("Event", event_id))?
            .try_into()?;

        if event.organizer_id != organizer_id {
            return Err(LedgerError::Unauthorized("Unauthorized".to_string()));
        }
        update.apply_to(&mut event, Utc::now())?;

        let row: EventRow = sqlx::query_as(&format!(
            "UPDATE events
             SET title = $2, description = $3, location = $4, event_date = $5,
                 ticket_price_cents = $6, total_seats = $7, available_seats = $8,
                 image_url = $9, category = $10, updated_at = $11
             WHERE id = $1
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(event_id.as_uuid())
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.event_date)
        .bind(event.ticket_price.to_i64()?)
        .bind(seats_to_i32(event.total_seats)?)
        .bind(seats_to_i32(event.available_seats)?)
        .bind(&event.image_url)
        .bind(&event.category)
        .bind(event.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to update event"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit event update"))?;
        row.try_into()
    }
}

impl EventCatalog for PostgresStore {
    fn create_event(&self, organizer_id: UserId, event: NewEvent) -> BoxFuture<'_, Result<Event>> {
        Box::pin(async move {
            event.validate()?;
            let seats = seats_to_i32(event.total_seats)?;

            let row: EventRow = sqlx::query_as(&format!(
                "INSERT INTO events
                     (id, organizer_id, title, description, location, event_date,
                      ticket_price_cents, total_seats, available_seats, image_url, category)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8, $9, $10)
                 RETURNING {EVENT_COLUMNS}"
            ))
            .bind(Uuid::new_v4())
            .bind(organizer_id.as_uuid())
            .bind(&event.title)
            .bind(&event.description)
            .bind(&event.location)
            .bind(event.event_date)
            .bind(event.ticket_price.to_i64()?)
            .bind(seats)
            .bind(&event.image_url)
            .bind(&event.category)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to create event"))?;

            let created: Event = row.try_into()?;
            metrics::counter!("seatbook_events_created_total").increment(1);
            tracing::info!(event_id = %created.id, organizer_id = %organizer_id, seats, "Event created");
            Ok(created)
        })
    }

    fn get_event(&self, event_id: EventId) -> BoxFuture<'_, Result<Event>> {
        Box::pin(self.fetch_event(event_id))
    }

    fn get_event_details(&self, event_id: EventId) -> BoxFuture<'_, Result<EventDetails>> {
        Box::pin(async move {
            let row: Option<EventDetailsRow> = sqlx::query_as(
                "SELECT e.id, e.organizer_id, e.title, e.description, e.location, e.event_date,
                        e.ticket_price_cents, e.total_seats, e.available_seats, e.image_url,
                        e.category, e.created_at, e.updated_at,
                        u.name AS organizer_name, u.email AS organizer_email
                 FROM events e
                 LEFT JOIN users u ON u.id = e.organizer_id
                 WHERE e.id = $1",
            )
            .bind(event_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to get event details"))?;
            row.ok_or_else(|| LedgerError::not_found("Event", event_id))?
                .try_into()
        })
    }

    fn list_events(&self, filter: EventFilter) -> BoxFuture<'_, Result<EventPage>> {
        Box::pin(async move {
            let pattern = filter.search.as_deref().map(search_pattern);

            let rows: Vec<EventRow> = sqlx::query_as(&format!(
                "SELECT {EVENT_COLUMNS} FROM events
                 WHERE {LISTING_FILTER}
                 ORDER BY event_date ASC
                 LIMIT $3 OFFSET $4"
            ))
            .bind(&filter.category)
            .bind(&pattern)
            .bind(filter.limit())
            .bind(filter.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list events"))?;

            let (total,): (i64,) =
                sqlx::query_as(&format!("SELECT COUNT(*) FROM events WHERE {LISTING_FILTER}"))
                    .bind(&filter.category)
                    .bind(&pattern)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(db_error("Failed to count events"))?;

            let events = rows
                .into_iter()
                .map(Event::try_from)
                .collect::<Result<Vec<_>>>()?;
            Ok(EventPage { events, total })
        })
    }

    fn update_event(
        &self,
        event_id: EventId,
        organizer_id: UserId,
        update: EventUpdate,
    ) -> BoxFuture<'_, Result<Event>> {
        Box::pin(async move {
            update.validate()?;
            let event = retry_on_conflict(&self.retry, "update_event", || {
                observe_conflicts(self.try_update_event(event_id, organizer_id, &update))
            })
            .await?;
            tracing::info!(event_id = %event_id, "Event updated");
            Ok(event)
        })
    }

    fn delete_event(&self, event_id: EventId, organizer_id: UserId) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(db_error("Failed to start transaction"))?;

            let owner: Option<(Uuid,)> =
                sqlx::query_as("SELECT organizer_id FROM events WHERE id = $1 FOR UPDATE")
                    .bind(event_id.as_uuid())
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(db_error("Failed to lock event"))?;
            let (owner,) = owner.ok_or_else(|| LedgerError::not_found("Event", event_id))?;
            if owner != *organizer_id.as_uuid() {
                return Err(LedgerError::Unauthorized("Unauthorized".to_string()));
            }

            let (has_bookings,): (bool,) =
                sqlx::query_as("SELECT EXISTS(SELECT 1 FROM bookings WHERE event_id = $1)")
                    .bind(event_id.as_uuid())
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(db_error("Failed to check bookings"))?;
            if has_bookings {
                return Err(LedgerError::Validation(
                    "Cannot delete an event that has bookings".to_string(),
                ));
            }

            sqlx::query("DELETE FROM events WHERE id = $1")
                .bind(event_id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to delete event"))?;
            tx.commit()
                .await
                .map_err(db_error("Failed to commit event deletion"))?;

            tracing::info!(event_id = %event_id, "Event deleted");
            Ok(())
        })
    }

    fn apply_delta(&self, event_id: EventId, delta: i64) -> BoxFuture<'_, Result<Inventory>> {
        Box::pin(async move {
            retry_on_conflict(&self.retry, "apply_delta", || {
                observe_conflicts(self.try_apply_delta(event_id, delta))
            })
            .await
        })
    }
}

//! Event catalog contract and its input types.
//!
//! The catalog owns event rows. Besides CRUD it exposes
//! [`EventCatalog::apply_delta`], the seat mutation primitive the ledger
//! builds on; storage implementations share the same locked code path for
//! both.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::BoxFuture;
use crate::error::{LedgerError, Result};
use crate::inventory::Inventory;
use crate::types::{Event, EventDetails, EventId, Money, UserId};

/// Default page size for event listings.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Fields required to publish an event.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NewEvent {
    /// Title
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// Venue / location
    pub location: String,
    /// When the event takes place
    pub event_date: DateTime<Utc>,
    /// Price of a single seat, in cents
    pub ticket_price: Money,
    /// Seat capacity
    pub total_seats: u32,
    /// Cover image URL
    pub image_url: Option<String>,
    /// Category
    pub category: Option<String>,
}

impl NewEvent {
    /// Checks required text fields.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] if `title` or `location` is blank.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() || self.location.trim().is_empty() {
            return Err(LedgerError::Validation("Missing required fields".to_string()));
        }
        Ok(())
    }
}

/// Partial update of an event. An absent field is left unchanged.
///
/// The optional text fields distinguish absent from `null`: `null` clears
/// `description`, `image_url` or `category`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct EventUpdate {
    /// New title
    pub title: Option<String>,
    /// New description, or `Some(None)` to clear it
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
    /// New location
    pub location: Option<String>,
    /// New date
    pub event_date: Option<DateTime<Utc>>,
    /// New seat price (existing bookings keep their snapshot)
    pub ticket_price: Option<Money>,
    /// New capacity; availability shifts by the same amount
    pub total_seats: Option<u32>,
    /// New cover image, or `Some(None)` to clear it
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub image_url: Option<Option<String>>,
    /// New category, or `Some(None)` to clear it
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub category: Option<Option<String>>,
}

impl EventUpdate {
    /// Rejects empty updates and blank required fields.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] if no field is set or a title/location is blank.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(LedgerError::Validation("No fields to update".to_string()));
        }
        let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());
        if blank(&self.title) || blank(&self.location) {
            return Err(LedgerError::Validation(
                "title and location cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.event_date.is_none()
            && self.ticket_price.is_none()
            && self.total_seats.is_none()
            && self.image_url.is_none()
            && self.category.is_none()
    }

    /// Applies the update to `event`, resizing its inventory if capacity changed.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] if capacity would drop below booked seats.
    pub fn apply_to(&self, event: &mut Event, now: DateTime<Utc>) -> Result<()> {
        if let Some(total) = self.total_seats {
            let resized = Inventory::new(event.total_seats, event.available_seats)?.resize(total)?;
            event.total_seats = resized.total_seats();
            event.available_seats = resized.available_seats();
        }
        if let Some(title) = &self.title {
            event.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            event.description.clone_from(description);
        }
        if let Some(location) = &self.location {
            event.location.clone_from(location);
        }
        if let Some(date) = self.event_date {
            event.event_date = date;
        }
        if let Some(price) = self.ticket_price {
            event.ticket_price = price;
        }
        if let Some(image_url) = &self.image_url {
            event.image_url.clone_from(image_url);
        }
        if let Some(category) = &self.category {
            event.category.clone_from(category);
        }
        event.updated_at = now;
        Ok(())
    }
}

/// Listing filter for upcoming events.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    /// Exact category match
    pub category: Option<String>,
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
    /// Page size (default 20, max 100)
    pub limit: Option<i64>,
    /// Rows to skip (default 0)
    pub offset: Option<i64>,
}

impl EventFilter {
    /// Page size after defaults and clamping.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Offset after defaults and clamping.
    #[must_use]
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// In-memory predicate mirroring the SQL filter.
    #[must_use]
    pub fn matches(&self, event: &Event, now: DateTime<Utc>) -> bool {
        if event.event_date < now {
            return false;
        }
        if let Some(category) = &self.category {
            if event.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let in_title = event.title.to_lowercase().contains(&needle);
            let in_description = event
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_title && !in_description {
                return false;
            }
        }
        true
    }
}

/// One page of events plus the total number of matches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EventPage {
    /// Events in this page, ordered by date
    pub events: Vec<Event>,
    /// Matches across all pages
    pub total: i64,
}

/// Event catalog: CRUD plus the seat delta primitive.
pub trait EventCatalog: Send + Sync {
    /// Publishes a new event with every seat available.
    ///
    /// # Errors
    ///
    /// `Validation` for blank fields, `Database` on storage failure.
    fn create_event(&self, organizer_id: UserId, event: NewEvent) -> BoxFuture<'_, Result<Event>>;

    /// Looks up an event.
    ///
    /// # Errors
    ///
    /// `NotFound` if absent.
    fn get_event(&self, event_id: EventId) -> BoxFuture<'_, Result<Event>>;

    /// Looks up an event with its organizer's name and email.
    ///
    /// # Errors
    ///
    /// `NotFound` if absent.
    fn get_event_details(&self, event_id: EventId) -> BoxFuture<'_, Result<EventDetails>>;

    /// Upcoming events matching `filter`, ordered by date ascending.
    ///
    /// # Errors
    ///
    /// `Database` on storage failure.
    fn list_events(&self, filter: EventFilter) -> BoxFuture<'_, Result<EventPage>>;

    /// Applies a partial update; only the owning organizer may update.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Unauthorized`, or `Validation` (empty update, capacity below bookings).
    fn update_event(
        &self,
        event_id: EventId,
        organizer_id: UserId,
        update: EventUpdate,
    ) -> BoxFuture<'_, Result<Event>>;

    /// Deletes an event that has no bookings; only the owning organizer may delete.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Unauthorized`, or `Validation` if bookings reference the event.
    fn delete_event(&self, event_id: EventId, organizer_id: UserId) -> BoxFuture<'_, Result<()>>;

    /// Atomically shifts `available_seats` by `delta`, keeping it within
    /// `0..=total_seats`.
    ///
    /// # Errors
    ///
    /// `NotFound`, `InsufficientCapacity` for over-debits, `Database` for
    /// credits past capacity, `Conflict` on isolation failure.
    fn apply_delta(&self, event_id: EventId, delta: i64) -> BoxFuture<'_, Result<Inventory>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_event(now: DateTime<Utc>) -> Event {
        Event {
            id: EventId::new(),
            organizer_id: UserId::new(),
            title: "Rust Meetup".to_string(),
            description: Some("Async deep dive".to_string()),
            location: "Pune".to_string(),
            event_date: now + Duration::days(3),
            ticket_price: Money::from_cents(2500),
            total_seats: 10,
            available_seats: 6,
            image_url: None,
            category: Some("tech".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_update_rejected() {
        assert_eq!(
            EventUpdate::default().validate(),
            Err(LedgerError::Validation("No fields to update".to_string()))
        );
    }

    #[test]
    fn test_update_resizes_inventory() {
        let now = Utc::now();
        let mut event = sample_event(now);
        let update = EventUpdate {
            total_seats: Some(20),
            ..EventUpdate::default()
        };
        assert!(update.apply_to(&mut event, now).is_ok());
        assert_eq!((event.total_seats, event.available_seats), (20, 16));
    }

    #[test]
    fn test_update_cannot_shrink_below_bookings() {
        let now = Utc::now();
        let mut event = sample_event(now);
        let update = EventUpdate {
            total_seats: Some(3),
            title: Some("Renamed".to_string()),
            ..EventUpdate::default()
        };
        assert!(update.apply_to(&mut event, now).is_err());
        assert_eq!(event.title, "Rust Meetup");
    }

    #[test]
    fn test_update_null_clears_optional_fields() {
        let now = Utc::now();
        let mut event = sample_event(now);
        let update: EventUpdate =
            serde_json::from_str(r#"{"category": null, "description": "Updated"}"#)
                .unwrap_or_default();
        assert_eq!(update.category, Some(None));
        assert_eq!(update.image_url, None);
        assert!(update.validate().is_ok());

        assert!(update.apply_to(&mut event, now).is_ok());
        assert_eq!(event.category, None);
        assert_eq!(event.description.as_deref(), Some("Updated"));
    }

    #[test]
    fn test_update_absent_fields_are_untouched() {
        let now = Utc::now();
        let mut event = sample_event(now);
        let update: EventUpdate =
            serde_json::from_str(r#"{"title": "Renamed"}"#).unwrap_or_default();
        assert!(update.apply_to(&mut event, now).is_ok());
        assert_eq!(event.category.as_deref(), Some("tech"));
        assert_eq!(event.description.as_deref(), Some("Async deep dive"));
    }

    #[test]
    fn test_filter_matches() {
        let now = Utc::now();
        let event = sample_event(now);

        assert!(EventFilter::default().matches(&event, now));
        let by_search = EventFilter {
            search: Some("ASYNC".to_string()),
            ..EventFilter::default()
        };
        assert!(by_search.matches(&event, now));
        let by_category = EventFilter {
            category: Some("music".to_string()),
            ..EventFilter::default()
        };
        assert!(!by_category.matches(&event, now));
        assert!(!EventFilter::default().matches(&event, now + Duration::days(4)));
    }

    #[test]
    fn test_filter_paging_defaults() {
        let filter = EventFilter {
            limit: Some(1000),
            offset: Some(-5),
            ..EventFilter::default()
        };
        assert_eq!(filter.limit(), MAX_PAGE_SIZE);
        assert_eq!(filter.offset(), 0);
        assert_eq!(EventFilter::default().limit(), DEFAULT_PAGE_SIZE);
    }
}

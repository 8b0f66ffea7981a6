//! In-memory implementation of every Seatbook storage contract.
//!
//! All state lives behind one `tokio::sync::Mutex`, so each ledger operation
//! is trivially atomic: the read-check-write happens while the lock is held.
//! Collections are insertion-ordered vectors, which gives "newest first"
//! listings by iterating in reverse.

use chrono::{DateTime, Duration, Utc};
use seatbook_core::catalog::{EventFilter, EventPage, EventUpdate, NewEvent};
use seatbook_core::directory::{Credentials, LoginId, NewUser, ProfileUpdate};
use seatbook_core::environment::{Clock, SystemClock};
use seatbook_core::error::{LedgerError, Result};
use seatbook_core::inventory::{validate_seat_request, Inventory};
use seatbook_core::password::{Password, PasswordHashing};
use seatbook_core::payment::{NewPayment, PayoutDetailsInput, PAYMENT_COMPLETED};
use seatbook_core::types::{
    Booking, BookingDetails, BookingId, BookingStatus, CheckIn, CheckInId, Event, EventDetails,
    EventId, Identity, Money, Payment, PaymentId, PaymentRecord, PayoutDetails, Role, Session,
    User, UserId,
};
use seatbook_core::{
    BookingQuery, BoxFuture, CheckInStore, EventCatalog, Ledger, PaymentStore, Readiness,
    UserDirectory,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
    events: Vec<Event>,
    bookings: Vec<Booking>,
    check_ins: Vec<CheckIn>,
    payments: Vec<Payment>,
    payouts: HashMap<UserId, PayoutDetails>,
    users: Vec<User>,
    password_hashes: HashMap<UserId, String>,
    sessions: HashMap<Uuid, Session>,
}

impl State {
    fn event_mut(&mut self, event_id: EventId) -> Result<&mut Event> {
        self.events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| LedgerError::not_found("Event", event_id))
    }

    /// Shifts an event's availability by `delta`, the step debit, credit and
    /// `apply_delta` share.
    fn shift_seats(
        &mut self,
        event_id: EventId,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Result<Inventory> {
        let event = self.event_mut(event_id)?;
        let after = Inventory::new(event.total_seats, event.available_seats)?.apply_delta(delta)?;
        event.available_seats = after.available_seats();
        event.updated_at = now;
        Ok(after)
    }

    fn event(&self, event_id: EventId) -> Option<&Event> {
        self.events.iter().find(|e| e.id == event_id)
    }

    fn booking(&self, booking_id: BookingId) -> Result<&Booking> {
        self.bookings
            .iter()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| LedgerError::not_found("Booking", booking_id))
    }

    fn owned_booking(&self, booking_id: BookingId, user_id: UserId) -> Result<&Booking> {
        self.bookings
            .iter()
            .find(|b| b.id == booking_id && b.user_id == user_id)
            .ok_or_else(|| LedgerError::not_found("Booking", booking_id))
    }

    fn details(&self, booking: &Booking) -> BookingDetails {
        let event = self.event(booking.event_id);
        BookingDetails {
            booking: booking.clone(),
            title: event.map(|e| e.title.clone()),
            event_date: event.map(|e| e.event_date),
            location: event.map(|e| e.location.clone()),
            image_url: event.and_then(|e| e.image_url.clone()),
        }
    }
}

/// In-memory store for fast, deterministic tests.
///
/// Cloning is cheap and every clone shares the same state.
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    clock: Arc<dyn Clock>,
    hashing: PasswordHashing,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create an empty store using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store using `clock` for timestamps and "upcoming" filters.
    ///
    /// Passwords are hashed with [`PasswordHashing::minimal`].
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            clock,
            hashing: PasswordHashing::minimal(),
        }
    }

    /// Number of stored sessions, expired or not.
    pub async fn session_count(&self) -> usize {
        self.state.lock().await.sessions.len()
    }

    /// Inserts an event 30 days in the future with every seat available.
    pub async fn seed_event(&self, total_seats: u32, ticket_price: Money) -> EventId {
        let now = self.clock.now();
        let event = Event {
            id: EventId::new(),
            organizer_id: UserId::new(),
            title: "Seeded event".to_string(),
            description: None,
            location: "Main hall".to_string(),
            event_date: now + Duration::days(30),
            ticket_price,
            total_seats,
            available_seats: total_seats,
            image_url: None,
            category: None,
            created_at: now,
            updated_at: now,
        };
        let id = event.id;
        self.state.lock().await.events.push(event);
        id
    }

    /// Current inventory of an event, if it exists.
    pub async fn inventory(&self, event_id: EventId) -> Option<Inventory> {
        let state = self.state.lock().await;
        state
            .event(event_id)
            .and_then(|e| Inventory::new(e.total_seats, e.available_seats).ok())
    }

    /// Seats held by confirmed bookings of an event.
    pub async fn confirmed_seats(&self, event_id: EventId) -> u32 {
        let state = self.state.lock().await;
        state
            .bookings
            .iter()
            .filter(|b| b.event_id == event_id && b.status == BookingStatus::Confirmed)
            .map(|b| b.number_of_seats)
            .sum()
    }

    /// Checks `available_seats + Σ(confirmed seats) = total_seats` for an event.
    pub async fn invariant_holds(&self, event_id: EventId) -> bool {
        let confirmed = self.confirmed_seats(event_id).await;
        self.inventory(event_id)
            .await
            .is_some_and(|i| i.available_seats() + confirmed == i.total_seats())
    }
}

impl Ledger for InMemoryStore {
    fn debit(
        &self,
        event_id: EventId,
        requested_seats: u32,
        user_id: UserId,
    ) -> BoxFuture<'_, Result<Booking>> {
        Box::pin(async move {
            validate_seat_request(requested_seats)?;
            let now = self.clock.now();
            let mut state = self.state.lock().await;

            let total_price = state
                .event(event_id)
                .ok_or_else(|| LedgerError::not_found("Event", event_id))?
                .ticket_price
                .checked_mul(requested_seats)
                .ok_or_else(|| LedgerError::Validation("total price overflows".to_string()))?;
            state.shift_seats(event_id, -i64::from(requested_seats), now)?;

            let booking = Booking {
                id: BookingId::new(),
                event_id,
                user_id,
                number_of_seats: requested_seats,
                total_price,
                status: BookingStatus::Confirmed,
                created_at: now,
                updated_at: now,
            };
            state.bookings.push(booking.clone());
            Ok(booking)
        })
    }

    fn credit(&self, booking_id: BookingId, user_id: UserId) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let now = self.clock.now();
            let mut state = self.state.lock().await;

            let booking = state.booking(booking_id)?.clone();
            if booking.user_id != user_id {
                return Err(LedgerError::Unauthorized("Unauthorized".to_string()));
            }
            if booking.status == BookingStatus::Cancelled {
                return Err(LedgerError::AlreadyCancelled {
                    booking_id: booking_id.to_string(),
                });
            }

            state.shift_seats(booking.event_id, i64::from(booking.number_of_seats), now)?;

            if let Some(stored) = state.bookings.iter_mut().find(|b| b.id == booking_id) {
                stored.status = BookingStatus::Cancelled;
                stored.updated_at = now;
            }
            Ok(())
        })
    }
}

impl BookingQuery for InMemoryStore {
    fn list_bookings(&self, user_id: UserId) -> BoxFuture<'_, Result<Vec<BookingDetails>>> {
        Box::pin(async move {
            let state = self.state.lock().await;
            Ok(state
                .bookings
                .iter()
                .rev()
                .filter(|b| b.user_id == user_id)
                .map(|b| state.details(b))
                .collect())
        })
    }

    fn get_booking(
        &self,
        booking_id: BookingId,
        user_id: UserId,
    ) -> BoxFuture<'_, Result<BookingDetails>> {
        Box::pin(async move {
            let state = self.state.lock().await;
            let booking = state.owned_booking(booking_id, user_id)?;
            Ok(state.details(booking))
        })
    }
}

impl EventCatalog for InMemoryStore {
    fn create_event(&self, organizer_id: UserId, event: NewEvent) -> BoxFuture<'_, Result<Event>> {
        Box::pin(async move {
            event.validate()?;
            let now = self.clock.now();
            let created = Event {
                id: EventId::new(),
                organizer_id,
                title: event.title,
                description: event.description,
                location: event.location,
                event_date: event.event_date,
                ticket_price: event.ticket_price,
                total_seats: event.total_seats,
                available_seats: event.total_seats,
                image_url: event.image_url,
                category: event.category,
                created_at: now,
                updated_at: now,
            };
            self.state.lock().await.events.push(created.clone());
            Ok(created)
        })
    }

    fn get_event(&self, event_id: EventId) -> BoxFuture<'_, Result<Event>> {
        Box::pin(async move {
            let state = self.state.lock().await;
            state
                .event(event_id)
                .cloned()
                .ok_or_else(|| LedgerError::not_found("Event", event_id))
        })
    }

    fn get_event_details(&self, event_id: EventId) -> BoxFuture<'_, Result<EventDetails>> {
        Box::pin(async move {
            let state = self.state.lock().await;
            let event = state
                .event(event_id)
                .cloned()
                .ok_or_else(|| LedgerError::not_found("Event", event_id))?;
            let organizer = state.users.iter().find(|u| u.id == event.organizer_id);
            Ok(EventDetails {
                organizer_name: organizer.map(|u| u.name.clone()),
                organizer_email: organizer.and_then(|u| u.email.clone()),
                event,
            })
        })
    }

    fn list_events(&self, filter: EventFilter) -> BoxFuture<'_, Result<EventPage>> {
        Box::pin(async move {
            let now = self.clock.now();
            let state = self.state.lock().await;
            let mut matching: Vec<Event> = state
                .events
                .iter()
                .filter(|e| filter.matches(e, now))
                .cloned()
                .collect();
            matching.sort_by_key(|e| e.event_date);

            let total = i64::try_from(matching.len()).unwrap_or(i64::MAX);
            let offset = usize::try_from(filter.offset()).unwrap_or(usize::MAX);
            let limit = usize::try_from(filter.limit()).unwrap_or(usize::MAX);
            let events = matching.into_iter().skip(offset).take(limit).collect();
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
            let now = self.clock.now();
            let mut state = self.state.lock().await;
            let event = state.event_mut(event_id)?;
            if event.organizer_id != organizer_id {
                return Err(LedgerError::Unauthorized("Unauthorized".to_string()));
            }
            let mut updated = event.clone();
            update.apply_to(&mut updated, now)?;
            *event = updated.clone();
            Ok(updated)
        })
    }

    fn delete_event(&self, event_id: EventId, organizer_id: UserId) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            let event = state
                .event(event_id)
                .ok_or_else(|| LedgerError::not_found("Event", event_id))?;
            if event.organizer_id != organizer_id {
                return Err(LedgerError::Unauthorized("Unauthorized".to_string()));
            }
            if state.bookings.iter().any(|b| b.event_id == event_id) {
                return Err(LedgerError::Validation(
                    "Cannot delete an event that has bookings".to_string(),
                ));
            }
            state.events.retain(|e| e.id != event_id);
            Ok(())
        })
    }

    fn apply_delta(&self, event_id: EventId, delta: i64) -> BoxFuture<'_, Result<Inventory>> {
        Box::pin(async move {
            let now = self.clock.now();
            let mut state = self.state.lock().await;
            state.shift_seats(event_id, delta, now)
        })
    }
}

impl CheckInStore for InMemoryStore {
    fn record_check_in(
        &self,
        booking_id: BookingId,
        user_id: UserId,
        qr_code: Option<String>,
    ) -> BoxFuture<'_, Result<CheckIn>> {
        Box::pin(async move {
            let now = self.clock.now();
            let mut state = self.state.lock().await;
            let booking = state.owned_booking(booking_id, user_id)?;
            if booking.status == BookingStatus::Cancelled {
                return Err(LedgerError::AlreadyCancelled {
                    booking_id: booking_id.to_string(),
                });
            }
            let check_in = CheckIn {
                id: CheckInId::new(),
                booking_id,
                qr_code,
                checkin_time: now,
            };
            state.check_ins.push(check_in.clone());
            Ok(check_in)
        })
    }

    fn list_check_ins(
        &self,
        booking_id: BookingId,
        user_id: UserId,
    ) -> BoxFuture<'_, Result<Vec<CheckIn>>> {
        Box::pin(async move {
            let state = self.state.lock().await;
            if state.booking(booking_id)?.user_id != user_id {
                return Err(LedgerError::Unauthorized("Unauthorized".to_string()));
            }
            Ok(state
                .check_ins
                .iter()
                .rev()
                .filter(|c| c.booking_id == booking_id)
                .cloned()
                .collect())
        })
    }
}

impl PaymentStore for InMemoryStore {
    fn record_payment(
        &self,
        payment: NewPayment,
        user_id: UserId,
    ) -> BoxFuture<'_, Result<Payment>> {
        Box::pin(async move {
            payment.validate()?;
            let now = self.clock.now();
            let mut state = self.state.lock().await;
            let booking = state.booking(payment.booking_id)?;
            if booking.user_id != user_id {
                return Err(LedgerError::Unauthorized("Unauthorized".to_string()));
            }
            if booking.status == BookingStatus::Cancelled {
                return Err(LedgerError::AlreadyCancelled {
                    booking_id: booking.id.to_string(),
                });
            }
            let recorded = Payment {
                id: PaymentId::new(),
                booking_id: booking.id,
                amount: booking.total_price,
                payment_method: payment.payment_method,
                transaction_id: payment.transaction_id,
                status: PAYMENT_COMPLETED.to_string(),
                created_at: now,
            };
            state.payments.push(recorded.clone());
            Ok(recorded)
        })
    }

    fn list_payments(&self, user_id: UserId) -> BoxFuture<'_, Result<Vec<PaymentRecord>>> {
        Box::pin(async move {
            let state = self.state.lock().await;
            Ok(state
                .payments
                .iter()
                .rev()
                .filter_map(|p| {
                    let booking = state.booking(p.booking_id).ok()?;
                    (booking.user_id == user_id).then(|| PaymentRecord {
                        payment: p.clone(),
                        event_id: Some(booking.event_id),
                        event_title: state.event(booking.event_id).map(|e| e.title.clone()),
                    })
                })
                .collect())
        })
    }

    fn save_payout_details(
        &self,
        organizer_id: UserId,
        details: PayoutDetailsInput,
    ) -> BoxFuture<'_, Result<PayoutDetails>> {
        Box::pin(async move {
            details.validate()?;
            let saved = PayoutDetails {
                organizer_id,
                account_holder_name: details.account_holder_name,
                account_number: details.account_number,
                bank_name: details.bank_name,
                ifsc_code: details.ifsc_code,
                updated_at: self.clock.now(),
            };
            self.state
                .lock()
                .await
                .payouts
                .insert(organizer_id, saved.clone());
            Ok(saved)
        })
    }

    fn get_payout_details(&self, organizer_id: UserId) -> BoxFuture<'_, Result<PayoutDetails>> {
        Box::pin(async move {
            self.state
                .lock()
                .await
                .payouts
                .get(&organizer_id)
                .cloned()
                .ok_or_else(|| LedgerError::not_found("Payment details", organizer_id))
        })
    }
}

impl State {
    fn find_login(&self, login: &LoginId) -> Option<&User> {
        self.users.iter().find(|u| match login {
            LoginId::Email(email) => u.email.as_deref() == Some(email.as_str()),
            LoginId::Mobile(mobile) => u.mobile == *mobile,
        })
    }

    /// Whether another user already has `mobile` or `email`.
    fn contact_taken(
        &self,
        except: Option<UserId>,
        mobile: Option<&str>,
        email: Option<&str>,
    ) -> bool {
        self.users
            .iter()
            .filter(|u| Some(u.id) != except)
            .any(|u| {
                mobile.is_some_and(|m| u.mobile == m)
                    || (email.is_some() && u.email.as_deref() == email)
            })
    }
}

impl UserDirectory for InMemoryStore {
    fn register(&self, user: NewUser) -> BoxFuture<'_, Result<User>> {
        Box::pin(async move {
            user.validate()?;
            let password_hash = self.hashing.hash(&user.password)?;
            let mut state = self.state.lock().await;
            if state.contact_taken(None, Some(&user.mobile), user.email.as_deref()) {
                return Err(LedgerError::AlreadyExists("User already exists".to_string()));
            }
            let created = User {
                id: UserId::new(),
                name: user.name,
                mobile: user.mobile,
                email: user.email,
                role: user.role,
                created_at: self.clock.now(),
            };
            state.password_hashes.insert(created.id, password_hash);
            state.users.push(created.clone());
            Ok(created)
        })
    }

    fn authenticate(&self, credentials: Credentials) -> BoxFuture<'_, Result<User>> {
        Box::pin(async move {
            let state = self.state.lock().await;
            let user = state
                .find_login(&credentials.login)
                .ok_or(LedgerError::InvalidCredentials)?;
            let stored = state
                .password_hashes
                .get(&user.id)
                .ok_or(LedgerError::InvalidCredentials)?;
            if !self.hashing.verify(&credentials.password, stored)? {
                return Err(LedgerError::InvalidCredentials);
            }
            Ok(user.clone())
        })
    }

    fn create_session(&self, user_id: UserId, ttl: Duration) -> BoxFuture<'_, Result<Session>> {
        Box::pin(async move {
            let now = self.clock.now();
            let mut state = self.state.lock().await;
            if !state.users.iter().any(|u| u.id == user_id) {
                return Err(LedgerError::not_found("User", user_id));
            }
            state.sessions.retain(|_, s| s.expires_at > now);
            let session = Session {
                token: Uuid::new_v4(),
                user_id,
                expires_at: now + ttl,
            };
            state.sessions.insert(session.token, session.clone());
            Ok(session)
        })
    }

    fn resolve_session(&self, token: Uuid) -> BoxFuture<'_, Result<Option<Identity>>> {
        Box::pin(async move {
            let now = self.clock.now();
            let state = self.state.lock().await;
            let identity = state
                .sessions
                .get(&token)
                .filter(|s| s.expires_at > now)
                .and_then(|s| state.users.iter().find(|u| u.id == s.user_id))
                .map(|u| Identity {
                    user_id: u.id,
                    role: u.role,
                });
            Ok(identity)
        })
    }

    fn get_user(&self, user_id: UserId) -> BoxFuture<'_, Result<User>> {
        Box::pin(async move {
            self.state
                .lock()
                .await
                .users
                .iter()
                .find(|u| u.id == user_id)
                .cloned()
                .ok_or_else(|| LedgerError::not_found("User", user_id))
        })
    }

    fn update_profile(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> BoxFuture<'_, Result<User>> {
        Box::pin(async move {
            update.validate()?;
            let password_hash = update
                .password
                .as_ref()
                .map(|p| self.hashing.hash(p))
                .transpose()?;
            let mut state = self.state.lock().await;
            let taken = state.contact_taken(
                Some(user_id),
                update.mobile.as_deref(),
                update.email.as_deref(),
            );
            if taken {
                return Err(LedgerError::AlreadyExists(
                    "Mobile number or email already in use".to_string(),
                ));
            }
            let user = state
                .users
                .iter_mut()
                .find(|u| u.id == user_id)
                .ok_or_else(|| LedgerError::not_found("User", user_id))?;
            update.apply_to(user);
            let updated = user.clone();
            if let Some(hash) = password_hash {
                state.password_hashes.insert(user_id, hash);
            }
            Ok(updated)
        })
    }
}

impl Readiness for InMemoryStore {
    fn component(&self) -> &'static str {
        "memory"
    }

    fn check_ready(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async { Ok(()) })
    }
}

/// Password given to users created by [`register_user`].
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Registers a user with the given role and returns it, for test setup.
///
/// The user's email is `<mobile>@example.com` and their password
/// [`TEST_PASSWORD`].
///
/// # Errors
///
/// Propagates registration failures.
pub async fn register_user(store: &InMemoryStore, role: Role, mobile: &str) -> Result<User> {
    store
        .register(NewUser {
            name: format!("{role} {mobile}"),
            mobile: mobile.to_string(),
            role,
            email: Some(format!("{mobile}@example.com")),
            password: Password::new(TEST_PASSWORD),
        })
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::mocks::FixedClock;
    use proptest::prelude::*;

    #[tokio::test]
    async fn test_debit_credit_scenario() {
        let store = InMemoryStore::new();
        let event_id = store.seed_event(10, Money::from_cents(1000)).await;
        let user = UserId::new();

        let first = store.debit(event_id, 5, user).await.unwrap();
        assert_eq!(first.total_price, Money::from_cents(5000));
        assert_eq!(store.inventory(event_id).await.unwrap().available_seats(), 5);

        let rejected = store.debit(event_id, 6, user).await;
        assert_eq!(
            rejected,
            Err(LedgerError::InsufficientCapacity { available: 5, requested: 6 })
        );
        assert_eq!(store.inventory(event_id).await.unwrap().available_seats(), 5);

        store.credit(first.id, user).await.unwrap();
        assert_eq!(store.inventory(event_id).await.unwrap().available_seats(), 10);

        let again = store.credit(first.id, user).await;
        assert!(matches!(again, Err(LedgerError::AlreadyCancelled { .. })));
        assert_eq!(store.inventory(event_id).await.unwrap().available_seats(), 10);
        assert!(store.invariant_holds(event_id).await);
    }

    #[tokio::test]
    async fn test_credit_by_other_user_is_unauthorized() {
        let store = InMemoryStore::new();
        let event_id = store.seed_event(3, Money::from_cents(100)).await;
        let booking = store.debit(event_id, 2, UserId::new()).await.unwrap();

        let result = store.credit(booking.id, UserId::new()).await;
        assert!(matches!(result, Err(LedgerError::Unauthorized(_))));
        assert_eq!(store.inventory(event_id).await.unwrap().available_seats(), 1);
    }

    #[tokio::test]
    async fn test_debit_unknown_event() {
        let store = InMemoryStore::new();
        let result = store.debit(EventId::new(), 1, UserId::new()).await;
        assert!(matches!(result, Err(LedgerError::NotFound { resource: "Event", .. })));
    }

    #[tokio::test]
    async fn test_concurrent_single_seat_debits() {
        let store = InMemoryStore::new();
        let event_id = store.seed_event(7, Money::from_cents(100)).await;

        let handles: Vec<_> = (0..25)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.debit(event_id, 1, UserId::new()).await })
            })
            .collect();

        let mut successes = 0;
        let mut rejections = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(LedgerError::InsufficientCapacity { .. }) => rejections += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(successes, 7);
        assert_eq!(rejections, 18);
        assert_eq!(store.inventory(event_id).await.unwrap().available_seats(), 0);
        assert!(store.invariant_holds(event_id).await);
    }

    #[tokio::test]
    async fn test_sessions_expire() {
        let now = Utc::now();
        let store = InMemoryStore::with_clock(Arc::new(FixedClock::new(now)));
        let user = register_user(&store, Role::Explorer, "9000000001").await.unwrap();

        let live = store.create_session(user.id, Duration::hours(1)).await.unwrap();
        let expired = store.create_session(user.id, Duration::zero()).await.unwrap();

        assert_eq!(
            store.resolve_session(live.token).await.unwrap(),
            Some(Identity { user_id: user.id, role: Role::Explorer })
        );
        assert_eq!(store.resolve_session(expired.token).await.unwrap(), None);
        assert_eq!(store.resolve_session(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_mobile_rejected() {
        let store = InMemoryStore::new();
        register_user(&store, Role::Explorer, "9000000002").await.unwrap();
        let again = register_user(&store, Role::Organizer, "9000000002").await;
        assert!(matches!(again, Err(LedgerError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_apply_delta_bounds() {
        let store = InMemoryStore::new();
        let event_id = store.seed_event(10, Money::from_cents(100)).await;

        let after = store.apply_delta(event_id, -4).await.unwrap();
        assert_eq!(after.available_seats(), 6);

        let overdraw = store.apply_delta(event_id, -7).await;
        assert_eq!(
            overdraw,
            Err(LedgerError::InsufficientCapacity { available: 6, requested: 7 })
        );
        assert_eq!(store.inventory(event_id).await.unwrap().available_seats(), 6);

        let past_capacity = store.apply_delta(event_id, 5).await;
        assert!(matches!(past_capacity, Err(LedgerError::Database(_))));
        assert_eq!(store.inventory(event_id).await.unwrap().available_seats(), 6);

        assert_eq!(store.apply_delta(event_id, 0).await, Ok(after));
        assert_eq!(store.apply_delta(event_id, 4).await.unwrap().available_seats(), 10);

        let missing = store.apply_delta(EventId::new(), -1).await;
        assert!(matches!(missing, Err(LedgerError::NotFound { resource: "Event", .. })));
    }

    #[tokio::test]
    async fn test_authenticate_by_email_or_mobile() {
        let store = InMemoryStore::new();
        let user = register_user(&store, Role::Explorer, "9000000003").await.unwrap();
        let login = |login: LoginId, password: &str| Credentials {
            login,
            password: Password::new(password),
        };

        let by_email = store
            .authenticate(login(LoginId::Email("9000000003@example.com".into()), TEST_PASSWORD))
            .await
            .unwrap();
        assert_eq!(by_email.id, user.id);
        let by_mobile = store
            .authenticate(login(LoginId::Mobile("9000000003".into()), TEST_PASSWORD))
            .await
            .unwrap();
        assert_eq!(by_mobile.id, user.id);

        let wrong_password = store
            .authenticate(login(LoginId::Mobile("9000000003".into()), "not-the-password"))
            .await;
        assert_eq!(wrong_password, Err(LedgerError::InvalidCredentials));
        let unknown = store
            .authenticate(login(LoginId::Email("nobody@example.com".into()), TEST_PASSWORD))
            .await;
        assert_eq!(unknown, Err(LedgerError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_new_session_purges_expired_ones() {
        let store = InMemoryStore::new();
        let user = register_user(&store, Role::Explorer, "9000000004").await.unwrap();

        store.create_session(user.id, Duration::seconds(-1)).await.unwrap();
        store.create_session(user.id, Duration::seconds(-1)).await.unwrap();
        assert_eq!(store.session_count().await, 2);

        let live = store.create_session(user.id, Duration::hours(1)).await.unwrap();
        assert_eq!(store.session_count().await, 1);
        assert!(store.resolve_session(live.token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_profile() {
        let store = InMemoryStore::new();
        let user = register_user(&store, Role::Explorer, "9000000005").await.unwrap();
        register_user(&store, Role::Explorer, "9000000006").await.unwrap();

        let updated = store
            .update_profile(
                user.id,
                ProfileUpdate {
                    name: Some("Asha K".to_string()),
                    password: Some(Password::new("a-new-password")),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Asha K");
        assert_eq!(updated.mobile, "9000000005");
        assert_eq!(store.get_user(user.id).await.unwrap(), updated);

        let old_password = store
            .authenticate(Credentials {
                login: LoginId::Mobile("9000000005".into()),
                password: Password::new(TEST_PASSWORD),
            })
            .await;
        assert_eq!(old_password, Err(LedgerError::InvalidCredentials));
        assert!(
            store
                .authenticate(Credentials {
                    login: LoginId::Mobile("9000000005".into()),
                    password: Password::new("a-new-password"),
                })
                .await
                .is_ok()
        );

        let taken = store
            .update_profile(
                user.id,
                ProfileUpdate {
                    mobile: Some("9000000006".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .await;
        assert!(matches!(taken, Err(LedgerError::AlreadyExists(_))));

        let own_mobile = store
            .update_profile(
                user.id,
                ProfileUpdate {
                    mobile: Some("9000000005".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .await;
        assert!(own_mobile.is_ok());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Debit { user: usize, seats: u32 },
        Credit { booking: usize, user: usize },
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..3, 0u32..6).prop_map(|(user, seats)| Op::Debit { user, seats }),
            (0usize..20, 0usize..3).prop_map(|(booking, user)| Op::Credit { booking, user }),
        ]
    }

    proptest! {
        #[test]
        fn prop_invariant_holds_after_any_sequence(
            total in 0u32..30,
            ops in proptest::collection::vec(op_strategy(), 0..40),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            runtime.block_on(async {
                let store = InMemoryStore::new();
                let event_id = store.seed_event(total, Money::from_cents(250)).await;
                let users: Vec<UserId> = (0..3).map(|_| UserId::new()).collect();
                let mut bookings = Vec::new();

                for op in ops {
                    match op {
                        Op::Debit { user, seats } => {
                            if let Ok(b) = store.debit(event_id, seats, users[user]).await {
                                bookings.push(b);
                            }
                        }
                        Op::Credit { booking, user } => {
                            if let Some(b) = bookings.get(booking) {
                                let _ = store.credit(b.id, users[user]).await;
                            }
                        }
                    }
                    prop_assert!(store.invariant_holds(event_id).await);
                }
                Ok::<(), TestCaseError>(())
            })?;
        }
    }
}

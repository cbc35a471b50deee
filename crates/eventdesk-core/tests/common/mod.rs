#![allow(clippy::unwrap_used, dead_code)]
// Scripted in-memory backend shared by the integration tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use futures_util::FutureExt;
use secrecy::SecretString;
use tokio::sync::Notify;

use eventdesk_core::{
    AdminEvent, AuthTokens, Backend, BackendResult, Booking, BookingId, Category, CategoryId,
    ClientConfig, CoreError, EventDesk, EventDetails, EventDraft, EventId, EventSummary,
    ImageUpload, LocalCache, MemoryCache, PageQuery, Registration,
};

// ── Fixtures ────────────────────────────────────────────────────────

pub fn summary(id: i64) -> EventSummary {
    EventSummary {
        id: EventId(id),
        title: format!("Event {id}"),
        description: format!("About event {id}"),
        category_id: Some(CategoryId(id % 3 + 1)),
        category: None,
        image_url: None,
        date: "2031-01-01T19:00:00".into(),
        price: 10.0,
        booked: false,
    }
}

pub fn details(id: i64) -> EventDetails {
    let mut d = EventDetails::from(&summary(id));
    d.venue = "Main hall".into();
    d.agenda = "Doors at 7".into();
    d
}

pub fn admin_event(id: i64) -> AdminEvent {
    AdminEvent {
        id: EventId(id),
        name: format!("Event {id}"),
        description: "desc".into(),
        agenda: None,
        category: None,
        date: "2031-01-01T19:00:00".into(),
        venue: "Main hall".into(),
        price: 10.0,
        image_url: None,
        attendees: None,
        number_of_bookings: Some(0),
    }
}

/// Unsigned JWT carrying `sub` and `role`.
pub fn token_for(email: &str, role: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{email}","role":"{role}"}}"#));
    format!("{header}.{payload}.signature")
}

pub fn tokens_for(email: &str, role: &str) -> AuthTokens {
    AuthTokens::new(token_for(email, role))
}

/// Every cache entry, sorted, for byte-level comparisons.
pub fn dump(cache: &dyn LocalCache) -> Vec<(String, String)> {
    let mut entries: Vec<(String, String)> = cache
        .keys()
        .into_iter()
        .filter_map(|k| cache.read(&k).map(|v| (k, v)))
        .collect();
    entries.sort();
    entries
}

// ── Call log ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SignIn(String),
    Register(String),
    Events(PageQuery),
    Details(EventId),
    Categories,
    Book(EventId),
    Cancel(BookingId),
    Bookings(PageQuery),
    Dashboard(PageQuery),
    AdminEvent(EventId),
    Create(String),
    Update(EventId),
    Delete(EventId),
    Upload(EventId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Events,
    Details,
    Book,
    Cancel,
    Bookings,
    Categories,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Network,
    Auth,
    NotFound,
}

impl Failure {
    fn error(self) -> CoreError {
        match self {
            Self::Network => CoreError::Network {
                reason: "connection refused".into(),
            },
            Self::Auth => CoreError::SessionExpired,
            Self::NotFound => CoreError::NotFound {
                entity_type: "resource".into(),
                identifier: "x".into(),
            },
        }
    }
}

// ── Backend ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeBackend {
    /// Server-side event lists keyed by category filter.
    events: Mutex<HashMap<Option<CategoryId>, Vec<EventSummary>>>,
    details: Mutex<HashMap<EventId, EventDetails>>,
    bookings: Mutex<Vec<Booking>>,
    categories: Mutex<Vec<Category>>,
    dashboard: Mutex<Vec<AdminEvent>>,
    booked: Mutex<HashSet<EventId>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<Op, Failure>>,
    stall: Mutex<Option<Arc<Notify>>>,
    echo_bookings: AtomicBool,
    next_booking: AtomicI64,
    token: Mutex<Option<SecretString>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        let backend = Self::default();
        backend.next_booking.store(500, Ordering::SeqCst);
        Arc::new(backend)
    }

    pub fn with_events(count: i64) -> Arc<Self> {
        let backend = Self::new();
        backend.set_events(None, (1..=count).map(summary).collect());
        backend
    }

    pub fn set_events(&self, category: Option<CategoryId>, events: Vec<EventSummary>) {
        let mut details = self.details.lock().unwrap();
        for e in &events {
            details.entry(e.id).or_insert_with(|| {
                let mut d = self::details(e.id.get());
                d.category_id = e.category_id;
                d
            });
        }
        self.events.lock().unwrap().insert(category, events);
    }

    pub fn set_categories(&self, categories: Vec<Category>) {
        *self.categories.lock().unwrap() = categories;
    }

    pub fn set_dashboard(&self, rows: Vec<AdminEvent>) {
        *self.dashboard.lock().unwrap() = rows;
    }

    pub fn set_bookings(&self, bookings: Vec<Booking>) {
        let mut booked = self.booked.lock().unwrap();
        for b in &bookings {
            booked.insert(b.event.id);
        }
        *self.bookings.lock().unwrap() = bookings;
    }

    pub fn fail(&self, op: Op, failure: Failure) {
        self.failures.lock().unwrap().insert(op, failure);
    }

    pub fn heal(&self, op: Op) {
        self.failures.lock().unwrap().remove(&op);
    }

    /// Make the booking endpoint echo the created record.
    pub fn echo_bookings(&self, echo: bool) {
        self.echo_bookings.store(echo, Ordering::SeqCst);
    }

    /// Hold every page fetch until the returned handle is notified.
    pub fn stall(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.stall.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn unstall(&self) {
        *self.stall.lock().unwrap() = None;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn event_fetches(&self) -> usize {
        self.count(|c| matches!(c, Call::Events(_)))
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn has_token(&self) -> bool {
        self.token.lock().unwrap().is_some()
    }

    pub fn server_bookings(&self) -> Vec<Booking> {
        self.bookings.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, op: Op) -> Result<(), CoreError> {
        match self.failures.lock().unwrap().get(&op) {
            Some(f) => Err(f.error()),
            None => Ok(()),
        }
    }

    async fn gate(&self) {
        let gate = self.stall.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn page<T: Clone>(rows: &[T], query: PageQuery) -> Vec<T> {
        let size = query.size as usize;
        rows.iter()
            .skip(query.page as usize * size)
            .take(size)
            .cloned()
            .collect()
    }

    fn with_booked(&self, mut e: EventSummary) -> EventSummary {
        e.booked = self.booked.lock().unwrap().contains(&e.id);
        e
    }
}

impl Backend for FakeBackend {
    fn sign_in<'a>(&'a self, email: &'a str, _password: &'a SecretString) -> BackendResult<'a, AuthTokens> {
        async move {
            self.record(Call::SignIn(email.to_owned()));
            let role = if email.starts_with("admin") { "ADMIN" } else { "USER" };
            Ok(tokens_for(email, role))
        }
        .boxed()
    }

    fn register<'a>(&'a self, registration: &'a Registration) -> BackendResult<'a, ()> {
        async move {
            self.record(Call::Register(registration.email.clone()));
            Ok(())
        }
        .boxed()
    }

    fn set_bearer_token(&self, token: Option<SecretString>) {
        *self.token.lock().unwrap() = token;
    }

    fn fetch_events(&self, query: PageQuery) -> BackendResult<'_, Vec<EventSummary>> {
        async move {
            self.record(Call::Events(query));
            self.gate().await;
            self.check(Op::Events)?;
            let events = self.events.lock().unwrap();
            let rows = events.get(&query.category).cloned().unwrap_or_default();
            drop(events);
            Ok(Self::page(&rows, query)
                .into_iter()
                .map(|e| self.with_booked(e))
                .collect())
        }
        .boxed()
    }

    fn fetch_event_details(&self, id: EventId) -> BackendResult<'_, EventDetails> {
        async move {
            self.record(Call::Details(id));
            self.check(Op::Details)?;
            let details = self.details.lock().unwrap().get(&id).cloned();
            let booked = self.booked.lock().unwrap().contains(&id);
            details
                .map(|d| d.with_booked(booked))
                .ok_or_else(|| Failure::NotFound.error())
        }
        .boxed()
    }

    fn fetch_categories(&self) -> BackendResult<'_, Vec<Category>> {
        async move {
            self.record(Call::Categories);
            self.check(Op::Categories)?;
            Ok(self.categories.lock().unwrap().clone())
        }
        .boxed()
    }

    fn book_event(&self, id: EventId) -> BackendResult<'_, Option<Booking>> {
        async move {
            self.record(Call::Book(id));
            self.check(Op::Book)?;
            let event = self
                .details
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .ok_or_else(|| Failure::NotFound.error())?;
            let booking = Booking {
                id: BookingId(self.next_booking.fetch_add(1, Ordering::SeqCst)),
                event: event.with_booked(true),
                booking_date: "2030-12-01T10:00:00".into(),
            };
            self.booked.lock().unwrap().insert(id);
            self.bookings.lock().unwrap().insert(0, booking.clone());
            Ok(self.echo_bookings.load(Ordering::SeqCst).then_some(booking))
        }
        .boxed()
    }

    fn cancel_booking(&self, id: BookingId) -> BackendResult<'_, ()> {
        async move {
            self.record(Call::Cancel(id));
            self.check(Op::Cancel)?;
            let mut bookings = self.bookings.lock().unwrap();
            let Some(pos) = bookings.iter().position(|b| b.id == id) else {
                return Err(Failure::NotFound.error());
            };
            let removed = bookings.remove(pos);
            self.booked.lock().unwrap().remove(&removed.event.id);
            Ok(())
        }
        .boxed()
    }

    fn fetch_bookings(&self, query: PageQuery) -> BackendResult<'_, Vec<Booking>> {
        async move {
            self.record(Call::Bookings(query));
            self.gate().await;
            self.check(Op::Bookings)?;
            let rows = self.bookings.lock().unwrap().clone();
            Ok(Self::page(&rows, query))
        }
        .boxed()
    }

    fn fetch_admin_dashboard(&self, query: PageQuery) -> BackendResult<'_, Vec<AdminEvent>> {
        async move {
            self.record(Call::Dashboard(query));
            self.check(Op::Admin)?;
            let rows = self.dashboard.lock().unwrap().clone();
            Ok(Self::page(&rows, query))
        }
        .boxed()
    }

    fn fetch_admin_event(&self, id: EventId) -> BackendResult<'_, AdminEvent> {
        async move {
            self.record(Call::AdminEvent(id));
            self.check(Op::Admin)?;
            self.dashboard
                .lock()
                .unwrap()
                .iter()
                .find(|e| e.id == id)
                .cloned()
                .ok_or_else(|| Failure::NotFound.error())
        }
        .boxed()
    }

    fn create_event<'a>(&'a self, draft: &'a EventDraft) -> BackendResult<'a, ()> {
        async move {
            self.record(Call::Create(draft.name.clone()));
            self.check(Op::Admin)
        }
        .boxed()
    }

    fn update_event<'a>(&'a self, id: EventId, _draft: &'a EventDraft) -> BackendResult<'a, ()> {
        async move {
            self.record(Call::Update(id));
            self.check(Op::Admin)
        }
        .boxed()
    }

    fn delete_event(&self, id: EventId) -> BackendResult<'_, ()> {
        async move {
            self.record(Call::Delete(id));
            self.check(Op::Admin)
        }
        .boxed()
    }

    fn upload_event_image(&self, id: EventId, upload: ImageUpload) -> BackendResult<'_, ()> {
        async move {
            self.record(Call::Upload(id));
            self.check(Op::Admin)?;
            let mut dashboard = self.dashboard.lock().unwrap();
            if let Some(row) = dashboard.iter_mut().find(|e| e.id == id) {
                row.image_url = Some(format!("https://img.example/{}", upload.file_name));
            }
            Ok(())
        }
        .boxed()
    }
}

// ── Harness ─────────────────────────────────────────────────────────

pub struct Harness {
    pub backend: Arc<FakeBackend>,
    pub cache: Arc<MemoryCache>,
    pub desk: EventDesk,
}

impl Harness {
    pub fn new(backend: Arc<FakeBackend>) -> Self {
        Self::with_cache(backend, Arc::new(MemoryCache::new()))
    }

    pub fn with_cache(backend: Arc<FakeBackend>, cache: Arc<MemoryCache>) -> Self {
        let config = ClientConfig::local().unwrap();
        let desk = EventDesk::with_backend(
            config,
            Arc::clone(&backend) as Arc<dyn Backend>,
            Arc::clone(&cache) as Arc<dyn LocalCache>,
        );
        Self {
            backend,
            cache,
            desk,
        }
    }

    /// Harness with a signed-in user.
    pub fn signed_in(backend: Arc<FakeBackend>, email: &str) -> Self {
        let harness = Self::new(backend);
        harness.desk.resume(tokens_for(email, "USER")).unwrap();
        harness
    }

    pub fn admin(backend: Arc<FakeBackend>) -> Self {
        let harness = Self::new(backend);
        harness
            .desk
            .resume(tokens_for("admin@example.com", "ADMIN"))
            .unwrap();
        harness
    }

    pub fn dump(&self) -> Vec<(String, String)> {
        dump(self.cache.as_ref())
    }
}

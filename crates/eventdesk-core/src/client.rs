// ── Client facade ──
//
// Wires the backend, cache, session, stores, coordinator, filter and
// admin service together. Consumers hold one `EventDesk` per process.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::info;

use eventdesk_api::{ApiClient, TransportConfig};

use crate::admin::AdminService;
use crate::backend::Backend;
use crate::cache::LocalCache;
use crate::config::ClientConfig;
use crate::coordinator::BookingCoordinator;
use crate::details::EventDetailCache;
use crate::error::CoreError;
use crate::filter::CategoryFilter;
use crate::model::{AuthTokens, EventDetails, EventId, Registration, UserIdentity};
use crate::notify::Notifier;
use crate::session::Session;
use crate::store::{BookingsStore, DashboardStore, EventsStore, PaginatedStore};

pub struct EventDesk {
    config: ClientConfig,
    backend: Arc<dyn Backend>,
    session: Session,
    events: Arc<EventsStore>,
    bookings: Arc<BookingsStore>,
    details: EventDetailCache,
    coordinator: BookingCoordinator,
    filter: CategoryFilter,
    admin: AdminService,
}

impl EventDesk {
    /// Build a client talking HTTP to `config.base_url`.
    pub fn new(config: ClientConfig, cache: Arc<dyn LocalCache>) -> Result<Self, CoreError> {
        let transport = TransportConfig::default().with_timeout(config.timeout);
        let api = ApiClient::new(config.base_url.as_str(), &transport)?;
        Ok(Self::with_backend(config, Arc::new(api), cache))
    }

    /// Build a client over any `Backend` (tests use a scripted fake).
    pub fn with_backend(
        config: ClientConfig,
        backend: Arc<dyn Backend>,
        cache: Arc<dyn LocalCache>,
    ) -> Self {
        let notifier = Notifier::new();
        let session = Session::new(Arc::clone(&backend), cache, notifier);

        let events: Arc<EventsStore> = Arc::new(PaginatedStore::new(
            Arc::clone(&backend),
            session.clone(),
            config.page_size,
        ));
        let bookings: Arc<BookingsStore> = Arc::new(PaginatedStore::new(
            Arc::clone(&backend),
            session.clone(),
            config.page_size,
        ));
        let dashboard: Arc<DashboardStore> = Arc::new(PaginatedStore::new(
            Arc::clone(&backend),
            session.clone(),
            config.admin_page_size,
        ));
        let details = EventDetailCache::new(Arc::clone(&backend), session.clone());

        let coordinator = BookingCoordinator::new(
            Arc::clone(&backend),
            session.clone(),
            Arc::clone(&events),
            Arc::clone(&bookings),
            details.clone(),
        );
        let filter = CategoryFilter::new(Arc::clone(&backend), session.clone(), Arc::clone(&events));
        let admin = AdminService::new(
            Arc::clone(&backend),
            session.clone(),
            dashboard,
            Arc::clone(&events),
            details.clone(),
        );

        Self {
            config,
            backend,
            session,
            events,
            bookings,
            details,
            coordinator,
            filter,
            admin,
        }
    }

    // ── Accounts ─────────────────────────────────────────────────────

    /// Exchange credentials for tokens and start a session.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<(UserIdentity, AuthTokens), CoreError> {
        let tokens = self.backend.sign_in(email.trim(), password).await?;
        let identity = self.session.establish(tokens.clone())?;
        self.filter.clear();
        Ok((identity, tokens))
    }

    /// Create an account. Does not sign in.
    pub async fn register(&self, registration: &Registration) -> Result<(), CoreError> {
        registration.validate()?;
        self.backend.register(registration).await?;
        info!(email = %registration.email, "account registered");
        Ok(())
    }

    /// Restart a session from stored tokens.
    pub fn resume(&self, tokens: AuthTokens) -> Result<UserIdentity, CoreError> {
        self.session.establish(tokens)
    }

    /// End the session and wipe the cache.
    pub fn sign_out(&self) {
        self.filter.clear();
        self.session.sign_out();
    }

    // ── Shortcuts ────────────────────────────────────────────────────

    pub async fn open_event(&self, id: EventId) -> Result<EventDetails, CoreError> {
        self.session.require_user()?;
        self.details.open(id).await
    }

    /// Stop every store from applying late results.
    pub fn close(&self) {
        self.events.close();
        self.bookings.close();
        self.admin.dashboard().close();
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn notifier(&self) -> &Notifier {
        self.session.notifier()
    }

    pub fn events(&self) -> &Arc<EventsStore> {
        &self.events
    }

    pub fn bookings(&self) -> &Arc<BookingsStore> {
        &self.bookings
    }

    pub fn details(&self) -> &EventDetailCache {
        &self.details
    }

    pub fn coordinator(&self) -> &BookingCoordinator {
        &self.coordinator
    }

    pub fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    pub fn admin(&self) -> &AdminService {
        &self.admin
    }
}

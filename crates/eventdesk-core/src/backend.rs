// ── Remote collection client ──
//
// The seam between the stores and the network. `ApiClient` implements it
// for production; tests script an in-memory fake. Every method is a pure
// request/response with no side effects beyond the call itself.

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use secrecy::SecretString;

use eventdesk_api::ApiClient;

use crate::convert;
use crate::error::CoreError;
use crate::model::{
    AdminEvent, AuthTokens, Booking, BookingId, Category, CategoryId, EventDetails, EventDraft,
    EventId, EventSummary, ImageUpload, Registration,
};

/// One page request against a collection endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub size: u32,
    pub category: Option<CategoryId>,
}

impl PageQuery {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            category: None,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: Option<CategoryId>) -> Self {
        self.category = category;
        self
    }
}

pub type BackendResult<'a, T> = BoxFuture<'a, Result<T, CoreError>>;

pub trait Backend: Send + Sync {
    // ── Accounts ─────────────────────────────────────────────────────

    fn sign_in<'a>(&'a self, email: &'a str, password: &'a SecretString) -> BackendResult<'a, AuthTokens>;

    fn register<'a>(&'a self, registration: &'a Registration) -> BackendResult<'a, ()>;

    /// Install (or clear) the bearer token sent with every request.
    fn set_bearer_token(&self, token: Option<SecretString>);

    // ── Events ───────────────────────────────────────────────────────

    fn fetch_events(&self, query: PageQuery) -> BackendResult<'_, Vec<EventSummary>>;

    fn fetch_event_details(&self, id: EventId) -> BackendResult<'_, EventDetails>;

    fn fetch_categories(&self) -> BackendResult<'_, Vec<Category>>;

    // ── Bookings ─────────────────────────────────────────────────────

    /// Returns the created booking when the backend echoes one.
    fn book_event(&self, id: EventId) -> BackendResult<'_, Option<Booking>>;

    fn cancel_booking(&self, id: BookingId) -> BackendResult<'_, ()>;

    fn fetch_bookings(&self, query: PageQuery) -> BackendResult<'_, Vec<Booking>>;

    // ── Admin ────────────────────────────────────────────────────────

    fn fetch_admin_dashboard(&self, query: PageQuery) -> BackendResult<'_, Vec<AdminEvent>>;

    fn fetch_admin_event(&self, id: EventId) -> BackendResult<'_, AdminEvent>;

    fn create_event<'a>(&'a self, draft: &'a EventDraft) -> BackendResult<'a, ()>;

    fn update_event<'a>(&'a self, id: EventId, draft: &'a EventDraft) -> BackendResult<'a, ()>;

    fn delete_event(&self, id: EventId) -> BackendResult<'_, ()>;

    fn upload_event_image(&self, id: EventId, upload: ImageUpload) -> BackendResult<'_, ()>;
}

fn collect<D, T: From<D>>(rows: Vec<D>) -> Vec<T> {
    rows.into_iter().map(T::from).collect()
}

impl Backend for ApiClient {
    fn sign_in<'a>(&'a self, email: &'a str, password: &'a SecretString) -> BackendResult<'a, AuthTokens> {
        async move {
            let resp = self.login(email, password).await?;
            Ok(AuthTokens::from(resp))
        }
        .boxed()
    }

    fn register<'a>(&'a self, registration: &'a Registration) -> BackendResult<'a, ()> {
        async move {
            let request = convert::sign_up_request(registration);
            Ok(ApiClient::register(self, &request).await?)
        }
        .boxed()
    }

    fn set_bearer_token(&self, token: Option<SecretString>) {
        self.set_token(token);
    }

    fn fetch_events(&self, query: PageQuery) -> BackendResult<'_, Vec<EventSummary>> {
        async move {
            let rows = self
                .home_page_events(query.page, query.size, query.category.map(CategoryId::get))
                .await?;
            Ok(collect(rows))
        }
        .boxed()
    }

    fn fetch_event_details(&self, id: EventId) -> BackendResult<'_, EventDetails> {
        async move { Ok(EventDetails::from(self.event_details(id.get()).await?)) }.boxed()
    }

    fn fetch_categories(&self) -> BackendResult<'_, Vec<Category>> {
        async move { Ok(collect(self.categories().await?)) }.boxed()
    }

    fn book_event(&self, id: EventId) -> BackendResult<'_, Option<Booking>> {
        async move {
            let echoed = ApiClient::book_event(self, id.get()).await?;
            Ok(echoed.map(Booking::from))
        }
        .boxed()
    }

    fn cancel_booking(&self, id: BookingId) -> BackendResult<'_, ()> {
        async move { Ok(ApiClient::cancel_booking(self, id.get()).await?) }.boxed()
    }

    fn fetch_bookings(&self, query: PageQuery) -> BackendResult<'_, Vec<Booking>> {
        async move { Ok(collect(self.user_bookings(query.page, query.size).await?)) }.boxed()
    }

    fn fetch_admin_dashboard(&self, query: PageQuery) -> BackendResult<'_, Vec<AdminEvent>> {
        async move { Ok(collect(self.admin_dashboard(query.page, query.size).await?)) }.boxed()
    }

    fn fetch_admin_event(&self, id: EventId) -> BackendResult<'_, AdminEvent> {
        async move { Ok(AdminEvent::from(self.admin_event(id.get()).await?)) }.boxed()
    }

    fn create_event<'a>(&'a self, draft: &'a EventDraft) -> BackendResult<'a, ()> {
        async move {
            let request = convert::event_request(None, draft);
            Ok(ApiClient::create_event(self, &request).await?)
        }
        .boxed()
    }

    fn update_event<'a>(&'a self, id: EventId, draft: &'a EventDraft) -> BackendResult<'a, ()> {
        async move {
            let request = convert::event_request(Some(id), draft);
            Ok(ApiClient::update_event(self, id.get(), &request).await?)
        }
        .boxed()
    }

    fn delete_event(&self, id: EventId) -> BackendResult<'_, ()> {
        async move { Ok(ApiClient::delete_event(self, id.get()).await?) }.boxed()
    }

    fn upload_event_image(&self, id: EventId, upload: ImageUpload) -> BackendResult<'_, ()> {
        async move { Ok(ApiClient::upload_event_image(self, id.get(), upload).await?) }.boxed()
    }
}

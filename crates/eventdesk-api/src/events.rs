// Event catalogue endpoints: home page listing, details, categories.

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{CategoryDto, EventDetailsDto, EventSummaryDto};

impl ApiClient {
    /// `GET /user/homepage?page&size[&categoryId]` -- one page of event summaries.
    pub async fn home_page_events(
        &self,
        page: u32,
        size: u32,
        category_id: Option<i64>,
    ) -> Result<Vec<EventSummaryDto>, Error> {
        let mut params = vec![("page", page.to_string()), ("size", size.to_string())];
        if let Some(id) = category_id {
            params.push(("categoryId", id.to_string()));
        }
        self.get_with_params("user/homepage", &params).await
    }

    /// `GET /user/event/{id}`
    pub async fn event_details(&self, id: i64) -> Result<EventDetailsDto, Error> {
        self.get(&format!("user/event/{id}")).await
    }

    /// `GET /category/`
    pub async fn categories(&self) -> Result<Vec<CategoryDto>, Error> {
        self.get("category/").await
    }
}

// Administrator endpoints: dashboard, event CRUD, image upload.

use reqwest::multipart::{Form, Part};

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{AdminEventDto, EventRequest, ImageUpload};

impl ApiClient {
    /// `GET /admin/dashboard?page&size`
    pub async fn admin_dashboard(&self, page: u32, size: u32) -> Result<Vec<AdminEventDto>, Error> {
        let params = [("page", page.to_string()), ("size", size.to_string())];
        self.get_with_params("admin/dashboard", &params).await
    }

    /// `GET /admin/event/{id}` -- includes attendee list and booking count.
    pub async fn admin_event(&self, id: i64) -> Result<AdminEventDto, Error> {
        self.get(&format!("admin/event/{id}")).await
    }

    /// `POST /admin/control-panel`
    pub async fn create_event(&self, request: &EventRequest) -> Result<(), Error> {
        self.post_no_response("admin/control-panel", request).await
    }

    /// `PUT /admin/control-panel/{id}`
    pub async fn update_event(&self, id: i64, request: &EventRequest) -> Result<(), Error> {
        self.put_no_response(&format!("admin/control-panel/{id}"), request)
            .await
    }

    /// `DELETE /admin/control-panel/{id}`
    pub async fn delete_event(&self, id: i64) -> Result<(), Error> {
        self.delete(&format!("admin/control-panel/{id}")).await
    }

    /// `POST /admin/events/{id}/upload-image` as multipart field `file`.
    pub async fn upload_event_image(&self, id: i64, upload: ImageUpload) -> Result<(), Error> {
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)
            .map_err(|e| Error::Setup(format!("invalid content type: {e}")))?;
        let form = Form::new().part("file", part);
        self.post_multipart(&format!("admin/events/{id}/upload-image"), form)
            .await
    }
}

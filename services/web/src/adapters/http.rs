//! services/web/src/adapters/http.rs
//!
//! The reqwest adapter for the emotion backend. It implements every backend
//! port from the `core` crate: one method, one request, no retries, no cache.
//! Transport failures, non-2xx statuses and undecodable bodies are mapped onto
//! `PortError` so every caller handles them the same way.

use async_trait::async_trait;
use deep_purple_core::domain::{
    Communication, CommunicationDraft, Credentials, EmotionCategory, LoginResponse, Model,
    UploadRequest, User, UserDraft, WordAssociation,
};
use deep_purple_core::ports::{
    AuthService, CommunicationService, EmotionService, ModelService, PortError, PortResult,
    UserAdminService,
};
use deep_purple_core::session::AuthContext;
use reqwest::{multipart, Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

/// How much of an error body is kept in the error message.
const ERROR_BODY_PREVIEW: usize = 200;

/// A backend adapter that implements all five backend ports over HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    backend_url: String,
    communications_url: String,
    auth: Arc<AuthContext>,
}

impl HttpBackend {
    /// Creates a new `HttpBackend`. The auth context supplies the bearer token,
    /// when one was issued at login.
    pub fn new(
        backend_url: &str,
        communications_url: &str,
        auth: Arc<AuthContext>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            backend_url: backend_url.trim_end_matches('/').to_string(),
            communications_url: communications_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    fn backend(&self, path: &str) -> String {
        format!("{}{}", self.backend_url, path)
    }

    fn communications(&self, path: &str) -> String {
        format!("{}/communications{}", self.communications_url, path)
    }

    async fn dispatch(&self, request: RequestBuilder) -> PortResult<Vec<u8>> {
        let request = match self.auth.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await.map_err(map_transport_error)?;

        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(%status, path = %url, bytes = body.len(), "backend responded");
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        Ok(body.to_vec())
    }

    /// Sends the request and decodes the JSON body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> PortResult<T> {
        let body = self.dispatch(request).await?;
        serde_json::from_slice(&body).map_err(|e| PortError::Malformed(e.to_string()))
    }

    /// Sends the request and ignores whatever body comes back.
    async fn send_empty(&self, request: RequestBuilder) -> PortResult<()> {
        self.dispatch(request).await.map(|_| ())
    }
}

fn map_transport_error(error: reqwest::Error) -> PortError {
    PortError::Transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PortError {
    let message: String = String::from_utf8_lossy(body)
        .chars()
        .take(ERROR_BODY_PREVIEW)
        .collect();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized,
        StatusCode::NOT_FOUND => PortError::NotFound(message),
        _ => PortError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

//=========================================================================================
// Users and Authentication
//=========================================================================================

#[async_trait]
impl AuthService for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> PortResult<LoginResponse> {
        self.send(self.client.post(self.backend("/users/login")).json(credentials))
            .await
    }

    async fn register(&self, credentials: &Credentials) -> PortResult<()> {
        self.send_empty(self.client.post(self.backend("/users/register")).json(credentials))
            .await
    }
}

#[async_trait]
impl UserAdminService for HttpBackend {
    async fn list_users(&self) -> PortResult<Vec<User>> {
        self.send(self.client.get(self.backend("/admin"))).await
    }

    async fn create_user(&self, draft: &UserDraft) -> PortResult<User> {
        self.send(self.client.post(self.backend("/admin/create")).json(draft))
            .await
    }

    async fn update_user(&self, id: i64, draft: &UserDraft) -> PortResult<User> {
        self.send(self.client.put(self.backend(&format!("/admin/{id}"))).json(draft))
            .await
    }

    async fn delete_user(&self, id: i64) -> PortResult<()> {
        self.send_empty(self.client.delete(self.backend(&format!("/admin/{id}"))))
            .await
    }
}

//=========================================================================================
// Models, Categories and Word Associations
//=========================================================================================

#[async_trait]
impl ModelService for HttpBackend {
    async fn list_models(&self) -> PortResult<Vec<Model>> {
        self.send(self.client.get(self.backend("/models"))).await
    }

    async fn create_model(&self, name: &str) -> PortResult<Model> {
        self.send(self.client.post(self.backend("/models")).query(&[("name", name)]))
            .await
    }

    async fn delete_model(&self, id: i64) -> PortResult<()> {
        self.send_empty(self.client.delete(self.backend(&format!("/models/{id}"))))
            .await
    }
}

#[async_trait]
impl EmotionService for HttpBackend {
    async fn list_categories(&self, model_id: i64) -> PortResult<Vec<EmotionCategory>> {
        let request = self
            .client
            .get(self.backend("/emotion/category"))
            .query(&[("modelId", model_id)]);
        self.send(request).await
    }

    async fn list_all_categories(&self) -> PortResult<Vec<EmotionCategory>> {
        self.send(self.client.get(self.backend("/emotion/emotion-categories")))
            .await
    }

    async fn create_category(&self, model_id: i64, name: &str) -> PortResult<EmotionCategory> {
        let request = self
            .client
            .post(self.backend("/emotion/category"))
            .query(&[("modelId", model_id.to_string()), ("name", name.to_string())]);
        self.send(request).await
    }

    async fn update_category(&self, id: i64, name: &str) -> PortResult<EmotionCategory> {
        let request = self
            .client
            .put(self.backend(&format!("/emotion/category/{id}")))
            .query(&[("name", name)]);
        self.send(request).await
    }

    async fn delete_category(&self, id: i64) -> PortResult<()> {
        self.send_empty(
            self.client
                .delete(self.backend(&format!("/emotion/category/{id}"))),
        )
        .await
    }

    async fn list_associations(&self, model_id: i64) -> PortResult<Vec<WordAssociation>> {
        self.send(
            self.client
                .get(self.backend(&format!("/emotion/word-associations/{model_id}"))),
        )
        .await
    }

    async fn create_association(
        &self,
        word: &str,
        emotion_category_id: i64,
    ) -> PortResult<WordAssociation> {
        let request = self
            .client
            .post(self.backend("/emotion/word-association"))
            .query(&[
                ("word", word.to_string()),
                ("emotionCategoryId", emotion_category_id.to_string()),
            ]);
        self.send(request).await
    }

    async fn delete_association(&self, id: i64) -> PortResult<()> {
        self.send_empty(
            self.client
                .delete(self.backend(&format!("/emotion/word-association/{id}"))),
        )
        .await
    }
}

//=========================================================================================
// Communications
//=========================================================================================

#[async_trait]
impl CommunicationService for HttpBackend {
    async fn save(&self, draft: &CommunicationDraft) -> PortResult<Communication> {
        self.send(self.client.post(self.communications("")).json(draft))
            .await
    }

    async fn update(&self, id: i64, draft: &CommunicationDraft) -> PortResult<Communication> {
        self.send(self.client.put(self.communications(&format!("/{id}"))).json(draft))
            .await
    }

    async fn delete(&self, id: i64) -> PortResult<()> {
        self.send_empty(self.client.delete(self.communications(&format!("/{id}"))))
            .await
    }

    async fn get(&self, id: i64) -> PortResult<Communication> {
        self.send(self.client.get(self.communications(&format!("/{id}"))))
            .await
    }

    async fn list(&self) -> PortResult<Vec<Communication>> {
        self.send(self.client.get(self.communications(""))).await
    }

    async fn upload(&self, request: UploadRequest) -> PortResult<Communication> {
        let form = multipart::Form::new()
            .part(
                "file",
                multipart::Part::bytes(request.bytes).file_name(request.file_name),
            )
            .text("modelName", request.model_name);
        self.send(
            self.client
                .post(self.communications("/upload"))
                .multipart(form),
        )
        .await
    }
}

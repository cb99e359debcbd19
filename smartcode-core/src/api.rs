//! HTTP client for the remote review service.
//!
//! Thin wrapper translating local calls into requests against `{base_url}/api/...`.
//! A bearer token is attached when one is present; non-2xx responses become
//! [`Error::Api`] carrying the server's `detail` text or the action's fallback.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::types::{
    AuthResponse, ChatRequest, ChatResponse, GenerationResult, ProfileUpdate, ReviewResult,
    SessionDetail, SessionSummary, UploadSignature, UserProfile,
};
use crate::upload::FileUpload;

/// Default host for direct avatar uploads.
pub const DEFAULT_UPLOAD_HOST: &str = "https://api.cloudinary.com";

/// The remote calls the review workflow depends on.
///
/// Implemented by [`ApiClient`]; tests substitute an in-memory backend.
#[trait_variant::make(ReviewBackend: Send)]
pub trait LocalReviewBackend {
    /// `POST /api/review`
    async fn review_code(&self, code: &str, language: &str) -> Result<ReviewResult>;

    /// `POST /api/review/file` (multipart field `file`)
    async fn review_file(&self, upload: &FileUpload) -> Result<ReviewResult>;

    /// `POST /api/generate`
    async fn generate_code(&self, prompt: &str, language: &str) -> Result<GenerationResult>;

    /// `POST /api/chat`
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

/// How a non-2xx response is turned into a message.
#[derive(Debug, Clone, Copy)]
enum OnError {
    /// Prefer the server `detail`, else the fallback.
    Detail(&'static str),
    /// Always the fallback.
    Fixed(&'static str),
}

/// Client for the review service. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    upload_host: String,
    token: Option<String>,
}

impl ApiClient {
    /// Builds a client for `base_url`, e.g. `"http://localhost:8000"`.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            upload_host: DEFAULT_UPLOAD_HOST.to_owned(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// Overrides the image host used by [`ApiClient::upload_avatar`].
    pub fn with_upload_host(mut self, host: impl Into<String>) -> Self {
        self.upload_host = host.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token.filter(|t| !t.is_empty());
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attaches `Authorization: Bearer <token>` when a token is held.
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Authentication
    // ─────────────────────────────────────────────────────────────

    /// `POST /api/auth/signin`. The username sent is the local part of `email`.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let username = email.split('@').next().unwrap_or_default();
        let body = serde_json::json!({ "email": email, "password": password, "username": username });
        let resp = self.http.post(self.url("/api/auth/signin")).json(&body).send().await?;
        decode(resp, OnError::Fixed("Invalid credentials")).await
    }

    /// `POST /api/auth/signup`
    pub async fn sign_up(&self, username: &str, email: &str, password: &str) -> Result<AuthResponse> {
        let body = serde_json::json!({ "username": username, "email": email, "password": password });
        let resp = self.http.post(self.url("/api/auth/signup")).json(&body).send().await?;
        decode(resp, OnError::Detail("Signup failed")).await
    }

    // ─────────────────────────────────────────────────────────────
    // Server-side sessions
    // ─────────────────────────────────────────────────────────────

    /// `GET /api/sessions`
    pub async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let resp = self.authorized(self.http.get(self.url("/api/sessions"))).send().await?;
        decode(resp, OnError::Fixed("Failed to fetch sessions")).await
    }

    /// `GET /api/sessions/{id}`
    pub async fn session_detail(&self, id: &str) -> Result<SessionDetail> {
        let url = self.url(&format!("/api/sessions/{id}"));
        let resp = self.authorized(self.http.get(url)).send().await?;
        decode(resp, OnError::Fixed("Failed to fetch session details")).await
    }

    /// `DELETE /api/sessions/{id}`. The acknowledgement body is ignored.
    pub async fn delete_session(&self, id: &str) -> Result<()> {
        let url = self.url(&format!("/api/sessions/{id}"));
        let resp = self.authorized(self.http.delete(url)).send().await?;
        check(resp, OnError::Fixed("Failed to delete session")).await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    // Profile
    // ─────────────────────────────────────────────────────────────

    /// `GET /api/users/me`
    pub async fn profile(&self) -> Result<UserProfile> {
        let resp = self.authorized(self.http.get(self.url("/api/users/me"))).send().await?;
        decode(resp, OnError::Fixed("Failed to fetch profile")).await
    }

    /// `PUT /api/users/me`
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        let resp = self
            .authorized(self.http.put(self.url("/api/users/me")))
            .json(update)
            .send()
            .await?;
        decode(resp, OnError::Fixed("Failed to update profile")).await
    }

    /// Uploads an image through signed direct upload and returns its `secure_url`.
    ///
    /// Step one fetches signed parameters from `GET /api/users/cloudinary/signature`;
    /// step two posts the file with those parameters to the image host.
    pub async fn upload_avatar(&self, path: &Path) -> Result<String> {
        let resp = self
            .authorized(self.http.get(self.url("/api/users/cloudinary/signature")))
            .send()
            .await?;
        let sign: UploadSignature = decode(resp, OnError::Fixed("Failed to get upload signature")).await?;

        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "avatar".to_owned());

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("api_key", sign.api_key)
            .text("timestamp", sign.timestamp.to_string())
            .text("signature", sign.signature)
            .text("folder", sign.folder);

        let url = format!("{}/v1_1/{}/image/upload", self.upload_host, sign.cloud_name);
        let resp = self.http.post(url).multipart(form).send().await?;
        let body: JsonValue = decode(resp, OnError::Fixed("Cloudinary upload failed")).await?;
        body.get("secure_url")
            .and_then(JsonValue::as_str)
            .map(str::to_owned)
            .ok_or_else(|| Error::Api { status: 200, message: "Cloudinary upload failed".to_owned() })
    }
}

impl ReviewBackend for ApiClient {
    async fn review_code(&self, code: &str, language: &str) -> Result<ReviewResult> {
        tracing::debug!(language, bytes = code.len(), "POST /api/review");
        let body = serde_json::json!({ "code": code, "language": language });
        let resp = self
            .authorized(self.http.post(self.url("/api/review")))
            .json(&body)
            .send()
            .await?;
        decode(resp, OnError::Detail("Failed to review code")).await
    }

    async fn review_file(&self, upload: &FileUpload) -> Result<ReviewResult> {
        tracing::debug!(file = %upload.file_name, bytes = upload.bytes.len(), "POST /api/review/file");
        let part = Part::bytes(upload.bytes.clone()).file_name(upload.file_name.clone());
        let form = Form::new().part("file", part);
        let resp = self
            .http
            .post(self.url("/api/review/file"))
            .multipart(form)
            .send()
            .await?;
        decode(resp, OnError::Detail("Failed to analyze file")).await
    }

    async fn generate_code(&self, prompt: &str, language: &str) -> Result<GenerationResult> {
        tracing::debug!(language, "POST /api/generate");
        let body = serde_json::json!({ "prompt": prompt, "language": language });
        let resp = self.http.post(self.url("/api/generate")).json(&body).send().await?;
        decode(resp, OnError::Detail("Failed to generate code")).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        tracing::debug!(turns = request.messages.len(), "POST /api/chat");
        let resp = self
            .authorized(self.http.post(self.url("/api/chat")))
            .json(request)
            .send()
            .await?;
        decode(resp, OnError::Detail("Failed to get chat response")).await
    }
}

/// Returns the response unchanged when successful, else the mapped [`Error::Api`].
async fn check(resp: Response, on_error: OnError) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = match on_error {
        OnError::Fixed(fallback) => fallback.to_owned(),
        OnError::Detail(fallback) => {
            let body = resp.text().await.unwrap_or_default();
            detail_message(&body).unwrap_or_else(|| fallback.to_owned())
        }
    };
    tracing::warn!(status = status.as_u16(), %message, "request failed");
    Err(Error::Api { status: status.as_u16(), message })
}

async fn decode<T: DeserializeOwned>(resp: Response, on_error: OnError) -> Result<T> {
    let resp = check(resp, on_error).await?;
    Ok(resp.json::<T>().await?)
}

/// Extracts a non-empty string `detail` from an error body.
fn detail_message(body: &str) -> Option<String> {
    let value: JsonValue = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .and_then(JsonValue::as_str)
        .filter(|d| !d.is_empty())
        .map(str::to_owned)
}

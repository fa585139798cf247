use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use servicedesk_domain::{Category, RecordId, RequestFields, SupportRequest};

use crate::backend::{BackendError, MutationKind, RequestBackend};

pub const DEFAULT_FETCH_ATTEMPTS: usize = 2;

const REQUESTS_PATH: &str = "/support-requests/";
const CATEGORIES_PATH: &str = "/support-requests/categories/";
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Transport-level failure before it is mapped onto the backend taxonomy.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request failed: {message}")]
    Request { message: String },
    #[error("response read failed: {message}")]
    Read { message: String },
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("json decode failed: {message}")]
    Decode { message: String },
}

/// HTTP adapter for the support-requests API.
///
/// Reads are retried once on transport failure; writes are sent exactly once
/// so a flaky connection cannot double-create a record.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    base_url: String,
    timeout: Duration,
    fetch_attempts: usize,
    http: reqwest::Client,
}

/// Write payload as the API expects it. The category selection is sent as a
/// JSON number whenever it parses as one.
#[derive(Debug, Serialize)]
struct RequestBody<'a> {
    name: &'a str,
    email: &'a str,
    category_id: RecordId,
    description: &'a str,
}

impl<'a> RequestBody<'a> {
    fn from_fields(fields: &'a RequestFields) -> Self {
        Self {
            name: &fields.name,
            email: &fields.email,
            category_id: RecordId::parse(&fields.category),
            description: &fields.description,
        }
    }
}

impl RemoteBackend {
    #[must_use]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            fetch_attempts: DEFAULT_FETCH_ATTEMPTS,
            http: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    #[must_use]
    pub fn request_path(id: &RecordId) -> String {
        format!("{REQUESTS_PATH}{id}")
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, HttpError>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let url = self.endpoint(path);
        let mut last_error = HttpError::Request {
            message: "request not attempted".to_string(),
        };
        for _ in 0..self.fetch_attempts.max(1) {
            match self
                .http
                .get(url.as_str())
                .header(REQUEST_ID_HEADER, request_id())
                .timeout(self.timeout)
                .send()
                .await
            {
                Ok(response) => return decode_json(response).await,
                Err(error) => {
                    last_error = HttpError::Request {
                        message: error.to_string(),
                    };
                }
            }
        }
        Err(last_error)
    }

    async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, HttpError>
    where
        T: for<'de> serde::Deserialize<'de>,
        B: Serialize + ?Sized,
    {
        let response = self
            .http
            .post(self.endpoint(path))
            .header(REQUEST_ID_HEADER, request_id())
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|error| HttpError::Request {
                message: error.to_string(),
            })?;
        decode_json(response).await
    }

    async fn put_json<T, B>(&self, path: &str, body: &B) -> Result<T, HttpError>
    where
        T: for<'de> serde::Deserialize<'de>,
        B: Serialize + ?Sized,
    {
        let response = self
            .http
            .put(self.endpoint(path))
            .header(REQUEST_ID_HEADER, request_id())
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|error| HttpError::Request {
                message: error.to_string(),
            })?;
        decode_json(response).await
    }

    async fn delete_path(&self, path: &str) -> Result<(), HttpError> {
        let response = self
            .http
            .delete(self.endpoint(path))
            .header(REQUEST_ID_HEADER, request_id())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|error| HttpError::Request {
                message: error.to_string(),
            })?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let bytes = response.bytes().await.map_err(|error| HttpError::Read {
            message: error.to_string(),
        })?;
        Err(http_error(status, &bytes))
    }
}

#[async_trait]
impl RequestBackend for RemoteBackend {
    async fn fetch_categories(&self) -> Result<Vec<Category>, BackendError> {
        self.get_json(CATEGORIES_PATH)
            .await
            .map_err(|error| BackendError::category_load(error.to_string()))
    }

    async fn fetch_requests(&self) -> Result<Vec<SupportRequest>, BackendError> {
        self.get_json(REQUESTS_PATH)
            .await
            .map_err(|error| BackendError::fetch(error.to_string()))
    }

    async fn create(&self, fields: &RequestFields) -> Result<SupportRequest, BackendError> {
        self.post_json(REQUESTS_PATH, &RequestBody::from_fields(fields))
            .await
            .map_err(|error| BackendError::persistence(MutationKind::Create, error.to_string()))
    }

    async fn update(
        &self,
        id: &RecordId,
        fields: &RequestFields,
    ) -> Result<SupportRequest, BackendError> {
        self.put_json(
            Self::request_path(id).as_str(),
            &RequestBody::from_fields(fields),
        )
        .await
        .map_err(|error| BackendError::persistence(MutationKind::Update, error.to_string()))
    }

    async fn delete(&self, id: &RecordId) -> Result<(), BackendError> {
        self.delete_path(Self::request_path(id).as_str())
            .await
            .map_err(|error| BackendError::persistence(MutationKind::Delete, error.to_string()))
    }
}

async fn decode_json<T>(response: reqwest::Response) -> Result<T, HttpError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let status = response.status();
    let bytes = response.bytes().await.map_err(|error| HttpError::Read {
        message: error.to_string(),
    })?;
    if !status.is_success() {
        return Err(http_error(status, &bytes));
    }
    serde_json::from_slice::<T>(&bytes).map_err(|error| HttpError::Decode {
        message: error.to_string(),
    })
}

fn http_error(status: StatusCode, body: &[u8]) -> HttpError {
    let body = String::from_utf8_lossy(body);
    let body = body.trim();
    HttpError::Http {
        status: status.as_u16(),
        body: if body.is_empty() { "<empty>" } else { body }.to_string(),
    }
}

fn request_id() -> String {
    format!("req_{}", Uuid::new_v4().simple())
}

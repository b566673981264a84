use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },
    #[error("failed to parse response: {0}")]
    Decode(String),
}

/// Link as stored by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST /api/v1/links`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NewLink {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Body of `PUT /api/v1/links/{id}`; absent fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LinkChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Account returned by `POST /api/v1/users`. The API key is only ever sent once.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserRecord {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub email: String,
    pub api_key: String,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct NewUser<'a> {
    email: &'a str,
}

#[async_trait::async_trait]
pub trait LinkApi: Send + Sync {
    async fn list_links(&self) -> Result<Vec<LinkRecord>, ApiError>;
    async fn create_link(&self, link: &NewLink) -> Result<LinkRecord, ApiError>;
    async fn update_link(&self, id: &str, changes: &LinkChanges) -> Result<LinkRecord, ApiError>;
    async fn delete_link(&self, id: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// `LinkApi` over HTTP+JSON.
#[derive(Debug, Clone)]
pub struct ReqwestLinkApi {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ReqwestLinkApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.filter(|key| !key.is_empty()),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn send_raw(&self, builder: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ApiError::Network(format!("failed to read response: {err}")))?;
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|parsed| parsed.error)
                .filter(|error| !error.is_empty())
                .unwrap_or_else(|| {
                    if body.trim().is_empty() {
                        status
                            .canonical_reason()
                            .unwrap_or("unknown error")
                            .to_string()
                    } else {
                        body.clone()
                    }
                });
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }

    /// Registers a new account. Needs no API key; any configured key is sent anyway.
    pub async fn create_user(&self, email: &str) -> Result<UserRecord, ApiError> {
        let builder = self
            .request(reqwest::Method::POST, "/api/v1/users")
            .json(&NewUser { email });
        self.send_json(builder).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send_raw(builder).await?;
        serde_json::from_str(&body).map_err(|err| ApiError::Decode(err.to_string()))
    }
}

#[async_trait::async_trait]
impl LinkApi for ReqwestLinkApi {
    async fn list_links(&self) -> Result<Vec<LinkRecord>, ApiError> {
        self.send_json(self.request(reqwest::Method::GET, "/api/v1/links"))
            .await
    }

    async fn create_link(&self, link: &NewLink) -> Result<LinkRecord, ApiError> {
        let builder = self
            .request(reqwest::Method::POST, "/api/v1/links")
            .json(link);
        self.send_json(builder).await
    }

    async fn update_link(&self, id: &str, changes: &LinkChanges) -> Result<LinkRecord, ApiError> {
        let builder = self
            .request(reqwest::Method::PUT, &format!("/api/v1/links/{id}"))
            .json(changes);
        self.send_json(builder).await
    }

    async fn delete_link(&self, id: &str) -> Result<(), ApiError> {
        self.send_raw(self.request(reqwest::Method::DELETE, &format!("/api/v1/links/{id}")))
            .await
            .map(|_| ())
    }
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

/// Accepts RFC 3339 as well as naive ISO 8601 timestamps, which are read as UTC.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&raw, format) {
            return Ok(Some(Utc.from_utc_datetime(&naive)));
        }
    }
    Err(serde::de::Error::custom(format!(
        "failed to parse datetime: {raw}"
    )))
}

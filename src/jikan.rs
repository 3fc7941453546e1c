use std::time::Duration;

use log::debug;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.jikan.moe/v4";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("aniwiki-api/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream responded with status {status}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Pooled client for the Jikan REST API.
///
/// Cloning is cheap and every clone shares the same connection pool.
#[derive(Clone, Debug)]
pub struct JikanClient {
    http: reqwest::Client,
    base_url: String,
}

impl JikanClient {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Issues a single GET against `path` and returns the decoded JSON body.
    ///
    /// Non-2xx answers come back as [`UpstreamError::Status`] carrying the raw
    /// body text. Anything that fails before a usable body arrives, including
    /// a 2xx body that is not JSON, is an [`UpstreamError::Transport`].
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, UpstreamError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Jikan request: {} {:?}", url, query);

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await?;
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

/// Wraps single-item responses: `{ "data": T }`
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct JikanResponse<T> {
    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<T>,
}

impl<T: DeserializeOwned> JikanResponse<T> {
    /// Anything but a JSON object yields an empty envelope.
    pub fn from_body(body: Value) -> Self {
        let empty = Self { data: None };
        match body {
            Value::Object(_) => serde_json::from_value(body).unwrap_or(empty),
            _ => empty,
        }
    }
}

/// Wraps paginated list responses: `{ "data": [T], "pagination": {...} }`
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct JikanPage<T> {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub data: Vec<T>,
    #[serde(default, deserialize_with = "lenient")]
    pub pagination: Option<JikanPagination>,
}

impl<T: DeserializeOwned> JikanPage<T> {
    pub fn from_body(body: Value) -> Self {
        let empty = Self {
            data: Vec::new(),
            pagination: None,
        };
        match body {
            Value::Object(_) => serde_json::from_value(body).unwrap_or(empty),
            _ => empty,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct JikanPagination {
    #[serde(default, deserialize_with = "lenient")]
    pub current_page: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub has_next_page: Option<bool>,
}

/// Decodes a field as `T`, falling back to `None` when the upstream value is
/// null or of an unexpected type.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(T::deserialize(value).ok())
}

/// Decodes an array field, dropping elements that are not a valid `T`.
/// Anything other than an array becomes an empty vector.
pub(crate) fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| T::deserialize(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_page_with_pagination() {
        let page: JikanPage<Value> = JikanPage::from_body(json!({
            "pagination": {
                "last_visible_page": 4,
                "has_next_page": true,
                "current_page": 2,
                "items": {"count": 2, "total": 80, "per_page": 2}
            },
            "data": [{"mal_id": 1}, {"mal_id": 2}]
        }));

        assert_eq!(page.data.len(), 2);
        let pagination = page.pagination.unwrap();
        assert_eq!(pagination.current_page, Some(2));
        assert_eq!(pagination.has_next_page, Some(true));
    }

    #[test]
    fn test_page_tolerates_wrong_shapes() {
        let page: JikanPage<Value> = JikanPage::from_body(json!({
            "data": {"not": "an array"},
            "pagination": "nope"
        }));
        assert!(page.data.is_empty());
        assert!(page.pagination.is_none());

        let page: JikanPage<Value> = JikanPage::from_body(Value::Null);
        assert!(page.data.is_empty());
        assert!(page.pagination.is_none());
    }

    #[test]
    fn test_pagination_fields_of_wrong_type() {
        let page: JikanPage<Value> = JikanPage::from_body(json!({
            "data": [],
            "pagination": {"current_page": "two", "has_next_page": "true"}
        }));
        let pagination = page.pagination.unwrap();
        assert_eq!(pagination.current_page, None);
        assert_eq!(pagination.has_next_page, None);
    }

    #[test]
    fn test_response_with_null_data() {
        let response: JikanResponse<Value> = JikanResponse::from_body(json!({"data": null}));
        assert!(response.data.is_none());

        let response: JikanResponse<String> = JikanResponse::from_body(json!([1, 2, 3]));
        assert!(response.data.is_none());
    }

    #[test]
    fn test_array_body_is_not_an_envelope() {
        let response: JikanResponse<Value> =
            JikanResponse::from_body(json!([{"mal_id": 7, "title": "X"}]));
        assert!(response.data.is_none());

        let page: JikanPage<Value> = JikanPage::from_body(json!([
            [{"mal_id": 7}],
            {"current_page": 9, "has_next_page": true}
        ]));
        assert!(page.data.is_empty());
        assert!(page.pagination.is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = JikanClient::new("http://localhost:9000/v4/").unwrap();
        assert_eq!(client.base_url, "http://localhost:9000/v4");
    }
}

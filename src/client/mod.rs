//! REST client layer for the FireHydrant API.
//!
//! One client trait per resource family, each implemented by a `Rest*` type
//! that holds a clone of the shared [`ApiClient`] handle. The handle is immutable after
//! construction and cheap to clone, so the same one can be used from any
//! number of concurrent resource callbacks.

use std::fmt;
use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::{debug, error};
use url::Url;

pub mod error;
pub mod priorities;
pub mod runbook_actions;
pub mod task_lists;

pub use error::{ClientError, ErrorKind};
pub use priorities::{
    CreatePriorityRequest, PrioritiesClient, Priority, RestPrioritiesClient,
    UpdatePriorityRequest,
};
pub use runbook_actions::{
    Integration, RestRunbookActionsClient, RunbookAction, RunbookActionsClient,
    RUNBOOK_ACTIONS_PAGE_SIZE,
};
pub use task_lists::{
    CreateTaskListRequest, RestTaskListsClient, TaskList, TaskListCreator, TaskListItem,
    TaskListsClient, UpdateTaskListRequest,
};

/// Base URL of the public FireHydrant API.
pub const DEFAULT_BASE_URL: &str = "https://api.firehydrant.io/v1/";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Maximum length of response body to log
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Shared HTTP handle for every REST client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url`.
    ///
    /// A trailing slash is added to the base URL when missing so that
    /// relative paths resolve beneath it.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, ClientError> {
        let base_url = parse_base_url(base_url)?;
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ClientError::transport("could not build HTTP client", e))?;

        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
        })
    }

    /// The base URL every request path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Client for runbook actions.
    pub fn runbook_actions(&self) -> RestRunbookActionsClient {
        RestRunbookActionsClient::new(self.clone())
    }

    /// Client for task lists.
    pub fn task_lists(&self) -> RestTaskListsClient {
        RestTaskListsClient::new(self.clone())
    }

    /// Client for priorities.
    pub fn priorities(&self) -> RestPrioritiesClient {
        RestPrioritiesClient::new(self.clone())
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self.base_url.join(path).map_err(|e| {
            ClientError::Validation(format!("invalid request path '{}': {}", path, e))
        })?;
        debug!(%method, path, "sending request");
        Ok(self.http.request(method, url).bearer_auth(&self.api_key))
    }
}

/// The set of client capabilities handed to resource adapters.
#[derive(Clone)]
pub struct Clients {
    /// Runbook action lookups.
    pub runbook_actions: Arc<dyn RunbookActionsClient>,
    /// Task list CRUD.
    pub task_lists: Arc<dyn TaskListsClient>,
    /// Priority CRUD.
    pub priorities: Arc<dyn PrioritiesClient>,
}

impl Clients {
    /// REST-backed clients sharing one HTTP handle.
    pub fn rest(api: &ApiClient) -> Self {
        Self {
            runbook_actions: Arc::new(api.runbook_actions()),
            task_lists: Arc::new(api.task_lists()),
            priorities: Arc::new(api.priorities()),
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let mut normalized = raw.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    let url = Url::parse(&normalized)
        .map_err(|e| ClientError::Validation(format!("invalid base URL '{}': {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(ClientError::Validation(format!(
            "invalid base URL '{}': cannot be used as a base",
            raw
        )));
    }
    Ok(url)
}

/// Percent-encode a single path segment, rejecting empty identifiers.
pub(crate) fn path_segment<'a>(
    what: &str,
    value: &'a str,
) -> Result<std::borrow::Cow<'a, str>, ClientError> {
    if value.is_empty() {
        return Err(ClientError::Validation(format!("{} must not be empty", what)));
    }
    Ok(urlencoding::encode(value))
}

/// Send a request and decode a JSON response body.
pub(crate) async fn receive<T: DeserializeOwned>(
    request: RequestBuilder,
    context: &str,
) -> Result<T, ClientError> {
    let response = execute(request, context).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::transport(context, e))
}

/// Send a request whose response body is ignored.
pub(crate) async fn receive_empty(request: RequestBuilder, context: &str) -> Result<(), ClientError> {
    execute(request, context).await.map(|_| ())
}

async fn execute(request: RequestBuilder, context: &str) -> Result<Response, ClientError> {
    let response = request
        .send()
        .await
        .map_err(|e| ClientError::transport(context, e))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    error!(%status, body = %sanitize_for_log(&body), "{}", context);
    Err(ClientError::Status {
        context: context.to_string(),
        status,
        body,
    })
}

/// Decode an explicit JSON `null` as the type's default value.
///
/// Pair with `#[serde(default)]` so a missing key decodes the same way.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Truncate long bodies and strip control characters before logging.
fn sanitize_for_log(body: &str) -> String {
    let char_count = body.chars().count();
    let truncated = if char_count > MAX_LOG_BODY_LENGTH {
        let head: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", head, body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = ApiClient::new("https://api.example.com/v1", "key").unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.example.com/v1/");

        let client = ApiClient::new(DEFAULT_BASE_URL, "key").unwrap();
        assert_eq!(client.base_url().as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ApiClient::new("not a url", "key").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = ApiClient::new("mailto:ops@example.com", "key").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let client = ApiClient::new(DEFAULT_BASE_URL, "super-secret").unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_path_segment() {
        assert_eq!(path_segment("id", "abc").unwrap(), "abc");
        assert_eq!(path_segment("id", "a/b c").unwrap(), "a%2Fb%20c");
        assert!(path_segment("id", "").is_err());
    }

    #[test]
    fn test_sanitize_for_log() {
        assert_eq!(sanitize_for_log("short body"), "short body");
        assert_eq!(sanitize_for_log("line\nbreak"), "linebreak");

        let long = "x".repeat(500);
        let sanitized = sanitize_for_log(&long);
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.contains("500 bytes total"));
    }
}

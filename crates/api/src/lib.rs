pub mod error;
pub mod jira;
pub mod models;
pub mod operation;
pub mod retry;

pub use error::{ApiError, Result};
pub use jira::JiraClient;
pub use jira_panel_auth::AppCredentials;
pub use operation::Operation;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response};
use retry::{retry_with_backoff, RetryConfig};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Versioned REST prefix every endpoint lives under.
const REST_PREFIX: [&str; 3] = ["rest", "api", "3"];

/// Credentials for a call attributed to an interactive user.
#[derive(Clone)]
pub enum UserAuth {
    Basic { email: String, api_token: String },
    Bearer { token: String },
}

impl fmt::Debug for UserAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserAuth::Basic { email, .. } => f
                .debug_struct("Basic")
                .field("email", email)
                .finish_non_exhaustive(),
            UserAuth::Bearer { .. } => f.debug_struct("Bearer").finish_non_exhaustive(),
        }
    }
}

/// Who a request is attributed to.
#[derive(Clone, Debug)]
pub enum Identity {
    /// Acting as the end user.
    User(UserAuth),
    /// Acting as the installed app; every request carries a freshly minted
    /// `JWT` assertion.
    App(AppCredentials),
}

impl Identity {
    pub fn basic(email: impl Into<String>, api_token: impl Into<String>) -> Self {
        Identity::User(UserAuth::Basic {
            email: email.into(),
            api_token: api_token.into(),
        })
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Identity::User(UserAuth::Bearer {
            token: token.into(),
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Identity::User(_) => "user",
            Identity::App(_) => "app",
        }
    }
}

/// HTTP transport bound to one Jira site and one identity.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    identity: Identity,
    timeout: Option<Duration>,
    read_retry: Option<RetryConfig>,
}

impl ApiClient {
    pub fn new(base_url: impl AsRef<str>, identity: Identity) -> Result<Self> {
        let mut url = Url::parse(base_url.as_ref())?;
        if url.cannot_be_a_base() {
            return Err(ApiError::invalid(format!(
                "{url} cannot be used as a site base URL"
            )));
        }
        url.set_query(None);
        url.set_fragment(None);

        let client = Client::builder()
            .user_agent(format!("jira-panel/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: url,
            identity,
            timeout: None,
            read_retry: None,
        })
    }

    /// Bound each request. Without this, requests wait as long as the
    /// connection stays open.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Retry the read-only operations with backoff.
    pub fn with_read_retries(mut self, config: RetryConfig) -> Self {
        self.read_retry = Some(config);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Build `{base}/rest/api/3/{segments..}`, encoding each segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::invalid("site base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(REST_PREFIX)
            .extend(segments);
        Ok(url)
    }

    /// Request without identity headers, for callers that authenticate
    /// themselves.
    pub(crate) fn raw_request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.client.request(method, url);
        match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }

    pub(crate) async fn send<B: Serialize + ?Sized>(
        &self,
        operation: &Operation,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Response> {
        debug!(
            op = operation.name(),
            identity = self.identity.label(),
            method = %method,
            url = %url,
            "Sending request"
        );

        let mut request = self.apply_auth(self.raw_request(method, url))?;
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        check_status(operation, response)
    }

    pub(crate) async fn send_empty(
        &self,
        operation: &Operation,
        method: Method,
        url: Url,
    ) -> Result<Response> {
        self.send(operation, method, url, Option::<&()>::None).await
    }

    /// GET `url` and return the array stored under `field`.
    pub(crate) async fn fetch_array(
        &self,
        operation: &Operation,
        url: Url,
        field: &str,
    ) -> Result<Vec<Value>> {
        let attempt = || async {
            let response = self
                .send_empty(operation, Method::GET, url.clone())
                .await?;
            extract_array(response, field).await
        };

        match &self.read_retry {
            Some(config) => retry_with_backoff(config, attempt).await,
            None => attempt().await,
        }
    }

    pub(crate) fn apply_auth(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        Ok(match &self.identity {
            Identity::User(UserAuth::Basic { email, api_token }) => {
                request.basic_auth(email, Some(api_token))
            }
            Identity::User(UserAuth::Bearer { token }) => request.bearer_auth(token),
            Identity::App(credentials) => {
                request.header(AUTHORIZATION, format!("JWT {}", credentials.mint()?))
            }
        })
    }
}

pub(crate) fn check_status(operation: &Operation, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        debug!(op = operation.name(), status = status.as_u16(), "Request succeeded");
        return Ok(response);
    }

    warn!(
        op = operation.name(),
        issue = operation.issue().map(models::IssueRef::as_str),
        status = status.as_u16(),
        "Request rejected"
    );
    Err(ApiError::OperationFailed {
        operation: operation.clone(),
        status: status.as_u16(),
    })
}

async fn extract_array(response: Response, field: &str) -> Result<Vec<Value>> {
    let mut body: Value = response
        .json()
        .await
        .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

    match body.get_mut(field).map(Value::take) {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ApiError::InvalidResponse(format!(
            "`{field}` in response is not an array"
        ))),
        None => Err(ApiError::InvalidResponse(format!(
            "response has no `{field}` field"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Identity::basic("dev@example.com", "token")).unwrap()
    }

    #[test]
    fn test_endpoint_joins_rest_prefix() {
        let url = client("https://acme.atlassian.net")
            .endpoint(&["issue", "ABC-1", "comment"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://acme.atlassian.net/rest/api/3/issue/ABC-1/comment"
        );
    }

    #[test]
    fn test_endpoint_keeps_context_path() {
        let url = client("https://jira.example.com/jira/")
            .endpoint(&["issue"])
            .unwrap();
        assert_eq!(url.as_str(), "https://jira.example.com/jira/rest/api/3/issue");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let url = client("https://acme.atlassian.net")
            .endpoint(&["attachment", "../issue/1"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://acme.atlassian.net/rest/api/3/attachment/..%2Fissue%2F1"
        );
    }

    #[test]
    fn test_base_url_query_dropped() {
        let client = client("https://acme.atlassian.net/?x=1#frag");
        assert!(client.base_url().query().is_none());
        assert!(client.base_url().fragment().is_none());
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(ApiClient::new("not a url", Identity::bearer("t")).is_err());
        assert!(ApiClient::new("mailto:dev@example.com", Identity::bearer("t")).is_err());
    }

    #[test]
    fn test_identity_debug_hides_secrets() {
        let rendered = format!("{:?}", Identity::basic("dev@example.com", "very-secret"));
        assert!(rendered.contains("dev@example.com"));
        assert!(!rendered.contains("very-secret"));
        assert_eq!(Identity::bearer("x").label(), "user");
    }
}

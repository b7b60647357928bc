//! POPSigner API client.
//!
//! The main entry point for the control plane API. [`Client`] owns the HTTP
//! transport; resource accessors (`keys()`, `orgs()`, `deployments()`, ...)
//! are cheap handles that share it.

use crate::deployments::DeploymentsClient;
use crate::error::{PopSignerError, Result};
use crate::keys::KeysClient;
use crate::namespaces::NamespacesClient;
use crate::orgs::OrgsClient;
use crate::sign::SignClient;
use reqwest::{header, Client as HttpClient, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.popsigner.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// POPSigner API client.
///
/// Configuration is fixed at construction. The client is cheap to clone and
/// safe to share across tasks.
///
/// # Example
///
/// ```rust,no_run
/// use popsigner_api::Client;
/// use popsigner_api::types::CreateKeyRequest;
/// use uuid::Uuid;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Client::new("psk_live_xxxxx")?;
///
///     let namespace_id = Uuid::parse_str("...")?;
///     let key = client.keys().create(CreateKeyRequest {
///         name: "sequencer".to_string(),
///         namespace_id,
///         ..Default::default()
///     }).await?;
///
///     let sig = client.sign().sign(key.id, b"transaction data", false).await?;
///     println!("signed with key version {}", sig.key_version);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    pub(crate) http: HttpClient,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Configuration options for the client.
///
/// Resolve these from flags, environment or config files before constructing
/// the client; the client never reads them itself.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Base URL for the API (default: https://api.popsigner.com).
    pub base_url: Option<String>,
    /// Request timeout (default: 30 seconds).
    pub timeout: Option<Duration>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
}

impl Client {
    /// Create a new client with default configuration.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use popsigner_api::Client;
    ///
    /// let client = Client::new("psk_live_xxxxx").unwrap();
    /// ```
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, ClientConfig::default())
    }

    /// Create a new client with custom configuration.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use popsigner_api::{Client, ClientConfig};
    /// use std::time::Duration;
    ///
    /// let client = Client::with_config("psk_live_xxxxx", ClientConfig {
    ///     base_url: Some("https://api.staging.popsigner.com".to_string()),
    ///     timeout: Some(Duration::from_secs(60)),
    ///     user_agent: Some("my-app/1.0".to_string()),
    /// }).unwrap();
    /// ```
    pub fn with_config(api_key: impl Into<String>, config: ClientConfig) -> Result<Self> {
        let timeout = config
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let user_agent = config
            .user_agent
            .unwrap_or_else(|| format!("popsigner-api-rust/{}", env!("CARGO_PKG_VERSION")));

        let http = HttpClient::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
        })
    }

    /// Get the base URL for the API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the keys client for key management operations.
    pub fn keys(&self) -> KeysClient {
        KeysClient::new(self.clone())
    }

    /// Get the sign client for single and batch signing.
    pub fn sign(&self) -> SignClient {
        SignClient::new(self.clone())
    }

    /// Get the orgs client for organization lookups.
    pub fn orgs(&self) -> OrgsClient {
        OrgsClient::new(self.clone())
    }

    /// Get the namespaces client. Namespaces are nested under an organization.
    pub fn namespaces(&self) -> NamespacesClient {
        NamespacesClient::new(self.clone())
    }

    /// Get the deployments client for chain deployments.
    pub fn deployments(&self) -> DeploymentsClient {
        DeploymentsClient::new(self.clone())
    }

    /// Make an authenticated GET request and decode the `data` envelope.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.execute(Method::GET, path, None, true).await?;
        decode_data(&body)
    }

    /// Make an authenticated POST request with a JSON body.
    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(body)?;
        let body = self.execute(Method::POST, path, Some(payload), true).await?;
        decode_data(&body)
    }

    /// Make an authenticated POST request without a request body.
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.execute(Method::POST, path, None, true).await?;
        decode_data(&body)
    }

    /// POST without a request body to an endpoint whose acknowledgement is
    /// optional. An empty 2xx body is a success with no payload.
    pub(crate) async fn post_ack<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let body = self.execute(Method::POST, path, None, true).await?;
        if body.is_empty() {
            return Ok(None);
        }
        decode_data(&body).map(Some)
    }

    /// Make an authenticated DELETE request. Any response body is ignored.
    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        self.execute(Method::DELETE, path, None, true).await?;
        Ok(())
    }

    /// Make an authenticated GET request and return the raw response body.
    pub(crate) async fn get_raw(&self, path: &str) -> Result<Vec<u8>> {
        self.execute(Method::GET, path, None, false).await
    }

    /// Perform exactly one HTTP exchange and return the body of a successful
    /// response. Failures are classified into [`PopSignerError`].
    ///
    /// `json` adds `Accept: application/json`; raw downloads leave it out.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        json: bool,
    ) -> Result<Vec<u8>> {
        let url = Url::parse(&format!("{}{}", self.base_url, path)).map_err(|e| {
            PopSignerError::InvalidRequest(format!("invalid request URL for {}: {}", path, e))
        })?;

        debug!(%method, path, "sending request");

        let mut request = self
            .http
            .request(method.clone(), url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key));
        if json {
            request = request.header(header::ACCEPT, "application/json");
        }
        if let Some(body) = body {
            request = request
                .header(header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        debug!(%method, path, status = status.as_u16(), "received response");

        if is_error_status(status) {
            return Err(parse_error(status, &bytes));
        }

        Ok(bytes.to_vec())
    }
}

/// Any status of 400 or above is an error, including non-standard codes.
fn is_error_status(status: StatusCode) -> bool {
    status.as_u16() >= 400
}

/// Decode a successful `{"data": ...}` envelope.
fn decode_data<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    if body.is_empty() {
        return Err(PopSignerError::Decode("empty response body".to_string()));
    }
    let wrapper: ApiResponse<T> = serde_json::from_slice(body)
        .map_err(|e| PopSignerError::Decode(format!("failed to parse response: {}", e)))?;
    Ok(wrapper.data)
}

/// Build an error from a non-2xx response. Never fails: bodies that are not a
/// valid error envelope become a synthetic error carrying the raw text.
fn parse_error(status: StatusCode, body: &[u8]) -> PopSignerError {
    let status_code = status.as_u16();

    match serde_json::from_slice::<ApiErrorResponse>(body) {
        Ok(e) => PopSignerError::Api {
            code: e.error.code.filter(|c| !c.is_empty()),
            message: e.error.message,
            status_code,
        },
        Err(err) => {
            warn!(status = status_code, error = %err, "error response is not a JSON envelope");
            PopSignerError::Api {
                code: None,
                message: format!(
                    "HTTP {}: {}",
                    status_code,
                    String::from_utf8_lossy(body).trim()
                ),
                status_code,
            }
        }
    }
}

/// Append a query string built from `query`. Fields that serialize to nothing
/// (skipped `None`s) do not appear at all.
pub(crate) fn with_query<Q: Serialize>(path: &str, query: &Q) -> Result<String> {
    let encoded = serde_urlencoded::to_string(query)
        .map_err(|e| PopSignerError::InvalidRequest(format!("invalid query parameters: {}", e)))?;
    if encoded.is_empty() {
        Ok(path.to_string())
    } else {
        Ok(format!("{}?{}", path, encoded))
    }
}

#[derive(Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub data: T,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

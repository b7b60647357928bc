//! Signing operations.
//!
//! This module provides the SignClient for signing data with keys held by
//! the control plane, one at a time or as a batch. A batch is a single round
//! trip; the server signs the items independently, so one item failing does
//! not affect the others. Batch results are keyed by key ID because the
//! server may return them in any order. When one key appears several times
//! in a batch, its results are matched to its requests in submission order.

use crate::client::Client;
use crate::error::{PopSignerError, Result};
use crate::ids::{parse_uuid, IntoUuid};
use crate::types::{default_key_version, SignRequest, SignResponse};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;

/// Client for signing operations.
///
/// Access via `client.sign()`.
#[derive(Debug, Clone)]
pub struct SignClient {
    client: Client,
}

impl SignClient {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Sign data with a key.
    ///
    /// # Arguments
    ///
    /// * `key_id` - The key ID to sign with
    /// * `data` - The data to sign
    /// * `prehashed` - If true, data is already a digest
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use popsigner_api::Client;
    /// use uuid::Uuid;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::new("psk_live_xxxxx")?;
    ///     let key_id = Uuid::parse_str("...")?;
    ///
    ///     let result = client.sign().sign(key_id, b"hello world", false).await?;
    ///     println!("Signature: {}", result.signature_hex());
    ///     println!("Public key: {}", result.public_key);
    ///     Ok(())
    /// }
    /// ```
    pub async fn sign(
        &self,
        key_id: impl IntoUuid,
        data: &[u8],
        prehashed: bool,
    ) -> Result<SignResponse> {
        #[derive(Serialize)]
        struct Request {
            data: String,
            prehashed: bool,
        }

        #[derive(Deserialize)]
        struct Response {
            signature: String,
            public_key: String,
            #[serde(default = "default_key_version")]
            key_version: u32,
        }

        let key_id = parse_uuid(key_id, "key")?;
        if data.is_empty() {
            return Err(PopSignerError::InvalidRequest(
                "data to sign must not be empty".to_string(),
            ));
        }

        let request = Request {
            data: BASE64.encode(data),
            prehashed,
        };

        let response: Response = self
            .client
            .post(&format!("/v1/keys/{}/sign", key_id), &request)
            .await?;

        let signature = BASE64
            .decode(&response.signature)
            .map_err(|e| PopSignerError::Decode(format!("invalid signature encoding: {}", e)))?;

        Ok(SignResponse {
            key_id,
            signature,
            public_key: response.public_key,
            key_version: response.key_version,
        })
    }

    /// Sign a request built with [`SignRequest`].
    pub async fn sign_request(&self, request: &SignRequest) -> Result<SignResponse> {
        self.sign(request.key_id, &request.data, request.prehashed)
            .await
    }

    /// Sign multiple messages in one call.
    ///
    /// The whole call fails only when the request as a whole is rejected or
    /// the transport fails. Individual items that fail are reported as
    /// [`BatchSignOutcome::Failed`] for their key.
    ///
    /// Every item must carry non-empty data. A key may appear more than once.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use popsigner_api::{Client, SignRequest};
    /// use uuid::Uuid;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::new("psk_live_xxxxx")?;
    ///     let worker1 = Uuid::parse_str("...")?;
    ///     let worker2 = Uuid::parse_str("...")?;
    ///
    ///     let results = client.sign().sign_batch(&[
    ///         SignRequest::new(worker1, b"tx1".to_vec()),
    ///         SignRequest::new(worker2, b"tx2".to_vec()),
    ///     ]).await?;
    ///
    ///     for (key_id, outcome) in results.iter() {
    ///         match outcome.error() {
    ///             Some(err) => println!("{}: failed: {}", key_id, err),
    ///             None => println!("{}: signed", key_id),
    ///         }
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub async fn sign_batch(&self, requests: &[SignRequest]) -> Result<BatchSignResults> {
        #[derive(Serialize)]
        struct ApiRequest {
            requests: Vec<ApiRequestItem>,
        }

        #[derive(Serialize)]
        struct ApiRequestItem {
            key_id: Uuid,
            data: String,
            prehashed: bool,
        }

        #[derive(Deserialize)]
        struct ApiResponse {
            signatures: Vec<BatchSignItemResult>,
        }

        validate_batch(requests)?;

        let api_request = ApiRequest {
            requests: requests
                .iter()
                .map(|r| ApiRequestItem {
                    key_id: r.key_id,
                    data: BASE64.encode(&r.data),
                    prehashed: r.prehashed,
                })
                .collect(),
        };

        let response: ApiResponse = self.client.post("/v1/sign/batch", &api_request).await?;

        Ok(BatchSignResults::correlate(
            requests.iter().map(|r| r.key_id).collect(),
            response.signatures,
        ))
    }
}

fn validate_batch(requests: &[SignRequest]) -> Result<()> {
    if requests.is_empty() {
        return Err(PopSignerError::InvalidRequest(
            "batch must contain at least one request".to_string(),
        ));
    }

    for (i, r) in requests.iter().enumerate() {
        if r.data.is_empty() {
            return Err(PopSignerError::InvalidRequest(format!(
                "request {}: data must not be empty",
                i
            )));
        }
    }
    Ok(())
}

/// One per-item result as reported by the server.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BatchSignItemResult {
    key_id: Uuid,
    #[serde(default)]
    signature: Option<String>,
    #[serde(default)]
    public_key: Option<String>,
    #[serde(default)]
    key_version: Option<u32>,
    #[serde(default)]
    error: Option<String>,
}

impl BatchSignItemResult {
    fn into_outcome(self) -> BatchSignOutcome {
        let error = self.error.filter(|e| !e.is_empty());
        let signature = self.signature.filter(|s| !s.is_empty());

        match (error, signature) {
            (Some(error), _) => BatchSignOutcome::Failed(error),
            (None, Some(signature)) => match BASE64.decode(&signature) {
                Ok(signature) => BatchSignOutcome::Signed(SignResponse {
                    key_id: self.key_id,
                    signature,
                    public_key: self.public_key.unwrap_or_default(),
                    key_version: self.key_version.unwrap_or_else(default_key_version),
                }),
                Err(e) => BatchSignOutcome::Failed(format!("invalid signature encoding: {}", e)),
            },
            (None, None) => BatchSignOutcome::Failed(
                "server returned neither a signature nor an error".to_string(),
            ),
        }
    }
}

/// Outcome of a single item in a batch sign call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchSignOutcome {
    /// The item was signed.
    Signed(SignResponse),
    /// The item failed; the message comes from the server.
    Failed(String),
}

impl BatchSignOutcome {
    /// Returns true if the item was signed.
    pub fn is_signed(&self) -> bool {
        matches!(self, BatchSignOutcome::Signed(_))
    }

    /// The signature, if the item succeeded.
    pub fn response(&self) -> Option<&SignResponse> {
        match self {
            BatchSignOutcome::Signed(r) => Some(r),
            BatchSignOutcome::Failed(_) => None,
        }
    }

    /// The error message, if the item failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            BatchSignOutcome::Signed(_) => None,
            BatchSignOutcome::Failed(e) => Some(e),
        }
    }

    /// Convert into a `Result` with the per-item error message.
    pub fn into_result(self) -> std::result::Result<SignResponse, String> {
        match self {
            BatchSignOutcome::Signed(r) => Ok(r),
            BatchSignOutcome::Failed(e) => Err(e),
        }
    }
}

/// Results of a batch sign call, keyed by key ID.
///
/// Iteration follows the order of the original requests, regardless of the
/// order the server answered in. A key used by several requests holds one
/// outcome per request, in request order.
#[derive(Debug, Clone)]
pub struct BatchSignResults {
    order: Vec<Uuid>,
    outcomes: HashMap<Uuid, Vec<BatchSignOutcome>>,
}

impl BatchSignResults {
    pub(crate) fn correlate(order: Vec<Uuid>, results: Vec<BatchSignItemResult>) -> Self {
        let mut expected: HashMap<Uuid, usize> = HashMap::with_capacity(order.len());
        for key_id in &order {
            *expected.entry(*key_id).or_default() += 1;
        }

        let mut outcomes: HashMap<Uuid, Vec<BatchSignOutcome>> =
            HashMap::with_capacity(expected.len());
        for result in results {
            let key_id = result.key_id;
            let Some(&limit) = expected.get(&key_id) else {
                warn!(%key_id, "batch sign response contains a key that was not requested");
                continue;
            };
            let slot = outcomes.entry(key_id).or_default();
            if slot.len() >= limit {
                warn!(%key_id, "batch sign response has more results than requests for a key");
                continue;
            }
            slot.push(result.into_outcome());
        }

        let results = Self { order, outcomes };
        let missing = results.missing();
        if !missing.is_empty() {
            warn!(
                missing = missing.len(),
                "batch sign response has no result for some requested keys"
            );
        }
        results
    }

    /// First outcome for a key, if the server reported one.
    pub fn get(&self, key_id: &Uuid) -> Option<&BatchSignOutcome> {
        self.outcomes.get(key_id).and_then(|o| o.first())
    }

    /// All outcomes for a key, in the order its requests were submitted.
    pub fn get_all(&self, key_id: &Uuid) -> &[BatchSignOutcome] {
        self.outcomes.get(key_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Pair every request with its outcome, `None` when nothing was reported.
    fn slots(&self) -> impl Iterator<Item = (&Uuid, Option<&BatchSignOutcome>)> {
        let mut used: HashMap<Uuid, usize> = HashMap::new();
        self.order.iter().map(move |id| {
            let n = used.entry(*id).or_default();
            let outcome = self.outcomes.get(id).and_then(|o| o.get(*n));
            *n += 1;
            (id, outcome)
        })
    }

    /// Iterate over reported outcomes in request order.
    pub fn iter(&self) -> impl Iterator<Item = (&Uuid, &BatchSignOutcome)> {
        self.slots()
            .filter_map(|(id, outcome)| outcome.map(|outcome| (id, outcome)))
    }

    /// Successful signatures in request order.
    pub fn succeeded(&self) -> impl Iterator<Item = &SignResponse> {
        self.iter().filter_map(|(_, outcome)| outcome.response())
    }

    /// Failed items in request order, with their error messages.
    pub fn failed(&self) -> impl Iterator<Item = (&Uuid, &str)> {
        self.iter()
            .filter_map(|(id, outcome)| outcome.error().map(|e| (id, e)))
    }

    /// Requests for which the server reported nothing, in request order.
    pub fn missing(&self) -> Vec<Uuid> {
        self.slots()
            .filter(|(_, outcome)| outcome.is_none())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Number of reported outcomes.
    pub fn len(&self) -> usize {
        self.outcomes.values().map(Vec::len).sum()
    }

    /// Returns true if the server reported no outcomes at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if every request was signed.
    pub fn all_succeeded(&self) -> bool {
        self.len() == self.order.len()
            && self.outcomes.values().flatten().all(BatchSignOutcome::is_signed)
    }

    /// Consume into the underlying map.
    pub fn into_map(self) -> HashMap<Uuid, Vec<BatchSignOutcome>> {
        self.outcomes
    }
}

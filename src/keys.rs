//! Key management operations.
//!
//! This module provides the KeysClient for creating, importing, exporting,
//! retrieving, listing and deleting keys.

use crate::client::{with_query, Client};
use crate::error::{PopSignerError, Result};
use crate::ids::{parse_uuid, IntoUuid};
use crate::types::{
    CreateBatchRequest, CreateKeyRequest, ExportKeyResponse, ImportKeyRequest, Key, KeyListFilter,
};
use serde::Deserialize;

/// Largest number of keys a single batch creation may request.
pub const MAX_BATCH_KEYS: u32 = 100;

/// Client for key management operations.
///
/// Access via `client.keys()`.
#[derive(Debug, Clone)]
pub struct KeysClient {
    client: Client,
}

impl KeysClient {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// List keys, optionally filtered by namespace and network.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use popsigner_api::{Client, types::KeyListFilter};
    /// use uuid::Uuid;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::new("psk_live_xxxxx")?;
    ///
    ///     let all_keys = client.keys().list(&KeyListFilter::default()).await?;
    ///     println!("Total keys: {}", all_keys.len());
    ///
    ///     let namespace_keys = client.keys().list(&KeyListFilter {
    ///         namespace_id: Some(Uuid::parse_str("...")?),
    ///         ..Default::default()
    ///     }).await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn list(&self, filter: &KeyListFilter) -> Result<Vec<Key>> {
        let path = with_query("/v1/keys", filter)?;
        self.client.get(&path).await
    }

    /// Get a key by ID.
    pub async fn get(&self, key_id: impl IntoUuid) -> Result<Key> {
        let key_id = parse_uuid(key_id, "key")?;
        self.client.get(&format!("/v1/keys/{}", key_id)).await
    }

    /// Create a new key.
    ///
    /// Optional fields left as `None` are not sent, so server defaults apply.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use popsigner_api::{Client, types::CreateKeyRequest};
    /// use uuid::Uuid;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::new("psk_live_xxxxx")?;
    ///     let key = client.keys().create(CreateKeyRequest {
    ///         name: "my-key".to_string(),
    ///         namespace_id: Uuid::parse_str("...")?,
    ///         algorithm: Some("secp256k1".to_string()),
    ///         ..Default::default()
    ///     }).await?;
    ///
    ///     println!("Created key: {} ({})", key.name, key.address);
    ///     Ok(())
    /// }
    /// ```
    pub async fn create(&self, request: CreateKeyRequest) -> Result<Key> {
        self.client.post("/v1/keys", &request).await
    }

    /// Create `count` keys named "prefix-1", "prefix-2", ... in one call.
    ///
    /// `count` must be between 1 and [`MAX_BATCH_KEYS`]; anything else is
    /// rejected locally.
    pub async fn create_batch(&self, request: CreateBatchRequest) -> Result<Vec<Key>> {
        #[derive(Deserialize)]
        struct Response {
            keys: Vec<Key>,
        }

        if request.count == 0 || request.count > MAX_BATCH_KEYS {
            return Err(PopSignerError::InvalidRequest(format!(
                "count must be between 1 and {}, got {}",
                MAX_BATCH_KEYS, request.count
            )));
        }

        let response: Response = self.client.post("/v1/keys/batch", &request).await?;
        Ok(response.keys)
    }

    /// Delete a key.
    ///
    /// **Warning:** This operation is irreversible.
    pub async fn delete(&self, key_id: impl IntoUuid) -> Result<()> {
        let key_id = parse_uuid(key_id, "key")?;
        self.client.delete(&format!("/v1/keys/{}", key_id)).await
    }

    /// Import an existing private key.
    pub async fn import(&self, request: ImportKeyRequest) -> Result<Key> {
        if request.private_key.is_empty() {
            return Err(PopSignerError::InvalidRequest(
                "private_key must not be empty".to_string(),
            ));
        }
        self.client.post("/v1/keys/import", &request).await
    }

    /// Export a key's private key material.
    ///
    /// Only works for keys created as exportable. The material is returned
    /// as-is; masking it for display is up to the caller.
    pub async fn export(&self, key_id: impl IntoUuid) -> Result<ExportKeyResponse> {
        let key_id = parse_uuid(key_id, "key")?;
        self.client
            .post_empty(&format!("/v1/keys/{}/export", key_id))
            .await
    }
}

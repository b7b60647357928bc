//! Namespace operations.
//!
//! Namespaces partition keys within an organization, so every call takes the
//! owning organization ID.

use crate::client::Client;
use crate::error::Result;
use crate::ids::{parse_uuid, IntoUuid};
use crate::types::{CreateNamespaceRequest, Namespace};
use uuid::Uuid;

/// Client for namespace operations.
///
/// Access via `client.namespaces()`.
#[derive(Debug, Clone)]
pub struct NamespacesClient {
    client: Client,
}

impl NamespacesClient {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    fn base_path(org_id: &Uuid) -> String {
        format!("/v1/organizations/{}/namespaces", org_id)
    }

    /// List all namespaces in an organization.
    pub async fn list(&self, org_id: impl IntoUuid) -> Result<Vec<Namespace>> {
        let org_id = parse_uuid(org_id, "organization")?;
        self.client.get(&Self::base_path(&org_id)).await
    }

    /// Get a namespace by ID.
    pub async fn get(&self, org_id: impl IntoUuid, namespace_id: impl IntoUuid) -> Result<Namespace> {
        let org_id = parse_uuid(org_id, "organization")?;
        let namespace_id = parse_uuid(namespace_id, "namespace")?;
        self.client
            .get(&format!("{}/{}", Self::base_path(&org_id), namespace_id))
            .await
    }

    /// Create a new namespace.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use popsigner_api::{Client, types::CreateNamespaceRequest};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::new("psk_live_xxxxx")?;
    ///     let org = client.orgs().resolve_default().await?;
    ///
    ///     let ns = client.namespaces().create(org.id, CreateNamespaceRequest {
    ///         name: "production".to_string(),
    ///         description: None,
    ///     }).await?;
    ///     println!("Created namespace: {} ({})", ns.name, ns.id);
    ///     Ok(())
    /// }
    /// ```
    pub async fn create(
        &self,
        org_id: impl IntoUuid,
        request: CreateNamespaceRequest,
    ) -> Result<Namespace> {
        let org_id = parse_uuid(org_id, "organization")?;
        self.client.post(&Self::base_path(&org_id), &request).await
    }

    /// Delete a namespace.
    ///
    /// **Warning:** The server deletes every key in the namespace as well.
    pub async fn delete(&self, org_id: impl IntoUuid, namespace_id: impl IntoUuid) -> Result<()> {
        let org_id = parse_uuid(org_id, "organization")?;
        let namespace_id = parse_uuid(namespace_id, "namespace")?;
        self.client
            .delete(&format!("{}/{}", Self::base_path(&org_id), namespace_id))
            .await
    }
}

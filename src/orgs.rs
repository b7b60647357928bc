//! Organization operations.
//!
//! This module provides the OrgsClient for listing and retrieving
//! organizations, and for picking a default organization when the caller did
//! not name one.

use crate::client::Client;
use crate::error::{PopSignerError, Result};
use crate::ids::{parse_uuid, IntoUuid};
use crate::types::Organization;
use tracing::warn;

/// Client for organization operations.
///
/// Access via `client.orgs()`.
#[derive(Debug, Clone)]
pub struct OrgsClient {
    client: Client,
}

impl OrgsClient {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// List all organizations the credential has access to.
    pub async fn list(&self) -> Result<Vec<Organization>> {
        self.client.get("/v1/organizations").await
    }

    /// Get an organization by ID.
    pub async fn get(&self, org_id: impl IntoUuid) -> Result<Organization> {
        let org_id = parse_uuid(org_id, "organization")?;
        self.client
            .get(&format!("/v1/organizations/{}", org_id))
            .await
    }

    /// Pick the organization to use when none was given explicitly.
    ///
    /// Returns the first organization in the listing. When several are
    /// visible the choice is arbitrary; a warning is logged so the caller can
    /// notice. Use [`OrgsClient::resolve_unique`] to refuse instead.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use popsigner_api::Client;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::new("psk_live_xxxxx")?;
    ///     let org = client.orgs().resolve_default().await?;
    ///     let namespaces = client.namespaces().list(org.id).await?;
    ///     println!("{} has {} namespaces", org.name, namespaces.len());
    ///     Ok(())
    /// }
    /// ```
    pub async fn resolve_default(&self) -> Result<Organization> {
        let mut orgs = self.list().await?;
        if orgs.is_empty() {
            return Err(PopSignerError::NoOrganizations);
        }
        if orgs.len() > 1 {
            warn!(
                count = orgs.len(),
                org_id = %orgs[0].id,
                "multiple organizations visible; defaulting to the first one"
            );
        }
        Ok(orgs.swap_remove(0))
    }

    /// Return the only organization visible to the credential.
    ///
    /// Fails with [`PopSignerError::AmbiguousOrganization`] if there is more
    /// than one.
    pub async fn resolve_unique(&self) -> Result<Organization> {
        let mut orgs = self.list().await?;
        match orgs.len() {
            0 => Err(PopSignerError::NoOrganizations),
            1 => Ok(orgs.remove(0)),
            count => Err(PopSignerError::AmbiguousOrganization { count }),
        }
    }
}

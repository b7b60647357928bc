//! Chain deployment operations.
//!
//! This module provides the DeploymentsClient for creating and starting
//! rollup deployments and for reading their artifacts, transactions and
//! status. Use [`DeploymentsClient::watch`] to follow a deployment until it
//! finishes.

use crate::client::{with_query, Client};
use crate::error::{PopSignerError, Result};
use crate::ids::path_segment;
use crate::types::{
    Artifact, ArtifactType, CreateDeploymentRequest, Deployment, DeploymentStatus,
    StartDeploymentResponse, Transaction,
};
use crate::watch::{DeploymentSource, DeploymentWatcher};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Client for deployment operations.
///
/// Access via `client.deployments()`.
#[derive(Debug, Clone)]
pub struct DeploymentsClient {
    client: Client,
}

fn deployment_path(id: &str) -> Result<String> {
    Ok(format!("/v1/deployments/{}", path_segment(id, "deployment ID")?))
}

impl DeploymentsClient {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a new deployment. It starts out `pending`.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use popsigner_api::{Client, types::{CreateDeploymentRequest, Stack}};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::new("psk_live_xxxxx")?;
    ///     let deployment = client.deployments().create(CreateDeploymentRequest {
    ///         chain_id: 42069,
    ///         stack: Stack::OpStack,
    ///         config: serde_json::json!({ "chain_name": "my-rollup" }),
    ///     }).await?;
    ///
    ///     client.deployments().start(&deployment.id).await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn create(&self, request: CreateDeploymentRequest) -> Result<Deployment> {
        self.client.post("/v1/deployments", &request).await
    }

    /// Get a deployment by ID.
    pub async fn get(&self, deployment_id: &str) -> Result<Deployment> {
        self.client.get(&deployment_path(deployment_id)?).await
    }

    /// List deployments, optionally only those in `status`.
    pub async fn list(&self, status: Option<&DeploymentStatus>) -> Result<Vec<Deployment>> {
        #[derive(Serialize)]
        struct Query<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            status: Option<&'a str>,
        }

        let path = with_query(
            "/v1/deployments",
            &Query {
                status: status.map(DeploymentStatus::as_str),
            },
        )?;
        self.client.get(&path).await
    }

    /// Start a pending or paused deployment. The work runs server-side;
    /// poll with [`DeploymentsClient::watch`] to follow it.
    ///
    /// Returns `None` when the server accepts the start without an
    /// acknowledgement body.
    pub async fn start(&self, deployment_id: &str) -> Result<Option<StartDeploymentResponse>> {
        let path = format!("{}/start", deployment_path(deployment_id)?);
        self.client.post_ack(&path).await
    }

    /// Start a deployment after checking that it is `pending` or `paused`.
    pub async fn resume(&self, deployment_id: &str) -> Result<Option<StartDeploymentResponse>> {
        let deployment = self.get(deployment_id).await?;
        if !deployment.status.is_resumable() {
            return Err(PopSignerError::InvalidRequest(format!(
                "cannot resume deployment with status '{}' (must be pending or paused)",
                deployment.status
            )));
        }
        self.start(deployment_id).await
    }

    /// List the artifacts produced so far.
    pub async fn artifacts(&self, deployment_id: &str) -> Result<Vec<Artifact>> {
        #[derive(Deserialize)]
        struct Response {
            artifacts: Vec<Artifact>,
        }

        let path = format!("{}/artifacts", deployment_path(deployment_id)?);
        let response: Response = self.client.get(&path).await?;
        Ok(response.artifacts)
    }

    /// Get a single artifact by type.
    pub async fn artifact(
        &self,
        deployment_id: &str,
        artifact_type: &ArtifactType,
    ) -> Result<Artifact> {
        let path = format!(
            "{}/artifacts/{}",
            deployment_path(deployment_id)?,
            path_segment(artifact_type.as_str(), "artifact type")?
        );
        self.client.get(&path).await
    }

    /// List the on-chain transactions submitted by a deployment.
    pub async fn transactions(&self, deployment_id: &str) -> Result<Vec<Transaction>> {
        let path = format!("{}/transactions", deployment_path(deployment_id)?);
        self.client.get(&path).await
    }

    /// Download all artifacts as a `.tar.gz` bundle.
    pub async fn bundle(&self, deployment_id: &str) -> Result<Vec<u8>> {
        let path = format!("{}/bundle", deployment_path(deployment_id)?);
        self.client.get_raw(&path).await
    }

    /// Watch a deployment's status.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use popsigner_api::Client;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::new("psk_live_xxxxx")?;
    ///     let mut watcher = client.deployments().watch("3f1c2a9e-...");
    ///
    ///     while let Some(snapshot) = watcher.next().await {
    ///         let deployment = snapshot?;
    ///         println!("{}: {}", deployment.id, deployment.status);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub fn watch(&self, deployment_id: impl Into<String>) -> DeploymentWatcher {
        DeploymentWatcher::new(Arc::new(self.clone()), deployment_id)
    }
}

#[async_trait]
impl DeploymentSource for DeploymentsClient {
    async fn fetch_deployment(&self, deployment_id: &str) -> Result<Deployment> {
        self.get(deployment_id).await
    }
}

//! Type definitions for the POPSigner API.
//!
//! Request types serialize only the fields that were explicitly set so the
//! server's defaults are never overridden by empty values. Response types are
//! read-only projections of server state.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

pub(crate) fn default_key_version() -> u32 {
    1
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// A cryptographic key held by the control plane.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Key {
    /// Unique key identifier.
    pub id: Uuid,
    /// Namespace the key belongs to.
    pub namespace_id: Uuid,
    /// Human-readable key name.
    pub name: String,
    /// Base64-encoded public key.
    pub public_key: String,
    /// Bech32-encoded address.
    pub address: String,
    /// Key algorithm (e.g., "secp256k1").
    pub algorithm: String,
    /// Whether the key can be exported.
    pub exportable: bool,
    /// Optional metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
    /// Key version, starting at 1.
    #[serde(default = "default_key_version")]
    pub version: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Filters for listing keys. Unset filters are left out of the query string.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KeyListFilter {
    /// Only keys in this namespace.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<Uuid>,
    /// Only keys for this network (e.g., "celestia").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

/// Request to create a key.
#[derive(Debug, Clone, Serialize, Default)]
pub struct CreateKeyRequest {
    /// Key name (must be unique within namespace).
    pub name: String,
    /// Namespace ID for the key.
    pub namespace_id: Uuid,
    /// Key algorithm (server default: "secp256k1").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// Whether the key can be exported (server default: false).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exportable: Option<bool>,
    /// Optional metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
    /// Network the key's address is derived for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_type: Option<String>,
}

/// Request to create multiple keys at once.
#[derive(Debug, Clone, Serialize)]
pub struct CreateBatchRequest {
    /// Prefix for key names ("blob-worker" creates "blob-worker-1", "blob-worker-2", ...).
    pub prefix: String,
    /// Number of keys to create, 1 to 100.
    pub count: u32,
    /// Namespace ID for all keys.
    pub namespace_id: Uuid,
    /// Whether keys can be exported (server default: false).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exportable: Option<bool>,
}

/// Request to import an existing private key.
#[derive(Debug, Clone, Serialize)]
pub struct ImportKeyRequest {
    /// Key name (must be unique within namespace).
    pub name: String,
    /// Namespace ID for the key.
    pub namespace_id: Uuid,
    /// Base64-encoded private key.
    pub private_key: String,
    /// Whether the key can be exported again later.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exportable: Option<bool>,
}

/// Exported private key material.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportKeyResponse {
    /// Base64-encoded private key.
    pub private_key: String,
    /// Warning shown by the server about handling exported material.
    #[serde(default)]
    pub warning: String,
}

// ---------------------------------------------------------------------------
// Organizations and namespaces
// ---------------------------------------------------------------------------

/// An organization.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Organization {
    /// Organization ID.
    pub id: Uuid,
    /// Organization name.
    pub name: String,
    /// Billing plan.
    pub plan: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A namespace within an organization.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Namespace {
    /// Namespace ID.
    pub id: Uuid,
    /// Organization ID.
    pub org_id: Uuid,
    /// Namespace name.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Request to create a namespace.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateNamespaceRequest {
    /// Namespace name.
    pub name: String,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Signing
// ---------------------------------------------------------------------------

/// A single sign request. Data is base64-encoded on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignRequest {
    /// Key ID to sign with.
    pub key_id: Uuid,
    /// Raw data to sign.
    pub data: Vec<u8>,
    /// Whether the data is already hashed.
    pub prehashed: bool,
}

impl SignRequest {
    /// Sign raw data; the server hashes it.
    pub fn new(key_id: Uuid, data: impl Into<Vec<u8>>) -> Self {
        Self {
            key_id,
            data: data.into(),
            prehashed: false,
        }
    }

    /// Sign a digest computed by the caller.
    pub fn prehashed(key_id: Uuid, digest: impl Into<Vec<u8>>) -> Self {
        Self {
            key_id,
            data: digest.into(),
            prehashed: true,
        }
    }

    /// Hash `data` locally with SHA-256 and sign the digest.
    pub fn sha256(key_id: Uuid, data: &[u8]) -> Self {
        Self::prehashed(key_id, Sha256::digest(data).to_vec())
    }
}

/// Response from a sign operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignResponse {
    /// Key ID that was used for signing.
    pub key_id: Uuid,
    /// Raw signature bytes.
    pub signature: Vec<u8>,
    /// Base64-encoded public key.
    pub public_key: String,
    /// Version of the key that produced the signature.
    pub key_version: u32,
}

impl SignResponse {
    /// Signature as standard base64, the encoding used on the wire.
    pub fn signature_base64(&self) -> String {
        BASE64.encode(&self.signature)
    }

    /// Signature as lowercase hex.
    pub fn signature_hex(&self) -> String {
        hex::encode(&self.signature)
    }
}

// ---------------------------------------------------------------------------
// Deployments
// ---------------------------------------------------------------------------

/// Rollup stack a deployment targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Stack {
    /// OP Stack rollup.
    #[serde(rename = "opstack")]
    OpStack,
    /// Arbitrum Nitro rollup.
    #[serde(rename = "nitro")]
    Nitro,
}

impl Stack {
    /// Wire name of the stack.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stack::OpStack => "opstack",
            Stack::Nitro => "nitro",
        }
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a deployment.
///
/// `Completed` and `Failed` are terminal. Statuses this client does not know
/// decode as `Unknown` and are treated as non-terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum DeploymentStatus {
    /// Created, not yet started.
    Pending,
    /// Deployment in progress.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
    /// Suspended by the server; can be resumed.
    Paused,
    /// A status this client version does not recognize.
    Unknown(String),
}

impl DeploymentStatus {
    /// Wire name of the status.
    pub fn as_str(&self) -> &str {
        match self {
            DeploymentStatus::Pending => "pending",
            DeploymentStatus::Running => "running",
            DeploymentStatus::Completed => "completed",
            DeploymentStatus::Failed => "failed",
            DeploymentStatus::Paused => "paused",
            DeploymentStatus::Unknown(s) => s,
        }
    }

    /// Returns true once the deployment can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeploymentStatus::Completed | DeploymentStatus::Failed)
    }

    /// Returns true if the deployment can be (re)started.
    pub fn is_resumable(&self) -> bool {
        matches!(self, DeploymentStatus::Pending | DeploymentStatus::Paused)
    }
}

impl From<String> for DeploymentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => DeploymentStatus::Pending,
            "running" => DeploymentStatus::Running,
            "completed" => DeploymentStatus::Completed,
            "failed" => DeploymentStatus::Failed,
            "paused" => DeploymentStatus::Paused,
            _ => DeploymentStatus::Unknown(s),
        }
    }
}

impl From<DeploymentStatus> for String {
    fn from(status: DeploymentStatus) -> Self {
        match status {
            DeploymentStatus::Unknown(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chain deployment.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Deployment {
    /// Deployment ID (opaque).
    pub id: String,
    /// Chain ID of the rollup being deployed.
    pub chain_id: u64,
    /// Rollup stack.
    pub stack: Stack,
    /// Current lifecycle state.
    pub status: DeploymentStatus,
    /// Stage currently executing, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stage: Option<String>,
    /// Failure reason, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Request to create a deployment.
#[derive(Debug, Clone, Serialize)]
pub struct CreateDeploymentRequest {
    /// Chain ID of the rollup.
    pub chain_id: u64,
    /// Rollup stack.
    pub stack: Stack,
    /// Stack-specific deployment configuration.
    pub config: serde_json::Value,
}

/// Acknowledgement returned when a deployment is started.
#[derive(Debug, Clone, Deserialize)]
pub struct StartDeploymentResponse {
    /// Always "started" on success.
    pub status: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

/// Kind of deployment artifact. The set is open; new kinds decode as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum ArtifactType {
    Genesis,
    RollupConfig,
    State,
    ChainInfo,
    NodeConfig,
    CoreContracts,
    Other(String),
}

impl ArtifactType {
    /// Wire name of the artifact type.
    pub fn as_str(&self) -> &str {
        match self {
            ArtifactType::Genesis => "genesis",
            ArtifactType::RollupConfig => "rollup_config",
            ArtifactType::State => "state",
            ArtifactType::ChainInfo => "chain_info",
            ArtifactType::NodeConfig => "node_config",
            ArtifactType::CoreContracts => "core_contracts",
            ArtifactType::Other(s) => s,
        }
    }

    /// Conventional file name for the artifact when written to disk.
    pub fn file_name(&self) -> String {
        match self {
            ArtifactType::Genesis => "genesis.json".to_string(),
            ArtifactType::RollupConfig => "rollup.json".to_string(),
            ArtifactType::State => "state.json".to_string(),
            ArtifactType::ChainInfo => "chain-info.json".to_string(),
            ArtifactType::NodeConfig => "node-config.json".to_string(),
            ArtifactType::CoreContracts => "core-contracts.json".to_string(),
            ArtifactType::Other(s) => format!("{}.json", s),
        }
    }
}

impl From<String> for ArtifactType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "genesis" => ArtifactType::Genesis,
            "rollup_config" => ArtifactType::RollupConfig,
            "state" => ArtifactType::State,
            "chain_info" => ArtifactType::ChainInfo,
            "node_config" => ArtifactType::NodeConfig,
            "core_contracts" => ArtifactType::CoreContracts,
            _ => ArtifactType::Other(s),
        }
    }
}

impl From<&str> for ArtifactType {
    fn from(s: &str) -> Self {
        ArtifactType::from(s.to_string())
    }
}

impl From<ArtifactType> for String {
    fn from(t: ArtifactType) -> Self {
        match t {
            ArtifactType::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document produced by a deployment. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Artifact {
    /// Artifact kind.
    #[serde(rename = "type", alias = "artifact_type")]
    pub artifact_type: ArtifactType,
    /// Artifact document.
    pub content: serde_json::Value,
    /// When the artifact was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// An on-chain transaction submitted as part of a deployment.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Transaction {
    /// Transaction record ID.
    #[serde(default)]
    pub id: String,
    /// Deployment the transaction belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<String>,
    /// Deployment stage that submitted the transaction.
    #[serde(default)]
    pub stage: String,
    /// Transaction hash.
    pub tx_hash: String,
    /// What the transaction did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Name of the contract deployed or called.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_name: Option<String>,
    /// Address of the contract deployed or called.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    /// Submission timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_key_request_serialization() {
        let req = CreateKeyRequest {
            name: "test-key".to_string(),
            namespace_id: Uuid::nil(),
            algorithm: None,
            exportable: Some(true),
            metadata: None,
            network_type: None,
        };

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["name"], "test-key");
        assert_eq!(json["exportable"], true);
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("algorithm"));
        assert!(!obj.contains_key("metadata"));
        assert!(!obj.contains_key("network_type"));
    }

    #[test]
    fn test_key_deserialization() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000001",
            "name": "my-key",
            "namespace_id": "00000000-0000-0000-0000-000000000002",
            "public_key": "base64pubkey",
            "address": "celestia1...",
            "algorithm": "secp256k1",
            "exportable": false,
            "version": 3,
            "created_at": "2025-01-01T00:00:00Z"
        }"#;

        let key: Key = serde_json::from_str(json).unwrap();
        assert_eq!(key.name, "my-key");
        assert_eq!(key.algorithm, "secp256k1");
        assert_eq!(key.version, 3);
        assert!(key.metadata.is_none());
        assert!(!key.exportable);
    }

    #[test]
    fn test_key_version_defaults_to_one() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000001",
            "name": "my-key",
            "namespace_id": "00000000-0000-0000-0000-000000000002",
            "public_key": "pk",
            "address": "celestia1...",
            "algorithm": "secp256k1",
            "exportable": true,
            "created_at": "2025-01-01T00:00:00Z"
        }"#;
        let key: Key = serde_json::from_str(json).unwrap();
        assert_eq!(key.version, 1);
    }

    #[test]
    fn test_namespace_request_omits_description() {
        let req = CreateNamespaceRequest {
            name: "production".to_string(),
            description: None,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({ "name": "production" })
        );
    }

    #[test]
    fn test_deployment_status_wire_names() {
        let status: DeploymentStatus = serde_json::from_str("\"paused\"").unwrap();
        assert_eq!(status, DeploymentStatus::Paused);
        assert!(status.is_resumable());
        assert!(!status.is_terminal());

        let status: DeploymentStatus = serde_json::from_str("\"rolling_back\"").unwrap();
        assert_eq!(status, DeploymentStatus::Unknown("rolling_back".to_string()));
        assert!(!status.is_terminal());
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"rolling_back\"");

        assert!(DeploymentStatus::Completed.is_terminal());
        assert!(DeploymentStatus::Failed.is_terminal());
        assert!(!DeploymentStatus::Running.is_resumable());
    }

    #[test]
    fn test_deployment_deserialization() {
        let json = r#"{
            "id": "3f1c2a9e-0000-0000-0000-000000000001",
            "chain_id": 42069,
            "stack": "opstack",
            "status": "running",
            "current_stage": "deploy_contracts",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:05:00Z"
        }"#;
        let d: Deployment = serde_json::from_str(json).unwrap();
        assert_eq!(d.stack, Stack::OpStack);
        assert_eq!(d.status, DeploymentStatus::Running);
        assert_eq!(d.current_stage.as_deref(), Some("deploy_contracts"));
        assert!(d.error.is_none());
    }

    #[test]
    fn test_artifact_type_file_names() {
        assert_eq!(ArtifactType::RollupConfig.file_name(), "rollup.json");
        assert_eq!(ArtifactType::ChainInfo.file_name(), "chain-info.json");
        assert_eq!(ArtifactType::from("custom").file_name(), "custom.json");
    }

    #[test]
    fn test_artifact_deserialization() {
        let json = r#"{"type": "genesis", "content": {"config": {"chainId": 42069}}}"#;
        let a: Artifact = serde_json::from_str(json).unwrap();
        assert_eq!(a.artifact_type, ArtifactType::Genesis);
        assert_eq!(a.content["config"]["chainId"], 42069);
    }

    #[test]
    fn test_sign_request_sha256() {
        let req = SignRequest::sha256(Uuid::nil(), b"hello");
        assert!(req.prehashed);
        assert_eq!(req.data.len(), 32);
        assert_eq!(
            hex::encode(&req.data),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_sign_response_encodings() {
        let resp = SignResponse {
            key_id: Uuid::nil(),
            signature: vec![0xde, 0xad, 0xbe, 0xef],
            public_key: "pk".to_string(),
            key_version: 1,
        };
        assert_eq!(resp.signature_hex(), "deadbeef");
        assert_eq!(resp.signature_base64(), "3q2+7w==");
    }

    #[test]
    fn test_create_deployment_request_serialization() {
        let req = CreateDeploymentRequest {
            chain_id: 42069,
            stack: Stack::Nitro,
            config: serde_json::json!({ "chain_name": "my-rollup" }),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({
                "chain_id": 42069,
                "stack": "nitro",
                "config": { "chain_name": "my-rollup" }
            })
        );
    }
}

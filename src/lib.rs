//! # POPSigner API client
//!
//! Rust client for the POPSigner control plane: key management, signing and
//! rollup chain deployments over HTTPS+JSON.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use popsigner_api::{Client, types::CreateKeyRequest};
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a client with your API key
//!     let client = Client::new("psk_live_xxxxx")?;
//!
//!     // Create a key
//!     let namespace_id = Uuid::parse_str("...")?;
//!     let key = client.keys().create(CreateKeyRequest {
//!         name: "my-sequencer".to_string(),
//!         namespace_id,
//!         ..Default::default()
//!     }).await?;
//!
//!     println!("Created key: {} ({})", key.name, key.address);
//!
//!     // Sign data
//!     let result = client.sign().sign(key.id, b"transaction data", false).await?;
//!     println!("Signature: {} bytes", result.signature.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Batch Signing
//!
//! A batch is one round trip. Each item succeeds or fails on its own, and
//! results are keyed by key ID:
//!
//! ```rust,no_run
//! use popsigner_api::{Client, SignRequest, types::CreateBatchRequest};
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("psk_live_xxxxx")?;
//!     let namespace_id = Uuid::parse_str("...")?;
//!
//!     let keys = client.keys().create_batch(CreateBatchRequest {
//!         prefix: "blob-worker".to_string(),
//!         count: 4,
//!         namespace_id,
//!         exportable: None,
//!     }).await?;
//!
//!     let requests: Vec<SignRequest> = keys
//!         .iter()
//!         .enumerate()
//!         .map(|(i, key)| SignRequest::new(key.id, format!("tx-{}", i).into_bytes()))
//!         .collect();
//!
//!     let results = client.sign().sign_batch(&requests).await?;
//!     for (key_id, err) in results.failed() {
//!         eprintln!("{} failed: {}", key_id, err);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Watching a Deployment
//!
//! ```rust,no_run
//! use popsigner_api::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("psk_live_xxxxx")?;
//!     let last = client
//!         .deployments()
//!         .watch("3f1c2a9e-...")
//!         .wait_for_terminal(|d| println!("{} {}", d.status, d.current_stage.as_deref().unwrap_or("")))
//!         .await?;
//!     println!("final: {:?}", last.map(|d| d.status));
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, PopSignerError>`:
//!
//! ```rust,no_run
//! use popsigner_api::{Client, types::KeyListFilter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Client::new("psk_live_xxxxx").unwrap();
//!
//!     match client.keys().list(&KeyListFilter::default()).await {
//!         Ok(keys) => println!("Found {} keys", keys.len()),
//!         Err(e) if e.is_unauthorized() => println!("Invalid API key"),
//!         Err(e) => println!("Error: {}", e),
//!     }
//! }
//! ```

pub mod client;
pub mod deployments;
pub mod error;
pub mod ids;
pub mod keys;
pub mod namespaces;
pub mod orgs;
pub mod sign;
pub mod types;
pub mod watch;

// Re-export main types at the crate root
pub use client::{Client, ClientConfig};
pub use error::{PopSignerError, Result};
pub use ids::IntoUuid;
pub use sign::{BatchSignOutcome, BatchSignResults};
pub use watch::{DeploymentSource, DeploymentWatcher, Sleeper, TokioSleeper};

pub use types::{
    Artifact, ArtifactType, CreateBatchRequest, CreateDeploymentRequest, CreateKeyRequest,
    CreateNamespaceRequest, Deployment, DeploymentStatus, ExportKeyResponse, ImportKeyRequest,
    Key, KeyListFilter, Namespace, Organization, SignRequest, SignResponse, Stack,
    StartDeploymentResponse, Transaction,
};

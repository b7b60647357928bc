//! Basic usage example for the POPSigner API client.
//!
//! This example demonstrates:
//! - Creating a client
//! - Resolving the default organization and listing its namespaces
//! - Creating a key
//! - Signing data
//!
//! Run with:
//! ```bash
//! POPSIGNER_API_KEY=psk_live_xxx NAMESPACE_ID=... cargo run --example basic
//! ```

use popsigner_api::{Client, CreateKeyRequest, KeyListFilter};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api_key = std::env::var("POPSIGNER_API_KEY")
        .map_err(|_| "POPSIGNER_API_KEY environment variable required")?;
    let namespace_id: Uuid = std::env::var("NAMESPACE_ID")
        .map_err(|_| "NAMESPACE_ID environment variable required")?
        .parse()?;

    println!("Creating POPSigner client...");
    let client = Client::new(api_key)?;

    let org = client.orgs().resolve_default().await?;
    println!("Organization: {} ({}, plan {})", org.name, org.id, org.plan);
    for ns in client.namespaces().list(org.id).await? {
        println!("  namespace {} ({})", ns.name, ns.id);
    }

    println!("\nCreating a new key...");
    let key = client
        .keys()
        .create(CreateKeyRequest {
            name: format!("example-key-{}", &Uuid::new_v4().to_string()[..8]),
            namespace_id,
            algorithm: Some("secp256k1".to_string()),
            exportable: Some(false),
            ..Default::default()
        })
        .await?;

    println!("Created key:");
    println!("  ID:        {}", key.id);
    println!("  Name:      {}", key.name);
    println!("  Address:   {}", key.address);
    println!("  Algorithm: {}", key.algorithm);

    println!("\nSigning data...");
    let sign_result = client.sign().sign(key.id, b"Hello, Celestia!", false).await?;

    println!("Signature:");
    println!("  Bytes:       {} bytes", sign_result.signature.len());
    println!("  Hex:         {}", sign_result.signature_hex());
    println!("  Public Key:  {}", sign_result.public_key);
    println!("  Key version: {}", sign_result.key_version);

    println!("\nListing all keys in namespace...");
    let keys = client
        .keys()
        .list(&KeyListFilter {
            namespace_id: Some(namespace_id),
            ..Default::default()
        })
        .await?;
    println!("Found {} keys:", keys.len());
    for k in &keys {
        println!("  - {} ({})", k.name, k.address);
    }

    println!("\nCleaning up - deleting test key...");
    client.keys().delete(key.id).await?;
    println!("Key deleted successfully.");

    println!("\nDone!");
    Ok(())
}

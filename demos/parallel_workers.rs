//! Parallel workers example for the POPSigner API client.
//!
//! This example demonstrates Celestia's parallel blob submission pattern:
//! - Creating multiple worker keys in a batch
//! - Signing one transaction per worker in a single round trip
//! - Reading per-key results, including partial failures
//!
//! Run with:
//! ```bash
//! POPSIGNER_API_KEY=psk_live_xxx NAMESPACE_ID=... cargo run --example parallel_workers
//! ```

use popsigner_api::{BatchSignOutcome, Client, CreateBatchRequest, SignRequest};
use std::time::Instant;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api_key = std::env::var("POPSIGNER_API_KEY")
        .map_err(|_| "POPSIGNER_API_KEY environment variable required")?;
    let namespace_id: Uuid = std::env::var("NAMESPACE_ID")
        .map_err(|_| "NAMESPACE_ID environment variable required")?
        .parse()?;

    let client = Client::new(api_key)?;

    println!("Creating worker keys...");
    let start = Instant::now();

    let keys = client
        .keys()
        .create_batch(CreateBatchRequest {
            prefix: format!("blob-worker-{}", &Uuid::new_v4().to_string()[..8]),
            count: 4,
            namespace_id,
            exportable: None,
        })
        .await?;

    println!("Created {} worker keys in {:?}:", keys.len(), start.elapsed());
    for key in &keys {
        println!("  - {}: {}", key.name, key.address);
    }

    let requests: Vec<SignRequest> = keys
        .iter()
        .enumerate()
        .map(|(i, key)| {
            SignRequest::new(key.id, format!("blob-tx-{}: data for worker", i + 1).into_bytes())
        })
        .collect();

    println!("\nSigning transactions in batch...");
    let start = Instant::now();
    let results = client.sign().sign_batch(&requests).await?;
    println!("Batch signing completed in {:?}", start.elapsed());

    println!("\nResults:");
    for (key_id, outcome) in results.iter() {
        match outcome {
            BatchSignOutcome::Signed(resp) => {
                let hex = resp.signature_hex();
                println!(
                    "  - {}: sig={}... ({} bytes)",
                    key_id,
                    &hex[..hex.len().min(16)],
                    resp.signature.len()
                );
            }
            BatchSignOutcome::Failed(err) => println!("  - {}: FAILED {}", key_id, err),
        }
    }
    for key_id in results.missing() {
        println!("  - {}: no result returned", key_id);
    }

    println!("\nCleaning up worker keys...");
    for key in &keys {
        client.keys().delete(key.id).await?;
    }
    println!("Cleanup complete.");

    Ok(())
}

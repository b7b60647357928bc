//! Follow a chain deployment until it finishes.
//!
//! Press Ctrl-C to stop watching; the deployment keeps running server-side.
//!
//! Run with:
//! ```bash
//! POPSIGNER_API_KEY=psk_live_xxx DEPLOYMENT_ID=... cargo run --example watch_deployment
//! ```

use popsigner_api::{Client, DeploymentStatus};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api_key = std::env::var("POPSIGNER_API_KEY")
        .map_err(|_| "POPSIGNER_API_KEY environment variable required")?;
    let deployment_id = std::env::var("DEPLOYMENT_ID")
        .map_err(|_| "DEPLOYMENT_ID environment variable required")?;

    let client = Client::new(api_key)?;
    let deployments = client.deployments();

    let watcher = deployments.watch(deployment_id.clone());
    let cancel = watcher.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let last = watcher
        .wait_for_terminal(|d| {
            println!(
                "[{}] {} {}",
                d.updated_at.format("%H:%M:%S"),
                d.status,
                d.current_stage.as_deref().unwrap_or("-")
            );
        })
        .await?;

    let Some(deployment) = last else {
        println!("Stopped before the first status update.");
        return Ok(());
    };

    match deployment.status {
        DeploymentStatus::Completed => {
            println!("\nArtifacts:");
            for artifact in deployments.artifacts(&deployment_id).await? {
                println!("  - {}", artifact.artifact_type.file_name());
            }
            println!("\nTransactions:");
            for tx in deployments.transactions(&deployment_id).await? {
                println!(
                    "  - {} {} {}",
                    tx.stage,
                    tx.contract_name.as_deref().unwrap_or("-"),
                    tx.tx_hash
                );
            }
        }
        DeploymentStatus::Failed => {
            println!(
                "\nDeployment failed: {}",
                deployment.error.as_deref().unwrap_or("unknown error")
            );
        }
        other => println!("\nStopped watching while {}.", other),
    }

    Ok(())
}

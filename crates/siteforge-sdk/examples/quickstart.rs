//! Quick Start Example
//!
//! Runs one build against a local node and prints the project's charges.
//! Start the node with `SITEFORGE_API_TOKENS=demo=demo-token siteforge-node`.

use siteforge_sdk::prelude::*;

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let client = SiteforgeClient::connect("http://localhost:3000", "demo-token").await?;

    match client.build("p1", "Bakery site").await? {
        BuildResponse::Succeeded {
            post_version_id,
            charged_ledger_id,
            ..
        } => {
            println!("✅ Saved {} and charged {}", post_version_id, charged_ledger_id);
        }
        BuildResponse::ChargeWarning {
            warning,
            post_version_id,
            ..
        } => {
            println!("⚠️  {} (version {})", warning, post_version_id);
        }
    }

    let charges = client.charges("p1").await?;
    println!("💳 Project {} has been charged {} credits", charges.project_id, charges.total_charged);

    Ok(())
}

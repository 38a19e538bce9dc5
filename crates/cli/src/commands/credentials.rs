use crate::gateway::Gateway;

/// Prints `null` when no login has been saved yet.
pub async fn execute(gateway: &Gateway) -> eyre::Result<()> {
    let credentials = gateway.last_credentials().await?;
    println!("{}", serde_json::to_string_pretty(&credentials)?);
    Ok(())
}

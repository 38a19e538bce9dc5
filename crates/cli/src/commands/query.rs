use crate::gateway::Gateway;
use crawlgate_config::Workload;
use serde_json::{json, Value};

pub async fn execute(
    gateway: &Gateway,
    profile: Workload,
    action: &str,
    params: Option<Value>,
    page_size: usize,
    all: bool,
) -> eyre::Result<()> {
    let result = gateway
        .run_bulk_query(profile, action, params.unwrap_or(Value::Null), page_size)
        .await?;
    println!("{}", serde_json::to_string(&result)?);

    if all {
        let mut page = result.page;
        while page.has_next() {
            page = gateway.get_page(&result.token, page.page + 1, page_size)?;
            println!("{}", serde_json::to_string(&json!({ "token": result.token, "page": page }))?);
        }
        gateway.release(&result.token);
    }

    tracing::info!(token = %result.token, "query complete");
    Ok(())
}

use crate::gateway::Gateway;
use crawlgate_bridge::{BridgeOutcome, BridgeRequest, DecodeMode};
use crawlgate_config::Workload;
use serde_json::Value;

pub async fn execute(
    gateway: &Gateway,
    profile: Workload,
    action: &str,
    params: Option<Value>,
    skip_banner: bool,
) -> eyre::Result<()> {
    let request = BridgeRequest::new(action, params.unwrap_or(Value::Null))?;
    let decode_mode = if skip_banner {
        DecodeMode::SkipBanner
    } else {
        DecodeMode::Plain
    };

    match gateway.invoke(profile, &request, decode_mode).await {
        BridgeOutcome::Success(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        BridgeOutcome::Failure(failure) => {
            println!("{}", serde_json::to_string_pretty(&failure)?);
            Err(eyre::eyre!("{profile} worker call failed ({})", failure.kind))
        }
    }
}

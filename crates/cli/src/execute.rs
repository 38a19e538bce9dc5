use crate::commands::{credentials, invoke, login, query, Commands};
use crate::gateway::Gateway;
use std::time::Duration;

impl Commands {
    pub async fn execute(self, gateway: &Gateway) -> eyre::Result<()> {
        match self {
            Commands::Invoke {
                profile,
                action,
                params,
                skip_banner,
            } => invoke::execute(gateway, profile, &action, params, skip_banner).await,
            Commands::Query {
                profile,
                action,
                params,
                page_size,
                all,
            } => query::execute(gateway, profile, &action, params, page_size, all).await,
            Commands::Login {
                interval,
                give_up,
                qr_out,
            } => {
                login::execute(
                    gateway,
                    Duration::from_secs(interval),
                    Duration::from_secs(give_up),
                    &qr_out,
                )
                .await
            }
            Commands::Credentials => credentials::execute(gateway).await,
        }
    }
}

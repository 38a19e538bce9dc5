use clap::Parser;
use crawlgate::{Cli, Gateway};
use crawlgate_config::GatewayConfig;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = crawlgate_utils::init_tracing() {
        eprintln!("failed to initialize logging: {e}");
    }

    let cli = Cli::parse();
    let config = GatewayConfig::from_env()?;

    let gateway = Gateway::new(config);
    gateway.start_background_tasks();
    let result = cli.command.execute(&gateway).await;
    gateway.stop_background_tasks();
    result
}

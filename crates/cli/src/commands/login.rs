use crate::gateway::Gateway;
use crawlgate_login::LoginStatus;
use crawlgate_utils::write_atomic;
use eyre::WrapErr;
use std::path::Path;
use std::time::Duration;

pub async fn execute(gateway: &Gateway, interval: Duration, give_up: Duration, qr_out: &Path) -> eyre::Result<()> {
    let (challenge, session) = gateway.begin_login().await?;

    write_atomic(qr_out, &challenge.image_png()?)
        .await
        .wrap_err("writing the QR code image")?;
    eprintln!("Scan the QR code in {} to log in", qr_out.display());
    eprintln!("Waiting for confirmation (giving up after {}s)...", give_up.as_secs());

    let session = gateway.await_login(session, interval, give_up).await;
    println!("{}", serde_json::to_string_pretty(&session)?);

    match session.status() {
        LoginStatus::Succeeded => Ok(()),
        status => {
            let reason = session
                .failure()
                .map_or_else(|| status.to_string(), |failure| failure.message.clone());
            Err(eyre::eyre!("login {status}: {reason}"))
        }
    }
}

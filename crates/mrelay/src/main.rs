use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use mrelay_core::{
    config::Config,
    relay::{Relay, RelaySettings},
};
use mrelay_openai::OpenAiClient;
use mrelay_telegram::TelegramMessenger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mrelay_core::logging::init("mrelay")?;

    let cfg = Config::load()?;

    let messenger = Arc::new(TelegramMessenger::from_config(&cfg)?);
    let model = Arc::new(OpenAiClient::from_config(&cfg)?);

    let mut relay = Relay::bootstrap(RelaySettings::from(&cfg), messenger, model)
        .await
        .context("could not fetch bot identity")?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("shutdown requested");
                    cancel.cancel();
                }
                Err(e) => error!(error = %e, "failed to listen for ctrl-c"),
            }
        });
    }

    relay.run(cancel).await;
    Ok(())
}

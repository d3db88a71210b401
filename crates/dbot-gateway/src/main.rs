//! Gateway client entry point
//!
//! Connects with the token from `DISCORD_TOKEN` and logs every event until
//! Ctrl-C.
//!
//! Run with:
//! ```bash
//! DISCORD_TOKEN=... cargo run -p dbot-gateway
//! ```

use anyhow::Context;
use dbot_common::{try_init_tracing_with_config, BotConfig, TracingConfig};
use dbot_gateway::{GatewayClient, GatewayEvent};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() {
    let config = BotConfig::from_env();

    let tracing_config = config.as_ref().map_or_else(
        |_| TracingConfig::default(),
        |c| TracingConfig::for_environment(c.app.env),
    );
    if let Err(e) = try_init_tracing_with_config(&tracing_config) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    let result = match config {
        Ok(config) => run(config).await,
        Err(e) => Err(anyhow::Error::new(e).context("Failed to load configuration")),
    };

    if let Err(e) = result {
        error!(error = %format!("{e:#}"), "Gateway client failed");
        std::process::exit(1);
    }
}

async fn run(config: BotConfig) -> anyhow::Result<()> {
    info!(
        app = %config.app.name,
        env = ?config.app.env,
        api = %config.api.base_url,
        "Starting gateway client"
    );

    let client = GatewayClient::new(&config).context("Failed to create gateway client")?;
    let mut events = client.subscribe();
    client.login(config.require_token()?).context("Login rejected")?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => log_event(&event),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event subscriber lagged"),
                Err(RecvError::Closed) => break,
            },
            _ = &mut shutdown => {
                info!("Received Ctrl-C, shutting down");
                client.shutdown();
                break;
            }
        }
    }

    client.join().await;
    info!("Gateway client stopped");
    Ok(())
}

fn log_event(event: &GatewayEvent) {
    match event {
        GatewayEvent::Connect => info!("Connected"),
        GatewayEvent::Disconnect(code) => info!(code, "Disconnected"),
        GatewayEvent::Packet(packet) => debug!(
            event = packet.t.as_deref().unwrap_or("-"),
            seq = ?packet.s,
            "Packet"
        ),
        GatewayEvent::Warn(warning) => warn!(%warning, "Gateway warning"),
        GatewayEvent::Error(err) => error!(error = %err, "Gateway error"),
    }
}

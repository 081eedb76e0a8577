//! Blackjack-LAN dealer entry point.
//!
//! ```text
//! main()
//!  └─ load_config()          -- first CLI argument overrides the platform path
//!  └─ SessionListener::bind  -- TCP port advertised in every Offer
//!  └─ start services
//!       ├─ OfferPublisher    (UDP broadcast task)
//!       └─ SessionListener   (accept task, one task per player)
//! ```

use std::path::PathBuf;

use anyhow::Context;
use blackjack_core::OfferMessage;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use blackjack_server::infrastructure::network::discovery::OfferPublisher;
use blackjack_server::infrastructure::network::session_listener::SessionListener;
use blackjack_server::infrastructure::storage::config::load_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = load_config(config_path.as_deref()).context("loading server config")?;

    // Level comes from the config file unless `RUST_LOG` is set.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    info!("Blackjack-LAN dealer {} starting", config.server.name);

    let listener = SessionListener::bind(config.bind_addr()?)
        .await
        .context("binding session listener")?;
    let local = listener.local_addr()?;
    let target = config.broadcast_target()?;
    println!("Server started, listening on {local}, sending offers to {target}");

    let offer = OfferMessage {
        tcp_port: local.port(),
        server_name: config.server.name.clone(),
    };
    let publisher = OfferPublisher::bind(
        &offer,
        target,
        config.offer_interval(),
    )
    .await?;

    let cancel = CancellationToken::new();

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received");
                cancel_on_signal.cancel();
            }
            Err(e) => error!("failed to listen for Ctrl-C: {e}"),
        }
    });

    let publisher_task = tokio::spawn(publisher.run(cancel.clone()));
    let listener_task = tokio::spawn(listener.run(cancel.clone()));

    info!("dealer ready on TCP port {}.  Press Ctrl-C to exit.", local.port());

    let (publisher_result, listener_result) = tokio::join!(publisher_task, listener_task);
    publisher_result.context("offer publisher task panicked")?;
    listener_result.context("session listener task panicked")?;

    info!("Blackjack-LAN dealer stopped");
    Ok(())
}

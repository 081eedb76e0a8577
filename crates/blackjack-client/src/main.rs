//! Blackjack-LAN player entry point.
//!
//! ```text
//! main()
//!  └─ load_config()               -- first CLI argument overrides the platform path
//!  └─ loop until stdin closes
//!       ├─ OfferListener          -- wait for the first Offer
//!       ├─ StreamDealerLink       -- TCP connect
//!       ├─ ask_rounds()           -- console prompt
//!       └─ TableController::play  -- one session
//! ```

use std::path::PathBuf;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use blackjack_client::application::play_table::{Operator, TableController};
use blackjack_client::infrastructure::console::ConsoleOperator;
use blackjack_client::infrastructure::network::dealer_link::StreamDealerLink;
use blackjack_client::infrastructure::network::discovery::OfferListener;
use blackjack_client::infrastructure::storage::config::load_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = load_config(config_path.as_deref()).context("loading client config")?;

    // Level comes from the config file unless `RUST_LOG` is set.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.client.log_level)),
        )
        .init();

    info!("Blackjack-LAN player {} starting", config.client.team_name);

    let mut operator = ConsoleOperator::stdin();

    loop {
        println!("Client started, listening for offer requests...");
        // A fresh socket per session so stale Offers are not replayed.
        let server = OfferListener::bind(config.discovery.udp_port)?
            .next_offer()
            .await?;
        println!(
            "Received offer from {} (Server: {})",
            server.address.ip(),
            server.name
        );

        let mut link = match StreamDealerLink::connect(server.address).await {
            Ok(link) => link,
            Err(e) => {
                warn!("could not connect to {}: {e}", server.address);
                continue;
            }
        };
        let Some(rounds) = operator.ask_rounds().await else {
            break;
        };

        let team_name = config.client.team_name.as_str();
        let table = TableController::new(&mut link, &mut operator, team_name);
        if let Err(e) = table.play(rounds).await {
            warn!("session with {} ended early: {e}", server.name);
            println!("Lost connection to the dealer");
        }
    }

    info!("Blackjack-LAN player stopped");
    Ok(())
}

//! Box office terminal front end
//!
//! Reads one command per line from stdin, sends it through the store and
//! redraws the current screen. Logs go to stderr.

use anyhow::Context;
use box_office::command::{self, Command, HELP};
use box_office::config::{Config, DEFAULT_LOG_FILTER};
use box_office::view::AppView;
use box_office::{AppEnvironment, AppReducer, AppState, Catalog, CheckoutEnvironment};
use marquee_core::environment::SystemClock;
use marquee_runtime::Store;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(3);
const INTERIM_REDRAW_AFTER: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::load(path).with_context(|| format!("loading catalog from {}", path.display()))?,
        None => Catalog::demo().context("loading built-in catalog")?,
    };
    info!(
        events = catalog.len(),
        seed = ?config.seed,
        payment_delay_ms = config.payment_delay_ms,
        "Box office starting"
    );

    let env = AppEnvironment::new(
        config.seed_source(),
        CheckoutEnvironment::new(Arc::new(SystemClock), config.payment_delay()),
    );
    let store = Store::new(AppState::new(catalog), AppReducer::new(), env);

    println!("{}", store.state(|s| AppView(s).to_string()).await);
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let action = match command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => {
                println!("{HELP}");
                continue;
            },
            Ok(Command::Show) => None,
            Ok(Command::Close) => store.state(AppState::close_action).await,
            Ok(Command::Dispatch(action)) => Some(action),
            Err(error) => {
                println!("{error}");
                continue;
            },
        };

        if let Some(action) = action {
            let mut handle = store.send(action).await?;
            if handle.wait_with_timeout(INTERIM_REDRAW_AFTER).await.is_err() {
                // Show the in-between screen (payment processing) while the rest runs
                println!("{}", store.state(|s| AppView(s).to_string()).await);
                handle.wait().await;
            }
        }
        println!("{}", store.state(|s| AppView(s).to_string()).await);
    }

    if let Err(error) = store.shutdown(SHUTDOWN_TIMEOUT).await {
        warn!(%error, "Effects still running at exit");
    }
    info!("Box office closed");
    Ok(())
}

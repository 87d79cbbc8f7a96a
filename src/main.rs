mod cli;

use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use clap::Parser;
use sqlx::migrate::Migrator;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dispatch_core::config::Config;
use dispatch_core::domain::TransactionCategory;
use dispatch_core::services::{LogNotifier, Notifier, WebhookNotifier};
use dispatch_core::store::{MemoryStore, PgStore, RecordStore};
use dispatch_core::{create_app, AppState};

use cli::{Cli, Commands, WalletCommands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let config_info = Config::from_env()?;
    let config = config_info.config;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if !config_info.overrides.is_empty() {
        tracing::info!(overrides = ?config_info.overrides, "environment overrides applied");
    }

    let store: Arc<dyn RecordStore> = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url).await?;
            let migrator = Migrator::new(Path::new("./migrations")).await?;
            migrator.run(store.pool()).await?;
            tracing::info!("database migrations completed");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let notifier: Arc<dyn Notifier> = match &config.notify_webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url.clone())),
        None => Arc::new(LogNotifier),
    };

    let state = AppState::build(store, notifier, &config);

    match args.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let app = create_app(state);
            let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
            tracing::info!("listening on {}", addr);
            axum::Server::bind(&addr)
                .serve(app.into_make_service())
                .await?;
        }
        Commands::Config => {
            println!("{:#?}", config);
        }
        Commands::Wallet(cmd) => match cmd {
            WalletCommands::Show { user_id } => {
                let wallet = state.ledger.get_or_create_wallet(user_id).await?;
                println!("{}", serde_json::to_string_pretty(&wallet)?);
            }
            WalletCommands::Credit { user_id, amount } => {
                let amount = BigDecimal::from_str(&amount)
                    .map_err(|_| anyhow::anyhow!("invalid amount: {}", amount))?;
                let (wallet, transaction) = state
                    .ledger
                    .credit(user_id, &amount, TransactionCategory::Topup, None)
                    .await?;
                println!("credited {} -> balance {}", transaction.amount, wallet.balance);
            }
        },
    }

    Ok(())
}

use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "dispatch-core")]
#[command(about = "Dispatch Core - ride matching and settlement service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Print the effective configuration and exit
    Config,

    /// Wallet management commands
    #[command(subcommand)]
    Wallet(WalletCommands),
}

#[derive(Subcommand)]
pub enum WalletCommands {
    /// Show a user's wallet
    Show {
        #[arg(value_name = "USER_ID")]
        user_id: Uuid,
    },

    /// Credit a user's wallet
    Credit {
        #[arg(value_name = "USER_ID")]
        user_id: Uuid,

        /// Amount to add, in rupees
        #[arg(value_name = "AMOUNT")]
        amount: String,
    },
}

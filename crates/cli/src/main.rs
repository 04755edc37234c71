//! Sparklab CLI - migrations, local cart and wishlist, and sync.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! sl-cli migrate storefront
//!
//! # Fill the local cart while signed out
//! sl-cli cart add --id p-1 --name "Crystal Growing Kit" --price 24.00 -q 2
//! sl-cli wishlist toggle --id p-2 --name "Solar Robot Kit" --price 31.50
//! sl-cli cart show --currency USD
//!
//! # Sign in, merge with the account's saved cart and wishlist, push
//! sl-cli sync --email ada@sparklab.store --password '...'
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `cart` - Edit the local cart
//! - `wishlist` - Edit the local wishlist
//! - `sync` - Sign in and reconcile with the storefront

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use secrecy::SecretString;

use sparklab_client::{CartStore, ClientConfig, WishlistStore};

mod commands;

use commands::local::{CartAction, WishlistAction};

#[derive(Parser)]
#[command(name = "sl-cli")]
#[command(author, version, about = "Sparklab CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Edit the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Edit the local wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Sign in and reconcile the local stores with the storefront
    Sync {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "SPARKLAB_PASSWORD", hide_env_values = true)]
        password: String,

        /// Sign out afterwards (clears the local stores)
        #[arg(long)]
        logout: bool,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Run storefront database migrations
    Storefront,
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sl_cli=info,sparklab_client=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Storefront => commands::migrate::storefront().await?,
        },
        Commands::Cart { action } => {
            let config = ClientConfig::from_env()?;
            let store = CartStore::load(commands::local::open_storage(&config.data_dir)?);
            print(&commands::local::cart(&store, action));
        }
        Commands::Wishlist { action } => {
            let config = ClientConfig::from_env()?;
            let store = WishlistStore::load(commands::local::open_storage(&config.data_dir)?);
            print(&commands::local::wishlist(&store, action));
        }
        Commands::Sync {
            email,
            password,
            logout,
        } => {
            let password = SecretString::from(password);
            for line in commands::sync::run(&email, &password, logout).await? {
                print(&line);
            }
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print(text: &str) {
    println!("{text}");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cart_add() {
        let cli = Cli::try_parse_from([
            "sl-cli", "cart", "add", "--id", "p-1", "--name", "Crystals", "--price", "24.00", "-q",
            "2",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Cart {
                action: CartAction::Add { .. }
            }
        ));
    }

    #[test]
    fn test_quantity_parses_through_from_str() {
        let cli = Cli::try_parse_from(["sl-cli", "cart", "update", "p-1", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Cart {
                action: CartAction::Update { quantity, .. }
            } if quantity.get() == 3
        ));

        for bad in ["0", "-1", "three"] {
            assert!(Cli::try_parse_from(["sl-cli", "cart", "update", "p-1", bad]).is_err());
        }
    }

    #[test]
    fn test_show_takes_a_currency() {
        let cli = Cli::try_parse_from(["sl-cli", "wishlist", "show", "--currency", "usd"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Wishlist {
                action: WishlistAction::Show { display }
            } if display.currency == sparklab_core::CurrencyCode::USD
        ));

        assert!(Cli::try_parse_from(["sl-cli", "cart", "show", "--currency", "XYZ"]).is_err());
    }
}

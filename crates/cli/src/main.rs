//! `FreshCart` CLI - browse the catalog and manage the cart from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show bakery products
//! freshcart products --category bakery
//!
//! # Add product 3 and show the cart
//! freshcart add 3
//!
//! # Set a quantity (zero or less removes the line)
//! freshcart update 3 0
//!
//! # Place the order
//! freshcart checkout
//! ```
//!
//! Every command except `session` syncs the cart and loads the catalog
//! first. Fragments go to stdout, logs to stderr. The exit status is 1 when
//! the requested action failed.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use freshcart_core::{CategoryFilter, ProductId};
use freshcart_storefront::StorefrontConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "freshcart")]
#[command(author, version, about = "FreshCart storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// `all`, `produce`, `bakery`, or `dairy`
        #[arg(short, long, default_value = "all")]
        category: CategoryFilter,
    },
    /// Show the cart
    Cart,
    /// Add one unit of a product
    Add { product_id: ProductId },
    /// Increase a cart line by one
    Inc { product_id: ProductId },
    /// Decrease a cart line by one
    Dec { product_id: ProductId },
    /// Set a cart line's quantity
    Update {
        product_id: ProductId,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a cart line
    Remove { product_id: ProductId },
    /// Place an order for the cart
    Checkout,
    /// Print the session identifier
    Session,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Initialize tracing with `EnvFilter` and Sentry integration.
///
/// Logs go to stderr so stdout carries only rendered output.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "freshcart_storefront=info,freshcart=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    match run(cli, &config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> commands::CommandResult {
    use commands::cart::CartAction;

    match cli.command {
        Commands::Products { category } => commands::catalog::products(config, category).await,
        Commands::Cart => commands::cart::show(config).await,
        Commands::Add { product_id } => {
            commands::cart::apply(config, CartAction::Add(product_id)).await
        }
        Commands::Inc { product_id } => {
            commands::cart::apply(config, CartAction::Increment(product_id)).await
        }
        Commands::Dec { product_id } => {
            commands::cart::apply(config, CartAction::Decrement(product_id)).await
        }
        Commands::Update {
            product_id,
            quantity,
        } => commands::cart::apply(config, CartAction::Update(product_id, quantity)).await,
        Commands::Remove { product_id } => {
            commands::cart::apply(config, CartAction::Remove(product_id)).await
        }
        Commands::Checkout => commands::cart::checkout(config).await,
        Commands::Session => commands::session::show(config),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_negative_quantity() {
        let cli =
            Cli::try_parse_from(["freshcart", "update", "3", "-1"]).map_err(|e| e.to_string());
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Update { quantity: -1, .. })
        ));
    }

    #[test]
    fn test_parse_category_filter() {
        let cli = Cli::try_parse_from(["freshcart", "products", "--category", "dairy"])
            .map_err(|e| e.to_string());
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Products {
                category: CategoryFilter::Only(freshcart_core::Category::Dairy)
            })
        ));
        assert!(Cli::try_parse_from(["freshcart", "products", "--category", "snacks"]).is_err());
    }
}

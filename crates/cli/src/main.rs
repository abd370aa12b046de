//! RocketShoes CLI - Cart operations and a local catalog server.
//!
//! # Usage
//!
//! ```bash
//! # Serve products and stock from a json-server style db.json
//! rs-cart serve --catalog db.json
//!
//! # Add one unit of product 1, then set it to 3
//! rs-cart add 1
//! rs-cart update 1 3
//!
//! # Show the cart
//! rs-cart show
//!
//! # Drop product 1, or the whole stored cart
//! rs-cart remove 1
//! rs-cart clear
//! ```
//!
//! # Commands
//!
//! - `show` - Print the persisted cart
//! - `add` / `remove` / `update` - Stock-checked cart operations
//! - `clear` - Delete the stored cart, even if it is corrupt
//! - `serve` - Run the catalog server

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rocketshoes_core::ProductId;
use rocketshoes_storefront::config::CartConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "rs-cart")]
#[command(author, version, about = "RocketShoes cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a product's line
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set the quantity of a product already in the cart
    Update {
        /// Product ID
        product_id: ProductId,

        /// New quantity; values below 1 are ignored
        #[arg(allow_hyphen_values = true)]
        amount: i64,
    },
    /// Delete the stored cart
    Clear,
    /// Run the local catalog server
    Serve {
        /// Path to the catalog `db.json`
        #[arg(short, long, default_value = "db.json")]
        catalog: PathBuf,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CartConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
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
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocketshoes_storefront=info,rocketshoes_cli=info".into());

    let config = match CartConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt().with_env_filter(env_filter).init();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &CartConfig) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Show => commands::cart::show(config)?,
        Commands::Add { product_id } => commands::cart::add(config, product_id).await?,
        Commands::Remove { product_id } => commands::cart::remove(config, product_id).await?,
        Commands::Update { product_id, amount } => {
            commands::cart::update(config, product_id, amount).await?;
        }
        Commands::Clear => commands::cart::clear(config)?,
        Commands::Serve { catalog } => commands::serve::catalog(config, &catalog).await?,
    }
    Ok(())
}

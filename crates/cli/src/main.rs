//! Classic Carry CLI - cart, wishlist and catalog from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Add a product to the cart in a specific variant
//! cc-cli cart add 65af3c --color Black --size M
//!
//! # Show the cart with live pricing settings
//! cc-cli cart show
//!
//! # Toggle a product on the wishlist
//! cc-cli wishlist toggle 65af3c
//!
//! # Check whether the commerce API is reachable
//! cc-cli health
//! ```
//!
//! # Commands
//!
//! - `cart` - Inspect and modify the persisted cart
//! - `wishlist` - Inspect and modify the wishlist
//! - `settings sync` - Fetch pricing settings from the API
//! - `products` - Browse the catalog
//! - `health` - Probe the commerce API

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use classic_carry_core::VariantSelection;
use classic_carry_storefront::config::StorefrontConfig;
use classic_carry_storefront::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "cc-cli")]
#[command(author, version, about = "Classic Carry storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Shop settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Browse products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Check that the commerce API is reachable
    Health {
        /// Keep probing and report every change until interrupted
        #[arg(short, long)]
        watch: bool,
    },
}

/// Color and size selection shared by cart commands.
#[derive(clap::Args, Debug, Clone, Default)]
struct VariantArgs {
    /// Selected color
    #[arg(short, long)]
    color: Option<String>,

    /// Selected size
    #[arg(short, long)]
    size: Option<String>,
}

impl VariantArgs {
    fn selection(&self) -> VariantSelection {
        VariantSelection::new(self.color.as_deref(), self.size.as_deref())
    }
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and totals
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        id: String,
        #[command(flatten)]
        variant: VariantArgs,
    },
    /// Remove the line for a product in one variant
    Remove {
        /// Product ID
        id: String,
        #[command(flatten)]
        variant: VariantArgs,
    },
    /// Remove a product in every variant
    RemoveProduct {
        /// Product ID
        id: String,
    },
    /// Set the quantity of a line (0 removes it)
    SetQty {
        /// Product ID
        id: String,
        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: f64,
        #[command(flatten)]
        variant: VariantArgs,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// List saved products
    List,
    /// Save a product
    Add {
        /// Product ID
        id: String,
    },
    /// Remove a saved product
    Remove {
        /// Product ID
        id: String,
    },
    /// Save the product, or remove it if already saved
    Toggle {
        /// Product ID
        id: String,
    },
    /// Remove every saved product
    Clear,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Fetch general settings and show the pricing they produce
    Sync,
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products
    List {
        /// Category slug
        #[arg(short, long)]
        category: Option<String>,

        /// Search text
        #[arg(short = 'q', long)]
        search: Option<String>,

        /// Maximum number of products
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Show one product
    Show {
        /// Product ID
        id: String,
    },
    /// List hot products
    Hot,
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
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configuration is needed before tracing so Sentry can be initialized first
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "classic_carry_storefront=info,cc_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::open(config)?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&state).await,
            CartAction::Add { id, variant } => {
                commands::cart::add(&state, &id, variant.selection()).await?;
            }
            CartAction::Remove { id, variant } => {
                commands::cart::remove(&state, &id, variant.selection()).await?;
            }
            CartAction::RemoveProduct { id } => {
                commands::cart::remove_product(&state, &id).await?;
            }
            CartAction::SetQty {
                id,
                quantity,
                variant,
            } => {
                commands::cart::set_quantity(&state, &id, quantity, variant.selection()).await?;
            }
            CartAction::Clear => commands::cart::clear(&state),
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::List => commands::wishlist::list(&state),
            WishlistAction::Add { id } => commands::wishlist::add(&state, &id).await?,
            WishlistAction::Remove { id } => commands::wishlist::remove(&state, &id)?,
            WishlistAction::Toggle { id } => commands::wishlist::toggle(&state, &id).await?,
            WishlistAction::Clear => commands::wishlist::clear(&state)?,
        },
        Commands::Settings { action } => match action {
            SettingsAction::Sync => commands::settings::sync(&state).await?,
        },
        Commands::Products { action } => match action {
            ProductsAction::List {
                category,
                search,
                limit,
            } => commands::products::list(&state, category, search, limit).await?,
            ProductsAction::Show { id } => commands::products::show(&state, &id).await?,
            ProductsAction::Hot => commands::products::hot(&state).await?,
        },
        Commands::Health { watch } => {
            if watch {
                commands::health::watch(&state).await?;
            } else {
                commands::health::check(&state).await?;
            }
        }
    }
    Ok(())
}

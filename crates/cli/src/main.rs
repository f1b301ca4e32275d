//! Shopline CLI - storefront client for the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! shop products list --search mug
//! shop products hot
//!
//! # Cart
//! shop cart add 12 --quantity 2
//! shop cart show
//!
//! # Checkout
//! shop checkout --name "Lin Mei" --phone 0912345678 --address "1 Main St"
//!
//! # Orders
//! shop orders lookup --phone 0912345678
//! shop orders show
//!
//! # Admin
//! shop admin dashboard
//! shop admin order-status 7 shipped
//! ```
//!
//! Configuration comes from the environment (see
//! `shopline_storefront::config`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use shopline_core::{OrderId, OrderStatus, ProductId};
use shopline_storefront::config::StorefrontConfig;
use shopline_storefront::error::AppError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod context;
mod console;

use context::Context;

#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about = "Shopline storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for the cart
    Checkout {
        /// Recipient name
        #[arg(short, long)]
        name: String,

        /// Contact phone number
        #[arg(short, long)]
        phone: String,

        /// Delivery address
        #[arg(short, long)]
        address: String,

        /// Email for order updates
        #[arg(short, long, default_value = "")]
        email: String,

        /// Delivery notes
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Look up placed orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Store administration
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List active products
    List {
        /// Name search keyword
        #[arg(short, long)]
        search: Option<String>,

        /// Category name (repeat to match any of several)
        #[arg(short, long)]
        category: Vec<String>,
    },
    /// Show one product with live stock
    Show { id: ProductId },
    /// List category names
    Categories,
    /// Show products that are about to sell out
    Hot,
    /// Suggest product names for a partial keyword
    ///
    /// Without a keyword, reads keywords from stdin one per line and
    /// answers the last of each quick burst.
    Suggest { keyword: Option<String> },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a product to the cart
    Add {
        id: ProductId,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a product's quantity (0 removes it)
    Set {
        id: ProductId,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product from the cart
    Remove { id: ProductId },
    /// Empty the cart
    Clear,
    /// Show the cart with live prices and stock
    Show,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// Find orders by contact details
    Lookup {
        #[arg(short, long, default_value = "")]
        email: String,

        #[arg(short, long, default_value = "")]
        phone: String,
    },
    /// Show an order (defaults to the last one placed here)
    Show { id: Option<String> },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Show dashboard statistics
    Dashboard,
    /// List products, including delisted ones
    Products {
        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        search: Option<String>,

        /// Only listed (true) or delisted (false) products
        #[arg(long)]
        active: Option<bool>,
    },
    /// Create a product
    CreateProduct {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        category: String,

        #[arg(short, long)]
        price: Decimal,

        #[arg(short, long, default_value_t = 0)]
        stock: u32,

        #[arg(short, long)]
        description: Option<String>,

        /// Create delisted
        #[arg(long)]
        inactive: bool,
    },
    /// Delete a product
    DeleteProduct { id: ProductId },
    /// List or delist a product
    Toggle { id: ProductId },
    /// Set a product's stock level
    Stock { id: ProductId, stock: u32 },
    /// List orders
    Orders {
        #[arg(long)]
        status: Option<OrderStatus>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,
    },
    /// Move an order to a new status
    OrderStatus { id: OrderId, status: OrderStatus },
    /// Cancel an order and restore its stock
    Cancel { id: OrderId },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
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

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopline_storefront=info,shopline_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = StorefrontConfig::from_env();

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);
    init_tracing();

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(AppError::from(e)),
    };

    if let Err(e) = result {
        e.report();
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), AppError> {
    let ctx = Context::new(config)?;

    match cli.command {
        Commands::Products { action } => match action {
            ProductsAction::List { search, category } => {
                commands::products::list(&ctx, search, category).await?;
            }
            ProductsAction::Show { id } => commands::products::show(&ctx, id).await?,
            ProductsAction::Categories => commands::products::categories(&ctx).await?,
            ProductsAction::Hot => commands::products::hot(&ctx).await?,
            ProductsAction::Suggest { keyword: Some(keyword) } => {
                commands::products::suggest(&ctx, &keyword).await?;
            }
            ProductsAction::Suggest { keyword: None } => {
                commands::products::suggest_as_typed(&ctx).await;
            }
        },
        Commands::Cart { action } => match action {
            CartAction::Add { id, quantity } => commands::cart::add(&ctx, id, quantity).await?,
            CartAction::Set { id, quantity } => commands::cart::set(&ctx, id, quantity).await?,
            CartAction::Remove { id } => commands::cart::remove(&ctx, id),
            CartAction::Clear => commands::cart::clear(&ctx),
            CartAction::Show => commands::cart::show(&ctx).await,
        },
        Commands::Checkout {
            name,
            phone,
            address,
            email,
            notes,
        } => {
            let form = shopline_storefront::checkout::CheckoutForm {
                customer_name: name,
                customer_email: email,
                customer_phone: phone,
                customer_address: address,
                notes,
            };
            commands::checkout::run(&ctx, &form).await?;
        }
        Commands::Orders { action } => match action {
            OrdersAction::Lookup { email, phone } => {
                commands::orders::lookup(&ctx, email, phone).await?;
            }
            OrdersAction::Show { id } => commands::orders::show(&ctx, id.as_deref()).await?,
        },
        Commands::Admin { action } => run_admin(&ctx, action).await?,
    }
    Ok(())
}

async fn run_admin(ctx: &Context, action: AdminAction) -> Result<(), AppError> {
    use commands::admin;

    match action {
        AdminAction::Dashboard => admin::dashboard(ctx).await?,
        AdminAction::Products {
            category,
            search,
            active,
        } => admin::products(ctx, category, search, active).await?,
        AdminAction::CreateProduct {
            name,
            category,
            price,
            stock,
            description,
            inactive,
        } => {
            let input = shopline_storefront::api::ProductInput {
                name,
                category,
                price: price.into(),
                description,
                is_active: !inactive,
                stock_quantity: stock,
            };
            admin::create_product(ctx, &input).await?;
        }
        AdminAction::DeleteProduct { id } => admin::delete_product(ctx, id).await?,
        AdminAction::Toggle { id } => admin::toggle(ctx, id).await?,
        AdminAction::Stock { id, stock } => admin::stock(ctx, id, stock).await?,
        AdminAction::Orders {
            status,
            name,
            email,
            phone,
        } => {
            let query = shopline_storefront::api::AdminOrderQuery {
                customer_name: name,
                customer_email: email,
                customer_phone: phone,
                status,
            };
            admin::orders(ctx, &query).await?;
        }
        AdminAction::OrderStatus { id, status } => admin::order_status(ctx, id, status).await?,
        AdminAction::Cancel { id } => admin::cancel(ctx, id).await?,
    }
    Ok(())
}

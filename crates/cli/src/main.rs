//! Shopfront CLI - drive the storefront session and cart from a terminal.
//!
//! State lives in `$SHOPFRONT_DATA_DIR/local_storage.json`, so a login or a
//! cart survives between invocations the way it would survive a page reload.
//!
//! # Usage
//!
//! ```bash
//! # Create an account (also logs in)
//! shop register -e ana@example.com -p "correct horse" -n Ana -s García --dni 30111222
//!
//! # Log in / out
//! shop login -e ana@example.com -p "correct horse"
//! shop logout
//!
//! # Cart
//! shop cart add --product 12 --name "Mate" --price 4500.00 --stock 3 -q 2
//! shop cart update 1718000000000 -q 1
//! shop cart show
//!
//! # Place an order and list history
//! shop checkout --phone 1155550000 --address "Calle 1" --city Rosario \
//!     --postal-code 2000 --province "Santa Fe" --payment transfer
//! shop orders
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use shopfront_core::{LineId, PaymentMethod, Price, ProductId, ShippingMethod};
use shopfront_storefront::clock::SystemClock;
use shopfront_storefront::config::ShopfrontConfig;
use shopfront_storefront::error::{AppError, Result};
use shopfront_storefront::storage::FileStore;
use shopfront_storefront::{Storefront, telemetry};

mod commands;

#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about = "Shopfront storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and log in
    Register {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// First name
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        surname: String,

        /// National ID number
        #[arg(long, default_value = "")]
        dni: String,
    },
    /// Log in with email and password
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Log out and return to the guest cart
    Logout,
    /// Show the current identity
    Whoami,
    /// Inspect or change the active cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for the current cart
    Checkout(CheckoutArgs),
    /// List past orders, newest first
    Orders,
}

#[derive(Subcommand)]
enum CartAction {
    /// List cart lines and totals
    Show,
    /// Add a product
    Add {
        /// Product ID
        #[arg(long)]
        product: ProductId,

        #[arg(long)]
        name: String,

        /// Unit price, e.g. 4500.00
        #[arg(long)]
        price: Price,

        /// Units in stock; omit when unknown
        #[arg(long)]
        stock: Option<u32>,

        #[arg(short, long, default_value_t = shopfront_storefront::cart::DEFAULT_QUANTITY)]
        quantity: u32,

        #[arg(long)]
        image: Option<String>,

        #[arg(long)]
        category: Option<String>,
    },
    /// Set a line's quantity
    Update {
        /// Line ID as shown by `cart show`
        line: LineId,

        #[arg(short, long)]
        quantity: u32,
    },
    /// Remove a line
    Remove {
        /// Line ID as shown by `cart show`
        line: LineId,
    },
    /// Empty the cart
    Clear,
}

/// Checkout form fields. Name and email default to the logged-in identity.
#[derive(Args)]
struct CheckoutArgs {
    #[arg(long)]
    first_name: Option<String>,

    #[arg(long)]
    last_name: Option<String>,

    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    phone: String,

    #[arg(long)]
    address: String,

    #[arg(long)]
    city: String,

    #[arg(long)]
    postal_code: String,

    #[arg(long)]
    province: String,

    /// credit-card, debit-card, transfer or mercado-pago
    #[arg(long, default_value = "credit-card")]
    payment: PaymentMethod,

    /// standard, express or same-day
    #[arg(long, default_value = "standard")]
    shipping: ShippingMethod,

    #[arg(long, default_value = "")]
    card_number: String,

    /// MM/YY
    #[arg(long, default_value = "")]
    expiry: String,

    #[arg(long, default_value = "")]
    cvv: String,

    #[arg(long, default_value = "")]
    card_name: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ShopfrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            telemetry::init_tracing(&ShopfrontConfig::default());
            AppError::from(e).report();
            std::process::exit(2);
        }
    };

    // Keep the guard alive until exit so queued events are flushed
    let sentry_guard = telemetry::init_sentry(&config);
    telemetry::init_tracing(&config);
    telemetry::log_sentry_status(sentry_guard.is_some(), &config);

    if let Err(e) = run(cli, &config).await {
        e.report();
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ShopfrontConfig) -> Result<()> {
    let store = FileStore::open(config.store_path())?;
    tracing::debug!(path = %store.path().display(), "Opened store");

    let mut storefront = Storefront::open(Arc::new(store), Arc::new(SystemClock));

    match cli.command {
        Commands::Register {
            email,
            password,
            name,
            surname,
            dni,
        } => {
            commands::account::register(
                &mut storefront,
                config,
                shopfront_storefront::services::accounts::RegisterRequest {
                    email,
                    password,
                    name,
                    surname,
                    dni,
                },
            )
            .await?;
        }
        Commands::Login { email, password } => {
            commands::account::login(&mut storefront, config, &email, &password).await?;
        }
        Commands::Logout => commands::account::logout(&mut storefront),
        Commands::Whoami => commands::account::whoami(&storefront),
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&storefront),
            CartAction::Add {
                product,
                name,
                price,
                stock,
                quantity,
                image,
                category,
            } => {
                let product = shopfront_storefront::models::Product {
                    id: product,
                    name,
                    price,
                    stock,
                    image_url: image,
                    category,
                };
                commands::cart::add(&mut storefront, &product, quantity)?;
            }
            CartAction::Update { line, quantity } => {
                commands::cart::update(&mut storefront, line, quantity)?;
            }
            CartAction::Remove { line } => commands::cart::remove(&mut storefront, line)?,
            CartAction::Clear => commands::cart::clear(&mut storefront),
        },
        Commands::Checkout(args) => commands::orders::checkout(&mut storefront, args)?,
        Commands::Orders => commands::orders::list(&storefront)?,
    }

    Ok(())
}

impl From<CheckoutArgs> for commands::orders::CheckoutInput {
    fn from(args: CheckoutArgs) -> Self {
        Self {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            phone: args.phone,
            address: args.address,
            city: args.city,
            postal_code: args.postal_code,
            province: args.province,
            payment_method: args.payment,
            shipping_method: args.shipping,
            card_number: args.card_number,
            expiry_date: args.expiry,
            cvv: args.cvv,
            card_name: args.card_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cart_add() {
        let cli = Cli::try_parse_from([
            "shop", "cart", "add", "--product", "12", "--name", "Mate", "--price", "4500.00",
            "--stock", "3", "-q", "2",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Cart {
                action: CartAction::Add {
                    quantity: 2,
                    stock: Some(3),
                    ..
                }
            })
        ));
    }

    #[test]
    fn test_parse_checkout_methods() {
        let cli = Cli::try_parse_from([
            "shop",
            "checkout",
            "--phone",
            "1",
            "--address",
            "a",
            "--city",
            "c",
            "--postal-code",
            "p",
            "--province",
            "s",
            "--payment",
            "mercado-pago",
            "--shipping",
            "same-day",
        ]);
        let Ok(Cli {
            command: Commands::Checkout(args),
        }) = cli
        else {
            panic!("checkout did not parse");
        };
        assert_eq!(args.payment, PaymentMethod::MercadoPago);
        assert_eq!(args.shipping, ShippingMethod::SameDay);
    }
}

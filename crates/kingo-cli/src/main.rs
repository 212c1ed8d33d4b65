mod catalog;
mod session;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::session::SessionCommands;

#[derive(Debug, Parser)]
#[command(name = "kingo-cli")]
#[command(about = "Kingo Rides catalog command line interface")]
struct Cli {
    /// Print normalized records as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List every product in the catalog
    Products,
    /// List vehicle categories
    Categories,
    /// Search products by name, make, model, or any other field
    Search {
        /// Free-text query; words are matched case-insensitively
        query: String,
    },
    /// List products available for a date range
    Available {
        /// First day of the rental (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Last day of the rental (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
    },
    /// Show a single product
    Product {
        /// Vendor product ID
        id: String,
    },
    /// Print the vendor booking link for a product
    BookingUrl {
        /// Vendor product ID
        vendor_product_id: String,
        /// Explicit slug; takes precedence over the slug map
        #[arg(long)]
        slug: Option<String>,
        /// Display name used to derive a slug
        #[arg(long)]
        name: Option<String>,
        /// Rental start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Rental end date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Inspect or change the stored session flags
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("kingo-cli: no command given; run with --help for usage");
        return Ok(());
    };

    let config = kingo_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let client = || catalog::build_client(&config);
    match command {
        Commands::Session { command } => {
            let store = kingo_core::SessionStore::new(&config.session_path);
            session::run_session(&store, command, cli.json)
        }
        Commands::Products => catalog::run_products(&client().await?, cli.json).await,
        Commands::Categories => catalog::run_categories(&client().await?, cli.json).await,
        Commands::Search { query } => {
            catalog::run_search(&client().await?, &query, cli.json).await
        }
        Commands::Available { from, to } => {
            catalog::run_available(&client().await?, from, to, cli.json).await
        }
        Commands::Product { id } => catalog::run_product(&client().await?, &id, cli.json).await,
        Commands::BookingUrl {
            vendor_product_id,
            slug,
            name,
            start,
            end,
        } => {
            let request = kingo_sharefox::BookingRequest {
                vendor_product_id,
                slug,
                name,
                start,
                end,
            };
            catalog::run_booking_url(&catalog::offline_client(&config)?, &request, cli.json)
        }
    }
}

#[cfg(test)]
mod tests;

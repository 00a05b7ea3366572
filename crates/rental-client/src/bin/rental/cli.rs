//! Clap derive structures for the `rental` CLI.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

/// rental -- browse, book and save rental listings
#[derive(Debug, Parser)]
#[command(
    name = "rental",
    version,
    about = "Browse, book and save rental listings",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Base URL of the API
    #[arg(
        long,
        env = "RENTAL_API_URL",
        default_value = "http://localhost:8000/api",
        global = true
    )]
    pub api_url: String,

    /// Act as this user instead of the signed-in identity
    #[arg(long, env = "RENTAL_EMAIL", global = true)]
    pub email: Option<String>,

    /// Identity provider tenant domain
    #[arg(long, env = "RENTAL_IDENTITY_DOMAIN", global = true)]
    pub identity_domain: Option<String>,

    /// Identity provider client id
    #[arg(long, env = "RENTAL_IDENTITY_CLIENT_ID", global = true)]
    pub identity_client_id: Option<String>,

    /// API audience requested with credentials
    #[arg(long, env = "RENTAL_IDENTITY_AUDIENCE", global = true)]
    pub identity_audience: Option<String>,

    /// Directory holding stored credentials
    #[arg(long, env = "RENTAL_CREDENTIALS_DIR", global = true)]
    pub credentials_dir: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List residencies, optionally filtered
    #[command(alias = "search", alias = "ls")]
    List {
        /// Match against title, city, country and address
        filter: Option<String>,
    },

    /// Show one residency
    Show { id: Uuid },

    /// Create a listing
    Create(CreateArgs),

    /// Book a visit
    Book {
        id: Uuid,
        /// Visit date (defaults to today on the server)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Cancel a booked visit
    Cancel { id: Uuid },

    /// Add or remove a residency from favourites
    #[command(alias = "fav")]
    Favourite { id: Uuid },

    /// List booked visits
    Bookings,

    /// List favourite residencies
    Favourites,

    /// Read or edit the profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// Sign in with the identity provider
    Login,

    /// Forget stored credentials
    Logout,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub price: i32,
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub country: String,
    /// Image URL
    #[arg(long)]
    pub image: String,
    /// Facility label; repeat for several
    #[arg(long = "facility")]
    pub facilities: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show the stored profile
    Get,
    /// Update the given fields; omitted fields keep their values
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        image: Option<String>,
    },
}

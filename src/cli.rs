use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_BASE_URL, PageLimit};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Also append the log stream to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scrape the for-sale listing pages of one or more users.
    Listings(ListingsArgs),
    /// Scrape book detail pages and their private sellers.
    Details(DetailsArgs),
}

#[derive(Debug, Args)]
pub struct ListingsArgs {
    /// Marketplace user id (repeatable).
    #[arg(long = "user-id", required = true, num_args = 1..)]
    pub user_ids: Vec<String>,

    /// Listing pages per user: a positive number or `all`.
    #[arg(long, default_value = "all")]
    pub max_pages: PageLimit,

    /// Directory for the per-user `simania_books_user_<id>.csv` files.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Marketplace root URL.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}

#[derive(Debug, Args)]
pub struct DetailsArgs {
    /// Book id to scrape (repeatable).
    #[arg(long = "book-id", num_args = 1..)]
    pub book_ids: Vec<String>,

    /// Listing CSV whose `book_id` column supplies more ids (repeatable).
    #[arg(long = "from-listings", num_args = 1..)]
    pub from_listings: Vec<PathBuf>,

    /// Output path for book details.
    #[arg(long, default_value = "data/books.csv")]
    pub books_out: PathBuf,

    /// Output path for sellers.
    #[arg(long, default_value = "data/sellers.csv")]
    pub sellers_out: PathBuf,

    /// Marketplace root URL.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}

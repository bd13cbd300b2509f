use clap::{Parser, Subcommand};

use crate::db::models::Category;

#[derive(Parser)]
#[command(
    name = "reportbot",
    version,
    about = "Business report distribution bot",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the config file path globally
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start Telegram polling and the daily broadcast scheduler
    Serve,

    /// Print every stored user profile
    Users,

    /// Print the report catalog
    Reports {
        /// Only show reports in this category (FinTech, Automotive, Retail, Other)
        #[arg(short = 'k', long)]
        category: Option<Category>,
    },

    /// Run one broadcast pass immediately
    Broadcast,
}

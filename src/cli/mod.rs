pub mod account;
pub mod advisor;
pub mod alerts_view;
pub mod config;
pub mod dashboard;
pub mod history_view;
pub mod login;
pub mod receipt_form;
pub mod receipts;
pub mod report;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(
    name = "credito",
    version,
    about = "Microcredit receipts, spend history and advisor alerts from the terminal."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and remember the session.
    Login {
        /// Account email (prompted when omitted)
        #[arg(long)]
        email: Option<String>,
    },
    /// Forget the saved session.
    Logout,
    /// Show endpoint, file locations and the current user.
    Status,
    /// Show or change settings.
    Config {
        /// Backend base URL, e.g. http://localhost:4000
        #[arg(long = "api-url")]
        api_url: Option<String>,
        /// Request timeout in seconds (0 disables it)
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// List the quarters receipts can be filed under.
    Quarters,
    /// Submit a receipt.
    Submit {
        /// Quarter name, matched ignoring case (e.g. Q1-2025)
        #[arg(long)]
        quarter: String,
        /// Amount spent
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Additional comments
        #[arg(long, default_value = "")]
        comments: String,
        /// Supporting document (PDF, image or XML)
        #[arg(long)]
        document: Option<String>,
    },
    /// Past receipts with the share of credit spent.
    History,
    /// Alerts sent by your advisor.
    Alerts,
    /// Show the advisor card.
    Advisor {
        /// Start a phone call to the advisor
        #[arg(long)]
        call: bool,
    },
    /// Print a shell completion script.
    Completions {
        shell: Shell,
    },
}

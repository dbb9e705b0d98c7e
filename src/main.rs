mod advisor;
mod api;
mod cli;
mod error;
mod fmt;
mod history;
mod logging;
mod models;
mod receipt;
mod session;
mod settings;
mod tasks;
#[cfg(test)]
mod testing;
mod tui;

use clap::{CommandFactory, Parser};

use cli::{Cli, Commands};
use receipt::ReceiptForm;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init();

    let result = match cli.command {
        None => cli::dashboard::run().await,
        Some(Commands::Login { email }) => cli::account::login(email).await,
        Some(Commands::Logout) => cli::account::logout(),
        Some(Commands::Status) => cli::account::status(),
        Some(Commands::Config { api_url, timeout }) => cli::config::run(api_url, timeout),
        Some(Commands::Quarters) => cli::receipts::quarters().await,
        Some(Commands::Submit {
            quarter,
            amount,
            description,
            comments,
            document,
        }) => {
            cli::receipts::submit(ReceiptForm {
                quarter_name: quarter,
                amount,
                description,
                comments,
                document_path: document.unwrap_or_default(),
            })
            .await
        }
        Some(Commands::History) => cli::report::history().await,
        Some(Commands::Alerts) => cli::report::alerts().await,
        Some(Commands::Advisor { call }) => cli::advisor::run(call),
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "credito", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        if e.is_local() {
            tracing::warn!("command rejected: {e}");
        } else {
            tracing::error!("command failed: {e}");
        }
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

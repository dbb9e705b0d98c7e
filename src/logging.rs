use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::settings::log_path;

const DEFAULT_FILTER: &str = "credito=info";

/// Send `tracing` output to the log file so it never draws over the TUI.
/// `RUST_LOG` overrides the default filter. Failing to open the log file
/// only disables logging.
pub fn init() {
    let path = log_path();
    if let Some(dir) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Warning: logging disabled ({}: {e})", dir.display());
            return;
        }
    }
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: logging disabled ({}: {e})", path.display());
            return;
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init();
}

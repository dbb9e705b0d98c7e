use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path, validate_api_url, API_URL_ENV};

pub fn run(api_url: Option<String>, timeout: Option<u64>) -> Result<()> {
    let mut settings = load_settings();
    let changing = api_url.is_some() || timeout.is_some();

    if let Some(url) = api_url {
        settings.api_base_url = validate_api_url(&url)?;
    }
    if let Some(secs) = timeout {
        // 0 clears the timeout.
        settings.request_timeout_secs = (secs > 0).then_some(secs);
    }
    if changing {
        save_settings(&settings)?;
        tracing::info!("settings updated: {}", settings.api_base_url);
        println!("Configuración guardada en {}", settings_path().display());
    }

    println!("api_base_url:          {}", settings.api_base_url);
    if std::env::var(API_URL_ENV).is_ok_and(|v| !v.trim().is_empty()) {
        println!("  ({API_URL_ENV} activo: {})", settings.effective_api_url());
    }
    match settings.request_timeout_secs {
        Some(secs) => println!("request_timeout_secs:  {secs}"),
        None => println!("request_timeout_secs:  (sin límite)"),
    }
    println!(
        "advisor:               {} · {} · {}",
        settings.advisor.name, settings.advisor.role, settings.advisor.phone
    );
    Ok(())
}

use std::io::{self, BufRead, Write};

use colored::Colorize;
use zeroize::Zeroize;

use crate::api::{ApiClient, Backend};
use crate::cli::dashboard::MSG_LOGGED_IN;
use crate::cli::login::login_failure_message;
use crate::error::{CreditoError, Result};
use crate::session::SessionStore;
use crate::settings::{load_settings, settings_path};

fn prompt_line(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

pub async fn login(email: Option<String>) -> Result<()> {
    let settings = load_settings();
    let client = ApiClient::from_settings(&settings)?;

    let email = match email {
        Some(e) => e.trim().to_string(),
        None => prompt_line("Correo: ")?,
    };
    if email.is_empty() {
        return Err(CreditoError::Validation(
            "Por favor completa todos los campos obligatorios.".into(),
        ));
    }
    let mut password = rpassword::prompt_password("Contraseña: ")?;

    let result = client.login(&email, &password).await;
    password.zeroize();

    let session = result.map_err(|e| {
        tracing::warn!("login failed: {e}");
        CreditoError::Validation(login_failure_message(&e))
    })?;
    SessionStore::default_location().save(&session)?;
    println!("{} Hola, {}!", MSG_LOGGED_IN.green().bold(), session.user_name);
    Ok(())
}

pub fn logout() -> Result<()> {
    let store = SessionStore::default_location();
    match store.load() {
        Some(session) => {
            store.clear()?;
            tracing::info!("logged out user {}", session.user_id);
            println!("Sesión cerrada ({}).", session.user_name);
        }
        None => {
            store.clear()?;
            println!("No hay una sesión activa.");
        }
    }
    Ok(())
}

pub fn status() -> Result<()> {
    let settings = load_settings();
    let store = SessionStore::default_location();

    println!("Servidor:   {}", settings.effective_api_url());
    match settings.request_timeout() {
        Some(t) => println!("Timeout:    {}s", t.as_secs()),
        None => println!("Timeout:    (sin límite)"),
    }
    println!("Config:     {}", settings_path().display());
    println!("Sesión:     {}", store.path().display());
    println!();
    match store.load() {
        Some(session) => println!(
            "Usuario:    {} (id {})",
            session.user_name.bold(),
            session.user_id
        ),
        None => println!("Usuario:    (sin sesión) Ejecuta `credito login`."),
    }
    Ok(())
}

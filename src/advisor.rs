use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::error::{CreditoError, Result};

/// Credit advisor shown on the receipt screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisor {
    pub name: String,
    pub role: String,
    pub phone: String,
}

impl Default for Advisor {
    fn default() -> Self {
        Self {
            name: "Juan Perez".to_string(),
            role: "Asesor de crédito".to_string(),
            phone: "+526141088379".to_string(),
        }
    }
}

impl Advisor {
    pub fn call_url(&self) -> String {
        let digits: String = self
            .phone
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        format!("tel:{digits}")
    }

    /// Hand the `tel:` URL to the platform's URL opener.
    pub fn call(&self) -> Result<()> {
        if self.call_url() == "tel:" {
            return Err(CreditoError::Validation(format!(
                "El asesor {} no tiene teléfono configurado.",
                self.name
            )));
        }
        dispatch_url(&self.call_url())
    }
}

#[cfg(target_os = "macos")]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(url);
    cmd
}

#[cfg(target_os = "windows")]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", "", url]);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(url);
    cmd
}

pub fn dispatch_url(url: &str) -> Result<()> {
    tracing::info!("dispatching {url}");
    let mut child = opener(url)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|e| {
            tracing::error!("could not launch URL opener: {e}");
            CreditoError::Io(e)
        })?;
    // Reap the opener in the background; its exit status is not interesting.
    std::thread::spawn(move || {
        let _ = child.wait();
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_url_keeps_plus_and_digits() {
        let a = Advisor {
            phone: "+52 (614) 108-8379".into(),
            ..Advisor::default()
        };
        assert_eq!(a.call_url(), "tel:+526141088379");
    }

    #[test]
    fn test_default_advisor_matches_card() {
        let a = Advisor::default();
        assert_eq!(a.name, "Juan Perez");
        assert_eq!(a.call_url(), "tel:+526141088379");
    }

    #[test]
    fn test_call_without_phone_is_rejected_locally() {
        let a = Advisor {
            phone: "n/a".into(),
            ..Advisor::default()
        };
        let err = a.call().unwrap_err();
        assert!(err.is_local());
    }
}

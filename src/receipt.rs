//! Receipt submission state machine.
//!
//! ```text
//! idle --(submit passes validation+resolution)--> loading
//! loading --(success response)--> success
//! loading --(failure response or exception)--> idle
//! success --(reset timer)--> idle  [+ field reset, + navigate]
//! ```
//!
//! The machine itself is synchronous; callers run the network request and
//! the reset timer and feed the outcomes back in.

use std::time::Duration;

use crate::error::{CreditoError, Result};
use crate::models::{Document, Quarter, ReceiptSubmission, SubmitResponse};

/// Delay between a successful submission and the form reset.
pub const RESET_DELAY: Duration = Duration::from_secs(3);

pub const MSG_MISSING_FIELDS: &str = "Por favor completa todos los campos obligatorios.";
pub const MSG_UNKNOWN_QUARTER: &str = "El trimestre ingresado no existe.";
pub const MSG_SAVED: &str = "Comprobante guardado correctamente.";
pub const MSG_SAVE_FAILED: &str = "No se pudo guardar.";
pub const MSG_CONNECTION: &str = "Hubo un problema con la conexión al servidor.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Success,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiptForm {
    pub quarter_name: String,
    pub amount: String,
    pub description: String,
    pub comments: String,
    /// Path typed by the user; empty means no attachment.
    pub document_path: String,
}

impl ReceiptForm {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        *self == ReceiptForm::default()
    }
}

/// First quarter whose name equals `typed` ignoring case. No trimming.
pub fn resolve_quarter<'a>(quarters: &'a [Quarter], typed: &str) -> Option<&'a Quarter> {
    let wanted = typed.to_lowercase();
    quarters.iter().find(|q| q.name.to_lowercase() == wanted)
}

/// Outcome of feeding a response into the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Saved(Option<String>),
    Failed(String),
}

#[derive(Debug, Default)]
pub struct ReceiptFlow {
    status: Status,
    pub form: ReceiptForm,
    quarters: Vec<Quarter>,
}

impl ReceiptFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn quarters(&self) -> &[Quarter] {
        &self.quarters
    }

    pub fn set_quarters(&mut self, quarters: Vec<Quarter>) {
        self.quarters = quarters;
    }

    /// Validates the form, resolves the quarter and moves `idle → loading`.
    /// On error nothing changes and no request should be made.
    pub fn begin_submit(&mut self, user_id: i64) -> Result<ReceiptSubmission> {
        if self.status != Status::Idle {
            return Err(CreditoError::Validation(
                "Ya hay un comprobante en proceso.".to_string(),
            ));
        }
        if self.form.quarter_name.trim().is_empty() || self.form.amount.trim().is_empty() {
            return Err(CreditoError::Validation(MSG_MISSING_FIELDS.to_string()));
        }
        let quarter = resolve_quarter(&self.quarters, &self.form.quarter_name)
            .ok_or_else(|| CreditoError::Validation(MSG_UNKNOWN_QUARTER.to_string()))?;

        let document = match self.form.document_path.trim() {
            "" => None,
            path => {
                let doc = Document::from_path(path);
                if !doc.path.is_file() {
                    return Err(CreditoError::Validation(format!(
                        "No se encontró el documento: {path}"
                    )));
                }
                Some(doc)
            }
        };

        let submission = ReceiptSubmission {
            user_id,
            quarter_id: quarter.id,
            amount: self.form.amount.clone(),
            description: self.form.description.clone(),
            comments: self.form.comments.clone(),
            document,
        };
        self.status = Status::Loading;
        tracing::info!(
            "submitting receipt for quarter {} ({})",
            quarter.id,
            quarter.name
        );
        Ok(submission)
    }

    /// Applies the submission response. Ignored unless loading.
    pub fn finish(&mut self, result: Result<SubmitResponse>) -> Option<Outcome> {
        if self.status != Status::Loading {
            return None;
        }
        match result {
            Ok(resp) => {
                self.status = Status::Success;
                tracing::info!("receipt saved: {:?}", resp.message);
                Some(Outcome::Saved(resp.message))
            }
            Err(e) => {
                self.status = Status::Idle;
                tracing::error!("receipt submission failed: {e}");
                let generic = match e {
                    CreditoError::Server { .. } => MSG_SAVE_FAILED,
                    _ => MSG_CONNECTION,
                };
                Some(Outcome::Failed(e.user_message(generic)))
            }
        }
    }

    /// Reset timer fired: clear the form and go back to idle. Returns true
    /// when the caller should navigate to the history screen.
    pub fn complete_success(&mut self) -> bool {
        if self.status != Status::Success {
            return false;
        }
        self.form = ReceiptForm::default();
        self.status = Status::Idle;
        true
    }
}

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::api::{ApiClient, Backend};
use crate::error::{CreditoError, Result};
use crate::receipt::{Outcome, ReceiptFlow, ReceiptForm, MSG_MISSING_FIELDS, MSG_SAVED};
use crate::session::SessionStore;
use crate::settings::load_settings;

pub async fn quarters() -> Result<()> {
    let client = ApiClient::from_settings(&load_settings())?;
    let quarters = client.list_quarters().await?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Trimestre"]);
    for q in &quarters {
        table.add_row(vec![Cell::new(q.id), Cell::new(&q.name)]);
    }
    println!("Trimestres\n{table}");
    Ok(())
}

/// Submit one receipt. Required fields are checked before the session is
/// read or any request is made.
pub async fn submit(form: ReceiptForm) -> Result<()> {
    if form.quarter_name.trim().is_empty() || form.amount.trim().is_empty() {
        return Err(CreditoError::Validation(MSG_MISSING_FIELDS.to_string()));
    }
    let session = SessionStore::default_location().require()?;
    let client = ApiClient::from_settings(&load_settings())?;

    let message = send_receipt(&client, session.user_id, form).await?;
    println!("{}", MSG_SAVED.green().bold());
    if let Some(m) = message.filter(|m| !m.trim().is_empty()) {
        println!("  {m}");
    }
    Ok(())
}

/// Runs one submission through the receipt flow. Server and transport
/// failures come back unchanged so the caller still sees the status.
async fn send_receipt(
    backend: &dyn Backend,
    user_id: i64,
    form: ReceiptForm,
) -> Result<Option<String>> {
    let mut flow = ReceiptFlow::new();
    flow.set_quarters(backend.list_quarters().await?);
    flow.form = form;
    let submission = flow.begin_submit(user_id)?;

    let response = match backend.submit_receipt(&submission).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("receipt submission failed: {e}");
            return Err(e);
        }
    };
    match flow.finish(Ok(response)) {
        Some(Outcome::Saved(message)) => Ok(message),
        _ => Ok(None),
    }
}

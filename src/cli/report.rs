use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::api::{ApiClient, Backend};
use crate::error::Result;
use crate::fmt::{money, timestamp};
use crate::history::build_rows;
use crate::session::SessionStore;
use crate::settings::load_settings;

pub async fn history() -> Result<()> {
    let session = SessionStore::default_location().require()?;
    let client = ApiClient::from_settings(&load_settings())?;

    let (records, credit) = tokio::join!(
        client.list_history(session.user_id),
        client.assigned_credit(session.user_id)
    );
    let rows = build_rows(&records?);

    match credit {
        Ok(amount) => println!("Crédito Asignado: {}", money(amount).bold()),
        Err(e) => {
            tracing::error!("failed to load assigned credit: {e}");
            println!("Crédito Asignado: {}", "(no disponible)".dimmed());
        }
    }

    if rows.is_empty() {
        println!("No hay comprobantes disponibles.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Trimestre", "Descripción", "Gastado", "Crédito", "%"]);
    for row in &rows {
        let pct = if row.percentage > 100.0 {
            row.percentage_label().red().to_string()
        } else {
            row.percentage_label()
        };
        table.add_row(vec![
            Cell::new(&row.quarter_name),
            Cell::new(&row.description),
            Cell::new(row.spent_label()).set_alignment(CellAlignment::Right),
            Cell::new(row.total_label()).set_alignment(CellAlignment::Right),
            Cell::new(pct).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("Historial\n{table}");
    Ok(())
}

pub async fn alerts() -> Result<()> {
    let session = SessionStore::default_location().require()?;
    let client = ApiClient::from_settings(&load_settings())?;
    let alerts = client.list_alerts(session.user_id).await?;

    if alerts.is_empty() {
        println!("No hay alertas disponibles.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID Alerta", "Fecha", "Asesor", "Alerta"]);
    for alert in &alerts {
        table.add_row(vec![
            Cell::new(alert.id).set_alignment(CellAlignment::Right),
            Cell::new(timestamp(&alert.created_at)),
            Cell::new(&alert.advisor_name),
            Cell::new(textwrap::fill(&alert.description, 60)),
        ]);
    }
    println!("Notificaciones\n{table}");
    Ok(())
}

use crate::fmt::{number, percent};
use crate::models::HistoryRecord;

/// Fixed denominator for the spend percentage. The record's own
/// `total_credito_asignado` and `porcentaje` are not used here.
pub const SPEND_DIVISOR: f64 = 100_000.0;

/// `(amount_spent / 100000) * 100`, unrounded. Display goes through
/// `fmt::percent`, which is the only place two decimals are applied.
pub fn spend_percentage(amount_spent: f64) -> f64 {
    (amount_spent / SPEND_DIVISOR) * 100.0
}

/// Display-ready view of one past receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub quarter_name: String,
    pub description: String,
    pub amount_spent: f64,
    pub total_credit: f64,
    pub percentage: f64,
}

impl HistoryRow {
    pub fn from_record(record: &HistoryRecord) -> Self {
        Self {
            quarter_name: record.quarter_name.clone(),
            description: record.description.clone(),
            amount_spent: record.amount_spent,
            total_credit: record.total_assigned_credit,
            percentage: spend_percentage(record.amount_spent),
        }
    }

    pub fn percentage_label(&self) -> String {
        percent(self.percentage)
    }

    /// Fill ratio for a progress bar, clamped to 0..=1.
    pub fn bar_ratio(&self) -> f64 {
        (self.percentage / 100.0).clamp(0.0, 1.0)
    }

    pub fn spent_label(&self) -> String {
        format!("{}$", number(self.amount_spent))
    }

    pub fn total_label(&self) -> String {
        format!("{} crédito", number(self.total_credit))
    }
}

pub fn build_rows(records: &[HistoryRecord]) -> Vec<HistoryRow> {
    records.iter().map(HistoryRow::from_record).collect()
}

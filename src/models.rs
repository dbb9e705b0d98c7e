use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// The logged-in user, persisted between runs by `SessionStore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quarter {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    #[serde(rename = "trimestre_id")]
    pub quarter_id: i64,
    #[serde(rename = "trimestre_nombre", default)]
    pub quarter_name: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(
        rename = "total_credito_asignado",
        default,
        deserialize_with = "lenient_amount"
    )]
    pub total_assigned_credit: f64,
    #[serde(rename = "monto_gastado", default, deserialize_with = "lenient_amount")]
    pub amount_spent: f64,
    /// Server-reported percentage. Fetched but not used for display.
    #[serde(rename = "porcentaje", default, deserialize_with = "lenient_amount")]
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: i64,
    #[serde(rename = "descripcion_alertas", default)]
    pub description: String,
    #[serde(rename = "asesor_id", default)]
    pub advisor_id: Option<i64>,
    #[serde(rename = "usuario_id", default)]
    pub user_id: Option<i64>,
    #[serde(rename = "trimestre_id", default)]
    pub quarter_id: Option<i64>,
    #[serde(rename = "fecha_creacion", default)]
    pub created_at: String,
    #[serde(rename = "asesor_nombre", default)]
    pub advisor_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignedCredit {
    #[serde(rename = "credito_asignado", default, deserialize_with = "lenient_amount")]
    pub amount: f64,
}

/// A local file attached to a receipt submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: String,
}

impl Document {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "documento.pdf".to_string());
        let mime_type = mime_for_path(&path).to_string();
        Self {
            path,
            file_name,
            mime_type,
        }
    }
}

fn mime_for_path(path: &std::path::Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "heic" => "image/heic",
        "xml" => "application/xml",
        "txt" => "text/plain",
        _ => "application/pdf",
    }
}

/// One receipt submission, built per attempt after validation and quarter
/// resolution have passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptSubmission {
    pub user_id: i64,
    pub quarter_id: i64,
    pub amount: String,
    pub description: String,
    pub comments: String,
    pub document: Option<Document>,
}

/// Successful submission body. Any well-formed JSON is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitResponse {
    pub message: Option<String>,
}

/// Accepts a JSON number, a numeric string, or null (as 0).
fn lenient_amount<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(Raw::Num(n)) => Ok(n),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(0.0),
        Some(Raw::Text(s)) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarter_uses_backend_field_names() {
        let q: Quarter = serde_json::from_str(r#"{"id": 3, "nombre": "Q1-2025"}"#).unwrap();
        assert_eq!(q, Quarter { id: 3, name: "Q1-2025".into() });
    }

    #[test]
    fn test_history_record_accepts_numeric_strings_and_nulls() {
        let json = r#"{
            "id": 7,
            "trimestre_id": 3,
            "trimestre_nombre": "Q1-2025",
            "descripcion": "Papelería",
            "total_credito_asignado": "150000.00",
            "monto_gastado": 25000,
            "porcentaje": null
        }"#;
        let rec: HistoryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.total_assigned_credit, 150000.0);
        assert_eq!(rec.amount_spent, 25000.0);
        assert_eq!(rec.percentage, 0.0);
    }

    #[test]
    fn test_history_record_missing_amounts_default_to_zero() {
        let rec: HistoryRecord =
            serde_json::from_str(r#"{"id": 1, "trimestre_id": 2}"#).unwrap();
        assert_eq!(rec.amount_spent, 0.0);
        assert_eq!(rec.total_assigned_credit, 0.0);
        assert!(rec.quarter_name.is_empty());
    }

    #[test]
    fn test_alert_record_parses_backend_shape() {
        let json = r#"{
            "id": 11,
            "descripcion_alertas": "Comprobante pendiente",
            "asesor_id": 2,
            "usuario_id": 1,
            "trimestre_id": 3,
            "fecha_creacion": "2025-03-14T18:30:00.000Z",
            "asesor_nombre": "Juan Perez"
        }"#;
        let alert: AlertRecord = serde_json::from_str(json).unwrap();
        assert_eq!(alert.id, 11);
        assert_eq!(alert.advisor_name, "Juan Perez");
        assert_eq!(alert.quarter_id, Some(3));
    }

    #[test]
    fn test_assigned_credit_rejects_garbage_strings() {
        let bad: std::result::Result<AssignedCredit, _> =
            serde_json::from_str(r#"{"credito_asignado": "mucho"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_document_defaults() {
        let doc = Document::from_path("/tmp/factura.PDF");
        assert_eq!(doc.file_name, "factura.PDF");
        assert_eq!(doc.mime_type, "application/pdf");

        let img = Document::from_path("recibo.jpeg");
        assert_eq!(img.mime_type, "image/jpeg");

        let bare = Document::from_path("/");
        assert_eq!(bare.file_name, "documento.pdf");
    }
}

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{CreditoError, Result};
use crate::models::{
    AlertRecord, AssignedCredit, HistoryRecord, Quarter, ReceiptSubmission, Session,
    SubmitResponse,
};
use crate::settings::Settings;

/// Everything the screens need from the backend.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<Session>;
    async fn list_quarters(&self) -> Result<Vec<Quarter>>;
    async fn submit_receipt(&self, submission: &ReceiptSubmission) -> Result<SubmitResponse>;
    async fn list_history(&self, user_id: i64) -> Result<Vec<HistoryRecord>>;
    async fn assigned_credit(&self, user_id: i64) -> Result<f64>;
    async fn list_alerts(&self, user_id: i64) -> Result<Vec<AlertRecord>>;
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    correo: &'a str,
    password: &'a str,
}

/// JSON-over-HTTP client for the credit backend.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Option<std::time::Duration>) -> Result<Self> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("credito/", env!("CARGO_PKG_VERSION")));
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(&settings.effective_api_url(), settings.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        tracing::debug!("GET {url}");
        let response = self.http.get(&url).send().await.map_err(|e| {
            tracing::error!("GET {url} failed: {e}");
            CreditoError::from(e)
        })?;
        let body = read_body(response).await?;
        serde_json::from_value(body).map_err(|e| CreditoError::MalformedResponse(e.to_string()))
    }
}

/// Classifies a response: non-2xx becomes `Server` (carrying `mensaje` when
/// the body has one), a 2xx body that is not JSON becomes `MalformedResponse`.
async fn read_body(response: Response) -> Result<Value> {
    let status = response.status();
    let bytes = response.bytes().await?;
    if !status.is_success() {
        let message = serde_json::from_slice::<Value>(&bytes)
            .ok()
            .as_ref()
            .and_then(server_message);
        tracing::warn!("backend answered {status}: {message:?}");
        return Err(CreditoError::Server {
            status: status.as_u16(),
            message,
        });
    }
    serde_json::from_slice(&bytes)
        .map_err(|e| CreditoError::MalformedResponse(format!("HTTP {status}: {e}")))
}

fn server_message(body: &Value) -> Option<String> {
    body.get("mensaje")
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|m| !m.trim().is_empty())
}

fn session_from_login(status: StatusCode, body: &Value) -> Result<Session> {
    let user = body.get("usuario");
    let user_id = user
        .and_then(|u| u.get("id"))
        .and_then(|id| id.as_i64().or_else(|| id.as_str()?.parse().ok()))
        .filter(|id| *id != 0);
    let user_name = user
        .and_then(|u| u.get("nombre"))
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty());

    match (user_id, user_name) {
        (Some(user_id), Some(user_name)) => Ok(Session {
            user_id,
            user_name: user_name.to_string(),
        }),
        _ => Err(CreditoError::Server {
            status: status.as_u16(),
            message: server_message(body),
        }),
    }
}

pub async fn build_receipt_form(submission: &ReceiptSubmission) -> Result<Form> {
    let mut form = Form::new()
        .text("usuario_id", submission.user_id.to_string())
        .text("trimestre_id", submission.quarter_id.to_string())
        .text("cantidad_factura", submission.amount.clone())
        .text("descripcion", submission.description.clone())
        .text("comentarios_adicionales", submission.comments.clone());

    if let Some(doc) = &submission.document {
        let bytes = tokio::fs::read(&doc.path).await?;
        let part = Part::bytes(bytes)
            .file_name(doc.file_name.clone())
            .mime_str(&doc.mime_type)?;
        form = form.part("documento_pdf", part);
    }
    Ok(form)
}

#[async_trait]
impl Backend for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let url = self.url("/inicio");
        tracing::debug!("POST {url} for {email}");
        let response = self
            .http
            .post(&url)
            .json(&LoginRequest {
                correo: email,
                password,
            })
            .send()
            .await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let body: Value = match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(e) if status.is_success() => {
                return Err(CreditoError::MalformedResponse(e.to_string()))
            }
            Err(_) => Value::Null,
        };
        let session = session_from_login(status, &body)?;
        tracing::info!("login succeeded for user {}", session.user_id);
        Ok(session)
    }

    async fn list_quarters(&self) -> Result<Vec<Quarter>> {
        self.get_json("/trimestres/trimestre").await
    }

    async fn submit_receipt(&self, submission: &ReceiptSubmission) -> Result<SubmitResponse> {
        let url = self.url("/comprobantes/crearComprobante");
        let form = build_receipt_form(submission).await?;
        tracing::debug!(
            "POST {url} quarter={} user={} document={}",
            submission.quarter_id,
            submission.user_id,
            submission.document.is_some()
        );
        let response = self
            .http
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;
        let body = read_body(response).await?;
        Ok(SubmitResponse {
            message: server_message(&body),
        })
    }

    async fn list_history(&self, user_id: i64) -> Result<Vec<HistoryRecord>> {
        self.get_json(&format!("/comprobantes/{user_id}")).await
    }

    async fn assigned_credit(&self, user_id: i64) -> Result<f64> {
        let credit: AssignedCredit = self.get_json(&format!("/usuarios/user/{user_id}")).await?;
        Ok(credit.amount)
    }

    async fn list_alerts(&self, user_id: i64) -> Result<Vec<AlertRecord>> {
        self.get_json(&format!("/alertas/{user_id}")).await
    }
}

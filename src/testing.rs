//! In-memory backend for screen tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::Backend;
use crate::error::{CreditoError, Result};
use crate::models::{
    AlertRecord, HistoryRecord, Quarter, ReceiptSubmission, Session, SubmitResponse,
};

#[derive(Default)]
pub struct Calls {
    pub login: AtomicUsize,
    pub quarters: AtomicUsize,
    pub submit: AtomicUsize,
    pub history: AtomicUsize,
    pub credit: AtomicUsize,
    pub alerts: AtomicUsize,
}

impl Calls {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// What `submit_receipt` should answer.
#[derive(Clone)]
pub enum SubmitReply {
    Ok(Option<String>),
    ServerError(Option<String>),
    Malformed,
}

pub struct FakeBackend {
    pub calls: Calls,
    pub quarters: Vec<Quarter>,
    pub history: Vec<HistoryRecord>,
    pub alerts: Mutex<Vec<AlertRecord>>,
    pub credit: f64,
    pub submit_reply: Mutex<SubmitReply>,
    pub submissions: Mutex<Vec<ReceiptSubmission>>,
    pub accept_password: String,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            calls: Calls::default(),
            quarters: vec![Quarter {
                id: 3,
                name: "Q1-2025".into(),
            }],
            history: Vec::new(),
            alerts: Mutex::new(Vec::new()),
            credit: 100_000.0,
            submit_reply: Mutex::new(SubmitReply::Ok(Some("Comprobante creado".into()))),
            submissions: Mutex::new(Vec::new()),
            accept_password: "secreto".into(),
        }
    }
}

impl FakeBackend {
    pub fn reply_with(&self, reply: SubmitReply) {
        *self.submit_reply.lock().unwrap() = reply;
    }
}

pub fn alert(id: i64, description: &str) -> AlertRecord {
    AlertRecord {
        id,
        description: description.into(),
        advisor_id: Some(2),
        user_id: Some(1),
        quarter_id: Some(3),
        created_at: "2025-03-14T18:30:00Z".into(),
        advisor_name: "Juan Perez".into(),
    }
}

pub fn session() -> Session {
    Session {
        user_id: 1,
        user_name: "Julia".into(),
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn login(&self, _email: &str, password: &str) -> Result<Session> {
        self.calls.login.fetch_add(1, Ordering::SeqCst);
        if password == self.accept_password {
            Ok(session())
        } else {
            Err(CreditoError::Server {
                status: 401,
                message: None,
            })
        }
    }

    async fn list_quarters(&self) -> Result<Vec<Quarter>> {
        self.calls.quarters.fetch_add(1, Ordering::SeqCst);
        Ok(self.quarters.clone())
    }

    async fn submit_receipt(&self, submission: &ReceiptSubmission) -> Result<SubmitResponse> {
        self.calls.submit.fetch_add(1, Ordering::SeqCst);
        self.submissions.lock().unwrap().push(submission.clone());
        match self.submit_reply.lock().unwrap().clone() {
            SubmitReply::Ok(message) => Ok(SubmitResponse { message }),
            SubmitReply::ServerError(message) => Err(CreditoError::Server {
                status: 500,
                message,
            }),
            SubmitReply::Malformed => Err(CreditoError::MalformedResponse("eof".into())),
        }
    }

    async fn list_history(&self, _user_id: i64) -> Result<Vec<HistoryRecord>> {
        self.calls.history.fetch_add(1, Ordering::SeqCst);
        Ok(self.history.clone())
    }

    async fn assigned_credit(&self, _user_id: i64) -> Result<f64> {
        self.calls.credit.fetch_add(1, Ordering::SeqCst);
        Ok(self.credit)
    }

    async fn list_alerts(&self, _user_id: i64) -> Result<Vec<AlertRecord>> {
        self.calls.alerts.fetch_add(1, Ordering::SeqCst);
        Ok(self.alerts.lock().unwrap().clone())
    }
}

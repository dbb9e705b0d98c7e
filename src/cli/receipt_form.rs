use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tokio::task::AbortHandle;

use crate::advisor::Advisor;
use crate::api::Backend;
use crate::error::Result;
use crate::models::{Quarter, Session, SubmitResponse};
use crate::receipt::{Outcome, ReceiptFlow, Status, MSG_SAVED, RESET_DELAY};
use crate::tasks::TaskScope;
use crate::tui::{
    draw_notice, section_title, Notice, ACCENT_STYLE, ERROR_STYLE, FOOTER_STYLE, OK_STYLE,
};

pub enum ReceiptMsg {
    Quarters(Result<Vec<Quarter>>),
    Submitted(Result<SubmitResponse>),
    /// Reset timer fired; carries the sequence number it was armed with.
    ResetElapsed(u64),
}

#[derive(Debug, PartialEq, Eq)]
pub enum ReceiptAction {
    Continue,
    ShowHistory,
}

const FIELDS: [&str; 5] = [
    "Trimestre *",
    "Cantidad *",
    "Descripción",
    "Comentarios",
    "Documento",
];

pub struct ReceiptScreen {
    backend: Arc<dyn Backend>,
    session: Session,
    advisor: Advisor,
    tasks: TaskScope<ReceiptMsg>,
    flow: ReceiptFlow,
    field: usize,
    notice: Option<Notice>,
    advisor_status: Option<(String, bool)>,
    reset_timer: Option<AbortHandle>,
    reset_seq: u64,
}

impl ReceiptScreen {
    /// Mounting the screen starts the quarter fetch.
    pub fn new(backend: Arc<dyn Backend>, session: Session, advisor: Advisor) -> Self {
        let mut screen = Self {
            backend,
            session,
            advisor,
            tasks: TaskScope::new(),
            flow: ReceiptFlow::new(),
            field: 0,
            notice: None,
            advisor_status: None,
            reset_timer: None,
            reset_seq: 0,
        };
        let backend = screen.backend.clone();
        screen
            .tasks
            .spawn(async move { ReceiptMsg::Quarters(backend.list_quarters().await) });
        screen
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let [form_area, card_area, hints_area] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .areas(area);

        let form = &self.flow.form;
        let values = [
            &form.quarter_name,
            &form.amount,
            &form.description,
            &form.comments,
            &form.document_path,
        ];
        let editable = self.flow.status() == Status::Idle;

        let mut lines = vec![Line::from(""), section_title("Nuevo comprobante"), Line::from("")];
        for (i, (label, value)) in FIELDS.iter().zip(values).enumerate() {
            let focused = editable && i == self.field;
            let cursor = if focused { "_" } else { "" };
            let label_style = if focused {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            lines.push(Line::from(vec![
                Span::styled(format!("   {label:<14}"), label_style),
                Span::styled(format!("{value}{cursor}"), Style::default().fg(Color::Cyan)),
            ]));
        }

        if !self.flow.quarters().is_empty() {
            let names: Vec<&str> = self.flow.quarters().iter().map(|q| q.name.as_str()).collect();
            lines.push(Line::from(Span::styled(
                format!("   Trimestres: {}", names.join(", ")),
                FOOTER_STYLE,
            )));
        }

        lines.push(Line::from(""));
        lines.push(match self.flow.status() {
            Status::Idle => Line::from(Span::styled(
                "   [ Crear Comprobante ]",
                ACCENT_STYLE.add_modifier(Modifier::BOLD),
            )),
            Status::Loading => Line::from(Span::styled(
                "   Enviando...",
                Style::default().fg(Color::Yellow),
            )),
            Status::Success => Line::from(Span::styled(
                format!("   \u{2713} {MSG_SAVED}"),
                OK_STYLE.add_modifier(Modifier::BOLD),
            )),
        });

        frame.render_widget(Paragraph::new(lines), form_area);
        self.draw_advisor(frame, card_area);

        frame.render_widget(
            Paragraph::new(
                " \u{2191}\u{2193}/Tab=campo  Enter=enviar  Ctrl+T=llamar asesor  F2=historial  F3=alertas",
            )
            .style(FOOTER_STYLE),
            hints_area,
        );

        if let Some(notice) = &self.notice {
            draw_notice(frame, area, notice);
        }
    }

    fn draw_advisor(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![
            Line::from(Span::styled(
                format!(" {}", self.advisor.name),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!(" {}", self.advisor.role)),
            Line::from(Span::styled(format!(" {}", self.advisor.phone), ACCENT_STYLE)),
        ];
        if let Some((msg, is_error)) = &self.advisor_status {
            let style = if *is_error { ERROR_STYLE } else { OK_STYLE };
            lines.push(Line::from(Span::styled(format!(" {msg}"), style)));
        }
        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title(" Tu asesor "),
            ),
            area,
        );
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ReceiptAction {
        if self.notice.is_some() {
            self.notice = None;
            return ReceiptAction::Continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('t') {
                self.call_advisor();
            }
            return ReceiptAction::Continue;
        }
        match key.code {
            KeyCode::Up | KeyCode::BackTab => {
                self.field = (self.field + FIELDS.len() - 1) % FIELDS.len();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.field = (self.field + 1) % FIELDS.len();
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Char(c) if self.flow.status() == Status::Idle => {
                self.focused_mut().push(c);
            }
            KeyCode::Backspace if self.flow.status() == Status::Idle => {
                self.focused_mut().pop();
            }
            _ => {}
        }
        ReceiptAction::Continue
    }

    fn focused_mut(&mut self) -> &mut String {
        let form = &mut self.flow.form;
        match self.field {
            0 => &mut form.quarter_name,
            1 => &mut form.amount,
            2 => &mut form.description,
            3 => &mut form.comments,
            _ => &mut form.document_path,
        }
    }

    fn call_advisor(&mut self) {
        self.advisor_status = Some(match self.advisor.call() {
            Ok(()) => (format!("Llamando a {}...", self.advisor.name), false),
            Err(e) => {
                tracing::warn!("could not start call: {e}");
                (e.user_message("No se pudo iniciar la llamada."), true)
            }
        });
    }

    /// Validate and send. Validation failures show a notice and never
    /// reach the network.
    pub fn submit(&mut self) {
        match self.flow.begin_submit(self.session.user_id) {
            Ok(submission) => {
                let backend = self.backend.clone();
                self.tasks.spawn(async move {
                    ReceiptMsg::Submitted(backend.submit_receipt(&submission).await)
                });
            }
            Err(e) => {
                self.notice = Some(Notice::error("Error", e.user_message("")));
            }
        }
    }

    pub fn poll(&mut self) -> ReceiptAction {
        let mut action = ReceiptAction::Continue;
        while let Some(msg) = self.tasks.try_next() {
            if self.handle_message(msg) == ReceiptAction::ShowHistory {
                action = ReceiptAction::ShowHistory;
            }
        }
        action
    }

    pub fn handle_message(&mut self, msg: ReceiptMsg) -> ReceiptAction {
        match msg {
            ReceiptMsg::Quarters(Ok(quarters)) => {
                tracing::debug!("loaded {} quarters", quarters.len());
                self.flow.set_quarters(quarters);
            }
            ReceiptMsg::Quarters(Err(e)) => {
                tracing::error!("failed to load quarters: {e}");
            }
            ReceiptMsg::Submitted(result) => match self.flow.finish(result) {
                Some(Outcome::Saved(_)) => {
                    self.notice = Some(Notice::info("Éxito", MSG_SAVED));
                    self.arm_reset_timer();
                }
                Some(Outcome::Failed(message)) => {
                    self.notice = Some(Notice::error("Error", message));
                }
                None => {}
            },
            ReceiptMsg::ResetElapsed(seq) => {
                if seq == self.reset_seq && self.flow.complete_success() {
                    self.reset_timer = None;
                    self.field = 0;
                    return ReceiptAction::ShowHistory;
                }
            }
        }
        ReceiptAction::Continue
    }

    fn arm_reset_timer(&mut self) {
        if let Some(previous) = self.reset_timer.take() {
            previous.abort();
        }
        self.reset_seq += 1;
        let seq = self.reset_seq;
        self.reset_timer = Some(
            self.tasks
                .schedule(RESET_DELAY, ReceiptMsg::ResetElapsed(seq)),
        );
    }
}

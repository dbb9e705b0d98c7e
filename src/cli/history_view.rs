use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{LineGauge, Paragraph},
    Frame,
};

use crate::api::Backend;
use crate::error::Result;
use crate::history::{build_rows, HistoryRow};
use crate::models::{HistoryRecord, Session};
use crate::tasks::TaskScope;
use crate::tui::{money_span, section_title, ERROR_STYLE, FOOTER_STYLE, SELECTED_STYLE};

pub enum HistoryMsg {
    Records(Result<Vec<HistoryRecord>>),
    Credit(Result<f64>),
}

#[derive(Debug, PartialEq, Eq)]
pub enum HistoryAction {
    Continue,
    Logout,
    Quit,
}

/// Rows per record: title, description, amounts, bar.
const ROW_HEIGHT: u16 = 4;

pub struct HistoryScreen {
    backend: Arc<dyn Backend>,
    session: Session,
    tasks: TaskScope<HistoryMsg>,
    rows: Vec<HistoryRow>,
    credit: Option<f64>,
    loading: bool,
    error: Option<String>,
    selection: usize,
}

impl HistoryScreen {
    pub fn new(backend: Arc<dyn Backend>, session: Session) -> Self {
        Self {
            backend,
            session,
            tasks: TaskScope::new(),
            rows: Vec::new(),
            credit: None,
            loading: false,
            error: None,
            selection: 0,
        }
    }

    /// Called every time the screen gains focus: refetch receipts and the
    /// assigned credit.
    pub fn focus(&mut self) {
        self.tasks.cancel_all();
        self.loading = true;
        self.error = None;
        let user_id = self.session.user_id;

        let backend = self.backend.clone();
        self.tasks
            .spawn(async move { HistoryMsg::Records(backend.list_history(user_id).await) });
        let backend = self.backend.clone();
        self.tasks
            .spawn(async move { HistoryMsg::Credit(backend.assigned_credit(user_id).await) });
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let [credit_area, list_area, hints_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        let credit = match self.credit {
            Some(amount) => money_span(amount),
            None => Span::styled("Cargando...", Style::default().fg(Color::Yellow)),
        };
        frame.render_widget(
            Paragraph::new(vec![
                Line::from(""),
                Line::from(vec![
                    Span::styled(" Crédito Asignado: ", Style::default().add_modifier(Modifier::BOLD)),
                    credit,
                ]),
            ]),
            credit_area,
        );

        self.draw_list(frame, list_area);

        frame.render_widget(
            Paragraph::new(" \u{2191}\u{2193}=mover  r=actualizar  l=cerrar sesión  F1=inicio  q=salir")
                .style(FOOTER_STYLE),
            hints_area,
        );
    }

    fn draw_list(&self, frame: &mut Frame, area: Rect) {
        let [title_area, body] =
            Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(area);
        frame.render_widget(Paragraph::new(section_title("Historial")), title_area);

        if self.rows.is_empty() {
            let text = if self.loading {
                Span::styled("   Cargando historial...", Style::default().fg(Color::Yellow))
            } else if let Some(err) = &self.error {
                Span::styled(format!("   {err}"), ERROR_STYLE)
            } else {
                Span::styled("   No hay comprobantes disponibles.", FOOTER_STYLE)
            };
            frame.render_widget(Paragraph::new(Line::from(text)), body);
            return;
        }

        let visible = (body.height / ROW_HEIGHT).max(1) as usize;
        let offset = self.selection.saturating_sub(visible - 1);

        for (slot, (i, row)) in self.rows.iter().enumerate().skip(offset).take(visible).enumerate() {
            let y = body.y + slot as u16 * ROW_HEIGHT;
            let cell = Rect::new(body.x, y, body.width, ROW_HEIGHT.min(body.bottom() - y));
            let [title, desc, amounts, bar] =
                Layout::vertical([Constraint::Length(1); 4]).areas(cell);

            let title_style = if i == self.selection {
                SELECTED_STYLE
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            frame.render_widget(
                Paragraph::new(format!("   Trimestre {}", row.quarter_name)).style(title_style),
                title,
            );
            frame.render_widget(
                Paragraph::new(format!("   {}", row.description)).style(FOOTER_STYLE),
                desc,
            );
            frame.render_widget(
                Paragraph::new(format!("   {}  /  {}", row.spent_label(), row.total_label())),
                amounts,
            );

            let gauge = LineGauge::default()
                .label(format!("   {}", row.percentage_label()))
                .ratio(row.bar_ratio())
                .filled_style(Style::default().fg(Color::Rgb(185, 58, 156)).bold())
                .unfilled_style(Style::default().fg(Color::DarkGray))
                .line_set(ratatui::symbols::line::THICK);
            frame.render_widget(gauge, bar);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> HistoryAction {
        match key.code {
            KeyCode::Char('q') => return HistoryAction::Quit,
            KeyCode::Char('l') => return HistoryAction::Logout,
            KeyCode::Char('r') => self.focus(),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selection = self.selection.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selection + 1 < self.rows.len() {
                    self.selection += 1;
                }
            }
            _ => {}
        }
        HistoryAction::Continue
    }

    pub fn poll(&mut self) {
        while let Some(msg) = self.tasks.try_next() {
            self.handle_message(msg);
        }
    }

    pub fn handle_message(&mut self, msg: HistoryMsg) {
        match msg {
            HistoryMsg::Records(Ok(records)) => {
                self.loading = false;
                self.rows = build_rows(&records);
                self.selection = self.selection.min(self.rows.len().saturating_sub(1));
            }
            HistoryMsg::Records(Err(e)) => {
                self.loading = false;
                tracing::error!("failed to load history: {e}");
                self.error = Some(e.user_message("No se pudo cargar el historial."));
            }
            HistoryMsg::Credit(Ok(amount)) => self.credit = Some(amount),
            HistoryMsg::Credit(Err(e)) => {
                tracing::error!("failed to load assigned credit: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{session, Calls, FakeBackend};

    fn record(id: i64, amount_spent: f64) -> HistoryRecord {
        HistoryRecord {
            id,
            quarter_id: 3,
            quarter_name: "Q1-2025".into(),
            description: "Insumos".into(),
            total_assigned_credit: 100_000.0,
            amount_spent,
            percentage: 99.0,
        }
    }

    async fn settle(screen: &mut HistoryScreen, messages: usize) {
        for _ in 0..messages {
            let msg = screen.tasks.next().await.unwrap();
            screen.handle_message(msg);
        }
    }

    #[tokio::test]
    async fn test_assigned_credit_shows_whole_pesos() {
        let mut backend = FakeBackend::default();
        backend.credit = 120_000.0;
        let mut screen = HistoryScreen::new(Arc::new(backend), session());
        screen.focus();
        settle(&mut screen, 2).await;

        let mut terminal =
            ratatui::Terminal::new(ratatui::backend::TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| screen.draw(f, f.area())).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Crédito Asignado: $120,000"));
        assert!(!text.contains("$120,000.00"));
    }

    #[tokio::test]
    async fn test_focus_loads_rows_and_credit() {
        let mut backend = FakeBackend::default();
        backend.history = vec![record(1, 25_000.0), record(2, 5_000.0)];
        backend.credit = 250_000.0;
        let backend = Arc::new(backend);
        let mut screen = HistoryScreen::new(backend.clone(), session());
        assert!(screen.rows.is_empty());
        assert_eq!(screen.credit, None);

        screen.focus();
        settle(&mut screen, 2).await;
        assert_eq!(screen.rows.len(), 2);
        assert_eq!(screen.rows[0].percentage_label(), "25.00%");
        assert_eq!(screen.credit, Some(250_000.0));
    }

    #[tokio::test]
    async fn test_every_focus_refetches() {
        let backend = Arc::new(FakeBackend::default());
        let mut screen = HistoryScreen::new(backend.clone(), session());
        screen.focus();
        settle(&mut screen, 2).await;
        screen.focus();
        settle(&mut screen, 2).await;
        assert_eq!(Calls::get(&backend.calls.history), 2);
        assert_eq!(Calls::get(&backend.calls.credit), 2);
    }

    #[tokio::test]
    async fn test_keys_map_to_actions() {
        let backend = Arc::new(FakeBackend::default());
        let mut screen = HistoryScreen::new(backend.clone(), session());
        let press = |c| KeyEvent::from(KeyCode::Char(c));
        assert_eq!(screen.handle_key(press('l')), HistoryAction::Logout);
        assert_eq!(screen.handle_key(press('q')), HistoryAction::Quit);
        assert_eq!(screen.handle_key(press('r')), HistoryAction::Continue);
        settle(&mut screen, 2).await;
        assert_eq!(Calls::get(&backend.calls.history), 1);
    }
}

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::api::Backend;
use crate::error::Result;
use crate::fmt::timestamp;
use crate::models::{AlertRecord, Session};
use crate::tasks::TaskScope;
use crate::tui::{section_title, wrap_text, ACCENT_STYLE, ERROR_STYLE, FOOTER_STYLE};

pub enum AlertsMsg {
    Alerts(Result<Vec<AlertRecord>>),
}

#[derive(Debug, PartialEq, Eq)]
pub enum AlertsAction {
    Continue,
    Logout,
    Quit,
}

pub struct AlertsScreen {
    backend: Arc<dyn Backend>,
    session: Session,
    tasks: TaskScope<AlertsMsg>,
    alerts: Vec<AlertRecord>,
    loading: bool,
    error: Option<String>,
    scroll: u16,
}

impl AlertsScreen {
    pub fn new(backend: Arc<dyn Backend>, session: Session) -> Self {
        Self {
            backend,
            session,
            tasks: TaskScope::new(),
            alerts: Vec::new(),
            loading: false,
            error: None,
            scroll: 0,
        }
    }

    /// Refetch on every focus, not just the first.
    pub fn focus(&mut self) {
        self.tasks.cancel_all();
        self.loading = true;
        self.error = None;
        let backend = self.backend.clone();
        let user_id = self.session.user_id;
        self.tasks
            .spawn(async move { AlertsMsg::Alerts(backend.list_alerts(user_id).await) });
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let [title_area, body, hints_area] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(vec![Line::from(""), section_title("Notificaciones")]),
            title_area,
        );

        let mut lines: Vec<Line> = vec![Line::from("")];
        if self.alerts.is_empty() {
            lines.push(if self.loading {
                Line::from(Span::styled("   Cargando...", Style::default().fg(Color::Yellow)))
            } else if let Some(err) = &self.error {
                Line::from(Span::styled(format!("   {err}"), ERROR_STYLE))
            } else {
                Line::from(Span::styled("   No hay alertas disponibles.", FOOTER_STYLE))
            });
        }

        let width = body.width.saturating_sub(6) as usize;
        for alert in &self.alerts {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("   ID Alerta: {}", alert.id),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  {}", alert.advisor_name), ACCENT_STYLE),
                Span::styled(format!("  {}", timestamp(&alert.created_at)), FOOTER_STYLE),
            ]));
            let (wrapped, _) = wrap_text(&alert.description, width);
            for part in wrapped.lines() {
                lines.push(Line::from(Span::styled(format!("     {part}"), ACCENT_STYLE)));
            }
            lines.push(Line::from(""));
        }

        frame.render_widget(Paragraph::new(lines).scroll((self.scroll, 0)), body);
        frame.render_widget(
            Paragraph::new(" \u{2191}\u{2193}=desplazar  r=actualizar  l=cerrar sesión  F1=inicio  q=salir")
                .style(FOOTER_STYLE),
            hints_area,
        );
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> AlertsAction {
        match key.code {
            KeyCode::Char('q') => return AlertsAction::Quit,
            KeyCode::Char('l') => return AlertsAction::Logout,
            KeyCode::Char('r') => self.focus(),
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll = self.scroll.saturating_add(1),
            _ => {}
        }
        AlertsAction::Continue
    }

    pub fn poll(&mut self) {
        while let Some(msg) = self.tasks.try_next() {
            self.handle_message(msg);
        }
    }

    pub fn handle_message(&mut self, msg: AlertsMsg) {
        self.loading = false;
        match msg {
            AlertsMsg::Alerts(Ok(alerts)) => {
                tracing::debug!("loaded {} alerts", alerts.len());
                self.alerts = alerts;
            }
            AlertsMsg::Alerts(Err(e)) => {
                tracing::error!("failed to load alerts: {e}");
                self.error = Some(e.user_message("No se pudieron cargar las alertas."));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{alert, session, Calls, FakeBackend};

    fn render(screen: &AlertsScreen) -> String {
        let mut terminal = ratatui::Terminal::new(ratatui::backend::TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| screen.draw(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[tokio::test]
    async fn test_alert_card_shows_id() {
        let backend = Arc::new(FakeBackend::default());
        backend.alerts.lock().unwrap().push(alert(11, "Revisa tu comprobante"));
        let mut screen = AlertsScreen::new(backend, session());
        screen.focus();
        let msg = screen.tasks.next().await.unwrap();
        screen.handle_message(msg);

        let text = render(&screen);
        assert!(text.contains("ID Alerta: 11"));
        assert!(text.contains("Juan Perez"));
        assert!(text.contains("2025-03-14 18:30"));
    }

    #[tokio::test]
    async fn test_two_focus_cycles_fetch_twice() {
        let backend = Arc::new(FakeBackend::default());
        backend.alerts.lock().unwrap().push(alert(1, "Revisa tu comprobante"));
        let mut screen = AlertsScreen::new(backend.clone(), session());

        screen.focus();
        let msg = screen.tasks.next().await.unwrap();
        screen.handle_message(msg);
        assert_eq!(screen.alerts.len(), 1);

        backend.alerts.lock().unwrap().push(alert(2, "Nuevo trimestre abierto"));
        screen.focus();
        let msg = screen.tasks.next().await.unwrap();
        screen.handle_message(msg);

        assert_eq!(Calls::get(&backend.calls.alerts), 2);
        assert_eq!(screen.alerts.len(), 2);
        assert_eq!(screen.alerts[1].description, "Nuevo trimestre abierto");
    }

    #[tokio::test]
    async fn test_empty_list_is_not_an_error() {
        let backend = Arc::new(FakeBackend::default());
        let mut screen = AlertsScreen::new(backend, session());
        screen.focus();
        let msg = screen.tasks.next().await.unwrap();
        screen.handle_message(msg);
        assert!(screen.alerts.is_empty());
        assert!(screen.error.is_none());
        assert!(!screen.loading);
    }
}

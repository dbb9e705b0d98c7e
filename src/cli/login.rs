use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use zeroize::Zeroize;

use crate::api::Backend;
use crate::error::{CreditoError, Result};
use crate::models::Session;
use crate::tasks::TaskScope;
use crate::tui::{separator, ERROR_STYLE, FOOTER_STYLE, HEADER_STYLE};

pub const MSG_BAD_CREDENTIALS: &str = "Correo o contraseña incorrectos";
pub const MSG_UNREACHABLE: &str = "Error al conectar con el servidor.";

/// Message shown for a failed login attempt.
pub fn login_failure_message(err: &CreditoError) -> String {
    match err {
        CreditoError::Server { .. } => err.user_message(MSG_BAD_CREDENTIALS),
        _ => err.user_message(MSG_UNREACHABLE),
    }
}

pub enum LoginMsg {
    Finished(Result<Session>),
}

#[derive(Debug, PartialEq)]
pub enum LoginAction {
    Continue,
    LoggedIn(Session),
}

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Email,
    Password,
}

pub struct LoginScreen {
    backend: Arc<dyn Backend>,
    tasks: TaskScope<LoginMsg>,
    email: String,
    password: String,
    field: Field,
    busy: bool,
    error: Option<String>,
}

impl LoginScreen {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            tasks: TaskScope::new(),
            email: String::new(),
            password: String::new(),
            field: Field::Email,
            busy: false,
            error: None,
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let [header_area, sep, content_area, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(" Ban Bajío · Microcrédito").style(HEADER_STYLE),
            header_area,
        );
        frame.render_widget(separator(area.width), sep);

        let input = |label: &str, value: String, field: Field| {
            let focused = self.field == field && !self.busy;
            let cursor = if focused { "_" } else { "" };
            let label_style = if focused {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Line::from(vec![
                Span::styled(format!("   {label:<12}"), label_style),
                Span::styled(format!("{value}{cursor}"), Style::default().fg(Color::Cyan)),
            ])
        };

        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                " Iniciar sesión",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            input("Correo", self.email.clone(), Field::Email),
            Line::from(""),
            input(
                "Contraseña",
                "*".repeat(self.password.chars().count()),
                Field::Password,
            ),
            Line::from(""),
        ];

        if self.busy {
            lines.push(Line::from(Span::styled(
                "   Cargando...",
                Style::default().fg(Color::Yellow),
            )));
        } else if let Some(err) = &self.error {
            lines.push(Line::from(Span::styled(format!("   {err}"), ERROR_STYLE)));
        }

        frame.render_widget(Paragraph::new(lines), content_area);
        frame.render_widget(
            Paragraph::new(" Tab=cambiar campo  Enter=ingresar  Ctrl+C=salir").style(FOOTER_STYLE),
            hints_area,
        );
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> LoginAction {
        if self.busy {
            return LoginAction::Continue;
        }
        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.field = match self.field {
                    Field::Email => Field::Password,
                    Field::Password => Field::Email,
                };
            }
            KeyCode::Char(c) => {
                self.focused_mut().push(c);
                self.error = None;
            }
            KeyCode::Backspace => {
                self.focused_mut().pop();
                self.error = None;
            }
            KeyCode::Enter => {
                if self.field == Field::Email {
                    self.field = Field::Password;
                } else {
                    self.submit();
                }
            }
            _ => {}
        }
        LoginAction::Continue
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.field {
            Field::Email => &mut self.email,
            Field::Password => &mut self.password,
        }
    }

    /// Send the credentials. Ignored while a previous attempt is in flight.
    pub fn submit(&mut self) {
        if self.busy {
            return;
        }
        self.busy = true;
        self.error = None;
        let backend = self.backend.clone();
        let email = self.email.trim().to_string();
        let mut password = self.password.clone();
        self.tasks.spawn(async move {
            let result = backend.login(&email, &password).await;
            password.zeroize();
            LoginMsg::Finished(result)
        });
    }

    pub fn poll(&mut self) -> LoginAction {
        while let Some(msg) = self.tasks.try_next() {
            if let LoginAction::LoggedIn(session) = self.handle_message(msg) {
                return LoginAction::LoggedIn(session);
            }
        }
        LoginAction::Continue
    }

    pub fn handle_message(&mut self, msg: LoginMsg) -> LoginAction {
        let LoginMsg::Finished(result) = msg;
        self.busy = false;
        match result {
            Ok(session) => {
                tracing::info!("logged in as user {}", session.user_id);
                self.password.zeroize();
                LoginAction::LoggedIn(session)
            }
            Err(e) => {
                tracing::warn!("login failed: {e}");
                self.error = Some(login_failure_message(&e));
                LoginAction::Continue
            }
        }
    }
}

impl Drop for LoginScreen {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

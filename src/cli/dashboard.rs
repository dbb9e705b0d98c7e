use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::advisor::Advisor;
use crate::api::{ApiClient, Backend};
use crate::cli::alerts_view::{AlertsAction, AlertsScreen};
use crate::cli::history_view::{HistoryAction, HistoryScreen};
use crate::cli::login::{LoginAction, LoginScreen};
use crate::cli::receipt_form::{ReceiptAction, ReceiptScreen};
use crate::error::Result;
use crate::models::Session;
use crate::session::SessionStore;
use crate::settings::load_settings;
use crate::tui::{
    draw_confirm, install_panic_hook, separator, FOOTER_STYLE, HEADER_STYLE, OK_STYLE,
    SELECTED_STYLE,
};

const TICK: Duration = Duration::from_millis(100);

pub const MSG_CONFIRM_LOGOUT: &str = "¿Estás seguro que deseas cerrar sesión?";
pub const MSG_LOGGED_IN: &str = "Inicio de sesión exitoso";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Receipt,
    History,
    Alerts,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Receipt, Tab::History, Tab::Alerts];

    fn label(self) -> &'static str {
        match self {
            Tab::Receipt => "F1 Inicio",
            Tab::History => "F2 Historial",
            Tab::Alerts => "F3 Notificaciones",
        }
    }
}

/// The three logged-in screens. Dropping this tears all of them down.
pub struct MainTabs {
    session: Session,
    tab: Tab,
    receipt: ReceiptScreen,
    history: HistoryScreen,
    alerts: AlertsScreen,
    confirm_logout: bool,
}

impl MainTabs {
    fn new(backend: Arc<dyn Backend>, session: Session, advisor: Advisor) -> Self {
        Self {
            receipt: ReceiptScreen::new(backend.clone(), session.clone(), advisor),
            history: HistoryScreen::new(backend.clone(), session.clone()),
            alerts: AlertsScreen::new(backend, session.clone()),
            session,
            tab: Tab::Receipt,
            confirm_logout: false,
        }
    }

    /// Switch tabs. History and alerts refetch on every focus.
    pub fn select(&mut self, tab: Tab) {
        if self.tab == tab {
            return;
        }
        self.tab = tab;
        match tab {
            Tab::Receipt => {}
            Tab::History => self.history.focus(),
            Tab::Alerts => self.alerts.focus(),
        }
    }
}

pub enum Route {
    Login(LoginScreen),
    Main(Box<MainTabs>),
}

pub struct Dashboard {
    backend: Arc<dyn Backend>,
    store: SessionStore,
    advisor: Advisor,
    route: Route,
    flash: Option<String>,
    quit: bool,
}

impl Dashboard {
    /// Resume a saved session if there is one, otherwise start at login.
    pub fn new(backend: Arc<dyn Backend>, store: SessionStore, advisor: Advisor) -> Self {
        let route = match store.load() {
            Some(session) => {
                tracing::info!("resuming session for user {}", session.user_id);
                Route::Main(Box::new(MainTabs::new(backend.clone(), session, advisor.clone())))
            }
            None => Route::Login(LoginScreen::new(backend.clone())),
        };
        Self {
            backend,
            store,
            advisor,
            route,
            flash: None,
            quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        match &self.route {
            Route::Login(login) => login.draw(frame, area),
            Route::Main(main) => self.draw_main(frame, area, main),
        }
    }

    fn draw_main(&self, frame: &mut Frame, area: Rect, main: &MainTabs) {
        let [header_area, tabs_area, sep, content_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(area);

        let mut header = vec![Span::styled(
            format!(" Hola, {}!", main.session.user_name),
            HEADER_STYLE,
        )];
        if let Some(flash) = &self.flash {
            header.push(Span::styled(format!("   {flash}"), OK_STYLE));
        }
        frame.render_widget(Paragraph::new(Line::from(header)), header_area);

        let mut tabs = vec![Span::raw(" ")];
        for tab in Tab::ALL {
            let style = if tab == main.tab {
                SELECTED_STYLE
            } else {
                Style::default().fg(Color::DarkGray)
            };
            tabs.push(Span::styled(format!(" {} ", tab.label()), style));
            tabs.push(Span::raw(" "));
        }
        tabs.push(Span::styled("  Ctrl+C=salir", FOOTER_STYLE));
        frame.render_widget(Paragraph::new(Line::from(tabs)), tabs_area);
        frame.render_widget(separator(area.width), sep);

        match main.tab {
            Tab::Receipt => main.receipt.draw(frame, content_area),
            Tab::History => main.history.draw(frame, content_area),
            Tab::Alerts => main.alerts.draw(frame, content_area),
        }

        if main.confirm_logout {
            draw_confirm(frame, area, "Cerrar sesión", MSG_CONFIRM_LOGOUT);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit = true;
            return;
        }
        if key.code == KeyCode::F(10) {
            self.quit = true;
            return;
        }
        self.flash = None;

        let mut logout = false;
        match &mut self.route {
            Route::Login(login) => {
                if let LoginAction::LoggedIn(session) = login.handle_key(key) {
                    self.enter_main(session);
                }
            }
            Route::Main(main) => {
                if main.confirm_logout {
                    match key.code {
                        KeyCode::Char('y') | KeyCode::Char('s') | KeyCode::Enter => logout = true,
                        KeyCode::Char('n') | KeyCode::Esc => main.confirm_logout = false,
                        _ => {}
                    }
                } else {
                    match key.code {
                        KeyCode::F(1) => main.select(Tab::Receipt),
                        KeyCode::F(2) => main.select(Tab::History),
                        KeyCode::F(3) => main.select(Tab::Alerts),
                        _ => match main.tab {
                            Tab::Receipt => {
                                if main.receipt.handle_key(key) == ReceiptAction::ShowHistory {
                                    main.select(Tab::History);
                                }
                            }
                            Tab::History => match main.history.handle_key(key) {
                                HistoryAction::Logout => main.confirm_logout = true,
                                HistoryAction::Quit => self.quit = true,
                                HistoryAction::Continue => {}
                            },
                            Tab::Alerts => match main.alerts.handle_key(key) {
                                AlertsAction::Logout => main.confirm_logout = true,
                                AlertsAction::Quit => self.quit = true,
                                AlertsAction::Continue => {}
                            },
                        },
                    }
                }
            }
        }
        if logout {
            self.logout();
        }
    }

    /// Drain every mounted screen's messages.
    pub fn tick(&mut self) {
        match &mut self.route {
            Route::Login(login) => {
                if let LoginAction::LoggedIn(session) = login.poll() {
                    self.enter_main(session);
                }
            }
            Route::Main(main) => {
                // The reset timer navigates even if the user moved to another tab.
                if main.receipt.poll() == ReceiptAction::ShowHistory {
                    main.select(Tab::History);
                }
                main.history.poll();
                main.alerts.poll();
            }
        }
    }

    fn enter_main(&mut self, session: Session) {
        if let Err(e) = self.store.save(&session) {
            tracing::error!("could not persist session: {e}");
        }
        self.flash = Some(MSG_LOGGED_IN.to_string());
        self.route = Route::Main(Box::new(MainTabs::new(
            self.backend.clone(),
            session,
            self.advisor.clone(),
        )));
    }

    /// Clear the stored session and go back to login. Replacing the route
    /// drops every main screen along with its pending tasks.
    fn logout(&mut self) {
        if let Err(e) = self.store.clear() {
            tracing::error!("could not clear session: {e}");
        }
        tracing::info!("logged out");
        self.route = Route::Login(LoginScreen::new(self.backend.clone()));
    }
}

pub async fn run() -> Result<()> {
    let settings = load_settings();
    let client = ApiClient::from_settings(&settings)?;
    tracing::info!("starting TUI against {}", client.base_url());
    let backend: Arc<dyn Backend> = Arc::new(client);
    let mut dashboard = Dashboard::new(backend, SessionStore::default_location(), settings.advisor);

    install_panic_hook();
    let mut terminal = ratatui::init();

    let exit: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| dashboard.draw(frame)) {
            break Err(e.into());
        }

        match tokio::task::block_in_place(|| event::poll(TICK)) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => dashboard.handle_key(key),
                Ok(_) => {}
                Err(e) => break Err(e.into()),
            },
            Ok(false) => {}
            Err(e) => break Err(e.into()),
        }

        dashboard.tick();
        if dashboard.should_quit() {
            break Ok(());
        }
    };

    drop(terminal);
    ratatui::restore();
    exit
}

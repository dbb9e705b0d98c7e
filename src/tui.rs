use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::fmt::money;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Rgb(185, 58, 156))
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const ACCENT_STYLE: Style = Style::new().fg(Color::Rgb(122, 62, 157));

pub const ERROR_STYLE: Style = Style::new().fg(Color::Red);

pub const OK_STYLE: Style = Style::new().fg(Color::Rgb(80, 220, 100));

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

pub fn money_span(amount: f64) -> Span<'static> {
    Span::styled(money(amount), ACCENT_STYLE.add_modifier(Modifier::BOLD))
}

/// Wrap text to a given width. Returns (wrapped_string, line_count).
pub fn wrap_text(text: &str, width: usize) -> (String, u16) {
    if width == 0 {
        return (text.to_string(), 1);
    }
    let wrapped = textwrap::fill(text, width);
    let lines = wrapped.lines().count().max(1) as u16;
    (wrapped, lines)
}

pub fn separator(width: u16) -> Paragraph<'static> {
    Paragraph::new("\u{2501}".repeat(width as usize)).style(Style::default().fg(Color::DarkGray))
}

pub fn section_title(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!(" {title}"),
        Style::default().add_modifier(Modifier::BOLD),
    ))
}

/// Blocking dialog: stays up until any key is pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
    pub is_error: bool,
}

impl Notice {
    pub fn info(title: &str, body: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            body: body.into(),
            is_error: false,
        }
    }

    pub fn error(title: &str, body: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            body: body.into(),
            is_error: true,
        }
    }
}

pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}

pub fn draw_notice(frame: &mut Frame, area: Rect, notice: &Notice) {
    let width = 50.min(area.width);
    let (body, lines) = wrap_text(&notice.body, width.saturating_sub(4) as usize);
    let popup = centered_rect(area, width, lines + 4);
    let border = if notice.is_error { ERROR_STYLE } else { OK_STYLE };

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(body),
            Line::from(""),
            Line::from(Span::styled("Enter=aceptar", FOOTER_STYLE)),
        ])
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(format!(" {} ", notice.title)),
        ),
        popup,
    );
}

/// Yes/no dialog.
pub fn draw_confirm(frame: &mut Frame, area: Rect, title: &str, question: &str) {
    let popup = centered_rect(area, 50, 5);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(question.to_string()),
            Line::from(""),
            Line::from(Span::styled("y=sí  n/Esc=cancelar", FOOTER_STYLE)),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(ACCENT_STYLE)
                .title(format!(" {title} ")),
        ),
        popup,
    );
}

/// Restore the terminal before the default panic output.
pub fn install_panic_hook() {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));
}

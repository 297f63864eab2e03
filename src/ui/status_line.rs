use crate::app::{AppMode, AppState, InputPurpose};
use crate::ui::constants::{prompt, CURSOR_INDICATOR};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

pub struct StatusLineRenderer;

impl StatusLineRenderer {
    pub fn render(frame: &mut Frame, app: &AppState, area: Rect) {
        let (content, style) = Self::content_and_style(app, area.width);
        frame.render_widget(Paragraph::new(content).style(style), area);
    }

    pub fn content_and_style(app: &AppState, width: u16) -> (String, Style) {
        match &app.mode {
            AppMode::Input { purpose, buffer } => Self::render_input(*purpose, buffer, width),
            AppMode::Help => (
                String::from("Press ESC or q to close help"),
                Style::default().fg(Color::Black).bg(Color::Cyan),
            ),
            AppMode::Normal => Self::render_normal(app),
        }
    }

    fn render_normal(app: &AppState) -> (String, Style) {
        match &app.message {
            Some(msg) if msg.is_error => (
                msg.text.clone(),
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            ),
            Some(msg) => (
                msg.text.clone(),
                Style::default().fg(Color::Black).bg(Color::Green),
            ),
            None => {
                let busy = if app.is_busy() { " | working..." } else { "" };
                (
                    format!("Press ? for help{busy}"),
                    Style::default().fg(Color::Gray).bg(Color::Black),
                )
            }
        }
    }

    fn render_input(purpose: InputPurpose, buffer: &str, width: u16) -> (String, Style) {
        let prefix = match purpose {
            InputPurpose::Insert => prompt::INSERT,
            InputPurpose::Delete => prompt::DELETE,
            InputPurpose::Degree => prompt::DEGREE,
        };

        // Keep the tail of a long entry visible.
        let available = usize::from(width).saturating_sub(prefix.width() + 1);
        let mut visible = buffer;
        while visible.width() > available {
            let mut chars = visible.chars();
            chars.next();
            visible = chars.as_str();
        }

        let content = format!("{prefix}{visible}{CURSOR_INDICATOR}");
        let style = Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        (content, style)
    }
}

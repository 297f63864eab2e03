use crate::app::{AppMode, AppState};
use crate::ui::canvas::SceneCanvas;
use crate::ui::constants::MIRROR_TITLE;
use crate::ui::help::HelpRenderer;
use crate::ui::status_line::StatusLineRenderer;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub mod canvas;
pub mod connections;
pub mod constants;
pub mod help;
pub mod nodes;
pub mod render;
pub mod status_line;
pub mod surface;

#[cfg(test)]
mod tests;

struct Areas {
    header: Rect,
    canvas: Rect,
    info: Rect,
    traversal: Rect,
    status: Rect,
}

fn split(area: Rect) -> Areas {
    let [header, canvas, info, traversal, status] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    Areas {
        header,
        canvas,
        info,
        traversal,
        status,
    }
}

fn canvas_block(app: &AppState) -> Block<'static> {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", app.view.tree_type));
    if app.is_mirrored() {
        block
            .border_style(Style::default().fg(Color::Magenta))
            .title_bottom(MIRROR_TITLE)
    } else {
        block
    }
}

/// Inner canvas area for a frame of the given size. The main loop measures
/// with this before drawing so a resize relays the scene in the same frame.
pub fn canvas_area(frame_area: Rect) -> Rect {
    Block::default()
        .borders(Borders::ALL)
        .inner(split(frame_area).canvas)
}

pub fn render(frame: &mut Frame, app: &mut AppState) {
    let areas = split(frame.area());

    render_header(frame, app, areas.header);
    frame.render_widget(
        SceneCanvas::new(&app.scene, app.viewport).block(canvas_block(app)),
        areas.canvas,
    );

    let dim = Style::default().fg(Color::DarkGray);
    let info = match &app.info_line {
        Some(line) => Paragraph::new(line.as_str()),
        None => Paragraph::new("No tree info yet (n)").style(dim),
    };
    frame.render_widget(info, areas.info);

    let traversal = match &app.traversal_line {
        Some(line) => Paragraph::new(line.as_str()),
        None => Paragraph::new("Traversals: 1-4").style(dim),
    };
    frame.render_widget(traversal, areas.traversal);

    if app.mode == AppMode::Help {
        HelpRenderer::render(frame, areas.canvas);
    }

    StatusLineRenderer::render(frame, app, areas.status);
}

fn render_header(frame: &mut Frame, app: &AppState, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut spans = vec![
        Span::styled("treescope", bold),
        Span::raw(format!(" | {} | {}", app.view.tree_type, app.config.server_url)),
    ];
    if app.is_mirrored() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            "MIRROR",
            bold.fg(Color::Black).bg(Color::Magenta),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

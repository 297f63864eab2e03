use crate::app::{AppMode, AppState, MirrorMode};
use crate::config::AppConfig;
use crate::model::{BinaryNode, Snapshot};
use crate::ui::canvas::logical_size;
use crate::ui::{canvas_area, render};
use ratatui::{backend::TestBackend, buffer::Buffer, layout::Rect, Terminal};

fn buffer_lines(buf: &Buffer) -> Vec<String> {
    (0..buf.area.height)
        .map(|y| {
            (0..buf.area.width)
                .map(|x| buf[(x, y)].symbol().to_string())
                .collect()
        })
        .collect()
}

fn draw(app: &mut AppState, width: u16, height: u16) -> Vec<String> {
    let canvas = canvas_area(Rect::new(0, 0, width, height));
    app.surface_changed(logical_size(canvas, app.config.cell_size()));

    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|frame| render(frame, app)).unwrap();
    buffer_lines(terminal.backend().buffer())
}

#[test]
fn test_canvas_area_leaves_room_for_chrome() {
    // Header, border top, border bottom and three lines below.
    assert_eq!(canvas_area(Rect::new(0, 0, 80, 24)), Rect::new(1, 2, 78, 18));
}

#[test]
fn test_empty_tree_placeholder_is_shown() {
    let mut app = AppState::new(AppConfig::default());
    let lines = draw(&mut app, 80, 24);

    assert!(lines[0].starts_with("treescope | ABB | http://127.0.0.1:5000"));
    assert!(lines.iter().any(|l| l.contains("Empty tree")));
    assert!(lines[23].starts_with("Press ? for help"));
}

#[test]
fn test_tree_values_are_drawn() {
    let mut app = AppState::new(AppConfig::default());
    app.view.snapshot = Some(Snapshot::Binary(
        BinaryNode::leaf(50)
            .with_left(BinaryNode::leaf(30))
            .with_right(BinaryNode::leaf(70)),
    ));
    let lines = draw(&mut app, 100, 30);

    for label in ["50", "30", "70"] {
        assert!(
            lines[1..26].iter().any(|l| l.contains(label)),
            "label {label} missing"
        );
    }
    assert!(!lines.iter().any(|l| l.contains("Empty tree")));
}

#[test]
fn test_mirror_chrome() {
    let mut app = AppState::new(AppConfig::default());
    app.view.mirror = MirrorMode::Mirrored;
    let lines = draw(&mut app, 80, 24);

    assert!(lines[0].contains("MIRROR"));
    assert!(lines.iter().any(|l| l.contains(" mirror ")));
}

#[test]
fn test_help_overlay() {
    let mut app = AppState::new(AppConfig::default());
    app.mode = AppMode::Help;
    let lines = draw(&mut app, 80, 40);

    assert!(lines.iter().any(|l| l.contains("Toggle mirror view")));
    assert!(lines[39].starts_with("Press ESC or q to close help"));
}

#[test]
fn test_info_and_traversal_lines() {
    let mut app = AppState::new(AppConfig::default());
    app.info_line = Some("ABB | Altura: 2 | Nodos: 3 | Valores: 3".into());
    app.traversal_line = Some("inorden: [30, 50, 70]".into());
    let lines = draw(&mut app, 80, 24);

    assert!(lines[21].starts_with("ABB | Altura: 2 | Nodos: 3 | Valores: 3"));
    assert!(lines[22].starts_with("inorden: [30, 50, 70]"));
}

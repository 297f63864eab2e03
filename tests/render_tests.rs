mod common;

use common::{drive, FakeTreeService};
use ratatui::{backend::TestBackend, layout::Rect, Terminal};
use treescope::actions::{execute_action, Action};
use treescope::model::TreeKind;
use treescope::ui::{self, canvas::logical_size};
use treescope::{AppConfig, AppState};

fn frame(app: &mut AppState, width: u16, height: u16) -> Vec<String> {
    let canvas = ui::canvas_area(Rect::new(0, 0, width, height));
    app.surface_changed(logical_size(canvas, app.config.cell_size()));

    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|f| ui::render(f, app)).unwrap();
    let buffer = terminal.backend().buffer().clone();
    (0..height)
        .map(|y| (0..width).map(|x| buffer[(x, y)].symbol()).collect())
        .collect()
}

fn loaded(service: &FakeTreeService, config: AppConfig) -> AppState {
    let mut app = AppState::new(config);
    frame(&mut app, 100, 30);
    let request = app.request_refresh(true);
    drive(&mut app, service, request);
    app
}

#[test]
fn test_mary_tree_frame() {
    let service = FakeTreeService::new().with_values(TreeKind::Mvias, &[30, 10, 20]);
    let config = AppConfig {
        tree_type: TreeKind::Mvias,
        ..AppConfig::default()
    };
    let mut app = loaded(&service, config);
    let lines = frame(&mut app, 100, 30);

    assert!(lines[0].starts_with("treescope | M-Vías"));
    assert!(lines[1].contains(" M-Vías "));
    for label in ["10", "20", "30"] {
        assert!(lines[1..26].iter().any(|l| l.contains(label)), "label {label} missing");
    }
    assert!(lines[27].starts_with("M-Vías | Altura: 1 | Nodos: 3 | Valores: 3"));
}

#[test]
fn test_mirrored_frame_and_restore() {
    let service = FakeTreeService::new().with_values(TreeKind::Abb, &[50, 30, 70]);
    let mut app = loaded(&service, AppConfig::default());

    let request = execute_action(Action::ToggleMirror, &mut app);
    drive(&mut app, &service, request);
    let lines = frame(&mut app, 100, 30);
    assert!(lines[0].contains("MIRROR"));
    assert!(lines[26].contains(" mirror "));
    assert!(lines[29].starts_with("Espejo generado"));

    let request = execute_action(Action::ToggleMirror, &mut app);
    drive(&mut app, &service, request);
    let lines = frame(&mut app, 100, 30);
    assert!(!lines[0].contains("MIRROR"));
    assert!(!lines[26].contains(" mirror "));
    assert!(lines[29].starts_with("Original tree restored"));
}

#[test]
fn test_load_failure_frame() {
    let service = FakeTreeService::new();
    service.set_fail_structure(true);
    let mut app = loaded(&service, AppConfig::default());
    let lines = frame(&mut app, 100, 30);

    assert!(lines.iter().any(|l| l.contains("Failed to load tree")));
    assert!(lines[29].starts_with("Failed to load tree: service answered HTTP 500"));
}

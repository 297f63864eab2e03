use treescope::{actions, app, config, event, logging, ui, worker};

use anyhow::Result;
use app::AppState;
use clap::Parser;
use config::{load_config, CliArgs};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io;
use ui::canvas::logical_size;
use worker::{Request, ServiceWorker};

fn main() -> Result<()> {
    // Parse command line arguments
    let args = CliArgs::parse();

    // Load configuration
    let config = load_config(&args)?;

    if args.debug_config {
        println!("Configuration:");
        println!("{:#?}", config);
        return Ok(());
    }

    logging::init_logging(&config)?;

    // The worker owns the HTTP client; the UI thread never blocks on it.
    let worker = ServiceWorker::connect(&config)?;

    // Create application state and ask for the first structure
    let mut app = AppState::new(config);
    let initial = app.request_refresh(true);
    submit(&worker, &mut app, initial);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Clear the terminal
    terminal.clear()?;

    // Run the main loop
    let res = run_app(&mut terminal, &mut app, &worker);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Handle any errors from the main loop
    if let Err(err) = res {
        tracing::error!(error = %err, "main loop failed");
        eprintln!("Error: {}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    worker: &ServiceWorker,
) -> Result<()> {
    while app.running {
        // Measure the canvas so a resize relays out before this frame
        let size = terminal.size()?;
        let canvas = ui::canvas_area(Rect::new(0, 0, size.width, size.height));
        let request = app.surface_changed(logical_size(canvas, app.config.cell_size()));
        submit(worker, app, request);

        // Draw the UI
        terminal.draw(|frame| ui::render(frame, app))?;

        // Apply finished service calls
        while let Some(outcome) = worker.poll()? {
            let request = app.apply_outcome(outcome);
            submit(worker, app, request);
        }

        // Handle events
        if let Some(action) = event::handle_events(app, app.config.poll_interval())? {
            let request = actions::execute_action(action, app);
            submit(worker, app, request);
        }
    }

    Ok(())
}

fn submit(worker: &ServiceWorker, app: &mut AppState, request: Option<Request>) {
    let Some(request) = request else {
        return;
    };
    if let Err(e) = worker.submit(request) {
        tracing::error!(error = %e, "request not submitted");
        app.request_lost(&request);
        app.set_error(format!("Request failed: {e}"));
    }
}

use crate::app::{AppMode, AppState, InputPurpose, MIN_DEGREE};
use crate::model::{Mutation, TraversalKind};
use crate::worker::Request;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,

    // Prompted input
    StartInput(InputPurpose),
    TypeChar(char),
    Backspace,
    ConfirmInput,
    CancelInput,

    // Tree service
    ClearTree,
    CycleTreeType,
    ToggleMirror,
    Traversal(TraversalKind),
    ShowInfo,
    Refresh,

    // Viewport, in pan steps
    Pan { dx: f64, dy: f64 },
    ZoomIn,
    ZoomOut,
    ResetView,
    FitView,

    ShowHelp,
    CloseHelp,
}

/// Applies an action to the state. Anything that needs the tree service
/// comes back as a request for the worker.
pub fn execute_action(action: Action, app: &mut AppState) -> Option<Request> {
    match action {
        Action::Quit => {
            app.running = false;
            None
        }

        Action::StartInput(purpose) => {
            app.clear_message();
            app.mode = AppMode::Input {
                purpose,
                buffer: String::new(),
            };
            None
        }
        Action::TypeChar(c) => {
            if let AppMode::Input { buffer, .. } = &mut app.mode {
                buffer.push(c);
            }
            None
        }
        Action::Backspace => {
            if let AppMode::Input { buffer, .. } = &mut app.mode {
                buffer.pop();
            }
            None
        }
        Action::ConfirmInput => confirm_input(app),
        Action::CancelInput => {
            app.mode = AppMode::Normal;
            None
        }

        Action::ClearTree => app.request_mutation(Mutation::Clear),
        Action::CycleTreeType => app.cycle_tree_type(),
        Action::ToggleMirror => app.toggle_mirror(),
        Action::Traversal(kind) => app.request_traversal(kind),
        Action::ShowInfo => app.request_info(),
        Action::Refresh => app.refresh_view(),

        Action::Pan { dx, dy } => {
            app.pan(dx, dy);
            None
        }
        Action::ZoomIn => {
            app.zoom_in();
            None
        }
        Action::ZoomOut => {
            app.zoom_out();
            None
        }
        Action::ResetView => {
            app.reset_view();
            None
        }
        Action::FitView => {
            app.fit_view();
            None
        }

        Action::ShowHelp => {
            app.mode = AppMode::Help;
            None
        }
        Action::CloseHelp => {
            app.mode = AppMode::Normal;
            None
        }
    }
}

fn confirm_input(app: &mut AppState) -> Option<Request> {
    let AppMode::Input { purpose, buffer } = std::mem::replace(&mut app.mode, AppMode::Normal)
    else {
        return None;
    };

    match parse_input(purpose, &buffer) {
        Ok(mutation) => app.request_mutation(mutation),
        Err(msg) => {
            tracing::debug!(?purpose, input = %buffer, "input rejected");
            app.set_error(msg);
            None
        }
    }
}

/// Validates prompt text before anything is sent to the service.
pub fn parse_input(purpose: InputPurpose, text: &str) -> Result<Mutation, String> {
    let trimmed = text.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| format!("Please enter a valid integer (got {trimmed:?})"))?;

    match purpose {
        InputPurpose::Insert => Ok(Mutation::Insert(value)),
        InputPurpose::Delete => Ok(Mutation::Delete(value)),
        InputPurpose::Degree => {
            if value < i64::from(MIN_DEGREE) {
                return Err(format!("Degree must be at least {MIN_DEGREE}"));
            }
            u32::try_from(value)
                .map(Mutation::Configure)
                .map_err(|_| format!("Degree {value} is too large"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::worker::Job;

    fn type_text(app: &mut AppState, text: &str) {
        for c in text.chars() {
            execute_action(Action::TypeChar(c), app);
        }
    }

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input(InputPurpose::Insert, " 42 "), Ok(Mutation::Insert(42)));
        assert_eq!(parse_input(InputPurpose::Delete, "-7"), Ok(Mutation::Delete(-7)));
        assert_eq!(parse_input(InputPurpose::Degree, "4"), Ok(Mutation::Configure(4)));
        assert!(parse_input(InputPurpose::Insert, "abc").is_err());
        assert!(parse_input(InputPurpose::Insert, "").is_err());
        assert_eq!(
            parse_input(InputPurpose::Degree, "2"),
            Err("Degree must be at least 3".to_string())
        );
        assert_eq!(
            parse_input(InputPurpose::Degree, "-1"),
            Err("Degree must be at least 3".to_string())
        );
    }

    #[test]
    fn test_insert_prompt_flow() {
        let mut app = AppState::new(AppConfig::default());
        execute_action(Action::StartInput(InputPurpose::Insert), &mut app);
        type_text(&mut app, "15x");
        execute_action(Action::Backspace, &mut app);

        let request = execute_action(Action::ConfirmInput, &mut app).expect("request issued");
        assert_eq!(request.job, Job::Mutate(Mutation::Insert(15)));
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn test_invalid_input_issues_nothing() {
        let mut app = AppState::new(AppConfig::default());
        execute_action(Action::StartInput(InputPurpose::Degree), &mut app);
        type_text(&mut app, "1");

        assert!(execute_action(Action::ConfirmInput, &mut app).is_none());
        assert!(!app.is_busy());
        assert!(app.message.as_ref().is_some_and(|m| m.is_error));
    }

    #[test]
    fn test_cancel_input_returns_to_normal() {
        let mut app = AppState::new(AppConfig::default());
        execute_action(Action::StartInput(InputPurpose::Delete), &mut app);
        execute_action(Action::CancelInput, &mut app);
        assert_eq!(app.mode, AppMode::Normal);
        assert!(!app.is_busy());
    }

    #[test]
    fn test_quit() {
        let mut app = AppState::new(AppConfig::default());
        execute_action(Action::Quit, &mut app);
        assert!(!app.running);
    }
}

pub mod app;
pub mod config;
pub mod errors;
pub mod layout;
pub mod logging;
pub mod model;
pub mod service;
pub mod ui;
pub mod worker;

// Internal modules
pub mod actions;
pub mod event;

// Re-export commonly used types
pub use app::{AppMode, AppState};
pub use config::AppConfig;
pub use model::{Snapshot, TreeKind};
pub use service::{HttpTreeService, TreeService};

use crate::layout::{
    LayoutConfig, DEFAULT_BINARY_UNIT, DEFAULT_CORNER_RADIUS, DEFAULT_MARY_UNIT,
    DEFAULT_MIN_NODE_WIDTH, DEFAULT_NODE_HEIGHT, DEFAULT_NODE_RADIUS, DEFAULT_TOP_MARGIN,
    DEFAULT_VERTICAL_SPACING,
};
use crate::model::TreeKind;
use clap::Parser;
use config::{
    Config as ConfigCrate, ConfigError as ConfigCrateError, Environment, File, Map, Source, Value,
};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_POLL_INTERVAL_MS: u64 = 50;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_CELL_WIDTH: f64 = 8.0;
const DEFAULT_CELL_HEIGHT: f64 = 16.0;
const DEFAULT_PAN_STEP: f64 = 40.0;
const ENV_PREFIX: &str = "TREESCOPE";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] ConfigCrateError),
    #[error("Validation error: {0}")]
    Validation(String),
}

// Every field optional so file and environment can each supply a subset.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
struct FileConfig {
    server_url: Option<String>,
    tree_type: Option<TreeKind>,
    request_timeout_secs: Option<u64>,
    poll_interval_ms: Option<u64>,
    log_file: Option<PathBuf>,
    log_level: Option<String>,
    cell_width: Option<f64>,
    cell_height: Option<f64>,
    pan_step: Option<f64>,
    vertical_spacing: Option<f64>,
    top_margin: Option<f64>,
    binary_unit: Option<f64>,
    mary_unit: Option<f64>,
    node_radius: Option<f64>,
    node_height: Option<f64>,
    min_node_width: Option<f64>,
    corner_radius: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub server_url: String,
    pub tree_type: TreeKind,
    /// `0` disables the timeout.
    pub request_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub log_file: Option<PathBuf>,
    pub log_level: String,
    /// Scene units covered by one terminal cell.
    pub cell_width: f64,
    pub cell_height: f64,
    pub pan_step: f64,
    pub layout: LayoutConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            tree_type: TreeKind::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            log_file: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            cell_width: DEFAULT_CELL_WIDTH,
            cell_height: DEFAULT_CELL_HEIGHT,
            pan_step: DEFAULT_PAN_STEP,
            layout: LayoutConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn cell_size(&self) -> Size {
        Size::new(self.cell_width, self.cell_height)
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal viewer for a remote tree service", long_about = None)]
pub struct CliArgs {
    /// Path to a custom configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Base URL of the tree service
    #[arg(long)]
    pub server_url: Option<String>,

    /// Tree type shown at startup
    #[arg(long, value_enum)]
    pub tree_type: Option<TreeKind>,

    /// Per-request timeout in seconds, 0 for none
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(long)]
    pub log_level: Option<String>,

    /// Print the merged configuration and exit
    #[arg(long)]
    pub debug_config: bool,
}

pub fn load_config(args: &CliArgs) -> Result<AppConfig, ConfigError> {
    let env_source = Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true);
    let env_map: Map<String, Value> = env_source.collect()?;

    build_config_from_args(args, Some(env_map))
}

fn default_config_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.config_dir().join("treescope").join("config.toml"))
}

/// Layers args > overrides > file > defaults. Split out from
/// [`load_config`] so tests can pass their own override map.
pub fn build_config_from_args(
    args: &CliArgs,
    override_source: Option<Map<String, Value>>,
) -> Result<AppConfig, ConfigError> {
    let config_file_path = args.config.clone().or_else(default_config_path);

    let mut builder = ConfigCrate::builder();
    if let Some(ref path) = config_file_path {
        builder = builder.add_source(File::from(path.clone()).required(false));
    }
    if let Some(overrides) = override_source {
        for (key, value) in overrides {
            builder = builder.set_override(&key, value)?;
        }
    }
    let loaded: FileConfig = builder.build()?.try_deserialize()?;

    let config = AppConfig {
        server_url: args
            .server_url
            .clone()
            .or(loaded.server_url)
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
        tree_type: args.tree_type.or(loaded.tree_type).unwrap_or_default(),
        request_timeout_secs: args
            .request_timeout_secs
            .or(loaded.request_timeout_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        poll_interval_ms: args
            .poll_interval_ms
            .or(loaded.poll_interval_ms)
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
        log_file: args.log_file.clone().or(loaded.log_file),
        log_level: args
            .log_level
            .clone()
            .or(loaded.log_level)
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        cell_width: loaded.cell_width.unwrap_or(DEFAULT_CELL_WIDTH),
        cell_height: loaded.cell_height.unwrap_or(DEFAULT_CELL_HEIGHT),
        pan_step: loaded.pan_step.unwrap_or(DEFAULT_PAN_STEP),
        layout: LayoutConfig {
            vertical_spacing: loaded.vertical_spacing.unwrap_or(DEFAULT_VERTICAL_SPACING),
            top_margin: loaded.top_margin.unwrap_or(DEFAULT_TOP_MARGIN),
            binary_unit: loaded.binary_unit.unwrap_or(DEFAULT_BINARY_UNIT),
            mary_unit: loaded.mary_unit.unwrap_or(DEFAULT_MARY_UNIT),
            node_radius: loaded.node_radius.unwrap_or(DEFAULT_NODE_RADIUS),
            node_height: loaded.node_height.unwrap_or(DEFAULT_NODE_HEIGHT),
            min_node_width: loaded.min_node_width.unwrap_or(DEFAULT_MIN_NODE_WIDTH),
            corner_radius: loaded.corner_radius.unwrap_or(DEFAULT_CORNER_RADIUS),
        },
    };

    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server_url.trim().is_empty() {
        return Err(ConfigError::Validation("server_url must not be empty".into()));
    }
    if config.poll_interval_ms == 0 {
        return Err(ConfigError::Validation(
            "poll_interval_ms must be at least 1".into(),
        ));
    }

    let layout = &config.layout;
    let positive = [
        ("cell_width", config.cell_width),
        ("cell_height", config.cell_height),
        ("pan_step", config.pan_step),
        ("vertical_spacing", layout.vertical_spacing),
        ("binary_unit", layout.binary_unit),
        ("mary_unit", layout.mary_unit),
        ("node_radius", layout.node_radius),
        ("node_height", layout.node_height),
        ("min_node_width", layout.min_node_width),
    ];
    for (name, value) in positive {
        if !(value > 0.0) {
            return Err(ConfigError::Validation(format!(
                "{name} must be positive, got {value}"
            )));
        }
    }
    // Margins may be zero.
    for (name, value) in [
        ("top_margin", layout.top_margin),
        ("corner_radius", layout.corner_radius),
    ] {
        if !(value >= 0.0) {
            return Err(ConfigError::Validation(format!(
                "{name} must not be negative, got {value}"
            )));
        }
    }

    Ok(())
}

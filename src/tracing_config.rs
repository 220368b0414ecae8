//! Tracing setup for hosts embedding the engine.
//!
//! The solver only emits `tracing` events; nothing is printed unless the
//! host installs a subscriber. `init_tracing` installs one driven by the
//! environment:
//!
//! - `RTC_LOG`: filter directives, e.g. `rtc_solver=trace`. Falls back to
//!   `RUST_LOG`. With neither set no subscriber is installed.
//! - `RTC_LOG_FORMAT`: `text` (default), `tree` for indented hierarchical
//!   output, or `json` for one object per line.
//!
//! ```bash
//! RTC_LOG=rtc_solver=trace RTC_LOG_FORMAT=tree my-host
//! RTC_LOG=rtc::query_json=trace RTC_LOG_FORMAT=json my-host 2> queries.jsonl
//! ```
//!
//! Output always goes to stderr.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Tree,
    Json,
}

impl LogFormat {
    /// Unknown names select `Text`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Logging settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter directives; `None` disables logging.
    pub directives: Option<String>,
    pub format: LogFormat,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `RTC_LOG` wins over `RUST_LOG` when both are present.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let directives = lookup("RTC_LOG").or_else(|| lookup("RUST_LOG"));
        let format = lookup("RTC_LOG_FORMAT")
            .map(|name| LogFormat::parse(&name))
            .unwrap_or_default();
        LogConfig { directives, format }
    }
}

/// Install the global subscriber described by the environment.
///
/// Returns whether a subscriber was installed by this call. Calling it when
/// logging is disabled, or after another subscriber was set, does nothing.
pub fn init_tracing() -> bool {
    init_with(LogConfig::from_env())
}

pub fn init_with(config: LogConfig) -> bool {
    let Some(directives) = config.directives else {
        return false;
    };
    let filter = EnvFilter::builder().parse_lossy(directives);

    let installed = match config.format {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_writer(std::io::stderr)
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_targets(true);
            Registry::default().with(filter).with(tree_layer).try_init()
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).try_init()
        }
        LogFormat::Text => fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish()
            .try_init(),
    };
    installed.is_ok()
}

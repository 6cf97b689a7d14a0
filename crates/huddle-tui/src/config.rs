//! Start-up configuration.
//!
//! Settings come from the command line (and `HUDDLE_*` environment
//! variables via clap), layered over an optional `config.toml` in the
//! platform config directory. Command-line values win.

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result, bail};
use clap::Parser;
use directories::ProjectDirs;
use huddle_app::RuntimeConfig;
use huddle_client::{ClientConfig, DecayPolicy, transport::TransportConfig};
use serde::{Deserialize, Serialize};

/// Huddle terminal client
#[derive(Parser, Debug, Default)]
#[command(name = "huddle")]
#[command(about = "Terminal client for Huddle room chat")]
#[command(version)]
pub struct Args {
    /// Room server URL, e.g. `https://chat.example.com`
    #[arg(short, long, env = "HUDDLE_SERVER_URL")]
    pub server: Option<String>,

    /// Display name used by `/join` when none is given
    #[arg(short, long, env = "HUDDLE_NAME")]
    pub name: Option<String>,

    /// Room to join once connected
    #[arg(short, long)]
    pub room: Option<String>,

    /// Allow plain `ws://` connections (local development only)
    #[arg(long)]
    pub insecure: bool,

    /// How long a typing indicator lasts, in milliseconds
    #[arg(long, value_name = "MS")]
    pub typing_window: Option<u64>,

    /// Expire each typing indicator on its own timer
    #[arg(long)]
    pub per_author_typing: bool,

    /// Write logs here instead of the default location
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Alternate config file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Contents of `config.toml`. Every field is optional.
#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Room server URL.
    pub server: Option<String>,
    /// Default display name.
    pub name: Option<String>,
    /// Room to join once connected.
    pub room: Option<String>,
    /// Allow plain `ws://` connections.
    pub insecure: Option<bool>,
    /// Typing indicator lifetime in milliseconds.
    pub typing_window_ms: Option<u64>,
    /// Expire each typing indicator on its own timer.
    pub per_author_typing: Option<bool>,
    /// Socket.IO endpoint path.
    pub path: Option<String>,
}

impl FileConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("com", "huddle", "huddle").context("Could not determine config directory")
    }

    /// Default config file path.
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Load `path`, or the default file when `None`.
    ///
    /// A missing default file is an empty config; a missing explicit file is
    /// an error.
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.clone(), true),
            None => (Self::default_path()?, false),
        };

        if !explicit && !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parse TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid config")
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Room server URL.
    pub server_url: String,
    /// Default display name.
    pub display_name: Option<String>,
    /// Room to join once connected.
    pub room: Option<String>,
    /// Require `wss://`.
    pub secure: bool,
    /// Socket.IO endpoint path.
    pub path: String,
    /// Typing indicator lifetime.
    pub decay_window: Duration,
    /// Typing indicator expiry policy.
    pub decay_policy: DecayPolicy,
    /// Log file. `None` disables logging.
    pub log_file: Option<PathBuf>,
    /// Verbose logging.
    pub verbose: bool,
}

impl Settings {
    /// Layer `args` over `file`.
    pub fn resolve(args: Args, file: FileConfig) -> Result<Self> {
        let Some(server_url) = args.server.or(file.server).filter(|s| !s.is_empty()) else {
            bail!("No server URL: pass --server, set HUDDLE_SERVER_URL, or add `server` to the config file");
        };

        let defaults = ClientConfig::default();
        let decay_window = args
            .typing_window
            .or(file.typing_window_ms)
            .map_or(defaults.decay_window, Duration::from_millis);
        if decay_window.is_zero() {
            bail!("Typing window must be greater than zero");
        }

        let per_author = args.per_author_typing || file.per_author_typing.unwrap_or(false);
        let log_file = match args.log_file {
            Some(path) => Some(path),
            None => default_log_path(),
        };

        Ok(Self {
            server_url,
            display_name: args.name.or(file.name).filter(|s| !s.is_empty()),
            room: args.room.or(file.room).filter(|s| !s.is_empty()),
            secure: !(args.insecure || file.insecure.unwrap_or(false)),
            path: file.path.unwrap_or_else(|| huddle_client::transport::DEFAULT_PATH.to_string()),
            decay_window,
            decay_policy: if per_author { DecayPolicy::PerAuthor } else { DecayPolicy::Shared },
            log_file,
            verbose: args.verbose,
        })
    }

    /// Settings for the application runtime.
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            server_url: self.server_url.clone(),
            display_name: self.display_name.clone(),
            auto_join: self.room.clone(),
            client: ClientConfig { decay_window: self.decay_window, decay_policy: self.decay_policy },
        }
    }

    /// Settings for the WebSocket transport.
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            endpoint: self.server_url.clone(),
            secure: self.secure,
            path: self.path.clone(),
        }
    }
}

fn default_log_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "huddle", "huddle").map(|dirs| dirs.data_local_dir().join("huddle.log"))
}

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Server-rendered library catalog.
#[derive(Parser, Debug, Clone)]
#[command(name = "local-library")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file.
    #[arg(short, long, env = "LIBRARY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the server (default if no command given).
    Serve {
        /// Address to bind the server to.
        #[arg(short, long, env = "LIBRARY_BIND")]
        bind: Option<SocketAddr>,

        /// Storage backend, overriding the config file.
        #[arg(long, env = "LIBRARY_BACKEND")]
        backend: Option<Backend>,
    },

    /// Load a small sample catalog into the configured store.
    Seed {
        /// Seed even if the store already has records.
        #[arg(short, long)]
        force: bool,
    },

    /// Create a default config file and initialize the database.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}

/// Storage backend selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Relational store in a SQLite file.
    #[default]
    Sqlite,
    /// Document-style store held in process memory.
    Memory,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Sqlite => f.write_str("sqlite"),
            Backend::Memory => f.write_str("memory"),
        }
    }
}

/// Main configuration from TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Portrait upload configuration.
    #[serde(default)]
    pub uploads: UploadConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    /// Site title shown in the page header.
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            title: default_title(),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::new(
        std::net::IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        3000,
    )
}

fn default_title() -> String {
    "Local Library".to_string()
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Which store backs the catalog.
    #[serde(default)]
    pub backend: Backend,

    /// Path to SQLite database file (ignored by the memory backend).
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data/library.db")
}

/// Upload configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Directory where author portraits are stored.
    #[serde(default = "default_upload_dir")]
    pub dir: PathBuf,

    /// Maximum request body size in bytes.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            max_bytes: default_max_bytes(),
        }
    }
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("data/uploads")
}

fn default_max_bytes() -> usize {
    2 * 1024 * 1024
}

impl Config {
    /// Load configuration from file.
    pub fn load(path: &PathBuf) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to read config file: {}", e))
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> crate::error::Result<Self> {
        toml::from_str(content).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to parse config file: {}", e))
        })
    }

    /// Find config file in default locations.
    pub fn find_config_file() -> Option<PathBuf> {
        let candidates = [
            PathBuf::from("config.toml"),
            PathBuf::from("local-library.toml"),
            dirs::config_dir()
                .map(|p| p.join("local-library").join("config.toml"))
                .unwrap_or_default(),
            PathBuf::from("/etc/local-library/config.toml"),
        ];

        candidates.into_iter().find(|p| p.exists())
    }

    /// Generate default config file content.
    pub fn generate_default() -> String {
        r#"# local-library configuration

[server]
bind = "0.0.0.0:3000"
title = "Local Library"

[database]
# Storage backend: "sqlite" or "memory"
backend = "sqlite"
path = "data/library.db"

[uploads]
# Author portraits are written here and served under /uploads
dir = "data/uploads"
# Maximum request body size in bytes
max_bytes = 2097152
"#
        .to_string()
    }
}

//! Server configuration.
//!
//! Loaded from an optional TOML file, then overridden by CLI flags.
//! Every field has a default, so a partial file (or none at all) works.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use depot_protocol::constants::{DEFAULT_BUFFER_SIZE, DEFAULT_CHUNK_SIZE, DEFAULT_PORT};
use serde::Deserialize;

/// depotd configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Listen address.
    #[serde(default = "default_bind")]
    pub bind: IpAddr,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory of served files (created if missing).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Maximum bytes per chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,

    /// Buffered reader/writer capacity per session.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

fn default_bind() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_root() -> PathBuf {
    PathBuf::from("server_files")
}

fn default_chunk_size() -> u64 {
    DEFAULT_CHUNK_SIZE
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            root: default_root(),
            chunk_size: default_chunk_size(),
            buffer_size: default_buffer_size(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or the defaults if `None`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                let config = toml::from_str(&content)?;
                Ok(config)
            }
            None => Ok(Config::default()),
        }
    }
}

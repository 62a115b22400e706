//! Server state and configuration.

use std::path::PathBuf;

use crate::render::FontConfig;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Extra directories searched for fonts before the platform ones.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            font_dirs: Vec::new(),
        }
    }
}

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: ServerConfig,
    /// Font lookup used by every render.
    pub fonts: FontConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let fonts = FontConfig::default().with_dirs_first(config.font_dirs.iter().cloned());
        Self { config, fonts }
    }

    /// State with an explicit font configuration.
    pub fn with_fonts(config: ServerConfig, fonts: FontConfig) -> Self {
        Self { config, fonts }
    }
}

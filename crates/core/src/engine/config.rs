//! Engine client settings

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine binary, or a bare name looked up in PATH
    pub path: String,
    /// Extra command-line arguments for the engine process
    pub args: Vec<String>,
    /// Search depth for `go depth N`
    pub depth: u8,
    /// Number of candidate moves requested (UCI `MultiPV`)
    pub multipv: u8,
    /// How long a caller waits for one search before giving up
    pub timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            path: "stockfish".to_string(),
            args: Vec::new(),
            depth: 20,
            multipv: 1,
            timeout_ms: 30_000,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "path": "/usr/games/stockfish", "depth": 12 }"#).unwrap();
        assert_eq!(config.path, "/usr/games/stockfish");
        assert_eq!(config.depth, 12);
        assert_eq!(config.multipv, 1);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{ "depth": "deep" }"#),
            Err(Error::Config(_))
        ));
    }
}

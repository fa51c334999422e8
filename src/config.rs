//! Link Endpoint Configuration
//!
//! YAML-based configuration for a link endpoint: the local station identity,
//! frame preamble/postamble flag counts, and logging.
//!
//! ## Configuration Search Path
//!
//! Configuration is loaded from the first file found:
//! 1. Path in the `AXLINK_CONFIG` environment variable
//! 2. `./axlink.yaml` (current directory)
//! 3. `~/.config/axlink/config.yaml` (user config)
//! 4. `/etc/axlink/config.yaml` (system config)
//!
//! ## Example Configuration
//!
//! ```yaml
//! station:
//!   callsign: "N7LEM"
//!   ssid: 97
//!
//! framing:
//!   preamble_flags: 3
//!   postamble_flags: 1
//!
//! logging:
//!   level: debug
//!   format: compact
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::address::{StationAddress, CALLSIGN_LEN};
use crate::logging::LogConfig;
use crate::types::{LinkError, LinkResult};

/// Local station identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    /// Callsign, up to 6 ASCII characters
    pub callsign: String,
    /// Station SSID (masked to 4 bits on the wire)
    pub ssid: u8,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            callsign: "N0CALL".to_string(),
            ssid: 0,
        }
    }
}

/// Frame delimiter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FramingConfig {
    /// Flag bytes sent before each frame (radio sync time)
    pub preamble_flags: usize,
    /// Flag bytes sent after each frame
    pub postamble_flags: usize,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            preamble_flags: 1,
            postamble_flags: 1,
        }
    }
}

/// Complete endpoint configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub station: StationConfig,
    pub framing: FramingConfig,
    pub logging: LogConfig,
}

impl LinkConfig {
    /// Load configuration from the default search path.
    ///
    /// Returns the default configuration if no file is found.
    pub fn load() -> LinkResult<Self> {
        if let Ok(path) = std::env::var("AXLINK_CONFIG") {
            if Path::new(&path).exists() {
                return Self::load_from(Path::new(&path));
            }
        }
        for path in Self::config_search_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> LinkResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LinkError::Config(format!("{}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> LinkResult<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| LinkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> LinkResult<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| LinkError::Config(e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|e| LinkError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Configuration search paths after the environment variable.
    pub fn config_search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./axlink.yaml")];
        if let Some(dirs) = directories::ProjectDirs::from("", "", "axlink") {
            paths.push(dirs.config_dir().join("config.yaml"));
        }
        paths.push(PathBuf::from("/etc/axlink/config.yaml"));
        paths
    }

    /// Validate the configuration.
    pub fn validate(&self) -> LinkResult<()> {
        if self.station.callsign.is_empty() || self.station.callsign.len() > CALLSIGN_LEN {
            return Err(LinkError::Config(format!(
                "callsign '{}' must be 1..={} characters",
                self.station.callsign, CALLSIGN_LEN
            )));
        }
        if !self.station.callsign.is_ascii() {
            return Err(LinkError::Config(format!(
                "callsign '{}' is not ASCII",
                self.station.callsign
            )));
        }
        if self.framing.preamble_flags == 0 || self.framing.postamble_flags == 0 {
            return Err(LinkError::Config(
                "preamble_flags and postamble_flags must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The local station address described by this configuration.
    pub fn local_address(&self) -> LinkResult<StationAddress> {
        StationAddress::new(&self.station.callsign, self.station.ssid)
    }
}

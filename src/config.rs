//! Configuration loading.
//!
//! Settings come from `attodry.toml` merged with `ATTODRY_*` environment
//! variables, so a deployment can pin the library location and COM port in
//! the file while a one-off run overrides them from the shell:
//!
//! ```text
//! ATTODRY_COM_PORT=COM7 cargo run --bin field_temp
//! ```
//!
//! The library path is configuration rather than a constant baked into the
//! binding; the default assumes `attoDRYLib.dll` is resolvable through the
//! loader search path, and the sample `attodry.toml` shows the vendor's
//! usual install location under the LabVIEW runtime.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::device::SetupVersion;
use crate::error::Result;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "attodry.toml";

/// Connection and library settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the vendor `attoDRYLib` shared library.
    #[serde(default = "default_library")]
    pub library: PathBuf,
    /// Serial port the attoDRY is attached to.
    #[serde(default = "default_com_port")]
    pub com_port: String,
    /// Hardware setup version driven by this installation.
    #[serde(default = "default_setup")]
    pub setup: SetupVersion,
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_library() -> PathBuf {
    PathBuf::from("attoDRYLib.dll")
}

fn default_com_port() -> String {
    "COM4".to_string()
}

fn default_setup() -> SetupVersion {
    SetupVersion::AttoDry2100
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            library: default_library(),
            com_port: default_com_port(),
            setup: default_setup(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Loads settings from [`DEFAULT_CONFIG_FILE`] and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Loads settings from a specific file path and the environment.
    ///
    /// A missing file is not an error; the defaults and environment still
    /// apply.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("ATTODRY_"))
            .extract()?;
        Ok(settings)
    }

    /// Validates settings after loading.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.com_port.is_empty() {
            return Err("com_port must not be empty".to_string());
        }
        if self.library.as_os_str().is_empty() {
            return Err("library must not be empty".to_string());
        }
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.com_port, "COM4");
        assert_eq!(settings.setup, SetupVersion::AttoDry2100);
    }

    #[test]
    fn validate_rejects_empty_port() {
        let settings = Settings {
            com_port: String::new(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_log_level() {
        let settings = Settings {
            log_level: "loud".to_string(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}

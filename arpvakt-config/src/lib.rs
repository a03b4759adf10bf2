//! # Arpvakt Configuration System
//!
//! Hierarchical configuration for the arpvakt service: the detector
//! command line, the outbound mail transport, and feed sizing.
//!
//! ## Features
//! - **Unified Configuration**: Single source of truth across all crates
//! - **Validation**: Runtime validation of critical parameters
//! - **Environment Awareness**: Per-environment override files
//!
//! The settings toggle that enables the detector is *not* configuration;
//! it lives in the persisted settings store and is owned by external
//! admin clients.

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod detector;
mod error;
mod feed;
mod mail;
mod validation;

pub use detector::DetectorConfig;
pub use error::ConfigError;
pub use feed::FeedConfig;
pub use mail::MailConfig;

/// Top-level configuration container for all arpvakt components.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone)]
pub struct ArpvaktConfig {
    /// External detector process command line.
    #[validate(nested)]
    pub detector: DetectorConfig,

    /// Outbound mail transport parameters.
    #[validate(nested)]
    pub mail: MailConfig,

    /// Change feed sizing.
    #[validate(nested)]
    pub feeds: FeedConfig,
}

impl ArpvaktConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/arpvakt.yaml` - base settings. If missing, defaults are used.
    /// 3. `config/<environment>.yaml` - environment-specific overrides.
    /// 4. `ARPVAKT_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(ArpvaktConfig::default()));

        if Path::new("config/arpvakt.yaml").exists() {
            figment = figment.merge(Yaml::file("config/arpvakt.yaml"));
        }

        let env = std::env::var("ARPVAKT_ENV").unwrap_or_else(|_| "production".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        figment
            .merge(Env::prefixed("ARPVAKT_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }

    /// Load configuration from a specific path for testing/validation.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        Figment::from(Serialized::defaults(ArpvaktConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("ARPVAKT_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}

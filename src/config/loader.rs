//! Settings loader
//!
//! Loads [`SecuritySettings`] with the following priority:
//! 1. Default values (lowest priority)
//! 2. JSON settings file (`BEECRYPT_SETTINGS_FILE` or an explicit path)
//! 3. Environment variables prefixed with `BEECRYPT_` (highest priority)

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::common::Result;
use crate::config::defaults;

/// Process-level settings of the security framework
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecuritySettings {
    /// Provider configuration file (`provider.N = module` entries)
    #[serde(default = "defaults::conf_file")]
    pub conf_file: PathBuf,

    /// Default log level
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            conf_file: defaults::conf_file(),
            log_level: defaults::log_level(),
        }
    }
}

impl SecuritySettings {
    /// Load settings from defaults, the settings file named by
    /// `BEECRYPT_SETTINGS_FILE` (if any) and the environment
    pub fn load() -> Result<Self> {
        let settings_file = std::env::var(defaults::SETTINGS_FILE_ENV).ok().map(PathBuf::from);
        Self::load_from(settings_file.as_deref())
    }

    /// Load settings using an explicit settings file
    ///
    /// # Arguments
    ///
    /// * `settings_file` - Optional JSON file; a missing file is not an error
    pub fn load_from(settings_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("conf_file", defaults::CONF_FILE_STR)?
            .set_default("log_level", defaults::LOG_LEVEL_STR)?;

        if let Some(path) = settings_file {
            debug!("Reading settings from {}", path.display());
            builder = builder.add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Json)
                    .required(false),
            );
        }

        // BEECRYPT_CONF_FILE -> conf_file, BEECRYPT_LOG_LEVEL -> log_level
        builder = builder.add_source(Environment::with_prefix(defaults::ENV_PREFIX));

        let settings: SecuritySettings = builder.build()?.try_deserialize()?;
        debug!("Provider configuration file: {}", settings.conf_file.display());
        Ok(settings)
    }
}

//! Default configuration values
//!
//! This module provides default values for configuration options.
//! It is the single source of truth for defaults used by the settings
//! loader and the provider registry.

use std::path::PathBuf;

/// Environment variable prefix for all configuration options
pub const ENV_PREFIX: &str = "BEECRYPT";

/// Environment variable naming the provider configuration file
pub const CONF_FILE_ENV: &str = "BEECRYPT_CONF_FILE";

/// Environment variable naming an optional JSON settings file
pub const SETTINGS_FILE_ENV: &str = "BEECRYPT_SETTINGS_FILE";

/// Compiled-in provider configuration path
pub const CONF_FILE_STR: &str = "/etc/beecrypt.conf";

/// Default log level as string
pub const LOG_LEVEL_STR: &str = "info";

/// Property naming the default keystore type
pub const KEYSTORE_DEFAULT_PROPERTY: &str = "keystore.default";

/// Keystore type used when `keystore.default` is not set
pub const KEYSTORE_DEFAULT_STR: &str = "BEE";

/// Name under which the built-in provider is known to the catalog
pub const BUILTIN_PROVIDER_MODULE: &str = "beecrypt";

/// Default provider configuration path
pub fn conf_file() -> PathBuf {
    PathBuf::from(CONF_FILE_STR)
}

/// Default log level
pub fn log_level() -> String {
    LOG_LEVEL_STR.to_string()
}

/// Default keystore type
pub fn keystore_type() -> String {
    KEYSTORE_DEFAULT_STR.to_string()
}

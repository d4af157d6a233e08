//! Configuration module
//!
//! Process settings (where the provider configuration lives, log level) and
//! the properties format the provider configuration is written in.

pub mod defaults;
mod loader;
pub mod properties;

pub use self::loader::SecuritySettings;
pub use self::properties::Properties;

//! Common module
//!
//! This module contains the error type, logging setup and byte streams used
//! throughout the crate.

pub mod error;
pub mod io;
pub mod log;

// Re-export commonly used types and functions
pub use error::{Result, SecurityError};
pub use io::{DataInputStream, DataOutputStream};
pub use log::init_logger;

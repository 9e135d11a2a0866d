//! Core module - Common types, traits, configuration and error handling

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::{Config, Credentials};
pub use error::{Error, Result};
pub use traits::*;
pub use types::*;

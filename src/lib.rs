//! fix-client - Core Library
//! FIX order-entry client: message construction, logon signing, order cache and RFQ negotiation

pub mod builder;
pub mod cache;
pub mod commands;
pub mod core;
pub mod fix;
pub mod rfq;
pub mod session;
pub mod signer;

// Re-exports
pub use core::{Config, Error, Result};

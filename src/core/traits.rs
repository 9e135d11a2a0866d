//! Core traits - the seams to the external session engine

use crate::core::Result;
use crate::fix::FixMessage;

/// Outbound half of the session engine contract.
///
/// Fire-and-forget: a successful submit only means the engine accepted the
/// message for transmission. Delivery is observed through execution reports.
pub trait Session: Send + Sync {
    /// Hand a fully built message to the session for transmission
    fn submit(&self, msg: FixMessage) -> Result<()>;

    /// Session identifier for logging
    fn id(&self) -> &str;
}

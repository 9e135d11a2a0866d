//! Client order id generation.
//!
//! Ids are `<prefix>-<stamp>`: an eight-hex-digit prefix drawn once per
//! process from a random UUID, and a nanosecond stamp that never repeats or
//! goes backwards within the process even if the wall clock does.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use uuid::Uuid;

pub struct ClOrdIdGenerator {
    prefix: String,
    last: AtomicU64,
}

impl ClOrdIdGenerator {
    pub fn new() -> Self {
        let prefix = Uuid::new_v4().simple().to_string()[..8].to_string();
        Self::with_prefix(prefix)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            last: AtomicU64::new(0),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Next order id
    pub fn next_id(&self) -> String {
        format!("{}-{}", self.prefix, self.next_stamp())
    }

    /// Next id with a purpose tag, e.g. `cancel-<prefix>-<stamp>`
    pub fn next_tagged(&self, tag: &str) -> String {
        format!("{}-{}", tag, self.next_id())
    }

    fn next_stamp(&self) -> u64 {
        let now = Utc::now().timestamp_nanos_opt().unwrap_or_default().max(0) as u64;
        let prev = match self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last + 1))
            }) {
            Ok(prev) | Err(prev) => prev,
        };
        now.max(prev + 1)
    }
}

impl Default for ClOrdIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

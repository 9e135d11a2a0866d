//! Order Cache - ClOrdId → last known order state, mirrored to a JSON file
//!
//! The command path and the session callback path share one `OrderCache`.
//! Every read, mutation and file save goes through the same `RwLock`, and a
//! save runs while the write lock is still held so the file never reflects a
//! half-applied update.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::core::{OrderInfo, Result};
use crate::fix::{tags, FixMessage};

/// What an execution report did to the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No ClOrdId on the report
    Discarded,
    /// First report for this ClOrdId
    Inserted,
    /// Existing entry overwritten
    Updated,
    /// Existing entry left as is
    Ignored,
}

pub struct OrderCache {
    path: PathBuf,
    track_full_lifecycle: bool,
    orders: RwLock<HashMap<String, OrderInfo>>,
}

impl OrderCache {
    /// Empty cache backed by `path`. Nothing is read until [`load`](Self::load).
    pub fn new(path: impl Into<PathBuf>, track_full_lifecycle: bool) -> Self {
        Self {
            path: path.into(),
            track_full_lifecycle,
            orders: RwLock::new(HashMap::new()),
        }
    }

    /// Cache hydrated from `path`; a missing file yields an empty cache.
    pub fn open(path: impl Into<PathBuf>, track_full_lifecycle: bool) -> Result<Self> {
        let cache = Self::new(path, track_full_lifecycle);
        cache.load()?;
        Ok(cache)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, cl_ord_id: &str) -> Option<OrderInfo> {
        self.orders.read().get(cl_ord_id).cloned()
    }

    /// Insert or replace an entry and persist.
    pub fn put(&self, cl_ord_id: impl Into<String>, info: OrderInfo) {
        let mut orders = self.orders.write();
        orders.insert(cl_ord_id.into(), info);
        self.persist(&orders);
    }

    /// Snapshot of all entries, in no particular order.
    pub fn list(&self) -> Vec<OrderInfo> {
        self.orders.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }

    /// Replace the in-memory table with the file contents.
    pub fn load(&self) -> Result<()> {
        let loaded: HashMap<String, OrderInfo> = match std::fs::read(&self.path) {
            Ok(data) if data.iter().all(u8::is_ascii_whitespace) => HashMap::new(),
            Ok(data) => serde_json::from_slice(&data)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No order file at {}, starting empty", self.path.display());
                HashMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        let mut orders = self.orders.write();
        *orders = loaded;
        info!("Loaded {} cached orders from {}", orders.len(), self.path.display());
        Ok(())
    }

    /// Rewrite the whole file from the in-memory table.
    pub fn save(&self) -> Result<()> {
        let orders = self.orders.read();
        write_file(&self.path, &orders)
    }

    /// Fold an execution report into the cache.
    pub fn apply_execution_report(&self, msg: &FixMessage) -> ReconcileOutcome {
        let Some(incoming) = order_info_from_report(msg) else {
            debug!("Discarding execution report without ClOrdId");
            return ReconcileOutcome::Discarded;
        };

        let mut orders = self.orders.write();
        let outcome = match orders.get_mut(&incoming.cl_ord_id) {
            None => ReconcileOutcome::Inserted,
            Some(existing) if !existing.has_order_id() && incoming.has_order_id() => {
                *existing = incoming.clone();
                ReconcileOutcome::Updated
            }
            Some(existing)
                if self.track_full_lifecycle
                    && (!incoming.has_order_id() || incoming.order_id == existing.order_id) =>
            {
                if merge_lifecycle(existing, &incoming) {
                    ReconcileOutcome::Updated
                } else {
                    ReconcileOutcome::Ignored
                }
            }
            Some(_) => ReconcileOutcome::Ignored,
        };
        if outcome == ReconcileOutcome::Inserted {
            orders.insert(incoming.cl_ord_id.clone(), incoming.clone());
        }

        match outcome {
            ReconcileOutcome::Inserted | ReconcileOutcome::Updated => {
                self.persist(&orders);
                info!(
                    "Cached {} (OrderId {:?}) {:?}",
                    incoming.cl_ord_id, incoming.order_id, outcome
                );
            }
            _ => debug!("Execution report for {} not applied", incoming.cl_ord_id),
        }
        outcome
    }

    fn persist(&self, orders: &HashMap<String, OrderInfo>) {
        if let Err(e) = write_file(&self.path, orders) {
            warn!("Failed to write order cache {}: {}", self.path.display(), e);
        }
    }
}

fn write_file(path: &Path, orders: &HashMap<String, OrderInfo>) -> Result<()> {
    let data = serde_json::to_vec_pretty(orders)?;
    std::fs::write(path, data)?;
    Ok(())
}

/// Order fields carried by an execution report; `None` without a ClOrdId.
pub fn order_info_from_report(msg: &FixMessage) -> Option<OrderInfo> {
    let cl_ord_id = msg.get_present(tags::CL_ORD_ID)?;
    let quantity = msg
        .get_present(tags::ORDER_QTY)
        .or_else(|| msg.get_present(tags::CASH_ORDER_QTY))
        .unwrap_or_default();

    Some(OrderInfo {
        cl_ord_id,
        order_id: msg.get_or_empty(tags::ORDER_ID),
        side: msg.get_or_empty(tags::SIDE),
        symbol: msg.get_or_empty(tags::SYMBOL),
        quantity,
        limit_price: msg.get_or_empty(tags::PRICE),
        start_time: msg.get_or_empty(tags::START_TIME),
        expire_time: msg.get_or_empty(tags::EXPIRE_TIME),
        participation_rate: msg.get_or_empty(tags::PARTICIPATION_RATE),
    })
}

/// Applies the non-empty descriptive fields of a later report. ClOrdId and an
/// assigned OrderId never change.
fn merge_lifecycle(existing: &mut OrderInfo, incoming: &OrderInfo) -> bool {
    let before = existing.clone();
    let fields = [
        (&mut existing.side, &incoming.side),
        (&mut existing.symbol, &incoming.symbol),
        (&mut existing.quantity, &incoming.quantity),
        (&mut existing.limit_price, &incoming.limit_price),
        (&mut existing.start_time, &incoming.start_time),
        (&mut existing.expire_time, &incoming.expire_time),
        (&mut existing.participation_rate, &incoming.participation_rate),
    ];
    for (slot, value) in fields {
        if !value.is_empty() {
            slot.clone_from(value);
        }
    }
    *existing != before
}

//! Session Callback Adapter - the core's face toward the external session engine
//!
//! The engine calls [`FixApplication`] on logon, before sending its own logon,
//! and for every inbound application message. Callbacks for one session
//! arrive serialized, but they run concurrently with operator commands; the
//! shared [`OrderCache`] provides the only synchronization needed.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::builder::MessageBuilder;
use crate::cache::{OrderCache, ReconcileOutcome};
use crate::core::{Error, Result, Session};
use crate::fix::tags::{self, msg_type};
use crate::fix::FixMessage;
use crate::rfq::{NegotiationHandler, QuoteAckOutcome, QuoteOutcome};
use crate::signer::Signer;

/// Outbound session backed by a channel; the receiving end owns transmission.
pub struct ChannelSession {
    id: String,
    tx: flume::Sender<FixMessage>,
}

impl ChannelSession {
    pub fn new(id: impl Into<String>) -> (Self, flume::Receiver<FixMessage>) {
        let (tx, rx) = flume::unbounded();
        (Self { id: id.into(), tx }, rx)
    }
}

impl Session for ChannelSession {
    fn submit(&self, msg: FixMessage) -> Result<()> {
        self.tx
            .send(msg)
            .map_err(|_| Error::Session(format!("session {} is closed", self.id)))
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// What the adapter did with an inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    ExecutionReport(ReconcileOutcome),
    Quote(QuoteOutcome),
    QuoteAck(QuoteAckOutcome),
    /// Message type the core does not handle
    Unhandled(String),
}

pub struct FixApplication {
    cache: Arc<OrderCache>,
    builder: Arc<MessageBuilder>,
    negotiation: NegotiationHandler,
    signer: Arc<dyn Signer>,
    session: Arc<dyn Session>,
    portfolio: String,
}

impl FixApplication {
    pub fn new(
        cache: Arc<OrderCache>,
        builder: Arc<MessageBuilder>,
        negotiation: NegotiationHandler,
        signer: Arc<dyn Signer>,
        session: Arc<dyn Session>,
        portfolio: impl Into<String>,
    ) -> Self {
        Self {
            cache,
            builder,
            negotiation,
            signer,
            session,
            portfolio: portfolio.into(),
        }
    }

    pub fn on_create(&self, session_id: &str) {
        debug!("Session created: {}", session_id);
    }

    /// Hydrates the order cache from its file.
    pub fn on_logon(&self, session_id: &str) {
        info!("FIX logon {}", session_id);
        if let Err(e) = self.cache.load() {
            error!("Order cache load failed: {}", e);
        }
    }

    pub fn on_logout(&self, session_id: &str) {
        info!("FIX logout {}", session_id);
    }

    /// Outbound admin messages; adds credentials to the logon.
    pub fn to_admin(&self, msg: &mut FixMessage) {
        if msg.msg_type() == Some(msg_type::LOGON) {
            self.builder
                .augment_logon(msg, self.signer.as_ref(), &self.portfolio);
            debug!("Logon signed for {}", self.builder.target_comp_id());
        }
    }

    /// Inbound application messages, dispatched by MsgType.
    pub fn from_app(&self, msg: &FixMessage) -> Dispatch {
        match msg.msg_type().unwrap_or_default() {
            msg_type::EXECUTION_REPORT => {
                debug!(
                    "Execution report {} exec type {}",
                    msg.get_or_empty(tags::CL_ORD_ID),
                    msg.get_or_empty(tags::EXEC_TYPE)
                );
                Dispatch::ExecutionReport(self.cache.apply_execution_report(msg))
            }
            msg_type::QUOTE => {
                let outcome = self.negotiation.on_quote(msg);
                if let QuoteOutcome::Accepted(accept) = &outcome {
                    if let Err(e) = self.session.submit(accept.clone()) {
                        warn!("Quote accept not sent on {}: {}", self.session.id(), e);
                    }
                }
                Dispatch::Quote(outcome)
            }
            msg_type::QUOTE_ACK => Dispatch::QuoteAck(self.negotiation.on_quote_ack(msg)),
            other => {
                debug!("Ignoring inbound message type {:?}", other);
                Dispatch::Unhandled(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ClOrdIdGenerator;
    use crate::core::config::{SessionConfig, VwapConfig};
    use crate::fix::tags::values;
    use crate::rfq::TakeQuotedSide;
    use crate::signer::HmacSigner;

    fn app(dir: &tempfile::TempDir) -> (FixApplication, Arc<OrderCache>, flume::Receiver<FixMessage>) {
        let session_cfg = SessionConfig {
            sender_comp_id: "svc".into(),
            target_comp_id: "COIN".into(),
            portfolio_id: "pf".into(),
        };
        let builder = Arc::new(
            MessageBuilder::new(&session_cfg, &VwapConfig::default())
                .with_ids(ClOrdIdGenerator::with_prefix("t")),
        );
        let cache = Arc::new(OrderCache::new(dir.path().join("orders.json"), false));
        let (session, rx) = ChannelSession::new("FIX.4.2:svc->COIN");
        let negotiation = NegotiationHandler::new(builder.clone(), Box::new(TakeQuotedSide), "pf");
        let app = FixApplication::new(
            cache.clone(),
            builder,
            negotiation,
            Arc::new(HmacSigner::new("key", "secret", "pass")),
            Arc::new(session),
            "pf",
        );
        (app, cache, rx)
    }

    #[test]
    fn test_channel_session_closed() {
        let (session, rx) = ChannelSession::new("FIX.4.2:svc->COIN");
        assert_eq!(session.id(), "FIX.4.2:svc->COIN");
        drop(rx);
        match session.submit(FixMessage::new(msg_type::NEW_ORDER)) {
            Err(Error::Session(msg)) => assert!(msg.contains("FIX.4.2:svc->COIN")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_execution_report_goes_to_cache() {
        let dir = tempfile::tempdir().unwrap();
        let (app, cache, _rx) = app(&dir);
        let report = FixMessage::new(msg_type::EXECUTION_REPORT)
            .with(tags::CL_ORD_ID, "X")
            .with(tags::ORDER_ID, "1");
        assert_eq!(app.from_app(&report), Dispatch::ExecutionReport(ReconcileOutcome::Inserted));
        assert!(cache.get("X").is_some());
    }

    #[test]
    fn test_quote_accept_is_submitted() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _cache, rx) = app(&dir);
        let quote = FixMessage::new(msg_type::QUOTE)
            .with(tags::QUOTE_ID, "q")
            .with(tags::BID_PX, "49000")
            .with(tags::BID_SIZE, "2");

        assert!(matches!(app.from_app(&quote), Dispatch::Quote(QuoteOutcome::Accepted(_))));
        let sent = rx.try_recv().unwrap();
        assert_eq!(sent.body(tags::SIDE), Some(values::SIDE_SELL));
        assert_eq!(sent.body(tags::QUOTE_ID), Some("q"));
    }

    #[test]
    fn test_invalid_quote_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _cache, rx) = app(&dir);
        let quote = FixMessage::new(msg_type::QUOTE).with(tags::QUOTE_ID, "q");
        assert_eq!(app.from_app(&quote), Dispatch::Quote(QuoteOutcome::Invalid));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unhandled_types() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _cache, _rx) = app(&dir);
        assert_eq!(
            app.from_app(&FixMessage::new("9")),
            Dispatch::Unhandled("9".to_string())
        );
    }

    #[test]
    fn test_only_logon_is_augmented() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _cache, _rx) = app(&dir);

        let mut logon = FixMessage::new(msg_type::LOGON);
        app.to_admin(&mut logon);
        assert!(logon.body(tags::HMAC).is_some());
        assert_eq!(logon.body(tags::ACCESS_KEY), Some("key"));

        let mut heartbeat = FixMessage::new("0");
        app.to_admin(&mut heartbeat);
        assert_eq!(heartbeat.body_fields().count(), 0);
    }

    #[test]
    fn test_logon_hydrates_cache() {
        let dir = tempfile::tempdir().unwrap();
        let (app, cache, _rx) = app(&dir);
        std::fs::write(
            cache.path(),
            r#"{"A":{"clOrdId":"A","orderId":"7","side":"1","symbol":"BTC-USD","quantity":"1","limitPrice":""}}"#,
        )
        .unwrap();

        app.on_logon("FIX.4.2:svc->COIN");
        assert_eq!(cache.get("A").unwrap().order_id, "7");
    }
}

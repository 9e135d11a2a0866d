//! Negotiation Handler - RFQ quote acceptance and acknowledgment handling
//!
//! Negotiation state is implicit in the correlation ids carried by the
//! messages: QuoteReqID ties a quote to its request, QuoteID ties the accept
//! to the quote. Nothing is stored between messages.

use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::builder::MessageBuilder;
use crate::core::{QuoteInfo, Side};
use crate::fix::tags::{self, values};
use crate::fix::FixMessage;

/// Side, price and size to accept a quote at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptDecision {
    pub side: Side,
    pub price: String,
    pub size: String,
}

/// Decides whether and how to take an inbound quote.
pub trait AcceptancePolicy: Send + Sync {
    fn name(&self) -> &str;

    /// `None` leaves the quote to expire.
    fn decide(&self, quote: &QuoteInfo) -> Option<AcceptDecision>;
}

/// Takes every quote unconditionally: sells at the bid when one is quoted,
/// otherwise buys at the offer.
///
/// There is no price or size limit and no check that the quote is still
/// valid. Every quote the venue sends is executed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TakeQuotedSide;

impl AcceptancePolicy for TakeQuotedSide {
    fn name(&self) -> &str {
        "take-quoted-side"
    }

    fn decide(&self, quote: &QuoteInfo) -> Option<AcceptDecision> {
        if let Some(bid) = &quote.bid_px {
            return Some(AcceptDecision {
                side: Side::Sell,
                price: bid.clone(),
                size: quote.bid_size.clone().unwrap_or_default(),
            });
        }
        quote.offer_px.as_ref().map(|offer| AcceptDecision {
            side: Side::Buy,
            price: offer.clone(),
            size: quote.offer_size.clone().unwrap_or_default(),
        })
    }
}

/// Wraps another policy and declines decisions outside a size cap and price band.
pub struct BoundedAcceptance<P> {
    inner: P,
    max_size: Decimal,
    /// Lowest price we will sell at
    min_sell_price: Option<Decimal>,
    /// Highest price we will buy at
    max_buy_price: Option<Decimal>,
}

impl<P: AcceptancePolicy> BoundedAcceptance<P> {
    pub fn new(inner: P, max_size: Decimal) -> Self {
        Self {
            inner,
            max_size,
            min_sell_price: None,
            max_buy_price: None,
        }
    }

    pub fn min_sell_price(mut self, price: Decimal) -> Self {
        self.min_sell_price = Some(price);
        self
    }

    pub fn max_buy_price(mut self, price: Decimal) -> Self {
        self.max_buy_price = Some(price);
        self
    }

    fn within_bounds(&self, decision: &AcceptDecision) -> bool {
        let (Ok(price), Ok(size)) = (
            Decimal::from_str(&decision.price),
            Decimal::from_str(&decision.size),
        ) else {
            return false;
        };
        if size > self.max_size {
            return false;
        }
        match decision.side {
            Side::Sell => self.min_sell_price.is_none_or(|min| price >= min),
            Side::Buy => self.max_buy_price.is_none_or(|max| price <= max),
        }
    }
}

impl<P: AcceptancePolicy> AcceptancePolicy for BoundedAcceptance<P> {
    fn name(&self) -> &str {
        "bounded"
    }

    fn decide(&self, quote: &QuoteInfo) -> Option<AcceptDecision> {
        self.inner
            .decide(quote)
            .filter(|decision| self.within_bounds(decision))
    }
}

/// Result of handling an inbound quote
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteOutcome {
    /// Accept message ready for submission
    Accepted(FixMessage),
    /// Policy declined the quote
    Declined,
    /// No bid or offer price, or no size on the accepted side
    Invalid,
}

/// Result of handling a quote acknowledgment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteAckOutcome {
    Rejected {
        quote_req_id: String,
        reason: String,
        text: String,
    },
    Acknowledged {
        quote_req_id: String,
        status: String,
    },
}

impl QuoteInfo {
    pub fn from_message(msg: &FixMessage) -> Self {
        Self {
            quote_id: msg.get_or_empty(tags::QUOTE_ID),
            quote_req_id: msg.get_or_empty(tags::QUOTE_REQ_ID),
            account: msg.get_or_empty(tags::ACCOUNT),
            symbol: msg.get_or_empty(tags::SYMBOL),
            bid_px: msg.get_present(tags::BID_PX),
            bid_size: msg.get_present(tags::BID_SIZE),
            offer_px: msg.get_present(tags::OFFER_PX),
            offer_size: msg.get_present(tags::OFFER_SIZE),
            valid_until_time: msg.get_or_empty(tags::VALID_UNTIL_TIME),
        }
    }
}

pub struct NegotiationHandler {
    builder: Arc<MessageBuilder>,
    policy: Box<dyn AcceptancePolicy>,
    portfolio: String,
}

impl NegotiationHandler {
    pub fn new(
        builder: Arc<MessageBuilder>,
        policy: Box<dyn AcceptancePolicy>,
        portfolio: impl Into<String>,
    ) -> Self {
        Self {
            builder,
            policy,
            portfolio: portfolio.into(),
        }
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    pub fn on_quote(&self, msg: &FixMessage) -> QuoteOutcome {
        let quote = QuoteInfo::from_message(msg);
        if !quote.is_priced() {
            warn!("Quote {} has neither bid nor offer, discarding", quote.quote_id);
            return QuoteOutcome::Invalid;
        }

        let Some(decision) = self.policy.decide(&quote) else {
            info!("Quote {} declined by {} policy", quote.quote_id, self.policy.name());
            return QuoteOutcome::Declined;
        };
        if decision.size.is_empty() {
            warn!(
                "Quote {} has no size on the {} side, discarding",
                quote.quote_id, decision.side
            );
            return QuoteOutcome::Invalid;
        }

        info!(
            "Accepting quote {} (request {}): {} {} {} @ {} valid until {}",
            quote.quote_id,
            quote.quote_req_id,
            decision.side,
            decision.size,
            quote.symbol,
            decision.price,
            quote.valid_until_time
        );
        QuoteOutcome::Accepted(self.builder.build_accept_quote(
            &quote.quote_id,
            &quote.symbol,
            decision.side,
            &decision.size,
            &decision.price,
            &self.portfolio,
        ))
    }

    pub fn on_quote_ack(&self, msg: &FixMessage) -> QuoteAckOutcome {
        let quote_req_id = msg.get_or_empty(tags::QUOTE_REQ_ID);
        let status = msg.get_or_empty(tags::QUOTE_ACK_STATUS);

        if status == values::QUOTE_ACK_REJECTED {
            let reason = msg.get_or_empty(tags::QUOTE_REJECT_REASON);
            let text = msg.get_or_empty(tags::TEXT);
            warn!("Quote request {} rejected: reason={} text={}", quote_req_id, reason, text);
            QuoteAckOutcome::Rejected {
                quote_req_id,
                reason,
                text,
            }
        } else {
            info!("Quote request {} acknowledged (status {})", quote_req_id, status);
            QuoteAckOutcome::Acknowledged {
                quote_req_id,
                status,
            }
        }
    }
}

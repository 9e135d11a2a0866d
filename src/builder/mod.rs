//! Message Builder - turns validated operator input into outbound FIX messages
//!
//! Builders never touch the cache or the network. Every failure is detected
//! before the first field is written, so a returned message is always complete.

pub mod ids;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::core::config::{SessionConfig, VwapConfig};
use crate::core::types::validate_decimal;
use crate::core::{Error, OrderInfo, OrderType, QtyType, QuoteRequestInfo, Result, Side};
use crate::fix::tags::{self, msg_type, values};
use crate::fix::FixMessage;
use crate::signer::Signer;

pub use ids::ClOrdIdGenerator;

/// Result of normalizing an operator-supplied timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeField {
    /// Parsed as `YYYY-MM-DDTHH:MM:SSZ` and rewritten in the wire format
    Parsed(String),
    /// Not in the expected layout; sent exactly as typed
    Verbatim(String),
}

impl TimeField {
    pub fn parse(raw: &str) -> Self {
        match NaiveDateTime::parse_from_str(raw, tags::ISO_INPUT_FORMAT) {
            Ok(ts) => TimeField::Parsed(ts.and_utc().format(tags::FIX_TIME_FORMAT).to_string()),
            Err(_) => TimeField::Verbatim(raw.to_string()),
        }
    }

    pub fn into_value(self) -> String {
        match self {
            TimeField::Parsed(v) | TimeField::Verbatim(v) => v,
        }
    }
}

/// Optional VWAP parameters, in command order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VwapParams {
    pub start_time: Option<String>,
    pub participation_rate: Option<String>,
    pub expire_time: Option<String>,
}

/// Parameters of a new order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderRequest {
    pub symbol: String,
    pub order_type: OrderType,
    pub side: Side,
    pub qty_type: QtyType,
    pub quantity: String,
    pub price: Option<String>,
    pub vwap: VwapParams,
}

/// Where the default VWAP expiry comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultExpiry {
    /// Configured fixed timestamp
    Fixed(String),
    /// Offset from the time the order is built
    Relative(Duration),
}

impl DefaultExpiry {
    pub fn from_config(cfg: &VwapConfig) -> Self {
        match &cfg.default_expiry {
            Some(ts) => DefaultExpiry::Fixed(ts.clone()),
            None => DefaultExpiry::Relative(Duration::hours(cfg.default_expiry_hours as i64)),
        }
    }

    fn resolve(&self, now: DateTime<Utc>) -> Result<String> {
        match self {
            DefaultExpiry::Fixed(ts) => Ok(TimeField::parse(ts).into_value()),
            DefaultExpiry::Relative(offset) => now
                .checked_add_signed(*offset)
                .map(|ts| ts.format(tags::FIX_TIME_FORMAT).to_string())
                .ok_or_else(|| {
                    Error::Config(format!("default VWAP expiry offset {offset} is out of range"))
                }),
        }
    }
}

/// Assembles outbound messages with this process's session identity
pub struct MessageBuilder {
    sender_comp_id: String,
    target_comp_id: String,
    default_expiry: DefaultExpiry,
    ids: ClOrdIdGenerator,
}

impl MessageBuilder {
    pub fn new(session: &SessionConfig, vwap: &VwapConfig) -> Self {
        Self {
            sender_comp_id: session.sender_comp_id.clone(),
            target_comp_id: session.target_comp_id.clone(),
            default_expiry: DefaultExpiry::from_config(vwap),
            ids: ClOrdIdGenerator::new(),
        }
    }

    pub fn with_ids(mut self, ids: ClOrdIdGenerator) -> Self {
        self.ids = ids;
        self
    }

    pub fn target_comp_id(&self) -> &str {
        &self.target_comp_id
    }

    fn header(&self, msg_type: &str, now: DateTime<Utc>) -> FixMessage {
        let mut msg = FixMessage::new(msg_type);
        msg.set_header(tags::SENDER_COMP_ID, self.sender_comp_id.as_str());
        msg.set_header(tags::TARGET_COMP_ID, self.target_comp_id.as_str());
        msg.set_header(tags::SENDING_TIME, now.format(tags::FIX_TIME_FORMAT).to_string());
        msg
    }

    /// New order single (market, limit or VWAP).
    pub fn build_new(&self, req: &NewOrderRequest, portfolio: &str) -> Result<FixMessage> {
        validate_decimal("quantity", &req.quantity)?;
        let price = match req.order_type {
            OrderType::Market => None,
            OrderType::Limit | OrderType::Vwap => {
                let price = req.price.as_deref().ok_or_else(|| {
                    Error::validation(format!("{} orders require a price", req.order_type))
                })?;
                Some(validate_decimal("price", price)?)
            }
        };

        let now = Utc::now();
        let expire = match req.order_type {
            OrderType::Vwap => Some(match non_empty(&req.vwap.expire_time) {
                Some(expire) => TimeField::parse(expire).into_value(),
                None => self.default_expiry.resolve(now)?,
            }),
            _ => None,
        };

        let mut msg = self.header(msg_type::NEW_ORDER, now);
        msg.set_body(tags::ACCOUNT, portfolio);
        msg.set_body(tags::CL_ORD_ID, self.ids.next_id());
        msg.set_body(tags::SYMBOL, req.symbol.as_str());
        msg.set_body(tags::SIDE, req.side.fix_code());
        set_quantity(&mut msg, req.qty_type, &req.quantity);

        match req.order_type {
            OrderType::Market => {
                msg.set_body(tags::ORD_TYPE, values::ORD_TYPE_MARKET);
                msg.set_body(tags::TIME_IN_FORCE, values::TIF_IOC);
                msg.set_body(tags::TARGET_STRATEGY, values::STRATEGY_MARKET);
            }
            OrderType::Limit => {
                msg.set_body(tags::ORD_TYPE, values::ORD_TYPE_LIMIT);
                msg.set_body(tags::TIME_IN_FORCE, values::TIF_DAY);
                msg.set_body(tags::TARGET_STRATEGY, values::STRATEGY_LIMIT);
            }
            OrderType::Vwap => {
                msg.set_body(tags::ORD_TYPE, values::ORD_TYPE_VWAP);
                msg.set_body(tags::TIME_IN_FORCE, values::TIF_GTD);
                msg.set_body(tags::TARGET_STRATEGY, values::STRATEGY_VWAP);

                let vwap = &req.vwap;
                if let Some(start) = non_empty(&vwap.start_time) {
                    msg.set_body(tags::START_TIME, TimeField::parse(start).into_value());
                }
                if let Some(rate) = non_empty(&vwap.participation_rate) {
                    msg.set_body(tags::PARTICIPATION_RATE, rate);
                }
                if let Some(expire) = expire {
                    msg.set_body(tags::EXPIRE_TIME, expire);
                }
            }
        }

        if let Some(price) = price {
            msg.set_body(tags::PRICE, price);
        }

        Ok(msg)
    }

    /// Order status request; all four identifiers must be present.
    pub fn build_status(
        &self,
        cl_ord_id: &str,
        order_id: &str,
        side: &str,
        symbol: &str,
    ) -> Result<FixMessage> {
        if [cl_ord_id, order_id, side, symbol].iter().any(|v| v.is_empty()) {
            return Err(Error::IncompleteStatus(cl_ord_id.to_string()));
        }

        let mut msg = self.header(msg_type::STATUS, Utc::now());
        msg.set_body(tags::CL_ORD_ID, cl_ord_id);
        msg.set_body(tags::ORDER_ID, order_id);
        msg.set_body(tags::SIDE, side);
        msg.set_body(tags::SYMBOL, symbol);
        Ok(msg)
    }

    /// Cancel request for a cached order. The cancel gets its own ClOrdId and
    /// points at the original through OrigClOrdID.
    pub fn build_cancel(&self, info: &OrderInfo, portfolio: &str) -> FixMessage {
        let mut msg = self.header(msg_type::CANCEL, Utc::now());
        msg.set_body(tags::ACCOUNT, portfolio);
        msg.set_body(tags::CL_ORD_ID, self.ids.next_tagged("cancel"));
        msg.set_body(tags::ORIG_CL_ORD_ID, info.cl_ord_id.as_str());
        msg.set_body(tags::ORDER_ID, info.order_id.as_str());
        msg.set_body(tags::ORDER_QTY, info.quantity.as_str());
        msg.set_body(tags::SIDE, info.side.as_str());
        msg.set_body(tags::SYMBOL, info.symbol.as_str());
        msg
    }

    /// Fresh quote request parameters with a generated QuoteReqID.
    pub fn quote_request(
        &self,
        symbol: &str,
        side: Side,
        qty_type: QtyType,
        qty: &str,
        price: &str,
        portfolio: &str,
    ) -> QuoteRequestInfo {
        QuoteRequestInfo {
            quote_req_id: self.ids.next_tagged("rfq"),
            account: portfolio.to_string(),
            side,
            symbol: symbol.to_string(),
            qty_type,
            order_qty: qty.to_string(),
            price: price.to_string(),
        }
    }

    /// Request for quote, fill-or-kill.
    pub fn build_quote_request(&self, req: &QuoteRequestInfo) -> Result<FixMessage> {
        validate_decimal("quantity", &req.order_qty)?;
        validate_decimal("price", &req.price)?;

        let mut msg = self.header(msg_type::QUOTE_REQUEST, Utc::now());
        msg.set_body(tags::ACCOUNT, req.account.as_str());
        msg.set_body(tags::QUOTE_REQ_ID, req.quote_req_id.as_str());
        msg.set_body(tags::SYMBOL, req.symbol.as_str());
        msg.set_body(tags::SIDE, req.side.fix_code());
        set_quantity(&mut msg, req.qty_type, &req.order_qty);
        msg.set_body(tags::ORD_TYPE, values::ORD_TYPE_LIMIT);
        msg.set_body(tags::PRICE, req.price.as_str());
        msg.set_body(tags::TIME_IN_FORCE, values::TIF_FOK);
        msg.set_body(tags::TARGET_STRATEGY, values::STRATEGY_RFQ);
        Ok(msg)
    }

    /// Accept a quote: a previously-quoted new order that echoes the quote's
    /// size and price.
    pub fn build_accept_quote(
        &self,
        quote_id: &str,
        symbol: &str,
        side: Side,
        qty: &str,
        price: &str,
        portfolio: &str,
    ) -> FixMessage {
        let mut msg = self.header(msg_type::NEW_ORDER, Utc::now());
        msg.set_body(tags::ACCOUNT, portfolio);
        msg.set_body(tags::CL_ORD_ID, self.ids.next_id());
        msg.set_body(tags::QUOTE_ID, quote_id);
        msg.set_body(tags::SYMBOL, symbol);
        msg.set_body(tags::SIDE, side.fix_code());
        msg.set_body(tags::ORDER_QTY, qty);
        msg.set_body(tags::PRICE, price);
        msg.set_body(tags::ORD_TYPE, values::ORD_TYPE_PREVIOUSLY_QUOTED);
        msg.set_body(tags::TIME_IN_FORCE, values::TIF_FOK);
        msg.set_body(tags::TARGET_STRATEGY, values::STRATEGY_RFQ);
        msg
    }

    /// Adds authentication fields to the session's own logon message.
    ///
    /// The signature covers the logon's SendingTime when the engine has set
    /// one, otherwise the current time.
    pub fn augment_logon(&self, msg: &mut FixMessage, signer: &dyn Signer, portfolio: &str) {
        let timestamp = msg
            .header(tags::SENDING_TIME)
            .map(str::to_string)
            .unwrap_or_else(|| Utc::now().format(tags::FIX_TIME_FORMAT).to_string());
        let signature = signer.sign_logon(&timestamp, &self.target_comp_id);

        msg.set_body(tags::ACCOUNT, portfolio);
        msg.set_body(tags::HMAC, signature);
        msg.set_body(tags::PASSWORD, signer.passphrase());
        msg.set_body(tags::DROP_COPY_FLAG, values::DROP_COPY_YES);
        msg.set_body(tags::ACCESS_KEY, signer.access_key());
    }
}

fn set_quantity(msg: &mut FixMessage, qty_type: QtyType, qty: &str) {
    match qty_type {
        QtyType::Base => msg.set_body(tags::ORDER_QTY, qty),
        QtyType::Quote => msg.set_body(tags::CASH_ORDER_QTY, qty),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::{self, HmacSigner};

    fn builder() -> MessageBuilder {
        let session = SessionConfig {
            sender_comp_id: "svc-1".into(),
            target_comp_id: "COIN".into(),
            portfolio_id: "pf-1".into(),
        };
        let vwap = VwapConfig {
            default_expiry: Some("2030-06-30T23:59:59Z".into()),
            default_expiry_hours: 24,
        };
        MessageBuilder::new(&session, &vwap).with_ids(ClOrdIdGenerator::with_prefix("test"))
    }

    fn request(order_type: OrderType, price: Option<&str>) -> NewOrderRequest {
        NewOrderRequest {
            symbol: "BTC-USD".into(),
            order_type,
            side: Side::Buy,
            qty_type: QtyType::Base,
            quantity: "1.0".into(),
            price: price.map(str::to_string),
            vwap: VwapParams::default(),
        }
    }

    #[test]
    fn test_limit_order_scenario() {
        let msg = builder()
            .build_new(&request(OrderType::Limit, Some("50000")), "pf-1")
            .unwrap();

        assert_eq!(msg.msg_type(), Some(msg_type::NEW_ORDER));
        assert_eq!(msg.header(tags::SENDER_COMP_ID), Some("svc-1"));
        assert_eq!(msg.header(tags::TARGET_COMP_ID), Some("COIN"));
        assert_eq!(msg.body(tags::SYMBOL), Some("BTC-USD"));
        assert_eq!(msg.body(tags::SIDE), Some(values::SIDE_BUY));
        assert_eq!(msg.body(tags::ORD_TYPE), Some(values::ORD_TYPE_LIMIT));
        assert_eq!(msg.body(tags::ORDER_QTY), Some("1.0"));
        assert_eq!(msg.body(tags::PRICE), Some("50000"));
        assert_eq!(msg.body(tags::TIME_IN_FORCE), Some(values::TIF_DAY));
        assert_eq!(msg.body(tags::TARGET_STRATEGY), Some(values::STRATEGY_LIMIT));
        assert_eq!(msg.body(tags::ACCOUNT), Some("pf-1"));
        assert!(msg.body(tags::CL_ORD_ID).unwrap().starts_with("test-"));
    }

    #[test]
    fn test_limit_price_not_reformatted() {
        let msg = builder()
            .build_new(&request(OrderType::Limit, Some("50000.1200")), "pf-1")
            .unwrap();
        assert_eq!(msg.body(tags::PRICE), Some("50000.1200"));
    }

    #[test]
    fn test_market_order_has_no_price_and_ioc() {
        for side in [Side::Buy, Side::Sell] {
            let mut req = request(OrderType::Market, Some("123"));
            req.side = side;
            let msg = builder().build_new(&req, "pf-1").unwrap();
            assert!(!msg.has_body(tags::PRICE));
            assert_eq!(msg.body(tags::TIME_IN_FORCE), Some(values::TIF_IOC));
            assert_eq!(msg.body(tags::ORD_TYPE), Some(values::ORD_TYPE_MARKET));
            assert_eq!(msg.body(tags::SIDE), Some(side.fix_code()));
        }
    }

    #[test]
    fn test_quote_quantity_uses_cash_field() {
        let mut req = request(OrderType::Market, None);
        req.qty_type = QtyType::Quote;
        req.quantity = "250".into();
        let msg = builder().build_new(&req, "pf-1").unwrap();
        assert_eq!(msg.body(tags::CASH_ORDER_QTY), Some("250"));
        assert!(!msg.has_body(tags::ORDER_QTY));
    }

    #[test]
    fn test_validation_errors() {
        let b = builder();
        assert!(matches!(
            b.build_new(&request(OrderType::Limit, None), "pf-1"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            b.build_new(&request(OrderType::Vwap, Some("abc")), "pf-1"),
            Err(Error::Validation(_))
        ));
        let mut bad_qty = request(OrderType::Market, None);
        bad_qty.quantity = "1,5".into();
        assert!(matches!(b.build_new(&bad_qty, "pf-1"), Err(Error::Validation(_))));
    }

    #[test]
    fn test_vwap_default_expiry() {
        let msg = builder()
            .build_new(&request(OrderType::Vwap, Some("50000")), "pf-1")
            .unwrap();
        assert_eq!(msg.body(tags::EXPIRE_TIME), Some("20300630-23:59:59.000"));
        assert_eq!(msg.body(tags::TIME_IN_FORCE), Some(values::TIF_GTD));
        assert_eq!(msg.body(tags::TARGET_STRATEGY), Some(values::STRATEGY_VWAP));
        assert!(!msg.has_body(tags::START_TIME));
        assert!(!msg.has_body(tags::PARTICIPATION_RATE));
    }

    #[test]
    fn test_vwap_relative_default_expiry() {
        let vwap = VwapConfig {
            default_expiry: None,
            default_expiry_hours: 2,
        };
        let b = MessageBuilder::new(&SessionConfig::default(), &vwap);
        let before = Utc::now();
        let msg = b.build_new(&request(OrderType::Vwap, Some("1")), "pf").unwrap();
        let expire = NaiveDateTime::parse_from_str(
            msg.body(tags::EXPIRE_TIME).unwrap(),
            tags::FIX_TIME_FORMAT,
        )
        .unwrap()
        .and_utc();
        assert!(expire >= before + Duration::hours(2) - Duration::seconds(1));
        assert!(expire <= Utc::now() + Duration::hours(2));
    }

    #[test]
    fn test_vwap_expiry_offset_out_of_range() {
        let vwap = VwapConfig {
            default_expiry: None,
            default_expiry_hours: u32::MAX,
        };
        let b = MessageBuilder::new(&SessionConfig::default(), &vwap);
        assert!(matches!(
            b.build_new(&request(OrderType::Vwap, Some("1")), "pf"),
            Err(Error::Config(_))
        ));

        let mut with_expiry = request(OrderType::Vwap, Some("1"));
        with_expiry.vwap.expire_time = Some("2030-01-01T00:00:00Z".into());
        assert!(b.build_new(&with_expiry, "pf").is_ok());
    }

    #[test]
    fn test_vwap_params_parsed_and_verbatim() {
        let mut req = request(OrderType::Vwap, Some("50000"));
        req.vwap = VwapParams {
            start_time: Some("2030-01-02T03:04:05Z".into()),
            participation_rate: Some("0.1".into()),
            expire_time: Some("tomorrow".into()),
        };
        let msg = builder().build_new(&req, "pf-1").unwrap();
        assert_eq!(msg.body(tags::START_TIME), Some("20300102-03:04:05.000"));
        assert_eq!(msg.body(tags::PARTICIPATION_RATE), Some("0.1"));
        assert_eq!(msg.body(tags::EXPIRE_TIME), Some("tomorrow"));
    }

    #[test]
    fn test_time_field_branches() {
        assert_eq!(
            TimeField::parse("2025-07-26T23:59:59Z"),
            TimeField::Parsed("20250726-23:59:59.000".into())
        );
        assert_eq!(
            TimeField::parse("2030-01-01T00:00:00.5Z"),
            TimeField::Parsed("20300101-00:00:00.500".into())
        );
        assert_eq!(
            TimeField::parse("2025-07-26 23:59"),
            TimeField::Verbatim("2025-07-26 23:59".into())
        );
    }

    #[test]
    fn test_status_requires_all_fields() {
        let b = builder();
        let msg = b.build_status("cl-1", "ord-1", "1", "BTC-USD").unwrap();
        assert_eq!(msg.msg_type(), Some(msg_type::STATUS));
        assert_eq!(msg.body(tags::ORDER_ID), Some("ord-1"));
        assert!(matches!(
            b.build_status("cl-1", "", "1", "BTC-USD"),
            Err(Error::IncompleteStatus(id)) if id == "cl-1"
        ));
    }

    #[test]
    fn test_cancel_references_original() {
        let info = OrderInfo {
            cl_ord_id: "orig-1".into(),
            order_id: "ord-9".into(),
            side: "2".into(),
            symbol: "ETH-USD".into(),
            quantity: "3".into(),
            limit_price: "2000".into(),
            ..Default::default()
        };
        let msg = builder().build_cancel(&info, "pf-1");
        assert_eq!(msg.msg_type(), Some(msg_type::CANCEL));
        assert_eq!(msg.body(tags::ORIG_CL_ORD_ID), Some("orig-1"));
        assert_eq!(msg.body(tags::ORDER_ID), Some("ord-9"));
        assert_eq!(msg.body(tags::ORDER_QTY), Some("3"));
        let cl = msg.body(tags::CL_ORD_ID).unwrap();
        assert!(cl.starts_with("cancel-"));
        assert_ne!(cl, "orig-1");
    }

    #[test]
    fn test_quote_request() {
        let b = builder();
        let req = b.quote_request("BTC-USD", Side::Buy, QtyType::Base, "1.0", "50000", "pf-1");
        let msg = b.build_quote_request(&req).unwrap();
        assert_eq!(msg.msg_type(), Some(msg_type::QUOTE_REQUEST));
        assert_eq!(msg.body(tags::QUOTE_REQ_ID), Some(req.quote_req_id.as_str()));
        assert!(req.quote_req_id.starts_with("rfq-"));
        assert_eq!(msg.body(tags::SIDE), Some(values::SIDE_BUY));
        assert_eq!(msg.body(tags::ORDER_QTY), Some("1.0"));
        assert_eq!(msg.body(tags::PRICE), Some("50000"));
        assert_eq!(msg.body(tags::ORD_TYPE), Some(values::ORD_TYPE_LIMIT));
        assert_eq!(msg.body(tags::TIME_IN_FORCE), Some(values::TIF_FOK));

        let bad = b.quote_request("BTC-USD", Side::Buy, QtyType::Base, "x", "50000", "pf-1");
        assert!(b.build_quote_request(&bad).is_err());
    }

    #[test]
    fn test_accept_quote() {
        let msg = builder().build_accept_quote("quote123", "BTC-USD", Side::Sell, "1.0", "49500", "pf-1");
        assert_eq!(msg.msg_type(), Some(msg_type::NEW_ORDER));
        assert_eq!(msg.body(tags::QUOTE_ID), Some("quote123"));
        assert_eq!(msg.body(tags::ORD_TYPE), Some(values::ORD_TYPE_PREVIOUSLY_QUOTED));
        assert_eq!(msg.body(tags::TARGET_STRATEGY), Some(values::STRATEGY_RFQ));
        assert_eq!(msg.body(tags::TIME_IN_FORCE), Some(values::TIF_FOK));
        assert_eq!(msg.body(tags::SIDE), Some(values::SIDE_SELL));
    }

    #[test]
    fn test_augment_logon_signs_sending_time() {
        let b = builder();
        let signer = HmacSigner::new("key", "secret", "pass");
        let mut logon = FixMessage::new(msg_type::LOGON);
        logon.set_header(tags::SENDING_TIME, "20250101-00:00:00.000");

        b.augment_logon(&mut logon, &signer, "pf-1");

        let expected = signer::sign("20250101-00:00:00.000", "A", "1", "key", "COIN", "pass", "secret");
        assert_eq!(logon.body(tags::HMAC), Some(expected.as_str()));
        assert_eq!(logon.body(tags::PASSWORD), Some("pass"));
        assert_eq!(logon.body(tags::ACCESS_KEY), Some("key"));
        assert_eq!(logon.body(tags::DROP_COPY_FLAG), Some("Y"));
        assert_eq!(logon.body(tags::ACCOUNT), Some("pf-1"));
    }
}

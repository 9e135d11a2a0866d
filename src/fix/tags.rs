//! FIX tag numbers and enumerated values used by the order entry flow.

pub type Tag = u32;

// ─────────────────────────────────────────────────────────────
// Header
// ─────────────────────────────────────────────────────────────

pub const MSG_TYPE: Tag = 35;
pub const SENDER_COMP_ID: Tag = 49;
pub const SENDING_TIME: Tag = 52;
pub const TARGET_COMP_ID: Tag = 56;

// ─────────────────────────────────────────────────────────────
// Orders
// ─────────────────────────────────────────────────────────────

/// Portfolio id on this venue
pub const ACCOUNT: Tag = 1;
pub const CL_ORD_ID: Tag = 11;
pub const ORDER_ID: Tag = 37;
pub const ORDER_QTY: Tag = 38;
pub const ORD_STATUS: Tag = 39;
pub const ORD_TYPE: Tag = 40;
pub const ORIG_CL_ORD_ID: Tag = 41;
pub const PRICE: Tag = 44;
pub const SIDE: Tag = 54;
pub const SYMBOL: Tag = 55;
pub const TEXT: Tag = 58;
pub const TIME_IN_FORCE: Tag = 59;
pub const EXPIRE_TIME: Tag = 126;
pub const EXEC_TYPE: Tag = 150;
pub const CASH_ORDER_QTY: Tag = 152;
pub const START_TIME: Tag = 168;
pub const TARGET_STRATEGY: Tag = 847;
pub const PARTICIPATION_RATE: Tag = 849;

// ─────────────────────────────────────────────────────────────
// RFQ
// ─────────────────────────────────────────────────────────────

pub const VALID_UNTIL_TIME: Tag = 62;
pub const QUOTE_ID: Tag = 117;
pub const QUOTE_REQ_ID: Tag = 131;
pub const BID_PX: Tag = 132;
pub const OFFER_PX: Tag = 133;
pub const BID_SIZE: Tag = 134;
pub const OFFER_SIZE: Tag = 135;
pub const QUOTE_ACK_STATUS: Tag = 297;
pub const QUOTE_REJECT_REASON: Tag = 300;

// ─────────────────────────────────────────────────────────────
// Logon
// ─────────────────────────────────────────────────────────────

/// Carries the base64 HMAC signature
pub const HMAC: Tag = 96;
pub const PASSWORD: Tag = 554;
pub const DROP_COPY_FLAG: Tag = 9406;
pub const ACCESS_KEY: Tag = 9407;

/// Message type codes (tag 35)
pub mod msg_type {
    pub const EXECUTION_REPORT: &str = "8";
    pub const LOGON: &str = "A";
    pub const NEW_ORDER: &str = "D";
    pub const CANCEL: &str = "F";
    pub const STATUS: &str = "H";
    pub const QUOTE_REQUEST: &str = "R";
    pub const QUOTE: &str = "S";
    pub const QUOTE_ACK: &str = "b";
}

/// Enumerated field values
pub mod values {
    pub const SIDE_BUY: &str = "1";
    pub const SIDE_SELL: &str = "2";

    pub const ORD_TYPE_MARKET: &str = "1";
    pub const ORD_TYPE_LIMIT: &str = "2";
    /// VWAP orders travel as limit orders with a VWAP target strategy
    pub const ORD_TYPE_VWAP: &str = "2";
    pub const ORD_TYPE_PREVIOUSLY_QUOTED: &str = "D";

    pub const TIF_DAY: &str = "1";
    pub const TIF_IOC: &str = "3";
    pub const TIF_FOK: &str = "4";
    pub const TIF_GTD: &str = "6";

    pub const STRATEGY_LIMIT: &str = "L";
    pub const STRATEGY_MARKET: &str = "M";
    pub const STRATEGY_VWAP: &str = "V";
    pub const STRATEGY_RFQ: &str = "R";

    pub const QUOTE_ACK_REJECTED: &str = "5";

    pub const DROP_COPY_YES: &str = "Y";
}

/// Wire timestamp layout for SendingTime and the VWAP time fields
pub const FIX_TIME_FORMAT: &str = "%Y%m%d-%H:%M:%S%.3f";

/// Operator-supplied timestamp layout for VWAP start/expire times; fractional seconds optional
pub const ISO_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

//! Tag names and value meanings for human-readable message output.

use super::tags::{self, Tag};

/// Semantic name of a tag, or `Tag<n>` when unknown.
pub fn field_name(tag: Tag) -> String {
    let name = match tag {
        1 => "PortfolioID",
        8 => "BeginString",
        9 => "BodyLength",
        10 => "CheckSum",
        11 => "ClOrdID",
        14 => "CumQty",
        18 => "ExecInst",
        31 => "LastPx",
        32 => "LastShares",
        34 => "MsgSeqNum",
        35 => "MsgType",
        37 => "OrderID",
        38 => "OrderQty",
        39 => "OrdStatus",
        40 => "OrdType",
        41 => "OrigClOrdID",
        44 => "Price",
        49 => "SenderCompID",
        52 => "SendingTime",
        54 => "Side",
        55 => "Symbol",
        56 => "TargetCompID",
        58 => "Text",
        59 => "TimeInForce",
        60 => "TransactTime",
        62 => "ValidUntilTime",
        96 => "SecureData",
        98 => "EncryptMethod",
        108 => "HeartBtInt",
        117 => "QuoteID",
        126 => "ExpireTime",
        131 => "QuoteReqID",
        132 => "BidPx",
        133 => "OfferPx",
        134 => "BidSize",
        135 => "OfferSize",
        141 => "ResetSeqNumFlag",
        150 => "ExecType",
        151 => "LeavesQty",
        152 => "CashOrderQty",
        168 => "StartTime",
        297 => "QuoteAckStatus",
        300 => "QuoteRejectReason",
        554 => "Password",
        847 => "TargetStrategy",
        849 => "ParticipationRate",
        8002 => "FilledAmount",
        8006 => "NetAvgPrice",
        9406 => "DropCopyFlag",
        9407 => "AccessKey",
        _ => return format!("Tag{tag}"),
    };
    name.to_string()
}

/// Meaning of an enumerated value, if the tag has a known enumeration.
pub fn describe_value(tag: Tag, value: &str) -> Option<&'static str> {
    match tag {
        tags::MSG_TYPE => msg_type_name(value),
        tags::ORD_STATUS | tags::EXEC_TYPE => ord_status_name(value),
        tags::SIDE => match value {
            "1" => Some("BUY"),
            "2" => Some("SELL"),
            _ => None,
        },
        tags::ORD_TYPE => match value {
            "1" => Some("MARKET"),
            "2" => Some("LIMIT"),
            "D" => Some("PREVIOUSLY_QUOTED"),
            _ => None,
        },
        tags::TIME_IN_FORCE => match value {
            "1" => Some("DAY"),
            "3" => Some("IMMEDIATE_OR_CANCEL"),
            "4" => Some("FILL_OR_KILL"),
            "6" => Some("GOOD_TILL_DATE"),
            _ => None,
        },
        tags::TARGET_STRATEGY => match value {
            "L" => Some("LIMIT"),
            "M" => Some("MARKET"),
            "V" => Some("VWAP"),
            "R" => Some("RFQ"),
            _ => None,
        },
        tags::QUOTE_ACK_STATUS => match value {
            "5" => Some("REJECTED"),
            _ => None,
        },
        _ => None,
    }
}

fn msg_type_name(value: &str) -> Option<&'static str> {
    Some(match value {
        "0" => "HEARTBEAT",
        "1" => "TEST_REQUEST",
        "2" => "RESEND_REQUEST",
        "3" => "REJECT",
        "4" => "SEQUENCE_RESET",
        "5" => "LOGOUT",
        "8" => "EXECUTION_REPORT",
        "9" => "ORDER_CANCEL_REJECT",
        "A" => "LOGON",
        "D" => "NEW_ORDER",
        "F" => "ORDER_CANCEL_REQUEST",
        "G" => "ORDER_CANCEL_REPLACE_REQUEST",
        "H" => "ORDER_STATUS_REQUEST",
        "R" => "QUOTE_REQUEST",
        "S" => "QUOTE",
        "b" => "QUOTE_ACKNOWLEDGMENT",
        _ => return None,
    })
}

fn ord_status_name(value: &str) -> Option<&'static str> {
    Some(match value {
        "0" => "NEW",
        "1" => "PARTIALLY_FILLED",
        "2" => "FILLED",
        "3" => "DONE_FOR_DAY",
        "4" => "CANCELED",
        "5" => "REPLACED",
        "6" => "PENDING_CANCEL",
        "7" => "STOPPED",
        "8" => "REJECTED",
        "9" => "SUSPENDED",
        "A" => "PENDING_NEW",
        "B" => "CALCULATED",
        "C" => "EXPIRED",
        "D" => "ACCEPTED_FOR_BIDDING",
        "E" => "PENDING_REPLACE",
        "I" => "ORDER_STATUS",
        _ => return None,
    })
}

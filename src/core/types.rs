//! Core types - Strong typing for the operator inputs, wire strings for the rest

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::{Error, Result};
use crate::fix::tags::values;

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// FIX side code (tag 54)
    pub fn fix_code(&self) -> &'static str {
        match self {
            Side::Buy => values::SIDE_BUY,
            Side::Sell => values::SIDE_SELL,
        }
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            _ => Err(Error::validation(format!("side must be BUY or SELL, got {s:?}"))),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Order type accepted by the `new` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
    Limit,
    Vwap,
}

impl FromStr for OrderType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "MARKET" => Ok(OrderType::Market),
            "LIMIT" => Ok(OrderType::Limit),
            "VWAP" => Ok(OrderType::Vwap),
            _ => Err(Error::validation(format!(
                "order type must be MARKET, LIMIT or VWAP, got {s:?}"
            ))),
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit => write!(f, "LIMIT"),
            OrderType::Vwap => write!(f, "VWAP"),
        }
    }
}

/// Whether a quantity is denominated in the base asset or the quote (cash) asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QtyType {
    Base,
    Quote,
}

impl FromStr for QtyType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "BASE" => Ok(QtyType::Base),
            "QUOTE" => Ok(QtyType::Quote),
            _ => Err(Error::validation(format!(
                "quantity type must be BASE or QUOTE, got {s:?}"
            ))),
        }
    }
}

/// Checks that a wire string is a decimal number without changing it.
pub fn validate_decimal<'a>(field: &str, raw: &'a str) -> Result<&'a str> {
    Decimal::from_str(raw)
        .map(|_| raw)
        .map_err(|_| Error::validation(format!("{field} must be numeric, got {raw:?}")))
}

/// Last known exchange state of one client order.
///
/// All trading fields are kept as the wire strings that were transmitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInfo {
    pub cl_ord_id: String,
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub side: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub limit_price: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub start_time: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub expire_time: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub participation_rate: String,
}

impl OrderInfo {
    pub fn has_order_id(&self) -> bool {
        !self.order_id.is_empty()
    }
}

/// Outbound request-for-quote parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequestInfo {
    pub quote_req_id: String,
    pub account: String,
    pub side: Side,
    pub symbol: String,
    pub qty_type: QtyType,
    pub order_qty: String,
    pub price: String,
}

/// Inbound quote; acted on immediately and never cached
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteInfo {
    pub quote_id: String,
    pub quote_req_id: String,
    pub account: String,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_px: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_px: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_size: Option<String>,
    pub valid_until_time: String,
}

impl QuoteInfo {
    /// A quote with neither bid nor offer price cannot be acted on.
    pub fn is_priced(&self) -> bool {
        self.bid_px.is_some() || self.offer_px.is_some()
    }
}

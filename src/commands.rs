//! Operator commands - parsing and execution
//!
//! ```text
//! new <symbol> <MARKET|LIMIT|VWAP> <BUY|SELL> <BASE|QUOTE> <qty> [price] [start] [participation] [expire]
//! status <ClOrdId> [OrderId] [Side] [Symbol]
//! cancel <ClOrdId>
//! list
//! rfq <symbol> <BUY|SELL> <BASE|QUOTE> <qty> <price>
//! version | help | exit
//! ```

use std::sync::Arc;
use tracing::info;

use crate::builder::{MessageBuilder, NewOrderRequest, VwapParams};
use crate::cache::OrderCache;
use crate::core::{Error, OrderInfo, QtyType, Result, Session, Side};
use crate::fix::tags;

pub const USAGE: &str = "\
Commands:
  new <symbol> <MARKET|LIMIT|VWAP> <BUY|SELL> <BASE|QUOTE> <qty> [price] [start] [participation] [expire]
  status <ClOrdId> [OrderId] [Side] [Symbol]
  cancel <ClOrdId>
  list
  rfq <symbol> <BUY|SELL> <BASE|QUOTE> <qty> <price>
  version
  exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New(NewOrderRequest),
    Status {
        cl_ord_id: String,
        order_id: Option<String>,
        side: Option<String>,
        symbol: Option<String>,
    },
    Cancel {
        cl_ord_id: String,
    },
    List,
    Rfq {
        symbol: String,
        side: Side,
        qty_type: QtyType,
        qty: String,
        price: String,
    },
    Version,
    Help,
    Exit,
}

impl Command {
    /// Parses one input line; blank lines give `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(first) = parts.first() else {
            return Ok(None);
        };
        let arg = |i: usize| parts.get(i).map(|s| s.to_string());

        let cmd = match first.to_ascii_lowercase().as_str() {
            "new" => {
                if parts.len() < 6 {
                    return Err(usage("new <symbol> <MARKET|LIMIT|VWAP> <BUY|SELL> <BASE|QUOTE> <qty> [price] [start] [participation] [expire]"));
                }
                Command::New(NewOrderRequest {
                    symbol: parts[1].to_string(),
                    order_type: parts[2].parse()?,
                    side: parts[3].parse()?,
                    qty_type: parts[4].parse()?,
                    quantity: parts[5].to_string(),
                    price: arg(6),
                    vwap: VwapParams {
                        start_time: arg(7),
                        participation_rate: arg(8),
                        expire_time: arg(9),
                    },
                })
            }
            "status" => {
                if parts.len() < 2 {
                    return Err(usage("status <ClOrdId> [OrderId] [Side] [Symbol]"));
                }
                Command::Status {
                    cl_ord_id: parts[1].to_string(),
                    order_id: arg(2),
                    side: arg(3),
                    symbol: arg(4),
                }
            }
            "cancel" => {
                if parts.len() < 2 {
                    return Err(usage("cancel <ClOrdId>"));
                }
                Command::Cancel {
                    cl_ord_id: parts[1].to_string(),
                }
            }
            "list" => Command::List,
            "rfq" => {
                if parts.len() < 6 {
                    return Err(usage("rfq <symbol> <BUY|SELL> <BASE|QUOTE> <qty> <price>"));
                }
                Command::Rfq {
                    symbol: parts[1].to_string(),
                    side: parts[2].parse()?,
                    qty_type: parts[3].parse()?,
                    qty: parts[4].to_string(),
                    price: parts[5].to_string(),
                }
            }
            "version" => Command::Version,
            "help" => Command::Help,
            "exit" | "quit" => Command::Exit,
            other => return Err(Error::validation(format!("unknown command {other:?}"))),
        };
        Ok(Some(cmd))
    }
}

fn usage(text: &str) -> Error {
    Error::validation(format!("usage: {text}"))
}

/// What a command produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A message was handed to the session; `id` is its ClOrdId or QuoteReqId
    Submitted { kind: &'static str, id: String },
    Orders(Vec<OrderInfo>),
    Info(String),
    Exit,
}

impl std::fmt::Display for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reply::Submitted { kind, id } => write!(f, "{kind} sent ({id})"),
            Reply::Orders(orders) if orders.is_empty() => write!(f, "(no cached orders)"),
            Reply::Orders(orders) => {
                for (i, o) in orders.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(
                        f,
                        "{:<28} → {} ({} {} {})",
                        o.cl_ord_id, o.order_id, o.side, o.symbol, o.quantity
                    )?;
                }
                Ok(())
            }
            Reply::Info(text) => write!(f, "{text}"),
            Reply::Exit => write!(f, "bye"),
        }
    }
}

/// Executes operator commands against the cache and the outbound session
pub struct CommandHandler {
    builder: Arc<MessageBuilder>,
    cache: Arc<OrderCache>,
    session: Arc<dyn Session>,
    portfolio: String,
}

impl CommandHandler {
    pub fn new(
        builder: Arc<MessageBuilder>,
        cache: Arc<OrderCache>,
        session: Arc<dyn Session>,
        portfolio: impl Into<String>,
    ) -> Self {
        Self {
            builder,
            cache,
            session,
            portfolio: portfolio.into(),
        }
    }

    /// Parses and executes one line.
    pub fn handle_line(&self, line: &str) -> Result<Option<Reply>> {
        match Command::parse(line)? {
            Some(cmd) => self.execute(cmd).map(Some),
            None => Ok(None),
        }
    }

    pub fn execute(&self, cmd: Command) -> Result<Reply> {
        match cmd {
            Command::New(req) => {
                let msg = self.builder.build_new(&req, &self.portfolio)?;
                let id = msg.get_or_empty(tags::CL_ORD_ID);
                info!("New {} {} {} {} {}", req.order_type, req.side, req.quantity, req.symbol, id);
                self.session.submit(msg)?;
                Ok(Reply::Submitted { kind: "new order", id })
            }
            Command::Status {
                cl_ord_id,
                order_id,
                side,
                symbol,
            } => {
                let cached = self.cache.get(&cl_ord_id).unwrap_or_default();
                let order_id = order_id.unwrap_or(cached.order_id);
                let side = side.map(|s| side_code(&s)).unwrap_or(cached.side);
                let symbol = symbol.unwrap_or(cached.symbol);

                let msg = self.builder.build_status(&cl_ord_id, &order_id, &side, &symbol)?;
                self.session.submit(msg)?;
                Ok(Reply::Submitted {
                    kind: "status request",
                    id: cl_ord_id,
                })
            }
            Command::Cancel { cl_ord_id } => {
                let info = self
                    .cache
                    .get(&cl_ord_id)
                    .ok_or_else(|| Error::UnknownOrder(cl_ord_id.clone()))?;
                let msg = self.builder.build_cancel(&info, &self.portfolio);
                let id = msg.get_or_empty(tags::CL_ORD_ID);
                info!("Cancel {} as {}", cl_ord_id, id);
                self.session.submit(msg)?;
                Ok(Reply::Submitted { kind: "cancel", id })
            }
            Command::List => Ok(Reply::Orders(self.cache.list())),
            Command::Rfq {
                symbol,
                side,
                qty_type,
                qty,
                price,
            } => {
                let req =
                    self.builder
                        .quote_request(&symbol, side, qty_type, &qty, &price, &self.portfolio);
                let msg = self.builder.build_quote_request(&req)?;
                info!("RFQ {} {} {} {} @ {}", req.quote_req_id, side, qty, symbol, price);
                self.session.submit(msg)?;
                Ok(Reply::Submitted {
                    kind: "quote request",
                    id: req.quote_req_id,
                })
            }
            Command::Version => Ok(Reply::Info(version())),
            Command::Help => Ok(Reply::Info(USAGE.to_string())),
            Command::Exit => Ok(Reply::Exit),
        }
    }
}

pub fn version() -> String {
    format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// BUY/SELL become wire codes; anything else is sent as typed.
fn side_code(raw: &str) -> String {
    raw.parse::<Side>()
        .map(|s| s.fix_code().to_string())
        .unwrap_or_else(|_| raw.to_string())
}

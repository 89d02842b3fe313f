//! Text command front-end for the matching engine.
//!
//! One comma-separated command per line:
//!
//! ```text
//! LIMIT,BUY,150.25,100
//! MARKET,SELL,,50
//! CANCEL,,,,5
//! PRINT
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Parse and
//! validation failures become `ERROR:` lines; the engine is never
//! invoked on a malformed command.

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::matching::MatchingEngine;
use crate::types::{price_from_decimal, price_to_string, OrderId, OrderType, Quantity, Side, Trade};

/// A command line that could not be parsed or validated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("CANCEL requires order_id as 5th field")]
    CancelMissingId,
    #[error("invalid order id '{0}'")]
    BadOrderId(String),
    #[error("expected TYPE,SIDE,PRICE,QTY")]
    MissingFields,
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("unknown side '{0}'")]
    UnknownSide(String),
    #[error("LIMIT order requires a price")]
    MissingPrice,
    #[error("invalid price '{0}'")]
    BadPrice(String),
    #[error("invalid quantity '{0}'")]
    BadQuantity(String),
    #[error("quantity must be > 0")]
    ZeroQuantity,
}

/// What a successfully handled line produced.
enum Executed {
    Skipped,
    Snapshot,
    Trades(Vec<Trade>),
    Cancelled(OrderId),
    CancelRejected(OrderId),
}

/// Line-oriented command parser driving a mutably borrowed engine.
pub struct CsvParser<'e> {
    engine: &'e mut MatchingEngine,
}

impl<'e> CsvParser<'e> {
    pub fn new(engine: &'e mut MatchingEngine) -> Self {
        Self { engine }
    }

    /// Process a single line, writing trades, acks, and errors to `out`.
    pub fn process_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<()> {
        match self.execute_line(line) {
            Ok(Executed::Skipped) => Ok(()),
            Ok(Executed::Snapshot) => self.engine.book().write_snapshot(out),
            Ok(Executed::Trades(trades)) => {
                for t in &trades {
                    writeln!(
                        out,
                        "TRADE {} {} {} {}",
                        t.buyer_order_id,
                        t.seller_order_id,
                        price_to_string(t.price),
                        t.quantity
                    )?;
                }
                Ok(())
            }
            Ok(Executed::Cancelled(id)) => writeln!(out, "CANCELLED {id}"),
            Ok(Executed::CancelRejected(id)) => writeln!(out, "CANCEL_REJECT {id} (not found)"),
            Err(e) => writeln!(out, "ERROR: {e}"),
        }
    }

    /// Process every line from a reader.
    pub fn process_stream(&mut self, input: impl BufRead, out: &mut impl Write) -> io::Result<()> {
        for line in input.lines() {
            self.process_line(&line?, out)?;
        }
        Ok(())
    }

    fn execute_line(&mut self, line: &str) -> Result<Executed, CommandError> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(Executed::Skipped);
        }

        let tokens: Vec<&str> = trimmed.split(',').collect();
        let cmd = tokens[0].to_ascii_uppercase();

        if cmd == "PRINT" {
            return Ok(Executed::Snapshot);
        }

        if cmd == "CANCEL" {
            let field = *tokens.get(4).ok_or(CommandError::CancelMissingId)?;
            let id: OrderId = field
                .trim()
                .parse()
                .map_err(|_| CommandError::BadOrderId(field.to_string()))?;
            return Ok(if self.engine.cancel_order(id) {
                Executed::Cancelled(id)
            } else {
                Executed::CancelRejected(id)
            });
        }

        // LIMIT or MARKET order
        if tokens.len() < 4 {
            return Err(CommandError::MissingFields);
        }

        let order_type = match cmd.as_str() {
            "LIMIT" => OrderType::Limit,
            "MARKET" => OrderType::Market,
            _ => return Err(CommandError::UnknownCommand(cmd)),
        };

        let side = match tokens[1].to_ascii_uppercase().as_str() {
            "BUY" | "B" => Side::Buy,
            "SELL" | "S" => Side::Sell,
            other => return Err(CommandError::UnknownSide(other.to_string())),
        };

        let price = if order_type == OrderType::Limit {
            if tokens[2].trim().is_empty() {
                return Err(CommandError::MissingPrice);
            }
            price_from_decimal(tokens[2]).ok_or_else(|| CommandError::BadPrice(tokens[2].to_string()))?
        } else {
            0
        };

        let quantity: Quantity = tokens[3]
            .trim()
            .parse()
            .map_err(|_| CommandError::BadQuantity(tokens[3].to_string()))?;
        if quantity == 0 {
            return Err(CommandError::ZeroQuantity);
        }

        let result = self.engine.process_order(side, order_type, price, quantity);
        Ok(Executed::Trades(result.trades))
    }
}

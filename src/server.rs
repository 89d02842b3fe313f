//! TCP server: 32-byte framing and connection management around the engine.
//!
//! The engine is moved into a single task that drains a request channel,
//! so the single-writer discipline of the core survives any number of
//! concurrent connections. Each connection gets a reader task (framing
//! via `read_exact`; the engine never sees a partial record) and a
//! writer task fed by a per-client response channel.

use std::io;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::matching::MatchingEngine;
use crate::protocol::{MsgType, OrderMessage, ResponseMessage, MSG_SIZE};
use crate::types::{OrderType, Side};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 9000;

/// A framed request plus the channel its responses go back on.
struct EngineRequest {
    msg: OrderMessage,
    reply: mpsc::UnboundedSender<ResponseMessage>,
}

/// Translate one wire message into an engine call and its response
/// sequence: ACK then one FILL per trade for new orders, ACK or REJECT
/// for cancels, a single REJECT for anything malformed.
pub fn handle_message(engine: &mut MatchingEngine, msg: &OrderMessage) -> Vec<ResponseMessage> {
    match MsgType::from_u8(msg.msg_type) {
        Some(MsgType::Cancel) => {
            if engine.cancel_order(msg.order_id) {
                vec![ResponseMessage::ack(msg.order_id)]
            } else {
                vec![ResponseMessage::reject(msg.order_id)]
            }
        }
        Some(MsgType::NewOrder) => {
            let (Some(side), Some(order_type)) =
                (Side::from_u8(msg.side), OrderType::from_u8(msg.order_type))
            else {
                return vec![ResponseMessage::reject(0)];
            };
            // Caller-input validation stays at the boundary; the core
            // assumes positive quantities and limit prices
            if msg.quantity == 0 || (order_type == OrderType::Limit && msg.price <= 0) {
                return vec![ResponseMessage::reject(0)];
            }

            let result = engine.process_order(side, order_type, msg.price, msg.quantity);
            let mut out = Vec::with_capacity(1 + result.trades.len());
            out.push(ResponseMessage::ack(result.order_id));
            for t in &result.trades {
                let match_id = match side {
                    Side::Buy => t.seller_order_id,
                    Side::Sell => t.buyer_order_id,
                };
                out.push(ResponseMessage::fill(result.order_id, t.price, t.quantity, match_id));
            }
            out
        }
        _ => vec![ResponseMessage::reject(0)],
    }
}

/// Accept connections forever, feeding all requests through the single
/// engine task. Runs until the listener fails; the caller composes this
/// with a shutdown signal.
pub async fn serve(listener: TcpListener, engine: MatchingEngine) -> io::Result<()> {
    let (req_tx, mut req_rx) = mpsc::channel::<EngineRequest>(1024);

    // The engine lives in exactly one task: all matching is serialized here
    tokio::spawn(async move {
        let mut engine = engine;
        while let Some(req) = req_rx.recv().await {
            for resp in handle_message(&mut engine, &req.msg) {
                if req.reply.send(resp).is_err() {
                    break;
                }
            }
        }
    });

    loop {
        let (stream, peer) = listener.accept().await?;
        info!(%peer, "client connected");
        let req_tx = req_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = serve_client(stream, req_tx).await {
                debug!(%peer, error = %e, "connection error");
            }
            info!(%peer, "client disconnected");
        });
    }
}

/// Bind the port, run until Ctrl-C.
pub async fn run(port: u16) -> io::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "order book server listening");

    tokio::select! {
        result = serve(listener, MatchingEngine::new()) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown requested");
            Ok(())
        }
    }
}

async fn serve_client(
    stream: TcpStream,
    req_tx: mpsc::Sender<EngineRequest>,
) -> io::Result<()> {
    // Small fixed frames; don't let Nagle batch them
    stream.set_nodelay(true)?;
    let (mut reader, mut writer) = stream.into_split();
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<ResponseMessage>();

    let write_task = tokio::spawn(async move {
        while let Some(resp) = reply_rx.recv().await {
            if writer.write_all(&resp.encode()).await.is_err() {
                break;
            }
        }
    });

    let mut buf = [0u8; MSG_SIZE];
    let result = loop {
        match reader.read_exact(&mut buf).await {
            Ok(_) => {
                let msg = OrderMessage::decode(&buf);
                let req = EngineRequest {
                    msg,
                    reply: reply_tx.clone(),
                };
                if req_tx.send(req).await.is_err() {
                    // Engine task is gone; we are shutting down
                    break Ok(());
                }
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break Ok(()),
            Err(e) => break Err(e),
        }
    };

    drop(reply_tx);
    let _ = write_task.await;
    result
}

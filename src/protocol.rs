//! Binary wire protocol: fixed 32-byte little-endian records.
//!
//! Fixed-width frames mean the connection layer can deliver whole
//! messages with no parsing state machine; the engine never sees a
//! partial record. Encoding is explicit per-field serialization so the
//! wire layout is pinned regardless of host endianness or struct layout.

use crate::types::{OrderId, Price, Quantity};

/// Every message on the wire is exactly this many bytes.
pub const MSG_SIZE: usize = 32;

/// Wire message discriminants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum MsgType {
    NewOrder = 1,
    Cancel = 2,
    Ack = 10,
    Fill = 11,
    Reject = 12,
}

impl MsgType {
    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(MsgType::NewOrder),
            2 => Some(MsgType::Cancel),
            10 => Some(MsgType::Ack),
            11 => Some(MsgType::Fill),
            12 => Some(MsgType::Reject),
            _ => None,
        }
    }
}

/// Client -> Server order record.
///
/// | Offset | Field      | Type |
/// |--------|------------|------|
/// | 0      | msg_type   | u8   |
/// | 1      | side       | u8   |
/// | 2      | order_type | u8   |
/// | 3..8   | reserved   |      |
/// | 8..16  | order_id   | u64  |
/// | 16..24 | price      | i64  |
/// | 24..28 | quantity   | u32  |
/// | 28..32 | reserved   |      |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OrderMessage {
    pub msg_type: u8,
    pub side: u8,
    pub order_type: u8,
    /// Ignored for NEW_ORDER (the server assigns); the id to cancel for CANCEL.
    pub order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
}

impl OrderMessage {
    pub fn encode(&self) -> [u8; MSG_SIZE] {
        let mut buf = [0u8; MSG_SIZE];
        buf[0] = self.msg_type;
        buf[1] = self.side;
        buf[2] = self.order_type;
        buf[8..16].copy_from_slice(&self.order_id.to_le_bytes());
        buf[16..24].copy_from_slice(&self.price.to_le_bytes());
        buf[24..28].copy_from_slice(&self.quantity.to_le_bytes());
        buf
    }

    pub fn decode(buf: &[u8; MSG_SIZE]) -> Self {
        Self {
            msg_type: buf[0],
            side: buf[1],
            order_type: buf[2],
            order_id: u64::from_le_bytes(buf[8..16].try_into().unwrap()),
            price: i64::from_le_bytes(buf[16..24].try_into().unwrap()),
            quantity: u32::from_le_bytes(buf[24..28].try_into().unwrap()),
        }
    }
}

/// Server -> Client response record.
///
/// | Offset | Field    | Type |
/// |--------|----------|------|
/// | 0      | msg_type | u8   |
/// | 1..4   | reserved |      |
/// | 4..8   | quantity | u32  |
/// | 8..16  | order_id | u64  |
/// | 16..24 | price    | i64  |
/// | 24..32 | match_id | u64  |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResponseMessage {
    pub msg_type: u8,
    pub quantity: Quantity,
    pub order_id: OrderId,
    pub price: Price,
    /// Counterparty order id on fills; zero otherwise.
    pub match_id: OrderId,
}

impl ResponseMessage {
    pub fn ack(order_id: OrderId) -> Self {
        Self {
            msg_type: MsgType::Ack as u8,
            order_id,
            ..Default::default()
        }
    }

    pub fn fill(order_id: OrderId, price: Price, quantity: Quantity, match_id: OrderId) -> Self {
        Self {
            msg_type: MsgType::Fill as u8,
            quantity,
            order_id,
            price,
            match_id,
        }
    }

    pub fn reject(order_id: OrderId) -> Self {
        Self {
            msg_type: MsgType::Reject as u8,
            order_id,
            ..Default::default()
        }
    }

    pub fn encode(&self) -> [u8; MSG_SIZE] {
        let mut buf = [0u8; MSG_SIZE];
        buf[0] = self.msg_type;
        buf[4..8].copy_from_slice(&self.quantity.to_le_bytes());
        buf[8..16].copy_from_slice(&self.order_id.to_le_bytes());
        buf[16..24].copy_from_slice(&self.price.to_le_bytes());
        buf[24..32].copy_from_slice(&self.match_id.to_le_bytes());
        buf
    }

    pub fn decode(buf: &[u8; MSG_SIZE]) -> Self {
        Self {
            msg_type: buf[0],
            quantity: u32::from_le_bytes(buf[4..8].try_into().unwrap()),
            order_id: u64::from_le_bytes(buf[8..16].try_into().unwrap()),
            price: i64::from_le_bytes(buf[16..24].try_into().unwrap()),
            match_id: u64::from_le_bytes(buf[24..32].try_into().unwrap()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msg_type_round_trip() {
        for t in [
            MsgType::NewOrder,
            MsgType::Cancel,
            MsgType::Ack,
            MsgType::Fill,
            MsgType::Reject,
        ] {
            assert_eq!(MsgType::from_u8(t as u8), Some(t));
        }
        assert_eq!(MsgType::from_u8(0), None);
        assert_eq!(MsgType::from_u8(99), None);
    }

    #[test]
    fn test_order_message_wire_layout() {
        let msg = OrderMessage {
            msg_type: MsgType::NewOrder as u8,
            side: 1,
            order_type: 0,
            order_id: 0x0102030405060708,
            price: 15025,
            quantity: 100,
        };
        let buf = msg.encode();

        assert_eq!(buf[0], 1);
        assert_eq!(buf[1], 1);
        assert_eq!(buf[2], 0);
        assert_eq!(&buf[3..8], &[0, 0, 0, 0, 0]);
        assert_eq!(&buf[8..16], &[8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(&buf[16..24], &15025i64.to_le_bytes());
        assert_eq!(&buf[24..28], &100u32.to_le_bytes());
        assert_eq!(&buf[28..32], &[0, 0, 0, 0]);

        assert_eq!(OrderMessage::decode(&buf), msg);
    }

    #[test]
    fn test_response_message_wire_layout() {
        let msg = ResponseMessage::fill(42, -15025, 7, 99);
        let buf = msg.encode();

        assert_eq!(buf[0], 11);
        assert_eq!(&buf[1..4], &[0, 0, 0]);
        assert_eq!(&buf[4..8], &7u32.to_le_bytes());
        assert_eq!(&buf[8..16], &42u64.to_le_bytes());
        assert_eq!(&buf[16..24], &(-15025i64).to_le_bytes());
        assert_eq!(&buf[24..32], &99u64.to_le_bytes());

        assert_eq!(ResponseMessage::decode(&buf), msg);
    }

    #[test]
    fn test_response_constructors() {
        let ack = ResponseMessage::ack(5);
        assert_eq!(ack.msg_type, MsgType::Ack as u8);
        assert_eq!(ack.order_id, 5);
        assert_eq!(ack.match_id, 0);

        let reject = ResponseMessage::reject(9);
        assert_eq!(reject.msg_type, MsgType::Reject as u8);
        assert_eq!(reject.order_id, 9);
        assert_eq!(reject.quantity, 0);
    }
}

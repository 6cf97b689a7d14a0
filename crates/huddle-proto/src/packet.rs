//! Engine.IO v4 / Socket.IO v5 text packets.
//!
//! The room server speaks Socket.IO over a raw WebSocket. Each WebSocket text
//! frame carries one Engine.IO packet; Engine.IO `message` packets wrap one
//! Socket.IO packet. Only the text encoding on the default namespace is
//! supported. Binary attachments are rejected.
//!
//! ```text
//! 0{"sid":"..","pingInterval":25000,"pingTimeout":20000}   open
//! 2 / 3                                                      ping / pong
//! 40                                                         connect
//! 42["receive_message",{...}]                                event
//! ```

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::{
    errors::{ProtocolError, Result},
    event::OutboundEvent,
};

/// Engine.IO handshake data carried by the `open` packet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OpenHandshake {
    /// Engine.IO session id.
    pub sid: String,
    /// Interval at which the server pings, in milliseconds.
    #[serde(rename = "pingInterval")]
    pub ping_interval_ms: u64,
    /// Time the server waits for a pong, in milliseconds.
    #[serde(rename = "pingTimeout")]
    pub ping_timeout_ms: u64,
    /// Transports the server would upgrade to.
    #[serde(default)]
    pub upgrades: Vec<String>,
}

impl OpenHandshake {
    /// Interval at which the server pings.
    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.ping_interval_ms)
    }

    /// Longest silence tolerated before the connection is considered dead.
    pub fn liveness_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_interval_ms.saturating_add(self.ping_timeout_ms))
    }
}

/// Engine.IO packet.
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    /// Session opened (type `0`).
    Open(OpenHandshake),
    /// Session closed (type `1`).
    Close,
    /// Heartbeat probe (type `2`).
    Ping(String),
    /// Heartbeat reply (type `3`).
    Pong(String),
    /// Socket.IO payload (type `4`).
    Message(SocketPacket),
    /// Transport upgrade (type `5`).
    Upgrade,
    /// No-op (type `6`).
    Noop,
}

/// Socket.IO packet on the default namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    /// Namespace connect request or acknowledgement (type `0`).
    Connect {
        /// Socket id assigned by the server. `None` in the client request.
        sid: Option<String>,
    },
    /// Namespace disconnect (type `1`).
    Disconnect,
    /// Named event (type `2`).
    Event {
        /// Event name.
        name: String,
        /// First event argument. `Null` if the event carried none.
        payload: Value,
        /// Acknowledgement id requested by the sender.
        ack_id: Option<u64>,
    },
    /// Acknowledgement of an event (type `3`).
    Ack {
        /// Id of the acknowledged event.
        ack_id: u64,
        /// Acknowledgement arguments.
        data: Value,
    },
    /// Namespace connect refused (type `4`).
    ConnectError {
        /// Reason given by the server.
        message: String,
    },
}

impl EnginePacket {
    /// Parse a WebSocket text frame.
    pub fn parse(text: &str) -> Result<Self> {
        let mut chars = text.chars();
        let kind = chars.next().ok_or(ProtocolError::EmptyPacket)?;
        let rest = chars.as_str();

        match kind {
            '0' => {
                let handshake = serde_json::from_str(rest)
                    .map_err(|e| ProtocolError::malformed("open handshake", e))?;
                Ok(Self::Open(handshake))
            },
            '1' => Ok(Self::Close),
            '2' => Ok(Self::Ping(rest.to_string())),
            '3' => Ok(Self::Pong(rest.to_string())),
            '4' => SocketPacket::parse(rest).map(Self::Message),
            '5' => Ok(Self::Upgrade),
            '6' => Ok(Self::Noop),
            other => Err(ProtocolError::UnknownEngineType(other)),
        }
    }

    /// Encode as a WebSocket text frame.
    pub fn encode(&self) -> String {
        match self {
            Self::Open(handshake) => format!(
                "0{{\"sid\":{},\"pingInterval\":{},\"pingTimeout\":{},\"upgrades\":[]}}",
                Value::String(handshake.sid.clone()),
                handshake.ping_interval_ms,
                handshake.ping_timeout_ms
            ),
            Self::Close => "1".to_string(),
            Self::Ping(data) => format!("2{data}"),
            Self::Pong(data) => format!("3{data}"),
            Self::Message(packet) => format!("4{}", packet.encode()),
            Self::Upgrade => "5".to_string(),
            Self::Noop => "6".to_string(),
        }
    }
}

impl SocketPacket {
    /// Parse the Socket.IO part of an Engine.IO message packet.
    pub fn parse(text: &str) -> Result<Self> {
        let mut chars = text.chars();
        let kind = chars.next().ok_or(ProtocolError::EmptyPacket)?;
        let (ack_id, body) = split_header(chars.as_str())?;

        match kind {
            '0' => {
                let sid = if body.is_empty() {
                    None
                } else {
                    let value: Value = parse_json("connect", body)?;
                    value.get("sid").and_then(Value::as_str).map(str::to_string)
                };
                Ok(Self::Connect { sid })
            },
            '1' => Ok(Self::Disconnect),
            '2' => {
                let mut args = match parse_json("event", body)? {
                    Value::Array(args) => args.into_iter(),
                    other => {
                        return Err(ProtocolError::Malformed {
                            context: "event",
                            reason: format!("expected array, got {other}"),
                        });
                    },
                };
                let name = match args.next() {
                    Some(Value::String(name)) => name,
                    _ => {
                        return Err(ProtocolError::Malformed {
                            context: "event",
                            reason: "first element must be the event name".to_string(),
                        });
                    },
                };
                let payload = args.next().unwrap_or(Value::Null);
                Ok(Self::Event { name, payload, ack_id })
            },
            '3' => {
                let ack_id = ack_id.ok_or_else(|| ProtocolError::Malformed {
                    context: "ack",
                    reason: "missing ack id".to_string(),
                })?;
                let data = if body.is_empty() { Value::Null } else { parse_json("ack", body)? };
                Ok(Self::Ack { ack_id, data })
            },
            '4' => {
                let message = match parse_json("connect error", body)? {
                    Value::String(message) => message,
                    value => value
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("connection refused")
                        .to_string(),
                };
                Ok(Self::ConnectError { message })
            },
            '5' | '6' => Err(ProtocolError::Malformed {
                context: "socket.io packet",
                reason: "binary packets are not supported".to_string(),
            }),
            other => Err(ProtocolError::UnknownSocketType(other)),
        }
    }

    /// Encode without the Engine.IO prefix.
    pub fn encode(&self) -> String {
        match self {
            Self::Connect { sid: None } => "0".to_string(),
            Self::Connect { sid: Some(sid) } => {
                format!("0{{\"sid\":{}}}", Value::String(sid.clone()))
            },
            Self::Disconnect => "1".to_string(),
            Self::Event { name, payload, ack_id } => {
                let args = Value::Array(vec![Value::String(name.clone()), payload.clone()]);
                match ack_id {
                    Some(id) => format!("2{id}{args}"),
                    None => format!("2{args}"),
                }
            },
            Self::Ack { ack_id, data } => format!("3{ack_id}{data}"),
            Self::ConnectError { message } => {
                format!("4{{\"message\":{}}}", Value::String(message.clone()))
            },
        }
    }
}

/// Encode an outbound event as a complete WebSocket text frame.
pub fn encode_event(event: &OutboundEvent) -> Result<String> {
    let packet = SocketPacket::Event {
        name: event.name().to_string(),
        payload: event.payload()?,
        ack_id: None,
    };
    Ok(EnginePacket::Message(packet).encode())
}

/// Split the optional namespace and ack id off a Socket.IO packet body.
///
/// Only the default namespace is served; packets for other namespaces are
/// rejected.
fn split_header(text: &str) -> Result<(Option<u64>, &str)> {
    let mut rest = text;

    if rest.starts_with('/') {
        let (namespace, tail) = rest.split_once(',').unwrap_or((rest, ""));
        if namespace != "/" {
            return Err(ProtocolError::Malformed {
                context: "socket.io packet",
                reason: format!("unsupported namespace {namespace}"),
            });
        }
        rest = tail;
    }

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return Ok((None, rest));
    }

    let (id, body) = rest.split_at(digits);
    let ack_id = id.parse().map_err(|e| ProtocolError::malformed("ack id", e))?;
    Ok((Some(ack_id), body))
}

fn parse_json(context: &'static str, text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| ProtocolError::malformed(context, e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::event::{ChatMessage, TypingNotice};

    #[test]
    fn parse_open_handshake() {
        let text = r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
        let EnginePacket::Open(handshake) = EnginePacket::parse(text).unwrap() else {
            unreachable!("expected open packet");
        };

        assert_eq!(handshake.sid, "abc");
        assert_eq!(handshake.ping_interval(), Duration::from_secs(25));
        assert_eq!(handshake.liveness_timeout(), Duration::from_secs(45));
    }

    #[test]
    fn parse_ping_and_encode_pong() {
        assert_eq!(EnginePacket::parse("2").unwrap(), EnginePacket::Ping(String::new()));
        assert_eq!(EnginePacket::Pong(String::new()).encode(), "3");
    }

    #[test]
    fn parse_connect_ack() {
        let packet = EnginePacket::parse(r#"40{"sid":"xyz"}"#).unwrap();
        assert_eq!(
            packet,
            EnginePacket::Message(SocketPacket::Connect { sid: Some("xyz".to_string()) })
        );
    }

    #[test]
    fn client_connect_request_encoding() {
        assert_eq!(EnginePacket::Message(SocketPacket::Connect { sid: None }).encode(), "40");
    }

    #[test]
    fn parse_event_with_payload() {
        let text = r#"42["hear_typing",{"author":"bob","isTyped":true}]"#;
        let packet = EnginePacket::parse(text).unwrap();

        assert_eq!(
            packet,
            EnginePacket::Message(SocketPacket::Event {
                name: "hear_typing".to_string(),
                payload: json!({"author": "bob", "isTyped": true}),
                ack_id: None,
            })
        );
    }

    #[test]
    fn parse_event_with_namespace_and_ack_id() {
        let packet = SocketPacket::parse(r#"2/,12["join_room","r1"]"#).unwrap();
        assert_eq!(packet, SocketPacket::Event {
            name: "join_room".to_string(),
            payload: json!("r1"),
            ack_id: Some(12),
        });
    }

    #[test]
    fn reject_foreign_namespace() {
        assert!(SocketPacket::parse(r#"2/admin,["x"]"#).is_err());
    }

    #[test]
    fn encode_send_message_event() {
        let event =
            OutboundEvent::SendMessage(ChatMessage::new("alice", "hi", "3:04:05 PM", "12345"));
        let text = encode_event(&event).unwrap();

        assert!(text.starts_with(r#"42["send_message","#));
        assert_eq!(
            EnginePacket::parse(&text).unwrap(),
            EnginePacket::Message(SocketPacket::Event {
                name: "send_message".to_string(),
                payload: json!({
                    "author": "alice",
                    "message": "hi",
                    "time": "3:04:05 PM",
                    "room": "12345",
                }),
                ack_id: None,
            })
        );
    }

    #[test]
    fn encode_typing_event() {
        let event =
            OutboundEvent::Typing(TypingNotice { author: "alice".into(), room_id: "r".into() });
        assert_eq!(encode_event(&event).unwrap(), r#"42["typing",{"author":"alice","room":"r"}]"#);
    }

    #[test]
    fn reject_garbage() {
        assert_eq!(EnginePacket::parse(""), Err(ProtocolError::EmptyPacket));
        assert_eq!(EnginePacket::parse("9"), Err(ProtocolError::UnknownEngineType('9')));
        assert!(EnginePacket::parse("42not json").is_err());
        assert!(EnginePacket::parse(r#"42{"a":1}"#).is_err());
        assert!(EnginePacket::parse("42[1,2]").is_err());
        assert!(EnginePacket::parse("451-[\"x\",{}]").is_err());
    }

    #[test]
    fn connect_error_message() {
        let packet = SocketPacket::parse(r#"4{"message":"Not authorized"}"#).unwrap();
        assert_eq!(packet, SocketPacket::ConnectError { message: "Not authorized".to_string() });
    }
}

//! Minecraft Server List Ping prober.
//!
//! Protocol: handshake (next state = status), status request, then a single
//! VarInt-framed packet carrying the status JSON.
//!
//! `_minecraft._tcp` SRV records are not consulted: the configured address and
//! port are dialled as given.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::config::ProberConfig;

use super::{ProbeError, ServerStatus, StatusProber};

/// Protocol version announced in the handshake.
const PROTOCOL_VERSION: i32 = 47;

/// Upper bound on the status packet we accept.
const MAX_PACKET_LEN: usize = 1 << 20;

pub struct MinecraftProber {
    config: ProberConfig,
}

#[derive(Debug, Deserialize)]
struct StatusJson {
    #[serde(default)]
    version: Option<VersionJson>,
    #[serde(default)]
    players: Option<PlayersJson>,
    #[serde(default)]
    description: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct VersionJson {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlayersJson {
    #[serde(default)]
    online: Option<u32>,
    #[serde(default)]
    max: Option<u32>,
    #[serde(default)]
    sample: Vec<SampleJson>,
}

#[derive(Debug, Deserialize)]
struct SampleJson {
    #[serde(default)]
    name: String,
}

impl MinecraftProber {
    pub fn new(config: ProberConfig) -> Self {
        Self { config }
    }

    async fn exchange(address: &str, port: u16) -> Result<String, ProbeError> {
        let mut stream = TcpStream::connect((address, port)).await.map_err(|e| {
            ProbeError::ConnectionFailed {
                address: format!("{}:{}", address, port),
                reason: e.to_string(),
            }
        })?;

        let handshake = handshake_packet(address, port);
        let request = frame(&[0x00]);
        let io_err = |e: std::io::Error| ProbeError::Protocol(e.to_string());

        stream.write_all(&handshake).await.map_err(io_err)?;
        stream.write_all(&request).await.map_err(io_err)?;
        stream.flush().await.map_err(io_err)?;

        let length = read_varint(&mut stream).await? as usize;
        if length == 0 || length > MAX_PACKET_LEN {
            return Err(ProbeError::Protocol(format!("bad packet length {}", length)));
        }
        let mut packet = vec![0u8; length];
        stream.read_exact(&mut packet).await.map_err(io_err)?;

        let mut cursor = packet.as_slice();
        let packet_id = read_varint(&mut cursor).await?;
        if packet_id != 0 {
            return Err(ProbeError::Protocol(format!(
                "unexpected packet id {}",
                packet_id
            )));
        }
        let json_len = read_varint(&mut cursor).await? as usize;
        if json_len > cursor.len() {
            return Err(ProbeError::Protocol("truncated status string".to_string()));
        }
        String::from_utf8(cursor[..json_len].to_vec())
            .map_err(|e| ProbeError::InvalidPayload(e.to_string()))
    }
}

#[async_trait]
impl StatusProber for MinecraftProber {
    async fn probe(&self, address: &str, port: u16) -> Result<ServerStatus, ProbeError> {
        let limit = Duration::from_secs(self.config.timeout_secs);
        let json = timeout(limit, Self::exchange(address, port))
            .await
            .map_err(|_| ProbeError::Timeout)??;
        debug!("Status payload from {}:{} ({} bytes)", address, port, json.len());
        parse_status(&json)
    }
}

/// Parse the status JSON returned by the server.
pub(crate) fn parse_status(json: &str) -> Result<ServerStatus, ProbeError> {
    let status: StatusJson =
        serde_json::from_str(json).map_err(|e| ProbeError::InvalidPayload(e.to_string()))?;

    let (players_online, players_max, sample_names) = match status.players {
        Some(players) => (
            players.online,
            players.max,
            players
                .sample
                .into_iter()
                .map(|s| s.name)
                .filter(|n| !n.is_empty())
                .collect(),
        ),
        None => (None, None, Vec::new()),
    };

    Ok(ServerStatus {
        online: true,
        players_online,
        players_max,
        version: status.version.and_then(|v| v.name),
        description: status.description.as_ref().map(flatten_component),
        sample_names,
    })
}

/// Flatten a chat component (string, object with `text`/`extra`, or array).
fn flatten_component(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts.iter().map(flatten_component).collect(),
        Value::Object(map) => {
            let mut out = map
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            if let Some(Value::Array(extra)) = map.get("extra") {
                for part in extra {
                    out.push_str(&flatten_component(part));
                }
            }
            out
        }
        _ => String::new(),
    }
}

fn write_varint(buf: &mut Vec<u8>, value: i32) {
    let mut value = value as u32;
    loop {
        if value & !0x7f == 0 {
            buf.push(value as u8);
            return;
        }
        buf.push((value & 0x7f) as u8 | 0x80);
        value >>= 7;
    }
}

async fn read_varint<R: AsyncRead + Unpin>(reader: &mut R) -> Result<i32, ProbeError> {
    let mut result: u32 = 0;
    for i in 0..5 {
        let byte = reader
            .read_u8()
            .await
            .map_err(|e| ProbeError::Protocol(e.to_string()))?;
        result |= ((byte & 0x7f) as u32) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(result as i32);
        }
    }
    Err(ProbeError::Protocol("VarInt too long".to_string()))
}

/// Prefix a packet body with its VarInt length.
fn frame(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 5);
    write_varint(&mut out, body.len() as i32);
    out.extend_from_slice(body);
    out
}

fn handshake_packet(address: &str, port: u16) -> Vec<u8> {
    let mut body = Vec::with_capacity(address.len() + 16);
    write_varint(&mut body, 0x00);
    write_varint(&mut body, PROTOCOL_VERSION);
    write_varint(&mut body, address.len() as i32);
    body.extend_from_slice(address.as_bytes());
    body.extend_from_slice(&port.to_be_bytes());
    write_varint(&mut body, 1);
    frame(&body)
}

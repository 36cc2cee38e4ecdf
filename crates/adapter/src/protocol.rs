//! Protocol module - JSON message types for the forge bridge
//!
//! Line-delimited JSON. Every message carries `type`, `seq` (client or server
//! sequence number) and `ts` (milliseconds since the Unix epoch).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::GRID_SIZE;

pub const PROTOCOL_VERSION: &str = "1.0.0";
pub const GAME_ID: &str = "paper-forge";

// ============== Client -> Game Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HelloType {
    #[serde(rename = "hello")]
    #[default]
    Hello,
}

/// Client hello message (first message on a connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type", default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    #[serde(default)]
    pub stream_observations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

/// Command message (controller only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    pub seq: u64,
    pub ts: u64,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
}

/// One-off observation request
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ObserveMessage {
    pub seq: u64,
    pub ts: u64,
}

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Observe(ObserveMessage),
    Unknown { seq: u64, msg_type: String },
}

/// Validated command payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientCommand {
    Tap(usize),
    Review,
    Collect,
    Restart,
}

impl ClientCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ClientCommand::Tap(_) => "tap",
            ClientCommand::Review => "review",
            ClientCommand::Collect => "collect",
            ClientCommand::Restart => "restart",
        }
    }
}

// ============== Errors ==============

/// Wire error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidCommand,
    NotController,
    ProtocolMismatch,
    HandshakeRequired,
    Backpressure,
}

/// Everything the bridge can refuse, mapped onto a wire code by [`ProtocolError::code`].
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown message type: {0}")]
    UnknownType(String),
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("tap requires an index")]
    MissingIndex,
    #[error("index {0} is outside the board")]
    IndexOutOfRange(i64),
    #[error("seq {seq} must be greater than {last}")]
    SeqNotIncreasing { seq: u64, last: u64 },
    #[error("protocol version {0} not supported")]
    VersionMismatch(String),
    #[error("send hello first")]
    HandshakeRequired,
    #[error("only the controller may send commands")]
    NotController,
    #[error("command queue is full")]
    Backpressure,
    #[error("{0}")]
    Rejected(&'static str),
}

impl ProtocolError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ProtocolError::VersionMismatch(_) => ErrorCode::ProtocolMismatch,
            ProtocolError::HandshakeRequired => ErrorCode::HandshakeRequired,
            ProtocolError::NotController => ErrorCode::NotController,
            ProtocolError::Backpressure => ErrorCode::Backpressure,
            ProtocolError::Json(_)
            | ProtocolError::UnknownType(_)
            | ProtocolError::UnknownAction(_)
            | ProtocolError::MissingIndex
            | ProtocolError::IndexOutOfRange(_)
            | ProtocolError::SeqNotIncreasing { .. }
            | ProtocolError::Rejected(_) => ErrorCode::InvalidCommand,
        }
    }
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignedRole {
    Controller,
    Observer,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub role: AssignedRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<u64>,
    pub game_id: String,
}

/// Acknowledgment for an applied command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeView {
    pub kind: String,
    pub message: String,
    pub remaining_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultView {
    pub title: String,
    pub tier: String,
    pub score: u32,
    pub status: String,
    pub feedback: String,
    pub citations: u32,
    pub potential: u32,
    pub published: bool,
    pub mood_delta: i32,
}

/// Stable hash of the observable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl Serialize for StateHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&format!("{:016x}", self.0))
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        u64::from_str_radix(&s, 16)
            .map(StateHash)
            .map_err(serde::de::Error::custom)
    }
}

/// Session observation (sent on request and streamed to subscribers)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub episode_id: u32,
    /// One string per row, one letter per tile.
    pub board: Vec<String>,
    pub score: u32,
    pub moves_remaining: u32,
    pub selected: Option<usize>,
    pub status: String,
    pub playable: bool,
    pub event_fired: bool,
    pub notice: Option<NoticeView>,
    pub final_score: Option<u32>,
    pub result: Option<ResultView>,
    pub state_hash: StateHash,
}

// ============== Message Parsing ==============

/// Parse one inbound line.
pub fn parse_message(json: &str) -> Result<ParsedMessage, ProtocolError> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "command")]
        Command(CommandMessage),
        #[serde(rename = "observe")]
        Observe(ObserveMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Ok(InboundMessage::Observe(m)) => Ok(ParsedMessage::Observe(m)),
        Err(e) => {
            // An unknown type is reported as such, not as a parse failure.
            #[derive(Debug, Deserialize)]
            struct Envelope {
                #[serde(rename = "type")]
                msg_type: Option<String>,
                seq: Option<u64>,
            }
            let envelope = serde_json::from_str::<Envelope>(json)?;
            match envelope.msg_type {
                Some(t) if t != "hello" && t != "command" && t != "observe" => {
                    Ok(ParsedMessage::Unknown {
                        seq: envelope.seq.unwrap_or(0),
                        msg_type: t,
                    })
                }
                _ => Err(ProtocolError::Json(e)),
            }
        }
    }
}

/// Validate a command message into a [`ClientCommand`].
pub fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, ProtocolError> {
    let action = cmd.action.as_str();
    if action.eq_ignore_ascii_case("tap") {
        let index = cmd.index.ok_or(ProtocolError::MissingIndex)?;
        if index < 0 || index >= (GRID_SIZE * GRID_SIZE) as i64 {
            return Err(ProtocolError::IndexOutOfRange(index));
        }
        Ok(ClientCommand::Tap(index as usize))
    } else if action.eq_ignore_ascii_case("review") {
        Ok(ClientCommand::Review)
    } else if action.eq_ignore_ascii_case("collect") {
        Ok(ClientCommand::Collect)
    } else if action.eq_ignore_ascii_case("restart") {
        Ok(ClientCommand::Restart)
    } else {
        Err(ProtocolError::UnknownAction(cmd.action.clone()))
    }
}

/// Best-effort `seq` extraction from a line that failed to parse.
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

// ============== Utility Functions ==============

pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: protocol_version.to_string(),
        stream_observations: true,
    }
}

pub fn create_welcome(
    seq: u64,
    protocol_version: &str,
    client_id: u64,
    role: AssignedRole,
    controller_id: Option<u64>,
) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        client_id,
        role,
        controller_id,
        game_id: GAME_ID.to_string(),
    }
}

pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
    }
}

pub fn create_error(seq: u64, err: &ProtocolError) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code: err.code(),
        message: err.to_string(),
    }
}

/// Current timestamp in milliseconds
pub(crate) fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

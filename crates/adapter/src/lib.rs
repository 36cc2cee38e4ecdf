//! Bridge module - remote control of the forge over a TCP socket with JSON lines
//!
//! External agents (bots, replay tools, scripted test drivers) connect to the
//! bridge and drive the same session the terminal shows.
//!
//! # Protocol Overview
//!
//! The bridge speaks a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to the socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//! 4. **Observations**: Sent on request, and after every change to clients that asked to stream
//! 5. **Commanding**: The controller taps cells and drives review/collect/restart
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Handshake with client info, protocol version and streaming flag
//! - **command**: `tap` (with `index`), `review`, `collect` or `restart`
//! - **observe**: Request a single observation
//!
//! ## Server → Client
//!
//! - **welcome**: Assigned role and controller id
//! - **observation**: Board rows, score, moves, selection, status, notice and result
//! - **ack**: Command applied
//! - **error**: `invalid_command`, `not_controller`, `protocol_mismatch`,
//!   `handshake_required` or `backpressure`
//!
//! # Environment Variables
//!
//! - `FORGE_BRIDGE_HOST`: Bind address (default: "127.0.0.1")
//! - `FORGE_BRIDGE_PORT`: Port number (default: 7878)
//! - `FORGE_BRIDGE_MAX_PENDING`: Inbound command queue depth (default: 10)
//! - `FORGE_BRIDGE_WIRE_LOG`: Append every wire line to this file
//! - `FORGE_BRIDGE_DISABLED`: Set to "1" or "true" to disable the bridge entirely
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":0,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0","stream_observations":true}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1700000000000,"protocol_version":"1.0.0","client_id":1,"role":"controller",...}
//! Server -> Client: {"type":"observation","seq":1,"board":["DTWCDT",...],"score":0,"moves_remaining":20,...}
//! Client -> Server: {"type":"command","seq":2,"ts":0,"action":"tap","index":14}
//! Server -> Client: {"type":"ack","seq":2,"ts":1700000000016,"status":"ok"}
//! ```
//!
//! # Implementation
//!
//! - Uses **tokio** for async networking on a runtime owned by [`Adapter`]
//! - The session never leaves the game loop; commands arrive through a bounded
//!   channel and the game loop acks them after applying
//! - See [`protocol`] for message structure definitions
//! - See [`server`] for the TCP server
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"hello","seq":1,"ts":0,"client":{"name":"nc","version":"1"},"protocol_version":"1.0.0","stream_observations":true}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use paper_forge_core as core;
pub use paper_forge_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use runtime::{Adapter, InboundCommand, InboundPayload, OutboundMessage};
pub use server::*;

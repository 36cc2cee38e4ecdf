//! Adapter runtime integration.
//!
//! Bridges the sync game loop with the async TCP server.

use std::sync::Arc;

use anyhow::Context;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::core::SessionSnapshot;
use crate::protocol::{create_ack, create_error, ClientCommand, ProtocolError};
use crate::server::{build_observation, run_server_with_stats, BridgeStats, BridgeStatus, ServerConfig};

/// Command delivered to the game loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundPayload {
    Command(ClientCommand),
    /// Send the client one observation.
    SnapshotRequest,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClient { client_id: usize, line: String },
    /// Delivered to every client that asked for streamed observations.
    Broadcast { line: String },
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    stats: Arc<BridgeStats>,
    obs_seq: u64,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns `Ok(None)` if `FORGE_BRIDGE_DISABLED` is set.
    pub fn start_from_env() -> anyhow::Result<Option<Self>> {
        if ServerConfig::is_disabled() {
            info!("bridge disabled via FORGE_BRIDGE_DISABLED");
            return Ok(None);
        }
        Self::start(ServerConfig::from_env()).map(Some)
    }

    pub fn start(config: ServerConfig) -> anyhow::Result<Self> {
        // Fail on a bad address here rather than inside the spawned task.
        config.socket_addr()?;

        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let stats = Arc::new(BridgeStats::default());

        let rt = Runtime::new().context("creating bridge runtime")?;
        let server_stats = Arc::clone(&stats);
        rt.spawn(async move {
            if let Err(e) = run_server_with_stats(config, server_stats, cmd_tx, out_rx, None).await {
                warn!(error = %e, "bridge stopped");
            }
        });

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
            stats,
            obs_seq: 0,
        })
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    pub fn status(&self) -> BridgeStatus {
        self.stats.status()
    }

    pub fn ack(&self, client_id: usize, seq: u64) {
        if let Ok(line) = serde_json::to_string(&create_ack(seq)) {
            self.send(OutboundMessage::ToClient { client_id, line });
        }
    }

    pub fn reject(&self, client_id: usize, seq: u64, err: &ProtocolError) {
        if let Ok(line) = serde_json::to_string(&create_error(seq, err)) {
            self.send(OutboundMessage::ToClient { client_id, line });
        }
    }

    /// Send one observation to `client_id`, or to all streaming clients when `None`.
    pub fn observe(&mut self, client_id: Option<usize>, snap: &SessionSnapshot) {
        self.obs_seq += 1;
        let obs = build_observation(snap, self.obs_seq);
        let Ok(line) = serde_json::to_string(&obs) else {
            return;
        };
        match client_id {
            Some(client_id) => self.send(OutboundMessage::ToClient { client_id, line }),
            None => self.send(OutboundMessage::Broadcast { line }),
        }
    }
}

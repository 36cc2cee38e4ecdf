//! TCP server for the forge bridge
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::core::{PaperResult, SessionSnapshot};
use crate::protocol::*;
use crate::runtime::{InboundCommand, InboundPayload, OutboundMessage};

/// Stable 64-bit FNV-1a hasher for `state_hash`.
///
/// `DefaultHasher` output is not stable across Rust versions.
#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl std::hash::Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

pub const DEFAULT_PORT: u16 = 7878;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
    /// Append every wire line (both directions) to this file.
    pub wire_log_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 10,
            wire_log_path: None,
        }
    }
}

impl ServerConfig {
    /// Read `FORGE_BRIDGE_*` overrides on top of the defaults.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("FORGE_BRIDGE_HOST").unwrap_or(defaults.host);
        let port = env::var("FORGE_BRIDGE_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let max_pending_commands = env::var("FORGE_BRIDGE_MAX_PENDING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        let wire_log_path = env::var("FORGE_BRIDGE_WIRE_LOG")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            host,
            port,
            protocol_version: defaults.protocol_version,
            max_pending_commands,
            wire_log_path,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bridge address {}:{}", self.host, self.port))
    }

    /// True when `FORGE_BRIDGE_DISABLED` is `1` or `true`
    pub fn is_disabled() -> bool {
        std::env::var("FORGE_BRIDGE_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// Live connection counters, readable from the game loop without locking.
#[derive(Debug, Default)]
pub struct BridgeStats {
    clients: AtomicU16,
    streaming: AtomicU16,
    /// Controller id, 0 when there is none (ids start at 1).
    controller: AtomicUsize,
}

/// Point-in-time copy of [`BridgeStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BridgeStatus {
    pub client_count: u16,
    pub streaming_count: u16,
    pub controller_id: Option<usize>,
}

impl BridgeStats {
    pub fn status(&self) -> BridgeStatus {
        let controller = self.controller.load(Ordering::Relaxed);
        BridgeStatus {
            client_count: self.clients.load(Ordering::Relaxed),
            streaming_count: self.streaming.load(Ordering::Relaxed),
            controller_id: (controller != 0).then_some(controller),
        }
    }

    fn publish(&self, registry: &Registry) {
        self.clients
            .store(registry.clients.len().min(u16::MAX as usize) as u16, Ordering::Relaxed);
        let streaming = registry.clients.iter().filter(|c| c.stream_observations).count();
        self.streaming
            .store(streaming.min(u16::MAX as usize) as u16, Ordering::Relaxed);
        self.controller
            .store(registry.controller.unwrap_or(0), Ordering::Relaxed);
    }
}

/// Handle to a connected client
#[derive(Debug)]
struct ClientHandle {
    id: usize,
    stream_observations: bool,
    handshaken: bool,
    last_seq: Option<u64>,
    tx: mpsc::UnboundedSender<String>,
}

/// Connected clients plus the controller assignment.
#[derive(Debug, Default)]
struct Registry {
    clients: Vec<ClientHandle>,
    controller: Option<usize>,
}

impl Registry {
    fn client_mut(&mut self, client_id: usize) -> Option<&mut ClientHandle> {
        self.clients.iter_mut().find(|c| c.id == client_id)
    }

    fn is_handshaken(&self, client_id: usize) -> bool {
        self.clients
            .iter()
            .any(|c| c.id == client_id && c.handshaken)
    }

    /// Enforce strictly increasing `seq` per client and record it.
    fn advance_seq(&mut self, client_id: usize, seq: u64) -> Result<(), ProtocolError> {
        let Some(client) = self.client_mut(client_id) else {
            return Ok(());
        };
        match client.last_seq {
            Some(last) if seq <= last => Err(ProtocolError::SeqNotIncreasing { seq, last }),
            _ => {
                client.last_seq = Some(seq);
                Ok(())
            }
        }
    }

    /// Handshake and sequencing gate shared by every post-hello message.
    fn admit(&mut self, client_id: usize, seq: u64) -> Result<(), ProtocolError> {
        if !self.is_handshaken(client_id) {
            return Err(ProtocolError::HandshakeRequired);
        }
        self.advance_seq(client_id, seq)
    }

    /// Mark a client handshaken and assign the controller role if it is free.
    fn complete_hello(&mut self, client_id: usize, seq: u64, stream: bool) -> AssignedRole {
        if let Some(client) = self.client_mut(client_id) {
            client.handshaken = true;
            client.last_seq = Some(seq);
            client.stream_observations = stream;
        }
        match self.controller {
            None => {
                self.controller = Some(client_id);
                AssignedRole::Controller
            }
            Some(id) if id == client_id => AssignedRole::Controller,
            Some(_) => AssignedRole::Observer,
        }
    }

    /// Drop a client. A departing controller hands over to the lowest remaining id.
    fn remove(&mut self, client_id: usize) -> Option<usize> {
        self.clients.retain(|c| c.id != client_id);
        if self.controller == Some(client_id) {
            self.controller = self
                .clients
                .iter()
                .filter(|c| c.handshaken)
                .map(|c| c.id)
                .min();
        }
        self.controller
    }
}

/// Shared server state
struct ServerState {
    config: ServerConfig,
    registry: RwLock<Registry>,
    stats: Arc<BridgeStats>,
}

/// Start the TCP server and serve until the listener fails.
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    run_server_with_stats(config, Arc::default(), command_tx, out_rx, ready_tx).await
}

/// Like [`run_server`], publishing connection counters into `stats`.
pub async fn run_server_with_stats(
    config: ServerConfig,
    stats: Arc<BridgeStats>,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let wire_log_tx = config.wire_log_path.clone().map(spawn_wire_log);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding bridge on {}", addr))?;
    let bound = listener.local_addr()?;
    info!(%bound, "bridge listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState {
        config,
        registry: RwLock::new(Registry::default()),
        stats,
    });
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let registry = state.registry.read().await;
                match msg {
                    OutboundMessage::ToClient { client_id, line } => {
                        if let Some(c) = registry.clients.iter().find(|c| c.id == client_id) {
                            let _ = c.tx.send(line);
                        }
                    }
                    OutboundMessage::Broadcast { line } => {
                        for c in registry.clients.iter().filter(|c| c.stream_observations) {
                            let _ = c.tx.send(line.clone());
                        }
                    }
                }
            }
        });
    }

    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        let wire_log_tx = wire_log_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, state, command_tx, wire_log_tx).await {
                warn!(client_id, error = %e, "client error");
            }
            info!(client_id, "client disconnected");
        });
    }
}

fn spawn_wire_log(path: String) -> mpsc::UnboundedSender<String> {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        use tokio::fs::OpenOptions;

        let mut file = match OpenOptions::new().create(true).append(true).open(&path).await {
            Ok(f) => f,
            Err(e) => {
                warn!(%path, error = %e, "wire log unavailable");
                return;
            }
        };
        while let Some(line) = rx.recv().await {
            if file.write_all(line.as_bytes()).await.is_err() || file.write_all(b"\n").await.is_err() {
                break;
            }
        }
        let _ = file.flush().await;
    });
    tx
}

fn encode<T: serde::Serialize>(msg: &T) -> Option<String> {
    serde_json::to_string(msg).ok()
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
    wire_log_tx: Option<mpsc::UnboundedSender<String>>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    {
        let mut registry = state.registry.write().await;
        registry.clients.push(ClientHandle {
            id: client_id,
            stream_observations: false,
            handshaken: false,
            last_seq: None,
            tx: tx.clone(),
        });
        state.stats.publish(&registry);
    }

    let wire_log_out = wire_log_tx.clone();
    let write_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if writer.write_all(line.as_bytes()).await.is_err()
                || writer.write_all(b"\n").await.is_err()
                || writer.flush().await.is_err()
            {
                break;
            }
            if let Some(log) = wire_log_out.as_ref() {
                let _ = log.send(line);
            }
        }
    });

    let reply_error = |seq: u64, err: &ProtocolError| {
        debug!(client_id, seq, error = %err, "rejecting message");
        if let Some(line) = encode(&create_error(seq, err)) {
            let _ = tx.send(line);
        }
    };

    let mut line = String::new();
    loop {
        line.clear();
        // Read errors end the connection but still run the cleanup below.
        match reader.read_line(&mut line).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(client_id, error = %e, "read failed");
                break;
            }
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(log) = wire_log_tx.as_ref() {
            let _ = log.send(trimmed.to_string());
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                let mut registry = state.registry.write().await;
                if registry.is_handshaken(client_id) {
                    if let Err(e) = registry.advance_seq(client_id, hello.seq) {
                        reply_error(hello.seq, &e);
                        continue;
                    }
                }

                if !hello.protocol_version.starts_with("1.") {
                    reply_error(hello.seq, &ProtocolError::VersionMismatch(hello.protocol_version));
                    break;
                }

                let role = registry.complete_hello(client_id, hello.seq, hello.stream_observations);
                let controller_id = registry.controller.map(|id| id as u64);
                state.stats.publish(&registry);
                drop(registry);

                info!(client_id, client = %hello.client.name, ?role, "handshake complete");
                let welcome = create_welcome(
                    hello.seq,
                    &state.config.protocol_version,
                    client_id as u64,
                    role,
                    controller_id,
                );
                if let Some(line) = encode(&welcome) {
                    let _ = tx.send(line);
                }

                if hello.stream_observations {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    });
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                let is_controller = {
                    let mut registry = state.registry.write().await;
                    if let Err(e) = registry.admit(client_id, cmd.seq) {
                        reply_error(cmd.seq, &e);
                        continue;
                    }
                    registry.controller == Some(client_id)
                };
                if !is_controller {
                    reply_error(cmd.seq, &ProtocolError::NotController);
                    continue;
                }

                let command = match map_command(&cmd) {
                    Ok(c) => c,
                    Err(e) => {
                        reply_error(cmd.seq, &e);
                        continue;
                    }
                };

                // The game loop acks once the command has been applied.
                let inbound = InboundCommand {
                    client_id,
                    seq: cmd.seq,
                    payload: InboundPayload::Command(command),
                };
                if command_tx.try_send(inbound).is_err() {
                    reply_error(cmd.seq, &ProtocolError::Backpressure);
                }
            }

            Ok(ParsedMessage::Observe(obs)) => {
                if let Err(e) = state.registry.write().await.admit(client_id, obs.seq) {
                    reply_error(obs.seq, &e);
                    continue;
                }
                let inbound = InboundCommand {
                    client_id,
                    seq: obs.seq,
                    payload: InboundPayload::SnapshotRequest,
                };
                if command_tx.try_send(inbound).is_err() {
                    reply_error(obs.seq, &ProtocolError::Backpressure);
                }
            }

            Ok(ParsedMessage::Unknown { seq, msg_type }) => {
                let mut registry = state.registry.write().await;
                if registry.is_handshaken(client_id) {
                    if let Err(e) = registry.advance_seq(client_id, seq) {
                        reply_error(seq, &e);
                        continue;
                    }
                }
                drop(registry);
                reply_error(seq, &ProtocolError::UnknownType(msg_type));
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                reply_error(seq, &e);
            }
        }
    }

    {
        let mut registry = state.registry.write().await;
        let was_controller = registry.controller == Some(client_id);
        let next = registry.remove(client_id);
        state.stats.publish(&registry);
        if was_controller {
            match next {
                Some(id) => info!(client_id = id, "controller promoted"),
                None => info!(client_id, "controller released"),
            }
        }
    }

    drop(tx);
    let _ = write_task.await;
    Ok(())
}

/// Build an observation message from a session snapshot
pub fn build_observation(snap: &SessionSnapshot, seq: u64) -> ObservationMessage {
    use std::hash::{Hash, Hasher};

    let mut hasher = Fnv1aHasher::new();
    snap.board.hash(&mut hasher);
    snap.episode_id.hash(&mut hasher);
    snap.score.hash(&mut hasher);
    snap.moves_remaining.hash(&mut hasher);
    snap.selected.hash(&mut hasher);
    snap.status.hash(&mut hasher);
    snap.notice.map(|n| n.kind).hash(&mut hasher);
    snap.event_fired.hash(&mut hasher);
    snap.final_score.hash(&mut hasher);
    snap.result.as_ref().map(|r| (&r.title, r.score)).hash(&mut hasher);
    let state_hash = StateHash(hasher.finish());

    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        episode_id: snap.episode_id,
        board: snap.board_rows(),
        score: snap.score,
        moves_remaining: snap.moves_remaining,
        selected: snap.selected,
        status: snap.status.as_str().to_string(),
        playable: snap.playable(),
        event_fired: snap.event_fired,
        notice: snap.notice.map(|n| NoticeView {
            kind: n.kind.as_str().to_string(),
            message: n.message().to_string(),
            remaining_ms: n.remaining_ms,
        }),
        final_score: snap.final_score,
        result: snap.result.as_ref().map(result_view),
        state_hash,
    }
}

fn result_view(result: &PaperResult) -> ResultView {
    ResultView {
        title: result.title.clone(),
        tier: result.tier.label().to_string(),
        score: result.score,
        status: result.status.as_str().to_string(),
        feedback: result.feedback.clone(),
        citations: result.citations,
        potential: result.potential,
        published: result.is_published(),
        mood_delta: result.mood_delta(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Board, Session, SessionConfig, SimpleRng};
    use crate::types::{ForgeStatus, TileKind};

    fn handle(id: usize) -> ClientHandle {
        let (tx, _rx) = mpsc::unbounded_channel();
        ClientHandle {
            id,
            stream_observations: false,
            handshaken: false,
            last_seq: None,
            tx,
        }
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 7878);
        assert_eq!(config.protocol_version, "1.0.0");
        assert_eq!(
            config.socket_addr().unwrap(),
            "127.0.0.1:7878".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_bad_host_is_an_error() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_first_hello_becomes_controller() {
        let mut registry = Registry::default();
        registry.clients.push(handle(1));
        registry.clients.push(handle(2));

        assert_eq!(registry.complete_hello(1, 1, true), AssignedRole::Controller);
        assert_eq!(registry.complete_hello(2, 1, false), AssignedRole::Observer);
        assert_eq!(registry.controller, Some(1));
    }

    #[test]
    fn test_admit_requires_handshake_and_increasing_seq() {
        let mut registry = Registry::default();
        registry.clients.push(handle(1));
        assert!(matches!(registry.admit(1, 1), Err(ProtocolError::HandshakeRequired)));

        registry.complete_hello(1, 5, false);
        assert!(matches!(
            registry.admit(1, 5),
            Err(ProtocolError::SeqNotIncreasing { seq: 5, last: 5 })
        ));
        assert!(registry.admit(1, 6).is_ok());
        assert!(registry.admit(1, 4).is_err());
    }

    #[test]
    fn test_controller_promotes_lowest_handshaken_id() {
        let mut registry = Registry::default();
        for id in 1..=4 {
            registry.clients.push(handle(id));
        }
        registry.complete_hello(1, 1, false);
        registry.complete_hello(4, 1, false);
        registry.complete_hello(3, 1, false);

        // Client 2 never said hello, so it is skipped.
        assert_eq!(registry.remove(1), Some(3));
        assert_eq!(registry.remove(2), Some(3));
        assert_eq!(registry.remove(3), Some(4));
        assert_eq!(registry.remove(4), None);
    }

    #[test]
    fn test_stats_publish() {
        let stats = BridgeStats::default();
        let mut registry = Registry::default();
        registry.clients.push(handle(1));
        registry.clients.push(handle(2));
        registry.complete_hello(2, 1, true);
        stats.publish(&registry);

        assert_eq!(
            stats.status(),
            BridgeStatus {
                client_count: 2,
                streaming_count: 1,
                controller_id: Some(2),
            }
        );
    }

    #[test]
    fn test_build_observation_fields() {
        let board = Board::from_rows(&["DTWCDT", "TWCDTW", "WCDTWC", "CDTWCD", "DTWCDT", "TWCDTB"])
            .unwrap();
        let session = Session::with_board(SessionConfig::instant(), board, SimpleRng::new(1));
        let obs = build_observation(&session.snapshot(), 7);

        assert_eq!(obs.seq, 7);
        assert_eq!(obs.board.len(), 6);
        assert_eq!(obs.board[0], "DTWCDT");
        assert_eq!(obs.board[5], "TWCDTB");
        assert_eq!(obs.status, "playing");
        assert!(obs.playable);
        assert_eq!(obs.moves_remaining, 20);
        assert!(obs.result.is_none());

        let v = serde_json::to_value(&obs).unwrap();
        assert_eq!(v["type"], "observation");
        assert!(v["state_hash"].is_string());
    }

    #[test]
    fn test_state_hash_tracks_state() {
        let mut snap = SessionSnapshot::default();
        let a = build_observation(&snap, 1).state_hash;
        let b = build_observation(&snap, 2).state_hash;
        assert_eq!(a, b);

        snap.board[0][0] = TileKind::Bug;
        let c = build_observation(&snap, 3).state_hash;
        assert_ne!(a, c);

        snap.status = ForgeStatus::Generating;
        assert_ne!(c, build_observation(&snap, 4).state_hash);
    }
}

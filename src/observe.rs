//! Read-only observer mode: `paper-forge observe [--host H] [--port P]`.
//!
//! Connects to a running bridge, asks for streamed observations and turns
//! each one back into a [`SessionSnapshot`] so the normal view can draw it.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::adapter::{create_hello, ObservationMessage, DEFAULT_PORT, PROTOCOL_VERSION};
use crate::core::{EventNotice, PaperResult, SessionSnapshot, TimersSnapshot};
use crate::types::{ForgeStatus, NoticeKind, PaperStatus, Tier, TileKind, GRID_SIZE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserveConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub enum ObserveEvent {
    Welcome,
    Observation(Box<ObservationMessage>),
    Error(String),
    Closed,
}

/// `Ok(None)` unless the first argument is `observe`.
pub fn parse_observe_args(args: &[String]) -> Result<Option<ObserveConfig>> {
    if args.first().map(String::as_str) != Some("observe") {
        return Ok(None);
    }

    let mut host = String::from("127.0.0.1");
    let mut port = DEFAULT_PORT;
    let mut rest = args[1..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--host" => {
                host = rest
                    .next()
                    .ok_or_else(|| anyhow!("observe: missing value for --host"))?
                    .clone();
            }
            "--port" => {
                let v = rest
                    .next()
                    .ok_or_else(|| anyhow!("observe: missing value for --port"))?;
                port = v
                    .parse::<u16>()
                    .map_err(|_| anyhow!("observe: invalid --port value: {}", v))?;
            }
            other => return Err(anyhow!("observe: unknown argument: {}", other)),
        }
    }

    Ok(Some(ObserveConfig { host, port }))
}

/// Connect, send hello and forward server lines as events from a reader thread.
pub fn connect_observer(config: &ObserveConfig) -> Result<mpsc::Receiver<ObserveEvent>> {
    let mut stream = TcpStream::connect((config.host.as_str(), config.port))
        .map_err(|e| anyhow!("observe: connect {}:{} failed: {}", config.host, config.port, e))?;
    stream.set_nodelay(true)?;

    let hello = create_hello(1, "paper-forge-observe", PROTOCOL_VERSION);
    let line = serde_json::to_string(&hello)?;
    stream.write_all(line.as_bytes())?;
    stream.write_all(b"\n")?;
    stream.flush()?;

    let (tx, rx) = mpsc::channel::<ObserveEvent>();
    thread::spawn(move || {
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    let _ = tx.send(ObserveEvent::Error(format!("observe: read error: {}", e)));
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            if let Some(event) = parse_server_line(&line) {
                if tx.send(event).is_err() {
                    return;
                }
            }
        }
        let _ = tx.send(ObserveEvent::Closed);
    });

    Ok(rx)
}

/// Block until the welcome arrives, returning the first observation if it came along.
pub fn wait_for_welcome(
    rx: &mpsc::Receiver<ObserveEvent>,
    timeout: Duration,
) -> Result<Option<ObservationMessage>> {
    let deadline = std::time::Instant::now() + timeout;
    let mut got_welcome = false;
    let mut first_obs = None;

    while std::time::Instant::now() < deadline {
        match rx.recv_timeout(Duration::from_millis(50)) {
            Ok(ObserveEvent::Welcome) => {
                got_welcome = true;
                if first_obs.is_some() {
                    break;
                }
            }
            Ok(ObserveEvent::Observation(obs)) => {
                first_obs = Some(*obs);
                if got_welcome {
                    break;
                }
            }
            Ok(ObserveEvent::Error(msg)) => return Err(anyhow!(msg)),
            Ok(ObserveEvent::Closed) => return Err(anyhow!("observe: connection closed")),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(anyhow!("observe: event channel disconnected"));
            }
        }
    }

    if !got_welcome {
        return Err(anyhow!("observe: did not receive welcome"));
    }
    Ok(first_obs)
}

fn parse_server_line(line: &str) -> Option<ObserveEvent> {
    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => return Some(ObserveEvent::Error(format!("observe: invalid json: {}", e))),
    };
    match value.get("type").and_then(|v| v.as_str()).unwrap_or("") {
        "welcome" => Some(ObserveEvent::Welcome),
        "observation" => match serde_json::from_value::<ObservationMessage>(value) {
            Ok(obs) => Some(ObserveEvent::Observation(Box::new(obs))),
            Err(e) => Some(ObserveEvent::Error(format!("observe: invalid observation: {}", e))),
        },
        "error" => {
            let code = value.get("code").and_then(|v| v.as_str()).unwrap_or("unknown");
            let msg = value.get("message").and_then(|v| v.as_str()).unwrap_or("");
            Some(ObserveEvent::Error(format!("observe: server error {} {}", code, msg)))
        }
        _ => None,
    }
}

/// Side-panel lines for the observer.
pub fn observe_status_lines(config: &ObserveConfig, obs: Option<&ObservationMessage>) -> [String; 3] {
    let (state, episode) = match obs {
        Some(o) => (o.status.to_uppercase(), o.episode_id.to_string()),
        None => ("WAITING".to_string(), "-".to_string()),
    };
    [
        "MODE OBSERVE".to_string(),
        format!("TARGET {}:{}", config.host, config.port),
        format!("STATE {} EP {}", state, episode),
    ]
}

/// Rebuild a drawable snapshot. Unknown letters and names degrade to
/// empty cells and absent fields.
pub fn snapshot_from_observation(obs: &ObservationMessage) -> SessionSnapshot {
    let mut board = [[TileKind::Empty; GRID_SIZE]; GRID_SIZE];
    for (row, line) in board.iter_mut().zip(&obs.board) {
        for (cell, ch) in row.iter_mut().zip(line.chars()) {
            *cell = TileKind::from_letter(ch).unwrap_or(TileKind::Empty);
        }
    }

    let notice = obs.notice.as_ref().and_then(|n| {
        NoticeKind::from_str(&n.kind).map(|kind| EventNotice {
            kind,
            remaining_ms: n.remaining_ms,
        })
    });

    let result = obs.result.as_ref().and_then(|r| {
        Some(PaperResult {
            title: r.title.clone(),
            tier: Tier::from_label(&r.tier)?,
            score: r.score,
            status: PaperStatus::from_str(&r.status)?,
            feedback: r.feedback.clone(),
            citations: r.citations,
            potential: r.potential,
        })
    });

    SessionSnapshot {
        board,
        episode_id: obs.episode_id,
        score: obs.score,
        moves_remaining: obs.moves_remaining,
        selected: obs.selected,
        status: ForgeStatus::from_str(&obs.status).unwrap_or(ForgeStatus::Playing),
        notice,
        event_fired: obs.event_fired,
        final_score: obs.final_score,
        result,
        timers: TimersSnapshot {
            playback_ms: 0,
            notice_ms: notice.map_or(0, |n| n.remaining_ms),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::build_observation;
    use crate::core::grade;

    #[test]
    fn parse_observe_args_parses_host_port() {
        let args: Vec<String> = ["observe", "--host", "0.0.0.0", "--port", "9001"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let cfg = parse_observe_args(&args).unwrap().unwrap();
        assert_eq!(
            cfg,
            ObserveConfig {
                host: "0.0.0.0".to_string(),
                port: 9001
            }
        );
    }

    #[test]
    fn parse_observe_args_uses_defaults() {
        let cfg = parse_observe_args(&["observe".to_string()]).unwrap().unwrap();
        assert_eq!(cfg.port, 7878);
        assert_eq!(cfg.host, "127.0.0.1");
        assert!(parse_observe_args(&[]).unwrap().is_none());
    }

    #[test]
    fn parse_observe_args_rejects_junk() {
        assert!(parse_observe_args(&["observe".to_string(), "--port".to_string()]).is_err());
        assert!(parse_observe_args(&["observe".to_string(), "--fast".to_string()]).is_err());
    }

    #[test]
    fn snapshot_survives_the_wire() {
        let mut snap = SessionSnapshot::default();
        snap.board[2][3] = TileKind::Laser;
        snap.board[5][5] = TileKind::Bug;
        snap.score = 420;
        snap.moves_remaining = 0;
        snap.status = ForgeStatus::Review;
        snap.final_score = Some(410);
        snap.notice = Some(EventNotice {
            kind: NoticeKind::BugDiscovered,
            remaining_ms: 1200,
        });
        let (tier, status) = grade(410);
        snap.result = Some(PaperResult {
            title: "On Lab Involution: Theory and Practice".to_string(),
            tier,
            score: 410,
            status,
            feedback: "Too little data, the conclusions are made up.".to_string(),
            citations: 0,
            potential: tier.potential(),
        });

        let line = serde_json::to_string(&build_observation(&snap, 3)).unwrap();
        let Some(ObserveEvent::Observation(obs)) = parse_server_line(&line) else {
            panic!("expected observation");
        };
        let back = snapshot_from_observation(&obs);

        assert_eq!(back.board, snap.board);
        assert_eq!(back.score, 420);
        assert_eq!(back.status, ForgeStatus::Review);
        assert_eq!(back.final_score, Some(410));
        assert_eq!(back.notice, snap.notice);
        assert_eq!(back.result, snap.result);
    }

    #[test]
    fn parse_server_line_reports_errors() {
        let line = r#"{"type":"error","seq":1,"ts":0,"code":"not_controller","message":"nope"}"#;
        match parse_server_line(line) {
            Some(ObserveEvent::Error(msg)) => assert!(msg.contains("not_controller")),
            other => panic!("unexpected {:?}", other),
        }
        assert!(parse_server_line(r#"{"type":"ack","seq":1,"ts":0,"status":"ok"}"#).is_none());
    }

    #[test]
    fn status_lines_before_first_observation() {
        let cfg = ObserveConfig {
            host: "127.0.0.1".to_string(),
            port: 7878,
        };
        let lines = observe_status_lines(&cfg, None);
        assert_eq!(lines[0], "MODE OBSERVE");
        assert_eq!(lines[1], "TARGET 127.0.0.1:7878");
        assert_eq!(lines[2], "STATE WAITING EP -");
    }
}

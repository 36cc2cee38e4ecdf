//! Paper Forge terminal runner (default binary).
//!
//! `paper-forge` plays locally (keyboard, mouse and the JSON bridge share one
//! session). `paper-forge observe [--host H] [--port P]` watches a running
//! game through its bridge.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind, MouseButton, MouseEventKind};
use tracing::info;

use paper_forge::adapter::{Adapter, InboundPayload};
use paper_forge::config::{init_logging, RunnerConfig};
use paper_forge::core::SessionSnapshot;
use paper_forge::host::ForgeHost;
use paper_forge::input::{handle_key_event, should_quit, Cursor};
use paper_forge::observe::{
    connect_observer, observe_status_lines, parse_observe_args, snapshot_from_observation,
    wait_for_welcome, ObserveConfig, ObserveEvent,
};
use paper_forge::term::{AdapterStatusView, CellStyle, FrameBuffer, GameView, TerminalRenderer, Viewport};
use paper_forge::types::{GameAction, TICK_MS};

fn main() -> Result<()> {
    init_logging()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Some(config) = parse_observe_args(&args)? {
        return observe(&config);
    }

    let config = RunnerConfig::from_env();
    let mut adapter = Adapter::start_from_env()?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &config, adapter.as_mut());

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn run(term: &mut TerminalRenderer, config: &RunnerConfig, mut adapter: Option<&mut Adapter>) -> Result<()> {
    let mut host = ForgeHost::new(config);
    let view = GameView::default();
    let mut cursor = Cursor::new();
    let mut snap = SessionSnapshot::default();
    let mut fb = FrameBuffer::new(0, 0);

    let tick_duration = Duration::from_millis(TICK_MS as u64);
    let mut last_tick = Instant::now();

    loop {
        // Bridge commands are applied before drawing so acks follow the state they describe.
        if let Some(adapter) = adapter.as_deref_mut() {
            while let Some(cmd) = adapter.try_recv() {
                match cmd.payload {
                    InboundPayload::Command(command) => match host.apply(command) {
                        Ok(()) => adapter.ack(cmd.client_id, cmd.seq),
                        Err(e) => adapter.reject(cmd.client_id, cmd.seq, &e),
                    },
                    InboundPayload::SnapshotRequest => {
                        host.snapshot_into(&mut snap);
                        adapter.observe(Some(cmd.client_id), &snap);
                    }
                }
            }
        }

        host.snapshot_into(&mut snap);
        if host.take_dirty() {
            if let Some(adapter) = adapter.as_deref_mut() {
                adapter.observe(None, &snap);
            }
        }

        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);
        let status = adapter.as_deref().map(|a| {
            let s = a.status();
            AdapterStatusView {
                enabled: true,
                client_count: s.client_count,
                controller_id: s.controller_id,
                streaming_count: s.streaming_count,
            }
        });
        view.render_into_with_adapter(&snap, Some(cursor.index()), status.as_ref(), viewport, &mut fb);
        term.draw_swap(&mut fb)?;

        let timeout = tick_duration.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if should_quit(key) {
                        host.abandon();
                        info!("quit");
                        return Ok(());
                    }
                    if let Some(action) = handle_key_event(key) {
                        if let Some(index) = cursor.apply(action) {
                            host.tap(index);
                        } else if !matches!(
                            action,
                            GameAction::CursorUp
                                | GameAction::CursorDown
                                | GameAction::CursorLeft
                                | GameAction::CursorRight
                        ) {
                            host.apply_action(action);
                        }
                    }
                }
                Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                    if let Some(index) = view.hit_test(viewport, mouse.column, mouse.row) {
                        cursor.set_index(index);
                        host.tap(index);
                    }
                }
                Event::Resize(_, _) => term.invalidate(),
                _ => {}
            }
        }

        let elapsed = last_tick.elapsed();
        if elapsed >= tick_duration {
            last_tick = Instant::now();
            host.tick(elapsed.as_millis().min(u32::MAX as u128) as u32);
        }
    }
}

fn observe(config: &ObserveConfig) -> Result<()> {
    let rx = connect_observer(config)?;
    let mut latest = wait_for_welcome(&rx, Duration::from_secs(2))?;

    let mut term = TerminalRenderer::new().without_mouse();
    term.enter()?;
    let result = observe_loop(&mut term, config, &rx, &mut latest);
    let _ = term.exit();
    result
}

fn observe_loop(
    term: &mut TerminalRenderer,
    config: &ObserveConfig,
    rx: &std::sync::mpsc::Receiver<ObserveEvent>,
    latest: &mut Option<paper_forge::adapter::ObservationMessage>,
) -> Result<()> {
    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let tick_duration = Duration::from_millis(TICK_MS as u64);

    loop {
        while let Ok(event) = rx.try_recv() {
            match event {
                ObserveEvent::Observation(obs) => *latest = Some(*obs),
                ObserveEvent::Closed => return Ok(()),
                ObserveEvent::Error(msg) => tracing::warn!(%msg, "observer"),
                ObserveEvent::Welcome => {}
            }
        }

        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);
        let snap = latest
            .as_ref()
            .map(snapshot_from_observation)
            .unwrap_or_default();
        view.render_into(&snap, None, viewport, &mut fb);
        let style = CellStyle::default().dim();
        for (y, line) in observe_status_lines(config, latest.as_ref()).iter().enumerate() {
            fb.put_str(0, y as u16, line, style);
        }
        term.draw_swap(&mut fb)?;

        if event::poll(tick_duration)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && should_quit(key) {
                    return Ok(());
                }
            }
        }
    }
}

//! GameView: maps a [`SessionSnapshot`] into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested. The same layout math
//! drives [`GameView::hit_test`], so mouse clicks land on the tile drawn under
//! the pointer.

use crate::core::SessionSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{ForgeStatus, PaperStatus, TileKind, GRID_SIZE};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Bridge state shown in the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatusView {
    pub enabled: bool,
    pub client_count: u16,
    pub controller_id: Option<usize>,
    pub streaming_count: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// Board frame placement inside a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    start_x: u16,
    start_y: u16,
    frame_w: u16,
    frame_h: u16,
}

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);
const PANEL_BG: Rgb = Rgb::new(0, 0, 0);

/// Terminal renderer for the forge board.
pub struct GameView {
    /// Tile width in terminal columns.
    cell_w: u16,
    /// Tile height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // 4x2 keeps tiles roughly square and easy to click.
        Self {
            cell_w: 4,
            cell_h: 2,
            anchor_y: AnchorY::Center,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    fn layout(&self, viewport: Viewport) -> Layout {
        let frame_w = (GRID_SIZE as u16) * self.cell_w + 2;
        let frame_h = (GRID_SIZE as u16) * self.cell_h + 2;
        let start_x = viewport.width.saturating_sub(frame_w) / 2;
        let start_y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(frame_h) / 2,
            AnchorY::Top => 0,
        };
        Layout {
            start_x,
            start_y,
            frame_w,
            frame_h,
        }
    }

    /// Board index under terminal position `(x, y)`, if any.
    pub fn hit_test(&self, viewport: Viewport, x: u16, y: u16) -> Option<usize> {
        let layout = self.layout(viewport);
        let left = layout.start_x + 1;
        let top = layout.start_y + 1;
        if x < left || y < top {
            return None;
        }
        let col = ((x - left) / self.cell_w) as usize;
        let row = ((y - top) / self.cell_h) as usize;
        (row < GRID_SIZE && col < GRID_SIZE).then_some(row * GRID_SIZE + col)
    }

    /// Render into an existing framebuffer.
    ///
    /// Callers can reuse a framebuffer across frames and only resize when the
    /// terminal size changes.
    pub fn render_into(
        &self,
        snap: &SessionSnapshot,
        cursor: Option<usize>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        self.render_into_with_adapter(snap, cursor, None, viewport, fb);
    }

    pub fn render_into_with_adapter(
        &self,
        snap: &SessionSnapshot,
        cursor: Option<usize>,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let layout = self.layout(viewport);
        let border = CellStyle::new(Rgb::new(200, 200, 200), PANEL_BG);
        self.draw_border(fb, layout, border);

        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                let index = row * GRID_SIZE + col;
                let kind = snap.board[row][col];
                self.draw_tile(fb, layout, row, col, kind, snap.selected == Some(index));
                if cursor == Some(index) && snap.playable() {
                    self.draw_cursor(fb, layout, row, col);
                }
            }
        }

        self.draw_side_panel(fb, snap, adapter, viewport, layout);

        let mut below = layout.start_y.saturating_add(layout.frame_h);
        if let Some(notice) = snap.notice {
            let style = CellStyle::new(Rgb::new(255, 220, 120), PANEL_BG).bold();
            fb.put_str(layout.start_x, below, notice.message(), style);
            below = below.saturating_add(1);
        }

        match snap.status {
            ForgeStatus::Generating => {
                self.draw_overlay_text(fb, layout, "UNDER REVIEW");
            }
            ForgeStatus::Review => {
                if let Some(result) = &snap.result {
                    self.draw_overlay_text(fb, layout, result.status.as_str());
                }
                self.draw_review(fb, snap, viewport, below.saturating_add(1));
            }
            ForgeStatus::Playing | ForgeStatus::Resolving => {}
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &SessionSnapshot, cursor: Option<usize>, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, cursor, viewport, &mut fb);
        fb
    }

    pub fn render_with_adapter(
        &self,
        snap: &SessionSnapshot,
        cursor: Option<usize>,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into_with_adapter(snap, cursor, adapter, viewport, &mut fb);
        fb
    }

    fn draw_border(&self, fb: &mut FrameBuffer, layout: Layout, style: CellStyle) {
        let Layout {
            start_x: x,
            start_y: y,
            frame_w: w,
            frame_h: h,
        } = layout;

        fb.put_char(x, y, '┌', style);
        fb.put_char(x + w - 1, y, '┐', style);
        fb.put_char(x, y + h - 1, '└', style);
        fb.put_char(x + w - 1, y + h - 1, '┘', style);

        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    fn tile_origin(&self, layout: Layout, row: usize, col: usize) -> (u16, u16) {
        (
            layout.start_x + 1 + col as u16 * self.cell_w,
            layout.start_y + 1 + row as u16 * self.cell_h,
        )
    }

    fn draw_tile(&self, fb: &mut FrameBuffer, layout: Layout, row: usize, col: usize, kind: TileKind, selected: bool) {
        let (px, py) = self.tile_origin(layout, row, col);
        let mut style = CellStyle::new(Rgb::new(15, 15, 20), tile_color(kind));
        if kind == TileKind::Empty {
            style = CellStyle::new(Rgb::new(90, 90, 100), BOARD_BG).dim();
        }
        if selected {
            style = style.inverted().bold();
        }

        fb.fill_rect(px, py, self.cell_w, self.cell_h, ' ', style);
        let glyph = if kind == TileKind::Empty { '·' } else { kind.letter() };
        fb.put_char(
            px + (self.cell_w - 1) / 2,
            py + (self.cell_h - 1) / 2,
            glyph,
            style,
        );
    }

    fn draw_cursor(&self, fb: &mut FrameBuffer, layout: Layout, row: usize, col: usize) {
        if self.cell_w < 3 {
            return;
        }
        let (px, py) = self.tile_origin(layout, row, col);
        let y = py + (self.cell_h - 1) / 2;
        let bg = fb.get(px, y).map(|c| c.style.bg).unwrap_or(BOARD_BG);
        let style = CellStyle::new(Rgb::new(255, 255, 255), bg).bold();
        fb.put_char(px, y, '[', style);
        fb.put_char(px + self.cell_w - 1, y, ']', style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &SessionSnapshot,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        layout: Layout,
    ) {
        let panel_x = layout
            .start_x
            .saturating_add(layout.frame_w)
            .saturating_add(2);
        if panel_x >= viewport.width {
            return;
        }
        let panel_w = viewport.width - panel_x;
        if panel_w < 12 {
            return;
        }

        let label = CellStyle::new(Rgb::new(220, 220, 220), PANEL_BG).bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), PANEL_BG);

        let mut y = layout.start_y;
        fb.put_str(panel_x, y, "SCORE", label);
        y = y.saturating_add(1);
        fb.put_u32(panel_x, y, snap.score, value);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "MOVES", label);
        y = y.saturating_add(1);
        let moves_style = if snap.moves_remaining <= 3 {
            CellStyle::new(Rgb::new(240, 90, 90), PANEL_BG).bold()
        } else {
            value
        };
        fb.put_u32(panel_x, y, snap.moves_remaining, moves_style);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "STATUS", label);
        y = y.saturating_add(1);
        fb.put_str(panel_x, y, status_label(snap.status), value);
        y = y.saturating_add(2);

        if let Some(final_score) = snap.final_score {
            fb.put_str(panel_x, y, "FINAL", label);
            y = y.saturating_add(1);
            fb.put_u32(panel_x, y, final_score, value);
            y = y.saturating_add(2);
        }

        fb.put_str(panel_x, y, "BRIDGE", label);
        y = y.saturating_add(1);
        match adapter {
            Some(st) if st.enabled => {
                fb.put_str(panel_x, y, "ON", value);
                if panel_w >= 16 {
                    let dim = value.dim();
                    fb.put_str(panel_x + 3, y, "clients", dim);
                }
                y = y.saturating_add(1);
                fb.put_str(panel_x, y, "C", value);
                fb.put_u32(panel_x + 2, y, st.client_count as u32, value);
                y = y.saturating_add(1);
                fb.put_str(panel_x, y, "S", value);
                fb.put_u32(panel_x + 2, y, st.streaming_count as u32, value);
                y = y.saturating_add(1);
                fb.put_str(panel_x, y, "CTRL", value);
                match st.controller_id {
                    Some(id) => fb.put_u32(panel_x + 5, y, id as u32, value),
                    None => fb.put_str(panel_x + 5, y, "-", value),
                };
            }
            _ => {
                fb.put_str(panel_x, y, "OFF", value);
            }
        }
    }

    fn draw_review(&self, fb: &mut FrameBuffer, snap: &SessionSnapshot, viewport: Viewport, y: u16) {
        let Some(result) = &snap.result else {
            return;
        };
        let max = viewport.width;
        let label = CellStyle::new(Rgb::new(220, 220, 220), PANEL_BG).bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), PANEL_BG);
        let verdict = CellStyle::new(verdict_color(result.status), PANEL_BG).bold();

        fb.put_str_max(0, y, &result.title, max, label);
        let x = fb.put_str(0, y + 1, result.tier.label(), value);
        let x = fb.put_str(x, y + 1, "  ", value);
        fb.put_str(x, y + 1, result.status.as_str(), verdict);
        let x = fb.put_str(0, y + 2, "score ", value);
        let x = fb.put_u32(x, y + 2, result.score, value);
        let x = fb.put_str(x, y + 2, "  potential ", value);
        fb.put_u32(x, y + 2, result.potential, value);
        fb.put_str_max(0, y + 3, &result.feedback, max, value.dim());
        fb.put_str(0, y + 5, "[C] collect   [R] new session", label);
    }

    fn draw_overlay_text(&self, fb: &mut FrameBuffer, layout: Layout, text: &str) {
        let mid_y = layout.start_y.saturating_add(layout.frame_h / 2);
        let text_w = text.chars().count() as u16;
        let x = layout
            .start_x
            .saturating_add(layout.frame_w.saturating_sub(text_w) / 2);
        let style = CellStyle::new(Rgb::new(255, 255, 255), PANEL_BG).bold();
        fb.put_str(x, mid_y, text, style);
    }
}

fn tile_color(kind: TileKind) -> Rgb {
    match kind {
        TileKind::Data => Rgb::new(90, 140, 230),
        TileKind::Theory => Rgb::new(170, 110, 220),
        TileKind::Writing => Rgb::new(100, 200, 120),
        TileKind::Coffee => Rgb::new(190, 140, 90),
        TileKind::Bug => Rgb::new(220, 80, 80),
        TileKind::Bomb => Rgb::new(250, 170, 50),
        TileKind::Laser => Rgb::new(80, 220, 230),
        TileKind::Empty => BOARD_BG,
    }
}

fn verdict_color(status: PaperStatus) -> Rgb {
    match status {
        PaperStatus::Accepted => Rgb::new(120, 230, 120),
        PaperStatus::MinorRevision => Rgb::new(200, 230, 120),
        PaperStatus::MajorRevision => Rgb::new(240, 190, 90),
        PaperStatus::Rejected => Rgb::new(240, 90, 90),
    }
}

fn status_label(status: ForgeStatus) -> &'static str {
    match status {
        ForgeStatus::Playing => "PLAYING",
        ForgeStatus::Resolving => "RESOLVING",
        ForgeStatus::Generating => "GENERATING",
        ForgeStatus::Review => "REVIEW",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_test_maps_tile_corners() {
        let view = GameView::default();
        // Frame is 26x14; centred in 26x14 it starts at (0, 0).
        let vp = Viewport::new(26, 14);
        assert_eq!(view.hit_test(vp, 0, 0), None);
        assert_eq!(view.hit_test(vp, 1, 1), Some(0));
        assert_eq!(view.hit_test(vp, 4, 2), Some(0));
        assert_eq!(view.hit_test(vp, 5, 1), Some(1));
        assert_eq!(view.hit_test(vp, 1, 3), Some(6));
        assert_eq!(view.hit_test(vp, 24, 12), Some(35));
        assert_eq!(view.hit_test(vp, 25, 12), None);
        assert_eq!(view.hit_test(vp, 1, 13), None);
    }

    #[test]
    fn test_tile_glyph_centred() {
        let mut snap = SessionSnapshot::default();
        snap.board[0][0] = TileKind::Coffee;
        let fb = GameView::default().render(&snap, None, Viewport::new(26, 14));
        assert_eq!(fb.get(2, 1).map(|c| c.ch), Some('C'));
        assert_eq!(fb.get(1, 1).map(|c| c.style.bg), Some(tile_color(TileKind::Coffee)));
    }

    #[test]
    fn test_selection_inverts_tile() {
        let mut snap = SessionSnapshot::default();
        snap.board[0][1] = TileKind::Data;
        snap.selected = Some(1);
        let fb = GameView::default().render(&snap, None, Viewport::new(26, 14));
        let cell = fb.get(6, 1).expect("tile cell");
        assert_eq!(cell.style.fg, tile_color(TileKind::Data));
        assert!(cell.style.bold);
    }

    #[test]
    fn test_cursor_brackets() {
        let mut snap = SessionSnapshot::default();
        snap.board[1][0] = TileKind::Bug;
        let fb = GameView::default().render(&snap, Some(6), Viewport::new(26, 14));
        assert_eq!(fb.get(1, 3).map(|c| c.ch), Some('['));
        assert_eq!(fb.get(4, 3).map(|c| c.ch), Some(']'));
    }
}

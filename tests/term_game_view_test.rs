use paper_forge::core::{grade, PaperResult, SessionSnapshot};
use paper_forge::term::{AdapterStatusView, AnchorY, FrameBuffer, GameView, Viewport};
use paper_forge::types::{ForgeStatus, TileKind};

fn screen_text(fb: &FrameBuffer) -> String {
    let mut all = String::new();
    for y in 0..fb.height() {
        all.push_str(&fb.row_text(y));
        all.push('\n');
    }
    all
}

#[test]
fn term_view_renders_border_corners() {
    let view = GameView::default();

    // 6 tiles of 4x2 plus the border => 26x14.
    let fb = view.render(&SessionSnapshot::default(), None, Viewport::new(26, 14));

    assert_eq!(fb.get(0, 0).unwrap().ch, '┌');
    assert_eq!(fb.get(25, 0).unwrap().ch, '┐');
    assert_eq!(fb.get(0, 13).unwrap().ch, '└');
    assert_eq!(fb.get(25, 13).unwrap().ch, '┘');
}

#[test]
fn term_view_draws_tile_letters() {
    let mut snap = SessionSnapshot::default();
    snap.board[5][0] = TileKind::Bomb;
    snap.board[5][5] = TileKind::Laser;

    let fb = GameView::default().render(&snap, None, Viewport::new(26, 14));

    // Row 5 starts at y = 1 + 5 * 2; letters sit in the second column of a tile.
    assert_eq!(fb.get(2, 11).unwrap().ch, TileKind::Bomb.letter());
    assert_eq!(fb.get(22, 11).unwrap().ch, TileKind::Laser.letter());
}

#[test]
fn term_view_draws_side_panel_when_wide_enough() {
    let mut snap = SessionSnapshot::default();
    snap.score = 1234;
    snap.moves_remaining = 7;

    let status = AdapterStatusView {
        enabled: true,
        client_count: 2,
        controller_id: Some(1),
        streaming_count: 1,
    };
    let fb = GameView::default().render_with_adapter(&snap, None, Some(&status), Viewport::new(60, 14));
    let all = screen_text(&fb);

    assert!(all.contains("SCORE"));
    assert!(all.contains("1234"));
    assert!(all.contains("MOVES"));
    assert!(all.contains("PLAYING"));
    assert!(all.contains("BRIDGE"));
    assert!(all.contains("CTRL 1"));
}

#[test]
fn term_view_skips_panel_on_narrow_viewports() {
    let fb = GameView::default().render(&SessionSnapshot::default(), None, Viewport::new(30, 14));
    assert!(!screen_text(&fb).contains("SCORE"));
}

#[test]
fn term_view_shows_pending_review_when_generating() {
    let mut snap = SessionSnapshot::default();
    snap.moves_remaining = 0;
    snap.status = ForgeStatus::Generating;
    snap.final_score = Some(410);

    let fb = GameView::default().render(&snap, None, Viewport::new(60, 24));
    let all = screen_text(&fb);
    assert!(all.contains("UNDER REVIEW"));
    assert!(!all.contains("[V]"));
    assert!(all.contains("FINAL"));
    assert!(all.contains("410"));
}

#[test]
fn term_view_shows_review_result() {
    let (tier, status) = grade(1200);
    let mut snap = SessionSnapshot::default();
    snap.status = ForgeStatus::Review;
    snap.final_score = Some(1200);
    snap.result = Some(PaperResult {
        title: "Towards Lab Involution: A Benchmark".to_string(),
        tier,
        score: 1200,
        status,
        feedback: "Solid experiments, acceptable novelty.".to_string(),
        citations: 12,
        potential: tier.potential(),
    });

    let fb = GameView::default().render(&snap, None, Viewport::new(80, 30));
    let all = screen_text(&fb);
    assert!(all.contains("Towards Lab Involution: A Benchmark"));
    assert!(all.contains(status.as_str()));
    assert!(all.contains("[C] collect"));
}

#[test]
fn term_view_centers_board_by_default_on_tall_viewports() {
    let snap = SessionSnapshot::default();

    // start_y = (30 - 14) / 2 = 8
    let fb = GameView::default().render(&snap, None, Viewport::new(26, 30));
    assert_eq!(fb.get(0, 8).unwrap().ch, '┌');

    let top = GameView::default().with_anchor_y(AnchorY::Top);
    let fb = top.render(&snap, None, Viewport::new(26, 30));
    assert_eq!(fb.get(0, 0).unwrap().ch, '┌');
}

#[test]
fn term_view_hit_test_follows_anchor() {
    let vp = Viewport::new(26, 30);
    let centered = GameView::default();
    assert_eq!(centered.hit_test(vp, 1, 1), None);
    assert_eq!(centered.hit_test(vp, 1, 9), Some(0));

    let top = GameView::default().with_anchor_y(AnchorY::Top);
    assert_eq!(top.hit_test(vp, 1, 1), Some(0));
    assert_eq!(top.hit_test(vp, 24, 12), Some(35));
}

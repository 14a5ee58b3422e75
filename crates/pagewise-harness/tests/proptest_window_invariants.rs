#![forbid(unsafe_code)]

//! Property-based invariant tests for the page window and the controller.
//!
//! 1. The window is exactly the current page plus the offscreen limit on
//!    each side, clipped to the data set.
//! 2. Offsets strictly increase with index, for any widths and margin.
//! 3. Exactly one materialized page is current whenever data exists.
//! 4. Every live adapter handle belongs to a materialized page.
//! 5. A fling settles in the direction of its velocity.
//! 6. Retargeting an in-flight settle starts from the offset on screen.
//! 7. An idle pager rests exactly on its current page.

use std::time::Duration;

use pagewise::{PagerConfig, PagingController, ScrollState};
use pagewise_harness::{HostSimulator, VecAdapter};
use proptest::prelude::*;

const WIDTH: f32 = 1000.0;

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Jump(usize),
    Animate(usize),
    Frames(u8),
    Drag { from: f32, to: f32, frames: u8 },
    Insert(usize),
    Remove(usize),
    Move(usize, usize),
    Resize(f32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..40).prop_map(Op::Jump),
        (0usize..40).prop_map(Op::Animate),
        (1u8..30).prop_map(Op::Frames),
        (100.0f32..900.0, 100.0f32..900.0, 1u8..8)
            .prop_map(|(from, to, frames)| Op::Drag { from, to, frames }),
        (0usize..40).prop_map(Op::Insert),
        (0usize..40).prop_map(Op::Remove),
        (0usize..40, 0usize..40).prop_map(|(a, b)| Op::Move(a, b)),
        (200.0f32..1600.0).prop_map(Op::Resize),
    ]
}

fn apply(sim: &mut HostSimulator<VecAdapter>, op: &Op) {
    let result = match *op {
        Op::Jump(index) => sim.pager_mut().set_current_index(index, false),
        Op::Animate(index) => sim.pager_mut().set_current_index(index, true),
        Op::Frames(n) => (0..n).try_for_each(|_| sim.frame()),
        Op::Drag { from, to, frames } => sim.drag(from, to, u32::from(frames)),
        Op::Insert(at) => {
            let at = at.min(sim.adapter().len());
            sim.adapter_mut().insert(at);
            sim.pager_mut().notify_adapter_changed()
        }
        Op::Remove(at) => {
            sim.adapter_mut().remove(at);
            sim.pager_mut().notify_adapter_changed()
        }
        Op::Move(from, to) => {
            sim.adapter_mut().move_item(from, to);
            sim.pager_mut().notify_adapter_changed()
        }
        Op::Resize(width) => sim.lay_out(width),
    };
    assert!(result.is_ok(), "{op:?} failed: {result:?}");
}

fn check_window(sim: &HostSimulator<VecAdapter>, limit: usize) -> Result<(), TestCaseError> {
    let pager = sim.pager();
    let count = pager.item_count();
    let pages = sim.pages();
    if count == 0 {
        prop_assert!(pages.is_empty());
        return Ok(());
    }
    let current = pager.current_index();
    prop_assert!(current < count);
    let expected: Vec<usize> =
        (current.saturating_sub(limit)..=(current + limit).min(count - 1)).collect();
    prop_assert_eq!(&pages, &expected, "current {}", current);

    let offsets: Vec<f32> = pager.pages().iter().map(|p| p.offset()).collect();
    for pair in offsets.windows(2) {
        prop_assert!(pair[1] > pair[0], "offsets not increasing: {:?}", offsets);
    }
    if let Some(first) = pager.pages().get(0) {
        prop_assert_eq!(first.offset(), 0.0);
    }

    let current_pages = pager
        .pages()
        .iter()
        .filter(|p| p.is_current(current))
        .count();
    prop_assert_eq!(current_pages, 1);

    let mut live = sim.adapter().live_ids();
    let mut handles: Vec<u64> = pager.pages().iter().map(|p| *p.handle()).collect();
    live.sort_unstable();
    handles.sort_unstable();
    prop_assert_eq!(live, handles);
    Ok(())
}

// ═════════════════════════════════════════════════════════════════════════
// 1–4. Window shape survives arbitrary operation sequences
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn window_invariants_hold(
        count in 0usize..25,
        limit in 1usize..4,
        ops in proptest::collection::vec(op_strategy(), 1..25),
    ) {
        let config = PagerConfig::default().with_offscreen_limit(limit);
        let mut sim = HostSimulator::with_config(count, WIDTH, config).expect("layout");
        check_window(&sim, limit)?;
        for op in &ops {
            apply(&mut sim, op);
            check_window(&sim, limit)?;
        }
        sim.run_until_idle().expect("settle");
        check_window(&sim, limit)?;

        // 7. Idle means aligned on the current page.
        if sim.pager().item_count() > 0 {
            prop_assert_eq!(sim.pager().scroll_state(), ScrollState::Idle);
            let current = sim.pager().current_index();
            prop_assert_eq!(Some(sim.offset()), sim.offset_of_page(current));
            prop_assert_eq!(sim.pager().selected_index(), Some(current));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Offsets are monotonic for any widths and margin
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn offsets_monotonic_with_widths(
        widths in proptest::collection::vec(0.2f32..1.5, 2..20),
        margin in 0.0f32..80.0,
        anchor in 0usize..20,
        limit in 1usize..4,
    ) {
        let mut adapter = VecAdapter::new(widths.len());
        for (index, width) in widths.iter().enumerate() {
            adapter.set_width(index, *width);
        }
        let config = PagerConfig::default()
            .with_offscreen_limit(limit)
            .with_page_margin(margin);
        let mut sim = HostSimulator::new(PagingController::new(adapter, config));
        sim.pager_mut().set_current_index(anchor, false).expect("pending");
        sim.lay_out(WIDTH).expect("layout");

        let pages: Vec<(usize, f32, f32)> = sim
            .pager()
            .pages()
            .iter()
            .map(|p| (p.index(), p.offset(), p.width_fraction()))
            .collect();
        let gap = margin / WIDTH;
        for pair in pages.windows(2) {
            let (a, a_off, a_width) = pair[0];
            let (b, b_off, _) = pair[1];
            prop_assert_eq!(b, a + 1);
            prop_assert!(b_off > a_off);
            prop_assert!((b_off - (a_off + a_width + gap)).abs() < 1e-3);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Fling direction law
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn fling_direction_matches_velocity(
        start in 1usize..8,
        distance in 60.0f32..400.0,
        frames in 2u32..4,
        forward in any::<bool>(),
    ) {
        let mut sim = HostSimulator::with_pages(10, WIDTH).expect("layout");
        sim.pager_mut().set_current_index(start, false).expect("jump");
        let (from, to) = if forward {
            (700.0, 700.0 - distance)
        } else {
            (300.0, 300.0 + distance)
        };
        sim.drag(from, to, frames).expect("fling");
        sim.run_until_idle().expect("settle");
        let target = sim.pager().current_index();
        if forward {
            prop_assert_eq!(target, start + 1);
        } else {
            prop_assert_eq!(target, start - 1);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Cancellation continuity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn retarget_starts_from_shown_offset(
        first in 1usize..10,
        second in 0usize..10,
        frames in 1u32..15,
    ) {
        let mut sim = HostSimulator::with_pages(10, WIDTH).expect("layout");
        sim.pager_mut().set_current_index(first, true).expect("first");
        for _ in 0..frames {
            sim.frame().expect("frame");
        }
        let before = sim.offset();
        sim.pager_mut().set_current_index(second, true).expect("second");
        sim.recording().clear();
        sim.advance(Duration::from_millis(1)).expect("tick");
        let after = sim.offset();
        sim.run_until_idle().expect("settle");
        let end = sim.offset();

        // Quintic ease-out moves at most 5 * distance / duration per unit time.
        let duration = sim.pager().config().default_settle_duration.as_secs_f32() * 1000.0;
        let bound = 5.0 * (end - before).abs() / duration + 1.0;
        prop_assert!((after - before).abs() <= bound, "{} -> {} (bound {})", before, after, bound);
        prop_assert_eq!(sim.recording().selected(), vec![second]);
    }
}

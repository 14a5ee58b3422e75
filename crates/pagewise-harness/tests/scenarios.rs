#![forbid(unsafe_code)]

//! End-to-end paging scenarios run through the host simulator.

use std::time::Duration;

use pagewise::{PagerConfig, PagingController, ScrollState};
use pagewise_harness::{HostSimulator, VecAdapter, init_test_logging};

const WIDTH: f32 = 1000.0;

fn sim(count: usize) -> HostSimulator<VecAdapter> {
    init_test_logging();
    HostSimulator::with_pages(count, WIDTH).expect("layout")
}

/// Simulator resting on `index` with the recording cleared.
fn sim_at(count: usize, index: usize) -> HostSimulator<VecAdapter> {
    let mut sim = sim(count);
    sim.pager_mut()
        .set_current_index(index, false)
        .expect("jump");
    sim.recording().clear();
    sim
}

#[test]
fn window_surrounds_current_page() {
    init_test_logging();
    let config = PagerConfig::default().with_offscreen_limit(1);
    let mut sim = HostSimulator::new(PagingController::new(VecAdapter::new(5), config));
    sim.pager_mut()
        .set_current_index(2, false)
        .expect("pending index");
    sim.lay_out(WIDTH).expect("layout");
    assert_eq!(sim.pages(), vec![1, 2, 3]);
    assert_eq!(sim.recording().selected(), vec![2]);
    let current: Vec<usize> = sim
        .pager()
        .pages()
        .iter()
        .filter(|page| page.is_current(sim.pager().current_index()))
        .map(|page| page.index())
        .collect();
    assert_eq!(current, vec![2]);
}

#[test]
fn short_slow_drag_snaps_back() {
    let mut sim = sim_at(5, 2);
    let rest = sim.offset();
    sim.drag_and_hold(600.0, 400.0, 10).expect("drag");
    assert_eq!(sim.pager().scroll_state(), ScrollState::Settling);
    sim.run_until_idle().expect("settle");
    assert!(sim.recording().selected().is_empty());
    assert_eq!(sim.offset(), rest);
    assert_eq!(sim.pager().current_index(), 2);
    assert_eq!(
        sim.recording().states(),
        vec![ScrollState::Dragging, ScrollState::Settling, ScrollState::Idle]
    );
}

#[test]
fn fast_short_fling_advances() {
    let mut sim = sim_at(5, 2);
    sim.drag(600.0, 550.0, 3).expect("fling");
    sim.run_until_idle().expect("settle");
    assert_eq!(sim.recording().selected(), vec![3]);
    assert_eq!(Some(sim.offset()), sim.offset_of_page(3));
}

#[test]
fn shrinking_data_set_clamps_current() {
    let mut sim = sim_at(10, 7);
    sim.adapter_mut().truncate(3);
    sim.pager_mut()
        .notify_adapter_changed()
        .expect("revalidate");
    assert_eq!(sim.pager().current_index(), 2);
    assert_eq!(sim.recording().selected(), vec![2]);
    assert_eq!(sim.pages(), vec![1, 2]);
    assert_eq!(Some(sim.offset()), sim.offset_of_page(2));
    assert_eq!(sim.adapter().live_ids().len(), 2, "evicted pages destroyed");
}

#[test]
fn second_animated_request_retargets_in_flight() {
    let mut sim = sim(8);
    sim.recording().clear();
    sim.pager_mut().set_current_index(4, true).expect("first");
    for _ in 0..4 {
        sim.frame().expect("frame");
    }
    let before = sim.offset();
    assert!(before > 500.0 && before < 4000.0, "mid-flight at {before}");

    sim.pager_mut().set_current_index(6, true).expect("second");
    sim.advance(Duration::from_millis(1)).expect("tick");
    let after = sim.offset();
    assert!(after >= before, "moved backward from {before} to {after}");
    assert!(after - before < 150.0, "jumped from {before} to {after}");

    sim.run_until_idle().expect("settle");
    assert_eq!(sim.recording().selected(), vec![6]);
    assert_eq!(Some(sim.offset()), sim.offset_of_page(6));
}

#[test]
fn repeated_jump_is_silent() {
    let mut sim = sim_at(5, 3);
    sim.pager_mut().set_current_index(3, false).expect("again");
    assert!(sim.recording().events().is_empty());
}

#[test]
fn paging_walks_through_every_page() {
    let mut sim = sim(4);
    while sim.pager_mut().page_forward().expect("forward") {
        sim.run_until_idle().expect("settle");
    }
    assert_eq!(sim.recording().selected(), vec![0, 1, 2, 3]);
    while sim.pager_mut().page_backward().expect("backward") {
        sim.run_until_idle().expect("settle");
    }
    assert_eq!(sim.recording().selected(), vec![0, 1, 2, 3, 2, 1, 0]);
    assert_eq!(sim.offset(), 0.0);
}

#[test]
fn transcript_is_jsonl() {
    let mut sim = sim(3);
    sim.pager_mut().set_current_index(1, true).expect("settle");
    sim.run_until_idle().expect("settle");
    let jsonl = sim.recording().to_jsonl();
    assert!(jsonl.lines().count() >= 3, "{jsonl}");
    for line in jsonl.lines() {
        let value: serde_json::Value = serde_json::from_str(line).expect("json");
        assert!(value["event"].is_string(), "{line}");
    }
}

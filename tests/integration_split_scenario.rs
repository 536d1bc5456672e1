use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use viewport_manager::input::{InputEvent, InputKey, KeyAction, RouteOutcome, SwallowReason};
use viewport_manager::layout::{
    HudClass, LayoutDefinition, LayoutWarning, NormalizedRect, PaneSpec, PlayerSlot,
};
use viewport_manager::{FocusChange, HeadlessHost, ViewportCompositor};

fn slot(index: u32) -> PlayerSlot {
    PlayerSlot::new(index)
}

fn side_by_side() -> LayoutDefinition {
    LayoutDefinition::new(vec![
        PaneSpec::new(0, NormalizedRect::new(0.0, 0.0, 0.5, 1.0)),
        PaneSpec::new(1, NormalizedRect::new(0.5, 0.0, 0.5, 1.0)),
    ])
}

fn compositor_with(layout: LayoutDefinition) -> ViewportCompositor<HeadlessHost> {
    let mut compositor = ViewportCompositor::new(HeadlessHost::new(1920, 1080));
    compositor.apply_layout(Some(layout));
    compositor
}

fn click_at(compositor: &mut ViewportCompositor<HeadlessHost>, x: f32, y: f32) -> RouteOutcome {
    compositor
        .host_mut()
        .set_pointer_normalized(Vec2::new(x, y));
    compositor
        .input_router()
        .route(&InputEvent::key(InputKey::MouseLeft, KeyAction::Pressed))
}

type FocusLog = Rc<RefCell<Vec<(u32, u32)>>>;

fn record_focus(compositor: &mut ViewportCompositor<HeadlessHost>) -> FocusLog {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    compositor.subscribe_focus_changed(move |old, new| {
        sink.borrow_mut().push((old.index(), new.index()));
    });
    seen
}

#[test]
fn split_screen_click_focus_and_resize() {
    let mut compositor = compositor_with(side_by_side());
    let seen = record_focus(&mut compositor);

    let outcome = click_at(&mut compositor, 0.1, 0.1);
    assert_eq!(outcome.target(), Some(slot(0)));
    assert_eq!(compositor.focused_player(), slot(0));
    assert!(seen.borrow().is_empty());

    let outcome = click_at(&mut compositor, 0.9, 0.9);
    assert_eq!(outcome.target(), Some(slot(1)));
    assert_eq!(compositor.focused_player(), slot(1));
    assert_eq!(*seen.borrow(), vec![(0, 1)]);

    let report = compositor
        .set_pane_rect(slot(0), NormalizedRect::FULL)
        .expect("slot 0 has a pane");
    assert!(report.is_clean());
    assert_eq!(compositor.player_rect(slot(0)), NormalizedRect::FULL);
    assert_eq!(
        compositor.player_rect(slot(1)),
        NormalizedRect::new(0.5, 0.0, 0.5, 1.0)
    );

    // Equal depth: the earlier-declared pane wins the overlap.
    for point in [(0.1, 0.5), (0.75, 0.5), (0.99, 0.99)] {
        assert_eq!(click_at(&mut compositor, point.0, point.1).target(), Some(slot(0)));
    }
    assert_eq!(compositor.focused_player(), slot(0));
    assert_eq!(*seen.borrow(), vec![(0, 1), (1, 0)]);
}

#[test]
fn rects_match_panes_exactly() {
    let layout = LayoutDefinition::new(vec![
        PaneSpec::new(0, NormalizedRect::new(0.0, 0.0, 0.667, 1.0)),
        PaneSpec::new(1, NormalizedRect::new(0.667, 0.0, 0.333, 0.5)),
        PaneSpec::new(2, NormalizedRect::new(0.667, 0.5, 0.333, 0.5)),
    ]);
    let expected: Vec<_> = layout.panes.iter().map(|pane| pane.rect).collect();
    let compositor = compositor_with(layout);

    assert_eq!(compositor.player_rects().len(), 3);
    for (index, rect) in expected.into_iter().enumerate() {
        assert_eq!(compositor.player_rect(slot(index as u32)), rect);
        assert_eq!(
            compositor.host().player(slot(index as u32)).unwrap().viewport,
            Some(rect)
        );
    }
}

#[test]
fn duplicate_slot_keeps_first_pane() {
    let first = NormalizedRect::new(0.0, 0.0, 0.5, 0.5);
    let layout = LayoutDefinition::new(vec![
        PaneSpec::new(0, first),
        PaneSpec::new(0, NormalizedRect::FULL),
    ]);
    let mut compositor = ViewportCompositor::new(HeadlessHost::new(800, 600));
    let report = compositor.apply_layout(Some(layout));

    assert_eq!(compositor.player_rect(slot(0)), first);
    assert_eq!(compositor.player_rects().len(), 1);
    assert!(matches!(
        report.warnings.as_slice(),
        [LayoutWarning::DuplicateSlot { pane: 1, .. }]
    ));
}

#[test]
fn duplicate_slot_cannot_bring_its_own_hud() {
    let layout = LayoutDefinition::new(vec![
        PaneSpec::new(0, NormalizedRect::new(0.0, 0.0, 0.5, 1.0)),
        PaneSpec::new(0, NormalizedRect::FULL).with_hud(Some(HudClass::new("Dropped"))),
    ]);
    let mut compositor = ViewportCompositor::new(HeadlessHost::new(800, 600));
    let report = compositor.apply_layout(Some(layout));

    assert_eq!(report.huds_created, 0);
    assert!(compositor.hud().is_empty());
    assert!(compositor.host().hud_for(slot(0)).is_none());
}

#[test]
fn rejected_first_pane_is_not_replaced_by_duplicate() {
    let layout = LayoutDefinition::new(vec![
        PaneSpec::new(0, NormalizedRect::new(0.2, 0.2, 0.0, 0.5)),
        PaneSpec::new(0, NormalizedRect::new(0.5, 0.0, 0.5, 1.0)).with_keyboard_mouse(false),
    ]);
    let mut compositor = ViewportCompositor::new(HeadlessHost::new(800, 600));
    let report = compositor.apply_layout(Some(layout));

    assert!(compositor.player_rects().is_empty());
    assert!(matches!(
        report.warnings.as_slice(),
        [
            LayoutWarning::RectRejected { pane: 0 },
            LayoutWarning::DuplicateSlot { pane: 1, .. }
        ]
    ));
    assert_eq!(
        click_at(&mut compositor, 0.75, 0.5),
        RouteOutcome::Swallowed(SwallowReason::NoPaneAtPointer)
    );
}

#[test]
fn out_of_bounds_pane_is_clamped_not_inverted() {
    let layout = LayoutDefinition::new(vec![PaneSpec::new(
        0,
        NormalizedRect::new(0.6, 0.6, 0.6, 0.6),
    )]);
    assert!(!layout.validate().is_empty());

    let mut compositor = ViewportCompositor::new(HeadlessHost::new(800, 600));
    let report = compositor.apply_layout(Some(layout));
    assert!(!report.warnings.is_empty());

    if let Some(rect) = compositor.player_rects().get(slot(0)) {
        assert!(rect.size.x > 0.0 && rect.size.y > 0.0);
        assert!(rect.max().x <= 1.0 && rect.max().y <= 1.0);
        assert!(rect.origin.x >= 0.0 && rect.origin.y >= 0.0);
    }
}

#[test]
fn shared_edge_resolves_consistently() {
    let mut compositor = compositor_with(side_by_side());
    assert_eq!(click_at(&mut compositor, 0.25, 0.5).target(), Some(slot(0)));
    assert_eq!(click_at(&mut compositor, 0.75, 0.5).target(), Some(slot(1)));

    let first = compositor.find_pane_at(Vec2::new(0.5, 0.5));
    assert!(first.is_some());
    for _ in 0..16 {
        assert_eq!(compositor.find_pane_at(Vec2::new(0.5, 0.5)), first);
    }
}

#[test]
fn opted_out_pane_swallows_pointer_input() {
    let layout = LayoutDefinition::new(vec![
        PaneSpec::new(0, NormalizedRect::new(0.0, 0.0, 0.5, 1.0)),
        PaneSpec::new(1, NormalizedRect::new(0.5, 0.0, 0.5, 1.0)).with_keyboard_mouse(false),
    ]);
    let mut compositor = compositor_with(layout);

    let outcome = click_at(&mut compositor, 0.75, 0.5);
    assert_eq!(
        outcome,
        RouteOutcome::Swallowed(SwallowReason::KeyboardMouseDeclined(slot(1)))
    );
    assert!(!outcome.handled());
    let host = compositor.host();
    assert!(host.player(slot(1)).unwrap().received.is_empty());
    assert!(host.player(slot(0)).unwrap().received.is_empty());
    assert!(host.default_dispatch().is_empty());
    assert_eq!(compositor.focused_player(), slot(0));
}

#[test]
fn focus_notifications_fire_once_per_change() {
    let mut compositor = compositor_with(side_by_side());
    let seen = record_focus(&mut compositor);

    assert_eq!(compositor.set_active_local_player(slot(0)), FocusChange::Unchanged);
    assert!(seen.borrow().is_empty());

    assert_eq!(
        compositor.set_active_local_player(slot(1)),
        FocusChange::Changed {
            from: slot(0),
            to: slot(1)
        }
    );
    assert_eq!(*seen.borrow(), vec![(0, 1)]);

    assert_eq!(compositor.set_active_local_player(slot(1)), FocusChange::Unchanged);
    assert_eq!(compositor.set_active_local_player(slot(7)), FocusChange::Rejected);
    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(compositor.active_local_player(), slot(1));
}

#[test]
fn null_layout_makes_managed_path_inert() {
    let mut compositor = compositor_with(side_by_side());
    let restored_before = compositor.host().default_viewports_restored();

    let report = compositor.apply_layout(None);
    assert_eq!(report.panes_applied, 0);
    assert!(compositor.player_rects().is_empty());
    assert!(compositor.state().active_layout().is_none());
    assert!(compositor.host().default_viewports_restored() > restored_before);
    for index in 0..2 {
        assert_eq!(compositor.host().player(slot(index)).unwrap().viewport, None);
        assert_eq!(compositor.player_rect(slot(index)), NormalizedRect::ZERO);
    }

    let outcome = click_at(&mut compositor, 0.75, 0.5);
    assert_eq!(outcome, RouteOutcome::Bypassed { handled: true });
    assert_eq!(compositor.host().default_dispatch().len(), 1);
    assert_eq!(compositor.focused_player(), slot(0));
}

use std::fmt;

use glam::Vec2;

use crate::compositor::LiveLayoutState;
use crate::host::PlayerHost;
use crate::layout::PlayerSlot;

type FocusObserver = Box<dyn FnMut(PlayerSlot, PlayerSlot)>;

/// Handle returned by [`FocusController::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusSubscription(u64);

/// Result of a request to move focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusChange {
    /// The slot is not part of the active layout; nothing changed.
    Rejected,
    /// The slot already had focus; keyboard/mouse ownership was re-asserted.
    Unchanged,
    Changed { from: PlayerSlot, to: PlayerSlot },
}

/// Tracks which player owns keyboard and mouse, and who to tell when that
/// moves.
pub struct FocusController {
    click_to_focus: bool,
    focus_highlighting: bool,
    next_subscription: u64,
    observers: Vec<(FocusSubscription, FocusObserver)>,
}

impl fmt::Debug for FocusController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusController")
            .field("click_to_focus", &self.click_to_focus)
            .field("focus_highlighting", &self.focus_highlighting)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for FocusController {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusController {
    pub fn new() -> Self {
        Self {
            click_to_focus: true,
            focus_highlighting: false,
            next_subscription: 0,
            observers: Vec::new(),
        }
    }

    /// Registers `observer` to be called with `(old, new)` whenever focus
    /// moves to a different slot.
    pub fn subscribe(
        &mut self,
        observer: impl FnMut(PlayerSlot, PlayerSlot) + 'static,
    ) -> FocusSubscription {
        let id = FocusSubscription(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: FocusSubscription) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn set_active_local_player(
        &mut self,
        state: &mut LiveLayoutState,
        slot: PlayerSlot,
    ) -> FocusChange {
        if !state.player_rects.contains_slot(slot) {
            tracing::warn!(slot = %slot, "player slot is not part of the current layout");
            return FocusChange::Rejected;
        }

        let previous = state.focused_slot;
        state.active_keyboard_mouse_slot = slot;
        state.focused_slot = slot;

        if previous == slot {
            tracing::debug!(slot = %slot, "active player re-asserted");
            return FocusChange::Unchanged;
        }
        tracing::info!(from = %previous, to = %slot, "focus changed");
        for (_, observer) in self.observers.iter_mut() {
            observer(previous, slot);
        }
        FocusChange::Changed {
            from: previous,
            to: slot,
        }
    }

    /// Focuses the pane under `point` (normalized) when click-to-focus is
    /// on, then re-applies that pane's cursor policy. Returns the hit slot.
    pub fn handle_click_to_focus<H: PlayerHost + ?Sized>(
        &mut self,
        state: &mut LiveLayoutState,
        host: &mut H,
        point: Vec2,
    ) -> Option<PlayerSlot> {
        if !self.click_to_focus {
            return None;
        }
        let slot = state.player_rects.hit_test(point)?;
        if slot != state.focused_slot {
            self.set_active_local_player(state, slot);
        }

        let keep_visible = state
            .active_layout
            .as_ref()
            .and_then(|layout| layout.pane(slot))
            .is_none_or(|pane| pane.keep_cursor_visible());
        host.apply_cursor_policy(slot, keep_visible);
        tracing::trace!(slot = %slot, keep_visible, "click-to-focus cursor policy");
        Some(slot)
    }

    pub fn click_to_focus_enabled(&self) -> bool {
        self.click_to_focus
    }

    pub fn set_click_to_focus_enabled(&mut self, enabled: bool) {
        self.click_to_focus = enabled;
    }

    pub fn focus_highlighting_enabled(&self) -> bool {
        self.focus_highlighting
    }

    pub fn set_focus_highlighting_enabled(&mut self, enabled: bool) {
        self.focus_highlighting = enabled;
    }
}

//! Collaborator traits implemented by the engine embedding the compositor.
//!
//! The compositor never reaches for global engine state. Everything it needs
//! from the outside world (local players, pawns, overlay widgets, pointer
//! position) arrives through the host it is constructed with.

use glam::{Quat, UVec2, Vec2};

use crate::camera::{self, CameraPawn};
use crate::error::ProvisionError;
use crate::hud::{HudAnchors, HudWidgetId};
use crate::input::InputEvent;
use crate::layout::{HudClass, NormalizedRect, PawnClass, PlayerSlot, Transform};

/// Local player management, per-player viewport regions, cursor policy and
/// input dispatch.
pub trait PlayerHost {
    fn has_local_player(&self, slot: PlayerSlot) -> bool;

    /// Creates the local player for `slot`. Errors carry the host's reason.
    fn create_local_player(&mut self, slot: PlayerSlot) -> Result<(), ProvisionError>;

    fn local_player_slots(&self) -> Vec<PlayerSlot>;

    /// Installs the normalized screen region a player renders into. A
    /// zero-size rect hides the player.
    fn set_player_viewport(&mut self, slot: PlayerSlot, rect: NormalizedRect);

    /// Hands every player back to the engine's built-in split behaviour.
    fn restore_default_viewports(&mut self);

    /// Shows the cursor with UI+game input when `keep_visible`, otherwise
    /// hides it and switches the player to game-only input.
    fn apply_cursor_policy(&mut self, slot: PlayerSlot, keep_visible: bool);

    /// Pointer position in viewport pixels, `None` when unavailable.
    fn pointer_position(&self) -> Option<Vec2>;

    /// Full viewport size in pixels.
    fn viewport_size(&self) -> UVec2;

    /// Delivers an event to the player's controller. Returns `None` when the
    /// player has no controller, otherwise whether the controller handled it.
    fn dispatch_to_player(&mut self, slot: PlayerSlot, event: &InputEvent) -> Option<bool>;

    /// The engine's own dispatch, used for events the router does not claim.
    fn dispatch_default(&mut self, event: &InputEvent) -> bool;

    fn set_control_rotation(&mut self, _slot: PlayerSlot, _rotation: Quat) {}
}

/// Creates and destroys player pawns.
pub trait PawnFactory {
    /// Spawns a pawn of `class` at `transform`. The default implementation
    /// knows the built-in orbit and free-fly pawns and treats every named
    /// class as a generic pawn.
    fn spawn_pawn(
        &mut self,
        _slot: PlayerSlot,
        class: &PawnClass,
        transform: Transform,
    ) -> Option<Box<dyn CameraPawn>> {
        Some(camera::spawn_builtin(class, transform))
    }

    fn despawn_pawn(&mut self, _slot: PlayerSlot, _pawn: Box<dyn CameraPawn>) {}
}

/// Creates and destroys per-pane overlay widgets.
pub trait HudFactory {
    fn create_hud(
        &mut self,
        slot: PlayerSlot,
        class: &HudClass,
        anchors: HudAnchors,
    ) -> Option<HudWidgetId>;

    fn destroy_hud(&mut self, id: HudWidgetId);
}

/// Everything the compositor needs from its embedding engine.
pub trait ViewportHost: PlayerHost + PawnFactory + HudFactory {}

impl<T: PlayerHost + PawnFactory + HudFactory + ?Sized> ViewportHost for T {}

//! Reconciles the set of local players and their pawns with a layout.

use std::collections::BTreeMap;

use glam::Vec3;

use crate::camera::CameraPawn;
use crate::constants::{FALLBACK_SPAWN_HEIGHT, FALLBACK_SPAWN_SPACING};
use crate::error::ProvisionError;
use crate::host::{PawnFactory, PlayerHost, ViewportHost};
use crate::layout::{
    CameraMode, LayoutDefinition, PaneSpec, PawnClass, PlayerRects, PlayerSlot, Transform,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerPresence {
    Existing,
    Created,
}

/// Picks the pawn class a pane wants.
///
/// Orbit and Free fall back to the built-in pawn unless overridden. Custom
/// prefers the custom class, then the override, then the orbit pawn.
pub fn resolve_pawn_class(pane: &PaneSpec) -> PawnClass {
    match pane.camera_mode {
        CameraMode::Orbit => pane.pawn_class_override.clone().unwrap_or(PawnClass::Orbit),
        CameraMode::Free => pane.pawn_class_override.clone().unwrap_or(PawnClass::Free),
        CameraMode::Custom => pane
            .custom_pawn_class
            .clone()
            .or_else(|| pane.pawn_class_override.clone())
            .unwrap_or(PawnClass::Orbit),
    }
}

/// Where a freshly spawned pawn is placed.
pub fn spawn_transform(slot: PlayerSlot, pane: &PaneSpec) -> Transform {
    if let Some(transform) = pane.camera_transform_override {
        return transform;
    }
    if let Some(focus) = pane.focus_point_override {
        let distance = pane.orbit_distance;
        let eye = focus + Vec3::new(-distance, 0.0, distance * 0.5);
        return Transform::looking_at(eye, focus);
    }
    Transform::from_translation(Vec3::new(
        slot.index() as f32 * FALLBACK_SPAWN_SPACING,
        0.0,
        FALLBACK_SPAWN_HEIGHT,
    ))
}

/// Owns the pawn currently possessed by each managed player.
#[derive(Debug)]
pub struct PlayerProvisioner {
    auto_add_missing_players: bool,
    pawns: BTreeMap<PlayerSlot, Box<dyn CameraPawn>>,
}

impl Default for PlayerProvisioner {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PlayerProvisioner {
    pub fn new(auto_add_missing_players: bool) -> Self {
        Self {
            auto_add_missing_players,
            pawns: BTreeMap::new(),
        }
    }

    pub fn auto_add_missing_players(&self) -> bool {
        self.auto_add_missing_players
    }

    pub fn set_auto_add_missing_players(&mut self, enabled: bool) {
        self.auto_add_missing_players = enabled;
    }

    /// Makes sure `slot` has a local player. A missing player is created when
    /// either the global policy or the layout's own flag allows it.
    pub fn ensure_player_exists<H: PlayerHost + ?Sized>(
        &self,
        host: &mut H,
        slot: PlayerSlot,
        layout_auto_spawn: bool,
    ) -> Result<PlayerPresence, ProvisionError> {
        if host.has_local_player(slot) {
            return Ok(PlayerPresence::Existing);
        }
        if !(self.auto_add_missing_players || layout_auto_spawn) {
            tracing::debug!(slot = %slot, "missing local player but auto-spawn is disabled");
            return Err(ProvisionError::AutoSpawnDisabled(slot));
        }
        host.create_local_player(slot)?;
        tracing::info!(slot = %slot, "created local player for layout");
        Ok(PlayerPresence::Created)
    }

    /// Gives the player for `slot` a pawn of the class `pane` asks for,
    /// replacing a mismatched one, and configures it from the pane.
    pub fn ensure_pawn_for_pane<H: PlayerHost + PawnFactory + ?Sized>(
        &mut self,
        host: &mut H,
        slot: PlayerSlot,
        pane: &PaneSpec,
    ) -> Result<&dyn CameraPawn, ProvisionError> {
        if !host.has_local_player(slot) {
            return Err(ProvisionError::MissingPlayer(slot));
        }
        let desired = resolve_pawn_class(pane);

        let mismatched = self
            .pawns
            .get(&slot)
            .is_some_and(|current| current.class() != desired);
        if mismatched && let Some(stale) = self.pawns.remove(&slot) {
            tracing::info!(slot = %slot, expected = %desired, "destroyed mismatched pawn");
            host.despawn_pawn(slot, stale);
        }

        if !self.pawns.contains_key(&slot) {
            let transform = spawn_transform(slot, pane);
            let pawn = host
                .spawn_pawn(slot, &desired, transform)
                .ok_or_else(|| ProvisionError::SpawnFailed {
                    slot,
                    class: desired.clone(),
                })?;
            if pane.camera_transform_override.is_some() {
                host.set_control_rotation(slot, transform.rotation);
            }
            tracing::info!(
                slot = %slot,
                class = %desired,
                location = ?transform.translation,
                "spawned pawn"
            );
            self.pawns.insert(slot, pawn);
        }

        let pawn = self
            .pawns
            .get_mut(&slot)
            .ok_or(ProvisionError::MissingPlayer(slot))?;
        if let Some(rotation) = pawn.apply_pane_settings(pane) {
            host.set_control_rotation(slot, rotation);
        }
        Ok(&**pawn)
    }

    /// Provisions every committed slot of `layout`. Failures are logged and
    /// returned; they never stop the remaining slots.
    pub fn provision_layout<H: ViewportHost + ?Sized>(
        &mut self,
        host: &mut H,
        layout: &LayoutDefinition,
        rects: &PlayerRects,
    ) -> Vec<ProvisionError> {
        let mut failures = Vec::new();

        for slot in rects.slots().iter().copied() {
            if let Err(err) = self.ensure_player_exists(host, slot, layout.auto_spawn_players) {
                tracing::warn!(slot = %slot, "{err}");
                failures.push(err);
            }
        }

        for slot in rects.slots().iter().copied() {
            if !host.has_local_player(slot) {
                continue;
            }
            let Some(pane) = layout.pane(slot) else {
                continue;
            };
            if let Err(err) = self.ensure_pawn_for_pane(host, slot, pane) {
                tracing::warn!(slot = %slot, "{err}");
                failures.push(err);
            }
        }
        failures
    }

    pub fn pawn(&self, slot: PlayerSlot) -> Option<&dyn CameraPawn> {
        self.pawns.get(&slot).map(|pawn| &**pawn)
    }

    pub fn pawn_slots(&self) -> impl Iterator<Item = PlayerSlot> + '_ {
        self.pawns.keys().copied()
    }
}

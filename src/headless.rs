//! In-memory host used by tests, the terminal preview and the bench.

use std::collections::{BTreeMap, BTreeSet};

use glam::{Quat, UVec2, Vec2};

use crate::camera::{self, CameraPawn};
use crate::error::ProvisionError;
use crate::host::{HudFactory, PawnFactory, PlayerHost};
use crate::hud::{HudAnchors, HudWidgetId};
use crate::input::InputEvent;
use crate::layout::{HudClass, NormalizedRect, PawnClass, PlayerSlot, Transform};

/// Observable state of one simulated local player.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadlessPlayer {
    /// Last rectangle installed by the compositor; `None` means the engine's
    /// default layout is in charge.
    pub viewport: Option<NormalizedRect>,
    /// Last cursor policy applied; `None` until one is applied.
    pub cursor_visible: Option<bool>,
    pub control_rotation: Option<Quat>,
    pub has_controller: bool,
    /// Whether the controller reports events as handled.
    pub consumes_input: bool,
    /// Recent events, oldest first. Bounded by the host's history limit.
    pub received: Vec<InputEvent>,
    /// Every event ever delivered, including those trimmed from `received`.
    pub delivered: u64,
}

impl HeadlessPlayer {
    fn new() -> Self {
        Self {
            has_controller: true,
            consumes_input: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessHud {
    pub slot: PlayerSlot,
    pub class: HudClass,
    pub anchors: HudAnchors,
}

#[derive(Debug, Clone)]
pub struct HeadlessHost {
    viewport_size: UVec2,
    pointer: Option<Vec2>,
    players: BTreeMap<PlayerSlot, HeadlessPlayer>,
    max_players: Option<usize>,
    history_limit: Option<usize>,
    default_dispatch: Vec<InputEvent>,
    default_viewports_restored: usize,
    rejected_pawns: BTreeSet<String>,
    spawned: usize,
    despawned: Vec<(PlayerSlot, PawnClass)>,
    next_hud: u64,
    huds: BTreeMap<HudWidgetId, HeadlessHud>,
    destroyed_huds: Vec<HudWidgetId>,
}

impl HeadlessHost {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport_size: UVec2::new(width, height),
            pointer: None,
            players: BTreeMap::new(),
            max_players: None,
            history_limit: None,
            default_dispatch: Vec::new(),
            default_viewports_restored: 0,
            rejected_pawns: BTreeSet::new(),
            spawned: 0,
            despawned: Vec::new(),
            next_hud: 0,
            huds: BTreeMap::new(),
            destroyed_huds: Vec::new(),
        }
    }

    /// Caps how many local players may exist; creation beyond it fails.
    pub fn with_player_limit(mut self, limit: usize) -> Self {
        self.max_players = Some(limit);
        self
    }

    /// Keeps at most `limit` recent events per player and for default
    /// dispatch. Unbounded by default.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.viewport_size = UVec2::new(width, height);
    }

    pub fn set_pointer(&mut self, pixel: Option<Vec2>) {
        self.pointer = pixel;
    }

    /// Moves the pointer to a normalized position within the viewport.
    pub fn set_pointer_normalized(&mut self, point: Vec2) {
        self.pointer = Some(point * self.viewport_size.as_vec2());
    }

    /// Adds players `0..count` that are not already present.
    pub fn ensure_players(&mut self, count: u32) {
        for index in 0..count {
            self.players
                .entry(PlayerSlot::new(index))
                .or_insert_with(HeadlessPlayer::new);
        }
    }

    pub fn player(&self, slot: PlayerSlot) -> Option<&HeadlessPlayer> {
        self.players.get(&slot)
    }

    pub fn player_mut(&mut self, slot: PlayerSlot) -> Option<&mut HeadlessPlayer> {
        self.players.get_mut(&slot)
    }

    /// Makes every spawn of `class` fail.
    pub fn reject_pawn_class(&mut self, class: PawnClass) {
        self.rejected_pawns.insert(class.to_string());
    }

    pub fn spawned_count(&self) -> usize {
        self.spawned
    }

    pub fn despawned(&self) -> &[(PlayerSlot, PawnClass)] {
        &self.despawned
    }

    pub fn default_dispatch(&self) -> &[InputEvent] {
        &self.default_dispatch
    }

    pub fn default_viewports_restored(&self) -> usize {
        self.default_viewports_restored
    }

    pub fn live_huds(&self) -> Vec<&HeadlessHud> {
        self.huds.values().collect()
    }

    pub fn hud_for(&self, slot: PlayerSlot) -> Option<&HeadlessHud> {
        self.huds.values().find(|hud| hud.slot == slot)
    }

    pub fn destroyed_huds(&self) -> &[HudWidgetId] {
        &self.destroyed_huds
    }

    /// Total events delivered to players, across all slots.
    pub fn delivered_count(&self) -> u64 {
        self.players.values().map(|player| player.delivered).sum()
    }

    pub fn clear_received(&mut self) {
        for player in self.players.values_mut() {
            player.received.clear();
        }
        self.default_dispatch.clear();
    }
}

impl PlayerHost for HeadlessHost {
    fn has_local_player(&self, slot: PlayerSlot) -> bool {
        self.players.contains_key(&slot)
    }

    fn create_local_player(&mut self, slot: PlayerSlot) -> Result<(), ProvisionError> {
        if let Some(limit) = self.max_players
            && self.players.len() >= limit
        {
            return Err(ProvisionError::CreatePlayer {
                slot,
                reason: format!("player limit of {limit} reached"),
            });
        }
        self.players.entry(slot).or_insert_with(HeadlessPlayer::new);
        Ok(())
    }

    fn local_player_slots(&self) -> Vec<PlayerSlot> {
        self.players.keys().copied().collect()
    }

    fn set_player_viewport(&mut self, slot: PlayerSlot, rect: NormalizedRect) {
        if let Some(player) = self.players.get_mut(&slot) {
            player.viewport = Some(rect);
        }
    }

    fn restore_default_viewports(&mut self) {
        for player in self.players.values_mut() {
            player.viewport = None;
        }
        self.default_viewports_restored += 1;
    }

    fn apply_cursor_policy(&mut self, slot: PlayerSlot, keep_visible: bool) {
        if let Some(player) = self.players.get_mut(&slot) {
            player.cursor_visible = Some(keep_visible);
        }
    }

    fn pointer_position(&self) -> Option<Vec2> {
        self.pointer
    }

    fn viewport_size(&self) -> UVec2 {
        self.viewport_size
    }

    fn dispatch_to_player(&mut self, slot: PlayerSlot, event: &InputEvent) -> Option<bool> {
        let player = self.players.get_mut(&slot)?;
        if !player.has_controller {
            return None;
        }
        player.delivered += 1;
        record(&mut player.received, event, self.history_limit);
        Some(player.consumes_input)
    }

    fn dispatch_default(&mut self, event: &InputEvent) -> bool {
        record(&mut self.default_dispatch, event, self.history_limit);
        true
    }

    fn set_control_rotation(&mut self, slot: PlayerSlot, rotation: Quat) {
        if let Some(player) = self.players.get_mut(&slot) {
            player.control_rotation = Some(rotation);
        }
    }
}

impl PawnFactory for HeadlessHost {
    fn spawn_pawn(
        &mut self,
        _slot: PlayerSlot,
        class: &PawnClass,
        transform: Transform,
    ) -> Option<Box<dyn CameraPawn>> {
        if self.rejected_pawns.contains(&class.to_string()) {
            return None;
        }
        self.spawned += 1;
        Some(camera::spawn_builtin(class, transform))
    }

    fn despawn_pawn(&mut self, slot: PlayerSlot, pawn: Box<dyn CameraPawn>) {
        self.despawned.push((slot, pawn.class()));
    }
}

impl HudFactory for HeadlessHost {
    fn create_hud(
        &mut self,
        slot: PlayerSlot,
        class: &HudClass,
        anchors: HudAnchors,
    ) -> Option<HudWidgetId> {
        self.next_hud += 1;
        let id = HudWidgetId(self.next_hud);
        self.huds.insert(
            id,
            HeadlessHud {
                slot,
                class: class.clone(),
                anchors,
            },
        );
        Some(id)
    }

    fn destroy_hud(&mut self, id: HudWidgetId) {
        if self.huds.remove(&id).is_some() {
            self.destroyed_huds.push(id);
        }
    }
}

fn record(history: &mut Vec<InputEvent>, event: &InputEvent, limit: Option<usize>) {
    if let Some(limit) = limit {
        if limit == 0 {
            return;
        }
        if history.len() >= limit {
            let excess = history.len() + 1 - limit;
            history.drain(..excess);
        }
    }
    history.push(event.clone());
}

//! The viewport compositor: owns the active layout, derives per-player
//! rectangles from it and pushes them into the host.
//!
//! Applying a layout always runs the full pipeline. Rectangles are rebuilt,
//! players and pawns provisioned, cursor policy re-asserted and HUDs
//! recreated, then the rectangles are installed. There is no diffing
//! against the previous layout.

use std::collections::BTreeSet;

use glam::Vec2;

use crate::camera::CameraPawn;
use crate::error::{ProvisionError, ViewportError};
use crate::focus::{FocusChange, FocusController, FocusSubscription};
use crate::host::ViewportHost;
use crate::hud::PaneHudManager;
use crate::input::InputRouter;
use crate::layout::{
    LayoutDefinition, LayoutWarning, NormalizedRect, PaneSpec, PawnClass, PlayerRects, PlayerSlot,
    RectFit, rect_warnings,
};
use crate::provision::PlayerProvisioner;
use crate::settings::ViewportManagerSettings;

/// Mutable state shared by the compositor, router and focus controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveLayoutState {
    pub(crate) active_layout: Option<LayoutDefinition>,
    pub(crate) player_rects: PlayerRects,
    pub(crate) focused_slot: PlayerSlot,
    pub(crate) active_keyboard_mouse_slot: PlayerSlot,
}

impl LiveLayoutState {
    pub fn active_layout(&self) -> Option<&LayoutDefinition> {
        self.active_layout.as_ref()
    }

    pub fn player_rects(&self) -> &PlayerRects {
        &self.player_rects
    }

    pub fn focused_slot(&self) -> PlayerSlot {
        self.focused_slot
    }

    pub fn active_keyboard_mouse_slot(&self) -> PlayerSlot {
        self.active_keyboard_mouse_slot
    }
}

/// What happened during one `apply_layout` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    pub panes_applied: usize,
    pub warnings: Vec<LayoutWarning>,
    pub provisioning_failures: Vec<ProvisionError>,
    pub huds_created: usize,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.provisioning_failures.is_empty()
    }
}

#[derive(Debug)]
pub struct ViewportCompositor<H: ViewportHost> {
    host: H,
    state: LiveLayoutState,
    focus: FocusController,
    provisioner: PlayerProvisioner,
    hud: PaneHudManager,
}

impl<H: ViewportHost> ViewportCompositor<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            state: LiveLayoutState::default(),
            focus: FocusController::new(),
            provisioner: PlayerProvisioner::default(),
            hud: PaneHudManager::new(),
        }
    }

    pub fn with_settings(host: H, settings: &ViewportManagerSettings) -> Self {
        let mut compositor = Self::new(host);
        compositor
            .provisioner
            .set_auto_add_missing_players(settings.auto_add_missing_players);
        compositor
            .focus
            .set_click_to_focus_enabled(settings.click_to_focus);
        compositor
            .focus
            .set_focus_highlighting_enabled(settings.focus_highlighting);
        compositor
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn state(&self) -> &LiveLayoutState {
        &self.state
    }

    pub fn hud(&self) -> &PaneHudManager {
        &self.hud
    }

    pub fn input_router(&mut self) -> InputRouter<'_, H> {
        InputRouter::new(self)
    }

    /// Replaces the active layout. `None` reverts to the host's default
    /// viewport behaviour and makes the managed path inert.
    pub fn apply_layout(&mut self, layout: Option<LayoutDefinition>) -> ApplyReport {
        let Some(layout) = layout else {
            self.clear_layout();
            return ApplyReport::default();
        };

        let mut report = ApplyReport::default();
        self.state.player_rects = build_player_rects(&layout, &mut report.warnings);
        self.state.active_layout = Some(layout);

        if !self
            .state
            .player_rects
            .contains_slot(self.state.active_keyboard_mouse_slot)
        {
            let fallback = self
                .state
                .player_rects
                .first_slot()
                .unwrap_or(PlayerSlot::new(0));
            tracing::debug!(
                from = %self.state.active_keyboard_mouse_slot,
                to = %fallback,
                "keyboard/mouse slot reassigned"
            );
            self.state.active_keyboard_mouse_slot = fallback;
        }

        let Some(layout) = self.state.active_layout.as_ref() else {
            return report;
        };
        report.provisioning_failures = self
            .provisioner
            .provision_layout(&mut self.host, layout, &self.state.player_rects);

        for slot in self.state.player_rects.slots() {
            let keep_visible = layout
                .pane(*slot)
                .is_none_or(|pane| pane.keep_cursor_visible());
            self.host.apply_cursor_policy(*slot, keep_visible);
            tracing::trace!(slot = %slot, keep_visible, "cursor policy applied");
        }

        report.huds_created = self
            .hud
            .rebuild_for_layout(&mut self.host, layout, &self.state.player_rects);
        report.panes_applied = self.state.player_rects.len();
        tracing::info!(
            layout = layout.display_name(),
            panes = report.panes_applied,
            warnings = report.warnings.len(),
            "applied layout"
        );

        self.refresh_layout();
        report
    }

    fn clear_layout(&mut self) {
        tracing::info!("layout cleared; reverting to default viewports");
        self.hud.clear(&mut self.host);
        self.state.active_layout = None;
        self.state.player_rects.clear();
        self.host.restore_default_viewports();
    }

    /// Pushes the committed rectangles into the host. Local players with no
    /// pane are hidden.
    pub fn refresh_layout(&mut self) {
        if self.state.active_layout.is_none() {
            self.host.restore_default_viewports();
            return;
        }
        for (slot, rect) in self.state.player_rects.iter() {
            self.host.set_player_viewport(slot, rect);
        }
        for slot in self.host.local_player_slots() {
            if !self.state.player_rects.contains_slot(slot) {
                self.host.set_player_viewport(slot, NormalizedRect::ZERO);
            }
        }
    }

    /// Changes the rectangle of the pane owned by `slot` and re-applies the
    /// whole layout. Logs and does nothing without a matching pane.
    pub fn set_pane_rect(
        &mut self,
        slot: PlayerSlot,
        rect: NormalizedRect,
    ) -> Option<ApplyReport> {
        let Some(pane) = self.active_pane_mut(slot) else {
            tracing::warn!(slot = %slot, "no active pane to resize");
            return None;
        };
        pane.rect = rect;
        let layout = self.state.active_layout.clone();
        Some(self.apply_layout(layout))
    }

    /// Authored rectangle of the pane owned by `slot`.
    pub fn get_pane_rect(&self, slot: PlayerSlot) -> Option<NormalizedRect> {
        self.pane(slot).map(|pane| pane.rect)
    }

    /// Overrides the pawn class of the pane owned by `slot` and re-applies.
    pub fn set_pane_pawn_class(
        &mut self,
        slot: PlayerSlot,
        class: Option<PawnClass>,
    ) -> Option<ApplyReport> {
        let Some(pane) = self.active_pane_mut(slot) else {
            tracing::warn!(slot = %slot, "no active pane to change pawn class");
            return None;
        };
        pane.pawn_class_override = class;
        let layout = self.state.active_layout.clone();
        Some(self.apply_layout(layout))
    }

    fn active_pane_mut(&mut self, slot: PlayerSlot) -> Option<&mut PaneSpec> {
        self.state.active_layout.as_mut()?.pane_mut(slot)
    }

    pub fn pane(&self, slot: PlayerSlot) -> Option<&PaneSpec> {
        self.state.active_layout.as_ref()?.pane(slot)
    }

    /// Committed rectangle for `slot`; unmanaged slots are zero-sized.
    pub fn player_rect(&self, slot: PlayerSlot) -> NormalizedRect {
        self.state
            .player_rects
            .get(slot)
            .unwrap_or(NormalizedRect::ZERO)
    }

    pub fn player_rects(&self) -> &PlayerRects {
        &self.state.player_rects
    }

    /// Topmost pane containing the normalized `point`.
    pub fn find_pane_at(&self, point: Vec2) -> Option<PlayerSlot> {
        self.state.player_rects.hit_test(point)
    }

    pub fn local_player_count(&self) -> usize {
        self.host.local_player_slots().len()
    }

    pub fn is_player_slot_valid(&self, slot: PlayerSlot) -> bool {
        self.host.has_local_player(slot)
    }

    pub fn pawn(&self, slot: PlayerSlot) -> Option<&dyn CameraPawn> {
        self.provisioner.pawn(slot)
    }

    pub fn set_active_local_player(&mut self, slot: PlayerSlot) -> FocusChange {
        self.focus.set_active_local_player(&mut self.state, slot)
    }

    pub fn active_local_player(&self) -> PlayerSlot {
        self.state.active_keyboard_mouse_slot
    }

    pub fn focused_player(&self) -> PlayerSlot {
        self.state.focused_slot
    }

    pub fn handle_click_to_focus(&mut self, point: Vec2) -> Option<PlayerSlot> {
        self.focus
            .handle_click_to_focus(&mut self.state, &mut self.host, point)
    }

    pub fn subscribe_focus_changed(
        &mut self,
        observer: impl FnMut(PlayerSlot, PlayerSlot) + 'static,
    ) -> FocusSubscription {
        self.focus.subscribe(observer)
    }

    pub fn unsubscribe_focus_changed(&mut self, id: FocusSubscription) -> bool {
        self.focus.unsubscribe(id)
    }

    pub fn set_click_to_focus_enabled(&mut self, enabled: bool) {
        self.focus.set_click_to_focus_enabled(enabled);
    }

    pub fn is_click_to_focus_enabled(&self) -> bool {
        self.focus.click_to_focus_enabled()
    }

    pub fn set_focus_highlighting_enabled(&mut self, enabled: bool) {
        self.focus.set_focus_highlighting_enabled(enabled);
    }

    pub fn is_focus_highlighting_enabled(&self) -> bool {
        self.focus.focus_highlighting_enabled()
    }

    /// Startup hook: applies the configured default layout once, if enabled.
    pub fn apply_default_layout(
        &mut self,
        settings: &ViewportManagerSettings,
    ) -> Result<Option<ApplyReport>, ViewportError> {
        if !settings.apply_default_layout_on_start {
            tracing::debug!("default layout application disabled");
            return Ok(None);
        }
        let Some(layout) = settings.resolve_default_layout()? else {
            tracing::debug!("no default layout configured");
            return Ok(None);
        };
        Ok(Some(self.apply_layout(Some(layout))))
    }
}

/// Derives the per-player rectangles for `layout`, collecting a warning for
/// every pane that is skipped or adjusted.
fn build_player_rects(
    layout: &LayoutDefinition,
    warnings: &mut Vec<LayoutWarning>,
) -> PlayerRects {
    let mut rects = PlayerRects::default();
    let mut seen = BTreeSet::new();

    for (index, pane) in layout.panes.iter().enumerate() {
        let Some(slot) = pane.slot() else {
            let warning = LayoutWarning::InvalidSlot {
                pane: index,
                slot: pane.player_slot,
            };
            tracing::warn!("{warning}");
            warnings.push(warning);
            continue;
        };
        // A slot belongs to its first pane even when that pane's rect is rejected.
        if !seen.insert(slot) {
            let warning = LayoutWarning::DuplicateSlot { pane: index, slot };
            tracing::warn!("{warning}");
            warnings.push(warning);
            continue;
        }

        let rect = match pane.rect.fit_to_unit() {
            RectFit::Exact(rect) => rect,
            RectFit::Clamped(rect) => {
                for warning in rect_warnings(index, pane) {
                    tracing::warn!("{warning}; clamped");
                    warnings.push(warning);
                }
                rect
            }
            RectFit::Rejected => {
                let warning = LayoutWarning::RectRejected { pane: index };
                tracing::warn!("{warning}");
                warnings.push(warning);
                continue;
            }
        };
        rects.insert(slot, rect, pane.depth);
    }
    rects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessHost;
    use crate::layout::LayoutPreset;

    fn slot(index: u32) -> PlayerSlot {
        PlayerSlot::new(index)
    }

    fn compositor() -> ViewportCompositor<HeadlessHost> {
        ViewportCompositor::new(HeadlessHost::new(1000, 500))
    }

    #[test]
    fn invalid_and_duplicate_panes_are_skipped() {
        let mut warnings = Vec::new();
        let layout = LayoutDefinition::new(vec![
            PaneSpec::new(-1, NormalizedRect::FULL),
            PaneSpec::new(0, NormalizedRect::new(0.0, 0.0, 0.5, 1.0)),
            PaneSpec::new(0, NormalizedRect::FULL),
        ]);
        let rects = build_player_rects(&layout, &mut warnings);
        assert_eq!(rects.len(), 1);
        assert_eq!(rects.get(slot(0)), Some(NormalizedRect::new(0.0, 0.0, 0.5, 1.0)));
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn degenerate_rect_is_rejected() {
        let mut warnings = Vec::new();
        let layout = LayoutDefinition::new(vec![PaneSpec::new(
            0,
            NormalizedRect::new(0.5, 0.5, -0.2, 0.3),
        )]);
        let rects = build_player_rects(&layout, &mut warnings);
        assert!(rects.is_empty());
        assert!(warnings.contains(&LayoutWarning::RectRejected { pane: 0 }));
    }

    #[test]
    fn rejected_first_pane_keeps_its_slot() {
        let mut warnings = Vec::new();
        let layout = LayoutDefinition::new(vec![
            PaneSpec::new(0, NormalizedRect::new(0.2, 0.2, 0.0, 0.5)),
            PaneSpec::new(0, NormalizedRect::new(0.5, 0.0, 0.5, 1.0)).with_keyboard_mouse(false),
        ]);
        let rects = build_player_rects(&layout, &mut warnings);
        assert!(rects.is_empty());
        assert_eq!(
            warnings,
            vec![
                LayoutWarning::RectRejected { pane: 0 },
                LayoutWarning::DuplicateSlot {
                    pane: 1,
                    slot: slot(0)
                },
            ]
        );
    }

    #[test]
    fn keyboard_mouse_slot_moves_to_first_pane() {
        let mut c = compositor();
        let layout = LayoutDefinition::new(vec![
            PaneSpec::new(2, NormalizedRect::new(0.0, 0.0, 0.5, 1.0)),
            PaneSpec::new(1, NormalizedRect::new(0.5, 0.0, 0.5, 1.0)),
        ]);
        c.apply_layout(Some(layout));
        assert_eq!(c.active_local_player(), slot(2));

        c.apply_layout(Some(LayoutDefinition::new(Vec::new())));
        assert_eq!(c.active_local_player(), slot(0));
    }

    #[test]
    fn unmanaged_players_are_hidden() {
        let mut c = compositor();
        c.host_mut().ensure_players(3);
        c.apply_layout(Some(LayoutPreset::TwoPlayerVertical.build()));
        assert_eq!(
            c.host().player(slot(2)).unwrap().viewport,
            Some(NormalizedRect::ZERO)
        );
        assert_eq!(c.player_rect(slot(2)), NormalizedRect::ZERO);
        assert_eq!(
            c.host().player(slot(1)).unwrap().viewport,
            Some(NormalizedRect::new(0.5, 0.0, 0.5, 1.0))
        );
    }

    #[test]
    fn reapplying_rebuilds_huds() {
        let mut c = compositor();
        let layout = crate::layout::quick_setup(
            2,
            true,
            Some(crate::layout::HudClass::new("Scoreboard")),
        )
        .unwrap();
        let first = c.apply_layout(Some(layout.clone()));
        assert_eq!(first.huds_created, 2);
        let second = c.apply_layout(Some(layout));
        assert_eq!(second.huds_created, 2);
        assert_eq!(c.host().live_huds().len(), 2);
        assert_eq!(c.host().destroyed_huds().len(), 2);
    }

    #[test]
    fn pane_mutation_requires_active_pane() {
        let mut c = compositor();
        assert!(c.set_pane_rect(slot(0), NormalizedRect::FULL).is_none());
        c.apply_layout(Some(LayoutPreset::TwoPlayerHorizontal.build()));
        assert!(c.set_pane_rect(slot(5), NormalizedRect::FULL).is_none());

        let report = c
            .set_pane_pawn_class(slot(1), Some(PawnClass::Free))
            .unwrap();
        assert!(report.is_clean());
        assert_eq!(c.pawn(slot(1)).unwrap().class(), PawnClass::Free);
        assert_eq!(
            c.get_pane_rect(slot(1)),
            Some(NormalizedRect::new(0.0, 0.5, 1.0, 0.5))
        );
    }

    #[test]
    fn settings_seed_focus_toggles() {
        let settings = ViewportManagerSettings {
            click_to_focus: false,
            focus_highlighting: true,
            ..ViewportManagerSettings::default()
        };
        let c = ViewportCompositor::with_settings(HeadlessHost::new(10, 10), &settings);
        assert!(!c.is_click_to_focus_enabled());
        assert!(c.is_focus_highlighting_enabled());
    }
}

//! Per-pane overlay widgets, anchored to each pane's committed rectangle.

use std::collections::BTreeMap;

use glam::Vec2;

use crate::host::HudFactory;
use crate::layout::{HudClass, LayoutDefinition, NormalizedRect, PlayerRects, PlayerSlot};

/// Normalized anchor box for an overlay widget: `min` is the pane origin,
/// `max` its far corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudAnchors {
    pub min: Vec2,
    pub max: Vec2,
}

impl HudAnchors {
    pub fn for_rect(rect: NormalizedRect) -> Self {
        Self {
            min: rect.origin,
            max: rect.max(),
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// Handle to a widget created by the host's `HudFactory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HudWidgetId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct PaneHud {
    pub id: HudWidgetId,
    pub class: HudClass,
    pub anchors: HudAnchors,
}

/// Side table of overlay widgets keyed by player slot. Rebuilt wholesale on
/// every layout application.
#[derive(Debug, Default)]
pub struct PaneHudManager {
    widgets: BTreeMap<PlayerSlot, PaneHud>,
}

impl PaneHudManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Destroys every widget, then creates one per committed slot whose
    /// first-declared pane has a HUD class. Returns the number created.
    pub fn rebuild_for_layout<F: HudFactory + ?Sized>(
        &mut self,
        factory: &mut F,
        layout: &LayoutDefinition,
        rects: &PlayerRects,
    ) -> usize {
        self.clear(factory);

        for (slot, rect) in rects.iter() {
            let Some(class) = layout.pane(slot).and_then(|pane| pane.hud_class.as_ref()) else {
                continue;
            };
            let anchors = HudAnchors::for_rect(rect);
            match factory.create_hud(slot, class, anchors) {
                Some(id) => {
                    tracing::debug!(
                        slot = %slot,
                        hud = %class,
                        min = ?anchors.min,
                        max = ?anchors.max,
                        "anchored pane HUD"
                    );
                    self.widgets.insert(
                        slot,
                        PaneHud {
                            id,
                            class: class.clone(),
                            anchors,
                        },
                    );
                }
                None => tracing::warn!(slot = %slot, hud = %class, "failed to create pane HUD"),
            }
        }
        self.widgets.len()
    }

    pub fn clear<F: HudFactory + ?Sized>(&mut self, factory: &mut F) {
        for (_, hud) in std::mem::take(&mut self.widgets) {
            factory.destroy_hud(hud.id);
        }
    }

    pub fn get(&self, slot: PlayerSlot) -> Option<&PaneHud> {
        self.widgets.get(&slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerSlot, &PaneHud)> {
        self.widgets.iter().map(|(slot, hud)| (*slot, hud))
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

pub mod definition;
pub mod pane;
pub mod presets;

pub use definition::*;
pub use pane::*;
pub use presets::*;

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::RECT_EPSILON;

/// Identifies a local player. Not tied to any network identity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerSlot(u32);

impl PlayerSlot {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn index(self) -> u32 {
        self.0
    }

    /// Converts an authored (possibly negative) slot value.
    pub fn from_authored(value: i32) -> Option<Self> {
        u32::try_from(value).ok().map(Self)
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rectangle expressed in fractions of the full viewport, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Default for NormalizedRect {
    fn default() -> Self {
        Self::FULL
    }
}

/// Why a rectangle could not be committed as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectIssue {
    OriginOutOfRange,
    SizeOutOfRange,
    ExtendsBeyondBounds,
    Degenerate,
}

/// Result of fitting an authored rectangle into the unit square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RectFit {
    Exact(NormalizedRect),
    Clamped(NormalizedRect),
    Rejected,
}

impl NormalizedRect {
    pub const FULL: NormalizedRect = NormalizedRect {
        origin: Vec2::ZERO,
        size: Vec2::ONE,
    };

    pub const ZERO: NormalizedRect = NormalizedRect {
        origin: Vec2::ZERO,
        size: Vec2::ZERO,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Bottom-right corner.
    pub fn max(&self) -> Vec2 {
        self.origin + self.size
    }

    pub fn is_empty(&self) -> bool {
        !(self.size.x > 0.0 && self.size.y > 0.0)
    }

    /// Inclusive on every edge, so a point on a shared border belongs to both
    /// neighbours; `PlayerRects::hit_test` decides which one wins.
    pub fn contains(&self, point: Vec2) -> bool {
        if self.is_empty() {
            return false;
        }
        point.cmpge(self.origin).all() && point.cmple(self.max()).all()
    }

    pub fn issues(&self) -> Vec<RectIssue> {
        let mut issues = Vec::new();
        if !self.origin.is_finite() || !self.size.is_finite() {
            issues.push(RectIssue::Degenerate);
            return issues;
        }
        let unit = 0.0..=1.0;
        if !unit.contains(&self.origin.x) || !unit.contains(&self.origin.y) {
            issues.push(RectIssue::OriginOutOfRange);
        }
        if self.size.x <= 0.0 || self.size.x > 1.0 || self.size.y <= 0.0 || self.size.y > 1.0 {
            issues.push(RectIssue::SizeOutOfRange);
        }
        let max = self.max();
        if max.x > 1.0 + RECT_EPSILON || max.y > 1.0 + RECT_EPSILON {
            issues.push(RectIssue::ExtendsBeyondBounds);
        }
        issues
    }

    /// Fits the rectangle into `[0,1]x[0,1]`: origin is clamped into range,
    /// the far edge is clamped to 1. Rectangles that end up with no area are
    /// rejected rather than inverted.
    pub fn fit_to_unit(&self) -> RectFit {
        if !self.origin.is_finite() || !self.size.is_finite() {
            return RectFit::Rejected;
        }
        if self.issues().is_empty() {
            return RectFit::Exact(*self);
        }
        let origin = self.origin.clamp(Vec2::ZERO, Vec2::ONE);
        let max = self.max().min(Vec2::ONE);
        let size = max - origin;
        if size.x <= 0.0 || size.y <= 0.0 {
            return RectFit::Rejected;
        }
        RectFit::Clamped(NormalizedRect { origin, size })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PaneRegion {
    rect: NormalizedRect,
    depth: i32,
}

/// Committed per-player rectangles, keyed by slot.
///
/// Hit-testing walks panes from the highest `depth` down, so overlapping
/// panes resolve the way they are stacked on screen. Panes at equal depth
/// resolve to the one declared first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerRects {
    regions: BTreeMap<PlayerSlot, PaneRegion>,
    declaration_order: Vec<PlayerSlot>,
    hit_order: Vec<PlayerSlot>,
}

impl PlayerRects {
    /// Inserts a pane; returns `false` and leaves the map untouched when the
    /// slot is already present (first occurrence wins).
    pub fn insert(&mut self, slot: PlayerSlot, rect: NormalizedRect, depth: i32) -> bool {
        if self.regions.contains_key(&slot) {
            return false;
        }
        self.regions.insert(slot, PaneRegion { rect, depth });
        self.declaration_order.push(slot);
        self.rebuild_hit_order();
        true
    }

    fn rebuild_hit_order(&mut self) {
        let mut order = self.declaration_order.clone();
        // stable: equal depth keeps declaration order
        order.sort_by_key(|slot| std::cmp::Reverse(self.regions[slot].depth));
        self.hit_order = order;
    }

    pub fn get(&self, slot: PlayerSlot) -> Option<NormalizedRect> {
        self.regions.get(&slot).map(|region| region.rect)
    }

    pub fn depth(&self, slot: PlayerSlot) -> Option<i32> {
        self.regions.get(&slot).map(|region| region.depth)
    }

    pub fn contains_slot(&self, slot: PlayerSlot) -> bool {
        self.regions.contains_key(&slot)
    }

    /// Slots in pane declaration order.
    pub fn slots(&self) -> &[PlayerSlot] {
        &self.declaration_order
    }

    /// Slots ordered bottom-most first, the order panes should be drawn in.
    pub fn draw_order(&self) -> impl Iterator<Item = PlayerSlot> + '_ {
        self.hit_order.iter().rev().copied()
    }

    pub fn first_slot(&self) -> Option<PlayerSlot> {
        self.declaration_order.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerSlot, NormalizedRect)> + '_ {
        self.declaration_order
            .iter()
            .map(|slot| (*slot, self.regions[slot].rect))
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn clear(&mut self) {
        self.regions.clear();
        self.declaration_order.clear();
        self.hit_order.clear();
    }

    /// Returns the topmost slot whose rectangle contains `point`.
    pub fn hit_test(&self, point: Vec2) -> Option<PlayerSlot> {
        self.hit_order
            .iter()
            .copied()
            .find(|slot| self.regions[slot].rect.contains(point))
    }
}

/// Normalizes a pixel position against the full viewport size. Returns `None`
/// when the viewport has no area.
pub fn normalize_point(pixel: Vec2, viewport_size: Vec2) -> Option<Vec2> {
    if viewport_size.x <= 0.0 || viewport_size.y <= 0.0 {
        return None;
    }
    Some(pixel / viewport_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(index: u32) -> PlayerSlot {
        PlayerSlot::new(index)
    }

    #[test]
    fn authored_slot_conversion() {
        assert_eq!(PlayerSlot::from_authored(3), Some(slot(3)));
        assert_eq!(PlayerSlot::from_authored(-1), None);
    }

    #[test]
    fn contains_is_inclusive_on_edges() {
        let r = NormalizedRect::new(0.0, 0.0, 0.5, 1.0);
        assert!(r.contains(Vec2::new(0.0, 0.0)));
        assert!(r.contains(Vec2::new(0.5, 1.0)));
        assert!(!r.contains(Vec2::new(0.51, 0.5)));
        assert!(!NormalizedRect::ZERO.contains(Vec2::ZERO));
    }

    #[test]
    fn fit_keeps_valid_rects_untouched() {
        let r = NormalizedRect::new(0.667, 0.0, 0.333, 0.5);
        assert_eq!(r.fit_to_unit(), RectFit::Exact(r));
    }

    #[test]
    fn fit_clamps_overhanging_rect() {
        let r = NormalizedRect::new(0.6, 0.6, 0.6, 0.6);
        assert!(r.issues().contains(&RectIssue::ExtendsBeyondBounds));
        let RectFit::Clamped(fitted) = r.fit_to_unit() else {
            panic!("expected clamped rect");
        };
        assert!((fitted.size.x - 0.4).abs() < 1e-6);
        assert!((fitted.size.y - 0.4).abs() < 1e-6);
        assert!(fitted.max().x <= 1.0 && fitted.max().y <= 1.0);
    }

    #[test]
    fn fit_rejects_degenerate_rects() {
        assert_eq!(
            NormalizedRect::new(0.2, 0.2, 0.0, 0.5).fit_to_unit(),
            RectFit::Rejected
        );
        assert_eq!(
            NormalizedRect::new(1.2, 0.0, 0.5, 0.5).fit_to_unit(),
            RectFit::Rejected
        );
        assert_eq!(
            NormalizedRect::new(f32::NAN, 0.0, 0.5, 0.5).fit_to_unit(),
            RectFit::Rejected
        );
    }

    #[test]
    fn player_rects_first_insert_wins() {
        let mut rects = PlayerRects::default();
        assert!(rects.insert(slot(0), NormalizedRect::new(0.0, 0.0, 0.5, 1.0), 0));
        assert!(!rects.insert(slot(0), NormalizedRect::FULL, 0));
        assert_eq!(rects.get(slot(0)), Some(NormalizedRect::new(0.0, 0.0, 0.5, 1.0)));
        assert_eq!(rects.len(), 1);
    }

    #[test]
    fn hit_test_prefers_higher_depth() {
        let mut rects = PlayerRects::default();
        rects.insert(slot(0), NormalizedRect::FULL, 0);
        rects.insert(slot(1), NormalizedRect::new(0.75, 0.75, 0.25, 0.25), 1);
        assert_eq!(rects.hit_test(Vec2::new(0.8, 0.8)), Some(slot(1)));
        assert_eq!(rects.hit_test(Vec2::new(0.2, 0.2)), Some(slot(0)));
        assert_eq!(rects.draw_order().collect::<Vec<_>>(), vec![slot(0), slot(1)]);
    }

    #[test]
    fn hit_test_equal_depth_uses_declaration_order() {
        let mut rects = PlayerRects::default();
        rects.insert(slot(3), NormalizedRect::new(0.0, 0.0, 0.5, 1.0), 0);
        rects.insert(slot(1), NormalizedRect::new(0.5, 0.0, 0.5, 1.0), 0);
        for _ in 0..3 {
            assert_eq!(rects.hit_test(Vec2::new(0.5, 0.5)), Some(slot(3)));
        }
        assert_eq!(rects.hit_test(Vec2::new(1.5, 0.5)), None);
        assert_eq!(rects.slots(), &[slot(3), slot(1)]);
    }

    #[test]
    fn normalize_point_rejects_empty_viewport() {
        assert_eq!(normalize_point(Vec2::new(5.0, 5.0), Vec2::ZERO), None);
        assert_eq!(
            normalize_point(Vec2::new(50.0, 25.0), Vec2::new(100.0, 100.0)),
            Some(Vec2::new(0.5, 0.25))
        );
    }
}

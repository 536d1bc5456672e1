use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{CameraMode, PaneSpec, PlayerSlot, RectIssue};
use crate::error::ViewportError;

/// A configuration problem found in a layout. Never fatal: the offending pane
/// is skipped or clamped and the rest of the layout still applies.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutWarning {
    #[error("pane {pane} has invalid player slot {slot}; must be zero or positive")]
    InvalidSlot { pane: usize, slot: i32 },
    #[error("player slot {slot} is used by multiple panes; pane {pane} ignored")]
    DuplicateSlot { pane: usize, slot: PlayerSlot },
    #[error("pane {pane} uses custom camera mode but has no custom pawn class")]
    MissingCustomPawn { pane: usize },
    #[error("pane {pane} has origin ({x:.2}, {y:.2}) outside [0,1]")]
    OriginOutOfRange { pane: usize, x: f32, y: f32 },
    #[error("pane {pane} has size ({w:.2}, {h:.2}) outside (0,1]")]
    SizeOutOfRange { pane: usize, w: f32, h: f32 },
    #[error("pane {pane} extends beyond viewport bounds")]
    ExtendsBeyondBounds { pane: usize },
    #[error("pane {pane} has a degenerate rectangle and was dropped")]
    RectRejected { pane: usize },
}

/// Ordered pane list plus the player auto-spawn policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutDefinition {
    pub name: Option<String>,
    pub panes: Vec<PaneSpec>,
    pub auto_spawn_players: bool,
}

impl Default for LayoutDefinition {
    fn default() -> Self {
        Self {
            name: None,
            panes: Vec::new(),
            auto_spawn_players: true,
        }
    }
}

impl LayoutDefinition {
    pub fn new(panes: Vec<PaneSpec>) -> Self {
        Self {
            panes,
            ..Self::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_auto_spawn(mut self, enabled: bool) -> Self {
        self.auto_spawn_players = enabled;
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed layout")
    }

    /// First pane declared for `slot`.
    pub fn pane(&self, slot: PlayerSlot) -> Option<&PaneSpec> {
        self.panes.iter().find(|pane| pane.slot() == Some(slot))
    }

    pub fn pane_mut(&mut self, slot: PlayerSlot) -> Option<&mut PaneSpec> {
        self.panes.iter_mut().find(|pane| pane.slot() == Some(slot))
    }

    /// Checks every pane and returns all warnings, logging each one.
    pub fn validate(&self) -> Vec<LayoutWarning> {
        let mut used = BTreeSet::new();
        let mut warnings = Vec::new();

        for (index, pane) in self.panes.iter().enumerate() {
            match pane.slot() {
                None => warnings.push(LayoutWarning::InvalidSlot {
                    pane: index,
                    slot: pane.player_slot,
                }),
                Some(slot) if !used.insert(slot) => warnings.push(LayoutWarning::DuplicateSlot {
                    pane: index,
                    slot,
                }),
                Some(_) => {}
            }

            if pane.camera_mode == CameraMode::Custom && pane.custom_pawn_class.is_none() {
                warnings.push(LayoutWarning::MissingCustomPawn { pane: index });
            }

            warnings.extend(rect_warnings(index, pane));
        }

        for warning in &warnings {
            tracing::warn!(layout = self.display_name(), "{warning}");
        }
        if warnings.is_empty() {
            tracing::info!(layout = self.display_name(), "layout validation passed");
        }
        warnings
    }

    pub fn from_json_str(text: &str) -> Result<Self, ViewportError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_string(&self) -> Result<String, ViewportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ViewportError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ViewportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let layout = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), panes = layout.panes.len(), "loaded layout");
        Ok(layout)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ViewportError> {
        let path = path.as_ref();
        fs::write(path, self.to_json_string()?).map_err(|source| ViewportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

pub(crate) fn rect_warnings(index: usize, pane: &PaneSpec) -> Vec<LayoutWarning> {
    let rect = pane.rect;
    rect.issues()
        .into_iter()
        .map(|issue| match issue {
            RectIssue::OriginOutOfRange => LayoutWarning::OriginOutOfRange {
                pane: index,
                x: rect.origin.x,
                y: rect.origin.y,
            },
            RectIssue::SizeOutOfRange => LayoutWarning::SizeOutOfRange {
                pane: index,
                w: rect.size.x,
                h: rect.size.y,
            },
            RectIssue::ExtendsBeyondBounds => LayoutWarning::ExtendsBeyondBounds { pane: index },
            RectIssue::Degenerate => LayoutWarning::RectRejected { pane: index },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{NormalizedRect, PawnClass};

    #[test]
    fn clean_layout_has_no_warnings() {
        let layout = LayoutDefinition::new(vec![
            PaneSpec::new(0, NormalizedRect::new(0.0, 0.0, 0.5, 1.0)),
            PaneSpec::new(1, NormalizedRect::new(0.5, 0.0, 0.5, 1.0)),
        ]);
        assert!(layout.validate().is_empty());
    }

    #[test]
    fn validate_reports_each_problem() {
        let layout = LayoutDefinition::new(vec![
            PaneSpec::new(-1, NormalizedRect::FULL),
            PaneSpec::new(0, NormalizedRect::FULL),
            PaneSpec::new(0, NormalizedRect::new(0.6, 0.6, 0.6, 0.6)),
            PaneSpec::new(2, NormalizedRect::FULL).with_camera_mode(CameraMode::Custom),
        ]);
        let warnings = layout.validate();
        assert!(warnings.contains(&LayoutWarning::InvalidSlot { pane: 0, slot: -1 }));
        assert!(warnings.contains(&LayoutWarning::DuplicateSlot {
            pane: 2,
            slot: PlayerSlot::new(0)
        }));
        assert!(warnings.contains(&LayoutWarning::ExtendsBeyondBounds { pane: 2 }));
        assert!(warnings.contains(&LayoutWarning::MissingCustomPawn { pane: 3 }));
    }

    #[test]
    fn custom_mode_with_class_is_fine() {
        let layout = LayoutDefinition::new(vec![
            PaneSpec::new(0, NormalizedRect::FULL)
                .with_camera_mode(CameraMode::Custom)
                .with_custom_pawn(PawnClass::Named("Drone".into())),
        ]);
        assert!(layout.validate().is_empty());
    }

    #[test]
    fn json_fields_fall_back_to_defaults() {
        let layout = LayoutDefinition::from_json_str(
            r#"{ "panes": [
                { "player_slot": 1, "rect": { "origin": [0.5, 0.0], "size": [0.5, 1.0] } }
            ] }"#,
        )
        .unwrap();
        assert!(layout.auto_spawn_players);
        let pane = &layout.panes[0];
        assert_eq!(pane.rect, NormalizedRect::new(0.5, 0.0, 0.5, 1.0));
        assert!(pane.receives_keyboard_mouse);
        assert_eq!(pane.camera_mode, CameraMode::Orbit);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = LayoutDefinition::from_json_str("{ panes: ").unwrap_err();
        assert!(matches!(err, ViewportError::LayoutFormat(_)));
    }

    #[test]
    fn pane_lookup_returns_first_declared() {
        let mut layout = LayoutDefinition::new(vec![
            PaneSpec::new(0, NormalizedRect::new(0.0, 0.0, 0.5, 0.5)),
            PaneSpec::new(0, NormalizedRect::FULL),
        ]);
        let slot = PlayerSlot::new(0);
        assert_eq!(
            layout.pane(slot).map(|p| p.rect),
            Some(NormalizedRect::new(0.0, 0.0, 0.5, 0.5))
        );
        layout.pane_mut(slot).unwrap().depth = 4;
        assert_eq!(layout.panes[0].depth, 4);
        assert_eq!(layout.panes[1].depth, 0);
    }
}

//! Built-in layout templates and the quick split-screen setup helper.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{HudClass, LayoutDefinition, NormalizedRect, PaneSpec};
use crate::error::ViewportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutPreset {
    SingleFullscreen,
    TwoPlayerHorizontal,
    TwoPlayerVertical,
    FourPlayerGrid,
    PictureInPicture,
    ThreePlayerAsymmetric,
    SixPlayerGrid,
}

impl LayoutPreset {
    pub const ALL: [LayoutPreset; 7] = [
        LayoutPreset::SingleFullscreen,
        LayoutPreset::TwoPlayerHorizontal,
        LayoutPreset::TwoPlayerVertical,
        LayoutPreset::FourPlayerGrid,
        LayoutPreset::PictureInPicture,
        LayoutPreset::ThreePlayerAsymmetric,
        LayoutPreset::SixPlayerGrid,
    ];

    pub fn key(self) -> &'static str {
        match self {
            LayoutPreset::SingleFullscreen => "single-fullscreen",
            LayoutPreset::TwoPlayerHorizontal => "two-player-horizontal",
            LayoutPreset::TwoPlayerVertical => "two-player-vertical",
            LayoutPreset::FourPlayerGrid => "four-player-grid",
            LayoutPreset::PictureInPicture => "picture-in-picture",
            LayoutPreset::ThreePlayerAsymmetric => "three-player-asymmetric",
            LayoutPreset::SixPlayerGrid => "six-player-grid",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            LayoutPreset::SingleFullscreen => "Single Fullscreen",
            LayoutPreset::TwoPlayerHorizontal => "Two Player - Horizontal Split",
            LayoutPreset::TwoPlayerVertical => "Two Player - Vertical Split",
            LayoutPreset::FourPlayerGrid => "Four Player - Grid",
            LayoutPreset::PictureInPicture => "Picture-in-Picture",
            LayoutPreset::ThreePlayerAsymmetric => "Three Player - Asymmetric",
            LayoutPreset::SixPlayerGrid => "Six Player - Grid",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            LayoutPreset::SingleFullscreen => "One viewport taking up the entire screen",
            LayoutPreset::TwoPlayerHorizontal => "Two viewports split horizontally (top/bottom)",
            LayoutPreset::TwoPlayerVertical => "Two viewports split vertically (left/right)",
            LayoutPreset::FourPlayerGrid => "Four equal viewports in a 2x2 grid",
            LayoutPreset::PictureInPicture => {
                "Large main viewport with a small inset in the bottom-right corner"
            }
            LayoutPreset::ThreePlayerAsymmetric => {
                "One large viewport on the left, two stacked viewports on the right"
            }
            LayoutPreset::SixPlayerGrid => "Six equal viewports in a 3x2 grid",
        }
    }

    /// Cycles through `ALL`, wrapping in both directions.
    pub fn step(self, forward: bool) -> Self {
        let len = Self::ALL.len() as isize;
        let idx = Self::ALL.iter().position(|p| *p == self).unwrap_or(0) as isize;
        let step = if forward { 1 } else { -1 };
        Self::ALL[(idx + step).rem_euclid(len) as usize]
    }

    pub fn build(self) -> LayoutDefinition {
        let rects: Vec<NormalizedRect> = match self {
            LayoutPreset::SingleFullscreen => vec![NormalizedRect::FULL],
            LayoutPreset::TwoPlayerHorizontal => vec![
                NormalizedRect::new(0.0, 0.0, 1.0, 0.5),
                NormalizedRect::new(0.0, 0.5, 1.0, 0.5),
            ],
            LayoutPreset::TwoPlayerVertical => vec![
                NormalizedRect::new(0.0, 0.0, 0.5, 1.0),
                NormalizedRect::new(0.5, 0.0, 0.5, 1.0),
            ],
            LayoutPreset::FourPlayerGrid => quad_rects().to_vec(),
            LayoutPreset::PictureInPicture => vec![
                NormalizedRect::FULL,
                NormalizedRect::new(0.75, 0.75, 0.25, 0.25),
            ],
            LayoutPreset::ThreePlayerAsymmetric => vec![
                NormalizedRect::new(0.0, 0.0, 0.667, 1.0),
                NormalizedRect::new(0.667, 0.0, 0.333, 0.5),
                NormalizedRect::new(0.667, 0.5, 0.333, 0.5),
            ],
            LayoutPreset::SixPlayerGrid => {
                let mut rects = Vec::with_capacity(6);
                for y in [0.0, 0.5] {
                    rects.push(NormalizedRect::new(0.0, y, 0.333, 0.5));
                    rects.push(NormalizedRect::new(0.333, y, 0.334, 0.5));
                    rects.push(NormalizedRect::new(0.667, y, 0.333, 0.5));
                }
                rects
            }
        };

        let mut panes: Vec<PaneSpec> = rects
            .into_iter()
            .enumerate()
            .map(|(slot, rect)| PaneSpec::new(slot as i32, rect))
            .collect();
        if self == LayoutPreset::PictureInPicture
            && let Some(inset) = panes.get_mut(1)
        {
            inset.depth = 1;
        }
        LayoutDefinition::new(panes).named(self.title())
    }
}

impl fmt::Display for LayoutPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for LayoutPreset {
    type Err = ViewportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|preset| preset.key() == wanted)
            .ok_or_else(|| ViewportError::UnknownPreset(s.to_string()))
    }
}

fn quad_rects() -> [NormalizedRect; 4] {
    [
        NormalizedRect::new(0.0, 0.0, 0.5, 0.5),
        NormalizedRect::new(0.5, 0.0, 0.5, 0.5),
        NormalizedRect::new(0.0, 0.5, 0.5, 0.5),
        NormalizedRect::new(0.5, 0.5, 0.5, 0.5),
    ]
}

/// Builds a ready-made split-screen layout for 2 or 4 players.
///
/// With two players, `horizontal_split` places them side by side; otherwise
/// they are stacked top and bottom. Every pane gets `hud` when supplied.
pub fn quick_setup(
    num_players: u32,
    horizontal_split: bool,
    hud: Option<HudClass>,
) -> Result<LayoutDefinition, ViewportError> {
    let rects: Vec<NormalizedRect> = match (num_players, horizontal_split) {
        (2, true) => vec![
            NormalizedRect::new(0.0, 0.0, 0.5, 1.0),
            NormalizedRect::new(0.5, 0.0, 0.5, 1.0),
        ],
        (2, false) => vec![
            NormalizedRect::new(0.0, 0.0, 1.0, 0.5),
            NormalizedRect::new(0.0, 0.5, 1.0, 0.5),
        ],
        (4, _) => quad_rects().to_vec(),
        (other, _) => {
            tracing::warn!(requested = other, "quick setup only supports 2 or 4 players");
            return Err(ViewportError::UnsupportedPlayerCount(other));
        }
    };
    let panes = rects
        .into_iter()
        .enumerate()
        .map(|(slot, rect)| PaneSpec::new(slot as i32, rect).with_hud(hud.clone()))
        .collect();
    Ok(LayoutDefinition::new(panes)
        .named(format!("Quick {num_players}-player split"))
        .with_auto_spawn(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_validates_cleanly() {
        for preset in LayoutPreset::ALL {
            let layout = preset.build();
            assert!(layout.validate().is_empty(), "{preset} produced warnings");
            assert!(!layout.panes.is_empty());
        }
    }

    #[test]
    fn presets_parse_from_keys() {
        assert_eq!(
            "four-player-grid".parse::<LayoutPreset>().unwrap(),
            LayoutPreset::FourPlayerGrid
        );
        assert_eq!(
            "Picture_In_Picture".parse::<LayoutPreset>().unwrap(),
            LayoutPreset::PictureInPicture
        );
        assert!(matches!(
            "nine-way".parse::<LayoutPreset>(),
            Err(ViewportError::UnknownPreset(_))
        ));
    }

    #[test]
    fn step_wraps_around() {
        assert_eq!(
            LayoutPreset::SixPlayerGrid.step(true),
            LayoutPreset::SingleFullscreen
        );
        assert_eq!(
            LayoutPreset::SingleFullscreen.step(false),
            LayoutPreset::SixPlayerGrid
        );
    }

    #[test]
    fn picture_in_picture_inset_sits_on_top() {
        let layout = LayoutPreset::PictureInPicture.build();
        assert_eq!(layout.panes[1].depth, 1);
        assert!(layout.panes[0].depth < layout.panes[1].depth);
    }

    #[test]
    fn quick_setup_shapes() {
        let side_by_side = quick_setup(2, true, None).unwrap();
        assert_eq!(side_by_side.panes[1].rect, NormalizedRect::new(0.5, 0.0, 0.5, 1.0));

        let stacked = quick_setup(2, false, Some(HudClass::new("Scoreboard"))).unwrap();
        assert_eq!(stacked.panes[1].rect, NormalizedRect::new(0.0, 0.5, 1.0, 0.5));
        assert!(stacked.panes.iter().all(|p| p.hud_class.is_some()));

        assert_eq!(quick_setup(4, true, None).unwrap().panes.len(), 4);
        assert!(matches!(
            quick_setup(3, true, None),
            Err(ViewportError::UnsupportedPlayerCount(3))
        ));
    }
}

use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::{NormalizedRect, PlayerSlot};
use crate::constants::DEFAULT_ORBIT_DISTANCE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    #[default]
    Orbit,
    Free,
    Custom,
}

impl fmt::Display for CameraMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CameraMode::Orbit => "orbit",
            CameraMode::Free => "free",
            CameraMode::Custom => "custom",
        };
        write!(f, "{}", s)
    }
}

/// Which pawn type a player is given. `Named` classes are resolved by the
/// host's `PawnFactory`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PawnClass {
    Orbit,
    Free,
    Named(String),
}

impl fmt::Display for PawnClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PawnClass::Orbit => write!(f, "OrbitCameraPawn"),
            PawnClass::Free => write!(f, "FreeCameraPawn"),
            PawnClass::Named(name) => write!(f, "{}", name),
        }
    }
}

/// Overlay widget type identifier, interpreted by the host's `HudFactory`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HudClass(pub String);

impl HudClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HudClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
        }
    }

    /// Places a camera at `eye` facing `target` (X forward, Z up).
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let forward = (target - eye).normalize_or_zero();
        let rotation = if forward == Vec3::ZERO {
            Quat::IDENTITY
        } else {
            Quat::from_rotation_arc(Vec3::X, forward)
        };
        Self {
            translation: eye,
            rotation,
        }
    }
}

/// Per-pane camera behaviour handed to the spawned pawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraControlSettings {
    pub controls_enabled: bool,
    pub orbit_enabled: bool,
    pub pan_enabled: bool,
    pub zoom_enabled: bool,
    pub target_tracking_enabled: bool,
    /// Actor the camera should track, resolved by the host.
    pub target_actor: Option<String>,
    pub keep_cursor_visible: bool,
    pub orbit_yaw_sensitivity: f32,
    pub orbit_pitch_sensitivity: f32,
    pub pan_speed_scalar: f32,
    pub zoom_speed_scalar: f32,
    pub invert_orbit_yaw: bool,
    pub invert_orbit_pitch: bool,
    pub invert_zoom: bool,
    pub lock_pan_horizontal: bool,
    pub lock_pan_vertical: bool,
    pub free_move_speed: f32,
    pub free_sprint_speed: f32,
    pub free_look_sensitivity: f32,
}

impl Default for CameraControlSettings {
    fn default() -> Self {
        Self {
            controls_enabled: true,
            orbit_enabled: true,
            pan_enabled: true,
            zoom_enabled: true,
            target_tracking_enabled: true,
            target_actor: None,
            keep_cursor_visible: true,
            orbit_yaw_sensitivity: 1.0,
            orbit_pitch_sensitivity: 1.0,
            pan_speed_scalar: 1.0,
            zoom_speed_scalar: 1.0,
            invert_orbit_yaw: false,
            invert_orbit_pitch: false,
            invert_zoom: false,
            lock_pan_horizontal: false,
            lock_pan_vertical: false,
            free_move_speed: 600.0,
            free_sprint_speed: 1200.0,
            free_look_sensitivity: 1.0,
        }
    }
}

impl CameraControlSettings {
    /// Copy with every tunable forced into its supported range.
    pub fn clamped(&self) -> Self {
        Self {
            orbit_yaw_sensitivity: self.orbit_yaw_sensitivity.clamp(0.1, 10.0),
            orbit_pitch_sensitivity: self.orbit_pitch_sensitivity.clamp(0.1, 10.0),
            pan_speed_scalar: self.pan_speed_scalar.clamp(0.1, 10.0),
            zoom_speed_scalar: self.zoom_speed_scalar.clamp(0.1, 10.0),
            free_move_speed: self.free_move_speed.clamp(10.0, 5000.0),
            free_sprint_speed: self.free_sprint_speed.clamp(10.0, 10000.0),
            free_look_sensitivity: self.free_look_sensitivity.clamp(0.1, 10.0),
            ..self.clone()
        }
    }
}

/// One row of a layout: a screen region bound to one local player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaneSpec {
    /// Authored slot; negative values are reported and skipped at apply time.
    pub player_slot: i32,
    pub rect: NormalizedRect,
    /// Higher values are drawn on top and win hit-tests where panes overlap.
    pub depth: i32,
    pub camera_mode: CameraMode,
    pub pawn_class_override: Option<PawnClass>,
    pub custom_pawn_class: Option<PawnClass>,
    pub hud_class: Option<HudClass>,
    pub receives_keyboard_mouse: bool,
    pub camera_transform_override: Option<Transform>,
    pub focus_point_override: Option<Vec3>,
    pub orbit_distance: f32,
    pub camera_controls: CameraControlSettings,
}

impl Default for PaneSpec {
    fn default() -> Self {
        Self {
            player_slot: 0,
            rect: NormalizedRect::FULL,
            depth: 0,
            camera_mode: CameraMode::Orbit,
            pawn_class_override: None,
            custom_pawn_class: None,
            hud_class: None,
            receives_keyboard_mouse: true,
            camera_transform_override: None,
            focus_point_override: None,
            orbit_distance: DEFAULT_ORBIT_DISTANCE,
            camera_controls: CameraControlSettings::default(),
        }
    }
}

impl PaneSpec {
    pub fn new(player_slot: i32, rect: NormalizedRect) -> Self {
        Self {
            player_slot,
            rect,
            ..Self::default()
        }
    }

    pub fn slot(&self) -> Option<PlayerSlot> {
        PlayerSlot::from_authored(self.player_slot)
    }

    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_camera_mode(mut self, mode: CameraMode) -> Self {
        self.camera_mode = mode;
        self
    }

    pub fn with_hud(mut self, hud: Option<HudClass>) -> Self {
        self.hud_class = hud;
        self
    }

    pub fn with_keyboard_mouse(mut self, receives: bool) -> Self {
        self.receives_keyboard_mouse = receives;
        self
    }

    pub fn with_custom_pawn(mut self, class: PawnClass) -> Self {
        self.custom_pawn_class = Some(class);
        self
    }

    pub fn with_pawn_override(mut self, class: PawnClass) -> Self {
        self.pawn_class_override = Some(class);
        self
    }

    pub fn with_camera_transform(mut self, transform: Transform) -> Self {
        self.camera_transform_override = Some(transform);
        self
    }

    pub fn with_focus_point(mut self, focus: Vec3, orbit_distance: f32) -> Self {
        self.focus_point_override = Some(focus);
        self.orbit_distance = orbit_distance;
        self
    }

    pub fn keep_cursor_visible(&self) -> bool {
        self.camera_controls.keep_cursor_visible
    }
}

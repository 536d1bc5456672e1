//! Camera pawn variants and the capability through which a pane configures
//! them.

use std::any::Any;
use std::fmt;

use glam::{Quat, Vec3};

use crate::constants::{
    DEFAULT_ORBIT_DISTANCE, DEFAULT_PAN_SPEED, DEFAULT_ZOOM_SPEED, MAX_ORBIT_DISTANCE,
    MIN_ORBIT_DISTANCE, MIN_PAN_SPEED, MIN_ZOOM_SPEED,
};
use crate::layout::{CameraControlSettings, PaneSpec, PawnClass, Transform};

/// Applies a pane's camera settings to a pawn.
pub trait CameraPaneConfigurable {
    /// Returns the controller rotation the pawn wants, if any.
    fn apply_pane_settings(&mut self, pane: &PaneSpec) -> Option<Quat>;
}

pub trait CameraPawn: CameraPaneConfigurable + fmt::Debug {
    fn class(&self) -> PawnClass;
    fn transform(&self) -> Transform;
    fn as_any(&self) -> &dyn Any;
}

/// Builds one of the built-in pawns for `class`.
pub fn spawn_builtin(class: &PawnClass, transform: Transform) -> Box<dyn CameraPawn> {
    match class {
        PawnClass::Orbit => Box::new(OrbitCameraPawn::new(transform)),
        PawnClass::Free => Box::new(FreeCameraPawn::new(transform)),
        PawnClass::Named(name) => Box::new(GenericPawn::new(name.clone(), transform)),
    }
}

/// Camera that orbits a focus point at a given distance.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCameraPawn {
    pub transform: Transform,
    pub starting_transform: Transform,
    pub focus_point: Vec3,
    orbit_distance: f32,
    pub controls_enabled: bool,
    pub orbit_enabled: bool,
    pub pan_enabled: bool,
    pub zoom_enabled: bool,
    pub target_tracking_enabled: bool,
    pub target_actor: Option<String>,
    pub keep_cursor_visible: bool,
    pub orbit_yaw_sensitivity: f32,
    pub orbit_pitch_sensitivity: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub invert_orbit_yaw: bool,
    pub invert_orbit_pitch: bool,
    pub invert_zoom: bool,
    pub lock_pan_horizontal: bool,
    pub lock_pan_vertical: bool,
}

impl OrbitCameraPawn {
    pub fn new(transform: Transform) -> Self {
        let mut pawn = Self {
            transform,
            starting_transform: transform,
            focus_point: Vec3::ZERO,
            orbit_distance: DEFAULT_ORBIT_DISTANCE,
            controls_enabled: true,
            orbit_enabled: true,
            pan_enabled: true,
            zoom_enabled: true,
            target_tracking_enabled: true,
            target_actor: None,
            keep_cursor_visible: true,
            orbit_yaw_sensitivity: 1.0,
            orbit_pitch_sensitivity: 1.0,
            pan_speed: DEFAULT_PAN_SPEED,
            zoom_speed: DEFAULT_ZOOM_SPEED,
            invert_orbit_yaw: false,
            invert_orbit_pitch: false,
            invert_zoom: false,
            lock_pan_horizontal: false,
            lock_pan_vertical: false,
        };
        pawn.apply_control_settings(&CameraControlSettings::default());
        pawn
    }

    pub fn orbit_distance(&self) -> f32 {
        self.orbit_distance
    }

    pub fn set_orbit_distance(&mut self, distance: f32) {
        self.orbit_distance = distance.clamp(MIN_ORBIT_DISTANCE, MAX_ORBIT_DISTANCE);
        tracing::trace!(distance = self.orbit_distance, "orbit distance set");
    }

    pub fn apply_control_settings(&mut self, settings: &CameraControlSettings) {
        let settings = settings.clamped();
        self.controls_enabled = settings.controls_enabled;
        self.orbit_enabled = settings.orbit_enabled;
        self.pan_enabled = settings.pan_enabled;
        self.zoom_enabled = settings.zoom_enabled;
        self.target_tracking_enabled = settings.target_tracking_enabled;
        self.target_actor = settings.target_actor.clone();
        self.keep_cursor_visible = settings.keep_cursor_visible;
        self.orbit_yaw_sensitivity = settings.orbit_yaw_sensitivity;
        self.orbit_pitch_sensitivity = settings.orbit_pitch_sensitivity;
        self.pan_speed = (DEFAULT_PAN_SPEED * settings.pan_speed_scalar).max(MIN_PAN_SPEED);
        self.zoom_speed = (DEFAULT_ZOOM_SPEED * settings.zoom_speed_scalar).max(MIN_ZOOM_SPEED);
        self.invert_orbit_yaw = settings.invert_orbit_yaw;
        self.invert_orbit_pitch = settings.invert_orbit_pitch;
        self.invert_zoom = settings.invert_zoom;
        self.lock_pan_horizontal = settings.lock_pan_horizontal;
        self.lock_pan_vertical = settings.lock_pan_vertical;
    }
}

impl CameraPaneConfigurable for OrbitCameraPawn {
    fn apply_pane_settings(&mut self, pane: &PaneSpec) -> Option<Quat> {
        let mut rotation = None;
        if let Some(transform) = pane.camera_transform_override {
            self.transform = transform;
            self.starting_transform = transform;
            self.focus_point = transform.translation;
            self.set_orbit_distance(pane.orbit_distance);
            rotation = Some(transform.rotation);
        } else if let Some(focus) = pane.focus_point_override {
            self.focus_point = focus;
            self.set_orbit_distance(pane.orbit_distance);
        } else {
            self.set_orbit_distance(pane.orbit_distance);
        }
        self.apply_control_settings(&pane.camera_controls);
        rotation
    }
}

impl CameraPawn for OrbitCameraPawn {
    fn class(&self) -> PawnClass {
        PawnClass::Orbit
    }

    fn transform(&self) -> Transform {
        self.transform
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Free-fly camera with WASD-style translation and mouse look.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeCameraPawn {
    pub transform: Transform,
    pub controls_enabled: bool,
    pub allow_translation: bool,
    pub allow_look: bool,
    pub lock_horizontal_translation: bool,
    pub lock_vertical_translation: bool,
    move_speed: f32,
    sprint_speed: f32,
    pub look_sensitivity: f32,
    pub invert_yaw: bool,
    pub invert_pitch: bool,
    pub keep_cursor_visible: bool,
}

impl FreeCameraPawn {
    const MIN_MOVE_SPEED: f32 = 10.0;

    pub fn new(transform: Transform) -> Self {
        let mut pawn = Self {
            transform,
            controls_enabled: true,
            allow_translation: true,
            allow_look: true,
            lock_horizontal_translation: false,
            lock_vertical_translation: false,
            move_speed: 0.0,
            sprint_speed: 0.0,
            look_sensitivity: 1.0,
            invert_yaw: false,
            invert_pitch: false,
            keep_cursor_visible: true,
        };
        pawn.apply_control_settings(&CameraControlSettings::default());
        pawn
    }

    pub fn move_speed(&self) -> f32 {
        self.move_speed
    }

    pub fn sprint_speed(&self) -> f32 {
        self.sprint_speed
    }

    pub fn set_move_speed(&mut self, speed: f32) {
        self.move_speed = speed.max(Self::MIN_MOVE_SPEED);
    }

    /// Sprint never drops below the walking speed.
    pub fn set_sprint_speed(&mut self, speed: f32) {
        self.sprint_speed = speed.max(self.move_speed);
    }

    pub fn apply_control_settings(&mut self, settings: &CameraControlSettings) {
        let settings = settings.clamped();
        self.controls_enabled = settings.controls_enabled;
        self.allow_translation = settings.controls_enabled && settings.pan_enabled;
        self.allow_look = settings.controls_enabled && settings.orbit_enabled;
        self.lock_horizontal_translation = settings.lock_pan_horizontal;
        self.lock_vertical_translation = settings.lock_pan_vertical;
        self.set_move_speed(settings.free_move_speed * settings.pan_speed_scalar);
        self.set_sprint_speed(settings.free_sprint_speed * settings.pan_speed_scalar);
        self.look_sensitivity = settings.free_look_sensitivity;
        self.invert_yaw = settings.invert_orbit_yaw;
        self.invert_pitch = settings.invert_orbit_pitch;
        self.keep_cursor_visible = settings.keep_cursor_visible;
    }
}

impl CameraPaneConfigurable for FreeCameraPawn {
    fn apply_pane_settings(&mut self, pane: &PaneSpec) -> Option<Quat> {
        let rotation = pane.camera_transform_override.map(|transform| {
            self.transform = transform;
            transform.rotation
        });
        self.apply_control_settings(&pane.camera_controls);
        rotation
    }
}

impl CameraPawn for FreeCameraPawn {
    fn class(&self) -> PawnClass {
        PawnClass::Free
    }

    fn transform(&self) -> Transform {
        self.transform
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Pawn of a game-defined class. Panes do not configure it.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericPawn {
    pub class_name: String,
    pub transform: Transform,
}

impl GenericPawn {
    pub fn new(class_name: impl Into<String>, transform: Transform) -> Self {
        Self {
            class_name: class_name.into(),
            transform,
        }
    }
}

impl CameraPaneConfigurable for GenericPawn {
    fn apply_pane_settings(&mut self, pane: &PaneSpec) -> Option<Quat> {
        tracing::debug!(
            pane_slot = pane.player_slot,
            class = %self.class_name,
            "custom pawn; no automatic configuration applied"
        );
        None
    }
}

impl CameraPawn for GenericPawn {
    fn class(&self) -> PawnClass {
        PawnClass::Named(self.class_name.clone())
    }

    fn transform(&self) -> Transform {
        self.transform
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

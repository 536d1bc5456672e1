//! Shared crate-wide constants.

/// Tolerance used when checking whether a pane's far edge spills past the
/// viewport. Preset layouts use thirds rounded to three decimals, so their
/// edges may land a hair beyond 1.0.
pub const RECT_EPSILON: f32 = 1e-3;

/// Orbit distance given to panes that do not author one.
pub const DEFAULT_ORBIT_DISTANCE: f32 = 500.0;

/// Orbit distance bounds enforced when a pawn is configured for a pane.
pub const MIN_ORBIT_DISTANCE: f32 = 50.0;
pub const MAX_ORBIT_DISTANCE: f32 = 5000.0;

/// Base pan speed of the orbit pawn before the pane's pan scalar applies.
pub const DEFAULT_PAN_SPEED: f32 = 100.0;
/// Floor for the scaled pan speed.
pub const MIN_PAN_SPEED: f32 = 1.0;

/// Base zoom speed of the orbit pawn before the pane's zoom scalar applies.
pub const DEFAULT_ZOOM_SPEED: f32 = 10.0;
/// Floor for the scaled zoom speed.
pub const MIN_ZOOM_SPEED: f32 = 0.1;

/// Spacing (world units along X) between fallback spawn points of
/// consecutive player slots.
pub const FALLBACK_SPAWN_SPACING: f32 = 200.0;

/// Height of fallback spawn points.
pub const FALLBACK_SPAWN_HEIGHT: f32 = 100.0;

/// Number of lines retained by the in-memory log buffer.
pub const LOG_BUFFER_MAX_LINES: usize = 2000;

//! Split-screen viewport composition for local multiplayer.
//!
//! A [`LayoutDefinition`] describes which local player owns which region of
//! the screen. The [`ViewportCompositor`] commits it to a host engine,
//! provisions players and camera pawns, attaches per-pane HUDs, routes
//! pointer input to the pane under the cursor and tracks which player holds
//! keyboard/mouse focus.

pub mod camera;
pub mod compositor;
pub mod constants;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod focus;
pub mod headless;
pub mod host;
pub mod hud;
pub mod input;
pub mod layout;
pub mod log_buffer;
pub mod preview;
pub mod provision;
pub mod settings;
pub mod tracing_sub;

pub use compositor::{ApplyReport, LiveLayoutState, ViewportCompositor};
pub use error::{ProvisionError, ViewportError};
pub use focus::{FocusChange, FocusSubscription};
pub use headless::HeadlessHost;
pub use host::{HudFactory, PawnFactory, PlayerHost, ViewportHost};
pub use input::{InputDevice, InputEvent, InputKey, InputRouter, KeyAction, RouteOutcome};
pub use layout::{
    LayoutDefinition, LayoutPreset, NormalizedRect, PaneSpec, PlayerSlot, quick_setup,
};
pub use settings::ViewportManagerSettings;

//! Raw input events and the router that assigns each one to a single player.
//!
//! Pointer-sourced events are hit-tested against the committed pane
//! rectangles and delivered to the player under the cursor, or swallowed
//! when no pane claims them. Gamepad events are already bound to a
//! controller and go straight to the host's default dispatch.

use std::fmt;

use glam::Vec2;

use crate::compositor::ViewportCompositor;
use crate::host::ViewportHost;
use crate::layout::{PlayerSlot, normalize_point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputDevice {
    /// Keyboard and mouse, which share the pointer position.
    Pointer,
    Gamepad { controller_id: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputKey {
    MouseLeft,
    MouseRight,
    MouseMiddle,
    MouseX,
    MouseY,
    MouseWheel,
    Char(char),
    Named(String),
}

impl fmt::Display for InputKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKey::MouseLeft => write!(f, "LeftMouseButton"),
            InputKey::MouseRight => write!(f, "RightMouseButton"),
            InputKey::MouseMiddle => write!(f, "MiddleMouseButton"),
            InputKey::MouseX => write!(f, "MouseX"),
            InputKey::MouseY => write!(f, "MouseY"),
            InputKey::MouseWheel => write!(f, "MouseWheelAxis"),
            InputKey::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            InputKey::Named(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Pressed,
    Released,
    Repeat,
    DoubleClick,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key {
        device: InputDevice,
        key: InputKey,
        action: KeyAction,
        amount_depressed: f32,
    },
    Axis {
        device: InputDevice,
        key: InputKey,
        delta: f32,
        delta_time: f32,
        num_samples: u32,
    },
}

impl InputEvent {
    /// Keyboard or mouse-button event from the pointer device.
    pub fn key(key: InputKey, action: KeyAction) -> Self {
        InputEvent::Key {
            device: InputDevice::Pointer,
            key,
            action,
            amount_depressed: if action == KeyAction::Released { 0.0 } else { 1.0 },
        }
    }

    /// Mouse axis movement from the pointer device.
    pub fn axis(key: InputKey, delta: f32) -> Self {
        InputEvent::Axis {
            device: InputDevice::Pointer,
            key,
            delta,
            delta_time: 0.0,
            num_samples: 1,
        }
    }

    pub fn with_device(mut self, new_device: InputDevice) -> Self {
        match &mut self {
            InputEvent::Key { device, .. } | InputEvent::Axis { device, .. } => {
                *device = new_device
            }
        }
        self
    }

    pub fn device(&self) -> InputDevice {
        match self {
            InputEvent::Key { device, .. } | InputEvent::Axis { device, .. } => *device,
        }
    }

    pub fn input_key(&self) -> &InputKey {
        match self {
            InputEvent::Key { key, .. } | InputEvent::Axis { key, .. } => key,
        }
    }

    pub fn is_pointer(&self) -> bool {
        self.device() == InputDevice::Pointer
    }

    pub fn is_left_press(&self) -> bool {
        matches!(
            self,
            InputEvent::Key {
                key: InputKey::MouseLeft,
                action: KeyAction::Pressed,
                ..
            }
        )
    }
}

/// Why a pointer event reached nobody.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwallowReason {
    PointerUnavailable,
    ZeroSizedViewport,
    NoPaneAtPointer,
    KeyboardMouseDeclined(PlayerSlot),
    NoController(PlayerSlot),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Not routed by pane: gamepad input, or no managed layout is active.
    Bypassed { handled: bool },
    Forwarded { slot: PlayerSlot, handled: bool },
    Swallowed(SwallowReason),
}

impl RouteOutcome {
    pub fn handled(&self) -> bool {
        match self {
            RouteOutcome::Bypassed { handled } | RouteOutcome::Forwarded { handled, .. } => {
                *handled
            }
            RouteOutcome::Swallowed(_) => false,
        }
    }

    /// Player the event was delivered to, if it went to one by hit-test.
    pub fn target(&self) -> Option<PlayerSlot> {
        match self {
            RouteOutcome::Forwarded { slot, .. } => Some(*slot),
            _ => None,
        }
    }
}

/// Filter in front of the host's per-player input dispatch.
pub struct InputRouter<'a, H: ViewportHost> {
    compositor: &'a mut ViewportCompositor<H>,
}

impl<'a, H: ViewportHost> InputRouter<'a, H> {
    pub fn new(compositor: &'a mut ViewportCompositor<H>) -> Self {
        Self { compositor }
    }

    pub fn input_key(
        &mut self,
        device: InputDevice,
        key: InputKey,
        action: KeyAction,
        amount_depressed: f32,
    ) -> bool {
        self.route(&InputEvent::Key {
            device,
            key,
            action,
            amount_depressed,
        })
        .handled()
    }

    pub fn input_axis(
        &mut self,
        device: InputDevice,
        key: InputKey,
        delta: f32,
        delta_time: f32,
        num_samples: u32,
    ) -> bool {
        self.route(&InputEvent::Axis {
            device,
            key,
            delta,
            delta_time,
            num_samples,
        })
        .handled()
    }

    pub fn route(&mut self, event: &InputEvent) -> RouteOutcome {
        if !event.is_pointer() || self.compositor.state().active_layout().is_none() {
            let handled = self.compositor.host_mut().dispatch_default(event);
            return RouteOutcome::Bypassed { handled };
        }

        let Some(point) = self.pointer_point() else {
            return self.swallow(event, self.pointer_failure());
        };
        let Some(slot) = self.compositor.find_pane_at(point) else {
            return self.swallow(event, SwallowReason::NoPaneAtPointer);
        };

        let receives = self
            .compositor
            .pane(slot)
            .is_none_or(|pane| pane.receives_keyboard_mouse);
        if !receives {
            return self.swallow(event, SwallowReason::KeyboardMouseDeclined(slot));
        }

        if event.is_left_press() {
            self.compositor.handle_click_to_focus(point);
        }

        match self.compositor.host_mut().dispatch_to_player(slot, event) {
            Some(handled) => RouteOutcome::Forwarded { slot, handled },
            None => self.swallow(event, SwallowReason::NoController(slot)),
        }
    }

    fn pointer_point(&self) -> Option<Vec2> {
        let host = self.compositor.host();
        let pixel = host.pointer_position()?;
        normalize_point(pixel, host.viewport_size().as_vec2())
    }

    fn pointer_failure(&self) -> SwallowReason {
        if self.compositor.host().pointer_position().is_none() {
            SwallowReason::PointerUnavailable
        } else {
            SwallowReason::ZeroSizedViewport
        }
    }

    fn swallow(&self, event: &InputEvent, reason: SwallowReason) -> RouteOutcome {
        tracing::trace!(key = %event.input_key(), ?reason, "input swallowed");
        RouteOutcome::Swallowed(reason)
    }
}

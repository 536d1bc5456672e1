use crate::layout::LayoutPreset;

/// UI-only flags for the preview. Changes that must reach the terminal or
/// the compositor are latched and drained once with the `take_*` methods.
#[derive(Debug, Default, Clone, Copy)]
pub struct PreviewState {
    mouse_capture_enabled: bool,
    mouse_capture_dirty: bool,
    help_visible: bool,
    preset: Option<LayoutPreset>,
    preset_dirty: bool,
}

impl PreviewState {
    pub fn new(preset: Option<LayoutPreset>) -> Self {
        Self {
            mouse_capture_enabled: true,
            // Capture is enabled on the first frame.
            mouse_capture_dirty: true,
            help_visible: false,
            preset,
            preset_dirty: false,
        }
    }

    pub fn mouse_capture_enabled(&self) -> bool {
        self.mouse_capture_enabled
    }

    pub fn set_mouse_capture_enabled(&mut self, enabled: bool) {
        if self.mouse_capture_enabled == enabled {
            return;
        }
        self.mouse_capture_enabled = enabled;
        self.mouse_capture_dirty = true;
    }

    pub fn take_mouse_capture_change(&mut self) -> Option<bool> {
        if self.mouse_capture_dirty {
            self.mouse_capture_dirty = false;
            Some(self.mouse_capture_enabled)
        } else {
            None
        }
    }

    pub fn help_visible(&self) -> bool {
        self.help_visible
    }

    pub fn toggle_help_visible(&mut self) {
        self.help_visible = !self.help_visible;
    }

    pub fn preset(&self) -> Option<LayoutPreset> {
        self.preset
    }

    /// Moves to the neighbouring preset. A custom layout steps onto the
    /// first preset.
    pub fn step_preset(&mut self, forward: bool) {
        let next = match self.preset {
            Some(current) => current.step(forward),
            None => LayoutPreset::ALL[0],
        };
        self.preset = Some(next);
        self.preset_dirty = true;
    }

    pub fn take_preset_change(&mut self) -> Option<LayoutPreset> {
        if !self.preset_dirty {
            return None;
        }
        self.preset_dirty = false;
        self.preset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_capture_toggle_and_take_change() {
        let mut s = PreviewState::new(None);
        assert_eq!(s.take_mouse_capture_change(), Some(true));
        assert!(s.take_mouse_capture_change().is_none());
        s.set_mouse_capture_enabled(true);
        // no change -> None
        assert!(s.take_mouse_capture_change().is_none());
        s.set_mouse_capture_enabled(false);
        assert_eq!(s.take_mouse_capture_change(), Some(false));
        assert!(!s.mouse_capture_enabled());
    }

    #[test]
    fn preset_steps_wrap_and_latch() {
        let mut s = PreviewState::new(Some(LayoutPreset::SixPlayerGrid));
        assert!(s.take_preset_change().is_none());
        s.step_preset(true);
        assert_eq!(s.take_preset_change(), Some(LayoutPreset::SingleFullscreen));
        assert!(s.take_preset_change().is_none());

        let mut custom = PreviewState::new(None);
        custom.step_preset(false);
        assert_eq!(custom.take_preset_change(), Some(LayoutPreset::ALL[0]));
    }
}

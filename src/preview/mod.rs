//! Terminal preview of a layout. Terminal cells stand in for pixels: the
//! headless host's viewport is the terminal minus the status line, and the
//! mouse cell becomes the pointer position.

pub mod keybindings;
pub mod render;
pub mod state;

use std::cell::Cell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use glam::Vec2;
use ratatui::Terminal;
use ratatui::backend::Backend;

use crate::compositor::{ApplyReport, ViewportCompositor};
use crate::drivers::InputDriver;
use crate::error::ViewportError;
use crate::event_loop::{ControlFlow, EventLoop};
use crate::headless::HeadlessHost;
use crate::input::{InputEvent, InputKey, KeyAction, RouteOutcome};
use crate::layout::{LayoutDefinition, LayoutPreset, PlayerSlot};
use crate::log_buffer::{LogBufferHandle, take_panic_pending};
use crate::settings::{DefaultLayoutSource, ViewportManagerSettings};

pub use keybindings::{Action, KeyBindings, KeyCombo};
pub use state::PreviewState;

/// Rows reserved below the panes.
pub const STATUS_ROWS: u16 = 1;

/// Routed events remembered per pane; only the latest one is shown.
const EVENT_HISTORY: usize = 16;

/// Layout used when nothing else is configured.
pub const FALLBACK_PRESET: LayoutPreset = LayoutPreset::TwoPlayerVertical;

/// Which layout the preview opens with.
#[derive(Debug, Clone)]
pub enum StartupLayout {
    Preset(LayoutPreset),
    Custom(LayoutDefinition),
    /// Whatever the settings' default layout names, else [`FALLBACK_PRESET`].
    FromSettings,
}

pub struct PreviewApp {
    compositor: ViewportCompositor<HeadlessHost>,
    bindings: KeyBindings,
    state: PreviewState,
    last_cell: Option<(u16, u16)>,
    last_route: Option<(InputEvent, RouteOutcome)>,
    last_report: ApplyReport,
    focus_changes: Rc<Cell<u32>>,
    log: Option<LogBufferHandle>,
}

impl PreviewApp {
    pub fn new(
        settings: &ViewportManagerSettings,
        startup: StartupLayout,
        columns: u16,
        rows: u16,
    ) -> Result<Self, ViewportError> {
        let host = HeadlessHost::new(columns.into(), rows.saturating_sub(STATUS_ROWS).into())
            .with_history_limit(EVENT_HISTORY);
        let mut compositor = ViewportCompositor::with_settings(host, settings);

        let focus_changes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&focus_changes);
        compositor.subscribe_focus_changed(move |_, _| counter.set(counter.get() + 1));

        let (preset, report) = match startup {
            StartupLayout::Preset(preset) => {
                (Some(preset), compositor.apply_layout(Some(preset.build())))
            }
            StartupLayout::Custom(layout) => (None, compositor.apply_layout(Some(layout))),
            StartupLayout::FromSettings => match compositor.apply_default_layout(settings)? {
                Some(report) => {
                    let preset = match &settings.default_layout {
                        Some(DefaultLayoutSource::Preset { preset }) => Some(*preset),
                        _ => None,
                    };
                    (preset, report)
                }
                None => (
                    Some(FALLBACK_PRESET),
                    compositor.apply_layout(Some(FALLBACK_PRESET.build())),
                ),
            },
        };

        Ok(Self {
            compositor,
            bindings: KeyBindings::default(),
            state: PreviewState::new(preset),
            last_cell: None,
            last_route: None,
            last_report: report,
            focus_changes,
            log: None,
        })
    }

    /// Shows the tail of `log` in the status line.
    pub fn with_log(mut self, log: LogBufferHandle) -> Self {
        self.log = Some(log);
        self
    }

    pub fn compositor(&self) -> &ViewportCompositor<HeadlessHost> {
        &self.compositor
    }

    pub fn compositor_mut(&mut self) -> &mut ViewportCompositor<HeadlessHost> {
        &mut self.compositor
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn last_route(&self) -> Option<&(InputEvent, RouteOutcome)> {
        self.last_route.as_ref()
    }

    pub fn last_report(&self) -> &ApplyReport {
        &self.last_report
    }

    pub fn focus_changes(&self) -> u32 {
        self.focus_changes.get()
    }

    pub fn latest_log_line(&self) -> Option<String> {
        self.log.as_ref().and_then(|log| log.tail(1).pop())
    }

    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.compositor
            .host_mut()
            .set_viewport_size(columns.into(), rows.saturating_sub(STATUS_ROWS).into());
    }

    /// Drains latched state changes into the compositor and the driver.
    pub fn sync<D: InputDriver>(&mut self, driver: &mut D) -> io::Result<()> {
        if let Some(enabled) = self.state.take_mouse_capture_change() {
            driver.set_mouse_capture(enabled)?;
        }
        if let Some(preset) = self.state.take_preset_change() {
            self.last_report = self.compositor.apply_layout(Some(preset.build()));
        }
        Ok(())
    }

    pub fn handle_event(&mut self, event: &Event) -> ControlFlow {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                ControlFlow::Continue
            }
            Event::Resize(columns, rows) => {
                self.resize(*columns, *rows);
                ControlFlow::Continue
            }
            _ => ControlFlow::Continue,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> ControlFlow {
        if key.kind == KeyEventKind::Release {
            return ControlFlow::Continue;
        }
        if let Some(action) = self.bindings.action_for_key(key) {
            return self.apply_action(action);
        }
        let action = if key.kind == KeyEventKind::Repeat {
            KeyAction::Repeat
        } else {
            KeyAction::Pressed
        };
        self.route(InputEvent::key(input_key_for(key.code), action));
        ControlFlow::Continue
    }

    pub fn apply_action(&mut self, action: Action) -> ControlFlow {
        match action {
            Action::Quit => return ControlFlow::Quit,
            Action::FocusNext => self.cycle_focus(true),
            Action::FocusPrev => self.cycle_focus(false),
            Action::FocusSlot(index) => {
                self.compositor
                    .set_active_local_player(PlayerSlot::new(index));
            }
            Action::ToggleHighlight => {
                let enabled = !self.compositor.is_focus_highlighting_enabled();
                self.compositor.set_focus_highlighting_enabled(enabled);
            }
            Action::ToggleClickToFocus => {
                let enabled = !self.compositor.is_click_to_focus_enabled();
                self.compositor.set_click_to_focus_enabled(enabled);
                tracing::info!(enabled, "click-to-focus toggled");
            }
            Action::NextPreset => self.state.step_preset(true),
            Action::PrevPreset => self.state.step_preset(false),
            Action::ToggleHelp => self.state.toggle_help_visible(),
        }
        ControlFlow::Continue
    }

    fn cycle_focus(&mut self, forward: bool) {
        let slots = self.compositor.player_rects().slots();
        if slots.is_empty() {
            return;
        }
        let len = slots.len();
        let focused = self.compositor.focused_player();
        let next = match slots.iter().position(|slot| *slot == focused) {
            Some(index) if forward => (index + 1) % len,
            Some(index) => (index + len - 1) % len,
            None => 0,
        };
        let target = slots[next];
        self.compositor.set_active_local_player(target);
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) {
        let cell = (mouse.column, mouse.row);
        let previous = self.last_cell.replace(cell);
        // Centre of the cell, so edge cells resolve to the pane they show.
        let pointer = Vec2::new(f32::from(cell.0) + 0.5, f32::from(cell.1) + 0.5);
        self.compositor.host_mut().set_pointer(Some(pointer));

        match mouse.kind {
            MouseEventKind::Down(button) => {
                self.route(InputEvent::key(mouse_key(button), KeyAction::Pressed));
            }
            MouseEventKind::Up(button) => {
                self.route(InputEvent::key(mouse_key(button), KeyAction::Released));
            }
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                let Some((px, py)) = previous else {
                    return;
                };
                let dx = f32::from(cell.0) - f32::from(px);
                let dy = f32::from(cell.1) - f32::from(py);
                if dx != 0.0 {
                    self.route(InputEvent::axis(InputKey::MouseX, dx));
                }
                if dy != 0.0 {
                    // Screen rows grow downwards; mouse Y grows upwards.
                    self.route(InputEvent::axis(InputKey::MouseY, -dy));
                }
            }
            MouseEventKind::ScrollUp => self.route(InputEvent::axis(InputKey::MouseWheel, 1.0)),
            MouseEventKind::ScrollDown => {
                self.route(InputEvent::axis(InputKey::MouseWheel, -1.0))
            }
            MouseEventKind::ScrollLeft | MouseEventKind::ScrollRight => {}
        }
    }

    fn route(&mut self, event: InputEvent) {
        let outcome = self.compositor.input_router().route(&event);
        self.last_route = Some((event, outcome));
    }

    /// Runs until quit, redrawing on every loop iteration.
    pub fn run<B, D>(
        &mut self,
        terminal: &mut Terminal<B>,
        driver: D,
        poll_interval: Duration,
    ) -> io::Result<()>
    where
        B: Backend,
        D: InputDriver,
        io::Error: From<<B as Backend>::Error>,
    {
        let size = terminal.size()?;
        self.resize(size.width, size.height);

        let mut event_loop = EventLoop::new(driver, poll_interval);
        event_loop.run(|driver, event| {
            if take_panic_pending() {
                return Ok(ControlFlow::Quit);
            }
            match event {
                Some(event) => Ok(self.handle_event(&event)),
                None => {
                    self.sync(driver)?;
                    terminal.draw(|frame| render::draw(frame, self))?;
                    Ok(ControlFlow::Continue)
                }
            }
        })
    }
}

fn mouse_key(button: MouseButton) -> InputKey {
    match button {
        MouseButton::Left => InputKey::MouseLeft,
        MouseButton::Right => InputKey::MouseRight,
        MouseButton::Middle => InputKey::MouseMiddle,
    }
}

fn input_key_for(code: KeyCode) -> InputKey {
    match code {
        KeyCode::Char(c) => InputKey::Char(c),
        KeyCode::Enter => InputKey::Named("Enter".to_string()),
        KeyCode::Esc => InputKey::Named("Escape".to_string()),
        KeyCode::Backspace => InputKey::Named("BackSpace".to_string()),
        KeyCode::Left => InputKey::Named("Left".to_string()),
        KeyCode::Right => InputKey::Named("Right".to_string()),
        KeyCode::Up => InputKey::Named("Up".to_string()),
        KeyCode::Down => InputKey::Named("Down".to_string()),
        KeyCode::F(n) => InputKey::Named(format!("F{n}")),
        other => InputKey::Named(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::ScriptedInputDriver;
    use crate::host::PlayerHost;
    use crate::input::SwallowReason;
    use crossterm::event::KeyModifiers;

    fn app(preset: LayoutPreset) -> PreviewApp {
        let settings = ViewportManagerSettings::default();
        PreviewApp::new(&settings, StartupLayout::Preset(preset), 80, 25).unwrap()
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn startup_from_settings_falls_back() {
        let settings = ViewportManagerSettings::default();
        let app = PreviewApp::new(&settings, StartupLayout::FromSettings, 80, 25).unwrap();
        assert_eq!(app.state().preset(), Some(FALLBACK_PRESET));
        assert_eq!(app.compositor().player_rects().len(), 2);
        assert_eq!(app.compositor().host().viewport_size(), glam::UVec2::new(80, 24));
    }

    #[test]
    fn startup_from_settings_uses_configured_preset() {
        let settings =
            ViewportManagerSettings::default().with_default_preset(LayoutPreset::FourPlayerGrid);
        let app = PreviewApp::new(&settings, StartupLayout::FromSettings, 80, 25).unwrap();
        assert_eq!(app.state().preset(), Some(LayoutPreset::FourPlayerGrid));
        assert_eq!(app.compositor().local_player_count(), 4);
    }

    #[test]
    fn click_routes_and_focuses_right_pane() {
        let mut app = app(LayoutPreset::TwoPlayerVertical);
        app.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 60, 10));
        let (event, outcome) = app.last_route().unwrap();
        assert!(event.is_left_press());
        assert_eq!(outcome.target(), Some(PlayerSlot::new(1)));
        assert_eq!(app.compositor().focused_player(), PlayerSlot::new(1));
        assert_eq!(app.focus_changes(), 1);
    }

    #[test]
    fn status_row_is_outside_every_pane() {
        let mut app = app(LayoutPreset::SingleFullscreen);
        app.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 5, 24));
        let (_, outcome) = app.last_route().unwrap();
        assert_eq!(
            *outcome,
            RouteOutcome::Swallowed(SwallowReason::NoPaneAtPointer)
        );
    }

    #[test]
    fn mouse_motion_becomes_axis_deltas() {
        let mut app = app(LayoutPreset::SingleFullscreen);
        app.handle_event(&mouse(MouseEventKind::Moved, 10, 10));
        assert!(app.last_route().is_none());
        app.handle_event(&mouse(MouseEventKind::Moved, 10, 12));
        let (event, _) = app.last_route().unwrap();
        assert_eq!(*event, InputEvent::axis(InputKey::MouseY, -2.0));
    }

    #[test]
    fn long_sessions_keep_event_history_bounded() {
        let mut app = app(LayoutPreset::SingleFullscreen);
        for step in 0..200u16 {
            app.handle_event(&mouse(MouseEventKind::Moved, 10 + step % 2, 10));
        }
        let player = app.compositor().host().player(PlayerSlot::new(0)).unwrap();
        assert_eq!(player.delivered, 199);
        assert_eq!(player.received.len(), EVENT_HISTORY);
    }

    #[test]
    fn bound_keys_drive_focus_and_presets() {
        let mut app = app(LayoutPreset::FourPlayerGrid);
        let mut driver = ScriptedInputDriver::default();

        app.handle_event(&press(KeyCode::Tab));
        assert_eq!(app.compositor().focused_player(), PlayerSlot::new(1));
        app.handle_event(&press(KeyCode::Char('4')));
        assert_eq!(app.compositor().focused_player(), PlayerSlot::new(3));
        app.handle_event(&press(KeyCode::Tab));
        assert_eq!(app.compositor().focused_player(), PlayerSlot::new(0));

        app.handle_event(&press(KeyCode::Char('n')));
        app.sync(&mut driver).unwrap();
        assert_eq!(app.state().preset(), Some(LayoutPreset::PictureInPicture));
        assert_eq!(app.compositor().player_rects().len(), 2);
        assert_eq!(driver.mouse_capture(), Some(true));

        app.handle_event(&press(KeyCode::Char('h')));
        assert!(app.compositor().is_focus_highlighting_enabled());
    }

    #[test]
    fn unbound_keys_reach_the_pane_under_the_pointer() {
        let mut app = app(LayoutPreset::TwoPlayerHorizontal);
        app.handle_event(&mouse(MouseEventKind::Moved, 40, 20));
        app.handle_event(&press(KeyCode::Char('w')));
        let (_, outcome) = app.last_route().unwrap();
        assert_eq!(outcome.target(), Some(PlayerSlot::new(1)));
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut app = app(LayoutPreset::SingleFullscreen);
        let quit = Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL));
        assert_eq!(app.handle_event(&quit), ControlFlow::Quit);
    }
}

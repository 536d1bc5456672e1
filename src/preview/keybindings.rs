use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    // Focus
    FocusNext,
    FocusPrev,
    FocusSlot(u32),
    ToggleHighlight,
    ToggleClickToFocus,
    // Layout presets
    NextPreset,
    PrevPreset,
    ToggleHelp,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Quit => write!(f, "Quit"),
            Action::FocusNext => write!(f, "Focus next pane"),
            Action::FocusPrev => write!(f, "Focus previous pane"),
            Action::FocusSlot(slot) => write!(f, "Focus player {slot}"),
            Action::ToggleHighlight => write!(f, "Toggle focus highlight"),
            Action::ToggleClickToFocus => write!(f, "Toggle click-to-focus"),
            Action::NextPreset => write!(f, "Next layout preset"),
            Action::PrevPreset => write!(f, "Previous layout preset"),
            Action::ToggleHelp => write!(f, "Toggle help"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        // Terminals disagree on whether '?' carries SHIFT.
        let mods = match key.code {
            KeyCode::Char(c) if !c.is_ascii_alphabetic() => {
                key.modifiers.difference(KeyModifiers::SHIFT)
            }
            _ => key.modifiers,
        };
        key.code == self.code && mods == self.mods
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.mods.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.mods.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        let code = match self.code {
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => "BackTab".to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::F(n) => format!("F{}", n),
            _ => format!("{:?}", self.code),
        };
        parts.push(code);
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<KeyCombo>>,
    order: Vec<Action>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use Action::*;
        let mut kb = Self::new();
        kb.add(
            Quit,
            KeyCombo::new(KeyCode::Char('q'), KeyModifiers::CONTROL),
        );
        kb.add(FocusNext, KeyCombo::plain(KeyCode::Tab));
        kb.add(FocusPrev, KeyCombo::plain(KeyCode::BackTab));
        kb.add(FocusPrev, KeyCombo::new(KeyCode::BackTab, KeyModifiers::SHIFT));
        for slot in 0..9u32 {
            let digit = char::from_digit(slot + 1, 10).unwrap_or('1');
            kb.add(FocusSlot(slot), KeyCombo::plain(KeyCode::Char(digit)));
        }
        kb.add(ToggleHighlight, KeyCombo::plain(KeyCode::Char('h')));
        kb.add(ToggleClickToFocus, KeyCombo::plain(KeyCode::Char('c')));
        kb.add(NextPreset, KeyCombo::plain(KeyCode::Char('n')));
        kb.add(PrevPreset, KeyCombo::plain(KeyCode::Char('p')));
        kb.add(ToggleHelp, KeyCombo::plain(KeyCode::Char('?')));
        kb.add(ToggleHelp, KeyCombo::plain(KeyCode::F(1)));
        kb
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        if !self.map.contains_key(&action) {
            self.order.push(action);
        }
        self.map.entry(action).or_default().push(combo);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        self.map
            .get(&action)
            .is_some_and(|list| list.iter().any(|c| c.matches(key)))
    }

    /// First bound action for `key`, in registration order.
    pub fn action_for_key(&self, key: &KeyEvent) -> Option<Action> {
        self.order
            .iter()
            .copied()
            .find(|action| self.matches(*action, key))
    }

    pub fn combos_for(&self, action: Action) -> &[KeyCombo] {
        self.map.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }

    /// One `(keys, description)` row per action; per-slot focus bindings are
    /// folded into a single row.
    pub fn help_entries(&self) -> Vec<(String, String)> {
        let mut entries = Vec::new();
        let mut slot_keys: Vec<String> = Vec::new();
        for action in &self.order {
            let keys: Vec<String> = self
                .combos_for(*action)
                .iter()
                .map(KeyCombo::display)
                .collect();
            if let Action::FocusSlot(_) = action {
                slot_keys.extend(keys);
                continue;
            }
            entries.push((keys.join(" / "), action.to_string()));
        }
        if let (Some(first), Some(last)) = (slot_keys.first(), slot_keys.last()) {
            entries.push((format!("{first}-{last}"), "Focus player by number".to_string()));
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    #[test]
    fn default_bindings_resolve() {
        let kb = KeyBindings::default();
        assert_eq!(
            kb.action_for_key(&key(KeyCode::Char('q'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        assert_eq!(
            kb.action_for_key(&key(KeyCode::Char('3'), KeyModifiers::NONE)),
            Some(Action::FocusSlot(2))
        );
        assert_eq!(
            kb.action_for_key(&key(KeyCode::BackTab, KeyModifiers::SHIFT)),
            Some(Action::FocusPrev)
        );
        assert_eq!(kb.action_for_key(&key(KeyCode::Char('w'), KeyModifiers::NONE)), None);
        // Plain 'q' is player input, not quit.
        assert_eq!(kb.action_for_key(&key(KeyCode::Char('q'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn shifted_punctuation_matches() {
        let kb = KeyBindings::default();
        assert!(kb.matches(Action::ToggleHelp, &key(KeyCode::Char('?'), KeyModifiers::SHIFT)));
        assert!(!kb.matches(
            Action::ToggleHighlight,
            &key(KeyCode::Char('h'), KeyModifiers::SHIFT)
        ));
    }

    #[test]
    fn help_folds_slot_bindings() {
        let entries = KeyBindings::default().help_entries();
        assert_eq!(entries.first().map(|e| e.0.as_str()), Some("Ctrl+Q"));
        assert!(entries.iter().any(|(keys, _)| keys == "1-9"));
        assert!(!entries.iter().any(|(_, desc)| desc.starts_with("Focus player 0")));
    }
}

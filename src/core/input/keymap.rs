//! Mode-independent key bindings

use super::RawKey;
use std::collections::HashMap;
use std::fmt;

/// One-shot action bound to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Leave the session
    Quit,
    /// Discard the input buffer
    Cancel,
    /// Clear the output
    ClearScreen,
    /// List the key bindings
    Help,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quit => write!(f, "quit"),
            Self::Cancel => write!(f, "discard input"),
            Self::ClearScreen => write!(f, "clear screen"),
            Self::Help => write!(f, "help"),
        }
    }
}

/// Multi-state setting cycled by a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toggle {
    /// Text / Hex / File
    InputMode,
    /// Line terminator appended to Text submissions
    LineEnding,
    /// Encoding of Text submissions
    Encoding,
}

impl fmt::Display for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputMode => write!(f, "input mode"),
            Self::LineEnding => write!(f, "line ending"),
            Self::Encoding => write!(f, "encoding"),
        }
    }
}

/// Action and toggle bindings
#[derive(Debug, Clone)]
pub struct KeyMap {
    actions: HashMap<RawKey, Action>,
    toggles: HashMap<RawKey, Toggle>,
}

impl KeyMap {
    /// A keymap without any bindings
    pub fn empty() -> Self {
        Self {
            actions: HashMap::new(),
            toggles: HashMap::new(),
        }
    }

    /// Bind `key` to an action, replacing any previous binding of the key
    pub fn bind_action(&mut self, key: RawKey, action: Action) {
        self.toggles.remove(&key);
        self.actions.insert(key, action);
    }

    /// Bind `key` to a toggle, replacing any previous binding of the key
    pub fn bind_toggle(&mut self, key: RawKey, toggle: Toggle) {
        self.actions.remove(&key);
        self.toggles.insert(key, toggle);
    }

    /// Action bound to `key`
    pub fn action(&self, key: RawKey) -> Option<Action> {
        self.actions.get(&key).copied()
    }

    /// Toggle bound to `key`
    pub fn toggle(&self, key: RawKey) -> Option<Toggle> {
        self.toggles.get(&key).copied()
    }

    /// Human readable binding list, ordered by key code
    pub fn describe(&self) -> Vec<String> {
        let mut lines: Vec<(u32, String)> = self
            .actions
            .iter()
            .map(|(key, action)| (key.code(), format!("{:>8}  {action}", key.to_string())))
            .chain(
                self.toggles
                    .iter()
                    .map(|(key, toggle)| (key.code(), format!("{:>8}  cycle {toggle}", key.to_string()))),
            )
            .collect();
        lines.sort();
        lines.into_iter().map(|(_, line)| line).collect()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        let mut keymap = Self::empty();
        keymap.bind_action(RawKey::F(1), Action::Help);
        keymap.bind_toggle(RawKey::F(2), Toggle::InputMode);
        keymap.bind_toggle(RawKey::F(3), Toggle::LineEnding);
        keymap.bind_toggle(RawKey::F(4), Toggle::Encoding);
        keymap.bind_action(RawKey::F(5), Action::ClearScreen);
        keymap.bind_action(RawKey::Escape, Action::Cancel);
        keymap.bind_action(RawKey::F(10), Action::Quit);
        keymap.bind_action(RawKey::Byte(0x11), Action::Quit);
        keymap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let keymap = KeyMap::default();
        assert_eq!(keymap.action(RawKey::Byte(0x11)), Some(Action::Quit));
        assert_eq!(keymap.toggle(RawKey::F(3)), Some(Toggle::LineEnding));
        assert_eq!(keymap.action(RawKey::F(3)), None);
        assert_eq!(keymap.toggle(RawKey::F(9)), None);
    }

    #[test]
    fn test_rebinding_replaces() {
        let mut keymap = KeyMap::default();
        keymap.bind_action(RawKey::F(2), Action::Quit);
        assert_eq!(keymap.toggle(RawKey::F(2)), None);
        assert_eq!(keymap.action(RawKey::F(2)), Some(Action::Quit));
    }

    #[test]
    fn test_describe_is_ordered() {
        let lines = KeyMap::default().describe();
        assert_eq!(lines.len(), 8);
        assert!(lines[0].ends_with("quit"));
        assert!(lines[0].contains("Ctrl+Q"));
        assert!(lines.last().unwrap().contains("F10"));
    }
}

//! Key binding matching.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Simplified key representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
    Other,
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self {
        match code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Escape,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Tab => Key::Tab,
            KeyCode::BackTab => Key::BackTab,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::F(n) => Key::F(n),
            _ => Key::Other,
        }
    }
}

/// Key modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl From<KeyModifiers> for Modifiers {
    fn from(mods: KeyModifiers) -> Self {
        Self {
            ctrl: mods.contains(KeyModifiers::CONTROL),
            alt: mods.contains(KeyModifiers::ALT),
            shift: mods.contains(KeyModifiers::SHIFT),
        }
    }
}

/// A processed key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl From<KeyEvent> for InputEvent {
    fn from(event: KeyEvent) -> Self {
        Self {
            key: Key::from(event.code),
            modifiers: Modifiers::from(event.modifiers),
        }
    }
}

impl InputEvent {
    /// Check if this matches a binding such as `q`, `Ctrl+r` or `PageDown`.
    ///
    /// Shift is not compared for symbol keys like `?`, which most terminals
    /// report with the shift modifier set.
    pub fn matches(&self, binding: &str) -> bool {
        let mut expected = Modifiers::default();
        let mut expected_key = "";

        for part in binding.split('+') {
            match part.to_lowercase().as_str() {
                "ctrl" => expected.ctrl = true,
                "alt" => expected.alt = true,
                "shift" => expected.shift = true,
                _ => expected_key = part,
            }
        }

        let symbol = matches!(self.key, Key::Char(c) if !c.is_alphanumeric());
        if self.modifiers.ctrl != expected.ctrl
            || self.modifiers.alt != expected.alt
            || (!symbol && self.modifiers.shift != expected.shift)
        {
            return false;
        }

        let key = match expected_key.to_lowercase().as_str() {
            "enter" => Key::Enter,
            "esc" | "escape" => Key::Escape,
            "backspace" => Key::Backspace,
            "tab" => Key::Tab,
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            "home" => Key::Home,
            "end" => Key::End,
            "pageup" => Key::PageUp,
            "pagedown" => Key::PageDown,
            s if s.len() > 1 && s.starts_with('f') => match s[1..].parse::<u8>() {
                Ok(n) => Key::F(n),
                Err(_) => return false,
            },
            _ => {
                let mut chars = expected_key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => {
                        return self.key == Key::Char(c.to_ascii_lowercase())
                            || self.key == Key::Char(c.to_ascii_uppercase());
                    }
                    _ => return false,
                }
            }
        };
        self.key == key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> InputEvent {
        InputEvent::from(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_plain_and_modified_keys() {
        let q = press(KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(q.matches("q"));
        assert!(!q.matches("Ctrl+q"));
        assert!(!q.matches("x"));

        let ctrl_r = press(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert!(ctrl_r.matches("Ctrl+r"));
        assert!(!ctrl_r.matches("r"));
    }

    #[test]
    fn test_named_keys() {
        assert!(press(KeyCode::PageDown, KeyModifiers::NONE).matches("PageDown"));
        assert!(press(KeyCode::Esc, KeyModifiers::NONE).matches("esc"));
        assert!(press(KeyCode::F(5), KeyModifiers::NONE).matches("F5"));
        assert!(!press(KeyCode::F(5), KeyModifiers::NONE).matches("F6"));
    }

    #[test]
    fn test_shifted_symbol_matches() {
        assert!(press(KeyCode::Char('?'), KeyModifiers::SHIFT).matches("?"));
        assert!(press(KeyCode::Char('?'), KeyModifiers::NONE).matches("?"));
        assert!(!press(KeyCode::Char('Q'), KeyModifiers::SHIFT).matches("q"));
    }
}

//! Key chord parsing and matching for command triggers.
//!
//! Each custom command declares its trigger as a list of key spec strings
//! (`["U", "ctrl+d"]`). A spec is `+`-separated modifiers followed by a key
//! name, and the list is a set of alternatives: any one of them fires the
//! command. Malformed specs never fail compilation; they are skipped with a
//! warning and the command simply cannot fire through that spec.
//!
//! Normalization makes `"D"` and `"shift+d"` the same chord on both the spec
//! side and the event side, so triggers behave the same regardless of how
//! the terminal reports shifted characters.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

// ---------------------------------------------------------------------------
// KeyPattern: one normalized chord
// ---------------------------------------------------------------------------

/// A single normalized key chord.
///
/// Character chords are stored lowercase with SHIFT set for uppercase input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPattern {
    code: KeyCode,
    modifiers: KeyModifiers,
}

impl KeyPattern {
    /// Normalize an incoming terminal event into a comparable pattern.
    ///
    /// Returns `None` for events that can never trigger a command: release
    /// and repeat events, and bare modifier presses.
    pub fn from_event(event: &KeyEvent) -> Option<Self> {
        if event.kind != KeyEventKind::Press {
            return None;
        }
        match event.code {
            KeyCode::Modifier(_) => None,
            KeyCode::Char(c) => Some(Self::from_char(c, event.modifiers)),
            code => Some(Self {
                code,
                modifiers: event.modifiers,
            }),
        }
    }

    /// True when this chord equals the normalized event.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        Self::from_event(event) == Some(*self)
    }

    fn from_char(c: char, mut modifiers: KeyModifiers) -> Self {
        if c.is_uppercase() {
            modifiers |= KeyModifiers::SHIFT;
        }
        Self {
            code: KeyCode::Char(c.to_ascii_lowercase()),
            modifiers,
        }
    }
}

// ---------------------------------------------------------------------------
// Spec parsing
// ---------------------------------------------------------------------------

/// Parse one key spec token like `"d"`, `"ctrl+d"`, or `"shift+tab"`.
///
/// Modifier and key names are case-insensitive. The error carries a
/// human-readable description for lint output.
pub fn parse_key_token(raw: &str) -> Result<KeyPattern, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("empty key spec".to_string());
    }

    let parts: Vec<&str> = trimmed.split('+').collect();
    let (modifier_parts, key_part) = parts.split_at(parts.len() - 1);

    let mut modifiers = KeyModifiers::NONE;
    for part in modifier_parts {
        match part.trim().to_ascii_lowercase().as_str() {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "alt" => modifiers |= KeyModifiers::ALT,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            other => return Err(format!("unknown modifier `{other}` in `{raw}`")),
        }
    }

    let key = key_part[0].trim();
    let code = match key.to_ascii_lowercase().as_str() {
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "insert" => KeyCode::Insert,
        "space" => KeyCode::Char(' '),
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        name => {
            if let Some(n) = name.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                if (1..=12).contains(&n) {
                    KeyCode::F(n)
                } else {
                    return Err(format!("function key out of range in `{raw}`"));
                }
            } else {
                // Single character, in its original case so `"D"` normalizes
                // to shift+d.
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => return Ok(KeyPattern::from_char(c, modifiers)),
                    _ => return Err(format!("unknown key `{key}` in `{raw}`")),
                }
            }
        }
    };

    Ok(KeyPattern { code, modifiers })
}

// ---------------------------------------------------------------------------
// KeyTrigger: alternative chords plus help text
// ---------------------------------------------------------------------------

/// Compiled trigger for one command.
///
/// Holds the parsed alternatives, the joined raw spec text for help footers,
/// and the help label (the command name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTrigger {
    patterns: Vec<KeyPattern>,
    keys_label: String,
    help: String,
}

impl KeyTrigger {
    /// Compile key specs into a trigger.
    ///
    /// Never fails: malformed specs are skipped with a warning and the
    /// trigger keeps the remaining alternatives, possibly none. A trigger
    /// with no alternatives matches no event.
    pub fn compile(specs: &[String], help: impl Into<String>) -> Self {
        let help = help.into();
        let mut patterns = Vec::with_capacity(specs.len());
        for spec in specs {
            match parse_key_token(spec) {
                Ok(pattern) => patterns.push(pattern),
                Err(reason) => {
                    tracing::warn!(
                        command = %help,
                        spec = %spec,
                        %reason,
                        "skipping unparseable key spec"
                    );
                }
            }
        }
        Self {
            patterns,
            keys_label: specs.join("/"),
            help,
        }
    }

    /// True when any alternative matches the normalized event.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        let Some(incoming) = KeyPattern::from_event(event) else {
            return false;
        };
        self.patterns.iter().any(|pattern| *pattern == incoming)
    }

    /// True when no spec parsed; such a trigger can never fire.
    pub fn is_unbound(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Joined raw specs for help footers (`"u/ctrl+d"`).
    pub fn keys_label(&self) -> &str {
        &self.keys_label
    }

    /// Help label (the command name).
    pub fn help(&self) -> &str {
        &self.help
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

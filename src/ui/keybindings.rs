//! Keyboard shortcuts registry.
//!
//! Single source of truth for the keys the walkthrough TUI reacts to. The
//! help dialog renders it; the app loop matches the same keys.

use crossterm::event::KeyCode;

/// A keyboard shortcut definition
#[derive(Debug, Clone)]
pub struct Shortcut {
    /// Primary key for this shortcut
    pub key: KeyCode,
    /// Alternative key (e.g., a letter for an arrow key)
    pub alt_key: Option<KeyCode>,
    /// Human-readable description of what this shortcut does
    pub description: &'static str,
    /// Category for grouping in help
    pub category: ShortcutCategory,
    /// Context where this shortcut is active
    pub context: ShortcutContext,
}

/// Categories for organizing shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutCategory {
    General,
    Navigation,
    Controls,
}

/// Contexts where shortcuts are active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutContext {
    /// Moving between steps
    Steps,
    /// Typing into a simulated input field
    Input,
}

impl ShortcutCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            ShortcutCategory::General => "General",
            ShortcutCategory::Navigation => "Navigation",
            ShortcutCategory::Controls => "Controls",
        }
    }

    /// All categories in display order
    pub fn all() -> &'static [ShortcutCategory] {
        &[
            ShortcutCategory::General,
            ShortcutCategory::Navigation,
            ShortcutCategory::Controls,
        ]
    }
}

impl ShortcutContext {
    pub fn display_name(&self) -> &'static str {
        match self {
            ShortcutContext::Steps => "Steps",
            ShortcutContext::Input => "In an input field",
        }
    }

    /// All contexts in display order
    pub fn all() -> &'static [ShortcutContext] {
        &[ShortcutContext::Steps, ShortcutContext::Input]
    }
}

impl Shortcut {
    /// Format key for display (e.g., "q", "Tab", "→/n")
    pub fn key_display(&self) -> String {
        let primary = format_keycode(&self.key);
        match &self.alt_key {
            Some(alt) => format!("{}/{}", primary, format_keycode(alt)),
            None => primary,
        }
    }

    /// Format key for help dialog (left-padded to 9 chars)
    pub fn key_display_padded(&self) -> String {
        format!("{:<9}", self.key_display())
    }
}

/// Format a `KeyCode` for display
fn format_keycode(key: &KeyCode) -> String {
    match key {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::Delete => "Del".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        _ => format!("{key:?}"),
    }
}

/// Static registry of all keyboard shortcuts
pub static SHORTCUTS: &[Shortcut] = &[
    // === Steps ===
    Shortcut {
        key: KeyCode::Char('q'),
        alt_key: None,
        description: "Quit",
        category: ShortcutCategory::General,
        context: ShortcutContext::Steps,
    },
    Shortcut {
        key: KeyCode::Char('?'),
        alt_key: None,
        description: "Toggle help",
        category: ShortcutCategory::General,
        context: ShortcutContext::Steps,
    },
    Shortcut {
        key: KeyCode::Right,
        alt_key: Some(KeyCode::Char('n')),
        description: "Next step (start over on the last step)",
        category: ShortcutCategory::Navigation,
        context: ShortcutContext::Steps,
    },
    Shortcut {
        key: KeyCode::Left,
        alt_key: Some(KeyCode::Char('p')),
        description: "Previous step",
        category: ShortcutCategory::Navigation,
        context: ShortcutContext::Steps,
    },
    Shortcut {
        key: KeyCode::Home,
        alt_key: None,
        description: "Start over",
        category: ShortcutCategory::Navigation,
        context: ShortcutContext::Steps,
    },
    Shortcut {
        key: KeyCode::Up,
        alt_key: Some(KeyCode::Down),
        description: "Scroll the step",
        category: ShortcutCategory::Navigation,
        context: ShortcutContext::Steps,
    },
    Shortcut {
        key: KeyCode::Tab,
        alt_key: None,
        description: "Focus the step's input field",
        category: ShortcutCategory::Controls,
        context: ShortcutContext::Steps,
    },
    Shortcut {
        key: KeyCode::Char('h'),
        alt_key: Some(KeyCode::Char('l')),
        description: "Scroll the table left/right",
        category: ShortcutCategory::Controls,
        context: ShortcutContext::Steps,
    },
    Shortcut {
        key: KeyCode::Char('j'),
        alt_key: Some(KeyCode::Char('k')),
        description: "Move the table or tree cursor",
        category: ShortcutCategory::Controls,
        context: ShortcutContext::Steps,
    },
    Shortcut {
        key: KeyCode::Char(' '),
        alt_key: None,
        description: "Toggle the selected row",
        category: ShortcutCategory::Controls,
        context: ShortcutContext::Steps,
    },
    Shortcut {
        key: KeyCode::Char('a'),
        alt_key: None,
        description: "Toggle all rows",
        category: ShortcutCategory::Controls,
        context: ShortcutContext::Steps,
    },
    Shortcut {
        key: KeyCode::Char('['),
        alt_key: Some(KeyCode::Char(']')),
        description: "Previous/next tab",
        category: ShortcutCategory::Controls,
        context: ShortcutContext::Steps,
    },
    Shortcut {
        key: KeyCode::Char('t'),
        alt_key: None,
        description: "Expand or collapse the tree node",
        category: ShortcutCategory::Controls,
        context: ShortcutContext::Steps,
    },
    Shortcut {
        key: KeyCode::Enter,
        alt_key: None,
        description: "Activate the clickable row",
        category: ShortcutCategory::Controls,
        context: ShortcutContext::Steps,
    },
    // === Input ===
    Shortcut {
        key: KeyCode::Enter,
        alt_key: None,
        description: "Check the entered value",
        category: ShortcutCategory::General,
        context: ShortcutContext::Input,
    },
    Shortcut {
        key: KeyCode::Esc,
        alt_key: None,
        description: "Leave the field",
        category: ShortcutCategory::General,
        context: ShortcutContext::Input,
    },
    Shortcut {
        key: KeyCode::Tab,
        alt_key: None,
        description: "Next field",
        category: ShortcutCategory::Navigation,
        context: ShortcutContext::Input,
    },
    Shortcut {
        key: KeyCode::Left,
        alt_key: Some(KeyCode::Right),
        description: "Move the cursor",
        category: ShortcutCategory::Navigation,
        context: ShortcutContext::Input,
    },
];

/// Get all shortcuts for a given context
pub fn shortcuts_for_context(context: ShortcutContext) -> impl Iterator<Item = &'static Shortcut> {
    SHORTCUTS.iter().filter(move |s| s.context == context)
}

/// Get shortcuts grouped by category for a given context
pub fn shortcuts_by_category_for_context(
    context: ShortcutContext,
) -> Vec<(ShortcutCategory, Vec<&'static Shortcut>)> {
    let mut result = Vec::new();
    for category in ShortcutCategory::all() {
        let shortcuts: Vec<&Shortcut> = shortcuts_for_context(context)
            .filter(|s| s.category == *category)
            .collect();
        if !shortcuts.is_empty() {
            result.push((*category, shortcuts));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_shortcuts_have_descriptions() {
        for shortcut in SHORTCUTS {
            assert!(
                !shortcut.description.is_empty(),
                "Shortcut {:?} has empty description",
                shortcut.key
            );
        }
    }

    #[test]
    fn test_key_display_with_alt() {
        let shortcut = Shortcut {
            key: KeyCode::Right,
            alt_key: Some(KeyCode::Char('n')),
            description: "Test",
            category: ShortcutCategory::Navigation,
            context: ShortcutContext::Steps,
        };
        assert_eq!(shortcut.key_display(), "→/n");
        assert_eq!(shortcut.key_display_padded(), "→/n      ");
    }

    #[test]
    fn test_key_display_special_keys() {
        assert_eq!(format_keycode(&KeyCode::Char(' ')), "Space");
        assert_eq!(format_keycode(&KeyCode::Enter), "Enter");
        assert_eq!(format_keycode(&KeyCode::Home), "Home");
    }

    #[test]
    fn test_no_duplicate_keys_per_context() {
        for context in ShortcutContext::all() {
            let mut keys: Vec<KeyCode> = Vec::new();
            for shortcut in shortcuts_for_context(*context) {
                for key in std::iter::once(shortcut.key).chain(shortcut.alt_key) {
                    assert!(!keys.contains(&key), "{key:?} bound twice in {context:?}");
                    keys.push(key);
                }
            }
        }
    }

    #[test]
    fn test_grouping_keeps_category_order() {
        let grouped = shortcuts_by_category_for_context(ShortcutContext::Steps);
        let categories: Vec<_> = grouped.iter().map(|(cat, _)| *cat).collect();
        assert_eq!(
            categories,
            vec![
                ShortcutCategory::General,
                ShortcutCategory::Navigation,
                ShortcutCategory::Controls
            ]
        );
    }
}

//! User configuration — keybindings and timing knobs.
//!
//! Stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/treebar/config.toml` (default `~/.config/treebar/config.toml`).
//! A default file is written on first run so users have something to edit.

use std::collections::HashMap;
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveUp,
    MoveDown,
    ToggleFolder,
    AddFile,
    AddFolder,
    AddRootFile,
    AddRootFolder,
    FindFolder,
    CollapseAll,
    ToggleContent,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used when serializing the config file).
    pub const ALL: &[Action] = &[
        Action::MoveUp,
        Action::MoveDown,
        Action::ToggleFolder,
        Action::AddFile,
        Action::AddFolder,
        Action::AddRootFile,
        Action::AddRootFolder,
        Action::FindFolder,
        Action::CollapseAll,
        Action::ToggleContent,
        Action::Quit,
    ];

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::MoveUp => "move_up",
            Action::MoveDown => "move_down",
            Action::ToggleFolder => "toggle_folder",
            Action::AddFile => "add_file",
            Action::AddFolder => "add_folder",
            Action::AddRootFile => "add_root_file",
            Action::AddRootFolder => "add_root_folder",
            Action::FindFolder => "find_folder",
            Action::CollapseAll => "collapse_all",
            Action::ToggleContent => "toggle_content",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        match s {
            "move_up" => Some(Action::MoveUp),
            "move_down" => Some(Action::MoveDown),
            "toggle_folder" => Some(Action::ToggleFolder),
            "add_file" => Some(Action::AddFile),
            "add_folder" => Some(Action::AddFolder),
            "add_root_file" => Some(Action::AddRootFile),
            "add_root_folder" => Some(Action::AddRootFolder),
            "find_folder" => Some(Action::FindFolder),
            "collapse_all" => Some(Action::CollapseAll),
            "toggle_content" => Some(Action::ToggleContent),
            "quit" => Some(Action::Quit),
            _ => None,
        }
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding — key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Does this binding match a key event?  Only CTRL/ALT/SHIFT modifiers
    /// are compared (platform-specific modifiers like SUPER are ignored).
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mask = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT;
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    /// User-friendly display string (e.g. `"Ctrl+c"`, `"↑"`, `"q"`).
    pub fn display(&self) -> String {
        let mut s = String::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            s.push_str("Ctrl+");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            s.push_str("Alt+");
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) && !matches!(self.code, KeyCode::Char(_)) {
            s.push_str("Shift+");
        }
        s.push_str(&match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Up => "↑".into(),
            KeyCode::Down => "↓".into(),
            KeyCode::Left => "←".into(),
            KeyCode::Right => "→".into(),
            KeyCode::Enter => "Enter".into(),
            KeyCode::Esc => "Esc".into(),
            other => format!("{other:?}"),
        });
        s
    }

    /// Serialise to config-file format (e.g. `"Ctrl+c"`, `"Up"`, `"q"`).
    fn to_config_string(&self) -> String {
        let mut s = String::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            s.push_str("Ctrl+");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            s.push_str("Alt+");
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) && !matches!(self.code, KeyCode::Char(_)) {
            s.push_str("Shift+");
        }
        s.push_str(&match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Up => "Up".into(),
            KeyCode::Down => "Down".into(),
            KeyCode::Left => "Left".into(),
            KeyCode::Right => "Right".into(),
            KeyCode::Enter => "Enter".into(),
            KeyCode::Esc => "Esc".into(),
            KeyCode::Tab => "Tab".into(),
            other => format!("{other:?}"),
        });
        s
    }

    /// Parse a key string like `"Ctrl+c"`, `"Up"`, `"q"`, `"Enter"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let parts: Vec<&str> = s.split('+').collect();
        let key_part = parts.last()?;

        for &part in &parts[..parts.len() - 1] {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "space" => KeyCode::Char(' '),
            _ if key_part.len() == 1 => {
                // Preserve the original case; uppercase letters arrive as
                // shifted Char events.
                let c = key_part.chars().next()?;
                if c.is_ascii_uppercase() {
                    modifiers |= KeyModifiers::SHIFT;
                }
                KeyCode::Char(c)
            }
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

// ───────────────────────────────────────── config ────────────

/// Application configuration — keybindings and timing knobs.
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// How long a just-blurred inline input survives before it is removed,
    /// leaving room for a click on its confirm glyph to land first.
    pub blur_grace_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            blur_grace_ms: 80,
        }
    }
}

impl AppConfig {
    /// Hard-coded default bindings.
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let sh = KeyModifiers::SHIFT;
        let mut m = HashMap::new();

        m.insert(MoveUp, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]);
        m.insert(MoveDown, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]);
        m.insert(ToggleFolder, vec![KeyBind::new(Enter, n), KeyBind::new(Char(' '), n)]);
        m.insert(AddFile, vec![KeyBind::new(Char('f'), n)]);
        m.insert(AddFolder, vec![KeyBind::new(Char('d'), n)]);
        m.insert(AddRootFile, vec![KeyBind::new(Char('F'), sh)]);
        m.insert(AddRootFolder, vec![KeyBind::new(Char('D'), sh)]);
        m.insert(FindFolder, vec![KeyBind::new(Char('/'), n)]);
        m.insert(CollapseAll, vec![KeyBind::new(Char('c'), n)]);
        m.insert(ToggleContent, vec![KeyBind::new(Char('z'), n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n)]);

        m
    }

    /// Find the action that matches a key event.  When multiple bindings
    /// match, the one with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        let mut best: Option<Action> = None;
        let mut best_mod_count = 0;

        for (&action, binds) in &self.bindings {
            for bind in binds {
                if bind.matches(event) {
                    let mc = bind.modifiers.bits().count_ones();
                    if best.is_none() || mc > best_mod_count {
                        best = Some(action);
                        best_mod_count = mc;
                    }
                }
            }
        }
        best
    }

    /// Short display of the first binding only (for the status bar).
    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}: toggle | {}/{}: add file/folder | {}: find | {}: collapse | {}: quit",
            self.short_binding(Action::ToggleFolder),
            self.short_binding(Action::AddFile),
            self.short_binding(Action::AddFolder),
            self.short_binding(Action::FindFolder),
            self.short_binding(Action::CollapseAll),
            self.short_binding(Action::Quit),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from disk.  Missing file: write the defaults so the user
    /// has a template to edit, then return them.
    pub fn load() -> Self {
        let path = config_path();
        if path.exists() {
            if let Ok(contents) = std::fs::read_to_string(&path) {
                return Self::parse_config(&contents);
            }
        }
        let config = Self::default();
        if let Err(err) = config.save() {
            tracing::debug!("could not write default config: {err}");
        }
        config
    }

    /// Persist current config to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.serialise())?;
        Ok(())
    }

    fn parse_config(s: &str) -> Self {
        let mut config = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            if key == "blur_grace_ms" {
                if let Ok(v) = value.parse::<u64>() {
                    // Bounded so a typo can't make inputs vanish instantly
                    // or linger for seconds.
                    config.blur_grace_ms = v.clamp(30, 500);
                }
                continue;
            }

            let Some(action) = Action::from_config_key(key) else {
                continue;
            };

            let mut parsed = Vec::new();
            for part in value.split(',') {
                let part = part.trim().trim_matches('"');
                if let Some(bind) = KeyBind::parse(part) {
                    parsed.push(bind);
                }
            }
            if !parsed.is_empty() {
                config.bindings.insert(action, parsed);
            }
        }

        config
    }

    fn serialise(&self) -> String {
        let mut lines = vec![
            "# treebar configuration".to_string(),
            String::new(),
            "# Timing".to_string(),
            format!("blur_grace_ms = {}", self.blur_grace_ms),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            "# Special keys: Up, Down, Left, Right, Enter, Esc, Tab, Space".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(|b| b.to_config_string()).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/treebar/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("treebar").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_round_trip_through_the_config_format() {
        let config = AppConfig::default();
        let parsed = AppConfig::parse_config(&config.serialise());
        for &action in Action::ALL {
            assert_eq!(parsed.bindings[&action], config.bindings[&action]);
        }
        assert_eq!(parsed.blur_grace_ms, config.blur_grace_ms);
    }

    #[test]
    fn match_key_prefers_more_modifiers() {
        let config = AppConfig::default();
        let shift_f = KeyEvent::new(KeyCode::Char('F'), KeyModifiers::SHIFT);
        assert_eq!(config.match_key(shift_f), Some(Action::AddRootFile));
        let plain_f = KeyEvent::new(KeyCode::Char('f'), KeyModifiers::NONE);
        assert_eq!(config.match_key(plain_f), Some(Action::AddFile));
    }

    #[test]
    fn blur_grace_is_clamped() {
        let parsed = AppConfig::parse_config("blur_grace_ms = 99999\n");
        assert_eq!(parsed.blur_grace_ms, 500);
        let parsed = AppConfig::parse_config("blur_grace_ms = 1\n");
        assert_eq!(parsed.blur_grace_ms, 30);
    }
}

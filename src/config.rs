//! Runner settings.
//!
//! Resolution order, last wins: built-in defaults, `brainfry.toml` in the XDG
//! config home, then `BRAINFRY_*` environment variables. A broken config
//! never stops a program from running; problems are logged and the defaults
//! stay in place.
//!
//! Log filtering is not a setting: the subscriber reads [`ENV_LOG`] directly
//! so it is live before the config file is parsed.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::OnceLock;

use cross_xdg::BaseDirs;
use serde::Deserialize;

use crate::engine::TAPE_LEN;
use crate::theme::{Colors, parse_color};

pub const CONFIG_FILE: &str = "brainfry.toml";

pub const ENV_TAPE_LEN: &str = "BRAINFRY_TAPE_LEN";
pub const ENV_MAX_STEPS: &str = "BRAINFRY_MAX_STEPS";
pub const ENV_DEBUG: &str = "BRAINFRY_DEBUG";
pub const ENV_LOG: &str = "BRAINFRY_LOG";

/// Effective settings after defaults, file and environment are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub tape_len: usize,
    /// `None` runs without a step limit.
    pub max_steps: Option<usize>,
    /// Print the step table instead of performing I/O.
    pub debug: bool,
    pub colors: Colors,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tape_len: TAPE_LEN,
            max_steps: None,
            debug: false,
            colors: Colors::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    interpreter: InterpreterSection,
    colors: ColorSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct InterpreterSection {
    tape_len: Option<usize>,
    max_steps: Option<usize>,
    debug: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ColorSection {
    error: Option<String>,
    caret: Option<String>,
    program: Option<String>,
}

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Process-wide settings, loaded on first use.
pub fn settings() -> &'static Settings {
    SETTINGS.get_or_init(Settings::load)
}

impl Settings {
    /// Defaults, then the config file (if any), then the environment.
    pub fn load() -> Self {
        let mut settings = config_path()
            .and_then(|path| {
                let content = match fs::read_to_string(&path) {
                    Ok(content) => content,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                        return None;
                    }
                };
                match Self::from_toml(&content) {
                    Ok(s) => Some(s),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                        None
                    }
                }
            })
            .unwrap_or_default();
        settings.apply_env(|key| std::env::var(key).ok());
        settings
    }

    /// Parse a config file body on top of the defaults.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let file: FileConfig = toml::from_str(content)?;
        let mut settings = Self::default();

        if let Some(tape_len) = file.interpreter.tape_len {
            settings.set_tape_len(tape_len);
        }
        settings.max_steps = file.interpreter.max_steps.or(settings.max_steps);
        settings.debug = file.interpreter.debug.unwrap_or(settings.debug);

        let ColorSection { error, caret, program } = file.colors;
        apply_color(&mut settings.colors.error, "error", error);
        apply_color(&mut settings.colors.caret, "caret", caret);
        apply_color(&mut settings.colors.program, "program", program);

        Ok(settings)
    }

    /// Override settings from environment-style lookups. Unparsable values
    /// are logged and skipped.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_TAPE_LEN) {
            match raw.trim().parse::<usize>() {
                Ok(n) => self.set_tape_len(n),
                Err(_) => tracing::warn!(var = ENV_TAPE_LEN, value = %raw, "ignoring invalid tape length"),
            }
        }
        if let Some(raw) = lookup(ENV_MAX_STEPS) {
            match raw.trim().parse::<usize>() {
                Ok(n) => self.max_steps = Some(n),
                Err(_) => tracing::warn!(var = ENV_MAX_STEPS, value = %raw, "ignoring invalid step limit"),
            }
        }
        if let Some(raw) = lookup(ENV_DEBUG) {
            match parse_flag(&raw) {
                Some(flag) => self.debug = flag,
                None => tracing::warn!(var = ENV_DEBUG, value = %raw, "ignoring invalid debug flag"),
            }
        }
    }

    fn set_tape_len(&mut self, tape_len: usize) {
        if tape_len == 0 {
            tracing::warn!("tape length must be at least 1; keeping {}", self.tape_len);
            return;
        }
        self.tape_len = tape_len;
    }
}

/// `$XDG_CONFIG_HOME/brainfry.toml` (or the platform equivalent).
pub fn config_path() -> Option<PathBuf> {
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push(CONFIG_FILE);
    Some(path)
}

fn apply_color(slot: &mut nu_ansi_term::Color, key: &str, value: Option<String>) {
    let Some(value) = value else { return };
    match parse_color(&value) {
        Some(color) => *slot = color,
        None => tracing::warn!(key, value = %value, "ignoring unknown color"),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

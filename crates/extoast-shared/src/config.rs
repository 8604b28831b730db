use serde::Deserialize;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use toml_edit::DocumentMut;

use crate::models::{
    DurationPolicy, Gravity, LayoutDirection, DEFAULT_LONG_MS, DEFAULT_SHORT_MS,
};

/// Return XDG_DATA_HOME/extoast.
/// The `dirs` crate returns ~/Library/Application Support on macOS,
/// so we construct ~/.local/share directly for XDG compliance.
pub fn data_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg).join("extoast")
    } else {
        let home = std::env::var("HOME").expect("HOME not set");
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("extoast")
    }
}

/// Return the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("extoast.log")
}

/// Return XDG_CONFIG_HOME/extoast.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("extoast")
    } else {
        let home = std::env::var("HOME").expect("HOME not set");
        PathBuf::from(home).join(".config").join("extoast")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    pub editor: Option<String>,
    #[serde(default)]
    pub toast: ToastConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub log: LogConfig,
    /// Text resources addressable by id.
    #[serde(default)]
    pub strings: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToastConfig {
    #[serde(default = "default_short_ms")]
    pub short_ms: u64,
    #[serde(default = "default_long_ms")]
    pub long_ms: u64,
    #[serde(default = "default_gravity")]
    pub gravity: String,
    #[serde(default = "default_y_offset_dp")]
    pub y_offset_dp: f32,
    #[serde(default)]
    pub horizontal_margin: f32,
    #[serde(default)]
    pub vertical_margin: f32,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            short_ms: default_short_ms(),
            long_ms: default_long_ms(),
            gravity: default_gravity(),
            y_offset_dp: default_y_offset_dp(),
            horizontal_margin: 0.0,
            vertical_margin: 0.0,
        }
    }
}

impl ToastConfig {
    /// Canonical display windows. Falls back to the defaults when the
    /// configured pair is not `0 < short_ms < long_ms`.
    pub fn duration_policy(&self) -> DurationPolicy {
        DurationPolicy::new(self.short_ms, self.long_ms).unwrap_or_else(|| {
            log::warn!(
                "Invalid toast durations short_ms={} long_ms={}, using defaults",
                self.short_ms,
                self.long_ms
            );
            DurationPolicy::default()
        })
    }

    /// Default gravity for new toasts. Falls back to bottom-center on parse failure.
    pub fn gravity(&self) -> Gravity {
        self.gravity.parse().unwrap_or_else(|e| {
            log::warn!("{} in config.toml, using bottom", e);
            Gravity::BOTTOM_CENTER
        })
    }
}

fn default_short_ms() -> u64 {
    DEFAULT_SHORT_MS
}

fn default_long_ms() -> u64 {
    DEFAULT_LONG_MS
}

fn default_gravity() -> String {
    "bottom".to_string()
}

fn default_y_offset_dp() -> f32 {
    64.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_density")]
    pub density: f32,
    #[serde(default = "default_platform_level")]
    pub platform_level: u32,
    #[serde(default)]
    pub custom_skin: bool,
    #[serde(default)]
    pub rtl: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            density: default_density(),
            platform_level: default_platform_level(),
            custom_skin: false,
            rtl: false,
        }
    }
}

impl DisplayConfig {
    pub fn layout_direction(&self) -> LayoutDirection {
        if self.rtl {
            LayoutDirection::Rtl
        } else {
            LayoutDirection::Ltr
        }
    }
}

fn default_density() -> f32 {
    1.0
}

fn default_platform_level() -> u32 {
    28
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LogConfig {
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Return the path to config.toml.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load config.toml. Return defaults if the file is missing or fails to parse.
pub fn load_config() -> AppConfig {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> AppConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            log::warn!("Failed to parse config.toml: {}, using defaults", e);
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

/// Update [toast] short_ms/long_ms in config.toml, preserving existing comments and formatting.
pub fn save_toast_durations(short_ms: Option<u64>, long_ms: Option<u64>) -> io::Result<()> {
    save_toast_durations_to(&config_path(), short_ms, long_ms)
}

pub fn save_toast_durations_to(
    path: &Path,
    short_ms: Option<u64>,
    long_ms: Option<u64>,
) -> io::Result<()> {
    let content = std::fs::read_to_string(path).unwrap_or_default();
    let mut doc: DocumentMut = content.parse().unwrap_or_default();
    if let Some(ms) = short_ms {
        doc["toast"]["short_ms"] = toml_edit::value(ms as i64);
    }
    if let Some(ms) = long_ms {
        doc["toast"]["long_ms"] = toml_edit::value(ms as i64);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, doc.to_string())
}

/// Default config.toml template.
fn default_config_template() -> &'static str {
    r#"# extoast configuration

# Editor to open when running `extoast config`
# Falls back to $EDITOR environment variable, then vim
# editor = "vim"

# Toast display
[toast]
# Short display window in milliseconds (default: 1500)
# short_ms = 1500

# Long display window in milliseconds, must exceed short_ms (default: 2500)
# long_ms = 2500

# Default placement: top, bottom, center, plus left/right/start/end (default: bottom)
# gravity = "bottom"

# Distance from the anchored edge in density-independent units (default: 64)
# y_offset_dp = 64.0

# Margins as a fraction of the surface size (default: 0.0)
# horizontal_margin = 0.0
# vertical_margin = 0.0

# Simulated display environment
[display]
# Pixels per density-independent unit (default: 1.0)
# density = 1.0

# Platform level; 25 and above use the phone window type (default: 28)
# platform_level = 28

# Pretend the customized device skin is present (default: false)
# custom_skin = false

# Right-to-left layout direction (default: false)
# rtl = false

[log]
# off, error, warn, info, debug, trace (default: info)
# level = "info"

# Text resources usable with `extoast show --res <id>`
[strings]
# greeting = "Hello"
"#
}

/// Create config.toml with the default template if it does not exist. Return its path.
pub fn ensure_config_file() -> io::Result<PathBuf> {
    let path = config_path();
    if !path.exists() {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, default_config_template())?;
    }
    Ok(path)
}

/// Resolve the editor to use.
/// Priority: config.toml `editor` -> $EDITOR env var -> vim.
pub fn resolve_editor() -> String {
    let config = load_config();
    if let Some(ref editor) = config.editor {
        if !editor.is_empty() {
            return editor.clone();
        }
    }
    if let Ok(editor) = std::env::var("EDITOR") {
        if !editor.is_empty() {
            return editor;
        }
    }
    "vim".to_string()
}

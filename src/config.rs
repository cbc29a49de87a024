use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::fs;

use serde::Deserialize;
use directories::ProjectDirs;
use thiserror::Error;

use crate::model::RunMode;
use crate::theme::{self, ThemeColors};

pub const POWER_GROUP: &str = "power";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("theme '{theme}': invalid color '{value}' for {field}")]
    InvalidColor {
        theme: String,
        field: &'static str,
        value: String,
    },
}

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub commands: CommandKeywords,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub shortcuts: Vec<Shortcut>,
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
    #[serde(default)]
    pub themes: BTreeMap<String, ThemeColors>,
    /// Where this config was loaded from, if anywhere.
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_history_size")]
    pub history_size: usize,
    #[serde(default)]
    pub terminal: Option<String>,
    #[serde(default = "default_max_visible")]
    pub max_visible: usize,
    #[serde(default = "default_power_alias")]
    pub power_alias: String,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub run_in_terminal: bool,
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Regexes hiding applications by name or id.
    #[serde(default)]
    pub blacklist: Vec<String>,
}

fn default_history_size() -> usize { 50 }
fn default_max_visible() -> usize { 8 }
fn default_power_alias() -> String { "p".to_string() }
fn default_debounce_ms() -> u64 { 150 }
fn default_theme() -> String { theme::DEFAULT_THEME.to_string() }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            history_size: default_history_size(),
            terminal: None,
            max_visible: default_max_visible(),
            power_alias: default_power_alias(),
            debounce_ms: default_debounce_ms(),
            run_in_terminal: false,
            theme: default_theme(),
            blacklist: Vec::new(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct CommandKeywords {
    #[serde(default = "default_search")]
    pub search: String,
    #[serde(default = "default_config")]
    pub config: String,
    #[serde(default = "default_theme_keyword")]
    pub theme: String,
    #[serde(default = "default_run")]
    pub run: String,
}

fn default_search() -> String { "s".to_string() }
fn default_config() -> String { "c".to_string() }
fn default_theme_keyword() -> String { "t".to_string() }
fn default_run() -> String { "r".to_string() }

impl Default for CommandKeywords {
    fn default() -> Self {
        Self {
            search: default_search(),
            config: default_config(),
            theme: default_theme_keyword(),
            run: default_run(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
    /// Upper bound on paths scored per rebuild.
    #[serde(default = "default_max_scored")]
    pub max_scored: usize,
    /// Rows kept after scoring, larger than the visible window.
    #[serde(default = "default_display_cap")]
    pub display_cap: usize,
    /// Paths requested from the backend per scan.
    #[serde(default = "default_backend_limit")]
    pub backend_limit: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_min_query_len() -> usize { 2 }
fn default_max_scored() -> usize { 5000 }
fn default_display_cap() -> usize { 100 }
fn default_backend_limit() -> usize { 2000 }
fn default_max_depth() -> usize { 8 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_len: default_min_query_len(),
            max_scored: default_max_scored(),
            display_cap: default_display_cap(),
            backend_limit: default_backend_limit(),
            max_depth: default_max_depth(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ShortcutMode {
    Url,
    #[default]
    Shell,
    File,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    /// Keyword typed after ':'; group members may omit it.
    #[serde(default)]
    pub prefix: Option<String>,
    pub label: String,
    pub template: String,
    #[serde(default)]
    pub mode: ShortcutMode,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub run_mode: RunMode,
    #[serde(default)]
    pub stay_open: bool,
    #[serde(default)]
    pub icon: Option<String>,
}

impl Shortcut {
    pub fn shell(label: &str, command: &str) -> Self {
        Self {
            prefix: None,
            label: label.to_string(),
            template: command.to_string(),
            mode: ShortcutMode::Shell,
            group: None,
            run_mode: RunMode::Spawn,
            stay_open: false,
            icon: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum QueryMode {
    #[default]
    Filter,
    PassThrough,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GroupConfig {
    pub name: String,
    #[serde(default)]
    pub query_mode: QueryMode,
    #[serde(default)]
    pub icon: Option<String>,
}

fn default_power_shortcuts() -> Vec<Shortcut> {
    [
        ("Lock", "loginctl lock-session", "system-lock-screen"),
        ("Log out", "loginctl terminate-session \"$XDG_SESSION_ID\"", "system-log-out"),
        ("Suspend", "systemctl suspend", "system-suspend"),
        ("Reboot", "systemctl reboot", "system-reboot"),
        ("Shut down", "systemctl poweroff", "system-shutdown"),
    ]
    .into_iter()
    .map(|(label, command, icon)| {
        let mut shortcut = Shortcut::shell(label, command);
        shortcut.group = Some(POWER_GROUP.to_string());
        shortcut.icon = Some(icon.to_string());
        shortcut
    })
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        let mut config = Self {
            general: GeneralConfig::default(),
            commands: CommandKeywords::default(),
            search: SearchConfig::default(),
            shortcuts: Vec::new(),
            groups: Vec::new(),
            themes: BTreeMap::new(),
            path: None,
        };
        config.apply_defaults();
        config
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(content)?;
        config.apply_defaults();
        config.validate()?;
        Ok(config)
    }

    /// Adds the built-in power group and default theme when the file
    /// does not declare them.
    fn apply_defaults(&mut self) {
        if !self.groups.iter().any(|g| g.name == POWER_GROUP) {
            self.groups.push(GroupConfig {
                name: POWER_GROUP.to_string(),
                query_mode: QueryMode::Filter,
                icon: Some("system-shutdown".to_string()),
            });
        }
        let has_power_members = self
            .shortcuts
            .iter()
            .any(|s| s.group.as_deref() == Some(POWER_GROUP));
        if !has_power_members {
            self.shortcuts.extend(default_power_shortcuts());
        }
        if self.themes.is_empty() {
            self.themes
                .insert(theme::DEFAULT_THEME.to_string(), ThemeColors::default());
        }
    }

    /// Every theme color must resolve; the launcher cannot render otherwise.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, colors) in &self.themes {
            colors.resolve().map_err(|(field, value)| ConfigError::InvalidColor {
                theme: name.clone(),
                field,
                value,
            })?;
        }
        Ok(())
    }

    pub fn group(&self, name: &str) -> Option<&GroupConfig> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Shortcuts belonging to `group`, in declaration order.
    pub fn members<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Shortcut> + 'a {
        self.shortcuts
            .iter()
            .filter(move |s| s.group.as_deref() == Some(group))
    }

    pub fn theme_names(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(String::as_str)
    }
}

pub fn default_config_path() -> PathBuf {
    let proj_dirs = ProjectDirs::from("org", "keyrun", "keyrun");
    if let Some(dirs) = &proj_dirs {
        dirs.config_dir().join("config.toml")
    } else {
        PathBuf::from("config.toml")
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);

    if !config_path.exists() {
        log::debug!("no config at {:?}, using defaults", config_path);
        let mut config = Config::default();
        config.path = Some(config_path);
        return Ok(config);
    }

    let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
        path: config_path.clone(),
        source,
    })?;
    let mut config = Config::from_toml(&content)?;
    config.path = Some(config_path);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_include_power_group_and_theme() {
        let config = Config::default();
        assert_eq!(config.general.history_size, 50);
        assert_eq!(config.general.power_alias, "p");
        assert!(config.group(POWER_GROUP).is_some());
        assert_eq!(config.members(POWER_GROUP).count(), 5);
        assert!(config.themes.contains_key(theme::DEFAULT_THEME));
    }

    #[test]
    fn parses_shortcuts_groups_and_themes() {
        let config = Config::from_toml(
            r#"
            [general]
            max_visible = 5
            power_alias = "power"

            [[shortcuts]]
            prefix = "g"
            label = "Google"
            template = "https://google.com/search?q={query}"
            mode = "url"
            group = "web"

            [[shortcuts]]
            label = "Top"
            template = "htop"
            run_mode = "terminal"
            stay_open = true

            [[groups]]
            name = "web"
            query_mode = "pass-through"

            [themes.nord]
            background = "2e3440ff"
            "#,
        )
        .unwrap();

        assert_eq!(config.general.max_visible, 5);
        assert_eq!(config.shortcuts[0].mode, ShortcutMode::Url);
        assert_eq!(config.shortcuts[1].mode, ShortcutMode::Shell);
        assert_eq!(config.shortcuts[1].run_mode, RunMode::Terminal);
        assert!(config.shortcuts[1].stay_open);
        assert_eq!(config.group("web").unwrap().query_mode, QueryMode::PassThrough);
        assert_eq!(config.theme_names().collect::<Vec<_>>(), vec!["nord"]);
    }

    #[test]
    fn configured_power_members_replace_defaults() {
        let config = Config::from_toml(
            r#"
            [[shortcuts]]
            label = "Hibernate"
            template = "systemctl hibernate"
            group = "power"
            "#,
        )
        .unwrap();
        let labels: Vec<_> = config.members(POWER_GROUP).map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Hibernate"]);
    }

    #[test]
    fn invalid_theme_color_is_fatal() {
        let err = Config::from_toml(
            r#"
            [themes.broken]
            text = "not-a-color"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidColor { field: "text", .. }));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.path.as_deref(), Some(path.as_path()));
        assert_eq!(config.commands.theme, "t");
    }

    #[test]
    fn loads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[commands]\nsearch = \"f\"\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.commands.search, "f");
        assert_eq!(config.commands.run, "r");
    }
}

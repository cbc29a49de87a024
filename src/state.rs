use std::path::PathBuf;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use regex::Regex;

use crate::command::{Builtin, CommandKind, CommandTable, Query};
use crate::config::Config;
use crate::executor::{self, Dispatcher, Effect, Outcome};
use crate::matcher::FuzzyMatcher;
use crate::model::{Action, AppEntry, Ranked, ResultEntry};
use crate::rankers::{self, FileCache, FileRequest};
use crate::sources::files::FileSearch;
use crate::sources::history::History;
use crate::theme::{Palette, ThemeColors};

/// Everything one launcher session needs between input events.
pub struct AppState {
    pub config: Config,
    table: CommandTable,
    blacklist: Vec<Regex>,
    apps: Vec<AppEntry>,
    pub history: History,
    matcher: FuzzyMatcher,
    files: Box<dyn FileSearch>,
    file_cache: FileCache,

    pub query: String,
    parsed: Query,
    pub results: Vec<ResultEntry>,
    pub selected_index: usize,
    pub view_offset: usize,
    pending: bool,
    last_input: Instant,
    pub status: Option<String>,

    active_theme: String,
    preview_theme: Option<String>,
}

impl AppState {
    pub fn new(
        config: Config,
        history: History,
        files: Box<dyn FileSearch>,
        home: Option<PathBuf>,
    ) -> Self {
        let table = CommandTable::build(&config);
        let blacklist = config
            .general
            .blacklist
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("ignoring blacklist pattern {:?}: {}", pattern, e);
                    None
                }
            })
            .collect();

        let active_theme = [history.active_theme.as_deref(), Some(config.general.theme.as_str())]
            .into_iter()
            .flatten()
            .find(|name| config.themes.contains_key(*name))
            .or_else(|| config.theme_names().next())
            .unwrap_or(crate::theme::DEFAULT_THEME)
            .to_string();

        let parsed = table.parse("");
        let mut state = Self {
            config,
            table,
            blacklist,
            apps: Vec::new(),
            history,
            matcher: FuzzyMatcher::new(home),
            files,
            file_cache: FileCache::default(),
            query: String::new(),
            parsed,
            results: Vec::new(),
            selected_index: 0,
            view_offset: 0,
            pending: false,
            last_input: Instant::now(),
            status: None,
            active_theme,
            preview_theme: None,
        };
        state.rebuild(Instant::now());
        state
    }

    /// Replaces the application pool, dropping blacklisted entries.
    pub fn set_entries(&mut self, apps: Vec<AppEntry>) {
        let total = apps.len();
        self.apps = apps
            .into_iter()
            .filter(|app| {
                !self
                    .blacklist
                    .iter()
                    .any(|re| re.is_match(&app.name) || re.is_match(&app.id))
            })
            .collect();
        debug!("AppState: {} of {} apps after blacklist", self.apps.len(), total);
        self.rebuild(Instant::now());
    }

    pub fn update_query(&mut self, query: &str, now: Instant) {
        self.query = query.to_string();
        self.last_input = now;
        self.status = None;
        self.rebuild(now);
    }

    fn debounce(&self) -> Duration {
        Duration::from_millis(self.config.general.debounce_ms)
    }

    fn visible_rows(&self) -> usize {
        self.config.general.max_visible.max(1)
    }

    pub fn kind(&self) -> CommandKind {
        self.parsed.kind
    }

    /// True while results are a debounce placeholder.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Rebuilds once the debounce window has passed. Returns whether it did.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.pending || now.saturating_duration_since(self.last_input) < self.debounce() {
            return false;
        }
        self.rebuild(now);
        true
    }

    /// Rebuilds as if the debounce window had already passed.
    pub fn settle(&mut self) {
        if self.pending {
            let at = self.last_input + self.debounce();
            self.rebuild(at);
        }
    }

    /// Recomputes results from the current input; nothing is carried over
    /// from the previous result set.
    fn rebuild(&mut self, now: Instant) {
        self.parsed = self.table.parse(&self.query);
        let ranked = self.rank(now);

        self.pending = ranked.pending;
        self.results = ranked.entries;
        self.view_offset = 0;
        self.selected_index = 0;
        if self.parsed.kind != CommandKind::Builtin(Builtin::Theme) {
            if let Some(previewed) = self.preview_theme.take() {
                info!("theme preview of {:?} cancelled", previewed);
            }
        }
        self.select(ranked.default_selection);

        info!(
            "AppState: query='{}', kind={:?}, results={}",
            self.query,
            self.parsed.kind,
            self.results.len()
        );
    }

    fn rank(&mut self, now: Instant) -> Ranked {
        let remainder = self.parsed.remainder.as_str();
        let general = &self.config.general;
        match self.parsed.kind {
            CommandKind::Apps => rankers::rank_apps(
                &self.apps,
                &self.history.recents,
                remainder,
                general.max_visible,
                &self.matcher,
            ),
            CommandKind::Builtin(Builtin::Search) => {
                let request = FileRequest {
                    query: remainder,
                    since_input: now.saturating_duration_since(self.last_input),
                    debounce: Duration::from_millis(general.debounce_ms),
                };
                rankers::rank_files(
                    &request,
                    self.files.as_mut(),
                    &mut self.file_cache,
                    &self.config.search,
                    &self.matcher,
                )
            }
            CommandKind::Builtin(Builtin::Config) => {
                rankers::rank_config(&self.config, &self.table, remainder)
            }
            CommandKind::Builtin(Builtin::Theme) => {
                rankers::rank_themes(self.config.theme_names(), &self.active_theme, remainder)
            }
            CommandKind::Builtin(Builtin::Run) | CommandKind::ShellBang => {
                rankers::rank_run(remainder, general.run_in_terminal)
            }
            CommandKind::Shortcut(i) => match self.config.shortcuts.get(i) {
                Some(shortcut) => rankers::rank_shortcut(shortcut, remainder),
                None => Ranked::or_placeholder(Vec::new(), "Unknown shortcut"),
            },
            CommandKind::Group(i) => match self.config.groups.get(i) {
                Some(group) => rankers::rank_group(&self.config, group, remainder),
                None => Ranked::or_placeholder(Vec::new(), "Unknown group"),
            },
        }
    }

    /// Clamps `index` into the result list and scrolls it into view.
    pub fn select(&mut self, index: usize) {
        if self.results.is_empty() {
            self.selected_index = 0;
            self.view_offset = 0;
            return;
        }
        self.selected_index = index.min(self.results.len() - 1);

        let rows = self.visible_rows();
        if self.selected_index < self.view_offset {
            self.view_offset = self.selected_index;
        } else if self.selected_index >= self.view_offset + rows {
            self.view_offset = self.selected_index + 1 - rows;
        }
        self.update_preview();
    }

    /// Moves by `delta`, wrapping around either end.
    pub fn move_selection(&mut self, delta: i32) {
        if self.results.is_empty() {
            self.select(0);
            return;
        }

        let len = self.results.len() as i64;
        let new_index = (self.selected_index as i64 + delta as i64).rem_euclid(len);
        self.select(new_index as usize);
    }

    /// Moves by whole pages, stopping at either end.
    pub fn page(&mut self, pages: i32) {
        let step = self.visible_rows() as i64 * pages as i64;
        let target = (self.selected_index as i64 + step).max(0);
        self.select(target as usize);
    }

    pub fn get_selected(&self) -> Option<&ResultEntry> {
        self.results.get(self.selected_index)
    }

    /// Rows currently in the scroll window.
    pub fn visible(&self) -> &[ResultEntry] {
        let start = self.view_offset.min(self.results.len());
        let end = (start + self.visible_rows()).min(self.results.len());
        &self.results[start..end]
    }

    pub fn active_theme(&self) -> &str {
        &self.active_theme
    }

    pub fn preview_theme(&self) -> Option<&str> {
        self.preview_theme.as_deref()
    }

    /// The previewed theme while browsing, else the committed one.
    pub fn palette(&self) -> Palette {
        let name = self.preview_theme.as_deref().unwrap_or(&self.active_theme);
        self.config
            .themes
            .get(name)
            .and_then(|colors| colors.resolve().ok())
            .or_else(|| ThemeColors::default().resolve().ok())
            .unwrap_or_else(|| Palette {
                background: tiny_skia::Color::BLACK,
                border: tiny_skia::Color::WHITE,
                text: tiny_skia::Color::WHITE,
                selection_background: tiny_skia::Color::WHITE,
                selection_text: tiny_skia::Color::BLACK,
                highlight: tiny_skia::Color::WHITE,
            })
    }

    fn update_preview(&mut self) {
        if self.parsed.kind != CommandKind::Builtin(Builtin::Theme) {
            return;
        }
        let selected = match self.get_selected().map(|e| &e.action) {
            Some(Action::Theme { name }) => name.clone(),
            _ => return,
        };
        if self.preview_theme.as_deref() != Some(selected.as_str()) {
            debug!("previewing theme {:?}", selected);
            self.preview_theme = Some(selected);
        }
    }

    /// Runs the selected entry. The caller exits when
    /// [`Outcome::should_exit`] says so.
    pub fn activate(&mut self, dispatcher: &mut dyn Dispatcher) -> Outcome {
        if self.results.is_empty() {
            return Outcome::Noop;
        }
        let index = self.selected_index.min(self.results.len() - 1);
        let action = self.results[index].action.clone();

        let resolution = executor::resolve(&action, dispatcher, self.matcher.home());
        match resolution.effect {
            Effect::None => {}
            Effect::RecordLaunch(id) => {
                if let Err(e) = self.history.record_launch(&id) {
                    warn!("failed to save history: {}", e);
                }
            }
            Effect::ApplyTheme(name) => self.commit_theme(&name),
            Effect::SetInput(input) => self.update_query(&input, Instant::now()),
        }

        if let Outcome::Failed(message) = &resolution.outcome {
            warn!("{}", message);
            self.status = Some(message.clone());
        }
        resolution.outcome
    }

    fn commit_theme(&mut self, name: &str) {
        info!("theme {:?} committed", name);
        self.active_theme = name.to_string();
        self.preview_theme = None;
        if let Err(e) = self.history.set_active_theme(name) {
            warn!("failed to save theme choice: {}", e);
        }
        self.update_query("", Instant::now());
    }
}

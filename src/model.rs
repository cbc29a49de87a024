use std::path::PathBuf;

/// An installed application as supplied by the desktop source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    pub id: String,            // Desktop file path, unique per app
    pub name: String,          // Display name
    pub exec: String,          // Exec template, field codes still present
    pub icon: Option<String>,  // Icon name/path
    pub terminal: bool,
}

impl AppEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, exec: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            exec: exec.into(),
            icon: None,
            terminal: false,
        }
    }
}

/// A highlighted run of characters: (char offset, char length).
pub type Span = (usize, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    #[default]
    Spawn,
    Terminal,
}

/// What happens when a result is activated. One variant per action kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    App {
        id: String,
        exec: String,
        terminal: bool,
    },
    File {
        path: PathBuf,
    },
    Url {
        url: String,
        stay_open: bool,
    },
    Shell {
        command: String,
        run_mode: RunMode,
        stay_open: bool,
    },
    /// File-mode shortcut; `~` is expanded at resolve time.
    OpenPath {
        path: String,
        stay_open: bool,
    },
    Theme {
        name: String,
    },
    /// Replace the input text, used by the config browser.
    Complete {
        input: String,
    },
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry {
    pub label: String,
    pub detail: Option<String>,
    pub icon: Option<String>,
    pub highlights: Vec<Span>,
    pub action: Action,
}

impl ResultEntry {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            detail: None,
            icon: None,
            highlights: Vec::new(),
            action,
        }
    }

    pub fn placeholder(label: impl Into<String>) -> Self {
        Self::new(label, Action::Placeholder)
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_icon(mut self, icon: Option<String>) -> Self {
        self.icon = icon;
        self
    }

    pub fn with_highlights(mut self, highlights: Vec<Span>) -> Self {
        self.highlights = highlights;
        self
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.action, Action::Placeholder)
    }
}

/// Output of a ranker: the entries plus the row to pre-select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranked {
    pub entries: Vec<ResultEntry>,
    pub default_selection: usize,
    /// Waiting on the debounce timer; rebuild again once it expires.
    pub pending: bool,
}

impl Ranked {
    /// Wraps `entries`, substituting a single placeholder when empty.
    pub fn or_placeholder(entries: Vec<ResultEntry>, placeholder: &str) -> Self {
        let entries = if entries.is_empty() {
            vec![ResultEntry::placeholder(placeholder)]
        } else {
            entries
        };
        Self {
            entries,
            default_selection: 0,
            pending: false,
        }
    }

    pub fn pending(label: &str) -> Self {
        Self {
            entries: vec![ResultEntry::placeholder(label)],
            default_selection: 0,
            pending: true,
        }
    }
}

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use directories::BaseDirs;
use log::{info, warn};

use keyrun::config::load_config;
use keyrun::executor::SystemDispatcher;
use keyrun::sources::desktop::DesktopSource;
use keyrun::sources::files::CascadeSearch;
use keyrun::sources::history::{get_history_path, History};
use keyrun::sources::Source;
use keyrun::state::AppState;
use keyrun::ui::events::{self, Event, Flow};
use keyrun::ui::render;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Initial query, e.g. "fire" or ":t nord"
    query: Option<String>,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Row to select before printing or launching
    #[arg(short, long, default_value_t = 0)]
    select: usize,

    /// Activate the selected row
    #[arg(short, long)]
    launch: bool,

    /// Read line events from stdin:
    /// "type <text>", "up", "down", "pgup", "pgdn", "enter", "tick", "quit"
    #[arg(long)]
    stdin: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());

    let history = History::load(get_history_path(), config.general.history_size);
    let files = CascadeSearch::new(
        home.clone().unwrap_or_else(|| PathBuf::from("/")),
        config.search.backend_limit,
        config.search.max_depth,
    );
    let mut dispatcher = SystemDispatcher::new(config.general.terminal.clone());
    let mut state = AppState::new(config, history, Box::new(files), home);

    if args.stdin {
        return run_events(state, &mut dispatcher);
    }

    state.set_entries(scan_apps());
    state.update_query(args.query.as_deref().unwrap_or(""), Instant::now());
    state.settle();
    state.select(args.select);
    print!("{}", render::draw(&state));

    if args.launch {
        let outcome = state.activate(&mut dispatcher);
        info!("launch outcome: {:?}", outcome);
        if let Some(status) = &state.status {
            anyhow::bail!("{status}");
        }
    }
    Ok(())
}

fn scan_apps() -> Vec<keyrun::model::AppEntry> {
    match DesktopSource::new().scan() {
        Ok(apps) => apps,
        Err(e) => {
            warn!("desktop scan failed: {e}");
            Vec::new()
        }
    }
}

fn run_events(mut state: AppState, dispatcher: &mut SystemDispatcher) -> Result<()> {
    // Desktop entries load in the background; the session starts empty.
    let (tx_entries, rx_entries) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx_entries.send(scan_apps());
    });

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write!(out, "{}", render::draw(&state))?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        if let Ok(apps) = rx_entries.try_recv() {
            state.set_entries(apps);
        }
        let event = match line.parse::<Event>() {
            Ok(event) => event,
            Err(e) => {
                warn!("{e}");
                continue;
            }
        };
        let flow = events::apply(&mut state, event, dispatcher, Instant::now());
        write!(out, "{}", render::draw(&state))?;
        out.flush()?;
        if flow == Flow::Exit {
            break;
        }
    }
    Ok(())
}

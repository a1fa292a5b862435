mod config;

use std::{
    env,
    io::{self, BufRead},
    process,
    sync::Arc,
    thread,
};

use browse_core::{
    error::Error,
    item::{BrowseId, Item},
    loader::{BrowseLoader, LoaderState, Phase},
    report::LogReporter,
    webapi::WebApi,
};
use crossbeam_channel::Receiver;
use env_logger::{Builder, Env};

use crate::config::Config;

const ENV_LOG: &str = "BROWSE_LOG";
const ENV_LOG_STYLE: &str = "BROWSE_LOG_STYLE";

fn main() {
    // Setup logging from the env variables, with defaults.
    Builder::from_env(
        Env::new()
            .filter_or(ENV_LOG, "info")
            .write_style(ENV_LOG_STYLE),
    )
    .init();

    let browse_id = env::args().nth(1).map(BrowseId::new);
    if let Err(err) = start(browse_id) {
        log::error!("{}", err);
        process::exit(1);
    }
}

fn load_config() -> Config {
    match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => {
            let config = Config::default();
            if let Err(err) = config.save() {
                log::warn!("failed to save default config: {}", err);
            }
            config
        }
        Err(err) => {
            log::error!("failed to load config, using defaults: {}", err);
            Config::default()
        }
    }
}

fn start(browse_id: Option<BrowseId>) -> Result<(), Error> {
    let config = load_config();
    if browse_id.is_none() {
        log::warn!(
            "no browse id given, nothing to load (try {})",
            BrowseId::CHARTS
        );
    }

    let loader = BrowseLoader::new(
        browse_id,
        Arc::new(WebApi::new(config.web_api())),
        Arc::new(LogReporter),
        config.loader(),
    )?;
    let status_thread = thread::spawn({
        let states = loader.subscribe();
        move || report_status(states)
    });

    loader.load_initial();
    println!("enter: next screen, m: more, r: retry, q: quit");

    let mut viewer = Viewer::new(config.rows, config.lookahead);
    for line in io::stdin().lock().lines() {
        match line?.trim() {
            "" | "n" => {
                if viewer.scroll(&loader.state()) {
                    loader.load_more();
                }
            }
            "m" => loader.load_more(),
            "r" => loader.retry(),
            "q" => break,
            _ => log::warn!("unknown command"),
        }
    }

    loader.close();
    if status_thread.join().is_err() {
        log::error!("status thread panicked");
    }
    Ok(())
}

/// Prints phase changes as snapshots come in.  Ends when the loader is gone.
fn report_status(states: Receiver<Arc<LoaderState>>) {
    let mut last_phase = None;
    for state in states {
        let phase = state.phase();
        if last_phase == Some(phase) {
            continue;
        }
        last_phase = Some(phase);
        match phase {
            Phase::Uninitialized => {}
            Phase::Loading => println!("loading..."),
            Phase::HasMore => println!(
                "{}: {} items, more available",
                state.title.as_deref().unwrap_or("Browse"),
                state.items.len()
            ),
            Phase::Exhausted => println!(
                "{}: {} items, end of list",
                state.title.as_deref().unwrap_or("Browse"),
                state.items.len()
            ),
        }
    }
}

/// Pages through the loaded items a screen at a time, standing in for a
/// scrolling list.
struct Viewer {
    shown: usize,
    rows: usize,
    lookahead: usize,
}

impl Viewer {
    fn new(rows: usize, lookahead: usize) -> Self {
        Self {
            shown: 0,
            rows: rows.max(1),
            lookahead,
        }
    }

    /// Prints the next screen of `state` and tells whether the list should
    /// grow.
    fn scroll(&mut self, state: &LoaderState) -> bool {
        // A reload may have shrunk the list under us.
        self.shown = self.shown.min(state.items.len());
        let end = (self.shown + self.rows).min(state.items.len());
        for (index, item) in state.items[self.shown..end].iter().enumerate() {
            println!("{:>4}  {}", self.shown + index + 1, describe(item));
        }
        self.shown = end;
        end > 0 && state.wants_more(end - 1, self.lookahead)
    }
}

fn describe(item: &Item) -> String {
    let detail = match item {
        Item::Album(album) => {
            let artists: Vec<_> = album.artists.iter().map(|a| &*a.name).collect();
            match album.year {
                Some(year) => format!("{} ({})", artists.join(", "), year),
                None => artists.join(", "),
            }
        }
        Item::Playlist(playlist) => playlist.author.as_deref().unwrap_or_default().to_string(),
        Item::Artist(artist) => artist.subtitle.as_deref().unwrap_or_default().to_string(),
        Item::Other(other) => other.subtitle.as_deref().unwrap_or_default().to_string(),
    };
    format!("[{}] {}  {}  <{}>", item.kind(), item.title(), detail, item.id())
}

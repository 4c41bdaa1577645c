//! Binary entry point: resolve paths, start logging, load the bundled hymnal
//! and media listings, then drive the Ratatui event loop until the user exits.
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use bible_hymnal::hymnal::load_hymns;
use bible_hymnal::media::{list_media, MUSIC_EXTENSIONS, SCORE_EXTENSIONS};
use bible_hymnal::{
    run_app, App, AppPaths, Preferences, ReaderSession, StorePaths, TranslationStore,
};

fn main() -> Result<()> {
    let paths = AppPaths::resolve()?;
    fs::create_dir_all(paths.data_dir()).context("failed to create data directory")?;
    init_logging(&paths.log_file())?;
    log::info!(
        "starting with data dir {} and assets {}",
        paths.data_dir().display(),
        paths.assets_dir().display()
    );

    let prefs = Preferences::open(&paths.preferences_file())
        .context("failed to open preference store")?;
    let store = TranslationStore::new(StorePaths::from(&paths));
    let session = Arc::new(ReaderSession::new(Arc::new(store), Arc::new(prefs)));

    let hymns = load_hymns(&paths.hymnal_file()).unwrap_or_else(|err| {
        log::error!("{err}");
        Vec::new()
    });
    let scores = list_media(&paths.scores_dir(), SCORE_EXTENSIONS).unwrap_or_else(|err| {
        log::error!("{err}");
        Vec::new()
    });
    let music = list_media(&paths.music_dir(), MUSIC_EXTENSIONS).unwrap_or_else(|err| {
        log::error!("{err}");
        Vec::new()
    });

    let mut app = App::new(Arc::clone(&session), hymns, scores, music);
    app.start();
    let result = run_app(&mut app);

    session.store().close();
    result
}

/// Send log output to a file; the terminal belongs to the TUI. `RUST_LOG`
/// overrides the default `info` filter.
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

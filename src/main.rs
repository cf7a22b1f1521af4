use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use taskboard::app::App;
use taskboard::config::Config;
use taskboard::quote::StaticQuotes;
use taskboard::{logging, ui, JsonFileStorage, TaskStore};

fn main() -> Result<()> {
    let config = Config::parse();
    logging::init(&config.log_file, &config.log_level)?;

    // Load before touching the terminal so a bad data file is reported plainly.
    let storage = JsonFileStorage::new(&config.data_file);
    let store = TaskStore::open(storage)
        .with_context(|| format!("loading tasks from {}", config.data_file.display()))?;
    let mut app = App::new(store, Box::new(StaticQuotes::default()));

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "board exited with error");
        eprintln!("{:?}", err);
    }
    Ok(())
}

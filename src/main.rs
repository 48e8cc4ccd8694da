mod anchor;
mod app;
mod cli;
mod config;
mod diff_parser;
mod error;
mod handler;
mod input;
mod model;
mod output;
mod persistence;
mod theme;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use app::{App, InputMode};
use handler::{handle_diff_action, handle_help_action};
use input::map_key_to_action;
use model::MultiFilePatch;
use ui::markdown::{HtmlBodyRenderer, IssueishRef};

const PRINT_WIDTH: usize = 100;

fn main() -> anyhow::Result<()> {
    // Off unless RUST_LOG asks for it; the viewer owns the terminal
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();

    let config_outcome = match config::load_config() {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Warning: Failed to load config: {e}");
            config::ConfigLoadOutcome::default()
        }
    };
    for warning in &config_outcome.warnings {
        eprintln!("{warning}");
    }
    let app_config = config_outcome.config.unwrap_or_default();

    let cli_args = cli::parse_cli_args();
    let (theme, theme_warnings) =
        theme::resolve_theme_with_config(cli_args.theme, app_config.theme.as_deref());
    for warning in theme_warnings {
        eprintln!("{warning}");
    }

    let threshold = cli_args
        .large_diff_threshold
        .unwrap_or_else(|| app_config.large_diff_threshold());
    let patch = load_patch(&cli_args, threshold)?;

    let raw_threads = persistence::load_threads(&cli_args.threads_path)
        .with_context(|| format!("reading {}", cli_args.threads_path.display()))?;
    let threads = anchor::group_threads(raw_threads);
    log::info!(
        "{} files, {} rows, {} threads",
        patch.files().len(),
        patch.total_rows(),
        threads.len()
    );

    if cli_args.print {
        let navigator = |target: &IssueishRef| log::info!("link to {target}");
        print!(
            "{}",
            output::generate_report(
                &patch,
                &threads,
                &HtmlBodyRenderer,
                &navigator,
                Utc::now(),
                PRINT_WIDTH,
            )
        );
        return Ok(());
    }

    run_viewer(App::new(theme, patch, threads))
}

fn load_patch(cli_args: &cli::CliArgs, threshold: usize) -> anyhow::Result<MultiFilePatch> {
    let text = std::fs::read_to_string(&cli_args.patch_path)
        .with_context(|| format!("reading {}", cli_args.patch_path.display()))?;
    let mut patch = diff_parser::parse_unified_diff(&text, threshold)
        .with_context(|| format!("parsing {}", cli_args.patch_path.display()))?;

    for path in &cli_args.collapsed {
        if patch.file(path).is_none() {
            eprintln!("Warning: --collapse {} matches no file in the patch", path.display());
            continue;
        }
        patch = patch.collapse(path);
    }
    Ok(patch)
}

fn run_viewer(mut app: App) -> anyhow::Result<()> {
    for (path, reason) in app.suppression_summary() {
        log::debug!("{} thread suppressed: {reason}", path.display());
    }

    // Setup panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    loop {
        terminal.draw(|frame| {
            ui::render(frame, &mut app);
        })?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let action = map_key_to_action(key, app.input_mode);
            match app.input_mode {
                InputMode::Help => handle_help_action(&mut app, action),
                InputMode::Normal => handle_diff_action(&mut app, action),
            }
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use crossterm::event;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::Level;

use viewport_manager::drivers::console::ConsoleInputDriver;
use viewport_manager::layout::{LayoutDefinition, LayoutPreset};
use viewport_manager::log_buffer::{LogBufferHandle, install_panic_hook, set_global_log_buffer};
use viewport_manager::preview::{PreviewApp, StartupLayout};
use viewport_manager::settings::ViewportManagerSettings;
use viewport_manager::tracing_sub;

#[derive(Parser, Debug)]
#[command(
    name = "viewport-manager",
    version = env!("CARGO_PKG_VERSION"),
    about = "Preview split-screen viewport layouts in the terminal"
)]
struct Cli {
    /// JSON layout file to preview.
    #[arg(short, long, value_name = "FILE", conflicts_with = "preset")]
    layout: Option<PathBuf>,

    /// Built-in layout to preview (see --list-presets).
    #[arg(short, long, value_name = "NAME")]
    preset: Option<LayoutPreset>,

    /// TOML settings file.
    #[arg(short, long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Print the built-in layouts and exit.
    #[arg(long)]
    list_presets: bool,

    /// Check a JSON layout file, print its warnings and exit.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["layout", "preset"])]
    validate: Option<PathBuf>,

    /// Write the selected layout as JSON instead of opening the preview.
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    if cli.list_presets {
        for preset in LayoutPreset::ALL {
            println!("{:<24} {}", preset.key(), preset.description());
        }
        return Ok(());
    }

    if let Some(path) = &cli.validate {
        return validate(path);
    }

    let settings = match &cli.settings {
        Some(path) => ViewportManagerSettings::load(path).map_err(io::Error::other)?,
        None => ViewportManagerSettings::default(),
    };
    let startup = match (&cli.layout, cli.preset) {
        (Some(path), _) => {
            StartupLayout::Custom(LayoutDefinition::load(path).map_err(io::Error::other)?)
        }
        (None, Some(preset)) => StartupLayout::Preset(preset),
        (None, None) => StartupLayout::FromSettings,
    };

    if let Some(path) = &cli.export {
        return export(&settings, startup, path);
    }

    let log = LogBufferHandle::default();
    set_global_log_buffer(log.clone());
    install_panic_hook();
    tracing_sub::init_default();

    let (columns, rows) = terminal::size()?;
    let mut app = PreviewApp::new(&settings, startup, columns, rows)
        .map_err(io::Error::other)?
        .with_log(log);

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    terminal::enable_raw_mode()?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let result = app.run(
        &mut terminal,
        ConsoleInputDriver::new(),
        Duration::from_millis(16),
    );

    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        event::DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn validate(path: &Path) -> io::Result<()> {
    tracing_sub::init(Level::INFO);
    let layout = LayoutDefinition::load(path).map_err(io::Error::other)?;
    let warnings = layout.validate();
    println!(
        "{}: {} pane(s), {} warning(s)",
        layout.display_name(),
        layout.panes.len(),
        warnings.len()
    );
    for warning in &warnings {
        println!("  - {warning}");
    }
    if warnings.is_empty() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{} has configuration warnings", path.display()),
        ))
    }
}

fn export(
    settings: &ViewportManagerSettings,
    startup: StartupLayout,
    path: &Path,
) -> io::Result<()> {
    let layout = match startup {
        StartupLayout::Custom(layout) => layout,
        StartupLayout::Preset(preset) => preset.build(),
        StartupLayout::FromSettings => settings
            .resolve_default_layout()
            .map_err(io::Error::other)?
            .unwrap_or_else(|| viewport_manager::preview::FALLBACK_PRESET.build()),
    };
    layout.save(path).map_err(io::Error::other)?;
    println!("wrote {} to {}", layout.display_name(), path.display());
    Ok(())
}

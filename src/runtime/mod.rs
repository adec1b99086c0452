use std::env;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::time::Instant;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::adapter::PlayerAdapter;
use crate::controller::Controller;
use crate::widget::{Bootstrap, WidgetEvent, local::LocalBackend};

mod event_loop;
mod logging;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    if let Err(e) = logging::init(&settings.logging) {
        eprintln!("cadenza: logging disabled: {e}");
    }

    let source = env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let catalog = startup::load_catalog(&source, &settings.catalog)?;

    let (event_tx, event_rx) = mpsc::channel::<WidgetEvent>();
    let adapter = PlayerAdapter::new(Arc::new(LocalBackend::new()), Bootstrap::global(), event_tx);
    let mut controller = Controller::new(catalog, adapter, &settings.playback);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    controller.mount(Instant::now());
    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::new(&settings.ui);
        event_loop::run(&mut terminal, &settings, &mut controller, &event_rx, &mut state)
    })();
    controller.unmount();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}

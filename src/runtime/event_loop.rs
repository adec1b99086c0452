use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::config;
use crate::controller::Controller;
use crate::seek::ratio_from_pointer;
use crate::ui::{self, UiState};
use crate::widget::WidgetEvent;

/// Upper bound on how long the loop blocks waiting for terminal input.
const MAX_IDLE: Duration = Duration::from_millis(50);

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    pub ui: UiState,
    /// Inner area of the timeline gauge from the last draw.
    pub gauge: Rect,
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

impl EventLoopState {
    pub fn new(ui_settings: &config::UiSettings) -> Self {
        Self {
            ui: UiState::new(ui_settings),
            gauge: Rect::default(),
            pending_gg: false,
        }
    }

    fn follow_active(&mut self, controller: &Controller) {
        if let Some(active) = controller.snapshot().active {
            self.ui.cursor = active;
        }
    }
}

/// Main terminal event loop: drains widget events, runs the controller's
/// timers, draws, and handles input. Returns `Ok(())` when shutdown is
/// requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    controller: &mut Controller,
    widget_rx: &mpsc::Receiver<WidgetEvent>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let had_active = controller.snapshot().active;
        while let Ok(ev) = widget_rx.try_recv() {
            controller.handle_widget_event(ev, Instant::now());
        }
        // Auto-advance moves the list cursor along with playback.
        if controller.snapshot().active != had_active {
            state.follow_active(controller);
        }
        controller.tick(Instant::now());

        terminal.draw(|f| {
            state.gauge = ui::draw(
                f,
                &*controller,
                &state.ui,
                &settings.ui,
                settings.playback.scrub_seconds,
            );
        })?;

        let timeout = controller
            .next_deadline()
            .map_or(MAX_IDLE, |d| d.saturating_duration_since(Instant::now()))
            .min(MAX_IDLE);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key_event(key, settings, controller, state) {
                        break;
                    }
                }
                Event::Mouse(mouse) => handle_mouse_event(mouse, controller, state),
                _ => {}
            }
        }
    }

    Ok(())
}

fn handle_mouse_event(mouse: MouseEvent, controller: &mut Controller, state: &EventLoopState) {
    let MouseEventKind::Down(MouseButton::Left) = mouse.kind else {
        return;
    };
    if let Some(ratio) = gauge_ratio(state.gauge, mouse.column, mouse.row) {
        controller.seek_by_ratio(ratio, Instant::now());
    }
}

/// Seek ratio for a click at `(column, row)`, or `None` outside the gauge.
/// The first cell maps to `0.0` and the last one to `1.0`.
fn gauge_ratio(gauge: Rect, column: u16, row: u16) -> Option<f64> {
    let inside = row >= gauge.y
        && row < gauge.y.saturating_add(gauge.height)
        && column >= gauge.x
        && column < gauge.x.saturating_add(gauge.width);
    if !inside {
        return None;
    }
    let span = f64::from(gauge.width.saturating_sub(1));
    Some(ratio_from_pointer(
        f64::from(column),
        f64::from(gauge.x),
        span,
    ))
}

fn export(settings: &config::Settings, controller: &Controller) -> String {
    let dir = settings
        .export
        .dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let written = controller
        .export_playlist()
        .map_err(|e| e.to_string())
        .and_then(|export| export.write_to(&dir).map_err(|e| e.to_string()));
    match written {
        Ok(path) => {
            tracing::info!(path = %path.display(), "playlist exported");
            format!("Exported {}", path.display())
        }
        Err(e) => {
            tracing::warn!(error = %e, "playlist export failed");
            format!("Export failed: {e}")
        }
    }
}

fn cycle_category(controller: &mut Controller, forward: bool) {
    let categories = controller.categories();
    if categories.is_empty() {
        return;
    }
    let current = categories
        .iter()
        .position(|c| c == controller.view().category())
        .unwrap_or(0);
    let next = if forward {
        (current + 1) % categories.len()
    } else {
        (current + categories.len() - 1) % categories.len()
    };
    controller.select_category(&categories[next], Instant::now());
}

/// Returns `true` when the user asked to quit.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    controller: &mut Controller,
    state: &mut EventLoopState,
) -> bool {
    let now = Instant::now();
    let len = controller.view().len();
    if !matches!(key.code, KeyCode::Char('g')) {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char(' ') | KeyCode::Char('p') => controller.toggle_play(),
        KeyCode::Char('l') => {
            controller.next(now);
            state.follow_active(controller);
        }
        KeyCode::Char('h') => {
            controller.prev(now);
            state.follow_active(controller);
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if state.ui.cursor + 1 < len {
                state.ui.cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.ui.cursor = state.ui.cursor.saturating_sub(1);
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                state.ui.cursor = 0;
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => state.ui.cursor = len.saturating_sub(1),
        KeyCode::Enter => controller.select_track(state.ui.cursor, now),
        KeyCode::Char('L') => {
            controller.seek_relative(settings.playback.scrub_seconds as f64, now);
        }
        KeyCode::Char('H') => {
            controller.seek_relative(-(settings.playback.scrub_seconds as f64), now);
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let volume = controller.snapshot().volume + settings.playback.volume_step;
            controller.set_volume(volume);
        }
        KeyCode::Char('-') => {
            let volume = controller.snapshot().volume - settings.playback.volume_step;
            controller.set_volume(volume);
        }
        KeyCode::Char('s') => controller.toggle_shuffle(),
        KeyCode::Char('r') => controller.toggle_repeat(),
        KeyCode::Char('f') => {
            let id = controller
                .view()
                .track(controller.catalog(), state.ui.cursor)
                .map(|t| t.id);
            if let Some(id) = id {
                controller.toggle_like(id);
            }
        }
        KeyCode::Tab | KeyCode::BackTab => {
            cycle_category(controller, key.code == KeyCode::Tab);
            state.ui.cursor = 0;
        }
        KeyCode::Char('v') => state.ui.show_lyrics = !state.ui.show_lyrics,
        KeyCode::Char('e') => state.ui.status = Some(export(settings, controller)),
        _ => {}
    }

    false
}

//! UI rendering helpers for the terminal user interface.
//!
//! Everything here reads a `SessionSnapshot`; nothing mutates the
//! controller. `draw` returns the gauge area so mouse clicks can be mapped
//! back to a seek ratio.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Tabs, Wrap},
};

use crate::catalog::Track;
use crate::config::UiSettings;
use crate::controller::{Controller, SessionSnapshot};
use crate::widget::ApiPhase;

pub const NO_LYRICS: &str = "Lyrics not available for this song. Enjoy the music!";

/// Presentation-only state owned by the event loop.
#[derive(Debug, Default)]
pub struct UiState {
    /// Highlighted row in the track list (a position in the current view).
    pub cursor: usize,
    pub show_lyrics: bool,
    pub status: Option<String>,
}

impl UiState {
    pub fn new(settings: &UiSettings) -> Self {
        Self {
            cursor: 0,
            show_lyrics: settings.show_lyrics,
            status: None,
        }
    }
}

/// Format seconds as `m:ss`. Negative or non-finite input renders `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let secs = seconds.floor() as u64;
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn controls_text(scrub_seconds: u64) -> String {
    [
        "[space/p] play/pause".to_string(),
        "[h/l] prev/next".to_string(),
        format!("[H/L] scrub -/+{scrub_seconds}s"),
        "[j/k] up/down".to_string(),
        "[enter] play selected".to_string(),
        "[+/-] volume".to_string(),
        "[s] shuffle".to_string(),
        "[r] repeat".to_string(),
        "[f] like".to_string(),
        "[tab] category".to_string(),
        "[v] lyrics".to_string(),
        "[e] export".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

fn padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

fn now_playing_lines(snap: &SessionSnapshot<'_>) -> Vec<Line<'static>> {
    let Some(track) = snap.track else {
        return vec![Line::from("No track in this category")];
    };

    let mut state = snap.state.label().to_string();
    match &snap.api {
        ApiPhase::Failed(reason) => state.push_str(&format!(" (player unavailable: {reason})")),
        _ if !snap.ready => state.push_str(" (loading)"),
        _ => {}
    }
    let heart = if snap.liked { " ♥" } else { "" };

    let modes = format!(
        "Shuffle: {} • Repeat: {} • Volume: {}%",
        if snap.shuffle { "ON" } else { "OFF" },
        if snap.repeat { "ON" } else { "OFF" },
        (snap.volume * 100.0).round() as u8,
    );

    vec![
        Line::from(vec![
            Span::styled(track.title.clone(), Style::default().bold()),
            Span::raw(heart),
            Span::raw(format!(" • {} • {}", track.artist, track.genre)),
        ]),
        Line::from(format!("{state} • {modes}")),
    ]
}

/// Row offset that keeps `active` near the middle of a `height`-row panel.
fn centered_offset(active: usize, total: usize, height: usize) -> usize {
    if total <= height || height == 0 {
        return 0;
    }
    let half = height / 2;
    active.saturating_sub(half).min(total - height)
}

fn draw_lyrics(frame: &mut Frame, area: Rect, track: Option<&Track>, active: usize) {
    let block = padded(" lyrics ");
    let inner_height = block.inner(area).height as usize;

    let paragraph = match track {
        Some(t) if t.has_synced_lyrics() => {
            let cues = t.cues();
            let lines: Vec<Line> = cues
                .iter()
                .enumerate()
                .map(|(i, cue)| {
                    if i == active {
                        Line::styled(
                            cue.text.as_str(),
                            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                        )
                    } else {
                        Line::styled(cue.text.as_str(), Style::default().dim())
                    }
                })
                .collect();
            let offset = centered_offset(active, lines.len(), inner_height);
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .scroll((offset as u16, 0))
        }
        Some(Track {
            lyrics: Some(text), ..
        }) if !text.trim().is_empty() => Paragraph::new(text.as_str()).wrap(Wrap { trim: true }),
        _ => Paragraph::new(NO_LYRICS)
            .alignment(Alignment::Center)
            .italic(),
    };
    frame.render_widget(paragraph.block(block), area);
}

fn draw_tracks(frame: &mut Frame, area: Rect, controller: &Controller, ui: &UiState) {
    let catalog = controller.catalog();
    let view = controller.view();
    let active = controller.snapshot().active;

    let total = view.len();
    let height = area.height.saturating_sub(2) as usize;
    let cursor = ui.cursor.min(total.saturating_sub(1));
    let start = centered_offset(cursor, total, height);
    let end = if height == 0 { total } else { (start + height).min(total) };

    let items: Vec<ListItem> = (start..end)
        .filter_map(|pos| view.track(catalog, pos).map(|t| (pos, t)))
        .map(|(pos, t)| {
            let marker = if active == Some(pos) { "▶ " } else { "  " };
            let heart = if controller.is_liked(t.id) { "♥ " } else { "  " };
            ListItem::new(format!(
                "{marker}{heart}{} - {} [{}]",
                t.title,
                t.artist,
                format_time(t.duration)
            ))
        })
        .collect();

    let title = format!(" tracks ({total}) ");
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(cursor - start));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

/// Render the entire UI. Returns the inner area of the timeline gauge.
pub fn draw(
    frame: &mut Frame,
    controller: &Controller,
    ui: &UiState,
    ui_settings: &UiSettings,
    scrub_seconds: u64,
) -> Rect {
    let snap = controller.snapshot();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" cadenza ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let now_playing = Paragraph::new(now_playing_lines(&snap))
        .block(padded(" now playing "))
        .wrap(Wrap { trim: true });
    frame.render_widget(now_playing, chunks[1]);

    let categories = controller.categories();
    let selected = categories
        .iter()
        .position(|c| c == snap.category)
        .unwrap_or(0);
    let tabs = Tabs::new(categories)
        .block(Block::default().borders(Borders::ALL).title(" categories "))
        .select(selected)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_widget(tabs, chunks[2]);

    if ui.show_lyrics {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[3]);
        draw_tracks(frame, body[0], controller, ui);
        draw_lyrics(frame, body[1], snap.track, snap.lyric_index);
    } else {
        draw_tracks(frame, chunks[3], controller, ui);
    }

    let gauge_block = Block::default().borders(Borders::ALL).title(" timeline ");
    let gauge_area = gauge_block.inner(chunks[4]);
    let label = format!(
        "{} / {}",
        format_time(snap.position),
        format_time(snap.duration)
    );
    let gauge = Gauge::default()
        .block(gauge_block)
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio((snap.progress / 100.0).clamp(0.0, 1.0))
        .label(label);
    frame.render_widget(gauge, chunks[4]);

    let footer_text = match &ui.status {
        Some(status) => format!("{status} • {}", controls_text(scrub_seconds)),
        None => controls_text(scrub_seconds),
    };
    let footer = Paragraph::new(footer_text)
        .block(padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[5]);

    gauge_area
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_padded_seconds() {
        assert_eq!(format_time(125.0), "2:05");
        assert_eq!(format_time(59.0), "0:59");
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(3600.9), "60:00");
    }

    #[test]
    fn invalid_times_render_zero() {
        assert_eq!(format_time(-3.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
    }

    #[test]
    fn active_line_stays_centered_until_the_end() {
        assert_eq!(centered_offset(0, 20, 5), 0);
        assert_eq!(centered_offset(10, 20, 5), 8);
        assert_eq!(centered_offset(19, 20, 5), 15);
        assert_eq!(centered_offset(3, 4, 5), 0);
    }

    #[test]
    fn controls_mention_scrub_step() {
        assert!(controls_text(7).contains("scrub -/+7s"));
    }
}

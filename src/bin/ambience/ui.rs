//! Sound list, volume bars and output meter.

use ambience::SoundView;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
    Frame,
};

/// Width of each volume bar in cells.
const BAR_WIDTH: usize = 24;

/// Everything one frame shows.
pub struct Screen<'a> {
    pub sounds: Vec<SoundView>,
    pub selected: usize,
    pub peak: f32,
    pub master: f32,
    pub ready: bool,
    pub status: &'a str,
}

pub fn render(frame: &mut Frame, screen: &Screen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Sounds
            Constraint::Length(3), // Meter
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    render_header(frame, chunks[0], screen);
    render_sounds(frame, chunks[1], screen);
    render_meter(frame, chunks[2], screen.peak);

    let help = Paragraph::new(
        " [↑↓] Select  [Space] Play/Stop  [←→] Volume  [A] All  [S] Stop all  [-+] Master  [Q] Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[3]);
}

fn render_header(frame: &mut Frame, area: Rect, screen: &Screen) {
    let (state, color) = if screen.ready {
        ("● audio on", Color::Green)
    } else {
        ("○ audio locked", Color::Yellow)
    };
    let playing = screen.sounds.iter().filter(|s| s.is_playing).count();

    let line = Line::from(vec![
        Span::styled(format!(" {state}  "), Style::default().fg(color)),
        Span::styled(
            format!("{playing}/{} playing  ", screen.sounds.len()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(format!("master {:>3}%  ", (screen.master * 100.0).round() as u32)),
        Span::styled(screen.status, Style::default().fg(Color::Red)),
    ]);

    let block = Block::default().title(" ambience ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_sounds(frame: &mut Frame, area: Rect, screen: &Screen) {
    let items: Vec<ListItem> = screen
        .sounds
        .iter()
        .enumerate()
        .map(|(i, sound)| {
            let selected = i == screen.selected;
            let marker = if selected { "▶" } else { " " };
            let span = (sound.max_volume - sound.min_volume).max(f32::EPSILON);
            let fraction = ((sound.volume - sound.min_volume) / span).clamp(0.0, 1.0);
            let filled = (fraction * BAR_WIDTH as f32).round() as usize;

            let name_style = if selected {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let (state, state_color) = if sound.is_playing {
                ("playing", Color::Green)
            } else {
                ("stopped", Color::DarkGray)
            };

            ListItem::new(Line::from(vec![
                Span::raw(format!(" {marker} {} ", glyph(sound.icon))),
                Span::styled(format!("{:<12}", sound.label), name_style),
                Span::styled("█".repeat(filled), Style::default().fg(Color::Cyan)),
                Span::styled(
                    "░".repeat(BAR_WIDTH - filled),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(format!(" {:>3.0}%  ", fraction * 100.0)),
                Span::styled(state, Style::default().fg(state_color)),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().title(" Sounds ").borders(Borders::ALL));
    frame.render_widget(list, area);
}

fn render_meter(frame: &mut Frame, area: Rect, peak: f32) {
    let color = if peak > 0.9 { Color::Red } else { Color::Magenta };
    let gauge = Gauge::default()
        .block(Block::default().title(" Output ").borders(Borders::ALL))
        .gauge_style(Style::default().fg(color))
        .ratio(peak.clamp(0.0, 1.0) as f64)
        .label(format!("peak {peak:.2}"));
    frame.render_widget(gauge, area);
}

fn glyph(icon: &str) -> &'static str {
    match icon {
        "wind" => "≋",
        "cloud-rain" => "☂",
        "waves" => "∿",
        _ => "•",
    }
}

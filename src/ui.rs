//! Rendering for the mini player.
//!
//! Pure view code: everything shown comes from a [`MiniView`] assembled by
//! the runtime from the sync client on each frame.

use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Padding, Paragraph, Wrap},
};

use crate::playback::{ProgressSnapshot, TransportState};
use crate::remote::{ConnectionState, NowPlaying};

const CONTROLS: &str = "[space] play/pause | [n/p] next/prev | [+/-] volume | [q] quit";

/// Everything one frame of the mini player shows.
pub struct MiniView<'a> {
    pub endpoint: &'a str,
    pub connection: ConnectionState,
    pub now_playing: Option<&'a NowPlaying>,
    pub progress: Option<ProgressSnapshot>,
    /// Last command feedback, e.g. a send failure.
    pub message: Option<&'a str>,
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// `MM:SS` for a seconds value; NaN and negatives show as zero, huge values saturate.
pub fn format_secs(secs: f64) -> String {
    format_mmss(Duration::from_secs(secs.clamp(0.0, u32::MAX as f64) as u64))
}

/// Progress in `[0.0, 1.0]`; zero when the duration is unknown.
fn ratio(progress: &ProgressSnapshot) -> f64 {
    if progress.duration <= 0.0 {
        return 0.0;
    }
    (progress.position / progress.duration).clamp(0.0, 1.0)
}

fn connection_text(state: ConnectionState) -> (&'static str, Color) {
    match state {
        ConnectionState::Connected => ("connected", Color::Green),
        ConnectionState::Connecting => ("connecting", Color::Yellow),
        ConnectionState::Disconnected => ("disconnected", Color::Red),
    }
}

fn transport_symbol(state: TransportState) -> &'static str {
    match state {
        TransportState::Playing => "▶",
        TransportState::Paused => "⏸",
        TransportState::Stopped => "■",
    }
}

pub fn draw_mini(frame: &mut Frame, view: &MiniView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let (conn, color) = connection_text(view.connection);
    let header = Paragraph::new(Line::from(vec![
        Span::raw(view.endpoint),
        Span::raw(" • "),
        Span::styled(conn, Style::default().fg(color)),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" incallide ")
            .title_alignment(Alignment::Center),
    );
    frame.render_widget(header, chunks[0]);

    let mut lines: Vec<Line> = Vec::new();
    match view.now_playing {
        Some(np) => {
            lines.push(Line::from(np.title.as_str()).bold());
            lines.push(Line::from(format!("by {}", np.artist)).fg(Color::Green));
            lines.push(Line::from(format!("from {}", np.album)).fg(Color::Blue));
        }
        None => lines.push(Line::from("Waiting for track info...").italic()),
    }
    if let Some(p) = &view.progress {
        lines.push(Line::from(format!("Volume: {}%", p.volume)));
    }
    if let Some(msg) = view.message {
        lines.push(Line::from(msg).fg(Color::Yellow));
    }
    let body = Paragraph::new(lines)
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" now playing "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(body, chunks[1]);

    let (label, fill, symbol) = match &view.progress {
        Some(p) => (
            format!("{} / {}", format_secs(p.position), format_secs(p.duration)),
            ratio(p),
            transport_symbol(p.transport),
        ),
        None => ("--:-- / --:--".to_string(), 0.0, transport_symbol(TransportState::Stopped)),
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(format!(" {symbol} ")))
        .gauge_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .ratio(fill)
        .label(label);
    frame.render_widget(gauge, chunks[2]);

    let footer = Paragraph::new(CONTROLS)
        .block(Block::default().borders(Borders::ALL).title(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

//! Transport bar widget - shows song, playhead, pool usage and audio stats

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{UiStateInit, UiStateUpdate};

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

pub fn render_transport(
    frame: &mut Frame,
    area: Rect,
    static_state: &UiStateInit,
    dynamic_state: &UiStateUpdate,
    audio_stats: &AudioStats,
) {
    let block = Block::default()
        .title(format!(" eggsynth: {} ", static_state.name))
        .borders(Borders::ALL);

    let playing = dynamic_state.playhead >= 0.0;
    let position = if playing {
        format!("Beat {:.2}/{:.2}  ", dynamic_state.playhead, static_state.duration)
    } else {
        "--  ".to_string()
    };
    let (qual, id, repeat) = dynamic_state.song;
    let song = if playing {
        format!("Song {qual}:{id}{}  ", if repeat { " ⟳" } else { "" })
    } else {
        "No song  ".to_string()
    };

    let line = Line::from(vec![
        Span::styled(song, Style::default().fg(if playing { Color::Green } else { Color::Yellow })),
        Span::styled(position, Style::default().fg(Color::White)),
        Span::styled(
            format!(
                "V {:2}  FX {:2}  PCM {:2}  ",
                dynamic_state.voices, dynamic_state.procs, dynamic_state.playbacks
            ),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{:.1}kHz  ", static_state.sample_rate as f32 / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", audio_stats.peak, audio_stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}

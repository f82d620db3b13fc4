//! TUI for `eggsynth play`
//!
//! Shows the transport, an oscilloscope and a spectrum of whatever the audio
//! thread is producing, and turns keys into synth messages.

mod spectrum;
pub mod state;
mod transport;
mod waveform;

use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};

use egg_synth::synth::SynthMessage;

pub use state::{UiStateInit, UiStateUpdate};

use spectrum::{render_spectrum, SpectrumAnalyzer};
use transport::{render_transport, AudioStats};
use waveform::render_waveform;

/// Samples kept for the scope and the FFT.
pub const VIS_BUFFER_SIZE: usize = 1024;

pub struct UiApp {
    /// Mono samples from the audio callback
    audio_rx: Consumer<f32>,
    state_rx: Consumer<UiStateUpdate>,
    /// Messages for the audio callback to drain
    control_tx: Producer<SynthMessage>,
    /// Sent on space
    restart: SynthMessage,
    init: UiStateInit,
    current_state: UiStateUpdate,
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        audio_rx: Consumer<f32>,
        state_rx: Consumer<UiStateUpdate>,
        control_tx: Producer<SynthMessage>,
        restart: SynthMessage,
        init: UiStateInit,
    ) -> Self {
        Self {
            audio_rx,
            state_rx,
            control_tx,
            restart,
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, init.sample_rate),
            init,
            current_state: UiStateUpdate::default(),
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            while let Ok(state) = self.state_rx.pop() {
                self.current_state = state;
            }

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }
        Ok(())
    }

    /// Keep the newest `VIS_BUFFER_SIZE` samples.
    fn poll_audio(&mut self) {
        let available = self.audio_rx.slots();
        if available == 0 {
            return;
        }
        let Ok(chunk) = self.audio_rx.read_chunk(available) else {
            return;
        };
        let (a, b) = chunk.as_slices();
        self.audio_buffer.extend_from_slice(a);
        self.audio_buffer.extend_from_slice(b);
        chunk.commit_all();

        let excess = self.audio_buffer.len().saturating_sub(VIS_BUFFER_SIZE);
        self.audio_buffer.drain(..excess);
        self.spectrum.update(&self.audio_buffer);
    }

    fn handle_key(&mut self, key: KeyCode) {
        let message = match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char(' ') => self.restart,
            KeyCode::Char('r') | KeyCode::Char('R') => SynthMessage::SetPlayhead { beats: 0.0 },
            _ => return,
        };
        if self.control_tx.push(message).is_err() {
            tracing::warn!("control queue full, dropping {message:?}");
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport
                Constraint::Min(8),    // Waveform
                Constraint::Min(8),    // Spectrum
                Constraint::Length(1), // Help
            ])
            .split(frame.area());

        let stats = AudioStats::from_buffer(&self.audio_buffer);
        render_transport(frame, chunks[0], &self.init, &self.current_state, &stats);
        render_waveform(frame, chunks[1], &self.audio_buffer);
        render_spectrum(frame, chunks[2], self.spectrum.data());

        let help = Paragraph::new(" [Q] Quit  [Space] Restart  [R] Rewind").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}

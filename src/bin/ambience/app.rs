//! Key handling and the UI loop.
//!
//! Audio stays locked until the first key press: that press is the user
//! gesture which unlocks the engine and brings back whatever was playing when
//! the last session ended.

use std::time::Duration;

use ambience::{registry::FileStore, CpalOutput, EngineError, SoundRegistry};
use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use rtrb::Consumer;
use tracing::warn;

use super::ui::{self, Screen};

/// Volume change per arrow key press.
const VOLUME_STEP: f32 = 0.05;

/// Per-frame falloff of the displayed peak.
const METER_DECAY: f32 = 0.92;

pub struct App {
    registry: SoundRegistry<CpalOutput, FileStore>,
    selected: usize,
    meter: Option<Consumer<f32>>,
    peak: f32,
    unlocked: bool,
    status: String,
    should_quit: bool,
}

impl App {
    pub fn new(registry: SoundRegistry<CpalOutput, FileStore>) -> Self {
        Self {
            registry,
            selected: 0,
            meter: None,
            peak: 0.0,
            unlocked: false,
            status: "press any key to enable audio".into(),
            should_quit: false,
        }
    }

    pub fn run(mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_meter();

            terminal.draw(|frame| ui::render(frame, &self.screen()))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.registry.shutdown();
        Ok(())
    }

    fn screen(&self) -> Screen<'_> {
        Screen {
            sounds: self.registry.sounds(),
            selected: self.selected,
            peak: self.peak,
            master: self.registry.engine().config().master_level,
            ready: self.registry.engine().is_ready(),
            status: &self.status,
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        if matches!(key, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc) {
            self.should_quit = true;
            return;
        }
        if !self.unlocked {
            self.unlock();
        }

        let last = self.registry.len().saturating_sub(1);
        match key {
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => self.selected = (self.selected + 1).min(last),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_selected(),
            KeyCode::Left => self.nudge(-VOLUME_STEP),
            KeyCode::Right => self.nudge(VOLUME_STEP),
            KeyCode::Char('a') => {
                let result = self.registry.toggle_all();
                self.report(result);
            }
            KeyCode::Char('s') => self.registry.stop_all(),
            KeyCode::Char('-') => self.nudge_master(-VOLUME_STEP),
            KeyCode::Char('+') | KeyCode::Char('=') => self.nudge_master(VOLUME_STEP),
            _ => {}
        }
    }

    fn unlock(&mut self) {
        if !self.registry.initialize() {
            self.status = "audio output unavailable, see log".into();
            return;
        }
        self.unlocked = true;
        self.status.clear();
        let result = self.registry.resume_persisted();
        self.report(result);
    }

    fn toggle_selected(&mut self) {
        if self.registry.is_playing(self.selected) {
            self.registry.stop(self.selected);
            return;
        }
        match self.registry.start(self.selected) {
            Ok(true) => {}
            Ok(false) => self.status = "audio is not ready".into(),
            Err(err) => self.report::<()>(Err(err)),
        }
    }

    fn nudge(&mut self, delta: f32) {
        let Some(volume) = self.registry.volume(self.selected) else {
            return;
        };
        let result = self.registry.set_volume(self.selected, volume + delta);
        self.report(result);
    }

    fn nudge_master(&mut self, delta: f32) {
        let engine = self.registry.engine_mut();
        let level = engine.config().master_level + delta;
        let result = engine.set_master_level(level);
        self.report(result);
    }

    fn report<T>(&mut self, result: Result<T, EngineError>) {
        if let Err(err) = result {
            warn!(error = %err, "sound command failed");
            self.status = err.to_string();
        }
    }

    /// Drain peak readings from the output callback.
    fn poll_meter(&mut self) {
        if self.meter.is_none() {
            // a rebuilt stream publishes on a fresh ring
            self.meter = self.registry.engine_mut().output_mut().take_meter();
        }

        let mut latest = 0.0f32;
        if let Some(meter) = self.meter.as_mut() {
            while let Ok(peak) = meter.pop() {
                latest = latest.max(peak);
            }
            if meter.is_abandoned() {
                self.meter = None;
            }
        }
        self.peak = (self.peak * METER_DECAY).max(latest);
    }
}

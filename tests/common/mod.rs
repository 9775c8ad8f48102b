#![allow(dead_code)]

use ambience::{
    AudioEngine, AudioOutput, ContextState, EngineConfig, EngineError, MemoryStore, OfflineOutput,
    SharedGraph, SoundRegistry,
};

/// Output that counts lifecycle calls and can refuse to unlock.
pub struct ScriptedOutput {
    state: ContextState,
    pub resumes: usize,
    pub closes: usize,
    pub refuse: bool,
}

impl ScriptedOutput {
    pub fn new() -> Self {
        Self {
            state: ContextState::Suspended,
            resumes: 0,
            closes: 0,
            refuse: false,
        }
    }

    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::new()
        }
    }

    /// Simulate the platform suspending audio (backgrounded app).
    pub fn suspend(&mut self) {
        self.state = ContextState::Suspended;
    }
}

impl AudioOutput for ScriptedOutput {
    fn resume(&mut self, _graph: &SharedGraph) -> Result<ContextState, EngineError> {
        self.resumes += 1;
        if self.refuse {
            return Err(EngineError::Unlock("no user gesture yet".into()));
        }
        self.state = ContextState::Running;
        Ok(self.state)
    }

    fn state(&self) -> ContextState {
        self.state
    }

    fn close(&mut self) {
        self.closes += 1;
        self.state = ContextState::Closed;
    }
}

pub fn registry() -> SoundRegistry<ScriptedOutput, MemoryStore> {
    registry_with_store(MemoryStore::new())
}

pub fn registry_with_store(store: MemoryStore) -> SoundRegistry<ScriptedOutput, MemoryStore> {
    SoundRegistry::new(
        AudioEngine::new(ScriptedOutput::new(), EngineConfig::default()),
        store,
    )
}

pub fn ready_engine() -> AudioEngine<OfflineOutput> {
    let mut engine = AudioEngine::new(OfflineOutput::new(), EngineConfig::default());
    assert!(engine.initialize());
    engine
}

pub fn live_count(graph: &SharedGraph) -> usize {
    graph.lock().unwrap().live_count()
}

/// Render `seconds` of output from the shared graph.
pub fn render(graph: &SharedGraph, seconds: f32) -> Vec<f32> {
    let mut graph = graph.lock().unwrap();
    let mut out = vec![0.0; (graph.sample_rate() * seconds) as usize];
    graph.render_block(&mut out);
    out
}

pub fn rms(buffer: &[f32]) -> f32 {
    if buffer.is_empty() {
        return 0.0;
    }
    (buffer.iter().map(|s| s * s).sum::<f32>() / buffer.len() as f32).sqrt()
}

pub fn peak(buffer: &[f32]) -> f32 {
    buffer.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
}

//! Which sounds exist, what state they are in, and every transition between
//! stopped and playing.
//!
//! ```text
//!            start / set_volume(v > 0)
//!   Stopped ─────────────────────────→ Playing
//!      ▲                                  │
//!      └──────────── stop ────────────────┘
//! ```
//!
//! A sound node exists exactly while its sound is playing. Every mutation is
//! persisted through the `Store`. All operations take `&mut self`, so two
//! starts of the same sound can never interleave; the second one simply
//! observes `playing` and returns.

use tracing::{info, warn};

use crate::{
    engine::{AudioEngine, AudioOutput, CpalOutput},
    error::EngineError,
    sounds::SoundNode,
};

pub mod descriptor;
pub mod store;

pub use self::{
    descriptor::{builtin, Recipe, SoundDescriptor},
    store::{MemoryStore, Store},
};

#[cfg(feature = "serde")]
pub use self::store::FileStore;

/// Read-only snapshot of one sound for display.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundView {
    pub key: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub min_volume: f32,
    pub max_volume: f32,
    pub volume: f32,
    pub is_playing: bool,
}

struct Slot {
    descriptor: SoundDescriptor,
    volume: f32,
    playing: bool,
    /// Persisted as playing when the registry was created.
    resume: bool,
    node: Option<SoundNode>,
}

impl Slot {
    fn view(&self) -> SoundView {
        SoundView {
            key: self.descriptor.key,
            label: self.descriptor.label,
            icon: self.descriptor.icon,
            min_volume: self.descriptor.min_volume,
            max_volume: self.descriptor.max_volume,
            volume: self.volume,
            is_playing: self.playing,
        }
    }
}

pub struct SoundRegistry<O = CpalOutput, S = MemoryStore> {
    engine: AudioEngine<O>,
    store: S,
    slots: Vec<Slot>,
    initialized: bool,
}

impl<O: AudioOutput, S: Store> SoundRegistry<O, S> {
    /// Registry of the built-in sounds.
    pub fn new(engine: AudioEngine<O>, store: S) -> Self {
        Self::with_descriptors(engine, store, builtin())
    }

    /// Seed each sound's volume from the store. Every sound starts stopped;
    /// sounds persisted as playing are restarted by `resume_persisted`.
    pub fn with_descriptors(
        engine: AudioEngine<O>,
        store: S,
        descriptors: impl IntoIterator<Item = SoundDescriptor>,
    ) -> Self {
        let slots = descriptors
            .into_iter()
            .map(|descriptor| Slot {
                volume: descriptor
                    .clamp(store.get_volume(descriptor.key, descriptor.default_volume)),
                playing: false,
                resume: store.get_is_playing(descriptor.key),
                node: None,
                descriptor,
            })
            .collect();

        Self {
            engine,
            store,
            slots,
            initialized: false,
        }
    }

    pub fn sounds(&self) -> Vec<SoundView> {
        self.slots.iter().map(Slot::view).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// False for unknown indices.
    pub fn is_playing(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|slot| slot.playing)
    }

    pub fn volume(&self, index: usize) -> Option<f32> {
        self.slots.get(index).map(|slot| slot.volume)
    }

    /// Whether audio has been unlocked at least once.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn engine(&self) -> &AudioEngine<O> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut AudioEngine<O> {
        &mut self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The live sound node, present only while playing.
    pub fn node(&self, index: usize) -> Option<&SoundNode> {
        self.slots.get(index).and_then(|slot| slot.node.as_ref())
    }

    /// Unlock audio without starting anything.
    pub fn initialize(&mut self) -> bool {
        let ready = self.engine.initialize();
        self.initialized |= ready;
        ready
    }

    /// Start a sound at its current volume.
    ///
    /// `Ok(true)` once playing (including when it already was), `Ok(false)`
    /// for an unknown index or when audio could not be unlocked. A recipe
    /// error leaves the sound stopped and is returned.
    pub fn start(&mut self, index: usize) -> Result<bool, EngineError> {
        match self.slots.get(index) {
            None => {
                warn!(index, "start of unknown sound ignored");
                return Ok(false);
            }
            Some(slot) if slot.playing => return Ok(true),
            Some(_) => {}
        }

        if !self.initialize() {
            return Ok(false);
        }
        let Some(bus) = self.engine.bus() else {
            return Ok(false);
        };

        let slot = &mut self.slots[index];
        // unlocking may have taken a while; re-check before building
        if slot.playing {
            return Ok(true);
        }

        let volume = slot.descriptor.scaled(slot.volume);
        if slot.node.is_none() {
            let mut graph = self.engine.graph().lock().map_err(|_| EngineError::Poisoned)?;
            let node = (slot.descriptor.build)(&mut *graph, bus, volume)?;
            slot.node = Some(node);
        }

        slot.playing = true;
        slot.resume = false;
        self.store.set_is_playing(slot.descriptor.key, true);
        info!(sound = slot.descriptor.key, volume, "sound started");
        Ok(true)
    }

    /// Stop a sound and release its node. Returns false if it was not playing.
    pub fn stop(&mut self, index: usize) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            warn!(index, "stop of unknown sound ignored");
            return false;
        };
        if !slot.playing {
            return false;
        }

        if let Some(node) = slot.node.take() {
            match self.engine.graph().lock() {
                Ok(mut graph) => {
                    node.dispose(&mut graph);
                }
                Err(_) => warn!(sound = slot.descriptor.key, "graph lock poisoned, node leaked"),
            }
        }

        slot.playing = false;
        self.store.set_is_playing(slot.descriptor.key, false);
        info!(sound = slot.descriptor.key, "sound stopped");
        true
    }

    /// Clamp, persist, then apply.
    ///
    /// A non-zero volume on a stopped sound starts it: dragging a slider is
    /// how a stopped sound gets turned on. Zero on a playing sound mutes it
    /// but leaves it playing.
    pub fn set_volume(&mut self, index: usize, volume: f32) -> Result<(), EngineError> {
        let Some(slot) = self.slots.get_mut(index) else {
            warn!(index, "volume change for unknown sound ignored");
            return Ok(());
        };

        let volume = slot.descriptor.clamp(volume);
        slot.volume = volume;
        self.store.set_volume(slot.descriptor.key, volume);

        if !slot.playing {
            if volume > 0.0 {
                self.start(index)?;
            }
            return Ok(());
        }

        let scaled = slot.descriptor.scaled(volume);
        if let Some(node) = slot.node.as_mut() {
            let mut graph = self.engine.graph().lock().map_err(|_| EngineError::Poisoned)?;
            node.set_volume(&mut graph, scaled)?;
        }
        Ok(())
    }

    /// Stop everything if everything is playing; otherwise start whatever is
    /// stopped and leave the rest alone.
    pub fn toggle_all(&mut self) -> Result<(), EngineError> {
        if !self.slots.is_empty() && self.slots.iter().all(|slot| slot.playing) {
            self.stop_all();
            return Ok(());
        }

        let stopped: Vec<usize> = (0..self.slots.len())
            .filter(|&i| !self.slots[i].playing)
            .collect();
        self.start_each(stopped)
    }

    pub fn stop_all(&mut self) {
        for index in 0..self.slots.len() {
            self.stop(index);
        }
    }

    /// Restart the sounds that were playing when the state was persisted.
    ///
    /// Call from the same user gesture that unlocks audio.
    pub fn resume_persisted(&mut self) -> Result<(), EngineError> {
        let pending: Vec<usize> = (0..self.slots.len())
            .filter(|&i| self.slots[i].resume && !self.slots[i].playing)
            .collect();
        self.start_each(pending)
    }

    fn start_each(&mut self, indices: Vec<usize>) -> Result<(), EngineError> {
        let mut first_error = None;
        for index in indices {
            if let Err(err) = self.start(index) {
                warn!(index, error = %err, "sound failed to start");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Release every node and close the engine, leaving the persisted
    /// playing flags as they were so the next session can resume them.
    pub fn shutdown(&mut self) {
        if let Ok(mut graph) = self.engine.graph().lock() {
            for slot in &mut self.slots {
                if let Some(node) = slot.node.take() {
                    node.dispose(&mut graph);
                }
                slot.resume = slot.playing;
                slot.playing = false;
            }
        }
        self.engine.dispose();
    }
}
